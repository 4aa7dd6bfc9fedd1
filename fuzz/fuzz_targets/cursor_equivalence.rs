#![no_main]

use cordyceps_adaptive::model::CursorEquivalenceInput;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: CursorEquivalenceInput| {
    cordyceps_adaptive::model::run_cursor_equivalence(input.keys, input.ops);
});
