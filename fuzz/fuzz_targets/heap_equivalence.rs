#![no_main]
use libfuzzer_sys::fuzz_target;

use cordyceps_adaptive::{
    model::{run_heap_equivalence, HeapOp},
    Order,
};

fuzz_target!(|input: (bool, Vec<HeapOp>)| {
    let (max, ops) = input;
    let order = if max { Order::Max } else { Order::Min };
    run_heap_equivalence(order, ops);
});
