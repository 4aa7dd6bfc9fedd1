//! Graphviz renderings of both containers, for eyeballing their shape while debugging.

use alloc::{collections::VecDeque, string::String};
use core::{
    fmt::{self, Write},
    ptr::NonNull,
};

use crate::{
    links,
    pairing::{self, HeapNode, PairingHeap},
    Links, SplayTree, TreeNode,
};

impl<T> SplayTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Writes the tree to `w` in Graphviz dot format.
    ///
    /// Tree edges are solid. The duplicates of each occupant hang off it as a dashed chain, oldest
    /// first.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
        T::Key: fmt::Display,
    {
        let Some(root) = self.root else {
            return write!(w, "digraph \"graph-{name}\" {{}}");
        };

        enum Item<T: ?Sized> {
            Node(NonNull<T>),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut missing = 0;
        let mut edges = String::new();

        while !queue.is_empty() {
            write!(w, "{{rank=same; ")?;

            for _ in 0..queue.len() {
                let Some(item) = queue.pop_front() else {
                    break;
                };

                let node = match item {
                    Item::Node(node) => node,
                    Item::Missing(id) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                };

                let key = unsafe { node.as_ref().key() };
                write!(w, "\"graph{name}-{key}\" [label=\"{key}\"]; ")?;

                for child in unsafe { [links(node).left(), links(node).right()] } {
                    match child {
                        Some(child) => {
                            let child_key = unsafe { child.as_ref().key() };
                            queue.push_back(Item::Node(child));
                            writeln!(
                                edges,
                                "\"graph{name}-{key}\" -> \"graph{name}-{child_key}\";"
                            )?;
                        }
                        None => {
                            queue.push_back(Item::Missing(missing));
                            writeln!(
                                edges,
                                "\"graph{name}-{key}\" -> \"graph{name}-missing{missing}\";"
                            )?;
                            missing += 1;
                        }
                    }
                }

                let mut prev = String::new();
                write!(prev, "graph{name}-{key}")?;
                let mut opt_dup = unsafe { links(node).dups() };
                let mut seq = 0;

                while let Some(dup) = opt_dup {
                    writeln!(
                        edges,
                        "\"graph{name}-{key}-dup{seq}\" [label=\"{key}\" shape=box];"
                    )?;
                    writeln!(
                        edges,
                        "\"{prev}\" -> \"graph{name}-{key}-dup{seq}\" [style=dashed];"
                    )?;

                    prev.clear();
                    write!(prev, "graph{name}-{key}-dup{seq}")?;
                    seq += 1;

                    let next = unsafe { links(dup).ring().next };
                    opt_dup = unsafe { links(next).ring().occupant.is_none().then_some(next) };
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&edges)?;

        w.write_str(" }\n}")
    }
}

impl<T> PairingHeap<T>
where
    T: HeapNode<pairing::Links<T>> + ?Sized,
{
    /// Writes the heap to `w` in Graphviz dot format, one rank per depth.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
        T::Priority: fmt::Display,
    {
        let Some(root) = self.root_raw() else {
            return write!(w, "digraph \"graph-{name}\" {{}}");
        };

        // Priorities repeat, so nodes are named by visiting order.
        let mut queue = VecDeque::new();
        queue.push_back((root, 0usize));
        let mut next_id = 1;

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut edges = String::new();

        while !queue.is_empty() {
            write!(w, "{{rank=same; ")?;

            for _ in 0..queue.len() {
                let Some((node, id)) = queue.pop_front() else {
                    break;
                };

                let priority = unsafe { node.as_ref().priority() };
                write!(w, "\"graph{name}-{id}\" [label=\"{priority}\"]; ")?;

                for child in unsafe { Self::children(node) } {
                    writeln!(edges, "\"graph{name}-{id}\" -> \"graph{name}-{next_id}\";")?;
                    queue.push_back((child, next_id));
                    next_id += 1;
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&edges)?;

        w.write_str(" }\n}")
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use crate::{
        model::{HeapEntry, TestNode},
        PairingHeap, SplayTree,
    };

    #[test]
    fn tree_graph_shows_duplicates() {
        let mut tree: SplayTree<TestNode> = SplayTree::new();
        for key in [2, 1, 2, 2] {
            tree.insert_multi(TestNode::new(key)).unwrap();
        }

        let mut out = String::new();
        tree.dotgraph("t", &mut out).unwrap();

        assert!(out.starts_with("digraph \"graph-t\""));
        assert!(out.contains("\"grapht-2\" [label=\"2\"]"));
        assert!(out.contains("\"grapht-2\" -> \"grapht-2-dup0\" [style=dashed];"));
        assert!(out.contains("\"grapht-2-dup0\" -> \"grapht-2-dup1\" [style=dashed];"));
        assert!(!out.contains("dup2"));
    }

    #[test]
    fn heap_graph_has_an_edge_per_child() {
        let mut heap: PairingHeap<HeapEntry> = PairingHeap::min();
        for p in [4, 8, 6] {
            heap.push(HeapEntry::new(p)).unwrap();
        }

        let mut out = String::new();
        heap.dotgraph("h", &mut out).unwrap();

        assert!(out.contains("[label=\"4\"]"));
        assert_eq!(out.matches(" -> ").count(), 2);
    }

    #[test]
    fn empty_graphs() {
        let tree: SplayTree<TestNode> = SplayTree::new();
        let heap: PairingHeap<HeapEntry> = PairingHeap::max();

        let mut out = String::new();
        tree.dotgraph("e", &mut out).unwrap();
        assert_eq!(out, "digraph \"graph-e\" {}");

        out.clear();
        heap.dotgraph("e", &mut out).unwrap();
        assert_eq!(out, "digraph \"graph-e\" {}");
    }
}
