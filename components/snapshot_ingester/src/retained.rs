//! Retained-size approximation
//!
//! When a snapshot document omits retained sizes they are approximated as
//! the sum of self-sizes of every node reachable from the subject through
//! retaining edges, deduplicated with a visited set. This is NOT exact
//! dominator-tree retained size: memory reachable through other paths is
//! counted too, so the figure is an upper bound and findings built on it
//! carry a heuristic confidence flag.

use diag_types::domains::heap::HeapGraph;
use std::collections::HashSet;

/// Approximate the retained size of one node
///
/// Cycle-safe: traversal uses an explicit worklist and visited set, so deep
/// or cyclic retention chains cannot overflow the stack.
pub fn approximate_retained(graph: &HeapGraph, root: u64) -> u64 {
    let mut visited: HashSet<u64> = HashSet::new();
    let mut worklist = vec![root];
    let mut total = 0u64;

    while let Some(id) = worklist.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(node) = graph.node(id) else {
            // Dangling edge target; skip rather than fail, the graph
            // validator reports these separately
            continue;
        };
        total += node.self_size;
        for edge in graph.outgoing_edges(id) {
            if edge.kind.retains() && !visited.contains(&edge.to_id) {
                worklist.push(edge.to_id);
            }
        }
    }

    total
}

/// Fill in retained sizes for every node that lacks one
///
/// Quadratic in the worst case; snapshot size is bounded by the ingester's
/// memory budget before this runs.
pub(crate) fn fill_retained_sizes(graph: &mut HeapGraph) {
    let missing: Vec<u64> = graph
        .nodes()
        .iter()
        .filter(|n| n.retained_size.is_none())
        .map(|n| n.id)
        .collect();

    let computed: Vec<(u64, u64)> = missing
        .iter()
        .map(|&id| (id, approximate_retained(graph, id)))
        .collect();

    for (id, size) in computed {
        if let Some(node) = graph.node_mut(id) {
            node.retained_size = Some(size);
        }
    }
}
