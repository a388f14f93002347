//! Oversized-closure detection

use crate::classify::classify_node;
use diag_types::domains::heap::HeapGraph;
use diag_types::domains::memory::{ClosureLeak, NodeClass};
use diag_types::Confidence;

/// Find closures holding more memory than the threshold
///
/// The retained size is preferred when the graph carries one; a node without
/// any usable retained figure falls back to its shallow size and is flagged
/// heuristic rather than dropped, so an unsupported size computation lowers
/// confidence instead of aborting the analysis.
pub fn find_oversized_closures(graph: &HeapGraph, threshold_bytes: u64) -> Vec<ClosureLeak> {
    let mut leaks: Vec<ClosureLeak> = graph
        .nodes()
        .iter()
        .filter(|node| classify_node(node).class == NodeClass::Closure)
        .filter_map(|node| {
            let (size_bytes, confidence) = match node.retained_size {
                Some(size) if !graph.retained_approximated() => (size, Confidence::Exact),
                Some(size) => (size, Confidence::Heuristic),
                None => (node.self_size, Confidence::Heuristic),
            };
            if size_bytes > threshold_bytes {
                Some(ClosureLeak {
                    node_id: node.id,
                    name: node.name.clone(),
                    size_bytes,
                    confidence,
                })
            } else {
                None
            }
        })
        .collect();

    leaks.sort_by(|a, b| {
        b.size_bytes
            .cmp(&a.size_bytes)
            .then(a.node_id.cmp(&b.node_id))
    });
    leaks
}
