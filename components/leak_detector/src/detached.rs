//! Detached-subgraph discovery
//!
//! Nodes classified as detached DOM wrappers are treated as cluster roots.
//! Each cluster is the set of nodes reachable from its root through
//! retaining edges. Traversal shares one visited set across clusters, so a
//! node claimed by an earlier cluster is never counted twice.

use crate::classify::classify_node;
use diag_types::domains::heap::HeapGraph;
use diag_types::domains::memory::{DetachedSubgraph, NodeClass};
use diag_types::{Confidence, DiagError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Configuration for detached-subgraph reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachedConfig {
    /// Largest clusters to report
    pub max_reported: usize,
    /// Clusters below this size are dropped as noise
    pub min_retained_bytes: u64,
}

impl Default for DetachedConfig {
    fn default() -> Self {
        Self {
            max_reported: 10,
            min_retained_bytes: 0,
        }
    }
}

/// Find clusters of memory retained through detached DOM nodes
///
/// A dangling edge anywhere in a traversed cluster fails this sub-analysis
/// with [`DiagError::MalformedGraph`]; sibling analyses are unaffected.
pub fn find_detached_subgraphs(
    graph: &HeapGraph,
    config: &DetachedConfig,
) -> Result<Vec<DetachedSubgraph>, DiagError> {
    // Roots in document order so identical graphs yield identical clusters
    let roots: Vec<u64> = graph
        .nodes()
        .iter()
        .filter(|node| classify_node(node).class == NodeClass::Detached)
        .map(|node| node.id)
        .collect();

    let mut visited: HashSet<u64> = HashSet::new();
    let mut clusters = Vec::new();

    for root_id in roots {
        if visited.contains(&root_id) {
            continue;
        }

        let mut node_ids = Vec::new();
        let mut retained_bytes = 0u64;
        let mut worklist = vec![root_id];

        while let Some(id) = worklist.pop() {
            if !visited.insert(id) {
                continue;
            }
            // Ids are validated against the graph before they enter the
            // worklist, so a miss here cannot happen
            let Some(node) = graph.node(id) else {
                continue;
            };
            node_ids.push(id);
            retained_bytes += node.self_size;

            for (edge_index, edge) in graph.outgoing_edges_indexed(id) {
                if !edge.kind.retains() {
                    continue;
                }
                if graph.node(edge.to_id).is_none() {
                    return Err(DiagError::MalformedGraph {
                        edge_index,
                        node_id: edge.to_id,
                    });
                }
                if !visited.contains(&edge.to_id) {
                    worklist.push(edge.to_id);
                }
            }
        }

        if retained_bytes < config.min_retained_bytes {
            continue;
        }

        let root_name = graph
            .node(root_id)
            .map(|n| n.name.clone())
            .unwrap_or_default();
        clusters.push(DetachedSubgraph {
            root_id,
            root_name,
            node_ids,
            retained_bytes,
            // Detachedness comes from name-marker classification and the
            // size from a reachability sum, so the cluster is heuristic
            confidence: Confidence::Heuristic,
        });
    }

    clusters.sort_by(|a, b| {
        b.retained_bytes
            .cmp(&a.retained_bytes)
            .then(a.root_id.cmp(&b.root_id))
    });
    clusters.truncate(config.max_reported);

    debug!("found {} detached subgraphs", clusters.len());
    Ok(clusters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diag_types::domains::heap::{EdgeKind, EdgeLabel, HeapEdge, HeapNode};

    fn node(id: u64, name: &str, size: u64) -> HeapNode {
        HeapNode {
            id,
            node_type: "native".to_string(),
            name: name.to_string(),
            self_size: size,
            retained_size: None,
        }
    }

    fn edge(from: u64, to: u64) -> HeapEdge {
        HeapEdge {
            from_id: from,
            to_id: to,
            kind: EdgeKind::Property,
            name_or_index: EdgeLabel::Name("child".to_string()),
        }
    }

    #[test]
    fn test_cluster_membership_and_size() {
        // Detached root 10 retains 11 and 12; node 1 is attached and outside
        let graph = HeapGraph::from_parts(
            vec![
                node(1, "HTMLBodyElement", 100),
                node(10, "Detached HTMLDivElement", 40),
                node(11, "Detached HTMLSpanElement", 20),
                node(12, "Text", 8),
            ],
            vec![edge(10, 11), edge(11, 12)],
        );

        let clusters = find_detached_subgraphs(&graph, &DetachedConfig::default()).unwrap();
        assert_eq!(clusters.len(), 1);

        let cluster = &clusters[0];
        assert_eq!(cluster.root_id, 10);
        assert_eq!(cluster.retained_bytes, 68);
        assert_eq!(cluster.confidence, Confidence::Heuristic);

        // Soundness: every member is reachable from the detached root
        let mut members = cluster.node_ids.clone();
        members.sort_unstable();
        assert_eq!(members, vec![10, 11, 12]);
    }

    #[test]
    fn test_nested_detached_roots_share_one_cluster() {
        // 11 is itself detached but already claimed by 10's cluster
        let graph = HeapGraph::from_parts(
            vec![
                node(10, "Detached HTMLDivElement", 40),
                node(11, "Detached HTMLSpanElement", 20),
            ],
            vec![edge(10, 11)],
        );

        let clusters = find_detached_subgraphs(&graph, &DetachedConfig::default()).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].root_id, 10);
    }

    #[test]
    fn test_cyclic_cluster_terminates() {
        let graph = HeapGraph::from_parts(
            vec![
                node(10, "Detached HTMLDivElement", 40),
                node(11, "Text", 8),
            ],
            vec![edge(10, 11), edge(11, 10)],
        );

        let clusters = find_detached_subgraphs(&graph, &DetachedConfig::default()).unwrap();
        assert_eq!(clusters[0].retained_bytes, 48);
    }

    #[test]
    fn test_clusters_sorted_and_truncated() {
        let graph = HeapGraph::from_parts(
            vec![
                node(10, "Detached HTMLDivElement", 10),
                node(20, "Detached HTMLUListElement", 500),
                node(30, "Detached HTMLImageElement", 90),
            ],
            vec![],
        );

        let config = DetachedConfig {
            max_reported: 2,
            min_retained_bytes: 0,
        };
        let clusters = find_detached_subgraphs(&graph, &config).unwrap();

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].root_id, 20);
        assert_eq!(clusters[1].root_id, 30);
    }

    #[test]
    fn test_dangling_edge_fails_this_analysis() {
        let graph = HeapGraph::from_parts(
            vec![node(10, "Detached HTMLDivElement", 40)],
            vec![edge(10, 99)],
        );

        let err = find_detached_subgraphs(&graph, &DetachedConfig::default()).unwrap_err();
        assert!(matches!(err, DiagError::MalformedGraph { node_id: 99, .. }));
    }

    #[test]
    fn test_weak_edges_do_not_extend_clusters() {
        let mut weak = edge(10, 11);
        weak.kind = EdgeKind::Weak;
        let graph = HeapGraph::from_parts(
            vec![
                node(10, "Detached HTMLDivElement", 40),
                node(11, "Text", 8),
            ],
            vec![weak],
        );

        let clusters = find_detached_subgraphs(&graph, &DetachedConfig::default()).unwrap();
        assert_eq!(clusters[0].retained_bytes, 40);
    }
}
