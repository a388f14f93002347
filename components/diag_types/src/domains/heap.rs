// Heap graph domain types
//
// The retained-object graph is modelled as an explicit node arena with
// index-based edges. Graphs may be cyclic; every traversal over them uses an
// explicit worklist and visited set, never recursion over node pointers.

use crate::errors::DiagError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// One object in the heap graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeapNode {
    /// Snapshot-assigned object id
    pub id: u64,
    /// Runtime type label ("object", "closure", "native", ...)
    pub node_type: String,
    /// Object name as recorded by the heap profiler
    pub name: String,
    /// Shallow size in bytes
    pub self_size: u64,
    /// Retained size in bytes, if the document carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retained_size: Option<u64>,
}

/// Reference kind of a heap edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Variable captured from an enclosing scope
    Context,
    /// Array element
    Element,
    /// Named property
    Property,
    /// Engine-internal reference
    Internal,
    /// Reference hidden from user code
    Hidden,
    /// Shortcut edge added by the profiler
    Shortcut,
    /// Weak reference; does not retain its target
    Weak,
}

impl EdgeKind {
    /// Map a heap-profiler edge type label onto a kind
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "context" => Some(Self::Context),
            "element" => Some(Self::Element),
            "property" => Some(Self::Property),
            "internal" => Some(Self::Internal),
            "hidden" => Some(Self::Hidden),
            "shortcut" => Some(Self::Shortcut),
            "weak" => Some(Self::Weak),
            _ => None,
        }
    }

    /// Whether an edge of this kind keeps its target alive
    pub fn retains(&self) -> bool {
        !matches!(self, Self::Weak)
    }
}

/// Edge label: property name or element index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeLabel {
    /// Element index for element/hidden edges
    Index(u32),
    /// Property or context variable name
    Name(String),
}

/// One reference in the heap graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeapEdge {
    /// Id of the owning node
    pub from_id: u64,
    /// Id of the referenced node
    pub to_id: u64,
    /// Reference kind
    pub kind: EdgeKind,
    /// Property name or element index
    pub name_or_index: EdgeLabel,
}

/// Normalized heap graph produced by snapshot ingestion
///
/// Node and edge order is the document order of the snapshot, so parsing
/// identical bytes always yields a structurally identical graph.
#[derive(Debug, Clone)]
pub struct HeapGraph {
    nodes: Vec<HeapNode>,
    edges: Vec<HeapEdge>,
    /// node id -> offset into `nodes`
    index: HashMap<u64, usize>,
    /// node id -> offsets into `edges` for its outgoing edges
    outgoing: HashMap<u64, Vec<usize>>,
    /// True when retained sizes were filled in by approximation
    retained_approximated: bool,
}

impl HeapGraph {
    /// Assemble a graph from parsed nodes and edges
    ///
    /// Edge endpoints are not validated here; a dangling edge is reported by
    /// the traversal that first touches it, so that one bad edge only fails
    /// the sub-analysis that depends on it.
    pub fn from_parts(nodes: Vec<HeapNode>, edges: Vec<HeapEdge>) -> Self {
        let index: HashMap<u64, usize> = nodes
            .iter()
            .enumerate()
            .map(|(offset, node)| (node.id, offset))
            .collect();

        let mut outgoing: HashMap<u64, Vec<usize>> = HashMap::new();
        for (offset, edge) in edges.iter().enumerate() {
            outgoing.entry(edge.from_id).or_default().push(offset);
        }

        Self {
            nodes,
            edges,
            index,
            outgoing,
            retained_approximated: false,
        }
    }

    /// Mark that retained sizes were computed by approximation
    pub fn set_retained_approximated(&mut self, approximated: bool) {
        self.retained_approximated = approximated;
    }

    /// Whether retained sizes came from a heuristic rather than the document
    pub fn retained_approximated(&self) -> bool {
        self.retained_approximated
    }

    /// All nodes in document order
    pub fn nodes(&self) -> &[HeapNode] {
        &self.nodes
    }

    /// All edges in document order
    pub fn edges(&self) -> &[HeapEdge] {
        &self.edges
    }

    /// Look up a node by id
    pub fn node(&self, id: u64) -> Option<&HeapNode> {
        self.index.get(&id).map(|&offset| &self.nodes[offset])
    }

    /// Mutable access to a node by id (used when filling retained sizes)
    pub fn node_mut(&mut self, id: u64) -> Option<&mut HeapNode> {
        let offset = *self.index.get(&id)?;
        Some(&mut self.nodes[offset])
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Sum of shallow sizes over all nodes
    pub fn total_self_size(&self) -> u64 {
        self.nodes.iter().map(|n| n.self_size).sum()
    }

    /// Outgoing edges of a node, in document order
    pub fn outgoing_edges(&self, id: u64) -> impl Iterator<Item = &HeapEdge> {
        self.outgoing
            .get(&id)
            .into_iter()
            .flatten()
            .map(move |&offset| &self.edges[offset])
    }

    /// Outgoing edges with their document-order index, for dangling-edge reports
    pub fn outgoing_edges_indexed(&self, id: u64) -> impl Iterator<Item = (usize, &HeapEdge)> {
        self.outgoing
            .get(&id)
            .into_iter()
            .flatten()
            .map(move |&offset| (offset, &self.edges[offset]))
    }

    /// Check that every edge endpoint resolves to a node
    pub fn validate(&self) -> Result<(), DiagError> {
        for (edge_index, edge) in self.edges.iter().enumerate() {
            for id in [edge.from_id, edge.to_id] {
                if !self.index.contains_key(&id) {
                    return Err(DiagError::MalformedGraph {
                        edge_index,
                        node_id: id,
                    });
                }
            }
        }
        Ok(())
    }
}

/// One point-in-time memory measurement
///
/// Immutable once captured. The caller is expected to trigger a
/// garbage-collection settle step before each capture so that sample-to-sample
/// growth reflects retained memory, not transient allocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySample {
    /// Capture timestamp in epoch milliseconds
    pub timestamp_ms: u64,
    /// Used heap size in bytes
    pub used_size: u64,
    /// Number of live objects
    pub node_count: u32,
    /// The full graph, when the capture kept it
    #[serde(skip)]
    pub graph: Option<Arc<HeapGraph>>,
}

/// Ordered sequence of memory samples, strictly increasing by timestamp
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryTimeline {
    samples: Vec<MemorySample>,
}

impl MemoryTimeline {
    /// Create an empty timeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a timeline, rejecting out-of-order samples
    pub fn from_samples(samples: Vec<MemorySample>) -> Result<Self, DiagError> {
        let mut timeline = Self::new();
        for sample in samples {
            timeline.push(sample)?;
        }
        Ok(timeline)
    }

    /// Append a sample; its timestamp must exceed the previous one
    pub fn push(&mut self, sample: MemorySample) -> Result<(), DiagError> {
        if let Some(last) = self.samples.last() {
            if sample.timestamp_ms <= last.timestamp_ms {
                return Err(DiagError::NonMonotonicTimeline {
                    prev_ms: last.timestamp_ms,
                    next_ms: sample.timestamp_ms,
                });
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    /// All samples in capture order
    pub fn samples(&self) -> &[MemorySample] {
        &self.samples
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the timeline holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
