//! Raw heap-snapshot document parsing
//!
//! The input is the runtime heap-profiler's own JSON layout: a `snapshot`
//! header whose `meta` section declares the field layout of the flat `nodes`
//! and `edges` integer arrays, plus a shared `strings` table. This engine
//! does not define its own wire format.

use diag_types::domains::heap::{EdgeKind, EdgeLabel, HeapEdge, HeapGraph, HeapNode};
use diag_types::MalformedSnapshotError;
use serde_json::Value;
use tracing::warn;

/// Positions of the required node fields inside one flat node record
struct NodeLayout {
    type_idx: usize,
    name_idx: usize,
    id_idx: usize,
    self_size_idx: usize,
    edge_count_idx: usize,
    retained_size_idx: Option<usize>,
    width: usize,
}

/// Positions of the required edge fields inside one flat edge record
struct EdgeLayout {
    type_idx: usize,
    name_or_index_idx: usize,
    to_node_idx: usize,
    width: usize,
}

pub(crate) fn parse_document(raw: &[u8]) -> Result<HeapGraph, MalformedSnapshotError> {
    let doc: Value = serde_json::from_slice(raw)?;

    let snapshot = doc
        .get("snapshot")
        .ok_or(MalformedSnapshotError::MissingSection("snapshot"))?;
    let meta = snapshot
        .get("meta")
        .ok_or(MalformedSnapshotError::MissingSection("snapshot.meta"))?;

    let node_fields = string_array(meta.get("node_fields"), "snapshot.meta.node_fields")?;
    let edge_fields = string_array(meta.get("edge_fields"), "snapshot.meta.edge_fields")?;
    let node_type_table = type_table(meta.get("node_types"), "snapshot.meta.node_types")?;
    let edge_type_table = type_table(meta.get("edge_types"), "snapshot.meta.edge_types")?;
    let strings = string_array(doc.get("strings"), "strings")?;

    let nodes_flat = int_array(doc.get("nodes"), "nodes")?;
    let edges_flat = int_array(doc.get("edges"), "edges")?;

    let node_layout = NodeLayout {
        type_idx: find_field(&node_fields, "type", "nodes")?,
        name_idx: find_field(&node_fields, "name", "nodes")?,
        id_idx: find_field(&node_fields, "id", "nodes")?,
        self_size_idx: find_field(&node_fields, "self_size", "nodes")?,
        edge_count_idx: find_field(&node_fields, "edge_count", "nodes")?,
        retained_size_idx: node_fields.iter().position(|f| f == "retained_size"),
        width: node_fields.len(),
    };
    let edge_layout = EdgeLayout {
        type_idx: find_field(&edge_fields, "type", "edges")?,
        name_or_index_idx: find_field(&edge_fields, "name_or_index", "edges")?,
        to_node_idx: find_field(&edge_fields, "to_node", "edges")?,
        width: edge_fields.len(),
    };

    let (nodes, edge_counts) = parse_nodes(snapshot, &nodes_flat, &node_layout, &node_type_table, &strings)?;
    let edges = parse_edges(
        &edges_flat,
        &edge_layout,
        &edge_type_table,
        &strings,
        &nodes,
        &edge_counts,
        node_layout.width,
    )?;

    Ok(HeapGraph::from_parts(nodes, edges))
}

fn parse_nodes(
    snapshot: &Value,
    nodes_flat: &[u64],
    layout: &NodeLayout,
    type_table: &[String],
    strings: &[String],
) -> Result<(Vec<HeapNode>, Vec<usize>), MalformedSnapshotError> {
    if nodes_flat.len() % layout.width != 0 {
        return Err(MalformedSnapshotError::NodeFieldMismatch {
            fields: layout.width,
            actual: nodes_flat.len(),
        });
    }
    let parsed_count = nodes_flat.len() / layout.width;

    if let Some(declared) = snapshot.get("node_count").and_then(Value::as_u64) {
        if declared as usize != parsed_count {
            return Err(MalformedSnapshotError::NodeCountMismatch {
                declared: declared as usize,
                parsed: parsed_count,
            });
        }
    }

    let mut nodes = Vec::with_capacity(parsed_count);
    let mut edge_counts = Vec::with_capacity(parsed_count);

    for i in 0..parsed_count {
        let base = i * layout.width;
        let record = &nodes_flat[base..base + layout.width];

        let type_value = record[layout.type_idx] as usize;
        let node_type = match type_table.get(type_value) {
            Some(label) => label.clone(),
            None => {
                warn!("node type {} outside declared table", type_value);
                "unknown".to_string()
            }
        };

        let name_value = record[layout.name_idx] as usize;
        let name = strings
            .get(name_value)
            .cloned()
            .ok_or(MalformedSnapshotError::StringIndexOutOfRange(name_value))?;

        edge_counts.push(record[layout.edge_count_idx] as usize);
        nodes.push(HeapNode {
            id: record[layout.id_idx],
            node_type,
            name,
            self_size: record[layout.self_size_idx],
            retained_size: layout.retained_size_idx.map(|idx| record[idx]),
        });
    }

    Ok((nodes, edge_counts))
}

fn parse_edges(
    edges_flat: &[u64],
    layout: &EdgeLayout,
    type_table: &[String],
    strings: &[String],
    nodes: &[HeapNode],
    edge_counts: &[usize],
    node_width: usize,
) -> Result<Vec<HeapEdge>, MalformedSnapshotError> {
    if edges_flat.len() % layout.width != 0 {
        return Err(MalformedSnapshotError::EdgeFieldMismatch {
            fields: layout.width,
            actual: edges_flat.len(),
        });
    }
    let parsed_count = edges_flat.len() / layout.width;
    let declared_count: usize = edge_counts.iter().sum();
    if declared_count != parsed_count {
        return Err(MalformedSnapshotError::EdgeCountMismatch {
            declared: declared_count,
            parsed: parsed_count,
        });
    }

    let mut edges = Vec::with_capacity(parsed_count);
    let mut cursor = 0usize;

    for (node_offset, &count) in edge_counts.iter().enumerate() {
        let from_id = nodes[node_offset].id;
        for _ in 0..count {
            let base = cursor * layout.width;
            let record = &edges_flat[base..base + layout.width];

            let type_value = record[layout.type_idx] as usize;
            let kind = match type_table.get(type_value).map(String::as_str) {
                Some(label) => EdgeKind::from_label(label).unwrap_or_else(|| {
                    warn!("unrecognized edge type label: {}", label);
                    EdgeKind::Internal
                }),
                None => {
                    warn!("edge type {} outside declared table", type_value);
                    EdgeKind::Internal
                }
            };

            let label_value = record[layout.name_or_index_idx];
            let name_or_index = match kind {
                EdgeKind::Element | EdgeKind::Hidden => EdgeLabel::Index(label_value as u32),
                _ => {
                    let idx = label_value as usize;
                    EdgeLabel::Name(
                        strings
                            .get(idx)
                            .cloned()
                            .ok_or(MalformedSnapshotError::StringIndexOutOfRange(idx))?,
                    )
                }
            };

            // to_node is a flat offset into the node array
            let to_offset_raw = record[layout.to_node_idx] as usize;
            if to_offset_raw % node_width != 0 || to_offset_raw / node_width >= nodes.len() {
                return Err(MalformedSnapshotError::EdgeTargetOutOfRange {
                    edge_index: cursor,
                    offset: to_offset_raw,
                });
            }
            let to_id = nodes[to_offset_raw / node_width].id;

            edges.push(HeapEdge {
                from_id,
                to_id,
                kind,
                name_or_index,
            });
            cursor += 1;
        }
    }

    Ok(edges)
}

fn find_field(
    fields: &[String],
    field: &'static str,
    section: &'static str,
) -> Result<usize, MalformedSnapshotError> {
    fields
        .iter()
        .position(|f| f == field)
        .ok_or(MalformedSnapshotError::MissingField { section, field })
}

fn string_array(
    value: Option<&Value>,
    section: &'static str,
) -> Result<Vec<String>, MalformedSnapshotError> {
    let array = value
        .and_then(Value::as_array)
        .ok_or(MalformedSnapshotError::MissingSection(section))?;
    array
        .iter()
        .enumerate()
        .map(|(offset, v)| {
            v.as_str()
                .map(str::to_owned)
                .ok_or(MalformedSnapshotError::NonStringField { section, offset })
        })
        .collect()
}

/// First entry of a type declaration is the table of labels; the remaining
/// entries describe field value types and are not needed here
fn type_table(
    value: Option<&Value>,
    section: &'static str,
) -> Result<Vec<String>, MalformedSnapshotError> {
    let first = value
        .and_then(Value::as_array)
        .and_then(|outer| outer.first())
        .and_then(Value::as_array)
        .ok_or(MalformedSnapshotError::MissingSection(section))?;
    first
        .iter()
        .enumerate()
        .map(|(offset, v)| {
            v.as_str()
                .map(str::to_owned)
                .ok_or(MalformedSnapshotError::NonStringField { section, offset })
        })
        .collect()
}

fn int_array(value: Option<&Value>, section: &'static str) -> Result<Vec<u64>, MalformedSnapshotError> {
    let array = value
        .and_then(Value::as_array)
        .ok_or(MalformedSnapshotError::MissingSection(section))?;
    array
        .iter()
        .enumerate()
        .map(|(offset, v)| {
            v.as_u64()
                .ok_or(MalformedSnapshotError::NonIntegerField { section, offset })
        })
        .collect()
}
