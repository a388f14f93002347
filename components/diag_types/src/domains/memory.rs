// Memory-leak domain types

use crate::{Confidence, Severity};
use serde::{Deserialize, Serialize};

/// Classification of a heap node's role
///
/// Produced by a single pure classification function rather than string
/// checks scattered through the detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeClass {
    /// DOM node attached to the document
    Dom,
    /// Function closure
    Closure,
    /// DOM node detached from the document but retained by script
    Detached,
    /// Anything else
    Other,
}

/// A node classification with the strength of the evidence behind it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// The inferred role
    pub class: NodeClass,
    /// Heuristic confidence in [0, 1]
    pub score: f64,
}

/// Heap growth measurement over a memory timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthResult {
    /// Growth between first and last sample in bytes (negative = shrank)
    pub absolute_growth: i64,
    /// Growth as a percentage of the first sample
    pub percent_growth: f64,
    /// Growth rate in bytes per second over the timeline span
    pub rate_bytes_per_second: f64,
    /// Fraction of consecutive sample pairs that grew, in [0, 1]
    pub consistency: f64,
    /// Whether the growth pattern looks like a leak
    pub is_leak: bool,
}

impl GrowthResult {
    /// A zero result for timelines too short to measure
    pub fn empty() -> Self {
        Self {
            absolute_growth: 0,
            percent_growth: 0.0,
            rate_bytes_per_second: 0.0,
            consistency: 0.0,
            is_leak: false,
        }
    }
}

/// A connected cluster of nodes retained through a detached root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachedSubgraph {
    /// The detached node the cluster was discovered from
    pub root_id: u64,
    /// Display name of the root node
    pub root_name: String,
    /// Ids of every node in the cluster, root included
    pub node_ids: Vec<u64>,
    /// Sum of self sizes over the cluster in bytes
    pub retained_bytes: u64,
    /// Provenance of the size figure
    pub confidence: Confidence,
}

/// A closure whose size exceeds the configured threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureLeak {
    /// Heap node id of the closure
    pub node_id: u64,
    /// Function name recorded by the profiler
    pub name: String,
    /// Size used for the comparison, in bytes
    pub size_bytes: u64,
    /// Whether `size_bytes` is retained (exact) or shallow (heuristic)
    pub confidence: Confidence,
}

/// One finding produced by the leak detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LeakFinding {
    /// Heap usage grew consistently across the timeline
    #[serde(rename_all = "camelCase")]
    HeapGrowth {
        /// The growth measurement
        result: GrowthResult,
        /// Severity assigned by the detector
        severity: Severity,
        /// Provenance of the measurement
        confidence: Confidence,
    },
    /// A detached DOM subtree is still retained by script
    #[serde(rename_all = "camelCase")]
    DetachedSubgraph {
        /// The retained cluster
        subgraph: DetachedSubgraph,
        /// Severity assigned by the detector
        severity: Severity,
        /// Provenance of the size figure
        confidence: Confidence,
    },
    /// A closure holds more memory than the configured threshold
    #[serde(rename_all = "camelCase")]
    OversizedClosure {
        /// The offending closure
        closure: ClosureLeak,
        /// Severity assigned by the detector
        severity: Severity,
        /// Provenance of the size figure
        confidence: Confidence,
    },
}

impl LeakFinding {
    /// Severity of this finding
    pub fn severity(&self) -> Severity {
        match self {
            LeakFinding::HeapGrowth { severity, .. }
            | LeakFinding::DetachedSubgraph { severity, .. }
            | LeakFinding::OversizedClosure { severity, .. } => *severity,
        }
    }

    /// Provenance of this finding
    pub fn confidence(&self) -> Confidence {
        match self {
            LeakFinding::HeapGrowth { confidence, .. }
            | LeakFinding::DetachedSubgraph { confidence, .. }
            | LeakFinding::OversizedClosure { confidence, .. } => *confidence,
        }
    }

    /// Bytes implicated by this finding, for impact weighting
    pub fn impact_bytes(&self) -> u64 {
        match self {
            LeakFinding::HeapGrowth { result, .. } => result.absolute_growth.max(0) as u64,
            LeakFinding::DetachedSubgraph { subgraph, .. } => subgraph.retained_bytes,
            LeakFinding::OversizedClosure { closure, .. } => closure.size_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finding_accessors() {
        let finding = LeakFinding::OversizedClosure {
            closure: ClosureLeak {
                node_id: 7,
                name: "bigClosure".to_string(),
                size_bytes: 4096,
                confidence: Confidence::Heuristic,
            },
            severity: Severity::Moderate,
            confidence: Confidence::Heuristic,
        };

        assert_eq!(finding.severity(), Severity::Moderate);
        assert_eq!(finding.confidence(), Confidence::Heuristic);
        assert_eq!(finding.impact_bytes(), 4096);
    }

    #[test]
    fn test_finding_serialization_tags_kind() {
        let finding = LeakFinding::HeapGrowth {
            result: GrowthResult::empty(),
            severity: Severity::None,
            confidence: Confidence::Exact,
        };
        let json = serde_json::to_string(&finding).unwrap();
        assert!(json.contains("\"kind\":\"heapGrowth\""));
    }

    #[test]
    fn test_negative_growth_has_zero_impact() {
        let finding = LeakFinding::HeapGrowth {
            result: GrowthResult {
                absolute_growth: -1024,
                percent_growth: -5.0,
                rate_bytes_per_second: -10.0,
                consistency: 0.0,
                is_leak: false,
            },
            severity: Severity::None,
            confidence: Confidence::Exact,
        };
        assert_eq!(finding.impact_bytes(), 0);
    }
}
