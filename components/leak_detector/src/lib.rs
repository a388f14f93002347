//! Memory-leak detection over ingested heap graphs
//!
//! Three independent analyses: heap growth across a sample timeline,
//! detached DOM subgraphs still retained by script, and closures holding
//! more memory than expected. All of them operate on immutable ingester
//! output and are pure, so callers may run them concurrently with the other
//! detectors.

mod classify;
mod closures;
mod detached;
mod growth;

pub use classify::classify_node;
pub use closures::find_oversized_closures;
pub use detached::{find_detached_subgraphs, DetachedConfig};
pub use growth::{detect_growth, GrowthThresholds};

use diag_types::domains::heap::{HeapGraph, MemoryTimeline};
use diag_types::domains::memory::LeakFinding;
use diag_types::{Confidence, DiagError, Severity};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Growth past this multiple of the percent threshold is critical
const CRITICAL_GROWTH_FACTOR: f64 = 5.0;
/// Detached clusters at or above this size are major findings
const DETACHED_MAJOR_BYTES: u64 = 1024 * 1024;
/// Detached clusters at or above this size are moderate findings
const DETACHED_MODERATE_BYTES: u64 = 100 * 1024;
/// Closures past this multiple of the closure threshold are major findings
const CLOSURE_MAJOR_FACTOR: u64 = 4;

/// Configuration for the leak detector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakDetectorConfig {
    /// Growth thresholds for the timeline analysis
    pub growth: GrowthThresholds,
    /// Detached-subgraph reporting limits
    pub detached: DetachedConfig,
    /// Closures above this many bytes are reported
    pub closure_threshold_bytes: u64,
}

impl Default for LeakDetectorConfig {
    fn default() -> Self {
        Self {
            growth: GrowthThresholds::default(),
            detached: DetachedConfig::default(),
            closure_threshold_bytes: 1024 * 1024,
        }
    }
}

/// Detects memory leaks in captured heap data
#[derive(Debug, Default)]
pub struct LeakDetector {
    config: LeakDetectorConfig,
}

impl LeakDetector {
    /// Create a detector with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with custom configuration
    pub fn with_config(config: LeakDetectorConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &LeakDetectorConfig {
        &self.config
    }

    /// Run every leak analysis over one capture session's heap data
    ///
    /// Growth is measured across the whole timeline; detached subgraphs and
    /// oversized closures are read from the most recent sample that kept its
    /// graph. Findings come back most severe first.
    pub fn analyze(&self, timeline: &MemoryTimeline) -> Result<Vec<LeakFinding>, DiagError> {
        let mut findings = Vec::new();

        let result = growth::detect_growth(timeline, &self.config.growth);
        if result.is_leak {
            let severity = if result.percent_growth
                >= self.config.growth.percent_threshold * CRITICAL_GROWTH_FACTOR
            {
                Severity::Critical
            } else {
                Severity::Major
            };
            findings.push(LeakFinding::HeapGrowth {
                result,
                severity,
                // Timeline aggregates come straight from the captures
                confidence: Confidence::Exact,
            });
        }

        if let Some(graph) = timeline
            .samples()
            .iter()
            .rev()
            .find_map(|sample| sample.graph.as_deref())
        {
            findings.extend(self.analyze_graph(graph)?);
        } else {
            debug!("no sample kept its graph; structural analyses skipped");
        }

        findings.sort_by(|a, b| {
            b.severity()
                .cmp(&a.severity())
                .then(b.impact_bytes().cmp(&a.impact_bytes()))
        });
        Ok(findings)
    }

    /// Run the structural analyses over a single graph
    pub fn analyze_graph(&self, graph: &HeapGraph) -> Result<Vec<LeakFinding>, DiagError> {
        let mut findings = Vec::new();

        for subgraph in detached::find_detached_subgraphs(graph, &self.config.detached)? {
            let severity = if subgraph.retained_bytes >= DETACHED_MAJOR_BYTES {
                Severity::Major
            } else if subgraph.retained_bytes >= DETACHED_MODERATE_BYTES {
                Severity::Moderate
            } else {
                Severity::Minor
            };
            let confidence = subgraph.confidence;
            findings.push(LeakFinding::DetachedSubgraph {
                subgraph,
                severity,
                confidence,
            });
        }

        for closure in
            closures::find_oversized_closures(graph, self.config.closure_threshold_bytes)
        {
            let severity = if closure.size_bytes
                >= self.config.closure_threshold_bytes * CLOSURE_MAJOR_FACTOR
            {
                Severity::Major
            } else {
                Severity::Moderate
            };
            let confidence = closure.confidence;
            findings.push(LeakFinding::OversizedClosure {
                closure,
                severity,
                confidence,
            });
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diag_types::domains::heap::{HeapNode, MemorySample};
    use std::sync::Arc;

    const MB: u64 = 1024 * 1024;

    fn leaky_graph() -> HeapGraph {
        HeapGraph::from_parts(
            vec![
                HeapNode {
                    id: 1,
                    node_type: "native".to_string(),
                    name: "Detached HTMLDivElement".to_string(),
                    self_size: 2 * MB,
                    retained_size: None,
                },
                HeapNode {
                    id: 2,
                    node_type: "closure".to_string(),
                    name: "cacheEverything".to_string(),
                    self_size: 64,
                    retained_size: Some(5 * MB),
                },
            ],
            vec![],
        )
    }

    fn leaky_timeline() -> MemoryTimeline {
        let graph = Arc::new(leaky_graph());
        let samples = (0..5u64)
            .map(|i| MemorySample {
                timestamp_ms: 1000 * (i + 1),
                used_size: 10 * MB + i * MB,
                node_count: 1000,
                graph: if i == 4 { Some(graph.clone()) } else { None },
            })
            .collect();
        MemoryTimeline::from_samples(samples).unwrap()
    }

    #[test]
    fn test_analyze_produces_all_finding_kinds() {
        let detector = LeakDetector::new();
        let findings = detector.analyze(&leaky_timeline()).unwrap();

        assert!(findings
            .iter()
            .any(|f| matches!(f, LeakFinding::HeapGrowth { .. })));
        assert!(findings
            .iter()
            .any(|f| matches!(f, LeakFinding::DetachedSubgraph { .. })));
        assert!(findings
            .iter()
            .any(|f| matches!(f, LeakFinding::OversizedClosure { .. })));
    }

    #[test]
    fn test_findings_sorted_by_severity() {
        let detector = LeakDetector::new();
        let findings = detector.analyze(&leaky_timeline()).unwrap();

        for pair in findings.windows(2) {
            assert!(pair[0].severity() >= pair[1].severity());
        }
    }

    #[test]
    fn test_flat_timeline_without_graph_yields_nothing() {
        let samples = (0..3u64)
            .map(|i| MemorySample {
                timestamp_ms: 1000 * (i + 1),
                used_size: 10 * MB,
                node_count: 1000,
                graph: None,
            })
            .collect();
        let timeline = MemoryTimeline::from_samples(samples).unwrap();

        let detector = LeakDetector::new();
        assert!(detector.analyze(&timeline).unwrap().is_empty());
    }

    #[test]
    fn test_runaway_growth_is_critical() {
        // 10MB -> 20MB: 100% growth, past 5x the 10% threshold
        let samples = (0..5u64)
            .map(|i| MemorySample {
                timestamp_ms: 1000 * (i + 1),
                used_size: 10 * MB + i * (25 * MB / 10),
                node_count: 1000,
                graph: None,
            })
            .collect();
        let timeline = MemoryTimeline::from_samples(samples).unwrap();

        let detector = LeakDetector::new();
        let findings = detector.analyze(&timeline).unwrap();
        assert_eq!(findings[0].severity(), Severity::Critical);
    }
}
