//! Additional unit tests for leak detector components

use diag_types::domains::heap::{
    EdgeKind, EdgeLabel, HeapEdge, HeapGraph, HeapNode, MemorySample, MemoryTimeline,
};
use diag_types::domains::memory::{LeakFinding, NodeClass};
use diag_types::Severity;
use leak_detector::*;
use pretty_assertions::assert_eq;

fn node(id: u64, node_type: &str, name: &str, size: u64) -> HeapNode {
    HeapNode {
        id,
        node_type: node_type.to_string(),
        name: name.to_string(),
        self_size: size,
        retained_size: None,
    }
}

#[test]
fn test_default_thresholds() {
    let config = LeakDetectorConfig::default();
    assert_eq!(config.growth.percent_threshold, 10.0);
    assert_eq!(config.growth.consistency_ratio, 0.7);
    assert_eq!(config.detached.max_reported, 10);
    assert_eq!(config.closure_threshold_bytes, 1024 * 1024);
}

#[test]
fn test_classification_is_pure_and_tagged() {
    let detached = node(1, "native", "Detached HTMLCanvasElement", 10);
    let first = classify_node(&detached);
    let second = classify_node(&detached);

    assert_eq!(first.class, NodeClass::Detached);
    assert_eq!(first.class, second.class);
    assert_eq!(first.score, second.score);
    assert!(first.score > 0.0 && first.score <= 1.0);
}

#[test]
fn test_consistency_gate_rejects_spiky_growth() {
    // 60% total growth, but it alternates up and down
    let samples = [10, 14, 11, 15, 12, 16]
        .iter()
        .enumerate()
        .map(|(i, &mb)| MemorySample {
            timestamp_ms: 1_000 * (i as u64 + 1),
            used_size: mb * 1024 * 1024,
            node_count: 1,
            graph: None,
        })
        .collect();
    let timeline = MemoryTimeline::from_samples(samples).unwrap();

    let result = detect_growth(&timeline, &GrowthThresholds::default());
    assert!(result.percent_growth > 10.0);
    assert!(result.consistency <= 0.7);
    assert!(!result.is_leak);
}

#[test]
fn test_custom_consistency_ratio_is_honored() {
    let samples = [10, 14, 11, 15, 12, 16]
        .iter()
        .enumerate()
        .map(|(i, &mb)| MemorySample {
            timestamp_ms: 1_000 * (i as u64 + 1),
            used_size: mb * 1024 * 1024,
            node_count: 1,
            graph: None,
        })
        .collect();
    let timeline = MemoryTimeline::from_samples(samples).unwrap();

    let lenient = GrowthThresholds {
        percent_threshold: 10.0,
        consistency_ratio: 0.5,
    };
    assert!(detect_growth(&timeline, &lenient).is_leak);
}

#[test]
fn test_detached_analysis_respects_top_n() {
    let nodes: Vec<HeapNode> = (0..20)
        .map(|i| {
            node(
                i + 1,
                "native",
                "Detached HTMLDivElement",
                (i as u64 + 1) * 1024,
            )
        })
        .collect();
    let graph = HeapGraph::from_parts(nodes, vec![]);

    let config = DetachedConfig {
        max_reported: 5,
        min_retained_bytes: 0,
    };
    let clusters = find_detached_subgraphs(&graph, &config).unwrap();

    assert_eq!(clusters.len(), 5);
    assert_eq!(clusters[0].retained_bytes, 20 * 1024);
}

#[test]
fn test_analyze_graph_surfaces_severities() {
    let graph = HeapGraph::from_parts(
        vec![
            node(1, "native", "Detached HTMLDivElement", 2 * 1024 * 1024),
            node(2, "native", "Detached HTMLImageElement", 150 * 1024),
            node(3, "closure", "smallClosure", 10),
        ],
        vec![],
    );

    let detector = LeakDetector::new();
    let findings = detector.analyze_graph(&graph).unwrap();

    let severities: Vec<Severity> = findings.iter().map(LeakFinding::severity).collect();
    assert!(severities.contains(&Severity::Major));
    assert!(severities.contains(&Severity::Moderate));
    // The tiny closure is below the byte threshold and never reported
    assert!(findings
        .iter()
        .all(|f| !matches!(f, LeakFinding::OversizedClosure { .. })));
}

#[test]
fn test_dangling_edge_reported_with_node_id() {
    let graph = HeapGraph::from_parts(
        vec![node(1, "native", "Detached HTMLDivElement", 64)],
        vec![HeapEdge {
            from_id: 1,
            to_id: 777,
            kind: EdgeKind::Property,
            name_or_index: EdgeLabel::Name("gone".to_string()),
        }],
    );

    let detector = LeakDetector::new();
    let err = detector.analyze_graph(&graph).unwrap_err();
    assert!(err.to_string().contains("777"));
}
