//! Capture sessions
//!
//! One [`CaptureSession`] value holds everything captured during one
//! debugging run: the memory timeline, the screenshot pair, and the error
//! buckets. It is created per run and passed explicitly into analysis;
//! there is no process-wide monitor object or other hidden global state.

use diag_types::domains::events::ErrorEvent;
use diag_types::domains::heap::{MemorySample, MemoryTimeline};
use diag_types::domains::visual::PixelImage;
use diag_types::{CaptureId, DiagError};
use error_aggregator::ErrorAggregator;
use snapshot_ingester::{SnapshotAssembler, SnapshotIngester};
use tracing::debug;

use crate::DiagnosticsConfig;

/// All artifacts captured during one debugging run
pub struct CaptureSession {
    id: CaptureId,
    started_at_ms: u64,
    ingester: SnapshotIngester,
    assembler: SnapshotAssembler,
    timeline: MemoryTimeline,
    baseline: Option<PixelImage>,
    candidate: Option<PixelImage>,
    errors: ErrorAggregator,
}

impl CaptureSession {
    /// Start a new session under the given configuration
    pub fn new(config: &DiagnosticsConfig, started_at_ms: u64) -> Self {
        let id = CaptureId::new();
        debug!("starting capture session {}", id);
        Self {
            id,
            started_at_ms,
            ingester: SnapshotIngester::with_config(config.ingester.clone()),
            assembler: SnapshotAssembler::new(config.ingester.max_snapshot_bytes),
            timeline: MemoryTimeline::new(),
            baseline: None,
            candidate: None,
            errors: ErrorAggregator::with_config(config.aggregator.clone()),
        }
    }

    /// This session's id
    pub fn id(&self) -> CaptureId {
        self.id
    }

    /// When the session started, in epoch milliseconds
    pub fn started_at_ms(&self) -> u64 {
        self.started_at_ms
    }

    /// The memory timeline captured so far
    pub fn timeline(&self) -> &MemoryTimeline {
        &self.timeline
    }

    /// The error aggregator backing this session
    pub fn errors(&self) -> &ErrorAggregator {
        &self.errors
    }

    /// The captured baseline screenshot, if any
    pub fn baseline(&self) -> Option<&PixelImage> {
        self.baseline.as_ref()
    }

    /// The captured candidate screenshot, if any
    pub fn candidate(&self) -> Option<&PixelImage> {
        self.candidate.as_ref()
    }

    /// Parse a complete raw snapshot document into the timeline
    pub fn record_snapshot(&mut self, raw: &[u8], timestamp_ms: u64) -> Result<(), DiagError> {
        let sample = self.ingester.sample(raw, timestamp_ms)?;
        self.push_sample(sample)
    }

    /// Buffer one fragment of a chunked snapshot capture
    pub fn add_snapshot_chunk(
        &self,
        snapshot: CaptureId,
        sequence: u32,
        data: Vec<u8>,
    ) -> Result<(), DiagError> {
        self.assembler.add_chunk(snapshot, sequence, data)
    }

    /// Reassemble a chunked capture and parse it into the timeline
    pub fn complete_snapshot(
        &mut self,
        snapshot: CaptureId,
        timestamp_ms: u64,
    ) -> Result<(), DiagError> {
        let raw = self.assembler.finish(snapshot)?;
        self.record_snapshot(&raw, timestamp_ms)
    }

    /// Append an already-built sample to the timeline
    pub fn push_sample(&mut self, sample: MemorySample) -> Result<(), DiagError> {
        debug!(
            "session {}: sample at {}ms, {} bytes used",
            self.id, sample.timestamp_ms, sample.used_size
        );
        self.timeline.push(sample)
    }

    /// Set the baseline screenshot for visual comparison
    pub fn set_baseline(&mut self, image: PixelImage) {
        self.baseline = Some(image);
    }

    /// Set the candidate screenshot for visual comparison
    pub fn set_candidate(&mut self, image: PixelImage) {
        self.candidate = Some(image);
    }

    /// Ingest one error event
    ///
    /// Ingestion is single-writer: one capture stream feeds a session.
    /// Concurrent trend or pattern queries see a consistent snapshot.
    pub fn record_error(&self, event: ErrorEvent) {
        self.errors.ingest(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tiny_snapshot() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "snapshot": {
                "meta": {
                    "node_fields": ["type", "name", "id", "self_size", "edge_count"],
                    "node_types": [["object"], "string", "number", "number", "number"],
                    "edge_fields": ["type", "name_or_index", "to_node"],
                    "edge_types": [["property"], "string_or_number", "node"]
                }
            },
            "nodes": [0, 0, 1, 1024, 0],
            "edges": [],
            "strings": ["Window"]
        }))
        .unwrap()
    }

    #[test]
    fn test_sessions_get_unique_ids() {
        let config = DiagnosticsConfig::default();
        let a = CaptureSession::new(&config, 0);
        let b = CaptureSession::new(&config, 0);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_record_snapshot_extends_timeline() {
        let config = DiagnosticsConfig::default();
        let mut session = CaptureSession::new(&config, 0);

        session.record_snapshot(&tiny_snapshot(), 1_000).unwrap();
        session.record_snapshot(&tiny_snapshot(), 2_000).unwrap();

        assert_eq!(session.timeline().len(), 2);
        assert_eq!(session.timeline().samples()[0].used_size, 1024);
    }

    #[test]
    fn test_out_of_order_snapshot_rejected() {
        let config = DiagnosticsConfig::default();
        let mut session = CaptureSession::new(&config, 0);

        session.record_snapshot(&tiny_snapshot(), 2_000).unwrap();
        let err = session
            .record_snapshot(&tiny_snapshot(), 1_000)
            .unwrap_err();
        assert!(matches!(err, DiagError::NonMonotonicTimeline { .. }));
    }

    #[test]
    fn test_chunked_snapshot_roundtrip() {
        let config = DiagnosticsConfig::default();
        let mut session = CaptureSession::new(&config, 0);

        let raw = tiny_snapshot();
        let mid = raw.len() / 2;
        let snapshot = CaptureId::new();

        session
            .add_snapshot_chunk(snapshot, 1, raw[mid..].to_vec())
            .unwrap();
        session
            .add_snapshot_chunk(snapshot, 0, raw[..mid].to_vec())
            .unwrap();
        session.complete_snapshot(snapshot, 1_000).unwrap();

        assert_eq!(session.timeline().len(), 1);
    }

    #[test]
    fn test_errors_flow_into_aggregator() {
        let config = DiagnosticsConfig::default();
        let session = CaptureSession::new(&config, 0);

        session.record_error(ErrorEvent::new("boom", 1_000).with_source("a.js", 1));
        assert_eq!(session.errors().event_count(), 1);
    }
}
