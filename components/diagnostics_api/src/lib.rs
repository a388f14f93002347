//! Public API for CortenBrowser runtime diagnostics
//!
//! This module provides a simple, ergonomic API for running a diagnostics
//! pass over a live target. It wraps the lower-level `diagnostics_engine`
//! with a clean public interface.
//!
//! # Example
//!
//! ```no_run
//! use diagnostics_api::{Diagnostics, DiagnosticsConfig};
//!
//! # async fn run(source: impl diagnostics_api::ArtifactSource) -> anyhow::Result<()> {
//! let diagnostics = Diagnostics::new(DiagnosticsConfig::default());
//!
//! // Capture five settled memory samples plus the screenshot pair and
//! // whatever errors the page emitted, then analyze the lot.
//! let report = diagnostics.collect_and_analyze(&source, 5).await?;
//! println!("overall severity: {:?}", report.overall_severity);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Re-export public types from diagnostics_engine
pub use diagnostics_engine::{
    ArtifactSource, CaptureSession, DiagnosticsConfig, DiagnosticsConfigBuilder, EngineError,
    Result,
};

pub use diag_types::domains::report::DiagnosticReport;
pub use diag_types::{Confidence, SectionStatus, Severity};

use diagnostics_engine::DiagnosticsEngine;

/// Main diagnostics public API
///
/// This is the primary interface for running runtime diagnostics. It
/// provides a simplified wrapper around the underlying DiagnosticsEngine.
pub struct Diagnostics {
    engine: DiagnosticsEngine,
}

impl Diagnostics {
    /// Create a new Diagnostics instance with the given configuration
    ///
    /// # Example
    ///
    /// ```
    /// use diagnostics_api::{Diagnostics, DiagnosticsConfig};
    ///
    /// let diagnostics = Diagnostics::new(DiagnosticsConfig::default());
    /// ```
    pub fn new(config: DiagnosticsConfig) -> Self {
        Self {
            engine: DiagnosticsEngine::new(config),
        }
    }

    /// Start a capture session for manual artifact collection
    ///
    /// Use this when the caller wants to drive capture itself (e.g. feed
    /// chunked snapshots or push error events one at a time) and call
    /// [`Diagnostics::analyze`] when done.
    pub fn start_session(&self) -> CaptureSession {
        self.engine.start_session()
    }

    /// Analyze a session's captured artifacts into a report
    ///
    /// Always produces a report; sections whose artifacts were never
    /// captured or whose analysis failed are marked rather than omitted.
    pub fn analyze(&self, session: &CaptureSession) -> DiagnosticReport {
        self.engine.analyze(session)
    }

    /// Run one full capture-and-analyze pass against a live source
    ///
    /// Captures a baseline screenshot, `sample_count` settled memory
    /// samples with error draining between them, and a candidate
    /// screenshot, then analyzes everything.
    pub async fn collect_and_analyze(
        &self,
        source: &impl ArtifactSource,
        sample_count: usize,
    ) -> Result<DiagnosticReport> {
        let mut session = self.engine.start_session();

        self.engine.capture_baseline(&mut session, source).await?;
        for _ in 0..sample_count {
            self.engine.capture_sample(&mut session, source).await?;
            self.engine.capture_errors(&session, source).await?;
        }
        self.engine.capture_candidate(&mut session, source).await?;

        Ok(self.engine.analyze(&session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use diag_types::domains::events::ErrorEvent;
    use diag_types::domains::visual::PixelImage;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Source whose heap grows by 1KB per capture
    struct GrowingSource {
        captures: AtomicU64,
    }

    #[async_trait]
    impl ArtifactSource for GrowingSource {
        async fn heap_snapshot(&self) -> anyhow::Result<Vec<u8>> {
            let n = self.captures.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::to_vec(&json!({
                "snapshot": {
                    "meta": {
                        "node_fields": ["type", "name", "id", "self_size", "edge_count"],
                        "node_types": [["object"], "string", "number", "number", "number"],
                        "edge_fields": ["type", "name_or_index", "to_node"],
                        "edge_types": [["property"], "string_or_number", "node"]
                    }
                },
                "nodes": [0, 0, 1, 4096 + n * 1024, 0],
                "edges": [],
                "strings": ["Window"]
            }))?)
        }

        async fn screenshot(&self) -> anyhow::Result<PixelImage> {
            Ok(PixelImage::solid(20, 20, [255, 255, 255, 255]))
        }

        async fn drain_errors(&self) -> anyhow::Result<Vec<ErrorEvent>> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_diagnostics_new_with_default_config() {
        let _diagnostics = Diagnostics::new(DiagnosticsConfig::default());
    }

    #[test]
    fn test_manual_session_analysis() {
        let diagnostics = Diagnostics::new(DiagnosticsConfig::default());
        let session = diagnostics.start_session();

        let report = diagnostics.analyze(&session);
        assert!(report.is_partial());
    }

    #[tokio::test]
    async fn test_collect_and_analyze_full_pass() {
        let diagnostics = Diagnostics::new(DiagnosticsConfig::default());
        let source = GrowingSource {
            captures: AtomicU64::new(0),
        };

        let report = diagnostics.collect_and_analyze(&source, 4).await.unwrap();

        assert!(report.sections.memory.is_completed());
        assert!(report.sections.visual.is_completed());
        assert!(report.sections.errors.is_completed());
        // Identical screenshots: no visual findings
        assert!(report.hotspots.is_empty());
        // 4KB -> 7KB is steady 75% growth: flagged as a leak
        assert!(!report.leak_findings.is_empty());
    }

    #[test]
    fn test_config_reexport() {
        let _config: DiagnosticsConfig = DiagnosticsConfig::default();
    }
}
