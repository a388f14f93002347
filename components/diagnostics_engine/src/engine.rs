//! Main diagnostics engine implementation

use crate::{ArtifactSource, CaptureSession, DiagnosticsConfig, EngineError, Result};
use diag_types::domains::report::DiagnosticReport;
use diag_types::{DiagError, SectionOutcome};
use image_diff::ImageDiffEngine;
use leak_detector::LeakDetector;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Orchestrates one diagnostics run: capture, per-domain analysis, synthesis
///
/// The engine owns the configured detectors and drives them over a
/// [`CaptureSession`]. Each sub-analysis is isolated: a failure in one is
/// recorded in the report's section map and never aborts the siblings.
///
/// # Example
///
/// ```
/// use diagnostics_engine::{DiagnosticsEngine, DiagnosticsConfig};
///
/// let engine = DiagnosticsEngine::new(DiagnosticsConfig::default());
/// let session = engine.start_session();
/// // ... capture artifacts into the session ...
/// let report = engine.analyze(&session);
/// assert!(report.is_partial()); // nothing was captured
/// ```
pub struct DiagnosticsEngine {
    /// Configuration for this engine
    config: DiagnosticsConfig,
    /// Memory-leak detector
    leak_detector: LeakDetector,
    /// Screenshot comparator
    image_diff: ImageDiffEngine,
}

impl DiagnosticsEngine {
    /// Create an engine with the given configuration
    pub fn new(config: DiagnosticsConfig) -> Self {
        debug!("creating diagnostics engine");
        let leak_detector = LeakDetector::with_config(config.leak.clone());
        let image_diff = ImageDiffEngine::with_config(config.diff.clone());
        Self {
            config,
            leak_detector,
            image_diff,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    /// Start a fresh capture session for one debugging run
    pub fn start_session(&self) -> CaptureSession {
        CaptureSession::new(&self.config, now_ms())
    }

    /// Capture one memory sample from the source into the session
    pub async fn capture_sample(
        &self,
        session: &mut CaptureSession,
        source: &dyn ArtifactSource,
    ) -> Result<()> {
        let raw = source
            .heap_snapshot()
            .await
            .map_err(|e| EngineError::Capture(e.to_string()))?;
        // Rapid captures can land on the same millisecond; nudge the stamp
        // forward so the timeline stays strictly increasing
        let timestamp_ms = session
            .timeline()
            .samples()
            .last()
            .map(|s| s.timestamp_ms + 1)
            .map_or_else(now_ms, |floor| now_ms().max(floor));
        session.record_snapshot(&raw, timestamp_ms)?;
        Ok(())
    }

    /// Capture the baseline screenshot into the session
    pub async fn capture_baseline(
        &self,
        session: &mut CaptureSession,
        source: &dyn ArtifactSource,
    ) -> Result<()> {
        let image = source
            .screenshot()
            .await
            .map_err(|e| EngineError::Capture(e.to_string()))?;
        session.set_baseline(image);
        Ok(())
    }

    /// Capture the candidate screenshot into the session
    pub async fn capture_candidate(
        &self,
        session: &mut CaptureSession,
        source: &dyn ArtifactSource,
    ) -> Result<()> {
        let image = source
            .screenshot()
            .await
            .map_err(|e| EngineError::Capture(e.to_string()))?;
        session.set_candidate(image);
        Ok(())
    }

    /// Drain pending error events from the source into the session
    pub async fn capture_errors(
        &self,
        session: &CaptureSession,
        source: &dyn ArtifactSource,
    ) -> Result<usize> {
        let events = source
            .drain_errors()
            .await
            .map_err(|e| EngineError::Capture(e.to_string()))?;
        let count = events.len();
        for event in events {
            session.record_error(event);
        }
        Ok(count)
    }

    /// Analyze everything the session captured into one report
    ///
    /// Always returns a report: sub-analyses whose inputs were never
    /// captured are marked skipped, and ones that failed are marked failed
    /// with the reason, so a partial report is produced instead of nothing.
    pub fn analyze(&self, session: &CaptureSession) -> DiagnosticReport {
        info!("analyzing capture session {}", session.id());

        let leaks = if session.timeline().is_empty() {
            SectionOutcome::Skipped("no heap snapshots captured".to_string())
        } else {
            outcome(self.leak_detector.analyze(session.timeline()))
        };

        let visual = match (session.baseline(), session.candidate()) {
            (Some(baseline), Some(candidate)) => {
                outcome(self.image_diff.compare(baseline, candidate))
            }
            _ => SectionOutcome::Skipped("screenshot pair not captured".to_string()),
        };

        let errors = SectionOutcome::Completed(
            session
                .errors()
                .compute_trends(self.config.trend_window_ms),
        );

        report_synthesizer::merge(leaks, visual, errors, &self.config.synthesis, now_ms())
    }
}

/// Map a sub-analysis result onto its report outcome
///
/// Exceeding a resource budget means the analysis never ran to completion
/// over its input, so it surfaces as skipped; everything else is a failure.
fn outcome<T>(result: std::result::Result<T, DiagError>) -> SectionOutcome<T> {
    match result {
        Ok(value) => SectionOutcome::Completed(value),
        Err(DiagError::ResourceExhausted { budget, needed }) => {
            warn!("sub-analysis skipped: budget {} < {}", budget, needed);
            SectionOutcome::Skipped(
                DiagError::ResourceExhausted { budget, needed }.to_string(),
            )
        }
        Err(err) => {
            warn!("sub-analysis failed: {}", err);
            SectionOutcome::Failed(err.to_string())
        }
    }
}

/// Current wall clock in epoch milliseconds
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
