//! Report synthesis
//!
//! Merges the outputs of the three detectors into one severity-ranked
//! [`DiagnosticReport`]. `merge` is a pure function: identical inputs always
//! produce an identical report, which is what makes regression tests over
//! stored analysis runs reproducible. A failed or skipped sub-analysis is
//! marked in the report's section map; it never suppresses the report.

mod severity;

use diag_types::domains::events::ErrorTrend;
use diag_types::domains::memory::LeakFinding;
use diag_types::domains::report::{DiagnosticReport, ReportDomain, ReportSections};
use diag_types::domains::visual::DiffResult;
use diag_types::{SectionOutcome, Severity};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for report synthesis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisConfig {
    /// Weight of memory impact in severity tie-breaking
    pub leak_weight: f64,
    /// Weight of visual impact in severity tie-breaking
    pub visual_weight: f64,
    /// Weight of error impact in severity tie-breaking
    pub error_weight: f64,
    /// Rising trends at or past this percent change are major
    pub error_major_percent: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            leak_weight: 1.0,
            visual_weight: 1.0,
            error_weight: 1.0,
            error_major_percent: 50.0,
        }
    }
}

/// Merge detector outcomes into one diagnostic report
///
/// The caller supplies `generated_at_ms` so the function stays pure; the
/// orchestration layer stamps it with the wall clock.
pub fn merge(
    leaks: SectionOutcome<Vec<LeakFinding>>,
    visual: SectionOutcome<DiffResult>,
    errors: SectionOutcome<Vec<ErrorTrend>>,
    config: &SynthesisConfig,
    generated_at_ms: u64,
) -> DiagnosticReport {
    let sections = ReportSections {
        memory: leaks.status(),
        visual: visual.status(),
        errors: errors.status(),
    };

    let mut leak_findings = leaks.completed().cloned().unwrap_or_default();
    leak_findings.sort_by(|a, b| {
        b.severity()
            .cmp(&a.severity())
            .then(b.impact_bytes().cmp(&a.impact_bytes()))
    });

    let diff_result = visual.completed();
    let mut hotspots = diff_result.map(|r| r.hotspots.clone()).unwrap_or_default();
    hotspots.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then(b.pixel_count.cmp(&a.pixel_count))
    });

    let mut error_trends = errors.completed().cloned().unwrap_or_default();
    error_trends.sort_by(|a, b| {
        b.percent_change
            .abs()
            .partial_cmp(&a.percent_change.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.fingerprint.0.cmp(&b.fingerprint.0))
    });

    // (domain, severity, weighted normalized impact) per completed section
    let scored = [
        (
            ReportDomain::Memory,
            severity::leak_severity(&leak_findings),
            config.leak_weight * severity::leak_impact(&leak_findings),
        ),
        (
            ReportDomain::Visual,
            diff_result.map(severity::visual_severity).unwrap_or(Severity::None),
            config.visual_weight
                * diff_result.map(severity::visual_impact).unwrap_or(0.0),
        ),
        (
            ReportDomain::Errors,
            severity::error_severity(&error_trends, config),
            config.error_weight * severity::error_impact(&error_trends),
        ),
    ];

    let overall_severity = scored
        .iter()
        .map(|(_, severity, _)| *severity)
        .max()
        .unwrap_or(Severity::None);

    let dominant_domain = if overall_severity == Severity::None {
        None
    } else {
        scored
            .iter()
            .filter(|(_, severity, _)| *severity == overall_severity)
            .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(domain, _, _)| *domain)
    };

    debug!(
        "synthesized report: severity {:?}, {} leak findings, {} hotspots, {} trends",
        overall_severity,
        leak_findings.len(),
        hotspots.len(),
        error_trends.len()
    );

    DiagnosticReport {
        leak_findings,
        hotspots,
        error_trends,
        overall_severity,
        dominant_domain,
        generated_at_ms,
        sections,
    }
}
