//! Severity derivation and impact scoring
//!
//! Each domain's severity comes from its own findings; the overall severity
//! is their maximum. When several domains tie at the maximum, a weighted sum
//! of normalized impact decides which one dominates the report.

use crate::SynthesisConfig;
use diag_types::domains::events::{ErrorTrend, TrendDirection};
use diag_types::domains::memory::LeakFinding;
use diag_types::domains::visual::DiffResult;
use diag_types::Severity;

/// Reference scale for leak impact: findings totalling this many bytes
/// saturate the normalized score
const LEAK_BYTES_REFERENCE: f64 = 16.0 * 1024.0 * 1024.0;
/// Reference scale for error impact: this many events in rising buckets
/// saturate the normalized score
const ERROR_EVENTS_REFERENCE: f64 = 100.0;

pub(crate) fn leak_severity(findings: &[LeakFinding]) -> Severity {
    findings
        .iter()
        .map(LeakFinding::severity)
        .max()
        .unwrap_or(Severity::None)
}

pub(crate) fn visual_severity(result: &DiffResult) -> Severity {
    result.max_severity()
}

/// Error severity from the trend profile: a steep rise is major, any rise
/// past the cutoff is moderate, recurring-but-flat errors are minor
pub(crate) fn error_severity(trends: &[ErrorTrend], config: &SynthesisConfig) -> Severity {
    let mut severity = Severity::None;
    for trend in trends {
        let candidate = match trend.direction {
            TrendDirection::Increasing if trend.percent_change >= config.error_major_percent => {
                Severity::Major
            }
            TrendDirection::Increasing => Severity::Moderate,
            _ => Severity::Minor,
        };
        severity = severity.max(candidate);
    }
    severity
}

/// Normalized leak impact in [0, 1]
pub(crate) fn leak_impact(findings: &[LeakFinding]) -> f64 {
    let bytes: u64 = findings.iter().map(LeakFinding::impact_bytes).sum();
    (bytes as f64 / LEAK_BYTES_REFERENCE).min(1.0)
}

/// Normalized visual impact in [0, 1]: the differing fraction of the frame
pub(crate) fn visual_impact(result: &DiffResult) -> f64 {
    ((100.0 - result.match_percentage) / 100.0).clamp(0.0, 1.0)
}

/// Normalized error impact in [0, 1]: event volume in rising buckets
pub(crate) fn error_impact(trends: &[ErrorTrend]) -> f64 {
    let rising_events: usize = trends
        .iter()
        .filter(|t| t.direction == TrendDirection::Increasing)
        .map(|t| t.bucket_counts.iter().sum::<usize>())
        .sum();
    (rising_events as f64 / ERROR_EVENTS_REFERENCE).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diag_types::domains::events::ErrorFingerprint;

    fn trend(direction: TrendDirection, percent: f64, counts: Vec<usize>) -> ErrorTrend {
        ErrorTrend {
            fingerprint: ErrorFingerprint("f".to_string()),
            sample_message: "m".to_string(),
            bucket_counts: counts,
            direction,
            percent_change: percent,
        }
    }

    #[test]
    fn test_error_severity_ladder() {
        let config = SynthesisConfig::default();
        assert_eq!(error_severity(&[], &config), Severity::None);
        assert_eq!(
            error_severity(&[trend(TrendDirection::Stable, 0.0, vec![1, 1])], &config),
            Severity::Minor
        );
        assert_eq!(
            error_severity(
                &[trend(TrendDirection::Increasing, 20.0, vec![1, 2])],
                &config
            ),
            Severity::Moderate
        );
        assert_eq!(
            error_severity(
                &[trend(TrendDirection::Increasing, 80.0, vec![1, 5])],
                &config
            ),
            Severity::Major
        );
    }

    #[test]
    fn test_error_impact_counts_only_rising_buckets() {
        let trends = vec![
            trend(TrendDirection::Increasing, 50.0, vec![10, 20]),
            trend(TrendDirection::Decreasing, -50.0, vec![40, 5]),
        ];
        assert!((error_impact(&trends) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_impacts_saturate_at_one() {
        let trends = vec![trend(TrendDirection::Increasing, 500.0, vec![500, 9000])];
        assert_eq!(error_impact(&trends), 1.0);
    }
}
