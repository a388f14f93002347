//! Memory-growth detection over a sample timeline
//!
//! A leak call requires both magnitude (percent growth over the whole
//! timeline) and consistency (most consecutive sample pairs grew), so a
//! single allocation spike does not read as a leak. The caller is expected
//! to let garbage collection settle before each sample.

use diag_types::domains::heap::MemoryTimeline;
use diag_types::domains::memory::GrowthResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Thresholds for calling a timeline leaky
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthThresholds {
    /// Minimum percent growth between first and last sample
    pub percent_threshold: f64,
    /// Minimum fraction of consecutive sample pairs that must grow
    pub consistency_ratio: f64,
}

impl Default for GrowthThresholds {
    fn default() -> Self {
        Self {
            percent_threshold: 10.0,
            consistency_ratio: 0.7,
        }
    }
}

/// Measure heap growth across the timeline
///
/// Timelines with fewer than two samples yield a zero result; that is not an
/// error, there is simply nothing to measure yet.
pub fn detect_growth(timeline: &MemoryTimeline, thresholds: &GrowthThresholds) -> GrowthResult {
    let samples = timeline.samples();
    if samples.len() < 2 {
        return GrowthResult::empty();
    }

    let first = &samples[0];
    let last = &samples[samples.len() - 1];

    let absolute_growth = last.used_size as i64 - first.used_size as i64;
    let percent_growth = if first.used_size > 0 {
        absolute_growth as f64 / first.used_size as f64 * 100.0
    } else {
        0.0
    };

    let pairs = samples.len() - 1;
    let grown = samples
        .windows(2)
        .filter(|pair| pair[1].used_size > pair[0].used_size)
        .count();
    let consistency = grown as f64 / pairs as f64;

    let span_seconds = (last.timestamp_ms - first.timestamp_ms) as f64 / 1000.0;
    let rate_bytes_per_second = if span_seconds > 0.0 {
        absolute_growth as f64 / span_seconds
    } else {
        0.0
    };

    let is_leak = percent_growth > thresholds.percent_threshold
        && consistency > thresholds.consistency_ratio;

    debug!(
        "growth over {} samples: {:.1}% ({} bytes), consistency {:.2}, leak={}",
        samples.len(),
        percent_growth,
        absolute_growth,
        consistency,
        is_leak
    );

    GrowthResult {
        absolute_growth,
        percent_growth,
        rate_bytes_per_second,
        consistency,
        is_leak,
    }
}
