//! Frequency-trend computation
//!
//! Event timestamps are bucketed into fixed windows anchored at the earliest
//! event the aggregator still holds. The average count over the first half
//! of the windows is compared to the second half; the direction is read off
//! a symmetric percent-change cutoff.

use diag_types::domains::events::TrendDirection;

/// Bucket timestamps into fixed windows spanning [earliest, latest]
pub(crate) fn bucket_counts(
    timestamps: &[u64],
    earliest_ms: u64,
    latest_ms: u64,
    window_size_ms: u64,
) -> Vec<usize> {
    let window = window_size_ms.max(1);
    let span = latest_ms.saturating_sub(earliest_ms);
    let windows = (span / window) as usize + 1;

    let mut counts = vec![0usize; windows];
    for &ts in timestamps {
        let offset = (ts.saturating_sub(earliest_ms) / window) as usize;
        // Timestamps outside the span clamp into the last window
        counts[offset.min(windows - 1)] += 1;
    }
    counts
}

/// Classify the change between the first and second half of the windows
///
/// A single window has no halves to compare and classifies as stable. When
/// the first half is silent, any second-half activity reads as a 100% rise.
pub(crate) fn classify(counts: &[usize], change_cutoff_percent: f64) -> (TrendDirection, f64) {
    if counts.len() < 2 {
        return (TrendDirection::Stable, 0.0);
    }

    let mid = counts.len() / 2;
    let first: usize = counts[..mid].iter().sum();
    let second: usize = counts[mid..].iter().sum();

    let first_avg = first as f64 / mid as f64;
    let second_avg = second as f64 / (counts.len() - mid) as f64;

    let percent_change = if first_avg > 0.0 {
        (second_avg - first_avg) / first_avg * 100.0
    } else if second_avg > 0.0 {
        100.0
    } else {
        0.0
    };

    let direction = if percent_change > change_cutoff_percent {
        TrendDirection::Increasing
    } else if percent_change < -change_cutoff_percent {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    (direction, percent_change)
}
