//! Error-event aggregation
//!
//! Streams of console/exception events are fingerprinted into buckets and
//! kept in a bounded ring: once the configured size or age limit is
//! exceeded the oldest events fall out FIFO, so a long debugging session
//! never grows without bound. This is the only stateful component of the
//! engine; ingestion is single-writer while pattern and trend queries read
//! a consistent snapshot of the current buckets and may run concurrently
//! with ongoing ingestion.

mod fingerprint;
mod patterns;
mod trends;

pub use fingerprint::{fingerprint_event, normalize_message};
pub use patterns::diagnose;

use diag_types::domains::events::{ErrorEvent, ErrorFingerprint, ErrorPattern, ErrorTrend};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Configuration for the error aggregator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatorConfig {
    /// Maximum events held across all buckets
    pub max_events: usize,
    /// Events older than this relative to the newest one are evicted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age_ms: Option<u64>,
    /// Symmetric percent-change cutoff for trend direction
    pub trend_change_percent: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_events: 10_000,
            max_age_ms: None,
            trend_change_percent: 10.0,
        }
    }
}

#[derive(Debug)]
struct Bucket {
    /// First raw message seen, kept for display
    sample_message: String,
    source_file: Option<String>,
    line: Option<u32>,
    /// Event timestamps in arrival order; front is evicted first
    timestamps: VecDeque<u64>,
}

#[derive(Debug, Default)]
struct AggregatorState {
    buckets: HashMap<ErrorFingerprint, Bucket>,
    /// One entry per ingested event, oldest first
    arrival_order: VecDeque<ErrorFingerprint>,
    total_events: usize,
}

impl AggregatorState {
    /// Timestamp of the oldest event still held
    fn oldest_timestamp(&self) -> Option<u64> {
        let front = self.arrival_order.front()?;
        self.buckets
            .get(front)
            .and_then(|bucket| bucket.timestamps.front().copied())
    }

    fn evict_oldest(&mut self) {
        let Some(fingerprint) = self.arrival_order.pop_front() else {
            return;
        };
        if let Some(bucket) = self.buckets.get_mut(&fingerprint) {
            bucket.timestamps.pop_front();
            if bucket.timestamps.is_empty() {
                self.buckets.remove(&fingerprint);
            }
        }
        self.total_events -= 1;
    }
}

/// Fingerprints and buckets streamed error events
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    config: AggregatorConfig,
    state: RwLock<AggregatorState>,
}

impl ErrorAggregator {
    /// Create an aggregator with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an aggregator with custom configuration
    pub fn with_config(config: AggregatorConfig) -> Self {
        Self {
            config,
            state: RwLock::new(AggregatorState::default()),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Ingest one event into its fingerprint bucket
    ///
    /// Amortized O(1): a fingerprint derivation, one hash-map update, and
    /// whatever FIFO evictions the ring limits require.
    pub fn ingest(&self, event: ErrorEvent) {
        let fingerprint = fingerprint::fingerprint_event(&event);
        let mut state = self.state.write();

        let bucket = state
            .buckets
            .entry(fingerprint.clone())
            .or_insert_with(|| Bucket {
                sample_message: event.message.clone(),
                source_file: event.source_file.clone(),
                line: event.line,
                timestamps: VecDeque::new(),
            });
        bucket.timestamps.push_back(event.timestamp_ms);
        state.arrival_order.push_back(fingerprint);
        state.total_events += 1;

        while state.total_events > self.config.max_events {
            state.evict_oldest();
        }
        if let Some(max_age_ms) = self.config.max_age_ms {
            let horizon = event.timestamp_ms.saturating_sub(max_age_ms);
            while state
                .oldest_timestamp()
                .is_some_and(|oldest| oldest < horizon)
            {
                state.evict_oldest();
            }
        }
    }

    /// Number of events currently held
    pub fn event_count(&self) -> usize {
        self.state.read().total_events
    }

    /// Number of distinct fingerprints currently held
    pub fn bucket_count(&self) -> usize {
        self.state.read().buckets.len()
    }

    /// Recurring error groups, most frequent first
    ///
    /// Buckets with fewer than `min_occurrences` events are left out. Each
    /// pattern carries a rule-based cause and suggested fix.
    pub fn group_patterns(&self, min_occurrences: usize) -> Vec<ErrorPattern> {
        let state = self.state.read();
        let floor = min_occurrences.max(1);

        let mut groups: Vec<ErrorPattern> = state
            .buckets
            .iter()
            .filter(|(_, bucket)| bucket.timestamps.len() >= floor)
            .map(|(fingerprint, bucket)| {
                let (common_cause, suggested_fix) = patterns::diagnose(&bucket.sample_message);
                ErrorPattern {
                    fingerprint: fingerprint.clone(),
                    sample_message: bucket.sample_message.clone(),
                    occurrences: bucket.timestamps.len(),
                    source_file: bucket.source_file.clone(),
                    line: bucket.line,
                    common_cause,
                    suggested_fix,
                }
            })
            .collect();

        groups.sort_by(|a, b| {
            b.occurrences
                .cmp(&a.occurrences)
                .then_with(|| a.fingerprint.0.cmp(&b.fingerprint.0))
        });
        debug!("grouped {} error patterns", groups.len());
        groups
    }

    /// Frequency trends per fingerprint, steepest change first
    ///
    /// Timestamps are bucketed into `window_size_ms` windows anchored at the
    /// earliest event still held, and the first half of the windows is
    /// compared against the second half.
    pub fn compute_trends(&self, window_size_ms: u64) -> Vec<ErrorTrend> {
        let state = self.state.read();

        let all_timestamps = state
            .buckets
            .values()
            .flat_map(|b| b.timestamps.iter().copied());
        let Some(earliest) = all_timestamps.clone().min() else {
            return Vec::new();
        };
        let latest = all_timestamps.max().unwrap_or(earliest);

        let mut result: Vec<ErrorTrend> = state
            .buckets
            .iter()
            .map(|(fingerprint, bucket)| {
                let timestamps: Vec<u64> = bucket.timestamps.iter().copied().collect();
                let bucket_counts =
                    trends::bucket_counts(&timestamps, earliest, latest, window_size_ms);
                let (direction, percent_change) =
                    trends::classify(&bucket_counts, self.config.trend_change_percent);
                ErrorTrend {
                    fingerprint: fingerprint.clone(),
                    sample_message: bucket.sample_message.clone(),
                    bucket_counts,
                    direction,
                    percent_change,
                }
            })
            .collect();

        result.sort_by(|a, b| {
            b.percent_change
                .abs()
                .partial_cmp(&a.percent_change.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.fingerprint.0.cmp(&b.fingerprint.0))
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diag_types::domains::events::TrendDirection;
    use pretty_assertions::assert_eq;

    fn event(message: &str, line: u32, timestamp_ms: u64) -> ErrorEvent {
        ErrorEvent::new(message, timestamp_ms).with_source("app.js", line)
    }

    #[test]
    fn test_grouping_keeps_distinct_identifiers_apart() {
        let aggregator = ErrorAggregator::new();
        aggregator.ingest(event("Cannot read property 'name' of undefined", 42, 1000));
        aggregator.ingest(event("Cannot read property 'name' of undefined", 42, 2000));
        aggregator.ingest(event("Cannot read property 'id' of undefined", 42, 3000));

        let patterns = aggregator.group_patterns(2);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].occurrences, 2);
        assert!(patterns[0].sample_message.contains("'name'"));
        assert_eq!(patterns[0].common_cause, "reference error");
    }

    #[test]
    fn test_volatile_payloads_share_a_bucket() {
        let aggregator = ErrorAggregator::new();
        aggregator.ingest(event("Request timed out after 3000ms", 7, 1000));
        aggregator.ingest(event("Request timed out after 9000ms", 7, 2000));

        assert_eq!(aggregator.bucket_count(), 1);
        let patterns = aggregator.group_patterns(2);
        assert_eq!(patterns[0].occurrences, 2);
    }

    #[test]
    fn test_patterns_sorted_by_frequency() {
        let aggregator = ErrorAggregator::new();
        for i in 0..5 {
            aggregator.ingest(event("Failed to fetch", 1, 1000 + i));
        }
        for i in 0..2 {
            aggregator.ingest(event("null is not an object", 9, 2000 + i));
        }

        let patterns = aggregator.group_patterns(2);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].occurrences, 5);
        assert_eq!(patterns[0].common_cause, "network failure");
        assert_eq!(patterns[1].occurrences, 2);
    }

    #[test]
    fn test_size_limit_evicts_fifo() {
        let aggregator = ErrorAggregator::with_config(AggregatorConfig {
            max_events: 3,
            ..AggregatorConfig::default()
        });

        aggregator.ingest(event("first error", 1, 1000));
        aggregator.ingest(event("second error", 2, 2000));
        aggregator.ingest(event("second error", 2, 3000));
        aggregator.ingest(event("second error", 2, 4000));

        assert_eq!(aggregator.event_count(), 3);
        // The single "first error" event was oldest and fell out
        assert_eq!(aggregator.bucket_count(), 1);
        assert_eq!(aggregator.group_patterns(1)[0].occurrences, 3);
    }

    #[test]
    fn test_age_limit_evicts_old_events() {
        let aggregator = ErrorAggregator::with_config(AggregatorConfig {
            max_age_ms: Some(5_000),
            ..AggregatorConfig::default()
        });

        aggregator.ingest(event("stale error", 1, 1_000));
        aggregator.ingest(event("fresh error", 2, 10_000));

        assert_eq!(aggregator.event_count(), 1);
        assert_eq!(aggregator.group_patterns(1)[0].sample_message, "fresh error");
    }

    #[test]
    fn test_trends_detect_increasing_frequency() {
        let aggregator = ErrorAggregator::new();
        // One event in the first two seconds, six in the last two
        aggregator.ingest(event("Failed to fetch", 1, 0));
        for i in 0..6u64 {
            aggregator.ingest(event("Failed to fetch", 1, 2_000 + i * 300));
        }

        let trends = aggregator.compute_trends(1_000);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].direction, TrendDirection::Increasing);
        assert!(trends[0].percent_change > 10.0);
    }

    #[test]
    fn test_trends_sorted_by_change_magnitude() {
        let aggregator = ErrorAggregator::new();
        // Steady: one per second
        for i in 0..4u64 {
            aggregator.ingest(event("steady error", 1, i * 1_000));
        }
        // Spiking: all in the final window
        for i in 0..4u64 {
            aggregator.ingest(event("spiking error", 2, 3_000 + i * 10));
        }

        let trends = aggregator.compute_trends(1_000);
        assert_eq!(trends.len(), 2);
        assert!(trends[0].sample_message.contains("spiking"));
        assert!(trends[0].percent_change.abs() >= trends[1].percent_change.abs());
    }

    #[test]
    fn test_empty_aggregator_has_no_trends() {
        let aggregator = ErrorAggregator::new();
        assert!(aggregator.compute_trends(1_000).is_empty());
        assert!(aggregator.group_patterns(1).is_empty());
    }
}
