//! Configuration for the diagnostics engine

use error_aggregator::AggregatorConfig;
use image_diff::DiffConfig;
use leak_detector::LeakDetectorConfig;
use report_synthesizer::SynthesisConfig;
use serde::{Deserialize, Serialize};
use snapshot_ingester::IngesterConfig;

/// Configuration for a diagnostics run
///
/// Aggregates the per-detector configurations so one value configures the
/// whole engine. Every numeric threshold in the detectors is a heuristic
/// default; correct values are application-dependent, which is why they all
/// live here instead of being hardcoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsConfig {
    /// Snapshot ingestion limits
    pub ingester: IngesterConfig,
    /// Leak-detector thresholds
    pub leak: LeakDetectorConfig,
    /// Image-diff thresholds and tiers
    pub diff: DiffConfig,
    /// Error-aggregator ring limits and trend cutoff
    pub aggregator: AggregatorConfig,
    /// Report synthesis weights
    pub synthesis: SynthesisConfig,
    /// Window size for error-trend bucketing, in milliseconds
    pub trend_window_ms: u64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl DiagnosticsConfig {
    /// Create a new builder for DiagnosticsConfig
    ///
    /// # Example
    ///
    /// ```
    /// use diagnostics_engine::DiagnosticsConfig;
    ///
    /// let config = DiagnosticsConfig::builder()
    ///     .growth_percent_threshold(15.0)
    ///     .diff_threshold(0.05)
    ///     .build();
    /// ```
    pub fn builder() -> DiagnosticsConfigBuilder {
        DiagnosticsConfigBuilder::default()
    }
}

/// Default trend window: one minute
const DEFAULT_TREND_WINDOW_MS: u64 = 60_000;

/// Builder for DiagnosticsConfig
///
/// Provides a fluent interface over the nested detector configurations.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsConfigBuilder {
    ingester: Option<IngesterConfig>,
    leak: Option<LeakDetectorConfig>,
    diff: Option<DiffConfig>,
    aggregator: Option<AggregatorConfig>,
    synthesis: Option<SynthesisConfig>,
    trend_window_ms: Option<u64>,
    growth_percent_threshold: Option<f64>,
    diff_threshold: Option<f64>,
    max_snapshot_bytes: Option<usize>,
}

impl DiagnosticsConfigBuilder {
    /// Replace the snapshot-ingester configuration
    pub fn ingester(mut self, config: IngesterConfig) -> Self {
        self.ingester = Some(config);
        self
    }

    /// Replace the leak-detector configuration
    pub fn leak(mut self, config: LeakDetectorConfig) -> Self {
        self.leak = Some(config);
        self
    }

    /// Replace the image-diff configuration
    pub fn diff(mut self, config: DiffConfig) -> Self {
        self.diff = Some(config);
        self
    }

    /// Replace the error-aggregator configuration
    pub fn aggregator(mut self, config: AggregatorConfig) -> Self {
        self.aggregator = Some(config);
        self
    }

    /// Replace the synthesis configuration
    pub fn synthesis(mut self, config: SynthesisConfig) -> Self {
        self.synthesis = Some(config);
        self
    }

    /// Set the error-trend window size
    pub fn trend_window_ms(mut self, window_ms: u64) -> Self {
        self.trend_window_ms = Some(window_ms);
        self
    }

    /// Set the heap-growth percent threshold
    pub fn growth_percent_threshold(mut self, percent: f64) -> Self {
        self.growth_percent_threshold = Some(percent);
        self
    }

    /// Set the perceptual diff threshold
    pub fn diff_threshold(mut self, threshold: f64) -> Self {
        self.diff_threshold = Some(threshold);
        self
    }

    /// Set the snapshot memory budget
    pub fn max_snapshot_bytes(mut self, bytes: usize) -> Self {
        self.max_snapshot_bytes = Some(bytes);
        self
    }

    /// Build the DiagnosticsConfig
    ///
    /// Uses default values for any options not explicitly set.
    pub fn build(self) -> DiagnosticsConfig {
        let mut ingester = self.ingester.unwrap_or_default();
        if let Some(bytes) = self.max_snapshot_bytes {
            ingester.max_snapshot_bytes = bytes;
        }

        let mut leak = self.leak.unwrap_or_default();
        if let Some(percent) = self.growth_percent_threshold {
            leak.growth.percent_threshold = percent;
        }

        let mut diff = self.diff.unwrap_or_default();
        if let Some(threshold) = self.diff_threshold {
            diff.threshold = threshold;
        }

        DiagnosticsConfig {
            ingester,
            leak,
            diff,
            aggregator: self.aggregator.unwrap_or_default(),
            synthesis: self.synthesis.unwrap_or_default(),
            trend_window_ms: self.trend_window_ms.unwrap_or(DEFAULT_TREND_WINDOW_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiagnosticsConfig::builder().build();

        assert_eq!(config.leak.growth.percent_threshold, 10.0);
        assert_eq!(config.leak.growth.consistency_ratio, 0.7);
        assert_eq!(config.diff.threshold, 0.1);
        assert_eq!(config.diff.min_pixel_count, 100);
        assert_eq!(config.aggregator.trend_change_percent, 10.0);
        assert_eq!(config.trend_window_ms, DEFAULT_TREND_WINDOW_MS);
    }

    #[test]
    fn test_builder_scalar_overrides() {
        let config = DiagnosticsConfig::builder()
            .growth_percent_threshold(25.0)
            .diff_threshold(0.02)
            .max_snapshot_bytes(1024)
            .trend_window_ms(5_000)
            .build();

        assert_eq!(config.leak.growth.percent_threshold, 25.0);
        assert_eq!(config.diff.threshold, 0.02);
        assert_eq!(config.ingester.max_snapshot_bytes, 1024);
        assert_eq!(config.trend_window_ms, 5_000);
    }

    #[test]
    fn test_builder_sub_config_replacement() {
        let config = DiagnosticsConfig::builder()
            .aggregator(error_aggregator::AggregatorConfig {
                max_events: 50,
                ..Default::default()
            })
            .build();

        assert_eq!(config.aggregator.max_events, 50);
    }
}
