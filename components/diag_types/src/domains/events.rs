// Error-event domain types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One error or console event pushed by the capture listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    /// Raw error message
    pub message: String,
    /// Stack trace text, when the runtime provided one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Source file the error originated from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    /// Source line the error originated from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Event timestamp in epoch milliseconds
    pub timestamp_ms: u64,
    /// Listener-supplied metadata, passed through untouched
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

impl ErrorEvent {
    /// Construct a bare event; builder-style setters fill in the rest
    pub fn new(message: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            message: message.into(),
            stack: None,
            source_file: None,
            line: None,
            timestamp_ms,
            metadata: Value::Null,
        }
    }

    /// Attach a source location
    pub fn with_source(mut self, file: impl Into<String>, line: u32) -> Self {
        self.source_file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// Attach a stack trace
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

/// Normalized deduplication key for recurring errors
///
/// Derived from the message with volatile literals collapsed to placeholders,
/// plus the source location, so that many occurrences of the "same" error map
/// into one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorFingerprint(pub String);

impl fmt::Display for ErrorFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of an error-frequency trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Frequency rose past the change cutoff
    Increasing,
    /// Frequency fell past the change cutoff
    Decreasing,
    /// Frequency stayed within the cutoff
    Stable,
}

/// Frequency trend for one error fingerprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorTrend {
    /// The fingerprint this trend describes
    pub fingerprint: ErrorFingerprint,
    /// Representative raw message for display
    pub sample_message: String,
    /// Event counts per fixed time bucket, oldest first
    pub bucket_counts: Vec<usize>,
    /// Classified direction
    pub direction: TrendDirection,
    /// Percent change between the first and second half of the buckets
    pub percent_change: f64,
}

/// A recurring error group with a rule-based diagnosis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPattern {
    /// The fingerprint shared by the grouped events
    pub fingerprint: ErrorFingerprint,
    /// Representative raw message for display
    pub sample_message: String,
    /// Number of events in the bucket
    pub occurrences: usize,
    /// Source file shared by the bucket, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    /// Source line shared by the bucket, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Rule-derived likely cause
    pub common_cause: String,
    /// Rule-derived suggested fix
    pub suggested_fix: String,
}
