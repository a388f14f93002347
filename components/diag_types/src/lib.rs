// Shared data model and error taxonomy for the diagnostics engine
//
// This module is part of the CortenBrowser runtime diagnostics implementation.

pub mod domains;
pub mod errors;

// Re-export commonly used types
pub use errors::{DiagError, MalformedSnapshotError};

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier for one capture session (one debugging run)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureId(Uuid);

impl CaptureId {
    /// Generate a fresh capture id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CaptureId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CaptureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity of a finding or of a whole report section
///
/// Ordered so that `max()` over findings yields the dominant severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Nothing noteworthy
    #[default]
    None,
    /// Cosmetic or low-impact finding
    Minor,
    /// Worth investigating
    Moderate,
    /// Likely user-visible defect
    Major,
    /// Session-breaking defect
    Critical,
}

/// Provenance of a computed value: exact computation vs heuristic approximation
///
/// Every finding carries one of these so consumers can tell an exact number
/// (e.g. retained size present in the snapshot document) from an approximated
/// one (reachable-self-size sum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Value computed exactly from the input document
    Exact,
    /// Value approximated by a documented heuristic
    Heuristic,
}

/// Outcome of one sub-analysis, carried into the report
///
/// A failed or skipped section never aborts the sibling analyses; the report
/// is produced best-effort with the section marked accordingly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SectionStatus {
    /// Sub-analysis ran to completion
    Completed,
    /// Sub-analysis failed; findings for this section are absent
    #[serde(rename_all = "camelCase")]
    Failed {
        /// Human-readable failure reason
        reason: String,
    },
    /// Sub-analysis did not run (e.g. artifact never captured)
    #[serde(rename_all = "camelCase")]
    Skipped {
        /// Human-readable skip reason
        reason: String,
    },
}

impl SectionStatus {
    /// Whether this section produced findings
    pub fn is_completed(&self) -> bool {
        matches!(self, SectionStatus::Completed)
    }
}

/// Result of one sub-analysis before synthesis
///
/// `merge` consumes one of these per detector so that a failure in one
/// domain reaches the report as a marked section instead of an abort.
#[derive(Debug, Clone)]
pub enum SectionOutcome<T> {
    /// The sub-analysis completed with its findings
    Completed(T),
    /// The sub-analysis failed with the given reason
    Failed(String),
    /// The sub-analysis never ran
    Skipped(String),
}

impl<T> SectionOutcome<T> {
    /// The status recorded in the report for this outcome
    pub fn status(&self) -> SectionStatus {
        match self {
            SectionOutcome::Completed(_) => SectionStatus::Completed,
            SectionOutcome::Failed(reason) => SectionStatus::Failed {
                reason: reason.clone(),
            },
            SectionOutcome::Skipped(reason) => SectionStatus::Skipped {
                reason: reason.clone(),
            },
        }
    }

    /// The findings, if the sub-analysis completed
    pub fn completed(&self) -> Option<&T> {
        match self {
            SectionOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for SectionOutcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => SectionOutcome::Completed(value),
            Err(err) => SectionOutcome::Failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Major);
        assert!(Severity::Major > Severity::Moderate);
        assert!(Severity::Moderate > Severity::Minor);
        assert!(Severity::Minor > Severity::None);
    }

    #[test]
    fn test_severity_serialization() {
        let json = serde_json::to_string(&Severity::Moderate).unwrap();
        assert_eq!(json, "\"moderate\"");
    }

    #[test]
    fn test_capture_id_unique() {
        let a = CaptureId::new();
        let b = CaptureId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_section_outcome_from_result() {
        let ok: SectionOutcome<u32> = Ok::<_, DiagError>(7).into();
        assert!(ok.status().is_completed());
        assert_eq!(ok.completed(), Some(&7));

        let err: SectionOutcome<u32> = Err::<u32, _>(DiagError::ResourceExhausted {
            budget: 1,
            needed: 2,
        })
        .into();
        assert!(!err.status().is_completed());
        assert!(err.completed().is_none());
    }
}
