// Diagnostic report types
//
// A report is produced fresh per analysis run and never mutated afterwards.

use crate::domains::events::ErrorTrend;
use crate::domains::memory::LeakFinding;
use crate::domains::visual::Hotspot;
use crate::{SectionStatus, Severity};
use serde::{Deserialize, Serialize};

/// The analysis domain a section belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportDomain {
    /// Memory-leak analysis
    Memory,
    /// Visual-diff analysis
    Visual,
    /// Error-trend analysis
    Errors,
}

/// Per-domain completion state carried in every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSections {
    /// Status of the memory-leak sub-analysis
    pub memory: SectionStatus,
    /// Status of the visual-diff sub-analysis
    pub visual: SectionStatus,
    /// Status of the error-trend sub-analysis
    pub errors: SectionStatus,
}

/// The single artifact handed back to callers: all findings of one run,
/// severity-ranked, with failed sections marked rather than omitted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    /// Memory-leak findings, most severe first
    pub leak_findings: Vec<LeakFinding>,
    /// Visual-diff hotspots, largest first
    pub hotspots: Vec<Hotspot>,
    /// Error-frequency trends, steepest change first
    pub error_trends: Vec<ErrorTrend>,
    /// Maximum severity across all sub-analyses
    pub overall_severity: Severity,
    /// Domain that dominates the report after severity tie-breaking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_domain: Option<ReportDomain>,
    /// Report creation time in epoch milliseconds
    pub generated_at_ms: u64,
    /// Per-domain completion state
    pub sections: ReportSections,
}

impl DiagnosticReport {
    /// Whether any sub-analysis failed or was skipped
    pub fn is_partial(&self) -> bool {
        !(self.sections.memory.is_completed()
            && self.sections.visual.is_completed()
            && self.sections.errors.is_completed())
    }

    /// Total number of findings across all domains
    pub fn finding_count(&self) -> usize {
        self.leak_findings.len() + self.hotspots.len() + self.error_trends.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed_sections() -> ReportSections {
        ReportSections {
            memory: SectionStatus::Completed,
            visual: SectionStatus::Completed,
            errors: SectionStatus::Completed,
        }
    }

    #[test]
    fn test_report_partial_flag() {
        let mut report = DiagnosticReport {
            leak_findings: vec![],
            hotspots: vec![],
            error_trends: vec![],
            overall_severity: Severity::None,
            dominant_domain: None,
            generated_at_ms: 0,
            sections: completed_sections(),
        };
        assert!(!report.is_partial());

        report.sections.visual = SectionStatus::Failed {
            reason: "dimension mismatch".to_string(),
        };
        assert!(report.is_partial());
    }

    #[test]
    fn test_report_serialization_camel_case() {
        let report = DiagnosticReport {
            leak_findings: vec![],
            hotspots: vec![],
            error_trends: vec![],
            overall_severity: Severity::Minor,
            dominant_domain: Some(ReportDomain::Errors),
            generated_at_ms: 1234,
            sections: completed_sections(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"leakFindings\""));
        assert!(json.contains("\"overallSeverity\":\"minor\""));
        assert!(json.contains("\"generatedAtMs\":1234"));
        assert!(json.contains("\"dominantDomain\":\"errors\""));
    }
}
