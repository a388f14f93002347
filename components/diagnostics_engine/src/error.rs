//! Error types for the diagnostics engine

use thiserror::Error;

/// Errors that can occur while driving a diagnostics run
#[derive(Error, Debug)]
pub enum EngineError {
    /// The external capture source failed to produce an artifact
    #[error("capture source failed: {0}")]
    Capture(String),

    /// An analysis-layer error
    #[error("analysis error: {0}")]
    Analysis(#[from] diag_types::DiagError),

    /// Other errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
