//! Diagnostics orchestration and integration
//!
//! This module provides the DiagnosticsEngine that drives the capture
//! session and the per-domain detectors to produce a single
//! severity-ranked diagnostic report per run.
//!
//! # Example
//!
//! ```no_run
//! use diagnostics_engine::{DiagnosticsEngine, DiagnosticsConfig};
//!
//! let config = DiagnosticsConfig::builder()
//!     .growth_percent_threshold(10.0)
//!     .build();
//!
//! let engine = DiagnosticsEngine::new(config);
//! let mut session = engine.start_session();
//! // capture artifacts into the session, then:
//! let report = engine.analyze(&session);
//! ```

mod capture;
mod config;
mod engine;
mod error;
mod session;

pub use capture::ArtifactSource;
pub use config::{DiagnosticsConfig, DiagnosticsConfigBuilder};
pub use engine::DiagnosticsEngine;
pub use error::{EngineError, Result};
pub use session::CaptureSession;
