//! CortenBrowser runtime diagnostics
//!
//! Re-exports the public diagnostics API. See [`diagnostics_api`] for the
//! full interface.

pub use diagnostics_api::*;
