//! Capture-source seam
//!
//! Talking to the live target (a browser automation driver) is external I/O
//! that may block or suspend, so it sits behind an async trait. Everything
//! downstream of capture is synchronous and pure over the collected
//! artifacts. Callers that need capture timeouts enforce them inside their
//! `ArtifactSource` implementation; no detection algorithm has one.

use async_trait::async_trait;
use diag_types::domains::events::ErrorEvent;
use diag_types::domains::visual::PixelImage;

/// Produces raw diagnostic artifacts from a live target
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Capture one raw heap-snapshot document
    ///
    /// Implementations should let garbage collection settle before the
    /// capture so sample-to-sample growth reflects retained memory.
    async fn heap_snapshot(&self) -> anyhow::Result<Vec<u8>>;

    /// Capture the current frame as a decoded RGBA raster
    async fn screenshot(&self) -> anyhow::Result<PixelImage>;

    /// Drain error events observed since the previous call
    async fn drain_errors(&self) -> anyhow::Result<Vec<ErrorEvent>>;
}
