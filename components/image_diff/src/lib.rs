//! Screenshot comparison
//!
//! Compares two equally-sized RGBA rasters with a perceptual per-pixel
//! color distance, then clusters the differing pixels into hotspots via
//! connected-component labeling. Both passes are single-sweep and visit
//! each pixel a bounded number of times, and the whole computation is
//! deterministic for identical inputs.

mod compare;
mod hotspots;

pub use compare::{color_distance, ImageDiffEngine};

use serde::{Deserialize, Serialize};

/// Neighborhood used by the flood fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Edge-adjacent neighbors only
    Four,
    /// Edge- and corner-adjacent neighbors
    Eight,
}

/// Configuration for image comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffConfig {
    /// Perceptual color distance in [0, 1] above which a pixel differs
    pub threshold: f64,
    /// Count anti-aliasing artifacts as real differences
    pub include_anti_aliasing: bool,
    /// Flood-fill neighborhood
    pub connectivity: Connectivity,
    /// Components below this pixel count are discarded as noise
    pub min_pixel_count: usize,
    /// Components below this pixel count are minor
    pub moderate_min_pixels: usize,
    /// Components above this pixel count are major
    pub moderate_max_pixels: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            include_anti_aliasing: false,
            connectivity: Connectivity::Eight,
            min_pixel_count: 100,
            moderate_min_pixels: 500,
            moderate_max_pixels: 1000,
        }
    }
}
