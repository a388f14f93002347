//! Perceptual pixel comparison

use crate::{hotspots, DiffConfig};
use diag_types::domains::visual::{DiffResult, PixelImage};
use diag_types::DiagError;
use tracing::debug;

/// Compares screenshot pairs into diff masks and hotspots
#[derive(Debug, Default)]
pub struct ImageDiffEngine {
    config: DiffConfig,
}

impl ImageDiffEngine {
    /// Create an engine with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom configuration
    pub fn with_config(config: DiffConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Compare a baseline screenshot against a candidate
    ///
    /// The images must have identical dimensions; there is no implicit
    /// resize. Unless the configuration says otherwise, differing pixels
    /// that look like anti-aliasing artifacts are not counted.
    pub fn compare(
        &self,
        baseline: &PixelImage,
        candidate: &PixelImage,
    ) -> Result<DiffResult, DiagError> {
        if baseline.width() != candidate.width() || baseline.height() != candidate.height() {
            return Err(DiagError::DimensionMismatch {
                baseline_width: baseline.width(),
                baseline_height: baseline.height(),
                candidate_width: candidate.width(),
                candidate_height: candidate.height(),
            });
        }

        let width = baseline.width();
        let height = baseline.height();
        let total = baseline.pixel_count();

        let mut mask = vec![false; total];
        let mut diff_pixel_count = 0usize;

        for y in 0..height {
            for x in 0..width {
                let a = baseline.pixel(x, y);
                let b = candidate.pixel(x, y);
                if color_distance(a, b) <= self.config.threshold {
                    continue;
                }
                if !self.config.include_anti_aliasing
                    && is_antialiasing_artifact(baseline, candidate, x, y, self.config.threshold)
                {
                    continue;
                }
                mask[(y * width + x) as usize] = true;
                diff_pixel_count += 1;
            }
        }

        let match_percentage = if total > 0 {
            100.0 - (diff_pixel_count as f64 / total as f64 * 100.0)
        } else {
            100.0
        };

        let hotspots = hotspots::extract_hotspots(&mask, width, height, &self.config);
        debug!(
            "compared {}x{} images: {:.2}% match, {} hotspots",
            width,
            height,
            match_percentage,
            hotspots.len()
        );

        Ok(DiffResult {
            mask,
            diff_pixel_count,
            match_percentage,
            hotspots,
        })
    }
}

/// Perceptual distance between two RGBA pixels, normalized to [0, 1]
///
/// Pixels are alpha-blended onto white, then compared with a
/// luminance-weighted RGB distance, so a faint translucent shift scores
/// lower than an opaque color change of the same raw magnitude.
pub fn color_distance(a: [u8; 4], b: [u8; 4]) -> f64 {
    let (ar, ag, ab) = blend_on_white(a);
    let (br, bg, bb) = blend_on_white(b);

    let dr = ar - br;
    let dg = ag - bg;
    let db = ab - bb;

    (0.299 * dr * dr + 0.587 * dg * dg + 0.114 * db * db).sqrt() / 255.0
}

fn blend_on_white(p: [u8; 4]) -> (f64, f64, f64) {
    let alpha = p[3] as f64 / 255.0;
    let blend = |c: u8| c as f64 * alpha + 255.0 * (1.0 - alpha);
    (blend(p[0]), blend(p[1]), blend(p[2]))
}

/// Whether a differing pixel looks like an anti-aliasing artifact
///
/// The difference is written off as anti-aliasing when each image contains,
/// within the pixel's 8-neighborhood, a color close to the other image's
/// pixel: the edge merely landed on a different sub-pixel boundary. Looks at
/// most 16 neighbors, keeping the per-pixel work bounded.
fn is_antialiasing_artifact(
    baseline: &PixelImage,
    candidate: &PixelImage,
    x: u32,
    y: u32,
    threshold: f64,
) -> bool {
    has_close_neighbor(candidate, baseline.pixel(x, y), x, y, threshold)
        && has_close_neighbor(baseline, candidate.pixel(x, y), x, y, threshold)
}

fn has_close_neighbor(image: &PixelImage, target: [u8; 4], x: u32, y: u32, threshold: f64) -> bool {
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= image.width() as i64 || ny >= image.height() as i64 {
                continue;
            }
            if color_distance(image.pixel(nx as u32, ny as u32), target) <= threshold {
                return true;
            }
        }
    }
    false
}
