// Visual-diff domain types

use crate::errors::DiagError;
use crate::Severity;
use serde::{Deserialize, Serialize};

/// A decoded RGBA raster, immutable once constructed
///
/// Codec decode/encode happens in the capture layer; this engine only ever
/// sees already-decoded pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl PixelImage {
    /// Wrap a raw RGBA buffer, checking it matches the dimensions
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, DiagError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(DiagError::InvalidPixelBuffer {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// A solid-color image, mostly useful in tests
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            rgba.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    /// Image width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Total pixel count
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// RGBA of the pixel at (x, y); panics on out-of-range in debug builds
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        debug_assert!(x < self.width && y < self.height);
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.rgba[offset],
            self.rgba[offset + 1],
            self.rgba[offset + 2],
            self.rgba[offset + 3],
        ]
    }

    /// Overwrite the pixel at (x, y); test helper for building fixtures
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        debug_assert!(x < self.width && y < self.height);
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        self.rgba[offset..offset + 4].copy_from_slice(&color);
    }
}

/// Axis-aligned bounding box of a hotspot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// A spatially contiguous region of pixel difference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// Bounding box of the differing region
    pub bounding_box: BoundingBox,
    /// Number of differing pixels inside the region
    pub pixel_count: usize,
    /// Severity tier from the component area
    pub severity: Severity,
}

/// Result of comparing two equally-sized images
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    /// Per-pixel difference mask, row-major; not serialized (callers that
    /// need it hold the in-memory value)
    #[serde(skip)]
    pub mask: Vec<bool>,
    /// Number of differing pixels
    pub diff_pixel_count: usize,
    /// 100 - (diff pixels / total pixels * 100)
    pub match_percentage: f64,
    /// Clustered difference regions, noise filtered out
    pub hotspots: Vec<Hotspot>,
}

impl DiffResult {
    /// Total pixels implicated across all hotspots, for impact weighting
    pub fn hotspot_area(&self) -> usize {
        self.hotspots.iter().map(|h| h.pixel_count).sum()
    }

    /// The dominant hotspot severity, or `Severity::None` without hotspots
    pub fn max_severity(&self) -> Severity {
        self.hotspots
            .iter()
            .map(|h| h.severity)
            .max()
            .unwrap_or(Severity::None)
    }
}
