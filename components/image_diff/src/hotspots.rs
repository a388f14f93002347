//! Hotspot extraction from a diff mask
//!
//! Connected components are labeled with an iterative flood fill over the
//! boolean mask. The explicit stack keeps arbitrarily large regions from
//! overflowing the call stack, and each pixel enters the stack once.

use crate::{Connectivity, DiffConfig};
use diag_types::domains::visual::{BoundingBox, Hotspot};
use diag_types::Severity;

const FOUR_NEIGHBORS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const EIGHT_NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub(crate) fn extract_hotspots(
    mask: &[bool],
    width: u32,
    height: u32,
    config: &DiffConfig,
) -> Vec<Hotspot> {
    let neighbors: &[(i64, i64)] = match config.connectivity {
        Connectivity::Four => &FOUR_NEIGHBORS,
        Connectivity::Eight => &EIGHT_NEIGHBORS,
    };

    let mut claimed = vec![false; mask.len()];
    let mut hotspots = Vec::new();

    for start in 0..mask.len() {
        if !mask[start] || claimed[start] {
            continue;
        }

        let mut pixel_count = 0usize;
        let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
        let (mut max_x, mut max_y) = (0u32, 0u32);

        let mut stack = vec![start];
        claimed[start] = true;

        while let Some(offset) = stack.pop() {
            let x = (offset as u32) % width;
            let y = (offset as u32) / width;

            pixel_count += 1;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);

            for &(dx, dy) in neighbors {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }
                let noffset = (ny as u32 * width + nx as u32) as usize;
                if mask[noffset] && !claimed[noffset] {
                    claimed[noffset] = true;
                    stack.push(noffset);
                }
            }
        }

        if pixel_count < config.min_pixel_count {
            continue;
        }

        hotspots.push(Hotspot {
            bounding_box: BoundingBox {
                x: min_x,
                y: min_y,
                width: max_x - min_x + 1,
                height: max_y - min_y + 1,
            },
            pixel_count,
            severity: tier(config, pixel_count),
        });
    }

    // Largest regions first; position breaks ties so output is stable
    hotspots.sort_by(|a, b| {
        b.pixel_count
            .cmp(&a.pixel_count)
            .then(a.bounding_box.y.cmp(&b.bounding_box.y))
            .then(a.bounding_box.x.cmp(&b.bounding_box.x))
    });
    hotspots
}

fn tier(config: &DiffConfig, pixel_count: usize) -> Severity {
    if pixel_count > config.moderate_max_pixels {
        Severity::Major
    } else if pixel_count >= config.moderate_min_pixels {
        Severity::Moderate
    } else {
        Severity::Minor
    }
}
