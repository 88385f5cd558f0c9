use image::{GrayImage, ImageBuffer, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use std::collections::HashMap;

use crate::models::Region;
use super::threshold::{BACKGROUND, FOREGROUND};

pub type LabelImage = ImageBuffer<Luma<u32>, Vec<u32>>;

/// Chain-code step weights for even (axis) and odd (diagonal) moves
const EVEN_STEP: f64 = 0.948;
const ODD_STEP: f64 = 1.343;

/// Moore neighborhood, clockwise from east, as (dx, dy)
const DIRECTIONS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

struct Accumulator {
    label: u32,
    start: (u32, u32),
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    count: u32,
    sum_x: u64,
    sum_y: u64,
}

/// Label 4-connected foreground regions (any non-zero pixel) and measure them.
///
/// Regions are numbered 1..n in raster order of their first pixel.
pub fn label_regions(mask: &GrayImage) -> Vec<Region> {
    // connected_components separates neighbors with different values, so
    // collapse every non-zero level to one foreground value first
    let binary = GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([if mask.get_pixel(x, y)[0] != 0 { FOREGROUND } else { BACKGROUND }])
    });
    let labeled = connected_components(&binary, Connectivity::Four, Luma([BACKGROUND]));

    let mut order: HashMap<u32, usize> = HashMap::new();
    let mut accumulators: Vec<Accumulator> = Vec::new();

    for (x, y, label) in labeled.enumerate_pixels() {
        let label_val = label[0];
        if label_val == 0 {
            continue; // Skip background
        }

        let idx = *order.entry(label_val).or_insert_with(|| {
            accumulators.push(Accumulator {
                label: label_val,
                start: (x, y),
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
                count: 0,
                sum_x: 0,
                sum_y: 0,
            });
            accumulators.len() - 1
        });

        let acc = &mut accumulators[idx];
        acc.min_x = acc.min_x.min(x);
        acc.min_y = acc.min_y.min(y);
        acc.max_x = acc.max_x.max(x);
        acc.max_y = acc.max_y.max(y);
        acc.count += 1;
        acc.sum_x += x as u64;
        acc.sum_y += y as u64;
    }

    accumulators
        .into_iter()
        .enumerate()
        .map(|(idx, acc)| Region {
            label: idx as u32 + 1,
            min_x: acc.min_x,
            min_y: acc.min_y,
            max_x: acc.max_x,
            max_y: acc.max_y,
            pixel_count: acc.count,
            centroid_y: acc.sum_y as f64 / acc.count as f64,
            centroid_x: acc.sum_x as f64 / acc.count as f64,
            perimeter: trace_perimeter(&labeled, acc.label, acc.start),
        })
        .collect()
}

/// Length of the outer boundary of region `label`, traced through pixel centers.
///
/// `start` must be the region's topmost-leftmost pixel. Moore-neighbor
/// tracing visits the 8-connected outer contour and stops when it repeats
/// its first move; moves are weighted with Kulpa's chain-code coefficients,
/// which keep digital disks close to circularity 1.0. A single pixel has
/// perimeter 0 and inner holes are not counted.
pub fn trace_perimeter(labels: &LabelImage, label: u32, start: (u32, u32)) -> f64 {
    let (w, h) = (labels.width() as i64, labels.height() as i64);
    let member = |x: i64, y: i64| {
        x >= 0 && y >= 0 && x < w && y < h && labels.get_pixel(x as u32, y as u32)[0] == label
    };

    let mut cur = (start.0 as i64, start.1 as i64);
    // Pretend we arrived moving north-east so the first search starts at north-west
    let mut dir = 7usize;
    let mut first: Option<((i64, i64), usize)> = None;
    let (mut even, mut odd) = (0u64, 0u64);

    // Every boundary pixel is left at most four times
    let max_moves = 4 * (w * h) as u64 + 8;
    for _ in 0..max_moves {
        let next = (0..8)
            .map(|i| (dir + 6 + i) % 8)
            .find(|&d| member(cur.0 + DIRECTIONS[d].0, cur.1 + DIRECTIONS[d].1));

        let Some(d) = next else {
            break; // isolated pixel
        };

        if first == Some((cur, d)) {
            break;
        }
        if first.is_none() {
            first = Some((cur, d));
        }

        if d % 2 == 0 {
            even += 1;
        } else {
            odd += 1;
        }
        cur = (cur.0 + DIRECTIONS[d].0, cur.1 + DIRECTIONS[d].1);
        dir = d;
    }

    EVEN_STEP * even as f64 + ODD_STEP * odd as f64
}
