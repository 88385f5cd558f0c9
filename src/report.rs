use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use serde::Serialize;

use crate::models::Region;

/// Marker radius in pixels (a 15 pt dot)
pub const MARKER_RADIUS: i32 = 7;
pub const MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
/// Gap between panels of a side-by-side figure
pub const PANEL_GAP: u32 = 16;

/// Result of counting holes in one image
#[derive(Debug, Clone, Serialize)]
pub struct HoleReport {
    pub width: u32,
    pub height: u32,
    pub holes: Vec<Region>,
}

impl HoleReport {
    pub fn new(width: u32, height: u32, holes: Vec<Region>) -> Self {
        Self { width, height, holes }
    }

    pub fn count(&self) -> usize {
        self.holes.len()
    }

    /// Original image with a marker at each hole centroid
    pub fn annotate(&self, original: &DynamicImage) -> RgbImage {
        annotate(original, &self.holes)
    }
}

/// Draw a filled marker at each region centroid on an RGB copy of `original`
pub fn annotate(original: &DynamicImage, holes: &[Region]) -> RgbImage {
    let mut canvas = original.to_rgb8();
    for hole in holes {
        let (row, col) = hole.centroid();
        draw_filled_circle_mut(
            &mut canvas,
            (col.round() as i32, row.round() as i32),
            MARKER_RADIUS,
            MARKER_COLOR,
        );
    }
    canvas
}

/// Place panels left to right on a white background, top-aligned
pub fn side_by_side(panels: &[RgbImage]) -> RgbImage {
    let gaps = PANEL_GAP * panels.len().saturating_sub(1) as u32;
    let width = panels.iter().map(|p| p.width()).sum::<u32>() + gaps;
    let height = panels.iter().map(|p| p.height()).max().unwrap_or(0);

    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    let mut offset_x = 0i64;
    for panel in panels {
        image::imageops::overlay(&mut canvas, panel, offset_x, 0);
        offset_x += (panel.width() + PANEL_GAP) as i64;
    }
    canvas
}
