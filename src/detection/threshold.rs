//! Global thresholding of a 16-bit intensity image into a 0/255 mask.
//!
//! Intensities stay at 16 bits up to this point so a channel mean is not
//! rounded to an 8-bit level before the comparison; an 8-bit value `v`
//! appears as `v * 257`. Levels are reported in the same units.
//!
//! Foreground is always `value > level`. A uniform image has no second
//! class; `level_for` then returns the image's only value so the mask is
//! all-background.

use image::{GrayImage, ImageBuffer, Luma};

use crate::config::ThresholdPolicy;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Width of one 8-bit intensity step on the 16-bit scale
pub const LEVEL_STEP: f64 = 257.0;

pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Otsu level: maximizes between-class variance of the 256-bin histogram
pub fn otsu_level(gray: &Gray16Image) -> f64 {
    let narrow = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([((gray.get_pixel(x, y)[0] as u32 + 128) / 257) as u8])
    });
    imageproc::contrast::otsu_level(&narrow) as f64 * LEVEL_STEP
}

/// `fraction` times the mean intensity
pub fn mean_level(gray: &Gray16Image, fraction: f64) -> f64 {
    let count = gray.width() as u64 * gray.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = gray.pixels().map(|p| p[0] as u64).sum();
    fraction * (sum as f64 / count as f64)
}

/// Compute the level for a policy
pub fn level_for(gray: &Gray16Image, policy: ThresholdPolicy) -> f64 {
    let mut values = gray.pixels().map(|p| p[0]);
    if let Some(first) = values.next() {
        if values.all(|v| v == first) {
            return first as f64;
        }
    }

    match policy {
        ThresholdPolicy::Otsu => otsu_level(gray),
        ThresholdPolicy::MeanFraction { fraction } => mean_level(gray, fraction),
    }
}

/// Pixels strictly above `level` become foreground
pub fn binarize(gray: &Gray16Image, level: f64) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] as f64 > level {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    })
}
