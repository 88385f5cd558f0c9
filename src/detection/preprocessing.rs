use image::{DynamicImage, Luma};

use crate::config::GrayscaleMode;
use super::threshold::Gray16Image;

/// Convert image to a single 16-bit luminance channel
pub fn to_grayscale(img: &DynamicImage, mode: GrayscaleMode) -> Gray16Image {
    match mode {
        // Rec. 709 luma weights
        GrayscaleMode::Luminance => img.to_luma16(),
        GrayscaleMode::ChannelMean => {
            let rgb = img.to_rgb16();
            Gray16Image::from_fn(rgb.width(), rgb.height(), |x, y| {
                let p = rgb.get_pixel(x, y);
                let sum = p[0] as u32 + p[1] as u32 + p[2] as u32;
                Luma([((sum + 1) / 3) as u16])
            })
        }
    }
}

/// Flip polarity relative to the brightest pixel so dark holes become bright
pub fn invert(gray: &Gray16Image) -> Gray16Image {
    let max = gray.pixels().map(|p| p[0]).max().unwrap_or(0);
    let mut out = gray.clone();
    for p in out.pixels_mut() {
        p[0] = max - p[0];
    }
    out
}
