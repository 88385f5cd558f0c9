//! Clipped-window median filter.
//!
//! For pixel `(x, y)` the window spans rows `[y - w/2, y + w/2 + 1)` and
//! columns `[x - w/2, x + w/2 + 1)`, clamped to the image, so border windows
//! are smaller. With an even number of samples the result is the mean of the
//! two middle samples, truncated.
//!
//! Each row keeps a 256-bin histogram that slides across the columns, so the
//! cost per pixel is one window column in, one out, plus a histogram scan.
//! Rows are independent and processed in parallel.

use image::GrayImage;
use rayon::prelude::*;

struct Histogram {
    bins: [u32; 256],
    count: u32,
}

impl Histogram {
    fn new() -> Self {
        Self { bins: [0; 256], count: 0 }
    }

    fn add_column(&mut self, img: &GrayImage, x: u32, rows: (u32, u32)) {
        for y in rows.0..rows.1 {
            self.bins[img.get_pixel(x, y)[0] as usize] += 1;
        }
        self.count += rows.1 - rows.0;
    }

    fn remove_column(&mut self, img: &GrayImage, x: u32, rows: (u32, u32)) {
        for y in rows.0..rows.1 {
            self.bins[img.get_pixel(x, y)[0] as usize] -= 1;
        }
        self.count -= rows.1 - rows.0;
    }

    /// Value of the k-th smallest sample (0-based)
    fn kth(&self, k: u32) -> u8 {
        let mut seen = 0u32;
        for (value, &n) in self.bins.iter().enumerate() {
            seen += n;
            if seen > k {
                return value as u8;
            }
        }
        255
    }

    fn median(&self) -> u8 {
        let n = self.count;
        if n % 2 == 1 {
            self.kth(n / 2)
        } else {
            let lo = self.kth(n / 2 - 1) as u32;
            let hi = self.kth(n / 2) as u32;
            ((lo + hi) / 2) as u8
        }
    }
}

/// Half-open window `[c - half, c + half + 1)` clamped to `[0, len)`
fn window(center: u32, half: u32, len: u32) -> (u32, u32) {
    (center.saturating_sub(half), (center + half + 1).min(len))
}

/// Median filter with a square window of side `window_size`.
///
/// Odd sizes are centered; even sizes still run, with the window extending
/// `window_size / 2` on both sides. The input is not modified.
pub fn median_filter(img: &GrayImage, window_size: u32) -> GrayImage {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return img.clone();
    }

    let _span = tracing::debug_span!("median_filter", window_size).entered();
    let half = window_size / 2;
    let mut out = vec![0u8; width as usize * height as usize];

    out.par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let rows = window(y as u32, half, height);
            let mut hist = Histogram::new();

            let (_, first_end) = window(0, half, width);
            for x in 0..first_end {
                hist.add_column(img, x, rows);
            }

            for x in 0..width {
                if x > 0 {
                    // Column leaving on the left, column entering on the right
                    if x > half {
                        hist.remove_column(img, x - half - 1, rows);
                    }
                    if x + half < width {
                        hist.add_column(img, x + half, rows);
                    }
                }
                row[x as usize] = hist.median();
            }
        });

    GrayImage::from_raw(width, height, out)
        .unwrap_or_else(|| GrayImage::new(width, height))
}
