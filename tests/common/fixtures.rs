#![allow(dead_code)]

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use std::collections::VecDeque;
use wormholes::detection::threshold::Gray16Image;

/// Pixels of a raster disk `dx² + dy² <= r²` centered at (cx, cy), clipped to the image
pub fn paint_disk(img: &mut GrayImage, cx: i64, cy: i64, r: i64, value: u8) {
    for dy in -r..=r {
        for dx in -r..=r {
            let (x, y) = (cx + dx, cy + dy);
            if dx * dx + dy * dy <= r * r
                && x >= 0
                && y >= 0
                && x < img.width() as i64
                && y < img.height() as i64
            {
                img.put_pixel(x as u32, y as u32, Luma([value]));
            }
        }
    }
}

pub fn paint_rect(img: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32, value: u8) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            img.put_pixel(x, y, Luma([value]));
        }
    }
}

/// Mask with a single disk of radius `r` centered in a `size`x`size` image
pub fn disk_mask(size: u32, r: i64) -> GrayImage {
    let mut mask = GrayImage::new(size, size);
    paint_disk(&mut mask, size as i64 / 2, size as i64 / 2, r, 255);
    mask
}

/// Deterministic pseudo-random gray image (xorshift)
pub fn noise_image(width: u32, height: u32, seed: u64) -> GrayImage {
    let mut state = seed.max(1);
    GrayImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        Luma([(state >> 24) as u8])
    })
}

/// Deterministic pseudo-random 0/255 mask with roughly `percent`% foreground
pub fn noise_mask(width: u32, height: u32, seed: u64, percent: u8) -> GrayImage {
    let noise = noise_image(width, height, seed);
    GrayImage::from_fn(width, height, |x, y| {
        let v = noise.get_pixel(x, y)[0] as u32 * 100 / 256;
        Luma([if v < percent as u32 { 255 } else { 0 }])
    })
}

/// Straightforward clipped-window median, recomputed from scratch per pixel
pub fn naive_median(img: &GrayImage, window_size: u32) -> GrayImage {
    let (w, h) = img.dimensions();
    let half = window_size / 2;
    GrayImage::from_fn(w, h, |x, y| {
        let mut values = Vec::new();
        for yy in y.saturating_sub(half)..(y + half + 1).min(h) {
            for xx in x.saturating_sub(half)..(x + half + 1).min(w) {
                values.push(img.get_pixel(xx, yy)[0] as u32);
            }
        }
        values.sort_unstable();
        let n = values.len();
        let m = if n % 2 == 1 {
            values[n / 2]
        } else {
            (values[n / 2 - 1] + values[n / 2]) / 2
        };
        Luma([m as u8])
    })
}

/// Binary erosion (`erode = true`) or dilation of a 0/255 mask with the disk
/// `dx² + dy² <= r²`, computed pixel by pixel; out-of-image pixels are skipped
pub fn reference_disk_morphology(mask: &GrayImage, r: i64, erode: bool) -> GrayImage {
    let (w, h) = (mask.width() as i64, mask.height() as i64);
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        let mut hit = erode;
        for dy in -r..=r {
            for dx in -r..=r {
                let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                if dx * dx + dy * dy > r * r || nx < 0 || ny < 0 || nx >= w || ny >= h {
                    continue;
                }
                let fg = mask.get_pixel(nx as u32, ny as u32)[0] != 0;
                if erode && !fg {
                    hit = false;
                }
                if !erode && fg {
                    hit = true;
                }
            }
        }
        Luma([if hit { 255 } else { 0 }])
    })
}

/// Opening (erode then dilate) with a disk of radius `r`
pub fn reference_open(mask: &GrayImage, r: i64) -> GrayImage {
    reference_disk_morphology(&reference_disk_morphology(mask, r, true), r, false)
}

/// Closing (dilate then erode) with a disk of radius `r`
pub fn reference_close(mask: &GrayImage, r: i64) -> GrayImage {
    reference_disk_morphology(&reference_disk_morphology(mask, r, false), r, true)
}

/// 8-bit image on the 16-bit intensity scale (`v` becomes `v * 257`)
pub fn widen(gray: &GrayImage) -> Gray16Image {
    DynamicImage::ImageLuma8(gray.clone()).to_luma16()
}

/// Independent 4-connected flood-fill component count
pub fn flood_fill_count(mask: &GrayImage) -> usize {
    let (w, h) = mask.dimensions();
    let mut seen = vec![false; (w * h) as usize];
    let mut count = 0;

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            if seen[idx] || mask.get_pixel(x, y)[0] == 0 {
                continue;
            }
            count += 1;
            seen[idx] = true;
            let mut queue = VecDeque::from([(x, y)]);
            while let Some((cx, cy)) = queue.pop_front() {
                let neighbors = [
                    (cx.wrapping_sub(1), cy),
                    (cx + 1, cy),
                    (cx, cy.wrapping_sub(1)),
                    (cx, cy + 1),
                ];
                for (nx, ny) in neighbors {
                    if nx >= w || ny >= h {
                        continue;
                    }
                    let nidx = (ny * w + nx) as usize;
                    if !seen[nidx] && mask.get_pixel(nx, ny)[0] != 0 {
                        seen[nidx] = true;
                        queue.push_back((nx, ny));
                    }
                }
            }
        }
    }

    count
}

/// Light plate with two dark round holes, a dark speck and a dark elongated bar
pub fn holes_photo() -> DynamicImage {
    let mut gray = GrayImage::from_pixel(160, 100, Luma([200]));
    paint_disk(&mut gray, 30, 30, 8, 30);
    paint_disk(&mut gray, 100, 50, 12, 30);
    paint_disk(&mut gray, 60, 80, 1, 30);
    paint_rect(&mut gray, 70, 85, 60, 8, 30);

    let rgb = RgbImage::from_fn(160, 100, |x, y| {
        let v = gray.get_pixel(x, y)[0];
        Rgb([v, v, v])
    });
    DynamicImage::ImageRgb8(rgb)
}

/// Black background with two large bright blobs and one small one
pub fn blobs_photo() -> DynamicImage {
    let mut gray = GrayImage::new(120, 80);
    paint_disk(&mut gray, 30, 40, 15, 220);
    paint_disk(&mut gray, 90, 40, 15, 220);
    paint_disk(&mut gray, 60, 8, 3, 220);

    let rgb = RgbImage::from_fn(120, 80, |x, y| {
        let v = gray.get_pixel(x, y)[0];
        Rgb([v, v / 2, v])
    });
    DynamicImage::ImageRgb8(rgb)
}
