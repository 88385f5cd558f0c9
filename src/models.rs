use serde::Serialize;

/// A connected set of foreground pixels produced by one labeling pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub label: u32,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub pixel_count: u32,
    /// Mean row of member pixels
    pub centroid_y: f64,
    /// Mean column of member pixels
    pub centroid_x: f64,
    /// Approximate boundary length (see `detection::regions::trace_perimeter`)
    pub perimeter: f64,
}

impl Region {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn area(&self) -> u32 {
        self.pixel_count
    }

    /// Isoperimetric ratio `4πA / P²`, 1.0 for a perfect disk.
    ///
    /// Regions without a measurable boundary (single pixels) score 0.0 so
    /// they never pass a circularity cutoff.
    pub fn circularity(&self) -> f64 {
        if self.perimeter <= 0.0 {
            return 0.0;
        }

        (4.0 * std::f64::consts::PI * self.pixel_count as f64) / (self.perimeter * self.perimeter)
    }

    /// Centroid as (row, col)
    pub fn centroid(&self) -> (f64, f64) {
        (self.centroid_y, self.centroid_x)
    }
}
