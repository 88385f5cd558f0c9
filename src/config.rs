use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::Region;

/// How color channels are collapsed into one luminance channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrayscaleMode {
    /// Perceptually weighted luma
    Luminance,
    /// Plain average of the color channels
    ChannelMean,
}

/// Global threshold selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// Histogram-based bimodal separation (Otsu)
    Otsu,
    /// Fixed multiple of the mean intensity
    MeanFraction { fraction: f64 },
}

/// Speckle removal applied to the binary mask
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoiseReduction {
    /// Opening with a disk of `open_radius`, then closing with a disk of `close_radius`
    Morphological { open_radius: u8, close_radius: u8 },
    /// Clipped-window median filter
    Median { window_size: u32 },
    None,
}

/// Decides which labeled regions count as holes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HolePredicate {
    /// circularity > min_circularity AND area >= min_area
    ShapeAndSize { min_circularity: f64, min_area: u32 },
    /// area > min_area
    SizeOnly { min_area: u32 },
}

impl HolePredicate {
    pub fn is_hole(&self, region: &Region) -> bool {
        match *self {
            HolePredicate::ShapeAndSize { min_circularity, min_area } => {
                region.circularity() > min_circularity && region.area() >= min_area
            }
            HolePredicate::SizeOnly { min_area } => region.area() > min_area,
        }
    }
}

/// Named parameter sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Inverted Otsu mask, disk opening/closing, circularity + size test
    Circular,
    /// Half-mean mask, median window 20, area > 20
    Median,
    /// 0.3x mean mask, median window 30, area > 25
    MedianSelective,
}

/// All tunable parameters of one hole-counting run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleCountConfig {
    pub grayscale: GrayscaleMode,
    /// Flip polarity so dark holes become foreground
    pub invert: bool,
    pub threshold: ThresholdPolicy,
    pub noise: NoiseReduction,
    pub predicate: HolePredicate,
}

impl HoleCountConfig {
    pub fn circular() -> Self {
        Self {
            grayscale: GrayscaleMode::Luminance,
            invert: true,
            threshold: ThresholdPolicy::Otsu,
            noise: NoiseReduction::Morphological {
                open_radius: 3,
                close_radius: 1,
            },
            predicate: HolePredicate::ShapeAndSize {
                min_circularity: 0.8,
                min_area: 100,
            },
        }
    }

    pub fn median() -> Self {
        Self {
            grayscale: GrayscaleMode::ChannelMean,
            invert: false,
            threshold: ThresholdPolicy::MeanFraction { fraction: 0.5 },
            noise: NoiseReduction::Median { window_size: 20 },
            predicate: HolePredicate::SizeOnly { min_area: 20 },
        }
    }

    pub fn median_selective() -> Self {
        Self {
            grayscale: GrayscaleMode::ChannelMean,
            invert: false,
            threshold: ThresholdPolicy::MeanFraction { fraction: 0.3 },
            noise: NoiseReduction::Median { window_size: 30 },
            predicate: HolePredicate::SizeOnly { min_area: 25 },
        }
    }

    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Circular => Self::circular(),
            Preset::Median => Self::median(),
            Preset::MedianSelective => Self::median_selective(),
        }
    }

    /// Load a JSON config file and validate it
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    /// Reject parameter values no stage can run with
    pub fn validate(&self) -> Result<()> {
        if let ThresholdPolicy::MeanFraction { fraction } = self.threshold {
            if !fraction.is_finite() || fraction < 0.0 {
                bail!("Threshold fraction must be a non-negative number, got {}", fraction);
            }
        }

        if let NoiseReduction::Median { window_size } = self.noise {
            if window_size == 0 {
                bail!("Median window size must be at least 1");
            }
        }

        if let HolePredicate::ShapeAndSize { min_circularity, .. } = self.predicate {
            if !min_circularity.is_finite() || min_circularity < 0.0 {
                bail!("Circularity cutoff must be a non-negative number, got {}", min_circularity);
            }
        }

        Ok(())
    }
}

impl Default for HoleCountConfig {
    fn default() -> Self {
        Self::circular()
    }
}
