pub mod preprocessing;
pub mod threshold;
pub mod median;
pub mod regions;
pub mod steps;

use anyhow::Result;
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{HoleCountConfig, NoiseReduction};
use crate::pipeline::Pipeline;
use crate::report::HoleReport;
use steps::*;

/// Build the step pipeline for a configuration:
/// grayscale → (invert) → threshold → noise reduction → labeling → hole filter
pub fn build_pipeline(config: &HoleCountConfig) -> Pipeline {
    let mut pipeline = Pipeline::new()
        .add_step(Arc::new(GrayscaleStep { mode: config.grayscale }));

    if config.invert {
        pipeline = pipeline.add_step(Arc::new(InvertStep));
    }

    pipeline = pipeline.add_step(Arc::new(ThresholdStep { policy: config.threshold }));

    pipeline = match config.noise {
        NoiseReduction::Morphological { open_radius, close_radius } => {
            pipeline.add_step(Arc::new(MorphologyStep { open_radius, close_radius }))
        }
        NoiseReduction::Median { window_size } => {
            pipeline.add_step(Arc::new(MedianFilterStep { window_size }))
        }
        NoiseReduction::None => pipeline,
    };

    pipeline
        .add_step(Arc::new(ComponentLabelingStep))
        .add_step(Arc::new(HoleFilterStep { predicate: config.predicate }))
}

/// Counts holes in images with one configuration
pub struct HoleCounter {
    pub config: HoleCountConfig,
    debug_dir: Option<PathBuf>,
}

impl HoleCounter {
    pub fn new(config: HoleCountConfig) -> Self {
        Self { config, debug_dir: None }
    }

    /// Dump every stage image under `dir` (must be empty or absent)
    pub fn with_debug(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    /// Run the full pipeline on one image
    pub fn count(&self, img: &DynamicImage) -> Result<HoleReport> {
        self.config.validate()?;
        let _span = tracing::debug_span!("count_holes", width = img.width(), height = img.height()).entered();

        let mut pipeline = build_pipeline(&self.config);
        if let Some(dir) = &self.debug_dir {
            pipeline = pipeline.with_debug(dir)?;
        }

        let results = pipeline.run(img.clone())?;
        let holes = results.into_iter().filter_map(|item| item.region).collect();

        Ok(HoleReport::new(img.width(), img.height(), holes))
    }
}

impl Default for HoleCounter {
    fn default() -> Self {
        Self::new(HoleCountConfig::default())
    }
}
