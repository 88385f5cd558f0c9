use image::DynamicImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Result;

use crate::models::Region;

/// Data that flows through the pipeline
/// Before labeling there is one item for the whole image; afterwards one item per region
#[derive(Clone)]
pub struct PipelineData {
    /// The current stage image (grayscale, mask, or a region crop)
    pub image: DynamicImage,

    /// Measured region, set by the labeling step; its bounds locate `image`
    /// in the input
    pub region: Option<Region>,

    /// Stage annotations (e.g., "threshold", "is_hole")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Bool(bool),
    Float(f64),
}

impl PipelineData {
    /// Create PipelineData for a full image
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image,
            region: None,
            metadata: HashMap::new(),
        }
    }

    /// Create PipelineData for one labeled region of an image
    pub fn from_region(image: DynamicImage, region: Region) -> Self {
        Self {
            image,
            region: Some(region),
            metadata: HashMap::new(),
        }
    }

    /// Same item with a new stage image
    pub fn with_image(&self, image: DynamicImage) -> Self {
        Self {
            image,
            region: self.region.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Get metadata as bool
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.metadata.get(key) {
            Some(MetadataValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get metadata as float
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

impl DebugConfig {
    fn save_stage(&self, dir_name: &str, data: &[PipelineData]) -> Result<()> {
        let step_dir = self.output_dir.join(dir_name);
        std::fs::create_dir_all(&step_dir)?;

        for (idx, item) in data.iter().enumerate() {
            let output_path = step_dir.join(format!("{:02}.png", idx + 1));
            item.image.save(&output_path)
                .map_err(|e| anyhow::anyhow!("Failed to save debug image {}: {}", output_path.display(), e))?;
        }

        tracing::debug!("Debug: saved {} images to {}/", data.len(), dir_name);
        Ok(())
    }
}

/// Debug folder name for the `index`-th input (0-based)
///
/// The position prefix keeps inputs that share a file stem apart,
/// e.g. `a/x.tif` and `b/x.tif` become `01_x` and `02_x`.
pub fn input_folder_name(index: usize, path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    format!("{:02}_{}", index + 1, stem)
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Process data and return transformed data
    /// Steps can split data (1 → many), filter (many → fewer), or transform (many → many)
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>>;

    /// Human-readable name for this step (used in logs and debug folder names)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Names of the configured steps, in execution order
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step sequentially on an input image
    pub fn run(&self, input: DynamicImage) -> Result<Vec<PipelineData>> {
        self.run_partial(input, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for inspecting a stage)
    pub fn run_partial(&self, input: DynamicImage, num_steps: usize) -> Result<Vec<PipelineData>> {
        let mut data = vec![PipelineData::from_image(input)];

        if let Some(debug) = &self.context.debug {
            debug.save_stage("00_input", &data)?;
        }

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            let _span = tracing::debug_span!("step", name = step.name()).entered();
            tracing::debug!("Running step {}: {} (processing {} items)", step_idx + 1, step.name(), data.len());

            data = step.process(data, &self.context)?;

            if let Some(debug) = &self.context.debug {
                let dir_name = format!("{:02}_{}", step_idx + 1,
                    step.name().to_lowercase().replace(' ', "_"));
                debug.save_stage(&dir_name, &data)?;
            }

            tracing::debug!("  → {} items", data.len());
        }

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
