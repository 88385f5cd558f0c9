pub mod config;
pub mod detection;
pub mod models;
pub mod pipeline;
pub mod report;

pub use config::{GrayscaleMode, HoleCountConfig, HolePredicate, NoiseReduction, Preset, ThresholdPolicy};
pub use detection::{HoleCounter, build_pipeline};
pub use models::Region;
pub use pipeline::{
    Pipeline, PipelineData, PipelineStep, PipelineContext,
    MetadataValue, DebugConfig, input_folder_name
};
pub use report::HoleReport;
