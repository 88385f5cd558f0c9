mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from wormholes for tests
pub use wormholes::{
    GrayscaleMode, HoleCountConfig, HoleCounter, HolePredicate, HoleReport, NoiseReduction,
    Preset, Region, ThresholdPolicy,
};
