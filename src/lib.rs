//! Geographic rasters to tiled block worlds.
#![forbid(unsafe_code)]

pub mod cli;
pub mod pipeline;

pub use pipeline::{Pipeline, PipelineError, RunOptions, RunSummary};
pub use strata_merge::MergeMode;
pub use strata_runtime::BuildMode;
pub use strata_world::{BuildConfig, load_config_from_path};
