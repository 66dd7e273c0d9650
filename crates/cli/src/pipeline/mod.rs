//! Pipeline orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{FeedMode, Pipeline, PipelineConfig};
pub use stats::PipelineStats;
