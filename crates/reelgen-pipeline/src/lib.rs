//! Scene assembly pipeline.
//!
//! Scenes are processed one at a time in request order:
//! narration is synthesized and measured, footage is planned to cover it,
//! segments are rendered and joined, then the scene videos and narrations
//! are assembled into one timeline and muxed into the deliverable.

pub mod composer;
pub mod config;
pub mod error;
pub mod logging;
pub mod muxer;
pub mod pipeline;
pub mod timeline;

#[cfg(test)]
pub(crate) mod testing;

pub use composer::{
    plan_coverage, scene_target, CoveragePolicy, PlannedTake, SceneComposer, SceneOptions,
};
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use logging::RequestLogger;
pub use muxer::FinalMuxer;
pub use pipeline::ReelPipeline;
pub use timeline::{Timeline, TimelineAssembler};
