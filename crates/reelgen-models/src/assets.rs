//! Media assets produced along the pipeline.
//!
//! Every asset is write-once: it is created by one stage and only read by the
//! stages after it.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::options::FrameSize;

/// Synthesized narration audio with its probed duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NarrationAsset {
    pub path: PathBuf,
    pub duration_secs: f64,
}

/// One rendered, captioned, fixed-size video segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoSegment {
    pub path: PathBuf,
    pub duration_secs: f64,
    pub size: FrameSize,
}

/// A scene's video paired with its narration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneAsset {
    /// Position of the scene in the request
    pub index: usize,
    /// Scene video (single segment or concatenation of segments)
    pub video: PathBuf,
    /// Planned scene video duration in seconds
    pub video_secs: f64,
    /// Number of segments the scene video was built from
    pub segments: usize,
    pub narration: NarrationAsset,
}

/// The muxed deliverable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FinalOutput {
    pub path: PathBuf,
    /// File name under the output directory
    pub file_name: String,
    pub duration_secs: f64,
    pub scenes: usize,
}
