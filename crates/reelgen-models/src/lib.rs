//! Shared data models for the reelgen backend.
//!
//! This crate provides Serde-serializable types for:
//! - Scene requests and render options
//! - Quality tiers, orientations and target frame sizes
//! - Encoding profiles shared by every rendered segment
//! - Footage candidates and the intermediate/final media assets

pub mod assets;
pub mod encoding;
pub mod footage;
pub mod options;
pub mod scene;

// Re-export common types
pub use assets::{FinalOutput, NarrationAsset, SceneAsset, VideoSegment};
pub use encoding::EncodingProfile;
pub use footage::FootageCandidate;
pub use options::{CaptionPosition, FrameSize, Orientation, OutputFormat, QualityTier};
pub use scene::{RenderRequest, RequestLimits, SceneRequest, ValidationError};
