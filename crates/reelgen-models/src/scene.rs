//! Scene requests and request-level validation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::{CaptionPosition, Orientation, OutputFormat, QualityTier};

/// Default narration language tag.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Longest accepted narration text per scene.
pub const MAX_SCENE_TEXT_CHARS: usize = 5000;

/// Upper bound for the per-scene clip count override.
pub const MAX_CLIPS_PER_SCENE: usize = 10;

/// One narration + visual unit of the output timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneRequest {
    /// Narration text (also used as caption)
    pub text: String,

    /// Footage search query; falls back to `text`
    #[serde(default, alias = "query")]
    pub search: Option<String>,

    /// Minimum seconds taken from a single footage clip
    #[serde(default)]
    pub min_clip_sec: Option<f64>,

    /// Maximum number of footage clips used for this scene
    #[serde(default)]
    pub max_clips: Option<usize>,

    /// Narration language tag (e.g. "en", "pt-BR")
    #[serde(default, alias = "lang")]
    pub language: Option<String>,
}

impl SceneRequest {
    /// Create a scene with only narration text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            search: None,
            min_clip_sec: None,
            max_clips: None,
            language: None,
        }
    }

    /// Set the footage search query.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Search query, falling back to the narration text.
    pub fn search_query(&self) -> &str {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.text.trim())
    }

    /// Language tag, falling back to [`DEFAULT_LANGUAGE`].
    pub fn language_tag(&self) -> &str {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Minimum clip seconds with a configured fallback.
    pub fn min_clip_or(&self, default: f64) -> f64 {
        self.min_clip_sec.unwrap_or(default)
    }

    /// Clip cap with a configured fallback.
    pub fn max_clips_or(&self, default: usize) -> usize {
        self.max_clips.unwrap_or(default)
    }
}

/// Full request payload: ordered scenes plus rendering options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RenderRequest {
    pub scenes: Vec<SceneRequest>,

    #[serde(default)]
    pub orientation: Orientation,

    #[serde(default)]
    pub caption_position: CaptionPosition,

    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub quality: QualityTier,
}

impl RenderRequest {
    pub fn new(scenes: Vec<SceneRequest>) -> Self {
        Self {
            scenes,
            orientation: Orientation::default(),
            caption_position: CaptionPosition::default(),
            format: OutputFormat::default(),
            quality: QualityTier::default(),
        }
    }

    /// Validate the request against configured limits.
    ///
    /// Runs before any external call is made.
    pub fn validate(&self, limits: &RequestLimits) -> Result<(), ValidationError> {
        if self.scenes.is_empty() {
            return Err(ValidationError::NoScenes);
        }

        if self.scenes.len() > limits.max_scenes {
            return Err(ValidationError::TooManyScenes {
                count: self.scenes.len(),
                max: limits.max_scenes,
            });
        }

        for (index, scene) in self.scenes.iter().enumerate() {
            if scene.text.trim().is_empty() {
                return Err(ValidationError::EmptyText { index });
            }

            let chars = scene.text.chars().count();
            if chars > MAX_SCENE_TEXT_CHARS {
                return Err(ValidationError::TextTooLong {
                    index,
                    chars,
                    max: MAX_SCENE_TEXT_CHARS,
                });
            }

            if let Some(min_clip) = scene.min_clip_sec {
                if !min_clip.is_finite() || min_clip <= 0.0 || min_clip > limits.max_scene_secs {
                    return Err(ValidationError::InvalidMinClip {
                        index,
                        value: min_clip,
                    });
                }
            }

            if let Some(max_clips) = scene.max_clips {
                if max_clips == 0 || max_clips > MAX_CLIPS_PER_SCENE {
                    return Err(ValidationError::InvalidMaxClips {
                        index,
                        value: max_clips,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Limits applied by [`RenderRequest::validate`].
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub max_scenes: usize,
    pub max_scene_secs: f64,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_scenes: 10,
            max_scene_secs: 60.0,
        }
    }
}

/// Malformed scene list from the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("At least one scene is required")]
    NoScenes,

    #[error("Too many scenes: {count} (max {max})")]
    TooManyScenes { count: usize, max: usize },

    #[error("Scene {index} has empty narration text")]
    EmptyText { index: usize },

    #[error("Scene {index} text is {chars} characters (max {max})")]
    TextTooLong { index: usize, chars: usize, max: usize },

    #[error("Scene {index} has invalid min_clip_sec: {value}")]
    InvalidMinClip { index: usize, value: f64 },

    #[error("Scene {index} has invalid max_clips: {value}")]
    InvalidMaxClips { index: usize, value: usize },
}
