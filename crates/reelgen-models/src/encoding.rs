//! Video encoding profile shared by every segment of a request.
//!
//! Copy concatenation only works when every segment carries the same codec,
//! pixel format, frame rate and frame size, so the profile is a pure function
//! of the quality tier.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::options::QualityTier;

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Pixel format for broad player compatibility
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";
/// Output frame rate of every segment
pub const DEFAULT_FRAME_RATE: u32 = 30;
/// Audio codec of the final mux
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Audio bitrate of the final mux
pub const DEFAULT_AUDIO_BITRATE: &str = "192k";

/// Video encoding profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EncodingProfile {
    /// Video codec (e.g., "libx264")
    pub codec: String,

    /// Encoding preset (e.g., "ultrafast", "veryfast")
    pub preset: String,

    /// Constant Rate Factor (quality, 0-51, lower is better)
    pub crf: u8,

    /// Pixel format
    pub pixel_format: String,

    /// Output frame rate
    pub frame_rate: u32,
}

impl Default for EncodingProfile {
    fn default() -> Self {
        Self::for_tier(QualityTier::default())
    }
}

impl EncodingProfile {
    /// Profile for a quality tier.
    pub fn for_tier(tier: QualityTier) -> Self {
        let (preset, crf) = match tier {
            QualityTier::Low => ("ultrafast", 28),
            QualityTier::Medium => ("veryfast", 23),
            QualityTier::High => ("fast", 20),
        };

        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: preset.to_string(),
            crf,
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }

    /// Convert to FFmpeg output arguments.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-pix_fmt".to_string(),
            self.pixel_format.clone(),
            "-r".to_string(),
            self.frame_rate.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = EncodingProfile::default();
        assert_eq!(profile.codec, "libx264");
        assert_eq!(profile.crf, 23);
        assert_eq!(profile.pixel_format, "yuv420p");
    }

    #[test]
    fn test_ffmpeg_args() {
        let args = EncodingProfile::for_tier(QualityTier::Low).to_ffmpeg_args();
        assert!(args.contains(&"-c:v".to_string()));
        assert!(args.contains(&"ultrafast".to_string()));
        assert!(args.contains(&"-pix_fmt".to_string()));
        assert!(args.contains(&"28".to_string()));
    }

    #[test]
    fn test_profile_is_deterministic_per_tier() {
        for tier in QualityTier::ALL {
            assert_eq!(EncodingProfile::for_tier(*tier), EncodingProfile::for_tier(*tier));
        }
    }
}
