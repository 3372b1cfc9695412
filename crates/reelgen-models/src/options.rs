//! Render option enums: orientation, quality tier, caption anchor and container.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target aspect of the rendered video.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// 9:16, height greater than width
    #[default]
    Portrait,
    /// 16:9, width greater than height
    Landscape,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }

    /// Whether a `width`×`height` frame has this orientation.
    ///
    /// Square frames match both orientations.
    pub fn matches(&self, width: u32, height: u32) -> bool {
        match self {
            Orientation::Portrait => height >= width,
            Orientation::Landscape => width >= height,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pixel dimensions of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Swap width and height.
    pub const fn transpose(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Named preset controlling target dimensions and encode speed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityTier {
    pub const ALL: &'static [QualityTier] =
        &[QualityTier::Low, QualityTier::Medium, QualityTier::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Low => "low",
            QualityTier::Medium => "medium",
            QualityTier::High => "high",
        }
    }

    /// Portrait frame size for this tier.
    fn portrait_size(&self) -> FrameSize {
        match self {
            QualityTier::Low => FrameSize::new(480, 852),
            QualityTier::Medium => FrameSize::new(720, 1280),
            QualityTier::High => FrameSize::new(1080, 1920),
        }
    }

    /// Exact output frame size for an orientation.
    ///
    /// Landscape sizes are the transpose of the portrait sizes.
    pub fn frame_size(&self, orientation: Orientation) -> FrameSize {
        match orientation {
            Orientation::Portrait => self.portrait_size(),
            Orientation::Landscape => self.portrait_size().transpose(),
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Vertical anchor of the caption overlay.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum CaptionPosition {
    Top,
    Center,
    #[default]
    Bottom,
}

impl CaptionPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionPosition::Top => "top",
            CaptionPosition::Center => "center",
            CaptionPosition::Bottom => "bottom",
        }
    }

    /// `drawtext` y expression for this anchor.
    pub fn y_expression(&self) -> &'static str {
        match self {
            CaptionPosition::Top => "h*0.08",
            CaptionPosition::Center => "(h-text_h)/2",
            CaptionPosition::Bottom => "h-text_h-h*0.12",
        }
    }
}

impl fmt::Display for CaptionPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Container of the deliverable file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Mp4,
    Mov,
    Mkv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Mov => "mov",
            OutputFormat::Mkv => "mkv",
        }
    }

    /// Whether the container benefits from moving the index to the front.
    pub fn supports_faststart(&self) -> bool {
        matches!(self, OutputFormat::Mp4 | OutputFormat::Mov)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_portrait_size() {
        assert_eq!(
            QualityTier::Low.frame_size(Orientation::Portrait),
            FrameSize::new(480, 852)
        );
    }

    #[test]
    fn test_landscape_is_transpose() {
        for tier in QualityTier::ALL {
            let p = tier.frame_size(Orientation::Portrait);
            let l = tier.frame_size(Orientation::Landscape);
            assert_eq!(p.width, l.height);
            assert_eq!(p.height, l.width);
        }
    }

    #[test]
    fn test_tiers_are_distinct() {
        let sizes: Vec<_> = QualityTier::ALL
            .iter()
            .map(|t| t.frame_size(Orientation::Portrait))
            .collect();
        assert_ne!(sizes[0], sizes[1]);
        assert_ne!(sizes[1], sizes[2]);
    }

    #[test]
    fn test_orientation_matches() {
        assert!(Orientation::Portrait.matches(1080, 1920));
        assert!(!Orientation::Portrait.matches(1920, 1080));
        assert!(Orientation::Landscape.matches(1920, 1080));
        assert!(Orientation::Portrait.matches(720, 720));
        assert!(Orientation::Landscape.matches(720, 720));
    }


    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&CaptionPosition::Bottom).unwrap();
        assert_eq!(json, "\"bottom\"");
        let tier: QualityTier = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(tier, QualityTier::Low);
    }
}
