//! Segment renderer: one footage candidate in, one captioned segment out.

use std::path::PathBuf;

use reelgen_models::{
    CaptionPosition, EncodingProfile, FootageCandidate, Orientation, QualityTier, VideoSegment,
};
use reqwest::Client;
use tracing::info;

use crate::command::FfmpegRunner;
use crate::download::download_to_file;
use crate::error::{MediaError, MediaResult};
use crate::filters::build_segment_filter;
use crate::operation::MediaOperation;
use crate::workspace::{AssetKind, RequestWorkspace};

/// Shortest segment ever rendered, in seconds.
pub const DEFAULT_RENDER_FLOOR_SECS: f64 = 0.6;

/// Everything needed to render one segment.
#[derive(Debug, Clone)]
pub struct SegmentSpec {
    pub candidate: FootageCandidate,
    pub duration_secs: f64,
    pub orientation: Orientation,
    pub quality: QualityTier,
    pub caption: String,
    pub caption_position: CaptionPosition,
}

/// Apply the render floor to a requested duration.
pub fn floored_duration(requested: f64, floor: f64) -> f64 {
    if requested.is_finite() {
        requested.max(floor)
    } else {
        floor
    }
}

/// Downloads a candidate and renders it to the request's target format.
#[derive(Debug, Clone)]
pub struct SegmentRenderer {
    runner: FfmpegRunner,
    http: Client,
    floor_secs: f64,
}

impl SegmentRenderer {
    pub fn new(runner: FfmpegRunner, http: Client, floor_secs: f64) -> Self {
        Self {
            runner,
            http,
            floor_secs,
        }
    }

    /// Build the render operation for an already-downloaded source.
    pub fn operation(&self, spec: &SegmentSpec, source: PathBuf, output: PathBuf) -> MediaOperation {
        let size = spec.quality.frame_size(spec.orientation);
        MediaOperation::RenderSegment {
            source,
            output,
            duration_secs: floored_duration(spec.duration_secs, self.floor_secs),
            filter: build_segment_filter(&spec.caption, size, spec.caption_position),
            profile: EncodingProfile::for_tier(spec.quality),
        }
    }

    /// Download the source clip and render the segment.
    pub async fn render(
        &self,
        workspace: &RequestWorkspace,
        spec: &SegmentSpec,
    ) -> MediaResult<VideoSegment> {
        let source = workspace
            .allocate_with_extension(AssetKind::SourceClip, &spec.candidate.extension_hint());
        download_to_file(&self.http, &spec.candidate.url, &source).await?;

        let output = workspace.allocate(AssetKind::Segment);
        let op = self.operation(spec, source, output.clone());
        let duration_secs = match &op {
            MediaOperation::RenderSegment { duration_secs, .. } => *duration_secs,
            _ => spec.duration_secs,
        };

        self.runner.execute(&op).await?;

        if !output.is_file() {
            return Err(MediaError::RenderFailed {
                message: format!("FFmpeg produced no output at {}", output.display()),
                stderr_tail: String::new(),
                exit_code: None,
            });
        }

        let size = spec.quality.frame_size(spec.orientation);
        info!(
            request_id = %workspace.request_id(),
            source = %spec.candidate.url,
            duration_secs = duration_secs,
            size = %size,
            "Rendered segment"
        );

        Ok(VideoSegment {
            path: output,
            duration_secs,
            size,
        })
    }
}
