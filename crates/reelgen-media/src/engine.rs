//! The media engine seam used by the pipeline.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reelgen_models::{OutputFormat, VideoSegment};
use reqwest::Client;
use tracing::debug;

use crate::command::{FfmpegRunner, DEFAULT_STDERR_TAIL_LINES};
use crate::concat::{concat_copy, ensure_inputs_exist, ensure_uniform_video};
use crate::error::MediaResult;
use crate::mux::mux_streams;
use crate::probe::probe_duration;
use crate::segment::{SegmentRenderer, SegmentSpec, DEFAULT_RENDER_FLOOR_SECS};
use crate::workspace::{AssetKind, RequestWorkspace};

/// Media operations needed to assemble a video.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Download a footage candidate and render one captioned segment.
    async fn render_segment(
        &self,
        workspace: &RequestWorkspace,
        spec: &SegmentSpec,
    ) -> MediaResult<VideoSegment>;

    /// Join video files in order without re-encoding.
    async fn concat_video(
        &self,
        workspace: &RequestWorkspace,
        inputs: &[PathBuf],
        kind: AssetKind,
    ) -> MediaResult<PathBuf>;

    /// Join audio files in order without re-encoding.
    async fn concat_audio(
        &self,
        workspace: &RequestWorkspace,
        inputs: &[PathBuf],
        kind: AssetKind,
    ) -> MediaResult<PathBuf>;

    /// Combine a video track and an audio track, trimmed to the shorter.
    async fn mux(
        &self,
        workspace: &RequestWorkspace,
        video: &Path,
        audio: &Path,
        format: OutputFormat,
    ) -> MediaResult<PathBuf>;

    /// Measured duration of a media file in seconds.
    async fn probe_duration(&self, path: &Path) -> MediaResult<f64>;
}

/// Tunables of the FFmpeg-backed engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Worker threads per FFmpeg process
    pub ffmpeg_threads: u32,
    /// Stderr lines kept in error messages
    pub stderr_tail_lines: usize,
    /// Per-process timeout
    pub ffmpeg_timeout_secs: Option<u64>,
    /// Shortest segment rendered
    pub render_floor_secs: f64,
    /// Probe every video input before copy concatenation
    pub verify_uniform_concat: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            ffmpeg_threads: 1,
            stderr_tail_lines: DEFAULT_STDERR_TAIL_LINES,
            ffmpeg_timeout_secs: None,
            render_floor_secs: DEFAULT_RENDER_FLOOR_SECS,
            verify_uniform_concat: true,
        }
    }
}

/// [`MediaEngine`] backed by the ffmpeg and ffprobe binaries.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    runner: FfmpegRunner,
    renderer: SegmentRenderer,
    verify_uniform_concat: bool,
}

impl FfmpegEngine {
    pub fn new(settings: &EngineSettings, http: Client) -> Self {
        let mut runner = FfmpegRunner::new()
            .with_threads(settings.ffmpeg_threads)
            .with_tail_lines(settings.stderr_tail_lines);
        if let Some(secs) = settings.ffmpeg_timeout_secs {
            runner = runner.with_timeout(secs);
        }

        Self {
            renderer: SegmentRenderer::new(runner.clone(), http, settings.render_floor_secs),
            runner,
            verify_uniform_concat: settings.verify_uniform_concat,
        }
    }

    async fn concat(
        &self,
        workspace: &RequestWorkspace,
        inputs: &[PathBuf],
        kind: AssetKind,
    ) -> MediaResult<PathBuf> {
        ensure_inputs_exist(inputs)?;

        if inputs.len() == 1 {
            debug!(kind = ?kind, "Single input, skipping concatenation");
            return Ok(inputs[0].clone());
        }

        let extension = inputs[0]
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| kind.default_extension().to_string());
        let output = workspace.allocate_with_extension(kind, &extension);
        let list_file = workspace.allocate(AssetKind::ConcatList);

        concat_copy(&self.runner, inputs, &list_file, &output).await?;
        Ok(output)
    }
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    async fn render_segment(
        &self,
        workspace: &RequestWorkspace,
        spec: &SegmentSpec,
    ) -> MediaResult<VideoSegment> {
        self.renderer.render(workspace, spec).await
    }

    async fn concat_video(
        &self,
        workspace: &RequestWorkspace,
        inputs: &[PathBuf],
        kind: AssetKind,
    ) -> MediaResult<PathBuf> {
        ensure_inputs_exist(inputs)?;
        if self.verify_uniform_concat && inputs.len() > 1 {
            ensure_uniform_video(inputs).await?;
        }
        self.concat(workspace, inputs, kind).await
    }

    async fn concat_audio(
        &self,
        workspace: &RequestWorkspace,
        inputs: &[PathBuf],
        kind: AssetKind,
    ) -> MediaResult<PathBuf> {
        self.concat(workspace, inputs, kind).await
    }

    async fn mux(
        &self,
        workspace: &RequestWorkspace,
        video: &Path,
        audio: &Path,
        format: OutputFormat,
    ) -> MediaResult<PathBuf> {
        let output = workspace.allocate_with_extension(AssetKind::Muxed, format.extension());
        mux_streams(&self.runner, video, audio, &output, format).await?;
        Ok(output)
    }

    async fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
        probe_duration(path).await
    }
}
