//! Shared fixtures for API tests: a pipeline wired to in-memory seams.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use reelgen_api::{create_router, ApiConfig, AppState};
use reelgen_media::{AssetKind, MediaEngine, MediaError, MediaResult, RequestWorkspace, SegmentSpec};
use reelgen_models::{FootageCandidate, NarrationAsset, Orientation, OutputFormat, VideoSegment};
use reelgen_pipeline::{PipelineConfig, ReelPipeline};
use reelgen_providers::{FootageSource, ProviderError, ProviderResult, SpeechSynthesizer};
use tempfile::TempDir;

fn write_secs(path: &Path, secs: f64) -> std::io::Result<()> {
    std::fs::write(path, secs.to_string())
}

fn read_secs(path: &Path) -> MediaResult<f64> {
    let text = std::fs::read_to_string(path)?;
    text.trim()
        .parse()
        .map_err(|_| MediaError::InvalidMedia(path.display().to_string()))
}

pub struct FixedSpeech(pub f64);

#[async_trait]
impl SpeechSynthesizer for FixedSpeech {
    async fn synthesize(
        &self,
        workspace: &RequestWorkspace,
        _text: &str,
        _language: &str,
    ) -> ProviderResult<NarrationAsset> {
        let path = workspace.allocate(AssetKind::Narration);
        write_secs(&path, self.0).map_err(|e| ProviderError::synthesis(e.to_string()))?;
        Ok(NarrationAsset {
            path,
            duration_secs: self.0,
        })
    }
}

pub struct StaticFootage(pub Vec<f64>);

#[async_trait]
impl FootageSource for StaticFootage {
    async fn search(
        &self,
        query: &str,
        _orientation: Orientation,
        _page_size: usize,
    ) -> ProviderResult<Vec<FootageCandidate>> {
        if self.0.is_empty() {
            return Err(ProviderError::NoResults(query.to_string()));
        }
        Ok(self
            .0
            .iter()
            .map(|d| FootageCandidate::new("https://cdn.test/clip.mp4", 1080, 1920, *d))
            .collect())
    }
}

pub struct FileEngine;

#[async_trait]
impl MediaEngine for FileEngine {
    async fn render_segment(
        &self,
        workspace: &RequestWorkspace,
        spec: &SegmentSpec,
    ) -> MediaResult<VideoSegment> {
        let path = workspace.allocate(AssetKind::Segment);
        write_secs(&path, spec.duration_secs)?;
        Ok(VideoSegment {
            path,
            duration_secs: spec.duration_secs,
            size: spec.quality.frame_size(spec.orientation),
        })
    }

    async fn concat_video(
        &self,
        workspace: &RequestWorkspace,
        inputs: &[PathBuf],
        kind: AssetKind,
    ) -> MediaResult<PathBuf> {
        join(workspace, inputs, kind)
    }

    async fn concat_audio(
        &self,
        workspace: &RequestWorkspace,
        inputs: &[PathBuf],
        kind: AssetKind,
    ) -> MediaResult<PathBuf> {
        join(workspace, inputs, kind)
    }

    async fn mux(
        &self,
        workspace: &RequestWorkspace,
        video: &Path,
        audio: &Path,
        format: OutputFormat,
    ) -> MediaResult<PathBuf> {
        let out = workspace.allocate_with_extension(AssetKind::Muxed, format.extension());
        write_secs(&out, read_secs(video)?.min(read_secs(audio)?))?;
        Ok(out)
    }

    async fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
        read_secs(path)
    }
}

fn join(workspace: &RequestWorkspace, inputs: &[PathBuf], kind: AssetKind) -> MediaResult<PathBuf> {
    let mut total = 0.0;
    for input in inputs {
        total += read_secs(input)?;
    }
    let out = workspace.allocate(kind);
    write_secs(&out, total)?;
    Ok(out)
}

/// A router over a fake-backed pipeline rooted in a temp directory.
pub struct TestApp {
    pub dir: TempDir,
    pub router: axum::Router,
    pub output_dir: PathBuf,
}

pub fn test_app(api_secret: Option<&str>, clips: Vec<f64>) -> TestApp {
    let dir = TempDir::new().expect("temp dir");
    let pipeline_config = PipelineConfig {
        work_dir: dir.path().join("work"),
        output_dir: dir.path().join("outputs"),
        ..Default::default()
    };
    let output_dir = pipeline_config.output_dir.clone();

    let pipeline = ReelPipeline::new(
        pipeline_config,
        Arc::new(FixedSpeech(2.5)),
        Arc::new(StaticFootage(clips)),
        Arc::new(FileEngine),
    );

    let config = ApiConfig {
        api_secret: api_secret.map(str::to_string),
        ..Default::default()
    };

    TestApp {
        router: create_router(AppState::new(config, pipeline), None),
        dir,
        output_dir,
    }
}
