//! In-memory stand-ins for the speech, footage and media seams.
//!
//! Fake media files hold `dur=<secs>` on the first line and a label on the
//! rest, so durations and ordering survive concatenation and muxing.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reelgen_media::segment::floored_duration;
use reelgen_media::{
    AssetKind, MediaEngine, MediaError, MediaResult, RequestWorkspace, SegmentSpec,
    DEFAULT_RENDER_FLOOR_SECS,
};
use reelgen_models::{
    FootageCandidate, NarrationAsset, Orientation, OutputFormat, VideoSegment,
};
use reelgen_providers::{FootageSource, ProviderError, ProviderResult, SpeechSynthesizer};

pub fn write_fake_media(path: &Path, secs: f64, label: &str) -> std::io::Result<()> {
    std::fs::write(path, format!("dur={}\n{}", secs, label))
}

pub fn read_fake_media(path: &Path) -> std::io::Result<(f64, String)> {
    let content = std::fs::read_to_string(path)?;
    let (head, label) = content.split_once('\n').unwrap_or((content.as_str(), ""));
    let secs = head
        .trim_start_matches("dur=")
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok((secs, label.to_string()))
}

/// Narration of a fixed duration.
pub struct FakeSpeech {
    pub default_secs: f64,
    pub calls: AtomicUsize,
}

impl FakeSpeech {
    pub fn new(default_secs: f64) -> Self {
        Self {
            default_secs,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(
        &self,
        workspace: &RequestWorkspace,
        text: &str,
        _language: &str,
    ) -> ProviderResult<NarrationAsset> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let secs = self.default_secs;
        let path = workspace.allocate(AssetKind::Narration);
        write_fake_media(&path, secs, &format!("voice:{}", text))
            .map_err(|e| ProviderError::synthesis(e.to_string()))?;
        Ok(NarrationAsset {
            path,
            duration_secs: secs,
        })
    }
}

/// Footage search returning one clip per query, or nothing.
pub struct FakeFootage {
    pub clips_per_query: Vec<f64>,
    pub calls: AtomicUsize,
}

impl FakeFootage {
    pub fn new(clip_durations: Vec<f64>) -> Self {
        Self {
            clips_per_query: clip_durations,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FootageSource for FakeFootage {
    async fn search(
        &self,
        query: &str,
        orientation: Orientation,
        _page_size: usize,
    ) -> ProviderResult<Vec<FootageCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.clips_per_query.is_empty() {
            return Err(ProviderError::NoResults(query.to_string()));
        }
        let (w, h) = match orientation {
            Orientation::Portrait => (1080, 1920),
            Orientation::Landscape => (1920, 1080),
        };
        Ok(self
            .clips_per_query
            .iter()
            .enumerate()
            .map(|(i, secs)| {
                FootageCandidate::new(format!("https://cdn.test/{}-{}.mp4", query, i), w, h, *secs)
            })
            .collect())
    }
}

/// Media engine that writes fake media files instead of running FFmpeg.
#[derive(Default)]
pub struct FakeEngine {
    pub rendered: Mutex<Vec<SegmentSpec>>,
    pub video_concats: Mutex<Vec<usize>>,
}

impl FakeEngine {
    pub fn rendered(&self) -> Vec<SegmentSpec> {
        self.rendered.lock().unwrap().clone()
    }

    fn join(
        &self,
        workspace: &RequestWorkspace,
        inputs: &[PathBuf],
        kind: AssetKind,
    ) -> MediaResult<PathBuf> {
        if inputs.is_empty() {
            return Err(MediaError::concat_failed("no inputs"));
        }
        let mut total = 0.0;
        let mut labels = Vec::new();
        for input in inputs {
            let (secs, label) = read_fake_media(input)
                .map_err(|e| MediaError::concat_failed(format!("{}: {}", input.display(), e)))?;
            total += secs;
            labels.push(label);
        }
        let out = workspace.allocate(kind);
        write_fake_media(&out, total, &labels.join("\n"))?;
        Ok(out)
    }
}

#[async_trait]
impl MediaEngine for FakeEngine {
    async fn render_segment(
        &self,
        workspace: &RequestWorkspace,
        spec: &SegmentSpec,
    ) -> MediaResult<VideoSegment> {
        self.rendered.lock().unwrap().push(spec.clone());
        let secs = floored_duration(spec.duration_secs, DEFAULT_RENDER_FLOOR_SECS);
        let path = workspace.allocate(AssetKind::Segment);
        write_fake_media(&path, secs, &spec.candidate.url)?;
        Ok(VideoSegment {
            path,
            duration_secs: secs,
            size: spec.quality.frame_size(spec.orientation),
        })
    }

    async fn concat_video(
        &self,
        workspace: &RequestWorkspace,
        inputs: &[PathBuf],
        kind: AssetKind,
    ) -> MediaResult<PathBuf> {
        self.video_concats.lock().unwrap().push(inputs.len());
        self.join(workspace, inputs, kind)
    }

    async fn concat_audio(
        &self,
        workspace: &RequestWorkspace,
        inputs: &[PathBuf],
        kind: AssetKind,
    ) -> MediaResult<PathBuf> {
        self.join(workspace, inputs, kind)
    }

    async fn mux(
        &self,
        workspace: &RequestWorkspace,
        video: &Path,
        audio: &Path,
        format: OutputFormat,
    ) -> MediaResult<PathBuf> {
        let (video_secs, video_label) = read_fake_media(video)?;
        let (audio_secs, _) = read_fake_media(audio)?;
        let out = workspace.allocate_with_extension(AssetKind::Muxed, format.extension());
        write_fake_media(&out, video_secs.min(audio_secs), &video_label)?;
        Ok(out)
    }

    async fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
        Ok(read_fake_media(path)?.0)
    }
}
