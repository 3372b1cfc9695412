//! Final mux and publication of the deliverable.

use std::path::PathBuf;
use std::sync::Arc;

use reelgen_media::{publish_file, MediaEngine, RequestWorkspace};
use reelgen_models::{FinalOutput, OutputFormat};
use tracing::warn;
use uuid::Uuid;

use crate::error::PipelineResult;
use crate::timeline::Timeline;

pub struct FinalMuxer {
    engine: Arc<dyn MediaEngine>,
    output_dir: PathBuf,
}

impl FinalMuxer {
    pub fn new(engine: Arc<dyn MediaEngine>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            output_dir: output_dir.into(),
        }
    }

    /// Mux the timeline, move the result to the output directory as
    /// `{uuid}.{ext}` and probe its duration.
    ///
    /// Nothing is left in the output directory when this fails.
    pub async fn mux(
        &self,
        workspace: &RequestWorkspace,
        timeline: &Timeline,
        format: OutputFormat,
    ) -> PipelineResult<FinalOutput> {
        let muxed = self
            .engine
            .mux(workspace, &timeline.video, &timeline.audio, format)
            .await?;

        let file_name = format!("{}.{}", Uuid::new_v4(), format.extension());
        let path = publish_file(&muxed, &self.output_dir, &file_name).await?;

        let duration_secs = match self.engine.probe_duration(&path).await {
            Ok(secs) => secs,
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    warn!("Failed to remove unprobed output {}: {}", path.display(), remove_err);
                }
                return Err(e.into());
            }
        };

        Ok(FinalOutput {
            path,
            file_name,
            duration_secs,
            scenes: timeline.scenes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{write_fake_media, FakeEngine};
    use reelgen_media::AssetKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_output_is_shorter_stream() {
        let root = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let ws = RequestWorkspace::create(root.path(), "mx").unwrap();

        let video = ws.allocate(AssetKind::TimelineVideo);
        write_fake_media(&video, 9.0, "v").unwrap();
        let audio = ws.allocate(AssetKind::TimelineAudio);
        write_fake_media(&audio, 7.25, "a").unwrap();

        let muxer = FinalMuxer::new(Arc::new(FakeEngine::default()), out.path());
        let output = muxer
            .mux(
                &ws,
                &Timeline {
                    video,
                    audio,
                    scenes: 2,
                },
                OutputFormat::Mov,
            )
            .await
            .unwrap();

        assert_eq!(output.duration_secs, 7.25);
        assert!(output.file_name.ends_with(".mov"));
        assert_eq!(output.path, out.path().join(&output.file_name));
        assert!(output.path.is_file());
        assert_eq!(output.scenes, 2);
    }
}
