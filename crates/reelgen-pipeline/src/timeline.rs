//! Timeline assembly: scene videos and narrations joined in request order.

use std::path::PathBuf;
use std::sync::Arc;

use reelgen_media::{AssetKind, MediaEngine, RequestWorkspace};
use reelgen_models::{NarrationAsset, SceneAsset};

use crate::error::{PipelineError, PipelineResult};

/// The two assembled streams of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub video: PathBuf,
    pub audio: PathBuf,
    pub scenes: usize,
}

pub struct TimelineAssembler {
    engine: Arc<dyn MediaEngine>,
}

impl TimelineAssembler {
    pub fn new(engine: Arc<dyn MediaEngine>) -> Self {
        Self { engine }
    }

    pub async fn assemble_video(
        &self,
        workspace: &RequestWorkspace,
        scene_videos: &[PathBuf],
    ) -> PipelineResult<PathBuf> {
        if scene_videos.is_empty() {
            return Err(PipelineError::Concatenation("no scene videos".to_string()));
        }
        Ok(self
            .engine
            .concat_video(workspace, scene_videos, AssetKind::TimelineVideo)
            .await?)
    }

    pub async fn assemble_audio(
        &self,
        workspace: &RequestWorkspace,
        narrations: &[NarrationAsset],
    ) -> PipelineResult<PathBuf> {
        if narrations.is_empty() {
            return Err(PipelineError::Concatenation("no narration tracks".to_string()));
        }
        let paths: Vec<PathBuf> = narrations.iter().map(|n| n.path.clone()).collect();
        Ok(self
            .engine
            .concat_audio(workspace, &paths, AssetKind::TimelineAudio)
            .await?)
    }

    /// Assemble both streams; `scenes` must already be in playback order.
    pub async fn assemble(
        &self,
        workspace: &RequestWorkspace,
        scenes: &[SceneAsset],
    ) -> PipelineResult<Timeline> {
        let videos: Vec<PathBuf> = scenes.iter().map(|s| s.video.clone()).collect();
        let narrations: Vec<NarrationAsset> = scenes.iter().map(|s| s.narration.clone()).collect();

        let video = self.assemble_video(workspace, &videos).await?;
        let audio = self.assemble_audio(workspace, &narrations).await?;

        Ok(Timeline {
            video,
            audio,
            scenes: scenes.len(),
        })
    }
}
