//! Scene composition: narration first, then enough footage to cover it.

use std::sync::Arc;
use std::time::Instant;

use reelgen_media::{AssetKind, MediaEngine, RequestWorkspace, SegmentSpec};
use reelgen_models::{
    CaptionPosition, FootageCandidate, Orientation, QualityTier, RenderRequest, SceneAsset,
    SceneRequest,
};
use reelgen_providers::{FootageSource, SpeechSynthesizer};
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::RequestLogger;

/// Rendering options shared by every scene of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneOptions {
    pub orientation: Orientation,
    pub caption_position: CaptionPosition,
    pub quality: QualityTier,
}

impl SceneOptions {
    pub fn from_request(request: &RenderRequest) -> Self {
        Self {
            orientation: request.orientation,
            caption_position: request.caption_position,
            quality: request.quality,
        }
    }
}

/// Parameters of the greedy coverage walk.
#[derive(Debug, Clone, Copy)]
pub struct CoveragePolicy {
    pub min_clip_secs: f64,
    pub max_clips: usize,
    pub min_scene_secs: f64,
    pub threshold_secs: f64,
}

/// One footage candidate and the seconds to take from it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedTake {
    pub candidate: FootageCandidate,
    pub duration_secs: f64,
}

/// Visual duration of a scene: narration length clamped to the band.
pub fn scene_target(narration_secs: f64, min_scene_secs: f64, max_scene_secs: f64) -> f64 {
    if narration_secs.is_finite() {
        narration_secs.clamp(min_scene_secs, max_scene_secs)
    } else {
        min_scene_secs
    }
}

/// Greedily plan takes from ranked candidates until `target_secs` is covered.
///
/// Takes at or below the threshold are skipped. A non-empty pool always
/// yields at least one take, and the plan never covers less than
/// `min_scene_secs` or more than `target_secs`.
pub fn plan_coverage(
    candidates: &[FootageCandidate],
    target_secs: f64,
    policy: &CoveragePolicy,
) -> Vec<PlannedTake> {
    let max_clips = policy.max_clips.max(1);
    let mut takes: Vec<PlannedTake> = Vec::new();
    let mut remaining = target_secs;

    for candidate in candidates {
        if remaining <= policy.threshold_secs || takes.len() >= max_clips {
            break;
        }

        let take = policy
            .min_clip_secs
            .max(candidate.duration_secs.min(remaining))
            .min(remaining);
        if take <= policy.threshold_secs {
            continue;
        }

        takes.push(PlannedTake {
            candidate: candidate.clone(),
            duration_secs: take,
        });
        remaining -= take;
    }

    if takes.is_empty() {
        if let Some(best) = candidates.first() {
            takes.push(PlannedTake {
                candidate: best.clone(),
                duration_secs: target_secs.min(policy.min_clip_secs.max(best.duration_secs)),
            });
        }
    }

    let planned: f64 = takes.iter().map(|t| t.duration_secs).sum();
    let floor = policy.min_scene_secs.min(target_secs);
    if planned < floor {
        if let Some(last) = takes.last_mut() {
            last.duration_secs += floor - planned;
        }
    }

    takes
}

/// Builds one [`SceneAsset`] per scene request.
pub struct SceneComposer {
    speech: Arc<dyn SpeechSynthesizer>,
    footage: Arc<dyn FootageSource>,
    engine: Arc<dyn MediaEngine>,
    config: PipelineConfig,
}

impl SceneComposer {
    pub fn new(
        speech: Arc<dyn SpeechSynthesizer>,
        footage: Arc<dyn FootageSource>,
        engine: Arc<dyn MediaEngine>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            speech,
            footage,
            engine,
            config,
        }
    }

    fn policy_for(&self, scene: &SceneRequest) -> CoveragePolicy {
        CoveragePolicy {
            min_clip_secs: scene.min_clip_or(self.config.default_min_clip_secs),
            max_clips: scene.max_clips_or(self.config.default_max_clips),
            min_scene_secs: self.config.min_scene_secs,
            threshold_secs: self.config.coverage_threshold_secs,
        }
    }

    /// Compose scene `index`: synthesize, resolve footage, render, join.
    pub async fn compose(
        &self,
        workspace: &RequestWorkspace,
        index: usize,
        scene: &SceneRequest,
        options: &SceneOptions,
        logger: &RequestLogger,
    ) -> PipelineResult<SceneAsset> {
        let started = Instant::now();
        let caption = scene.text.trim();

        let narration = self
            .speech
            .synthesize(workspace, caption, scene.language_tag())
            .await?;

        let target = scene_target(
            narration.duration_secs,
            self.config.min_scene_secs,
            self.config.max_scene_secs,
        );

        let candidates = self
            .footage
            .search(
                scene.search_query(),
                options.orientation,
                self.config.search_page_size,
            )
            .await?;

        let plan = plan_coverage(&candidates, target, &self.policy_for(scene));
        if plan.is_empty() {
            return Err(PipelineError::NoResults(scene.search_query().to_string()));
        }

        debug!(
            scene = index,
            narration_secs = narration.duration_secs,
            target_secs = target,
            takes = plan.len(),
            "Planned footage coverage"
        );

        let mut segments = Vec::with_capacity(plan.len());
        for take in &plan {
            let spec = SegmentSpec {
                candidate: take.candidate.clone(),
                duration_secs: take.duration_secs,
                orientation: options.orientation,
                quality: options.quality,
                caption: caption.to_string(),
                caption_position: options.caption_position,
            };
            segments.push(self.engine.render_segment(workspace, &spec).await?);
        }

        let video_secs: f64 = segments.iter().map(|s| s.duration_secs).sum();
        let video = if segments.len() > 1 {
            let paths: Vec<_> = segments.iter().map(|s| s.path.clone()).collect();
            self.engine
                .concat_video(workspace, &paths, AssetKind::SceneVideo)
                .await?
        } else {
            segments[0].path.clone()
        };

        metrics::histogram!("reelgen_scene_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        logger.log_progress(&format!(
            "scene {} composed from {} segment(s), {:.2}s video for {:.2}s narration",
            index + 1,
            segments.len(),
            video_secs,
            narration.duration_secs
        ));

        Ok(SceneAsset {
            index,
            video,
            video_secs,
            segments: segments.len(),
            narration,
        })
    }
}
