//! Request entry point: validate, admit, compose scenes, assemble, mux.

use std::sync::Arc;
use std::time::Instant;

use reelgen_media::{FfmpegEngine, MediaEngine, RequestWorkspace};
use reelgen_models::{FinalOutput, RenderRequest, SceneAsset};
use reelgen_providers::{FootageSource, PexelsClient, SpeechSynthesizer, TtsClient};
use reqwest::Client;
use tracing::Instrument;
use uuid::Uuid;

use crate::composer::{SceneComposer, SceneOptions};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::RequestLogger;
use crate::muxer::FinalMuxer;
use crate::timeline::TimelineAssembler;

/// Turns a [`RenderRequest`] into one published video.
pub struct ReelPipeline {
    config: PipelineConfig,
    composer: SceneComposer,
    timeline: TimelineAssembler,
    muxer: FinalMuxer,
}

impl ReelPipeline {
    pub fn new(
        config: PipelineConfig,
        speech: Arc<dyn SpeechSynthesizer>,
        footage: Arc<dyn FootageSource>,
        engine: Arc<dyn MediaEngine>,
    ) -> Self {
        Self {
            composer: SceneComposer::new(speech, footage, engine.clone(), config.clone()),
            timeline: TimelineAssembler::new(engine.clone()),
            muxer: FinalMuxer::new(engine, config.output_dir.clone()),
            config,
        }
    }

    /// Wire the production clients: FFmpeg, the TTS endpoint and Pexels.
    pub fn from_config(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| PipelineError::configuration(format!("HTTP client: {}", e)))?;

        let engine: Arc<dyn MediaEngine> =
            Arc::new(FfmpegEngine::new(&config.engine_settings(), http.clone()));
        let speech = Arc::new(
            TtsClient::new(http.clone(), config.tts_base_url.clone(), engine.clone())
                .with_chunk_chars(config.tts_chunk_chars),
        );
        let footage = Arc::new(PexelsClient::new(
            http,
            config.pexels_base_url.clone(),
            config.pexels_api_key.clone(),
        ));

        Ok(Self::new(config, speech, footage, engine))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run a request received at `received_at`.
    ///
    /// Validation and the budget check happen before any external call. The
    /// budget is only checked at admission; once scenes start they run to
    /// completion or first failure. The request workspace is removed on
    /// every path.
    pub async fn run(
        &self,
        request: &RenderRequest,
        received_at: Instant,
    ) -> PipelineResult<FinalOutput> {
        request.validate(&self.config.request_limits())?;

        let waited = received_at.elapsed();
        if waited >= self.config.request_budget {
            metrics::counter!("reelgen_renders_total", "status" => "timeout").increment(1);
            return Err(PipelineError::timeout(format!(
                "request waited {:.1}s, budget is {}s",
                waited.as_secs_f64(),
                self.config.request_budget.as_secs()
            )));
        }

        let request_id = Uuid::new_v4().to_string();
        let logger = RequestLogger::new(&request_id, "render");
        let span = logger.create_span();

        async {
            let started = Instant::now();
            logger.log_start(&format!(
                "{} scene(s), {} {} {}",
                request.scenes.len(),
                request.orientation,
                request.quality,
                request.format
            ));

            let workspace = RequestWorkspace::create(&self.config.work_dir, &request_id)?;
            let result = self.render_in(&workspace, request, &logger).await;

            if let Err(e) = workspace.close() {
                logger.log_warning(&format!("failed to remove workspace: {}", e));
            }

            match &result {
                Ok(output) => {
                    metrics::counter!("reelgen_renders_total", "status" => "success").increment(1);
                    metrics::histogram!("reelgen_render_duration_seconds")
                        .record(started.elapsed().as_secs_f64());
                    logger.log_completion(&format!(
                        "{} ({:.2}s)",
                        output.file_name, output.duration_secs
                    ));
                }
                Err(e) => {
                    metrics::counter!("reelgen_renders_total", "status" => e.code()).increment(1);
                    logger.log_error(&e.to_string());
                }
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn render_in(
        &self,
        workspace: &RequestWorkspace,
        request: &RenderRequest,
        logger: &RequestLogger,
    ) -> PipelineResult<FinalOutput> {
        let options = SceneOptions::from_request(request);
        let total = request.scenes.len();
        let scene_logger = logger.child("compose_scene");

        let mut scenes: Vec<SceneAsset> = Vec::with_capacity(total);
        for (index, scene) in request.scenes.iter().enumerate() {
            scene_logger.log_scene(index, total, scene.search_query());
            let asset = self
                .composer
                .compose(workspace, index, scene, &options, &scene_logger)
                .await?;
            scenes.push(asset);
        }

        let timeline = self.timeline.assemble(workspace, &scenes).await?;
        logger.log_progress("timeline assembled");

        self.muxer.mux(workspace, &timeline, request.format).await
    }
}
