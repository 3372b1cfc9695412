//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use reelgen_media::{EngineSettings, DEFAULT_RENDER_FLOOR_SECS};
use reelgen_models::RequestLimits;
use reelgen_providers::{
    DEFAULT_PAGE_SIZE, DEFAULT_PEXELS_BASE_URL, DEFAULT_TTS_BASE_URL, DEFAULT_TTS_CHUNK_CHARS,
};

use crate::error::{PipelineError, PipelineResult};

/// Pipeline configuration, built once at startup and passed down.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root for per-request working directories
    pub work_dir: PathBuf,
    /// Where finished videos are published
    pub output_dir: PathBuf,
    /// Stock footage API key
    pub pexels_api_key: Option<String>,
    pub pexels_base_url: String,
    pub tts_base_url: String,
    /// Max characters per speech request
    pub tts_chunk_chars: usize,
    /// Results requested per footage search
    pub search_page_size: usize,
    /// Lower bound of a scene's visual duration
    pub min_scene_secs: f64,
    /// Upper bound of a scene's visual duration
    pub max_scene_secs: f64,
    /// Used when a scene does not set `min_clip_sec`
    pub default_min_clip_secs: f64,
    /// Used when a scene does not set `max_clips`
    pub default_max_clips: usize,
    /// Takes at or below this length are not worth a segment
    pub coverage_threshold_secs: f64,
    /// Shortest segment the renderer will produce
    pub render_floor_secs: f64,
    /// Maximum scenes per request
    pub max_scenes: usize,
    /// Wall-clock budget checked when a request is admitted
    pub request_budget: Duration,
    /// Threads per FFmpeg process
    pub ffmpeg_threads: u32,
    /// Per-process FFmpeg timeout
    pub ffmpeg_timeout: Option<Duration>,
    /// Stderr lines kept in subprocess errors
    pub stderr_tail_lines: usize,
    /// Timeout for provider HTTP calls
    pub http_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("/tmp/reelgen"),
            output_dir: PathBuf::from("./outputs"),
            pexels_api_key: None,
            pexels_base_url: DEFAULT_PEXELS_BASE_URL.to_string(),
            tts_base_url: DEFAULT_TTS_BASE_URL.to_string(),
            tts_chunk_chars: DEFAULT_TTS_CHUNK_CHARS,
            search_page_size: DEFAULT_PAGE_SIZE,
            min_scene_secs: 3.0,
            max_scene_secs: 60.0,
            default_min_clip_secs: 3.0,
            default_max_clips: 4,
            coverage_threshold_secs: 0.75,
            render_floor_secs: DEFAULT_RENDER_FLOOR_SECS,
            max_scenes: 10,
            request_budget: Duration::from_secs(600), // 10 minutes
            ffmpeg_threads: 1,
            ffmpeg_timeout: None,
            stderr_tail_lines: 12,
            http_timeout: Duration::from_secs(60),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            work_dir: std::env::var("REELGEN_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            output_dir: std::env::var("REELGEN_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            pexels_api_key: std::env::var("PEXELS_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            pexels_base_url: std::env::var("PEXELS_BASE_URL")
                .unwrap_or(defaults.pexels_base_url),
            tts_base_url: std::env::var("TTS_BASE_URL").unwrap_or(defaults.tts_base_url),
            tts_chunk_chars: env_parse("TTS_CHUNK_CHARS").unwrap_or(defaults.tts_chunk_chars),
            search_page_size: env_parse("FOOTAGE_PAGE_SIZE").unwrap_or(defaults.search_page_size),
            min_scene_secs: env_parse("MIN_SCENE_SECS").unwrap_or(defaults.min_scene_secs),
            max_scene_secs: env_parse("MAX_SCENE_SECS").unwrap_or(defaults.max_scene_secs),
            default_min_clip_secs: env_parse("DEFAULT_MIN_CLIP_SECS")
                .unwrap_or(defaults.default_min_clip_secs),
            default_max_clips: env_parse("DEFAULT_MAX_CLIPS").unwrap_or(defaults.default_max_clips),
            coverage_threshold_secs: env_parse("COVERAGE_THRESHOLD_SECS")
                .unwrap_or(defaults.coverage_threshold_secs),
            render_floor_secs: env_parse("RENDER_FLOOR_SECS").unwrap_or(defaults.render_floor_secs),
            max_scenes: env_parse("MAX_SCENES").unwrap_or(defaults.max_scenes),
            request_budget: env_parse("REQUEST_BUDGET_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_budget),
            ffmpeg_threads: env_parse("FFMPEG_THREADS").unwrap_or(defaults.ffmpeg_threads),
            ffmpeg_timeout: env_parse("FFMPEG_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .or(defaults.ffmpeg_timeout),
            stderr_tail_lines: env_parse("FFMPEG_STDERR_TAIL_LINES")
                .unwrap_or(defaults.stderr_tail_lines),
            http_timeout: env_parse("HTTP_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
        }
    }

    /// Reject settings that would break the duration invariants.
    pub fn validate(&self) -> PipelineResult<()> {
        if !(self.min_scene_secs > 0.0 && self.min_scene_secs <= self.max_scene_secs) {
            return Err(PipelineError::configuration(format!(
                "scene band [{}, {}] is empty",
                self.min_scene_secs, self.max_scene_secs
            )));
        }
        if self.min_scene_secs <= self.coverage_threshold_secs {
            return Err(PipelineError::configuration(format!(
                "MIN_SCENE_SECS ({}) must exceed COVERAGE_THRESHOLD_SECS ({})",
                self.min_scene_secs, self.coverage_threshold_secs
            )));
        }
        if self.default_min_clip_secs <= 0.0 || self.default_max_clips == 0 {
            return Err(PipelineError::configuration(
                "default clip length and clip count must be positive",
            ));
        }
        if self.max_scenes == 0 {
            return Err(PipelineError::configuration("MAX_SCENES must be at least 1"));
        }
        Ok(())
    }

    pub fn request_limits(&self) -> RequestLimits {
        RequestLimits {
            max_scenes: self.max_scenes,
            max_scene_secs: self.max_scene_secs,
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            ffmpeg_threads: self.ffmpeg_threads.max(1),
            stderr_tail_lines: self.stderr_tail_lines,
            ffmpeg_timeout_secs: self.ffmpeg_timeout.map(|d| d.as_secs()),
            render_floor_secs: self.render_floor_secs,
            verify_uniform_concat: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_budget, Duration::from_secs(600));
        assert_eq!(config.engine_settings().ffmpeg_threads, 1);
        assert_eq!(config.request_limits().max_scenes, 10);
    }

    #[test]
    fn test_inverted_scene_band_rejected() {
        let config = PipelineConfig {
            min_scene_secs: 10.0,
            max_scene_secs: 5.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn test_min_scene_must_exceed_coverage_threshold() {
        for min_scene_secs in [0.5, 0.75] {
            let config = PipelineConfig {
                min_scene_secs,
                coverage_threshold_secs: 0.75,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(PipelineError::Configuration(ref m)) if m.contains("MIN_SCENE_SECS")
            ));
        }

        let config = PipelineConfig {
            min_scene_secs: 0.8,
            coverage_threshold_secs: 0.75,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
