//! Pipeline error types.

use reelgen_media::MediaError;
use reelgen_models::ValidationError;
use reelgen_providers::ProviderError;
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Every way a render request can fail. The first one aborts the request.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Footage provider error: {0}")]
    Provider(String),

    #[error("No footage found: {0}")]
    NoResults(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Concatenation failed: {0}")]
    Concatenation(String),

    #[error("Mux failed: {0}")]
    Mux(String),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Stable machine-readable code, also used as a metrics label.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Configuration(_) => "configuration_error",
            PipelineError::Provider(_) => "provider_error",
            PipelineError::NoResults(_) => "no_results",
            PipelineError::Synthesis(_) => "synthesis_error",
            PipelineError::Download(_) => "download_error",
            PipelineError::Render(_) => "render_error",
            PipelineError::Concatenation(_) => "concatenation_error",
            PipelineError::Mux(_) => "mux_error",
            PipelineError::Validation(_) => "validation_error",
            PipelineError::Timeout(_) => "timeout",
            PipelineError::Io(_) => "io_error",
            PipelineError::Internal(_) => "internal_error",
        }
    }
}

impl From<MediaError> for PipelineError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::FfmpegNotFound | MediaError::FfprobeNotFound => {
                PipelineError::Configuration(err.to_string())
            }
            MediaError::DownloadFailed { .. } => PipelineError::Download(err.to_string()),
            MediaError::RenderFailed { .. } => PipelineError::Render(err.to_string()),
            MediaError::ConcatFailed { .. } | MediaError::FormatMismatch { .. } => {
                PipelineError::Concatenation(err.to_string())
            }
            MediaError::MuxFailed { .. } => PipelineError::Mux(err.to_string()),
            MediaError::Io(e) => PipelineError::Io(e),
            MediaError::FfprobeFailed { .. }
            | MediaError::FileNotFound(_)
            | MediaError::JsonParse(_)
            | MediaError::InvalidMedia(_) => PipelineError::Internal(err.to_string()),
        }
    }
}

impl From<ProviderError> for PipelineError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Configuration(msg) => PipelineError::Configuration(msg),
            ProviderError::NoResults(query) => PipelineError::NoResults(query),
            ProviderError::Synthesis(msg) => PipelineError::Synthesis(msg),
            ProviderError::Provider { .. }
            | ProviderError::InvalidResponse(_)
            | ProviderError::Http(_) => PipelineError::Provider(err.to_string()),
        }
    }
}
