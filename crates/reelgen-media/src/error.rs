//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
///
/// Subprocess failures carry only the trailing lines of the tool's
/// diagnostic stream so messages stay bounded.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("Segment render failed: {message}{}", format_tail(.stderr_tail))]
    RenderFailed {
        message: String,
        stderr_tail: String,
        exit_code: Option<i32>,
    },

    #[error("Concatenation failed: {message}{}", format_tail(.stderr_tail))]
    ConcatFailed {
        message: String,
        stderr_tail: String,
        exit_code: Option<i32>,
    },

    #[error("Mux failed: {message}{}", format_tail(.stderr_tail))]
    MuxFailed {
        message: String,
        stderr_tail: String,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("Format mismatch in {path}: {message}")]
    FormatMismatch { path: PathBuf, message: String },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid media file: {0}")]
    InvalidMedia(String),
}

fn format_tail(tail: &str) -> String {
    if tail.is_empty() {
        String::new()
    } else {
        format!(" | {}", tail)
    }
}

impl MediaError {
    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Create a concatenation failure that did not come from a subprocess.
    pub fn concat_failed(message: impl Into<String>) -> Self {
        Self::ConcatFailed {
            message: message.into(),
            stderr_tail: String::new(),
            exit_code: None,
        }
    }

    pub fn format_mismatch(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FormatMismatch {
            path: path.into(),
            message: message.into(),
        }
    }
}
