//! The media operations the pipeline performs, as one narrow interface.
//!
//! Each variant knows how to build its FFmpeg command and which error a
//! failure maps to. Thread pinning and stderr capture live in the runner, so
//! no call site builds raw FFmpeg arguments.

use std::path::{Path, PathBuf};

use reelgen_models::{EncodingProfile, OutputFormat};
use reelgen_models::encoding::{DEFAULT_AUDIO_BITRATE, DEFAULT_AUDIO_CODEC};

use crate::command::{FfmpegCommand, FfmpegFailure, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// A single FFmpeg invocation.
#[derive(Debug, Clone)]
pub enum MediaOperation {
    /// Trim (looping short sources), scale-pad and caption one source clip.
    RenderSegment {
        source: PathBuf,
        output: PathBuf,
        duration_secs: f64,
        filter: String,
        profile: EncodingProfile,
    },
    /// Join inputs listed in a concat-demuxer file without re-encoding.
    ConcatCopy { list_file: PathBuf, output: PathBuf },
    /// Combine the first video stream of one file with the first audio
    /// stream of another, trimmed to the shorter.
    Mux {
        video: PathBuf,
        audio: PathBuf,
        output: PathBuf,
        format: OutputFormat,
    },
}

impl MediaOperation {
    pub fn name(&self) -> &'static str {
        match self {
            MediaOperation::RenderSegment { .. } => "render_segment",
            MediaOperation::ConcatCopy { .. } => "concat_copy",
            MediaOperation::Mux { .. } => "mux",
        }
    }

    pub fn output(&self) -> &Path {
        match self {
            MediaOperation::RenderSegment { output, .. }
            | MediaOperation::ConcatCopy { output, .. }
            | MediaOperation::Mux { output, .. } => output,
        }
    }

    /// Build the FFmpeg command for this operation.
    pub fn to_command(&self) -> FfmpegCommand {
        match self {
            MediaOperation::RenderSegment {
                source,
                output,
                duration_secs,
                filter,
                profile,
            } => FfmpegCommand::new(output)
                .input_with_args(source, ["-stream_loop", "-1"])
                .duration(*duration_secs)
                .video_filter(filter.clone())
                .output_args(profile.to_ffmpeg_args())
                .no_audio()
                .faststart(),

            MediaOperation::ConcatCopy { list_file, output } => FfmpegCommand::new(output)
                .input_with_args(list_file, ["-f", "concat", "-safe", "0"])
                .codec_copy(),

            MediaOperation::Mux {
                video,
                audio,
                output,
                format,
            } => {
                let cmd = FfmpegCommand::new(output)
                    .input(video)
                    .input(audio)
                    .map("0:v:0")
                    .map("1:a:0")
                    .video_codec("copy")
                    .audio_codec(DEFAULT_AUDIO_CODEC)
                    .audio_bitrate(DEFAULT_AUDIO_BITRATE)
                    .shortest();
                if format.supports_faststart() {
                    cmd.faststart()
                } else {
                    cmd
                }
            }
        }
    }

    /// Map a subprocess failure to this operation's error.
    pub fn failure(&self, failure: FfmpegFailure) -> MediaError {
        let FfmpegFailure {
            message,
            stderr_tail,
            exit_code,
        } = failure;
        match self {
            MediaOperation::RenderSegment { .. } => MediaError::RenderFailed {
                message,
                stderr_tail,
                exit_code,
            },
            MediaOperation::ConcatCopy { .. } => MediaError::ConcatFailed {
                message,
                stderr_tail,
                exit_code,
            },
            MediaOperation::Mux { .. } => MediaError::MuxFailed {
                message,
                stderr_tail,
                exit_code,
            },
        }
    }
}

impl FfmpegRunner {
    /// Execute a media operation.
    pub async fn execute(&self, op: &MediaOperation) -> MediaResult<()> {
        tracing::debug!(operation = op.name(), output = %op.output().display(), "Executing media operation");
        match self.run(op.to_command()).await? {
            Ok(()) => Ok(()),
            Err(failure) => Err(op.failure(failure)),
        }
    }
}
