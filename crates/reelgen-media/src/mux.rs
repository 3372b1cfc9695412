//! Final mux of the visual track and the narration track.

use std::path::Path;

use reelgen_models::OutputFormat;
use tracing::info;

use crate::command::FfmpegRunner;
use crate::error::{MediaError, MediaResult};
use crate::operation::MediaOperation;

/// Mux `video` and `audio` into `output`, trimmed to the shorter input.
///
/// Video is stream-copied; audio is encoded to the fixed delivery codec.
pub async fn mux_streams(
    runner: &FfmpegRunner,
    video: &Path,
    audio: &Path,
    output: &Path,
    format: OutputFormat,
) -> MediaResult<()> {
    for input in [video, audio] {
        if !input.is_file() {
            return Err(MediaError::MuxFailed {
                message: format!("missing input {}", input.display()),
                stderr_tail: String::new(),
                exit_code: None,
            });
        }
    }

    runner
        .execute(&MediaOperation::Mux {
            video: video.to_path_buf(),
            audio: audio.to_path_buf(),
            output: output.to_path_buf(),
            format,
        })
        .await?;

    info!(output = %output.display(), format = %format, "Muxed final output");
    Ok(())
}
