//! Copy concatenation via the concat demuxer.
//!
//! Copy concatenation is only valid when every input shares codec, frame size
//! and pixel format. Segments rendered by this crate satisfy that by
//! construction; [`ensure_uniform_video`] verifies it before joining.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::command::FfmpegRunner;
use crate::error::{MediaError, MediaResult};
use crate::operation::MediaOperation;
use crate::probe::{probe_media, VideoStreamInfo};

/// Render the concat demuxer list for `inputs`.
///
/// Single quotes inside paths are closed, escaped and reopened as the
/// demuxer's quoting rules require.
pub fn concat_list_contents(inputs: &[PathBuf]) -> String {
    inputs
        .iter()
        .map(|p| {
            let path = p.to_string_lossy().replace('\'', r"'\''");
            format!("file '{}'\n", path)
        })
        .collect()
}

/// Fail with a concatenation error if any input is missing.
pub fn ensure_inputs_exist(inputs: &[PathBuf]) -> MediaResult<()> {
    if inputs.is_empty() {
        return Err(MediaError::concat_failed("no inputs to concatenate"));
    }
    for input in inputs {
        if !input.is_file() {
            return Err(MediaError::concat_failed(format!(
                "missing input {}",
                input.display()
            )));
        }
    }
    Ok(())
}

/// Compare the first video stream of every input against the first input.
pub async fn ensure_uniform_video(inputs: &[PathBuf]) -> MediaResult<()> {
    let mut reference: Option<(PathBuf, VideoStreamInfo)> = None;

    for input in inputs {
        let info = probe_media(input).await.map_err(|e| {
            MediaError::concat_failed(format!("unreadable input {}: {}", input.display(), e))
        })?;
        let video = info.video.ok_or_else(|| {
            MediaError::format_mismatch(input, "no video stream")
        })?;

        match &reference {
            None => reference = Some((input.clone(), video)),
            Some((first, expected)) => check_same_format(first, expected, input, &video)?,
        }
    }

    Ok(())
}

fn check_same_format(
    first: &Path,
    expected: &VideoStreamInfo,
    path: &Path,
    actual: &VideoStreamInfo,
) -> MediaResult<()> {
    if expected.codec != actual.codec {
        return Err(MediaError::format_mismatch(
            path,
            format!("codec {} differs from {} in {}", actual.codec, expected.codec, first.display()),
        ));
    }
    if (expected.width, expected.height) != (actual.width, actual.height) {
        return Err(MediaError::format_mismatch(
            path,
            format!(
                "frame size {}x{} differs from {}x{} in {}",
                actual.width,
                actual.height,
                expected.width,
                expected.height,
                first.display()
            ),
        ));
    }
    if expected.pixel_format != actual.pixel_format {
        return Err(MediaError::format_mismatch(
            path,
            format!(
                "pixel format {} differs from {} in {}",
                actual.pixel_format,
                expected.pixel_format,
                first.display()
            ),
        ));
    }
    Ok(())
}

/// Join `inputs` into `output` without re-encoding.
pub async fn concat_copy(
    runner: &FfmpegRunner,
    inputs: &[PathBuf],
    list_file: &Path,
    output: &Path,
) -> MediaResult<()> {
    ensure_inputs_exist(inputs)?;

    tokio::fs::write(list_file, concat_list_contents(inputs)).await?;

    runner
        .execute(&MediaOperation::ConcatCopy {
            list_file: list_file.to_path_buf(),
            output: output.to_path_buf(),
        })
        .await?;

    info!(inputs = inputs.len(), output = %output.display(), "Concatenated without re-encoding");
    Ok(())
}
