//! FFmpeg command builder and runner.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Default number of stderr lines kept for error messages.
pub const DEFAULT_STDERR_TAIL_LINES: usize = 12;

/// One input of an FFmpeg command with its own input options.
#[derive(Debug, Clone)]
struct CommandInput {
    args: Vec<String>,
    path: PathBuf,
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Global arguments (before any input)
    global_args: Vec<String>,
    /// Inputs in `-i` order
    inputs: Vec<CommandInput>,
    /// Output arguments (after all inputs)
    output_args: Vec<String>,
    /// Output file path
    output: PathBuf,
    /// Whether to overwrite output
    overwrite: bool,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command writing to `output`.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            global_args: Vec::new(),
            inputs: Vec::new(),
            output_args: Vec::new(),
            output: output.as_ref().to_path_buf(),
            overwrite: true,
        }
    }

    /// Add a global argument.
    pub fn global_arg(mut self, arg: impl Into<String>) -> Self {
        self.global_args.push(arg.into());
        self
    }

    /// Add an input with no input options.
    pub fn input(self, path: impl AsRef<Path>) -> Self {
        self.input_with_args(path, Vec::<String>::new())
    }

    /// Add an input preceded by its input options.
    pub fn input_with_args<I, S>(mut self, path: impl AsRef<Path>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.push(CommandInput {
            args: args.into_iter().map(Into::into).collect(),
            path: path.as_ref().to_path_buf(),
        });
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Limit output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Map a stream specifier into the output.
    pub fn map(self, spec: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(spec)
    }

    /// Copy every stream without re-encoding.
    pub fn codec_copy(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set audio bitrate.
    pub fn audio_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:a").output_arg(bitrate)
    }

    /// Drop audio streams.
    pub fn no_audio(self) -> Self {
        self.output_arg("-an")
    }

    /// Stop at the end of the shortest input.
    pub fn shortest(self) -> Self {
        self.output_arg("-shortest")
    }

    /// Move the index to the front of MP4/MOV output.
    pub fn faststart(self) -> Self {
        self.output_arg("-movflags").output_arg("+faststart")
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-hide_banner".to_string());
        args.push("-nostdin".to_string());
        args.push("-v".to_string());
        args.push("error".to_string());

        args.extend(self.global_args.iter().cloned());

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Outcome of a failed FFmpeg run, before it is mapped to an operation error.
#[derive(Debug, Clone)]
pub struct FfmpegFailure {
    pub message: String,
    pub stderr_tail: String,
    pub exit_code: Option<i32>,
}

impl FfmpegFailure {
    /// A run killed after exceeding the runner timeout.
    pub fn timed_out(timeout_secs: u64, stderr_tail: String) -> Self {
        Self {
            message: format!("FFmpeg timed out after {} seconds", timeout_secs),
            stderr_tail,
            exit_code: None,
        }
    }
}

/// Runner for FFmpeg commands.
///
/// Every command run through here is pinned to a fixed worker-thread count
/// and keeps only the last lines of stderr for diagnostics.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    /// Worker threads per FFmpeg process
    threads: u32,
    /// Stderr lines kept on failure
    tail_lines: usize,
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a single-threaded runner.
    pub fn new() -> Self {
        Self {
            threads: 1,
            tail_lines: DEFAULT_STDERR_TAIL_LINES,
            timeout_secs: None,
        }
    }

    /// Set worker threads per process (minimum 1).
    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Set how many stderr lines are kept.
    pub fn with_tail_lines(mut self, lines: usize) -> Self {
        self.tail_lines = lines.max(1);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn threads(&self) -> u32 {
        self.threads
    }

    /// Apply thread pinning to a command.
    pub fn pin_threads(&self, cmd: FfmpegCommand) -> FfmpegCommand {
        let threads = self.threads.to_string();
        cmd.global_arg("-filter_threads")
            .global_arg(threads.clone())
            .output_arg("-threads")
            .output_arg(threads)
    }

    /// Run an FFmpeg command.
    ///
    /// Returns `Ok(Err(failure))` when FFmpeg ran and exited non-zero, so the
    /// caller can map the failure to its own operation error.
    pub async fn run(&self, cmd: FfmpegCommand) -> MediaResult<Result<(), FfmpegFailure>> {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let cmd = self.pin_threads(cmd);
        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let started = Instant::now();
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::InvalidMedia("FFmpeg stderr not captured".to_string()))?;
        let tail_lines = self.tail_lines;

        let tail_handle = tokio::spawn(async move {
            let mut reader = BufReader::new(stderr).lines();
            let mut tail = StderrTail::new(tail_lines);
            while let Ok(Some(line)) = reader.next_line().await {
                tail.push(line);
            }
            tail
        });

        let status = self.wait_for_completion(&mut child).await;
        let tail = tail_handle.await.unwrap_or_else(|_| StderrTail::new(tail_lines));

        metrics::histogram!("reelgen_ffmpeg_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        let Some(status) = status? else {
            let timeout_secs = self.timeout_secs.unwrap_or_default();
            return Ok(Err(FfmpegFailure::timed_out(timeout_secs, tail.joined())));
        };

        if status.success() {
            Ok(Ok(()))
        } else {
            warn!(
                exit_code = ?status.code(),
                output = %cmd.output_path().display(),
                "FFmpeg exited with non-zero status"
            );
            Ok(Err(FfmpegFailure {
                message: format!(
                    "FFmpeg exited with status {}",
                    status
                        .code()
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "signal".to_string())
                ),
                stderr_tail: tail.joined(),
                exit_code: status.code(),
            }))
        }
    }

    /// Wait for child process with optional timeout. `None` means the
    /// process was killed at the timeout.
    async fn wait_for_completion(
        &self,
        child: &mut Child,
    ) -> MediaResult<Option<std::process::ExitStatus>> {
        match self.timeout_secs {
            Some(timeout_secs) => {
                match tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait()).await {
                    Ok(result) => Ok(Some(result?)),
                    Err(_) => {
                        warn!("FFmpeg timed out after {} seconds, killing process", timeout_secs);
                        let _ = child.kill().await;
                        Ok(None)
                    }
                }
            }
            None => Ok(Some(child.wait().await?)),
        }
    }
}

/// Bounded buffer of the most recent stderr lines.
#[derive(Debug, Clone)]
pub struct StderrTail {
    lines: VecDeque<String>,
    capacity: usize,
}

impl StderrTail {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Push a line, evicting the oldest once full. Blank lines are ignored.
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(trimmed.to_string());
    }

    pub fn joined(&self) -> String {
        self.lines.iter().cloned().collect::<Vec<_>>().join("\n")
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}
