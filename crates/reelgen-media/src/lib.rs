#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for narrated video assembly.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with thread pinning
//! - A narrow [`MediaOperation`] interface (render, concat, mux) with bounded
//!   stderr capture
//! - Caption escaping and the scale-pad-caption filter chain
//! - Streamed downloads of footage
//! - A scoped per-request working directory
//! - The [`MediaEngine`] seam consumed by the pipeline

pub mod command;
pub mod concat;
pub mod download;
pub mod engine;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod mux;
pub mod operation;
pub mod probe;
pub mod segment;
pub mod workspace;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner, StderrTail};
pub use download::{download_to_file, stream_response_to_file};
pub use engine::{EngineSettings, FfmpegEngine, MediaEngine};
pub use error::{MediaError, MediaResult};
pub use filters::{build_segment_filter, caption_font_size, drawtext_text_value, escape_drawtext};
pub use fs_utils::publish_file;
pub use operation::MediaOperation;
pub use probe::{probe_duration, probe_media, MediaInfo, VideoStreamInfo};
pub use segment::{SegmentRenderer, SegmentSpec, DEFAULT_RENDER_FLOOR_SECS};
pub use workspace::{AssetKind, RequestWorkspace};
