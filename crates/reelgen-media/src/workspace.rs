//! Per-request working directory.
//!
//! Every intermediate file of a request lives under one directory that is
//! removed when the [`RequestWorkspace`] is dropped, on success and failure
//! alike. Paths are allocated by asset kind with random names so concurrent
//! requests sharing a work root never collide.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::MediaResult;

/// Kind of intermediate asset, deciding its name prefix and extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// One synthesized text chunk
    SpeechChunk,
    /// A scene's full narration
    Narration,
    /// Downloaded footage
    SourceClip,
    /// One rendered segment
    Segment,
    /// Concatenated segments of one scene
    SceneVideo,
    /// All scene videos joined
    TimelineVideo,
    /// All narrations joined
    TimelineAudio,
    /// Concat demuxer list file
    ConcatList,
    /// Muxed deliverable before publishing
    Muxed,
}

impl AssetKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            AssetKind::SpeechChunk => "tts",
            AssetKind::Narration => "voice",
            AssetKind::SourceClip => "src",
            AssetKind::Segment => "seg",
            AssetKind::SceneVideo => "scene",
            AssetKind::TimelineVideo => "timeline",
            AssetKind::TimelineAudio => "narration",
            AssetKind::ConcatList => "concat",
            AssetKind::Muxed => "final",
        }
    }

    pub fn default_extension(&self) -> &'static str {
        match self {
            AssetKind::SpeechChunk | AssetKind::Narration | AssetKind::TimelineAudio => "mp3",
            AssetKind::ConcatList => "txt",
            AssetKind::SourceClip
            | AssetKind::Segment
            | AssetKind::SceneVideo
            | AssetKind::TimelineVideo
            | AssetKind::Muxed => "mp4",
        }
    }
}

/// Scoped working directory for one request.
#[derive(Debug)]
pub struct RequestWorkspace {
    request_id: String,
    dir: TempDir,
}

impl RequestWorkspace {
    /// Create a fresh directory under `root` (created if missing).
    pub fn create(root: impl AsRef<Path>, request_id: &str) -> MediaResult<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;

        let dir = tempfile::Builder::new()
            .prefix(&format!("req-{}-", request_id))
            .tempdir_in(root)?;

        debug!(
            request_id = %request_id,
            path = %dir.path().display(),
            "Created request workspace"
        );

        Ok(Self {
            request_id: request_id.to_string(),
            dir,
        })
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Allocate a unique path for an asset kind.
    pub fn allocate(&self, kind: AssetKind) -> PathBuf {
        self.allocate_with_extension(kind, kind.default_extension())
    }

    /// Allocate a unique path with an explicit extension.
    pub fn allocate_with_extension(&self, kind: AssetKind, extension: &str) -> PathBuf {
        self.dir.path().join(format!(
            "{}-{}.{}",
            kind.prefix(),
            Uuid::new_v4().simple(),
            extension.trim_start_matches('.')
        ))
    }

    /// Remove the directory now, reporting failures instead of ignoring them.
    pub fn close(self) -> MediaResult<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to remove request workspace");
            e
        })?;
        debug!(request_id = %self.request_id, "Removed request workspace");
        Ok(())
    }
}
