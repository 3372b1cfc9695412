//! Text-to-speech client.
//!
//! Long narration is split at punctuation into provider-sized chunks. Each
//! chunk is fetched in order, the pieces are copy-concatenated, and the
//! result is probed: the measured duration is the only one trusted.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reelgen_media::{stream_response_to_file, AssetKind, MediaEngine, RequestWorkspace};
use reelgen_models::NarrationAsset;
use reqwest::Client;
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};

/// Largest chunk the speech endpoint accepts, in characters.
pub const DEFAULT_TTS_CHUNK_CHARS: usize = 180;

pub const DEFAULT_TTS_BASE_URL: &str = "https://translate.google.com/translate_tts";

const CHUNK_BOUNDARIES: [char; 6] = ['.', '!', '?', ',', ';', ':'];

/// Turns narration text into a measured audio asset.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        workspace: &RequestWorkspace,
        text: &str,
        language: &str,
    ) -> ProviderResult<NarrationAsset>;
}

/// Split `text` into chunks of at most `max_chars` characters, cutting after
/// the last punctuation mark that fits.
///
/// When no punctuation fits in the window, the whole remainder becomes one
/// chunk. Chunks are trimmed and empty ones dropped.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut remaining = text.trim();

    while !remaining.is_empty() {
        let window_end = match remaining.char_indices().nth(max_chars) {
            Some((idx, _)) => idx,
            None => {
                chunks.push(remaining.to_string());
                break;
            }
        };

        let cut = remaining[..window_end]
            .char_indices()
            .filter(|(_, c)| CHUNK_BOUNDARIES.contains(c))
            .map(|(idx, c)| idx + c.len_utf8())
            .last();

        match cut {
            Some(end) => {
                let chunk = remaining[..end].trim();
                if !chunk.is_empty() {
                    chunks.push(chunk.to_string());
                }
                remaining = remaining[end..].trim_start();
            }
            None => {
                chunks.push(remaining.to_string());
                break;
            }
        }
    }

    chunks
}

/// Client for a translate-style TTS endpoint returning MP3 bodies.
pub struct TtsClient {
    client: Client,
    base_url: String,
    chunk_chars: usize,
    engine: Arc<dyn MediaEngine>,
}

impl TtsClient {
    pub fn new(client: Client, base_url: impl Into<String>, engine: Arc<dyn MediaEngine>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            chunk_chars: DEFAULT_TTS_CHUNK_CHARS,
            engine,
        }
    }

    pub fn with_chunk_chars(mut self, chunk_chars: usize) -> Self {
        self.chunk_chars = chunk_chars.max(1);
        self
    }

    async fn fetch_chunk(
        &self,
        workspace: &RequestWorkspace,
        index: usize,
        chunk: &str,
        language: &str,
    ) -> ProviderResult<std::path::PathBuf> {
        let path = workspace.allocate(AssetKind::SpeechChunk);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", chunk),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::synthesis(format!("chunk {}: {}", index, e)))?;

        stream_response_to_file(response, &path)
            .await
            .map_err(|e| ProviderError::synthesis(format!("chunk {}: {}", index, e)))?;

        debug!(chunk = index, chars = chunk.chars().count(), "Fetched speech chunk");
        Ok(path)
    }
}

#[async_trait]
impl SpeechSynthesizer for TtsClient {
    async fn synthesize(
        &self,
        workspace: &RequestWorkspace,
        text: &str,
        language: &str,
    ) -> ProviderResult<NarrationAsset> {
        let started = Instant::now();
        let chunks = split_text(text, self.chunk_chars);
        if chunks.is_empty() {
            return Err(ProviderError::synthesis("narration text is empty"));
        }

        let mut parts = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            parts.push(self.fetch_chunk(workspace, index, chunk, language).await?);
        }

        let path = self
            .engine
            .concat_audio(workspace, &parts, AssetKind::Narration)
            .await
            .map_err(|e| ProviderError::synthesis(format!("joining chunks: {}", e)))?;

        let duration_secs = self
            .engine
            .probe_duration(&path)
            .await
            .map_err(|e| ProviderError::synthesis(format!("probing narration: {}", e)))?;

        if duration_secs.is_nan() || duration_secs <= 0.0 {
            return Err(ProviderError::synthesis(format!(
                "narration has no measurable duration ({})",
                duration_secs
            )));
        }

        metrics::histogram!("reelgen_tts_duration_seconds").record(started.elapsed().as_secs_f64());
        info!(
            request_id = %workspace.request_id(),
            chunks = chunks.len(),
            duration_secs = duration_secs,
            language = %language,
            "Synthesized narration"
        );

        Ok(NarrationAsset {
            path,
            duration_secs,
        })
    }
}
