//! External content providers.
//!
//! - [`TtsClient`]: chunked text-to-speech, joined into one narration track
//! - [`PexelsClient`]: stock footage search with per-result file selection

pub mod error;
pub mod footage;
pub mod speech;

pub use error::{ProviderError, ProviderResult};
pub use footage::{
    rank_candidates, select_best_file, FootageSource, PexelsClient, DEFAULT_PAGE_SIZE,
    DEFAULT_PEXELS_BASE_URL,
};
pub use speech::{
    split_text, SpeechSynthesizer, TtsClient, DEFAULT_TTS_BASE_URL, DEFAULT_TTS_CHUNK_CHARS,
};
