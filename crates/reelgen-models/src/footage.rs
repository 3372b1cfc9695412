//! Stock footage candidates.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// One selectable source clip returned by the footage resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FootageCandidate {
    /// Direct download URL of the chosen file
    pub url: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Source clip duration in seconds
    pub duration_secs: f64,
}

impl FootageCandidate {
    pub fn new(url: impl Into<String>, width: u32, height: u32, duration_secs: f64) -> Self {
        Self {
            url: url.into(),
            width,
            height,
            duration_secs,
        }
    }

    /// File extension hint from the URL path, defaulting to `mp4`.
    pub fn extension_hint(&self) -> String {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| {
                u.path_segments()
                    .and_then(|mut segments| segments.next_back().map(str::to_string))
            })
            .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()))
            .filter(|ext| !ext.is_empty() && ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "mp4".to_string())
    }
}
