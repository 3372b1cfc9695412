//! Stock footage search against a Pexels-compatible video API.

use std::cmp::Ordering;

use async_trait::async_trait;
use reelgen_models::{FootageCandidate, Orientation};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};

pub const DEFAULT_PEXELS_BASE_URL: &str = "https://api.pexels.com";

/// Results requested per search.
pub const DEFAULT_PAGE_SIZE: usize = 15;

const MAX_ERROR_BODY_CHARS: usize = 300;

/// Resolves a search query into ranked footage candidates.
#[async_trait]
pub trait FootageSource: Send + Sync {
    async fn search(
        &self,
        query: &str,
        orientation: Orientation,
        page_size: usize,
    ) -> ProviderResult<Vec<FootageCandidate>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    videos: Vec<VideoResult>,
}

#[derive(Debug, Deserialize)]
struct VideoResult {
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    video_files: Vec<VideoFile>,
}

/// One rendition of a search result.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoFile {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl VideoFile {
    fn usable(&self) -> Option<(&str, u32, u32)> {
        let link = self.link.as_deref().filter(|l| !l.trim().is_empty())?;
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((link, w, h)),
            _ => None,
        }
    }
}

/// Pick the largest file matching `orientation`, or the largest of any
/// orientation when none match. Files without a link or size are ignored.
pub fn select_best_file(files: &[VideoFile], orientation: Orientation) -> Option<&VideoFile> {
    let usable: Vec<(&VideoFile, u32, u32)> = files
        .iter()
        .filter_map(|f| f.usable().map(|(_, w, h)| (f, w, h)))
        .collect();

    let matching: Vec<_> = usable
        .iter()
        .filter(|(_, w, h)| orientation.matches(*w, *h))
        .collect();

    let pool: Vec<_> = if matching.is_empty() {
        usable.iter().collect()
    } else {
        matching
    };

    pool.into_iter()
        .max_by_key(|(_, w, h)| u64::from(*w) * u64::from(*h))
        .map(|(f, _, _)| *f)
}

/// Sort candidates longest first, keeping provider order among equals.
pub fn rank_candidates(mut candidates: Vec<FootageCandidate>) -> Vec<FootageCandidate> {
    candidates.sort_by(|a, b| {
        b.duration_secs
            .partial_cmp(&a.duration_secs)
            .unwrap_or(Ordering::Equal)
    });
    candidates
}

/// Pexels video search client.
pub struct PexelsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PexelsClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn candidates_from(
        &self,
        response: SearchResponse,
        orientation: Orientation,
    ) -> Vec<FootageCandidate> {
        response
            .videos
            .iter()
            .filter_map(|video| {
                let file = select_best_file(&video.video_files, orientation)?;
                let (link, width, height) = file.usable()?;
                Some(FootageCandidate::new(link, width, height, video.duration))
            })
            .collect()
    }
}

#[async_trait]
impl FootageSource for PexelsClient {
    async fn search(
        &self,
        query: &str,
        orientation: Orientation,
        page_size: usize,
    ) -> ProviderResult<Vec<FootageCandidate>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::configuration("PEXELS_API_KEY not set"))?;

        debug!(query = %query, orientation = %orientation, "Searching stock footage");

        let per_page = page_size.to_string();
        let response = self
            .client
            .get(format!("{}/videos/search", self.base_url))
            .header("Authorization", api_key)
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("orientation", orientation.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        metrics::counter!(
            "reelgen_provider_requests_total",
            "provider" => "pexels",
            "status" => status.as_u16().to_string()
        )
        .increment(1);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(
                status.as_u16(),
                &body,
                MAX_ERROR_BODY_CHARS,
            ));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if body.videos.is_empty() {
            return Err(ProviderError::NoResults(query.to_string()));
        }

        let total = body.videos.len();
        let candidates = rank_candidates(self.candidates_from(body, orientation));
        if candidates.is_empty() {
            return Err(ProviderError::NoResults(query.to_string()));
        }

        info!(
            query = %query,
            results = total,
            candidates = candidates.len(),
            "Resolved footage candidates"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn file(link: &str, width: u32, height: u32) -> VideoFile {
        VideoFile {
            link: Some(link.to_string()),
            width: Some(width),
            height: Some(height),
        }
    }

    #[test]
    fn test_best_file_prefers_orientation_then_area() {
        let files = vec![
            file("wide-big", 3840, 2160),
            file("tall-small", 540, 960),
            file("tall-big", 1080, 1920),
        ];
        let best = select_best_file(&files, Orientation::Portrait).unwrap();
        assert_eq!(best.link.as_deref(), Some("tall-big"));

        let best = select_best_file(&files, Orientation::Landscape).unwrap();
        assert_eq!(best.link.as_deref(), Some("wide-big"));
    }

    #[test]
    fn test_best_file_falls_back_to_any_orientation() {
        let files = vec![file("a", 1280, 720), file("b", 1920, 1080)];
        let best = select_best_file(&files, Orientation::Portrait).unwrap();
        assert_eq!(best.link.as_deref(), Some("b"));
    }

    #[test]
    fn test_best_file_skips_unusable() {
        let files = vec![
            VideoFile {
                link: None,
                width: Some(4000),
                height: Some(4000),
            },
            file("zero", 0, 1080),
        ];
        assert!(select_best_file(&files, Orientation::Portrait).is_none());
    }

    #[test]
    fn test_rank_is_stable_duration_descending() {
        let ranked = rank_candidates(vec![
            FootageCandidate::new("a", 1, 1, 5.0),
            FootageCandidate::new("b", 1, 1, 9.0),
            FootageCandidate::new("c", 1, 1, 5.0),
        ]);
        let urls: Vec<_> = ranked.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let client = PexelsClient::new(Client::new(), "http://127.0.0.1:9", Some("  ".into()));
        let err = client
            .search("ocean", Orientation::Portrait, 15)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_search_ranks_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos/search"))
            .and(header("Authorization", "secret"))
            .and(query_param("query", "ocean waves"))
            .and(query_param("per_page", "15"))
            .and(query_param("orientation", "portrait"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "videos": [
                    {"duration": 4, "video_files": [
                        {"link": "https://cdn/short.mp4", "width": 1080, "height": 1920}
                    ]},
                    {"duration": 12, "video_files": [
                        {"link": "https://cdn/long-sd.mp4", "width": 540, "height": 960},
                        {"link": "https://cdn/long-hd.mp4", "width": 1080, "height": 1920}
                    ]},
                    {"duration": 30, "video_files": []}
                ]
            })))
            .mount(&server)
            .await;

        let client = PexelsClient::new(Client::new(), server.uri(), Some("secret".into()));
        let candidates = client
            .search("ocean waves", Orientation::Portrait, DEFAULT_PAGE_SIZE)
            .await
            .unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].url, "https://cdn/long-hd.mp4");
        assert_eq!(candidates[0].duration_secs, 12.0);
        assert_eq!(candidates[1].url, "https://cdn/short.mp4");
    }

    #[tokio::test]
    async fn test_empty_result_is_no_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"videos": []})))
            .mount(&server)
            .await;

        let client = PexelsClient::new(Client::new(), server.uri(), Some("k".into()));
        let err = client
            .search("nothing", Orientation::Landscape, 15)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NoResults(q) if q == "nothing"));
    }

    #[tokio::test]
    async fn test_http_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = PexelsClient::new(Client::new(), server.uri(), Some("k".into()));
        let err = client
            .search("ocean", Orientation::Portrait, 15)
            .await
            .unwrap_err();
        match err {
            ProviderError::Provider { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "rate limited");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
