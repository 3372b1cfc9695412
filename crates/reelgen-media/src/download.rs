//! Streamed HTTP downloads.
//!
//! Bodies are written to disk chunk by chunk so peak memory stays bounded
//! regardless of clip size.

use std::path::Path;
use std::time::Instant;

use futures::StreamExt;
use reqwest::{Client, Response};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// Download `url` to `output_path`, returning the number of bytes written.
pub async fn download_to_file(
    client: &Client,
    url: &str,
    output_path: impl AsRef<Path>,
) -> MediaResult<u64> {
    let output_path = output_path.as_ref();
    let started = Instant::now();

    debug!(url = %url, output = %output_path.display(), "Downloading");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| MediaError::download_failed(format!("{}: {}", url, e)))?;

    let bytes = stream_response_to_file(response, output_path).await?;

    metrics::histogram!("reelgen_download_duration_seconds")
        .record(started.elapsed().as_secs_f64());
    info!(
        url = %url,
        bytes = bytes,
        duration_ms = started.elapsed().as_millis() as u64,
        "Download complete"
    );

    Ok(bytes)
}

/// Write a response body to disk, failing on non-success status or an
/// empty body.
pub async fn stream_response_to_file(
    response: Response,
    output_path: impl AsRef<Path>,
) -> MediaResult<u64> {
    let output_path = output_path.as_ref();
    let url = response.url().to_string();
    let status = response.status();

    if !status.is_success() {
        return Err(MediaError::download_failed(format!(
            "{} returned HTTP {}",
            url, status
        )));
    }

    let mut file = File::create(output_path).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|e| MediaError::download_failed(format!("{}: {}", url, e)))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;

    if written == 0 {
        return Err(MediaError::download_failed(format!(
            "{} returned an empty body",
            url
        )));
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_download_writes_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clip.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let out = dir.path().join("clip.mp4");
        let bytes = download_to_file(&Client::new(), &format!("{}/clip.mp4", server.uri()), &out)
            .await
            .unwrap();

        assert_eq!(bytes, 4096);
        assert_eq!(tokio::fs::read(&out).await.unwrap().len(), 4096);
    }

    #[tokio::test]
    async fn test_download_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let err = download_to_file(&Client::new(), &format!("{}/missing", server.uri()), dir.path().join("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::DownloadFailed { .. }));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_download_rejects_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let err = download_to_file(&Client::new(), &server.uri(), dir.path().join("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::DownloadFailed { .. }));
    }
}
