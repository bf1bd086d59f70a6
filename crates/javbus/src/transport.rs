use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};

/// Header name/value pairs attached to one request.
pub type HeaderSet = Vec<(String, String)>;

/// Outcome of a text fetch. `NotFound` is kept apart from other failures
/// because the resolver falls back to search on it.
#[derive(Debug, Clone)]
pub enum FetchText {
    Ok(String),
    NotFound,
    Error(String),
}

/// HTTP seam between the engine and the network.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch_text(&self, url: &str, headers: &HeaderSet) -> FetchText;

    /// Fetch an artifact to disk. Returns whether the file was written.
    async fn download(&self, url: &str, dest: &Path, headers: &HeaderSet) -> bool;
}

/// [`Transport`] backed by a shared reqwest client. Proxy, timeout and TLS
/// settings belong to the injected client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn apply_headers(mut request: RequestBuilder, headers: &HeaderSet) -> RequestBuilder {
        for (name, value) in headers {
            request = request.header(name, value);
        }
        request
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_text(&self, url: &str, headers: &HeaderSet) -> FetchText {
        let request = Self::apply_headers(self.client.get(url), headers);
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return FetchText::Error(e.to_string()),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return FetchText::NotFound;
        }
        if !status.is_success() {
            return FetchText::Error(format!("HTTP {} when fetching {}", status, url));
        }

        match response.text().await {
            Ok(text) => FetchText::Ok(text),
            Err(e) => FetchText::Error(e.to_string()),
        }
    }

    async fn download(&self, url: &str, dest: &Path, headers: &HeaderSet) -> bool {
        let request = Self::apply_headers(self.client.get(url), headers);
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("download request failed: {url}: {e}");
                return false;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("download returned HTTP {} for {url}", response.status());
            return false;
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("download body read failed: {url}: {e}");
                return false;
            }
        };

        if let Some(parent) = dest.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                tracing::warn!("failed to create {}: {e}", parent.display());
                return false;
            }
        }

        // Unique temp file, then rename (atomic on most filesystems).
        let temp_suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let tmp_path = dest.with_extension(format!("tmp.{temp_suffix}"));

        if let Err(e) = tokio::fs::write(&tmp_path, &bytes).await {
            tracing::warn!("failed to write {}: {e}", tmp_path.display());
            return false;
        }
        if let Err(e) = tokio::fs::rename(&tmp_path, dest).await {
            tracing::warn!("failed to move {} into place: {e}", tmp_path.display());
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return false;
        }

        true
    }
}
