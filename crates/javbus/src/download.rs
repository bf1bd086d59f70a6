//! Artifact download planning and execution.

use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::models::MovieMetadata;
use crate::transport::Transport;

/// One artifact to fetch, with its path relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadItem {
    pub url: String,
    pub rel_path: PathBuf,
}

impl DownloadItem {
    fn new(url: &str, rel_path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.to_string(),
            rel_path: rel_path.into(),
        }
    }
}

/// Decide which artifacts to fetch. Pure; the `image_download` gate is
/// enforced by the executor.
pub fn build_download_plan(record: &MovieMetadata, only_cover: bool) -> Vec<DownloadItem> {
    if only_cover {
        // Prefer the small poster, fall back to the full cover.
        let source = if !record.poster.is_empty() {
            &record.poster
        } else {
            &record.thumb
        };
        if source.is_empty() {
            return Vec::new();
        }
        return vec![DownloadItem::new(source, "cover.jpg")];
    }

    let mut plan = Vec::new();
    if !record.poster.is_empty() {
        plan.push(DownloadItem::new(&record.poster, "poster.jpg"));
    }
    if !record.thumb.is_empty() {
        plan.push(DownloadItem::new(&record.thumb, "thumb.jpg"));
    }
    for (i, url) in record.extrafanart.iter().enumerate() {
        plan.push(DownloadItem::new(
            url,
            PathBuf::from("extrafanart").join(format!("fanart{}.jpg", i + 1)),
        ));
    }
    plan
}

/// Fetch every planned artifact into `output_dir`. Per-artifact failures
/// are logged and skipped; returns the number of files written.
pub(crate) async fn execute(
    transport: &dyn Transport,
    config: &SiteConfig,
    record: &MovieMetadata,
    output_dir: &Path,
    only_cover: bool,
) -> usize {
    if !record.image_download {
        tracing::info!("image download disabled for {}", record.number);
        return 0;
    }

    let plan = build_download_plan(record, only_cover);
    let headers = config.image_headers(&record.website);
    let mut downloaded = 0;
    for item in &plan {
        let dest = output_dir.join(&item.rel_path);
        if transport.download(&item.url, &dest, &headers).await {
            tracing::info!("downloaded {} -> {}", item.url, dest.display());
            downloaded += 1;
        } else {
            tracing::warn!("failed to download {}", item.url);
        }
    }
    downloaded
}
