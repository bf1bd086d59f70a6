use std::path::Path;
use std::sync::Arc;

use scraper::Html;

use crate::config::{SiteConfig, SOURCE};
use crate::derive;
use crate::download;
use crate::error::CrawlError;
use crate::extract;
use crate::models::{CrawlRequest, MovieMetadata};
use crate::resolve;
use crate::transport::Transport;

/// Crawler for the target site. Holds the injected transport and site
/// endpoints; one [`crawl`](Self::crawl) call is one independent unit of
/// work with no shared mutable state.
pub struct JavbusCrawler {
    transport: Arc<dyn Transport>,
    config: SiteConfig,
}

impl JavbusCrawler {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: SiteConfig::default(),
        }
    }

    pub fn with_config(transport: Arc<dyn Transport>, config: SiteConfig) -> Self {
        Self { transport, config }
    }

    /// Resolve the number to a detail page and assemble its metadata.
    pub async fn crawl(&self, request: &CrawlRequest) -> crate::Result<MovieMetadata> {
        let headers = self.config.page_headers();
        let page = resolve::resolve(
            self.transport.as_ref(),
            &self.config,
            &headers,
            &request.number,
            &request.appoint_url,
            request.mosaic,
        )
        .await?;
        tracing::info!("detail page: {}", page.url);

        let document = Html::parse_document(&page.html);
        let raw = extract::extract(&document, &self.config.base_url, &page.number);
        if raw.title.is_empty() {
            return Err(CrawlError::MissingTitle(page.url));
        }

        let title = derive::clean_title(&raw.title, &raw.number);
        let year = derive::year_from_release(&raw.release);
        let image_cut = derive::image_cut(raw.mosaic);
        let mut poster = derive::poster_from_cover(&raw.cover);
        let mut image_download = derive::image_download_eligible(
            raw.mosaic,
            &raw.number,
            &poster,
            &self.config.base_url,
        );

        // KMHRS releases lead with a high-resolution still, which stands in
        // for the derived poster.
        if raw.number.contains("KMHRS") {
            image_download = true;
            if let Some(first) = raw.extrafanart.first() {
                poster = first.clone();
            }
        }

        Ok(MovieMetadata {
            title,
            number: raw.number,
            poster,
            thumb: raw.cover,
            extrafanart: raw.extrafanart,
            image_download: image_download || request.force_download,
            image_cut,
            actor: raw.actor,
            actor_photo: raw.actor_photo,
            release: raw.release,
            year,
            tag: raw.tag,
            mosaic: raw.mosaic,
            runtime: raw.runtime,
            studio: raw.studio,
            publisher: raw.publisher,
            director: raw.director,
            series: raw.series,
            source: SOURCE,
            website: page.url,
            trailer: String::new(),
            wanted: String::new(),
        })
    }

    /// Execute the record's download plan into `output_dir`. Returns the
    /// number of files written; does nothing unless the record's
    /// `image_download` flag is set.
    pub async fn download_artifacts(
        &self,
        record: &MovieMetadata,
        output_dir: &Path,
        only_cover: bool,
    ) -> usize {
        download::execute(
            self.transport.as_ref(),
            &self.config,
            record,
            output_dir,
            only_cover,
        )
        .await
    }
}
