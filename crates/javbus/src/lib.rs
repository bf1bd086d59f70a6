//! Metadata crawler for javbus detail pages.
//!
//! Resolves a catalog number to its canonical detail page (direct URL guess
//! with a search fallback, or a dedicated search path for international
//! numbering), extracts the page's fields, derives secondary artifact URLs,
//! and plans image downloads.
//!
//! The HTTP side lives behind the [`Transport`] trait so the resolution
//! state machine can be tested against scripted responses.

mod config;
mod crawler;
mod derive;
mod download;
mod error;
mod extract;
mod models;
mod resolve;
#[cfg(test)]
mod testing;
mod transport;

pub use config::SiteConfig;
pub use crawler::JavbusCrawler;
pub use download::{build_download_plan, DownloadItem};
pub use error::CrawlError;
pub use models::{CrawlRequest, ImageCut, MetadataReport, Mosaic, MosaicHint, MovieMetadata};
pub use transport::{FetchText, HeaderSet, HttpTransport, Transport};

pub type Result<T> = std::result::Result<T, CrawlError>;
