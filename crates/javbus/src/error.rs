use thiserror::Error;

/// Failures that terminate a crawl with no result. None of these are
/// retried internally.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("network request failed: {0}")]
    Transport(String),

    #[error("session cookie rejected by the site, refresh the cookie or switch nodes")]
    InvalidSession,

    #[error("no detail page for {0}")]
    NotFound(String),

    #[error("search finished without a matching number: {0}")]
    NoMatch(String),

    #[error("detail page has no title: {0}")]
    MissingTitle(String),
}
