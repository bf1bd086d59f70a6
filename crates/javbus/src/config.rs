use crate::transport::HeaderSet;

/// Source tag stamped into every metadata record.
pub const SOURCE: &str = "javbus";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";
const ACCEPT_PAGE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9";
const ACCEPT_IMAGE: &str = "image/webp,image/apng,image/*,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7,ja;q=0.6";
// Bypasses the magnet-availability interstitial.
const COOKIE: &str = "existmag=all";

/// Site endpoints. Constructed once per crawler and passed down explicitly;
/// overridable for tests.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: String,
    /// Search endpoint for international releases, on a separate host.
    pub intl_search_base: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.javbus.com".to_string(),
            intl_search_base: "https://www.javbus.hair/search/".to_string(),
        }
    }
}

impl SiteConfig {
    /// Fixed browser-like header set for page fetches.
    pub fn page_headers(&self) -> HeaderSet {
        vec![
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            ("Accept".to_string(), ACCEPT_PAGE.to_string()),
            ("Accept-Language".to_string(), ACCEPT_LANGUAGE.to_string()),
            ("Cookie".to_string(), COOKIE.to_string()),
            ("Referer".to_string(), self.base_url.clone()),
        ]
    }

    /// Variant for artifact fetches: image Accept string, detail page as
    /// the Referer.
    pub fn image_headers(&self, referer: &str) -> HeaderSet {
        vec![
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            ("Accept".to_string(), ACCEPT_IMAGE.to_string()),
            ("Accept-Language".to_string(), ACCEPT_LANGUAGE.to_string()),
            ("Cookie".to_string(), COOKIE.to_string()),
            ("Referer".to_string(), referer.to_string()),
        ]
    }
}
