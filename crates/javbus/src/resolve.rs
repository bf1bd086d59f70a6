//! Resolution of a catalog number to a confirmed detail page.
//!
//! Explicit URLs are fetched as-is. International numbering goes straight to
//! its dedicated search host with no guess and no not-found fallback.
//! Domestic numbering first guesses `{base}/{number}` and only falls back to
//! search (censored or uncensored endpoint, picked by the caller's hint)
//! when the guess reports not-found.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::config::SiteConfig;
use crate::error::CrawlError;
use crate::models::MosaicHint;
use crate::transport::{FetchText, HeaderSet, Transport};

/// Marker the site serves when the session cookie is rejected.
const INVALID_SESSION_MARKER: &str = "lostpasswd";

// Three 2-digit groups mark an international release date, e.g. 17-01-02.
static INTL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_]\d{2}[-_]\d{2}[-_]\d{2}").unwrap());
static SEL_MOVIE_BOX: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.movie-box").unwrap());

/// A confirmed detail page. The body is kept unparsed so the resolver's
/// future stays `Send`; the orchestrator parses it once.
#[derive(Debug)]
pub struct ResolvedPage {
    pub url: String,
    pub html: String,
    /// Number after any search-path normalization, used downstream as the
    /// extraction fallback and title-cleanup key.
    pub number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchKind {
    International,
    Censored,
    Uncensored,
}

fn search_url(config: &SiteConfig, kind: SearchKind, number: &str) -> String {
    match kind {
        SearchKind::International => format!("{}{}", config.intl_search_base, number),
        SearchKind::Censored => {
            format!("{}/search/{}&type=&parent=ce", config.base_url, number)
        }
        SearchKind::Uncensored => {
            format!("{}/uncensored/search/{}&type=0&parent=uc", config.base_url, number)
        }
    }
}

/// International numbers embed a dotted release date, or the same date with
/// `-`/`_` separators.
pub(crate) fn is_international(number: &str) -> bool {
    number.contains('.') || INTL_PATTERN.is_match(number)
}

pub(crate) fn normalize_international(number: &str) -> String {
    number.replace(['-', '_'], ".")
}

/// CWP/LAF guess URLs drop one level of zero padding. This is a fixed
/// naming convention of those two studios, not general normalization.
pub(crate) fn guess_number(number: &str) -> String {
    let upper = number.to_uppercase();
    if !(upper.starts_with("CWP") || upper.starts_with("LAF")) {
        return number.to_string();
    }
    let mut rewritten = number.replace("-0", "-");
    let bytes = rewritten.as_bytes();
    if bytes.len() >= 2 && bytes[bytes.len() - 2] == b'-' {
        rewritten = rewritten.replace('-', "-0");
    }
    rewritten
}

/// Search-result matching: upper-case both sides, drop hyphens from the
/// href and hyphens plus dots from the number, then require `/NUMBER` at
/// the end or `/NUMBER_` anywhere (suffixed variants like part markers).
pub(crate) fn candidate_matches(href: &str, number: &str) -> bool {
    let href = href.to_uppercase().replace('-', "");
    let exact = format!("/{}", number.to_uppercase().replace(['.', '-'], ""));
    let suffixed = format!("{exact}_");
    href.ends_with(&exact) || href.contains(&suffixed)
}

/// Fetch the search results page and return the first matching detail URL.
async fn search(
    transport: &dyn Transport,
    config: &SiteConfig,
    headers: &HeaderSet,
    kind: SearchKind,
    number: &str,
) -> Result<String, CrawlError> {
    let url = search_url(config, kind, number);
    tracing::debug!("searching: {url}");

    let html = match transport.fetch_text(&url, headers).await {
        FetchText::Ok(html) => html,
        FetchText::NotFound => {
            return Err(CrawlError::Transport(format!("HTTP 404 when fetching {url}")))
        }
        FetchText::Error(e) => return Err(CrawlError::Transport(e)),
    };
    if html.contains(INVALID_SESSION_MARKER) {
        return Err(CrawlError::InvalidSession);
    }

    let document = Html::parse_document(&html);
    document
        .select(&SEL_MOVIE_BOX)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| candidate_matches(href, number))
        .map(str::to_string)
        .ok_or_else(|| CrawlError::NoMatch(number.to_string()))
}

pub(crate) async fn resolve(
    transport: &dyn Transport,
    config: &SiteConfig,
    headers: &HeaderSet,
    number: &str,
    appoint_url: &str,
    hint: MosaicHint,
) -> Result<ResolvedPage, CrawlError> {
    // Caller-supplied URL wins outright; no content validation here.
    if !appoint_url.is_empty() {
        let html = match transport.fetch_text(appoint_url, headers).await {
            FetchText::Ok(html) => html,
            FetchText::NotFound => return Err(CrawlError::NotFound(appoint_url.to_string())),
            FetchText::Error(e) => return Err(CrawlError::Transport(e)),
        };
        return Ok(ResolvedPage {
            url: appoint_url.to_string(),
            html,
            number: number.to_string(),
        });
    }

    if is_international(number) {
        let normalized = normalize_international(number);
        let detail_url =
            search(transport, config, headers, SearchKind::International, &normalized).await?;
        tracing::debug!("matched international detail page: {detail_url}");
        let html = match transport.fetch_text(&detail_url, headers).await {
            FetchText::Ok(html) => html,
            // No fallback path exists for international numbers.
            FetchText::NotFound => return Err(CrawlError::NotFound(normalized)),
            FetchText::Error(e) => return Err(CrawlError::Transport(e)),
        };
        if html.contains(INVALID_SESSION_MARKER) {
            return Err(CrawlError::InvalidSession);
        }
        return Ok(ResolvedPage {
            url: detail_url,
            html,
            number: normalized,
        });
    }

    let guess = format!("{}/{}", config.base_url, guess_number(number));
    tracing::debug!("direct guess: {guess}");
    match transport.fetch_text(&guess, headers).await {
        FetchText::Ok(html) => {
            if html.contains(INVALID_SESSION_MARKER) {
                return Err(CrawlError::InvalidSession);
            }
            return Ok(ResolvedPage {
                url: guess,
                html,
                number: number.to_string(),
            });
        }
        FetchText::Error(e) => return Err(CrawlError::Transport(e)),
        FetchText::NotFound => {}
    }

    // Guess came back not-found: route through search. The hint only picks
    // the endpoint; the detail page still decides the real mosaic type.
    let kind = if hint == MosaicHint::Uncensored {
        SearchKind::Uncensored
    } else {
        SearchKind::Censored
    };
    let detail_url = search(transport, config, headers, kind, number).await?;
    tracing::debug!("matched detail page via search: {detail_url}");

    match transport.fetch_text(&detail_url, headers).await {
        FetchText::Ok(html) => Ok(ResolvedPage {
            url: detail_url,
            html,
            number: number.to_string(),
        }),
        _ => Err(CrawlError::NoMatch(number.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{search_results_page, ScriptedTransport};

    fn config() -> SiteConfig {
        SiteConfig::default()
    }

    fn headers() -> HeaderSet {
        config().page_headers()
    }

    #[test]
    fn international_shape_detection() {
        assert!(is_international("angela.17.01.02"));
        assert!(is_international("ANGELA-17-01-02"));
        assert!(is_international("angela_17_01_02"));
        assert!(!is_international("ABC-123"));
        assert!(!is_international("HEYZO-1234"));
    }

    #[test]
    fn international_separators_normalize_to_dots() {
        assert_eq!(normalize_international("angela-17_01-02"), "angela.17.01.02");
    }

    #[test]
    fn studio_prefix_rewrite_is_scoped_and_stable() {
        assert_eq!(guess_number("LAF-001"), "LAF-01");
        assert_eq!(guess_number("CWP-08"), "CWP-08");
        assert_eq!(guess_number("CWP-115"), "CWP-115");
        // Other prefixes are never rewritten.
        assert_eq!(guess_number("ABC-001"), "ABC-001");
    }

    #[test]
    fn candidate_matching_rules() {
        assert!(candidate_matches("https://www.javbus.com/ABC-123", "ABC-123"));
        assert!(candidate_matches("https://www.javbus.com/abc-123_2020", "ABC-123"));
        assert!(candidate_matches(
            "https://www.javbus.hair/angela-17-01-02",
            "angela.17.01.02"
        ));
        assert!(!candidate_matches("https://www.javbus.com/ABC-1234", "ABC-123"));
        assert!(!candidate_matches("https://www.javbus.com/XABC-123", "ABC-123"));
    }

    #[tokio::test]
    async fn direct_guess_success_is_a_single_fetch() {
        let transport = ScriptedTransport::new().with_response(
            "https://www.javbus.com/ABC-123",
            FetchText::Ok("<html><h3>t ABC-123</h3></html>".into()),
        );

        let page = resolve(
            &transport,
            &config(),
            &headers(),
            "ABC-123",
            "",
            MosaicHint::Unspecified,
        )
        .await
        .unwrap();

        assert_eq!(page.url, "https://www.javbus.com/ABC-123");
        assert_eq!(transport.fetched_urls(), vec!["https://www.javbus.com/ABC-123"]);
    }

    #[tokio::test]
    async fn international_never_guesses() {
        let search_url = "https://www.javbus.hair/search/angela.17.01.02";
        let detail_url = "https://www.javbus.hair/angela-17-01-02";
        let transport = ScriptedTransport::new()
            .with_response(
                search_url,
                FetchText::Ok(search_results_page(&[detail_url])),
            )
            .with_response(detail_url, FetchText::Ok("<html></html>".into()));

        let page = resolve(
            &transport,
            &config(),
            &headers(),
            "angela-17_01-02",
            "",
            MosaicHint::Unspecified,
        )
        .await
        .unwrap();

        assert_eq!(page.url, detail_url);
        assert_eq!(page.number, "angela.17.01.02");
        // Exactly one search fetch, zero guess fetches.
        assert_eq!(transport.fetched_urls(), vec![search_url, detail_url]);
    }

    #[tokio::test]
    async fn international_not_found_is_terminal() {
        let search_url = "https://www.javbus.hair/search/angela.17.01.02";
        let detail_url = "https://www.javbus.hair/angela-17-01-02";
        let transport = ScriptedTransport::new()
            .with_response(
                search_url,
                FetchText::Ok(search_results_page(&[detail_url])),
            )
            .with_response(detail_url, FetchText::NotFound);

        let err = resolve(
            &transport,
            &config(),
            &headers(),
            "angela.17.01.02",
            "",
            MosaicHint::Unspecified,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CrawlError::NotFound(_)));
    }

    #[tokio::test]
    async fn not_found_guess_falls_back_to_hinted_search() {
        let search_url = "https://www.javbus.com/uncensored/search/ABC-123&type=0&parent=uc";
        let detail_url = "https://www.javbus.com/ABC-123_2020";
        let transport = ScriptedTransport::new()
            .with_response(
                search_url,
                FetchText::Ok(search_results_page(&[
                    "https://www.javbus.com/OTHER-1",
                    detail_url,
                ])),
            )
            .with_response(detail_url, FetchText::Ok("<html></html>".into()));

        let page = resolve(
            &transport,
            &config(),
            &headers(),
            "ABC-123",
            "",
            MosaicHint::Uncensored,
        )
        .await
        .unwrap();

        assert_eq!(page.url, detail_url);
        assert_eq!(
            transport.fetched_urls(),
            vec!["https://www.javbus.com/ABC-123", search_url, detail_url]
        );
    }

    #[tokio::test]
    async fn unhinted_fallback_uses_censored_search() {
        let search_url = "https://www.javbus.com/search/ABC-123&type=&parent=ce";
        let detail_url = "https://www.javbus.com/ABC-123";
        let transport = ScriptedTransport::new()
            .with_response(
                search_url,
                FetchText::Ok(search_results_page(&[detail_url])),
            )
            .with_response(detail_url, FetchText::NotFound);

        // The guess and the matched detail URL are the same address here,
        // so script it as not-found and expect the post-search failure.
        let err = resolve(
            &transport,
            &config(),
            &headers(),
            "ABC-123",
            "",
            MosaicHint::Unspecified,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CrawlError::NoMatch(_)));
        assert!(transport.fetched_urls().contains(&search_url.to_string()));
    }

    #[tokio::test]
    async fn search_without_candidate_is_no_match() {
        let search_url = "https://www.javbus.com/search/ABC-123&type=&parent=ce";
        let transport = ScriptedTransport::new().with_response(
            search_url,
            FetchText::Ok(search_results_page(&["https://www.javbus.com/OTHER-1"])),
        );

        let err = resolve(
            &transport,
            &config(),
            &headers(),
            "ABC-123",
            "",
            MosaicHint::Unspecified,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CrawlError::NoMatch(_)));
    }

    #[tokio::test]
    async fn session_marker_on_guess_is_terminal() {
        let transport = ScriptedTransport::new().with_response(
            "https://www.javbus.com/ABC-123",
            FetchText::Ok("please visit lostpasswd to continue".into()),
        );

        let err = resolve(
            &transport,
            &config(),
            &headers(),
            "ABC-123",
            "",
            MosaicHint::Unspecified,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CrawlError::InvalidSession));
        assert_eq!(transport.fetched_urls().len(), 1);
    }

    #[tokio::test]
    async fn session_marker_on_search_page_is_terminal() {
        let search_url = "https://www.javbus.com/search/ABC-123&type=&parent=ce";
        let transport = ScriptedTransport::new().with_response(
            search_url,
            FetchText::Ok("please visit lostpasswd to continue".into()),
        );

        let err = resolve(
            &transport,
            &config(),
            &headers(),
            "ABC-123",
            "",
            MosaicHint::Unspecified,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CrawlError::InvalidSession));
        // Guess, then search; the marker stops everything there.
        assert_eq!(transport.fetched_urls().len(), 2);
    }

    #[tokio::test]
    async fn transport_error_propagates_verbatim() {
        let transport = ScriptedTransport::new().with_response(
            "https://www.javbus.com/ABC-123",
            FetchText::Error("connection refused".into()),
        );

        let err = resolve(
            &transport,
            &config(),
            &headers(),
            "ABC-123",
            "",
            MosaicHint::Unspecified,
        )
        .await
        .unwrap_err();

        match err {
            CrawlError::Transport(msg) => assert_eq!(msg, "connection refused"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn appoint_url_skips_resolution() {
        let appoint = "https://www.javbus.com/SOME-PAGE";
        let transport = ScriptedTransport::new()
            .with_response(appoint, FetchText::Ok("<html></html>".into()));

        let page = resolve(
            &transport,
            &config(),
            &headers(),
            "ABC-123",
            appoint,
            MosaicHint::Unspecified,
        )
        .await
        .unwrap();

        assert_eq!(page.url, appoint);
        assert_eq!(transport.fetched_urls(), vec![appoint]);
    }
}
