//! Per-field extraction rules over a parsed detail page.
//!
//! Every rule is independent and degrades to an empty value on structural
//! mismatch, so a missing section loses one field rather than the whole
//! extraction. Label-adjacent values (`識別碼`, `發行日期`, `長度`) are found
//! by locating the header span and walking to its parent.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::Mosaic;

static SEL_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").unwrap());
static SEL_HEADER_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.header").unwrap());
static SEL_SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());
static SEL_STAR_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.star-name").unwrap());
static SEL_ACTOR_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.star-name a").unwrap());
static SEL_STAR_IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a img").unwrap());
static SEL_BIG_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.bigImage").unwrap());
static SEL_BIG_IMAGE_IMG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.bigImage img").unwrap());
static SEL_ACTIVE_TAB: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li.active a").unwrap());
static SEL_STUDIO: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/studio/"]"#).unwrap());
static SEL_LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/label/"]"#).unwrap());
static SEL_DIRECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/director/"]"#).unwrap());
static SEL_SERIES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/series/"]"#).unwrap());
static SEL_GENRE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"span.genre label a[href*="/genre/"]"#).unwrap());
static SEL_FANART: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#sample-waterfall > a").unwrap());

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Raw values pulled from a detail page, before derivation.
#[derive(Debug, Default)]
pub struct RawFields {
    pub title: String,
    pub number: String,
    pub actor: String,
    pub actor_photo: BTreeMap<String, String>,
    pub cover: String,
    pub release: String,
    pub runtime: String,
    pub studio: String,
    pub publisher: String,
    pub director: String,
    pub series: String,
    pub tag: String,
    pub extrafanart: Vec<String>,
    pub mosaic: Mosaic,
}

/// Run every rule against the document. Never fails; `fallback_number` is
/// used when the page shows no identification code.
pub fn extract(document: &Html, base_url: &str, fallback_number: &str) -> RawFields {
    let studio = first_text(document, &SEL_STUDIO);
    RawFields {
        title: title(document),
        number: web_number(document).unwrap_or_else(|| fallback_number.to_string()),
        actor: actor(document),
        actor_photo: actor_photo(document, base_url),
        cover: cover(document, base_url),
        release: labeled_text(document, "發行日期"),
        runtime: runtime(document),
        publisher: publisher(document, &studio),
        studio,
        director: first_text(document, &SEL_DIRECTOR),
        series: first_text(document, &SEL_SERIES),
        tag: tag(document),
        extrafanart: extra_fanart(document, base_url),
        mosaic: mosaic(document),
    }
}

fn qualify(url: &str, base_url: &str) -> String {
    if url.contains("http") {
        url.to_string()
    } else {
        format!("{base_url}{url}")
    }
}

fn title(document: &Html) -> String {
    document
        .select(&SEL_TITLE)
        .next()
        .map(|h| h.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Find the `span.header` whose text contains `label` and return its parent
/// element.
fn labeled_parent<'a>(document: &'a Html, label: &str) -> Option<ElementRef<'a>> {
    document
        .select(&SEL_HEADER_SPAN)
        .find(|span| span.text().any(|t| t.contains(label)))
        .and_then(|span| span.parent())
        .and_then(ElementRef::wrap)
}

/// First non-empty direct text child of the label's parent.
fn labeled_text(document: &Html, label: &str) -> String {
    let Some(parent) = labeled_parent(document, label) else {
        return String::new();
    };
    parent
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|t| t.trim())
        .find(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_default()
}

/// Identification code next to the `識別碼` header, the second span of the
/// containing row.
fn web_number(document: &Html) -> Option<String> {
    let parent = labeled_parent(document, "識別碼")?;
    let value = parent.select(&SEL_SPAN).nth(1)?;
    Some(value.text().collect::<String>())
}

fn actor(document: &Html) -> String {
    document
        .select(&SEL_ACTOR_NAME)
        .map(|a| a.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(",")
}

/// Actor name/photo pairs from the star boxes. The two attribute lists must
/// line up; on a length mismatch every actor maps to an empty URL rather
/// than pairing partially.
fn actor_photo(document: &Html, base_url: &str) -> BTreeMap<String, String> {
    let mut names = Vec::new();
    let mut photos = Vec::new();
    for star in document.select(&SEL_STAR_NAME) {
        let Some(parent) = star.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        for img in parent.select(&SEL_STAR_IMG) {
            if let Some(name) = img.value().attr("title") {
                names.push(name.to_string());
            }
            if let Some(src) = img.value().attr("src") {
                photos.push(src.to_string());
            }
        }
    }

    if names.len() == photos.len() {
        names
            .into_iter()
            .zip(photos)
            .map(|(name, src)| {
                let url = qualify(&src, base_url);
                (name, url)
            })
            .collect()
    } else {
        names
            .into_iter()
            .map(|name| (name, String::new()))
            .collect()
    }
}

/// Cover image: prefer the inline big-image source, fall back to the link
/// target itself.
fn cover(document: &Html, base_url: &str) -> String {
    if let Some(src) = document
        .select(&SEL_BIG_IMAGE_IMG)
        .next()
        .and_then(|img| img.value().attr("src"))
    {
        return qualify(src, base_url);
    }
    if let Some(href) = document
        .select(&SEL_BIG_IMAGE)
        .next()
        .and_then(|a| a.value().attr("href"))
    {
        return qualify(href, base_url);
    }
    String::new()
}

fn runtime(document: &Html) -> String {
    let text = labeled_text(document, "長度");
    DIGITS
        .find(&text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn first_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .map(|a| a.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Falls back to the studio only when the page has no label link at all.
fn publisher(document: &Html, studio: &str) -> String {
    document
        .select(&SEL_LABEL)
        .next()
        .map(|a| a.text().collect::<String>().trim().to_string())
        .unwrap_or_else(|| studio.to_string())
}

fn tag(document: &Html) -> String {
    document
        .select(&SEL_GENRE)
        .map(|a| a.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(",")
}

fn extra_fanart(document: &Html, base_url: &str) -> Vec<String> {
    document
        .select(&SEL_FANART)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| qualify(href, base_url))
        .collect()
}

/// Censored when the active tab carries the censored marker, uncensored
/// otherwise (including when there is no tab bar at all).
fn mosaic(document: &Html) -> Mosaic {
    let tabs: String = document
        .select(&SEL_ACTIVE_TAB)
        .flat_map(|a| a.text())
        .collect();
    if tabs.contains("有码") {
        Mosaic::Censored
    } else {
        Mosaic::Uncensored
    }
}
