use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

/// One crawl request. Immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// Catalog number, e.g. `ABC-123`.
    pub number: String,
    /// Directory artifacts are written into.
    pub output_dir: PathBuf,
    /// Detail page URL supplied by the caller; skips resolution when set.
    pub appoint_url: String,
    /// Routing hint for the search fallback. The record's mosaic type always
    /// comes from the detail page itself.
    pub mosaic: MosaicHint,
    /// Download artifacts even when the eligibility heuristic says no.
    pub force_download: bool,
    /// Download a single cover.jpg instead of the full artifact set.
    pub only_cover: bool,
}

impl CrawlRequest {
    pub fn new(number: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            number: number.into(),
            output_dir: output_dir.into(),
            appoint_url: String::new(),
            mosaic: MosaicHint::Unspecified,
            force_download: false,
            only_cover: false,
        }
    }
}

/// Caller-supplied censorship hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MosaicHint {
    #[default]
    Unspecified,
    Censored,
    Uncensored,
}

impl FromStr for MosaicHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(MosaicHint::Unspecified),
            "censored" | "有码" | "有碼" => Ok(MosaicHint::Censored),
            "uncensored" | "无码" | "無碼" => Ok(MosaicHint::Uncensored),
            other => Err(format!("unknown mosaic type: {other}")),
        }
    }
}

/// Censorship classification read off the detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mosaic {
    Censored,
    #[default]
    Uncensored,
}

impl Mosaic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mosaic::Censored => "censored",
            Mosaic::Uncensored => "uncensored",
        }
    }
}

/// Crop hint for downstream poster processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageCut {
    Center,
    Right,
}

impl ImageCut {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageCut::Center => "center",
            ImageCut::Right => "right",
        }
    }
}

/// Fully assembled metadata for one title. Built once per run, never
/// mutated afterwards. String fields default to empty, never null.
#[derive(Debug, Clone, Serialize)]
pub struct MovieMetadata {
    pub title: String,
    /// Number as displayed on the page, which may differ from the input in
    /// case and punctuation.
    pub number: String,
    pub poster: String,
    pub thumb: String,
    pub extrafanart: Vec<String>,
    pub image_download: bool,
    pub image_cut: ImageCut,
    pub actor: String,
    pub actor_photo: BTreeMap<String, String>,
    pub release: String,
    pub year: String,
    pub tag: String,
    pub mosaic: Mosaic,
    pub runtime: String,
    pub studio: String,
    pub publisher: String,
    pub director: String,
    pub series: String,
    pub source: &'static str,
    pub website: String,
    pub trailer: String,
    pub wanted: String,
}

/// Serializable projection of [`MovieMetadata`] for machine consumption.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataReport {
    pub number: String,
    pub title: String,
    pub poster: String,
    pub thumb: String,
    pub actor: String,
    pub release: String,
    pub year: String,
    pub tag: String,
    pub mosaic: Mosaic,
    pub runtime: String,
    pub studio: String,
    pub publisher: String,
    pub director: String,
    pub series: String,
    pub website: String,
}

impl From<&MovieMetadata> for MetadataReport {
    fn from(record: &MovieMetadata) -> Self {
        Self {
            number: record.number.clone(),
            title: record.title.clone(),
            poster: record.poster.clone(),
            thumb: record.thumb.clone(),
            actor: record.actor.clone(),
            release: record.release.clone(),
            year: record.year.clone(),
            tag: record.tag.clone(),
            mosaic: record.mosaic,
            runtime: record.runtime.clone(),
            studio: record.studio.clone(),
            publisher: record.publisher.clone(),
            director: record.director.clone(),
            series: record.series.clone(),
            website: record.website.clone(),
        }
    }
}
