//! Pure derivations over extracted fields. The eligibility rules are
//! literal site conventions observed on live pages; do not generalize them.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ImageCut, Mosaic};

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

/// First 4-digit run in the release date, else its first 4 characters.
pub fn year_from_release(release: &str) -> String {
    if let Some(m) = YEAR.find(release) {
        return m.as_str().to_string();
    }
    release.chars().take(4).collect()
}

/// Rewrite a cover URL into its small-poster counterpart. The two image
/// hosts name their thumbnail directories differently; any other shape has
/// no derivable poster.
pub fn poster_from_cover(cover: &str) -> String {
    if cover.contains("/pics/") {
        cover.replace("/cover/", "/thumb/").replace("_b.jpg", ".jpg")
    } else if cover.contains("/imgs/") {
        cover.replace("/cover/", "/thumbs/").replace("_b.jpg", ".jpg")
    } else {
        String::new()
    }
}

pub fn image_cut(mosaic: Mosaic) -> ImageCut {
    match mosaic {
        Mosaic::Uncensored => ImageCut::Center,
        Mosaic::Censored => ImageCut::Right,
    }
}

/// Whether an uncensored release has a usable small poster worth fetching.
/// Underscore numbering implies a real thumb; HEYZO hides its thumb behind a
/// fixed-width path, hence the 7-character remainder check. Censored
/// releases never qualify automatically.
pub fn image_download_eligible(mosaic: Mosaic, number: &str, poster: &str, base_url: &str) -> bool {
    if mosaic != Mosaic::Uncensored {
        return false;
    }
    (number.contains('_') && !poster.is_empty())
        || (number.contains("HEYZO")
            && poster.replace(&format!("{base_url}/imgs/thumbs/"), "").len() == 7)
}

/// Strip the displayed number out of the page title.
pub fn clean_title(title: &str, number: &str) -> String {
    title.replace(number, "").trim().to_string()
}
