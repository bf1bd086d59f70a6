//! Scripted transport and page fixtures shared by the module tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::transport::{FetchText, HeaderSet, Transport};

/// Transport serving canned responses by URL and recording every request.
/// Unscripted URLs come back as not-found.
pub(crate) struct ScriptedTransport {
    responses: HashMap<String, FetchText>,
    fetched: Mutex<Vec<String>>,
    downloads: Mutex<Vec<(String, String)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            fetched: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, url: &str, response: FetchText) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    /// `(url, destination)` pairs in request order.
    pub fn downloaded(&self) -> Vec<(String, String)> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch_text(&self, url: &str, _headers: &HeaderSet) -> FetchText {
        self.fetched.lock().unwrap().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .unwrap_or(FetchText::NotFound)
    }

    async fn download(&self, url: &str, dest: &Path, _headers: &HeaderSet) -> bool {
        self.downloads
            .lock()
            .unwrap()
            .push((url.to_string(), dest.display().to_string()));
        true
    }
}

/// Detail page carrying every extractable field, numbered ABC-123 and
/// marked censored by its active tab.
pub(crate) fn sample_detail_page() -> String {
    r#"<html><body>
<ul class="nav"><li class="active"><a href="/">有码</a></li><li><a href="/uncensored">无码</a></li></ul>
<h3>Some Title ABC-123</h3>
<div class="container">
  <a class="bigImage" href="/pics/cover/abc123_b.jpg"><img src="/pics/cover/abc123_b.jpg"></a>
  <p><span class="header">識別碼:</span> <span>ABC-123</span></p>
  <p><span class="header">發行日期:</span> 2020-05-01</p>
  <p><span class="header">長度:</span> 120分鐘</p>
  <p><a href="/studio/xx">StudioName</a></p>
  <p><a href="/label/yy">LabelName</a></p>
  <p><a href="/director/zz">DirectorName</a></p>
  <p><a href="/series/ss">SeriesName</a></p>
  <p>
    <span class="genre"><label><a href="/genre/1">TagA</a></label></span>
    <span class="genre"><label><a href="/genre/2">TagB</a></label></span>
  </p>
  <div id="sample-waterfall">
    <a class="sample-box" href="/pics/sample/abc1.jpg"></a>
    <a class="sample-box" href="https://img.example.com/abc2.jpg"></a>
  </div>
  <div class="star-box">
    <a href="/star/1"><img src="/actor/a1.jpg" title="Alice"></a>
    <div class="star-name"><a href="/star/1">Alice</a></div>
  </div>
  <div class="star-box">
    <a href="/star/2"><img src="/actor/a2.jpg" title="Bella"></a>
    <div class="star-name"><a href="/star/2">Bella</a></div>
  </div>
</div>
</body></html>"#
        .to_string()
}

/// Search results page listing one movie-box anchor per href.
pub(crate) fn search_results_page(hrefs: &[&str]) -> String {
    let boxes: String = hrefs
        .iter()
        .map(|href| format!(r#"<a class="movie-box" href="{href}"><div class="photo-frame"></div></a>"#))
        .collect();
    format!("<html><body><div id=\"waterfall\">{boxes}</div></body></html>")
}
