//! Main content selection.
//!
//! Picks the best-guess article node of a page: the first match among a
//! fixed, ordered list of candidate selectors, else `<body>`.

use tracing::{debug, info};
use url::Url;

use crate::fetch::Fetcher;
use crate::parse::Document;
use crate::preprocess::{PreprocessConfig, preprocess_html};
use crate::{FolioError, Result};

/// Candidate selectors, tried in order before falling back to `<body>`.
pub const CANDIDATE_SELECTORS: &[&str] = &["article", "main", "div.content", "div.article-body", "div.post-content"];

const BODY_SELECTOR: &str = "body";

/// The result of content extraction
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// Outer HTML of the selected content node
    pub html: String,
    /// URL of the page, used to resolve relative image paths
    pub base_url: Url,
    /// The selector that matched (`body` for the fallback)
    pub selector: &'static str,
    /// Document title, if any
    pub title: Option<String>,
}

/// Fetch a page and extract its main content node.
pub async fn extract_article(url: &str, fetcher: &Fetcher) -> Result<ExtractedContent> {
    let page = fetcher.fetch_page(url).await?;
    info!(url, bytes = page.text.len(), "fetched page");

    extract_from_html(&page.text, page.url)
}

/// Extract the main content node from already-fetched markup.
pub fn extract_from_html(html: &str, base_url: Url) -> Result<ExtractedContent> {
    let cleaned = preprocess_html(html, &PreprocessConfig::default());
    let doc = Document::parse(&cleaned);

    for selector in CANDIDATE_SELECTORS {
        if let Some(element) = doc.select_first(selector)? {
            debug!(url = %base_url, selector, "matched content candidate");
            return Ok(ExtractedContent { html: element.outer_html(), title: doc.title(), base_url, selector });
        }
    }

    match doc.body() {
        Some(body) => {
            debug!(url = %base_url, "no content candidate matched, falling back to body");
            Ok(ExtractedContent { html: body.outer_html(), title: doc.title(), base_url, selector: BODY_SELECTOR })
        }
        None => Err(FolioError::NoContent { url: base_url.to_string() }),
    }
}
