use lol_html::Selector;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Elements dropped before content selection.
///
/// `advertisement` and `ads` are not HTML elements, so they only match
/// custom tags of the same name and are inert on ordinary pages.
pub const DENYLIST: &[&str] = &["script", "style", "nav", "header", "footer", "aside", "advertisement", "ads"];

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Configuration for HTML preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Tag names whose elements are removed with their content
    pub denylist: Vec<String>,
    /// Whether to remove HTML comments
    pub remove_comments: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self { denylist: DENYLIST.iter().map(|t| t.to_string()).collect(), remove_comments: true }
    }
}

/// Strip boilerplate elements and comments from raw markup
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    let mut processed = remove_denylisted(html, &config.denylist);

    if config.remove_comments {
        processed = COMMENT_RE.replace_all(&processed, "").into_owned();
    }

    processed
}

/// Remove every element whose tag name is in the denylist, content included
fn remove_denylisted(html: &str, denylist: &[String]) -> String {
    let handlers: Vec<_> = denylist
        .iter()
        .filter(|tag| tag.parse::<Selector>().is_ok())
        .map(|tag| {
            lol_html::element!(tag.as_str(), |el| {
                el.remove();
                Ok(())
            })
        })
        .collect();

    if handlers.is_empty() {
        return html.to_string();
    }

    let mut output = Vec::with_capacity(html.len());
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings { element_content_handlers: handlers, ..Default::default() },
        |c: &[u8]| output.extend_from_slice(c),
    );

    if let Err(e) = rewriter.write(html.as_bytes()) {
        warn!(error = %e, "denylist rewrite failed, keeping markup unfiltered");
        return html.to_string();
    }

    if let Err(e) = rewriter.end() {
        warn!(error = %e, "denylist rewrite failed, keeping markup unfiltered");
        return html.to_string();
    }

    if output.is_empty() { html.to_string() } else { String::from_utf8_lossy(&output).into_owned() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_denylisted_elements() {
        let html = r#"<html><head><style>p{}</style><script>var x;</script></head>
            <body><header>Site</header><nav>Menu</nav><article><p>Body text</p></article>
            <aside>Related</aside><footer>Copyright</footer></body></html>"#;
        let result = preprocess_html(html, &PreprocessConfig::default());

        assert!(result.contains("Body text"));
        for gone in ["var x", "p{}", "Site", "Menu", "Related", "Copyright"] {
            assert!(!result.contains(gone), "{gone} should have been removed");
        }
    }

    #[test]
    fn test_ad_entries_only_match_custom_tags() {
        let html = r#"<div class="ads">Sponsored</div><div id="advertisement">Buy</div><ads>Gone</ads>"#;
        let result = preprocess_html(html, &PreprocessConfig::default());

        assert!(result.contains("Sponsored"));
        assert!(result.contains("Buy"));
        assert!(!result.contains("Gone"));
    }

    #[test]
    fn test_multibyte_text_survives_rewrite() {
        let body = "\u{e9}\u{2014}\u{4E2D}".repeat(4096);
        let html = format!("<nav>Menu</nav><p>{body}</p>");
        let result = preprocess_html(&html, &PreprocessConfig::default());

        assert_eq!(result, format!("<p>{body}</p>"));
    }

    #[test]
    fn test_remove_comments() {
        let html = "<p>Keep<!-- drop\nthis --></p>";
        let result = preprocess_html(html, &PreprocessConfig::default());
        assert_eq!(result, "<p>Keep</p>");
    }

    #[test]
    fn test_empty_denylist_is_passthrough() {
        let config = PreprocessConfig { denylist: Vec::new(), remove_comments: false };
        let html = "<nav>Menu</nav>";
        assert_eq!(preprocess_html(html, &config), html);
    }
}
