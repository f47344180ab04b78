//! Filename derivation from source URLs.

use sha2::{Digest, Sha256};
use url::Url;

/// Stem used when a URL has no usable path segment.
pub const FALLBACK_STEM: &str = "article";

/// Maximum stem length in characters.
pub const MAX_STEM_LEN: usize = 100;

/// Derive a filesystem-safe stem from the last path segment of `url`.
///
/// Only alphanumerics and `-` survive and the result is at most
/// [`MAX_STEM_LEN`] characters. URLs that fail to parse get
/// `article_<hash>` instead.
///
/// ```rust
/// use folio_core::sanitize_filename;
///
/// assert_eq!(sanitize_filename("https://example.com/blog/my-post.html"), "my-posthtml");
/// assert_eq!(sanitize_filename("https://example.com/"), "article");
/// ```
pub fn sanitize_filename(url: &str) -> String {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return hashed_stem(url);
    };

    let segment = parsed
        .path()
        .trim_matches('/')
        .split('/')
        .rfind(|s| !s.is_empty())
        .unwrap_or(FALLBACK_STEM);

    let stem: String = segment
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .take(MAX_STEM_LEN)
        .collect();

    if stem.is_empty() { FALLBACK_STEM.to_string() } else { stem }
}

fn hashed_stem(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let hex: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();
    format!("{}_{}", FALLBACK_STEM, hex)
}
