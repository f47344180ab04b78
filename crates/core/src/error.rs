//! Error types for Folio operations.
//!
//! This module defines the main error type [`FolioError`] which represents
//! all possible errors that can occur while fetching pages, extracting their
//! main content, rendering documents and packaging archives.
//!
//! # Example
//!
//! ```rust
//! use folio_core::{FolioError, Result};
//!
//! fn first_url(urls: &[String]) -> Result<&str> {
//!     urls.first()
//!         .map(String::as_str)
//!         .ok_or_else(|| FolioError::InvalidUrl("no URL submitted".to_string()))
//! }
//! # assert!(first_url(&[]).is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the conversion pipeline.
///
/// Network and extraction failures are reported per URL by the batch
/// converter; storage failures surface to whoever asked for the file.
#[derive(Error, Debug)]
pub enum FolioError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other transport problems.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The server answered with a status outside the 2xx range.
    #[error("{url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// Neither a content candidate nor a `<body>` was found.
    #[error("No content could be extracted from {url}")]
    NoContent { url: String },

    /// Image bytes could not be decoded.
    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    /// PDF construction or serialization failed.
    #[error("Failed to render document: {0}")]
    Render(String),

    /// Archive packaging failed.
    #[error("Failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// A stored document does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<printpdf::Error> for FolioError {
    fn from(err: printpdf::Error) -> Self {
        FolioError::Render(format!("{:?}", err))
    }
}

/// Result type alias for FolioError.
pub type Result<T> = std::result::Result<T, FolioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FolioError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_status_error() {
        let err = FolioError::Status { url: "https://example.com/a".to_string(), status: 404 };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("https://example.com/a"));
    }

    #[test]
    fn test_timeout_error() {
        let err = FolioError::Timeout { timeout: 10 };
        assert!(err.to_string().contains("10"));
    }

    #[test]
    fn test_no_content_error() {
        let err = FolioError::NoContent { url: "https://example.com".to_string() };
        assert!(err.to_string().contains("https://example.com"));
    }
}
