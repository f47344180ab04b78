//! Page and image fetching over HTTP.
//!
//! Both kinds of request share one client, one timeout and one browser-like
//! User-Agent. They differ in how status codes are treated: a page outside
//! the 2xx range is an error, while an image whose status is anything but
//! 200 is simply skipped.

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::debug;
use url::Url;

use crate::{FolioError, Result};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT: u64 = 10;

/// Desktop browser identification sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// HTTP client configuration for fetching pages and images.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: DEFAULT_TIMEOUT, user_agent: DEFAULT_USER_AGENT.to_string() }
    }
}

/// A page body decoded with the charset of its `Content-Type`.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub status: u16,
    pub text: String,
}

/// A raw response body held in memory for the duration of one call.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// The URL that was requested.
    pub url: Url,
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

/// Reusable HTTP fetcher.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    /// Builds a client with the configured timeout and User-Agent.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FolioError::HttpError)?;

        Ok(Self { client, config })
    }

    /// Fetches a page, treating any non-2xx status as a failure.
    ///
    /// The body is decoded according to the response charset, falling back
    /// to UTF-8 when none is declared.
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        let parsed = parse_http_url(url)?;
        let response = self.send(&parsed).await?;
        let status = response.status().as_u16();

        if !(200..300).contains(&status) {
            return Err(FolioError::Status { url: url.to_string(), status });
        }

        let text = response.text().await.map_err(|e| self.map_transport(e))?;
        Ok(FetchedPage { url: parsed, status, text })
    }

    /// Fetches an image, returning `None` unless the status is exactly 200.
    pub async fn fetch_image(&self, url: &Url) -> Result<Option<Fetched>> {
        let response = self.send(url).await?;
        let status = response.status().as_u16();

        if status != 200 {
            debug!(url = %url, status, "skipping image with non-200 status");
            return Ok(None);
        }

        let body = response.bytes().await.map_err(|e| self.map_transport(e))?.to_vec();
        Ok(Some(Fetched { url: url.clone(), status, body }))
    }

    async fn send(&self, url: &Url) -> Result<Response> {
        self.client
            .get(url.clone())
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/*;q=0.8,*/*;q=0.7",
            )
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| self.map_transport(e))
    }

    fn map_transport(&self, err: reqwest::Error) -> FolioError {
        if err.is_timeout() { FolioError::Timeout { timeout: self.config.timeout } } else { FolioError::HttpError(err) }
    }
}

/// Parses a URL and requires an http or https scheme.
pub fn parse_http_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|e| FolioError::InvalidUrl(format!("{}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FolioError::InvalidUrl(format!(
            "{}: unsupported scheme '{}' (expected http or https)",
            url, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 10);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_url_validation() {
        assert!(parse_http_url("http://example.com").is_ok());
        assert!(parse_http_url("https://example.com/a/b").is_ok());
        assert!(matches!(parse_http_url("example.com"), Err(FolioError::InvalidUrl(_))));
        assert!(matches!(parse_http_url("ftp://example.com/file"), Err(FolioError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_page_sends_user_agent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/article").header("user-agent", DEFAULT_USER_AGENT);
                then.status(200).body("<html><body><p>Hi</p></body></html>");
            })
            .await;

        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
        let page = fetcher.fetch_page(&server.url("/article")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.status, 200);
        assert!(page.text.contains("<p>Hi</p>"));
    }

    #[tokio::test]
    async fn test_fetch_page_decodes_declared_charset() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/latin1");
                then.status(200)
                    .header("content-type", "text/html; charset=iso-8859-1")
                    .body(b"<html><body><p>caf\xe9 na\xefve</p></body></html>".to_vec());
            })
            .await;

        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
        let page = fetcher.fetch_page(&server.url("/latin1")).await.unwrap();

        assert!(page.text.contains("<p>caf\u{e9} na\u{ef}ve</p>"));
    }

    #[tokio::test]
    async fn test_fetch_page_rejects_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;

        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
        let result = fetcher.fetch_page(&server.url("/missing")).await;

        assert!(matches!(result, Err(FolioError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_fetch_image_skips_non_200() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/partial.png");
                then.status(204);
            })
            .await;

        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
        let url = Url::parse(&server.url("/partial.png")).unwrap();
        let result = fetcher.fetch_image(&url).await.unwrap();

        assert!(result.is_none());
    }
}
