//! URL to document conversion, one URL at a time.
//!
//! Each URL runs through extraction, normalization and rendering before the
//! next one starts. Every URL of a batch is attempted even when earlier ones
//! fail, and failures of either stage end up in the batch report.

use std::fmt;

use tracing::{info, warn};

use crate::blocks::{normalize, resolve_blocks};
use crate::extract::extract_article;
use crate::fetch::{FetchConfig, Fetcher};
use crate::render::{document_file_name, render_document};
use crate::sanitize::sanitize_filename;
use crate::storage::Storage;
use crate::{FolioError, Result};

/// Most URLs accepted per submission.
pub const MAX_URLS: usize = 5;

/// Pipeline stage at which a conversion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Extract => write!(f, "extract"),
            Stage::Render => write!(f, "render"),
        }
    }
}

/// Result of converting a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Converted { url: String, file_name: String },
    Failed { url: String, stage: Stage, message: String },
}

impl ConversionOutcome {
    /// Message shown to the submitter for a failed URL.
    pub fn user_message(&self) -> Option<String> {
        match self {
            ConversionOutcome::Converted { .. } => None,
            ConversionOutcome::Failed { url, stage: Stage::Extract, .. } => {
                Some(format!("Unable to convert URL: {}", url))
            }
            ConversionOutcome::Failed { url, stage: Stage::Render, .. } => {
                Some(format!("Unable to render URL: {}", url))
            }
        }
    }
}

/// Successes and failures of one batch, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub documents: Vec<String>,
    pub errors: Vec<String>,
    pub outcomes: Vec<ConversionOutcome>,
}

impl ConversionReport {
    fn record(&mut self, outcome: ConversionOutcome) {
        match &outcome {
            ConversionOutcome::Converted { file_name, .. } => self.documents.push(file_name.clone()),
            failed => self.errors.extend(failed.user_message()),
        }
        self.outcomes.push(outcome);
    }
}

/// Keep the first [`MAX_URLS`] entries and drop blank ones.
pub fn accepted_urls<S: AsRef<str>>(urls: &[S]) -> Vec<String> {
    urls.iter()
        .take(MAX_URLS)
        .map(|u| u.as_ref().trim())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect()
}

/// Runs the fetch, extract and render pipeline against one storage root.
#[derive(Debug, Clone)]
pub struct Converter {
    fetcher: Fetcher,
    storage: Storage,
    namespace: Option<String>,
}

impl Converter {
    pub fn new(fetch_config: FetchConfig, storage: Storage) -> Result<Self> {
        Ok(Self { fetcher: Fetcher::new(fetch_config)?, storage, namespace: None })
    }

    /// Prefix every produced file name with `namespace`.
    ///
    /// Without a namespace two URLs that sanitize to the same stem write the
    /// same file and the later one wins.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    fn stem_for(&self, url: &str) -> String {
        let stem = sanitize_filename(url);
        match &self.namespace {
            Some(ns) => format!("{}-{}", ns, stem),
            None => stem,
        }
    }

    /// Convert one URL into a stored document.
    pub async fn convert_url(&self, url: &str) -> ConversionOutcome {
        let extracted = match extract_article(url, &self.fetcher).await {
            Ok(extracted) => extracted,
            Err(e) => return failed(url, Stage::Extract, &e),
        };

        let nodes = match normalize(&extracted.html) {
            Ok(nodes) => nodes,
            Err(e) => return failed(url, Stage::Render, &e),
        };
        let blocks = resolve_blocks(nodes, &extracted.base_url, &self.fetcher).await;

        let stem = self.stem_for(url);
        let storage = self.storage.clone();
        let title = extracted.title.clone();
        let rendered = {
            let stem = stem.clone();
            tokio::task::spawn_blocking(move || render_document(&blocks, &storage, &stem, title.as_deref()))
                .await
                .map_err(|e| FolioError::Render(e.to_string()))
                .and_then(|r| r)
        };

        match rendered {
            Ok(_) => {
                let file_name = document_file_name(&stem);
                info!(url, file_name = %file_name, "converted");
                ConversionOutcome::Converted { url: url.to_string(), file_name }
            }
            Err(e) => failed(url, Stage::Render, &e),
        }
    }

    /// Convert up to [`MAX_URLS`] URLs sequentially.
    pub async fn convert_batch<S: AsRef<str>>(&self, urls: &[S]) -> ConversionReport {
        let mut report = ConversionReport::default();

        for url in accepted_urls(urls) {
            report.record(self.convert_url(&url).await);
        }

        report
    }
}

fn failed(url: &str, stage: Stage, err: &FolioError) -> ConversionOutcome {
    warn!(url, %stage, error = %err, "conversion failed");
    ConversionOutcome::Failed { url: url.to_string(), stage, message: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_urls() {
        let urls = ["https://a.example", "  ", "", "https://b.example", "https://c.example", "https://d.example"];
        assert_eq!(accepted_urls(&urls), vec!["https://a.example", "https://b.example", "https://c.example"]);
    }

    #[test]
    fn test_user_messages() {
        let extract = ConversionOutcome::Failed {
            url: "https://x.example".to_string(),
            stage: Stage::Extract,
            message: "boom".to_string(),
        };
        let render = ConversionOutcome::Failed {
            url: "https://y.example".to_string(),
            stage: Stage::Render,
            message: "boom".to_string(),
        };

        assert_eq!(extract.user_message().unwrap(), "Unable to convert URL: https://x.example");
        assert_eq!(render.user_message().unwrap(), "Unable to render URL: https://y.example");
    }

    #[test]
    fn test_report_keeps_submission_order() {
        let mut report = ConversionReport::default();
        report.record(ConversionOutcome::Converted { url: "u1".to_string(), file_name: "a.pdf".to_string() });
        report.record(ConversionOutcome::Failed {
            url: "u2".to_string(),
            stage: Stage::Extract,
            message: String::new(),
        });
        report.record(ConversionOutcome::Converted { url: "u3".to_string(), file_name: "b.pdf".to_string() });

        assert_eq!(report.documents, vec!["a.pdf", "b.pdf"]);
        assert_eq!(report.errors, vec!["Unable to convert URL: u2"]);
        assert_eq!(report.outcomes.len(), 3);
    }
}
