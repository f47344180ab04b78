//! In-memory ZIP packaging of stored documents.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::storage::{Storage, basename};
use crate::{FolioError, Result};

/// Download name of the bundled archive.
pub const ARCHIVE_NAME: &str = "downloaded_pdfs.zip";

/// Media type of the bundled archive.
pub const ARCHIVE_MEDIA_TYPE: &str = "application/zip";

/// Body of an archive request: document links or names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveRequest {
    pub pdf_urls: Vec<String>,
}

/// Package the referenced documents into a ZIP held in memory.
///
/// Each reference is reduced to its basename and looked up in `storage`;
/// entries are stored uncompressed under that basename. A reference whose
/// basename is already in the archive is skipped. A single missing document
/// fails the whole archive.
pub fn build_archive<S: AsRef<str>>(storage: &Storage, references: &[S]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut added = HashSet::new();

    for reference in references {
        let reference = reference.as_ref();
        let name = basename(reference).ok_or_else(|| FolioError::FileNotFound(storage.root().join(reference)))?;
        if !added.insert(name) {
            debug!(name, "skipping duplicate archive entry");
            continue;
        }
        let bytes = storage.read(name)?;

        zip.start_file(name, options)?;
        zip.write_all(&bytes)?;
    }

    let bytes = zip.finish()?.into_inner();
    info!(entries = added.len(), bytes = bytes.len(), "built archive");
    Ok(bytes)
}
