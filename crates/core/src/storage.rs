//! Flat on-disk directory of rendered documents.
//!
//! The directory itself is the only state: there is no manifest or sidecar.
//! A [`Storage`] value is created by the application and handed to every
//! component that reads or writes documents.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{FolioError, Result};

/// Default storage directory, relative to the working directory.
pub const DEFAULT_STORAGE_DIR: &str = "generated_pdfs";

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Opens a storage root, creating the directory if it is absent.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened storage");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `name` into the root, replacing any existing file.
    pub fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.resolve(name)?;
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Maps a document name to its path inside the root.
    ///
    /// Only the final component of `name` is used, so `../x.pdf` and
    /// `https://host/download/x.pdf` both resolve to `x.pdf`.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        basename(name)
            .map(|file| self.root.join(file))
            .ok_or_else(|| FolioError::FileNotFound(self.root.join(name)))
    }

    /// Reads a stored document.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(name)?;
        if !path.is_file() {
            return Err(FolioError::FileNotFound(path));
        }
        Ok(fs::read(&path)?)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.resolve(name).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Names of all stored files, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Final path component of a name or URL, ignoring query strings and fragments.
pub fn basename(name: &str) -> Option<&str> {
    let name = name.split(['?', '#']).next().unwrap_or(name);
    name.rsplit(['/', '\\']).next().filter(|s| !s.is_empty() && *s != "." && *s != "..")
}
