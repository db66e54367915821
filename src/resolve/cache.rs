//! Content-addressed cache for fetched BibTeX records.
//!
//! Cache files live under one directory and are named by the SHA-256 of
//! the lowercased DOI, so repeated invocations with the same identifier
//! reuse the cached text and skip the network.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// A cache entry read back from disk.
#[derive(Debug, Clone)]
pub struct CachedBibtex {
    /// Where the entry lives
    pub path: PathBuf,
    /// The raw BibTeX text
    pub text: String,
}

/// File-based BibTeX cache keyed by normalized DOI.
#[derive(Debug, Clone)]
pub struct BibtexCache {
    dir: PathBuf,
}

impl BibtexCache {
    /// Creates a cache rooted at `dir`. The directory is created lazily on
    /// the first store.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache file path for a DOI.
    #[must_use]
    pub fn path_for(&self, doi: &str) -> PathBuf {
        self.dir.join(format!("{}.bib", cache_key(doi)))
    }

    /// Loads the cached entry for a DOI, if present and readable.
    ///
    /// Unreadable entries log a warning and return `None` so the caller
    /// falls through to the network.
    #[must_use]
    pub fn load(&self, doi: &str) -> Option<CachedBibtex> {
        let path = self.path_for(doi);
        if !path.is_file() {
            return None;
        }
        match fs::read_to_string(&path) {
            Ok(text) if !text.trim().is_empty() => {
                debug!(doi = %doi, path = %path.display(), "BibTeX cache hit");
                Some(CachedBibtex { path, text })
            }
            Ok(_) => {
                warn!(path = %path.display(), "empty BibTeX cache entry; refetching");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable BibTeX cache entry; refetching");
                None
            }
        }
    }

    /// Persists a fetched entry, exactly once per distinct DOI.
    ///
    /// An existing cache file is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the directory or file cannot be written.
    pub fn store(&self, doi: &str, text: &str) -> std::io::Result<PathBuf> {
        let path = self.path_for(doi);
        if path.exists() {
            return Ok(path);
        }
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, text)?;
        debug!(doi = %doi, path = %path.display(), "BibTeX cached");
        Ok(path)
    }

    /// The cache root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Normalizes a DOI (lowercase, trimmed) and hashes it into a file key.
fn cache_key(doi: &str) -> String {
    let normalized = doi.trim().to_ascii_lowercase();
    format!("{:x}", Sha256::digest(normalized.as_bytes()))
}
