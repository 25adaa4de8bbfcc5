//! Sitemap snapshot file
//!
//! The snapshot is the stable unit of iteration across crawl passes: the
//! live URL set may change between runs, so passes walk this file, and the
//! file is only ever regenerated wholesale.

use crate::storage::files::{read_or_empty, save_atomic};
use crate::Result;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// The persisted, line-delimited URL snapshot
pub struct SitemapFile {
    path: PathBuf,
}

impl SitemapFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Replaces the snapshot wholesale
    pub fn write_snapshot(&self, urls: &[String]) -> Result<()> {
        let content = urls.join("\n");
        save_atomic(&self.path, &content)?;
        Ok(())
    }

    /// Loads the snapshot's URLs in file order
    pub fn load_urls(&self) -> Result<Vec<String>> {
        let content = read_or_empty(&self.path)?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn count(&self) -> usize {
        crate::storage::files::count_lines(&self.path)
    }

    /// SHA-256 of the snapshot content; `None` when the file is absent
    ///
    /// The meta file records this hash so a cursor is never resumed into a
    /// snapshot it was not taken against.
    pub fn content_hash(&self) -> Result<Option<String>> {
        if !self.exists() {
            return Ok(None);
        }
        let content = read_or_empty(&self.path)?;
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        Ok(Some(hex::encode(hasher.finalize())))
    }

    /// Last modification time, for the status surface
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        let modified = std::fs::metadata(&self.path).ok()?.modified().ok()?;
        Some(DateTime::<Utc>::from(modified))
    }
}
