//! Blacklist file
//!
//! A persisted set of excluded relative URLs, stored beside the sitemap
//! snapshot as `<snapshot>.blacklist`. URLs that fail during crawling
//! accumulate here and are filtered out of every future snapshot. The file
//! is append-only during crawling and fully replaceable by an operator.

use crate::storage::files::{count_lines, read_or_empty, sanitize_lines, save_atomic};
use crate::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The persisted URL blacklist
pub struct BlacklistFile {
    path: PathBuf,
}

impl BlacklistFile {
    /// Creates the blacklist handle for a sitemap snapshot path
    pub fn for_sitemap(sitemap_path: &Path) -> Self {
        let mut name = sitemap_path.as_os_str().to_os_string();
        name.push(".blacklist");
        Self {
            path: PathBuf::from(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw file content, for operator display/editing
    pub fn read(&self) -> Result<String> {
        Ok(read_or_empty(&self.path)?)
    }

    pub fn count(&self) -> usize {
        count_lines(&self.path)
    }

    /// Replaces the blacklist with operator-supplied text
    ///
    /// Lines are trimmed, empties dropped, duplicates removed. Returns the
    /// resulting entry count.
    pub fn save(&self, raw: &str) -> Result<usize> {
        let lines = sanitize_lines(raw);
        save_atomic(&self.path, &lines.join("\n"))?;
        Ok(lines.len())
    }

    /// Merges new candidate URLs into the blacklist
    ///
    /// Read-merge-dedupe-rewrite; idempotent. Callers hold the crawl lock
    /// around this, since the read and the rewrite are not one operation.
    pub fn append(&self, urls: &[String]) -> Result<usize> {
        if urls.is_empty() {
            return Ok(self.count());
        }

        let mut combined = read_or_empty(&self.path)?;
        combined.push('\n');
        combined.push_str(&urls.join("\n"));

        let lines = sanitize_lines(&combined);
        save_atomic(&self.path, &lines.join("\n"))?;
        tracing::debug!("Blacklist now holds {} URL(s)", lines.len());
        Ok(lines.len())
    }

    /// The blacklist as a set, for snapshot generation filtering
    pub fn to_set(&self) -> Result<HashSet<String>> {
        let content = read_or_empty(&self.path)?;
        Ok(sanitize_lines(&content).into_iter().collect())
    }
}
