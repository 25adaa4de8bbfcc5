//! Meta file store
//!
//! Persists [`CrawlMeta`] as JSON beside the snapshot (`<snapshot>.meta`),
//! rewritten atomically. The file doubles as the external progress surface:
//! when the data directory is web-exposed, `meta_url` is where outside
//! tools can watch the crawl advance.

use crate::state::CrawlMeta;
use crate::storage::files::{read_or_empty, save_atomic};
use crate::Result;
use std::path::{Path, PathBuf};

/// Reads and writes the durable cursor record
pub struct MetaStore {
    path: PathBuf,
}

impl MetaStore {
    /// Creates the meta store for a sitemap snapshot path
    pub fn for_sitemap(sitemap_path: &Path) -> Self {
        let mut name = sitemap_path.as_os_str().to_os_string();
        name.push(".meta");
        Self {
            path: PathBuf::from(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the meta record; a missing or empty file loads as default
    pub fn read(&self) -> Result<CrawlMeta> {
        let content = read_or_empty(&self.path)?;
        if content.trim().is_empty() {
            return Ok(CrawlMeta::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Persists the meta record atomically
    pub fn write(&self, meta: &CrawlMeta) -> Result<()> {
        let json = serde_json::to_string_pretty(meta)?;
        save_atomic(&self.path, &json)?;
        Ok(())
    }

    /// Resets the cursor to the start of the snapshot
    ///
    /// Clears the finished marker too; the profile index is kept.
    pub fn reset_position(&self) -> Result<()> {
        let mut meta = self.read()?;
        meta.last_pos = 0;
        meta.done_at = None;
        meta.last_status = Some("position reset".to_string());
        self.write(&meta)
    }

    /// Public URL of the meta file when the data directory is web-exposed
    ///
    /// Returns `None` until the file exists.
    pub fn meta_url(&self, home_url: &str) -> Option<String> {
        if !self.exists() {
            return None;
        }
        let name = self.path.file_name()?.to_str()?;
        Some(format!("{}/{}", home_url.trim_end_matches('/'), name))
    }
}
