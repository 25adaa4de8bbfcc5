//! Durable crawl position
//!
//! The meta record is the crawler's cursor state across process
//! invocations: how far into the snapshot the current profile has walked,
//! which profile is current, and when the last full pass finished. It is
//! encoded as JSON on disk so external tools can inspect progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable cursor state for the current sitemap snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlMeta {
    /// Line count of the snapshot this cursor belongs to
    pub list_size: usize,

    /// Next line index to probe; equals `list_size` after a finished pass
    pub last_pos: usize,

    /// Index into the enumerated profile list
    pub curr_crawler: usize,

    /// SHA-256 of the snapshot this cursor was taken against
    pub map_hash: Option<String>,

    /// When the last pass started
    pub last_start_at: Option<DateTime<Utc>>,

    /// When the cursor last reached end-of-snapshot; cleared on regeneration
    pub done_at: Option<DateTime<Utc>>,

    /// Human-readable outcome of the last pass
    pub last_status: Option<String>,
}

impl CrawlMeta {
    /// True once the current profile's pass has reached end-of-snapshot
    pub fn is_done(&self) -> bool {
        self.done_at.is_some()
    }

    /// Rebinds the meta to a freshly generated snapshot
    ///
    /// The cursor returns to the start and the finished marker is cleared;
    /// the profile index survives regeneration.
    pub fn rebind(&mut self, list_size: usize, map_hash: Option<String>) {
        self.list_size = list_size;
        self.last_pos = 0;
        self.map_hash = map_hash;
        self.done_at = None;
    }

    /// True when the cursor does not belong to the given snapshot state
    pub fn is_stale_for(&self, list_size: usize, map_hash: Option<&str>) -> bool {
        self.list_size != list_size || self.map_hash.as_deref() != map_hash
    }
}
