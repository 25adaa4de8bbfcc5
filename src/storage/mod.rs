//! Storage module for crawler state
//!
//! Everything the crawler persists is a small site-scoped file beside the
//! sitemap snapshot:
//! - `crawlermap[-<site>].data` — the line-delimited URL snapshot
//! - `<snapshot>.blacklist` — excluded URLs
//! - `<snapshot>.meta` — the JSON cursor record
//! - `<snapshot>.lock` — the advisory single-writer lock
//!
//! All writes are atomic (temp file + rename).

mod blacklist;
mod files;
mod lock;
mod meta;
mod sitemap_file;

pub use blacklist::BlacklistFile;
pub use files::{count_lines, read_or_empty, sanitize_lines, save_atomic};
pub use lock::CrawlLock;
pub use meta::MetaStore;
pub use sitemap_file::SitemapFile;
