//! Stoker: a site cache pre-warming crawler
//!
//! This crate walks a site's own URL set under a set of simulated client
//! identities (roles, WebP, mobile, cookie variants) so that variant-specific
//! cache entries are warm before real visitors arrive. Progress is durable:
//! each invocation runs one bounded-duration pass and persists its cursor.

pub mod config;
pub mod crawler;
pub mod output;
pub mod site;
pub mod sitemap;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for stoker operations
#[derive(Debug, Error)]
pub enum StokerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch sitemap {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("Sitemap {url} returned HTTP {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("Failed to parse sitemap {url}: {message}")]
    SitemapParse { url: String, message: String },

    #[error("Crawling is not permitted by the server")]
    PermissionDenied,

    #[error("Another crawl is already running (lock held at {path})")]
    Locked { path: String },

    #[error("Meta file error: {0}")]
    Meta(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

impl StokerError {
    /// Returns true for outcomes the scheduling layer reports as a status
    /// line rather than a failure (a refused or already-running crawl is an
    /// ordinary no-op, not an error).
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::Locked { .. })
    }
}

/// Result type alias for stoker operations
pub type Result<T> = std::result::Result<T, StokerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlerProfile, Driver, Engine};
pub use state::{CrawlMeta, PassReport, StopReason};
