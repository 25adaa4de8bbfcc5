//! Configuration module for stoker
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files.
//!
//! # Example
//!
//! ```no_run
//! use stoker::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Warming {}", config.site.home_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CookieEntry, CrawlerConfig, OutputConfig, RoleEntry, SiteConfig};

// Re-export parser functions
pub use parser::load_config;
