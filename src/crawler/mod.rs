//! Crawler module: pre-warming passes over the sitemap snapshot
//!
//! This module contains the core crawl logic:
//! - Profile enumeration (the simulated client identities)
//! - HTTP client building and probe classification
//! - The bounded-duration engine pass
//! - The driver that orchestrates passes across invocations

mod driver;
mod engine;
mod fetcher;
mod profiles;

pub use driver::Driver;
pub use engine::{Engine, EngineParams};
pub use fetcher::{build_http_client, probe, ProbeOutcome};
pub use profiles::{build_factors, list_profiles, CrawlerProfile, Factor, FactorValue};
