//! Crawl state types
//!
//! Defines the durable cursor record and the per-pass report.

mod position;
mod report;

pub use position::CrawlMeta;
pub use report::{PassReport, StopReason};
