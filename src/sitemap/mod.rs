//! Sitemap module: URL discovery for snapshot generation
//!
//! A snapshot is sourced either from an external sitemap (fetched and
//! recursively expanded) or from the site's internal URL provider.

mod parser;
mod source;

pub use parser::{parse_sitemap_xml, SitemapDoc, SitemapXmlError};
pub use source::{UrlSource, MAX_INDEX_DEPTH, MAX_SITEMAP_FETCHES};
