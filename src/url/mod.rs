//! URL handling module for stoker
//!
//! The crawler stores and iterates site-root-relative paths: a sitemap
//! snapshot line is everything after the home URL, query string included.
//! This module converts between absolute URLs and that relative shape.

use std::collections::HashSet;

/// Converts an absolute URL to a site-root-relative path
///
/// The prefix comparison against the home URL is case-insensitive (hosts
/// are case-insensitive and real-world sitemaps mix cases); the remainder
/// is preserved verbatim, so paths and query strings stay case- and
/// query-sensitive.
///
/// Returns `None` for URLs outside the site.
///
/// # Examples
///
/// ```
/// use stoker::url::to_site_relative;
///
/// let rel = to_site_relative("https://Example.com/Shop?page=2", "https://example.com");
/// assert_eq!(rel.as_deref(), Some("/Shop?page=2"));
///
/// assert!(to_site_relative("https://other.com/x", "https://example.com").is_none());
/// ```
pub fn to_site_relative(url: &str, home_url: &str) -> Option<String> {
    let home = home_url.trim_end_matches('/');
    if url.len() < home.len() {
        return None;
    }

    let (prefix, rest) = url.split_at(home.len());
    if !prefix.eq_ignore_ascii_case(home) {
        return None;
    }

    // Reject prefix matches that land mid-segment (e.g. home "https://example.com"
    // against "https://example.community").
    if !rest.is_empty() && !rest.starts_with('/') && !rest.starts_with('?') {
        return None;
    }

    if rest.is_empty() {
        Some("/".to_string())
    } else if rest.starts_with('?') {
        Some(format!("/{}", rest))
    } else {
        Some(rest.to_string())
    }
}

/// Joins a site-root-relative path back onto the home URL for probing
pub fn absolutize(rel: &str, home_url: &str) -> String {
    let home = home_url.trim_end_matches('/');
    if rel.starts_with('/') {
        format!("{}{}", home, rel)
    } else {
        format!("{}/{}", home, rel)
    }
}

/// Deduplicates a URL list, preserving first-seen order
pub fn dedup_first_seen(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}
