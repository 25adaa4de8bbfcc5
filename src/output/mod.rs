//! Status rendering for the CLI
//!
//! Plain-text summaries of the crawler's durable state: snapshot file,
//! cursor position, blacklist size, and the enumerated profile list.

use crate::crawler::CrawlerProfile;
use crate::state::CrawlMeta;
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Read-only snapshot of the crawler's persisted state
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub sitemap_path: String,
    pub sitemap_exists: bool,
    pub sitemap_urls: usize,
    pub sitemap_modified: Option<DateTime<Utc>>,
    pub meta: CrawlMeta,
    pub meta_url: Option<String>,
    pub blacklist_count: usize,
    pub profile_count: usize,
}

/// Renders the status report as display text
pub fn render_status(report: &StatusReport) -> String {
    let mut out = String::new();

    writeln!(out, "Sitemap: {}", report.sitemap_path).ok();
    if report.sitemap_exists {
        writeln!(out, "  URLs: {}", report.sitemap_urls).ok();
        if let Some(modified) = report.sitemap_modified {
            writeln!(
                out,
                "  Generated: {}",
                modified.format("%Y-%m-%d %H:%M:%S UTC")
            )
            .ok();
        }
    } else {
        writeln!(out, "  (not generated yet)").ok();
    }

    writeln!(
        out,
        "Position: {}/{} (crawler #{} of {})",
        report.meta.last_pos,
        report.meta.list_size,
        report.meta.curr_crawler + 1,
        report.profile_count
    )
    .ok();

    match report.meta.done_at {
        Some(done_at) => {
            writeln!(
                out,
                "Last cycle finished: {}",
                done_at.format("%Y-%m-%d %H:%M:%S UTC")
            )
            .ok();
        }
        None => {
            writeln!(out, "Last cycle finished: (in progress)").ok();
        }
    }

    if let Some(status) = &report.meta.last_status {
        writeln!(out, "Last pass: {}", status).ok();
    }
    if let Some(url) = &report.meta_url {
        writeln!(out, "Meta: {}", url).ok();
    }

    writeln!(out, "Blacklist: {} URL(s)", report.blacklist_count).ok();

    out
}

/// Renders the enumerated profile list as a numbered table
pub fn render_profiles(profiles: &[CrawlerProfile]) -> String {
    let mut out = String::new();
    writeln!(out, "{} crawler profile(s):", profiles.len()).ok();
    for (index, profile) in profiles.iter().enumerate() {
        writeln!(out, "  #{:<3} {}", index + 1, profile.title).ok();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> StatusReport {
        StatusReport {
            sitemap_path: "/var/stoker/crawlermap.data".to_string(),
            sitemap_exists: true,
            sitemap_urls: 42,
            sitemap_modified: None,
            meta: CrawlMeta {
                list_size: 42,
                last_pos: 7,
                curr_crawler: 1,
                ..Default::default()
            },
            meta_url: Some("https://example.com/crawlermap.data.meta".to_string()),
            blacklist_count: 3,
            profile_count: 4,
        }
    }

    #[test]
    fn test_render_status_mentions_position_and_blacklist() {
        let text = render_status(&report());
        assert!(text.contains("Position: 7/42 (crawler #2 of 4)"));
        assert!(text.contains("Blacklist: 3 URL(s)"));
        assert!(text.contains("crawlermap.data.meta"));
    }

    #[test]
    fn test_render_status_for_missing_sitemap() {
        let mut r = report();
        r.sitemap_exists = false;
        let text = render_status(&r);
        assert!(text.contains("(not generated yet)"));
    }
}
