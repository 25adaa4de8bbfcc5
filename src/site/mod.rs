//! Site collaborator seams
//!
//! The crawler core depends on three narrow interfaces owned by the
//! surrounding site: an internal URL generator, a user directory for role
//! lookups, and a server oracle for load and crawl permission. Each trait
//! ships with the implementation the CLI uses; tests substitute their own.

use crate::config::{RoleEntry, SiteConfig};
use crate::Result;

/// Environment variable that, when set, forbids crawling entirely
pub const ENV_CRAWLER_DISABLED: &str = "CRAWLER_DISABLED";

/// Environment variable raising the inter-batch delay (microseconds)
pub const ENV_CRAWLER_USLEEP: &str = "CRAWLER_USLEEP";

/// Environment variable lowering the server load ceiling
pub const ENV_CRAWLER_LOAD_LIMIT: &str = "CRAWLER_LOAD_LIMIT";

/// Environment variable replacing the load ceiling unconditionally
pub const ENV_CRAWLER_LOAD_LIMIT_ENFORCE: &str = "CRAWLER_LOAD_LIMIT_ENFORCE";

/// Internal sitemap generator: enumerates the site's own URLs
///
/// Implementations return site-root-relative paths in crawl order.
pub trait UrlProvider {
    fn produce_urls(&self) -> Result<Vec<String>>;
}

/// Resolves user ids to role titles for profile enumeration
pub trait UserDirectory {
    /// Returns the display title of the user's role, or `None` when the
    /// user or role cannot be resolved (such users are skipped silently).
    fn role_title(&self, uid: u64) -> Option<String>;
}

/// Server oracle: current load and the server-level crawl permission flag
pub trait ServerProbe {
    fn can_crawl(&self) -> bool;

    /// Current load average; `None` disables load checks for the pass
    fn load(&self) -> Option<f64>;
}

/// URL provider backed by the configured seed path list
pub struct SeedListProvider {
    paths: Vec<String>,
}

impl SeedListProvider {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }

    pub fn from_config(site: &SiteConfig) -> Self {
        Self::new(site.seed_paths.clone())
    }
}

impl UrlProvider for SeedListProvider {
    fn produce_urls(&self) -> Result<Vec<String>> {
        Ok(self
            .paths
            .iter()
            .map(|p| {
                if p.starts_with('/') {
                    p.clone()
                } else {
                    format!("/{}", p)
                }
            })
            .collect())
    }
}

/// User directory backed by the configured role entries
pub struct ConfigUserDirectory {
    roles: Vec<RoleEntry>,
}

impl ConfigUserDirectory {
    pub fn new(roles: Vec<RoleEntry>) -> Self {
        Self { roles }
    }
}

impl UserDirectory for ConfigUserDirectory {
    fn role_title(&self, uid: u64) -> Option<String> {
        self.roles
            .iter()
            .find(|r| r.uid == uid && !r.title.is_empty())
            .map(|r| {
                let mut chars = r.title.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
    }
}

/// Server oracle reading the process environment and `/proc/loadavg`
pub struct SystemProbe;

impl ServerProbe for SystemProbe {
    fn can_crawl(&self) -> bool {
        std::env::var_os(ENV_CRAWLER_DISABLED).is_none()
    }

    fn load(&self) -> Option<f64> {
        let content = std::fs::read_to_string("/proc/loadavg").ok()?;
        content.split_whitespace().next()?.parse().ok()
    }
}

/// Applies the server's usleep override: the delay can only be raised
pub fn apply_usleep_override(configured: u64, server: Option<u64>) -> u64 {
    match server {
        Some(v) if v > configured => v,
        _ => configured,
    }
}

/// Applies the server's load-limit overrides
///
/// The enforce variant replaces the configured ceiling unconditionally;
/// the plain variant can only lower it.
pub fn apply_load_limit_override(
    configured: f64,
    server: Option<f64>,
    enforce: Option<f64>,
) -> f64 {
    if let Some(v) = enforce {
        return v;
    }
    match server {
        Some(v) if v < configured => v,
        _ => configured,
    }
}

/// Resolves the effective inter-batch delay from config and environment
pub fn resolve_run_delay(configured: u64) -> u64 {
    let server = std::env::var(ENV_CRAWLER_USLEEP)
        .ok()
        .and_then(|v| v.parse().ok());
    apply_usleep_override(configured, server)
}

/// Resolves the effective load ceiling from config and environment
pub fn resolve_load_limit(configured: f64) -> f64 {
    let server = std::env::var(ENV_CRAWLER_LOAD_LIMIT)
        .ok()
        .and_then(|v| v.parse().ok());
    let enforce = std::env::var(ENV_CRAWLER_LOAD_LIMIT_ENFORCE)
        .ok()
        .and_then(|v| v.parse().ok());
    apply_load_limit_override(configured, server, enforce)
}
