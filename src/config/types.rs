use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for stoker
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Identity of the site being warmed
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Home URL of the site; sitemap entries outside this prefix are dropped
    #[serde(rename = "home-url")]
    pub home_url: String,

    /// Sub-site id on multisite installs; scopes the state file names
    #[serde(rename = "site-id")]
    pub site_id: Option<u64>,

    /// External sitemap (or sitemap index) to source URLs from
    #[serde(rename = "custom-sitemap")]
    pub custom_sitemap: Option<String>,

    /// Resolve the home host to this IP instead of DNS when probing
    #[serde(rename = "server-ip")]
    pub server_ip: Option<String>,

    /// Cookie carrying the simulated role uid
    #[serde(rename = "role-cookie", default = "default_role_cookie")]
    pub role_cookie: String,

    /// Fallback paths when no custom sitemap is configured
    #[serde(rename = "seed-paths", default = "default_seed_paths")]
    pub seed_paths: Vec<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Minimum seconds between whole crawl cycles (cache-warmth debounce)
    #[serde(rename = "crawl-interval", default = "default_crawl_interval")]
    pub crawl_interval: u64,

    /// Wall-clock seconds one pass may run before pausing
    #[serde(rename = "run-duration", default = "default_run_duration")]
    pub run_duration: u64,

    /// Microseconds slept between probe batches
    #[serde(rename = "run-delay", default = "default_run_delay")]
    pub run_delay: u64,

    /// Concurrent probes per batch
    #[serde(default = "default_threads")]
    pub threads: u32,

    /// Per-probe timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Server load ceiling; 0 disables the check
    #[serde(rename = "load-limit", default = "default_load_limit")]
    pub load_limit: f64,

    /// Also warm WebP variants
    #[serde(default)]
    pub webp: bool,

    /// Also warm mobile variants
    #[serde(default)]
    pub mobile: bool,

    /// Users whose roles are simulated, in enumeration order
    #[serde(default)]
    pub roles: Vec<RoleEntry>,

    /// Cookie factors; each multiplies the profile list by its value count
    #[serde(default)]
    pub cookies: Vec<CookieEntry>,
}

/// A user whose role variant should be warmed
#[derive(Debug, Clone, Deserialize)]
pub struct RoleEntry {
    pub uid: u64,

    /// Display title; enumeration falls back to the user directory when empty
    #[serde(default)]
    pub title: String,
}

/// A cookie factor with its candidate values
#[derive(Debug, Clone, Deserialize)]
pub struct CookieEntry {
    pub name: String,
    pub values: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding the sitemap snapshot, blacklist, and meta files
    #[serde(rename = "data-dir")]
    pub data_dir: String,
}

impl Config {
    /// Path of the sitemap snapshot file, scoped per sub-site on multisite
    pub fn sitemap_path(&self) -> PathBuf {
        let name = match self.site.site_id {
            Some(id) => format!("crawlermap-{}.data", id),
            None => "crawlermap.data".to_string(),
        };
        PathBuf::from(&self.output.data_dir).join(name)
    }
}

fn default_role_cookie() -> String {
    "stoker_role".to_string()
}

fn default_seed_paths() -> Vec<String> {
    vec!["/".to_string()]
}

fn default_crawl_interval() -> u64 {
    302400
}

fn default_run_duration() -> u64 {
    400
}

fn default_run_delay() -> u64 {
    500
}

fn default_threads() -> u32 {
    3
}

fn default_timeout() -> u64 {
    30
}

fn default_load_limit() -> f64 {
    1.0
}
