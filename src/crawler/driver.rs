//! Crawl driver: orchestrates passes across invocations
//!
//! The driver owns the decision-making around one engine pass: whether
//! crawling is permitted at all, whether the snapshot must be (re)generated,
//! which profile is current, and what happens to the pass's results. It is
//! constructed with explicit collaborator references, so cron, admin, and
//! CLI layers all drive it the same way.

use crate::config::Config;
use crate::crawler::engine::{Engine, EngineParams};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::profiles::{build_factors, list_profiles, CrawlerProfile};
use crate::output::StatusReport;
use crate::site::{
    resolve_load_limit, resolve_run_delay, ConfigUserDirectory, SeedListProvider, ServerProbe,
    SystemProbe, UrlProvider, UserDirectory,
};
use crate::sitemap::UrlSource;
use crate::storage::{BlacklistFile, CrawlLock, MetaStore, SitemapFile};
use crate::{Result, StokerError};
use chrono::Utc;
use std::time::Duration;

/// Orchestrates sitemap generation and bounded crawl passes
pub struct Driver {
    config: Config,
    sitemap: SitemapFile,
    blacklist: BlacklistFile,
    meta: MetaStore,
    server: Box<dyn ServerProbe + Send + Sync>,
    users: Box<dyn UserDirectory + Send + Sync>,
    provider: Box<dyn UrlProvider + Send + Sync>,
}

impl Driver {
    /// Creates a driver with the default collaborators
    pub fn new(config: Config) -> Self {
        let server = Box::new(SystemProbe);
        let users = Box::new(ConfigUserDirectory::new(config.crawler.roles.clone()));
        let provider = Box::new(SeedListProvider::from_config(&config.site));
        Self::with_collaborators(config, server, users, provider)
    }

    /// Creates a driver with explicit collaborator implementations
    pub fn with_collaborators(
        config: Config,
        server: Box<dyn ServerProbe + Send + Sync>,
        users: Box<dyn UserDirectory + Send + Sync>,
        provider: Box<dyn UrlProvider + Send + Sync>,
    ) -> Self {
        let sitemap_path = config.sitemap_path();
        let sitemap = SitemapFile::new(sitemap_path.clone());
        let blacklist = BlacklistFile::for_sitemap(&sitemap_path);
        let meta = MetaStore::for_sitemap(&sitemap_path);

        Self {
            config,
            sitemap,
            blacklist,
            meta,
            server,
            users,
            provider,
        }
    }

    /// Runs one crawl invocation
    ///
    /// Refuses when the server-level crawl flag is off. When the previous
    /// cycle finished recently and `force` is false, the invocation is a
    /// debounced no-op. Otherwise exactly one bounded engine pass runs for
    /// the current profile, its blacklist candidates are merged, and the
    /// profile index advances if the pass reached end-of-snapshot.
    ///
    /// Returns a human-readable summary on ordinary termination; errors are
    /// reserved for refused permission, a held lock, and unrecoverable I/O.
    pub async fn crawl(&self, force: bool) -> Result<String> {
        if !self.server.can_crawl() {
            tracing::debug!("Crawling is not permitted by the server admin");
            return Err(StokerError::PermissionDenied);
        }
        if force {
            tracing::debug!("Crawler manually forced");
        }

        let _lock = CrawlLock::acquire(CrawlLock::path_for(self.sitemap.path()), self.lock_grace())?;

        // First run ever: the snapshot must exist before the engine starts.
        if !self.sitemap.exists() {
            self.generate_snapshot(true).await?;
        }

        let mut meta = self.meta.read()?;

        // A finished cycle regenerates the snapshot, unless the cache is
        // still warm and this run was not forced.
        if let Some(done_at) = meta.done_at {
            let interval = chrono::Duration::seconds(self.config.crawler.crawl_interval as i64);
            if !force && Utc::now() - done_at < interval {
                tracing::debug!("Crawl abort: cache warmed already");
                return Ok("Cache is still warm; the next cycle is not due yet.".to_string());
            }
            tracing::debug!("Reached end last cycle, regenerating sitemap");
            self.generate_snapshot(true).await?;
            meta = self.meta.read()?;
        }

        // Never resume a cursor into a snapshot it was not taken against.
        let hash = self.sitemap.content_hash()?;
        if meta.is_stale_for(self.sitemap.count(), hash.as_deref()) {
            tracing::warn!("Cursor does not match the current snapshot, resetting position");
            meta.rebind(self.sitemap.count(), hash);
            self.meta.write(&meta)?;
        }

        let profiles = self.list_crawlers();
        let mut current = meta.curr_crawler;
        if current >= profiles.len() {
            current = 0;
            meta.curr_crawler = 0;
            self.meta.write(&meta)?;
        }
        let profile = &profiles[current];
        tracing::info!("Crawling as crawler #{} ({})", current + 1, profile.title);

        let report = self.run_engine_pass(profile).await?;

        if !report.blacklist.is_empty() {
            tracing::info!("Appending {} URL(s) to the blacklist", report.blacklist.len());
            self.blacklist.append(&report.blacklist)?;
        }
        if report.crawled > 0 {
            tracing::debug!("Last crawled {} item(s)", report.crawled);
        }

        if report.hit_end() {
            let mut meta = self.meta.read()?;
            meta.curr_crawler += 1;
            self.meta.write(&meta)?;
            Ok(format!(
                "Crawler #{} reached the end of the sitemap file.",
                current + 1
            ))
        } else {
            Ok(format!(
                "Crawler #{} paused at {}/{}: {}.",
                current + 1,
                report.end_pos,
                self.sitemap.count(),
                report.reason
            ))
        }
    }

    async fn run_engine_pass(&self, profile: &CrawlerProfile) -> Result<crate::state::PassReport> {
        let crawler = &self.config.crawler;

        let run_delay = resolve_run_delay(crawler.run_delay);
        let load_limit = resolve_load_limit(crawler.load_limit);

        let client = build_http_client(&self.config.site, crawler, profile)?;
        let engine = Engine::new(
            client,
            EngineParams {
                run_duration: Duration::from_secs(crawler.run_duration),
                run_delay: Duration::from_micros(run_delay),
                threads: crawler.threads as usize,
                load_limit,
            },
            self.config.site.home_url.clone(),
        );

        engine
            .run_pass(&self.sitemap, &self.meta, self.server.as_ref())
            .await
    }

    /// Generates the sitemap snapshot standalone (admin action)
    ///
    /// Unlike the scheduler path, a failing custom sitemap is reported to
    /// the caller instead of silently falling back.
    pub async fn generate_sitemap(&self) -> Result<usize> {
        let _lock = CrawlLock::acquire(CrawlLock::path_for(self.sitemap.path()), self.lock_grace())?;
        self.generate_snapshot(false).await
    }

    /// Produces, filters, and persists a fresh snapshot; rebinds the cursor
    async fn generate_snapshot(&self, fallback_on_custom_failure: bool) -> Result<usize> {
        let source = UrlSource::new(&self.config.site.home_url)?;
        let custom = self.config.site.custom_sitemap.as_deref();

        let urls = match source.produce_urls(custom, self.provider.as_ref()).await {
            Ok(urls) => urls,
            Err(e) if fallback_on_custom_failure && custom.is_some() && is_source_error(&e) => {
                tracing::warn!(
                    "Custom sitemap failed ({}), falling back to the internal generator",
                    e
                );
                source.produce_urls(None, self.provider.as_ref()).await?
            }
            Err(e) => return Err(e),
        };

        // A snapshot never contains a blacklisted URL.
        let excluded = self.blacklist.to_set()?;
        let urls: Vec<String> = urls.into_iter().filter(|u| !excluded.contains(u)).collect();

        self.sitemap.write_snapshot(&urls)?;

        let mut meta = self.meta.read()?;
        meta.rebind(urls.len(), self.sitemap.content_hash()?);
        self.meta.write(&meta)?;

        tracing::info!("Generated sitemap with {} URL(s)", urls.len());
        Ok(urls.len())
    }

    /// Resets the crawl position to the start of the snapshot
    pub fn reset_pos(&self) -> Result<()> {
        let _lock = CrawlLock::acquire(CrawlLock::path_for(self.sitemap.path()), self.lock_grace())?;
        self.meta.reset_position()?;
        tracing::debug!("Crawl position reset");
        Ok(())
    }

    /// Enumerates the crawler profiles for the current configuration
    pub fn list_crawlers(&self) -> Vec<CrawlerProfile> {
        list_profiles(&build_factors(&self.config.crawler, self.users.as_ref()))
    }

    /// Replaces the blacklist with operator-supplied text
    pub fn save_blacklist(&self, raw: &str) -> Result<usize> {
        let _lock = CrawlLock::acquire(CrawlLock::path_for(self.sitemap.path()), self.lock_grace())?;
        self.blacklist.save(raw)
    }

    /// Merges URLs into the blacklist
    pub fn append_blacklist(&self, urls: &[String]) -> Result<usize> {
        let _lock = CrawlLock::acquire(CrawlLock::path_for(self.sitemap.path()), self.lock_grace())?;
        self.blacklist.append(urls)
    }

    pub fn get_blacklist(&self) -> Result<String> {
        self.blacklist.read()
    }

    pub fn count_blacklist(&self) -> usize {
        self.blacklist.count()
    }

    /// Read-only progress surface for status display
    pub fn status(&self) -> Result<StatusReport> {
        Ok(StatusReport {
            sitemap_path: self.sitemap.path().display().to_string(),
            sitemap_exists: self.sitemap.exists(),
            sitemap_urls: self.sitemap.count(),
            sitemap_modified: self.sitemap.modified_at(),
            meta: self.meta.read()?,
            meta_url: self.meta.meta_url(&self.config.site.home_url),
            blacklist_count: self.blacklist.count(),
            profile_count: self.list_crawlers().len(),
        })
    }

    /// A crashed invocation's lock outliving twice the pass budget is stale
    fn lock_grace(&self) -> Duration {
        Duration::from_secs(self.config.crawler.run_duration.saturating_mul(2).max(60))
    }
}

fn is_source_error(e: &StokerError) -> bool {
    matches!(
        e,
        StokerError::Fetch { .. } | StokerError::FetchStatus { .. } | StokerError::SitemapParse { .. }
    )
}
