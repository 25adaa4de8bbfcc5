//! Crawl engine: the bounded pass
//!
//! One pass walks the sitemap snapshot from the persisted cursor in batches
//! of concurrent probes, stopping at the first of: time budget spent, server
//! load ceiling reached, or end of snapshot. The cursor is persisted on
//! every exit path, so a paused pass resumes exactly where it stopped; the
//! engine never regenerates the snapshot.
//!
//! There is no background thread: the engine is a re-entrant step function
//! driven identically by cron ticks, admin actions, or the CLI.

use crate::crawler::fetcher::{probe, ProbeOutcome};
use crate::site::ServerProbe;
use crate::state::{PassReport, StopReason};
use crate::storage::{MetaStore, SitemapFile};
use crate::url::absolutize;
use crate::Result;
use chrono::Utc;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Rate, concurrency, and budget parameters for one pass
#[derive(Debug, Clone)]
pub struct EngineParams {
    /// Wall-clock budget for the pass
    pub run_duration: Duration,

    /// Sleep between batches, independent of the load ceiling
    pub run_delay: Duration,

    /// Concurrent probes per batch
    pub threads: usize,

    /// Server load ceiling; <= 0 disables the check
    pub load_limit: f64,
}

/// Executes bounded crawl passes over a sitemap snapshot
pub struct Engine {
    client: Client,
    params: EngineParams,
    home_url: String,
}

impl Engine {
    /// Creates an engine for one profile's client and parameter set
    pub fn new(client: Client, params: EngineParams, home_url: String) -> Self {
        Self {
            client,
            params,
            home_url,
        }
    }

    /// Runs one bounded pass from the persisted cursor
    ///
    /// Both budget checks happen between batches, so a slow batch can
    /// overrun the nominal budget by up to one batch of request timeouts.
    /// Successes and failures both advance the cursor; failures accumulate
    /// as blacklist candidates and are not retried within the pass.
    pub async fn run_pass(
        &self,
        snapshot: &SitemapFile,
        meta_store: &MetaStore,
        server: &dyn ServerProbe,
    ) -> Result<PassReport> {
        let urls = snapshot.load_urls()?;
        let mut meta = meta_store.read()?;

        let start_pos = meta.last_pos.min(urls.len());
        let mut pos = start_pos;
        let mut crawled = 0usize;
        let mut blacklist = Vec::new();

        meta.last_start_at = Some(Utc::now());

        let started = Instant::now();
        tracing::debug!(
            "Pass starting at {}/{} ({:?} budget, {} thread(s))",
            pos,
            urls.len(),
            self.params.run_duration,
            self.params.threads
        );

        let reason = loop {
            if pos >= urls.len() {
                break StopReason::EndOfSitemap;
            }
            if started.elapsed() >= self.params.run_duration {
                break StopReason::TimeBudget;
            }
            if self.load_exceeded(server) {
                break StopReason::LoadLimit;
            }

            let batch_end = (pos + self.params.threads.max(1)).min(urls.len());
            let batch = &urls[pos..batch_end];

            for (rel, outcome) in self.probe_batch(batch).await {
                if !outcome.is_warmed() {
                    tracing::debug!("Probe failed for {}: {:?}", rel, outcome);
                    blacklist.push(rel);
                }
            }

            crawled += batch.len();
            pos = batch_end;

            if pos < urls.len() && !self.params.run_delay.is_zero() {
                tokio::time::sleep(self.params.run_delay).await;
            }
        };

        meta.list_size = urls.len();
        meta.last_pos = pos;
        if reason == StopReason::EndOfSitemap {
            meta.done_at = Some(Utc::now());
        }
        meta.last_status = Some(format!("{} at {}/{}", reason, pos, urls.len()));
        meta_store.write(&meta)?;

        tracing::info!(
            "Pass stopped: {} ({} probed, {} blacklist candidate(s))",
            reason,
            crawled,
            blacklist.len()
        );

        Ok(PassReport {
            crawled,
            blacklist,
            error: None,
            reason,
            start_pos,
            end_pos: pos,
        })
    }

    /// Probes a batch concurrently, returning results in snapshot order
    async fn probe_batch(&self, batch: &[String]) -> Vec<(String, ProbeOutcome)> {
        let mut set = JoinSet::new();

        for (index, rel) in batch.iter().enumerate() {
            let client = self.client.clone();
            let url = absolutize(rel, &self.home_url);
            let rel = rel.clone();
            set.spawn(async move { (index, rel, probe(&client, &url).await) });
        }

        let mut results: Vec<(usize, String, ProbeOutcome)> = Vec::with_capacity(batch.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => tracing::error!("Probe task panicked: {}", e),
            }
        }

        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, rel, outcome)| (rel, outcome))
            .collect()
    }

    fn load_exceeded(&self, server: &dyn ServerProbe) -> bool {
        if self.params.load_limit <= 0.0 {
            return false;
        }
        match server.load() {
            Some(load) if load >= self.params.load_limit => {
                tracing::warn!(
                    "Server load {:.2} at or above ceiling {:.2}",
                    load,
                    self.params.load_limit
                );
                true
            }
            _ => false,
        }
    }
}
