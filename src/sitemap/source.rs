//! URL source
//!
//! Produces the candidate URL list for a sitemap snapshot: either by
//! fetching and recursively expanding an external sitemap, or by asking the
//! site's internal URL provider. Output is always site-root-relative and
//! deduplicated in first-seen order.

use crate::site::UrlProvider;
use crate::sitemap::parser::{parse_sitemap_xml, SitemapDoc};
use crate::url::{dedup_first_seen, to_site_relative};
use crate::{Result, StokerError};
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;

/// Maximum nesting of sitemap indexes before children are dropped
pub const MAX_INDEX_DEPTH: usize = 5;

/// Maximum sitemap documents fetched per generation
pub const MAX_SITEMAP_FETCHES: usize = 64;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Produces candidate URLs for sitemap generation
pub struct UrlSource {
    client: Client,
    home_url: String,
}

impl UrlSource {
    /// Creates a URL source for the given home URL
    pub fn new(home_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("stoker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            home_url: home_url.trim_end_matches('/').to_string(),
        })
    }

    /// Produces the ordered, deduplicated, site-root-relative URL list
    ///
    /// With a custom sitemap configured the external document tree is
    /// fetched and expanded; URLs outside the home prefix are dropped.
    /// Without one, the internal provider supplies the list.
    ///
    /// # Errors
    ///
    /// The root fetch failing maps to [`StokerError::Fetch`] /
    /// [`StokerError::FetchStatus`]; a malformed root document to
    /// [`StokerError::SitemapParse`]. Child document failures never abort
    /// the operation — the branch is logged and contributes nothing.
    pub async fn produce_urls(
        &self,
        custom_sitemap: Option<&str>,
        fallback: &dyn UrlProvider,
    ) -> Result<Vec<String>> {
        let urls = match custom_sitemap {
            Some(sitemap_url) => {
                let absolute = self.collect(sitemap_url).await?;
                absolute
                    .iter()
                    .filter_map(|u| to_site_relative(u, &self.home_url))
                    .collect()
            }
            None => fallback.produce_urls()?,
        };

        Ok(dedup_first_seen(urls))
    }

    /// Expands a sitemap document tree depth-first, returning absolute URLs
    ///
    /// Index entries are walked in document order. Expansion is bounded by
    /// [`MAX_INDEX_DEPTH`] and [`MAX_SITEMAP_FETCHES`], and already-visited
    /// documents are never refetched, so circular indexes terminate.
    pub async fn collect(&self, root_url: &str) -> Result<Vec<String>> {
        let mut urls = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut stack: Vec<(String, usize)> = vec![(root_url.to_string(), 0)];
        let mut fetches = 0usize;

        while let Some((url, depth)) = stack.pop() {
            if !seen.insert(url.clone()) {
                continue;
            }

            if fetches >= MAX_SITEMAP_FETCHES {
                tracing::warn!(
                    "Sitemap fetch budget ({}) exhausted, skipping {} queued document(s)",
                    MAX_SITEMAP_FETCHES,
                    stack.len() + 1
                );
                break;
            }
            fetches += 1;

            let doc = match self.fetch_and_parse(&url).await {
                Ok(doc) => doc,
                Err(e) if depth == 0 => return Err(e),
                Err(e) => {
                    tracing::warn!("Skipping child sitemap {}: {}", url, e);
                    continue;
                }
            };

            match doc {
                SitemapDoc::UrlSet(locs) => {
                    tracing::debug!("Sitemap {} contributed {} URL(s)", url, locs.len());
                    urls.extend(locs);
                }
                SitemapDoc::Index(children) => {
                    if depth + 1 > MAX_INDEX_DEPTH {
                        tracing::warn!(
                            "Sitemap index {} nested deeper than {}, children skipped",
                            url,
                            MAX_INDEX_DEPTH
                        );
                        continue;
                    }
                    // Reversed so the first child is expanded next (depth-first,
                    // document order).
                    for child in children.into_iter().rev() {
                        stack.push((child, depth + 1));
                    }
                }
            }
        }

        Ok(urls)
    }

    async fn fetch_and_parse(&self, url: &str) -> Result<SitemapDoc> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StokerError::Fetch {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StokerError::FetchStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| StokerError::Fetch {
            url: url.to_string(),
            source: e,
        })?;

        parse_sitemap_xml(&body).map_err(|e| StokerError::SitemapParse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
