//! HTTP client building and probing
//!
//! This module handles the outbound side of a crawl pass:
//! - Building a client whose default headers carry a profile's identity
//! - Probing a single URL and classifying the outcome
//!
//! Probes are plain GETs: warming a cache entry requires the server to
//! render the full page, so HEAD is not enough. Same-site redirects are
//! followed a few hops; whatever the chain ends in is the outcome.

use crate::config::{CrawlerConfig, SiteConfig};
use crate::crawler::profiles::CrawlerProfile;
use crate::Result;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE};
use reqwest::{redirect::Policy, Client};
use std::net::SocketAddr;
use std::time::Duration;

/// Outcome of probing one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 2xx (or a followed redirect ending in 2xx); the cache entry is warm
    Warmed { status: u16 },

    /// The server answered with a non-success status
    Rejected { status: u16 },

    /// The probe hit its timeout
    Timeout,

    /// Connection-level failure (refused, TLS, redirect loop, ...)
    Unreachable { error: String },
}

impl ProbeOutcome {
    /// True when the URL should advance without a blacklist mark
    pub fn is_warmed(&self) -> bool {
        matches!(self, Self::Warmed { .. })
    }
}

/// Builds an HTTP client carrying a crawler profile's identity
///
/// The role uid and cookie factors ride in a default `Cookie` header, WebP
/// capability in `Accept`, and mobile simulation in the user agent. When a
/// server IP is configured, the home host resolves there instead of DNS.
pub fn build_http_client(
    site: &SiteConfig,
    crawler: &CrawlerConfig,
    profile: &CrawlerProfile,
) -> Result<Client> {
    let mut user_agent = format!(
        "stoker/{} (+{})",
        env!("CARGO_PKG_VERSION"),
        site.home_url
    );
    if profile.mobile() {
        user_agent.push_str(" Mobile");
    }

    let mut headers = HeaderMap::new();
    if profile.webp() {
        headers.insert(ACCEPT, HeaderValue::from_static("image/webp,*/*"));
    }
    if let Some(cookie) = profile.cookie_header(&site.role_cookie) {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.insert(COOKIE, value);
            }
            Err(_) => tracing::warn!("Cookie header for profile '{}' is not a valid header value, probing without it", profile.title),
        }
    }

    let mut builder = Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(crawler.timeout))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(5))
        .gzip(true)
        .brotli(true);

    if let Some(ip) = &site.server_ip {
        if let Ok(addr) = ip.parse() {
            if let Ok(home) = url::Url::parse(&site.home_url) {
                if let Some(host) = home.host_str() {
                    builder = builder.resolve(host, SocketAddr::new(addr, 0));
                }
            }
        }
    }

    Ok(builder.build()?)
}

/// Probes a single URL and classifies the result
///
/// The body is drained so the origin renders the page fully. Failures are
/// classified, never retried here: a failed URL becomes a blacklist
/// candidate and the cursor moves on.
pub async fn probe(client: &Client, url: &str) -> ProbeOutcome {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            let _ = response.bytes().await;

            if status.is_success() || status.is_redirection() {
                ProbeOutcome::Warmed {
                    status: status.as_u16(),
                }
            } else {
                ProbeOutcome::Rejected {
                    status: status.as_u16(),
                }
            }
        }
        Err(e) => {
            if e.is_timeout() {
                ProbeOutcome::Timeout
            } else if e.is_connect() {
                ProbeOutcome::Unreachable {
                    error: "connection failed".to_string(),
                }
            } else {
                ProbeOutcome::Unreachable {
                    error: e.to_string(),
                }
            }
        }
    }
}
