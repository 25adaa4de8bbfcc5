//! Integration tests for the crawl engine and driver
//!
//! These tests use wiremock as the origin server and drive full passes
//! through the public driver API, verifying cursor persistence, resume
//! behavior, blacklist accumulation, debounce, and profile rotation.

use std::time::Duration;
use stoker::config::Config;
use stoker::site::{ConfigUserDirectory, SeedListProvider, ServerProbe, UrlProvider};
use stoker::storage::{CrawlLock, MetaStore};
use stoker::{Driver, StokerError};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct AllowAll;

impl ServerProbe for AllowAll {
    fn can_crawl(&self) -> bool {
        true
    }
    fn load(&self) -> Option<f64> {
        None
    }
}

struct DenyAll;

impl ServerProbe for DenyAll {
    fn can_crawl(&self) -> bool {
        false
    }
    fn load(&self) -> Option<f64> {
        None
    }
}

struct Overloaded;

impl ServerProbe for Overloaded {
    fn can_crawl(&self) -> bool {
        true
    }
    fn load(&self) -> Option<f64> {
        Some(99.0)
    }
}

fn test_config(home_url: &str, data_dir: &std::path::Path) -> Config {
    toml::from_str(&format!(
        r#"
[site]
home-url = "{}"

[crawler]
run-duration = 10
run-delay = 0
threads = 2
timeout = 1

[output]
data-dir = "{}"
"#,
        home_url,
        data_dir.display()
    ))
    .unwrap()
}

fn five_paths() -> Vec<String> {
    vec![
        "/one".to_string(),
        "/two".to_string(),
        "/three".to_string(),
        "/four".to_string(),
        "/five".to_string(),
    ]
}

fn driver_with(
    config: Config,
    server: Box<dyn ServerProbe + Send + Sync>,
    paths: Vec<String>,
) -> Driver {
    let users = Box::new(ConfigUserDirectory::new(config.crawler.roles.clone()));
    let provider: Box<dyn UrlProvider + Send + Sync> = Box::new(SeedListProvider::new(paths));
    Driver::with_collaborators(config, server, users, provider)
}

async fn mount_ok(server: &MockServer, url_path: &str) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(200).set_body_string("warm"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_pass_reaches_end_of_sitemap() {
    // Scenario: 5 URLs, 2 threads, all probes succeed; one pass advances
    // the cursor from 0 to 5.
    let mock_server = MockServer::start().await;
    for p in ["/one", "/two", "/three", "/four", "/five"] {
        mount_ok(&mock_server, p).await;
    }

    let dir = TempDir::new().unwrap();
    let config = test_config(&mock_server.uri(), dir.path());
    let sitemap_path = config.sitemap_path();
    let driver = driver_with(config, Box::new(AllowAll), five_paths());

    let summary = driver.crawl(false).await.unwrap();
    assert_eq!(summary, "Crawler #1 reached the end of the sitemap file.");

    let meta = MetaStore::for_sitemap(&sitemap_path).read().unwrap();
    assert_eq!(meta.last_pos, 5);
    assert_eq!(meta.list_size, 5);
    assert!(meta.done_at.is_some());
    assert_eq!(driver.count_blacklist(), 0);
}

#[tokio::test]
async fn test_failed_url_is_blacklisted_but_pass_finishes() {
    // Scenario: URL #3 times out; the cursor still reaches the end and the
    // blacklist holds exactly that URL.
    let mock_server = MockServer::start().await;
    for p in ["/one", "/two", "/four", "/five"] {
        mount_ok(&mock_server, p).await;
    }
    // Client timeout is 1s; this response never makes it.
    Mock::given(method("GET"))
        .and(path("/three"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1500)))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&mock_server.uri(), dir.path());
    let sitemap_path = config.sitemap_path();
    let driver = driver_with(config, Box::new(AllowAll), five_paths());

    let summary = driver.crawl(false).await.unwrap();
    assert_eq!(summary, "Crawler #1 reached the end of the sitemap file.");

    let meta = MetaStore::for_sitemap(&sitemap_path).read().unwrap();
    assert_eq!(meta.last_pos, 5);
    assert!(meta.done_at.is_some());
    assert_eq!(driver.get_blacklist().unwrap(), "/three");
}

#[tokio::test]
async fn test_time_budget_pauses_and_resumes_from_cursor() {
    // Scenario: the budget expires after the first batch of 2; the cursor
    // persists at 2 and the next invocation resumes there, not at 0.
    let mock_server = MockServer::start().await;

    // The first batch is slow enough to exhaust a 1-second budget; each of
    // its URLs must be probed exactly once across both invocations.
    for p in ["/one", "/two"] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_millis(1200)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    for p in ["/three", "/four", "/five"] {
        mount_ok(&mock_server, p).await;
    }

    let dir = TempDir::new().unwrap();
    let mut config = test_config(&mock_server.uri(), dir.path());
    config.crawler.run_duration = 1;
    config.crawler.timeout = 5;
    let sitemap_path = config.sitemap_path();
    let driver = driver_with(config, Box::new(AllowAll), five_paths());

    let summary = driver.crawl(false).await.unwrap();
    assert_eq!(summary, "Crawler #1 paused at 2/5: time budget reached.");

    let meta_store = MetaStore::for_sitemap(&sitemap_path);
    let meta = meta_store.read().unwrap();
    assert_eq!(meta.last_pos, 2);
    assert!(meta.done_at.is_none());

    // Resume: the remaining three URLs are fast, so this run finishes.
    let summary = driver.crawl(false).await.unwrap();
    assert_eq!(summary, "Crawler #1 reached the end of the sitemap file.");

    let meta = meta_store.read().unwrap();
    assert_eq!(meta.last_pos, 5);
    assert!(meta.done_at.is_some());
}

#[tokio::test]
async fn test_load_limit_pauses_without_advancing() {
    let mock_server = MockServer::start().await;
    for p in ["/one", "/two", "/three", "/four", "/five"] {
        mount_ok(&mock_server, p).await;
    }

    let dir = TempDir::new().unwrap();
    let config = test_config(&mock_server.uri(), dir.path());
    let sitemap_path = config.sitemap_path();
    let driver = driver_with(config, Box::new(Overloaded), five_paths());

    let summary = driver.crawl(false).await.unwrap();
    assert_eq!(summary, "Crawler #1 paused at 0/5: server load limit reached.");

    let meta = MetaStore::for_sitemap(&sitemap_path).read().unwrap();
    assert_eq!(meta.last_pos, 0);
    assert!(meta.done_at.is_none());
}

#[tokio::test]
async fn test_finished_cycle_is_debounced_until_interval() {
    // With done_at set and the interval not yet elapsed, crawl() performs
    // no regeneration and no pass unless forced.
    let mock_server = MockServer::start().await;
    for p in ["/one", "/two", "/three", "/four", "/five"] {
        mount_ok(&mock_server, p).await;
    }

    let dir = TempDir::new().unwrap();
    let config = test_config(&mock_server.uri(), dir.path());
    let sitemap_path = config.sitemap_path();
    let driver = driver_with(config, Box::new(AllowAll), five_paths());

    driver.crawl(false).await.unwrap();
    let meta_store = MetaStore::for_sitemap(&sitemap_path);
    let before = meta_store.read().unwrap();

    let summary = driver.crawl(false).await.unwrap();
    assert_eq!(summary, "Cache is still warm; the next cycle is not due yet.");

    // Nothing moved: same cursor, same finished timestamp.
    let after = meta_store.read().unwrap();
    assert_eq!(after, before);

    // Forcing starts a fresh cycle: regeneration resets the cursor and the
    // pass walks the snapshot again.
    let summary = driver.crawl(true).await.unwrap();
    assert_eq!(summary, "Crawler #1 reached the end of the sitemap file.");
}

#[tokio::test]
async fn test_profile_advances_after_each_finished_pass() {
    let mock_server = MockServer::start().await;
    for p in ["/one", "/two"] {
        mount_ok(&mock_server, p).await;
    }

    let dir = TempDir::new().unwrap();
    let mut config = test_config(&mock_server.uri(), dir.path());
    config.crawler.webp = true; // Guest and Guest-WebP profiles
    let sitemap_path = config.sitemap_path();
    let driver = driver_with(
        config,
        Box::new(AllowAll),
        vec!["/one".to_string(), "/two".to_string()],
    );

    let summary = driver.crawl(false).await.unwrap();
    assert_eq!(summary, "Crawler #1 reached the end of the sitemap file.");

    let meta_store = MetaStore::for_sitemap(&sitemap_path);
    assert_eq!(meta_store.read().unwrap().curr_crawler, 1);

    let summary = driver.crawl(true).await.unwrap();
    assert_eq!(summary, "Crawler #2 reached the end of the sitemap file.");
    assert_eq!(meta_store.read().unwrap().curr_crawler, 2);
}

#[tokio::test]
async fn test_blacklisted_failure_excluded_from_next_snapshot() {
    // A URL that fails lands in the blacklist, and the next cycle's
    // regenerated snapshot no longer contains it.
    let mock_server = MockServer::start().await;
    for p in ["/one", "/two", "/four", "/five"] {
        mount_ok(&mock_server, p).await;
    }
    Mock::given(method("GET"))
        .and(path("/three"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&mock_server.uri(), dir.path());
    let sitemap_path = config.sitemap_path();
    let driver = driver_with(config, Box::new(AllowAll), five_paths());

    driver.crawl(false).await.unwrap();
    assert_eq!(driver.get_blacklist().unwrap(), "/three");

    driver.crawl(true).await.unwrap();

    let snapshot = std::fs::read_to_string(&sitemap_path).unwrap();
    assert!(!snapshot.contains("/three"));
    let meta = MetaStore::for_sitemap(&sitemap_path).read().unwrap();
    assert_eq!(meta.list_size, 4);
}

#[tokio::test]
async fn test_crawl_refused_without_server_permission() {
    let dir = TempDir::new().unwrap();
    let config = test_config("https://example.com", dir.path());
    let driver = driver_with(config, Box::new(DenyAll), five_paths());

    let result = driver.crawl(false).await;
    match result {
        Err(e @ StokerError::PermissionDenied) => assert!(e.is_benign()),
        other => panic!("expected PermissionDenied, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_concurrent_invocation_is_locked_out() {
    let dir = TempDir::new().unwrap();
    let config = test_config("https://example.com", dir.path());
    let sitemap_path = config.sitemap_path();
    let driver = driver_with(config, Box::new(AllowAll), five_paths());

    let _held = CrawlLock::acquire(
        CrawlLock::path_for(&sitemap_path),
        Duration::from_secs(600),
    )
    .unwrap();

    let result = driver.crawl(false).await;
    match result {
        Err(e @ StokerError::Locked { .. }) => assert!(e.is_benign()),
        other => panic!("expected Locked, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_reset_pos_returns_cursor_to_start() {
    let mock_server = MockServer::start().await;
    for p in ["/one", "/two"] {
        mount_ok(&mock_server, p).await;
    }

    let dir = TempDir::new().unwrap();
    let config = test_config(&mock_server.uri(), dir.path());
    let sitemap_path = config.sitemap_path();
    let driver = driver_with(
        config,
        Box::new(AllowAll),
        vec!["/one".to_string(), "/two".to_string()],
    );

    driver.crawl(false).await.unwrap();
    let meta_store = MetaStore::for_sitemap(&sitemap_path);
    assert_eq!(meta_store.read().unwrap().last_pos, 2);

    driver.reset_pos().unwrap();

    let meta = meta_store.read().unwrap();
    assert_eq!(meta.last_pos, 0);
    assert!(meta.done_at.is_none());
}

#[tokio::test]
async fn test_status_surface_reports_progress() {
    let mock_server = MockServer::start().await;
    for p in ["/one", "/two"] {
        mount_ok(&mock_server, p).await;
    }

    let dir = TempDir::new().unwrap();
    let config = test_config(&mock_server.uri(), dir.path());
    let driver = driver_with(
        config,
        Box::new(AllowAll),
        vec!["/one".to_string(), "/two".to_string()],
    );

    let before = driver.status().unwrap();
    assert!(!before.sitemap_exists);

    driver.crawl(false).await.unwrap();

    let after = driver.status().unwrap();
    assert!(after.sitemap_exists);
    assert_eq!(after.sitemap_urls, 2);
    assert_eq!(after.meta.last_pos, 2);
    assert_eq!(after.profile_count, 1);
    assert!(after.meta_url.is_some());
}
