//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small site (and, where noted, the
//! Wayback endpoints) and run the full crawl-and-archive loop end-to-end.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use site_archiver::archive::{
    CaptureClient, CaptureOutcome, SnapshotLookup, WaybackAvailability, WaybackCapture,
};
use site_archiver::config::{BackoffConfig, CrawlConfig, IgnorePolicy};
use site_archiver::crawler::{run_crawl, Coordinator};
use site_archiver::report::{CrawlEvent, RecordingReporter, SilentReporter};
use site_archiver::ArchiverError;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use url::Url;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Capture client that records every URL it is asked to capture
#[derive(Clone, Default)]
struct RecordingCapture {
    calls: Arc<Mutex<Vec<String>>>,
    outcome: Option<CaptureOutcome>,
}

impl RecordingCapture {
    fn failing(status: u16) -> Self {
        Self {
            outcome: Some(CaptureOutcome::ServiceError {
                status: Some(status),
                message: "service unavailable".to_string(),
            }),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CaptureClient for RecordingCapture {
    async fn capture(&self, url: &str) -> CaptureOutcome {
        self.calls.lock().unwrap().push(url.to_string());
        self.outcome
            .clone()
            .unwrap_or_else(|| CaptureOutcome::Success {
                archive_url: format!("https://web.archive.org/web/20240101000000/{}", url),
            })
    }
}

/// Snapshot lookup backed by a fixed set of already archived URLs
#[derive(Clone, Default)]
struct FakeSnapshots {
    archived: HashSet<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeSnapshots {
    fn with_archived(urls: &[String]) -> Self {
        Self {
            archived: urls.iter().cloned().collect(),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnapshotLookup for FakeSnapshots {
    async fn closest_snapshot(&self, url: &str) -> Result<Option<DateTime<Local>>, ArchiverError> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.archived.contains(url) {
            Ok(Some(Local::now()))
        } else {
            Ok(None)
        }
    }
}

/// Mounts an HTML page at `page_path`
async fn mount_html(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

/// Serves a small documentation site:
///
/// - `/docs/` links to `/docs/a`, `/docs/b#frag`, an external page, a
///   telephone link, `/blog/post` and `/docs/a` again
/// - `/docs/a` links to `/docs/c`, back to `/docs/` and to `b`
/// - `/docs/b` has no links
/// - `/docs/c` is a PDF
/// - `/blog/post` links to `/blog/other`
async fn mount_docs_site(server: &MockServer) {
    mount_html(
        server,
        "/docs/",
        r##"<html><body>
            <a href="/docs/a">A</a>
            <a href="/docs/b#frag">B</a>
            <a href="https://other.com/x">Other</a>
            <a href="tel:123">Call</a>
            <a href="/blog/post">Blog</a>
            <a href="/docs/a#again">A again</a>
        </body></html>"##,
    )
    .await;

    mount_html(
        server,
        "/docs/a",
        r#"<html><body>
            <a href="/docs/c">C</a>
            <a href="/docs/">Home</a>
            <a href="b">B</a>
        </body></html>"#,
    )
    .await;

    mount_html(server, "/docs/b", "<html><body>No links here</body></html>").await;

    Mock::given(method("GET"))
        .and(path("/docs/c"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .mount(server)
        .await;

    mount_html(
        server,
        "/blog/post",
        r#"<html><body><a href="/blog/other">Other post</a></body></html>"#,
    )
    .await;
}

fn create_test_config(server: &MockServer) -> CrawlConfig {
    let base = Url::parse(&format!("{}/docs/", server.uri())).expect("Failed to parse base URL");
    let mut config = CrawlConfig::new(base);
    config.backoff = BackoffConfig::immediate();
    config
}

/// Paths of every request the server received, in order
async fn fetched_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .expect("Request recording is disabled")
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}

fn site_url(server: &MockServer, page_path: &str) -> String {
    format!("{}{}", server.uri(), page_path)
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    mount_docs_site(&mock_server).await;

    let capture = RecordingCapture::default();
    let snapshots = FakeSnapshots::default();
    let reporter = Arc::new(RecordingReporter::new());

    let mut coordinator = Coordinator::new(
        create_test_config(&mock_server),
        capture.clone(),
        snapshots.clone(),
        reporter.clone(),
    )
    .expect("Failed to create coordinator");
    let stats = coordinator.run().await;

    // Captured in discovery order; fragments stripped, external links dropped
    assert_eq!(
        capture.calls(),
        vec![
            site_url(&mock_server, "/docs/a"),
            site_url(&mock_server, "/docs/b"),
            site_url(&mock_server, "/blog/post"),
            site_url(&mock_server, "/docs/c"),
        ]
    );
    assert_eq!(snapshots.calls(), capture.calls());

    // Depth first: the last page pushed from /docs/ is visited first,
    // and /blog/post is archived but never crawled into
    assert_eq!(
        fetched_paths(&mock_server).await,
        vec!["/docs/", "/docs/b", "/docs/a", "/docs/c"]
    );

    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.pages_not_text, 1);
    assert_eq!(stats.pages_failed, 0);
    assert_eq!(stats.urls_discovered, 4);
    assert_eq!(stats.archived, 4);
    assert_eq!(stats.archive_failures, 0);
    assert_eq!(stats.queued, 3);

    // Base plus the four discovered URLs
    assert_eq!(coordinator.frontier().visited_count(), 5);

    let events = reporter.events();
    assert!(events.contains(&CrawlEvent::Archiving {
        url: site_url(&mock_server, "/docs/a"),
        index: 1,
        total: 6,
    }));
    assert!(events.contains(&CrawlEvent::Archived { index: 5, total: 6 }));
    assert!(events.contains(&CrawlEvent::PageCompleted {
        url: site_url(&mock_server, "/docs/"),
        total: 6,
    }));
    assert!(events.iter().any(|e| matches!(e, CrawlEvent::NotText { .. })));
}

#[tokio::test]
async fn test_each_url_queued_once() {
    let mock_server = MockServer::start().await;
    mount_docs_site(&mock_server).await;

    let reporter = Arc::new(RecordingReporter::new());
    let mut coordinator = Coordinator::new(
        create_test_config(&mock_server),
        RecordingCapture::default(),
        FakeSnapshots::default(),
        reporter.clone(),
    )
    .expect("Failed to create coordinator");
    coordinator.run().await;

    let queued: Vec<String> = reporter
        .events()
        .into_iter()
        .filter_map(|e| match e {
            CrawlEvent::Queued { url } => Some(url),
            _ => None,
        })
        .collect();
    let unique: HashSet<&String> = queued.iter().collect();
    assert_eq!(queued.len(), unique.len());

    let fetched = fetched_paths(&mock_server).await;
    let unique_fetched: HashSet<&String> = fetched.iter().collect();
    assert_eq!(fetched.len(), unique_fetched.len());
}

#[tokio::test]
async fn test_index_only_mode() {
    let mock_server = MockServer::start().await;
    mount_docs_site(&mock_server).await;

    let mut config = create_test_config(&mock_server);
    config.as_index = true;
    config.verbose = true;

    let capture = RecordingCapture::default();
    let reporter = Arc::new(RecordingReporter::new());
    let mut coordinator = Coordinator::new(
        config,
        capture.clone(),
        FakeSnapshots::default(),
        reporter.clone(),
    )
    .expect("Failed to create coordinator");
    let stats = coordinator.run().await;

    // Only the base page is ever fetched
    assert_eq!(fetched_paths(&mock_server).await, vec!["/docs/"]);
    assert_eq!(
        capture.calls(),
        vec![
            site_url(&mock_server, "/docs/a"),
            site_url(&mock_server, "/docs/b"),
            site_url(&mock_server, "/blog/post"),
        ]
    );
    assert_eq!(stats.queued, 0);

    let not_queued = reporter
        .events()
        .iter()
        .filter(|e| matches!(e, CrawlEvent::NotQueued { .. }))
        .count();
    assert_eq!(not_queued, 3);
}

#[tokio::test]
async fn test_already_archived_urls_not_captured() {
    let mock_server = MockServer::start().await;
    mount_docs_site(&mock_server).await;

    let capture = RecordingCapture::default();
    let snapshots = FakeSnapshots::with_archived(&[site_url(&mock_server, "/docs/a")]);

    let mut coordinator = Coordinator::new(
        create_test_config(&mock_server),
        capture.clone(),
        snapshots,
        Arc::new(SilentReporter),
    )
    .expect("Failed to create coordinator");
    let stats = coordinator.run().await;

    assert!(!capture
        .calls()
        .contains(&site_url(&mock_server, "/docs/a")));
    assert_eq!(stats.already_archived, 1);
    assert_eq!(stats.archived, 3);

    // Still crawled into, so /docs/c is found
    assert!(fetched_paths(&mock_server)
        .await
        .contains(&"/docs/a".to_string()));
    assert!(capture
        .calls()
        .contains(&site_url(&mock_server, "/docs/c")));
}

#[tokio::test]
async fn test_rearchive_skips_snapshot_lookup() {
    let mock_server = MockServer::start().await;
    mount_docs_site(&mock_server).await;

    let mut config = create_test_config(&mock_server);
    config.rearchive = true;

    let capture = RecordingCapture::default();
    let snapshots = FakeSnapshots::with_archived(&[
        site_url(&mock_server, "/docs/a"),
        site_url(&mock_server, "/docs/b"),
    ]);

    let mut coordinator = Coordinator::new(
        config,
        capture.clone(),
        snapshots.clone(),
        Arc::new(SilentReporter),
    )
    .expect("Failed to create coordinator");
    let stats = coordinator.run().await;

    assert!(snapshots.calls().is_empty());
    assert_eq!(capture.calls().len(), 4);
    assert_eq!(stats.already_archived, 0);
}

#[tokio::test]
async fn test_dry_run_never_captures() {
    let mock_server = MockServer::start().await;
    mount_docs_site(&mock_server).await;

    let mut config = create_test_config(&mock_server);
    config.dry_run = true;

    let capture = RecordingCapture::default();
    let snapshots = FakeSnapshots::default();
    let mut coordinator = Coordinator::new(
        config,
        capture.clone(),
        snapshots.clone(),
        Arc::new(SilentReporter),
    )
    .expect("Failed to create coordinator");
    let stats = coordinator.run().await;

    assert!(capture.calls().is_empty());
    assert_eq!(stats.archived, 4);
    // The traversal is the same as a real run
    assert_eq!(
        fetched_paths(&mock_server).await,
        vec!["/docs/", "/docs/b", "/docs/a", "/docs/c"]
    );
    assert_eq!(snapshots.calls().len(), 4);
}

#[tokio::test]
async fn test_skip_to_resumes_archiving() {
    let mock_server = MockServer::start().await;
    mount_docs_site(&mock_server).await;

    let mut config = create_test_config(&mock_server);
    config.skip_to = Some("/b/".to_string());

    let capture = RecordingCapture::default();
    let snapshots = FakeSnapshots::default();
    let reporter = Arc::new(RecordingReporter::new());
    let mut coordinator = Coordinator::new(
        config,
        capture.clone(),
        snapshots.clone(),
        reporter.clone(),
    )
    .expect("Failed to create coordinator");
    let stats = coordinator.run().await;

    // /docs/a came before the skip target: marked visited, never archived or fetched
    assert_eq!(
        capture.calls(),
        vec![
            site_url(&mock_server, "/docs/b"),
            site_url(&mock_server, "/blog/post"),
        ]
    );
    assert!(!snapshots
        .calls()
        .contains(&site_url(&mock_server, "/docs/a")));
    assert_eq!(fetched_paths(&mock_server).await, vec!["/docs/", "/docs/b"]);
    assert!(coordinator.skip_done());
    assert_eq!(stats.urls_skipped, 1);

    let events = reporter.events();
    assert!(events.contains(&CrawlEvent::Skipped {
        url: site_url(&mock_server, "/docs/a"),
    }));
    assert!(events.contains(&CrawlEvent::SkipTargetReached {
        url: site_url(&mock_server, "/docs/b"),
    }));
}

#[tokio::test]
async fn test_archive_failures_do_not_stop_crawl() {
    let mock_server = MockServer::start().await;
    mount_docs_site(&mock_server).await;

    let mut config = create_test_config(&mock_server);
    config.retries = 2;

    let capture = RecordingCapture::failing(523);
    let mut coordinator = Coordinator::new(
        config,
        capture.clone(),
        FakeSnapshots::default(),
        Arc::new(SilentReporter),
    )
    .expect("Failed to create coordinator");
    let stats = coordinator.run().await;

    // Two counted attempts per URL, and every page is still crawled
    assert_eq!(capture.calls().len(), 8);
    assert_eq!(stats.archive_failures, 4);
    assert_eq!(stats.ignored, 0);
    assert_eq!(stats.archived, 0);
    assert_eq!(stats.pages_fetched, 3);
}

#[tokio::test]
async fn test_ignored_codes_fail_without_retry() {
    let mock_server = MockServer::start().await;
    mount_docs_site(&mock_server).await;

    let mut config = create_test_config(&mock_server);
    config.ignore = IgnorePolicy::Codes([523].into_iter().collect());

    let capture = RecordingCapture::failing(523);
    let mut coordinator = Coordinator::new(
        config,
        capture.clone(),
        FakeSnapshots::default(),
        Arc::new(SilentReporter),
    )
    .expect("Failed to create coordinator");
    let stats = coordinator.run().await;

    assert_eq!(capture.calls().len(), 4);
    assert_eq!(stats.ignored, 4);
    assert_eq!(stats.archive_failures, 0);
    assert_eq!(stats.archived, 0);
}

#[tokio::test]
async fn test_drop_query_collapses_urls() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/docs/",
        r#"<html><body>
            <a href="/blog/p?page=1">1</a>
            <a href="/blog/p?page=2">2</a>
            <a href="/blog/p">plain</a>
        </body></html>"#,
    )
    .await;

    let mut config = create_test_config(&mock_server);
    config.drop_query = true;

    let capture = RecordingCapture::default();
    let mut coordinator = Coordinator::new(
        config,
        capture.clone(),
        FakeSnapshots::default(),
        Arc::new(SilentReporter),
    )
    .expect("Failed to create coordinator");
    coordinator.run().await;

    assert_eq!(capture.calls(), vec![site_url(&mock_server, "/blog/p")]);
}

#[tokio::test]
async fn test_query_variants_kept_by_default() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/docs/",
        r#"<html><body>
            <a href="/blog/p?page=1">1</a>
            <a href="/blog/p?page=2">2</a>
        </body></html>"#,
    )
    .await;

    let capture = RecordingCapture::default();
    let mut coordinator = Coordinator::new(
        create_test_config(&mock_server),
        capture.clone(),
        FakeSnapshots::default(),
        Arc::new(SilentReporter),
    )
    .expect("Failed to create coordinator");
    coordinator.run().await;

    assert_eq!(capture.calls().len(), 2);
}

#[tokio::test]
async fn test_non_text_base_page() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"{}".to_vec(), "application/json"),
        )
        .mount(&mock_server)
        .await;

    let capture = RecordingCapture::default();
    let mut coordinator = Coordinator::new(
        create_test_config(&mock_server),
        capture.clone(),
        FakeSnapshots::default(),
        Arc::new(SilentReporter),
    )
    .expect("Failed to create coordinator");
    let stats = coordinator.run().await;

    // Not retried
    assert_eq!(fetched_paths(&mock_server).await, vec!["/docs/"]);
    assert_eq!(stats.pages_not_text, 1);
    assert!(capture.calls().is_empty());
}

#[tokio::test]
async fn test_error_pages_still_parsed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(ResponseTemplate::new(404).set_body_raw(
            r#"<html><body><a href="/docs/found">Try this</a></body></html>"#.to_string(),
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    let capture = RecordingCapture::default();
    let mut coordinator = Coordinator::new(
        create_test_config(&mock_server),
        capture.clone(),
        FakeSnapshots::default(),
        Arc::new(SilentReporter),
    )
    .expect("Failed to create coordinator");
    coordinator.run().await;

    assert_eq!(capture.calls(), vec![site_url(&mock_server, "/docs/found")]);
}

#[tokio::test]
async fn test_redirecting_base_resolves_against_requested_url() {
    let mock_server = MockServer::start().await;
    let port = mock_server.address().port();

    // The base host redirects to a different host name for the same server
    let target = format!("{}/docs/", mock_server.uri());
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", target.as_str()))
        .mount(&mock_server)
        .await;
    mount_html(
        &mock_server,
        "/docs/",
        r#"<html><body><a href="/docs/a">A</a><a href="b">B</a></body></html>"#,
    )
    .await;

    let base = Url::parse(&format!("http://localhost:{}/start", port)).unwrap();
    let mut config = CrawlConfig::new(base);
    config.backoff = BackoffConfig::immediate();

    let capture = RecordingCapture::default();
    let mut coordinator = Coordinator::new(
        config,
        capture.clone(),
        FakeSnapshots::default(),
        Arc::new(SilentReporter),
    )
    .expect("Failed to create coordinator");
    let stats = coordinator.run().await;

    assert_eq!(
        capture.calls(),
        vec![
            format!("http://localhost:{}/docs/a", port),
            format!("http://localhost:{}/b", port),
        ]
    );
    assert_eq!(stats.urls_discovered, 2);
    assert_eq!(stats.pages_fetched, 1);
}

#[tokio::test]
async fn test_crawl_continues_after_page_exhausts_retries() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/docs/",
        r#"<html><body><a href="/docs/after">After</a><a href="/docs/gone">Gone</a></body></html>"#,
    )
    .await;

    // Redirects to a port that refuses connections
    Mock::given(method("GET"))
        .and(path("/docs/gone"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "http://127.0.0.1:1/"))
        .mount(&mock_server)
        .await;

    mount_html(
        &mock_server,
        "/docs/after",
        r#"<html><body><a href="/docs/deep">Deep</a></body></html>"#,
    )
    .await;
    mount_html(&mock_server, "/docs/deep", "<html><body></body></html>").await;

    let mut config = create_test_config(&mock_server);
    config.retries = 2;

    let capture = RecordingCapture::default();
    let reporter = Arc::new(RecordingReporter::new());
    let mut coordinator = Coordinator::new(
        config,
        capture.clone(),
        FakeSnapshots::default(),
        reporter.clone(),
    )
    .expect("Failed to create coordinator");
    let stats = coordinator.run().await;

    // /docs/gone is popped first, fails twice, then the crawl moves on
    assert_eq!(
        fetched_paths(&mock_server).await,
        vec!["/docs/", "/docs/gone", "/docs/gone", "/docs/after", "/docs/deep"]
    );
    assert_eq!(
        capture.calls(),
        vec![
            site_url(&mock_server, "/docs/after"),
            site_url(&mock_server, "/docs/gone"),
            site_url(&mock_server, "/docs/deep"),
        ]
    );
    assert_eq!(stats.pages_failed, 1);
    assert_eq!(stats.pages_fetched, 3);
    assert!(reporter.events().contains(&CrawlEvent::FetchExhausted {
        url: site_url(&mock_server, "/docs/gone"),
        attempts: 2,
    }));
}

#[tokio::test]
async fn test_wayback_capture_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex("^/save/.*/fresh$"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-location", "/web/20240101000000/https://example.com/fresh"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex("^/save/.*/cached$"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-location", "/web/20200101000000/https://example.com/cached")
                .insert_header("x-page-cache", "HIT"),
        )
        .mount(&mock_server)
        .await;

    // The runtime error header marks a failure whatever the status
    Mock::given(method("GET"))
        .and(path_regex("^/save/.*/broken$"))
        .respond_with(ResponseTemplate::new(500).insert_header(
            "x-archive-wayback-runtime-error",
            "LiveDocumentNotAvailableException",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex("^/save/.*/refused$"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server);
    config.service.wayback_url = mock_server.uri();
    let client = WaybackCapture::new(&config.service, "TestArchiver/1.0")
        .expect("Failed to build capture client");

    assert_eq!(
        client.capture("https://example.com/fresh").await,
        CaptureOutcome::Success {
            archive_url: format!(
                "{}/web/20240101000000/https://example.com/fresh",
                mock_server.uri()
            )
        }
    );
    assert!(matches!(
        client.capture("https://example.com/cached").await,
        CaptureOutcome::AlreadyCached { .. }
    ));
    assert_eq!(
        client.capture("https://example.com/broken").await,
        CaptureOutcome::ServiceError {
            status: Some(500),
            message: "LiveDocumentNotAvailableException".to_string(),
        }
    );
    assert!(matches!(
        client.capture("https://example.com/refused").await,
        CaptureOutcome::ServiceError {
            status: Some(502),
            ..
        }
    ));
}

#[tokio::test]
async fn test_wayback_availability_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wayback/available"))
        .and(query_param("url", "https://example.com/old"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"url": "https://example.com/old", "archived_snapshots": {"closest": {"available": true, "status": "200", "timestamp": "20210101120000"}}}"#.to_string(),
            "application/json",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/wayback/available"))
        .and(query_param("url", "https://example.com/new?x=1&y=2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"url": "https://example.com/new", "archived_snapshots": {}}"#.to_string(),
            "application/json",
        ))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server);
    config.service.availability_url = format!("{}/wayback/available", mock_server.uri());
    let client = WaybackAvailability::new(&config.service, "TestArchiver/1.0")
        .expect("Failed to build lookup client");

    let snapshot = client
        .closest_snapshot("https://example.com/old")
        .await
        .expect("Lookup failed");
    assert_eq!(
        snapshot.map(|ts| ts.naive_utc().format("%Y%m%d%H%M%S").to_string()),
        Some("20210101120000".to_string())
    );

    let snapshot = client
        .closest_snapshot("https://example.com/new?x=1&y=2")
        .await
        .expect("Lookup failed");
    assert_eq!(snapshot, None);
}

#[tokio::test]
async fn test_run_crawl_against_mock_wayback() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/docs/",
        r#"<html><body><a href="/blog/one">One</a><a href="/blog/two">Two</a></body></html>"#,
    )
    .await;

    // /blog/one already has a snapshot, /blog/two does not
    Mock::given(method("GET"))
        .and(path("/wayback/available"))
        .and(query_param("url", site_url(&mock_server, "/blog/one")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"archived_snapshots": {"closest": {"timestamp": "20230505050505"}}}"#.to_string(),
            "application/json",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/wayback/available"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"archived_snapshots": {}}"#.to_string(),
            "application/json",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex("^/save/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-location", "/web/20240101000000/captured"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server);
    config.service.wayback_url = mock_server.uri();
    config.service.availability_url = format!("{}/wayback/available", mock_server.uri());

    let stats = run_crawl(config, Arc::new(SilentReporter))
        .await
        .expect("Crawl failed");

    assert_eq!(stats.already_archived, 1);
    assert_eq!(stats.archived, 1);
    assert_eq!(stats.pages_fetched, 1);

    let saved: Vec<String> = fetched_paths(&mock_server)
        .await
        .into_iter()
        .filter(|p| p.starts_with("/save/"))
        .collect();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].ends_with("/blog/two"));
}
