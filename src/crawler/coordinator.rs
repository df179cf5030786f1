//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates:
//! - Popping pages from the frontier and fetching them
//! - Resolving and scoping every anchor on a page
//! - Suppressing duplicates and honouring the skip cursor
//! - Deciding whether each URL needs archiving, and archiving it
//! - Pushing in-scope URLs back onto the frontier

use crate::archive::{
    ArchiveRequester, ArchiveStatus, CaptureClient, SnapshotChecker, SnapshotLookup,
    WaybackAvailability, WaybackCapture,
};
use crate::config::{validate, CrawlConfig};
use crate::crawler::fetcher::{build_http_client, FetchResult, Fetcher};
use crate::crawler::frontier::{Frontier, SkipCursor};
use crate::report::{CrawlEvent, CrawlStats, Reporter};
use crate::url::{normalize_href, BaseScope, NormalizeOptions};
use crate::ArchiverError;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator<C, L> {
    config: CrawlConfig,
    scope: BaseScope,
    options: NormalizeOptions,
    fetcher: Fetcher,
    snapshots: SnapshotChecker<L>,
    requester: ArchiveRequester<C>,
    reporter: Arc<dyn Reporter>,
    frontier: Frontier,
    skip_cursor: SkipCursor,
    stats: CrawlStats,
}

impl<C: CaptureClient, L: SnapshotLookup> Coordinator<C, L> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration
    /// * `capture` - Client used to request captures
    /// * `lookup` - Client used to look up existing snapshots
    /// * `reporter` - Sink for every crawl event
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ArchiverError)` - The configuration is invalid or the HTTP
    ///   client could not be built
    pub fn new(
        mut config: CrawlConfig,
        capture: C,
        lookup: L,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self, ArchiverError> {
        validate(&config)?;

        config.base_url.set_fragment(None);

        let scope = BaseScope::new(&config.base_url);
        let options = NormalizeOptions {
            schemes: config.schemes.clone(),
            drop_query: config.drop_query,
            sort_query: config.sort_query,
        };

        let fetcher = Fetcher::new(
            build_http_client(&config.user_agent)?,
            config.retries,
            config.backoff.clone(),
            reporter.clone(),
        );
        let snapshots = SnapshotChecker::new(
            lookup,
            config.lookup_retries,
            config.backoff.clone(),
            reporter.clone(),
        );
        let requester = ArchiveRequester::new(
            capture,
            config.retries,
            config.ignore.clone(),
            config.backoff.clone(),
            reporter.clone(),
        );

        let frontier = Frontier::new(&config.base_url);
        let skip_cursor = SkipCursor::new(config.skip_to.as_deref());

        Ok(Self {
            config,
            scope,
            options,
            fetcher,
            snapshots,
            requester,
            reporter,
            frontier,
            skip_cursor,
            stats: CrawlStats::new(),
        })
    }

    /// Runs the main crawl loop until the frontier is empty
    ///
    /// No single URL's failure stops the crawl; the returned statistics
    /// record what happened.
    pub async fn run(&mut self) -> CrawlStats {
        self.reporter.report(CrawlEvent::CrawlStarted {
            base_url: self.config.base_url.to_string(),
        });

        let start_time = Instant::now();

        while let Some(page_url) = self.frontier.pop() {
            tracing::debug!(
                "Processing {} ({} waiting, {} seen)",
                page_url,
                self.frontier.len(),
                self.frontier.visited_count()
            );
            self.process_page(&page_url).await;
        }

        self.stats.elapsed = start_time.elapsed();
        self.stats.clone()
    }

    /// Statistics gathered so far
    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    /// The frontier and visited set
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Returns true once archiving is no longer held back by `skip_to`
    pub fn skip_done(&self) -> bool {
        self.skip_cursor.is_done()
    }

    /// Fetches one page and handles each of its anchors in document order
    async fn process_page(&mut self, page_url: &Url) {
        let page = match self.fetcher.fetch_page(page_url).await {
            FetchResult::Page(page) => page,
            FetchResult::NoPage { .. } => {
                self.stats.pages_failed += 1;
                return;
            }
            FetchResult::NotText { .. } => {
                self.stats.pages_not_text += 1;
                return;
            }
        };

        self.stats.pages_fetched += 1;

        let total = page.hrefs.len();
        for (i, href) in page.hrefs.iter().enumerate() {
            self.handle_anchor(page_url, href, i + 1, total).await;
        }

        self.reporter.report(CrawlEvent::PageCompleted {
            url: page_url.to_string(),
            total,
        });
    }

    /// Runs a single anchor through scoping, dedup, the skip cursor and archival
    async fn handle_anchor(&mut self, page_url: &Url, href: &str, index: usize, total: usize) {
        let Some(url) = normalize_href(&self.scope, page_url, href, &self.options) else {
            return;
        };

        if !self.frontier.mark_visited(&url) {
            return;
        }
        self.stats.urls_discovered += 1;

        if !self.skip_cursor.is_done() {
            if self.skip_cursor.observe(&url) {
                self.reporter.report(CrawlEvent::SkipTargetReached {
                    url: url.to_string(),
                });
            } else {
                self.reporter.report(CrawlEvent::Skipped {
                    url: url.to_string(),
                });
                self.stats.urls_skipped += 1;
                return;
            }
        }

        if self.should_archive(&url).await {
            self.archive(&url, index, total).await;
        }

        if !self.config.as_index && self.scope.in_depth_scope(&url) {
            self.reporter.report(CrawlEvent::Queued {
                url: url.to_string(),
            });
            self.stats.queued += 1;
            self.frontier.push(url);
        } else if self.config.verbose {
            self.reporter.report(CrawlEvent::NotQueued {
                url: url.to_string(),
            });
        }
    }

    /// Decides whether a URL still needs a capture
    async fn should_archive(&mut self, url: &Url) -> bool {
        if self.config.rearchive {
            return true;
        }

        match self.snapshots.is_archived(url.as_str()).await {
            Some(timestamp) => {
                self.reporter.report(CrawlEvent::AlreadyArchived {
                    url: url.to_string(),
                    timestamp,
                });
                self.stats.already_archived += 1;
                false
            }
            None => true,
        }
    }

    /// Archives a URL, or pretends to in a dry run
    async fn archive(&mut self, url: &Url, index: usize, total: usize) {
        self.reporter.report(CrawlEvent::Archiving {
            url: url.to_string(),
            index,
            total,
        });

        let status = if self.config.dry_run {
            ArchiveStatus::Archived
        } else {
            self.requester.archive(url.as_str()).await
        };

        match status {
            ArchiveStatus::Archived | ArchiveStatus::Cached => {
                self.stats.archived += 1;
                self.reporter.report(CrawlEvent::Archived { index, total });
            }
            ArchiveStatus::Ignored { .. } => {
                self.stats.ignored += 1;
                self.reporter.report(CrawlEvent::ArchiveFailed { index, total });
            }
            ArchiveStatus::Failed { .. } => {
                self.stats.archive_failures += 1;
                self.reporter.report(CrawlEvent::ArchiveFailed { index, total });
            }
        }
    }
}

/// Runs a complete crawl against the Wayback Machine
///
/// This function wires up the real capture and lookup clients and runs
/// the crawl to completion:
///
/// 1. Validate the configuration
/// 2. Build the Wayback capture and availability clients
/// 3. Seed the frontier with the base URL
/// 4. Main crawl loop:
///    a. Pop the most recently pushed URL
///    b. Fetch it (with countdown retries) and extract anchors
///    c. Resolve, scope and deduplicate each anchor
///    d. Check for an existing snapshot, capture if needed
///    e. Push URLs under the base path back onto the frontier
///
/// # Arguments
///
/// * `config` - The crawl configuration
/// * `reporter` - Sink for every crawl event
///
/// # Returns
///
/// * `Ok(CrawlStats)` - Crawl ran until the frontier was empty
/// * `Err(ArchiverError)` - Crawl could not be started
///
/// # Example
///
/// ```no_run
/// use site_archiver::config::CrawlConfig;
/// use site_archiver::crawler::run_crawl;
/// use site_archiver::report::TracingReporter;
/// use std::sync::Arc;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CrawlConfig::new(Url::parse("https://example.com/docs/")?);
/// let stats = run_crawl(config, Arc::new(TracingReporter)).await?;
/// println!("Archived {} pages", stats.archived);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: CrawlConfig,
    reporter: Arc<dyn Reporter>,
) -> Result<CrawlStats, ArchiverError> {
    let capture = WaybackCapture::new(&config.service, &config.user_agent)?;
    let lookup = WaybackAvailability::new(&config.service, &config.user_agent)?;

    let mut coordinator = Coordinator::new(config, capture, lookup, reporter)?;
    Ok(coordinator.run().await)
}
