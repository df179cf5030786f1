//! Statistics gathered during a crawl
//!
//! The coordinator updates these counters as it makes decisions; the CLI
//! prints them once the frontier is exhausted.

use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Pages fetched and parsed
    pub pages_fetched: u64,

    /// Pages that could not be fetched after every retry
    pub pages_failed: u64,

    /// Pages skipped because their content type was not text
    pub pages_not_text: u64,

    /// In-scope URLs seen for the first time
    pub urls_discovered: u64,

    /// URLs passed over before the skip target was reached
    pub urls_skipped: u64,

    /// URLs that already had a snapshot
    pub already_archived: u64,

    /// URLs captured successfully (or treated as such in a dry run)
    pub archived: u64,

    /// URLs whose capture failed after every retry
    pub archive_failures: u64,

    /// URLs whose capture hit an ignored error code
    pub ignored: u64,

    /// URLs pushed onto the frontier
    pub queued: u64,

    /// Wall-clock time of the crawl
    pub elapsed: Duration,
}

impl CrawlStats {
    /// Creates a new empty statistics record
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of URLs a capture was attempted for
    pub fn archive_attempts(&self) -> u64 {
        self.archived + self.archive_failures + self.ignored
    }

    /// Returns the capture success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempts = self.archive_attempts();
        if attempts == 0 {
            return 0.0;
        }
        (self.archived as f64 / attempts as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Archive Statistics ===\n");

    println!("Pages:");
    println!("  Fetched: {}", stats.pages_fetched);
    println!("  Failed: {}", stats.pages_failed);
    println!("  Not text: {}", stats.pages_not_text);
    println!();

    println!("URLs:");
    println!("  Discovered: {}", stats.urls_discovered);
    println!("  Queued for crawling: {}", stats.queued);
    println!("  Skipped before resume point: {}", stats.urls_skipped);
    println!("  Already archived: {}", stats.already_archived);
    println!("  Archived: {}", stats.archived);
    println!("  Failed to archive: {}", stats.archive_failures);
    println!("  Ignored errors: {}", stats.ignored);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} captures) in {:.1}s",
        stats.success_rate(),
        stats.archived,
        stats.archive_attempts(),
        stats.elapsed.as_secs_f64()
    );
}
