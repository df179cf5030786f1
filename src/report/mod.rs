//! Reporting module for crawl progress and results
//!
//! This module handles:
//! - The `Reporter` interface every component logs through
//! - Tracing-backed, silent and recording reporters
//! - Crawl statistics and their final printout

pub mod stats;
mod traits;

pub use stats::{print_statistics, CrawlStats};
pub use traits::{CrawlEvent, RecordingReporter, Reporter, SilentReporter, TracingReporter};
