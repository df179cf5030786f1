//! Reporter trait and crawl events
//!
//! This module defines the interface every component reports through and
//! the typed events it receives. Components never print directly; they hold
//! a shared `Reporter` handed to them at construction.

use chrono::{DateTime, Local};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;
use tracing::Level;

/// Everything observable that happens during a crawl
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    /// The crawl is starting from this base URL
    CrawlStarted { base_url: String },

    /// A page GET is being issued
    Requesting { url: String },

    /// One tick of the countdown before a fetch retry
    CountdownTick { remaining: u32 },

    /// A fetch is about to be retried
    Retrying { attempts_left: u32 },

    /// A fetch attempt failed at the transport level
    FetchError { url: String, error: String },

    /// Every fetch attempt failed
    FetchExhausted { url: String, attempts: u32 },

    /// The page declared a non-text content type
    NotText { url: String, content_type: String },

    /// The snapshot lookup failed and will be retried
    LookupError {
        url: String,
        error: String,
        wait: Duration,
    },

    /// The snapshot lookup ran out of attempts
    LookupExhausted { url: String },

    /// A snapshot already exists, so the URL is not captured again
    AlreadyArchived { url: String, timestamp: DateTime<Local> },

    /// The URL was passed over while the skip cursor is still unset
    Skipped { url: String },

    /// The skip target was found; archiving resumes from here
    SkipTargetReached { url: String },

    /// Capture of a discovered URL is starting
    Archiving { url: String, index: usize, total: usize },

    /// Capture of a discovered URL finished successfully
    Archived { index: usize, total: usize },

    /// Capture of a discovered URL did not succeed
    ArchiveFailed { index: usize, total: usize },

    /// The capture service stored a new snapshot
    CaptureSucceeded { url: String, archive_url: String },

    /// The capture service returned a cached snapshot
    AlreadyCached { url: String },

    /// A service error matched the ignore policy
    ServiceErrorIgnored { url: String, status: Option<u16> },

    /// A classified service error; `wait` is `None` when giving up
    ServiceError {
        url: String,
        attempt: u32,
        retries: u32,
        status: Option<u16>,
        message: String,
        wait: Option<Duration>,
    },

    /// The capture request could not connect
    ConnectionError { url: String, wait: Duration },

    /// The capture request hit a redirect storm
    TooManyRedirects { url: String, wait: Duration },

    /// The URL was pushed onto the frontier
    Queued { url: String },

    /// The URL was archived but will not be crawled into
    NotQueued { url: String },

    /// Every anchor of a popped page has been handled
    PageCompleted { url: String, total: usize },
}

impl CrawlEvent {
    /// The log level this event is emitted at by `TracingReporter`
    pub fn level(&self) -> Level {
        match self {
            Self::CountdownTick { .. } | Self::NotQueued { .. } => Level::DEBUG,
            Self::FetchError { .. }
            | Self::FetchExhausted { .. }
            | Self::NotText { .. }
            | Self::LookupError { .. }
            | Self::LookupExhausted { .. }
            | Self::ServiceError { .. }
            | Self::ConnectionError { .. }
            | Self::TooManyRedirects { .. }
            | Self::ArchiveFailed { .. } => Level::WARN,
            _ => Level::INFO,
        }
    }
}

impl fmt::Display for CrawlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrawlStarted { base_url } => write!(f, "Archiving site from {}", base_url),
            Self::Requesting { url } => write!(f, "Requesting {}", url),
            Self::CountdownTick { remaining } => write!(f, "Retrying in: {}", remaining),
            Self::Retrying { attempts_left } => {
                write!(f, "Retrying ({} left)", attempts_left)
            }
            Self::FetchError { url, error } => write!(f, "Request for {} failed: {}", url, error),
            Self::FetchExhausted { url, attempts } => {
                write!(f, "Failed to request {} after {} tries", url, attempts)
            }
            Self::NotText { url, content_type } => write!(
                f,
                "Resultant page {} was not text/html ({})",
                url, content_type
            ),
            Self::LookupError { url, error, wait } => write!(
                f,
                "Archive check for {} encountered error {}. Sleeping for {} seconds",
                url,
                error,
                wait.as_secs()
            ),
            Self::LookupExhausted { url } => write!(
                f,
                "Ran out of retries checking {}; assuming unarchived",
                url
            ),
            Self::AlreadyArchived { url, timestamp } => write!(
                f,
                "{} archived on {}. Skipping.",
                url,
                timestamp.format("%m-%d-%Y %I:%M:%S %p %Z")
            ),
            Self::Skipped { url } => write!(f, "Skipped {}", url),
            Self::SkipTargetReached { url } => {
                write!(f, "Reached skip target {}; archiving from here", url)
            }
            Self::Archiving { url, index, total } => {
                write!(f, "({}/{}): Archiving {}", index, total, url)
            }
            Self::Archived { index, total } => write!(f, "({}/{}): Archived.", index, total),
            Self::ArchiveFailed { index, total } => {
                write!(f, "({}/{}): Failed to archive.", index, total)
            }
            Self::CaptureSucceeded { url, archive_url } => {
                write!(f, "Captured {} as {}", url, archive_url)
            }
            Self::AlreadyCached { url } => write!(f, "{} already cached", url),
            Self::ServiceErrorIgnored { url, status } => match status {
                Some(code) => write!(f, "Error {} when requesting {}. Ignoring.", code, url),
                None => write!(f, "Error when requesting {}. Ignoring.", url),
            },
            Self::ServiceError {
                url,
                attempt,
                retries,
                status,
                message,
                wait,
            } => {
                write!(f, "(Try {}/{}) Capture of {} failed", attempt, retries, url)?;
                if let Some(code) = status {
                    write!(f, " with status {}", code)?;
                }
                write!(f, ": {}", message)?;
                if let Some(wait) = wait {
                    write!(f, ". Sleeping for {} seconds", wait.as_secs())?;
                }
                Ok(())
            }
            Self::ConnectionError { url, wait } => write!(
                f,
                "Capture request for {} timed out. Sleeping for {} seconds.",
                url,
                wait.as_secs()
            ),
            Self::TooManyRedirects { url, wait } => write!(
                f,
                "Capture request for {} exceeded the redirect limit. Sleeping for {} seconds.",
                url,
                wait.as_secs()
            ),
            Self::Queued { url } => write!(f, "Added {} to stack", url),
            Self::NotQueued { url } => write!(f, "Did not add {} to stack", url),
            Self::PageCompleted { url, total } => write!(
                f,
                "({}/{}): Completed archiving of URL {}",
                total, total, url
            ),
        }
    }
}

/// Sink for crawl events
///
/// Implementations must be shareable between the components of a crawl.
pub trait Reporter: Send + Sync {
    /// Records a single event
    fn report(&self, event: CrawlEvent);
}

/// Emits events through `tracing` at the level each event declares
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: CrawlEvent) {
        let level = event.level();
        if level == Level::ERROR {
            tracing::error!("{}", event);
        } else if level == Level::WARN {
            tracing::warn!("{}", event);
        } else if level == Level::INFO {
            tracing::info!("{}", event);
        } else {
            tracing::debug!("{}", event);
        }
    }
}

/// Drops every event (quiet mode)
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn report(&self, _event: CrawlEvent) {}
}

/// Keeps every event in memory, in order
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<CrawlEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events recorded so far
    pub fn events(&self) -> Vec<CrawlEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: CrawlEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
