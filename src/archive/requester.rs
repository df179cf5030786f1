//! Capture retry state machine
//!
//! # Retry Logic
//!
//! | Outcome | Action |
//! |---------|--------|
//! | Success | Done → Archived |
//! | AlreadyCached | Done → Cached |
//! | ServiceError, ignored by policy | Done → Ignored (no sleep) |
//! | ServiceError | Count a try; Failed at the ceiling, else sleep and retry |
//! | Connection error | Sleep and retry, not counted |
//! | Too many redirects | Sleep and retry, not counted |

use crate::archive::capture::{CaptureClient, CaptureOutcome, TransientKind};
use crate::config::{BackoffConfig, IgnorePolicy};
use crate::report::{CrawlEvent, Reporter};
use std::sync::Arc;

/// Final result of archiving one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveStatus {
    /// A new snapshot was stored
    Archived,

    /// The service already had a snapshot
    Cached,

    /// A service error matched the ignore policy
    Ignored { status: Option<u16> },

    /// Every counted attempt ended in a service error
    Failed { attempts: u32 },
}

/// Requests captures and retries them according to the error class
pub struct ArchiveRequester<C> {
    client: C,
    retries: u32,
    ignore: IgnorePolicy,
    backoff: BackoffConfig,
    reporter: Arc<dyn Reporter>,
}

impl<C: CaptureClient> ArchiveRequester<C> {
    pub fn new(
        client: C,
        retries: u32,
        ignore: IgnorePolicy,
        backoff: BackoffConfig,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            client,
            retries,
            ignore,
            backoff,
            reporter,
        }
    }

    /// The capture client this requester drives
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Archives `url`, retrying until it succeeds or fails for good
    ///
    /// Only classified service errors count against the retry ceiling;
    /// connection failures and redirect storms are retried indefinitely.
    pub async fn archive(&self, url: &str) -> ArchiveStatus {
        let mut tries = 0;

        loop {
            match self.client.capture(url).await {
                CaptureOutcome::Success { archive_url } => {
                    self.reporter.report(CrawlEvent::CaptureSucceeded {
                        url: url.to_string(),
                        archive_url,
                    });
                    return ArchiveStatus::Archived;
                }

                CaptureOutcome::AlreadyCached { .. } => {
                    self.reporter.report(CrawlEvent::AlreadyCached {
                        url: url.to_string(),
                    });
                    return ArchiveStatus::Cached;
                }

                CaptureOutcome::ServiceError { status, message } => {
                    if self.ignore.ignores(status) {
                        self.reporter.report(CrawlEvent::ServiceErrorIgnored {
                            url: url.to_string(),
                            status,
                        });
                        return ArchiveStatus::Ignored { status };
                    }

                    tries += 1;
                    let exhausted = tries >= self.retries;
                    let wait = (!exhausted).then(|| self.backoff.service_error());

                    self.reporter.report(CrawlEvent::ServiceError {
                        url: url.to_string(),
                        attempt: tries,
                        retries: self.retries,
                        status,
                        message,
                        wait,
                    });

                    match wait {
                        Some(wait) => tokio::time::sleep(wait).await,
                        None => return ArchiveStatus::Failed { attempts: tries },
                    }
                }

                CaptureOutcome::TransientError(TransientKind::Connection) => {
                    let wait = self.backoff.connection_error();
                    self.reporter.report(CrawlEvent::ConnectionError {
                        url: url.to_string(),
                        wait,
                    });
                    tokio::time::sleep(wait).await;
                }

                CaptureOutcome::TransientError(TransientKind::TooManyRedirects) => {
                    let wait = self.backoff.redirect_error();
                    self.reporter.report(CrawlEvent::TooManyRedirects {
                        url: url.to_string(),
                        wait,
                    });
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}
