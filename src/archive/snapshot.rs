//! Snapshot lookup against the Wayback availability API

use crate::config::{BackoffConfig, ServiceConfig};
use crate::report::{CrawlEvent, Reporter};
use crate::ArchiverError;
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Length of a Wayback timestamp (`YYYYMMDDHHMMSS`)
const TIMESTAMP_LEN: usize = 14;

/// Anything that can tell whether a URL already has a snapshot
#[async_trait]
pub trait SnapshotLookup: Send + Sync {
    /// Returns the time of the closest snapshot of `url`, if there is one
    ///
    /// An `Err` means the service could not be asked; the caller retries.
    async fn closest_snapshot(&self, url: &str) -> Result<Option<DateTime<Local>>, ArchiverError>;
}

/// Lookup client for `archive.org/wayback/available`
#[derive(Debug, Clone)]
pub struct WaybackAvailability {
    client: Client,
    endpoint: String,
}

impl WaybackAvailability {
    /// Creates a lookup client for the configured availability endpoint
    pub fn new(config: &ServiceConfig, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.availability_url.clone(),
        })
    }
}

#[async_trait]
impl SnapshotLookup for WaybackAvailability {
    async fn closest_snapshot(&self, url: &str) -> Result<Option<DateTime<Local>>, ArchiverError> {
        let body = self
            .client
            .get(&self.endpoint)
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|source| ArchiverError::Http {
                url: url.to_string(),
                source,
            })?
            .text()
            .await
            .map_err(|source| ArchiverError::Http {
                url: url.to_string(),
                source,
            })?;

        parse_availability(&body).map_err(|e| ArchiverError::Lookup {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Extracts the closest snapshot time from an availability response body
///
/// Returns `Ok(None)` for any well-formed response without a valid
/// `archived_snapshots.closest.timestamp`, and `Err` only when the body is
/// not JSON at all.
pub fn parse_availability(body: &str) -> Result<Option<DateTime<Local>>, serde_json::Error> {
    let data: Value = serde_json::from_str(body)?;

    let timestamp = match data.pointer("/archived_snapshots/closest/timestamp") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Ok(None),
    };

    Ok(parse_timestamp(&timestamp))
}

/// Parses a 14-digit Wayback timestamp (UTC) into local time
pub fn parse_timestamp(timestamp: &str) -> Option<DateTime<Local>> {
    if timestamp.len() != TIMESTAMP_LEN || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let naive = NaiveDateTime::parse_from_str(timestamp, "%Y%m%d%H%M%S").ok()?;
    Some(Utc.from_utc_datetime(&naive).with_timezone(&Local))
}

/// Retrying wrapper around a `SnapshotLookup`
///
/// Lookup failures are retried after a fixed pause. Without a ceiling the
/// lookup is retried until it succeeds; with one, running out of attempts
/// counts as "not archived".
pub struct SnapshotChecker<L> {
    lookup: L,
    max_attempts: Option<u32>,
    backoff: BackoffConfig,
    reporter: Arc<dyn Reporter>,
}

impl<L: SnapshotLookup> SnapshotChecker<L> {
    pub fn new(
        lookup: L,
        max_attempts: Option<u32>,
        backoff: BackoffConfig,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            lookup,
            max_attempts,
            backoff,
            reporter,
        }
    }

    /// Returns the snapshot time of `url`, or `None` if it is not archived
    pub async fn is_archived(&self, url: &str) -> Option<DateTime<Local>> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.lookup.closest_snapshot(url).await {
                Ok(snapshot) => return snapshot,
                Err(e) => {
                    let wait = self.backoff.lookup_retry();
                    self.reporter.report(CrawlEvent::LookupError {
                        url: url.to_string(),
                        error: e.to_string(),
                        wait,
                    });

                    if self.max_attempts.is_some_and(|max| attempts >= max) {
                        self.reporter.report(CrawlEvent::LookupExhausted {
                            url: url.to_string(),
                        });
                        return None;
                    }

                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}
