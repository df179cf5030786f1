//! Wayback Machine capture client
//!
//! Captures are requested with a GET to `{wayback}/save/{url}`. The response
//! is classified into a `CaptureOutcome` instead of raising errors, so the
//! requester can drive its retry state machine from plain values.

use crate::config::ServiceConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_LOCATION, LINK};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Header the Wayback Machine sets when a capture fails on its side
const RUNTIME_ERROR_HEADER: &str = "x-archive-wayback-runtime-error";

/// Header that reports whether the returned snapshot came from cache
const PAGE_CACHE_HEADER: &str = "x-page-cache";

/// Status codes that always mean the capture did not happen
const FAILURE_STATUSES: &[u16] = &[403, 502, 520];

/// Maximum redirects followed before a capture counts as a redirect storm
const MAX_REDIRECTS: usize = 30;

/// Network failures that are always worth retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    /// Connection refused, reset or timed out
    Connection,
    /// The redirect limit was exceeded
    TooManyRedirects,
}

/// Result of a single capture request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A new snapshot was stored
    Success { archive_url: String },

    /// The service handed back a snapshot it already had
    AlreadyCached { archive_url: String },

    /// The service reported an error, usually with an HTTP status
    ServiceError {
        status: Option<u16>,
        message: String,
    },

    /// The request never got a usable answer
    TransientError(TransientKind),
}

/// Anything that can ask an archival service to capture a URL
#[async_trait]
pub trait CaptureClient: Send + Sync {
    /// Requests a capture of `url`
    async fn capture(&self, url: &str) -> CaptureOutcome;
}

/// Capture client for the Wayback Machine's Save Page Now endpoint
#[derive(Debug, Clone)]
pub struct WaybackCapture {
    client: Client,
    wayback_url: String,
}

impl WaybackCapture {
    /// Creates a capture client for the configured Wayback endpoint
    ///
    /// # Arguments
    ///
    /// * `config` - The service endpoints and timeout
    /// * `user_agent` - User-Agent sent to the Wayback Machine
    ///
    /// # Returns
    ///
    /// * `Ok(WaybackCapture)` - Successfully built client
    /// * `Err(reqwest::Error)` - Failed to build the HTTP client
    pub fn new(config: &ServiceConfig, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self {
            client,
            wayback_url: config.wayback_url.trim_end_matches('/').to_string(),
        })
    }

    /// The URL a capture of `url` is requested from
    pub fn save_url(&self, url: &str) -> String {
        format!("{}/save/{}", self.wayback_url, url)
    }
}

#[async_trait]
impl CaptureClient for WaybackCapture {
    async fn capture(&self, url: &str) -> CaptureOutcome {
        match self.client.get(self.save_url(url)).send().await {
            Ok(response) => {
                classify_response(response.status().as_u16(), response.headers(), &self.wayback_url)
            }
            Err(e) => classify_transport_error(&e),
        }
    }
}

/// Maps a transport-level error to a transient outcome
fn classify_transport_error(error: &reqwest::Error) -> CaptureOutcome {
    if error.is_redirect() {
        CaptureOutcome::TransientError(TransientKind::TooManyRedirects)
    } else {
        CaptureOutcome::TransientError(TransientKind::Connection)
    }
}

/// Classifies a Save Page Now response
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | Runtime error header present | ServiceError |
/// | Status 403, 502 or 520 | ServiceError |
/// | No Content-Location and no memento Link | ServiceError |
/// | `X-Page-Cache: HIT` | AlreadyCached |
/// | Otherwise | Success |
pub fn classify_response(status: u16, headers: &HeaderMap, wayback_url: &str) -> CaptureOutcome {
    if let Some(value) = headers.get(RUNTIME_ERROR_HEADER) {
        return CaptureOutcome::ServiceError {
            status: Some(status),
            message: value.to_str().unwrap_or("runtime error").to_string(),
        };
    }

    if FAILURE_STATUSES.contains(&status) {
        return CaptureOutcome::ServiceError {
            status: Some(status),
            message: format!("capture refused with HTTP {}", status),
        };
    }

    let location = headers
        .get(CONTENT_LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            headers
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(last_memento)
        });

    let Some(location) = location else {
        return CaptureOutcome::ServiceError {
            status: Some(status),
            message: "response did not include an archive location".to_string(),
        };
    };

    let archive_url = Url::parse(wayback_url)
        .and_then(|base| base.join(&location))
        .map(String::from)
        .unwrap_or(location);

    let cached = headers
        .get(PAGE_CACHE_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("HIT"));

    if cached {
        CaptureOutcome::AlreadyCached { archive_url }
    } else {
        CaptureOutcome::Success { archive_url }
    }
}

/// Returns the target of the last `memento` relation in a Link header
///
/// Link parameters (such as `datetime`) may contain commas, so entries are
/// delimited by their `<...>` targets rather than by splitting on commas.
fn last_memento(link: &str) -> Option<String> {
    let mut found = None;
    let mut rest = link;

    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let end = after.find('>')?;
        let target = &after[..end];
        let tail = &after[end + 1..];
        let params = match tail.find('<') {
            Some(next) => &tail[..next],
            None => tail,
        };

        let is_memento = params.split(';').any(|param| {
            param
                .trim()
                .strip_prefix("rel=")
                .is_some_and(|rel| rel.trim_matches('"').split_whitespace().any(|r| r == "memento"))
        });

        if is_memento {
            found = Some(target.to_string());
        }

        rest = tail;
    }

    found
}
