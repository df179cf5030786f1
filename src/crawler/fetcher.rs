//! HTTP fetcher implementation
//!
//! This module handles all requests to the site being archived, including:
//! - Building the HTTP client with the configured user agent
//! - Retrying failed requests after a visible countdown
//! - Gating on the declared Content-Type
//! - Handing the body to the HTML parser

use crate::config::BackoffConfig;
use crate::crawler::parser::extract_hrefs;
use crate::report::{CrawlEvent, Reporter};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Content type assumed when a response does not declare one
const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// A fetched and parsed page
///
/// Relative hrefs are resolved by the caller against the URL that was
/// requested, not against wherever a redirect ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    /// Raw href of every anchor, in document order
    pub hrefs: Vec<String>,
}

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// Successfully fetched and parsed the page
    Page(ParsedPage),

    /// Every attempt failed at the transport level
    NoPage {
        /// Number of attempts made
        attempts: u32,
    },

    /// The declared Content-Type is not text
    NotText {
        /// The Content-Type received
        content_type: String,
    },
}

/// Builds an HTTP client for requests to the crawled site
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header value
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_archiver::crawler::build_http_client;
///
/// let client = build_http_client("WebsiteArchiver/1.0").unwrap();
/// ```
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if a Content-Type header value denotes a text document
pub fn is_text_content(content_type: &str) -> bool {
    content_type.trim().to_ascii_lowercase().starts_with("text/")
}

/// Fetches pages with retry and content-type gating
pub struct Fetcher {
    client: Client,
    retries: u32,
    backoff: BackoffConfig,
    reporter: Arc<dyn Reporter>,
}

impl Fetcher {
    pub fn new(
        client: Client,
        retries: u32,
        backoff: BackoffConfig,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            client,
            retries,
            backoff,
            reporter,
        }
    }

    /// Fetches and parses a page
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Transport error (connect, timeout, body read) | Countdown, then retry |
    /// | Content-Type not `text/*` | Immediate → NotText |
    /// | Retries exhausted | NoPage |
    ///
    /// HTTP status codes are not inspected; an error page that is text is
    /// still parsed for links.
    pub async fn fetch_page(&self, url: &Url) -> FetchResult {
        for attempt in 0..self.retries {
            if attempt > 0 {
                self.countdown(self.retries - attempt - 1).await;
            }

            self.reporter.report(CrawlEvent::Requesting {
                url: url.to_string(),
            });

            let response = match self.client.get(url.clone()).send().await {
                Ok(response) => response,
                Err(e) => {
                    self.report_error(url, &e);
                    continue;
                }
            };

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string();

            if !is_text_content(&content_type) {
                self.reporter.report(CrawlEvent::NotText {
                    url: url.to_string(),
                    content_type: content_type.clone(),
                });
                return FetchResult::NotText { content_type };
            }

            if response.url() != url {
                tracing::debug!("{} redirected to {}", url, response.url());
            }

            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    self.report_error(url, &e);
                    continue;
                }
            };

            return FetchResult::Page(ParsedPage {
                hrefs: extract_hrefs(&body),
            });
        }

        self.reporter.report(CrawlEvent::FetchExhausted {
            url: url.to_string(),
            attempts: self.retries,
        });
        FetchResult::NoPage {
            attempts: self.retries,
        }
    }

    /// Counts down before a retry, one tick per pause
    async fn countdown(&self, attempts_left: u32) {
        for remaining in (1..=self.backoff.countdown_ticks).rev() {
            self.reporter.report(CrawlEvent::CountdownTick { remaining });
            tokio::time::sleep(self.backoff.countdown_tick()).await;
        }
        self.reporter.report(CrawlEvent::Retrying { attempts_left });
    }

    fn report_error(&self, url: &Url, error: &reqwest::Error) {
        self.reporter.report(CrawlEvent::FetchError {
            url: url.to_string(),
            error: error.to_string(),
        });
    }
}
