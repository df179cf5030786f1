//! Site-Archiver: scoped, resumable website archival
//!
//! This crate crawls a website from a base URL, discovers same-site links,
//! and asks the Wayback Machine to capture every page that does not already
//! have a snapshot, retrying and backing off on transient failures.

pub mod archive;
pub mod config;
pub mod crawler;
pub mod report;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Archiver operations
#[derive(Debug, Error)]
pub enum ArchiverError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Snapshot lookup failed for {url}: {message}")]
    Lookup { url: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("If specified, ignore lists must be comma-separated integer error codes or \"any\", got '{0}'")]
    InvalidIgnoreList(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{CrawlConfig, IgnorePolicy};
pub use crawler::{run_crawl, Coordinator};
pub use report::{CrawlEvent, CrawlStats, Reporter};
pub use crate::url::{normalize_href, BaseScope};
