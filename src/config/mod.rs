//! Configuration module for Site-Archiver
//!
//! This module holds the crawl options, the ignore policy for Wayback errors,
//! retry backoff timings and service endpoints. Options come from the command
//! line, optionally layered over a TOML configuration file.
//!
//! # Example
//!
//! ```no_run
//! use site_archiver::config::{apply_file_config, load_config, CrawlConfig};
//! use std::path::Path;
//! use url::Url;
//!
//! let mut config = CrawlConfig::new(Url::parse("https://example.com/docs/").unwrap());
//! let file = load_config(Path::new("archiver.toml")).unwrap();
//! apply_file_config(&mut config, file).unwrap();
//! println!("Retrying each page {} times", config.retries);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BackoffConfig, CrawlConfig, CrawlDefaults, FileConfig, IgnorePolicy, ServiceConfig,
    DEFAULT_RETRIES, DEFAULT_SCHEMES, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{apply_file_config, load_config, parse_ignore_list};
pub use validation::validate;
