use crate::config::types::{CrawlConfig, FileConfig, IgnorePolicy};
use crate::config::validation::validate_file;
use crate::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

/// Comma-separated integer status codes
static IGNORE_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(,[0-9]+)*$").expect("Invalid ignore list pattern"));

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(FileConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use site_archiver::config::load_config;
///
/// let file = load_config(Path::new("archiver.toml")).unwrap();
/// println!("Captures go to: {}", file.service.wayback_url);
/// ```
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let file: FileConfig = toml::from_str(&content)?;
    validate_file(&file)?;
    Ok(file)
}

/// Parses an ignore list given on the command line or in a config file
///
/// Accepts the literal `any`, an empty string (ignore nothing), or a
/// comma-separated list of integer status codes such as `429,523`.
/// Surrounding whitespace is ignored; anything else is rejected.
pub fn parse_ignore_list(input: &str) -> Result<IgnorePolicy, ConfigError> {
    let trimmed = input.trim();

    if trimmed == "any" {
        return Ok(IgnorePolicy::AllCodes);
    }

    if trimmed.is_empty() {
        return Ok(IgnorePolicy::default());
    }

    if !IGNORE_LIST.is_match(trimmed) {
        return Err(ConfigError::InvalidIgnoreList(input.to_string()));
    }

    let codes = trimmed
        .split(',')
        .map(|code| code.parse::<u16>())
        .collect::<Result<BTreeSet<u16>, _>>()
        .map_err(|_| ConfigError::InvalidIgnoreList(input.to_string()))?;

    Ok(IgnorePolicy::Codes(codes))
}

impl FromStr for IgnorePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_ignore_list(s)
    }
}

/// Copies file-provided defaults onto a crawl configuration
///
/// Call this before applying command-line flags so the flags win.
pub fn apply_file_config(config: &mut CrawlConfig, file: FileConfig) -> Result<(), ConfigError> {
    let crawl = file.crawl;

    if let Some(retries) = crawl.retries {
        config.retries = retries;
    }
    if let Some(ignore) = crawl.ignore {
        config.ignore = parse_ignore_list(&ignore)?;
    }
    if let Some(schemes) = crawl.schemes {
        config.schemes = schemes;
    }
    if let Some(user_agent) = crawl.user_agent {
        config.user_agent = user_agent;
    }
    if crawl.lookup_retries.is_some() {
        config.lookup_retries = crawl.lookup_retries;
    }
    if let Some(drop_query) = crawl.drop_query {
        config.drop_query = drop_query;
    }
    if let Some(sort_query) = crawl.sort_query {
        config.sort_query = sort_query;
    }

    config.backoff = file.backoff;
    config.service = file.service;

    Ok(())
}
