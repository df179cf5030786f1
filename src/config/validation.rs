use crate::config::parser::parse_ignore_list;
use crate::config::types::{CrawlConfig, FileConfig, ServiceConfig};
use crate::ConfigError;
use url::Url;

/// Validates a fully assembled crawl configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.retries < 1 {
        return Err(ConfigError::Validation(format!(
            "retries must be >= 1, got {}",
            config.retries
        )));
    }

    if config.lookup_retries == Some(0) {
        return Err(ConfigError::Validation(
            "lookup_retries must be >= 1 when set".to_string(),
        ));
    }

    validate_schemes(&config.schemes)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if let Some(skip_to) = &config.skip_to {
        if skip_to.trim_matches('/').is_empty() {
            return Err(ConfigError::Validation(format!(
                "skip_to must name a path suffix, got '{}'",
                skip_to
            )));
        }
    }

    validate_service_config(&config.service)?;

    Ok(())
}

/// Validates a configuration file before it is merged
pub fn validate_file(file: &FileConfig) -> Result<(), ConfigError> {
    if let Some(retries) = file.crawl.retries {
        if retries < 1 {
            return Err(ConfigError::Validation(format!(
                "retries must be >= 1, got {}",
                retries
            )));
        }
    }

    if let Some(ignore) = &file.crawl.ignore {
        parse_ignore_list(ignore)?;
    }

    if let Some(schemes) = &file.crawl.schemes {
        validate_schemes(schemes)?;
    }

    validate_service_config(&file.service)
}

/// Validates the list of acceptable link schemes
fn validate_schemes(schemes: &[String]) -> Result<(), ConfigError> {
    if schemes.is_empty() {
        return Err(ConfigError::Validation(
            "at least one scheme must be accepted".to_string(),
        ));
    }

    for scheme in schemes {
        let valid = scheme
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase())
            && scheme
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "+-.".contains(c));
        if !valid {
            return Err(ConfigError::Validation(format!(
                "Invalid scheme '{}': schemes must be lowercase",
                scheme
            )));
        }
    }

    Ok(())
}

/// Validates the Wayback endpoints
fn validate_service_config(config: &ServiceConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("wayback_url", &config.wayback_url),
        ("availability_url", &config.availability_url),
    ] {
        let url = Url::parse(value)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", name, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "{} must use http or https, got '{}'",
                name, value
            )));
        }
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}
