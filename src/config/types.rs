use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;
use url::Url;

/// Default User-Agent sent to the crawled site
pub const DEFAULT_USER_AGENT: &str = "WebsiteArchiver/1.0 (Preserves websites on archive.org)";

/// Schemes accepted for discovered links unless overridden
pub const DEFAULT_SCHEMES: &[&str] = &["http", "https", "ftp"];

/// Default number of attempts for page fetches and classified capture errors
pub const DEFAULT_RETRIES: u32 = 3;

/// Which Wayback status codes end a capture attempt without retrying
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnorePolicy {
    /// Every classified service error is ignored
    AllCodes,
    /// Only the listed status codes are ignored (empty means none)
    Codes(BTreeSet<u16>),
}

impl Default for IgnorePolicy {
    fn default() -> Self {
        Self::Codes(BTreeSet::new())
    }
}

impl IgnorePolicy {
    /// Returns true if a service error with this status should be skipped
    pub fn ignores(&self, status: Option<u16>) -> bool {
        match self {
            Self::AllCodes => true,
            Self::Codes(codes) => status.is_some_and(|code| codes.contains(&code)),
        }
    }
}

/// Sleep durations used between retries
///
/// All values are in seconds so they can be written directly in the TOML
/// `[backoff]` table. Tests set them to zero.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BackoffConfig {
    /// Number of countdown ticks before a page fetch retry
    pub countdown_ticks: u32,

    /// Length of a single countdown tick
    pub countdown_tick_secs: u64,

    /// Pause after a failed snapshot lookup
    pub lookup_retry_secs: u64,

    /// Pause after a classified Wayback runtime error
    pub service_error_secs: u64,

    /// Pause after a connection failure while capturing
    pub connection_error_secs: u64,

    /// Pause after a redirect storm while capturing
    pub redirect_error_secs: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            countdown_ticks: 3,
            countdown_tick_secs: 1,
            lookup_retry_secs: 5,
            service_error_secs: 60,
            connection_error_secs: 30,
            redirect_error_secs: 120,
        }
    }
}

impl BackoffConfig {
    /// A backoff with every pause set to zero, keeping the countdown ticks
    pub fn immediate() -> Self {
        Self {
            countdown_tick_secs: 0,
            lookup_retry_secs: 0,
            service_error_secs: 0,
            connection_error_secs: 0,
            redirect_error_secs: 0,
            ..Self::default()
        }
    }

    pub fn countdown_tick(&self) -> Duration {
        Duration::from_secs(self.countdown_tick_secs)
    }

    pub fn lookup_retry(&self) -> Duration {
        Duration::from_secs(self.lookup_retry_secs)
    }

    pub fn service_error(&self) -> Duration {
        Duration::from_secs(self.service_error_secs)
    }

    pub fn connection_error(&self) -> Duration {
        Duration::from_secs(self.connection_error_secs)
    }

    pub fn redirect_error(&self) -> Duration {
        Duration::from_secs(self.redirect_error_secs)
    }
}

/// Wayback Machine endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServiceConfig {
    /// Base URL of the Wayback Machine (captures go to `{wayback-url}/save/`)
    pub wayback_url: String,

    /// Availability API used to look up the closest snapshot
    pub availability_url: String,

    /// Request timeout for both endpoints
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            wayback_url: "https://web.archive.org".to_string(),
            availability_url: "https://archive.org/wayback/available".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Crawl defaults that may be supplied by a config file
///
/// Every field is optional; command-line flags take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlDefaults {
    pub retries: Option<u32>,
    pub ignore: Option<String>,
    pub schemes: Option<Vec<String>>,
    pub user_agent: Option<String>,
    pub lookup_retries: Option<u32>,
    pub drop_query: Option<bool>,
    pub sort_query: Option<bool>,
}

/// Contents of a TOML configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub crawl: CrawlDefaults,
    pub backoff: BackoffConfig,
    pub service: ServiceConfig,
}

/// Every option that drives a crawl
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Where the crawl starts; also defines the host and path scope
    pub base_url: Url,

    /// Archive links on the base page but never step into them
    pub as_index: bool,

    /// Attempts per page fetch and per classified capture error
    pub retries: u32,

    /// Path suffix to reach before archiving starts
    pub skip_to: Option<String>,

    /// Status codes that end a capture without retrying
    pub ignore: IgnorePolicy,

    /// Treat captures as successful without contacting the Wayback Machine
    pub dry_run: bool,

    /// Strip the query string from discovered URLs
    pub drop_query: bool,

    /// Sort query parameters so reordered queries compare equal
    pub sort_query: bool,

    /// Capture even when a snapshot already exists
    pub rearchive: bool,

    /// Acceptable schemes for discovered links
    pub schemes: Vec<String>,

    /// User-Agent sent to the crawled site
    pub user_agent: String,

    /// Report decisions that are normally silent
    pub verbose: bool,

    /// Ceiling for snapshot lookup attempts (`None` retries forever)
    pub lookup_retries: Option<u32>,

    pub backoff: BackoffConfig,

    pub service: ServiceConfig,
}

impl CrawlConfig {
    /// Creates a configuration with default options for the given base URL
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            as_index: false,
            retries: DEFAULT_RETRIES,
            skip_to: None,
            ignore: IgnorePolicy::default(),
            dry_run: false,
            drop_query: false,
            sort_query: false,
            rearchive: false,
            schemes: DEFAULT_SCHEMES.iter().map(|s| s.to_string()).collect(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            verbose: false,
            lookup_retries: None,
            backoff: BackoffConfig::default(),
            service: ServiceConfig::default(),
        }
    }
}
