use crate::{UrlError, UrlResult};
use url::Url;

/// The fixed crawl boundary derived from the base URL
///
/// Holds the host (and explicit port) every discovered link must share with
/// the base, and the path prefix a link must start with to be crawled into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseScope {
    base: Url,
    host: Option<String>,
    port: Option<u16>,
    path_prefix: String,
}

impl BaseScope {
    /// Builds the scope for a crawl starting at `base`
    pub fn new(base: &Url) -> Self {
        Self {
            base: base.clone(),
            host: base.host_str().map(str::to_string),
            port: base.port(),
            path_prefix: base.path().to_string(),
        }
    }

    /// Returns true if the base itself is a telephone link
    ///
    /// Nothing is ever in scope for such a base.
    pub fn is_telephone(&self) -> bool {
        self.base.scheme().eq_ignore_ascii_case("tel")
    }

    /// Returns true if `url` has no host or the same host and port as the base
    pub fn is_same_site(&self, url: &Url) -> bool {
        match url.host_str() {
            None => true,
            Some(host) => self.host.as_deref() == Some(host) && url.port() == self.port,
        }
    }

    /// Returns true if `url` lies under the base path and may be crawled into
    pub fn in_depth_scope(&self, url: &Url) -> bool {
        url.path().starts_with(&self.path_prefix)
    }
}

/// Schemes a crawl may start from
const BASE_SCHEMES: &[&str] = &["http", "https", "ftp", "tel"];

/// Parses the URL a crawl starts from
///
/// `tel:` bases are accepted but put nothing in scope.
pub fn parse_base_url(input: &str) -> UrlResult<Url> {
    let url = Url::parse(input.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", input, e)))?;

    if !BASE_SCHEMES.contains(&url.scheme()) {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.scheme() != "tel" && url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Returns true if the path of `url` ends with `suffix`, ignoring slashes at both ends
pub fn path_ends_with(url: &Url, suffix: &str) -> bool {
    url.path()
        .trim_matches('/')
        .ends_with(suffix.trim_matches('/'))
}
