use crate::url::scope::BaseScope;
use url::Url;

/// Options controlling which links are accepted and how they are canonicalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Schemes a resolved link may use
    pub schemes: Vec<String>,

    /// Strip the query string entirely
    pub drop_query: bool,

    /// Sort query parameters by key so reordered queries compare equal
    pub sort_query: bool,
}

impl NormalizeOptions {
    /// Returns true if links with this scheme may be followed
    pub fn accepts_scheme(&self, scheme: &str) -> bool {
        self.schemes.iter().any(|s| s.eq_ignore_ascii_case(scheme))
    }
}

/// Resolves a raw href and decides whether it is in scope
///
/// # Normalization Steps
///
/// 1. Reject everything if the base URL is a telephone link
/// 2. Resolve the href against the page it was found on
/// 3. Reject if the host (or explicit port) differs from the base URL's
/// 4. Reject if the scheme is not an acceptable one
/// 5. Remove the fragment (everything after #)
/// 6. Remove the query string when `drop_query` is set, otherwise sort
///    its parameters when `sort_query` is set
///
/// The resulting URL's string form is the key used for duplicate
/// suppression, so hrefs that differ only by fragment map to the same URL.
///
/// # Arguments
///
/// * `scope` - The crawl boundary derived from the base URL
/// * `page_url` - The page the href was found on
/// * `href` - The raw href attribute value
/// * `options` - Scheme and query handling options
///
/// # Returns
///
/// * `Some(Url)` - The normalized, in-scope URL
/// * `None` - The href is out of scope or could not be resolved
///
/// # Examples
///
/// ```
/// use site_archiver::url::{normalize_href, BaseScope, NormalizeOptions};
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/").unwrap();
/// let scope = BaseScope::new(&base);
/// let options = NormalizeOptions {
///     schemes: vec!["http".to_string(), "https".to_string()],
///     drop_query: false,
///     sort_query: false,
/// };
///
/// let url = normalize_href(&scope, &base, "b#frag", &options).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs/b");
/// assert!(normalize_href(&scope, &base, "https://other.com/x", &options).is_none());
/// ```
pub fn normalize_href(
    scope: &BaseScope,
    page_url: &Url,
    href: &str,
    options: &NormalizeOptions,
) -> Option<Url> {
    if scope.is_telephone() {
        return None;
    }

    let mut url = page_url.join(href.trim()).ok()?;

    if !scope.is_same_site(&url) {
        return None;
    }

    if !options.accepts_scheme(url.scheme()) {
        return None;
    }

    url.set_fragment(None);

    if options.drop_query {
        url.set_query(None);
    } else if options.sort_query && url.query().is_some() {
        sort_query_params(&mut url);
    }

    Some(url)
}

/// Sorts query parameters by key, keeping the order of repeated keys
fn sort_query_params(url: &mut Url) {
    let mut params: Vec<(String, String)> = url.query_pairs().into_owned().collect();

    if params.is_empty() {
        url.set_query(None);
        return;
    }

    params.sort_by(|a, b| a.0.cmp(&b.0));
    url.query_pairs_mut().clear().extend_pairs(params);
}
