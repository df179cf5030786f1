//! HTML parser for extracting anchors
//!
//! Only `<a href="...">` elements matter for archival. Hrefs are returned
//! raw, in document order; resolving and scoping them is the job of
//! `crate::url::normalize_href`.

use scraper::{Html, Selector};

/// Extracts the href of every anchor element that has one
///
/// # Arguments
///
/// * `html` - The HTML content to parse
///
/// # Returns
///
/// The raw href values in document order, duplicates included
///
/// # Example
///
/// ```
/// use site_archiver::crawler::extract_hrefs;
///
/// let html = r#"<html><body><a href="/a">A</a><a>none</a><a href="b#c">B</a></body></html>"#;
/// assert_eq!(extract_hrefs(html), vec!["/a".to_string(), "b#c".to_string()]);
/// ```
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
