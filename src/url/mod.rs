//! URL handling module for Site-Archiver
//!
//! This module resolves discovered hrefs, decides whether they belong to the
//! site being archived, and canonicalizes them into the keys used for
//! duplicate suppression.

mod normalize;
mod scope;

pub use normalize::{normalize_href, NormalizeOptions};
pub use scope::{parse_base_url, path_ends_with, BaseScope};
