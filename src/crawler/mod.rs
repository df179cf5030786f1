//! Crawler module for page fetching and archive orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with countdown retries and content-type gating
//! - Anchor extraction from HTML
//! - The frontier stack, visited set and skip cursor
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, is_text_content, FetchResult, Fetcher, ParsedPage};
pub use frontier::{Frontier, SkipCursor};
pub use parser::extract_hrefs;
