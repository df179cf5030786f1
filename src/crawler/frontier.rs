//! Frontier, visited set and skip cursor
//!
//! The frontier is a stack: the most recently discovered in-scope URL is
//! crawled next. The visited set holds the canonical string of every URL
//! seen so far, and a URL enters it exactly once, when first discovered.

use crate::url::path_ends_with;
use std::collections::HashSet;
use url::Url;

/// Stack of URLs waiting to be crawled plus the set of URLs already seen
#[derive(Debug, Clone)]
pub struct Frontier {
    /// URLs waiting to be crawled (last in, first out)
    stack: Vec<Url>,

    /// Canonical strings of every URL discovered so far
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier seeded with the base URL, which counts as visited
    pub fn new(base: &Url) -> Self {
        let mut visited = HashSet::new();
        visited.insert(base.as_str().to_string());

        Self {
            stack: vec![base.clone()],
            visited,
        }
    }

    /// Removes the most recently pushed URL
    pub fn pop(&mut self) -> Option<Url> {
        self.stack.pop()
    }

    /// Pushes a URL for crawling
    ///
    /// The URL must already have been marked visited.
    pub fn push(&mut self, url: Url) {
        debug_assert!(self.visited.contains(url.as_str()));
        self.stack.push(url);
    }

    /// Marks a URL visited, returning false if it already was
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.as_str().to_string())
    }

    /// Returns true if the URL has already been discovered
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    /// Number of URLs waiting to be crawled
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Returns true if nothing is left to crawl
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Number of distinct URLs discovered, the base included
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

/// Resume marker that holds back archival until a path suffix is seen
///
/// Once set, the cursor never unsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipCursor {
    target: Option<String>,
    done: bool,
}

impl SkipCursor {
    /// Creates a cursor; without a target it starts out done
    pub fn new(target: Option<&str>) -> Self {
        Self {
            target: target.map(str::to_string),
            done: target.is_none(),
        }
    }

    /// Returns true once archiving may proceed
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Checks a newly discovered URL against the target
    ///
    /// Returns true if archiving may proceed from this URL on.
    pub fn observe(&mut self, url: &Url) -> bool {
        if !self.done {
            if let Some(target) = &self.target {
                self.done = path_ends_with(url, target);
            }
        }
        self.done
    }
}
