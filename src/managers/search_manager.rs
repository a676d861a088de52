//! Search feed state.
//!
//! While a query has results, the search feed takes the place of the displayed
//! view's feed. Results are first matched locally as the user types and are
//! replaced by the host's results when those arrive for the same query.

use tracing::debug;

use crate::types::feed::{FeedEntry, FeedIdentity};
use crate::types::object::LinkObject;

/// Case-insensitive substring match on title or URL.
pub fn matches_query<T: FeedEntry>(entry: &T, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    entry.title().to_lowercase().contains(&needle) || entry.url().to_lowercase().contains(&needle)
}

/// Trait defining search feed operations.
pub trait SearchManagerTrait {
    fn query(&self) -> &str;
    /// Results of the active query; `None` while no search is showing.
    fn results(&self) -> Option<&[LinkObject]>;
    fn is_active(&self) -> bool;
    /// Starts (or replaces) the search with locally matched results. A blank
    /// query clears the search. Returns whether the feed changed.
    fn set_query(&mut self, query: &str, local: Vec<LinkObject>) -> bool;
    /// Host results for `query`. Dropped when the user has typed on since.
    fn apply_results(&mut self, query: &str, results: Vec<LinkObject>) -> bool;
    fn clear(&mut self) -> bool;
    /// Identity of the current result set. Every new set gets its own, so
    /// indices from one set never carry over to the next.
    fn feed_identity(&self) -> Option<FeedIdentity>;
}

#[derive(Debug, Default)]
pub struct SearchManager {
    query: String,
    results: Option<Vec<LinkObject>>,
    result_set: u64,
}

impl SearchManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn replace(&mut self, results: Vec<LinkObject>) {
        self.result_set += 1;
        debug!(query = %self.query, results = results.len(), set = self.result_set, "search results replaced");
        self.results = Some(results);
    }
}

impl SearchManagerTrait for SearchManager {
    fn query(&self) -> &str {
        &self.query
    }

    fn results(&self) -> Option<&[LinkObject]> {
        self.results.as_deref()
    }

    fn is_active(&self) -> bool {
        self.results.is_some()
    }

    fn set_query(&mut self, query: &str, local: Vec<LinkObject>) -> bool {
        if query.trim().is_empty() {
            return self.clear();
        }
        if self.query == query && self.results.as_ref() == Some(&local) {
            return false;
        }
        self.query = query.to_string();
        self.replace(local);
        true
    }

    fn apply_results(&mut self, query: &str, results: Vec<LinkObject>) -> bool {
        if !self.is_active() || self.query != query {
            debug!(query, current = %self.query, "stale search results dropped");
            return false;
        }
        self.replace(results);
        true
    }

    fn clear(&mut self) -> bool {
        let was_active = self.results.take().is_some();
        self.query.clear();
        was_active
    }

    fn feed_identity(&self) -> Option<FeedIdentity> {
        self.results.as_ref()?;
        Some(FeedIdentity::new(
            &format!("search:{}#{}", self.query, self.result_set),
            self.result_set,
        ))
    }
}
