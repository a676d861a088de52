//! History feed state for the "Recent" view.
//!
//! Accumulates grouping-engine output across paginated "load more" calls. The
//! manager never fetches by itself: pages arrive through [`HistorySource`] or
//! are handed over directly by the host.

use tracing::{debug, info, warn};

use crate::services::session_grouping::{self, DayBucketer, GroupingStats};
use crate::types::errors::FeedError;
use crate::types::history::SessionsFeed;
use crate::types::visit::{Session, Visit};

/// Supplies the next page of history sessions, in chronological fetch order.
pub trait HistorySource {
    fn fetch_next_batch(&mut self) -> Result<Vec<Session>, FeedError>;
}

/// Trait defining history feed operations.
pub trait HistoryManagerTrait {
    fn sessions_feed(&self) -> &SessionsFeed;
    fn feed_keys(&self) -> Vec<&str>;
    fn load_more(&mut self, sessions: &[Session], bucketer: &DayBucketer) -> GroupingStats;
    fn load_more_from(
        &mut self,
        source: &mut dyn HistorySource,
        bucketer: &DayBucketer,
    ) -> Result<GroupingStats, FeedError>;
    fn visit_at(&self, index: usize) -> Option<&Visit>;
    fn generation(&self) -> u64;
    fn is_exhausted(&self) -> bool;
    fn is_fetching_first_batch(&self) -> bool;
    fn reset(&mut self);
}

/// In-memory history feed manager.
pub struct HistoryManager {
    feed: SessionsFeed,
    generation: u64,
    batches_loaded: usize,
    exhausted: bool,
    skipped_total: usize,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self {
            feed: SessionsFeed::new(),
            generation: 0,
            batches_loaded: 0,
            exhausted: false,
            skipped_total: 0,
        }
    }

    /// Total malformed records skipped since the last reset.
    pub fn skipped_total(&self) -> usize {
        self.skipped_total
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryManagerTrait for HistoryManager {
    fn sessions_feed(&self) -> &SessionsFeed {
        &self.feed
    }

    fn feed_keys(&self) -> Vec<&str> {
        self.feed.keys()
    }

    /// Merges one page of sessions. An empty page marks the history as exhausted
    /// and leaves the feed (and its generation) untouched.
    fn load_more(&mut self, sessions: &[Session], bucketer: &DayBucketer) -> GroupingStats {
        if sessions.is_empty() {
            if !self.exhausted {
                info!(batches = self.batches_loaded, "history exhausted");
            }
            self.exhausted = true;
            return GroupingStats::default();
        }

        let outcome = session_grouping::group(&self.feed, sessions, bucketer);
        self.feed = outcome.feed;
        self.generation += 1;
        self.batches_loaded += 1;
        self.skipped_total += outcome.stats.skipped;

        debug!(
            generation = self.generation,
            buckets = self.feed.buckets().len(),
            visits = self.feed.len(),
            "history feed updated"
        );
        outcome.stats
    }

    /// Fetches a page from `source` and merges it. A failed fetch leaves the
    /// feed as it was so the caller can retry.
    fn load_more_from(
        &mut self,
        source: &mut dyn HistorySource,
        bucketer: &DayBucketer,
    ) -> Result<GroupingStats, FeedError> {
        let sessions = source.fetch_next_batch().map_err(|e| {
            warn!(error = %e, "history page fetch failed");
            e
        })?;
        Ok(self.load_more(&sessions, bucketer))
    }

    fn visit_at(&self, index: usize) -> Option<&Visit> {
        self.feed.visit_at(index)
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn is_fetching_first_batch(&self) -> bool {
        self.batches_loaded == 0 && !self.exhausted
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
