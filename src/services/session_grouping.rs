//! Session grouping engine.
//!
//! Folds raw history sessions into a day-bucketed [`SessionsFeed`]: one canonical
//! visit per URL and per (root domain, title) inside a bucket, later same-title
//! visits collected as related visits. Pure: no I/O, and deterministic for a
//! fixed [`DayBucketer`].

use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use tracing::{debug, warn};

use crate::services::url_utils::root_domain;
use crate::types::history::{Placement, SessionsFeed};
use crate::types::visit::Session;

pub const TODAY: &str = "Today";
pub const YESTERDAY: &str = "Yesterday";

/// Maps visit timestamps to day bucket labels relative to a fixed "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBucketer {
    today: NaiveDate,
    offset: FixedOffset,
}

impl DayBucketer {
    pub fn new(today: NaiveDate, offset: FixedOffset) -> Self {
        Self { today, offset }
    }

    /// Bucketer for the wall clock in the local time zone.
    pub fn local_now() -> Self {
        let now = Local::now();
        Self {
            today: now.date_naive(),
            offset: *now.offset(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Label for a millisecond timestamp, or `None` when it is out of range.
    pub fn key_for(&self, visit_time_ms: i64) -> Option<String> {
        let date = DateTime::from_timestamp_millis(visit_time_ms)?
            .with_timezone(&self.offset)
            .date_naive();

        if date == self.today {
            return Some(TODAY.to_string());
        }
        if self.today.pred_opt() == Some(date) {
            return Some(YESTERDAY.to_string());
        }
        Some(date.format("%A, %b %-d").to_string())
    }
}

/// Counters describing one grouping pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupingStats {
    pub canonical: usize,
    pub related: usize,
    pub duplicates: usize,
    /// Visits dropped because they had no URL or an unusable timestamp.
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct GroupingOutcome {
    pub feed: SessionsFeed,
    pub stats: GroupingStats,
}

/// Folds `sessions` into a copy of `existing` and returns the new snapshot.
///
/// Sessions are processed in the order given; the caller is responsible for
/// supplying batches in a consistent chronological order.
pub fn group(existing: &SessionsFeed, sessions: &[Session], bucketer: &DayBucketer) -> GroupingOutcome {
    let mut feed = existing.clone();
    let stats = fold_into(&mut feed, sessions, bucketer);
    GroupingOutcome { feed, stats }
}

/// Folds `sessions` into `feed` in place.
pub fn fold_into(feed: &mut SessionsFeed, sessions: &[Session], bucketer: &DayBucketer) -> GroupingStats {
    let mut stats = GroupingStats::default();

    for session in sessions {
        let key = match bucketer.key_for(session.visit_time) {
            Some(key) => key,
            None => {
                stats.skipped += session.visits.len();
                continue;
            }
        };

        for visit in &session.visits {
            if visit.url.trim().is_empty() {
                stats.skipped += 1;
                continue;
            }

            let mut visit = visit.clone();
            if visit.root_domain.is_empty() {
                visit.root_domain = root_domain(&visit.url);
            }

            match feed.absorb(&key, visit) {
                Placement::Duplicate => stats.duplicates += 1,
                Placement::Related(_) => stats.related += 1,
                Placement::Canonical(_) => stats.canonical += 1,
            }
        }
    }

    if stats.skipped > 0 {
        warn!(skipped = stats.skipped, "skipped malformed history records");
    }
    debug!(
        sessions = sessions.len(),
        canonical = stats.canonical,
        related = stats.related,
        duplicates = stats.duplicates,
        "grouped history sessions"
    );

    stats
}
