use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::visit::Visit;

/// Visits of one day, in first-seen order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayBucket {
    pub key: String,
    pub visits: Vec<Visit>,
}

/// Where an absorbed visit ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The URL was already present in the bucket; nothing changed.
    Duplicate,
    /// Appended to the `related_visits` of the canonical visit at this position.
    Related(usize),
    /// Became a new canonical entry at this position.
    Canonical(usize),
}

/// Day-bucketed, de-duplicated history feed.
///
/// Buckets keep first-encounter order across incremental merges. Per-bucket
/// URL and (root domain, title) indexes travel with the feed so later merges
/// see everything placed by earlier ones.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionsFeed {
    buckets: Vec<DayBucket>,
    #[serde(skip)]
    seen_urls: Vec<HashSet<String>>,
    #[serde(skip)]
    canonical: Vec<HashMap<(String, String), usize>>,
}

impl PartialEq for SessionsFeed {
    fn eq(&self, other: &Self) -> bool {
        self.buckets == other.buckets
    }
}

impl SessionsFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket keys in first-seen order.
    pub fn keys(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.key.as_str()).collect()
    }

    pub fn buckets(&self) -> &[DayBucket] {
        &self.buckets
    }

    pub fn bucket(&self, key: &str) -> Option<&[Visit]> {
        self.buckets
            .iter()
            .find(|b| b.key == key)
            .map(|b| b.visits.as_slice())
    }

    /// Number of canonical visits across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.visits.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves a flat navigation index (bucket by bucket) to its visit.
    pub fn visit_at(&self, index: usize) -> Option<&Visit> {
        let mut offset = 0;
        for bucket in &self.buckets {
            let next = offset + bucket.visits.len();
            if index < next {
                return bucket.visits.get(index - offset);
            }
            offset = next;
        }
        None
    }

    /// Whether `url` was placed in bucket `key`, as canonical or related visit.
    pub fn contains_url(&self, key: &str, url: &str) -> bool {
        self.position(key)
            .map(|i| self.seen_urls[i].contains(url))
            .unwrap_or(false)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.buckets.iter().position(|b| b.key == key)
    }

    fn bucket_or_insert(&mut self, key: &str) -> usize {
        match self.position(key) {
            Some(i) => i,
            None => {
                self.buckets.push(DayBucket {
                    key: key.to_string(),
                    visits: Vec::new(),
                });
                self.seen_urls.push(HashSet::new());
                self.canonical.push(HashMap::new());
                self.buckets.len() - 1
            }
        }
    }

    /// Places `visit` into bucket `key`, creating the bucket on first use.
    ///
    /// The visit's `root_domain` must already be resolved.
    pub fn absorb(&mut self, key: &str, mut visit: Visit) -> Placement {
        if self.contains_url(key, &visit.url) {
            return Placement::Duplicate;
        }

        let i = self.bucket_or_insert(key);
        self.seen_urls[i].insert(visit.url.clone());

        let group = (visit.root_domain.clone(), visit.title.clone());
        if let Some(&pos) = self.canonical[i].get(&group) {
            visit.related_visits.clear();
            self.buckets[i].visits[pos].related_visits.push(visit);
            return Placement::Related(pos);
        }

        visit.related_visits.clear();
        let pos = self.buckets[i].visits.len();
        self.buckets[i].visits.push(visit);
        self.canonical[i].insert(group, pos);
        Placement::Canonical(pos)
    }
}
