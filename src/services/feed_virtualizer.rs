//! Feed virtualization adapter.
//!
//! Lays feed rows out in a fixed-height viewport and guards the infinite
//! loader: "load more" fires at most once per feed identity until the identity
//! changes or the pending load is released after a failure.

use std::ops::Range;

use serde::Serialize;
use tracing::{debug, warn};

use crate::types::feed::FeedIdentity;
use crate::types::history::SessionsFeed;
use crate::types::settings::FeedSettings;
use crate::types::visit::Visit;

/// One rendered row of a virtualized feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "row", rename_all = "camelCase")]
pub enum FeedRow<T> {
    /// Section heading (a day bucket label). Not focusable.
    Title { title: String },
    /// A focusable, selectable entry.
    #[serde(rename_all = "camelCase")]
    Entry { nav_index: usize, item: T },
    /// Trailing pseudo-item; rendering it means the end of the loaded rows
    /// is visible.
    Padding,
}

impl<T> FeedRow<T> {
    pub fn nav_index(&self) -> Option<usize> {
        match self {
            FeedRow::Entry { nav_index, .. } => Some(*nav_index),
            _ => None,
        }
    }

    pub fn item(&self) -> Option<&T> {
        match self {
            FeedRow::Entry { item, .. } => Some(item),
            _ => None,
        }
    }

    pub fn is_padding(&self) -> bool {
        matches!(self, FeedRow::Padding)
    }

    pub fn map<U, F>(self, f: F) -> FeedRow<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            FeedRow::Title { title } => FeedRow::Title { title },
            FeedRow::Entry { nav_index, item } => FeedRow::Entry {
                nav_index,
                item: f(item),
            },
            FeedRow::Padding => FeedRow::Padding,
        }
    }
}

/// History rows: a title row before each bucket's first visit, visits numbered
/// with a running navigation index, then the padding row.
pub fn history_rows(feed: &SessionsFeed) -> Vec<FeedRow<&Visit>> {
    let mut rows = Vec::with_capacity(feed.len() + feed.buckets().len() + 1);
    let mut nav_index = 0;

    for bucket in feed.buckets() {
        for (i, visit) in bucket.visits.iter().enumerate() {
            if i == 0 {
                rows.push(FeedRow::Title {
                    title: bucket.key.clone(),
                });
            }
            rows.push(FeedRow::Entry {
                nav_index,
                item: visit,
            });
            nav_index += 1;
        }
    }

    rows.push(FeedRow::Padding);
    rows
}

/// Rows for a flat feed (tabs, saved objects) followed by the padding row.
pub fn list_rows<T>(items: &[T]) -> Vec<FeedRow<&T>> {
    items
        .iter()
        .enumerate()
        .map(|(nav_index, item)| FeedRow::Entry { nav_index, item })
        .chain(std::iter::once(FeedRow::Padding))
        .collect()
}

/// Number of focusable rows.
pub fn selectable_count<T>(rows: &[FeedRow<T>]) -> usize {
    rows.iter().filter(|r| r.nav_index().is_some()).count()
}

/// Height of each row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSize {
    Fixed(u32),
    Variable(Vec<u32>),
}

impl ItemSize {
    fn get(&self, index: usize, count: usize) -> Option<u32> {
        if index >= count {
            return None;
        }
        match self {
            ItemSize::Fixed(size) => Some(*size),
            ItemSize::Variable(sizes) => sizes.get(index).copied(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedVirtualizer {
    settings: FeedSettings,
    identity: Option<FeedIdentity>,
    /// Rows before the padding pseudo-item.
    loaded_rows: usize,
    sizes: ItemSize,
    offsets: Vec<u32>,
    has_more: bool,
    load_more_pending: bool,
}

impl FeedVirtualizer {
    pub fn new(settings: FeedSettings) -> Self {
        Self {
            sizes: ItemSize::Fixed(settings.item_size),
            settings,
            identity: None,
            loaded_rows: 0,
            offsets: vec![0],
            has_more: false,
            load_more_pending: false,
        }
    }

    pub fn identity(&self) -> Option<&FeedIdentity> {
        self.identity.as_ref()
    }

    /// Mounts `rows` under `identity`. Padding rows take the padding size,
    /// every other row the item size. A new identity releases the load-more
    /// guard. Returns whether the identity changed.
    pub fn set_feed<T>(&mut self, identity: FeedIdentity, rows: &[FeedRow<T>], has_more: bool) -> bool {
        let sizes: Vec<u32> = rows
            .iter()
            .map(|row| {
                if row.is_padding() {
                    self.settings.padding_size
                } else {
                    self.settings.item_size
                }
            })
            .collect();
        let loaded_rows = rows.iter().filter(|r| !r.is_padding()).count();

        let uniform = sizes.iter().all(|&s| s == self.settings.item_size);
        let sizes = if uniform {
            ItemSize::Fixed(self.settings.item_size)
        } else {
            ItemSize::Variable(sizes)
        };
        self.set_layout(identity, loaded_rows, rows.len(), sizes, has_more)
    }

    /// Mounts a layout directly: `loaded_rows` real rows out of `row_count`
    /// (the remainder being padding), sized by `sizes`.
    pub fn set_layout(
        &mut self,
        identity: FeedIdentity,
        loaded_rows: usize,
        row_count: usize,
        sizes: ItemSize,
        has_more: bool,
    ) -> bool {
        let changed = self.identity.as_ref() != Some(&identity);
        if changed {
            if self.load_more_pending {
                debug!(view = %identity.view_id, generation = identity.generation, "load-more guard reset");
            }
            self.load_more_pending = false;
            self.identity = Some(identity);
        }

        self.loaded_rows = loaded_rows.min(row_count);
        self.sizes = sizes;
        self.has_more = has_more;

        self.offsets = Vec::with_capacity(row_count + 1);
        let mut offset = 0u32;
        self.offsets.push(0);
        for index in 0..row_count {
            offset = offset.saturating_add(self.sizes.get(index, row_count).unwrap_or(0));
            self.offsets.push(offset);
        }
        changed
    }

    /// Rows including the padding pseudo-item.
    pub fn row_count(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_item_loaded(&self, index: usize) -> bool {
        index < self.loaded_rows
    }

    pub fn row_size(&self, index: usize) -> Option<u32> {
        self.sizes.get(index, self.row_count())
    }

    pub fn row_offset(&self, index: usize) -> Option<u32> {
        if index >= self.row_count() {
            return None;
        }
        self.offsets.get(index).copied()
    }

    pub fn total_size(&self) -> u32 {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Rows intersecting the viewport at `scroll_offset`, widened by the
    /// configured overscan.
    pub fn visible_range(&self, scroll_offset: u32) -> Range<usize> {
        let count = self.row_count();
        if count == 0 {
            return 0..0;
        }
        let bottom = scroll_offset.saturating_add(self.settings.viewport_height);

        // offsets[i + 1] is the end of row i.
        let first = self.offsets[1..].partition_point(|&end| end <= scroll_offset);
        let last = self.offsets[..count].partition_point(|&start| start < bottom);

        let start = first.min(count).saturating_sub(self.settings.overscan);
        let end = (last + self.settings.overscan).min(count);
        start..end.max(start)
    }

    /// Called with the rendered row range. Returns true when the caller should
    /// fetch the next page; at most once until the identity changes or
    /// [`release_load_more`](Self::release_load_more) is called.
    pub fn on_items_rendered(&mut self, rendered: Range<usize>) -> bool {
        let needs_more = rendered.clone().any(|i| i < self.row_count() && !self.is_item_loaded(i));
        if !needs_more {
            return false;
        }
        let requested = self.request_load_more();
        if requested {
            debug!(start = rendered.start, end = rendered.end, "rendered rows reached the end of the feed");
        }
        requested
    }

    /// Takes the load-more guard. Returns false when the feed is complete or a
    /// load is already pending for this identity.
    pub fn request_load_more(&mut self) -> bool {
        if !self.has_more || self.load_more_pending {
            return false;
        }
        self.load_more_pending = true;
        debug!(loaded = self.loaded_rows, "requesting more feed items");
        true
    }

    pub fn is_load_more_pending(&self) -> bool {
        self.load_more_pending
    }

    /// Re-arms the loader after a failed fetch so a later scroll can retry.
    pub fn release_load_more(&mut self) {
        if self.load_more_pending {
            warn!("feed page load failed, load-more guard released");
        }
        self.load_more_pending = false;
    }

    /// Marks the feed as fully loaded; the loader stops asking for more.
    pub fn set_has_more(&mut self, has_more: bool) {
        self.has_more = has_more;
    }
}

impl Default for FeedVirtualizer {
    fn default() -> Self {
        Self::new(FeedSettings::default())
    }
}
