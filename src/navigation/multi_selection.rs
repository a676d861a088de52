//! Multi-selection layered on the roving tab index.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::roving_tab_index::RovingTabIndex;

/// Actions offered by the bulk actions menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    OpenAll,
    GroupIntoTag,
    EditTags,
    Save,
}

#[derive(Debug, Clone, Default)]
pub struct MultiSelection {
    selected: BTreeSet<usize>,
    anchor: Option<usize>,
    total_selectable_items: usize,
}

impl MultiSelection {
    pub fn new(total_selectable_items: usize) -> Self {
        Self {
            selected: BTreeSet::new(),
            anchor: None,
            total_selectable_items,
        }
    }

    pub fn total_selectable_items(&self) -> usize {
        self.total_selectable_items
    }

    /// Updates the number of selectable rows; indices past the end are dropped.
    pub fn set_total_selectable_items(&mut self, total: usize) {
        self.total_selectable_items = total;
        self.selected.retain(|&i| i < total);
        if self.anchor.is_some_and(|a| a >= total) {
            self.anchor = None;
        }
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    /// Selected indices in ascending order.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    /// Flips membership of `index` and makes it the shift anchor. Returns the
    /// new membership; out-of-range indices are ignored.
    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= self.total_selectable_items {
            return false;
        }
        self.anchor = Some(index);
        if self.selected.remove(&index) {
            false
        } else {
            self.selected.insert(index);
            true
        }
    }

    /// Checks every index between `anchor` and `index`, inclusive, in either
    /// direction. Indices outside the range keep their state.
    pub fn set_range(&mut self, anchor: usize, index: usize) {
        if self.total_selectable_items == 0 {
            return;
        }
        let last = self.total_selectable_items - 1;
        let (lo, hi) = if anchor <= index {
            (anchor, index)
        } else {
            (index, anchor)
        };
        if lo > last {
            return;
        }
        self.selected.extend(lo..=hi.min(last));
        self.anchor = Some(anchor.min(last));
    }

    /// Range-selects from the current anchor (or `from` when there is none) to
    /// `index`. This is the shift+click / shift+arrow gesture.
    pub fn extend_to(&mut self, from: usize, index: usize) {
        let anchor = self.anchor.unwrap_or(from);
        self.set_range(anchor, index);
    }

    pub fn clear(&mut self) {
        if !self.selected.is_empty() {
            debug!(count = self.selected.len(), "selection cleared");
        }
        self.selected.clear();
        self.anchor = None;
    }

    pub fn is_actions_menu_visible(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn actions(&self) -> Vec<BulkAction> {
        if !self.is_actions_menu_visible() {
            return Vec::new();
        }
        vec![
            BulkAction::OpenAll,
            BulkAction::GroupIntoTag,
            BulkAction::EditTags,
            BulkAction::Save,
        ]
    }

    /// Resolves the selected rows to items, in index order. With an empty
    /// selection the focused row of `roving` stands in as a single item.
    pub fn resolve_selected<T, R>(&self, roving: &RovingTabIndex, resolve: R) -> Vec<T>
    where
        R: Fn(usize) -> Option<T>,
    {
        if self.selected.is_empty() {
            return roving.focused().and_then(&resolve).into_iter().collect();
        }
        self.selected.iter().filter_map(|&i| resolve(i)).collect()
    }

    /// Hands the resolved items to `on_submit`. Nothing is called when there is
    /// neither a selection nor a focused row. Returns the number of items.
    pub fn submit_selected<T, R, H>(&self, roving: &RovingTabIndex, resolve: R, on_submit: H) -> usize
    where
        R: Fn(usize) -> Option<T>,
        H: FnOnce(Vec<T>),
    {
        let items = self.resolve_selected(roving, resolve);
        let count = items.len();
        if count > 0 {
            on_submit(items);
        }
        count
    }

    /// Clears the selection once a bulk action succeeded. A failed action
    /// keeps it so the user can retry.
    pub fn complete_bulk_action<E>(&mut self, result: &Result<(), E>) {
        if result.is_ok() {
            self.clear();
        }
    }
}
