//! Roving tab index.
//!
//! Tracks a single focused row across a dynamic, virtualized set of rows that
//! register and unregister as they scroll in and out. Keyboard and pointer
//! focus share the same index.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound::{Excluded, Unbounded};

use tracing::debug;

/// Callback run when a focused row is submitted.
pub type SubmitHandler = Box<dyn FnMut() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Idle,
    Focused(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RovingConfig {
    /// Index focused first, and fallback when the focused row unregisters.
    pub initial_index: usize,
    /// Moving past the last row requests more rows instead of wrapping.
    pub is_infinite_list: bool,
    /// Pointer hover moves focus.
    pub with_focus_on_hover: bool,
}

impl Default for RovingConfig {
    fn default() -> Self {
        Self {
            initial_index: 0,
            is_infinite_list: false,
            with_focus_on_hover: false,
        }
    }
}

/// Result of a relative move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Moved(usize),
    /// Focus is on the last row of an infinite list; the caller should load more.
    LoadMore,
    /// Load-more was already signalled and no new row has registered since.
    Stalled,
    Unchanged,
}

pub struct RovingTabIndex {
    config: RovingConfig,
    focus: Focus,
    rows: BTreeMap<usize, Option<SubmitHandler>>,
    /// Row count at the time load-more was signalled.
    load_more_signalled_at: Option<usize>,
}

impl fmt::Debug for RovingTabIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RovingTabIndex")
            .field("config", &self.config)
            .field("focus", &self.focus)
            .field("rows", &self.rows.keys().collect::<Vec<_>>())
            .field("load_more_signalled_at", &self.load_more_signalled_at)
            .finish()
    }
}

impl RovingTabIndex {
    pub fn new(config: RovingConfig) -> Self {
        Self {
            config,
            focus: Focus::Idle,
            rows: BTreeMap::new(),
            load_more_signalled_at: None,
        }
    }

    pub fn config(&self) -> RovingConfig {
        self.config
    }

    pub fn focus_state(&self) -> Focus {
        self.focus
    }

    pub fn focused(&self) -> Option<usize> {
        match self.focus {
            Focus::Focused(i) => Some(i),
            Focus::Idle => None,
        }
    }

    pub fn is_registered(&self, index: usize) -> bool {
        self.rows.contains_key(&index)
    }

    pub fn registered_count(&self) -> usize {
        self.rows.len()
    }

    /// A row announces itself. Focus is not affected.
    pub fn register(&mut self, index: usize) {
        self.insert_row(index, None);
    }

    pub fn register_with_submit(&mut self, index: usize, on_submit: SubmitHandler) {
        self.insert_row(index, Some(on_submit));
    }

    fn insert_row(&mut self, index: usize, on_submit: Option<SubmitHandler>) {
        let is_new = self.rows.insert(index, on_submit).is_none();
        if is_new && self.load_more_signalled_at.is_some_and(|count| self.rows.len() > count) {
            self.load_more_signalled_at = None;
        }
    }

    /// A row went away. If it held focus, focus falls back to the initial index
    /// (or the first remaining row), or to idle when nothing is left.
    pub fn unregister(&mut self, index: usize) {
        if self.rows.remove(&index).is_none() {
            return;
        }
        if self.focus != Focus::Focused(index) {
            return;
        }

        self.focus = if self.rows.contains_key(&self.config.initial_index) {
            Focus::Focused(self.config.initial_index)
        } else {
            match self.rows.keys().next() {
                Some(&first) => Focus::Focused(first),
                None => Focus::Idle,
            }
        };
    }

    /// Unregisters every row at or past `count`.
    pub fn truncate(&mut self, count: usize) {
        let stale: Vec<usize> = self.rows.range(count..).map(|(&i, _)| i).collect();
        for index in stale {
            self.unregister(index);
        }
    }

    /// Explicit focus (click or programmatic). Ignored for unknown rows.
    pub fn focus(&mut self, index: usize) -> bool {
        if !self.rows.contains_key(&index) {
            return false;
        }
        self.focus = Focus::Focused(index);
        true
    }

    pub fn hover(&mut self, index: usize) -> bool {
        if !self.config.with_focus_on_hover {
            return false;
        }
        self.focus(index)
    }

    fn entry_index(&self) -> Option<usize> {
        if self.rows.contains_key(&self.config.initial_index) {
            Some(self.config.initial_index)
        } else {
            self.rows.keys().next().copied()
        }
    }

    pub fn next(&mut self) -> NavigationOutcome {
        let current = match self.focus {
            Focus::Idle => return self.enter(),
            Focus::Focused(i) => i,
        };

        if let Some((&next, _)) = self.rows.range((Excluded(current), Unbounded)).next() {
            self.focus = Focus::Focused(next);
            return NavigationOutcome::Moved(next);
        }

        if self.config.is_infinite_list {
            if self.load_more_signalled_at == Some(self.rows.len()) {
                return NavigationOutcome::Stalled;
            }
            self.load_more_signalled_at = Some(self.rows.len());
            debug!(index = current, "roving index reached end of infinite list");
            return NavigationOutcome::LoadMore;
        }

        match self.rows.keys().next() {
            Some(&first) if first != current => {
                self.focus = Focus::Focused(first);
                NavigationOutcome::Moved(first)
            }
            _ => NavigationOutcome::Unchanged,
        }
    }

    pub fn previous(&mut self) -> NavigationOutcome {
        let current = match self.focus {
            Focus::Idle => return self.enter(),
            Focus::Focused(i) => i,
        };

        if let Some((&prev, _)) = self.rows.range(..current).next_back() {
            self.focus = Focus::Focused(prev);
            return NavigationOutcome::Moved(prev);
        }

        if self.config.is_infinite_list {
            return NavigationOutcome::Unchanged;
        }

        match self.rows.keys().next_back() {
            Some(&last) if last != current => {
                self.focus = Focus::Focused(last);
                NavigationOutcome::Moved(last)
            }
            _ => NavigationOutcome::Unchanged,
        }
    }

    fn enter(&mut self) -> NavigationOutcome {
        match self.entry_index() {
            Some(index) => {
                self.focus = Focus::Focused(index);
                NavigationOutcome::Moved(index)
            }
            None => NavigationOutcome::Unchanged,
        }
    }

    /// Runs the focused row's submit handler. Returns the submitted index, or
    /// `None` when nothing is focused.
    pub fn submit(&mut self) -> Option<usize> {
        let index = self.focused()?;
        let handler = self.rows.get_mut(&index)?;
        if let Some(on_submit) = handler.as_mut() {
            on_submit();
        }
        Some(index)
    }

    /// Allows the next move past the end to signal load-more again. Called when
    /// a page arrived, whether or not it registered new rows.
    pub fn rearm_load_more(&mut self) {
        self.load_more_signalled_at = None;
    }

    /// Drops every row and returns to idle. Used when the mounted feed changes.
    pub fn reset(&mut self) {
        self.rows.clear();
        self.focus = Focus::Idle;
        self.load_more_signalled_at = None;
    }
}

impl Default for RovingTabIndex {
    fn default() -> Self {
        Self::new(RovingConfig::default())
    }
}
