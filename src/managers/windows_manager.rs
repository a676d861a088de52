//! Open-tabs state for the "All Open" view.

use tracing::debug;

use crate::services::url_utils::root_domain;
use crate::types::errors::FeedError;
use crate::types::tab::{Tab, WindowsFeed};

/// Supplies open tabs from the browser.
pub trait TabsSource {
    fn get_all_tabs(&mut self) -> Result<Vec<Tab>, FeedError>;
}

/// Trait defining the windows feed interface.
pub trait WindowsManagerTrait {
    fn set_windows_feed(&mut self, all_tabs: Vec<Tab>) -> &WindowsFeed;
    fn refresh(&mut self, source: &mut dyn TabsSource) -> Result<&WindowsFeed, FeedError>;
    fn windows_feed(&self) -> &WindowsFeed;
    fn set_active_window(&mut self, window_id: i64);
    fn active_window_id(&self) -> Option<i64>;
    /// Tabs in combobox order: current window first, then every open tab when
    /// `display_all_open` is set. The position in the returned list is the
    /// tab's menu index.
    fn menu_entries(&self, display_all_open: bool) -> Vec<&Tab>;
}

/// Windows feed manager. Every refresh replaces the previous state wholesale.
pub struct WindowsManager {
    active_window_id: Option<i64>,
    feed: WindowsFeed,
}

impl WindowsManager {
    pub fn new(active_window_id: Option<i64>) -> Self {
        Self {
            active_window_id,
            feed: WindowsFeed::default(),
        }
    }
}

impl Default for WindowsManager {
    fn default() -> Self {
        Self::new(None)
    }
}

impl WindowsManagerTrait for WindowsManager {
    fn set_windows_feed(&mut self, mut all_tabs: Vec<Tab>) -> &WindowsFeed {
        for tab in all_tabs.iter_mut() {
            if tab.root_domain.is_empty() {
                tab.root_domain = root_domain(&tab.url);
            }
        }

        let current_window: Vec<Tab> = match self.active_window_id {
            Some(window_id) => all_tabs
                .iter()
                .filter(|t| t.window_id == window_id)
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        debug!(
            current = current_window.len(),
            all = all_tabs.len(),
            "windows feed replaced"
        );
        self.feed = WindowsFeed {
            current_window,
            all_open: all_tabs,
        };
        &self.feed
    }

    /// Reloads tabs from `source`. On failure the previous feed is kept.
    fn refresh(&mut self, source: &mut dyn TabsSource) -> Result<&WindowsFeed, FeedError> {
        let tabs = source.get_all_tabs()?;
        Ok(self.set_windows_feed(tabs))
    }

    fn windows_feed(&self) -> &WindowsFeed {
        &self.feed
    }

    fn set_active_window(&mut self, window_id: i64) {
        self.active_window_id = Some(window_id);
    }

    fn active_window_id(&self) -> Option<i64> {
        self.active_window_id
    }

    fn menu_entries(&self, display_all_open: bool) -> Vec<&Tab> {
        let mut entries: Vec<&Tab> = self.feed.current_window.iter().collect();
        if display_all_open {
            entries.extend(self.feed.all_open.iter());
        }
        entries
    }
}
