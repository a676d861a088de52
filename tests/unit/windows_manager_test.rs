//! Unit tests for the WindowsManager public API.

use jumper::managers::windows_manager::{TabsSource, WindowsManager, WindowsManagerTrait};
use jumper::types::errors::FeedError;
use jumper::types::tab::Tab;

fn tab(id: i64, window_id: i64, url: &str) -> Tab {
    Tab {
        id,
        window_id,
        title: format!("Tab {}", id),
        url: url.to_string(),
        root_domain: String::new(),
    }
}

struct FakeTabs {
    tabs: Result<Vec<Tab>, String>,
}

impl TabsSource for FakeTabs {
    fn get_all_tabs(&mut self) -> Result<Vec<Tab>, FeedError> {
        self.tabs.clone().map_err(FeedError::FetchFailed)
    }
}

#[test]
fn test_splits_current_window_from_all_open() {
    let mut mgr = WindowsManager::new(Some(1));
    let feed = mgr.set_windows_feed(vec![
        tab(1, 1, "https://a.com"),
        tab(2, 2, "https://b.com"),
        tab(3, 1, "https://c.com"),
    ]);

    let current: Vec<i64> = feed.current_window.iter().map(|t| t.id).collect();
    let all: Vec<i64> = feed.all_open.iter().map(|t| t.id).collect();
    assert_eq!(current, vec![1, 3]);
    assert_eq!(all, vec![1, 2, 3]);
}

#[test]
fn test_duplicate_urls_are_kept() {
    let mut mgr = WindowsManager::new(Some(1));
    let feed = mgr.set_windows_feed(vec![tab(1, 1, "https://a.com"), tab(2, 1, "https://a.com")]);
    assert_eq!(feed.all_open.len(), 2);
    assert_eq!(feed.current_window.len(), 2);
}

#[test]
fn test_refresh_replaces_previous_state() {
    let mut mgr = WindowsManager::new(Some(1));
    mgr.set_windows_feed(vec![tab(1, 1, "https://a.com"), tab(2, 1, "https://b.com")]);
    mgr.set_windows_feed(vec![tab(9, 1, "https://z.com")]);

    let feed = mgr.windows_feed();
    assert_eq!(feed.all_open.len(), 1);
    assert_eq!(feed.all_open[0].id, 9);
}

#[test]
fn test_without_active_window_current_is_empty() {
    let mut mgr = WindowsManager::default();
    let feed = mgr.set_windows_feed(vec![tab(1, 1, "https://a.com")]);
    assert!(feed.current_window.is_empty());
    assert_eq!(feed.all_open.len(), 1);
}

#[test]
fn test_root_domain_is_filled_in() {
    let mut mgr = WindowsManager::new(Some(1));
    let feed = mgr.set_windows_feed(vec![tab(1, 1, "https://docs.github.com/en")]);
    assert_eq!(feed.all_open[0].root_domain, "github.com");
}

#[test]
fn test_set_active_window_applies_on_next_refresh() {
    let mut mgr = WindowsManager::new(Some(1));
    mgr.set_active_window(2);
    assert_eq!(mgr.active_window_id(), Some(2));
    let feed = mgr.set_windows_feed(vec![tab(1, 1, "https://a.com"), tab(2, 2, "https://b.com")]);
    assert_eq!(feed.current_window[0].id, 2);
}

#[test]
fn test_menu_entries_lists_current_window_first() {
    let mut mgr = WindowsManager::new(Some(2));
    mgr.set_windows_feed(vec![tab(1, 1, "https://a.com"), tab(2, 2, "https://b.com")]);

    let current: Vec<i64> = mgr.menu_entries(false).iter().map(|t| t.id).collect();
    assert_eq!(current, vec![2]);

    let all: Vec<i64> = mgr.menu_entries(true).iter().map(|t| t.id).collect();
    assert_eq!(all, vec![2, 1, 2]);
}

#[test]
fn test_refresh_from_source() {
    let mut mgr = WindowsManager::new(Some(1));
    let mut source = FakeTabs {
        tabs: Ok(vec![tab(1, 1, "https://a.com")]),
    };
    assert_eq!(mgr.refresh(&mut source).unwrap().all_open.len(), 1);

    let mut failing = FakeTabs {
        tabs: Err("no tabs api".to_string()),
    };
    assert!(mgr.refresh(&mut failing).is_err());
    assert_eq!(mgr.windows_feed().all_open.len(), 1, "failed refresh keeps the previous feed");
}
