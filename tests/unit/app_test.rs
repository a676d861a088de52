//! Integration tests for the App core: views, feeds, navigation, bulk actions
//! and menus wired together the way the overlay drives them.

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use serde_json::json;
use tempfile::TempDir;

use jumper::app::{App, FeedItem};
use jumper::database::connection::Database;
use jumper::managers::history_manager::HistoryManagerTrait;
use jumper::managers::shortcut_manager::Command;
use jumper::managers::viewer_store::ViewerStoreTrait;
use jumper::managers::views_manager::ViewsManagerTrait;
use jumper::navigation::multi_selection::BulkAction;
use jumper::navigation::Direction;
use jumper::services::feed_virtualizer::FeedRow;
use jumper::services::session_grouping::DayBucketer;
use jumper::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use jumper::types::feed::HostEffect;
use jumper::types::message::MenuKind;
use jumper::types::object::{LibraryObject, LinkObject};
use jumper::types::settings::ViewerSettingsPatch;
use jumper::types::tab::Tab;
use jumper::types::visit::{Session, Visit};

fn bucketer() -> DayBucketer {
    DayBucketer::new(
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        FixedOffset::east_opt(0).unwrap(),
    )
}

fn settings_in(dir: &TempDir) -> SettingsEngine {
    let path = dir.path().join("settings.json");
    SettingsEngine::new(Some(path.to_string_lossy().to_string()))
}

fn build(settings: SettingsEngine) -> App {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let mut app = App::from_parts(db, settings).unwrap();
    app.set_bucketer(bucketer());
    app
}

fn setup() -> (TempDir, App) {
    let dir = tempfile::tempdir().unwrap();
    let app = build(settings_in(&dir));
    (dir, app)
}

fn tab(id: i64, window_id: i64, url: &str) -> Tab {
    Tab {
        id,
        window_id,
        title: format!("Tab {}", id),
        url: url.to_string(),
        root_domain: String::new(),
    }
}

fn three_tabs() -> Vec<Tab> {
    vec![
        tab(10, 1, "https://a.com/"),
        tab(11, 2, "https://b.com/"),
        tab(12, 1, "https://c.com/"),
    ]
}

fn at(hour: u32) -> i64 {
    Utc.with_ymd_and_hms(2024, 3, 15, hour, 0, 0).unwrap().timestamp_millis()
}

fn history_page(urls: &[&str], hour: u32) -> Vec<Session> {
    vec![Session {
        visit_time: at(hour),
        visits: urls
            .iter()
            .enumerate()
            .map(|(i, url)| Visit::new(url, &format!("Page {}", url), "", at(hour) - i as i64))
            .collect(),
    }]
}

fn library() -> Vec<LibraryObject> {
    vec![LibraryObject::Link {
        id: "1".to_string(),
        url: "https://docs.rs/serde".to_string(),
        link_name: "serde".to_string(),
        link_favicon: None,
        tags: vec!["rust".to_string()],
    }]
}

// ─── Initial view ───

#[test]
fn test_starts_on_all_open() {
    let (_dir, mut app) = setup();
    let snapshot = app.feed_snapshot();
    assert_eq!(snapshot.applied_view.id, "allOpen");
    assert!(!snapshot.restore_focus);
}

#[test]
fn test_new_tab_surface_starts_on_saved() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings_in(&dir);
    settings.set_value("surface", json!("new_tab")).unwrap();
    let mut app = build(settings);

    assert_eq!(app.feed_snapshot().applied_view.id, "saved");
    let ids: Vec<String> = app.available_views().into_iter().map(|v| v.id).collect();
    assert_eq!(ids, vec!["saved"]);
}

#[test]
fn test_many_tabs_open_on_all_open() {
    let (_dir, mut app) = setup();
    let initial = app.load_initial_data(1, three_tabs(), None);

    assert_eq!(initial.initial_view.id, "allOpen");
    assert_eq!(initial.windows.current_window.len(), 2);
    assert!(!initial.is_authenticated);
    assert!(initial.should_sync);

    let snapshot = app.feed_snapshot();
    assert_eq!(snapshot.rows.len(), 4);
    assert!(snapshot.restore_focus);
}

#[test]
fn test_single_tab_opens_recent_with_history() {
    let (_dir, mut app) = setup();
    let initial = app.load_initial_data(
        1,
        vec![tab(10, 1, "https://a.com/")],
        Some(history_page(&["https://x.com/1", "https://y.com/2"], 10)),
    );
    assert_eq!(initial.initial_view.id, "recent");

    let snapshot = app.feed_snapshot();
    assert_eq!(snapshot.rows[0], FeedRow::Title { title: "Today".to_string() });
    let urls: Vec<&str> = snapshot
        .rows
        .iter()
        .filter_map(|r| match r.item() {
            Some(FeedItem::Visit(v)) => Some(v.url.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(urls, vec!["https://x.com/1", "https://y.com/2"]);
    assert!(!snapshot.is_fetching_first_batch);
}

// ─── Selection lifecycle ───

#[test]
fn test_switching_view_clears_selection() {
    let (_dir, mut app) = setup();
    app.load_initial_data(1, three_tabs(), None);
    app.toggle_selection(1);
    assert_eq!(app.feed_snapshot().selected, vec![1]);

    let snapshot = app.cycle_view(Direction::Next);
    assert_eq!(snapshot.displayed_view.id, "saved");
    assert!(snapshot.selected.is_empty());
    assert_eq!(snapshot.focused, None);
    assert!(snapshot.actions.is_empty());
}

#[test]
fn test_toggle_selection_keeps_focus() {
    let (_dir, mut app) = setup();
    app.load_initial_data(1, three_tabs(), None);
    assert!(app.focus(0));

    let report = app.toggle_selection(2);
    assert_eq!(report.focused, Some(0));
    assert_eq!(report.selected, vec![2]);
}

#[test]
fn test_refreshing_same_view_keeps_selection() {
    let (_dir, mut app) = setup();
    app.load_initial_data(1, three_tabs(), None);
    app.toggle_selection(2);

    app.refresh_windows(three_tabs());
    assert_eq!(app.feed_snapshot().selected, vec![2]);
}

#[test]
fn test_refresh_with_fewer_tabs_drops_stale_selection() {
    let (_dir, mut app) = setup();
    app.load_initial_data(1, three_tabs(), None);
    app.toggle_selection(2);

    app.refresh_windows(vec![tab(10, 1, "https://a.com/")]);
    assert!(app.feed_snapshot().selected.is_empty());
}

// ─── Submit and bulk actions ───

#[test]
fn test_submit_focused_tab_activates_it() {
    let (_dir, mut app) = setup();
    app.load_initial_data(1, three_tabs(), None);
    assert!(app.focus(1));
    assert_eq!(
        app.submit(),
        vec![HostEffect::ActivateTab {
            tab_id: 11,
            window_id: 2
        }]
    );
}

#[test]
fn test_submit_selection_opens_urls_and_clears() {
    let (_dir, mut app) = setup();
    app.load_initial_data(1, three_tabs(), None);
    app.toggle_selection(2);
    app.toggle_selection(0);

    assert_eq!(
        app.submit(),
        vec![HostEffect::OpenUrls {
            urls: vec!["https://a.com/".to_string(), "https://c.com/".to_string()]
        }]
    );
    assert!(app.feed_snapshot().selected.is_empty());
}

#[test]
fn test_submit_with_nothing_focused_does_nothing() {
    let (_dir, mut app) = setup();
    app.load_initial_data(1, three_tabs(), None);
    assert!(app.submit().is_empty());
}

#[test]
fn test_group_into_tag_defaults_to_view_name() {
    let (_dir, mut app) = setup();
    app.load_initial_data(1, three_tabs(), None);
    app.toggle_selection(0);

    let effects = app.bulk_action(BulkAction::GroupIntoTag, None).unwrap();
    assert_eq!(
        effects,
        vec![HostEffect::GroupUrls {
            urls: vec!["https://a.com/".to_string()],
            title: "all open".to_string()
        }]
    );
    assert!(app.feed_snapshot().selected.is_empty());
}

#[test]
fn test_bulk_save_is_optimistic_and_rolls_back() {
    let (_dir, mut app) = setup();
    app.load_initial_data(1, three_tabs(), None);

    app.toggle_selection(0);
    let effects = app.bulk_action(BulkAction::Save, None).unwrap();
    assert_eq!(
        effects,
        vec![HostEffect::SaveObjects {
            urls: vec!["https://a.com/".to_string()]
        }]
    );
    assert!(app.viewer.is_link_saved("https://a.com/"));

    assert!(!app.complete_save("https://a.com/", Err("quota".to_string())).unwrap());
    assert!(!app.viewer.is_link_saved("https://a.com/"));

    app.toggle_selection(1);
    app.bulk_action(BulkAction::Save, None).unwrap();
    assert!(app.complete_save("https://b.com/", Ok("obj-9".to_string())).unwrap());
    assert_eq!(
        app.viewer.saved_objects_lookup().get("https://b.com/").map(String::as_str),
        Some("obj-9")
    );

    assert!(!app.complete_save("https://unknown.com/", Ok("x".to_string())).unwrap());
}

#[test]
fn test_bulk_save_write_failure_leaves_no_placeholders() {
    let (_dir, mut app) = setup();
    app.load_initial_data(1, three_tabs(), None);
    app.toggle_selection(0);
    app.toggle_selection(1);
    app.db
        .connection()
        .execute_batch(
            "CREATE TRIGGER fail_backup BEFORE INSERT ON viewer_backup
             BEGIN SELECT RAISE(ABORT, 'disk'); END;",
        )
        .unwrap();

    assert!(app.bulk_action(BulkAction::Save, None).is_err());
    assert!(app.viewer.get().saved_links.is_empty());
    assert!(!app.complete_save("https://a.com/", Ok("obj-1".to_string())).unwrap());
    assert_eq!(app.feed_snapshot().selected, vec![0, 1], "selection kept for a retry");

    app.db.connection().execute_batch("DROP TRIGGER fail_backup;").unwrap();
    let effects = app.bulk_action(BulkAction::Save, None).unwrap();
    assert_eq!(
        effects,
        vec![HostEffect::SaveObjects {
            urls: vec!["https://a.com/".to_string(), "https://b.com/".to_string()]
        }]
    );
    assert!(app.complete_save("https://b.com/", Ok("obj-2".to_string())).unwrap());
}

// ─── History paging ───

#[test]
fn test_history_end_requests_one_page_at_a_time() {
    let (_dir, mut app) = setup();
    app.load_initial_data(
        1,
        vec![tab(10, 1, "https://a.com/")],
        Some(history_page(&["https://x.com/1", "https://y.com/2"], 10)),
    );

    assert_eq!(app.navigate(Direction::Next, false).focused, Some(0));
    assert_eq!(app.navigate(Direction::Next, false).focused, Some(1));
    assert!(app.navigate(Direction::Next, false).load_more);
    assert!(!app.navigate(Direction::Next, false).load_more);

    app.load_more_history(&history_page(&["https://z.com/3"], 8));
    let report = app.navigate(Direction::Next, false);
    assert_eq!(report.focused, Some(2));
    assert!(!report.load_more);
}

#[test]
fn test_history_page_without_new_rows_rearms_keyboard_load_more() {
    let (_dir, mut app) = setup();
    app.load_initial_data(
        1,
        vec![tab(10, 1, "https://a.com/")],
        Some(history_page(&["https://x.com/1", "https://y.com/2"], 10)),
    );
    app.navigate(Direction::Next, false);
    app.navigate(Direction::Next, false);
    assert!(app.navigate(Direction::Next, false).load_more);

    let stats = app.load_more_history(&history_page(&["https://x.com/1"], 9));
    assert_eq!(stats.canonical, 0);
    assert_eq!(app.feed_snapshot().focused, Some(1));

    assert!(app.navigate(Direction::Next, false).load_more);
    assert!(!app.navigate(Direction::Next, false).load_more);
}

#[test]
fn test_failed_history_page_can_be_retried() {
    let (_dir, mut app) = setup();
    app.load_initial_data(
        1,
        vec![tab(10, 1, "https://a.com/")],
        Some(history_page(&["https://x.com/1"], 10)),
    );
    assert!(app.on_items_rendered(0, 3));
    assert!(!app.on_items_rendered(0, 3));

    app.history_load_failed();
    assert!(app.on_items_rendered(0, 3));
}

#[test]
fn test_empty_history_page_stops_loading() {
    let (_dir, mut app) = setup();
    app.load_initial_data(
        1,
        vec![tab(10, 1, "https://a.com/")],
        Some(history_page(&["https://x.com/1"], 10)),
    );
    assert!(app.on_items_rendered(0, 3));

    let stats = app.load_more_history(&[]);
    assert_eq!(stats.canonical, 0);
    assert!(app.history.is_exhausted());
    assert!(!app.on_items_rendered(0, 3));
}

// ─── Views ───

#[test]
fn test_apply_unknown_view_fails() {
    let (_dir, mut app) = setup();
    assert!(app.apply_view("nope").is_err());
}

#[test]
fn test_sync_reloads_displayed_object_view() {
    let (_dir, mut app) = setup();
    app.apply_view("saved").unwrap();
    assert_eq!(app.feed_snapshot().rows.len(), 1);

    app.sync_library(&library(), Utc::now()).unwrap();
    let snapshot = app.feed_snapshot();
    assert_eq!(snapshot.rows.len(), 2);
    assert!(matches!(snapshot.rows[0].item(), Some(FeedItem::Object(o)) if o.url == "https://docs.rs/serde"));
}

#[test]
fn test_created_view_is_applied_without_focus() {
    let (_dir, mut app) = setup();
    app.sync_library(&library(), Utc::now()).unwrap();
    let view = app.create_view_by_tag("rust").unwrap();

    let snapshot = app.feed_snapshot();
    assert_eq!(snapshot.applied_view.id, view.id);
    assert_eq!(snapshot.rows.len(), 2);
    assert!(!snapshot.restore_focus);
}

#[test]
fn test_removing_applied_view_falls_back() {
    let (_dir, mut app) = setup();
    let view = app.create_view_by_source("docs.rs").unwrap();
    let snapshot = app.remove_view(&view.id).unwrap();
    assert_eq!(snapshot.applied_view.id, "saved");
    assert_eq!(app.available_views().len(), 2);
}

#[test]
fn test_activating_recent_view_applies_it() {
    let (_dir, mut app) = setup();
    let settings = app
        .update_viewer_settings(&ViewerSettingsPatch {
            is_recent_view_activated: Some(true),
            is_files_view_activated: None,
        })
        .unwrap();
    assert!(settings.is_recent_view_activated);
    assert_eq!(app.views.applied_view().id, "recent");
}

#[test]
fn test_reset_viewer_leaves_user_view() {
    let (_dir, mut app) = setup();
    app.create_view_by_tag("rust").unwrap();
    app.reset_viewer().unwrap();
    assert_eq!(app.views.applied_view().id, "allOpen");
    assert_eq!(app.viewer_object_count(), 0);
}

// ─── Search ───

#[test]
fn test_search_matches_saved_objects_then_history() {
    let (_dir, mut app) = setup();
    app.sync_library(&library(), Utc::now()).unwrap();
    app.load_initial_data(
        1,
        vec![tab(10, 1, "https://a.com/")],
        Some(history_page(&["https://x.com/serde", "https://docs.rs/serde"], 10)),
    );

    let snapshot = app.search("SERDE");
    assert_eq!(snapshot.search_query.as_deref(), Some("SERDE"));
    assert_eq!(snapshot.displayed_view.id, "recent");
    let urls: Vec<&str> = snapshot
        .rows
        .iter()
        .filter_map(|r| match r.item() {
            Some(FeedItem::Object(o)) => Some(o.url.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(urls, vec!["https://docs.rs/serde", "https://x.com/serde"]);
    assert!(!snapshot.is_fetching_first_batch);
}

#[test]
fn test_new_search_result_set_clears_selection() {
    let (_dir, mut app) = setup();
    app.sync_library(&library(), Utc::now()).unwrap();
    app.search("serde");
    app.toggle_selection(0);
    assert_eq!(app.feed_snapshot().selected, vec![0]);

    assert!(!app.apply_search_results("ser", Vec::new()), "stale query ignored");
    assert_eq!(app.feed_snapshot().selected, vec![0]);

    let results = vec![LinkObject {
        title: "Serde guide".to_string(),
        url: "https://serde.rs/".to_string(),
        favicon: None,
        root_domain: "serde.rs".to_string(),
        is_saved: false,
        is_file: false,
        tags: Vec::new(),
    }];
    assert!(app.apply_search_results("serde", results));
    let snapshot = app.feed_snapshot();
    assert!(snapshot.selected.is_empty());
    assert_eq!(snapshot.focused, None);

    app.focus(0);
    assert_eq!(
        app.submit(),
        vec![HostEffect::OpenUrls {
            urls: vec!["https://serde.rs/".to_string()]
        }]
    );
}

#[test]
fn test_clearing_search_returns_to_view() {
    let (_dir, mut app) = setup();
    app.load_initial_data(1, three_tabs(), None);
    assert_eq!(app.search("b.com").rows.len(), 1, "tabs are not searched");

    let snapshot = app.clear_search();
    assert!(snapshot.search_query.is_none());
    assert_eq!(snapshot.displayed_view.id, "allOpen");
    assert_eq!(snapshot.rows.len(), 4);
    assert!(matches!(snapshot.rows[0].item(), Some(FeedItem::Tab(_))));
}

// ─── Menus ───

#[test]
fn test_tag_menu_creates_then_reuses_view() {
    let (_dir, mut app) = setup();
    app.sync_library(&library(), Utc::now()).unwrap();

    let menu = app.open_menu(MenuKind::CreateViewByTag);
    assert_eq!(menu.rows, vec!["rust"]);
    assert_eq!(menu.index, Some(0));

    let menu = app.menu_query("Reading List").unwrap();
    assert_eq!(menu.query, "Reading-List");
    assert!(menu.rows.is_empty());
    assert!(menu.can_create);

    assert!(app.menu_submit().unwrap().is_empty());
    assert!(!app.is_menu_open());
    assert_eq!(app.views.applied_view().name, "Reading-List");
    let count = app.available_views().len();

    app.apply_view("saved").unwrap();
    app.open_menu(MenuKind::CreateViewByTag);
    app.menu_query("reading list");
    app.menu_query("Reading List");
    app.menu_submit().unwrap();
    assert_eq!(app.views.applied_view().name, "Reading-List");
    assert_eq!(app.available_views().len(), count);
}

#[test]
fn test_empty_menu_submit_keeps_menu_open() {
    let (_dir, mut app) = setup();
    app.open_menu(MenuKind::CreateViewBySource);
    assert!(app.menu_submit().unwrap().is_empty());
    assert!(app.is_menu_open());
    assert_eq!(app.menu_dismiss(), vec![HostEffect::RestoreFocus]);
    assert!(!app.is_menu_open());
}

#[test]
fn test_windows_menu_activates_tab() {
    let (_dir, mut app) = setup();
    app.load_initial_data(1, three_tabs(), None);

    let menu = app.open_menu(MenuKind::Windows {
        display_all_open: false,
    });
    assert_eq!(menu.rows, vec!["Tab 10", "Tab 12"]);
    app.menu_move(Direction::Next);
    assert_eq!(
        app.menu_submit().unwrap(),
        vec![HostEffect::ActivateTab {
            tab_id: 12,
            window_id: 1
        }]
    );
}

// ─── Keyboard ───

#[test]
fn test_escape_closes_menu_before_overlay() {
    let (_dir, mut app) = setup();
    let report = app.handle_key("N").unwrap();
    assert_eq!(report.command, Some(Command::OpenCreateViewMenu));
    assert!(app.is_menu_open());

    assert_eq!(app.handle_key("Escape").unwrap().effects, vec![HostEffect::RestoreFocus]);
    assert_eq!(app.handle_key("Escape").unwrap().effects, vec![HostEffect::CloseOverlay]);
}

#[test]
fn test_open_menu_owns_arrow_keys() {
    let (_dir, mut app) = setup();
    app.load_initial_data(1, three_tabs(), None);
    app.open_menu(MenuKind::Windows {
        display_all_open: true,
    });

    app.handle_key("ArrowDown").unwrap();
    assert_eq!(app.menu_snapshot().and_then(|m| m.index), Some(1));
    assert_eq!(app.feed_snapshot().focused, None);
}

#[test]
fn test_arrow_keys_move_feed_focus() {
    let (_dir, mut app) = setup();
    app.load_initial_data(1, three_tabs(), None);
    app.handle_key("ArrowDown").unwrap();
    app.handle_key("Shift+ArrowDown").unwrap();
    let snapshot = app.feed_snapshot();
    assert_eq!(snapshot.focused, Some(1));
    assert_eq!(snapshot.selected, vec![0, 1]);
}

#[test]
fn test_unbound_key_is_ignored() {
    let (_dir, mut app) = setup();
    let report = app.handle_key("F13").unwrap();
    assert!(report.command.is_none());
    assert!(report.effects.is_empty());
}
