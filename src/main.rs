//! Jumper console demo.
//!
//! Drives the background state the way the overlay would: grouped history,
//! views, keyboard navigation, bulk actions and the tag menu. The extension
//! host talks to the `jumper-rpc` binary instead.

use std::error::Error;
use std::sync::Arc;

use chrono::{FixedOffset, TimeZone, Utc};

use jumper::app::App;
use jumper::database::connection::Database;
use jumper::managers::history_manager::{HistoryManager, HistoryManagerTrait};
use jumper::navigation::multi_selection::BulkAction;
use jumper::navigation::Direction;
use jumper::services::session_grouping::DayBucketer;
use jumper::services::settings_engine::SettingsEngine;
use jumper::types::message::MenuKind;
use jumper::types::tab::Tab;
use jumper::types::visit::{Session, Visit};

type DemoResult = Result<(), Box<dyn Error>>;

fn main() {
    println!();
    println!("  Jumper v{} (demo mode)", env!("CARGO_PKG_VERSION"));
    println!();

    let demos: [(&str, fn() -> DemoResult); 3] = [
        ("Session Grouping", demo_grouping),
        ("Views & Navigation", demo_views),
        ("Tag Menu", demo_menu),
    ];
    for (name, demo) in demos {
        section(name);
        if let Err(e) = demo() {
            eprintln!("  ✗ {} failed: {}", name, e);
            std::process::exit(1);
        }
        println!();
    }
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn ms(hour: u32, minute: u32) -> i64 {
    Utc.with_ymd_and_hms(2024, 3, 15, hour, minute, 0)
        .single()
        .map(|t| t.timestamp_millis())
        .unwrap_or_default()
}

fn demo_bucketer() -> Result<DayBucketer, Box<dyn Error>> {
    let today = chrono::NaiveDate::from_ymd_opt(2024, 3, 15).ok_or("bad date")?;
    let offset = FixedOffset::east_opt(0).ok_or("bad offset")?;
    Ok(DayBucketer::new(today, offset))
}

fn demo_sessions() -> Vec<Session> {
    vec![
        Session {
            visit_time: ms(10, 0),
            visits: vec![
                Visit::new("https://docs.rs/serde", "serde - Rust", "docs.rs", ms(10, 0)),
                Visit::new("https://docs.rs/serde/derive", "serde - Rust", "docs.rs", ms(9, 58)),
                Visit::new("https://github.com/tokio-rs/tokio", "tokio", "github.com", ms(9, 30)),
            ],
        },
        Session {
            visit_time: ms(8, 0),
            visits: vec![Visit::new("https://docs.rs/serde", "serde - Rust", "docs.rs", ms(8, 0))],
        },
    ]
}

fn demo_grouping() -> DemoResult {
    let bucketer = demo_bucketer()?;
    let mut history = HistoryManager::new();
    let stats = history.load_more(&demo_sessions(), &bucketer);
    println!(
        "  canonical: {}, related: {}, duplicates: {}, skipped: {}",
        stats.canonical, stats.related, stats.duplicates, stats.skipped
    );
    for key in history.feed_keys() {
        println!("  bucket: {}", key);
    }
    println!("  ✓ grouping OK");
    Ok(())
}

fn demo_app() -> Result<App, Box<dyn Error>> {
    let db = Arc::new(Database::open_in_memory()?);
    let settings_path = std::env::temp_dir().join("jumper_demo_settings.json");
    let settings = SettingsEngine::new(Some(settings_path.to_string_lossy().to_string()));
    let mut app = App::from_parts(db, settings)?;
    app.set_bucketer(demo_bucketer()?);
    Ok(app)
}

fn demo_views() -> DemoResult {
    let mut app = demo_app()?;
    let tabs = vec![Tab {
        id: 1,
        window_id: 1,
        title: "Jumper".to_string(),
        url: "https://example.com".to_string(),
        root_domain: "example.com".to_string(),
    }];
    let initial = app.load_initial_data(1, tabs, Some(demo_sessions()));
    println!("  initial view: {}", initial.initial_view.name);

    let snapshot = app.feed_snapshot();
    println!("  rows: {} ({}px)", snapshot.rows.len(), snapshot.total_size);

    let report = app.navigate(Direction::Next, false);
    println!("  focused: {:?}", report.focused);
    let report = app.navigate(Direction::Next, true);
    println!("  selected: {:?}", report.selected);

    for effect in app.bulk_action(BulkAction::OpenAll, None)? {
        println!("  effect: {:?}", effect);
    }
    println!("  ✓ views OK");
    Ok(())
}

fn demo_menu() -> DemoResult {
    let mut app = demo_app()?;
    app.open_menu(MenuKind::CreateViewByTag);
    if let Some(menu) = app.menu_query("Reading List") {
        println!("  query: {:?}, can create: {}", menu.query, menu.can_create);
    }
    app.menu_move(Direction::Next);
    app.menu_submit()?;
    let views: Vec<String> = app.available_views().into_iter().map(|v| v.name).collect();
    println!("  views: {}", views.join(", "));
    println!("  ✓ menu OK");
    Ok(())
}
