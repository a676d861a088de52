//! RPC method handler for the jumper NDJSON protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` decodes a method call into a typed [`Request`] and
//! `handle_request` dispatches it to the `App`. [`route`] is what the server
//! runs per line: it sends the request over the message channel under its
//! contract (request/response or fire-and-forget).

use std::sync::Mutex;

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::app::App;
use crate::services::messaging::MessageChannel;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::errors::MessageError;
use crate::types::message::Request;

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Builds the typed request for `method`. Empty or null params are left out so
/// methods without params decode too.
pub fn decode_request(method: &str, params: &Value) -> Result<Request, String> {
    let mut envelope = Map::new();
    envelope.insert("method".to_string(), Value::String(method.to_string()));
    let has_params = match params {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    };
    if has_params {
        envelope.insert("params".to_string(), params.clone());
    }
    serde_json::from_value(Value::Object(envelope)).map_err(|e| format!("invalid request {}: {}", method, e))
}

/// Dispatch a method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    let request = decode_request(method, params)?;
    let mut a = app.lock().map_err(|e| e.to_string())?;
    handle_request(&mut a, request)
}

/// Sends one wire message through `channel` and builds its response line.
///
/// Request/response messages must carry an `id` and fire-and-forget messages
/// must not; a mismatch is answered with an error and never reaches the app.
/// Delivered notifications produce no response.
pub async fn route(channel: &MessageChannel, id: Option<Value>, method: &str, params: &Value) -> Option<Value> {
    let request = match decode_request(method, params) {
        Ok(request) => request,
        Err(e) => return Some(json!({"id": id, "error": e})),
    };

    match (id, request.is_fire_and_forget()) {
        (Some(id), false) => Some(match channel.request(request).await {
            Ok(value) => json!({"id": id, "result": value}),
            Err(MessageError::HandlerFailed(msg)) => json!({"id": id, "error": msg}),
            Err(e) => json!({"id": id, "error": e.to_string()}),
        }),
        (None, true) => {
            if let Err(e) = channel.notify(request).await {
                warn!(method, error = %e, "notification not delivered");
            }
            None
        }
        (Some(id), true) => Some(json!({
            "id": id,
            "error": format!("{} is a notification and takes no id", method),
        })),
        (None, false) => Some(json!({
            "id": null,
            "error": format!("{} expects a reply and needs an id", method),
        })),
    }
}

/// Runs one typed request against the app.
pub fn handle_request(app: &mut App, request: Request) -> Result<Value, String> {
    debug!(method = request.method(), "handling request");
    match request {
        Request::Ping => Ok(json!({"pong": true})),

        // ─── Viewer ───
        Request::LoadInitialData {
            window_id,
            tabs,
            history,
        } => to_value(app.load_initial_data(window_id, tabs, history)),
        Request::SyncLibrary { library } => {
            app.sync_library(&library, Utc::now()).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true, "objects": app.viewer_object_count()}))
        }
        Request::ResetViewer => {
            app.reset_viewer().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        Request::UpdateViewerSettings { patch } => {
            let settings = app.update_viewer_settings(&patch).map_err(|e| e.to_string())?;
            to_value(settings)
        }

        // ─── Feeds ───
        Request::LoadMoreHistory { sessions } => {
            let stats = app.load_more_history(&sessions);
            Ok(json!({
                "canonical": stats.canonical,
                "related": stats.related,
                "duplicates": stats.duplicates,
                "skipped": stats.skipped,
            }))
        }
        Request::HistoryLoadFailed => {
            app.history_load_failed();
            Ok(json!({"ok": true}))
        }
        Request::RefreshWindows { tabs } => to_value(app.refresh_windows(tabs)),

        // ─── Views ───
        Request::ListViews => to_value(app.available_views()),
        Request::ApplyView { view_id } => to_value(app.apply_view(&view_id).map_err(|e| e.to_string())?),
        Request::CycleView { direction } => to_value(app.cycle_view(direction)),
        Request::CreateViewByTag { tag } => to_value(app.create_view_by_tag(&tag).map_err(|e| e.to_string())?),
        Request::CreateViewBySource { source } => {
            to_value(app.create_view_by_source(&source).map_err(|e| e.to_string())?)
        }
        Request::RemoveView { view_id } => to_value(app.remove_view(&view_id).map_err(|e| e.to_string())?),

        // ─── Search ───
        Request::Search { query } => to_value(app.search(&query)),
        Request::SearchResults { query, results } => {
            Ok(json!({"applied": app.apply_search_results(&query, results)}))
        }
        Request::ClearSearch => to_value(app.clear_search()),

        // ─── Feed rendering ───
        Request::FeedRows => to_value(app.feed_snapshot()),
        Request::FeedRendered { start, end } => {
            if start > end {
                return Err(format!("invalid range: {}..{}", start, end));
            }
            Ok(json!({"loadMore": app.on_items_rendered(start, end)}))
        }

        // ─── Navigation ───
        Request::Move { direction, extend } => to_value(app.navigate(direction, extend)),
        Request::Focus { index } => Ok(json!({"focused": app.focus(index)})),
        Request::Hover { index } => Ok(json!({"focused": app.hover(index)})),
        Request::Submit => to_value(app.submit()),
        Request::KeyPress { keys } => to_value(app.handle_key(&keys).map_err(|e| e.to_string())?),

        // ─── Selection ───
        Request::ToggleSelection { index } => to_value(app.toggle_selection(index)),
        Request::ExtendSelection { index } => to_value(app.extend_selection(index)),
        Request::ClearSelection => {
            app.clear_selection();
            Ok(json!({"ok": true}))
        }
        Request::BulkAction { action, tag } => {
            to_value(app.bulk_action(action, tag).map_err(|e| e.to_string())?)
        }
        Request::SaveResult { url, id, error } => {
            let result = match id {
                Some(id) => Ok(id),
                None => Err(error.unwrap_or_else(|| "save rejected".to_string())),
            };
            let saved = app.complete_save(&url, result).map_err(|e| e.to_string())?;
            Ok(json!({"saved": saved}))
        }

        // ─── Menus ───
        Request::OpenMenu { menu } => to_value(app.open_menu(menu)),
        Request::MenuQuery { query } => to_value(app.menu_query(&query)),
        Request::MenuMove { direction } => to_value(app.menu_move(direction)),
        Request::MenuSelect { index } => Ok(json!({"selected": app.menu_select(index)})),
        Request::MenuSubmit => to_value(app.menu_submit().map_err(|e| e.to_string())?),
        Request::MenuDismiss => to_value(app.menu_dismiss()),

        // ─── Settings ───
        Request::GetSettings => to_value(app.settings_engine.get_settings()),
        Request::SetSetting { key, value } => {
            app.settings_engine.set_value(&key, value).map_err(|e| e.to_string())?;
            app.apply_feed_settings();
            Ok(json!({"ok": true}))
        }

        Request::CloseOverlay => to_value(app.close_overlay()),
    }
}
