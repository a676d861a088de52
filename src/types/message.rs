use serde::{Deserialize, Serialize};

use super::object::{LibraryObject, LinkObject};
use super::settings::ViewerSettingsPatch;
use super::tab::Tab;
use super::visit::Session;
use crate::navigation::multi_selection::BulkAction;
use crate::navigation::Direction;

/// Menus that take over keyboard navigation while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuKind {
    /// Tag picker for creating (or jumping to) a tag view.
    CreateViewByTag,
    /// Source picker for creating (or jumping to) a source view.
    CreateViewBySource,
    /// Open tabs, current window first.
    Windows { display_all_open: bool },
}

/// Every message the host can send to the background state.
///
/// Encoded as `{"method": "...", "params": {...}}`. Variants listed in
/// [`Request::is_fire_and_forget`] get no reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum Request {
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "viewer.load_initial_data")]
    LoadInitialData {
        window_id: i64,
        tabs: Vec<Tab>,
        #[serde(default)]
        history: Option<Vec<Session>>,
    },
    #[serde(rename = "viewer.sync")]
    SyncLibrary { library: Vec<LibraryObject> },
    #[serde(rename = "viewer.reset")]
    ResetViewer,
    #[serde(rename = "viewer.update_settings")]
    UpdateViewerSettings { patch: ViewerSettingsPatch },
    #[serde(rename = "history.load_more")]
    LoadMoreHistory { sessions: Vec<Session> },
    #[serde(rename = "history.load_failed")]
    HistoryLoadFailed,
    #[serde(rename = "windows.refresh")]
    RefreshWindows { tabs: Vec<Tab> },
    #[serde(rename = "views.list")]
    ListViews,
    #[serde(rename = "views.apply")]
    ApplyView { view_id: String },
    #[serde(rename = "views.cycle")]
    CycleView { direction: Direction },
    #[serde(rename = "views.create_by_tag")]
    CreateViewByTag { tag: String },
    #[serde(rename = "views.create_by_source")]
    CreateViewBySource { source: String },
    #[serde(rename = "views.remove")]
    RemoveView { view_id: String },
    #[serde(rename = "search.query")]
    Search { query: String },
    #[serde(rename = "search.results")]
    SearchResults { query: String, results: Vec<LinkObject> },
    #[serde(rename = "search.clear")]
    ClearSearch,
    #[serde(rename = "feed.rows")]
    FeedRows,
    #[serde(rename = "feed.rendered")]
    FeedRendered { start: usize, end: usize },
    #[serde(rename = "nav.move")]
    Move {
        direction: Direction,
        #[serde(default)]
        extend: bool,
    },
    #[serde(rename = "nav.focus")]
    Focus { index: usize },
    #[serde(rename = "nav.hover")]
    Hover { index: usize },
    #[serde(rename = "nav.submit")]
    Submit,
    #[serde(rename = "nav.key")]
    KeyPress { keys: String },
    #[serde(rename = "selection.toggle")]
    ToggleSelection { index: usize },
    #[serde(rename = "selection.extend")]
    ExtendSelection { index: usize },
    #[serde(rename = "selection.clear")]
    ClearSelection,
    #[serde(rename = "selection.action")]
    BulkAction {
        action: BulkAction,
        #[serde(default)]
        tag: Option<String>,
    },
    #[serde(rename = "objects.save_result")]
    SaveResult {
        url: String,
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        error: Option<String>,
    },
    #[serde(rename = "menu.open")]
    OpenMenu { menu: MenuKind },
    #[serde(rename = "menu.query")]
    MenuQuery { query: String },
    #[serde(rename = "menu.move")]
    MenuMove { direction: Direction },
    #[serde(rename = "menu.select")]
    MenuSelect { index: usize },
    #[serde(rename = "menu.submit")]
    MenuSubmit,
    #[serde(rename = "menu.dismiss")]
    MenuDismiss,
    #[serde(rename = "settings.get")]
    GetSettings,
    #[serde(rename = "settings.set")]
    SetSetting { key: String, value: serde_json::Value },
    #[serde(rename = "overlay.close")]
    CloseOverlay,
}

impl Request {
    /// Messages the sender does not wait on.
    pub fn is_fire_and_forget(&self) -> bool {
        matches!(
            self,
            Request::ResetViewer
                | Request::HistoryLoadFailed
                | Request::Hover { .. }
                | Request::ClearSelection
                | Request::SaveResult { .. }
                | Request::CloseOverlay
        )
    }

    /// Wire name of the message.
    pub fn method(&self) -> &'static str {
        match self {
            Request::Ping => "ping",
            Request::LoadInitialData { .. } => "viewer.load_initial_data",
            Request::SyncLibrary { .. } => "viewer.sync",
            Request::ResetViewer => "viewer.reset",
            Request::UpdateViewerSettings { .. } => "viewer.update_settings",
            Request::LoadMoreHistory { .. } => "history.load_more",
            Request::HistoryLoadFailed => "history.load_failed",
            Request::RefreshWindows { .. } => "windows.refresh",
            Request::ListViews => "views.list",
            Request::ApplyView { .. } => "views.apply",
            Request::CycleView { .. } => "views.cycle",
            Request::CreateViewByTag { .. } => "views.create_by_tag",
            Request::CreateViewBySource { .. } => "views.create_by_source",
            Request::RemoveView { .. } => "views.remove",
            Request::Search { .. } => "search.query",
            Request::SearchResults { .. } => "search.results",
            Request::ClearSearch => "search.clear",
            Request::FeedRows => "feed.rows",
            Request::FeedRendered { .. } => "feed.rendered",
            Request::Move { .. } => "nav.move",
            Request::Focus { .. } => "nav.focus",
            Request::Hover { .. } => "nav.hover",
            Request::Submit => "nav.submit",
            Request::KeyPress { .. } => "nav.key",
            Request::ToggleSelection { .. } => "selection.toggle",
            Request::ExtendSelection { .. } => "selection.extend",
            Request::ClearSelection => "selection.clear",
            Request::BulkAction { .. } => "selection.action",
            Request::SaveResult { .. } => "objects.save_result",
            Request::OpenMenu { .. } => "menu.open",
            Request::MenuQuery { .. } => "menu.query",
            Request::MenuMove { .. } => "menu.move",
            Request::MenuSelect { .. } => "menu.select",
            Request::MenuSubmit => "menu.submit",
            Request::MenuDismiss => "menu.dismiss",
            Request::GetSettings => "settings.get",
            Request::SetSetting { .. } => "settings.set",
            Request::CloseOverlay => "overlay.close",
        }
    }
}
