//! App core for the jumper background state.
//!
//! Owns every manager and state machine and wires them together: the views
//! layer decides what is displayed, the feed navigator and virtualizer are
//! rebound to it after every change, and user gestures come back out as
//! [`HostEffect`]s for the host to carry out.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::database::connection::Database;
use crate::managers::history_manager::{HistoryManager, HistoryManagerTrait};
use crate::managers::search_manager::{matches_query, SearchManager, SearchManagerTrait};
use crate::managers::shortcut_manager::{Command, ShortcutManager, ShortcutManagerTrait};
use crate::managers::viewer_store::{ViewerStore, ViewerStoreTrait};
use crate::managers::views_manager::{
    default_views, LoadOrigin, ViewContent, ViewTransition, ViewsManager, ViewsManagerTrait,
};
use crate::managers::windows_manager::{WindowsManager, WindowsManagerTrait};
use crate::navigation::combobox::{normalize_tag_query, Combobox, ComboboxItem, ComboboxSubmit};
use crate::navigation::feed_navigator::FeedNavigator;
use crate::navigation::multi_selection::BulkAction;
use crate::navigation::roving_tab_index::{NavigationOutcome, RovingConfig};
use crate::navigation::Direction;
use crate::services::feed_virtualizer::{history_rows, list_rows, selectable_count, FeedRow, FeedVirtualizer};
use crate::services::session_grouping::{DayBucketer, GroupingStats};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::url_utils::root_domain;
use crate::types::errors::ViewerError;
use crate::types::feed::{FeedEntry, FeedIdentity, HostEffect};
use crate::types::message::MenuKind;
use crate::types::object::{LibraryObject, LinkObject, SaveState, SourceEntry};
use crate::types::settings::{JumperSettings, Surface, ViewerSettings, ViewerSettingsPatch};
use crate::types::tab::{Tab, WindowsFeed};
use crate::types::view::View;
use crate::types::visit::{Session, Visit};

/// One entry of the displayed feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum FeedItem {
    Visit(Visit),
    Tab(Tab),
    Object(LinkObject),
}

impl FeedEntry for FeedItem {
    fn url(&self) -> &str {
        match self {
            FeedItem::Visit(v) => &v.url,
            FeedItem::Tab(t) => &t.url,
            FeedItem::Object(o) => &o.url,
        }
    }

    fn title(&self) -> &str {
        match self {
            FeedItem::Visit(v) => &v.title,
            FeedItem::Tab(t) => &t.title,
            FeedItem::Object(o) => &o.title,
        }
    }
}

/// Where the mounted feed's rows come from.
enum FeedSource<'a> {
    OpenTabs,
    History,
    Objects(&'a [LinkObject]),
}

/// Everything the overlay needs to render the feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub identity: FeedIdentity,
    pub applied_view: View,
    pub displayed_view: View,
    pub is_loading: bool,
    pub is_fetching_first_batch: bool,
    pub rows: Vec<FeedRow<FeedItem>>,
    pub total_size: u32,
    pub focused: Option<usize>,
    pub selected: Vec<usize>,
    pub actions: Vec<BulkAction>,
    pub restore_focus: bool,
    /// Query of the search feed, when it is the one displayed.
    pub search_query: Option<String>,
}

/// Reply to `load_initial_data`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialData {
    pub is_authenticated: bool,
    pub should_sync: bool,
    pub windows: WindowsFeed,
    pub initial_view: View,
    pub views: Vec<View>,
}

/// Result of a keyboard move.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationReport {
    pub focused: Option<usize>,
    pub selected: Vec<usize>,
    /// The host should fetch the next page.
    pub load_more: bool,
}

/// Result of a key chord.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyReport {
    pub command: Option<Command>,
    pub effects: Vec<HostEffect>,
    pub load_more: bool,
}

#[derive(Debug)]
enum ActiveMenu {
    Tags(Combobox<String>),
    Sources(Combobox<SourceEntry>),
    Windows {
        display_all_open: bool,
        combobox: Combobox<Tab>,
    },
}

enum MenuChoice {
    Tag(String),
    Source(String),
    Tab { tab_id: i64, window_id: i64 },
    Nothing,
}

/// Rendered state of the open menu.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSnapshot {
    pub kind: MenuKind,
    pub query: String,
    pub rows: Vec<String>,
    pub index: Option<usize>,
    pub can_create: bool,
}

fn menu_snapshot<T: ComboboxItem>(kind: MenuKind, combobox: &Combobox<T>) -> MenuSnapshot {
    MenuSnapshot {
        kind,
        query: combobox.query().to_string(),
        rows: combobox.results().iter().map(|item| item.label().to_string()).collect(),
        index: combobox.index(),
        can_create: combobox.can_create(),
    }
}

fn to_object<T: FeedEntry>(entry: &T) -> LinkObject {
    LinkObject {
        title: entry.title().to_string(),
        url: entry.url().to_string(),
        favicon: None,
        root_domain: root_domain(entry.url()),
        is_saved: false,
        is_file: false,
        tags: Vec::new(),
    }
}

/// Central application struct holding all managers and state machines.
pub struct App {
    pub db: Arc<Database>,
    pub settings_engine: SettingsEngine,
    pub shortcut_manager: ShortcutManager,
    pub viewer: ViewerStore,
    pub history: HistoryManager,
    pub windows: WindowsManager,
    pub views: ViewsManager,
    pub search: SearchManager,
    navigator: FeedNavigator,
    virtualizer: FeedVirtualizer,
    menu: Option<ActiveMenu>,
    pending_saves: HashMap<String, (LinkObject, Option<SaveState>)>,
    windows_generation: u64,
    bucketer: Option<DayBucketer>,
}

impl App {
    /// Opens the database at `db_path` and loads settings from the platform
    /// config directory.
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(Database::open(db_path)?);

        let mut settings_engine = SettingsEngine::new(None);
        if let Err(e) = settings_engine.load() {
            warn!(error = %e, "settings unreadable, using defaults");
        }

        Ok(Self::from_parts(db, settings_engine)?)
    }

    /// Builds the app around an open database and a loaded settings engine.
    pub fn from_parts(db: Arc<Database>, settings_engine: SettingsEngine) -> Result<Self, ViewerError> {
        let mut viewer = ViewerStore::new(db.clone());
        viewer.init()?;

        let settings = settings_engine.get_settings().clone();
        let initial = match settings.surface {
            Surface::Jumper => View::all_open(),
            Surface::NewTab => View::saved(),
        };

        let mut app = Self {
            db,
            settings_engine,
            shortcut_manager: ShortcutManager::new(),
            viewer,
            history: HistoryManager::new(),
            windows: WindowsManager::default(),
            views: ViewsManager::new(View::all_open()),
            search: SearchManager::new(),
            navigator: FeedNavigator::default(),
            virtualizer: FeedVirtualizer::new(settings.feed.clone()),
            menu: None,
            pending_saves: HashMap::new(),
            windows_generation: 0,
            bucketer: None,
        };
        app.apply_view_with(initial, LoadOrigin::Programmatic);
        Ok(app)
    }

    /// Pins "today" for day bucketing. Without it the wall clock is used.
    pub fn set_bucketer(&mut self, bucketer: DayBucketer) {
        self.bucketer = Some(bucketer);
    }

    fn bucketer(&self) -> DayBucketer {
        self.bucketer.unwrap_or_else(DayBucketer::local_now)
    }

    pub fn settings(&self) -> &JumperSettings {
        self.settings_engine.get_settings()
    }

    /// Re-reads list geometry after a settings change.
    pub fn apply_feed_settings(&mut self) {
        self.virtualizer = FeedVirtualizer::new(self.settings().feed.clone());
        self.rebind();
    }

    pub fn viewer_object_count(&self) -> usize {
        self.viewer.get().objects.len()
    }

    pub fn surface(&self) -> Surface {
        self.settings().surface
    }

    /// Default views followed by the user's views, in menu order.
    pub fn available_views(&self) -> Vec<View> {
        let mut views = default_views(self.surface(), &self.viewer.get().settings);
        views.extend(self.viewer.get().views.iter().cloned());
        views
    }

    fn find_view(&self, view_id: &str) -> Result<View, ViewerError> {
        self.available_views()
            .into_iter()
            .find(|v| v.id == view_id)
            .ok_or_else(|| ViewerError::NotFound(view_id.to_string()))
    }

    // ─── Initial data ───

    /// Populates the windows feed and picks the first view: "Recent" when only
    /// one tab is open (with `history` as its first page), otherwise the
    /// surface's default.
    pub fn load_initial_data(
        &mut self,
        window_id: i64,
        tabs: Vec<Tab>,
        history: Option<Vec<Session>>,
    ) -> InitialData {
        self.windows.set_active_window(window_id);
        self.refresh_windows(tabs);

        let single_tab = self.windows.windows_feed().all_open.len() == 1;
        let initial_view = if single_tab {
            if let Some(sessions) = history {
                let bucketer = self.bucketer();
                self.history.load_more(&sessions, &bucketer);
            }
            View::recent()
        } else {
            match self.surface() {
                Surface::Jumper => View::all_open(),
                Surface::NewTab => View::saved(),
            }
        };
        self.apply_view_with(initial_view.clone(), LoadOrigin::User);

        let interval = Duration::minutes(self.settings().sync.interval_minutes);
        InitialData {
            is_authenticated: self.viewer.get().is_authenticated,
            should_sync: self.viewer.should_sync(Utc::now(), interval),
            windows: self.windows.windows_feed().clone(),
            initial_view,
            views: self.available_views(),
        }
    }

    // ─── Views ───

    fn apply_view_with(&mut self, view: View, origin: LoadOrigin) {
        if let ViewTransition::Loading { token } = self.views.apply_view(view.clone(), origin) {
            let result = self.viewer.query_view_feed(&view);
            self.views.resolve_load(token, result);
        }
        self.rebind();
    }

    pub fn apply_view(&mut self, view_id: &str) -> Result<FeedSnapshot, ViewerError> {
        let view = self.find_view(view_id)?;
        self.apply_view_with(view, LoadOrigin::User);
        Ok(self.feed_snapshot())
    }

    pub fn cycle_view(&mut self, direction: Direction) -> FeedSnapshot {
        let views = self.available_views();
        if let Some(target) = self.views.cycle_target(&views, direction) {
            self.apply_view_with(target, LoadOrigin::User);
        }
        self.feed_snapshot()
    }

    /// Creates a tag view and shows it without taking focus.
    pub fn create_view_by_tag(&mut self, tag: &str) -> Result<View, ViewerError> {
        let view = self.viewer.create_view_by_tag(tag)?;
        self.apply_view_with(view.clone(), LoadOrigin::Programmatic);
        Ok(view)
    }

    /// Creates a source view and shows it without taking focus.
    pub fn create_view_by_source(&mut self, source: &str) -> Result<View, ViewerError> {
        let entry = self
            .viewer
            .sources()
            .into_iter()
            .find(|s| s.source == source)
            .unwrap_or_else(|| SourceEntry {
                source: source.to_string(),
                title: source.to_string(),
                favicon: None,
                root_domain: source.to_string(),
            });
        let view = self.viewer.create_view_by_source(&entry)?;
        self.apply_view_with(view.clone(), LoadOrigin::Programmatic);
        Ok(view)
    }

    /// Removes a user view. If it was applied, the view before it takes over.
    pub fn remove_view(&mut self, view_id: &str) -> Result<FeedSnapshot, ViewerError> {
        let views = self.available_views();
        let fallback = self.views.fallback_after_removal(&views, view_id);
        self.viewer.remove_view(view_id)?;
        if let Some(view) = fallback {
            self.apply_view_with(view, LoadOrigin::User);
        }
        Ok(self.feed_snapshot())
    }

    pub fn update_viewer_settings(&mut self, patch: &ViewerSettingsPatch) -> Result<ViewerSettings, ViewerError> {
        let before = self.viewer.get().settings.clone();
        let after = self.viewer.update_viewer_settings(patch)?;
        if let Some((view, origin)) = self.views.on_settings_changed(self.surface(), &before, &after) {
            self.apply_view_with(view, origin);
        }
        Ok(after)
    }

    /// Applies a freshly synced library and refreshes the displayed object view.
    pub fn sync_library(&mut self, library: &[LibraryObject], now: DateTime<Utc>) -> Result<(), ViewerError> {
        self.viewer.apply_library(library, now)?;
        let displayed = self.views.displayed_view().clone();
        if displayed.is_fetched() {
            match self.viewer.query_view_feed(&displayed) {
                Ok(objects) => self.views.reload_displayed(objects),
                Err(e) => warn!(view = %displayed.id, error = %e, "displayed view not reloaded"),
            }
        }
        self.rebind();
        Ok(())
    }

    /// Forgets the signed-in user. A displayed user view falls back to the
    /// first default view.
    pub fn reset_viewer(&mut self) -> Result<(), ViewerError> {
        self.viewer.reset()?;
        self.pending_saves.clear();
        let views = self.available_views();
        let applied = self.views.applied_view().id.clone();
        if !views.iter().any(|v| v.id == applied) {
            if let Some(first) = views.into_iter().next() {
                self.apply_view_with(first, LoadOrigin::User);
                return Ok(());
            }
        }
        self.rebind();
        Ok(())
    }

    // ─── Feeds ───

    /// Merges one history page. An empty page means there is nothing left.
    pub fn load_more_history(&mut self, sessions: &[Session]) -> GroupingStats {
        let bucketer = self.bucketer();
        let stats = self.history.load_more(sessions, &bucketer);
        if sessions.is_empty() {
            self.virtualizer.set_has_more(false);
            self.virtualizer.release_load_more();
        }
        self.rebind();
        stats
    }

    /// The host could not fetch the requested page; allow a retry.
    pub fn history_load_failed(&mut self) {
        self.virtualizer.release_load_more();
    }

    pub fn refresh_windows(&mut self, tabs: Vec<Tab>) -> &WindowsFeed {
        self.windows.set_windows_feed(tabs);
        self.windows_generation += 1;

        if let Some(ActiveMenu::Windows {
            display_all_open,
            combobox,
        }) = &mut self.menu
        {
            let entries = self.windows.menu_entries(*display_all_open).into_iter().cloned().collect();
            combobox.set_items(entries);
        }
        self.rebind();
        self.windows.windows_feed()
    }

    // ─── Search ───

    /// Matches `query` against saved objects, then history, one row per URL.
    fn local_search(&self, query: &str) -> Vec<LinkObject> {
        let mut seen = HashSet::new();
        let saved = self
            .viewer
            .get()
            .objects
            .iter()
            .filter(|o| matches_query(*o, query))
            .cloned();
        let visited = self
            .history
            .sessions_feed()
            .buckets()
            .iter()
            .flat_map(|b| b.visits.iter())
            .filter(|v| matches_query(*v, query))
            .map(to_object);
        saved.chain(visited).filter(|o| seen.insert(o.url.clone())).collect()
    }

    /// Shows the local matches for `query` in place of the view's feed. A
    /// blank query goes back to the view.
    pub fn search(&mut self, query: &str) -> FeedSnapshot {
        let local = self.local_search(query);
        if self.search.set_query(query, local) {
            self.rebind();
        }
        self.feed_snapshot()
    }

    /// Host results for `query`; ignored if the query changed meanwhile.
    pub fn apply_search_results(&mut self, query: &str, results: Vec<LinkObject>) -> bool {
        let applied = self.search.apply_results(query, results);
        if applied {
            self.rebind();
        }
        applied
    }

    pub fn clear_search(&mut self) -> FeedSnapshot {
        if self.search.clear() {
            self.rebind();
        }
        self.feed_snapshot()
    }

    /// The search feed while it has results, otherwise the displayed view.
    fn feed_source(&self) -> FeedSource<'_> {
        if let Some(results) = self.search.results() {
            return FeedSource::Objects(results);
        }
        match self.views.displayed_content() {
            ViewContent::OpenTabs => FeedSource::OpenTabs,
            ViewContent::History => FeedSource::History,
            ViewContent::Objects(objects) => FeedSource::Objects(objects),
        }
    }

    fn feed_rows(&self) -> Vec<FeedRow<FeedItem>> {
        match self.feed_source() {
            FeedSource::OpenTabs => list_rows(&self.windows.windows_feed().all_open)
                .into_iter()
                .map(|row| row.map(|tab| FeedItem::Tab(tab.clone())))
                .collect(),
            FeedSource::History => history_rows(self.history.sessions_feed())
                .into_iter()
                .map(|row| row.map(|visit| FeedItem::Visit(visit.clone())))
                .collect(),
            FeedSource::Objects(objects) => list_rows(objects)
                .into_iter()
                .map(|row| row.map(|object| FeedItem::Object(object.clone())))
                .collect(),
        }
    }

    fn feed_identity(&self) -> FeedIdentity {
        if let Some(identity) = self.search.feed_identity() {
            return identity;
        }
        let base = self.views.feed_identity();
        let content_generation = match self.views.displayed_content() {
            ViewContent::OpenTabs => self.windows_generation,
            ViewContent::History => self.history.generation(),
            ViewContent::Objects(_) => 0,
        };
        FeedIdentity::new(&base.view_id, base.generation + content_generation)
    }

    fn is_history_feed(&self) -> bool {
        matches!(self.feed_source(), FeedSource::History)
    }

    fn has_more(&self) -> bool {
        self.is_history_feed() && !self.history.is_exhausted()
    }

    fn roving_config(&self) -> RovingConfig {
        RovingConfig {
            initial_index: 0,
            is_infinite_list: self.is_history_feed(),
            with_focus_on_hover: true,
        }
    }

    /// Points the navigator and virtualizer at the displayed feed. A change of
    /// view clears focus and selection before any row of the new feed registers.
    fn rebind(&mut self) {
        let rows = self.feed_rows();
        let identity = self.feed_identity();
        let selectable = selectable_count(&rows);
        let config = self.roving_config();
        let has_more = self.has_more();

        self.navigator.bind(identity.clone(), selectable, config);
        self.navigator.sync_rows(selectable);
        self.virtualizer.set_feed(identity, &rows, has_more);
    }

    pub fn feed_snapshot(&mut self) -> FeedSnapshot {
        let rows = self.feed_rows();
        FeedSnapshot {
            identity: self.feed_identity(),
            applied_view: self.views.applied_view().clone(),
            displayed_view: self.views.displayed_view().clone(),
            is_loading: self.views.is_loading(),
            is_fetching_first_batch: self.is_history_feed() && self.history.is_fetching_first_batch(),
            rows,
            total_size: self.virtualizer.total_size(),
            focused: self.navigator.roving().focused(),
            selected: self.navigator.selection().selected_indices(),
            actions: self.navigator.selection().actions(),
            restore_focus: self.views.take_restore_focus(),
            search_query: self.search.is_active().then(|| self.search.query().to_string()),
        }
    }

    /// Reports rendered rows; true when the host should fetch the next page.
    pub fn on_items_rendered(&mut self, start: usize, end: usize) -> bool {
        self.virtualizer.on_items_rendered(start..end)
    }

    // ─── Navigation & selection ───

    fn report(&self, load_more: bool) -> NavigationReport {
        NavigationReport {
            focused: self.navigator.roving().focused(),
            selected: self.navigator.selection().selected_indices(),
            load_more,
        }
    }

    pub fn navigate(&mut self, direction: Direction, extend: bool) -> NavigationReport {
        let outcome = self.navigator.move_focus(direction, extend);
        let load_more = outcome == NavigationOutcome::LoadMore && self.virtualizer.request_load_more();
        self.report(load_more)
    }

    pub fn focus(&mut self, index: usize) -> bool {
        self.navigator.roving_mut().focus(index)
    }

    pub fn hover(&mut self, index: usize) -> bool {
        self.navigator.hover(index)
    }

    pub fn toggle_selection(&mut self, index: usize) -> NavigationReport {
        self.navigator.toggle(index);
        self.report(false)
    }

    pub fn extend_selection(&mut self, index: usize) -> NavigationReport {
        self.navigator.extend_to(index);
        self.report(false)
    }

    pub fn clear_selection(&mut self) {
        self.navigator.selection_mut().clear();
    }

    fn selected_objects(&self) -> Vec<LinkObject> {
        let roving = self.navigator.roving();
        let selection = self.navigator.selection();
        match self.feed_source() {
            FeedSource::OpenTabs => {
                let tabs = &self.windows.windows_feed().all_open;
                selection
                    .resolve_selected(roving, |i| tabs.get(i))
                    .into_iter()
                    .map(to_object)
                    .collect()
            }
            FeedSource::History => selection
                .resolve_selected(roving, |i| self.history.visit_at(i))
                .into_iter()
                .map(to_object)
                .collect(),
            FeedSource::Objects(objects) => selection
                .resolve_selected(roving, |i| objects.get(i))
                .into_iter()
                .cloned()
                .collect(),
        }
    }

    /// Enter on the feed: opens the checked rows, or the focused one. A single
    /// open tab is activated instead of reopened.
    pub fn submit(&mut self) -> Vec<HostEffect> {
        let is_batch = !self.navigator.selection().is_empty();

        let effects = match self.feed_source() {
            FeedSource::OpenTabs if !is_batch => {
                let tabs = &self.windows.windows_feed().all_open;
                match self.navigator.roving().focused().and_then(|i| tabs.get(i)) {
                    Some(tab) => vec![HostEffect::ActivateTab {
                        tab_id: tab.id,
                        window_id: tab.window_id,
                    }],
                    None => Vec::new(),
                }
            }
            FeedSource::OpenTabs => {
                let tabs = &self.windows.windows_feed().all_open;
                let urls = self.navigator.submit_urls(|i| tabs.get(i));
                vec![HostEffect::OpenUrls { urls }]
            }
            FeedSource::History => {
                let urls = self.navigator.submit_urls(|i| self.history.visit_at(i));
                vec![HostEffect::OpenUrls { urls }]
            }
            FeedSource::Objects(objects) => {
                let urls = self.navigator.submit_urls(|i| objects.get(i));
                vec![HostEffect::OpenUrls { urls }]
            }
        };

        let effects: Vec<HostEffect> = effects
            .into_iter()
            .filter(|e| !matches!(e, HostEffect::OpenUrls { urls } if urls.is_empty()))
            .collect();
        if is_batch && !effects.is_empty() {
            self.navigator.selection_mut().complete_bulk_action::<ViewerError>(&Ok(()));
        }
        effects
    }

    /// Runs a bulk action over the checked rows (or the focused row).
    ///
    /// Saving writes the optimistic placeholder for every URL; the host reports
    /// each outcome through [`complete_save`](Self::complete_save). If the
    /// placeholders cannot be stored nothing changes and the selection is kept.
    pub fn bulk_action(&mut self, action: BulkAction, tag: Option<String>) -> Result<Vec<HostEffect>, ViewerError> {
        let objects = self.selected_objects();
        if objects.is_empty() {
            return Ok(Vec::new());
        }
        let urls: Vec<String> = objects.iter().map(|o| o.url.clone()).collect();

        let effects = match action {
            BulkAction::OpenAll => vec![HostEffect::OpenUrls { urls }],
            BulkAction::GroupIntoTag => {
                let title = tag.unwrap_or_else(|| self.views.displayed_view().name.to_lowercase());
                vec![HostEffect::GroupUrls { urls, title }]
            }
            BulkAction::EditTags => vec![HostEffect::OpenTagEditor { urls }],
            BulkAction::Save => {
                let previous = self.viewer.begin_saves(&urls).map_err(|e| {
                    warn!(count = urls.len(), error = %e, "save placeholders not written");
                    e
                })?;
                for (object, previous) in objects.into_iter().zip(previous) {
                    self.pending_saves.insert(object.url.clone(), (object, previous));
                }
                vec![HostEffect::SaveObjects { urls }]
            }
        };

        info!(?action, "bulk action");
        self.navigator.selection_mut().complete_bulk_action::<ViewerError>(&Ok(()));
        Ok(effects)
    }

    /// Resolves a save started by [`bulk_action`](Self::bulk_action). Returns
    /// whether the link ended up saved; a failure rolls the placeholder back.
    pub fn complete_save(&mut self, url: &str, result: Result<String, String>) -> Result<bool, ViewerError> {
        let Some((object, previous)) = self.pending_saves.remove(url) else {
            debug!(url, "save result for unknown url ignored");
            return Ok(false);
        };
        let saved = self
            .viewer
            .finish_save(&object, previous.clone(), result.map_err(ViewerError::SaveFailed));
        match saved {
            Ok(_) => Ok(true),
            Err(ViewerError::SaveFailed(_)) => Ok(false),
            Err(e) => {
                // Store unchanged; keep the save pending so the result can be replayed.
                self.pending_saves.insert(url.to_string(), (object, previous));
                Err(e)
            }
        }
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu.is_some()
    }

    // ─── Menus ───

    pub fn open_menu(&mut self, kind: MenuKind) -> MenuSnapshot {
        let menu = match kind {
            MenuKind::CreateViewByTag => ActiveMenu::Tags(Combobox::new(self.viewer.slates(), true)),
            MenuKind::CreateViewBySource => ActiveMenu::Sources(Combobox::new(self.viewer.sources(), false)),
            MenuKind::Windows { display_all_open } => ActiveMenu::Windows {
                display_all_open,
                combobox: Combobox::new(
                    self.windows.menu_entries(display_all_open).into_iter().cloned().collect(),
                    false,
                ),
            },
        };
        debug!(?kind, "menu opened");
        self.menu = Some(menu);
        self.menu_snapshot().unwrap_or(MenuSnapshot {
            kind,
            query: String::new(),
            rows: Vec::new(),
            index: None,
            can_create: false,
        })
    }

    pub fn menu_snapshot(&self) -> Option<MenuSnapshot> {
        match self.menu.as_ref()? {
            ActiveMenu::Tags(c) => Some(menu_snapshot(MenuKind::CreateViewByTag, c)),
            ActiveMenu::Sources(c) => Some(menu_snapshot(MenuKind::CreateViewBySource, c)),
            ActiveMenu::Windows {
                display_all_open,
                combobox,
            } => Some(menu_snapshot(
                MenuKind::Windows {
                    display_all_open: *display_all_open,
                },
                combobox,
            )),
        }
    }

    /// Tag queries are normalised to slugs before filtering.
    pub fn menu_query(&mut self, query: &str) -> Option<MenuSnapshot> {
        match self.menu.as_mut()? {
            ActiveMenu::Tags(c) => c.set_query(&normalize_tag_query(query)),
            ActiveMenu::Sources(c) => c.set_query(query),
            ActiveMenu::Windows { combobox, .. } => combobox.set_query(query),
        }
        self.menu_snapshot()
    }

    pub fn menu_move(&mut self, direction: Direction) -> Option<MenuSnapshot> {
        let index = match self.menu.as_mut()? {
            ActiveMenu::Tags(c) => Self::move_combobox(c, direction),
            ActiveMenu::Sources(c) => Self::move_combobox(c, direction),
            ActiveMenu::Windows { combobox, .. } => Self::move_combobox(combobox, direction),
        };
        debug!(?index, "menu index moved");
        self.menu_snapshot()
    }

    fn move_combobox<T: ComboboxItem>(combobox: &mut Combobox<T>, direction: Direction) -> Option<usize> {
        match direction {
            Direction::Next => combobox.move_down(),
            Direction::Previous => combobox.move_up(),
        }
    }

    pub fn menu_select(&mut self, index: usize) -> bool {
        match self.menu.as_mut() {
            Some(ActiveMenu::Tags(c)) => c.select(index),
            Some(ActiveMenu::Sources(c)) => c.select(index),
            Some(ActiveMenu::Windows { combobox, .. }) => combobox.select(index),
            None => false,
        }
    }

    /// Submits the highlighted menu row. Picking a tag or source that already
    /// has a view applies it; anything else creates the view. The menu closes
    /// unless nothing was highlighted.
    pub fn menu_submit(&mut self) -> Result<Vec<HostEffect>, ViewerError> {
        let Some(menu) = self.menu.take() else {
            return Ok(Vec::new());
        };

        let choice = match &menu {
            ActiveMenu::Tags(combobox) => match combobox.submit() {
                ComboboxSubmit::Item { item, .. } => MenuChoice::Tag(item.clone()),
                ComboboxSubmit::Create(query) => MenuChoice::Tag(query),
                ComboboxSubmit::Nothing => MenuChoice::Nothing,
            },
            ActiveMenu::Sources(combobox) => match combobox.submit() {
                ComboboxSubmit::Item { item, .. } => MenuChoice::Source(item.source.clone()),
                _ => MenuChoice::Nothing,
            },
            ActiveMenu::Windows { combobox, .. } => match combobox.submit() {
                ComboboxSubmit::Item { item, .. } => MenuChoice::Tab {
                    tab_id: item.id,
                    window_id: item.window_id,
                },
                _ => MenuChoice::Nothing,
            },
        };

        match choice {
            MenuChoice::Tag(tag) => {
                match self.viewer.views_slates_lookup().get(&tag).cloned() {
                    Some(view) => self.apply_view_with(view, LoadOrigin::User),
                    None => {
                        self.create_view_by_tag(&tag)?;
                    }
                }
                Ok(Vec::new())
            }
            MenuChoice::Source(source) => {
                match self.viewer.views_sources_lookup().get(&source).cloned() {
                    Some(view) => self.apply_view_with(view, LoadOrigin::User),
                    None => {
                        self.create_view_by_source(&source)?;
                    }
                }
                Ok(Vec::new())
            }
            MenuChoice::Tab { tab_id, window_id } => Ok(vec![HostEffect::ActivateTab { tab_id, window_id }]),
            MenuChoice::Nothing => {
                self.menu = Some(menu);
                Ok(Vec::new())
            }
        }
    }

    /// Closes the open menu without submitting. Focus goes back to the feed.
    pub fn menu_dismiss(&mut self) -> Vec<HostEffect> {
        match self.menu.take() {
            Some(_) => vec![HostEffect::RestoreFocus],
            None => Vec::new(),
        }
    }

    /// Escape: closes a menu if one is open, otherwise the overlay.
    pub fn close_overlay(&mut self) -> Vec<HostEffect> {
        if self.menu.is_some() {
            return self.menu_dismiss();
        }
        vec![HostEffect::CloseOverlay]
    }

    // ─── Keyboard ───

    /// Dispatches a key chord. While a menu is open it owns the arrow, enter
    /// and escape keys; every other command is ignored.
    pub fn handle_key(&mut self, keys: &str) -> Result<KeyReport, ViewerError> {
        let Some(command) = self.shortcut_manager.resolve(keys) else {
            return Ok(KeyReport::default());
        };
        let mut report = KeyReport {
            command: Some(command),
            ..KeyReport::default()
        };

        if self.menu.is_some() {
            match command {
                Command::FocusNext => {
                    self.menu_move(Direction::Next);
                }
                Command::FocusPrevious => {
                    self.menu_move(Direction::Previous);
                }
                Command::Submit => report.effects = self.menu_submit()?,
                Command::Dismiss => report.effects = self.menu_dismiss(),
                _ => {}
            }
            return Ok(report);
        }

        match command {
            Command::NextView => {
                self.cycle_view(Direction::Next);
            }
            Command::PreviousView => {
                self.cycle_view(Direction::Previous);
            }
            Command::OpenCreateViewMenu => {
                self.open_menu(MenuKind::CreateViewByTag);
            }
            Command::FocusNext | Command::ExtendNext => {
                report.load_more = self.navigate(Direction::Next, command == Command::ExtendNext).load_more;
            }
            Command::FocusPrevious | Command::ExtendPrevious => {
                report.load_more = self
                    .navigate(Direction::Previous, command == Command::ExtendPrevious)
                    .load_more;
            }
            Command::Submit => report.effects = self.submit(),
            Command::Dismiss => report.effects = self.close_overlay(),
            Command::ToggleSelection => {
                if let Some(index) = self.navigator.roving().focused() {
                    self.navigator.toggle(index);
                }
            }
        }
        Ok(report)
    }
}
