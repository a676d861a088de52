//! Views composition.
//!
//! Tracks the applied view (what the user picked) separately from the displayed
//! view (whose content is on screen). Fetched views keep the previous content
//! visible until their load resolves, and a load that resolves after another
//! view was applied is discarded.

use tracing::{debug, info, warn};

use crate::navigation::Direction;
use crate::types::errors::FeedError;
use crate::types::feed::FeedIdentity;
use crate::types::object::LinkObject;
use crate::types::settings::{Surface, ViewerSettings};
use crate::types::view::{View, ViewType};

/// Default views in menu order for a surface and the user's view flags.
pub fn default_views(surface: Surface, settings: &ViewerSettings) -> Vec<View> {
    let mut views = Vec::with_capacity(4);
    if surface == Surface::Jumper {
        views.push(View::all_open());
    }
    views.push(View::saved());
    if settings.is_files_view_activated {
        views.push(View::files());
    }
    if settings.is_recent_view_activated {
        views.push(View::recent());
    }
    views
}

/// Who asked for a view switch. Programmatic switches (a view was just created
/// or activated) must not pull focus into the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    User,
    Programmatic,
}

/// Outcome of applying a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTransition {
    /// Content is local (open tabs, history) and is displayed right away.
    Shown,
    /// Content must be fetched; resolve with this token.
    Loading { token: u64 },
}

/// Outcome of resolving a pending load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadResolution {
    Applied,
    /// Another view was applied in the meantime; the data was dropped.
    Stale,
    Failed,
}

/// Content of the displayed view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewContent {
    /// Rendered from the windows feed.
    OpenTabs,
    /// Rendered from the history feed.
    History,
    Objects(Vec<LinkObject>),
}

#[derive(Debug, Clone)]
struct PendingLoad {
    token: u64,
    view: View,
}

/// Trait defining views composition operations.
pub trait ViewsManagerTrait {
    fn applied_view(&self) -> &View;
    fn displayed_view(&self) -> &View;
    fn displayed_content(&self) -> &ViewContent;
    fn feed_identity(&self) -> FeedIdentity;
    fn is_loading(&self) -> bool;
    fn apply_view(&mut self, view: View, origin: LoadOrigin) -> ViewTransition;
    fn resolve_load(&mut self, token: u64, result: Result<Vec<LinkObject>, FeedError>) -> LoadResolution;
    fn reload_displayed(&mut self, objects: Vec<LinkObject>);
    fn take_restore_focus(&mut self) -> bool;
}

pub struct ViewsManager {
    applied: View,
    displayed: View,
    content: ViewContent,
    generation: u64,
    pending: Option<PendingLoad>,
    next_token: u64,
    restore_focus: bool,
}

impl ViewsManager {
    /// Starts on `initial`, which must be a local view (all open or recent) or
    /// will show as empty until reloaded.
    pub fn new(initial: View) -> Self {
        let content = Self::local_content(&initial).unwrap_or(ViewContent::Objects(Vec::new()));
        Self {
            applied: initial.clone(),
            displayed: initial,
            content,
            generation: 0,
            pending: None,
            next_token: 1,
            restore_focus: false,
        }
    }

    fn local_content(view: &View) -> Option<ViewContent> {
        match view.view_type {
            ViewType::AllOpen => Some(ViewContent::OpenTabs),
            ViewType::Recent => Some(ViewContent::History),
            _ => None,
        }
    }

    /// Objects of the displayed view; empty for tab and history views.
    pub fn displayed_objects(&self) -> &[LinkObject] {
        match &self.content {
            ViewContent::Objects(objects) => objects,
            _ => &[],
        }
    }

    /// Neighbour of the applied view in `views`, wrapping at both ends.
    pub fn cycle_target(&self, views: &[View], direction: Direction) -> Option<View> {
        if views.is_empty() {
            return None;
        }
        let len = views.len();
        let target = match views.iter().position(|v| v.id == self.applied.id) {
            Some(i) => match direction {
                Direction::Next => (i + 1) % len,
                Direction::Previous => (i + len - 1) % len,
            },
            None => 0,
        };
        views.get(target).cloned()
    }

    /// View to apply after `removed_id` is removed from `views` (defaults then
    /// custom views, as listed before the removal). `None` when the removed view
    /// was not the applied one.
    pub fn fallback_after_removal(&self, views: &[View], removed_id: &str) -> Option<View> {
        if self.applied.id != removed_id {
            return None;
        }
        let position = views.iter().position(|v| v.id == removed_id)?;
        if position > 0 {
            return views.get(position - 1).cloned();
        }
        views.iter().find(|v| v.id != removed_id).cloned()
    }

    /// Views to apply after the flags changed from `before` to `after`.
    ///
    /// A newly activated view is applied programmatically. Disabling the
    /// applied recent/files view falls back to the default view before it.
    pub fn on_settings_changed(
        &self,
        surface: Surface,
        before: &ViewerSettings,
        after: &ViewerSettings,
    ) -> Option<(View, LoadOrigin)> {
        if after.is_recent_view_activated && !before.is_recent_view_activated {
            return Some((View::recent(), LoadOrigin::Programmatic));
        }
        if after.is_files_view_activated && !before.is_files_view_activated {
            return Some((View::files(), LoadOrigin::Programmatic));
        }

        let disabled_applied = match self.applied.view_type {
            ViewType::Recent => before.is_recent_view_activated && !after.is_recent_view_activated,
            ViewType::Files => before.is_files_view_activated && !after.is_files_view_activated,
            _ => false,
        };
        if !disabled_applied {
            return None;
        }

        let previous_defaults = default_views(surface, before);
        let position = previous_defaults.iter().position(|v| v.id == self.applied.id)?;
        let fallback = if position > 0 {
            previous_defaults[position - 1].clone()
        } else {
            default_views(surface, after).into_iter().next()?
        };
        Some((fallback, LoadOrigin::User))
    }
}

impl ViewsManagerTrait for ViewsManager {
    fn applied_view(&self) -> &View {
        &self.applied
    }

    fn displayed_view(&self) -> &View {
        &self.displayed
    }

    fn displayed_content(&self) -> &ViewContent {
        &self.content
    }

    fn feed_identity(&self) -> FeedIdentity {
        FeedIdentity::new(&self.displayed.id, self.generation)
    }

    fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    fn apply_view(&mut self, view: View, origin: LoadOrigin) -> ViewTransition {
        self.restore_focus = origin == LoadOrigin::User;
        self.applied = view.clone();

        if let Some(content) = Self::local_content(&view) {
            if let Some(pending) = self.pending.take() {
                debug!(token = pending.token, view = %pending.view.id, "pending view load superseded");
            }
            info!(view = %view.id, "view applied");
            self.displayed = view;
            self.content = content;
            self.generation += 1;
            return ViewTransition::Shown;
        }

        let token = self.next_token;
        self.next_token += 1;
        debug!(view = %view.id, token, "view load started");
        self.pending = Some(PendingLoad { token, view });
        ViewTransition::Loading { token }
    }

    fn resolve_load(&mut self, token: u64, result: Result<Vec<LinkObject>, FeedError>) -> LoadResolution {
        let is_current = self.pending.as_ref().is_some_and(|p| p.token == token);
        if !is_current {
            debug!(token, "discarding stale view load");
            return LoadResolution::Stale;
        }
        let Some(pending) = self.pending.take() else {
            return LoadResolution::Stale;
        };

        match result {
            Ok(objects) => {
                info!(view = %pending.view.id, items = objects.len(), "view applied");
                self.displayed = pending.view;
                self.content = ViewContent::Objects(objects);
                self.generation += 1;
                LoadResolution::Applied
            }
            Err(e) => {
                warn!(view = %pending.view.id, error = %e, "view load failed");
                self.applied = self.displayed.clone();
                LoadResolution::Failed
            }
        }
    }

    /// Refreshes the displayed object view in place (e.g. after a sync).
    fn reload_displayed(&mut self, objects: Vec<LinkObject>) {
        if let ViewContent::Objects(_) = self.content {
            self.content = ViewContent::Objects(objects);
            self.generation += 1;
        }
    }

    /// Whether the last switch was user initiated, and so the feed should take
    /// focus. Cleared by reading.
    fn take_restore_focus(&mut self) -> bool {
        std::mem::take(&mut self.restore_focus)
    }
}

impl Default for ViewsManager {
    fn default() -> Self {
        Self::new(View::all_open())
    }
}
