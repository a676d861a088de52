//! Navigation state bound to the feed currently mounted in the list.

use tracing::debug;

use super::multi_selection::MultiSelection;
use super::roving_tab_index::{NavigationOutcome, RovingConfig, RovingTabIndex};
use super::Direction;
use crate::types::feed::{FeedEntry, FeedIdentity};

/// Roving focus and multi-selection for one feed identity.
///
/// Indices are only meaningful for the identity they were produced under. A
/// change of view drops every registered row and the selection before rows of
/// the new feed register, so nothing leaks from one feed into the next.
#[derive(Debug, Default)]
pub struct FeedNavigator {
    identity: Option<FeedIdentity>,
    roving: RovingTabIndex,
    selection: MultiSelection,
}

impl FeedNavigator {
    pub fn new(config: RovingConfig) -> Self {
        Self {
            identity: None,
            roving: RovingTabIndex::new(config),
            selection: MultiSelection::default(),
        }
    }

    pub fn identity(&self) -> Option<&FeedIdentity> {
        self.identity.as_ref()
    }

    /// Binds the navigator to `identity`. Returns true when the previous
    /// state was torn down (the view changed); the roving index then starts
    /// over with `config`.
    ///
    /// A new generation of the same view (more history merged, a reload) keeps
    /// focus and selection, updates the selectable count and re-arms the
    /// keyboard load-more signal, even if the new content added no rows.
    pub fn bind(&mut self, identity: FeedIdentity, total_selectable_items: usize, config: RovingConfig) -> bool {
        let changed_view = match &self.identity {
            Some(current) => !current.same_view(&identity),
            None => true,
        };

        if changed_view {
            debug!(view = %identity.view_id, "feed navigator rebound");
            self.roving = RovingTabIndex::new(config);
            self.selection.clear();
        } else if self.identity.as_ref() != Some(&identity) {
            self.roving.rearm_load_more();
        }
        self.selection.set_total_selectable_items(total_selectable_items);
        self.identity = Some(identity);
        changed_view
    }

    pub fn roving(&self) -> &RovingTabIndex {
        &self.roving
    }

    pub fn roving_mut(&mut self) -> &mut RovingTabIndex {
        &mut self.roving
    }

    pub fn selection(&self) -> &MultiSelection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut MultiSelection {
        &mut self.selection
    }

    /// Makes navigation indices `0..count` exactly the registered rows.
    pub fn sync_rows(&mut self, count: usize) {
        self.roving.truncate(count);
        for index in 0..count {
            if !self.roving.is_registered(index) {
                self.roving.register(index);
            }
        }
    }

    /// Arrow-key move. With `extend` (shift held) the rows between the
    /// selection anchor and the new focus are checked.
    pub fn move_focus(&mut self, direction: Direction, extend: bool) -> NavigationOutcome {
        let before = self.roving.focused();
        let outcome = match direction {
            Direction::Next => self.roving.next(),
            Direction::Previous => self.roving.previous(),
        };

        if extend {
            if let NavigationOutcome::Moved(to) = outcome {
                self.selection.extend_to(before.unwrap_or(to), to);
            }
        }
        outcome
    }

    pub fn hover(&mut self, index: usize) -> bool {
        self.roving.hover(index)
    }

    /// Checkbox click: toggles the row. Focus stays where it is.
    pub fn toggle(&mut self, index: usize) -> bool {
        self.selection.toggle(index)
    }

    /// Shift+click: range-selects from the anchor (or the focused row) to `index`.
    pub fn extend_to(&mut self, index: usize) {
        let from = self.roving.focused().unwrap_or(index);
        self.selection.extend_to(from, index);
        self.roving.focus(index);
    }

    /// URLs the submit gesture applies to: every checked row, or the focused
    /// row alone when nothing is checked.
    pub fn submit_urls<'a, T, R>(&self, resolve: R) -> Vec<String>
    where
        T: FeedEntry + 'a,
        R: Fn(usize) -> Option<&'a T>,
    {
        self.selection
            .resolve_selected(&self.roving, resolve)
            .into_iter()
            .map(|entry| entry.url().to_string())
            .collect()
    }
}
