//! Viewer store for the jumper background state.
//!
//! Owns the user's saved objects, views and view flags, with an explicit
//! lifecycle (`init`, `get`, `set`, `reset`). Every `set` is written through to
//! the `viewer_backup` table so the state survives a restart of the background
//! process.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::connection::Database;
use crate::services::url_utils::root_domain;
use crate::types::errors::{FeedError, ViewerError};
use crate::types::object::{LibraryObject, LinkObject, SaveState, SourceEntry};
use crate::types::settings::{ViewerSettings, ViewerSettingsPatch};
use crate::types::view::{View, ViewMetadata, ViewType};

/// Row key of the persisted viewer state.
pub const VIEWER_BACKUP_KEY: &str = "viewer_backup";
/// Gateway that serves uploaded files by content id.
pub const IPFS_GATEWAY: &str = "https://slate.textile.io/ipfs";
/// Root domain shown for uploaded files.
pub const SERVICE_DOMAIN: &str = "slate.host";

/// Everything the viewer store knows about the signed-in user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewerState {
    #[serde(default)]
    pub objects: Vec<LinkObject>,
    /// URL to save state. In-flight saves hold [`SaveState::Saving`].
    #[serde(default)]
    pub saved_links: BTreeMap<String, SaveState>,
    #[serde(default)]
    pub views: Vec<View>,
    #[serde(default)]
    pub settings: ViewerSettings,
    #[serde(default)]
    pub last_fetched: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_authenticated: bool,
}

/// Remote side of a link save.
pub trait LinkSaver {
    /// Saves `url` and returns the id of the created object.
    fn save(&mut self, object: &LinkObject) -> Result<String, ViewerError>;
}

/// Result of saving several links in one go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub saved: Vec<String>,
    pub failed: Vec<String>,
}

/// Trait defining viewer store operations.
pub trait ViewerStoreTrait {
    fn init(&mut self) -> Result<&ViewerState, ViewerError>;
    fn get(&self) -> &ViewerState;
    fn set(&mut self, state: ViewerState) -> Result<(), ViewerError>;
    fn reset(&mut self) -> Result<(), ViewerError>;

    fn saved_objects_lookup(&self) -> HashMap<String, String>;
    fn saved_objects_slates(&self) -> HashMap<String, Vec<String>>;
    fn views_sources_lookup(&self) -> HashMap<String, View>;
    fn views_slates_lookup(&self) -> HashMap<String, View>;
    fn slates(&self) -> Vec<String>;
    fn sources(&self) -> Vec<SourceEntry>;
    fn is_link_saved(&self, url: &str) -> bool;

    fn update_viewer_settings(&mut self, patch: &ViewerSettingsPatch) -> Result<ViewerSettings, ViewerError>;
    fn create_view_by_tag(&mut self, tag: &str) -> Result<View, ViewerError>;
    fn create_view_by_source(&mut self, source: &SourceEntry) -> Result<View, ViewerError>;
    fn remove_view(&mut self, id: &str) -> Result<View, ViewerError>;
    fn begin_save(&mut self, url: &str) -> Result<Option<SaveState>, ViewerError>;
    fn begin_saves(&mut self, urls: &[String]) -> Result<Vec<Option<SaveState>>, ViewerError>;
    fn finish_save(
        &mut self,
        object: &LinkObject,
        previous: Option<SaveState>,
        result: Result<String, ViewerError>,
    ) -> Result<String, ViewerError>;
    fn save_link(&mut self, object: &LinkObject, saver: &mut dyn LinkSaver) -> Result<String, ViewerError>;
    fn save_links(&mut self, objects: &[LinkObject], saver: &mut dyn LinkSaver) -> SaveReport;
    fn apply_library(&mut self, library: &[LibraryObject], now: DateTime<Utc>) -> Result<(), ViewerError>;
    fn should_sync(&self, now: DateTime<Utc>, interval: Duration) -> bool;
    fn query_view_feed(&self, view: &View) -> Result<Vec<LinkObject>, FeedError>;
}

/// Viewer store backed by the `viewer_backup` table.
pub struct ViewerStore {
    db: Arc<Database>,
    state: ViewerState,
    initialized: bool,
}

impl ViewerStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            state: ViewerState::default(),
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn load_backup(&self) -> Result<Option<ViewerState>, ViewerError> {
        let data = self
            .db
            .read_backup(VIEWER_BACKUP_KEY)
            .map_err(|e| ViewerError::DatabaseError(e.to_string()))?;

        match data {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| ViewerError::SerializationError(e.to_string())),
            None => Ok(None),
        }
    }

    fn persist(&self, state: &ViewerState) -> Result<(), ViewerError> {
        let json = serde_json::to_string(state)
            .map_err(|e| ViewerError::SerializationError(e.to_string()))?;
        self.db
            .write_backup(VIEWER_BACKUP_KEY, &json, Utc::now().timestamp())
            .map_err(|e| ViewerError::DatabaseError(e.to_string()))
    }

    fn update<F>(&mut self, mutate: F) -> Result<(), ViewerError>
    where
        F: FnOnce(&mut ViewerState),
    {
        let mut next = self.state.clone();
        mutate(&mut next);
        self.set(next)
    }

    fn library_object(object: &LibraryObject) -> (String, String, LinkObject) {
        match object {
            LibraryObject::Link {
                id,
                url,
                link_name,
                link_favicon,
                tags,
            } => (
                url.clone(),
                id.clone(),
                LinkObject {
                    title: link_name.clone(),
                    url: url.clone(),
                    favicon: link_favicon.clone(),
                    root_domain: root_domain(url),
                    is_saved: true,
                    is_file: false,
                    tags: tags.clone(),
                },
            ),
            LibraryObject::File { id, name, cid, tags } => {
                let url = format!("{}/{}", IPFS_GATEWAY, cid);
                (
                    url.clone(),
                    id.clone(),
                    LinkObject {
                        title: name.clone(),
                        url,
                        favicon: None,
                        root_domain: SERVICE_DOMAIN.to_string(),
                        is_saved: true,
                        is_file: true,
                        tags: tags.clone(),
                    },
                )
            }
        }
    }
}

impl ViewerStoreTrait for ViewerStore {
    /// Loads the persisted backup, or starts from the initial state.
    fn init(&mut self) -> Result<&ViewerState, ViewerError> {
        if !self.initialized {
            self.state = self.load_backup()?.unwrap_or_default();
            self.initialized = true;
            debug!(
                objects = self.state.objects.len(),
                views = self.state.views.len(),
                "viewer store initialised"
            );
        }
        Ok(&self.state)
    }

    fn get(&self) -> &ViewerState {
        &self.state
    }

    /// Writes `state` through to the backup, then makes it current. A failed
    /// write leaves the current state untouched.
    fn set(&mut self, state: ViewerState) -> Result<(), ViewerError> {
        self.persist(&state)?;
        self.state = state;
        self.initialized = true;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), ViewerError> {
        info!("viewer store reset");
        self.set(ViewerState::default())
    }

    /// URL to object id, excluding saves that are still in flight.
    fn saved_objects_lookup(&self) -> HashMap<String, String> {
        self.state
            .saved_links
            .iter()
            .filter_map(|(url, state)| match state {
                SaveState::Saved(id) => Some((url.clone(), id.clone())),
                SaveState::Saving => None,
            })
            .collect()
    }

    fn saved_objects_slates(&self) -> HashMap<String, Vec<String>> {
        self.state
            .objects
            .iter()
            .filter(|o| !o.tags.is_empty())
            .map(|o| (o.url.clone(), o.tags.clone()))
            .collect()
    }

    fn views_sources_lookup(&self) -> HashMap<String, View> {
        self.state
            .views
            .iter()
            .filter_map(|v| v.filter_by_source.clone().map(|s| (s, v.clone())))
            .collect()
    }

    fn views_slates_lookup(&self) -> HashMap<String, View> {
        self.state
            .views
            .iter()
            .filter_map(|v| v.filter_by_slate_id.clone().map(|s| (s, v.clone())))
            .collect()
    }

    /// Every tag name in use, in first-seen order.
    fn slates(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.state
            .objects
            .iter()
            .flat_map(|o| o.tags.iter())
            .filter(|tag| seen.insert(tag.as_str()))
            .cloned()
            .collect()
    }

    /// Distinct root domains of saved objects, in first-seen order.
    fn sources(&self) -> Vec<SourceEntry> {
        let mut seen = HashSet::new();
        self.state
            .objects
            .iter()
            .filter(|o| !o.root_domain.is_empty() && seen.insert(o.root_domain.as_str()))
            .map(|o| SourceEntry {
                source: o.root_domain.clone(),
                title: o.root_domain.clone(),
                favicon: o.favicon.clone(),
                root_domain: o.root_domain.clone(),
            })
            .collect()
    }

    fn is_link_saved(&self, url: &str) -> bool {
        self.state.saved_links.contains_key(url)
    }

    fn update_viewer_settings(&mut self, patch: &ViewerSettingsPatch) -> Result<ViewerSettings, ViewerError> {
        self.update(|state| state.settings.apply(patch))?;
        Ok(self.state.settings.clone())
    }

    fn create_view_by_tag(&mut self, tag: &str) -> Result<View, ViewerError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(ViewerError::InvalidView("tag name is empty".to_string()));
        }
        if self.views_slates_lookup().contains_key(tag) {
            return Err(ViewerError::DuplicateView(tag.to_string()));
        }

        let view = View {
            id: Uuid::new_v4().to_string(),
            name: tag.to_string(),
            view_type: ViewType::Custom,
            filter_by_slate_id: Some(tag.to_string()),
            filter_by_source: None,
            metadata: ViewMetadata::default(),
        };
        let created = view.clone();
        self.update(|state| state.views.push(view))?;
        info!(view = %created.id, tag, "view created from tag");
        Ok(created)
    }

    fn create_view_by_source(&mut self, source: &SourceEntry) -> Result<View, ViewerError> {
        if source.source.is_empty() {
            return Err(ViewerError::InvalidView("source is empty".to_string()));
        }
        if self.views_sources_lookup().contains_key(&source.source) {
            return Err(ViewerError::DuplicateView(source.source.clone()));
        }

        let view = View {
            id: Uuid::new_v4().to_string(),
            name: source.title.clone(),
            view_type: ViewType::Custom,
            filter_by_slate_id: None,
            filter_by_source: Some(source.source.clone()),
            metadata: ViewMetadata {
                favicon: source.favicon.clone(),
            },
        };
        let created = view.clone();
        self.update(|state| state.views.push(view))?;
        info!(view = %created.id, source = %source.source, "view created from source");
        Ok(created)
    }

    fn remove_view(&mut self, id: &str) -> Result<View, ViewerError> {
        let position = self.state.views.iter().position(|v| v.id == id);
        let Some(position) = position else {
            if [ViewType::AllOpen, ViewType::Recent, ViewType::Saved, ViewType::Files]
                .iter()
                .filter_map(|t| View::default_of(*t))
                .any(|v| v.id == id)
            {
                return Err(ViewerError::InvalidView(format!("{} is a default view", id)));
            }
            return Err(ViewerError::NotFound(id.to_string()));
        };

        let removed = self.state.views[position].clone();
        self.update(|state| {
            state.views.remove(position);
        })?;
        info!(view = %id, "view removed");
        Ok(removed)
    }

    /// Writes the optimistic `Saving` placeholder for `url`. Returns the state it
    /// replaced, to be handed back to [`finish_save`](Self::finish_save).
    fn begin_save(&mut self, url: &str) -> Result<Option<SaveState>, ViewerError> {
        let mut previous = self.begin_saves(&[url.to_string()])?;
        Ok(previous.pop().flatten())
    }

    /// Writes the placeholders for every URL in one update: either all of them
    /// are stored or none is. Returns the replaced states in `urls` order.
    fn begin_saves(&mut self, urls: &[String]) -> Result<Vec<Option<SaveState>>, ViewerError> {
        let previous: Vec<Option<SaveState>> = urls
            .iter()
            .map(|url| self.state.saved_links.get(url).cloned())
            .collect();
        self.update(|state| {
            for url in urls {
                state.saved_links.insert(url.clone(), SaveState::Saving);
            }
        })?;
        Ok(previous)
    }

    /// Resolves an in-flight save. On failure the URL's previous state is put
    /// back and the error returned.
    fn finish_save(
        &mut self,
        object: &LinkObject,
        previous: Option<SaveState>,
        result: Result<String, ViewerError>,
    ) -> Result<String, ViewerError> {
        match result {
            Ok(id) => {
                let saved_id = id.clone();
                self.update(|state| {
                    state
                        .saved_links
                        .insert(object.url.clone(), SaveState::Saved(id));
                    match state.objects.iter_mut().find(|o| o.url == object.url) {
                        Some(existing) => existing.is_saved = true,
                        None => {
                            let mut saved = object.clone();
                            saved.is_saved = true;
                            if saved.root_domain.is_empty() {
                                saved.root_domain = root_domain(&saved.url);
                            }
                            state.objects.push(saved);
                        }
                    }
                })?;
                debug!(url = %object.url, "link saved");
                Ok(saved_id)
            }
            Err(e) => {
                warn!(url = %object.url, error = %e, "link save failed, rolling back");
                self.update(|state| match previous {
                    Some(prior) => {
                        state.saved_links.insert(object.url.clone(), prior);
                    }
                    None => {
                        state.saved_links.remove(&object.url);
                    }
                })?;
                Err(e)
            }
        }
    }

    fn save_link(&mut self, object: &LinkObject, saver: &mut dyn LinkSaver) -> Result<String, ViewerError> {
        let previous = self.begin_save(&object.url)?;
        let result = saver.save(object);
        self.finish_save(object, previous, result)
    }

    fn save_links(&mut self, objects: &[LinkObject], saver: &mut dyn LinkSaver) -> SaveReport {
        let mut report = SaveReport::default();
        for object in objects {
            match self.save_link(object, saver) {
                Ok(_) => report.saved.push(object.url.clone()),
                Err(_) => report.failed.push(object.url.clone()),
            }
        }
        report
    }

    /// Replaces the objects with a freshly synced library. Views and flags are
    /// kept, as are saves still in flight.
    fn apply_library(&mut self, library: &[LibraryObject], now: DateTime<Utc>) -> Result<(), ViewerError> {
        let mut saved_links: BTreeMap<String, SaveState> = self
            .state
            .saved_links
            .iter()
            .filter(|(_, s)| **s == SaveState::Saving)
            .map(|(u, s)| (u.clone(), s.clone()))
            .collect();
        let mut objects = Vec::with_capacity(library.len());

        for entry in library {
            let (url, id, object) = Self::library_object(entry);
            saved_links.insert(url, SaveState::Saved(id));
            objects.push(object);
        }

        info!(objects = objects.len(), "viewer library synced");
        self.update(|state| {
            state.objects = objects;
            state.saved_links = saved_links;
            state.last_fetched = Some(now);
            state.is_authenticated = true;
        })
    }

    /// Never fetched, or fetched more than `interval` ago.
    fn should_sync(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        match self.state.last_fetched {
            None => true,
            Some(last) => now > last + interval,
        }
    }

    fn query_view_feed(&self, view: &View) -> Result<Vec<LinkObject>, FeedError> {
        let objects = &self.state.objects;
        let feed = match view.view_type {
            ViewType::Saved => objects.iter().filter(|o| !o.is_file).cloned().collect(),
            ViewType::Files => objects.iter().filter(|o| o.is_file).cloned().collect(),
            ViewType::Custom => {
                if let Some(tag) = &view.filter_by_slate_id {
                    objects
                        .iter()
                        .filter(|o| o.tags.iter().any(|t| t == tag))
                        .cloned()
                        .collect()
                } else if let Some(source) = &view.filter_by_source {
                    objects
                        .iter()
                        .filter(|o| &o.root_domain == source)
                        .cloned()
                        .collect()
                } else {
                    return Err(FeedError::Unavailable(format!("view {} has no filter", view.id)));
                }
            }
            ViewType::AllOpen | ViewType::Recent => {
                return Err(FeedError::Unavailable(format!(
                    "{} is not backed by the viewer store",
                    view.name
                )))
            }
        };
        Ok(feed)
    }
}
