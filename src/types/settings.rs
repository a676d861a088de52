use serde::{Deserialize, Serialize};

/// Top-level jumper configuration, persisted by the settings engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct JumperSettings {
    pub surface: Surface,
    pub feed: FeedSettings,
    pub history: HistorySettings,
    pub sync: SyncSettings,
}

/// Where the feeds are rendered. The new-tab page has no "All Open" view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    #[default]
    Jumper,
    NewTab,
}

/// Virtualized list geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedSettings {
    pub item_size: u32,
    pub padding_size: u32,
    pub viewport_height: u32,
    pub overscan: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            item_size: 40,
            padding_size: 8,
            viewport_height: 384,
            overscan: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistorySettings {
    /// Number of sessions requested per history page.
    pub page_size: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { page_size: 50 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncSettings {
    /// Minimum age of the cached library before a lazy sync is worth doing.
    pub interval_minutes: i64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            interval_minutes: 10,
        }
    }
}

/// Per-user view flags kept by the viewer store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ViewerSettings {
    #[serde(default)]
    pub is_recent_view_activated: bool,
    #[serde(default)]
    pub is_files_view_activated: bool,
}

/// Partial update for [`ViewerSettings`]; `None` fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ViewerSettingsPatch {
    #[serde(default)]
    pub is_recent_view_activated: Option<bool>,
    #[serde(default)]
    pub is_files_view_activated: Option<bool>,
}

impl ViewerSettings {
    pub fn apply(&mut self, patch: &ViewerSettingsPatch) {
        if let Some(v) = patch.is_recent_view_activated {
            self.is_recent_view_activated = v;
        }
        if let Some(v) = patch.is_files_view_activated {
            self.is_files_view_activated = v;
        }
    }
}
