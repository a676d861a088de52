use serde::{Deserialize, Serialize};

/// An open browser tab.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: i64,
    pub window_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub root_domain: String,
}

/// Open tabs split into the focused window and every window.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WindowsFeed {
    pub current_window: Vec<Tab>,
    pub all_open: Vec<Tab>,
}
