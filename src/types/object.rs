use serde::{Deserialize, Serialize};

/// A saved link or file as shown in saved, files and custom views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinkObject {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub root_domain: String,
    #[serde(default)]
    pub is_saved: bool,
    #[serde(default)]
    pub is_file: bool,
    /// Tag names applied to this object.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Save state of a URL. `Saving` is the optimistic placeholder written before
/// the remote save resolves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", content = "id", rename_all = "camelCase")]
pub enum SaveState {
    Saving,
    Saved(String),
}

/// Library entry as delivered by the remote service during a sync.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LibraryObject {
    #[serde(rename_all = "camelCase")]
    Link {
        id: String,
        url: String,
        link_name: String,
        #[serde(default)]
        link_favicon: Option<String>,
        #[serde(default)]
        tags: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    File {
        id: String,
        name: String,
        cid: String,
        #[serde(default)]
        tags: Vec<String>,
    },
}

/// A source (root domain) the user can build a view from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceEntry {
    pub source: String,
    pub title: String,
    #[serde(default)]
    pub favicon: Option<String>,
    pub root_domain: String,
}
