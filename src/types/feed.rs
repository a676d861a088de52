use serde::{Deserialize, Serialize};

use super::object::LinkObject;
use super::tab::Tab;
use super::visit::Visit;

/// Identity of the feed currently mounted in the list.
///
/// Navigation indices, selections and the load-more guard are only valid for
/// one identity. The generation changes whenever the feed's content changes
/// (a history page merged, a view feed reloaded).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedIdentity {
    pub view_id: String,
    pub generation: u64,
}

impl FeedIdentity {
    pub fn new(view_id: &str, generation: u64) -> Self {
        Self {
            view_id: view_id.to_string(),
            generation,
        }
    }

    /// True when both identities refer to the same view, whatever the generation.
    pub fn same_view(&self, other: &FeedIdentity) -> bool {
        self.view_id == other.view_id
    }
}

/// Anything that can be shown as a feed row and acted on in bulk.
pub trait FeedEntry {
    fn url(&self) -> &str;
    fn title(&self) -> &str;
}

impl FeedEntry for Visit {
    fn url(&self) -> &str {
        &self.url
    }
    fn title(&self) -> &str {
        &self.title
    }
}

impl FeedEntry for LinkObject {
    fn url(&self) -> &str {
        &self.url
    }
    fn title(&self) -> &str {
        &self.title
    }
}

impl FeedEntry for Tab {
    fn url(&self) -> &str {
        &self.url
    }
    fn title(&self) -> &str {
        &self.title
    }
}

/// Side effects the host environment must carry out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "camelCase")]
pub enum HostEffect {
    #[serde(rename_all = "camelCase")]
    OpenUrls { urls: Vec<String> },
    #[serde(rename_all = "camelCase")]
    ActivateTab { tab_id: i64, window_id: i64 },
    #[serde(rename_all = "camelCase")]
    GroupUrls { urls: Vec<String>, title: String },
    #[serde(rename_all = "camelCase")]
    SaveObjects { urls: Vec<String> },
    #[serde(rename_all = "camelCase")]
    OpenTagEditor { urls: Vec<String> },
    CloseOverlay,
    /// Move keyboard focus back into the feed.
    RestoreFocus,
}
