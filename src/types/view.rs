use serde::{Deserialize, Serialize};

/// Kind of a view. Default views are process constants; `Custom` views are
/// created by the user from a tag or a source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ViewType {
    AllOpen,
    Recent,
    Saved,
    Files,
    Custom,
}

/// Additional data shown next to a custom view's name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewMetadata {
    #[serde(default)]
    pub favicon: Option<String>,
}

/// A named filter over the user's objects and history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub view_type: ViewType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_by_slate_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_by_source: Option<String>,
    #[serde(default)]
    pub metadata: ViewMetadata,
}

impl View {
    fn default_view(id: &str, name: &str, view_type: ViewType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            view_type,
            filter_by_slate_id: None,
            filter_by_source: None,
            metadata: ViewMetadata::default(),
        }
    }

    pub fn all_open() -> Self {
        Self::default_view("allOpen", "All Open", ViewType::AllOpen)
    }

    pub fn recent() -> Self {
        Self::default_view("recent", "Recent", ViewType::Recent)
    }

    pub fn saved() -> Self {
        Self::default_view("saved", "Saved", ViewType::Saved)
    }

    pub fn files() -> Self {
        Self::default_view("files", "Files", ViewType::Files)
    }

    /// Returns the default view with the given type, if it is one.
    pub fn default_of(view_type: ViewType) -> Option<Self> {
        match view_type {
            ViewType::AllOpen => Some(Self::all_open()),
            ViewType::Recent => Some(Self::recent()),
            ViewType::Saved => Some(Self::saved()),
            ViewType::Files => Some(Self::files()),
            ViewType::Custom => None,
        }
    }

    pub fn is_default(&self) -> bool {
        self.view_type != ViewType::Custom
    }

    /// Views whose content comes from an asynchronous fetch. While such a feed is
    /// loading the previously applied view stays on screen.
    pub fn is_fetched(&self) -> bool {
        matches!(
            self.view_type,
            ViewType::Saved | ViewType::Files | ViewType::Custom
        )
    }

    pub fn is_tag_view(&self) -> bool {
        self.filter_by_slate_id.is_some()
    }

    pub fn is_source_view(&self) -> bool {
        self.view_type == ViewType::Custom && self.filter_by_source.is_some()
    }
}
