use serde::{Deserialize, Serialize};

/// One browsing-history entry.
///
/// `related_visits` collects later visits that share the day bucket, root domain
/// and title of this (canonical) visit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub root_domain: String,
    /// Milliseconds since the UNIX epoch.
    #[serde(default)]
    pub visit_time: i64,
    #[serde(default)]
    pub related_visits: Vec<Visit>,
}

impl Visit {
    pub fn new(url: &str, title: &str, root_domain: &str, visit_time: i64) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
            favicon: None,
            root_domain: root_domain.to_string(),
            visit_time,
            related_visits: Vec::new(),
        }
    }
}

/// One browser history session, as delivered by the history source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Milliseconds since the UNIX epoch.
    pub visit_time: i64,
    #[serde(default)]
    pub visits: Vec<Visit>,
}
