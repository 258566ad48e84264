//! Pinned issue folders: projects, tags and saved searches.

use serde::{Deserialize, Serialize};

/// Represents a pinned issue folder returned by `userIssueFolders`, including id, entity `$type`, display name, the query fragment it stands for and an optional short name (project key).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IssueFolder {
    pub id: String,
    #[serde(rename = "$type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
}

impl IssueFolder {
    /// Label used in folder pickers: `Name (KEY)` when a short name exists.
    pub fn label(&self) -> String {
        let name = self.name.clone().unwrap_or_else(|| self.id.clone());
        match &self.short_name {
            Some(short) if !short.is_empty() => format!("{} ({})", name, short),
            _ => name,
        }
    }
}
