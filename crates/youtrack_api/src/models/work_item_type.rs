use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WorkItemType {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}
