//! Query assist (highlighting and completion) payloads.

use serde::{Deserialize, Serialize};

/// Folder reference sent with a query assist request.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct AssistFolder {
    pub id: String,
    #[serde(rename = "$type", skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct QueryAssistRequest {
    pub query: String,
    pub caret: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<AssistFolder>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryAssistResponse {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub caret: Option<usize>,
    #[serde(default)]
    pub style_ranges: Vec<StyleRange>,
    #[serde(default)]
    pub suggestions: Vec<QuerySuggestion>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StyleRange {
    pub start: usize,
    pub length: usize,
    pub style: Option<String>,
}

/// One completion option offered for the text around the caret.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuerySuggestion {
    pub option: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub description: Option<String>,
    pub matching_start: Option<usize>,
    pub matching_end: Option<usize>,
    pub caret: Option<usize>,
    pub completion_start: Option<usize>,
    pub completion_end: Option<usize>,
    pub group: Option<String>,
    pub icon: Option<String>,
}
