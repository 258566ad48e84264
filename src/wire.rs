//! Wire shapes of the work item filter.
//!
//! The same payload is persisted in the dashboard config and posted to the
//! export endpoint. The two differ only in the key carrying author and group
//! identifiers: stored config uses `id`, REST bodies use `ringId`.

use chrono::{DateTime, NaiveDate};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use youtrack_api::{IssueFolder, WorkItemType};

/// Config field holding the persisted filter.
pub const FILTER_CONFIG_KEY: &str = "filter";

/// Calendar date format used for `startDate` and `endDate`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which key carries Hub identifiers of authors and author groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentifierKey {
    /// `id`, used when persisting config.
    Id,
    /// `ringId`, expected by export and search request bodies.
    RingId,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WireFilterPayload {
    pub folder: Option<IssueFolder>,
    pub query: Option<String>,
    pub work_types: Vec<WorkItemType>,
    pub without_work_type: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub authors: Vec<WireAuthor>,
    pub author_groups: Vec<WireAuthorGroup>,
    pub you_track: WireServiceRef,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WireAuthor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "ringId", default, skip_serializing_if = "Option::is_none")]
    pub ring_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "avatarURL", default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WireAuthorGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "ringId", default, skip_serializing_if = "Option::is_none")]
    pub ring_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct WireServiceRef {
    pub id: Option<String>,
}

/// Splits an identifier into the `(id, ringId)` pair for `key`.
pub(crate) fn keyed_identifier(key: IdentifierKey, identifier: &str) -> (Option<String>, Option<String>) {
    match key {
        IdentifierKey::Id => (Some(identifier.to_string()), None),
        IdentifierKey::RingId => (None, Some(identifier.to_string())),
    }
}

impl WireAuthor {
    /// Identifier under either key, ignoring blank values.
    pub fn identifier(&self) -> Option<&str> {
        non_blank(self.id.as_deref()).or_else(|| non_blank(self.ring_id.as_deref()))
    }
}

impl WireAuthorGroup {
    pub fn identifier(&self) -> Option<&str> {
        non_blank(self.id.as_deref()).or_else(|| non_blank(self.ring_id.as_deref()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses a stored date. Accepts the calendar form and, for blobs written by
/// older clients, a full RFC 3339 timestamp whose date part is kept.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(trimmed).ok().map(|dt| dt.date_naive()))
}

/// Filter blob as read back from config.
///
/// Every field is optional so missing sub-fields pick up their defaults.
/// `context` and `search` are accepted as older names of `folder` and `query`.
/// Date bounds keep the absent/null distinction: absent means "use the
/// default window", null means "unbounded".
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredFilter {
    #[serde(default, alias = "context")]
    pub folder: Option<IssueFolder>,
    #[serde(default, alias = "search")]
    pub query: Option<String>,
    #[serde(default)]
    pub work_types: Option<Vec<WorkItemType>>,
    #[serde(default)]
    pub without_work_type: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub start_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub end_date: Option<Option<String>>,
    #[serde(default)]
    pub authors: Option<Vec<WireAuthor>>,
    #[serde(default)]
    pub author_groups: Option<Vec<WireAuthorGroup>>,
    #[serde(default)]
    pub you_track: Option<WireServiceRef>,
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
