//! Work item filter model with config persistence and change notifications.

use chrono::{Duration, Local, NaiveDate};
use log::{debug, info, warn};
use serde_json::{Map as JsonMap, Value};
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;
use youtrack_api::{HubUser, HubUserGroup, IssueFolder, WorkItemType};

use crate::error::{Result, WidgetError};
use crate::folders::append_query;
use crate::store::ConfigStore;
use crate::wire::{
    format_date, keyed_identifier, parse_date, IdentifierKey, StoredFilter, WireAuthor,
    WireAuthorGroup, WireFilterPayload, WireServiceRef, FILTER_CONFIG_KEY,
};

/// Length of the default reporting window, ending today.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Represents a selected author: Hub ring id, display name and optional avatar URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRef {
    pub id: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Represents a selected author group: Hub ring id and name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupRef {
    pub id: String,
    pub name: Option<String>,
}

impl From<HubUser> for UserRef {
    fn from(user: HubUser) -> Self {
        let avatar_url = user.avatar_url();
        let name = user.display_name();
        Self {
            id: user.id.unwrap_or_default(),
            name,
            avatar_url,
        }
    }
}

impl From<HubUserGroup> for GroupRef {
    fn from(group: HubUserGroup) -> Self {
        Self {
            id: group.id.unwrap_or_default(),
            name: group.name,
        }
    }
}

/// Inclusive date range; a `None` bound is open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// The last seven days through `today`.
    pub fn trailing_week(today: NaiveDate) -> Self {
        Self {
            start: Some(today - Duration::days(DEFAULT_WINDOW_DAYS)),
            end: Some(today),
        }
    }

    pub fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

/// Plain snapshot of every filter field.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterValues {
    pub search_text: Option<String>,
    /// Folder, project, tag or saved search. `None` means everything.
    pub scope: Option<IssueFolder>,
    /// Included work item types. Empty together with `without_work_type == false` means all types.
    pub work_types: Vec<WorkItemType>,
    pub without_work_type: bool,
    pub date_range: DateRange,
    /// Empty author and group lists mean all authors.
    pub authors: Vec<UserRef>,
    pub author_groups: Vec<GroupRef>,
    pub target_service_id: Option<String>,
}

impl FilterValues {
    pub fn defaults(today: NaiveDate) -> Self {
        Self {
            search_text: None,
            scope: None,
            work_types: Vec::new(),
            without_work_type: false,
            date_range: DateRange::trailing_week(today),
            authors: Vec::new(),
            author_groups: Vec::new(),
            target_service_id: None,
        }
    }

    /// True when neither a type list nor the untyped flag narrows the export.
    pub fn includes_all_work_types(&self) -> bool {
        self.work_types.is_empty() && !self.without_work_type
    }

    pub fn includes_all_authors(&self) -> bool {
        self.authors.is_empty() && self.author_groups.is_empty()
    }

    fn from_stored(stored: StoredFilter, today: NaiveDate) -> Self {
        let window = DateRange::trailing_week(today);
        Self {
            search_text: stored.query,
            scope: stored.folder,
            work_types: stored.work_types.unwrap_or_default(),
            without_work_type: stored.without_work_type.unwrap_or(false),
            date_range: DateRange {
                start: resolve_bound(stored.start_date, window.start),
                end: resolve_bound(stored.end_date, window.end),
            },
            authors: stored
                .authors
                .unwrap_or_default()
                .into_iter()
                .filter_map(|author| {
                    let id = author.identifier()?.to_string();
                    Some(UserRef {
                        id,
                        name: author.name,
                        avatar_url: author.avatar_url,
                    })
                })
                .collect(),
            author_groups: stored
                .author_groups
                .unwrap_or_default()
                .into_iter()
                .filter_map(|group| {
                    let id = group.identifier()?.to_string();
                    Some(GroupRef {
                        id,
                        name: group.name,
                    })
                })
                .collect(),
            target_service_id: stored.you_track.and_then(|service| service.id),
        }
    }
}

/// Absent bound takes the default, explicit null stays open, unparsable text takes the default.
fn resolve_bound(raw: Option<Option<String>>, fallback: Option<NaiveDate>) -> Option<NaiveDate> {
    match raw {
        None => fallback,
        Some(None) => None,
        Some(Some(text)) => parse_date(&text).or(fallback),
    }
}

/// Field touched by a mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterField {
    SearchText,
    Scope,
    WorkTypes,
    WithoutWorkType,
    DateRange,
    Authors,
    AuthorGroups,
    TargetService,
    /// Every field, after a restore.
    All,
}

/// Emitted once per mutation with the state after it.
#[derive(Clone, Debug)]
pub struct FilterEvent {
    pub field: FilterField,
    pub values: FilterValues,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// State was read from the config store.
    Restored,
    /// Nothing usable was stored; defaults were written back.
    Defaulted,
}

/// Filter state for one widget session.
pub struct FilterState {
    values: FilterValues,
    pinned_today: Option<NaiveDate>,
    observers: Mutex<Vec<mpsc::UnboundedSender<FilterEvent>>>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// State whose default date window is computed from a fixed day.
    pub fn with_today(today: NaiveDate) -> Self {
        Self::build(Some(today))
    }

    fn build(pinned_today: Option<NaiveDate>) -> Self {
        let today = pinned_today.unwrap_or_else(|| Local::now().date_naive());
        Self {
            values: FilterValues::defaults(today),
            pinned_today,
            observers: Mutex::new(Vec::new()),
        }
    }

    fn today(&self) -> NaiveDate {
        self.pinned_today
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn values(&self) -> &FilterValues {
        &self.values
    }

    pub fn target_service_id(&self) -> Option<&str> {
        self.values.target_service_id.as_deref()
    }

    /// Receives one event per mutation made after this call.
    ///
    /// The queue is unbounded; a slow observer never loses events.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<FilterEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sender);
        receiver
    }

    fn notify(&self, field: FilterField) {
        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        if observers.is_empty() {
            return;
        }
        let event = FilterEvent {
            field,
            values: self.values.clone(),
        };
        // Dropped receivers are forgotten.
        observers.retain(|observer| observer.send(event.clone()).is_ok());
    }

    pub fn set_search_text(&mut self, text: Option<String>) {
        self.values.search_text = text.filter(|value| !value.is_empty());
        self.notify(FilterField::SearchText);
    }

    pub fn set_scope(&mut self, scope: Option<IssueFolder>) {
        self.values.scope = scope;
        self.notify(FilterField::Scope);
    }

    /// Narrows by `folder`: it becomes the scope when nothing is selected yet,
    /// otherwise its query is appended to the search text.
    pub fn append_folder(&mut self, folder: IssueFolder) {
        let search_empty = self
            .values
            .search_text
            .as_deref()
            .map_or(true, str::is_empty);
        if search_empty && self.values.scope.is_none() {
            self.set_scope(Some(folder));
            return;
        }
        let fragment = folder.query.clone().unwrap_or_default();
        let search = append_query(self.values.search_text.as_deref(), &fragment);
        self.set_search_text(Some(search));
    }

    pub fn set_work_types(&mut self, work_types: Vec<WorkItemType>) {
        let mut unique: Vec<WorkItemType> = Vec::with_capacity(work_types.len());
        for work_type in work_types {
            if !unique.iter().any(|known| known.id == work_type.id) {
                unique.push(work_type);
            }
        }
        self.values.work_types = unique;
        self.notify(FilterField::WorkTypes);
    }

    /// Adds `work_type` if absent, removes it otherwise.
    pub fn toggle_work_type(&mut self, work_type: WorkItemType) {
        let types = &mut self.values.work_types;
        match types.iter().position(|known| known.id == work_type.id) {
            Some(index) => {
                types.remove(index);
            }
            None => types.push(work_type),
        }
        self.notify(FilterField::WorkTypes);
    }

    pub fn set_without_work_type(&mut self, include: bool) {
        self.values.without_work_type = include;
        self.notify(FilterField::WithoutWorkType);
    }

    pub fn set_date_range(&mut self, range: DateRange) {
        self.values.date_range = range;
        self.notify(FilterField::DateRange);
    }

    /// Entries without an identifier are ignored.
    pub fn set_authors(&mut self, authors: Vec<UserRef>) {
        let mut unique: Vec<UserRef> = Vec::with_capacity(authors.len());
        for author in authors.into_iter().filter(|author| !author.id.trim().is_empty()) {
            if !unique.iter().any(|known| known.id == author.id) {
                unique.push(author);
            }
        }
        self.values.authors = unique;
        self.notify(FilterField::Authors);
    }

    pub fn set_author_groups(&mut self, groups: Vec<GroupRef>) {
        let mut unique: Vec<GroupRef> = Vec::with_capacity(groups.len());
        for group in groups.into_iter().filter(|group| !group.id.trim().is_empty()) {
            if !unique.iter().any(|known| known.id == group.id) {
                unique.push(group);
            }
        }
        self.values.author_groups = unique;
        self.notify(FilterField::AuthorGroups);
    }

    pub fn set_target_service_id(&mut self, service_id: Option<String>) {
        self.values.target_service_id = service_id;
        self.notify(FilterField::TargetService);
    }

    /// Replaces the whole state with the persisted filter.
    ///
    /// A missing, unreadable or mistyped blob is not an error: the state is
    /// reset to defaults and those are written back as the new stored value.
    pub async fn restore(&mut self, store: &dyn ConfigStore) -> Result<RestoreOutcome> {
        let today = self.today();
        match read_stored(store).await {
            Ok(stored) => {
                self.values = FilterValues::from_stored(stored, today);
                info!(
                    "Restored work item filter (service: {})",
                    self.values.target_service_id.as_deref().unwrap_or("<none>")
                );
                self.notify(FilterField::All);
                Ok(RestoreOutcome::Restored)
            }
            Err(err) => {
                warn!("Stored filter unusable, resetting to defaults: {}", err);
                self.values = FilterValues::defaults(today);
                self.notify(FilterField::All);
                self.sync(store).await?;
                Ok(RestoreOutcome::Defaulted)
            }
        }
    }

    /// Writes the full persisted shape under the `filter` config field.
    pub async fn sync(&self, store: &dyn ConfigStore) -> Result<()> {
        let payload = serde_json::to_value(self.to_persisted_filter())?;
        let mut partial = JsonMap::new();
        partial.insert(FILTER_CONFIG_KEY.to_string(), payload);
        debug!("Persisting work item filter");
        store.update(partial).await
    }

    /// Shape stored in dashboard config.
    pub fn to_persisted_filter(&self) -> WireFilterPayload {
        self.to_wire_filter(IdentifierKey::Id)
    }

    /// Shape posted to export and search endpoints.
    pub fn to_rest_filter(&self) -> WireFilterPayload {
        self.to_wire_filter(IdentifierKey::RingId)
    }

    /// Authors and groups without an identifier are left out.
    pub fn to_wire_filter(&self, key: IdentifierKey) -> WireFilterPayload {
        let values = &self.values;
        WireFilterPayload {
            folder: values.scope.clone(),
            query: values.search_text.clone(),
            work_types: values.work_types.clone(),
            without_work_type: values.without_work_type,
            start_date: values.date_range.start.map(format_date),
            end_date: values.date_range.end.map(format_date),
            authors: values
                .authors
                .iter()
                .filter(|author| !author.id.trim().is_empty())
                .map(|author| {
                    let (id, ring_id) = keyed_identifier(key, &author.id);
                    WireAuthor {
                        id,
                        ring_id,
                        name: author.name.clone(),
                        avatar_url: author.avatar_url.clone(),
                    }
                })
                .collect(),
            author_groups: values
                .author_groups
                .iter()
                .filter(|group| !group.id.trim().is_empty())
                .map(|group| {
                    let (id, ring_id) = keyed_identifier(key, &group.id);
                    WireAuthorGroup {
                        id,
                        ring_id,
                        name: group.name.clone(),
                    }
                })
                .collect(),
            you_track: WireServiceRef {
                id: values.target_service_id.clone(),
            },
        }
    }
}

async fn read_stored(store: &dyn ConfigStore) -> Result<StoredFilter> {
    let value = store
        .get_field_value(FILTER_CONFIG_KEY)
        .await?
        .filter(|value| !value.is_null())
        .ok_or(WidgetError::MissingFilter)?;
    if !matches!(value, Value::Object(_)) {
        return Err(WidgetError::Store(format!(
            "filter must be an object, got {}",
            value
        )));
    }
    Ok(serde_json::from_value(value)?)
}
