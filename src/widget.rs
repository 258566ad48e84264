//! Widget controller: owns the filter for one session and drives restore,
//! service binding, configuration loading, suggestions and exports.

use std::sync::Arc;

use log::{error, info, warn};
use youtrack_api::{ExportFormat, HubService, IssueFolder, QueryAssistResponse, WorkItemType};

use crate::error::{Result, WidgetError};
use crate::filter::{FilterState, RestoreOutcome};
use crate::folders::{quick_filters, FolderKind};
use crate::lookup::{AuthorSearch, AuthorSuggestions, QueryAssistant};
use crate::remote::RemoteApi;
use crate::store::ConfigStore;
use crate::suggest::Suggestion;

/// Oldest YouTrack release offering the work item export endpoint.
pub const MIN_YOUTRACK_VERSION: &str = "2019.1";

/// Shown when folder or work type listing fails for the selected service.
pub const SERVICE_UNAVAILABLE_MESSAGE: &str = "Selected YouTrack service is not available";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetStatus {
    /// No YouTrack service could be bound; nothing remote can run.
    Unconfigured,
    /// Freshly added widget bound to a service, waiting for the user to configure it.
    Configuring,
    Ready,
}

/// Downloaded export ready to be saved.
#[derive(Clone, Debug)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

pub struct WidgetController {
    store: Arc<dyn ConfigStore>,
    remote: Arc<dyn RemoteApi>,
    filter: FilterState,
    folders: Option<Vec<IssueFolder>>,
    work_types: Option<Vec<WorkItemType>>,
    assistant: QueryAssistant,
    authors: AuthorSearch,
}

impl WidgetController {
    pub fn new(store: Arc<dyn ConfigStore>, remote: Arc<dyn RemoteApi>) -> Self {
        Self::with_filter(store, remote, FilterState::new())
    }

    pub fn with_filter(store: Arc<dyn ConfigStore>, remote: Arc<dyn RemoteApi>, filter: FilterState) -> Self {
        Self {
            assistant: QueryAssistant::new(remote.clone()),
            authors: AuthorSearch::new(remote.clone()),
            store,
            remote,
            filter,
            folders: None,
            work_types: None,
        }
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn status(&self) -> WidgetStatus {
        if self.filter.target_service_id().is_none() {
            WidgetStatus::Unconfigured
        } else if self.store.is_new_config() && self.folders.is_none() {
            WidgetStatus::Configuring
        } else {
            WidgetStatus::Ready
        }
    }

    pub fn folders(&self) -> Option<&[IssueFolder]> {
        self.folders.as_deref()
    }

    pub fn work_types(&self) -> Option<&[WorkItemType]> {
        self.work_types.as_deref()
    }

    /// Restores the filter and binds it to a YouTrack service.
    ///
    /// The stored service wins; otherwise the first compatible service listed
    /// in Hub is used. Without one the widget stays unconfigured.
    pub async fn initialize(&mut self) -> Result<WidgetStatus> {
        let outcome = self.filter.restore(self.store.as_ref()).await?;
        if outcome == RestoreOutcome::Defaulted {
            info!("Starting with a default work item filter");
        }

        let predefined = self.filter.target_service_id().map(str::to_string);
        let Some(service_id) = self.default_service(predefined).await else {
            warn!("No YouTrack service available; widget stays unconfigured");
            return Ok(WidgetStatus::Unconfigured);
        };

        self.filter.set_target_service_id(Some(service_id));
        self.sync().await?;

        Ok(if self.store.is_new_config() {
            WidgetStatus::Configuring
        } else {
            WidgetStatus::Ready
        })
    }

    async fn default_service(&self, predefined: Option<String>) -> Option<String> {
        if let Some(id) = predefined.filter(|id| !id.is_empty()) {
            return Some(id);
        }
        match self.available_services().await {
            Ok(services) => services.into_iter().next().map(|service| service.id),
            Err(err) => {
                warn!("YouTrack service discovery failed: {}", err);
                None
            }
        }
    }

    /// YouTrack services new enough to export work items.
    pub async fn available_services(&self) -> Result<Vec<HubService>> {
        let services = self.remote.youtrack_services().await?;
        Ok(services
            .into_iter()
            .filter(|service| service.is_compatible(MIN_YOUTRACK_VERSION))
            .collect())
    }

    fn require_service(&self) -> Result<String> {
        self.filter
            .target_service_id()
            .map(str::to_string)
            .ok_or(WidgetError::Unconfigured)
    }

    /// Persists the current filter.
    pub async fn sync(&self) -> Result<()> {
        self.filter.sync(self.store.as_ref()).await
    }

    /// Applies one user edit and persists the result.
    pub async fn edit<F>(&mut self, change: F) -> Result<()>
    where
        F: FnOnce(&mut FilterState),
    {
        change(&mut self.filter);
        self.sync().await
    }

    /// Rebinds the widget to another service and reloads its folders and work types.
    pub async fn select_service(&mut self, service_id: &str) -> Result<()> {
        self.filter.set_target_service_id(Some(service_id.to_string()));
        self.sync().await?;
        self.load_configuration().await
    }

    /// Loads pinned folders and work types for the bound service.
    ///
    /// Failure leaves both lists empty and is reported as
    /// [`WidgetError::ServiceUnavailable`]; nothing is retried.
    pub async fn load_configuration(&mut self) -> Result<()> {
        let service_id = self.require_service()?;
        self.folders = None;
        self.work_types = None;

        let loaded = tokio::try_join!(
            self.remote.issue_folders(&service_id),
            self.remote.work_item_types(&service_id)
        );
        match loaded {
            Ok((folders, work_types)) => {
                info!(
                    "Loaded {} folder(s) and {} work type(s) from {}",
                    folders.len(),
                    work_types.len(),
                    service_id
                );
                self.folders = Some(folders);
                self.work_types = Some(work_types);
                Ok(())
            }
            Err(err) => {
                warn!("Configuration load from {} failed: {}", service_id, err);
                Err(WidgetError::ServiceUnavailable(format!(
                    "{}: {}",
                    SERVICE_UNAVAILABLE_MESSAGE, err
                )))
            }
        }
    }

    /// Loaded folders of `kind` that would still narrow the filter.
    pub fn quick_filters(&self, kind: FolderKind) -> Vec<&IssueFolder> {
        let values = self.filter.values();
        quick_filters(
            self.folders.as_deref().unwrap_or_default(),
            kind,
            values.scope.as_ref(),
            values.search_text.as_deref(),
        )
    }

    /// Narrows the filter by a quick-filter folder and persists it.
    pub async fn apply_quick_filter(&mut self, folder: IssueFolder) -> Result<()> {
        self.edit(|filter| filter.append_folder(folder)).await
    }

    /// Query-assist for the search field, scoped to the current folder.
    pub async fn suggest_query(&self, query: &str, caret: usize) -> Result<Suggestion<QueryAssistResponse>> {
        let service_id = self.require_service()?;
        let scope = self.filter.values().scope.clone();
        self.assistant
            .suggest(&service_id, query, caret, scope.as_ref())
            .await
    }

    pub async fn search_authors(&self, query: &str) -> Result<Suggestion<AuthorSuggestions>> {
        self.require_service()?;
        self.authors.search(query).await
    }

    /// Downloads work items matching the current filter.
    pub async fn export(&self, format: ExportFormat) -> Result<ExportedFile> {
        let service_id = self.require_service()?;
        let payload = self.filter.to_rest_filter();
        match self
            .remote
            .export_work_items(&service_id, &payload, format)
            .await
        {
            Ok(content) => {
                info!("Exported {} byte(s) as {}", content.bytes.len(), format.file_name());
                Ok(ExportedFile {
                    file_name: format.file_name(),
                    mime_type: content
                        .mime_type
                        .unwrap_or_else(|| format.mime_type().to_string()),
                    bytes: content.bytes,
                })
            }
            Err(err) => {
                error!("Work item export failed: {}", err);
                Err(WidgetError::Export(err.to_string()))
            }
        }
    }
}
