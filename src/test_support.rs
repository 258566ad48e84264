//! In-process remote used by unit tests.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use youtrack_api::{
    BinaryContent, ExportFormat, HubAvatar, HubProfile, HubService, HubUser, HubUserGroup,
    IssueFolder, QueryAssistRequest, QueryAssistResponse, WorkItemType, YouTrackError,
};

use crate::error::Result;
use crate::remote::RemoteApi;
use crate::wire::WireFilterPayload;

#[derive(Default)]
pub(crate) struct FakeRemote {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    assist_requests: Vec<QueryAssistRequest>,
    exports: Vec<(String, WireFilterPayload, ExportFormat)>,
    folder_requests: Vec<String>,
    services: Option<Vec<HubService>>,
    services_error: Option<YouTrackError>,
    folders_error: Option<YouTrackError>,
    groups_error: Option<YouTrackError>,
    export_error: Option<YouTrackError>,
}

pub(crate) fn folder(id: &str, entity_type: &str, name: &str, query: &str) -> IssueFolder {
    IssueFolder {
        id: id.to_string(),
        entity_type: Some(entity_type.to_string()),
        name: Some(name.to_string()),
        query: Some(query.to_string()),
        short_name: None,
    }
}

pub(crate) fn service(id: &str, version: &str) -> HubService {
    HubService {
        id: id.to_string(),
        name: Some(format!("YouTrack {id}")),
        home_url: Some(format!("https://{id}.example.com")),
        version: Some(version.to_string()),
        application_name: Some("YouTrack".to_string()),
    }
}

impl FakeRemote {
    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake remote lock")
    }

    pub(crate) fn with_services(services: Vec<HubService>) -> Self {
        let remote = Self::default();
        remote.lock().services = Some(services);
        remote
    }

    pub(crate) fn fail_services(&self, err: YouTrackError) {
        self.lock().services_error = Some(err);
    }

    pub(crate) fn fail_folders(&self, err: YouTrackError) {
        self.lock().folders_error = Some(err);
    }

    pub(crate) fn fail_group_search(&self, err: YouTrackError) {
        self.lock().groups_error = Some(err);
    }

    pub(crate) fn fail_export(&self, err: YouTrackError) {
        self.lock().export_error = Some(err);
    }

    pub(crate) fn assist_requests(&self) -> Vec<QueryAssistRequest> {
        self.lock().assist_requests.clone()
    }

    pub(crate) fn exports(&self) -> Vec<(String, WireFilterPayload, ExportFormat)> {
        self.lock().exports.clone()
    }

    pub(crate) fn folder_requests(&self) -> Vec<String> {
        self.lock().folder_requests.clone()
    }
}

#[async_trait]
impl RemoteApi for FakeRemote {
    async fn query_assist(
        &self,
        _service_id: &str,
        request: &QueryAssistRequest,
    ) -> Result<QueryAssistResponse> {
        self.lock().assist_requests.push(request.clone());
        Ok(QueryAssistResponse {
            query: Some(request.query.clone()),
            caret: Some(request.caret),
            ..QueryAssistResponse::default()
        })
    }

    async fn issue_folders(&self, service_id: &str) -> Result<Vec<IssueFolder>> {
        let mut state = self.lock();
        state.folder_requests.push(service_id.to_string());
        if let Some(err) = state.folders_error.take() {
            return Err(err.into());
        }
        Ok(vec![
            folder("0-1", "Project", "Demo", "project: DEMO"),
            folder("0-2", "Project", "Ops", "project: OPS"),
            folder("6-1", "Tag", "Star", "tag: Star"),
            folder("5-1", "SavedQuery", "Open bugs", "#Bug #Unresolved"),
        ])
    }

    async fn work_item_types(&self, _service_id: &str) -> Result<Vec<WorkItemType>> {
        Ok(vec![
            WorkItemType {
                id: "t-1".to_string(),
                name: Some("Development".to_string()),
            },
            WorkItemType {
                id: "t-2".to_string(),
                name: Some("Testing".to_string()),
            },
        ])
    }

    async fn search_users(&self, _query: &str, _top: u32) -> Result<Vec<HubUser>> {
        Ok(vec![
            HubUser {
                id: Some("ring-ann".to_string()),
                name: Some("Ann".to_string()),
                login: Some("ann".to_string()),
                profile: Some(HubProfile {
                    avatar: Some(HubAvatar {
                        url: Some("https://hub/ann.png".to_string()),
                    }),
                }),
            },
            HubUser {
                id: None,
                name: Some("Unresolved".to_string()),
                login: None,
                profile: None,
            },
        ])
    }

    async fn search_user_groups(&self, _query: &str, _top: u32) -> Result<Vec<HubUserGroup>> {
        if let Some(err) = self.lock().groups_error.take() {
            return Err(err.into());
        }
        Ok(vec![HubUserGroup {
            id: Some("ring-devs".to_string()),
            name: Some("Developers".to_string()),
        }])
    }

    async fn youtrack_services(&self) -> Result<Vec<HubService>> {
        let mut state = self.lock();
        if let Some(err) = state.services_error.take() {
            return Err(err.into());
        }
        Ok(state.services.clone().unwrap_or_default())
    }

    async fn export_work_items(
        &self,
        service_id: &str,
        filter: &WireFilterPayload,
        format: ExportFormat,
    ) -> Result<BinaryContent> {
        let mut state = self.lock();
        if let Some(err) = state.export_error.take() {
            return Err(err.into());
        }
        state
            .exports
            .push((service_id.to_string(), filter.clone(), format));
        Ok(BinaryContent {
            bytes: b"Issue,Author,Duration\n".to_vec(),
            mime_type: Some(format.mime_type().to_string()),
        })
    }
}
