//! Remote YouTrack/Hub operations the widget depends on, addressed by service id.

use async_trait::async_trait;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use youtrack_api::{
    BinaryContent, ExportFormat, HubService, HubUser, HubUserGroup, IssueFolder,
    QueryAssistRequest, QueryAssistResponse, WorkItemType, YouTrackClient, YouTrackConfig,
};

use crate::error::{Result, WidgetError};
use crate::wire::WireFilterPayload;

#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn query_assist(
        &self,
        service_id: &str,
        request: &QueryAssistRequest,
    ) -> Result<QueryAssistResponse>;

    /// All pinned folders of the current user.
    async fn issue_folders(&self, service_id: &str) -> Result<Vec<IssueFolder>>;

    async fn work_item_types(&self, service_id: &str) -> Result<Vec<WorkItemType>>;

    async fn search_users(&self, query: &str, top: u32) -> Result<Vec<HubUser>>;

    async fn search_user_groups(&self, query: &str, top: u32) -> Result<Vec<HubUserGroup>>;

    /// YouTrack services registered in Hub.
    async fn youtrack_services(&self) -> Result<Vec<HubService>>;

    async fn export_work_items(
        &self,
        service_id: &str,
        filter: &WireFilterPayload,
        format: ExportFormat,
    ) -> Result<BinaryContent>;
}

/// HTTP-backed remote: one Hub client plus one client per known YouTrack service.
pub struct YouTrackRemote {
    hub: YouTrackClient,
    template: YouTrackConfig,
    services: RwLock<HashMap<String, YouTrackClient>>,
}

impl YouTrackRemote {
    /// `hub` serves directory lookups; its config is reused for discovered services.
    pub fn new(hub: YouTrackClient) -> Self {
        let template = hub.config().clone();
        Self {
            hub,
            template,
            services: RwLock::new(HashMap::new()),
        }
    }

    /// Binds `service_id` to an explicit client.
    pub fn with_service(self, service_id: impl Into<String>, client: YouTrackClient) -> Self {
        self.services
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(service_id.into(), client);
        self
    }

    fn client_for(&self, service_id: &str) -> Result<YouTrackClient> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(service_id)
            .cloned()
            .ok_or_else(|| WidgetError::UnknownService(service_id.to_string()))
    }

    fn register(&self, service: &HubService) -> Result<()> {
        let Some(home_url) = service.home_url.as_deref() else {
            return Ok(());
        };
        let mut services = self.services.write().unwrap_or_else(PoisonError::into_inner);
        if services.contains_key(&service.id) {
            return Ok(());
        }
        let mut config = self.template.clone();
        config.base_url = home_url.to_string();
        config.hub_url = Some(self.template.hub_base());
        let client = YouTrackClient::new_with_limiter(config, self.hub.rate_limiter().clone())?;
        debug!("Registered YouTrack service {} at {}", service.id, home_url);
        services.insert(service.id.clone(), client);
        Ok(())
    }
}

#[async_trait]
impl RemoteApi for YouTrackRemote {
    async fn query_assist(
        &self,
        service_id: &str,
        request: &QueryAssistRequest,
    ) -> Result<QueryAssistResponse> {
        Ok(self.client_for(service_id)?.query_assist(request).await?)
    }

    async fn issue_folders(&self, service_id: &str) -> Result<Vec<IssueFolder>> {
        Ok(self.client_for(service_id)?.user_issue_folders(true).await?)
    }

    async fn work_item_types(&self, service_id: &str) -> Result<Vec<WorkItemType>> {
        Ok(self.client_for(service_id)?.work_item_types().await?)
    }

    async fn search_users(&self, query: &str, top: u32) -> Result<Vec<HubUser>> {
        Ok(self.hub.search_users(query, top).await?)
    }

    async fn search_user_groups(&self, query: &str, top: u32) -> Result<Vec<HubUserGroup>> {
        Ok(self.hub.search_user_groups(query, top).await?)
    }

    async fn youtrack_services(&self) -> Result<Vec<HubService>> {
        let services = self.hub.youtrack_services().await?;
        for service in &services {
            self.register(service)?;
        }
        info!("Hub lists {} YouTrack service(s)", services.len());
        Ok(services)
    }

    async fn export_work_items(
        &self,
        service_id: &str,
        filter: &WireFilterPayload,
        format: ExportFormat,
    ) -> Result<BinaryContent> {
        Ok(self
            .client_for(service_id)?
            .export_work_items(filter, format)
            .await?)
    }
}
