use crate::config::YouTrackConfig;
use crate::error::{Result, YouTrackError};
use crate::models::{
    HubService, HubUser, HubUserGroup, IssueFolder, QueryAssistRequest, QueryAssistResponse,
    ServicePage, UserGroupPage, UserPage, WorkItemType,
};
use crate::rate_limiter::RateLimiter;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

const QUERY_ASSIST_FIELDS: &str = "query,caret,styleRanges(start,length,style),suggestions(options,prefix,option,suffix,description,matchingStart,matchingEnd,caret,completionStart,completionEnd,group,icon)";
const ISSUE_FOLDER_FIELDS: &str = "id,$type,name,query,shortName";
const WORK_ITEM_TYPE_FIELDS: &str = "id,name";
const HUB_USER_FIELDS: &str = "id,name,login,profile(avatar(url))";
const HUB_GROUP_FIELDS: &str = "id,name";
const HUB_SERVICE_FIELDS: &str = "id,name,homeUrl,version,applicationName";
const YOUTRACK_SERVICE_QUERY: &str = "applicationName:YouTrack";
const FOLDER_PACK_SIZE: i32 = 100;
const LOAD_ALL: i32 = -1;

/// Export file flavours offered by the work item export endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Spreadsheet,
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Spreadsheet => "xlsx",
        }
    }

    pub fn file_name(&self) -> String {
        format!("work_items.{}", self.extension())
    }
}

#[derive(Debug, Clone)]
pub struct BinaryContent {
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

#[derive(Clone)]
pub struct YouTrackClient {
    http: HttpClient,
    config: YouTrackConfig,
    limiter: RateLimiter,
}

impl YouTrackClient {
    pub fn new(config: YouTrackConfig) -> Result<Self> {
        let limiter = RateLimiter::new(config.cooldown);
        Self::new_with_limiter(config, limiter)
    }

    pub fn new_with_limiter(config: YouTrackConfig, limiter: RateLimiter) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    pub fn config(&self) -> &YouTrackConfig {
        &self.config
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Highlights `query` and returns completions for the text at `caret`.
    pub async fn query_assist(&self, request: &QueryAssistRequest) -> Result<QueryAssistResponse> {
        let url = self.url_for("search/assist");
        let builder = self
            .http
            .post(url)
            .query(&[("fields", QUERY_ASSIST_FIELDS)])
            .json(request);
        self.send_json(builder).await
    }

    /// Lists the current user's pinned folders; `load_all` lifts the page limit.
    pub async fn user_issue_folders(&self, load_all: bool) -> Result<Vec<IssueFolder>> {
        let top = if load_all { LOAD_ALL } else { FOLDER_PACK_SIZE };
        let top = top.to_string();
        let url = self.url_for("userIssueFolders");
        let builder = self
            .http
            .get(url)
            .query(&[("fields", ISSUE_FOLDER_FIELDS), ("$top", top.as_str())]);
        self.send_json(builder).await
    }

    pub async fn work_item_types(&self) -> Result<Vec<WorkItemType>> {
        let url = self.url_for("admin/timeTrackingSettings/workItemTypes");
        let builder = self
            .http
            .get(url)
            .query(&[("$top", "-1"), ("fields", WORK_ITEM_TYPE_FIELDS)]);
        self.send_json(builder).await
    }

    pub async fn search_users(&self, query: &str, top: u32) -> Result<Vec<HubUser>> {
        let top = top.to_string();
        let url = self.hub_url_for("users");
        let builder = self.http.get(url).query(&[
            ("query", query),
            ("fields", HUB_USER_FIELDS),
            ("$top", top.as_str()),
        ]);
        let page: UserPage = self.send_json(builder).await?;
        Ok(page.users)
    }

    pub async fn search_user_groups(&self, query: &str, top: u32) -> Result<Vec<HubUserGroup>> {
        let top = top.to_string();
        let url = self.hub_url_for("usergroups");
        let builder = self.http.get(url).query(&[
            ("query", query),
            ("fields", HUB_GROUP_FIELDS),
            ("$top", top.as_str()),
        ]);
        let page: UserGroupPage = self.send_json(builder).await?;
        Ok(page.usergroups)
    }

    /// Lists YouTrack services registered in Hub.
    pub async fn youtrack_services(&self) -> Result<Vec<HubService>> {
        let url = self.hub_url_for("services");
        let builder = self.http.get(url).query(&[
            ("fields", HUB_SERVICE_FIELDS),
            ("query", YOUTRACK_SERVICE_QUERY),
            ("$top", "-1"),
        ]);
        let page: ServicePage = self.send_json(builder).await?;
        Ok(page.services)
    }

    /// Downloads the work items matching `filter` rendered as `format`.
    pub async fn export_work_items<B>(&self, filter: &B, format: ExportFormat) -> Result<BinaryContent>
    where
        B: Serialize + ?Sized,
    {
        self.limiter.hit().await;
        let url = self.url_for("workItems/export");
        debug!(%url, mime = format.mime_type(), "exporting work items");
        let response = self
            .http
            .request(Method::POST, url)
            .query(&[("$top", "-1")])
            .header(ACCEPT, format.mime_type())
            .json(filter)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::failure(response).await);
        }
        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let bytes = response.bytes().await?.to_vec();
        Ok(BinaryContent { bytes, mime_type })
    }

    async fn send_json<T>(&self, request: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.limiter.hit().await;
        let response = request.send().await?;
        debug!(url = %response.url(), status = %response.status(), "youtrack response");
        Self::parse_json(response).await
    }

    fn url_for(&self, path: &str) -> String {
        let mut base = self.config.api_root();
        base.push_str(path.trim_start_matches('/'));
        base
    }

    fn hub_url_for(&self, path: &str) -> String {
        let mut base = self.config.hub_api_root();
        base.push_str(path.trim_start_matches('/'));
        base
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        if response.status().is_success() {
            response.json::<T>().await.map_err(YouTrackError::from)
        } else {
            Err(Self::failure(response).await)
        }
    }

    async fn failure(response: Response) -> YouTrackError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        YouTrackError::from_response(status, &body)
    }
}

fn build_http_client(config: &YouTrackConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();

    headers.insert(AUTHORIZATION, header_value(format!("Bearer {}", config.token))?);
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    if let Some(language) = &config.accept_language {
        headers.insert(ACCEPT_LANGUAGE, header_value(language.clone())?);
    }

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| YouTrackError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| YouTrackError::Other(err.to_string()))
}
