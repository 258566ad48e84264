//! Connection settings for a YouTrack instance and its Hub directory.

use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "worklog-exporter";
pub const DEFAULT_COOLDOWN_MS: u64 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Path under the YouTrack base URL where the embedded Hub lives.
pub const EMBEDDED_HUB_PATH: &str = "hub";

#[derive(Clone, Debug)]
pub struct YouTrackConfig {
    pub base_url: String,
    pub hub_url: Option<String>,
    pub token: String,
    pub accept_language: Option<String>,
    pub user_agent: String,
    pub cooldown: Duration,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl YouTrackConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            hub_url: None,
            token: token.into(),
            accept_language: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Points Hub requests at a standalone Hub installation.
    pub fn with_hub_url(mut self, hub_url: impl Into<String>) -> Self {
        self.hub_url = Some(hub_url.into());
        self
    }

    pub fn with_accept_language(mut self, language: impl Into<String>) -> Self {
        self.accept_language = Some(language.into());
        self
    }

    pub fn with_cooldown(mut self, duration: Duration) -> Self {
        self.cooldown = duration;
        self
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    /// Root of the YouTrack REST API, always ending in `/`.
    pub fn api_root(&self) -> String {
        format!("{}/api/", self.base_url.trim_end_matches('/'))
    }

    /// Hub base URL without a trailing slash.
    pub fn hub_base(&self) -> String {
        match &self.hub_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                EMBEDDED_HUB_PATH
            ),
        }
    }

    /// Root of the Hub REST API, always ending in `/`.
    pub fn hub_api_root(&self) -> String {
        format!("{}/api/rest/", self.hub_base())
    }
}
