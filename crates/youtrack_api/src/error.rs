//! Failures of YouTrack and Hub requests.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, YouTrackError>;

#[derive(Debug, Error)]
pub enum YouTrackError {
    /// Non-success response. `code` is the `error` field of a YouTrack error body.
    #[error("http {status}: {message}")]
    Http {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    /// 401 or 403: the permanent token is missing, revoked or lacks access.
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("unexpected error: {0}")]
    Other(String),
}

/// Body YouTrack and Hub send with failed requests.
#[derive(Deserialize, Debug, Default)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl YouTrackError {
    /// Builds the error for a non-success response from its status and raw body.
    ///
    /// The message prefers `error_description`; bodies that are not JSON
    /// (proxies, HTML error pages) are kept verbatim.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .error_description
            .clone()
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| body.trim().to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                YouTrackError::Authentication(format!("access denied ({}): {}", status, message))
            }
            _ => YouTrackError::Http {
                status,
                code: parsed.error,
                message,
            },
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            YouTrackError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for YouTrackError {
    fn from(err: reqwest::Error) -> Self {
        let text = err.to_string();
        match err.status() {
            Some(status) => YouTrackError::Http {
                status,
                code: None,
                message: text,
            },
            None if err.is_timeout() => YouTrackError::Timeout(text),
            None if err.is_connect() || err.is_request() => YouTrackError::Network(text),
            None if err.is_decode() || err.is_body() => YouTrackError::Serialization(text),
            None => YouTrackError::Other(text),
        }
    }
}

impl From<serde_json::Error> for YouTrackError {
    fn from(err: serde_json::Error) -> Self {
        YouTrackError::Serialization(err.to_string())
    }
}
