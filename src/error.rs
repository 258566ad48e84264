//! Error model for filter persistence, suggestion lookups and exports.

use thiserror::Error;
use youtrack_api::YouTrackError;

pub type Result<T> = std::result::Result<T, WidgetError>;

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("widget is not bound to a YouTrack service")]
    Unconfigured,
    #[error("unknown YouTrack service: {0}")]
    UnknownService(String),
    #[error("no persisted filter")]
    MissingFilter,
    #[error("config store error: {0}")]
    Store(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Remote(#[from] YouTrackError),
    /// Folder or work type listing failed; the message is shown in place of the configuration form.
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error("Can't export data: {0}")]
    Export(String),
}
