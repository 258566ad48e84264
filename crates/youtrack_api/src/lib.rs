//! Typed YouTrack and Hub REST client used by the work item exporter.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limiter;

pub use client::{BinaryContent, ExportFormat, YouTrackClient};
pub use config::YouTrackConfig;
pub use error::{Result, YouTrackError};
pub use models::{
    AssistFolder, HubAvatar, HubProfile, HubService, HubUser, HubUserGroup, IssueFolder, QueryAssistRequest,
    QueryAssistResponse, QuerySuggestion, StyleRange, WorkItemType,
};
