mod assist;
mod folder;
mod service;
mod user;
mod work_item_type;

pub use assist::{AssistFolder, QueryAssistRequest, QueryAssistResponse, QuerySuggestion, StyleRange};
pub use folder::IssueFolder;
pub use service::{HubService, ServicePage};
pub use user::{HubAvatar, HubProfile, HubUser, HubUserGroup, UserGroupPage, UserPage};
pub use work_item_type::WorkItemType;
