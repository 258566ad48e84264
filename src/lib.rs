//! Filtered work item export for YouTrack: persisted filter state, debounced
//! query/author suggestions and the export driver.

pub mod error;
pub mod filter;
pub mod folders;
pub mod lookup;
pub mod remote;
pub mod store;
pub mod suggest;
pub mod widget;
pub mod wire;

#[cfg(test)]
mod test_support;

pub use error::{Result, WidgetError};
pub use filter::{
    DateRange, FilterEvent, FilterField, FilterState, FilterValues, GroupRef, RestoreOutcome,
    UserRef,
};
pub use folders::FolderKind;
pub use lookup::{AuthorSearch, AuthorSuggestions, QueryAssistant};
pub use remote::{RemoteApi, YouTrackRemote};
pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore};
pub use suggest::{CoordinatorState, Suggestion, SuggestionCoordinator};
pub use widget::{ExportedFile, WidgetController, WidgetStatus};
pub use wire::{IdentifierKey, WireFilterPayload};
