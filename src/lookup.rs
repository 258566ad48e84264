//! Query-assist and author typeahead built on [`SuggestionCoordinator`].

use std::sync::Arc;
use std::time::Duration;

use youtrack_api::{AssistFolder, IssueFolder, QueryAssistRequest, QueryAssistResponse};

use crate::error::Result;
use crate::filter::{GroupRef, UserRef};
use crate::remote::RemoteApi;
use crate::suggest::{Suggestion, SuggestionCoordinator, DEFAULT_QUIESCENCE_MS};

/// Page size of each user and group lookup.
pub const AUTHOR_PAGE_SIZE: u32 = 20;

/// Highlighting and completions for the search query field.
#[derive(Clone)]
pub struct QueryAssistant {
    remote: Arc<dyn RemoteApi>,
    coordinator: SuggestionCoordinator<QueryAssistResponse>,
}

impl QueryAssistant {
    pub fn new(remote: Arc<dyn RemoteApi>) -> Self {
        Self::with_quiescence(remote, Duration::from_millis(DEFAULT_QUIESCENCE_MS))
    }

    pub fn with_quiescence(remote: Arc<dyn RemoteApi>, quiescence: Duration) -> Self {
        Self {
            remote,
            coordinator: SuggestionCoordinator::new(quiescence),
        }
    }

    pub fn coordinator(&self) -> &SuggestionCoordinator<QueryAssistResponse> {
        &self.coordinator
    }

    /// Requests assist for `query` with the caret at `caret`, evaluated inside `scope`.
    pub async fn suggest(
        &self,
        service_id: &str,
        query: &str,
        caret: usize,
        scope: Option<&IssueFolder>,
    ) -> Result<Suggestion<QueryAssistResponse>> {
        let request = QueryAssistRequest {
            query: query.to_string(),
            caret,
            folder: scope.map(|folder| AssistFolder {
                id: folder.id.clone(),
                entity_type: folder.entity_type.clone(),
            }),
        };
        let remote = self.remote.clone();
        self.coordinator
            .request(|| async move { remote.query_assist(service_id, &request).await })
            .await
    }
}

/// Users and groups matching one typeahead query.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct AuthorSuggestions {
    pub users: Vec<UserRef>,
    pub groups: Vec<GroupRef>,
}

/// Typeahead for the author picker. Users and groups are fetched together;
/// either lookup failing fails the whole request.
#[derive(Clone)]
pub struct AuthorSearch {
    remote: Arc<dyn RemoteApi>,
    coordinator: SuggestionCoordinator<AuthorSuggestions>,
    page_size: u32,
}

impl AuthorSearch {
    pub fn new(remote: Arc<dyn RemoteApi>) -> Self {
        Self::with_quiescence(remote, Duration::from_millis(DEFAULT_QUIESCENCE_MS))
    }

    pub fn with_quiescence(remote: Arc<dyn RemoteApi>, quiescence: Duration) -> Self {
        Self {
            remote,
            coordinator: SuggestionCoordinator::new(quiescence),
            page_size: AUTHOR_PAGE_SIZE,
        }
    }

    pub fn coordinator(&self) -> &SuggestionCoordinator<AuthorSuggestions> {
        &self.coordinator
    }

    pub async fn search(&self, query: &str) -> Result<Suggestion<AuthorSuggestions>> {
        let remote = self.remote.clone();
        let top = self.page_size;
        self.coordinator
            .request(|| async move {
                let (users, groups) = tokio::try_join!(
                    remote.search_users(query, top),
                    remote.search_user_groups(query, top)
                )?;
                Ok(AuthorSuggestions {
                    users: users
                        .into_iter()
                        .map(UserRef::from)
                        .filter(|user| !user.id.is_empty())
                        .collect(),
                    groups: groups
                        .into_iter()
                        .map(GroupRef::from)
                        .filter(|group| !group.id.is_empty())
                        .collect(),
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WidgetError;
    use crate::test_support::FakeRemote;
    use tokio::time::sleep;
    use youtrack_api::YouTrackError;

    const WINDOW: Duration = Duration::from_millis(DEFAULT_QUIESCENCE_MS);

    #[tokio::test(start_paused = true)]
    async fn query_assist_sends_scope_and_caret_for_last_keystroke() {
        let remote = Arc::new(FakeRemote::default());
        let assistant = QueryAssistant::with_quiescence(remote.clone(), WINDOW);
        let scope = IssueFolder {
            id: "0-1".to_string(),
            entity_type: Some("Project".to_string()),
            name: Some("Demo".to_string()),
            query: Some("project: DEMO".to_string()),
            short_name: None,
        };

        let typing = {
            let assistant = assistant.clone();
            let scope = scope.clone();
            tokio::spawn(async move { assistant.suggest("yt-1", "for", 3, Some(&scope)).await })
        };
        sleep(Duration::from_millis(20)).await;
        let last = assistant
            .suggest("yt-1", "for:", 4, Some(&scope))
            .await
            .expect("assist");

        assert_eq!(typing.await.expect("join").expect("assist"), Suggestion::Coalesced);
        let applied = last.applied().expect("applied");
        assert_eq!(applied.query.as_deref(), Some("for:"));

        let requests = remote.assist_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].caret, 4);
        assert_eq!(requests[0].folder.as_ref().map(|folder| folder.id.as_str()), Some("0-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn author_search_combines_users_and_groups() {
        let remote = Arc::new(FakeRemote::default());
        let search = AuthorSearch::with_quiescence(remote.clone(), WINDOW);

        let result = search.search("an").await.expect("search").applied().expect("applied");

        assert_eq!(result.users.len(), 1);
        assert_eq!(result.users[0].id, "ring-ann");
        assert_eq!(result.users[0].avatar_url.as_deref(), Some("https://hub/ann.png"));
        assert_eq!(result.groups[0].id, "ring-devs");
        assert_eq!(search.coordinator().current(), Some(result));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_group_lookup_fails_whole_request() {
        let remote = Arc::new(FakeRemote::default());
        remote.fail_group_search(YouTrackError::Network("hub down".to_string()));
        let search = AuthorSearch::with_quiescence(remote.clone(), WINDOW);

        let result = search.search("an").await;

        assert!(matches!(result, Err(WidgetError::Remote(YouTrackError::Network(_)))));
        assert_eq!(search.coordinator().current(), None);
    }
}
