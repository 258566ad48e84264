use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;
use youtrack_api::rate_limiter::RateLimiter;
use youtrack_api::{
    AssistFolder, ExportFormat, QueryAssistRequest, YouTrackClient, YouTrackConfig, YouTrackError,
};

fn client_for(server: &Server) -> YouTrackClient {
    let config = YouTrackConfig::new(server.url(), "perm:test-token")
        .with_cooldown(Duration::ZERO)
        .with_timeout(Duration::from_secs(5));
    YouTrackClient::new_with_limiter(config, RateLimiter::unlimited()).expect("client")
}

#[tokio::test]
async fn query_assist_posts_query_caret_and_folder() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/search/assist")
        .match_query(Matcher::Regex("fields=".to_string()))
        .match_header("authorization", "Bearer perm:test-token")
        .match_body(Matcher::Json(json!({
            "query": "for: me",
            "caret": 7,
            "folder": {"id": "0-1", "$type": "Project"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"query":"for: me","caret":7,"styleRanges":[{"start":0,"length":4,"style":"field_name"}],
                "suggestions":[{"option":"me","prefix":"","suffix":" ","description":"Current user","completionStart":5,"completionEnd":7}]}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let request = QueryAssistRequest {
        query: "for: me".to_string(),
        caret: 7,
        folder: Some(AssistFolder {
            id: "0-1".to_string(),
            entity_type: Some("Project".to_string()),
        }),
    };
    let response = client.query_assist(&request).await.expect("assist");

    mock.assert_async().await;
    assert_eq!(response.caret, Some(7));
    assert_eq!(response.style_ranges.len(), 1);
    assert_eq!(response.suggestions[0].option.as_deref(), Some("me"));
    assert_eq!(response.suggestions[0].completion_end, Some(7));
}

#[tokio::test]
async fn user_issue_folders_requests_all_when_asked() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/userIssueFolders")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("$top".into(), "-1".into()),
            Matcher::UrlEncoded("fields".into(), "id,$type,name,query,shortName".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{"id":"0-1","$type":"Project","name":"Demo","query":"project: DEMO","shortName":"DEMO"},
                {"id":"6-2","$type":"Tag","name":"Star","query":"tag: Star"}]"#,
        )
        .create_async()
        .await;

    let folders = client_for(&server).user_issue_folders(true).await.expect("folders");

    mock.assert_async().await;
    assert_eq!(folders.len(), 2);
    assert_eq!(folders[0].label(), "Demo (DEMO)");
    assert_eq!(folders[1].entity_type.as_deref(), Some("Tag"));
    assert_eq!(folders[1].short_name, None);
}

#[tokio::test]
async fn work_item_types_are_listed_without_limit() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/admin/timeTrackingSettings/workItemTypes")
        .match_query(Matcher::UrlEncoded("$top".into(), "-1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id":"t-1","name":"Development"},{"id":"t-2","name":"Testing"}]"#)
        .create_async()
        .await;

    let types = client_for(&server).work_item_types().await.expect("types");

    mock.assert_async().await;
    assert_eq!(types.len(), 2);
    assert_eq!(types[1].name.as_deref(), Some("Testing"));
}

#[tokio::test]
async fn configured_language_is_sent_with_every_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/admin/timeTrackingSettings/workItemTypes")
        .match_query(Matcher::Any)
        .match_header("accept-language", "de")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let config = YouTrackConfig::new(server.url(), "perm:test-token")
        .with_cooldown(Duration::ZERO)
        .with_accept_language("de");
    let client = YouTrackClient::new_with_limiter(config, RateLimiter::unlimited()).expect("client");

    let types = client.work_item_types().await.expect("types");

    mock.assert_async().await;
    assert!(types.is_empty());
}

#[tokio::test]
async fn hub_lookups_use_embedded_hub_root() {
    let mut server = Server::new_async().await;
    let users = server
        .mock("GET", "/hub/api/rest/users")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "ann".into()),
            Matcher::UrlEncoded("$top".into(), "10".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"users":[{"id":"ring-1","name":"Ann","login":"ann","profile":{"avatar":{"url":"https://a/1.png"}}}]}"#)
        .create_async()
        .await;
    let groups = server
        .mock("GET", "/hub/api/rest/usergroups")
        .match_query(Matcher::UrlEncoded("query".into(), "ann".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"usergroups":[{"id":"ring-g","name":"Annotators"}]}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let found_users = client.search_users("ann", 10).await.expect("users");
    let found_groups = client.search_user_groups("ann", 10).await.expect("groups");

    users.assert_async().await;
    groups.assert_async().await;
    assert_eq!(found_users[0].avatar_url().as_deref(), Some("https://a/1.png"));
    assert_eq!(found_groups[0].name.as_deref(), Some("Annotators"));
}

#[tokio::test]
async fn export_sends_accept_header_and_returns_bytes() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/workItems/export")
        .match_query(Matcher::UrlEncoded("$top".into(), "-1".into()))
        .match_header("accept", "text/csv")
        .match_body(Matcher::PartialJson(json!({"withoutWorkType": false})))
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body("Issue,Author,Duration\nDEMO-1,ann,60\n")
        .create_async()
        .await;

    let content = client_for(&server)
        .export_work_items(&json!({"withoutWorkType": false}), ExportFormat::Csv)
        .await
        .expect("export");

    mock.assert_async().await;
    assert_eq!(content.mime_type.as_deref(), Some("text/csv"));
    assert!(content.bytes.starts_with(b"Issue,Author"));
}

#[tokio::test]
async fn failures_map_to_typed_errors() {
    let mut server = Server::new_async().await;
    let _denied = server
        .mock("GET", "/api/userIssueFolders")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body("unauthorized")
        .create_async()
        .await;
    let _broken = server
        .mock("POST", "/api/workItems/export")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"error":"bad_request","error_description":"Unknown work type"}"#)
        .create_async()
        .await;

    let client = client_for(&server);

    let denied = client.user_issue_folders(false).await.unwrap_err();
    assert!(matches!(denied, YouTrackError::Authentication(_)));

    let broken = client
        .export_work_items(&json!({}), ExportFormat::Spreadsheet)
        .await
        .unwrap_err();
    match broken {
        YouTrackError::Http { status, code, message } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(code.as_deref(), Some("bad_request"));
            assert_eq!(message, "Unknown work type");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn youtrack_services_are_read_from_hub() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/hub/api/rest/services")
        .match_query(Matcher::UrlEncoded("query".into(), "applicationName:YouTrack".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"services":[{"id":"yt-1","name":"YouTrack","homeUrl":"https://yt","version":"2024.1"}]}"#)
        .create_async()
        .await;

    let services = client_for(&server).youtrack_services().await.expect("services");

    mock.assert_async().await;
    assert_eq!(services.len(), 1);
    assert!(services[0].is_compatible("2019.1"));
}
