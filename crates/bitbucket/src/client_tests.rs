use std::time::Duration;

use httpmock::prelude::*;
use pipeline::comments::with_marker;
use pipeline::DecorationToggles;
use serde_json::json;

use super::*;

const COMMENTS_PATH: &str = "/repositories/company/repo/pullrequests/99/comments";
// base64("user:secret")
const BASIC_AUTH: &str = "Basic dXNlcjpzZWNyZXQ=";

fn config(base_url: &str) -> ProviderConfig {
    ProviderConfig {
        base_url: Some(base_url.to_string()),
        workspace: "company".to_string(),
        repository: "repo".to_string(),
        credentials: Credentials::new("user", "secret"),
        request_timeout: Duration::from_secs(5),
        toggles: DecorationToggles::default(),
    }
}

fn client(server: &MockServer) -> BitbucketCloudClient {
    BitbucketCloudClient::new(
        &config(&server.base_url()),
        &PullRequestKey::new("99").unwrap(),
    )
    .unwrap()
}

fn marked(text: &str) -> String {
    with_marker(text)
}

#[test]
fn test_comments_url_layout() {
    let client = BitbucketCloudClient::new(
        &ProviderConfig {
            base_url: None,
            ..config("unused")
        },
        &PullRequestKey::new("7").unwrap(),
    )
    .unwrap();
    assert_eq!(
        client.comments_url(),
        "https://api.bitbucket.org/2.0/repositories/company/repo/pullrequests/7/comments"
    );
}

#[test]
fn test_trailing_slash_on_base_url_is_ignored() {
    let client = BitbucketCloudClient::new(
        &config("http://localhost:7990/2.0/"),
        &PullRequestKey::new("7").unwrap(),
    )
    .unwrap();
    assert_eq!(
        client.comments_url(),
        "http://localhost:7990/2.0/repositories/company/repo/pullrequests/7/comments"
    );
}

#[test]
fn test_invalid_base_url_is_a_configuration_error() {
    let err = BitbucketCloudClient::new(
        &config("not a url"),
        &PullRequestKey::new("7").unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err, ProviderError::Configuration { .. }));

    let err = BitbucketCloudClient::new(
        &config("ftp://example.com/2.0"),
        &PullRequestKey::new("7").unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err, ProviderError::Configuration { .. }));
}

#[test]
fn test_marker_filter_matches_wire_format() {
    assert_eq!(
        marker_filter(),
        r#"(deleted = false AND content.raw ~ "[PR-DECORATION]")"#
    );
}

#[tokio::test]
async fn test_create_inline_comment_payload() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(COMMENTS_PATH)
                .header("authorization", BASIC_AUTH)
                .header("content-type", "application/json")
                .json_body(json!({
                    "content": {"raw": "issue body"},
                    "inline": {"to": 12, "path": "path"}
                }));
            then.status(201).json_body(json!({"id": 1}));
        })
        .await;

    client(&server)
        .create_comment("issue body", SourcePath::new("path").as_ref(), Some(12))
        .await
        .unwrap();

    create.assert_async().await;
}

#[tokio::test]
async fn test_create_general_comment_has_no_inline() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(COMMENTS_PATH)
                .json_body(json!({"content": {"raw": "summary"}}));
            then.status(201).json_body(json!({"id": 2}));
        })
        .await;

    client(&server)
        .create_comment("summary", None, None)
        .await
        .unwrap();

    create.assert_async().await;
}

#[tokio::test]
async fn test_inline_comment_without_line_omits_to() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path(COMMENTS_PATH).json_body(json!({
                "content": {"raw": "file level"},
                "inline": {"path": "src/lib.rs"}
            }));
            then.status(201);
        })
        .await;

    client(&server)
        .create_comment("file level", SourcePath::new("src/lib.rs").as_ref(), None)
        .await
        .unwrap();

    create.assert_async().await;
}

#[tokio::test]
async fn test_list_follows_next_links_in_order() {
    let server = MockServer::start_async().await;
    let next = format!("{}{}?page=2", server.base_url(), COMMENTS_PATH);

    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(COMMENTS_PATH)
                .query_param("q", marker_filter())
                .header("authorization", BASIC_AUTH);
            then.status(200).json_body(json!({
                "values": [
                    {"id": 11, "content": {"raw": marked("a")}},
                    {"id": 12, "content": {"raw": marked("b")}}
                ],
                "next": next
            }));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(COMMENTS_PATH)
                .query_param("page", "2")
                .header("authorization", BASIC_AUTH);
            then.status(200).json_body(json!({
                "values": [{"id": 13, "content": {"raw": marked("c")}}]
            }));
        })
        .await;

    let ids = client(&server).list_comment_ids().await.unwrap();

    let ids: Vec<_> = ids.iter().map(CommentId::as_str).collect();
    assert_eq!(ids, vec!["11", "12", "13"]);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_next_link_to_another_origin_is_not_followed() {
    let server = MockServer::start_async().await;
    let elsewhere = MockServer::start_async().await;
    let leaked = elsewhere
        .mock_async(|when, then| {
            when.path_contains("/");
            then.status(200).json_body(json!({"values": []}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(COMMENTS_PATH);
            then.status(200).json_body(json!({
                "values": [{"id": 1, "content": {"raw": marked("a")}}],
                "next": format!("{}{}?page=2", elsewhere.base_url(), COMMENTS_PATH)
            }));
        })
        .await;

    let err = client(&server).list_comment_ids().await.unwrap_err();

    assert!(matches!(err, ProviderError::Parse { .. }));
    leaked.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_repeated_next_link_ends_listing() {
    let server = MockServer::start_async().await;
    let again = format!("{}{}?page=2", server.base_url(), COMMENTS_PATH);
    server
        .mock_async(|when, then| {
            when.method(GET).path(COMMENTS_PATH).query_param_exists("q");
            then.status(200).json_body(json!({
                "values": [{"id": 1, "content": {"raw": marked("a")}}],
                "next": again
            }));
        })
        .await;
    let looping = server
        .mock_async(|when, then| {
            when.method(GET).path(COMMENTS_PATH).query_param("page", "2");
            then.status(200).json_body(json!({
                "values": [{"id": 2, "content": {"raw": marked("b")}}],
                "next": again
            }));
        })
        .await;

    let ids = client(&server).list_comment_ids().await.unwrap();

    let ids: Vec<_> = ids.iter().map(CommentId::as_str).collect();
    assert_eq!(ids, vec!["1", "2"]);
    looping.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_list_rechecks_marker_and_deleted_flag() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(COMMENTS_PATH);
            then.status(200).json_body(json!({
                "values": [
                    {"id": 1, "content": {"raw": "a human comment"}},
                    {"id": 2, "content": {"raw": marked("ours")}, "deleted": true},
                    {"id": "3", "content": {"raw": marked("ours")}},
                    {"id": 4}
                ]
            }));
        })
        .await;

    let ids = client(&server).list_comment_ids().await.unwrap();
    let ids: Vec<_> = ids.iter().map(CommentId::as_str).collect();
    assert_eq!(ids, vec!["3", "4"]);
}

#[tokio::test]
async fn test_delete_uses_comment_url() {
    let server = MockServer::start_async().await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path(format!("{COMMENTS_PATH}/42"))
                .header("authorization", BASIC_AUTH);
            then.status(204);
        })
        .await;

    client(&server)
        .delete_comment(&CommentId::new("42").unwrap())
        .await
        .unwrap();

    delete.assert_async().await;
}

#[tokio::test]
async fn test_error_status_becomes_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("{COMMENTS_PATH}/42"));
            then.status(403).body("not allowed");
        })
        .await;

    let err = client(&server)
        .delete_comment(&CommentId::new("42").unwrap())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ProviderError::Api {
            status: 403,
            message: "not allowed".to_string()
        }
    );
}

#[tokio::test]
async fn test_error_status_without_body_uses_reason() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(COMMENTS_PATH);
            then.status(404);
        })
        .await;

    let err = client(&server)
        .create_comment("x", None, None)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ProviderError::Api {
            status: 404,
            message: "Not Found".to_string()
        }
    );
}

#[tokio::test]
async fn test_malformed_listing_is_a_parse_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(COMMENTS_PATH);
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let err = client(&server).list_comment_ids().await.unwrap_err();
    assert!(matches!(err, ProviderError::Parse { .. }));
}

#[tokio::test]
async fn test_unreachable_host_is_a_transport_error() {
    // Port 9 (discard) is not expected to accept HTTP connections.
    let client = BitbucketCloudClient::new(
        &ProviderConfig {
            request_timeout: Duration::from_secs(2),
            ..config("http://127.0.0.1:9/2.0")
        },
        &PullRequestKey::new("1").unwrap(),
    )
    .unwrap();

    let err = client.list_comment_ids().await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport { .. }));
}
