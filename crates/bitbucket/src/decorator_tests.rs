use std::time::Duration;

use httpmock::prelude::*;
use pipeline::comments::with_marker;
use pipeline::{
    BranchName, BranchType, BranchUuid, Credentials, DecorationStatus, DecorationToggles, Issue,
    IssueStatus, PullRequestKey, QualityGateStatus, QualityGateSummary, Severity,
};
use serde_json::json;

use super::*;

const COMMENTS_PATH: &str = "/repositories/company/repo/pullrequests/99/comments";

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

fn pull_request() -> BranchDescriptor {
    BranchDescriptor::pull_request(
        BranchName::new("feature/x").unwrap(),
        PullRequestKey::new("99").unwrap(),
        BranchName::new("master").unwrap(),
        BranchUuid::new("uuid-master").unwrap(),
    )
}

fn analysis() -> AnalysisResult {
    AnalysisResult::new(
        vec![Issue {
            message: "Unused variable".to_string(),
            severity: Severity::Minor,
            status: IssueStatus::Open,
            rule: None,
            file_path: Some("src/main.rs".to_string()),
            line: Some(3),
        }],
        QualityGateSummary {
            status: QualityGateStatus::Passed,
            conditions: vec![],
            dashboard_url: None,
        },
    )
}

#[test]
fn test_identity() {
    let decorator = BitbucketCloudDecorator::new();
    assert_eq!(decorator.name(), "BitbucketCloud");
    assert!(decorator.is_supported("https://api.bitbucket.org/2.0/"));
    assert!(decorator.is_supported("https://api.bitbucket.org/2.0/repositories"));
    assert!(!decorator.is_supported("https://api.bitbucket.org/2.0"));
    assert!(!decorator.is_supported("https://bitbucket.example.com/rest/api/1.0/"));
    assert!(!decorator.is_supported("http://api.bitbucket.org/2.0/"));
}

#[tokio::test]
async fn test_full_pass_against_mock_server() {
    let server = MockServer::start_async().await;
    let next = format!("{}{}?page=2", server.base_url(), COMMENTS_PATH);

    let first_page = server
        .mock_async(|when, then| {
            when.method(GET).path(COMMENTS_PATH).query_param_exists("q");
            then.status(200).json_body(json!({
                "values": [
                    {"id": "a", "content": {"raw": with_marker("old a")}},
                    {"id": "b", "content": {"raw": with_marker("old b")}}
                ],
                "next": next
            }));
        })
        .await;
    let second_page = server
        .mock_async(|when, then| {
            when.method(GET).path(COMMENTS_PATH).query_param("page", "2");
            then.status(200).json_body(json!({
                "values": [{"id": "c", "content": {"raw": with_marker("old c")}}]
            }));
        })
        .await;
    let deletes: Vec<_> = {
        let mut mocks = Vec::new();
        for id in ["a", "b", "c"] {
            mocks.push(
                server
                    .mock_async(|when, then| {
                        when.method(DELETE).path(format!("{COMMENTS_PATH}/{id}"));
                        then.status(204);
                    })
                    .await,
            );
        }
        mocks
    };
    let summary = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(COMMENTS_PATH)
                .body_contains("Quality Gate passed");
            then.status(201).json_body(json!({"id": 100}));
        })
        .await;
    let issue = server
        .mock_async(|when, then| {
            when.method(POST).path(COMMENTS_PATH).json_body_partial(
                r#"{"inline": {"to": 3, "path": "src/main.rs"}}"#,
            );
            then.status(201).json_body(json!({"id": 101}));
        })
        .await;

    let report = BitbucketCloudDecorator::new()
        .decorate(&config(&server.base_url()), &analysis(), &pull_request())
        .await
        .unwrap();

    assert_eq!(report.status, DecorationStatus::Completed);
    first_page.assert_async().await;
    second_page.assert_async().await;
    for delete in &deletes {
        delete.assert_async().await;
    }
    summary.assert_async().await;
    issue.assert_async().await;
}

#[tokio::test]
async fn test_provider_failure_is_reported_not_raised() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(COMMENTS_PATH);
            then.status(401).body("bad credentials");
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path(COMMENTS_PATH);
            then.status(201);
        })
        .await;

    let report = BitbucketCloudDecorator::new()
        .decorate(&config(&server.base_url()), &analysis(), &pull_request())
        .await
        .unwrap();

    assert_eq!(report.status, DecorationStatus::CompletedWithFailures);
    assert_eq!(report.failures().count(), 1);
    create.assert_hits_async(2).await;
}

#[tokio::test]
async fn test_non_pull_request_sends_nothing() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.path_contains("/");
            then.status(500);
        })
        .await;
    let descriptor = BranchDescriptor::branch(
        BranchName::new("develop").unwrap(),
        BranchType::Branch,
        None,
        None,
    )
    .unwrap();

    let report = BitbucketCloudDecorator::new()
        .decorate(&config(&server.base_url()), &analysis(), &descriptor)
        .await
        .unwrap();

    assert!(report.is_skipped());
    any.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_bad_base_url_is_a_configuration_error() {
    let err = BitbucketCloudDecorator::new()
        .decorate(&config("::not-a-url"), &analysis(), &pull_request())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ConfigurationError::InvalidSetting { ref setting, .. } if setting == "provider.base_url"
    ));
}
