//! Client and profile lookups against a mocked GitHub REST API.


use fixtures::{api, repo_json, user_json};
use ghverify_core::github::{ACCEPT_GITHUB_JSON, GitHubError, MAX_BODY_BYTES, ResourceKind};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "message": "Not Found",
        "documentation_url": "https://docs.github.com/rest"
    }))
}

#[tokio::test]
async fn missing_user_reports_not_found_with_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/ghost-404"))
        .respond_with(not_found())
        .mount(&server)
        .await;

    let client = api(&server);
    assert!(!client.user_exists("ghost-404").await.unwrap());

    let err = client.get_user("  ghost-404 ").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
        &err,
        GitHubError::NotFound { kind: ResourceKind::Profile, identifier } if identifier == "ghost-404"
    ));
    assert_eq!(err.to_string(), "profile not found: ghost-404");
}

#[tokio::test]
async fn existing_user_by_login_and_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat"))
        .and(header("accept", ACCEPT_GITHUB_JSON))
        .and(header("user-agent", "ghverify-tests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("octocat", 583_231)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/583231"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("octocat", 583_231)))
        .mount(&server)
        .await;

    let client = api(&server);
    assert!(client.user_exists("octocat").await.unwrap());
    assert!(client.user_exists_by_id(583_231).await.unwrap());

    let profile = client.get_user("octocat").await.unwrap();
    assert_eq!(profile.id, 583_231);
    assert_eq!(profile.display_name("—"), "The Octocat");
    assert_eq!(profile.email_or("—"), "—");
    assert_eq!(profile.blog_or("—"), "—");

    let by_id = client.get_user_by_id(583_231).await.unwrap();
    assert_eq!(by_id.login, "octocat");
    assert_eq!(by_id.user(), profile.user());
}

#[tokio::test]
async fn missing_user_by_id_carries_the_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/42"))
        .respond_with(not_found())
        .mount(&server)
        .await;

    let client = api(&server);
    assert!(!client.user_exists_by_id(42).await.unwrap());
    let err = client.get_user_by_id(42).await.unwrap_err();
    assert!(matches!(
        err,
        GitHubError::NotFound { kind: ResourceKind::Profile, ref identifier } if identifier == "42"
    ));
}

#[tokio::test]
async fn empty_login_is_rejected_without_a_request() {
    let server = MockServer::start().await;
    let client = api(&server);

    assert!(matches!(
        client.user_exists("   ").await,
        Err(GitHubError::InvalidInput(_))
    ));
    assert!(matches!(
        client.get_user("").await,
        Err(GitHubError::InvalidInput(_))
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn repo_exists_by_id_is_false_only_on_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repositories/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json("octocat", "Hello-World", 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repositories/2"))
        .respond_with(not_found())
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repositories/3"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = api(&server);
    assert!(client.repo_exists_by_id(1).await.unwrap());
    assert!(!client.repo_exists_by_id(2).await.unwrap());

    let err = client.repo_exists_by_id(3).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(err.to_string().contains("boom"), "{err}");
}

#[tokio::test]
async fn repo_lookups_and_derived_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json("octocat", "Hello-World", 1_296_269)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repositories/1296269"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json("octocat", "Hello-World", 1_296_269)))
        .mount(&server)
        .await;

    let client = api(&server);
    let repo = client.get_repo("octocat", "Hello-World").await.unwrap();
    assert_eq!(repo.id, 1_296_269);
    assert!(repo.is_public());
    assert!(!repo.is_archived());
    assert_eq!(repo.stars_human(), "1.5k");
    assert_eq!(repo.license_name(), Some("MIT License"));
    assert_eq!(repo.topics(), vec!["octocat", "api"]);
    assert_eq!(repo.language(), Some("Rust"));
    assert_eq!(
        repo.preferred_clone_url(true),
        "git@github.com:octocat/Hello-World.git"
    );
    assert_eq!(
        repo.format_pushed_at(None).unwrap(),
        "2025-05-14 10:00:00 UTC"
    );

    let by_id = client.get_repo_by_id(1_296_269).await.unwrap();
    assert_eq!(by_id.repository(), repo.repository());
}

#[tokio::test]
async fn null_timestamps_decode_as_absent() {
    let server = MockServer::start().await;
    let mut body = repo_json("octocat", "empty", 7);
    body["pushed_at"] = serde_json::Value::Null;
    body["updated_at"] = serde_json::Value::Null;
    Mock::given(method("GET"))
        .and(path("/repositories/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let repo = api(&server).get_repo_by_id(7).await.unwrap();
    assert_eq!(repo.name, "empty");
    assert_eq!(repo.pushed_at, None);
    assert!(matches!(
        repo.pushed_at().unwrap_err(),
        GitHubError::InvalidTimestamp { .. }
    ));
    assert_eq!(
        repo.format_created_at(None).unwrap(),
        "2011-01-26 19:01:12 UTC"
    );
}

#[tokio::test]
async fn missing_repo_reports_owner_and_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/nope"))
        .respond_with(not_found())
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repositories/9"))
        .respond_with(not_found())
        .mount(&server)
        .await;

    let client = api(&server);
    let err = client.get_repo("octocat", "nope").await.unwrap_err();
    assert_eq!(err.to_string(), "repo not found: octocat/nope");

    let err = client.get_repo_by_id(9).await.unwrap_err();
    assert!(matches!(
        err,
        GitHubError::NotFound { kind: ResourceKind::Repo, ref identifier } if identifier == "9"
    ));
}

#[tokio::test]
async fn profile_lists_and_looks_up_repos() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("octocat", 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            repo_json("octocat", "Hello-World", 1),
            repo_json("octocat", "Spoon-Knife", 2),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Spoon-Knife"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json("octocat", "Spoon-Knife", 2)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/missing"))
        .respond_with(not_found())
        .mount(&server)
        .await;

    let profile = api(&server).get_user("octocat").await.unwrap();

    let repos = profile.public_repos().await.unwrap();
    let names: Vec<&str> = repos.iter().map(|repo| repo.name.as_str()).collect();
    assert_eq!(names, vec!["Hello-World", "Spoon-Knife"]);

    assert!(profile.repo_exists("Spoon-Knife").await.unwrap());
    assert!(!profile.repo_exists("missing").await.unwrap());

    let repo = profile.repo("Spoon-Knife").await.unwrap();
    assert_eq!(repo.id, 2);

    let err = profile.repo("missing").await.unwrap_err();
    assert!(matches!(
        err,
        GitHubError::NotFound { kind: ResourceKind::Repo, ref identifier } if identifier == "missing"
    ));
}

#[tokio::test]
async fn repo_tags_are_returned_by_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json("octocat", "Hello-World", 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "v1.1.0", "commit": {"sha": "c5b97d5"}},
            {"name": "v1.0.0", "commit": {"sha": "a1b2c3d"}}
        ])))
        .mount(&server)
        .await;

    let repo = api(&server).get_repo("octocat", "Hello-World").await.unwrap();
    assert_eq!(repo.tags().await.unwrap(), vec!["v1.1.0", "v1.0.0"]);
}

#[tokio::test]
async fn oversized_body_is_truncated_before_decoding() {
    let server = MockServer::start().await;
    let padding = "x".repeat(MAX_BODY_BYTES + 1024);
    let body = format!(r#"{{"login":"octocat","id":1,"bio":"{padding}"}}"#);
    Mock::given(method("GET"))
        .and(path("/users/octocat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let err = api(&server).get_user("octocat").await.unwrap_err();
    assert!(matches!(err, GitHubError::Decode(_)), "{err}");
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = api(&server).get_user("octocat").await.unwrap_err();
    assert!(matches!(err, GitHubError::Decode(_)));
    assert!(!err.is_not_found());
}
