//! Markdown uploads through the contents API.


use fixtures::{api, repo_json};
use ghverify_core::github::{FileUpload, GitHubError, Repo};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn hello_world(server: &MockServer) -> Repo {
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json("octocat", "Hello-World", 1)))
        .mount(server)
        .await;
    api(server).get_repo("octocat", "Hello-World").await.unwrap()
}

fn created(path: &str, message: &str) -> ResponseTemplate {
    let name = path.rsplit('/').next().unwrap_or(path);
    ResponseTemplate::new(201).set_body_json(json!({
        "content": {
            "name": name,
            "path": path,
            "sha": "95b966ae1c166bd92f8ae7d1c313e738c731dfc3",
            "html_url": format!("https://github.com/octocat/Hello-World/blob/main/{path}")
        },
        "commit": {
            "sha": "7638417db6d59f3c431d3e1f261cc637155684cd",
            "message": message,
            "html_url": "https://github.com/octocat/Hello-World/commit/7638417db6d59f3c431d3e1f261cc637155684cd"
        }
    }))
}

#[tokio::test]
async fn upload_sends_base64_content_with_defaults() {
    let server = MockServer::start().await;
    let repo = hello_world(&server).await.with_access_token("gho_token");

    Mock::given(method("PUT"))
        .and(path("/repos/octocat/Hello-World/contents/notes.md"))
        .and(header("authorization", "Bearer gho_token"))
        .and(body_json(json!({
            "message": "chore: add notes.md",
            "content": "aGVsbG8=",
            "branch": "main"
        })))
        .respond_with(created("notes.md", "chore: add notes.md"))
        .expect(1)
        .mount(&server)
        .await;

    let response = repo
        .upload_markdown(&FileUpload {
            filename: "notes".to_string(),
            content: "hello".to_string(),
            ..FileUpload::default()
        })
        .await
        .unwrap();

    let content = response.content.unwrap();
    assert_eq!(content.path, "notes.md");
    assert_eq!(response.commit.message, "chore: add notes.md");
}

#[tokio::test]
async fn upload_honors_explicit_message_branch_and_nested_path() {
    let server = MockServer::start().await;
    let repo = hello_world(&server).await;

    Mock::given(method("PUT"))
        .and(path("/repos/octocat/Hello-World/contents/docs/VERIFY.md"))
        .and(body_json(json!({
            "message": "docs: add proof",
            "content": "IyBQcm9vZgo=",
            "branch": "verify"
        })))
        .respond_with(created("docs/VERIFY.md", "docs: add proof"))
        .expect(1)
        .mount(&server)
        .await;

    let response = repo
        .upload_markdown(&FileUpload {
            filename: " /docs/VERIFY ".to_string(),
            content: "# Proof\n".to_string(),
            message: Some("docs: add proof".to_string()),
            branch: Some("verify".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(response.content.unwrap().name, "VERIFY.md");

    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|request| request.method.as_str() == "PUT")
        .unwrap();
    assert!(put.headers.get("authorization").is_none());
}

#[tokio::test]
async fn existing_file_maps_to_already_exists() {
    let server = MockServer::start().await;
    let repo = hello_world(&server).await.with_access_token("gho_token");

    Mock::given(method("PUT"))
        .and(path("/repos/octocat/Hello-World/contents/README.md"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Invalid request.\n\n\"sha\" wasn't supplied."
        })))
        .mount(&server)
        .await;

    let err = repo
        .upload_markdown(&FileUpload {
            filename: "README.md".to_string(),
            content: "hi".to_string(),
            ..FileUpload::default()
        })
        .await
        .unwrap_err();

    assert!(err.is_already_exists());
    match err {
        GitHubError::AlreadyExists { path, branch, body } => {
            assert_eq!(path, "README.md");
            assert_eq!(branch, "main");
            assert!(body.contains("wasn't supplied"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn other_failures_keep_status_and_body() {
    let server = MockServer::start().await;
    let repo = hello_world(&server).await.with_access_token("gho_token");

    Mock::given(method("PUT"))
        .and(path("/repos/octocat/Hello-World/contents/notes.md"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Resource not accessible"))
        .mount(&server)
        .await;

    let err = repo
        .upload_markdown(&FileUpload {
            filename: "notes".to_string(),
            content: "hello".to_string(),
            ..FileUpload::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::FORBIDDEN));
    assert!(err.to_string().contains("Resource not accessible"));
}

#[tokio::test]
async fn empty_filename_is_rejected_before_sending() {
    let server = MockServer::start().await;
    let repo = hello_world(&server).await;

    let err = repo
        .upload_markdown(&FileUpload {
            filename: "  ".to_string(),
            content: "hello".to_string(),
            ..FileUpload::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GitHubError::InvalidInput(_)));

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|request| request.method.as_str() != "PUT"));
}
