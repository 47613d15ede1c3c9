use async_trait::async_trait;
use roadmap_core::sync::github::{decode_base64_utf8, encode_base64_utf8};
use roadmap_core::sync::transport::{HttpMethod, HttpRequest, HttpResponse, TransportFailure};
use roadmap_core::{
    GitHubConfig, GitHubContentClient, HttpTransport, Initiative, InitiativeDraft, Product,
    ProductRemote, PushRequest, RemoteError,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

const BASE_URL: &str = "https://github.test";

/// Replays queued responses and records every request.
#[derive(Default)]
struct RecordingTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportFailure>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    fn replying(responses: Vec<Result<HttpResponse, TransportFailure>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportFailure("no response queued".to_string())))
    }
}

fn client(
    responses: Vec<Result<HttpResponse, TransportFailure>>,
) -> GitHubContentClient<RecordingTransport> {
    let config = GitHubConfig::new("acme", "roadmaps", "secret-token")
        .unwrap()
        .with_api_base_url(BASE_URL);
    GitHubContentClient::with_transport(config, RecordingTransport::replying(responses))
}

fn ok(status: u16, body: Value) -> Result<HttpResponse, TransportFailure> {
    Ok(HttpResponse::new(status, body.to_string()))
}

fn requests(client: &GitHubContentClient<RecordingTransport>) -> Vec<HttpRequest> {
    client.transport().requests.lock().unwrap().clone()
}

fn file_envelope(product: &Product, sha: &str) -> Value {
    let text = serde_json::to_string_pretty(product).unwrap();
    json!({ "sha": sha, "content": encode_base64_utf8(&text) })
}

fn mobile_app() -> Product {
    let mut product = Product::new("Mobile App");
    product.initiatives.push(Initiative::from_draft(
        "1700000000000",
        &InitiativeDraft::new("Offline mode", 18.0, "Retention"),
    ));
    product
}

#[tokio::test]
async fn list_reads_json_files_from_roadmap_directory() {
    let client = client(vec![ok(
        200,
        json!([
            { "name": "mobile-app.json", "type": "file" },
            { "name": "archive", "type": "dir" },
            { "name": "README.md", "type": "file" },
            { "name": "web.json", "type": "file" }
        ]),
    )]);

    let names = client.list_products().await.unwrap();
    assert_eq!(names, vec!["Mobile App".to_string(), "Web".to_string()]);

    let sent = requests(&client);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, HttpMethod::Get);
    assert_eq!(
        sent[0].url,
        format!("{BASE_URL}/repos/acme/roadmaps/contents/scored-roadmaps")
    );
    assert_eq!(sent[0].query, vec![("ref".to_string(), "main".to_string())]);
    assert_eq!(sent[0].header_value("authorization"), Some("Bearer secret-token"));
    assert_eq!(
        sent[0].header_value("accept"),
        Some("application/vnd.github.v3+json")
    );
    assert!(sent[0].header_value("user-agent").is_some());
}

#[tokio::test]
async fn list_treats_missing_directory_and_empty_listing_as_no_products() {
    let missing = client(vec![ok(404, json!({ "message": "Not Found" }))]);
    assert!(missing.list_products().await.unwrap().is_empty());

    let empty = client(vec![ok(200, json!([]))]);
    assert!(empty.list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_surfaces_auth_failures() {
    let client = client(vec![ok(401, json!({ "message": "Bad credentials" }))]);
    let err = client.list_products().await.unwrap_err();
    assert_eq!(err, RemoteError::Auth { status: 401 });
}

#[tokio::test]
async fn pull_decodes_product_snapshot() {
    let product = mobile_app();
    let client = client(vec![ok(200, file_envelope(&product, "abc123"))]);

    let pulled = client.pull_product("Mobile App").await.unwrap();
    assert_eq!(pulled, product);
    assert_eq!(
        requests(&client)[0].url,
        format!("{BASE_URL}/repos/acme/roadmaps/contents/scored-roadmaps/mobile-app.json")
    );
}

#[tokio::test]
async fn pull_distinguishes_missing_file_from_server_error() {
    let missing = client(vec![ok(404, json!({ "message": "Not Found" }))]);
    let err = missing.pull_product("Mobile App").await.unwrap_err();
    assert!(err.is_not_found());

    let broken = client(vec![ok(500, json!({ "message": "Server Error" }))]);
    let err = broken.pull_product("Mobile App").await.unwrap_err();
    assert_eq!(
        err,
        RemoteError::Transport {
            status: Some(500),
            message: "Server Error".to_string(),
        }
    );

    let offline = client(vec![Err(TransportFailure("connection reset".to_string()))]);
    let err = offline.pull_product("Mobile App").await.unwrap_err();
    assert_eq!(err.status(), None);
    assert_eq!(err.code(), "transport");
}

#[tokio::test]
async fn pull_rejects_malformed_content() {
    let client = client(vec![ok(
        200,
        json!({ "sha": "abc", "content": encode_base64_utf8("not json") }),
    )]);
    assert!(matches!(
        client.pull_product("Mobile App").await,
        Err(RemoteError::Parse(_))
    ));
}

#[tokio::test]
async fn push_creates_file_with_commit_message() {
    let client = client(vec![
        ok(404, json!({ "message": "Not Found" })),
        ok(201, json!({ "content": { "sha": "new-sha" } })),
    ]);

    let receipt = client
        .push_product(&mobile_app(), &PushRequest::new("alice", "Initial import"))
        .await
        .unwrap();
    assert!(receipt.created);
    assert_eq!(receipt.path, "scored-roadmaps/mobile-app.json");
    assert_eq!(receipt.commit_message, "alice - Mobile App - Initial import");
    assert_eq!(receipt.content_sha.as_deref(), Some("new-sha"));

    let sent = requests(&client);
    assert_eq!(sent.len(), 2);
    let put = &sent[1];
    assert_eq!(put.method, HttpMethod::Put);
    assert_eq!(
        put.url,
        format!("{BASE_URL}/repos/acme/roadmaps/contents/scored-roadmaps/mobile-app.json")
    );
    let body: Value = serde_json::from_str(put.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["message"], "alice - Mobile App - Initial import");
    assert_eq!(body["branch"], "main");
    assert!(body.get("sha").is_none());

    let content = decode_base64_utf8(body["content"].as_str().unwrap()).unwrap();
    let pushed: Product = serde_json::from_str(&content).unwrap();
    assert_eq!(pushed, mobile_app());
}

#[tokio::test]
async fn push_updates_existing_file_with_prior_sha() {
    let client = client(vec![
        ok(200, file_envelope(&mobile_app(), "old-sha")),
        ok(200, json!({ "content": { "sha": "next-sha" } })),
    ]);

    let receipt = client
        .push_product(&mobile_app(), &PushRequest::new("bob", "Rescore"))
        .await
        .unwrap();
    assert!(!receipt.created);

    let sent = requests(&client);
    let body: Value = serde_json::from_str(sent[1].body.as_deref().unwrap()).unwrap();
    assert_eq!(body["sha"], "old-sha");
}

#[tokio::test]
async fn push_falls_through_to_create_when_sha_lookup_fails() {
    let client = client(vec![
        ok(500, json!({ "message": "Server Error" })),
        ok(201, json!({})),
    ]);

    let receipt = client
        .push_product(&mobile_app(), &PushRequest::new("alice", "Retry"))
        .await
        .unwrap();
    assert!(receipt.created);
    assert_eq!(receipt.content_sha, None);
}

#[tokio::test]
async fn push_aborts_on_auth_failure_during_sha_lookup() {
    let client = client(vec![ok(401, json!({ "message": "Bad credentials" }))]);

    let err = client
        .push_product(&mobile_app(), &PushRequest::new("alice", "Initial import"))
        .await
        .unwrap_err();
    assert_eq!(err, RemoteError::Auth { status: 401 });
    assert_eq!(requests(&client).len(), 1);
}

#[tokio::test]
async fn push_reports_remote_message_on_conflict() {
    let client = client(vec![
        ok(200, file_envelope(&mobile_app(), "old-sha")),
        ok(409, json!({ "message": "sha does not match" })),
    ]);

    let err = client
        .push_product(&mobile_app(), &PushRequest::new("alice", "Rescore"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RemoteError::Transport {
            status: Some(409),
            message: "sha does not match".to_string(),
        }
    );
}

#[tokio::test]
async fn push_validates_request_before_any_call() {
    let client = client(Vec::new());

    let err = client
        .push_product(&mobile_app(), &PushRequest::new("alice", "  "))
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::InvalidRequest(_)));
    assert!(requests(&client).is_empty());
}

#[tokio::test]
async fn multibyte_product_survives_push_and_pull() {
    let mut product = Product::new("Équipe Café");
    product.initiatives.push(Initiative::from_draft(
        "1",
        &InitiativeDraft::new("Déploiement 🚀", 12.0, "Expansion à Montréal"),
    ));

    let pusher = client(vec![ok(404, json!({})), ok(201, json!({}))]);
    pusher
        .push_product(&product, &PushRequest::new("zoë", "Import"))
        .await
        .unwrap();
    let sent = requests(&pusher);
    assert!(sent[1].url.ends_with("scored-roadmaps/-quipe-caf-.json"));
    let body: Value = serde_json::from_str(sent[1].body.as_deref().unwrap()).unwrap();

    let puller = client(vec![ok(
        200,
        json!({ "sha": "s", "content": body["content"].clone() }),
    )]);
    let pulled = puller.pull_product("Équipe Café").await.unwrap();
    assert_eq!(pulled, product);
}
