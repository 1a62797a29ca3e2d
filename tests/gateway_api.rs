//! End-to-end checks of the HTTP surface with stubbed and fake upstreams.

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use parkcheck::{router, AppState, OpenAiVision, ScriptedModel, VisionModel};

const VERDICT: &str = r#"{"canPark":true,"explanation":"ok","restrictions":[],"timeLimit":30}"#;
const NO_BUNDLE: &str = "does-not-exist";

fn app_with(model: impl VisionModel + 'static) -> Router {
    let state = Arc::new(AppState::new(Arc::new(model), "test-model"));
    router(state, Path::new(NO_BUNDLE), 1024 * 1024)
}

fn analyze_request(images: &[&str]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "images": images }).to_string()))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Serve `app` on an ephemeral local port and return its base URL.
async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn prose_wrapped_reply_is_returned_unchanged() {
    let app = app_with(ScriptedModel::replying(format!(
        "Here is the result:\n{VERDICT}\nThanks"
    )));

    let response = app.oneshot(analyze_request(&["data:image/png;base64,AAA"])).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let expected: Value = serde_json::from_str(VERDICT).unwrap();
    assert_eq!(json_body(response).await, expected);
}

#[tokio::test]
async fn non_conforming_object_is_forwarded_without_validation() {
    let app = app_with(ScriptedModel::replying(r#"{"parking":"unclear"}"#));

    let response = app.oneshot(analyze_request(&["x"])).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"parking": "unclear"}));
}

#[tokio::test]
async fn reply_without_json_is_a_500() {
    let app = app_with(ScriptedModel::replying("Sorry, I can't read that sign."));

    let response = app.oneshot(analyze_request(&["x"])).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Failed to analyze parking signs");
    assert_eq!(body["details"], "Could not parse JSON from response");
}

#[tokio::test]
async fn upstream_failure_is_a_500_with_details() {
    let app = app_with(ScriptedModel::failing_with(502));

    let response = app.oneshot(analyze_request(&["x"])).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["details"], "upstream model responded with 502");
}

fn raw_analyze_request(content_type: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn missing_images_field_gets_the_error_body() {
    let app = app_with(ScriptedModel::replying(VERDICT));

    let response = app
        .oneshot(raw_analyze_request("application/json", r#"{"pictures":[]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Failed to analyze parking signs");
    assert!(body["details"].as_str().unwrap().contains("images"));
}

#[tokio::test]
async fn non_string_image_gets_the_error_body() {
    let app = app_with(ScriptedModel::replying(VERDICT));

    let response = app
        .oneshot(raw_analyze_request("application/json", r#"{"images":[42]}"#))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    let body = json_body(response).await;
    assert_eq!(body["error"], "Failed to analyze parking signs");
    assert!(!body["details"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn wrong_content_type_gets_the_error_body() {
    let app = app_with(ScriptedModel::replying(VERDICT));

    let response = app
        .oneshot(raw_analyze_request("text/plain", r#"{"images":["x"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(json_body(response).await["error"], "Failed to analyze parking signs");
}

#[tokio::test]
async fn oversized_body_is_rejected_by_the_transport() {
    let state = Arc::new(AppState::new(Arc::new(ScriptedModel::replying(VERDICT)), "m"));
    let app = router(state, Path::new(NO_BUNDLE), 64);
    let big = "A".repeat(1024);

    let response = app.oneshot(analyze_request(&[big.as_str()])).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_body(response).await["error"], "Failed to analyze parking signs");
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app_with(ScriptedModel::replying(VERDICT));
    let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn unknown_routes_get_the_embedded_page() {
    let app = app_with(ScriptedModel::replying(VERDICT));
    let request = Request::builder().uri("/some/client/route").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("Can I Park Here?"));
}

#[tokio::test]
async fn prebuilt_bundle_serves_files_and_falls_back_to_index() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>bundle index</html>").unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log('bundle')").unwrap();

    let state = Arc::new(AppState::new(Arc::new(ScriptedModel::replying(VERDICT)), "m"));
    let app = router(state, dir.path(), 1024);

    let asset = app
        .clone()
        .oneshot(Request::builder().uri("/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(asset.status(), StatusCode::OK);
    let bytes = to_bytes(asset.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"console.log('bundle')");

    let deep_link = app
        .oneshot(Request::builder().uri("/history/42").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(deep_link.status(), StatusCode::OK);
    let bytes = to_bytes(deep_link.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"<html>bundle index</html>");
}

type Captured = Arc<Mutex<Option<(Option<String>, Value)>>>;

async fn fake_completions(
    State(captured): State<Captured>,
    headers: axum::http::HeaderMap,
    Json(payload): Json<Value>,
) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    *captured.lock().unwrap() = Some((auth, payload));

    Json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": format!("Sure! {VERDICT}")
            },
            "finish_reason": "stop"
        }]
    }))
}

#[tokio::test]
async fn openai_client_sends_the_prompt_and_reads_the_reply() {
    let captured: Captured = Arc::new(Mutex::new(None));
    let upstream = Router::new()
        .route("/v1/chat/completions", post(fake_completions))
        .with_state(captured.clone());
    let base_url = spawn(upstream).await;

    let model = OpenAiVision::new("sk-test").with_base_url(format!("{base_url}/v1"));
    let app = app_with(model);

    let response = app
        .oneshot(analyze_request(&["data:image/png;base64,AAA", "data:image/jpeg;base64,BBB"]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["timeLimit"], 30);

    let (auth, payload) = captured.lock().unwrap().take().unwrap();
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(payload["model"], "test-model");
    assert_eq!(payload["max_tokens"], 500);
    let parts = payload["messages"][1]["content"].as_array().unwrap();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[1]["image_url"]["url"], "data:image/png;base64,AAA");
    assert_eq!(parts[2]["image_url"]["url"], "data:image/jpeg;base64,BBB");
}

#[tokio::test]
async fn openai_client_non_success_status_becomes_a_500() {
    let upstream = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            (StatusCode::SERVICE_UNAVAILABLE, "overloaded").into_response()
        }),
    );
    let base_url = spawn(upstream).await;

    let model = OpenAiVision::new("sk-test").with_base_url(format!("{base_url}/v1"));
    let response = app_with(model).oneshot(analyze_request(&["x"])).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["details"], "upstream model responded with 503");
}

#[tokio::test]
async fn openai_client_unreachable_upstream_becomes_a_500() {
    // Bind then drop to get a port nobody is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let model = OpenAiVision::new("sk-test").with_base_url(format!("http://{addr}/v1"));
    let response = app_with(model).oneshot(analyze_request(&["x"])).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(!body["details"].as_str().unwrap().is_empty());
}
