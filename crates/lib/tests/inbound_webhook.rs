//! Inbound webhook flow through the router: body → call handler → intent service → NCCO.
//! Dialogflow is stood in for by wiremock; requests go through `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use lib::config::Config;
use lib::gateway::{router, GatewayState};
use lib::intent::DialogflowClient;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROJECT: &str = "acme-voice";

fn app(server: &MockServer, timeout_ms: u64) -> Router {
    let mut config = Config::default();
    config.intent.timeout_ms = timeout_ms;
    let client = DialogflowClient::new(Some(server.uri()), PROJECT, "en-US", None);
    router(GatewayState::new(config, Arc::new(client)))
}

async fn mock_fulfillment(server: &MockServer, speech: &str, reply: &str) {
    Mock::given(method("POST"))
        .and(path_regex(format!(
            r"^/v2/projects/{}/agent/sessions/[0-9a-f]{{32}}:detectIntent$",
            PROJECT
        )))
        .and(body_partial_json(json!({ "queryInput": { "text": { "text": speech } } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responseId": "r-1",
            "queryResult": { "queryText": speech, "fulfillmentText": reply }
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn speech_is_answered_with_talk_action() {
    let server = MockServer::start().await;
    mock_fulfillment(&server, "I need an appointment", "Sure, what day works?").await;

    let body = json!({ "from": "+1555", "to": "+1777", "speech": "I need an appointment" });
    let (status, value) = send(app(&server, 5_000), post("/inbound/", body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value, json!([{ "action": "talk", "text": "Sure, what day works?" }]));
}

#[tokio::test]
async fn empty_speech_without_numbers() {
    let server = MockServer::start().await;
    mock_fulfillment(&server, "", "").await;

    let (status, value) = send(app(&server, 5_000), post("/inbound/", r#"{"speech":""}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value, json!([{ "action": "talk", "text": "" }]));
}

#[tokio::test]
async fn missing_keys_pass_through_as_empty() {
    let server = MockServer::start().await;
    mock_fulfillment(&server, "", "Sorry, I didn't catch that.").await;

    let (status, value) = send(app(&server, 5_000), post("/inbound", "{}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        value,
        json!([{ "action": "talk", "text": "Sorry, I didn't catch that." }])
    );
}

#[tokio::test]
async fn intent_timeout_is_500_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "queryResult": { "fulfillmentText": "too late" } }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let body = json!({ "from": "+1555", "to": "+1777", "speech": "hello" });
    let response = app(&server, 50)
        .oneshot(post("/inbound/", body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers().get("x-failure-kind").and_then(|v| v.to_str().ok()),
        Some("transient")
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value, json!({ "detail": "intent detection timed out after 50ms" }));
}

#[tokio::test]
async fn upstream_error_is_500_with_original_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
        .mount(&server)
        .await;

    let (status, value) = send(
        app(&server, 5_000),
        post("/inbound/", r#"{"speech":"hello"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        value,
        json!({ "detail": "dialogflow api error: 403 permission denied" })
    );
}

#[tokio::test]
async fn malformed_body_is_rejected_before_intent_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for body in ["not json", "[]", r#"{"speech": 42}"#] {
        let (status, value) = send(app(&server, 5_000), post("/inbound/", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert!(value.get("detail").and_then(|d| d.as_str()).is_some());
    }
}

#[tokio::test]
async fn stub_groups_answer_not_implemented() {
    let server = MockServer::start().await;
    for uri in ["/outbound", "/appointments/today", "/crm/contacts/42"] {
        let (status, value) = send(app(&server, 5_000), post(uri, "{}")).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED, "uri {}", uri);
        assert!(value["detail"].as_str().unwrap().ends_with("is not implemented"));
    }
}
