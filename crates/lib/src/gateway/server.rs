//! Gateway HTTP server: provider webhooks and health.

use crate::call::{CallHandler, InboundCall, ServiceFailure};
use crate::config::Config;
use crate::gateway::protocol::{ErrorDetail, InboundWebhook};
use crate::intent::{DialogflowClient, IntentDetector};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Route groups that are mounted but have no behavior yet.
const STUB_GROUPS: [&str; 3] = ["outbound", "appointments", "crm"];

const FAILURE_KIND_HEADER: &str = "x-failure-kind";

/// Shared state for the gateway. Read-only after startup.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub handler: Arc<CallHandler>,
    /// Project reported by the health endpoint.
    pub intent_project: Option<String>,
}

impl GatewayState {
    /// State with the given intent detector; the call deadline comes from `config.intent`.
    pub fn new(config: Config, detector: Arc<dyn IntentDetector>) -> Self {
        let handler = CallHandler::new(detector, config.intent.timeout());
        Self {
            config: Arc::new(config),
            handler: Arc::new(handler),
            intent_project: None,
        }
    }
}

/// All gateway routes over the given state.
pub fn router(state: GatewayState) -> Router {
    let mut app = Router::new()
        .route("/", get(health_http))
        .route("/inbound", post(inbound_call))
        .route("/inbound/", post(inbound_call));
    for group in STUB_GROUPS {
        app = mount_stub(app, group);
    }
    app.with_state(state)
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// Requires a Dialogflow project (config intent.projectId or DIALOGFLOW_PROJECT_ID).
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    config.validate()?;
    let Some(dialogflow) = DialogflowClient::from_config(&config) else {
        anyhow::bail!(
            "intent project not configured (set intent.projectId or DIALOGFLOW_PROJECT_ID)"
        );
    };
    let project = dialogflow.project_id().to_string();
    log::info!(
        "intent detection: dialogflow project {} ({}, timeout {}ms)",
        project,
        config.intent.language_code,
        config.intent.timeout_ms
    );

    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let mut state = GatewayState::new(config, Arc::new(dialogflow));
    state.intent_project = Some(project);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
/// In-flight webhooks are allowed to finish.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining in-flight calls");
}

/// POST /inbound/ — speech webhook. Replies with the NCCO, 400 on a malformed body,
/// 500 `{"detail"}` when the call pipeline fails.
async fn inbound_call(State(state): State<GatewayState>, body: Bytes) -> Response {
    let webhook = match InboundWebhook::parse(&body) {
        Ok(w) => w,
        Err(e) => {
            log::debug!("inbound: rejected body: {}", e);
            return (StatusCode::BAD_REQUEST, Json(ErrorDetail::new(e))).into_response();
        }
    };
    let call = InboundCall::from(webhook);
    match state.handler.handle_logged(&call).await {
        Ok(ncco) => (StatusCode::OK, Json(ncco)).into_response(),
        Err(e) => failure_response(e),
    }
}

fn failure_response(e: ServiceFailure) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(FAILURE_KIND_HEADER, e.kind.as_str())],
        Json(ErrorDetail::new(e.message)),
    )
        .into_response()
}

fn mount_stub(app: Router<GatewayState>, group: &'static str) -> Router<GatewayState> {
    let handler = move || async move {
        (
            StatusCode::NOT_IMPLEMENTED,
            Json(ErrorDetail::new(format!("{} is not implemented", group))),
        )
    };
    app.route(&format!("/{}", group), any(handler))
        .route(&format!("/{}/*rest", group), any(handler))
}

/// GET / returns a simple health JSON for uptime checks.
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
        "intentProject": state.intent_project,
    }))
}
