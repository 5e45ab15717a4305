//! Dialogflow ES REST client (https://dialogflow.googleapis.com by default).
//! Only text queries: `projects.agent.sessions.detectIntent`.

use crate::config::{self, Config};
use crate::intent::IntentDetector;
use crate::session::SessionId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://dialogflow.googleapis.com";

/// Client for the Dialogflow v2 API, bound to one agent (project) and language.
#[derive(Clone)]
pub struct DialogflowClient {
    base_url: String,
    project_id: String,
    language_code: String,
    access_token: Option<String>,
    /// Per-request deadline; None leaves requests unbounded at this layer.
    timeout: Option<Duration>,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    #[error("dialogflow request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("dialogflow request timed out")]
    Timeout,
    #[error("dialogflow api error: {status} {body}")]
    Api { status: u16, body: String },
    #[error("dialogflow returned malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for IntentError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            IntentError::Timeout
        } else if e.is_decode() {
            IntentError::Malformed(e.to_string())
        } else {
            IntentError::Request(e)
        }
    }
}

impl DialogflowClient {
    pub fn new(
        base_url: Option<String>,
        project_id: impl Into<String>,
        language_code: impl Into<String>,
        access_token: Option<String>,
    ) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            project_id: project_id.into(),
            language_code: language_code.into(),
            access_token,
            timeout: None,
            client: reqwest::Client::new(),
        }
    }

    /// Bound each detectIntent request; an elapsed request fails with [`IntentError::Timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build from config; None when no project id is configured (config or DIALOGFLOW_PROJECT_ID).
    pub fn from_config(config: &Config) -> Option<Self> {
        let project_id = config::resolve_intent_project(config)?;
        Some(
            Self::new(
                config.intent.base_url.clone(),
                project_id,
                config.intent.language_code.clone(),
                config::resolve_intent_token(config),
            )
            .with_timeout(config.intent.timeout()),
        )
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn session_url(&self, session: &SessionId) -> String {
        format!(
            "{}/v2/projects/{}/agent/sessions/{}:detectIntent",
            self.base_url, self.project_id, session
        )
    }
}

#[async_trait]
impl IntentDetector for DialogflowClient {
    /// POST .../sessions/{session}:detectIntent with a text query input.
    async fn detect_intent(
        &self,
        session: &SessionId,
        text: &str,
    ) -> Result<QueryResult, IntentError> {
        let url = self.session_url(session);
        let body = DetectIntentRequest {
            query_input: QueryInput {
                text: TextInput {
                    text: text.to_string(),
                    language_code: self.language_code.clone(),
                },
            },
        };
        let mut req = self.client.post(&url).json(&body);
        if let Some(ref token) = self.access_token {
            req = req.bearer_auth(token);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let res = req.send().await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(IntentError::Api { status, body });
        }
        let data: DetectIntentResponse = res.json().await?;
        data.query_result
            .ok_or_else(|| IntentError::Malformed("missing queryResult".to_string()))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentRequest {
    query_input: QueryInput,
}

#[derive(Debug, Serialize)]
struct QueryInput {
    text: TextInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextInput {
    text: String,
    language_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentResponse {
    #[serde(default)]
    query_result: Option<QueryResult>,
}

/// Result of one detectIntent call. Proto3 JSON omits empty fields, hence the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub query_text: String,
    #[serde(default)]
    pub fulfillment_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<MatchedIntent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_detection_confidence: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedIntent {
    #[serde(default)]
    pub display_name: String,
}

impl QueryResult {
    /// Result carrying only a fulfillment text.
    pub fn with_fulfillment(text: impl Into<String>) -> Self {
        Self {
            fulfillment_text: text.into(),
            ..Self::default()
        }
    }

    /// Display name of the matched intent, if any.
    pub fn intent_name(&self) -> Option<&str> {
        self.intent.as_ref().map(|i| i.display_name.as_str())
    }
}
