//! Gateway HTTP wire types (inbound webhook body, error body).

use crate::call::InboundCall;
use serde::{Deserialize, Serialize};

/// Speech webhook body: `{ "from", "to", "speech" }`, every key optional.
/// Other keys the provider sends are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundWebhook {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub speech: Option<String>,
}

impl InboundWebhook {
    /// Parse a request body. Fails when it is not a JSON object or a known key holds
    /// something other than a string or null; missing keys are fine.
    pub fn parse(body: &[u8]) -> Result<Self, String> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| format!("invalid JSON body: {}", e))?;
        if !value.is_object() {
            return Err("request body must be a JSON object".to_string());
        }
        serde_json::from_value(value).map_err(|e| format!("invalid webhook field: {}", e))
    }
}

impl From<InboundWebhook> for InboundCall {
    fn from(w: InboundWebhook) -> Self {
        InboundCall::new(w.from, w.to, w.speech)
    }
}

/// Error body: `{ "detail": "<description>" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
