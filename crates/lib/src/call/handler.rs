//! Inbound call handling: speech → intent service → NCCO.

use crate::call::{InboundCall, ServiceFailure};
use crate::intent::IntentDetector;
use crate::ncco::{self, Ncco};
use crate::session::SessionId;
use std::sync::Arc;
use std::time::Duration;

/// Turns one inbound call event into the script the provider should run next.
/// Holds no per-call state; share it behind an `Arc`.
pub struct CallHandler {
    detector: Arc<dyn IntentDetector>,
    timeout: Duration,
}

impl CallHandler {
    pub fn new(detector: Arc<dyn IntentDetector>, timeout: Duration) -> Self {
        Self { detector, timeout }
    }

    /// Ask the intent service for a reply to `call.text` in the call's own session and
    /// return a script that speaks it. No retries; on failure no script is produced.
    pub async fn handle(&self, call: &InboundCall) -> Result<Ncco, ServiceFailure> {
        let session = SessionId::for_call(call.from_number.as_deref(), call.to_number.as_deref());
        log::debug!(
            "inbound call: from={} to={} session={}",
            call.from_number.as_deref().unwrap_or("-"),
            call.to_number.as_deref().unwrap_or("-"),
            session
        );

        let result = tokio::time::timeout(
            self.timeout,
            self.detector.detect_intent(&session, &call.text),
        )
        .await
        .map_err(|_| ServiceFailure::deadline_exceeded(self.timeout))?
        .map_err(ServiceFailure::from)?;

        if let Some(name) = result.intent_name() {
            log::debug!("session {} matched intent {}", session, name);
        }
        Ok(ncco::build(&result.fulfillment_text))
    }

    /// Like [`handle`](Self::handle) but logs failures with their kind.
    pub async fn handle_logged(&self, call: &InboundCall) -> Result<Ncco, ServiceFailure> {
        let out = self.handle(call).await;
        if let Err(ref e) = out {
            let level = if e.kind.is_retriable() {
                log::Level::Warn
            } else {
                log::Level::Error
            };
            log::log!(level, "inbound call failed ({}): {}", e.kind.as_str(), e);
        }
        out
    }
}
