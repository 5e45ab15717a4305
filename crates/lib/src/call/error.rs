//! Failure of the inbound call pipeline.
//!
//! Callers see one failure type; the kind tells a transient upstream problem from a malformed
//! upstream answer from everything else.

use crate::intent::IntentError;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Upstream unreachable, timed out, throttled or 5xx. Retrying may succeed.
    Transient,
    /// Upstream answered with something we could not use.
    MalformedResponse,
    /// Our request or configuration was rejected, or a bug.
    Internal,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Transient => "transient",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::Internal => "internal",
        }
    }

    pub fn is_retriable(self) -> bool {
        self == FailureKind::Transient
    }
}

/// Any error while handling a call. `message` is the description of the original error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ServiceFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ServiceFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn deadline_exceeded(limit: Duration) -> Self {
        Self::new(
            FailureKind::Transient,
            format!("intent detection timed out after {}ms", limit.as_millis()),
        )
    }
}

impl From<IntentError> for ServiceFailure {
    fn from(e: IntentError) -> Self {
        let kind = match &e {
            IntentError::Request(_) | IntentError::Timeout => FailureKind::Transient,
            IntentError::Api { status, .. } if *status == 429 || *status >= 500 => {
                FailureKind::Transient
            }
            IntentError::Api { .. } => FailureKind::Internal,
            IntentError::Malformed(_) => FailureKind::MalformedResponse,
        };
        ServiceFailure::new(kind, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> IntentError {
        IntentError::Api {
            status,
            body: "x".to_string(),
        }
    }

    #[test]
    fn classifies_intent_errors() {
        assert_eq!(ServiceFailure::from(IntentError::Timeout).kind, FailureKind::Transient);
        assert_eq!(ServiceFailure::from(api(503)).kind, FailureKind::Transient);
        assert_eq!(ServiceFailure::from(api(429)).kind, FailureKind::Transient);
        assert_eq!(ServiceFailure::from(api(403)).kind, FailureKind::Internal);
        assert_eq!(
            ServiceFailure::from(IntentError::Malformed("bad".into())).kind,
            FailureKind::MalformedResponse
        );
    }

    #[test]
    fn keeps_original_description() {
        let f = ServiceFailure::from(api(400));
        assert_eq!(f.message, "dialogflow api error: 400 x");
        assert_eq!(f.to_string(), f.message);
    }

    #[test]
    fn only_transient_is_retriable() {
        assert!(FailureKind::Transient.is_retriable());
        assert!(!FailureKind::MalformedResponse.is_retriable());
        assert!(!FailureKind::Internal.is_retriable());
    }
}
