//! Intent detection: trait and Dialogflow ES client.
//!
//! The call handler only needs the fulfillment text for an utterance in a given session.

mod dialogflow;

pub use dialogflow::{DialogflowClient, IntentError, MatchedIntent, QueryResult};

use crate::session::SessionId;
use async_trait::async_trait;

/// Conversational intent service. Implementations must be safe to share across concurrent calls.
#[async_trait]
pub trait IntentDetector: Send + Sync {
    /// Detect the intent of `text` within `session` and return the query result.
    async fn detect_intent(&self, session: &SessionId, text: &str)
        -> Result<QueryResult, IntentError>;
}
