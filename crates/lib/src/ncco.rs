//! Vonage call-control objects (NCCO).
//!
//! An NCCO is an ordered list of actions the provider executes during a live call.
//! Serialized as a JSON array of objects tagged by `"action"`.

use serde::{Deserialize, Serialize};

/// Call-control script returned to the provider. May hold zero or more actions.
pub type Ncco = Vec<NccoAction>;

/// One NCCO action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum NccoAction {
    /// Speak `text` to the caller with text-to-speech.
    Talk { text: String },
}

/// Script that speaks `text` to the caller. Total: any input, including "", gives one talk action.
/// The text is passed through as-is (no escaping, no trimming).
pub fn build(text: &str) -> Ncco {
    vec![NccoAction::Talk {
        text: text.to_string(),
    }]
}
