//! Inbound call event: what the provider's speech webhook tells us about a call.

/// Caller, callee and transcribed speech of one webhook. Lives for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundCall {
    pub from_number: Option<String>,
    /// Only used to derive the intent session and for logs.
    pub to_number: Option<String>,
    /// Transcribed speech; empty when the provider sent none.
    pub text: String,
}

impl InboundCall {
    pub fn new(
        from_number: Option<String>,
        to_number: Option<String>,
        text: Option<String>,
    ) -> Self {
        Self {
            from_number,
            to_number,
            text: text.unwrap_or_default(),
        }
    }
}
