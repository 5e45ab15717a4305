//! Intent session identity for a call.
//!
//! Each inbound call gets its own conversational context upstream. The id is derived from the
//! caller/callee pair when either is known, so follow-up webhooks for the same call land in the
//! same session; otherwise a fresh id is generated. Nothing is stored.

use sha2::{Digest, Sha256};

/// Dialogflow caps session ids at 36 bytes; both derivations produce 32 hex chars.
const SESSION_ID_LEN: usize = 32;

/// Opaque session identifier, always 32 lowercase hex chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Session for a call from `from_number` to `to_number`.
    pub fn for_call(from_number: Option<&str>, to_number: Option<&str>) -> Self {
        let from = from_number.map(str::trim).unwrap_or("");
        let to = to_number.map(str::trim).unwrap_or("");
        if from.is_empty() && to.is_empty() {
            return Self::generate();
        }
        let mut hasher = Sha256::new();
        for part in [from, to] {
            hasher.update((part.len() as u64).to_be_bytes());
            hasher.update(part.as_bytes());
        }
        let digest = hasher.finalize();
        let mut hex = String::with_capacity(SESSION_ID_LEN);
        for b in digest.iter().take(SESSION_ID_LEN / 2) {
            hex.push_str(&format!("{:02x}", b));
        }
        SessionId(hex)
    }

    /// Fresh random session (no caller identity available).
    pub fn generate() -> Self {
        SessionId(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
