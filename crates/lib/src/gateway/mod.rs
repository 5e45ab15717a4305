//! Gateway: the HTTP surface the telephony provider calls.
//!
//! `POST /inbound/` takes a speech webhook and answers with an NCCO. `GET /` is a health check.
//! The outbound, appointments and CRM groups are mounted and answer 501.

mod protocol;
mod server;

pub use protocol::{ErrorDetail, InboundWebhook};
pub use server::{router, run_gateway, GatewayState};
