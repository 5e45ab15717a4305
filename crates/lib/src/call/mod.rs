//! Inbound call pipeline.
//!
//! The gateway turns each speech webhook into an [`InboundCall`] and hands it to the
//! [`CallHandler`], which asks the intent service for a reply and wraps it in an NCCO.

mod error;
mod handler;
mod inbound;

pub use error::{FailureKind, ServiceFailure};
pub use handler::CallHandler;
pub use inbound::InboundCall;
