//! callrelay core library: gateway, call handling, intent client, and NCCO building
//! used by the CLI.

pub mod call;
pub mod config;
pub mod gateway;
pub mod init;
pub mod intent;
pub mod ncco;
pub mod session;
