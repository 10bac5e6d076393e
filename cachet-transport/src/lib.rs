//! TCP transport for the cachet protocol.
//!
//! Pairs the sans-IO exchanges from `cachet-core` with tokio sockets:
//! length-prefixed field I/O, the initiator's connect-and-send driver,
//! and the responder's per-connection driver. The accept loop itself
//! lives in `cachet-server`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(
    not(test),
    deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

pub mod config;
pub mod error;
pub mod initiator;
pub mod responder;
pub mod wire;

pub use config::InitiatorConfig;
pub use error::TransportError;
pub use initiator::{send_message, send_message_with_key};
pub use responder::serve_connection;
