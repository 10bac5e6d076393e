//! Core protocol logic for cachet, a point-to-point authenticated
//! messaging protocol built from first-principles primitives.
//!
//! Everything in this crate is sans-IO: the exchange state machines
//! consume and produce [`frame::WireField`]s and never touch a socket.
//! Transport integration lives in `cachet-transport`, the responder
//! daemon in `cachet-server`.
//!
//! The primitives (a 64-bit Feistel block cipher, raw RSA key transport,
//! DSA signatures) are hand-implemented for study. They are NOT hardened
//! against side channels and carry no padding schemes beyond what the
//! protocol itself needs. Do not protect real secrets with this crate.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(
    not(test),
    deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

pub mod dsa;
pub mod error;
pub mod event;
pub mod exchange;
pub mod feistel;
pub mod frame;
pub mod numeric;
pub mod rsa;

pub use error::ProtocolError;
pub use event::{LogSink, NullSink, Severity, StdoutSink};
pub use exchange::{
    ExchangeOutcome, InitiatorExchange, InitiatorState, ResponderExchange, ResponderState,
    SignerIdentity,
};
pub use feistel::SymmetricKey;
pub use frame::{FieldKind, WireField};
pub use rsa::RsaKeyPair;
