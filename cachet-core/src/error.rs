//! Protocol errors.
//!
//! All errors are terminal for the exchange they occur in. There is no
//! recovery: a faulted exchange is abandoned and its connection closed.
//!
//! A failed signature verification is NOT an error — it is a normal
//! boolean outcome reported through the exchange verdict.

use std::fmt;

/// All possible protocol errors.
///
/// Each variant aborts the exchange it occurs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Field body exceeds the wire limit (4096 bytes)
    FieldTooLarge,

    /// Field body is empty (length < 1)
    FieldEmpty,

    /// Unknown field kind byte
    UnknownFieldKind,

    /// Field kind does not match what the protocol step expects
    UnexpectedFieldKind,

    /// Wrong number of fields for the protocol step
    WrongFieldCount,

    /// Text field is not valid UTF-8
    InvalidUtf8,

    /// Symmetric key is not 16 hex nibbles
    InvalidKey,

    /// Ciphertext is not hex or not a whole number of blocks
    InvalidCiphertext,

    /// Operation not valid in the exchange's current state
    OutOfSequence,

    /// Exchange has already reached a terminal state
    ExchangeFaulted,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Deliberately terse. Do not leak details.
        match self {
            Self::FieldTooLarge => write!(f, "field too large"),
            Self::FieldEmpty => write!(f, "field empty"),
            Self::UnknownFieldKind => write!(f, "unknown field kind"),
            Self::UnexpectedFieldKind => write!(f, "unexpected field kind"),
            Self::WrongFieldCount => write!(f, "wrong field count"),
            Self::InvalidUtf8 => write!(f, "invalid utf-8"),
            Self::InvalidKey => write!(f, "invalid symmetric key"),
            Self::InvalidCiphertext => write!(f, "invalid ciphertext"),
            Self::OutOfSequence => write!(f, "operation out of sequence"),
            Self::ExchangeFaulted => write!(f, "exchange faulted"),
        }
    }
}

impl std::error::Error for ProtocolError {}
