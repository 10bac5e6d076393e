//! Transport errors.

use std::fmt;
use std::io;

use cachet_core::ProtocolError;

/// Errors raised while driving an exchange over a socket.
///
/// Any of these abandons the exchange; the connection is closed and
/// never reused.
#[derive(Debug)]
pub enum TransportError {
    /// Socket-level failure.
    Io(io::Error),

    /// Protocol violation reported by the exchange or the field codec.
    Protocol(ProtocolError),

    /// Peer closed the connection mid-exchange.
    PeerDisconnected,

    /// Exchange deadline elapsed.
    Timeout,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Protocol(err) => write!(f, "protocol error: {err}"),
            Self::PeerDisconnected => write!(f, "peer disconnected"),
            Self::Timeout => write!(f, "exchange timed out"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        // A clean EOF mid-read means the peer walked away.
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::PeerDisconnected
        } else {
            Self::Io(err)
        }
    }
}

impl From<ProtocolError> for TransportError {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err)
    }
}
