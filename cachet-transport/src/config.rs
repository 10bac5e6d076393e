//! Initiator configuration.

use std::net::SocketAddr;
use std::time::Duration;

use cachet_core::SignerIdentity;

/// Default whole-exchange deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a single outbound exchange.
#[derive(Debug, Clone)]
pub struct InitiatorConfig {
    /// Responder address.
    pub addr: SocketAddr,

    /// Deadline covering the whole exchange, from connect to close.
    pub timeout: Duration,

    /// Persistent signing identity. `None` regenerates a fresh identity
    /// per message, which is the default protocol behavior.
    pub signer: Option<SignerIdentity>,

    /// Prime widths `(p_bits, q_bits)` for per-message identity
    /// generation. `None` uses the protocol defaults.
    pub fresh_signer_bits: Option<(u64, u64)>,
}

impl InitiatorConfig {
    /// Config with defaults for the given responder address.
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            timeout: DEFAULT_TIMEOUT,
            signer: None,
            fresh_signer_bits: None,
        }
    }

    /// Override the exchange deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attach a persistent signing identity.
    #[must_use]
    pub fn with_signer(mut self, signer: SignerIdentity) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Override the prime widths used for per-message identities.
    #[must_use]
    pub fn with_fresh_signer_bits(mut self, p_bits: u64, q_bits: u64) -> Self {
        self.fresh_signer_bits = Some((p_bits, q_bits));
        self
    }
}
