//! Initiator exchange driver.
//!
//! Connects, receives the responder's public key, seals the message and
//! ships the payload, then closes. One message per connection.

use std::sync::Arc;

use cachet_core::exchange::KEY_FIELD_COUNT;
use cachet_core::{InitiatorExchange, LogSink, SymmetricKey};
use rand::{CryptoRng, Rng};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::config::InitiatorConfig;
use crate::error::TransportError;
use crate::wire::{read_fields, write_fields};

/// Send one message to the responder named in `config`.
///
/// The session key is drawn from `rng`. The whole exchange runs under
/// `config.timeout`.
pub async fn send_message<R>(
    config: &InitiatorConfig,
    message: &str,
    sink: Arc<dyn LogSink>,
    rng: &mut R,
) -> Result<(), TransportError>
where
    R: Rng + CryptoRng,
{
    let key = SymmetricKey::generate(rng);
    send_message_with_key(config, message, key, sink, rng).await
}

/// Send one message with an explicit session key.
///
/// Exists for deterministic runs; production callers use
/// [`send_message`].
pub async fn send_message_with_key<R>(
    config: &InitiatorConfig,
    message: &str,
    key: SymmetricKey,
    sink: Arc<dyn LogSink>,
    rng: &mut R,
) -> Result<(), TransportError>
where
    R: Rng + CryptoRng,
{
    let mut exchange = match config.signer.clone() {
        Some(signer) => InitiatorExchange::with_signer(sink, signer),
        None => InitiatorExchange::new(sink),
    };
    if let Some((p_bits, q_bits)) = config.fresh_signer_bits {
        exchange = exchange.with_signer_bits(p_bits, q_bits);
    }

    let result = tokio::time::timeout(
        config.timeout,
        drive(config, &mut exchange, message, key, rng),
    )
    .await;
    match result {
        Ok(inner) => inner,
        Err(_) => Err(TransportError::Timeout),
    }
}

async fn drive<R>(
    config: &InitiatorConfig,
    exchange: &mut InitiatorExchange,
    message: &str,
    key: SymmetricKey,
    rng: &mut R,
) -> Result<(), TransportError>
where
    R: Rng + CryptoRng,
{
    let mut stream = TcpStream::connect(config.addr).await?;
    exchange.on_connected(&config.addr.to_string())?;

    let key_fields = read_fields(&mut stream, KEY_FIELD_COUNT).await?;
    exchange.on_public_key(&key_fields)?;

    let payload = exchange.seal_with_key(message, key, rng)?;
    write_fields(&mut stream, &payload).await?;
    exchange.on_sent()?;

    stream.shutdown().await?;
    exchange.on_closed();
    Ok(())
}
