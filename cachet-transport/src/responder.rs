//! Responder exchange driver.
//!
//! Drives one accepted connection through a full exchange: publish the
//! public key, collect the payload fields, hand them to the state
//! machine, report the verdict. The caller owns the accept loop and the
//! per-connection task.

use std::sync::Arc;

use cachet_core::exchange::PAYLOAD_FIELD_COUNT;
use cachet_core::{ExchangeOutcome, LogSink, ResponderExchange, RsaKeyPair};
use tokio::net::TcpStream;

use crate::error::TransportError;
use crate::wire::{read_fields, write_fields};

/// Serve one connection to completion.
///
/// Returns the exchange outcome (which carries the verdict); transport
/// loss or a protocol violation surfaces as an error instead. The
/// stream is consumed either way.
pub async fn serve_connection(
    mut stream: TcpStream,
    keypair: Arc<RsaKeyPair>,
    sink: Arc<dyn LogSink>,
) -> Result<ExchangeOutcome, TransportError> {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| String::from("unknown"));

    let mut exchange = ResponderExchange::new(keypair, sink);
    exchange.on_accepted(&peer)?;

    let key_fields = exchange.publish_key()?;
    write_fields(&mut stream, &key_fields).await?;
    exchange.on_key_sent()?;

    let payload = match read_fields(&mut stream, PAYLOAD_FIELD_COUNT).await {
        Ok(fields) => fields,
        Err(err) => {
            exchange.on_disconnected();
            return Err(err);
        }
    };

    Ok(exchange.on_payload(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachet_core::{rsa, NullSink};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    fn sink() -> Arc<dyn LogSink> {
        Arc::new(NullSink)
    }

    #[tokio::test]
    async fn test_peer_hangup_after_key_is_disconnect() {
        let mut rng = StdRng::seed_from_u64(51);
        let keypair = Arc::new(rsa::generate_keypair(128, &mut rng));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            serve_connection(stream, keypair, sink()).await
        });

        // Connect, read the two key fields, then hang up.
        let mut client = TcpStream::connect(addr).await.unwrap();
        let _ = crate::wire::read_fields(&mut client, 2).await.unwrap();
        drop(client);

        let result = server.await.unwrap();
        assert!(matches!(result, Err(TransportError::PeerDisconnected)));
    }

    #[tokio::test]
    async fn test_garbage_field_kind_is_protocol_error() {
        let mut rng = StdRng::seed_from_u64(52);
        let keypair = Arc::new(rsa::generate_keypair(128, &mut rng));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            serve_connection(stream, keypair, sink()).await
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        let _ = crate::wire::read_fields(&mut client, 2).await.unwrap();
        client.write_all(&[0x00, 0x02, 0x09, 0x01]).await.unwrap();
        client.flush().await.unwrap();

        let result = server.await.unwrap();
        assert!(matches!(result, Err(TransportError::Protocol(_))));
    }
}
