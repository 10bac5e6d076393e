//! Responder daemon: accept loop and per-connection exchange workers.
//!
//! One long-lived RSA keypair is shared read-only across all workers;
//! every accepted connection gets its own task and its own exchange
//! state. Connections never outlive their exchange and are never
//! reused.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(
    not(test),
    deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

use std::sync::Arc;
use std::time::Duration;

use cachet_core::{LogSink, RsaKeyPair, Severity};
use cachet_transport::serve_connection;
use tokio::net::TcpListener;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 9999;

/// Default per-exchange deadline.
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Run the accept loop until the listener fails.
///
/// Each accepted connection is served on its own task under
/// `exchange_timeout`. A faulted or timed-out exchange only ends its
/// own connection; the loop keeps accepting.
pub async fn run(
    listener: TcpListener,
    keypair: Arc<RsaKeyPair>,
    sink: Arc<dyn LogSink>,
    exchange_timeout: Duration,
) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let keypair = keypair.clone();
        let sink = sink.clone();

        tokio::spawn(async move {
            let served = tokio::time::timeout(
                exchange_timeout,
                serve_connection(stream, keypair, sink.clone()),
            )
            .await;
            match served {
                Ok(Ok(outcome)) => {
                    let verdict = if outcome.authentic { "authentic" } else { "forged" };
                    sink.log(
                        Severity::Info,
                        &format!("exchange with {peer} complete: {verdict}"),
                    );
                }
                Ok(Err(err)) => {
                    sink.log(
                        Severity::Error,
                        &format!("exchange with {peer} failed: {err}"),
                    );
                }
                Err(_) => {
                    sink.log(
                        Severity::Error,
                        &format!("exchange with {peer} timed out"),
                    );
                }
            }
        });
    }
}
