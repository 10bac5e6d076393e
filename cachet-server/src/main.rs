//! Responder daemon entry point.
//!
//! Usage: `cachet-server [PORT]` (defaults to 9999).

use std::process::ExitCode;
use std::sync::Arc;

use cachet_core::{rsa, LogSink, Severity, StdoutSink};
use cachet_server::{run, DEFAULT_EXCHANGE_TIMEOUT, DEFAULT_PORT};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    let sink: Arc<dyn LogSink> = Arc::new(StdoutSink);

    let port = match parse_port(std::env::args().nth(1)) {
        Ok(port) => port,
        Err(message) => {
            sink.log(Severity::Error, &message);
            return ExitCode::FAILURE;
        }
    };

    sink.log(Severity::Info, "generating keypair");
    let mut rng = StdRng::from_entropy();
    let keypair = Arc::new(rsa::generate_keypair(rsa::DEFAULT_MODULUS_BITS, &mut rng));

    let listener = match TcpListener::bind(("127.0.0.1", port)).await {
        Ok(listener) => listener,
        Err(err) => {
            sink.log(Severity::Error, &format!("bind failed: {err}"));
            return ExitCode::FAILURE;
        }
    };
    sink.log(Severity::Info, &format!("listening on 127.0.0.1:{port}"));

    if let Err(err) = run(listener, keypair, sink.clone(), DEFAULT_EXCHANGE_TIMEOUT).await {
        sink.log(Severity::Error, &format!("accept loop failed: {err}"));
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn parse_port(arg: Option<String>) -> Result<u16, String> {
    match arg {
        None => Ok(DEFAULT_PORT),
        Some(raw) => raw
            .parse::<u16>()
            .map_err(|_| format!("invalid port: {raw}")),
    }
}
