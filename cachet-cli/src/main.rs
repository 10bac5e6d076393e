//! One-shot initiator CLI.
//!
//! Usage: `cachet [--timeout SECS] HOST:PORT MESSAGE...`
//!
//! Connects to the responder, sends one signed and encrypted message,
//! and exits. Remaining arguments are joined into the message; leading
//! and trailing whitespace is dropped before sealing.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use cachet_core::{LogSink, Severity, StdoutSink};
use cachet_transport::{send_message, InitiatorConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

struct Args {
    addr: SocketAddr,
    message: String,
    timeout: Option<Duration>,
}

fn parse_args(mut args: std::env::Args) -> Result<Args, String> {
    let _ = args.next(); // program name

    let mut timeout = None;
    let mut positional = Vec::new();
    while let Some(arg) = args.next() {
        if arg == "--timeout" {
            let raw = args.next().ok_or("--timeout requires a value")?;
            let secs: u64 = raw.parse().map_err(|_| format!("invalid timeout: {raw}"))?;
            timeout = Some(Duration::from_secs(secs));
        } else {
            positional.push(arg);
        }
    }

    if positional.len() < 2 {
        return Err(String::from("usage: cachet [--timeout SECS] HOST:PORT MESSAGE..."));
    }
    let addr = positional[0]
        .parse::<SocketAddr>()
        .map_err(|_| format!("invalid address: {}", positional[0]))?;
    let message = positional[1..].join(" ").trim().to_string();
    if message.is_empty() {
        return Err(String::from("message is empty"));
    }

    Ok(Args {
        addr,
        message,
        timeout,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let sink: Arc<dyn LogSink> = Arc::new(StdoutSink);

    let args = match parse_args(std::env::args()) {
        Ok(args) => args,
        Err(message) => {
            sink.log(Severity::Error, &message);
            return ExitCode::FAILURE;
        }
    };

    let mut config = InitiatorConfig::new(args.addr);
    if let Some(timeout) = args.timeout {
        config = config.with_timeout(timeout);
    }

    let mut rng = StdRng::from_entropy();
    match send_message(&config, &args.message, sink.clone(), &mut rng).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            sink.log(Severity::Error, &format!("send failed: {err}"));
            ExitCode::FAILURE
        }
    }
}
