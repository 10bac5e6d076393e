//! Protocol log events.
//!
//! The exchanges narrate every protocol step through a [`LogSink`] so any
//! presentation layer (terminal, GUI, test harness) can subscribe without
//! the core depending on a particular scheduling model. Sinks must be
//! cheap and non-blocking; the exchanges call them inline.

/// Log line severity.
///
/// Mirrors the three outcomes a step can have: routine progress, a
/// security-relevant success, or a rejection/failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Routine protocol progress.
    Info,
    /// Security-relevant success (message signed, signature valid).
    Success,
    /// Rejection or failure (signature invalid, protocol violation).
    Error,
}

/// Receiver for protocol log lines.
pub trait LogSink: Send + Sync {
    /// Handle one log line. Must not block.
    fn log(&self, severity: Severity, message: &str);
}

/// Sink that discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _severity: Severity, _message: &str) {}
}

/// Sink that writes tagged lines to stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn log(&self, severity: Severity, message: &str) {
        let tag = match severity {
            Severity::Info => "info",
            Severity::Success => " ok ",
            Severity::Error => "fail",
        };
        println!("[{tag}] {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct VecSink(Mutex<Vec<(Severity, String)>>);

    impl LogSink for VecSink {
        fn log(&self, severity: Severity, message: &str) {
            self.0.lock().unwrap().push((severity, message.to_string()));
        }
    }

    #[test]
    fn test_sink_collects_lines() {
        let sink = VecSink(Mutex::new(Vec::new()));
        sink.log(Severity::Info, "hello");
        sink.log(Severity::Error, "bad");
        let lines = sink.0.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], (Severity::Info, "hello".to_string()));
    }

    #[test]
    fn test_null_sink_is_silent() {
        NullSink.log(Severity::Success, "ignored");
    }
}
