//! Optional traffic log for a session.
//!
//! A session reports every sequence it sends and matches to a
//! [`SessionLogger`]. Sessions without one stay silent apart from the
//! `tracing` debug events the engine always emits.

/// Plain string sink for session traffic
pub trait SessionLogger: Send {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards session traffic to the `tracing` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl SessionLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "telnet_client::session", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "telnet_client::session", "{}", message);
    }
}

impl<F> SessionLogger for F
where
    F: Fn(LogLevel, &str) + Send,
{
    fn info(&self, message: &str) {
        self(LogLevel::Info, message)
    }

    fn error(&self, message: &str) {
        self(LogLevel::Error, message)
    }
}

/// Level passed to closure loggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}
