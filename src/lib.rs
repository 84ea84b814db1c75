//! # telnet-client
//!
//! A scriptable Telnet client. A [`TelnetSession`] connects to a remote,
//! runs the option negotiation handshake, logs in and then exchanges
//! command lines, using the shell prompt to tell when a command finished.
//!
//! The wire format lives in the `telnet-sequence` crate, re-exported here as
//! [`sequence`].

pub mod config;
pub mod connection;
pub mod errors;
pub mod handshake;
pub mod logger;
pub mod session;
pub mod transcript;

pub use telnet_sequence as sequence;
pub use telnet_sequence::{
    CommandSequence, NegotiationCommand, SequenceElement, TelnetCommand, TelnetOption,
};

pub use config::{ClientConfig, ConfigError};
pub use connection::{Connection, ReadOutcome, TcpConnection};
pub use errors::{SessionError, SessionResult};
pub use handshake::{Handshake, HandshakeStep};
pub use logger::{LogLevel, SessionLogger, TracingLogger};
pub use session::{SessionOptions, TelnetSession};
pub use transcript::{Transcript, TranscriptEntry};
