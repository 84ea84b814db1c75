//! # Telnet Sequence Library
//!
//! Encoding and decoding of Telnet command sequences as defined in:
//! - RFC 854: Telnet Protocol Specification (https://tools.ietf.org/html/rfc854)
//! - RFC 855: Telnet Option Specifications (sub-negotiation framing)
//!
//! A command sequence is the unit a Telnet client writes and waits for: some
//! literal text, option negotiations (`IAC WILL ECHO`) and sub-negotiation
//! blocks (`IAC SB TERMINAL_TYPE ... IAC SE`), in wire order.
//!
//! ## Modules
//! - `protocol`: IAC, command, option and ASCII control codes
//! - `sequence`: `CommandSequence` builder, encoder and text extraction
//! - `parser`: decoder from raw bytes
//! - `error`: `SequenceError` for malformed input

pub mod error;
pub mod parser;
pub mod protocol;
pub mod sequence;

pub use error::{SequenceError, SequenceResult};
pub use protocol::{IAC, NegotiationCommand, TelnetCommand, TelnetOption, ascii};
pub use sequence::{CommandSequence, SequenceElement};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// RFCs whose framing this library follows
pub const SUPPORTED_RFCS: &[&str] = &[
    "RFC 854 - Telnet Protocol Specification",
    "RFC 855 - Telnet Option Specifications",
];
