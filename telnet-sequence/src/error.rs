use thiserror::Error;

/// Raw bytes that do not follow the IAC grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// Input ended in the middle of a command
    #[error("truncated telnet sequence at byte {offset}: expected {expected}")]
    Truncated {
        offset: usize,
        expected: &'static str,
    },

    /// `IAC SB <option>` was never closed by `IAC SE`
    #[error("sub-negotiation for option {option:#04x} is missing IAC SE")]
    UnterminatedSubNegotiation { option: u8 },

    /// Inside a sub-negotiation, IAC must be followed by SE or a second IAC
    #[error(
        "invalid byte {byte:#04x} after IAC at byte {offset} inside sub-negotiation for option {option:#04x}"
    )]
    InvalidSubNegotiationEscape { option: u8, byte: u8, offset: usize },

    /// A command byte paired with an option it cannot carry on the wire
    #[error("command {command:#04x} cannot be written with option {option:?}")]
    InvalidCommandShape { command: u8, option: Option<u8> },
}

pub type SequenceResult<T> = Result<T, SequenceError>;
