//! # Telnet Sequence Decoder
//!
//! Splits a complete buffer of raw Telnet bytes into [`SequenceElement`]s
//! according to **RFC 854** and **RFC 855**.
//!
//! ## IAC State Machine
//! - **Data**: normal bytes accumulate into a text run
//! - **Iac**: found 255, the next byte selects the command
//! - **Option**: WILL/WONT/DO/DONT seen, the next byte is the option
//! - **SubOption / SubData / SubIac**: inside `IAC SB <option> ... IAC SE`
//!
//! Inside a sub-negotiation block `IAC IAC` stands for a single 0xFF data
//! byte and `IAC SE` closes the block. At the top level `IAC IAC` is kept
//! as a bare command so that re-encoding reproduces the input exactly.
//!
//! Unlike a streaming parser this decoder sees the whole input at once, so
//! input that ends inside a command is an error rather than a reason to wait.

use crate::error::{SequenceError, SequenceResult};
use crate::protocol::{IAC, TelnetCommand};
use crate::sequence::SequenceElement;

#[derive(Debug, Clone, PartialEq, Eq)]
enum DecodeState {
    /// Expecting normal data or IAC
    Data,
    /// Found IAC, expecting command byte
    Iac,
    /// Found a negotiation command, expecting its option byte
    Option(u8),
    /// Found IAC SB, expecting the option byte
    SubOption,
    /// Collecting sub-negotiation data
    SubData { option: u8, data: Vec<u8> },
    /// Found IAC inside sub-negotiation data, expecting SE or IAC
    SubIac { option: u8, data: Vec<u8> },
}

/// Decode a complete byte buffer into sequence elements
///
/// # Example
/// ```rust
/// use telnet_sequence::parser::decode;
/// use telnet_sequence::SequenceElement;
///
/// // "hello" + IAC WILL ECHO
/// let elements = decode(&[104, 101, 108, 108, 111, 255, 251, 1]).unwrap();
///
/// assert_eq!(elements[0], SequenceElement::Text(b"hello".to_vec()));
/// assert_eq!(
///     elements[1],
///     SequenceElement::Negotiation { command: 251, option: Some(1) }
/// );
/// ```
pub fn decode(input: &[u8]) -> SequenceResult<Vec<SequenceElement>> {
    let mut elements = Vec::new();
    let mut text = Vec::new();
    let mut state = DecodeState::Data;

    for (offset, &byte) in input.iter().enumerate() {
        state = match state {
            DecodeState::Data => {
                if byte == IAC {
                    flush_text(&mut text, &mut elements);
                    DecodeState::Iac
                } else {
                    text.push(byte);
                    DecodeState::Data
                }
            }

            DecodeState::Iac => match TelnetCommand::from_byte(byte) {
                Some(TelnetCommand::SB) => DecodeState::SubOption,
                Some(command) if command.is_negotiation_command() => DecodeState::Option(byte),
                _ => {
                    // NOP, AYT, GA, a doubled IAC or an unknown byte
                    elements.push(SequenceElement::Negotiation {
                        command: byte,
                        option: None,
                    });
                    DecodeState::Data
                }
            },

            DecodeState::Option(command) => {
                elements.push(SequenceElement::Negotiation {
                    command,
                    option: Some(byte),
                });
                DecodeState::Data
            }

            DecodeState::SubOption => DecodeState::SubData {
                option: byte,
                data: Vec::new(),
            },

            DecodeState::SubData { option, mut data } => {
                if byte == IAC {
                    DecodeState::SubIac { option, data }
                } else {
                    data.push(byte);
                    DecodeState::SubData { option, data }
                }
            }

            DecodeState::SubIac { option, mut data } => {
                if byte == IAC {
                    data.push(IAC);
                    DecodeState::SubData { option, data }
                } else if byte == TelnetCommand::SE.to_byte() {
                    elements.push(SequenceElement::SubNegotiation { option, data });
                    DecodeState::Data
                } else {
                    return Err(SequenceError::InvalidSubNegotiationEscape {
                        option,
                        byte,
                        offset,
                    });
                }
            }
        };
    }

    match state {
        DecodeState::Data => {
            flush_text(&mut text, &mut elements);
            Ok(elements)
        }
        DecodeState::Iac => Err(SequenceError::Truncated {
            offset: input.len(),
            expected: "command byte after IAC",
        }),
        DecodeState::Option(_) => Err(SequenceError::Truncated {
            offset: input.len(),
            expected: "option byte after negotiation command",
        }),
        DecodeState::SubOption => Err(SequenceError::Truncated {
            offset: input.len(),
            expected: "option byte after IAC SB",
        }),
        DecodeState::SubData { option, .. } | DecodeState::SubIac { option, .. } => {
            Err(SequenceError::UnterminatedSubNegotiation { option })
        }
    }
}

fn flush_text(text: &mut Vec<u8>, elements: &mut Vec<SequenceElement>) {
    if !text.is_empty() {
        elements.push(SequenceElement::Text(std::mem::take(text)));
    }
}
