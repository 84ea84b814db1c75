//! # Command Sequences
//!
//! A [`CommandSequence`] is an ordered list of elements in wire order: literal
//! text, negotiation commands and sub-negotiation blocks. Sequences are built
//! with the `add_*` methods (or decoded from raw bytes with
//! [`CommandSequence::parse`]) and turned into wire bytes with
//! [`CommandSequence::compile`].
//!
//! ```rust
//! use telnet_sequence::{CommandSequence, NegotiationCommand, TelnetOption};
//!
//! let mut sequence = CommandSequence::new();
//! sequence
//!     .negotiate(NegotiationCommand::DO, TelnetOption::SUPPRESS_GO_AHEAD)
//!     .add_line("root");
//!
//! assert_eq!(sequence.compile(), vec![255, 253, 3, b'r', b'o', b'o', b't', b'\r']);
//! assert_eq!(sequence.text(), b"root\r");
//! ```

use std::fmt;

use crate::error::{SequenceError, SequenceResult};
use crate::parser;
use crate::protocol::{IAC, NegotiationCommand, TelnetCommand, TelnetOption, ascii};

/// One element of a command sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SequenceElement {
    /// Literal payload bytes, written as-is
    Text(Vec<u8>),

    /// `IAC <command>` or `IAC <command> <option>`
    Negotiation { command: u8, option: Option<u8> },

    /// `IAC SB <option> <data...> IAC SE`
    SubNegotiation { option: u8, data: Vec<u8> },
}

impl SequenceElement {
    /// Append the wire form of this element to `out`
    ///
    /// 0xFF bytes inside sub-negotiation data are doubled (RFC 855).
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            SequenceElement::Text(bytes) => out.extend_from_slice(bytes),
            SequenceElement::Negotiation { command, option } => {
                out.push(IAC);
                out.push(*command);
                if let Some(option) = option {
                    out.push(*option);
                }
            }
            SequenceElement::SubNegotiation { option, data } => {
                out.reserve(data.len() + 5);
                out.push(IAC);
                out.push(TelnetCommand::SB.to_byte());
                out.push(*option);
                for &byte in data {
                    if byte == IAC {
                        out.push(IAC);
                    }
                    out.push(byte);
                }
                out.push(IAC);
                out.push(TelnetCommand::SE.to_byte());
            }
        }
    }

    /// Known command, if the command byte is one
    pub fn command(&self) -> Option<TelnetCommand> {
        match self {
            SequenceElement::Negotiation { command, .. } => TelnetCommand::from_byte(*command),
            SequenceElement::SubNegotiation { .. } => Some(TelnetCommand::SB),
            SequenceElement::Text(_) => None,
        }
    }

    /// Known option, if the element carries an option byte naming one
    pub fn option(&self) -> Option<TelnetOption> {
        match self {
            SequenceElement::Negotiation {
                option: Some(option),
                ..
            }
            | SequenceElement::SubNegotiation { option, .. } => TelnetOption::from_byte(*option),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, SequenceElement::Text(_))
    }

    fn dump_into(&self, out: &mut String) {
        match self {
            SequenceElement::Text(bytes) => out.push_str(&String::from_utf8_lossy(bytes)),
            SequenceElement::Negotiation { command, option } => {
                push_hex(out, IAC);
                push_hex(out, *command);
                if let Some(option) = option {
                    push_hex(out, *option);
                }
            }
            SequenceElement::SubNegotiation { option, data } => {
                push_hex(out, IAC);
                push_hex(out, TelnetCommand::SB.to_byte());
                push_hex(out, *option);
                out.push_str(&String::from_utf8_lossy(data));
                push_hex(out, IAC);
                push_hex(out, TelnetCommand::SE.to_byte());
            }
        }
    }
}

fn push_hex(out: &mut String, byte: u8) {
    use fmt::Write;
    // Writing into a String cannot fail
    let _ = write!(out, "{:02x}", byte);
}

/// Ordered list of text, negotiation and sub-negotiation elements
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CommandSequence {
    elements: Vec<SequenceElement>,
}

impl CommandSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode raw bytes received from a remote
    ///
    /// Fails if the input ends inside a command or a sub-negotiation block.
    pub fn parse(input: &[u8]) -> SequenceResult<Self> {
        Ok(Self {
            elements: parser::decode(input)?,
        })
    }

    /// Append `IAC <command>` or `IAC <command> <option>` from raw bytes
    ///
    /// WILL, WONT, DO and DONT need an option byte and every other command
    /// must be bare, so that the bytes decode back to the same element. SB and
    /// SE are rejected; sub-negotiations are built with
    /// [`add_option`](Self::add_option).
    pub fn add_command(&mut self, command: u8, option: Option<u8>) -> SequenceResult<&mut Self> {
        let well_formed = match TelnetCommand::from_byte(command) {
            Some(TelnetCommand::SB | TelnetCommand::SE) => false,
            Some(known) if known.is_negotiation_command() => option.is_some(),
            _ => option.is_none(),
        };
        if !well_formed {
            return Err(SequenceError::InvalidCommandShape { command, option });
        }

        self.elements
            .push(SequenceElement::Negotiation { command, option });
        Ok(self)
    }

    /// Append an option negotiation such as `IAC WILL ECHO`
    pub fn negotiate(&mut self, command: NegotiationCommand, option: TelnetOption) -> &mut Self {
        self.elements.push(SequenceElement::Negotiation {
            command: command.to_byte(),
            option: Some(option.to_byte()),
        });
        self
    }

    /// Append literal text
    ///
    /// Text is written verbatim. A 0xFF byte inside it is not escaped and will
    /// be read back by a remote as IAC. Text added right after other text
    /// extends the same element, the way a decoder would read it back.
    pub fn add_text(&mut self, text: impl AsRef<[u8]>) -> &mut Self {
        self.push_text(text.as_ref());
        self
    }

    /// Append literal text terminated by CR
    pub fn add_line(&mut self, text: impl AsRef<[u8]>) -> &mut Self {
        self.push_text(text.as_ref());
        self.push_text(&[ascii::CR]);
        self
    }

    fn push_text(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        match self.elements.last_mut() {
            Some(SequenceElement::Text(text)) => text.extend_from_slice(bytes),
            _ => self.elements.push(SequenceElement::Text(bytes.to_vec())),
        }
    }

    /// Append `IAC SB <option> <data> IAC SE`
    pub fn add_option(&mut self, option: u8, data: impl AsRef<[u8]>) -> &mut Self {
        self.elements.push(SequenceElement::SubNegotiation {
            option,
            data: data.as_ref().to_vec(),
        });
        self
    }

    /// Wire bytes for the whole sequence
    pub fn compile(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for element in &self.elements {
            element.encode_into(&mut out);
        }
        out
    }

    /// Concatenated bytes of the text elements only
    pub fn text(&self) -> Vec<u8> {
        self.elements
            .iter()
            .filter_map(|element| match element {
                SequenceElement::Text(bytes) => Some(bytes.as_slice()),
                _ => None,
            })
            .flatten()
            .copied()
            .collect()
    }

    /// [`text`](Self::text) decoded as UTF-8, replacing invalid bytes
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.text()).into_owned()
    }

    /// Human-readable trace for logs
    ///
    /// Text is shown as-is, commands as hex bytes (`fffb01` for IAC WILL ECHO),
    /// elements separated by a space.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            element.dump_into(&mut out);
        }
        out
    }

    pub fn elements(&self) -> &[SequenceElement] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SequenceElement> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl fmt::Display for CommandSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}

impl TryFrom<&[u8]> for CommandSequence {
    type Error = SequenceError;

    fn try_from(input: &[u8]) -> Result<Self, Self::Error> {
        Self::parse(input)
    }
}

impl FromIterator<SequenceElement> for CommandSequence {
    fn from_iter<I: IntoIterator<Item = SequenceElement>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for CommandSequence {
    type Item = SequenceElement;
    type IntoIter = std::vec::IntoIter<SequenceElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a> IntoIterator for &'a CommandSequence {
    type Item = &'a SequenceElement;
    type IntoIter = std::slice::Iter<'a, SequenceElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login_offer() -> CommandSequence {
        let mut sequence = CommandSequence::new();
        sequence
            .negotiate(NegotiationCommand::DO, TelnetOption::SUPPRESS_GO_AHEAD)
            .negotiate(NegotiationCommand::WILL, TelnetOption::TERMINAL_TYPE)
            .add_option(TelnetOption::TERMINAL_TYPE.to_byte(), b"\x00XTERM")
            .add_command(TelnetCommand::NOP.to_byte(), None)
            .unwrap()
            .add_line("root");
        sequence
    }

    #[test]
    fn test_compile_negotiation() {
        let mut sequence = CommandSequence::new();
        sequence.negotiate(NegotiationCommand::WILL, TelnetOption::ECHO);

        assert_eq!(sequence.compile(), vec![255, 251, 1]);
    }

    #[test]
    fn test_compile_bare_command() {
        let mut sequence = CommandSequence::new();
        sequence
            .add_command(TelnetCommand::AYT.to_byte(), None)
            .unwrap();

        assert_eq!(sequence.compile(), vec![255, 246]);
    }

    #[test]
    fn test_compile_sub_negotiation() {
        let mut sequence = CommandSequence::new();
        sequence.add_option(0x18, b"VT100");

        assert_eq!(
            sequence.compile(),
            vec![255, 250, 0x18, b'V', b'T', b'1', b'0', b'0', 255, 240]
        );
    }

    #[test]
    fn test_compile_escapes_iac_in_sub_negotiation_data() {
        let mut sequence = CommandSequence::new();
        sequence.add_option(31, [0, 255, 0, 24]);

        assert_eq!(
            sequence.compile(),
            vec![255, 250, 31, 0, 255, 255, 0, 24, 255, 240]
        );
    }

    #[test]
    fn test_compile_is_repeatable() {
        let sequence = login_offer();

        assert_eq!(sequence.compile(), sequence.compile());
        assert_eq!(sequence.len(), 5);
    }

    #[test]
    fn test_parse_compile_round_trip() {
        let sequence = login_offer();

        let parsed = CommandSequence::parse(&sequence.compile()).unwrap();

        assert_eq!(parsed, sequence);
    }

    #[test]
    fn test_wire_round_trip() {
        let wire = [
            255, 253, 24, 255, 250, 24, 1, 255, 240, b'l', b'o', b'g', b'i', b'n', b':', 255, 255,
            b' ', 255, 249,
        ];

        let parsed = CommandSequence::parse(&wire).unwrap();

        assert_eq!(parsed.compile(), wire.to_vec());
    }

    #[test]
    fn test_sub_negotiation_round_trip() {
        let wire = [255, 250, 0x18, b'V', b'T', b'1', b'0', b'0', 255, 240];

        let parsed = CommandSequence::parse(&wire).unwrap();

        assert_eq!(
            parsed.elements(),
            &[SequenceElement::SubNegotiation {
                option: 0x18,
                data: b"VT100".to_vec()
            }]
        );
        assert_eq!(parsed.compile(), wire.to_vec());
    }

    #[test]
    fn test_text_skips_commands() {
        let mut sequence = CommandSequence::new();
        sequence
            .add_text("uptime")
            .negotiate(NegotiationCommand::DONT, TelnetOption::X_DISPLAY_LOCATION)
            .add_option(24, "ignored")
            .add_line(" -p");

        assert_eq!(sequence.text(), b"uptime -p\r");
        assert_eq!(sequence.text_lossy(), "uptime -p\r");
    }

    #[test]
    fn test_text_of_command_only_sequence_is_empty() {
        let mut sequence = CommandSequence::new();
        sequence.negotiate(NegotiationCommand::WILL, TelnetOption::ECHO);

        assert!(sequence.text().is_empty());
    }

    #[test]
    fn test_dump() {
        let mut sequence = CommandSequence::new();
        sequence
            .negotiate(NegotiationCommand::WILL, TelnetOption::ECHO)
            .add_text("Password:")
            .add_option(24, "VT100")
            .add_command(TelnetCommand::GA.to_byte(), None)
            .unwrap();

        assert_eq!(sequence.dump(), "fffb01 Password: fffa18VT100fff0 fff9");
        assert_eq!(sequence.to_string(), sequence.dump());
    }

    #[test]
    fn test_dump_handles_non_utf8_text() {
        let mut sequence = CommandSequence::new();
        sequence.add_text([0xC3, 0x28]).add_option(1, [0xFF, 0xFE]);

        let dump = sequence.dump();

        assert!(dump.starts_with('\u{FFFD}'));
        assert!(dump.ends_with("fff0"));
    }

    #[test]
    fn test_element_accessors() {
        let parsed = CommandSequence::parse(&[255, 254, 35, 255, 250, 5, 0, 255, 240]).unwrap();

        assert_eq!(parsed.elements()[0].command(), Some(TelnetCommand::DONT));
        assert_eq!(
            parsed.elements()[0].option(),
            Some(TelnetOption::X_DISPLAY_LOCATION)
        );
        assert_eq!(parsed.elements()[1].command(), Some(TelnetCommand::SB));
        assert_eq!(parsed.elements()[1].option(), Some(TelnetOption::STATUS));
        assert!(!parsed.elements()[1].is_text());
    }

    #[test]
    fn test_try_from_reports_malformed_input() {
        let result = CommandSequence::try_from(&[b'o', b'k', 255, 251][..]);

        assert!(matches!(result, Err(SequenceError::Truncated { .. })));
    }

    #[test]
    fn test_collect_and_iterate() {
        let sequence: CommandSequence = vec![
            SequenceElement::Text(b"a".to_vec()),
            SequenceElement::Text(b"b".to_vec()),
        ]
        .into_iter()
        .collect();

        assert_eq!((&sequence).into_iter().count(), 2);
        assert_eq!(sequence.iter().filter(|e| e.is_text()).count(), 2);
        assert_eq!(sequence.into_iter().count(), 2);
    }

    #[test]
    fn test_add_command_rejects_shapes_that_do_not_decode_back() {
        let mut sequence = CommandSequence::new();

        let cases = [
            (TelnetCommand::WILL.to_byte(), None),
            (TelnetCommand::DONT.to_byte(), None),
            (TelnetCommand::NOP.to_byte(), Some(5)),
            (TelnetCommand::SB.to_byte(), Some(24)),
            (TelnetCommand::SE.to_byte(), None),
            (IAC, Some(1)),
        ];
        for (command, option) in cases {
            assert_eq!(
                sequence.add_command(command, option).map(|_| ()),
                Err(SequenceError::InvalidCommandShape { command, option })
            );
        }

        assert!(sequence.is_empty());
    }

    #[test]
    fn test_adjacent_text_shares_one_element() {
        let mut sequence = CommandSequence::new();
        sequence.add_text("user").add_text("").add_line("name");

        assert_eq!(
            sequence.elements(),
            &[SequenceElement::Text(b"username\r".to_vec())]
        );
        assert_eq!(CommandSequence::parse(&sequence.compile()).unwrap(), sequence);
    }

    #[test]
    fn test_every_command_shape_round_trips() {
        let options = [0u8, 1, 24, 35, IAC];
        let sub_data: [&[u8]; 4] = [b"", b"VT100", &[IAC], &[0, IAC, 240, IAC]];
        let framing = [TelnetCommand::SB.to_byte(), TelnetCommand::SE.to_byte()];

        for command in (0u8..=255).filter(|c| !framing.contains(c)) {
            let negotiation = TelnetCommand::from_byte(command)
                .is_some_and(TelnetCommand::is_negotiation_command);
            let shapes: Vec<Option<u8>> = if negotiation {
                options.iter().copied().map(Some).collect()
            } else {
                vec![None]
            };

            for option in shapes {
                for data in sub_data {
                    let mut sequence = CommandSequence::new();
                    sequence.add_text("a");
                    sequence.add_command(command, option).unwrap();
                    sequence
                        .add_text("b")
                        .add_option(option.unwrap_or(TelnetOption::TERMINAL_TYPE.to_byte()), data)
                        .add_command(command, option)
                        .unwrap();

                    let parsed = CommandSequence::parse(&sequence.compile()).unwrap();

                    assert_eq!(
                        parsed, sequence,
                        "command {command}, option {option:?}, data {data:?}"
                    );
                }
            }
        }
    }
}
