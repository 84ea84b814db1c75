//! # Telnet Control Codes
//!
//! Byte values used on the wire by a Telnet client, as assigned by:
//! - **RFC 854**: Telnet Protocol Specification (IAC and the command bytes)
//! - **RFC 855**: Telnet Option Specifications (SB/SE framing)
//! - The individual option RFCs (857, 858, 859, 1073, 1079, 1091, ...)
//!
//! ## Command Structure
//! - Bare command: `IAC <command>` (e.g. IAC NOP, IAC AYT)
//! - Negotiation: `IAC WILL/WONT/DO/DONT <option>`
//! - Sub-negotiation: `IAC SB <option> <parameters...> IAC SE`
//!
//! Values must match the RFC numbering exactly; a single wrong byte
//! desynchronizes the remote's option state.

/// IAC - Interpret As Command (RFC 854, Section 4)
///
/// The IAC byte (255/0xFF) announces that the following byte is a command
/// rather than data.
pub const IAC: u8 = 255;

/// Telnet Commands (RFC 854, Section 4)
///
/// These commands follow the IAC byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TelnetCommand {
    /// End of subnegotiation parameters (RFC 855)
    SE = 240,
    /// No Operation
    NOP = 241,
    /// Data Mark
    DM = 242,
    /// Break
    BRK = 243,
    /// Interrupt Process
    IP = 244,
    /// Abort Output
    AO = 245,
    /// Are You There
    AYT = 246,
    /// Erase Character
    EC = 247,
    /// Erase Line
    EL = 248,
    /// Go Ahead
    GA = 249,
    /// Subnegotiation Begin (RFC 855)
    SB = 250,
    /// Sender wants to enable an option on its side
    WILL = 251,
    /// Sender refuses to enable (or wants to disable) an option on its side
    WONT = 252,
    /// Sender asks the receiver to enable an option
    DO = 253,
    /// Sender asks the receiver to disable an option
    DONT = 254,
}

impl TelnetCommand {
    /// Convert a byte to a TelnetCommand if it represents a known command
    ///
    /// # Example
    /// ```
    /// use telnet_sequence::protocol::TelnetCommand;
    ///
    /// assert_eq!(TelnetCommand::from_byte(251), Some(TelnetCommand::WILL));
    /// assert_eq!(TelnetCommand::from_byte(100), None);
    /// ```
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            240 => Some(TelnetCommand::SE),
            241 => Some(TelnetCommand::NOP),
            242 => Some(TelnetCommand::DM),
            243 => Some(TelnetCommand::BRK),
            244 => Some(TelnetCommand::IP),
            245 => Some(TelnetCommand::AO),
            246 => Some(TelnetCommand::AYT),
            247 => Some(TelnetCommand::EC),
            248 => Some(TelnetCommand::EL),
            249 => Some(TelnetCommand::GA),
            250 => Some(TelnetCommand::SB),
            251 => Some(TelnetCommand::WILL),
            252 => Some(TelnetCommand::WONT),
            253 => Some(TelnetCommand::DO),
            254 => Some(TelnetCommand::DONT),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// True for WILL, WONT, DO and DONT, the commands that carry an option byte.
    pub fn is_negotiation_command(self) -> bool {
        matches!(
            self,
            TelnetCommand::WILL | TelnetCommand::WONT | TelnetCommand::DO | TelnetCommand::DONT
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            TelnetCommand::SE => "SE",
            TelnetCommand::NOP => "NOP",
            TelnetCommand::DM => "DM",
            TelnetCommand::BRK => "BRK",
            TelnetCommand::IP => "IP",
            TelnetCommand::AO => "AO",
            TelnetCommand::AYT => "AYT",
            TelnetCommand::EC => "EC",
            TelnetCommand::EL => "EL",
            TelnetCommand::GA => "GA",
            TelnetCommand::SB => "SB",
            TelnetCommand::WILL => "WILL",
            TelnetCommand::WONT => "WONT",
            TelnetCommand::DO => "DO",
            TelnetCommand::DONT => "DONT",
        }
    }
}

impl From<TelnetCommand> for u8 {
    fn from(command: TelnetCommand) -> u8 {
        command.to_byte()
    }
}

/// The option negotiation verbs, the only commands followed by an option byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NegotiationCommand {
    WILL = 251,
    WONT = 252,
    DO = 253,
    DONT = 254,
}

impl NegotiationCommand {
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl From<NegotiationCommand> for TelnetCommand {
    fn from(command: NegotiationCommand) -> TelnetCommand {
        match command {
            NegotiationCommand::WILL => TelnetCommand::WILL,
            NegotiationCommand::WONT => TelnetCommand::WONT,
            NegotiationCommand::DO => TelnetCommand::DO,
            NegotiationCommand::DONT => TelnetCommand::DONT,
        }
    }
}

/// Telnet options the client offers or requests during login
///
/// Only the options this client actually negotiates are named here; any
/// other option byte received from a remote is carried through as a raw `u8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(non_camel_case_types)] // Protocol constants traditionally use SCREAMING_SNAKE_CASE
pub enum TelnetOption {
    /// Echo (RFC 857)
    ECHO = 1,
    /// Suppress Go Ahead (RFC 858)
    SUPPRESS_GO_AHEAD = 3,
    /// Status (RFC 859)
    STATUS = 5,
    /// Terminal Type (RFC 1091)
    TERMINAL_TYPE = 24,
    /// Negotiate About Window Size (RFC 1073)
    WINDOW_SIZE = 31,
    /// Terminal Speed (RFC 1079)
    TERMINAL_SPEED = 32,
    /// Remote Flow Control (RFC 1372)
    REMOTE_FLOW_CONTROL = 33,
    /// Linemode (RFC 1184)
    TERMINAL_LINEMODE = 34,
    /// X Display Location (RFC 1096)
    X_DISPLAY_LOCATION = 35,
    /// New Environment (RFC 1572)
    ENVIRONMENT = 39,
}

impl TelnetOption {
    /// Convert a byte to a TelnetOption if it is one of the named options
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(TelnetOption::ECHO),
            3 => Some(TelnetOption::SUPPRESS_GO_AHEAD),
            5 => Some(TelnetOption::STATUS),
            24 => Some(TelnetOption::TERMINAL_TYPE),
            31 => Some(TelnetOption::WINDOW_SIZE),
            32 => Some(TelnetOption::TERMINAL_SPEED),
            33 => Some(TelnetOption::REMOTE_FLOW_CONTROL),
            34 => Some(TelnetOption::TERMINAL_LINEMODE),
            35 => Some(TelnetOption::X_DISPLAY_LOCATION),
            39 => Some(TelnetOption::ENVIRONMENT),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Get the RFC number that defines this option
    pub fn rfc_number(self) -> u16 {
        match self {
            TelnetOption::ECHO => 857,
            TelnetOption::SUPPRESS_GO_AHEAD => 858,
            TelnetOption::STATUS => 859,
            TelnetOption::TERMINAL_TYPE => 1091,
            TelnetOption::WINDOW_SIZE => 1073,
            TelnetOption::TERMINAL_SPEED => 1079,
            TelnetOption::REMOTE_FLOW_CONTROL => 1372,
            TelnetOption::TERMINAL_LINEMODE => 1184,
            TelnetOption::X_DISPLAY_LOCATION => 1096,
            TelnetOption::ENVIRONMENT => 1572,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TelnetOption::ECHO => "ECHO",
            TelnetOption::SUPPRESS_GO_AHEAD => "SUPPRESS_GO_AHEAD",
            TelnetOption::STATUS => "STATUS",
            TelnetOption::TERMINAL_TYPE => "TERMINAL_TYPE",
            TelnetOption::WINDOW_SIZE => "WINDOW_SIZE",
            TelnetOption::TERMINAL_SPEED => "TERMINAL_SPEED",
            TelnetOption::REMOTE_FLOW_CONTROL => "REMOTE_FLOW_CONTROL",
            TelnetOption::TERMINAL_LINEMODE => "TERMINAL_LINEMODE",
            TelnetOption::X_DISPLAY_LOCATION => "X_DISPLAY_LOCATION",
            TelnetOption::ENVIRONMENT => "ENVIRONMENT",
        }
    }
}

impl From<TelnetOption> for u8 {
    fn from(option: TelnetOption) -> u8 {
        option.to_byte()
    }
}

/// ASCII control characters used when building text payloads
pub mod ascii {
    pub const NUL: u8 = 0x00;
    pub const BELL: u8 = 0x07;
    pub const BS: u8 = 0x08;
    pub const HT: u8 = 0x09;
    pub const LF: u8 = 0x0A;
    pub const VT: u8 = 0x0B;
    pub const FF: u8 = 0x0C;
    pub const CR: u8 = 0x0D;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiation_command_bytes() {
        for command in [
            NegotiationCommand::WILL,
            NegotiationCommand::WONT,
            NegotiationCommand::DO,
            NegotiationCommand::DONT,
        ] {
            let general = TelnetCommand::from(command);
            assert!(general.is_negotiation_command());
            assert_eq!(general.to_byte(), command.to_byte());
        }
    }

    #[test]
    fn test_iac_constant() {
        assert_eq!(IAC, 255);
        assert_eq!(IAC, 0xFF);
    }

    #[test]
    fn test_command_byte_conversion() {
        assert_eq!(TelnetCommand::from_byte(240), Some(TelnetCommand::SE));
        assert_eq!(TelnetCommand::from_byte(250), Some(TelnetCommand::SB));
        assert_eq!(TelnetCommand::from_byte(251), Some(TelnetCommand::WILL));
        assert_eq!(TelnetCommand::from_byte(252), Some(TelnetCommand::WONT));
        assert_eq!(TelnetCommand::from_byte(253), Some(TelnetCommand::DO));
        assert_eq!(TelnetCommand::from_byte(254), Some(TelnetCommand::DONT));
        assert_eq!(TelnetCommand::from_byte(IAC), None);
        assert_eq!(TelnetCommand::from_byte(13), None);

        assert_eq!(u8::from(TelnetCommand::DONT), 254);
    }

    #[test]
    fn test_option_codes_match_rfc_numbering() {
        assert_eq!(TelnetOption::ECHO.to_byte(), 1);
        assert_eq!(TelnetOption::SUPPRESS_GO_AHEAD.to_byte(), 3);
        assert_eq!(TelnetOption::STATUS.to_byte(), 5);
        assert_eq!(TelnetOption::TERMINAL_TYPE.to_byte(), 0x18);
        assert_eq!(TelnetOption::WINDOW_SIZE.to_byte(), 0x1f);
        assert_eq!(TelnetOption::TERMINAL_SPEED.to_byte(), 0x20);
        assert_eq!(TelnetOption::REMOTE_FLOW_CONTROL.to_byte(), 0x21);
        assert_eq!(TelnetOption::TERMINAL_LINEMODE.to_byte(), 0x22);
        assert_eq!(TelnetOption::X_DISPLAY_LOCATION.to_byte(), 0x23);
        assert_eq!(TelnetOption::ENVIRONMENT.to_byte(), 0x27);
    }

    #[test]
    fn test_option_from_byte() {
        for byte in 0..=u8::MAX {
            if let Some(option) = TelnetOption::from_byte(byte) {
                assert_eq!(option.to_byte(), byte);
            }
        }
        assert_eq!(TelnetOption::from_byte(0), None);
        assert_eq!(TelnetOption::from_byte(201), None);
    }

    #[test]
    fn test_negotiation_commands() {
        assert!(TelnetCommand::WILL.is_negotiation_command());
        assert!(TelnetCommand::WONT.is_negotiation_command());
        assert!(TelnetCommand::DO.is_negotiation_command());
        assert!(TelnetCommand::DONT.is_negotiation_command());
        assert!(!TelnetCommand::SB.is_negotiation_command());
        assert!(!TelnetCommand::NOP.is_negotiation_command());
    }

    #[test]
    fn test_rfc_numbers() {
        assert_eq!(TelnetOption::ECHO.rfc_number(), 857);
        assert_eq!(TelnetOption::TERMINAL_TYPE.rfc_number(), 1091);
        assert_eq!(TelnetOption::ENVIRONMENT.rfc_number(), 1572);
    }

    #[test]
    fn test_ascii_codes() {
        assert_eq!(ascii::CR, b'\r');
        assert_eq!(ascii::LF, b'\n');
        assert_eq!(ascii::HT, b'\t');
        assert_eq!(ascii::NUL, 0);
    }
}
