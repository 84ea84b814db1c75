//! Scripted option negotiation run at the start of [`login`].
//!
//! The default script offers the client's capabilities, waits for the
//! remote's `DONT X_DISPLAY_LOCATION` reply as a synchronization point and
//! then toggles suppress-go-ahead and echo. Remotes that answer differently
//! get their own script built with [`Handshake::empty`].
//!
//! [`login`]: crate::session::TelnetSession::login

use telnet_sequence::{CommandSequence, NegotiationCommand, TelnetOption};

/// One step of a handshake script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeStep {
    /// Write the sequence
    Send(CommandSequence),
    /// Wait until the sequence's bytes show up in the receive buffer
    Await(CommandSequence),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    steps: Vec<HandshakeStep>,
}

impl Default for Handshake {
    fn default() -> Self {
        let mut handshake = Self::empty();
        let mut reply = CommandSequence::new();
        reply.negotiate(NegotiationCommand::DONT, TelnetOption::X_DISPLAY_LOCATION);

        handshake
            .send(Self::capability_offer())
            .await_sequence(reply)
            .send(Self::echo_toggle());
        handshake
    }
}

impl Handshake {
    /// A script with no steps; login goes straight to the credentials
    pub fn empty() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn send(&mut self, sequence: CommandSequence) -> &mut Self {
        self.steps.push(HandshakeStep::Send(sequence));
        self
    }

    pub fn await_sequence(&mut self, sequence: CommandSequence) -> &mut Self {
        self.steps.push(HandshakeStep::Await(sequence));
        self
    }

    pub fn steps(&self) -> &[HandshakeStep] {
        &self.steps
    }

    /// Capabilities declared by the client, in send order
    pub fn capability_offer() -> CommandSequence {
        use NegotiationCommand::{DO, WILL};
        use TelnetOption::*;

        let mut sequence = CommandSequence::new();
        sequence
            .negotiate(DO, SUPPRESS_GO_AHEAD)
            .negotiate(WILL, TERMINAL_TYPE)
            .negotiate(WILL, WINDOW_SIZE)
            .negotiate(WILL, TERMINAL_SPEED)
            .negotiate(WILL, REMOTE_FLOW_CONTROL)
            .negotiate(WILL, TERMINAL_LINEMODE)
            .negotiate(WILL, ENVIRONMENT)
            .negotiate(DO, STATUS)
            .negotiate(WILL, X_DISPLAY_LOCATION);
        sequence
    }

    /// Sent once the remote has answered the capability offer
    pub fn echo_toggle() -> CommandSequence {
        let mut sequence = CommandSequence::new();
        sequence
            .negotiate(NegotiationCommand::DO, TelnetOption::SUPPRESS_GO_AHEAD)
            .negotiate(NegotiationCommand::WILL, TelnetOption::ECHO);
        sequence
    }
}
