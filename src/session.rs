//! # Telnet Session Engine
//!
//! A [`TelnetSession`] owns one connection and the bytes received on it that
//! no await has consumed yet. Every operation is built from three
//! primitives:
//!
//! - [`send`](TelnetSession::send): write a compiled [`CommandSequence`]
//! - [`await_sequence`](TelnetSession::await_sequence): wait for the literal
//!   bytes of a sequence
//! - [`await_pattern`](TelnetSession::await_pattern): wait for a regular
//!   expression (usually the shell prompt)
//!
//! Waiting is a poll loop: check the buffer, sleep one tick, do one
//! non-blocking read, repeat until a match or until the tick budget for the
//! timeout is spent. On a match the buffer prefix up to the end of the match
//! is consumed and returned as a decoded sequence; anything after it stays
//! buffered for the next operation. On timeout nothing is consumed.
//!
//! ```rust,no_run
//! use telnet_client::session::{SessionOptions, TelnetSession};
//!
//! fn main() -> telnet_client::SessionResult<()> {
//!     let mut session = TelnetSession::connect("192.168.1.1", 23, SessionOptions::default())?;
//!     session.set_prompt_pattern(r"\$\s*$")?;
//!     session.login("root", "secret", None)?;
//!     let uptime = session.send_message("uptime", None, None)?;
//!     println!("{}", uptime);
//!     Ok(())
//! }
//! ```

use std::thread;
use std::time::Duration;

use regex::bytes::Regex;
use telnet_sequence::CommandSequence;

use crate::config::ClientConfig;
use crate::connection::{Connection, ReadOutcome, TcpConnection};
use crate::errors::{SessionError, SessionResult};
use crate::handshake::{Handshake, HandshakeStep};
use crate::logger::{SessionLogger, TracingLogger};

/// Default time an await may take
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Sleep between two read attempts; also the timeout granularity
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Upper bound on bytes taken from the socket per read attempt
pub const DEFAULT_READ_CHUNK_SIZE: usize = 4096;

/// Matches a `$`, `#` or `>` prompt at the very end of the received output
pub const DEFAULT_PROMPT_PATTERN: &str = r"[$#>]\s*$";

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Tunables of the session engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Used by awaits that are not given an explicit timeout
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub read_chunk_size: usize,
    /// Literal text awaited between sending the username and the password
    pub password_prompt: String,
    /// Sent, followed by CR, when the session is torn down
    pub exit_command: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            password_prompt: "Password:".to_string(),
            exit_command: "exit".to_string(),
        }
    }
}

/// A logged-in (or about to be) Telnet client session
///
/// Operations take `&mut self`: one await at a time per session.
pub struct TelnetSession<C: Connection = TcpConnection> {
    connection: C,
    /// Received bytes not yet consumed by an await
    buffer: Vec<u8>,
    options: SessionOptions,
    prompt: Option<Regex>,
    handshake: Handshake,
    logger: Option<Box<dyn SessionLogger>>,
    closed: bool,
}

impl<C: Connection> std::fmt::Debug for TelnetSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetSession")
            .field("buffer", &self.buffer)
            .field("options", &self.options)
            .field("prompt", &self.prompt)
            .field("handshake", &self.handshake)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl TelnetSession<TcpConnection> {
    /// Open a TCP connection to `host:port`
    pub fn connect(host: &str, port: u16, options: SessionOptions) -> SessionResult<Self> {
        let connection = TcpConnection::connect(host, port, DEFAULT_CONNECT_TIMEOUT)?;
        tracing::debug!("connected to {}:{}", host, port);
        Ok(Self::with_connection(connection, options))
    }

    /// Connect using the `[connection]`, `[session]` and `[logging]` config sections
    pub fn from_config(config: &ClientConfig) -> SessionResult<Self> {
        let connection = TcpConnection::connect(
            &config.connection.host,
            config.connection.port,
            config.connection.connect_timeout,
        )?;
        tracing::debug!(
            "connected to {}:{}",
            config.connection.host,
            config.connection.port
        );

        let mut session = Self::with_connection(connection, config.session_options());
        session.set_prompt_pattern(&config.session.prompt_pattern)?;
        if config.logging.log_traffic {
            session.set_logger(TracingLogger);
        }
        Ok(session)
    }
}

impl<C: Connection> TelnetSession<C> {
    /// Build a session over an already open connection
    pub fn with_connection(connection: C, options: SessionOptions) -> Self {
        Self {
            connection,
            buffer: Vec::new(),
            options,
            prompt: Regex::new(DEFAULT_PROMPT_PATTERN).ok(),
            handshake: Handshake::default(),
            logger: None,
            closed: false,
        }
    }

    /// Replace the default prompt pattern
    pub fn set_prompt_pattern(&mut self, pattern: &str) -> SessionResult<&mut Self> {
        self.prompt = Some(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn set_prompt(&mut self, prompt: Regex) -> &mut Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn set_logger(&mut self, logger: impl SessionLogger + 'static) -> &mut Self {
        self.logger = Some(Box::new(logger));
        self
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.options.timeout = timeout;
        self
    }

    pub fn set_handshake(&mut self, handshake: Handshake) -> &mut Self {
        self.handshake = handshake;
        self
    }

    pub fn prompt(&self) -> Option<&Regex> {
        self.prompt.as_ref()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Bytes received but not consumed by any await yet
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    /// Write a sequence without waiting for any response
    pub fn send(&mut self, sequence: &CommandSequence) -> SessionResult<()> {
        self.log_info(|| format!("send: {}", sequence.dump()));
        self.connection.write_all(&sequence.compile())?;
        Ok(())
    }

    /// Wait until the compiled bytes of `target` appear in the received data
    ///
    /// Returns everything received up to and including the match, decoded.
    /// `None` uses the session timeout.
    pub fn await_sequence(
        &mut self,
        target: &CommandSequence,
        timeout: Option<Duration>,
    ) -> SessionResult<CommandSequence> {
        let needle = target.compile();
        let expected = target.dump();
        self.wait_for(&expected, timeout, |buffer| {
            find_subslice(buffer, &needle).map(|start| start + needle.len())
        })
    }

    /// Wait until `pattern` matches the received data
    ///
    /// Consumes up to the end of the leftmost match. `None` uses the session
    /// prompt pattern and the session timeout respectively.
    pub fn await_pattern(
        &mut self,
        pattern: Option<&Regex>,
        timeout: Option<Duration>,
    ) -> SessionResult<CommandSequence> {
        let regex = match pattern {
            Some(pattern) => pattern.clone(),
            None => self.prompt.clone().ok_or(SessionError::NoPromptPattern)?,
        };
        let expected = format!("/{}/", regex.as_str());
        self.wait_for(&expected, timeout, |buffer| {
            regex.find(buffer).map(|found| found.end())
        })
    }

    /// Negotiate options, enter credentials and wait for the shell prompt
    ///
    /// Runs the handshake script, sends `username`, waits for the password
    /// prompt, sends `password` and waits for `prompt` (or the session prompt).
    /// The first failing step aborts the login.
    pub fn login(
        &mut self,
        username: &str,
        password: &str,
        prompt: Option<&Regex>,
    ) -> SessionResult<CommandSequence> {
        let handshake = self.handshake.clone();
        for step in handshake.steps() {
            match step {
                HandshakeStep::Send(sequence) => self.send(sequence)?,
                HandshakeStep::Await(sequence) => {
                    self.await_sequence(sequence, None)?;
                }
            }
        }

        let mut login = CommandSequence::new();
        login.add_line(username);
        self.send(&login)?;

        let mut password_prompt = CommandSequence::new();
        password_prompt.add_text(&self.options.password_prompt);
        self.await_sequence(&password_prompt, None)?;

        let mut secret = CommandSequence::new();
        secret.add_line(password);
        self.log_info(|| "send: <password>".to_string());
        self.connection.write_all(&secret.compile())?;

        self.await_pattern(prompt, None)
    }

    /// Send one command line and return the output up to the next prompt
    pub fn send_message(
        &mut self,
        message: &str,
        prompt: Option<&Regex>,
        timeout: Option<Duration>,
    ) -> SessionResult<String> {
        let mut sequence = CommandSequence::new();
        sequence.add_line(message);
        self.send(&sequence)?;

        let response = self.await_pattern(prompt, timeout)?;
        Ok(response.text_lossy())
    }

    /// Send the exit command and close the connection
    ///
    /// Errors are ignored; the same happens on drop.
    pub fn disconnect(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let mut exit = CommandSequence::new();
        exit.add_line(&self.options.exit_command);
        if let Err(e) = self.send(&exit) {
            tracing::debug!("failed to send exit command: {}", e);
        }
        if let Err(e) = self.connection.close() {
            tracing::debug!("failed to close connection: {}", e);
        }
    }

    /// Poll until `find_end` reports the end offset of a match in the buffer
    fn wait_for<F>(
        &mut self,
        expected: &str,
        timeout: Option<Duration>,
        mut find_end: F,
    ) -> SessionResult<CommandSequence>
    where
        F: FnMut(&[u8]) -> Option<usize>,
    {
        let timeout = timeout.unwrap_or(self.options.timeout);
        let poll_interval = self.options.poll_interval;
        let max_ticks = tick_limit(timeout, poll_interval);
        let mut chunk = vec![0u8; self.options.read_chunk_size.max(1)];
        let mut ticks: u32 = 0;

        let match_end = loop {
            if let Some(end) = find_end(&self.buffer) {
                break end;
            }
            if ticks >= max_ticks {
                let elapsed = poll_interval * ticks;
                self.log_error(|| {
                    format!(
                        "expected: {} received: {}",
                        expected,
                        String::from_utf8_lossy(&self.buffer)
                    )
                });
                return Err(SessionError::Timeout {
                    expected: expected.to_string(),
                    received: self.buffer.clone(),
                    elapsed,
                });
            }

            thread::sleep(poll_interval);
            match self.connection.try_read(&mut chunk)? {
                ReadOutcome::Data(n) => {
                    tracing::debug!("read {} bytes, {} buffered", n, self.buffer.len() + n);
                    self.buffer.extend_from_slice(&chunk[..n]);
                }
                ReadOutcome::WouldBlock => {}
                ReadOutcome::Closed => {
                    self.log_error(|| {
                        format!(
                            "expected: {} received: {} (connection closed)",
                            expected,
                            String::from_utf8_lossy(&self.buffer)
                        )
                    });
                    return Err(SessionError::ConnectionClosed {
                        received: self.buffer.clone(),
                    });
                }
            }
            ticks += 1;
        };

        let raw: Vec<u8> = self.buffer.drain(..match_end).collect();
        let sequence = CommandSequence::parse(&raw)?;
        self.log_info(|| {
            format!(
                "received: {} time: {}ms",
                sequence.dump(),
                (poll_interval * ticks).as_millis()
            )
        });
        Ok(sequence)
    }

    fn log_info(&self, message: impl FnOnce() -> String) {
        if let Some(logger) = &self.logger {
            logger.info(&message());
        }
    }

    fn log_error(&self, message: impl FnOnce() -> String) {
        if let Some(logger) = &self.logger {
            logger.error(&message());
        }
    }
}

impl<C: Connection> Drop for TelnetSession<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Number of poll ticks that fit in `timeout`, rounded up
fn tick_limit(timeout: Duration, poll_interval: Duration) -> u32 {
    let tick = poll_interval.as_micros().max(1);
    let ticks = timeout.as_micros().div_ceil(tick);
    u32::try_from(ticks).unwrap_or(u32::MAX)
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
