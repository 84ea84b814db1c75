#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use telnet_client::{Connection, LogLevel, ReadOutcome};

/// What a scripted remote saw, shared with the test after the session is gone
#[derive(Debug, Default)]
pub struct RemoteLog {
    pub writes: Vec<Vec<u8>>,
    pub closed: bool,
}

/// In-memory remote: replies are released when the client writes the
/// bytes they are keyed on
pub struct ScriptedConnection {
    available: VecDeque<u8>,
    replies: VecDeque<(Vec<u8>, Vec<u8>)>,
    max_read: usize,
    eof_when_drained: bool,
    log: Arc<Mutex<RemoteLog>>,
}

impl ScriptedConnection {
    pub fn new() -> (Self, Arc<Mutex<RemoteLog>>) {
        let log = Arc::new(Mutex::new(RemoteLog::default()));
        let connection = Self {
            available: VecDeque::new(),
            replies: VecDeque::new(),
            max_read: usize::MAX,
            eof_when_drained: false,
            log: Arc::clone(&log),
        };
        (connection, log)
    }

    /// Bytes readable right away
    pub fn greeting(mut self, bytes: &[u8]) -> Self {
        self.available.extend(bytes);
        self
    }

    /// Once the client writes exactly `trigger`, make `reply` readable
    pub fn reply_to(mut self, trigger: &[u8], reply: &[u8]) -> Self {
        self.replies.push_back((trigger.to_vec(), reply.to_vec()));
        self
    }

    /// Deliver at most `n` bytes per read
    pub fn fragmented(mut self, n: usize) -> Self {
        self.max_read = n;
        self
    }

    /// Report the connection as closed once everything was read
    pub fn hang_up(mut self) -> Self {
        self.eof_when_drained = true;
        self
    }
}

impl Connection for ScriptedConnection {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut log = self.log.lock().unwrap();
        if log.closed {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        }
        log.writes.push(bytes.to_vec());

        if let Some((trigger, _)) = self.replies.front() {
            if trigger.as_slice() == bytes {
                if let Some((_, reply)) = self.replies.pop_front() {
                    self.available.extend(reply);
                }
            }
        }
        Ok(())
    }

    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        if self.available.is_empty() {
            return Ok(if self.eof_when_drained {
                ReadOutcome::Closed
            } else {
                ReadOutcome::WouldBlock
            });
        }

        let n = buf.len().min(self.max_read).min(self.available.len());
        for (slot, byte) in buf.iter_mut().zip(self.available.drain(..n)) {
            *slot = byte;
        }
        Ok(ReadOutcome::Data(n))
    }

    fn close(&mut self) -> io::Result<()> {
        self.log.lock().unwrap().closed = true;
        Ok(())
    }
}

pub type LogLines = Arc<Mutex<Vec<(LogLevel, String)>>>;

/// Closure logger collecting every line
pub fn recording_logger() -> (impl Fn(LogLevel, &str) + Send + 'static, LogLines) {
    let lines: LogLines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    let logger = move |level: LogLevel, message: &str| {
        sink.lock().unwrap().push((level, message.to_string()));
    };
    (logger, lines)
}
