//! Byte transport used by a [`TelnetSession`](crate::session::TelnetSession).
//!
//! The session never flips a shared blocking flag: every poll asks for one
//! explicit non-blocking read through [`Connection::try_read`].

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Result of a single non-blocking read attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n` bytes were copied into the buffer
    Data(usize),
    /// Nothing available right now
    WouldBlock,
    /// The remote closed the connection
    Closed,
}

/// Socket capability needed by the session engine
pub trait Connection {
    /// Write every byte, blocking until done
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Read whatever is available without blocking
    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome>;

    /// Close the connection; further calls may fail
    fn close(&mut self) -> io::Result<()>;
}

/// [`Connection`] over a blocking `TcpStream`
#[derive(Debug)]
pub struct TcpConnection {
    inner: TcpStream,
}

impl TcpConnection {
    /// Connect to `host:port`, trying each resolved address in turn
    pub fn connect(host: &str, port: u16, timeout: Duration) -> io::Result<Self> {
        let mut last_error = None;

        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => return Self::from_stream(stream),
                Err(e) => {
                    tracing::debug!("connect to {} failed: {}", addr, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no address found for {}:{}", host, port),
            )
        }))
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream) -> io::Result<Self> {
        stream.set_nodelay(true)?;
        stream.set_nonblocking(false)?;
        Ok(Self { inner: stream })
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.inner.peer_addr()
    }

    pub fn get_ref(&self) -> &TcpStream {
        &self.inner
    }
}

impl Connection for TcpConnection {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)?;
        self.inner.flush()
    }

    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        // Non-blocking only for the duration of this one read
        self.inner.set_nonblocking(true)?;
        let result = loop {
            match self.inner.read(buf) {
                Ok(0) => break Ok(ReadOutcome::Closed),
                Ok(n) => break Ok(ReadOutcome::Data(n)),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break Ok(ReadOutcome::WouldBlock),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => break Err(e),
            }
        };
        let restored = self.inner.set_nonblocking(false);
        finish_read(result, restored)
    }

    fn close(&mut self) -> io::Result<()> {
        match self.inner.shutdown(Shutdown::Both) {
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

/// Combine a read with the attempt to switch the socket back to blocking
///
/// Bytes already copied into the caller's buffer are always reported. A failed
/// restore is logged and left for the next operation on the socket to surface.
fn finish_read(
    result: io::Result<ReadOutcome>,
    restored: io::Result<()>,
) -> io::Result<ReadOutcome> {
    match (result, restored) {
        (Ok(ReadOutcome::WouldBlock), Err(e)) => Err(e),
        (Ok(outcome), Err(e)) => {
            tracing::warn!("failed to restore blocking mode after a read: {}", e);
            Ok(outcome)
        }
        (result, _) => result,
    }
}
