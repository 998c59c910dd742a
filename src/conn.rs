use std::io::{self, Read};
use std::net::{Shutdown, TcpStream};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::time::Duration;

use tracing::warn;

/// Blocking byte source feeding the packet transport.
///
/// Implemented for `TcpStream` / `UnixStream`; embedders and tests can
/// supply in-memory sources. Reads may block; the transport re-applies the
/// configured read timeout before every read.
pub trait ByteSource: Send {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Apply a read timeout to subsequent reads. Sources without timeout
    /// support may ignore this.
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()>;

    /// Tear the transport down. Called when the connection is force-closed;
    /// best effort, errors are swallowed.
    fn shutdown(&mut self);
}

impl ByteSource for TcpStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn shutdown(&mut self) {
        let _ = TcpStream::shutdown(self, Shutdown::Both);
    }
}

#[cfg(unix)]
impl ByteSource for UnixStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        UnixStream::set_read_timeout(self, timeout)
    }

    fn shutdown(&mut self) {
        let _ = UnixStream::shutdown(self, Shutdown::Both);
    }
}

/// Connection-side state borrowed by the decoder: the byte source, the read
/// timeout, and the packet sequence counter.
///
/// The decoder owns the source exclusively while a batch is running and
/// mirrors `next_seq_id` back here between batches. On a fatal transport
/// error the source is shut down and dropped; a closed connection fails all
/// further reads.
pub struct Connection {
    source: Option<Box<dyn ByteSource>>,
    read_timeout: Option<Duration>,
    next_seq_id: u8,
}

impl Connection {
    pub fn new(source: Box<dyn ByteSource>) -> Self {
        Self {
            source: Some(source),
            read_timeout: None,
            next_seq_id: 0,
        }
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.read_timeout = timeout;
    }

    /// Next expected packet sequence number
    pub fn next_seq_id(&self) -> u8 {
        self.next_seq_id
    }

    pub fn set_next_seq_id(&mut self, seq_id: u8) {
        self.next_seq_id = seq_id;
    }

    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    pub(crate) fn source_mut(&mut self) -> Option<&mut (dyn ByteSource + '_)> {
        match self.source.as_mut() {
            Some(source) => Some(&mut **source),
            None => None,
        }
    }

    /// Shut the byte source down and drop it. Used on fatal transport and
    /// protocol errors; callers can also use it to cancel a running read
    /// from another handle to the underlying socket.
    pub fn force_close(&mut self) {
        if let Some(mut source) = self.source.take() {
            warn!("force-closing connection");
            source.shutdown();
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("closed", &self.is_closed())
            .field("read_timeout", &self.read_timeout)
            .field("next_seq_id", &self.next_seq_id)
            .finish()
    }
}
