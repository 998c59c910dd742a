use std::io::{self, ErrorKind};
use std::time::Duration;

use tracing::trace;
use zerocopy::{FromBytes, Immutable, KnownLayout};

use crate::conn::{ByteSource, Connection};
use crate::constant::MAX_PACKET_LEN;
use crate::error::{Error, Result};

/// MySQL packet header (zero-copy)
///
/// Layout matches MySQL wire protocol:
/// - length: 3 bytes (little-endian, payload length)
/// - sequence_id: 1 byte
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
pub struct PacketHeader {
    pub length: [u8; 3],
    pub sequence_id: u8,
}

impl PacketHeader {
    /// Get payload length as usize
    pub fn length(&self) -> usize {
        u32::from_le_bytes([self.length[0], self.length[1], self.length[2], 0]) as usize
    }

    /// Read packet header from byte slice (zero-copy)
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        if data.len() < 4 {
            return Err(Error::InvalidPacket);
        }
        Self::ref_from_bytes(&data[..4]).map_err(|_| Error::InvalidPacket)
    }
}

/// Read exactly `buf.len()` bytes from the connection's byte source.
///
/// The configured read timeout is re-applied before the read. Reads
/// interrupted by EINTR are retried transparently; a zero-length read, a
/// timeout, or any other I/O failure force-closes the connection and
/// surfaces as the operational lost-connection error.
pub fn read_bytes(conn: &mut Connection, buf: &mut [u8]) -> Result<()> {
    let timeout = conn.read_timeout();

    let outcome = match conn.source_mut() {
        None => Err(io::Error::new(ErrorKind::NotConnected, "connection closed")),
        Some(source) => fill_exact(source, timeout, buf),
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(err) => {
            conn.force_close();
            if err.kind() == ErrorKind::InvalidInput {
                // set_read_timeout rejected the timeout value; not a
                // transport failure, propagate verbatim
                Err(Error::Io(err))
            } else {
                Err(Error::LostConnection)
            }
        }
    }
}

fn fill_exact(
    source: &mut dyn ByteSource,
    timeout: Option<Duration>,
    buf: &mut [u8],
) -> io::Result<()> {
    if timeout.is_some() {
        source.set_read_timeout(timeout)?;
    }

    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "byte source exhausted mid-packet",
                ))
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Read one logical packet payload, reassembling 0xFFFFFF continuations.
///
/// Every physical packet's sequence number must equal `*next_seq_id`, which
/// advances mod 256 per packet. A sequence number of 0 where a later one was
/// expected means the server hung up and reset; any other mismatch is a
/// protocol violation. Both force-close the connection.
pub fn read_packet(conn: &mut Connection, next_seq_id: &mut u8) -> Result<Vec<u8>> {
    let mut payload = Vec::new();

    loop {
        let mut header = [0u8; 4];
        read_bytes(conn, &mut header)?;

        let header = PacketHeader::from_bytes(&header)?;
        let length = header.length();
        let sequence_id = header.sequence_id;

        if sequence_id != *next_seq_id {
            conn.force_close();
            if sequence_id == 0 {
                return Err(Error::LostConnection);
            }
            return Err(Error::PacketSequence);
        }
        *next_seq_id = next_seq_id.wrapping_add(1);

        trace!(length, sequence_id, "packet");

        let start = payload.len();
        payload.resize(start + length, 0);
        read_bytes(conn, &mut payload[start..])?;

        if length < MAX_PACKET_LEN {
            break;
        }
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_length_is_24_bit_le() {
        let header = PacketHeader::from_bytes(&[0x05, 0x00, 0x00, 0x03]).unwrap();
        assert_eq!(header.length(), 5);
        assert_eq!(header.sequence_id, 3);

        let header = PacketHeader::from_bytes(&[0xFF, 0xFF, 0xFF, 0x00]).unwrap();
        assert_eq!(header.length(), MAX_PACKET_LEN);
    }

    #[test]
    fn short_header_is_rejected() {
        assert!(PacketHeader::from_bytes(&[0x05, 0x00]).is_err());
    }
}
