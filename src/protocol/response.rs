use zerocopy::byteorder::little_endian::U16 as U16LE;
use zerocopy::{FromBytes, Immutable, KnownLayout};

use crate::constant::StatusFlags;
use crate::error::{Error, Result};
use crate::protocol::primitive::*;

/// An error packet (first payload byte 0xFF) parsed into its typed form.
///
/// This is the value the connection's error mapper produces from the raw
/// payload; it rides inside [`crate::Error::Server`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("ERROR {} ({}): {}", self.error_code, self.sql_state, self.message)]
pub struct ErrPayload {
    pub error_code: u16,
    pub sql_state: String,
    pub message: String,
}

impl ErrPayload {
    /// Parse an error payload. The SQLSTATE marker is optional on the wire.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let (header, data) = read_int_1(payload)?;
        if header != 0xFF {
            return Err(Error::InvalidPacket);
        }

        let (error_code, data) = read_int_2(data)?;

        let (sql_state, message) = if data.first() == Some(&b'#') {
            let (state, rest) = read_string_fix(&data[1..], 5)?;
            (String::from_utf8_lossy(state).into_owned(), rest)
        } else {
            (String::from("HY000"), data)
        };

        Ok(ErrPayload {
            error_code,
            sql_state,
            message: String::from_utf8_lossy(message).into_owned(),
        })
    }
}

/// Returns true when the payload is an error packet.
pub fn is_error_packet(payload: &[u8]) -> bool {
    payload.first() == Some(&0xFF)
}

/// Fixed tail of an EOF payload (after the 0xFE marker)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
struct EofTail {
    warnings: U16LE,
    status_flags: U16LE,
}

/// End-of-result bookkeeping carried by an EOF packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EofPayload {
    pub warning_count: u16,
    pub status: StatusFlags,
}

impl EofPayload {
    pub fn has_next(&self) -> bool {
        self.status.has_next()
    }
}

/// Parse the payload as an EOF packet, if it is one.
///
/// A payload is an EOF packet iff its first byte is 0xFE and its total
/// length is strictly less than 9. Short legacy EOF packets without the
/// counter tail report zero warnings and an empty status.
pub fn check_eof_packet(payload: &[u8]) -> Option<EofPayload> {
    if payload.first() != Some(&0xFE) || payload.len() >= 9 {
        return None;
    }

    let tail = payload
        .get(1..5)
        .and_then(|bytes| EofTail::ref_from_bytes(bytes).ok());

    Some(match tail {
        Some(tail) => EofPayload {
            warning_count: tail.warnings.get(),
            status: StatusFlags::new(tail.status_flags.get()),
        },
        None => EofPayload {
            warning_count: 0,
            status: StatusFlags::new(0),
        },
    })
}
