use thiserror::Error;

use crate::protocol::response::ErrPayload;

pub type Result<T> = core::result::Result<T, Error>;

/// Coarse error family, mirroring the DB-API classes the client surface
/// raises for each failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection-level failures; the connection has been force-closed
    Operational,
    /// Protocol violations that are a client/server bug
    Internal,
    /// An error packet sent by the server
    Server,
    /// Bad cell data, bad codec input, or an unsupported type
    Data,
}

#[derive(Debug, Error)]
pub enum Error {
    // ─── Server-reported ─────────────────────────────────────────────────
    #[error("Server Error: {0}")]
    Server(#[from] ErrPayload),
    // ─── Transport / protocol ────────────────────────────────────────────
    #[error("Lost connection to SingleStoreDB server during query")]
    LostConnection,
    #[error("Packet sequence number wrong")]
    PacketSequence,
    #[error("malformed packet payload")]
    InvalidPacket,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    // ─── Cell and codec data ─────────────────────────────────────────────
    #[error("unknown type code: {0}")]
    UnknownTypeCode(u8),
    #[error("unrecognized database data type: {0}")]
    UnknownReturnType(i16),
    #[error("unsupported data type: {0}")]
    UnsupportedType(&'static str),
    #[error("data length does not align with specified column values")]
    DataMisaligned,
    #[error("value is outside the valid range for {0}")]
    OutOfRange(&'static str),
    #[error("{0}")]
    LengthMismatch(&'static str),
    #[error("unsupported column data type for {0}")]
    UnsupportedSource(&'static str),
    #[error("expected {expected} value, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid {kind} value: {text:?}")]
    InvalidText { kind: &'static str, text: String },
    #[error("cannot decode {encoding} text: invalid byte sequence")]
    Encoding { encoding: &'static str },
    #[error("column converter failed: {0}")]
    Converter(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Server(_) => ErrorKind::Server,
            Error::LostConnection | Error::Io(_) => ErrorKind::Operational,
            Error::PacketSequence | Error::InvalidPacket => ErrorKind::Internal,
            _ => ErrorKind::Data,
        }
    }

    /// Returns true if the error indicates the connection is broken and
    /// cannot be reused.
    ///
    /// This is conservative - returns true (broken) when in doubt.
    pub fn is_conn_broken(&self) -> bool {
        match self.kind() {
            ErrorKind::Operational | ErrorKind::Internal => true,
            ErrorKind::Server | ErrorKind::Data => false,
        }
    }
}
