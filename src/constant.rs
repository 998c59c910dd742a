/// Length-encoded-string sentinel: NULL cell
pub const LCS_NULL: u8 = 0xFB;
/// Length-encoded-string sentinel: u16 length follows
pub const LCS_U16: u8 = 0xFC;
/// Length-encoded-string sentinel: u24 length follows
pub const LCS_U24: u8 = 0xFD;
/// Length-encoded-string sentinel: u64 length follows
pub const LCS_U64: u8 = 0xFE;

/// Payload length at which a packet continues into the next one
pub const MAX_PACKET_LEN: usize = 0xFFFFFF;

/// Server status flags carried in EOF packets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFlags(pub u16);

impl StatusFlags {
    pub const SERVER_MORE_RESULTS_EXISTS: u16 = 0x0008;

    pub fn new(value: u16) -> Self {
        Self(value)
    }

    pub fn has(&self, flag: u16) -> bool {
        (self.0 & flag) != 0
    }

    /// True when the server announced another result set after this one
    pub fn has_next(&self) -> bool {
        self.has(Self::SERVER_MORE_RESULTS_EXISTS)
    }
}

/// Column definition flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnFlags(pub u16);

impl ColumnFlags {
    pub const NOT_NULL_FLAG: u16 = 1;
    pub const PRI_KEY_FLAG: u16 = 2;
    pub const UNIQUE_KEY_FLAG: u16 = 4;
    pub const MULTIPLE_KEY_FLAG: u16 = 8;
    pub const BLOB_FLAG: u16 = 16;
    pub const UNSIGNED_FLAG: u16 = 32;
    pub const ZEROFILL_FLAG: u16 = 64;
    pub const BINARY_FLAG: u16 = 128;
    pub const ENUM_FLAG: u16 = 256;
    pub const AUTO_INCREMENT_FLAG: u16 = 512;
    pub const TIMESTAMP_FLAG: u16 = 1024;
    pub const SET_FLAG: u16 = 2048;
    pub const PART_KEY_FLAG: u16 = 16384;

    pub fn new(value: u16) -> Self {
        Self(value)
    }

    pub fn has(&self, flag: u16) -> bool {
        (self.0 & flag) != 0
    }

    pub fn is_unsigned(&self) -> bool {
        self.has(Self::UNSIGNED_FLAG)
    }
}

/// MySQL column types
///
/// Codes not listed here are reserved. In ROWDAT_1 colspecs the code is a
/// signed `i16`: a negated integer code means unsigned, a negated
/// string/blob code means binary payload.
#[allow(non_camel_case_types)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    MYSQL_TYPE_DECIMAL = 0x00,
    MYSQL_TYPE_TINY = 0x01,
    MYSQL_TYPE_SHORT = 0x02,
    MYSQL_TYPE_LONG = 0x03,
    MYSQL_TYPE_FLOAT = 0x04,
    MYSQL_TYPE_DOUBLE = 0x05,
    MYSQL_TYPE_NULL = 0x06,
    MYSQL_TYPE_TIMESTAMP = 0x07,
    MYSQL_TYPE_LONGLONG = 0x08,
    MYSQL_TYPE_INT24 = 0x09,
    MYSQL_TYPE_DATE = 0x0a,
    MYSQL_TYPE_TIME = 0x0b,
    MYSQL_TYPE_DATETIME = 0x0c,
    MYSQL_TYPE_YEAR = 0x0d,
    MYSQL_TYPE_NEWDATE = 0x0e,
    MYSQL_TYPE_VARCHAR = 0x0f,
    MYSQL_TYPE_BIT = 0x10,
    MYSQL_TYPE_JSON = 0xf5,
    MYSQL_TYPE_NEWDECIMAL = 0xf6,
    MYSQL_TYPE_ENUM = 0xf7,
    MYSQL_TYPE_SET = 0xf8,
    MYSQL_TYPE_TINY_BLOB = 0xf9,
    MYSQL_TYPE_MEDIUM_BLOB = 0xfa,
    MYSQL_TYPE_LONG_BLOB = 0xfb,
    MYSQL_TYPE_BLOB = 0xfc,
    MYSQL_TYPE_VAR_STRING = 0xfd,
    MYSQL_TYPE_STRING = 0xfe,
    MYSQL_TYPE_GEOMETRY = 0xff,
}

impl ColumnType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::MYSQL_TYPE_DECIMAL),
            0x01 => Some(Self::MYSQL_TYPE_TINY),
            0x02 => Some(Self::MYSQL_TYPE_SHORT),
            0x03 => Some(Self::MYSQL_TYPE_LONG),
            0x04 => Some(Self::MYSQL_TYPE_FLOAT),
            0x05 => Some(Self::MYSQL_TYPE_DOUBLE),
            0x06 => Some(Self::MYSQL_TYPE_NULL),
            0x07 => Some(Self::MYSQL_TYPE_TIMESTAMP),
            0x08 => Some(Self::MYSQL_TYPE_LONGLONG),
            0x09 => Some(Self::MYSQL_TYPE_INT24),
            0x0a => Some(Self::MYSQL_TYPE_DATE),
            0x0b => Some(Self::MYSQL_TYPE_TIME),
            0x0c => Some(Self::MYSQL_TYPE_DATETIME),
            0x0d => Some(Self::MYSQL_TYPE_YEAR),
            0x0e => Some(Self::MYSQL_TYPE_NEWDATE),
            0x0f => Some(Self::MYSQL_TYPE_VARCHAR),
            0x10 => Some(Self::MYSQL_TYPE_BIT),
            0xf5 => Some(Self::MYSQL_TYPE_JSON),
            0xf6 => Some(Self::MYSQL_TYPE_NEWDECIMAL),
            0xf7 => Some(Self::MYSQL_TYPE_ENUM),
            0xf8 => Some(Self::MYSQL_TYPE_SET),
            0xf9 => Some(Self::MYSQL_TYPE_TINY_BLOB),
            0xfa => Some(Self::MYSQL_TYPE_MEDIUM_BLOB),
            0xfb => Some(Self::MYSQL_TYPE_LONG_BLOB),
            0xfc => Some(Self::MYSQL_TYPE_BLOB),
            0xfd => Some(Self::MYSQL_TYPE_VAR_STRING),
            0xfe => Some(Self::MYSQL_TYPE_STRING),
            0xff => Some(Self::MYSQL_TYPE_GEOMETRY),
            _ => None,
        }
    }

    /// True for the string/blob family (length-prefixed payload in ROWDAT_1)
    pub fn is_string(&self) -> bool {
        matches!(
            self,
            Self::MYSQL_TYPE_VARCHAR
                | Self::MYSQL_TYPE_JSON
                | Self::MYSQL_TYPE_SET
                | Self::MYSQL_TYPE_ENUM
                | Self::MYSQL_TYPE_VAR_STRING
                | Self::MYSQL_TYPE_STRING
                | Self::MYSQL_TYPE_GEOMETRY
                | Self::MYSQL_TYPE_TINY_BLOB
                | Self::MYSQL_TYPE_MEDIUM_BLOB
                | Self::MYSQL_TYPE_LONG_BLOB
                | Self::MYSQL_TYPE_BLOB
        )
    }
}
