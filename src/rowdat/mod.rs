//! ROWDAT_1: the length-prefixed binary row-batch format exchanged with
//! external UDF servers.
//!
//! A buffer is a concatenation of rows with no header or trailer. Each row
//! is a u64 little-endian row id followed, per column, by a u8 NULL marker
//! and the column payload. NULL cells still carry their full fixed-width
//! payload (zeros) or an empty length prefix, keeping per-column strides
//! uniform. All integer widths are little-endian on every platform.

mod column;
mod row;

pub use column::{
    dump_column, load_column, Blob, ColumnArray, ColumnView, ColumnarBatch, LoadedColumn,
    ObjectTable, MASK_FORMAT_TAG,
};
pub use row::{dump_row, load_row};

use crate::constant::ColumnType;
use crate::error::{Error, Result};

/// One colspec entry: column name plus signed type code. Negative integer
/// codes mean unsigned; negative string/blob codes mean binary payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColSpec {
    pub name: String,
    pub type_code: i16,
}

impl ColSpec {
    pub fn new(name: impl Into<String>, type_code: i16) -> Self {
        Self {
            name: name.into(),
            type_code,
        }
    }
}

/// A colspec code resolved to its base type and sign/binary modifier.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedType {
    pub base: ColumnType,
    /// Unsigned for integer codes, binary payload for string codes
    pub negated: bool,
}

/// Resolve a signed colspec/returns code, refusing the reserved types.
pub(crate) fn resolve_type(code: i16) -> Result<ResolvedType> {
    if !(-255..=255).contains(&code) {
        return Err(Error::UnknownReturnType(code));
    }
    let base = ColumnType::from_u8(code.unsigned_abs() as u8)
        .ok_or(Error::UnknownReturnType(code))?;

    let unsupported = match base {
        ColumnType::MYSQL_TYPE_NULL => Some("NULL"),
        ColumnType::MYSQL_TYPE_BIT => Some("BIT"),
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => Some("DECIMAL"),
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => Some("DATE"),
        ColumnType::MYSQL_TYPE_TIME => Some("TIME"),
        ColumnType::MYSQL_TYPE_DATETIME => Some("DATETIME"),
        ColumnType::MYSQL_TYPE_TIMESTAMP => Some("TIMESTAMP"),
        _ => None,
    };
    if let Some(name) = unsupported {
        return Err(Error::UnsupportedType(name));
    }

    // FLOAT/DOUBLE/YEAR have no unsigned variant on the wire
    if code < 0
        && matches!(
            base,
            ColumnType::MYSQL_TYPE_FLOAT
                | ColumnType::MYSQL_TYPE_DOUBLE
                | ColumnType::MYSQL_TYPE_YEAR
        )
    {
        return Err(Error::UnknownReturnType(code));
    }

    Ok(ResolvedType {
        base,
        negated: code < 0,
    })
}

pub(crate) fn resolve_colspec(colspec: &[ColSpec]) -> Result<Vec<ResolvedType>> {
    if colspec.is_empty() {
        return Err(Error::LengthMismatch("colspec must contain at least one column"));
    }
    colspec
        .iter()
        .map(|spec| resolve_type(spec.type_code))
        .collect()
}

pub(crate) fn resolve_returns(returns: &[i16]) -> Result<Vec<ResolvedType>> {
    returns.iter().map(|&code| resolve_type(code)).collect()
}

/// Bounds-checked linear reader over a ROWDAT_1 buffer. Every primitive
/// verifies the bytes remain before consuming them.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.data.len() < n {
            return Err(Error::DataMisaligned);
        }
        let (head, rest) = self.data.split_at(n);
        self.data = rest;
        Ok(head)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn i8(&mut self) -> Result<i8> {
        Ok(self.u8()? as i8)
    }

    pub fn u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    pub fn i16_le(&mut self) -> Result<i16> {
        Ok(self.u16_le()? as i16)
    }

    pub fn u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn i32_le(&mut self) -> Result<i32> {
        Ok(self.u32_le()? as i32)
    }

    pub fn u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn i64_le(&mut self) -> Result<i64> {
        Ok(self.u64_le()? as i64)
    }

    pub fn f32_le(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.u32_le()?))
    }

    pub fn f64_le(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.u64_le()?))
    }

    /// Read an `i64` string-length prefix; negative lengths cannot be valid
    pub fn str_len(&mut self) -> Result<usize> {
        let len = self.i64_le()?;
        usize::try_from(len).map_err(|_| Error::DataMisaligned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_accepts_signed_variants() {
        let long = resolve_type(ColumnType::MYSQL_TYPE_LONG as i16).unwrap();
        assert_eq!(long.base, ColumnType::MYSQL_TYPE_LONG);
        assert!(!long.negated);

        let ulong = resolve_type(-(ColumnType::MYSQL_TYPE_LONG as i16)).unwrap();
        assert!(ulong.negated);

        let blob = resolve_type(-(ColumnType::MYSQL_TYPE_VARCHAR as i16)).unwrap();
        assert_eq!(blob.base, ColumnType::MYSQL_TYPE_VARCHAR);
        assert!(blob.negated);
    }

    #[test]
    fn resolve_refuses_reserved_types() {
        for (code, name) in [
            (ColumnType::MYSQL_TYPE_NULL as i16, "NULL"),
            (ColumnType::MYSQL_TYPE_BIT as i16, "BIT"),
            (ColumnType::MYSQL_TYPE_DECIMAL as i16, "DECIMAL"),
            (ColumnType::MYSQL_TYPE_NEWDECIMAL as i16, "DECIMAL"),
            (ColumnType::MYSQL_TYPE_DATE as i16, "DATE"),
            (ColumnType::MYSQL_TYPE_TIME as i16, "TIME"),
            (ColumnType::MYSQL_TYPE_DATETIME as i16, "DATETIME"),
            (ColumnType::MYSQL_TYPE_TIMESTAMP as i16, "TIMESTAMP"),
        ] {
            match resolve_type(code) {
                Err(Error::UnsupportedType(got)) => assert_eq!(got, name),
                other => panic!("expected unsupported type for {code}, got {other:?}"),
            }
        }
    }

    #[test]
    fn resolve_refuses_unknown_codes() {
        assert!(matches!(
            resolve_type(0x42),
            Err(Error::UnknownReturnType(0x42))
        ));
        assert!(matches!(
            resolve_type(300),
            Err(Error::UnknownReturnType(300))
        ));
    }

    #[test]
    fn reader_bounds() {
        let mut reader = ByteReader::new(&[1, 2, 3]);
        assert_eq!(reader.u16_le().unwrap(), 0x0201);
        assert!(matches!(reader.u16_le(), Err(Error::DataMisaligned)));
    }
}
