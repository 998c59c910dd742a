use bigdecimal::BigDecimal;
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// One decoded cell.
///
/// Text-protocol rows and ROWDAT_1 row batches both materialise into these.
/// TIME columns decode into a signed duration, not a clock time.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// Signed integer (TINYINT, SMALLINT, INT, BIGINT, MEDIUMINT)
    Int(i64),
    /// Unsigned integer column, or YEAR
    UInt(u64),
    /// FLOAT - 4-byte floating point
    Float(f32),
    /// DOUBLE - 8-byte floating point
    Double(f64),
    /// DECIMAL / NEWDECIMAL, arbitrary precision
    Decimal(BigDecimal),
    /// DATE / NEWDATE
    Date(NaiveDate),
    /// DATETIME / TIMESTAMP
    DateTime(NaiveDateTime),
    /// TIME, as an elapsed duration with optional negative sign
    Time(Duration),
    /// Character data decoded per the column encoding
    Str(String),
    /// Binary-collation character data, BLOBs, GEOMETRY payloads
    Bytes(Vec<u8>),
    /// A parsed JSON document (only when `parse_json` is enabled)
    Json(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "integer",
            Value::UInt(_) => "unsigned integer",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Decimal(_) => "decimal",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Time(_) => "time",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Json(_) => "json",
        }
    }

    /// Integer view used when encoding into signed ROWDAT_1 cells
    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Value::Int(v) => Ok(*v),
            Value::UInt(v) => Ok(*v as i64),
            _ => Err(Error::TypeMismatch {
                expected: "integer",
                found: self.type_name(),
            }),
        }
    }

    /// Integer view used when encoding into unsigned ROWDAT_1 cells
    pub fn as_u64(&self) -> Result<u64> {
        match self {
            Value::Int(v) => Ok(*v as u64),
            Value::UInt(v) => Ok(*v),
            _ => Err(Error::TypeMismatch {
                expected: "unsigned integer",
                found: self.type_name(),
            }),
        }
    }

    /// Floating-point view used when encoding FLOAT/DOUBLE cells
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Value::Float(v) => Ok(*v as f64),
            Value::Double(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            Value::UInt(v) => Ok(*v as f64),
            _ => Err(Error::TypeMismatch {
                expected: "float",
                found: self.type_name(),
            }),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::Str(s) => Ok(s),
            _ => Err(Error::TypeMismatch {
                expected: "string",
                found: self.type_name(),
            }),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            Value::Bytes(b) => Ok(b),
            _ => Err(Error::TypeMismatch {
                expected: "bytes",
                found: self.type_name(),
            }),
        }
    }
}

impl From<Option<Value>> for Value {
    fn from(value: Option<Value>) -> Self {
        value.unwrap_or(Value::Null)
    }
}
