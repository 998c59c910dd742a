use std::borrow::Cow;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{Duration, NaiveDate};

use crate::constant::{ColumnFlags, ColumnType};
use crate::error::{Error, Result};
use crate::opts::EncodingErrors;
use crate::protocol::temporal;
use crate::value::Value;

/// Per-column character encoding. `None` at the column level means binary
/// (cells stay as bytes). Character-set conversion tables are out of scope;
/// the named forms below cover what the server sends for text result sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Ascii,
    Latin1,
}

impl Encoding {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "utf8" | "utf-8" | "utf8mb3" | "utf8mb4" => Some(Self::Utf8),
            "ascii" | "us-ascii" => Some(Self::Ascii),
            "latin1" | "latin-1" | "iso-8859-1" => Some(Self::Latin1),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Ascii => "ascii",
            Self::Latin1 => "latin-1",
        }
    }
}

/// Decode cell bytes per the column encoding and error policy.
pub(crate) fn decode_text<'a>(
    bytes: &'a [u8],
    encoding: Encoding,
    errors: EncodingErrors,
) -> Result<Cow<'a, str>> {
    match encoding {
        Encoding::Utf8 => match simdutf8::basic::from_utf8(bytes) {
            Ok(text) => Ok(Cow::Borrowed(text)),
            Err(_) => match errors {
                EncodingErrors::Strict => Err(Error::Encoding { encoding: "utf-8" }),
                EncodingErrors::Replace => {
                    Ok(Cow::Owned(String::from_utf8_lossy(bytes).into_owned()))
                }
                EncodingErrors::Ignore => Ok(Cow::Owned(utf8_dropping_invalid(bytes))),
            },
        },
        Encoding::Ascii => {
            if bytes.is_ascii() {
                // ASCII is valid UTF-8
                Ok(Cow::Borrowed(std::str::from_utf8(bytes).unwrap()))
            } else {
                match errors {
                    EncodingErrors::Strict => Err(Error::Encoding { encoding: "ascii" }),
                    EncodingErrors::Replace => Ok(Cow::Owned(
                        bytes
                            .iter()
                            .map(|&b| if b < 0x80 { b as char } else { '\u{FFFD}' })
                            .collect(),
                    )),
                    EncodingErrors::Ignore => Ok(Cow::Owned(
                        bytes
                            .iter()
                            .filter(|&&b| b < 0x80)
                            .map(|&b| b as char)
                            .collect(),
                    )),
                }
            }
        }
        // Every byte maps to the code point of the same value
        Encoding::Latin1 => Ok(Cow::Owned(bytes.iter().map(|&b| b as char).collect())),
    }
}

/// UTF-8 decode skipping invalid sequences (the `ignore` policy).
fn utf8_dropping_invalid(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(err) => {
                let valid_up_to = err.valid_up_to();
                out.push_str(std::str::from_utf8(&bytes[..valid_up_to]).unwrap());
                let skip = err.error_len().unwrap_or(bytes.len() - valid_up_to);
                bytes = &bytes[valid_up_to + skip..];
            }
        }
    }
}

/// Everything the default per-cell path needs from the result-set state.
pub(crate) struct CellContext<'a> {
    pub type_code: u8,
    pub flags: ColumnFlags,
    pub encoding: Option<Encoding>,
    pub encoding_errors: EncodingErrors,
    pub parse_json: bool,
    pub invalid_value: Option<&'a Value>,
}

impl CellContext<'_> {
    /// Validation-failure result for date/time cells: the configured
    /// substitute when present, else the raw text.
    fn invalid_cell(&self, raw: &[u8]) -> Result<Value> {
        if let Some(value) = self.invalid_value {
            return Ok(value.clone());
        }
        let text = decode_text(raw, Encoding::Ascii, self.encoding_errors)?;
        Ok(Value::Str(text.into_owned()))
    }
}

fn parse_ascii<T: FromStr>(raw: &[u8], kind: &'static str) -> Result<T> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| Error::InvalidText {
            kind,
            text: String::from_utf8_lossy(raw).into_owned(),
        })
}

/// Decode one non-NULL cell through the built-in per-type fast path.
pub(crate) fn decode_cell(ctx: &CellContext<'_>, raw: &[u8]) -> Result<Value> {
    let column_type =
        ColumnType::from_u8(ctx.type_code).ok_or(Error::UnknownTypeCode(ctx.type_code))?;

    match column_type {
        ColumnType::MYSQL_TYPE_NULL => Ok(Value::Null),

        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
            let text = decode_text(
                raw,
                ctx.encoding.unwrap_or(Encoding::Ascii),
                ctx.encoding_errors,
            )?;
            let decimal = BigDecimal::from_str(&text).map_err(|_| Error::InvalidText {
                kind: "decimal",
                text: text.into_owned(),
            })?;
            Ok(Value::Decimal(decimal))
        }

        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_LONGLONG
        | ColumnType::MYSQL_TYPE_INT24 => {
            if ctx.flags.is_unsigned() {
                Ok(Value::UInt(parse_ascii::<u64>(raw, "integer")?))
            } else {
                Ok(Value::Int(parse_ascii::<i64>(raw, "integer")?))
            }
        }

        ColumnType::MYSQL_TYPE_FLOAT => Ok(Value::Float(parse_ascii::<f32>(raw, "float")?)),
        ColumnType::MYSQL_TYPE_DOUBLE => Ok(Value::Double(parse_ascii::<f64>(raw, "float")?)),

        ColumnType::MYSQL_TYPE_DATETIME | ColumnType::MYSQL_TYPE_TIMESTAMP => {
            if temporal::check_any_zero_datetime(raw) {
                return Ok(Value::Null);
            }
            if !temporal::check_any_datetime(raw) {
                return ctx.invalid_cell(raw);
            }
            let (year, month, day, hour, minute, second, micro) = temporal::parse_datetime(raw);
            match NaiveDate::from_ymd_opt(year, month, day)
                .and_then(|date| date.and_hms_micro_opt(hour, minute, second, micro))
            {
                Some(datetime) => Ok(Value::DateTime(datetime)),
                // Positionally valid but calendar-impossible (e.g. Feb 30)
                None => ctx.invalid_cell(raw),
            }
        }

        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => {
            if temporal::check_zero_date(raw) {
                return Ok(Value::Null);
            }
            if !temporal::check_date(raw) {
                return ctx.invalid_cell(raw);
            }
            let (year, month, day) = temporal::parse_date(raw);
            match NaiveDate::from_ymd_opt(year, month, day) {
                Some(date) => Ok(Value::Date(date)),
                None => ctx.invalid_cell(raw),
            }
        }

        ColumnType::MYSQL_TYPE_TIME => {
            let sign = temporal::timedelta_sign(raw);
            if sign == 0 {
                return ctx.invalid_cell(raw);
            }
            let body = if sign < 0 { &raw[1..] } else { raw };
            let (hour, minute, second, micro) = temporal::parse_timedelta(body);
            let seconds = i64::from(sign) * (i64::from(hour) * 3600 + i64::from(minute) * 60 + i64::from(second));
            let duration = Duration::seconds(seconds)
                + Duration::microseconds(i64::from(sign) * i64::from(micro));
            Ok(Value::Time(duration))
        }

        ColumnType::MYSQL_TYPE_YEAR => Ok(Value::UInt(parse_ascii::<u64>(raw, "year")?)),

        ColumnType::MYSQL_TYPE_BIT
        | ColumnType::MYSQL_TYPE_JSON
        | ColumnType::MYSQL_TYPE_TINY_BLOB
        | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
        | ColumnType::MYSQL_TYPE_LONG_BLOB
        | ColumnType::MYSQL_TYPE_BLOB
        | ColumnType::MYSQL_TYPE_GEOMETRY
        | ColumnType::MYSQL_TYPE_ENUM
        | ColumnType::MYSQL_TYPE_SET
        | ColumnType::MYSQL_TYPE_VARCHAR
        | ColumnType::MYSQL_TYPE_VAR_STRING
        | ColumnType::MYSQL_TYPE_STRING => {
            let Some(encoding) = ctx.encoding else {
                return Ok(Value::Bytes(raw.to_vec()));
            };
            let text = decode_text(raw, encoding, ctx.encoding_errors)?;

            if column_type == ColumnType::MYSQL_TYPE_JSON && ctx.parse_json {
                let parsed = serde_json::from_str(&text).map_err(|_| Error::InvalidText {
                    kind: "json",
                    text: text.clone().into_owned(),
                })?;
                return Ok(Value::Json(parsed));
            }

            Ok(Value::Str(text.into_owned()))
        }
    }
}
