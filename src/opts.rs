use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::value::Value;

/// Row shape produced by the decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultsType {
    #[default]
    Tuples,
    Dicts,
    NamedTuples,
    StructSequences,
}

impl ResultsType {
    /// Parse the option value. Unrecognised strings mean tuples.
    pub fn parse(value: &str) -> Self {
        match value {
            "dict" | "dicts" => Self::Dicts,
            "namedtuple" | "namedtuples" => Self::NamedTuples,
            "structsequence" | "structsequences" => Self::StructSequences,
            _ => Self::Tuples,
        }
    }
}

/// Policy applied when character decoding hits an invalid byte sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EncodingErrors {
    #[default]
    Strict,
    Replace,
    Ignore,
}

impl EncodingErrors {
    /// Parse the option value. Unrecognised policies fall back to strict.
    pub fn parse(value: &str) -> Self {
        match value {
            "replace" => Self::Replace,
            "ignore" => Self::Ignore,
            _ => Self::Strict,
        }
    }
}

/// What a user converter receives: the cell decoded per the column
/// encoding, or the raw bytes when the column is binary.
#[derive(Debug, Clone, PartialEq)]
pub enum CellInput<'a> {
    Text(Cow<'a, str>),
    Bytes(&'a [u8]),
}

/// Caller-supplied per-column decode function.
///
/// When installed, it replaces the built-in fast path for that column and is
/// invoked on every non-NULL cell.
pub type Converter = Arc<dyn Fn(CellInput<'_>) -> Result<Value> + Send + Sync>;

/// Result-set decoding options.
#[derive(Default, Clone)]
pub struct DecodeOptions {
    pub results_type: ResultsType,
    /// Parse MYSQL_TYPE_JSON cell text into JSON values
    pub parse_json: bool,
    /// Substitute returned when a date/time cell fails strict validation,
    /// keyed by type code
    pub invalid_values: HashMap<u8, Value>,
    /// Built-in converters keyed by type code. A per-column converter that
    /// is the same `Arc` as the default for its type counts as "no
    /// converter" and the fast path runs.
    pub default_converters: HashMap<u8, Converter>,
    /// Read only as many rows as each call requests, leaving the stream open
    pub unbuffered: bool,
    pub encoding_errors: EncodingErrors,
}

impl fmt::Debug for DecodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeOptions")
            .field("results_type", &self.results_type)
            .field("parse_json", &self.parse_json)
            .field("invalid_values", &self.invalid_values)
            .field(
                "default_converters",
                &format_args!("{} entries", self.default_converters.len()),
            )
            .field("unbuffered", &self.unbuffered)
            .field("encoding_errors", &self.encoding_errors)
            .finish()
    }
}
