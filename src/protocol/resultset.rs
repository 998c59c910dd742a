use std::sync::Arc;

use tracing::debug;

use crate::conn::Connection;
use crate::constant::ColumnFlags;
use crate::error::{Error, Result};
use crate::opts::{CellInput, Converter, EncodingErrors, ResultsType};
use crate::protocol::packet::read_packet;
use crate::protocol::primitive::read_lenenc_str;
use crate::protocol::response::{check_eof_packet, is_error_packet, ErrPayload};
use crate::protocol::text::{decode_cell, decode_text, CellContext, Encoding};
use crate::result::QueryResult;
use crate::row::{NamedTuple, Row, RowDescriptor, StructSeq};
use crate::value::Value;

/// How decoded values are assembled into rows, fixed per result set.
enum RowShape {
    Tuple,
    Dict,
    Struct(Arc<RowDescriptor>),
    Named(Arc<Vec<Arc<str>>>),
}

/// Decoder state for one result set.
///
/// Column metadata is copied out of the result at creation and is immutable
/// for the lifetime of the state; the packet counter, row list, and EOF
/// flag advance as batches are read. `next_seq_id` is mirrored back to the
/// connection at every batch boundary.
pub struct RowState {
    n_cols: usize,
    type_codes: Vec<u8>,
    flags: Vec<ColumnFlags>,
    scales: Vec<u8>,
    encodings: Vec<Option<Encoding>>,
    converters: Vec<Option<Converter>>,
    invalid_values: Vec<Option<Value>>,
    names: Vec<Arc<str>>,
    encoding_errors: EncodingErrors,
    shape: RowShape,
    parse_json: bool,
    unbuffered: bool,
    pub(crate) next_seq_id: u8,
    n_rows: u64,
    n_rows_in_batch: u64,
    rows: Vec<Row>,
    is_eof: bool,
}

impl RowState {
    fn new(result: &QueryResult, conn: &Connection) -> Self {
        let n_cols = result.fields.len();
        let options = &result.options;

        let mut names: Vec<Arc<str>> = Vec::with_capacity(n_cols);
        let mut type_codes = Vec::with_capacity(n_cols);
        let mut flags = Vec::with_capacity(n_cols);
        let mut scales = Vec::with_capacity(n_cols);
        let mut encodings = Vec::with_capacity(n_cols);
        let mut converters = Vec::with_capacity(n_cols);
        let mut invalid_values = Vec::with_capacity(n_cols);

        for (i, field) in result.fields.iter().enumerate() {
            type_codes.push(field.type_code);
            flags.push(field.flags);
            scales.push(field.scale);

            // A repeated bare name gets its table name prepended
            let name: Arc<str> = if names.iter().any(|n| &**n == field.name) {
                format!("{}.{}", field.table_name, field.name).into()
            } else {
                field.name.as_str().into()
            };
            names.push(name);

            let (encoding, converter) = match result.converters.get(i) {
                Some((encoding, converter)) => (*encoding, converter.clone()),
                None => (None, None),
            };
            encodings.push(encoding);

            // The default converter for this type counts as "no converter":
            // the built-in fast path handles those cells
            let converter = converter.filter(|conv| {
                options
                    .default_converters
                    .get(&field.type_code)
                    .map_or(true, |default| !Arc::ptr_eq(conv, default))
            });
            converters.push(converter);

            invalid_values.push(options.invalid_values.get(&field.type_code).cloned());
        }

        let shape = match options.results_type {
            ResultsType::Tuples => RowShape::Tuple,
            ResultsType::Dicts => RowShape::Dict,
            ResultsType::StructSequences => {
                RowShape::Struct(Arc::new(RowDescriptor::new(names.clone())))
            }
            ResultsType::NamedTuples => RowShape::Named(Arc::new(names.clone())),
        };

        Self {
            n_cols,
            type_codes,
            flags,
            scales,
            encodings,
            converters,
            invalid_values,
            names,
            encoding_errors: options.encoding_errors,
            shape,
            parse_json: options.parse_json,
            unbuffered: options.unbuffered,
            next_seq_id: conn.next_seq_id(),
            n_rows: 0,
            n_rows_in_batch: 0,
            rows: Vec::new(),
            is_eof: false,
        }
    }

    fn reset_batch(&mut self) {
        self.n_rows_in_batch = 0;
        self.rows.clear();
    }

    pub fn n_rows(&self) -> u64 {
        self.n_rows
    }

    pub fn n_rows_in_batch(&self) -> u64 {
        self.n_rows_in_batch
    }

    pub fn is_eof(&self) -> bool {
        self.is_eof
    }

    /// Unique column names, in column order
    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    /// Decimal scale per column
    pub fn scales(&self) -> &[u8] {
        &self.scales
    }

    /// Decode one row packet: `n_cols` length-coded strings.
    fn decode_row(&self, payload: &[u8]) -> Result<Row> {
        let mut data = payload;
        let mut values = Vec::with_capacity(self.n_cols);

        for i in 0..self.n_cols {
            let (raw, is_null, rest) = read_lenenc_str(data);
            data = rest;

            let value = if is_null {
                Value::Null
            } else if let Some(converter) = &self.converters[i] {
                let input = match self.encodings[i] {
                    Some(encoding) => {
                        CellInput::Text(decode_text(raw, encoding, self.encoding_errors)?)
                    }
                    None => CellInput::Bytes(raw),
                };
                (converter.as_ref())(input)?
            } else {
                let ctx = CellContext {
                    type_code: self.type_codes[i],
                    flags: self.flags[i],
                    encoding: self.encodings[i],
                    encoding_errors: self.encoding_errors,
                    parse_json: self.parse_json,
                    invalid_value: self.invalid_values[i].as_ref(),
                };
                decode_cell(&ctx, raw)?
            };

            values.push(value);
        }

        Ok(match &self.shape {
            RowShape::Tuple => Row::Tuple(values),
            RowShape::Dict => Row::Dict(self.names.iter().cloned().zip(values).collect()),
            RowShape::Struct(desc) => Row::Struct(StructSeq::new(desc.clone(), values)),
            RowShape::Named(fields) => Row::Named(NamedTuple::new(fields.clone(), values)),
        })
    }
}

/// Read the next batch of row-data packets for `result`.
///
/// With `size == 0` the whole result set is drained; with `size > 0` at
/// most `size` rows are read and the batch row list is reset first. Returns
/// the batch rows, also published on `result.rows`; `None` means an
/// unbuffered stream that has fully drained (or was never active).
///
/// The packet sequence counter is mirrored back to the connection before
/// returning, including on errors that leave the connection open. Any
/// failure discards the decoder state.
pub fn read_rowdata_packet<'a>(
    conn: &mut Connection,
    result: &'a mut QueryResult,
    unbuffered: bool,
    size: u64,
) -> Result<Option<&'a [Row]>> {
    if unbuffered && !result.unbuffered_active {
        return Ok(None);
    }

    let mut state = match result.state.take() {
        Some(mut state) => {
            if size > 0 {
                state.reset_batch();
            }
            state
        }
        None => RowState::new(result, conn),
    };

    let requested = if size == 0 { u64::MAX } else { size };

    let outcome = run_batch(conn, result, &mut state, requested);
    conn.set_next_seq_id(state.next_seq_id);
    // A failed batch destroys the decoder state
    let rows_read = outcome?;

    if state.unbuffered {
        if state.is_eof && rows_read == 0 {
            result.rows = None;
            result.affected_rows = Some(state.n_rows);
            return Ok(None);
        }
        result.rows = Some(std::mem::take(&mut state.rows));
        result.state = Some(state);
        return Ok(result.rows.as_deref());
    }

    result.affected_rows = Some(state.n_rows);
    result.rows = Some(std::mem::take(&mut state.rows));
    if !state.is_eof {
        result.state = Some(state);
    }
    Ok(result.rows.as_deref())
}

fn run_batch(
    conn: &mut Connection,
    result: &mut QueryResult,
    state: &mut RowState,
    requested: u64,
) -> Result<u64> {
    let mut rows_read = 0u64;

    if state.is_eof {
        return Ok(rows_read);
    }

    while rows_read < requested {
        let payload = read_packet(conn, &mut state.next_seq_id)?;

        if is_error_packet(&payload) {
            result.unbuffered_active = false;
            return Err(Error::Server(ErrPayload::parse(&payload)?));
        }

        if let Some(eof) = check_eof_packet(&payload) {
            state.is_eof = true;
            result.warning_count = u64::from(eof.warning_count);
            result.has_next = eof.has_next();
            result.unbuffered_active = false;
            debug!(
                warning_count = eof.warning_count,
                has_next = result.has_next,
                rows = state.n_rows,
                "end of result set"
            );
            break;
        }

        let row = state.decode_row(&payload)?;
        state.rows.push(row);
        state.n_rows += 1;
        state.n_rows_in_batch += 1;
        rows_read += 1;
    }

    Ok(rows_read)
}
