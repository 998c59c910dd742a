use crate::constant::ColumnType;
use crate::error::{Error, Result};
use crate::rowdat::{resolve_colspec, resolve_returns, ByteReader, ColSpec, ResolvedType};
use crate::value::Value;

/// Decode a ROWDAT_1 buffer into per-row value tuples plus row ids.
///
/// Every read is bounds-checked against the buffer; a shape mismatch
/// reports the misalignment rather than panicking. Positive string codes
/// decode as UTF-8 text, negative codes as raw bytes.
pub fn load_row(colspec: &[ColSpec], data: &[u8]) -> Result<(Vec<u64>, Vec<Vec<Value>>)> {
    let types = resolve_colspec(colspec)?;

    let mut reader = ByteReader::new(data);
    let mut row_ids = Vec::new();
    let mut rows = Vec::new();

    while !reader.is_empty() {
        row_ids.push(reader.u64_le()?);

        let mut row = Vec::with_capacity(types.len());
        for ty in &types {
            let is_null = reader.u8()? == 0x01;
            row.push(load_cell(&mut reader, ty, is_null)?);
        }
        rows.push(row);
    }

    Ok((row_ids, rows))
}

/// Read one cell payload. NULL cells still consume the payload bytes so
/// the cursor stays aligned with the fixed per-column layout.
fn load_cell(reader: &mut ByteReader<'_>, ty: &ResolvedType, is_null: bool) -> Result<Value> {
    let value = match ty.base {
        ColumnType::MYSQL_TYPE_TINY => {
            if ty.negated {
                let v = reader.u8()?;
                Value::UInt(v.into())
            } else {
                let v = reader.i8()?;
                Value::Int(v.into())
            }
        }
        ColumnType::MYSQL_TYPE_SHORT => {
            if ty.negated {
                let v = reader.u16_le()?;
                Value::UInt(v.into())
            } else {
                let v = reader.i16_le()?;
                Value::Int(v.into())
            }
        }
        ColumnType::MYSQL_TYPE_LONG | ColumnType::MYSQL_TYPE_INT24 => {
            if ty.negated {
                let v = reader.u32_le()?;
                Value::UInt(v.into())
            } else {
                let v = reader.i32_le()?;
                Value::Int(v.into())
            }
        }
        ColumnType::MYSQL_TYPE_LONGLONG => {
            if ty.negated {
                Value::UInt(reader.u64_le()?)
            } else {
                Value::Int(reader.i64_le()?)
            }
        }
        ColumnType::MYSQL_TYPE_FLOAT => Value::Float(reader.f32_le()?),
        ColumnType::MYSQL_TYPE_DOUBLE => Value::Double(reader.f64_le()?),
        ColumnType::MYSQL_TYPE_YEAR => Value::UInt(reader.u16_le()?.into()),
        _ => {
            // Remaining supported codes are the string/blob family
            let len = reader.str_len()?;
            let bytes = reader.take(len)?;
            if is_null {
                Value::Null
            } else if ty.negated {
                Value::Bytes(bytes.to_vec())
            } else {
                let text = simdutf8::basic::from_utf8(bytes)
                    .map_err(|_| Error::Encoding { encoding: "utf-8" })?;
                Value::Str(text.to_owned())
            }
        }
    };

    if is_null {
        Ok(Value::Null)
    } else {
        Ok(value)
    }
}

/// Encode row tuples plus row ids into a ROWDAT_1 buffer.
///
/// NULL cells are written with `is_null = 1` and a zeroed fixed-width
/// payload, or a zero length prefix for string columns.
pub fn dump_row(returns: &[i16], row_ids: &[u64], rows: &[Vec<Value>]) -> Result<Vec<u8>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    if returns.is_empty() {
        return Err(Error::LengthMismatch(
            "returns must contain at least one column",
        ));
    }
    if row_ids.len() != rows.len() {
        return Err(Error::LengthMismatch(
            "mismatched lengths of row ids and data rows",
        ));
    }

    let types = resolve_returns(returns)?;

    let mut out = Vec::with_capacity(256 * rows.len());
    for (row_id, row) in row_ids.iter().zip(rows) {
        if row.len() != types.len() {
            return Err(Error::LengthMismatch(
                "row length does not match number of return columns",
            ));
        }

        out.extend_from_slice(&row_id.to_le_bytes());
        for (ty, value) in types.iter().zip(row) {
            out.push(u8::from(value.is_null()));
            dump_cell(&mut out, ty, value)?;
        }
    }

    Ok(out)
}

fn dump_cell(out: &mut Vec<u8>, ty: &ResolvedType, value: &Value) -> Result<()> {
    let is_null = value.is_null();

    match ty.base {
        ColumnType::MYSQL_TYPE_TINY => {
            if ty.negated {
                let v = if is_null { 0 } else { value.as_u64()? as u8 };
                out.push(v);
            } else {
                let v = if is_null { 0 } else { value.as_i64()? as i8 };
                out.push(v as u8);
            }
        }
        ColumnType::MYSQL_TYPE_SHORT => {
            if ty.negated {
                let v = if is_null { 0 } else { value.as_u64()? as u16 };
                out.extend_from_slice(&v.to_le_bytes());
            } else {
                let v = if is_null { 0 } else { value.as_i64()? as i16 };
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        ColumnType::MYSQL_TYPE_LONG | ColumnType::MYSQL_TYPE_INT24 => {
            if ty.negated {
                let v = if is_null { 0 } else { value.as_u64()? as u32 };
                out.extend_from_slice(&v.to_le_bytes());
            } else {
                let v = if is_null { 0 } else { value.as_i64()? as i32 };
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        ColumnType::MYSQL_TYPE_LONGLONG => {
            if ty.negated {
                let v = if is_null { 0 } else { value.as_u64()? };
                out.extend_from_slice(&v.to_le_bytes());
            } else {
                let v = if is_null { 0 } else { value.as_i64()? };
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        ColumnType::MYSQL_TYPE_FLOAT => {
            let v = if is_null { 0.0 } else { value.as_f64()? as f32 };
            out.extend_from_slice(&v.to_le_bytes());
        }
        ColumnType::MYSQL_TYPE_DOUBLE => {
            let v = if is_null { 0.0 } else { value.as_f64()? };
            out.extend_from_slice(&v.to_le_bytes());
        }
        ColumnType::MYSQL_TYPE_YEAR => {
            let v = if is_null { 0 } else { value.as_i64()? as i16 };
            out.extend_from_slice(&v.to_le_bytes());
        }
        _ => {
            if is_null {
                out.extend_from_slice(&0i64.to_le_bytes());
            } else if ty.negated {
                let bytes = value.as_bytes()?;
                out.extend_from_slice(&(bytes.len() as i64).to_le_bytes());
                out.extend_from_slice(bytes);
            } else {
                let text = value.as_str()?;
                out.extend_from_slice(&(text.len() as i64).to_le_bytes());
                out.extend_from_slice(text.as_bytes());
            }
        }
    }

    Ok(())
}
