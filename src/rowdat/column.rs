use crate::constant::ColumnType;
use crate::error::{Error, Result};
use crate::rowdat::{resolve_colspec, resolve_returns, ByteReader, ColSpec, ResolvedType};

/// Format tag reported for every NULL-mask buffer
pub const MASK_FORMAT_TAG: char = '?';

/// A string or blob cell owned by the batch's object table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blob {
    Text(String),
    Binary(Vec<u8>),
}

/// Side table keeping string/blob cells alive for the lifetime of the
/// column arrays. Cells are referenced by opaque `u64` handles; handle 0 is
/// reserved for NULL.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ObjectTable {
    entries: Vec<Blob>,
}

impl ObjectTable {
    pub fn insert(&mut self, blob: Blob) -> u64 {
        self.entries.push(blob);
        self.entries.len() as u64
    }

    pub fn get(&self, handle: u64) -> Option<&Blob> {
        if handle == 0 {
            return None;
        }
        self.entries.get(handle as usize - 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One decoded column: `n_rows` elements of a fixed-width representation.
/// String/blob columns store object-table handles.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnArray {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Handle(Vec<u64>),
}

impl ColumnArray {
    /// Single-character format tag describing the element type, for the
    /// wrapper layer that turns these buffers into typed arrays.
    pub fn format_tag(&self) -> char {
        match self {
            ColumnArray::Int8(_) => 'b',
            ColumnArray::UInt8(_) => 'B',
            ColumnArray::Int16(_) => 'h',
            ColumnArray::UInt16(_) => 'H',
            ColumnArray::Int32(_) => 'i',
            ColumnArray::UInt32(_) => 'I',
            ColumnArray::Int64(_) => 'q',
            ColumnArray::UInt64(_) | ColumnArray::Handle(_) => 'Q',
            ColumnArray::Float32(_) => 'f',
            ColumnArray::Float64(_) => 'd',
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnArray::Int8(v) => v.len(),
            ColumnArray::UInt8(v) => v.len(),
            ColumnArray::Int16(v) => v.len(),
            ColumnArray::UInt16(v) => v.len(),
            ColumnArray::Int32(v) => v.len(),
            ColumnArray::UInt32(v) => v.len(),
            ColumnArray::Int64(v) => v.len(),
            ColumnArray::UInt64(v) => v.len(),
            ColumnArray::Float32(v) => v.len(),
            ColumnArray::Float64(v) => v.len(),
            ColumnArray::Handle(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Column data plus its NULL mask (`true` = NULL, tag `?`).
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedColumn {
    pub data: ColumnArray,
    pub mask: Vec<bool>,
}

/// Output of [`load_column`]: parallel column arrays, their masks, the row
/// ids, and the object table that owns every string/blob cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnarBatch {
    pub row_ids: Vec<u64>,
    pub columns: Vec<LoadedColumn>,
    pub objects: ObjectTable,
}

impl ColumnarBatch {
    pub fn n_rows(&self) -> usize {
        self.row_ids.len()
    }
}

/// Decode a ROWDAT_1 buffer into parallel column arrays.
///
/// The buffer is scanned twice: once to determine the row count and
/// validate the shape, once to fill the pre-sized arrays. Masked integer
/// cells are filled with 0, masked float cells with NaN, masked string
/// cells with handle 0.
pub fn load_column(colspec: &[ColSpec], data: &[u8]) -> Result<ColumnarBatch> {
    let types = resolve_colspec(colspec)?;

    let n_rows = count_rows(&types, data)?;

    let mut row_ids = Vec::with_capacity(n_rows);
    let mut columns: Vec<LoadedColumn> = types
        .iter()
        .map(|ty| LoadedColumn {
            data: new_array(ty, n_rows),
            mask: Vec::with_capacity(n_rows),
        })
        .collect();
    let mut objects = ObjectTable::default();

    let mut reader = ByteReader::new(data);
    while !reader.is_empty() {
        row_ids.push(reader.u64_le()?);

        for (ty, column) in types.iter().zip(columns.iter_mut()) {
            let is_null = reader.u8()? == 0x01;
            column.mask.push(is_null);
            load_column_cell(&mut reader, ty, is_null, &mut column.data, &mut objects)?;
        }
    }

    Ok(ColumnarBatch {
        row_ids,
        columns,
        objects,
    })
}

/// Shape-validation pass: walks the whole buffer and counts rows.
fn count_rows(types: &[ResolvedType], data: &[u8]) -> Result<usize> {
    let mut reader = ByteReader::new(data);
    let mut n_rows = 0;

    while !reader.is_empty() {
        reader.take(8)?;
        for ty in types {
            reader.take(1)?;
            match ty.base {
                ColumnType::MYSQL_TYPE_TINY => {
                    reader.take(1)?;
                }
                ColumnType::MYSQL_TYPE_SHORT | ColumnType::MYSQL_TYPE_YEAR => {
                    reader.take(2)?;
                }
                ColumnType::MYSQL_TYPE_LONG
                | ColumnType::MYSQL_TYPE_INT24
                | ColumnType::MYSQL_TYPE_FLOAT => {
                    reader.take(4)?;
                }
                ColumnType::MYSQL_TYPE_LONGLONG | ColumnType::MYSQL_TYPE_DOUBLE => {
                    reader.take(8)?;
                }
                _ => {
                    let len = reader.str_len()?;
                    reader.take(len)?;
                }
            }
        }
        n_rows += 1;
    }

    Ok(n_rows)
}

fn new_array(ty: &ResolvedType, n_rows: usize) -> ColumnArray {
    match ty.base {
        ColumnType::MYSQL_TYPE_TINY => {
            if ty.negated {
                ColumnArray::UInt8(Vec::with_capacity(n_rows))
            } else {
                ColumnArray::Int8(Vec::with_capacity(n_rows))
            }
        }
        ColumnType::MYSQL_TYPE_SHORT => {
            if ty.negated {
                ColumnArray::UInt16(Vec::with_capacity(n_rows))
            } else {
                ColumnArray::Int16(Vec::with_capacity(n_rows))
            }
        }
        ColumnType::MYSQL_TYPE_LONG | ColumnType::MYSQL_TYPE_INT24 => {
            if ty.negated {
                ColumnArray::UInt32(Vec::with_capacity(n_rows))
            } else {
                ColumnArray::Int32(Vec::with_capacity(n_rows))
            }
        }
        ColumnType::MYSQL_TYPE_LONGLONG => {
            if ty.negated {
                ColumnArray::UInt64(Vec::with_capacity(n_rows))
            } else {
                ColumnArray::Int64(Vec::with_capacity(n_rows))
            }
        }
        ColumnType::MYSQL_TYPE_FLOAT => ColumnArray::Float32(Vec::with_capacity(n_rows)),
        ColumnType::MYSQL_TYPE_DOUBLE => ColumnArray::Float64(Vec::with_capacity(n_rows)),
        // YEAR widens its u16 payload into the `Q` representation
        ColumnType::MYSQL_TYPE_YEAR => ColumnArray::UInt64(Vec::with_capacity(n_rows)),
        _ => ColumnArray::Handle(Vec::with_capacity(n_rows)),
    }
}

fn load_column_cell(
    reader: &mut ByteReader<'_>,
    ty: &ResolvedType,
    is_null: bool,
    array: &mut ColumnArray,
    objects: &mut ObjectTable,
) -> Result<()> {
    match (ty.base, array) {
        (ColumnType::MYSQL_TYPE_TINY, ColumnArray::Int8(out)) => {
            let v = reader.i8()?;
            out.push(if is_null { 0 } else { v });
        }
        (ColumnType::MYSQL_TYPE_TINY, ColumnArray::UInt8(out)) => {
            let v = reader.u8()?;
            out.push(if is_null { 0 } else { v });
        }
        (ColumnType::MYSQL_TYPE_SHORT, ColumnArray::Int16(out)) => {
            let v = reader.i16_le()?;
            out.push(if is_null { 0 } else { v });
        }
        (ColumnType::MYSQL_TYPE_SHORT, ColumnArray::UInt16(out)) => {
            let v = reader.u16_le()?;
            out.push(if is_null { 0 } else { v });
        }
        (ColumnType::MYSQL_TYPE_LONG | ColumnType::MYSQL_TYPE_INT24, ColumnArray::Int32(out)) => {
            let v = reader.i32_le()?;
            out.push(if is_null { 0 } else { v });
        }
        (ColumnType::MYSQL_TYPE_LONG | ColumnType::MYSQL_TYPE_INT24, ColumnArray::UInt32(out)) => {
            let v = reader.u32_le()?;
            out.push(if is_null { 0 } else { v });
        }
        (ColumnType::MYSQL_TYPE_LONGLONG, ColumnArray::Int64(out)) => {
            let v = reader.i64_le()?;
            out.push(if is_null { 0 } else { v });
        }
        (ColumnType::MYSQL_TYPE_LONGLONG, ColumnArray::UInt64(out)) => {
            let v = reader.u64_le()?;
            out.push(if is_null { 0 } else { v });
        }
        (ColumnType::MYSQL_TYPE_FLOAT, ColumnArray::Float32(out)) => {
            let v = reader.f32_le()?;
            out.push(if is_null { f32::NAN } else { v });
        }
        (ColumnType::MYSQL_TYPE_DOUBLE, ColumnArray::Float64(out)) => {
            let v = reader.f64_le()?;
            out.push(if is_null { f64::NAN } else { v });
        }
        (ColumnType::MYSQL_TYPE_YEAR, ColumnArray::UInt64(out)) => {
            let v = reader.u16_le()?;
            out.push(if is_null { 0 } else { v.into() });
        }
        (_, ColumnArray::Handle(out)) => {
            let len = reader.str_len()?;
            let bytes = reader.take(len)?;
            if is_null {
                out.push(0);
            } else if ty.negated {
                out.push(objects.insert(Blob::Binary(bytes.to_vec())));
            } else {
                let text = simdutf8::basic::from_utf8(bytes)
                    .map_err(|_| Error::Encoding { encoding: "utf-8" })?;
                out.push(objects.insert(Blob::Text(text.to_owned())));
            }
        }
        _ => return Err(Error::DataMisaligned),
    }
    Ok(())
}

/// Typed view over one source column handed to [`dump_column`].
#[derive(Debug, Clone, Copy)]
pub enum ColumnView<'a> {
    Bool(&'a [bool]),
    Int8(&'a [i8]),
    Int16(&'a [i16]),
    Int32(&'a [i32]),
    Int64(&'a [i64]),
    UInt8(&'a [u8]),
    UInt16(&'a [u16]),
    UInt32(&'a [u32]),
    UInt64(&'a [u64]),
    Float32(&'a [f32]),
    Float64(&'a [f64]),
    /// String/blob cells; `None` encodes like NULL
    Object(&'a [Option<Blob>]),
}

impl ColumnView<'_> {
    fn len(&self) -> usize {
        match self {
            ColumnView::Bool(v) => v.len(),
            ColumnView::Int8(v) => v.len(),
            ColumnView::Int16(v) => v.len(),
            ColumnView::Int32(v) => v.len(),
            ColumnView::Int64(v) => v.len(),
            ColumnView::UInt8(v) => v.len(),
            ColumnView::UInt16(v) => v.len(),
            ColumnView::UInt32(v) => v.len(),
            ColumnView::UInt64(v) => v.len(),
            ColumnView::Float32(v) => v.len(),
            ColumnView::Float64(v) => v.len(),
            ColumnView::Object(v) => v.len(),
        }
    }

    fn cell(&self, row: usize) -> SourceCell<'_> {
        match self {
            ColumnView::Bool(v) => SourceCell::Int(i64::from(v[row])),
            ColumnView::Int8(v) => SourceCell::Int(v[row].into()),
            ColumnView::Int16(v) => SourceCell::Int(v[row].into()),
            ColumnView::Int32(v) => SourceCell::Int(v[row].into()),
            ColumnView::Int64(v) => SourceCell::Int(v[row]),
            ColumnView::UInt8(v) => SourceCell::UInt(v[row].into()),
            ColumnView::UInt16(v) => SourceCell::UInt(v[row].into()),
            ColumnView::UInt32(v) => SourceCell::UInt(v[row].into()),
            ColumnView::UInt64(v) => SourceCell::UInt(v[row]),
            ColumnView::Float32(v) => SourceCell::Float(v[row].into()),
            ColumnView::Float64(v) => SourceCell::Float(v[row]),
            ColumnView::Object(v) => SourceCell::Object(v[row].as_ref()),
        }
    }
}

enum SourceCell<'a> {
    Int(i64),
    UInt(u64),
    Float(f64),
    Object(Option<&'a Blob>),
}

impl SourceCell<'_> {
    /// Range check against an inclusive integer interval. Float sources
    /// compare in f64, so NaN never fails the check (it encodes as 0).
    fn check_range(&self, min: i128, max: i128, target: &'static str) -> Result<()> {
        let ok = match self {
            SourceCell::Int(v) => (min..=max).contains(&i128::from(*v)),
            SourceCell::UInt(v) => (min..=max).contains(&i128::from(*v)),
            SourceCell::Float(v) => !(*v < min as f64 || *v > max as f64),
            SourceCell::Object(_) => false,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::OutOfRange(target))
        }
    }

    fn check_year(&self, target: &'static str) -> Result<()> {
        let in_year_range = |v: i128| (0..=99).contains(&v) || (1901..=2155).contains(&v);
        let ok = match self {
            SourceCell::Int(v) => in_year_range(i128::from(*v)),
            SourceCell::UInt(v) => in_year_range(i128::from(*v)),
            SourceCell::Float(v) => {
                !(*v < 0.0 || (*v > 99.0 && *v < 1901.0) || *v > 2155.0)
            }
            SourceCell::Object(_) => false,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::OutOfRange(target))
        }
    }

    fn as_i64(&self) -> i64 {
        match self {
            SourceCell::Int(v) => *v,
            SourceCell::UInt(v) => *v as i64,
            SourceCell::Float(v) => *v as i64,
            SourceCell::Object(_) => 0,
        }
    }

    fn as_u64(&self) -> u64 {
        match self {
            SourceCell::Int(v) => *v as u64,
            SourceCell::UInt(v) => *v,
            SourceCell::Float(v) => *v as u64,
            SourceCell::Object(_) => 0,
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            SourceCell::Int(v) => *v as f64,
            SourceCell::UInt(v) => *v as f64,
            SourceCell::Float(v) => *v,
            SourceCell::Object(_) => 0.0,
        }
    }

    fn is_object(&self) -> bool {
        matches!(self, SourceCell::Object(_))
    }
}

fn target_name(ty: &ResolvedType) -> &'static str {
    match (ty.base, ty.negated) {
        (ColumnType::MYSQL_TYPE_TINY, false) => "TINYINT",
        (ColumnType::MYSQL_TYPE_TINY, true) => "UNSIGNED TINYINT",
        (ColumnType::MYSQL_TYPE_SHORT, false) => "SMALLINT",
        (ColumnType::MYSQL_TYPE_SHORT, true) => "UNSIGNED SMALLINT",
        (ColumnType::MYSQL_TYPE_INT24, false) => "MEDIUMINT",
        (ColumnType::MYSQL_TYPE_INT24, true) => "UNSIGNED MEDIUMINT",
        (ColumnType::MYSQL_TYPE_LONG, false) => "INT",
        (ColumnType::MYSQL_TYPE_LONG, true) => "UNSIGNED INT",
        (ColumnType::MYSQL_TYPE_LONGLONG, false) => "BIGINT",
        (ColumnType::MYSQL_TYPE_LONGLONG, true) => "UNSIGNED BIGINT",
        (ColumnType::MYSQL_TYPE_YEAR, _) => "YEAR",
        (ColumnType::MYSQL_TYPE_FLOAT, _) => "FLOAT",
        (ColumnType::MYSQL_TYPE_DOUBLE, _) => "DOUBLE",
        _ => "CHAR",
    }
}

/// Encode parallel source columns into a ROWDAT_1 buffer.
///
/// Row ids, data columns, and masks must agree on the row count. Integer
/// and YEAR targets are range-checked before the masked-NULL zeroing;
/// string/blob targets accept only object sources.
pub fn dump_column(
    returns: &[i16],
    row_ids: &[u64],
    cols: &[(ColumnView<'_>, Option<&[bool]>)],
) -> Result<Vec<u8>> {
    if returns.len() != cols.len() {
        return Err(Error::LengthMismatch(
            "number of return values does not match number of returned columns",
        ));
    }

    let n_rows = row_ids.len();
    if n_rows == 0 || returns.is_empty() {
        return Ok(Vec::new());
    }

    for (view, mask) in cols {
        if view.len() != n_rows {
            return Err(Error::LengthMismatch("mismatched lengths of column values"));
        }
        if let Some(mask) = mask {
            if mask.len() != n_rows {
                return Err(Error::LengthMismatch(
                    "length of mask values does not match the length of data rows",
                ));
            }
        }
    }

    let types = resolve_returns(returns)?;

    let mut out = Vec::with_capacity(256 * types.len());
    for row in 0..n_rows {
        out.extend_from_slice(&row_ids[row].to_le_bytes());

        for (ty, (view, mask)) in types.iter().zip(cols) {
            let is_null = mask.is_some_and(|mask| mask[row]);
            out.push(u8::from(is_null));
            dump_column_cell(&mut out, ty, view.cell(row), is_null)?;
        }
    }

    Ok(out)
}

fn dump_column_cell(
    out: &mut Vec<u8>,
    ty: &ResolvedType,
    cell: SourceCell<'_>,
    is_null: bool,
) -> Result<()> {
    let name = target_name(ty);

    match ty.base {
        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_LONGLONG => {
            if cell.is_object() {
                return Err(Error::UnsupportedSource(match (ty.base, ty.negated) {
                    (ColumnType::MYSQL_TYPE_TINY, false) => "output type TINYINT",
                    (ColumnType::MYSQL_TYPE_TINY, true) => "output type UNSIGNED TINYINT",
                    (ColumnType::MYSQL_TYPE_SHORT, false) => "output type SMALLINT",
                    (ColumnType::MYSQL_TYPE_SHORT, true) => "output type UNSIGNED SMALLINT",
                    (ColumnType::MYSQL_TYPE_INT24, false) => "output type MEDIUMINT",
                    (ColumnType::MYSQL_TYPE_INT24, true) => "output type UNSIGNED MEDIUMINT",
                    (ColumnType::MYSQL_TYPE_LONG, false) => "output type INT",
                    (ColumnType::MYSQL_TYPE_LONG, true) => "output type UNSIGNED INT",
                    (_, false) => "output type BIGINT",
                    (_, true) => "output type UNSIGNED BIGINT",
                }));
            }

            let (min, max): (i128, i128) = match (ty.base, ty.negated) {
                (ColumnType::MYSQL_TYPE_TINY, false) => (-128, 127),
                (ColumnType::MYSQL_TYPE_TINY, true) => (0, 255),
                (ColumnType::MYSQL_TYPE_SHORT, false) => (-32_768, 32_767),
                (ColumnType::MYSQL_TYPE_SHORT, true) => (0, 65_535),
                (ColumnType::MYSQL_TYPE_INT24, false) => (-8_388_608, 8_388_607),
                (ColumnType::MYSQL_TYPE_INT24, true) => (0, 16_777_215),
                (ColumnType::MYSQL_TYPE_LONG, false) => (-2_147_483_648, 2_147_483_647),
                (ColumnType::MYSQL_TYPE_LONG, true) => (0, 4_294_967_295),
                (_, false) => (i64::MIN as i128, i64::MAX as i128),
                (_, true) => (0, u64::MAX as i128),
            };
            cell.check_range(min, max, name)?;

            match (ty.base, ty.negated) {
                (ColumnType::MYSQL_TYPE_TINY, false) => {
                    let v = if is_null { 0 } else { cell.as_i64() as i8 };
                    out.push(v as u8);
                }
                (ColumnType::MYSQL_TYPE_TINY, true) => {
                    let v = if is_null { 0 } else { cell.as_u64() as u8 };
                    out.push(v);
                }
                (ColumnType::MYSQL_TYPE_SHORT, false) => {
                    let v = if is_null { 0 } else { cell.as_i64() as i16 };
                    out.extend_from_slice(&v.to_le_bytes());
                }
                (ColumnType::MYSQL_TYPE_SHORT, true) => {
                    let v = if is_null { 0 } else { cell.as_u64() as u16 };
                    out.extend_from_slice(&v.to_le_bytes());
                }
                (ColumnType::MYSQL_TYPE_INT24 | ColumnType::MYSQL_TYPE_LONG, false) => {
                    let v = if is_null { 0 } else { cell.as_i64() as i32 };
                    out.extend_from_slice(&v.to_le_bytes());
                }
                (ColumnType::MYSQL_TYPE_INT24 | ColumnType::MYSQL_TYPE_LONG, true) => {
                    let v = if is_null { 0 } else { cell.as_u64() as u32 };
                    out.extend_from_slice(&v.to_le_bytes());
                }
                (_, false) => {
                    let v = if is_null { 0 } else { cell.as_i64() };
                    out.extend_from_slice(&v.to_le_bytes());
                }
                (_, true) => {
                    let v = if is_null { 0 } else { cell.as_u64() };
                    out.extend_from_slice(&v.to_le_bytes());
                }
            }
        }

        ColumnType::MYSQL_TYPE_YEAR => {
            if cell.is_object() {
                return Err(Error::UnsupportedSource("output type YEAR"));
            }
            cell.check_year(name)?;
            let v = if is_null { 0 } else { cell.as_i64() as i16 };
            out.extend_from_slice(&v.to_le_bytes());
        }

        ColumnType::MYSQL_TYPE_FLOAT => {
            if cell.is_object() {
                return Err(Error::UnsupportedSource("output type FLOAT"));
            }
            let v = if is_null { 0.0 } else { cell.as_f64() as f32 };
            out.extend_from_slice(&v.to_le_bytes());
        }

        ColumnType::MYSQL_TYPE_DOUBLE => {
            if cell.is_object() {
                return Err(Error::UnsupportedSource("output type DOUBLE"));
            }
            let v = if is_null { 0.0 } else { cell.as_f64() };
            out.extend_from_slice(&v.to_le_bytes());
        }

        // String/blob targets
        _ => {
            let SourceCell::Object(blob) = cell else {
                return Err(Error::UnsupportedSource(if ty.negated {
                    "binary output types"
                } else {
                    "character output types"
                }));
            };

            let payload: Option<&[u8]> = match (blob, is_null) {
                (_, true) | (None, _) => None,
                (Some(Blob::Text(text)), false) => {
                    if ty.negated {
                        return Err(Error::TypeMismatch {
                            expected: "bytes",
                            found: "string",
                        });
                    }
                    Some(text.as_bytes())
                }
                (Some(Blob::Binary(bytes)), false) => {
                    if !ty.negated {
                        return Err(Error::TypeMismatch {
                            expected: "string",
                            found: "bytes",
                        });
                    }
                    Some(bytes.as_slice())
                }
            };

            match payload {
                None => out.extend_from_slice(&0i64.to_le_bytes()),
                Some(bytes) => {
                    out.extend_from_slice(&(bytes.len() as i64).to_le_bytes());
                    out.extend_from_slice(bytes);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::ColumnType as CT;

    const TINY: i16 = CT::MYSQL_TYPE_TINY as i16;
    const SHORT: i16 = CT::MYSQL_TYPE_SHORT as i16;
    const LONG: i16 = CT::MYSQL_TYPE_LONG as i16;
    const LONGLONG: i16 = CT::MYSQL_TYPE_LONGLONG as i16;
    const FLOAT: i16 = CT::MYSQL_TYPE_FLOAT as i16;
    const DOUBLE: i16 = CT::MYSQL_TYPE_DOUBLE as i16;
    const YEAR: i16 = CT::MYSQL_TYPE_YEAR as i16;
    const VARCHAR: i16 = CT::MYSQL_TYPE_VARCHAR as i16;
    const BLOB: i16 = CT::MYSQL_TYPE_BLOB as i16;

    #[test]
    fn columnar_round_trip() {
        let returns = [LONG, -LONGLONG, DOUBLE, VARCHAR, -BLOB, YEAR];
        let colspec: Vec<ColSpec> = returns
            .iter()
            .enumerate()
            .map(|(i, &code)| ColSpec::new(format!("c{i}"), code))
            .collect();

        let longs = [-1i32, 2, 3];
        let ulongs = [10u64, 20, 30];
        let doubles = [0.5f64, -1.5, 2.5];
        let texts = [
            Some(Blob::Text("one".into())),
            None,
            Some(Blob::Text("three".into())),
        ];
        let blobs = [
            Some(Blob::Binary(vec![1, 2])),
            Some(Blob::Binary(vec![])),
            Some(Blob::Binary(vec![0xFF])),
        ];
        let years = [1999u16, 2024, 0];
        let mask = [false, true, false];

        let buffer = dump_column(
            &returns,
            &[100, 200, 300],
            &[
                (ColumnView::Int32(&longs), None),
                (ColumnView::UInt64(&ulongs), None),
                (ColumnView::Float64(&doubles), Some(&mask)),
                (ColumnView::Object(&texts), None),
                (ColumnView::Object(&blobs), None),
                (ColumnView::UInt16(&years), None),
            ],
        )
        .unwrap();

        let batch = load_column(&colspec, &buffer).unwrap();
        assert_eq!(batch.row_ids, vec![100, 200, 300]);
        assert_eq!(batch.n_rows(), 3);

        assert_eq!(batch.columns[0].data, ColumnArray::Int32(vec![-1, 2, 3]));
        assert_eq!(batch.columns[0].data.format_tag(), 'i');
        assert_eq!(batch.columns[0].mask, vec![false, false, false]);

        assert_eq!(batch.columns[1].data, ColumnArray::UInt64(vec![10, 20, 30]));
        assert_eq!(batch.columns[1].data.format_tag(), 'Q');

        // Masked double decodes to NaN regardless of the written fill
        let ColumnArray::Float64(values) = &batch.columns[2].data else {
            panic!("expected Float64");
        };
        assert_eq!(values[0], 0.5);
        assert!(values[1].is_nan());
        assert_eq!(values[2], 2.5);
        assert_eq!(batch.columns[2].mask, vec![false, true, false]);

        let ColumnArray::Handle(handles) = &batch.columns[3].data else {
            panic!("expected Handle");
        };
        assert_eq!(batch.columns[3].data.format_tag(), 'Q');
        assert_eq!(
            batch.objects.get(handles[0]),
            Some(&Blob::Text("one".into()))
        );
        assert_eq!(handles[1], 0);
        assert!(batch.objects.get(handles[1]).is_none());
        assert_eq!(
            batch.objects.get(handles[2]),
            Some(&Blob::Text("three".into()))
        );

        let ColumnArray::Handle(handles) = &batch.columns[4].data else {
            panic!("expected Handle");
        };
        assert_eq!(
            batch.objects.get(handles[0]),
            Some(&Blob::Binary(vec![1, 2]))
        );
        assert_eq!(
            batch.objects.get(handles[1]),
            Some(&Blob::Binary(vec![]))
        );

        assert_eq!(
            batch.columns[5].data,
            ColumnArray::UInt64(vec![1999, 2024, 0])
        );
    }

    #[test]
    fn tinyint_range_error() {
        let values = [200i16];
        let err = dump_column(&[TINY], &[1], &[(ColumnView::Int16(&values), None)]).unwrap_err();
        match err {
            Error::OutOfRange(target) => assert_eq!(target, "TINYINT"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            err_message(&values),
            "value is outside the valid range for TINYINT"
        );
    }

    fn err_message(values: &[i16]) -> String {
        dump_column(&[TINY], &[1], &[(ColumnView::Int16(values), None)])
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn unsigned_tinyint_rejects_negative() {
        let values = [-1i8];
        let err = dump_column(&[-TINY], &[1], &[(ColumnView::Int8(&values), None)]).unwrap_err();
        assert!(matches!(err, Error::OutOfRange("UNSIGNED TINYINT")));
    }

    #[test]
    fn range_check_runs_even_for_masked_cells() {
        let values = [300i32];
        let mask = [true];
        let err = dump_column(
            &[TINY],
            &[1],
            &[(ColumnView::Int32(&values), Some(&mask))],
        )
        .unwrap_err();
        assert!(matches!(err, Error::OutOfRange("TINYINT")));
    }

    #[test]
    fn year_range_is_discontinuous() {
        for year in [0i32, 99, 1901, 2155] {
            let values = [year];
            assert!(dump_column(&[YEAR], &[1], &[(ColumnView::Int32(&values), None)]).is_ok());
        }
        for year in [100i32, 1900, 2156, -1] {
            let values = [year];
            assert!(matches!(
                dump_column(&[YEAR], &[1], &[(ColumnView::Int32(&values), None)]),
                Err(Error::OutOfRange("YEAR"))
            ));
        }
    }

    #[test]
    fn float_targets_cast_without_range_check() {
        let values = [1e300f64];
        let buffer =
            dump_column(&[FLOAT], &[1], &[(ColumnView::Float64(&values), None)]).unwrap();
        // row id + null byte + f32 inf
        assert_eq!(buffer.len(), 8 + 1 + 4);
        let bits = u32::from_le_bytes(buffer[9..13].try_into().unwrap());
        assert!(f32::from_bits(bits).is_infinite());
    }

    #[test]
    fn bool_source_widens() {
        let values = [true, false];
        let buffer = dump_column(&[SHORT], &[1, 2], &[(ColumnView::Bool(&values), None)]).unwrap();
        let batch = load_column(&[ColSpec::new("b", SHORT)], &buffer).unwrap();
        assert_eq!(batch.columns[0].data, ColumnArray::Int16(vec![1, 0]));
    }

    #[test]
    fn string_target_requires_object_source() {
        let values = [1i32];
        let err =
            dump_column(&[VARCHAR], &[1], &[(ColumnView::Int32(&values), None)]).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedSource("character output types")
        ));

        let objects = [Some(Blob::Text("x".into()))];
        let err = dump_column(&[LONG], &[1], &[(ColumnView::Object(&objects), None)]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedSource("output type INT")));
    }

    #[test]
    fn shape_validation() {
        let short_ids = [1u64];
        let values = [1i32, 2];
        assert!(matches!(
            dump_column(&[LONG], &short_ids, &[(ColumnView::Int32(&values), None)]),
            Err(Error::LengthMismatch("mismatched lengths of column values"))
        ));

        let mask = [false];
        let err = dump_column(
            &[LONG, LONG],
            &[1, 2],
            &[(ColumnView::Int32(&values), Some(&mask))],
        )
        .unwrap_err();
        assert!(matches!(err, Error::LengthMismatch(_)));
    }

    #[test]
    fn truncated_columnar_buffer_is_misaligned() {
        let values = [7i64];
        let buffer =
            dump_column(&[LONGLONG], &[9], &[(ColumnView::Int64(&values), None)]).unwrap();
        assert!(matches!(
            load_column(&[ColSpec::new("v", LONGLONG)], &buffer[..buffer.len() - 1]),
            Err(Error::DataMisaligned)
        ));
    }
}
