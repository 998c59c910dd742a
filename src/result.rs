use crate::constant::ColumnFlags;
use crate::opts::{Converter, DecodeOptions};
use crate::protocol::resultset::RowState;
use crate::protocol::text::Encoding;
use crate::row::Row;

/// Column metadata as delivered by the result's column-definition packets.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub table_name: String,
    pub type_code: u8,
    pub flags: ColumnFlags,
    pub scale: u8,
}

impl Field {
    pub fn new(name: impl Into<String>, type_code: u8) -> Self {
        Self {
            name: name.into(),
            table_name: String::new(),
            type_code,
            flags: ColumnFlags::default(),
            scale: 0,
        }
    }

    pub fn with_table(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_flags(mut self, flags: ColumnFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_scale(mut self, scale: u8) -> Self {
        self.scale = scale;
        self
    }
}

/// The result-set collaborator the decoder reads metadata from and writes
/// rows and bookkeeping back to.
///
/// The owning connection is not held here; it is threaded through
/// [`crate::read_rowdata_packet`] so ownership stays with the caller.
pub struct QueryResult {
    pub fields: Vec<Field>,
    /// Per-column `(encoding, converter)`, parallel to `fields`. A missing
    /// entry means binary encoding and no converter.
    pub converters: Vec<(Option<Encoding>, Option<Converter>)>,
    pub options: DecodeOptions,
    /// Live decoder state between unbuffered/fetchmany batches
    pub state: Option<RowState>,
    /// Rows of the latest batch; `None` after an unbuffered stream drains
    pub rows: Option<Vec<Row>>,
    /// Total rows read so far, published at batch boundaries
    pub affected_rows: Option<u64>,
    pub warning_count: u64,
    pub has_next: bool,
    /// True while an unbuffered result still owns the stream
    pub unbuffered_active: bool,
}

impl QueryResult {
    pub fn new(
        fields: Vec<Field>,
        converters: Vec<(Option<Encoding>, Option<Converter>)>,
        options: DecodeOptions,
    ) -> Self {
        let unbuffered_active = options.unbuffered;
        Self {
            fields,
            converters,
            options,
            state: None,
            rows: None,
            affected_rows: None,
            warning_count: 0,
            has_next: false,
            unbuffered_active,
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

impl std::fmt::Debug for QueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryResult")
            .field("fields", &self.fields)
            .field("options", &self.options)
            .field("rows", &self.rows.as_ref().map(Vec::len))
            .field("affected_rows", &self.affected_rows)
            .field("warning_count", &self.warning_count)
            .field("has_next", &self.has_next)
            .field("unbuffered_active", &self.unbuffered_active)
            .finish()
    }
}
