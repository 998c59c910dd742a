use std::sync::Arc;

use crate::value::Value;

/// Field-name list shared by every struct-sequence or named-tuple row of a
/// result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDescriptor {
    pub name: &'static str,
    pub fields: Vec<Arc<str>>,
}

impl RowDescriptor {
    pub fn new(fields: Vec<Arc<str>>) -> Self {
        Self {
            name: "singlestoredb.Row",
            fields,
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| &**f == name)
    }
}

/// A struct-sequence row: positional values with named access through the
/// shared descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct StructSeq {
    desc: Arc<RowDescriptor>,
    values: Vec<Value>,
}

impl StructSeq {
    pub fn new(desc: Arc<RowDescriptor>, values: Vec<Value>) -> Self {
        Self { desc, values }
    }

    pub fn descriptor(&self) -> &RowDescriptor {
        &self.desc
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.desc.index_of(name).map(|i| &self.values[i])
    }
}

/// A named-tuple row. Same data as [`StructSeq`]; constructed from the
/// pre-collected argument buffer once every column has been placed.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTuple {
    fields: Arc<Vec<Arc<str>>>,
    values: Vec<Value>,
}

impl NamedTuple {
    pub fn new(fields: Arc<Vec<Arc<str>>>, values: Vec<Value>) -> Self {
        Self { fields, values }
    }

    pub fn fields(&self) -> &[Arc<str>] {
        &self.fields
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .position(|f| &**f == name)
            .map(|i| &self.values[i])
    }
}

/// One materialised row, in the shape the result set was configured for.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Tuple(Vec<Value>),
    /// Name/value pairs in column order
    Dict(Vec<(Arc<str>, Value)>),
    Struct(StructSeq),
    Named(NamedTuple),
}

impl Row {
    pub fn len(&self) -> usize {
        match self {
            Row::Tuple(v) => v.len(),
            Row::Dict(v) => v.len(),
            Row::Struct(s) => s.values().len(),
            Row::Named(n) => n.values().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at column position `idx`
    pub fn get(&self, idx: usize) -> Option<&Value> {
        match self {
            Row::Tuple(v) => v.get(idx),
            Row::Dict(v) => v.get(idx).map(|(_, value)| value),
            Row::Struct(s) => s.values().get(idx),
            Row::Named(n) => n.values().get(idx),
        }
    }

    /// Value of the column called `name`, for the shapes that carry names
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        match self {
            Row::Tuple(_) => None,
            Row::Dict(v) => v.iter().find(|(n, _)| &**n == name).map(|(_, value)| value),
            Row::Struct(s) => s.get(name),
            Row::Named(n) => n.get(name),
        }
    }
}
