//! Wire-level core of a SingleStoreDB client: the MySQL text-protocol
//! result-set decoder and the ROWDAT_1 row/column batch codecs used to
//! exchange table batches with external UDF servers.

pub mod conn;
pub mod constant;
pub mod error;
pub mod opts;
pub mod protocol;
pub mod result;
pub mod row;
pub mod rowdat;
pub mod value;

pub use conn::{ByteSource, Connection};
pub use error::{Error, ErrorKind, Result};
pub use opts::{CellInput, Converter, DecodeOptions, EncodingErrors, ResultsType};
pub use protocol::resultset::{read_rowdata_packet, RowState};
pub use protocol::text::Encoding;
pub use result::{Field, QueryResult};
pub use row::Row;
pub use value::Value;

#[cfg(test)]
mod opts_test;
