// File I/O operations
//
// Loading only: tables come in from CSV against a declared schema. Grids are
// handed back to the caller as in-memory tables.

pub mod csv;
pub mod error;
pub mod schema;

pub use crate::csv::{load_csv, load_csv_file, sniff_schema, CsvOptions};
pub use error::IoError;
pub use schema::{load_schema_file, parse_schema_json, parse_schema_toml, schema_to_toml};
