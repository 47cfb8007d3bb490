//! `refgrid-core`: Table data model shared by the grid engine and loaders.
//!
//! Column kinds are always declared through a [`Schema`]; nothing in this
//! crate guesses whether a column is numeric or categorical.

pub mod error;
pub mod schema;
pub mod table;
pub mod value;

pub use error::TableError;
pub use schema::{ColumnKind, Field, Schema};
pub use table::{Column, Table};
pub use value::Value;
