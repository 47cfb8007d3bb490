use std::fmt;

use crate::schema::ColumnKind;

#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    /// Two fields share the same name.
    DuplicateField(String),
    /// Declared levels on a numeric field.
    LevelsOnNumeric(String),
    /// A categorical field declares the same level twice.
    DuplicateLevel { column: String, level: String },
    /// Number of column buffers differs from the number of fields.
    ColumnCountMismatch { fields: usize, columns: usize },
    /// A column buffer is shorter or longer than the first one.
    LengthMismatch { column: String, expected: usize, found: usize },
    /// Column buffer kind disagrees with the declared field kind.
    KindMismatch { column: String, expected: ColumnKind, found: ColumnKind },
    /// A label outside the field's declared levels.
    UnknownLevel { column: String, level: String },
    /// A row has the wrong number of cells.
    RowWidth { row: usize, expected: usize, found: usize },
    /// A cell value cannot be stored in its column.
    ValueKind { row: usize, column: String, expected: ColumnKind },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateField(name) => write!(f, "duplicate field '{name}'"),
            Self::LevelsOnNumeric(name) => {
                write!(f, "field '{name}': levels are only allowed on categorical fields")
            }
            Self::DuplicateLevel { column, level } => {
                write!(f, "field '{column}': level '{level}' declared twice")
            }
            Self::ColumnCountMismatch { fields, columns } => {
                write!(f, "schema has {fields} field(s) but {columns} column(s) were supplied")
            }
            Self::LengthMismatch { column, expected, found } => {
                write!(f, "column '{column}': expected {expected} row(s), found {found}")
            }
            Self::KindMismatch { column, expected, found } => {
                write!(f, "column '{column}': declared {expected}, got {found} data")
            }
            Self::UnknownLevel { column, level } => {
                write!(f, "column '{column}': '{level}' is not a declared level")
            }
            Self::RowWidth { row, expected, found } => {
                write!(f, "row {row}: expected {expected} cell(s), found {found}")
            }
            Self::ValueKind { row, column, expected } => {
                write!(f, "row {row}, column '{column}': value is not {expected}")
            }
        }
    }
}

impl std::error::Error for TableError {}
