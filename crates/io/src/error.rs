use std::fmt;

use refgrid_core::TableError;

#[derive(Debug)]
pub enum IoError {
    /// File read error.
    Io(String),
    /// Malformed CSV.
    Csv(String),
    /// A schema field has no matching CSV header.
    MissingColumn(String),
    /// A numeric cell that does not parse. `row` is the 1-based data row.
    ParseNumber { row: usize, column: String, value: String },
    /// Schema file parse / validation error.
    Schema(String),
    /// Parsed cells rejected by the table.
    Table(TableError),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::MissingColumn(column) => write!(f, "missing column '{column}'"),
            Self::ParseNumber { row, column, value } => {
                write!(f, "row {row}, column '{column}': cannot parse number '{value}'")
            }
            Self::Schema(msg) => write!(f, "schema error: {msg}"),
            Self::Table(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Table(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TableError> for IoError {
    fn from(e: TableError) -> Self {
        Self::Table(e)
    }
}

impl From<::csv::Error> for IoError {
    fn from(e: ::csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}
