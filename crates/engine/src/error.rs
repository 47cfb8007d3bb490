use std::fmt;

use refgrid_core::TableError;

#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// A target names a column the table does not have.
    ColumnNotFound { column: String },
    /// The input table has no rows or no columns.
    EmptyInput,
    /// Bad `length_out`, empty or duplicated targets, bad explicit values.
    InvalidParameter(String),
    /// A policy name that does not map to any known policy.
    UnknownPolicy { kind: &'static str, value: String },
    /// Every cell of a column is missing.
    NoObservedValues { column: String },
    /// The assembled grid failed table validation.
    Table(TableError),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnNotFound { column } => write!(f, "column not found: '{column}'"),
            Self::EmptyInput => write!(f, "input table is empty"),
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::UnknownPolicy { kind, value } => write!(f, "unknown {kind} policy '{value}'"),
            Self::NoObservedValues { column } => {
                write!(f, "column '{column}' has no observed values")
            }
            Self::Table(e) => write!(f, "grid assembly failed: {e}"),
        }
    }
}

impl std::error::Error for GridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Table(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TableError> for GridError {
    fn from(e: TableError) -> Self {
        Self::Table(e)
    }
}
