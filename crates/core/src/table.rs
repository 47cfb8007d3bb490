use crate::error::TableError;
use crate::schema::{ColumnKind, Field, Schema};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// Columnar cell storage. `None` is a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl Column {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Numeric(_) => ColumnKind::Numeric,
            Self::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, row: usize) -> Option<Value> {
        match self {
            Self::Numeric(v) => v.get(row).map(|c| c.map_or(Value::Missing, Value::Number)),
            Self::Categorical(v) => v
                .get(row)
                .map(|c| c.as_ref().map_or(Value::Missing, |s| Value::Label(s.clone()))),
        }
    }

    /// Observed finite numbers in row order. Missing cells, `NaN` and
    /// infinities are skipped.
    pub fn numbers(&self) -> Vec<f64> {
        match self {
            Self::Numeric(v) => v.iter().flatten().copied().filter(|n| n.is_finite()).collect(),
            Self::Categorical(_) => Vec::new(),
        }
    }

    /// Observed (non-missing) labels in row order.
    pub fn labels(&self) -> Vec<&str> {
        match self {
            Self::Numeric(_) => Vec::new(),
            Self::Categorical(v) => v.iter().flatten().map(String::as_str).collect(),
        }
    }

    fn empty_like(kind: ColumnKind, capacity: usize) -> Self {
        match kind {
            ColumnKind::Numeric => Self::Numeric(Vec::with_capacity(capacity)),
            ColumnKind::Categorical => Self::Categorical(Vec::with_capacity(capacity)),
        }
    }
}

impl From<Vec<f64>> for Column {
    fn from(v: Vec<f64>) -> Self {
        Self::Numeric(v.into_iter().map(Some).collect())
    }
}

impl From<Vec<&str>> for Column {
    fn from(v: Vec<&str>) -> Self {
        Self::Categorical(v.into_iter().map(|s| Some(s.to_string())).collect())
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// An immutable, schema-checked columnar table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: Schema,
    columns: Vec<Column>,
}

impl Table {
    /// Build a table from column buffers aligned to `schema`.
    pub fn new(schema: Schema, columns: Vec<Column>) -> Result<Self, TableError> {
        if schema.len() != columns.len() {
            return Err(TableError::ColumnCountMismatch {
                fields: schema.len(),
                columns: columns.len(),
            });
        }

        let expected = columns.first().map_or(0, Column::len);
        for (field, column) in schema.fields().iter().zip(&columns) {
            if field.kind != column.kind() {
                return Err(TableError::KindMismatch {
                    column: field.name.clone(),
                    expected: field.kind,
                    found: column.kind(),
                });
            }
            if column.len() != expected {
                return Err(TableError::LengthMismatch {
                    column: field.name.clone(),
                    expected,
                    found: column.len(),
                });
            }
            check_levels(field, column)?;
        }

        Ok(Self { schema, columns })
    }

    /// Build a table from row-major cells.
    ///
    /// `NaN` numbers are stored as missing.
    pub fn from_rows(schema: Schema, rows: &[Vec<Value>]) -> Result<Self, TableError> {
        let mut columns: Vec<Column> = schema
            .fields()
            .iter()
            .map(|f| Column::empty_like(f.kind, rows.len()))
            .collect();

        for (r, row) in rows.iter().enumerate() {
            if row.len() != schema.len() {
                return Err(TableError::RowWidth {
                    row: r,
                    expected: schema.len(),
                    found: row.len(),
                });
            }
            for ((field, column), value) in schema.fields().iter().zip(&mut columns).zip(row) {
                push_value(column, value).ok_or_else(|| TableError::ValueKind {
                    row: r,
                    column: field.name.clone(),
                    expected: field.kind,
                })?;
            }
        }

        Self::new(schema, columns)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.schema.index_of(name).map(|i| &self.columns[i])
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.schema.field(name)
    }

    pub fn value(&self, row: usize, name: &str) -> Option<Value> {
        self.column(name)?.get(row)
    }

    pub fn row(&self, row: usize) -> Option<Vec<Value>> {
        if row >= self.row_count() {
            return None;
        }
        self.columns.iter().map(|c| c.get(row)).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        (0..self.row_count()).filter_map(move |r| self.row(r))
    }

    pub fn into_parts(self) -> (Schema, Vec<Column>) {
        (self.schema, self.columns)
    }
}

fn push_value(column: &mut Column, value: &Value) -> Option<()> {
    match (column, value) {
        (Column::Numeric(v), Value::Number(n)) => v.push((!n.is_nan()).then_some(*n)),
        (Column::Numeric(v), Value::Missing) => v.push(None),
        (Column::Categorical(v), Value::Label(s)) => v.push(Some(s.clone())),
        (Column::Categorical(v), Value::Missing) => v.push(None),
        _ => return None,
    }
    Some(())
}

fn check_levels(field: &Field, column: &Column) -> Result<(), TableError> {
    if field.levels.is_none() {
        return Ok(());
    }
    for label in column.labels() {
        if field.level_index(label).is_none() {
            return Err(TableError::UnknownLevel {
                column: field.name.clone(),
                level: label.to_string(),
            });
        }
    }
    Ok(())
}
