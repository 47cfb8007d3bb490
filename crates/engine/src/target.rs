use std::str::FromStr;

use refgrid_core::Value;

use crate::error::GridError;

/// How a target column's representative values are chosen.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TargetValues {
    /// Evenly spaced numbers over the spread, or every observed label.
    #[default]
    Auto,
    /// Like `Auto`, with a per-target `length_out`.
    Length(usize),
    /// Exactly these values, deduplicated in order.
    Explicit(Vec<Value>),
}

/// A column nominated for enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub column: String,
    pub values: TargetValues,
}

impl Target {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            values: TargetValues::Auto,
        }
    }

    pub fn with_length(column: impl Into<String>, n: usize) -> Self {
        Self {
            column: column.into(),
            values: TargetValues::Length(n),
        }
    }

    pub fn with_values<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            column: column.into(),
            values: TargetValues::Explicit(values.into_iter().map(Into::into).collect()),
        }
    }
}

impl From<&str> for Target {
    fn from(column: &str) -> Self {
        Self::new(column)
    }
}

impl From<String> for Target {
    fn from(column: String) -> Self {
        Self::new(column)
    }
}

/// Parses `Age`, `Age=length:3` or `Age=[20, 30, 40]`.
///
/// Bracketed items are kept as labels; the grid converts them to numbers
/// when the column is numeric.
impl FromStr for Target {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, rhs) = match s.split_once('=') {
            Some((name, rhs)) => (name.trim(), Some(rhs.trim())),
            None => (s.trim(), None),
        };
        if name.is_empty() {
            return Err(GridError::InvalidParameter(format!("target '{s}': empty column name")));
        }

        let Some(rhs) = rhs else {
            return Ok(Self::new(name));
        };

        if let Some(n) = rhs.strip_prefix("length:") {
            let n: usize = n.trim().parse().map_err(|_| {
                GridError::InvalidParameter(format!("target '{s}': bad length '{}'", n.trim()))
            })?;
            return Ok(Self::with_length(name, n));
        }

        let Some(items) = rhs.strip_prefix('[').and_then(|r| r.strip_suffix(']')) else {
            return Err(GridError::InvalidParameter(format!(
                "target '{s}': expected 'length:N' or '[v1, v2, ...]'"
            )));
        };
        let values: Vec<Value> = items
            .split(',')
            .map(|item| unquote(item.trim()))
            .filter(|item| !item.is_empty())
            .map(Value::label)
            .collect();
        Ok(Self::with_values(name, values))
    }
}

fn unquote(item: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = item.strip_prefix(q).and_then(|i| i.strip_suffix(q)) {
            return inner;
        }
    }
    item
}
