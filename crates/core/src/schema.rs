use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Categorical => write!(f, "categorical"),
        }
    }
}

/// A named, typed column declaration.
///
/// `levels` fixes the ordering of a categorical field. Without it the
/// ordering is whatever order labels are first observed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub kind: ColumnKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<String>>,
}

impl Field {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Numeric,
            levels: None,
        }
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Categorical,
            levels: None,
        }
    }

    /// Categorical field with a declared level ordering.
    pub fn factor<I, S>(name: impl Into<String>, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: ColumnKind::Categorical,
            levels: Some(levels.into_iter().map(Into::into).collect()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }

    /// Position of `label` in the declared levels, if any were declared.
    pub fn level_index(&self, label: &str) -> Option<usize> {
        self.levels.as_ref()?.iter().position(|l| l == label)
    }

    fn validate(&self) -> Result<(), TableError> {
        let Some(levels) = &self.levels else {
            return Ok(());
        };
        if self.kind == ColumnKind::Numeric {
            return Err(TableError::LevelsOnNumeric(self.name.clone()));
        }
        let mut seen = HashSet::new();
        for level in levels {
            if !seen.insert(level.as_str()) {
                return Err(TableError::DuplicateLevel {
                    column: self.name.clone(),
                    level: level.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Ordered field declarations for a [`crate::Table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Result<Self, TableError> {
        let mut names = HashSet::new();
        for field in &fields {
            if !names.insert(field.name.as_str()) {
                return Err(TableError::DuplicateField(field.name.clone()));
            }
            field.validate()?;
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }
}
