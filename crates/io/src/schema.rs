// Schema files
//
// TOML:
//   [[fields]]
//   name = "Salary"
//   kind = "categorical"
//   levels = ["<1000", "<2000", "2000+"]
//
// JSON: {"fields": [{"name": "Age", "kind": "numeric"}]}

use std::path::Path;

use refgrid_core::{Field, Schema};
use serde::{Deserialize, Serialize};

use crate::csv::read_file_as_utf8;
use crate::error::IoError;

#[derive(Debug, Serialize, Deserialize)]
struct SchemaFile {
    fields: Vec<Field>,
}

impl SchemaFile {
    fn into_schema(self) -> Result<Schema, IoError> {
        Schema::new(self.fields).map_err(|e| IoError::Schema(e.to_string()))
    }
}

pub fn parse_schema_toml(input: &str) -> Result<Schema, IoError> {
    let file: SchemaFile = toml::from_str(input).map_err(|e| IoError::Schema(e.to_string()))?;
    file.into_schema()
}

pub fn parse_schema_json(input: &str) -> Result<Schema, IoError> {
    let file: SchemaFile =
        serde_json::from_str(input).map_err(|e| IoError::Schema(e.to_string()))?;
    file.into_schema()
}

/// Render a schema in the TOML schema-file format, e.g. to save a sniffed
/// schema for review.
pub fn schema_to_toml(schema: &Schema) -> Result<String, IoError> {
    let file = SchemaFile {
        fields: schema.fields().to_vec(),
    };
    toml::to_string_pretty(&file).map_err(|e| IoError::Schema(e.to_string()))
}

/// Load a schema file, choosing the format by extension (`.toml` or `.json`).
pub fn load_schema_file(path: &Path) -> Result<Schema, IoError> {
    let content = read_file_as_utf8(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => parse_schema_toml(&content),
        Some("json") => parse_schema_json(&content),
        other => Err(IoError::Schema(format!(
            "{}: unsupported schema format '{}'",
            path.display(),
            other.unwrap_or("")
        ))),
    }
}
