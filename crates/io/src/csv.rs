// CSV table loading

use std::io::Read;
use std::path::Path;

use refgrid_core::{Column, ColumnKind, Field, Schema, Table};

use crate::error::IoError;

/// How CSV cells are read.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter. `None` sniffs it from the first lines.
    pub delimiter: Option<u8>,
    /// Cells equal to one of these (after trimming) are missing.
    pub na_tokens: Vec<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            na_tokens: vec![String::new(), "NA".to_string()],
        }
    }
}

impl CsvOptions {
    fn is_na(&self, cell: &str) -> bool {
        self.na_tokens.iter().any(|t| t == cell)
    }

    fn delimiter_for(&self, content: &str) -> u8 {
        self.delimiter.unwrap_or_else(|| sniff_delimiter(content))
    }
}

/// Load a table from CSV text. The header row must name every schema field;
/// other CSV columns are ignored.
pub fn load_csv(content: &str, schema: &Schema, options: &CsvOptions) -> Result<Table, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter_for(content))
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut indices = Vec::with_capacity(schema.len());
    for field in schema.fields() {
        let idx = headers
            .iter()
            .position(|h| *h == field.name)
            .ok_or_else(|| IoError::MissingColumn(field.name.clone()))?;
        indices.push(idx);
    }
    let ignored = headers.len() - indices.len();
    if ignored > 0 {
        log::warn!("ignoring {ignored} CSV column(s) not declared in the schema");
    }

    let mut columns: Vec<Column> = schema
        .fields()
        .iter()
        .map(|f| match f.kind {
            ColumnKind::Numeric => Column::Numeric(Vec::new()),
            ColumnKind::Categorical => Column::Categorical(Vec::new()),
        })
        .collect();

    for (r, record) in reader.records().enumerate() {
        let record = record?;
        for ((field, &idx), column) in schema.fields().iter().zip(&indices).zip(&mut columns) {
            let cell = record.get(idx).unwrap_or("").trim();
            let missing = options.is_na(cell);
            match column {
                Column::Numeric(v) => v.push(if missing {
                    None
                } else {
                    Some(parse_number(cell, r + 1, field)?)
                }),
                Column::Categorical(v) => v.push((!missing).then(|| cell.to_string())),
            }
        }
    }

    let table = Table::new(schema.clone(), columns)?;
    log::debug!("loaded {} row(s) x {} column(s)", table.row_count(), table.column_count());
    Ok(table)
}

pub fn load_csv_file(path: &Path, schema: &Schema, options: &CsvOptions) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    load_csv(&content, schema, options)
}

/// Propose a schema from CSV text: a column is numeric when every
/// non-missing cell parses as a number (and at least one does).
///
/// Levels are never inferred; review the result before relying on it.
pub fn sniff_schema(content: &str, options: &CsvOptions) -> Result<Schema, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter_for(content))
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    // (seen a number, seen a non-number)
    let mut evidence = vec![(false, false); headers.len()];

    for record in reader.records() {
        let record = record?;
        for (i, slot) in evidence.iter_mut().enumerate() {
            let cell = record.get(i).unwrap_or("").trim();
            if options.is_na(cell) {
                continue;
            }
            if parse_finite(cell).is_some() {
                slot.0 = true;
            } else {
                slot.1 = true;
            }
        }
    }

    let fields = headers
        .into_iter()
        .zip(evidence)
        .map(|(name, (number, other))| {
            if number && !other {
                Field::numeric(name)
            } else {
                Field::categorical(name)
            }
        })
        .collect();
    Ok(Schema::new(fields)?)
}

/// Infinities are not observations; `inf`, `NaN` and friends are rejected.
fn parse_finite(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_number(cell: &str, row: usize, field: &Field) -> Result<f64, IoError> {
    parse_finite(cell).ok_or_else(|| IoError::ParseNumber {
        row,
        column: field.name.clone(),
        value: cell.to_string(),
    })
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Lines agreeing with the header's field count, weighted by that count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| IoError::Io(format!("{}: {e}", path.display())))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::Io(e.to_string()))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}
