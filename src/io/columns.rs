//! Numeric column files.
//!
//! Many lab data files are just columns of numbers, optionally preceded by a
//! few header rows. Columns are split on runs of whitespace by default or on
//! an explicit single-byte delimiter (parsed with `csv`). Anything after `#`
//! on a line is a comment.

use std::path::Path;

use crate::error::Error;

/// How to split a column file.
#[derive(Debug, Clone, Default)]
pub struct ColumnOptions {
    /// `None` splits on any run of whitespace.
    pub delimiter: Option<u8>,
    /// Number of leading lines to drop before parsing.
    pub skip_rows: usize,
}

/// Column-major numeric table.
#[derive(Debug, Clone, PartialEq)]
pub struct Columns {
    columns: Vec<Vec<f64>>,
}

impl Columns {
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn column(&self, idx: usize) -> Option<&[f64]> {
        self.columns.get(idx).map(Vec::as_slice)
    }

    pub fn into_columns(self) -> Vec<Vec<f64>> {
        self.columns
    }
}

/// Read a column file from disk.
pub fn read_columns(path: &Path, opts: &ColumnOptions) -> Result<Columns, Error> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("Failed to read '{}': {e}", path.display())))?;
    parse_columns(&text, opts).map_err(|e| Error::new(e.kind(), format!("{}: {}", path.display(), e.message())))
}

/// Parse column text already in memory.
pub fn parse_columns(text: &str, opts: &ColumnOptions) -> Result<Columns, Error> {
    let mut rows: Vec<(usize, Vec<f64>)> = Vec::new();

    match opts.delimiter {
        None => {
            for (idx, line) in text.lines().enumerate().skip(opts.skip_rows) {
                let line = strip_comment(line).trim();
                if line.is_empty() {
                    continue;
                }
                let values = line
                    .split_whitespace()
                    .map(|tok| parse_field(tok, idx + 1))
                    .collect::<Result<Vec<f64>, Error>>()?;
                rows.push((idx + 1, values));
            }
        }
        Some(delimiter) => {
            // csv line numbers are offset by `skip_rows` from here on.
            let body: String = text
                .lines()
                .skip(opts.skip_rows)
                .map(|l| format!("{}\n", strip_comment(l)))
                .collect();
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .delimiter(delimiter)
                .flexible(true)
                .trim(csv::Trim::All)
                .from_reader(body.as_bytes());

            for result in reader.records() {
                let record = result.map_err(|e| Error::parse(format!("CSV parse error: {e}")))?;
                let line = record.position().map_or(0, |p| p.line() as usize) + opts.skip_rows;
                if record.iter().all(str::is_empty) {
                    continue;
                }
                let values = record
                    .iter()
                    .map(|tok| parse_field(tok, line))
                    .collect::<Result<Vec<f64>, Error>>()?;
                rows.push((line, values));
            }
        }
    }

    let Some((_, first)) = rows.first() else {
        return Err(Error::parse("No numeric rows found."));
    };
    let ncols = first.len();
    let mut columns = vec![Vec::with_capacity(rows.len()); ncols];
    for (line, values) in rows {
        if values.len() != ncols {
            return Err(Error::parse(format!(
                "Line {line}: expected {ncols} columns, got {}.",
                values.len()
            )));
        }
        for (col, v) in columns.iter_mut().zip(values) {
            col.push(v);
        }
    }

    Ok(Columns { columns })
}

/// Text before the first `#`.
fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(data, _)| data)
}

fn parse_field(token: &str, line: usize) -> Result<f64, Error> {
    token
        .parse::<f64>()
        .map_err(|_| Error::parse(format!("Line {line}: invalid number {token:?}.")))
}
