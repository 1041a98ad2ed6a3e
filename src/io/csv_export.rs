use std::fmt;
use std::io;
use std::path::Path;
use std::rc::Rc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::io::atomic_write_string;

#[derive(Debug, Error)]
pub enum CsvExportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("nothing to export")]
    Empty,
}

/// One CSV column: a fixed header and how to format a record's value.
pub struct CsvField<R> {
    pub header: String,
    value: Rc<dyn Fn(&R) -> String>,
}

impl<R> Clone for CsvField<R> {
    fn clone(&self) -> Self {
        Self {
            header: self.header.clone(),
            value: Rc::clone(&self.value),
        }
    }
}

impl<R> fmt::Debug for CsvField<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvField")
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

impl<R> CsvField<R> {
    pub fn new(header: impl Into<String>, value: impl Fn(&R) -> String + 'static) -> Self {
        Self {
            header: header.into(),
            value: Rc::new(value),
        }
    }

    pub fn value(&self, record: &R) -> String {
        (self.value)(record)
    }
}

/// Quotes a field when it holds a comma, quote or line break, doubling any
/// inner quotes.
pub fn escape_field(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Renders a header line plus one line per record. Column order follows
/// `fields`, never the grid's visual order.
pub fn to_csv<'a, R: 'a>(
    records: impl IntoIterator<Item = &'a R>,
    fields: &[CsvField<R>],
) -> String {
    let mut out = String::new();
    push_line(&mut out, fields.iter().map(|f| f.header.clone()));
    for record in records {
        push_line(&mut out, fields.iter().map(|f| f.value(record)));
    }
    out
}

fn push_line(out: &mut String, values: impl Iterator<Item = String>) {
    let line: Vec<String> = values.map(|v| escape_field(&v)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

/// `<prefix>_<YYYY-MM-DD>.csv`
pub fn export_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}_{}.csv", date.format("%Y-%m-%d"))
}

pub fn today_filename(prefix: &str) -> String {
    export_filename(prefix, chrono::Local::now().date_naive())
}

pub fn write_csv<'a, R: 'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a R>,
    fields: &[CsvField<R>],
) -> Result<usize, CsvExportError> {
    let records: Vec<&R> = records.into_iter().collect();
    if records.is_empty() {
        return Err(CsvExportError::Empty);
    }
    let content = to_csv(records.iter().copied(), fields);
    atomic_write_string(path, &content)?;
    info!(path = %path.display(), rows = records.len(), "exported csv");
    Ok(records.len())
}
