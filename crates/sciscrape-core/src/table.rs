//! Tabular assembly and export.
//!
//! A [`Table`] is an ordered list of column names plus rows of [`Record`]s.
//! A cell that is missing from its row is absent; nothing is filled in.

use chrono::NaiveDate;
use serde_json::{Number, Value};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::result::{Record, ScrapeResult};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Column overlap on join: {0:?}")]
    ColumnOverlap(Vec<String>),

    #[error("Column {name} has {actual} values but the table has {expected} rows")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error("Malformed delimited input at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TableResult<T> = Result<T, TableError>;

const STRING_COLUMNS: &[&str] = &[
    "doi_from_pdf",
    "title",
    "doi",
    "internal_id",
    "abstract",
    "biblio",
    "journal_title",
    "downloader",
    "query",
    "filepath",
    "paper_parentheticals",
    "source_titles",
];

const INTEGER_COLUMNS: &[&str] = &[
    "times_cited",
    "matching_terms",
    "bycatch_terms",
    "total_word_count",
    "total_length",
];

const FLOAT_COLUMNS: &[&str] = &["wordscore"];

const DATE_COLUMN: &str = "pub_date";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table whose columns are the union of record keys in
    /// first-seen order.
    #[must_use]
    pub fn from_records(rows: Vec<Record>) -> Self {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if seen.insert(key.clone()) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    pub fn from_results(results: &[ScrapeResult]) -> crate::Result<Self> {
        let rows = results
            .iter()
            .map(ScrapeResult::to_record)
            .collect::<crate::Result<Vec<_>>>()?;
        Ok(Self::from_records(rows))
    }

    /// One row per result, with an empty row for every slot that produced
    /// nothing so positions stay aligned with the queries.
    pub fn from_aligned(slots: &[Vec<ScrapeResult>]) -> crate::Result<Self> {
        let mut rows = Vec::with_capacity(slots.len());
        for slot in slots {
            if slot.is_empty() {
                rows.push(Record::new());
            }
            for result in slot {
                rows.push(result.to_record()?);
            }
        }
        Ok(Self::from_records(rows))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Cells of one column, `None` where the row has no value.
    pub fn column(&self, name: &str) -> Vec<Option<&Value>> {
        self.rows.iter().map(|row| row.get(name)).collect()
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> &[Record] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Set `name` to `values`, one per row. An empty table takes its row
    /// count from `values`.
    pub fn with_column(&mut self, name: &str, values: Vec<Value>) -> TableResult<()> {
        if self.rows.is_empty() {
            self.rows = values.iter().map(|_| Record::new()).collect();
        }
        if values.len() != self.rows.len() {
            return Err(TableError::LengthMismatch {
                name: name.to_string(),
                expected: self.rows.len(),
                actual: values.len(),
            });
        }

        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(name.to_string(), value);
        }
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
        Ok(())
    }

    /// Positional left join. Every row of `self` is kept; a row of `other`
    /// beyond `self`'s length is dropped.
    pub fn join_columns(mut self, other: Self) -> TableResult<Self> {
        let overlap: Vec<String> = other
            .columns
            .iter()
            .filter(|c| self.has_column(c))
            .cloned()
            .collect();
        if !overlap.is_empty() {
            return Err(TableError::ColumnOverlap(overlap));
        }

        if other.rows.len() > self.rows.len() {
            tracing::warn!(
                kept = self.rows.len(),
                dropped = other.rows.len() - self.rows.len(),
                "Join has more rows than the table, dropping the surplus"
            );
        }

        for (row, extension) in self.rows.iter_mut().zip(other.rows) {
            row.extend(extension);
        }
        self.columns.extend(other.columns);
        Ok(self)
    }

    /// Move a column to the end of the column order.
    pub fn move_column_last(&mut self, name: &str) {
        if let Some(idx) = self.columns.iter().position(|c| c == name) {
            let column = self.columns.remove(idx);
            self.columns.push(column);
        }
    }

    /// Drop every column whose cells are all absent, null or empty strings.
    /// Returns the names removed.
    pub fn remove_empty_columns(&mut self) -> Vec<String> {
        let (empty, kept): (Vec<String>, Vec<String>) = self
            .columns
            .drain(..)
            .partition(|name| self.rows.iter().all(|row| is_blank(row.get(name))));

        for row in &mut self.rows {
            for name in &empty {
                row.remove(name);
            }
        }
        self.columns = kept;

        if !empty.is_empty() {
            tracing::debug!(columns = ?empty, "Removed empty columns");
        }
        empty
    }

    /// Coerce known columns to their storage types. Values that cannot be
    /// coerced become absent.
    pub fn downcast(&mut self) {
        for row in &mut self.rows {
            let keys: Vec<String> = row.keys().cloned().collect();
            for key in keys {
                let coerced = row.get(&key).and_then(|value| coerce(&key, value));
                match coerced {
                    Some(Coerced::Keep) => {}
                    Some(Coerced::Value(value)) => {
                        row.insert(key, value);
                    }
                    None => {
                        row.remove(&key);
                    }
                }
            }
        }
    }

    /// Write as comma-separated text with a header row.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        let header: Vec<String> = self.columns.iter().map(|c| escape_field(c)).collect();
        writeln!(writer, "{}", header.join(","))?;

        for row in &self.rows {
            let line: Vec<String> = self
                .columns
                .iter()
                .map(|c| escape_field(&render_cell(row.get(c))))
                .collect();
            writeln!(writer, "{}", line.join(","))?;
        }
        writer.flush()
    }

    /// Write to `<dir>/<today>_sciscraper_<tag>.csv`, creating `dir`.
    pub fn export(&self, dir: &Path, today: &str) -> TableResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(export_name(today));
        let file = std::fs::File::create(&path)?;
        self.write_csv(std::io::BufWriter::new(file))?;
        tracing::info!(path = %path.display(), rows = self.len(), "Exported table");
        Ok(path)
    }
}

/// `<today>_sciscraper_<first four hex digits of a v4 uuid>.csv`
#[must_use]
pub fn export_name(today: &str) -> String {
    let tag = Uuid::new_v4().simple().to_string();
    format!("{today}_sciscraper_{}.csv", &tag[..4])
}

/// Values of one named column of a comma-separated file with a header row.
pub fn read_csv_column(path: &Path, column: &str) -> TableResult<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    let mut records = parse_csv(&text)?.into_iter();

    let header = records
        .next()
        .ok_or_else(|| TableError::MissingColumn(column.to_string()))?;
    let idx = header
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| TableError::MissingColumn(column.to_string()))?;

    Ok(records
        .filter_map(|record| record.into_iter().nth(idx))
        .collect())
}

/// Split delimited text into records. Quoted fields may hold commas,
/// doubled quotes and line breaks. Blank lines are skipped.
fn parse_csv(text: &str) -> TableResult<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                line += 1;
                finish_record(&mut records, &mut record, &mut field);
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(TableError::Malformed {
            line,
            reason: "unterminated quoted field".to_string(),
        });
    }
    finish_record(&mut records, &mut record, &mut field);
    Ok(records)
}

fn finish_record(records: &mut Vec<Vec<String>>, record: &mut Vec<String>, field: &mut String) {
    record.push(std::mem::take(field));
    let done = std::mem::take(record);
    if !(done.len() == 1 && done[0].is_empty()) {
        records.push(done);
    }
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

enum Coerced {
    Keep,
    Value(Value),
}

fn coerce(column: &str, value: &Value) -> Option<Coerced> {
    if value.is_null() {
        return None;
    }
    if column == DATE_COLUMN {
        return coerce_date(value);
    }
    if STRING_COLUMNS.contains(&column) {
        return Some(match value {
            Value::String(_) => Coerced::Keep,
            other => Coerced::Value(Value::String(render_cell(Some(other)))),
        });
    }
    if INTEGER_COLUMNS.contains(&column) {
        return coerce_integer(value);
    }
    if FLOAT_COLUMNS.contains(&column) {
        return coerce_float(value);
    }
    Some(Coerced::Keep)
}

fn coerce_integer(value: &Value) -> Option<Coerced> {
    let n = match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => return Some(Coerced::Keep),
        Value::Number(n) => n.as_f64().filter(|f| f.fract() == 0.0)?,
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.fract() == 0.0)?,
        _ => return None,
    };

    #[allow(clippy::cast_possible_truncation)]
    let n = n as i64;
    Some(Coerced::Value(Value::from(n)))
}

fn coerce_float(value: &Value) -> Option<Coerced> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Number::from_f64(f).map(|n| Coerced::Value(Value::Number(n)))
}

fn coerce_date(value: &Value) -> Option<Coerced> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    parse_date(&text).map(|date| Coerced::Value(Value::String(date.format("%Y-%m-%d").to_string())))
}

/// Full dates, year-month or a bare year; partial dates fall on the first.
fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d") {
        return Some(date);
    }
    text.parse::<i32>()
        .ok()
        .filter(|_| text.len() == 4)
        .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
}
