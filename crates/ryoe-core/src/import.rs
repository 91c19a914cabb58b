// CSV to SQLite import with best-effort numeric type inference.
//
// Each column becomes INTEGER, REAL or TEXT depending on how many of its
// non-null values parse as numbers. The target table is replaced.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Cell values treated as NULL: the usual spreadsheet and dataframe
/// missing-value markers.
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Share of non-null values that must parse as numbers before a mixed
/// column is stored as REAL.
pub const NUMERIC_SUCCESS_RATE: f64 = 0.95;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV not found: {path}")]
    CsvNotFound { path: PathBuf },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("CSV {path} has no header row")]
    NoHeader { path: PathBuf },

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// SQLite storage class chosen for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    fn sql(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// What an import wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub table: String,
    pub rows: usize,
    pub columns: Vec<(String, ColumnType)>,
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

struct Table {
    headers: Vec<String>,
    /// Column-major cells; `None` is NULL.
    columns: Vec<Vec<Option<String>>>,
    rows: usize,
}

fn is_na(cell: &str) -> bool {
    NA_VALUES.contains(&cell)
}

/// Rename repeated headers to `name.1`, `name.2`, ...
fn dedupe_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(raw.len());
    for name in raw {
        let count = seen.entry(name.clone()).or_insert(0);
        if *count == 0 {
            out.push(name.clone());
        } else {
            out.push(format!("{name}.{count}"));
        }
        *count += 1;
    }
    out
}

fn read_table<R: Read>(rdr: R) -> Result<Option<Table>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(rdr);

    let raw_headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if raw_headers.is_empty() {
        return Ok(None);
    }
    let headers = dedupe_headers(&raw_headers);
    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    let mut rows = 0;

    for result in reader.records() {
        let record = result?;
        for (idx, column) in columns.iter_mut().enumerate() {
            let cell = record.get(idx).filter(|c| !is_na(c)).map(str::to_string);
            column.push(cell);
        }
        rows += 1;
    }

    Ok(Some(Table {
        headers,
        columns,
        rows,
    }))
}

// ---------------------------------------------------------------------------
// Type inference
// ---------------------------------------------------------------------------

/// Pick a storage class for one column.
///
/// All non-null values whole numbers (`300` or `300.0`): INTEGER. All
/// finite floats: REAL. At least [`NUMERIC_SUCCESS_RATE`] of them finite
/// floats: REAL, with the rest stored as NULL. Otherwise TEXT. A column with
/// no values at all is REAL.
pub fn infer_column_type(cells: &[Option<String>]) -> ColumnType {
    let values: Vec<&str> = cells.iter().flatten().map(|s| s.trim()).collect();
    if values.is_empty() {
        return ColumnType::Real;
    }
    if values.iter().all(|v| parse_integral(v).is_some()) {
        return ColumnType::Integer;
    }
    let numeric = values.iter().filter(|v| parse_real(v).is_some()).count();
    let rate = numeric as f64 / values.len() as f64;
    if rate >= NUMERIC_SUCCESS_RATE {
        ColumnType::Real
    } else {
        ColumnType::Text
    }
}

fn parse_real(v: &str) -> Option<f64> {
    v.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// An integer literal, or a finite float with no fractional part that fits
/// in an `i64`.
fn parse_integral(v: &str) -> Option<i64> {
    v.parse::<i64>().ok().or_else(|| {
        parse_real(v)
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn to_value(cell: Option<&String>, ty: ColumnType) -> Value {
    let Some(raw) = cell else {
        return Value::Null;
    };
    match ty {
        ColumnType::Integer => parse_integral(raw.trim())
            .map(Value::Integer)
            .unwrap_or(Value::Null),
        ColumnType::Real => parse_real(raw.trim()).map(Value::Real).unwrap_or(Value::Null),
        ColumnType::Text => Value::Text(raw.clone()),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn write_table(conn: &mut Connection, name: &str, table: &Table) -> Result<Vec<ColumnType>, rusqlite::Error> {
    let types: Vec<ColumnType> = table.columns.iter().map(|c| infer_column_type(c)).collect();

    let column_defs: Vec<String> = table
        .headers
        .iter()
        .zip(&types)
        .map(|(h, t)| format!("{} {}", quote_ident(h), t.sql()))
        .collect();
    let placeholders: Vec<String> = (1..=table.headers.len()).map(|i| format!("?{i}")).collect();
    let ident = quote_ident(name);

    let tx = conn.transaction()?;
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {ident};
         CREATE TABLE {ident} ({});",
        column_defs.join(", ")
    ))?;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {ident} VALUES ({})",
            placeholders.join(", ")
        ))?;
        for row in 0..table.rows {
            let values = table
                .columns
                .iter()
                .zip(&types)
                .map(|(column, ty)| to_value(column[row].as_ref(), *ty));
            stmt.execute(params_from_iter(values))?;
        }
    }
    tx.commit()?;
    Ok(types)
}

/// Import `csv_path` into `table` of the SQLite database at `db_path`,
/// replacing any existing table of that name. Parent directories of the
/// database are created as needed.
pub fn import_csv(csv_path: &Path, db_path: &Path, table: &str) -> Result<ImportSummary, ImportError> {
    if !csv_path.exists() {
        return Err(ImportError::CsvNotFound {
            path: csv_path.to_path_buf(),
        });
    }
    let file = File::open(csv_path).map_err(|e| ImportError::Io {
        path: csv_path.to_path_buf(),
        source: e,
    })?;
    let parsed = read_table(file)
        .map_err(|e| ImportError::Csv {
            path: csv_path.to_path_buf(),
            source: e,
        })?
        .ok_or_else(|| ImportError::NoHeader {
            path: csv_path.to_path_buf(),
        })?;
    debug!(
        columns = parsed.headers.len(),
        rows = parsed.rows,
        "read {}",
        csv_path.display()
    );

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ImportError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut conn = Connection::open(db_path)?;
    let summary = import_into(&mut conn, &parsed, table)?;
    info!(
        rows = summary.rows,
        "imported {} -> {}:{}",
        csv_path.display(),
        db_path.display(),
        table
    );
    Ok(summary)
}

fn import_into(conn: &mut Connection, parsed: &Table, table: &str) -> Result<ImportSummary, rusqlite::Error> {
    let types = write_table(conn, table, parsed)?;
    Ok(ImportSummary {
        table: table.to_string(),
        rows: parsed.rows,
        columns: parsed.headers.iter().cloned().zip(types).collect(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
