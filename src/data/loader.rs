use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use calamine::{open_workbook_auto, Data, Reader};
use log::{debug, info, warn};
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{FieldValue, MovieTable, Record};

/// Timeout for downloading a remote source file.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures while reading a source file. Individual bad cells never end up
/// here; they degrade to [`FieldValue::Null`] instead.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("workbook contains no sheets")]
    EmptyWorkbook,
    #[error("expected a top-level JSON array of records")]
    NotARecordArray,
    #[error("reading file: {0}")]
    Io(#[from] std::io::Error),
    #[error("reading spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("reading CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("parsing JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("downloading source: {0}")]
    Download(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load from a local path or an `http(s)://` URL. Remote sources are
/// downloaded once into a temporary file and then parsed like any local one.
pub fn load_source(source: &str) -> Result<MovieTable, LoadError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        load_remote(source)
    } else {
        load_table(Path::new(source))
    }
}

fn load_remote(url: &str) -> Result<MovieTable, LoadError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()?;
    let bytes = client.get(url).send()?.error_for_status()?.bytes()?;
    info!("downloaded {} byte(s) from {url}", bytes.len());

    // keep the URL's extension so format dispatch still works
    let mut tmp = tempfile::Builder::new()
        .suffix(&remote_suffix(url))
        .tempfile()?;
    tmp.write_all(&bytes)?;
    load_table(tmp.path())
}

/// `".<ext>"` of a URL's last path segment, query string ignored.
fn remote_suffix(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|base| base.rsplit('/').next())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| format!(".{ext}"))
        .unwrap_or_default()
}

/// Load a movie table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xls` / `.xlsm` / `.xlsb` / `.ods` – first worksheet, header row
/// * `.csv`  – header row with column names
/// * `.json` – records-oriented array: `[{ "title": ..., ... }, ...]`
///
/// Header names are delivered exactly as found in the file; canonicalization
/// is the normalizer's job.
pub fn load_table(path: &Path) -> Result<MovieTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => load_spreadsheet(path),
        "csv" => load_csv(path),
        "json" => load_json(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Excel-family loader
// ---------------------------------------------------------------------------

fn load_spreadsheet(path: &Path) -> Result<MovieTable, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadError::EmptyWorkbook)?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_to_header).collect(),
        None => {
            warn!("sheet '{sheet}' is empty");
            return Ok(MovieTable::default());
        }
    };
    debug!("sheet '{sheet}': {} columns", headers.len());

    let mut records = Vec::new();
    for row in rows {
        let mut fields = BTreeMap::new();
        for (idx, cell) in row.iter().enumerate() {
            let Some(name) = headers.get(idx) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            fields.entry(name.clone()).or_insert_with(|| cell_to_value(cell));
        }
        records.push(Record::from_fields(fields));
    }
    Ok(MovieTable::from_records(records))
}

fn cell_to_header(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_to_value(cell: &Data) -> FieldValue {
    match cell {
        Data::Empty => FieldValue::Null,
        Data::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                FieldValue::Null
            } else {
                FieldValue::String(s.to_string())
            }
        }
        Data::Int(i) => FieldValue::Integer(*i),
        Data::Float(f) => FieldValue::Float(*f),
        Data::Bool(b) => FieldValue::Bool(*b),
        Data::Error(_) => FieldValue::Null,
        // Dates and durations are kept as their textual form.
        other => FieldValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<MovieTable, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping malformed CSV row {row_no}: {e}");
                continue;
            }
        };
        let mut fields = BTreeMap::new();
        for (idx, raw) in row.iter().enumerate() {
            let Some(name) = headers.get(idx) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            fields
                .entry(name.clone())
                .or_insert_with(|| guess_value(raw));
        }
        records.push(Record::from_fields(fields));
    }
    Ok(MovieTable::from_records(records))
}

/// Best-effort typing of a raw CSV cell.
fn guess_value(s: &str) -> FieldValue {
    let s = s.trim();
    if s.is_empty() {
        return FieldValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return FieldValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return FieldValue::Float(f);
    }
    if s == "true" || s == "false" {
        return FieldValue::Bool(s == "true");
    }
    FieldValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "title": "Alien", "year": 1979, "genre": "Horror", ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<MovieTable, LoadError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root.as_array().ok_or(LoadError::NotARecordArray)?;

    let mut records = Vec::with_capacity(rows.len());
    for (row_no, row) in rows.iter().enumerate() {
        let Some(obj) = row.as_object() else {
            warn!("skipping JSON row {row_no}: not an object");
            continue;
        };
        let fields = obj
            .iter()
            .map(|(key, val)| (key.clone(), json_to_value(val)))
            .collect();
        records.push(Record::from_fields(fields));
    }
    Ok(MovieTable::from_records(records))
}

fn json_to_value(val: &JsonValue) -> FieldValue {
    match val {
        JsonValue::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                FieldValue::Null
            } else {
                FieldValue::String(s.to_string())
            }
        }
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                FieldValue::Float(f)
            } else {
                FieldValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => FieldValue::Bool(*b),
        JsonValue::Null => FieldValue::Null,
        other => FieldValue::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn remote_suffix_keeps_the_extension_and_drops_the_query() {
        assert_eq!(remote_suffix("https://host/data/movies.xlsx?dl=1"), ".xlsx");
        assert_eq!(remote_suffix("http://host/movies.csv"), ".csv");
        assert_eq!(remote_suffix("http://host/movies"), "");
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_table(Path::new("movies.parquet")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "parquet"));
    }

    #[test]
    fn csv_cells_are_typed_best_effort() {
        assert_eq!(guess_value("1994"), FieldValue::Integer(1994));
        assert_eq!(guess_value("7.8"), FieldValue::Float(7.8));
        assert_eq!(guess_value("  "), FieldValue::Null);
        assert_eq!(guess_value("Alien"), FieldValue::String("Alien".into()));
    }

    #[test]
    fn csv_round_trips_headers_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "titulo,Año,genero").unwrap();
        writeln!(f, "Alien,1979,Horror").unwrap();
        drop(f);

        let table = load_table(&path).unwrap();
        assert_eq!(table.len(), 1);
        // raw header names survive the load step verbatim
        assert!(table.has_column("titulo"));
        assert!(table.has_column("Año"));
        assert_eq!(table.records[0].number("Año"), Some(1979.0));
    }

    #[test]
    fn json_records_become_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.json");
        std::fs::write(
            &path,
            r#"[{"title": "Alien", "year": 1979, "score": 8.5, "poster_url": null}]"#,
        )
        .unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].number("score"), Some(8.5));
        assert_eq!(table.records[0].get("poster_url"), None);
    }
}
