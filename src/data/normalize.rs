use std::collections::{BTreeMap, HashSet};

use log::{debug, info};

use super::model::{FieldValue, MovieTable, Record};

// ---------------------------------------------------------------------------
// Canonical column policy
// ---------------------------------------------------------------------------

/// Alias table from mechanically-cleaned header names (lower-case,
/// `_`-separated) to the canonical vocabulary. The source spreadsheets mix
/// Spanish and English headers with inconsistent casing.
const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("titulo", "title"),
    ("título", "title"),
    ("año", "year"),
    ("anio", "year"),
    ("genero", "genre"),
    ("género", "genre"),
    ("genres", "genre"),
    ("directores", "director"),
    ("estrellas", "stars"),
    ("actores", "stars"),
    ("cast", "stars"),
    ("overview", "synopsis"),
    ("sinopsis", "synopsis"),
    ("puntuacion", "score"),
    ("puntuación", "score"),
    ("rating", "score"),
    ("presupuesto", "budget"),
    ("ingresos", "revenue"),
    ("duracion", "runtime"),
    ("duración", "runtime"),
    ("poster", "poster_url"),
];

/// Columns coerced with convert-or-null semantics.
const NUMERIC_COLUMNS: &[&str] = &["year", "budget", "revenue", "score", "runtime"];

/// Numeric columns stored as integers.
const INTEGER_COLUMNS: &[&str] = &["year", "runtime"];

/// Category-tag columns: brace/bracket wrappers stripped, tokens title-cased.
const TAG_COLUMNS: &[&str] = &["genre"];

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Drop repeated rows on the (title, director, year) composite key,
    /// keeping the first occurrence.
    pub drop_duplicates: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions {
            drop_duplicates: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization pass
// ---------------------------------------------------------------------------

/// Produce a cleaned copy of the table:
///
/// * column names trimmed, BOM-stripped, canonicalized to lower-case
///   snake_case through the alias table;
/// * numeric columns coerced, non-parseable values becoming `Null` rather
///   than failing the batch;
/// * category tag fields stripped of enclosing braces/brackets and
///   title-cased;
/// * optionally, duplicate rows removed.
///
/// The input is left untouched; a column the caller hoped for may simply be
/// absent from the result, which downstream steps treat as "filter
/// unavailable".
pub fn normalize(table: &MovieTable, opts: &NormalizeOptions) -> MovieTable {
    let mut records: Vec<Record> = table
        .records
        .iter()
        .map(normalize_record)
        .collect();

    if opts.drop_duplicates {
        let before = records.len();
        records = drop_duplicates(records);
        if records.len() < before {
            info!("dropped {} duplicate row(s)", before - records.len());
        }
    }

    MovieTable::from_records(records)
}

fn normalize_record(record: &Record) -> Record {
    let mut fields = BTreeMap::new();
    for (raw_name, value) in &record.fields {
        let name = canonical_column_name(raw_name);
        if name.is_empty() {
            continue;
        }
        let value = normalize_value(&name, value);
        // Two raw headers can collapse onto one canonical name; first wins.
        fields.entry(name).or_insert(value);
    }
    Record::from_fields(fields)
}

/// Canonical form of a header: strip BOM and whitespace, lower-case,
/// separators to `_`, then alias lookup.
pub fn canonical_column_name(raw: &str) -> String {
    let cleaned = raw
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace([' ', '-'], "_");
    for (alias, canonical) in COLUMN_ALIASES {
        if cleaned == *alias {
            return canonical.to_string();
        }
    }
    cleaned
}

fn normalize_value(column: &str, value: &FieldValue) -> FieldValue {
    if NUMERIC_COLUMNS.contains(&column) {
        return coerce_numeric(value, INTEGER_COLUMNS.contains(&column));
    }
    if TAG_COLUMNS.contains(&column) {
        return clean_tags(value);
    }
    match value {
        FieldValue::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                FieldValue::Null
            } else {
                FieldValue::String(s.to_string())
            }
        }
        other => other.clone(),
    }
}

/// Convert-or-null numeric coercion.
fn coerce_numeric(value: &FieldValue, integer: bool) -> FieldValue {
    let parsed = match value {
        FieldValue::Integer(i) => Some(*i as f64),
        FieldValue::Float(f) => Some(*f),
        FieldValue::String(s) => parse_number(s),
        _ => None,
    };
    match parsed {
        Some(v) if integer => FieldValue::Integer(v.round() as i64),
        Some(v) => FieldValue::Float(v),
        None => FieldValue::Null,
    }
}

/// Forgiving number parsing for spreadsheet exports: trims, rejects values
/// containing letters, strips thousands separators.
fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace([',', '$'], "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Strip `{}` / `[]` / quote wrappers from a tag cell and title-case each
/// comma-separated token: `"{accion, AVENTURA}"` → `"Accion, Aventura"`.
fn clean_tags(value: &FieldValue) -> FieldValue {
    let FieldValue::String(s) = value else {
        return value.clone();
    };
    let stripped: String = s
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | '[' | ']' | '"'))
        .collect();
    let tokens: Vec<String> = stripped
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(title_case)
        .collect();
    if tokens.is_empty() {
        FieldValue::Null
    } else {
        FieldValue::String(tokens.join(", "))
    }
}

fn title_case(token: &str) -> String {
    token
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Duplicate elimination
// ---------------------------------------------------------------------------

/// Remove exact repeats on (title, director, year), preserving the first
/// occurrence. Missing key parts participate as empty / missing values, so
/// rows without the key columns are still comparable.
fn drop_duplicates(records: Vec<Record>) -> Vec<Record> {
    let mut seen: HashSet<(String, String, Option<i64>)> = HashSet::new();
    records
        .into_iter()
        .filter(|rec| {
            let key = (
                rec.text("title").unwrap_or("").to_lowercase(),
                rec.text("director").unwrap_or("").to_lowercase(),
                rec.number("year").map(|y| y as i64),
            );
            let fresh = seen.insert(key);
            if !fresh {
                debug!(
                    "duplicate row dropped: {}",
                    rec.text("title").unwrap_or("<untitled>")
                );
            }
            fresh
        })
        .collect()
}
