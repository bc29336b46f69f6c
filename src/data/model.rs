use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// FieldValue – a single cell of the source table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value. Source spreadsheets declare no schema, so
/// every field is carried as whichever of these shapes it parsed into.
/// Using `BTreeMap` / `BTreeSet` downstream so `FieldValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put FieldValue in BTreeSet --

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use FieldValue::*;
        fn discriminant(v: &FieldValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v:.2}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Null => write!(f, "<null>"),
        }
    }
}

impl FieldValue {
    /// Try to interpret the value as an `f64` for metrics and range filters.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Borrow the value as text, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// A single film (one row of the source table). Fields are accessed through
/// the optional-returning helpers; a missing key and an explicit
/// [`FieldValue::Null`] are both "missing" to every consumer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// Dynamic columns: field_name → value.
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn from_fields(fields: BTreeMap<String, FieldValue>) -> Self {
        Record { fields }
    }

    /// Non-null value of a field, if present.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    /// Text content of a field, if present and textual.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    /// Numeric content of a field, if present and numeric.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_f64)
    }

    /// Display form of a field, if present.
    pub fn display(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| v.to_string())
    }
}

// ---------------------------------------------------------------------------
// MovieTable – the complete loaded table
// ---------------------------------------------------------------------------

/// The full table with a pre-computed column index.
///
/// `columns` and `unique_values` form the capability descriptor: they are
/// computed once when the table is built, and the filter, ranking, and
/// rendering steps consult them instead of re-probing every row for which
/// optional columns exist.
#[derive(Debug, Clone, Default)]
pub struct MovieTable {
    /// All films (rows), in source order.
    pub records: Vec<Record>,
    /// Ordered list of column names present in at least one row.
    pub columns: Vec<String>,
    /// For each column the sorted set of unique non-null values. Drives the
    /// selector population of the presentation layer.
    pub unique_values: BTreeMap<String, BTreeSet<FieldValue>>,
}

impl MovieTable {
    /// Build the column index from the given rows.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut column_set: BTreeSet<String> = BTreeSet::new();
        let mut unique_values: BTreeMap<String, BTreeSet<FieldValue>> = BTreeMap::new();

        for rec in &records {
            for (col, val) in &rec.fields {
                column_set.insert(col.clone());
                if !val.is_null() {
                    unique_values
                        .entry(col.clone())
                        .or_default()
                        .insert(val.clone());
                }
            }
        }
        let columns: Vec<String> = column_set.into_iter().collect();
        MovieTable {
            records,
            columns,
            unique_values,
        }
    }

    /// Number of films.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any row carries the given column.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, FieldValue)]) -> Record {
        Record::from_fields(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn null_and_missing_fields_are_both_absent() {
        let rec = record(&[
            ("title", FieldValue::String("Alien".into())),
            ("budget", FieldValue::Null),
        ]);
        assert_eq!(rec.text("title"), Some("Alien"));
        assert_eq!(rec.get("budget"), None);
        assert_eq!(rec.get("revenue"), None);
    }

    #[test]
    fn as_f64_covers_both_numeric_shapes() {
        assert_eq!(FieldValue::Integer(7).as_f64(), Some(7.0));
        assert_eq!(FieldValue::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(FieldValue::String("7".into()).as_f64(), None);
    }

    #[test]
    fn table_index_tracks_columns_and_unique_values() {
        let table = MovieTable::from_records(vec![
            record(&[
                ("genre", FieldValue::String("Drama".into())),
                ("year", FieldValue::Integer(1999)),
            ]),
            record(&[
                ("genre", FieldValue::String("Comedy".into())),
                ("score", FieldValue::Null),
            ]),
        ]);
        assert!(table.has_column("genre"));
        assert!(table.has_column("score"));
        assert!(!table.has_column("director"));
        assert_eq!(table.unique_values["genre"].len(), 2);
        // all-null columns contribute no unique values
        assert!(!table.unique_values.contains_key("score"));
    }
}
