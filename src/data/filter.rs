use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use super::model::{MovieTable, Record};

// ---------------------------------------------------------------------------
// FilterSpec – the user's optional predicates
// ---------------------------------------------------------------------------

/// The set of optional predicates supplied by the presentation layer.
/// Absent predicates are no-ops; present ones are combined with logical AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Selected genres (case-insensitive membership).
    #[serde(default)]
    pub genres: Vec<String>,
    /// Selected directors.
    #[serde(default)]
    pub directors: Vec<String>,
    /// Selected stars.
    #[serde(default)]
    pub stars: Vec<String>,
    /// Keyword searched in title and synopsis (case-insensitive, OR across
    /// the two fields).
    #[serde(default)]
    pub keyword: Option<String>,
    /// Inclusive lower bound on the release year.
    #[serde(default)]
    pub year_from: Option<i64>,
    /// Inclusive upper bound on the release year.
    #[serde(default)]
    pub year_to: Option<i64>,
}

impl FilterSpec {
    /// Whether no predicate is active at all.
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
            && self.directors.is_empty()
            && self.stars.is_empty()
            && self.keyword.as_deref().map_or(true, |k| k.trim().is_empty())
            && self.year_from.is_none()
            && self.year_to.is_none()
    }

    /// Display key/value pairs for the report header.
    pub fn summary(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if !self.genres.is_empty() {
            out.push(("Genres".to_string(), self.genres.join(", ")));
        }
        if !self.directors.is_empty() {
            out.push(("Directors".to_string(), self.directors.join(", ")));
        }
        if !self.stars.is_empty() {
            out.push(("Stars".to_string(), self.stars.join(", ")));
        }
        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            out.push(("Keyword".to_string(), keyword.trim().to_string()));
        }
        match (self.year_from, self.year_to) {
            (Some(a), Some(b)) => out.push(("Years".to_string(), format!("{a} to {b}"))),
            (Some(a), None) => out.push(("Years".to_string(), format!("{a} and later"))),
            (None, Some(b)) => out.push(("Years".to_string(), format!("up to {b}"))),
            (None, None) => {}
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Filter application
// ---------------------------------------------------------------------------

/// Lower-cased selection set, or `None` when the predicate is inactive —
/// either because nothing was selected or because the table lacks the column
/// (an absent column disables the filter, it never raises).
fn active_set(selected: &[String], table: &MovieTable, column: &str) -> Option<BTreeSet<String>> {
    if selected.is_empty() {
        return None;
    }
    if !table.has_column(column) {
        debug!("filter on '{column}' disabled: column not present");
        return None;
    }
    Some(selected.iter().map(|s| s.trim().to_lowercase()).collect())
}

/// Case-insensitive membership over the comma-separated tokens of a cell,
/// so a multi-tag cell like `"Accion, Aventura"` matches either tag.
fn cell_matches(cell: &str, selected: &BTreeSet<String>) -> bool {
    cell.split(',')
        .any(|token| selected.contains(&token.trim().to_lowercase()))
}

/// Apply every active predicate as a conjunction, preserving row order.
/// An empty spec is the identity.
pub fn apply(table: &MovieTable, spec: &FilterSpec) -> MovieTable {
    let genres = active_set(&spec.genres, table, "genre");
    let directors = active_set(&spec.directors, table, "director");
    let stars = active_set(&spec.stars, table, "stars");

    let keyword = spec
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_lowercase);
    let keyword_fields: Vec<&str> = ["title", "synopsis"]
        .into_iter()
        .filter(|f| table.has_column(f))
        .collect();
    // No searchable text column → keyword predicate is unavailable.
    let keyword = if keyword_fields.is_empty() { None } else { keyword };

    let year_range = if table.has_column("year") {
        match (spec.year_from, spec.year_to) {
            (None, None) => None,
            (lo, hi) => Some((lo.unwrap_or(i64::MIN), hi.unwrap_or(i64::MAX))),
        }
    } else {
        None
    };

    let records: Vec<Record> = table
        .records
        .iter()
        .filter(|rec| {
            if let Some(selected) = &genres {
                if !rec.text("genre").is_some_and(|g| cell_matches(g, selected)) {
                    return false;
                }
            }
            if let Some(selected) = &directors {
                if !rec
                    .text("director")
                    .is_some_and(|d| cell_matches(d, selected))
                {
                    return false;
                }
            }
            if let Some(selected) = &stars {
                if !rec.text("stars").is_some_and(|s| cell_matches(s, selected)) {
                    return false;
                }
            }
            if let Some(needle) = &keyword {
                let hit = keyword_fields.iter().any(|field| {
                    rec.text(field)
                        .is_some_and(|text| text.to_lowercase().contains(needle))
                });
                if !hit {
                    return false;
                }
            }
            if let Some((lo, hi)) = year_range {
                // A row without a year is excluded once the range is active.
                match rec.number("year").map(|y| y as i64) {
                    Some(year) if (lo..=hi).contains(&year) => {}
                    _ => return false,
                }
            }
            true
        })
        .cloned()
        .collect();

    debug!("filter kept {} of {} rows", records.len(), table.len());
    MovieTable::from_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FieldValue;

    fn movie(title: &str, genre: &str, director: &str, year: i64, synopsis: &str) -> Record {
        Record::from_fields(
            [
                ("title", FieldValue::String(title.into())),
                ("genre", FieldValue::String(genre.into())),
                ("director", FieldValue::String(director.into())),
                ("year", FieldValue::Integer(year)),
                ("synopsis", FieldValue::String(synopsis.into())),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        )
    }

    fn sample() -> MovieTable {
        MovieTable::from_records(vec![
            movie("Heat", "Crime", "Michael Mann", 1995, "A heist crew in LA"),
            movie("Alien", "Horror, Sci-Fi", "Ridley Scott", 1979, "A crew in deep space"),
            movie("Clueless", "Comedy", "Amy Heckerling", 1995, "Beverly Hills matchmaking"),
        ])
    }

    #[test]
    fn empty_spec_is_identity() {
        let table = sample();
        let out = apply(&table, &FilterSpec::default());
        assert_eq!(out.records, table.records);
    }

    #[test]
    fn genre_membership_is_case_insensitive_and_token_aware() {
        let out = apply(
            &sample(),
            &FilterSpec {
                genres: vec!["sci-fi".into()],
                ..Default::default()
            },
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out.records[0].text("title"), Some("Alien"));
    }

    #[test]
    fn keyword_searches_title_or_synopsis() {
        let out = apply(
            &sample(),
            &FilterSpec {
                keyword: Some("CREW".into()),
                ..Default::default()
            },
        );
        let titles: Vec<_> = out.records.iter().map(|r| r.text("title").unwrap()).collect();
        assert_eq!(titles, ["Heat", "Alien"]);
    }

    #[test]
    fn predicates_combine_with_and() {
        let out = apply(
            &sample(),
            &FilterSpec {
                keyword: Some("crew".into()),
                year_from: Some(1990),
                ..Default::default()
            },
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out.records[0].text("title"), Some("Heat"));
    }

    #[test]
    fn year_range_is_inclusive_and_excludes_missing_years() {
        let mut rows = sample().records;
        rows.push(Record::from_fields(
            [("title".to_string(), FieldValue::String("Undated".into()))]
                .into_iter()
                .collect(),
        ));
        let table = MovieTable::from_records(rows);
        let out = apply(
            &table,
            &FilterSpec {
                year_from: Some(1979),
                year_to: Some(1995),
                ..Default::default()
            },
        );
        assert_eq!(out.len(), 3);
        assert!(out.records.iter().all(|r| r.get("year").is_some()));
    }

    #[test]
    fn filter_on_absent_column_is_disabled() {
        let table = MovieTable::from_records(vec![Record::from_fields(
            [("title".to_string(), FieldValue::String("Heat".into()))]
                .into_iter()
                .collect(),
        )]);
        let out = apply(
            &table,
            &FilterSpec {
                genres: vec!["Comedy".into()],
                ..Default::default()
            },
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn no_matching_category_yields_zero_rows() {
        let out = apply(
            &sample(),
            &FilterSpec {
                genres: vec!["Western".into()],
                ..Default::default()
            },
        );
        assert!(out.is_empty());
    }
}
