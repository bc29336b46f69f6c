use log::debug;

use crate::data::model::{FieldValue, MovieTable, Record};

// ---------------------------------------------------------------------------
// Ranking: ROI metric with baseline fallback
// ---------------------------------------------------------------------------

/// Default size of the ranked selection.
pub const DEFAULT_TOP_N: usize = 10;

/// Return on investment: (revenue - budget) / budget.
///
/// Undefined when either figure is missing or the budget is not strictly
/// positive — never a division fault.
pub fn roi(record: &Record) -> Option<f64> {
    let budget = record.number("budget")?;
    let revenue = record.number("revenue")?;
    if budget > 0.0 {
        Some((revenue - budget) / budget)
    } else {
        None
    }
}

/// The fallback-aware ranking signal: ROI when defined, else the baseline
/// `score` column, else 0.
pub fn ranking_score(record: &Record) -> f64 {
    roi(record)
        .or_else(|| record.number("score"))
        .unwrap_or(0.0)
}

/// Sort descending by the ranking signal and keep the best `top_n` rows.
///
/// The sort is stable, so rows with equal signal retain their input order.
/// Each surviving record gets an attached `roi` field (`Null` when the
/// metric is undefined) for the renderer and summary table.
pub fn rank(table: &MovieTable, top_n: usize) -> MovieTable {
    let mut rows: Vec<Record> = table
        .records
        .iter()
        .map(|rec| {
            let mut rec = rec.clone();
            let value = match roi(&rec) {
                Some(v) => FieldValue::Float(v),
                None => FieldValue::Null,
            };
            rec.fields.insert("roi".to_string(), value);
            rec
        })
        .collect();

    rows.sort_by(|a, b| ranking_score(b).total_cmp(&ranking_score(a)));
    rows.truncate(top_n);
    debug!("ranked table truncated to {} row(s)", rows.len());
    MovieTable::from_records(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, budget: Option<f64>, revenue: Option<f64>, score: Option<f64>) -> Record {
        let mut rec = Record::default();
        rec.fields.insert(
            "title".to_string(),
            FieldValue::String(title.to_string()),
        );
        if let Some(b) = budget {
            rec.fields.insert("budget".to_string(), FieldValue::Float(b));
        }
        if let Some(r) = revenue {
            rec.fields.insert("revenue".to_string(), FieldValue::Float(r));
        }
        if let Some(s) = score {
            rec.fields.insert("score".to_string(), FieldValue::Float(s));
        }
        rec
    }

    fn titles(table: &MovieTable) -> Vec<&str> {
        table
            .records
            .iter()
            .map(|r| r.text("title").unwrap())
            .collect()
    }

    #[test]
    fn zero_or_missing_budget_leaves_roi_undefined() {
        assert_eq!(roi(&movie("a", Some(100.0), Some(150.0), None)), Some(0.5));
        assert_eq!(roi(&movie("b", Some(0.0), Some(200.0), None)), None);
        assert_eq!(roi(&movie("c", None, Some(200.0), None)), None);
    }

    #[test]
    fn undefined_roi_falls_back_to_score_then_zero() {
        assert_eq!(ranking_score(&movie("a", Some(0.0), Some(1.0), Some(7.5))), 7.5);
        assert_eq!(ranking_score(&movie("b", None, None, None)), 0.0);
    }

    #[test]
    fn mixed_metrics_rank_by_the_fallback_policy() {
        // costs [100, 0, 50], returns [150, 200, 50]:
        // metrics [0.5, undefined → score 0.2, 0.0]
        let table = MovieTable::from_records(vec![
            movie("defined", Some(100.0), Some(150.0), None),
            movie("fallback", Some(0.0), Some(200.0), Some(0.2)),
            movie("flat", Some(50.0), Some(50.0), None),
        ]);
        let ranked = rank(&table, DEFAULT_TOP_N);
        assert_eq!(titles(&ranked), ["defined", "fallback", "flat"]);
        assert_eq!(ranked.records[0].number("roi"), Some(0.5));
        assert_eq!(ranked.records[1].get("roi"), None);
        assert_eq!(ranked.records[2].number("roi"), Some(0.0));
    }

    #[test]
    fn equal_signals_keep_input_order() {
        let table = MovieTable::from_records(vec![
            movie("first", Some(100.0), Some(200.0), None),
            movie("second", Some(10.0), Some(20.0), None),
            movie("third", Some(1.0), Some(3.0), None),
        ]);
        let ranked = rank(&table, DEFAULT_TOP_N);
        // third has ROI 2.0; first and second tie at 1.0 in input order
        assert_eq!(titles(&ranked), ["third", "first", "second"]);
    }

    #[test]
    fn truncates_to_top_n() {
        let table = MovieTable::from_records(
            (0..25)
                .map(|i| movie(&format!("m{i}"), Some(100.0), Some(100.0 + i as f64), None))
                .collect(),
        );
        let ranked = rank(&table, 10);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked.records[0].text("title"), Some("m24"));
    }
}
