//! Report rendering: the ranked table becomes a paginated PDF with one
//! detail block per film (text fields, a budget/revenue/ROI bar chart, an
//! optionally downloaded poster) and a trailing summary table.
//!
//! Chart PNGs live in a per-invocation temporary directory that is removed
//! on every exit path, so concurrent report generations cannot race on
//! scratch files.

pub mod chart;
pub mod fetch;
pub mod pdf;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use num_format::{Locale, ToFormattedString};

use crate::data::filter::FilterSpec;
use crate::data::model::{MovieTable, Record};
use crate::rank;
use fetch::PosterFetcher;
use pdf::PdfWriter;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Where the finished PDF is written.
    pub output: PathBuf,
    /// Attempt to download per-film posters.
    pub fetch_posters: bool,
    /// Per-poster request timeout.
    pub poster_timeout: Duration,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            output: PathBuf::from("movie_report.pdf"),
            fetch_posters: true,
            poster_timeout: fetch::POSTER_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// Report generation
// ---------------------------------------------------------------------------

const CHART_WIDTH_MM: f64 = 110.0;
const POSTER_WIDTH_MM: f64 = 60.0;

/// Render the (already filtered and ranked) table into a PDF and return the
/// output path. Poster and chart failures degrade to omitted blocks; the
/// document itself is always written.
pub fn generate_report(
    table: &MovieTable,
    filters: &FilterSpec,
    opts: &ReportOptions,
) -> Result<PathBuf> {
    let scratch = tempfile::tempdir().context("creating chart scratch directory")?;
    let mut writer = PdfWriter::new("Movie Report")?;

    writer.heading("Movie Report - Top Picks", 20.0);
    writer.spacer(2.0);
    let summary = filters.summary();
    if summary.is_empty() {
        writer.line("No filters applied.", 10.0, false, 0.0);
    } else {
        writer.line("Applied filters", 12.0, true, 0.0);
        for (name, value) in &summary {
            writer.line(&format!("{name}: {value}"), 10.0, false, 4.0);
        }
    }
    writer.spacer(6.0);

    if table.is_empty() {
        writer.line(
            "No movies matched the selected filters.",
            12.0,
            false,
            0.0,
        );
        writer.line(
            "Relax a filter or widen the year range and try again.",
            10.0,
            false,
            0.0,
        );
    } else {
        let fetcher = build_fetcher(table, opts);
        for (index, record) in table.records.iter().enumerate() {
            render_movie_block(&mut writer, scratch.path(), index, record, fetcher.as_ref())?;
            writer.break_page();
        }
        render_summary_table(&mut writer, table);
    }

    writer.save(&opts.output)?;
    info!(
        "report with {} film(s) written to {}",
        table.len(),
        opts.output.display()
    );
    Ok(opts.output.clone())
}

/// A fetcher only exists when posters are wanted and the table can supply
/// URLs; a client that fails to build just disables posters.
fn build_fetcher(table: &MovieTable, opts: &ReportOptions) -> Option<PosterFetcher> {
    if !opts.fetch_posters || !table.has_column("poster_url") {
        return None;
    }
    match PosterFetcher::new(opts.poster_timeout) {
        Ok(f) => Some(f),
        Err(e) => {
            warn!("poster downloads disabled: {e}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Per-film detail block
// ---------------------------------------------------------------------------

fn render_movie_block(
    writer: &mut PdfWriter,
    scratch: &Path,
    index: usize,
    record: &Record,
    fetcher: Option<&PosterFetcher>,
) -> Result<()> {
    let title = record.text("title").unwrap_or("Untitled");
    writer.heading(&format!("{}. {title}", index + 1), 14.0);
    writer.spacer(1.0);

    for (label, field) in [
        ("Director", "director"),
        ("Year", "year"),
        ("Score", "score"),
        ("Genre", "genre"),
        ("Stars", "stars"),
    ] {
        if let Some(value) = record.display(field) {
            writer.line(&format!("{label}: {value}"), 10.0, false, 0.0);
        }
    }
    if let Some(runtime) = record.number("runtime") {
        writer.line(&format!("Runtime: {runtime:.0} min"), 10.0, false, 0.0);
    }
    writer.spacer(3.0);

    let budget = record.number("budget");
    let revenue = record.number("revenue");
    let roi = record.number("roi").or_else(|| rank::roi(record));

    if budget.is_some() || revenue.is_some() {
        if let Some(b) = budget {
            writer.line(&format!("Budget: {}", format_currency(b)), 10.0, false, 0.0);
        }
        if let Some(r) = revenue {
            writer.line(&format!("Revenue: {}", format_currency(r)), 10.0, false, 0.0);
        }
        match roi {
            Some(v) => writer.line(&format!("ROI: {}", format_roi_pct(v)), 10.0, true, 0.0),
            None => writer.line(
                "ROI unavailable: missing budget or revenue data",
                10.0,
                false,
                0.0,
            ),
        }
        writer.spacer(3.0);

        // Chart failures (e.g. no usable system font) cost only the block.
        let mut bars = vec![
            ("Budget".to_string(), budget.unwrap_or(0.0)),
            ("Revenue".to_string(), revenue.unwrap_or(0.0)),
        ];
        if let Some(v) = roi {
            bars.push(("ROI %".to_string(), v * 100.0));
        }
        match chart::render_bar_chart(scratch, index, "Budget vs Revenue", &bars)
            .and_then(|path| image::open(&path).context("reading chart PNG"))
        {
            Ok(img) => writer.image(&img.to_rgb8(), CHART_WIDTH_MM)?,
            Err(e) => warn!("chart omitted for '{title}': {e}"),
        }
    }

    if let Some(poster) = poster_for(record, fetcher) {
        writer.image(&poster.to_rgb8(), POSTER_WIDTH_MM)?;
    }

    if let Some(synopsis) = record.text("synopsis") {
        writer.spacer(2.0);
        writer.line("Synopsis", 11.0, true, 0.0);
        writer.paragraph(synopsis, 10.0);
    }
    Ok(())
}

fn poster_for(record: &Record, fetcher: Option<&PosterFetcher>) -> Option<image::DynamicImage> {
    let url = record.text("poster_url")?;
    fetcher?.fetch(url)
}

// ---------------------------------------------------------------------------
// Trailing summary table
// ---------------------------------------------------------------------------

const SUMMARY_COLUMNS: [(f64, &str); 5] = [
    (0.0, "Title"),
    (92.0, "Year"),
    (110.0, "Genre"),
    (150.0, "Score"),
    (165.0, "ROI"),
];

fn render_summary_table(writer: &mut PdfWriter, table: &MovieTable) {
    writer.heading("Summary", 14.0);
    writer.spacer(2.0);
    summary_header(writer);

    for record in &table.records {
        let cells: Vec<(f64, String)> = vec![
            (
                SUMMARY_COLUMNS[0].0,
                truncate(record.text("title").unwrap_or("Untitled"), 52),
            ),
            (
                SUMMARY_COLUMNS[1].0,
                record.display("year").unwrap_or_else(|| "-".into()),
            ),
            (
                SUMMARY_COLUMNS[2].0,
                truncate(record.text("genre").unwrap_or("-"), 22),
            ),
            (
                SUMMARY_COLUMNS[3].0,
                record.display("score").unwrap_or_else(|| "-".into()),
            ),
            (
                SUMMARY_COLUMNS[4].0,
                record
                    .number("roi")
                    .map(format_roi_pct)
                    .unwrap_or_else(|| "n/a".into()),
            ),
        ];
        if writer.ensure_space(8.0) {
            summary_header(writer);
        }
        writer.row(&cells, 9.0, false);
    }
}

fn summary_header(writer: &mut PdfWriter) {
    let cells: Vec<(f64, String)> = SUMMARY_COLUMNS
        .iter()
        .map(|(offset, name)| (*offset, name.to_string()))
        .collect();
    writer.row(&cells, 9.0, true);
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

/// Whole-dollar amounts with thousands separators: `1234567.0` → `"$1,234,567"`.
pub(crate) fn format_currency(v: f64) -> String {
    let negative = v < 0.0;
    let amount = (v.abs().round() as i64).to_formatted_string(&Locale::en);
    if negative {
        format!("-${amount}")
    } else {
        format!("${amount}")
    }
}

/// ROI ratio as a percentage: `0.5` → `"50.0%"`.
pub(crate) fn format_roi_pct(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_gets_separators_and_sign() {
        assert_eq!(format_currency(1_234_567.4), "$1,234,567");
        assert_eq!(format_currency(-2_500.0), "-$2,500");
        assert_eq!(format_currency(0.0), "$0");
    }

    #[test]
    fn roi_reads_as_a_percentage() {
        assert_eq!(format_roi_pct(0.5), "50.0%");
        assert_eq!(format_roi_pct(-0.25), "-25.0%");
    }

    #[test]
    fn truncation_marks_the_cut() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long movie title", 10), "a very ...");
    }
}
