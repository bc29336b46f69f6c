use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tabled::{Table, Tabled};

use cinerank::data::filter::{self, FilterSpec};
use cinerank::data::loader;
use cinerank::data::model::MovieTable;
use cinerank::data::normalize::{normalize, NormalizeOptions};
use cinerank::rank;
use cinerank::report::{generate_report, ReportOptions};

// ---------------------------------------------------------------------------
// CLI – the presentation layer of the pipeline
// ---------------------------------------------------------------------------

/// Filter, rank and report movies from a spreadsheet.
#[derive(Debug, Parser)]
#[command(name = "cinerank", version)]
struct Cli {
    /// Path or URL of the movie data (.xlsx, .xls, .ods, .csv or .json)
    data: String,

    /// Keep only these genres (repeatable)
    #[arg(long = "genre")]
    genres: Vec<String>,

    /// Keep only these directors (repeatable)
    #[arg(long = "director")]
    directors: Vec<String>,

    /// Keep only films featuring these stars (repeatable)
    #[arg(long = "star")]
    stars: Vec<String>,

    /// Keyword searched in title and synopsis
    #[arg(long)]
    keyword: Option<String>,

    /// Inclusive lower bound on the release year
    #[arg(long)]
    year_from: Option<i64>,

    /// Inclusive upper bound on the release year
    #[arg(long)]
    year_to: Option<i64>,

    /// Load a saved FilterSpec (JSON); command-line filters are added on top
    #[arg(long, value_name = "FILE")]
    filters: Option<PathBuf>,

    /// Number of top-ranked films in the report
    #[arg(long, default_value_t = rank::DEFAULT_TOP_N)]
    top: usize,

    /// Output path of the PDF report
    #[arg(long, default_value = "movie_report.pdf")]
    output: PathBuf,

    /// Keep duplicate rows instead of dropping them on (title, director, year)
    #[arg(long)]
    keep_duplicates: bool,

    /// Do not download poster images
    #[arg(long)]
    skip_posters: bool,

    /// Print the distinct values of a column and exit
    #[arg(long, value_name = "COLUMN")]
    list: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let raw = loader::load_source(&cli.data)
        .with_context(|| format!("loading {}", cli.data))?;
    info!("loaded {} row(s) from {}", raw.len(), cli.data);

    let table = normalize(
        &raw,
        &NormalizeOptions {
            drop_duplicates: !cli.keep_duplicates,
        },
    );

    if let Some(column) = &cli.list {
        list_column(&table, column);
        return Ok(());
    }

    let spec = build_spec(&cli)?;
    let filtered = filter::apply(&table, &spec);
    let ranked = rank::rank(&filtered, cli.top);

    if ranked.is_empty() {
        println!("No movies matched the selected filters.");
    } else {
        println!("{}", Table::new(preview_rows(&ranked)));
    }

    let path = generate_report(
        &ranked,
        &spec,
        &ReportOptions {
            output: cli.output.clone(),
            fetch_posters: !cli.skip_posters,
            ..Default::default()
        },
    )?;
    println!("Report written to {}", path.display());
    Ok(())
}

/// Start from the optional saved spec and layer the flag filters on top.
fn build_spec(cli: &Cli) -> Result<FilterSpec> {
    let mut spec = match &cli.filters {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading filter file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing filter file {}", path.display()))?
        }
        None => FilterSpec::default(),
    };
    spec.genres.extend(cli.genres.iter().cloned());
    spec.directors.extend(cli.directors.iter().cloned());
    spec.stars.extend(cli.stars.iter().cloned());
    if cli.keyword.is_some() {
        spec.keyword = cli.keyword.clone();
    }
    if cli.year_from.is_some() {
        spec.year_from = cli.year_from;
    }
    if cli.year_to.is_some() {
        spec.year_to = cli.year_to;
    }
    Ok(spec)
}

fn list_column(table: &MovieTable, column: &str) {
    match table.unique_values.get(column) {
        Some(values) => {
            for value in values {
                println!("{value}");
            }
        }
        None => println!("No column '{column}' in this dataset."),
    }
}

// ---------------------------------------------------------------------------
// Console preview of the ranked rows
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct PreviewRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Year")]
    year: String,
    #[tabled(rename = "Genre")]
    genre: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "ROI")]
    roi: String,
}

fn preview_rows(table: &MovieTable) -> Vec<PreviewRow> {
    table
        .records
        .iter()
        .enumerate()
        .map(|(i, rec)| PreviewRow {
            position: i + 1,
            title: rec.text("title").unwrap_or("Untitled").to_string(),
            year: rec.display("year").unwrap_or_else(|| "-".into()),
            genre: rec.text("genre").unwrap_or("-").to_string(),
            score: rec.display("score").unwrap_or_else(|| "-".into()),
            roi: rec
                .number("roi")
                .map(|v| format!("{:.1}%", v * 100.0))
                .unwrap_or_else(|| "n/a".into()),
        })
        .collect()
}
