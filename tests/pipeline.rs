//! End-to-end pipeline tests: CSV fixture → load → normalize → filter →
//! rank → PDF report. Poster downloads stay disabled so nothing here
//! touches the network.

use std::io::Write;
use std::path::PathBuf;

use cinerank::data::filter::{self, FilterSpec};
use cinerank::data::loader::load_table;
use cinerank::data::normalize::{normalize, NormalizeOptions};
use cinerank::rank;
use cinerank::report::{generate_report, ReportOptions};

fn write_fixture(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("movies.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "titulo,Año,genero,Director,estrellas,overview,score,budget,revenue").unwrap();
    writeln!(
        f,
        "Alien,1979,\"{{horror, sci-fi}}\",Ridley Scott,Sigourney Weaver,A crew in deep space,8.5,\"11,000,000\",\"104,000,000\""
    )
    .unwrap();
    writeln!(
        f,
        "Heat,1995,\"{{crime}}\",Michael Mann,Al Pacino,A heist crew in LA,8.3,\"60,000,000\",\"187,000,000\""
    )
    .unwrap();
    writeln!(
        f,
        "Festival Cut,not a year,\"{{drama}}\",Ana Torres,Lucia Marin,A recut premiere,7.1,,"
    )
    .unwrap();
    // exact repeat of Heat
    writeln!(
        f,
        "Heat,1995,\"{{crime}}\",Michael Mann,Al Pacino,A heist crew in LA,8.3,\"60,000,000\",\"187,000,000\""
    )
    .unwrap();
    path
}

fn report_options(dir: &std::path::Path, name: &str) -> ReportOptions {
    ReportOptions {
        output: dir.join(name),
        fetch_posters: false,
        ..Default::default()
    }
}

#[test]
fn csv_flows_through_to_a_ranked_table() {
    let dir = tempfile::tempdir().unwrap();
    let raw = load_table(&write_fixture(dir.path())).unwrap();
    assert_eq!(raw.len(), 4);

    let table = normalize(&raw, &NormalizeOptions::default());
    // the repeated Heat row is gone, the bilingual headers are canonical
    assert_eq!(table.len(), 3);
    for column in ["title", "year", "genre", "director", "stars", "synopsis"] {
        assert!(table.has_column(column), "missing column {column}");
    }
    // the unparsable year degraded to missing, not an error
    assert_eq!(table.records[2].get("year"), None);

    let spec = FilterSpec {
        genres: vec!["sci-fi".into()],
        ..Default::default()
    };
    let filtered = filter::apply(&table, &spec);
    assert_eq!(filtered.len(), 1);

    let ranked = rank::rank(&filtered, 10);
    assert_eq!(ranked.records[0].text("title"), Some("Alien"));
    let roi = ranked.records[0].number("roi").unwrap();
    assert!((roi - (104_000_000.0 - 11_000_000.0) / 11_000_000.0).abs() < 1e-9);
}

#[test]
fn report_is_written_for_a_ranked_table() {
    let dir = tempfile::tempdir().unwrap();
    let raw = load_table(&write_fixture(dir.path())).unwrap();
    let table = normalize(&raw, &NormalizeOptions::default());
    let spec = FilterSpec::default();
    let ranked = rank::rank(&filter::apply(&table, &spec), 10);

    let opts = report_options(dir.path(), "report.pdf");
    let path = generate_report(&ranked, &spec, &opts).unwrap();
    assert_eq!(path, opts.output);
    let bytes = std::fs::read(&path).unwrap();
    assert!(!bytes.is_empty());
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn empty_result_still_produces_a_document() {
    let dir = tempfile::tempdir().unwrap();
    let raw = load_table(&write_fixture(dir.path())).unwrap();
    let table = normalize(&raw, &NormalizeOptions::default());

    let spec = FilterSpec {
        genres: vec!["Comedy".into()],
        ..Default::default()
    };
    let filtered = filter::apply(&table, &spec);
    assert!(filtered.is_empty());

    let opts = report_options(dir.path(), "empty.pdf");
    let path = generate_report(&rank::rank(&filtered, 10), &spec, &opts).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn missing_source_file_is_a_visible_error_not_a_panic() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_table(&dir.path().join("absent.csv")).unwrap_err();
    assert!(!err.to_string().is_empty());
}
