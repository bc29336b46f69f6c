//! Writes a small demo dataset (`movies_sample.csv`) with the messy,
//! bilingual headers the normalizer is built for. Handy for trying the
//! pipeline without a real spreadsheet:
//!
//! ```text
//! cargo run --bin generate_sample
//! cargo run -- movies_sample.csv --genre Sci-Fi --year-from 1980
//! ```

use anyhow::{Context, Result};

struct SampleMovie {
    titulo: &'static str,
    year: &'static str,
    genero: &'static str,
    director: &'static str,
    estrellas: &'static str,
    overview: &'static str,
    score: &'static str,
    budget: &'static str,
    revenue: &'static str,
    runtime: &'static str,
}

const MOVIES: &[SampleMovie] = &[
    SampleMovie {
        titulo: "Alien",
        year: "1979",
        genero: "{horror, sci-fi}",
        director: "Ridley Scott",
        estrellas: "Sigourney Weaver, Tom Skerritt",
        overview: "The crew of a commercial starship answers a distress call and brings something back on board.",
        score: "8.5",
        budget: "11,000,000",
        revenue: "104,000,000",
        runtime: "117",
    },
    SampleMovie {
        titulo: "Heat",
        year: "1995",
        genero: "{crime, drama}",
        director: "Michael Mann",
        estrellas: "Al Pacino, Robert De Niro",
        overview: "A veteran detective circles a disciplined heist crew across Los Angeles.",
        score: "8.3",
        budget: "60,000,000",
        revenue: "187,000,000",
        runtime: "170",
    },
    SampleMovie {
        titulo: "Clueless",
        year: "1995",
        genero: "{comedy}",
        director: "Amy Heckerling",
        estrellas: "Alicia Silverstone, Paul Rudd",
        overview: "A Beverly Hills matchmaker discovers the limits of her own good taste.",
        score: "6.9",
        budget: "12,000,000",
        revenue: "56,000,000",
        runtime: "97",
    },
    SampleMovie {
        titulo: "El Mariachi",
        year: "1992",
        genero: "{accion}",
        director: "Robert Rodriguez",
        estrellas: "Carlos Gallardo",
        overview: "A travelling musician is mistaken for a hitman with a guitar case full of guns.",
        score: "6.9",
        budget: "7,000",
        revenue: "2,040,000",
        runtime: "81",
    },
    SampleMovie {
        titulo: "The Thing",
        year: "1982",
        genero: "{horror, sci-fi}",
        director: "John Carpenter",
        estrellas: "Kurt Russell",
        overview: "An Antarctic research crew is hunted by a creature that imitates its victims.",
        score: "8.2",
        budget: "15,000,000",
        revenue: "19,600,000",
        runtime: "109",
    },
    SampleMovie {
        titulo: "Festival Cut",
        year: "n/a",
        genero: "{drama}",
        director: "Ana Torres",
        estrellas: "Lucia Marin",
        overview: "A director recuts her debut feature the night before its premiere.",
        score: "7.1",
        budget: "",
        revenue: "",
        runtime: "",
    },
    // exact repeat of Heat; the normalizer drops it by default
    SampleMovie {
        titulo: "Heat",
        year: "1995",
        genero: "{crime, drama}",
        director: "Michael Mann",
        estrellas: "Al Pacino, Robert De Niro",
        overview: "A veteran detective circles a disciplined heist crew across Los Angeles.",
        score: "8.3",
        budget: "60,000,000",
        revenue: "187,000,000",
        runtime: "170",
    },
];

fn main() -> Result<()> {
    let path = "movies_sample.csv";
    let mut writer = csv::Writer::from_path(path).context("creating sample CSV")?;

    writer.write_record([
        "titulo",
        "Año",
        "genero",
        "Director",
        "estrellas",
        "overview",
        "score",
        "budget",
        "revenue",
        "runtime",
    ])?;
    for movie in MOVIES {
        writer.write_record([
            movie.titulo,
            movie.year,
            movie.genero,
            movie.director,
            movie.estrellas,
            movie.overview,
            movie.score,
            movie.budget,
            movie.revenue,
            movie.runtime,
        ])?;
    }
    writer.flush()?;
    println!("Wrote {} movies to {path}", MOVIES.len());
    Ok(())
}
