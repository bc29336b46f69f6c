use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::prelude::*;

// ---------------------------------------------------------------------------
// Per-film bar chart (budget vs revenue, plus ROI% when defined)
// ---------------------------------------------------------------------------

const CHART_SIZE: (u32, u32) = (640, 420);

/// Render a labelled bar chart into `dir` and return the PNG path.
///
/// `bars` is a small list of (label, value) pairs; values may be negative
/// (a loss-making ROI), so the y-range always includes zero.
pub fn render_bar_chart(dir: &Path, index: usize, title: &str, bars: &[(String, f64)]) -> Result<PathBuf> {
    let path = dir.join(format!("chart_{index}.png"));

    let y_lo = bars.iter().map(|(_, v)| *v).fold(0.0f64, f64::min);
    let y_hi = bars.iter().map(|(_, v)| *v).fold(0.0f64, f64::max);
    // pad the top and keep a non-degenerate range
    let y_hi = if y_hi <= y_lo { y_lo + 1.0 } else { y_hi * 1.1 };

    {
        let root = BitMapBackend::new(&path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).context("filling chart background")?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(14)
            .x_label_area_size(32)
            .y_label_area_size(64)
            .build_cartesian_2d(0i32..bars.len() as i32, y_lo..y_hi)
            .context("building chart axes")?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len())
            .x_label_formatter(&|x| {
                bars.get(*x as usize)
                    .map(|(label, _)| label.clone())
                    .unwrap_or_default()
            })
            .y_label_formatter(&|v| compact_amount(*v))
            .draw()
            .context("drawing chart mesh")?;

        chart
            .draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
                Rectangle::new(
                    [(i as i32, 0.0), (i as i32 + 1, *value)],
                    Palette99::pick(i).filled(),
                )
            }))
            .context("drawing chart bars")?;

        root.present().context("writing chart PNG")?;
    }
    Ok(path)
}

/// Short axis labels for dollar-scale values: `1500000` → `"1.5M"`.
fn compact_amount(v: f64) -> String {
    let magnitude = v.abs();
    if magnitude >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if magnitude >= 1e3 {
        format!("{:.0}k", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_compact_by_magnitude() {
        assert_eq!(compact_amount(2_500_000_000.0), "2.5B");
        assert_eq!(compact_amount(1_500_000.0), "1.5M");
        assert_eq!(compact_amount(12_000.0), "12k");
        assert_eq!(compact_amount(42.0), "42");
        assert_eq!(compact_amount(-3_000_000.0), "-3.0M");
    }
}
