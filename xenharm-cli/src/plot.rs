use std::path::PathBuf;

use xenharm_core::{DissonanceCurve, intervals::IntervalResult};

/// `<CARGO_TARGET_DIR or ./target>/<name>`
fn output_path(name: &str) -> PathBuf {
    std::env::var("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("target"))
        .join(name)
}

#[cfg(feature = "visualise")]
pub fn plot_curve(
    curve: &DissonanceCurve,
    intervals: &IntervalResult,
    label: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    use plotters::prelude::*;
    use tracing::info;

    let out_file = output_path(&format!("{}_dissonance.png", label.replace(' ', "_")));

    let root = BitMapBackend::new(&out_file, (1200, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    let (min_cents, max_cents) = (
        curve.first().map(|p| p.position).unwrap_or(0.0),
        curve.last().map(|p| p.position).unwrap_or(1.0),
    );
    let values: Vec<f64> = curve.iter().map(|p| p.value).collect();
    let (min_val, _, max_val) = crate::util::summary_min_median_max(&values);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Dissonance curve of the {} timbre", label),
            ("sans-serif", 24),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(min_cents..max_cents, min_val..max_val)?;

    chart
        .configure_mesh()
        .x_desc("Interval (cents)")
        .y_desc("Dissonance")
        .x_labels(((max_cents - min_cents) / 100.0).ceil() as usize + 1)
        .x_label_formatter(&|x| format!("{:.0}", x))
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            curve.iter().map(|p| (p.position, p.value)),
            &RED,
        ))?
        .label("Dissonance")
        .legend(|(x, y)| PathElement::new([(x, y), (x + 20, y)], RED));

    chart
        .draw_series(intervals.intervals.iter().map(|iv| {
            Circle::new(
                (iv.minimum.cents, iv.minimum.value),
                5,
                ShapeStyle::from(&BLUE).filled(),
            )
        }))?
        .label("Minima")
        .legend(|(x, y)| Circle::new((x + 10, y), 5, ShapeStyle::from(&BLUE).filled()));

    chart.configure_series_labels().border_style(BLACK).draw()?;
    root.present()?;

    info!("Wrote {}", out_file.display());
    Ok(())
}

#[cfg(not(feature = "visualise"))]
pub fn plot_curve(
    _curve: &DissonanceCurve,
    _intervals: &IntervalResult,
    label: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    Err(format!(
        "cannot write {}: rebuild with `--features visualise`",
        output_path(&format!("{label}_dissonance.png")).display()
    )
    .into())
}
