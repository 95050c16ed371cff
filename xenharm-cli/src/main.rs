mod config;
mod plot;
mod util;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use xenharm_core::{Tuning, build_spectrum, intervals::run_interval_step, run_curve_step};

use crate::{config::XenharmConfig, util::summary_min_median_max};

#[derive(Parser, Debug)]
#[command(author, version, about = "Dissonance curves for tunings and timbres")]
struct Args {
    /// Path to config TOML
    #[arg(long, default_value = "xenharm.toml")]
    config: String,

    /// Fundamental frequency in Hz (overrides config)
    #[arg(long)]
    fundamental: Option<f64>,

    /// Build an N-EDO timbre (overrides config)
    #[arg(long, conflicts_with = "harmonic")]
    edo: Option<u32>,

    /// Build a stretched-harmonic timbre (overrides config)
    #[arg(long, default_value_t = false)]
    harmonic: bool,

    /// Print every curve point as `cents,raw,normalized`
    #[arg(long, default_value_t = false)]
    points: bool,

    /// Render the normalized curve to a PNG under the target directory
    #[arg(long, default_value_t = false)]
    plot: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let mut cfg = XenharmConfig::load_or_default(&args.config);
    if let Some(f0) = args.fundamental {
        cfg.spectrum.fundamental_hz = f0;
    }
    if let Some(n) = args.edo {
        cfg.spectrum.tuning = Tuning::Edo(n);
    }
    if args.harmonic {
        cfg.spectrum.tuning = Tuning::Harmonic;
    }

    // ---- Step #1: spectrum of one note ----
    let spectrum = build_spectrum(
        cfg.spectrum.tuning,
        cfg.spectrum.fundamental_hz,
        cfg.spectrum.partials,
    )?;

    println!("== Spectrum ==");
    println!(
        "{} timbre at {:.2} Hz: {} partials",
        cfg.spectrum.tuning,
        cfg.spectrum.fundamental_hz,
        spectrum.len()
    );
    for (k, p) in spectrum.iter().take(12).enumerate() {
        println!("k={:<2}  f={:>9.2} Hz  a={:.4}", k + 1, p.freq_hz, p.amplitude);
    }
    if spectrum.len() > 12 {
        println!("… {} more", spectrum.len() - 12);
    }

    // ---- Step #2: dissonance curve ----
    let result = run_curve_step(&spectrum, &cfg.curve)?;

    println!("\n== Dissonance curve ==");
    println!(
        "method={:?}  sweep={:?}  normalization={:?}  points={}",
        cfg.curve.method,
        cfg.curve.sweep,
        cfg.curve.normalization,
        result.raw.len()
    );
    let raw: Vec<f64> = result.raw.iter().map(|p| p.value).collect();
    let (dmin, dmed, dmax) = summary_min_median_max(&raw);
    println!(
        "D(r) stats (raw): min={:.6}  med={:.6}  max={:.6}",
        dmin, dmed, dmax
    );
    if args.points {
        println!("cents,raw,normalized");
        for (r, n) in result.raw.iter().zip(result.normalized.iter()) {
            println!("{:.3},{:.6},{:.6}", r.position, r.value, n.value);
        }
    }

    // ---- Step #3: consonant intervals ----
    let intervals = run_interval_step(
        &result.normalized,
        cfg.spectrum.tuning,
        &cfg.intervals.to_core(),
    );

    println!("\n== Consonant intervals ==");
    if intervals.intervals.is_empty() {
        println!("No local minima.");
    }
    for (k, iv) in intervals.intervals.iter().enumerate() {
        let m = &iv.minimum;
        let step = iv
            .step
            .as_ref()
            .map(|s| format!("step {:>3}\\{} ({:+.1}c)", s.step, s.divisions, s.cents_error))
            .unwrap_or_default();
        let rational = iv
            .rational
            .as_ref()
            .map(|r| format!("{} ({:+.1}c)", r.label, r.cents_error))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "#{:<2} {:>8.1} cents  D={:>8.5}  depth={:>7.5}  {:<22} {}",
            k + 1,
            m.cents,
            m.value,
            m.depth,
            step,
            rational
        );
    }

    if args.plot {
        plot::plot_curve(&result.normalized, &intervals, &cfg.spectrum.tuning.to_string())?;
    }

    Ok(())
}
