//! Spectrum synthesis
//!
//! Builds the partial list of a single note for a tuning system:
//!
//! - Harmonic (stretched) timbre: f_i = f0 * s^log2(i+1) with stretch s = 2.00,
//!   which reduces to the plain harmonic series f0 * (i+1).
//! - N-EDO timbre: every harmonic is snapped to the nearest step of the N-tone
//!   equal division of the octave, f_i = f0 * 2^(round(N*log2(i+1))/N).
//!   Several harmonics may land on the same step; only the first is kept.
//!
//! Frequencies are rounded to 0.01 Hz. Partials at or above 20 kHz are dropped
//! and amplitudes fall off as 1/f relative to the lowest generated partial.
//!
//! Reference: Sethares, "Tuning, Timbre, Spectrum, Scale" (2005), ch. 6-7.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    common::{AUDIBLE_LIMIT_HZ, round_to},
    error::CurveError,
};

/// Stretch factor of the harmonic timbre. 2.00 leaves the harmonics unstretched.
pub const HARMONIC_STRETCH: f64 = 2.00;

/// Upper bound on the partials of one note. 20 kHz over a 1 Hz fundamental
/// stays well below it.
pub const MAX_PARTIALS: usize = 1 << 16;

/// One sinusoidal component of a note.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Partial {
    pub freq_hz: f64,
    /// Relative, non-negative. A zero-amplitude partial never interacts.
    pub amplitude: f64,
}

impl Partial {
    pub fn new(freq_hz: f64, amplitude: f64) -> Self {
        Self { freq_hz, amplitude }
    }
}

pub type Spectrum = Vec<Partial>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tuning {
    /// Stretched-harmonic timbre.
    Harmonic,
    /// N-tone equal division of the octave.
    Edo(u32),
}

impl Default for Tuning {
    fn default() -> Self {
        Self::Edo(12)
    }
}

impl fmt::Display for Tuning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tuning::Harmonic => write!(f, "harmonic"),
            Tuning::Edo(n) => write!(f, "{n}-EDO"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartialCount {
    /// As many partials as fit below 20 kHz: round(20000 / f0).
    #[default]
    All,
    Count(usize),
}

impl PartialCount {
    fn resolve(self, fundamental_hz: f64) -> Result<usize, CurveError> {
        let n = match self {
            PartialCount::All => {
                let n = (AUDIBLE_LIMIT_HZ / fundamental_hz).round();
                if n > MAX_PARTIALS as f64 {
                    MAX_PARTIALS + 1
                } else {
                    n as usize
                }
            }
            PartialCount::Count(0) => {
                return Err(CurveError::InvalidConfiguration(
                    "number of partials must be > 0".into(),
                ));
            }
            PartialCount::Count(k) => k,
        };
        if n > MAX_PARTIALS {
            return Err(CurveError::InvalidConfiguration(format!(
                "more than {MAX_PARTIALS} partials requested at {fundamental_hz} Hz"
            )));
        }
        Ok(n)
    }
}

/// Synthesize the spectrum of a note at `fundamental_hz` under `tuning`.
///
/// May return an empty spectrum when the fundamental itself is inaudible.
pub fn build_spectrum(
    tuning: Tuning,
    fundamental_hz: f64,
    count: PartialCount,
) -> Result<Spectrum, CurveError> {
    check_fundamental(fundamental_hz)?;
    let n_partials = count.resolve(fundamental_hz)?;

    let freqs: Vec<f64> = match tuning {
        Tuning::Harmonic => (0..n_partials)
            .map(|i| {
                let f = fundamental_hz * HARMONIC_STRETCH.powf(((i + 1) as f64).log2());
                round_to(f, 2)
            })
            .collect(),
        Tuning::Edo(0) => {
            return Err(CurveError::InvalidConfiguration(
                "EDO must divide the octave into at least one step".into(),
            ));
        }
        Tuning::Edo(n) => {
            let n = n as f64;
            let mut freqs: Vec<f64> = (0..n_partials)
                .map(|i| {
                    let step = (((i + 1) as f64).log2() * n).round();
                    round_to((step / n).exp2() * fundamental_hz, 2)
                })
                .collect();
            freqs.sort_by(f64::total_cmp);
            freqs.dedup();
            freqs
        }
    };

    let Some(&f_first) = freqs.first() else {
        debug!(%tuning, fundamental_hz, "no partials generated");
        return Ok(Vec::new());
    };

    let spectrum: Spectrum = freqs
        .into_iter()
        .filter(|&f| f < AUDIBLE_LIMIT_HZ)
        .map(|f| Partial::new(f, f_first / f))
        .collect();

    debug!(
        %tuning,
        fundamental_hz,
        requested = n_partials,
        kept = spectrum.len(),
        "spectrum built"
    );
    Ok(spectrum)
}

/// Harmonic reference template: f_i = f0 * (i+1), a_i = 1/(i+1).
pub fn harmonic_template(fundamental_hz: f64, count: usize) -> Result<Spectrum, CurveError> {
    check_fundamental(fundamental_hz)?;
    if count == 0 {
        return Err(CurveError::InvalidConfiguration(
            "template needs at least one partial".into(),
        ));
    }
    Ok((1..=count)
        .map(|k| Partial::new(fundamental_hz * k as f64, 1.0 / k as f64))
        .collect())
}

/// Scale every frequency by `ratio`; amplitudes are unchanged.
pub fn transpose(spectrum: &[Partial], ratio: f64) -> Spectrum {
    spectrum
        .iter()
        .map(|p| Partial::new(p.freq_hz * ratio, p.amplitude))
        .collect()
}

/// Merge the spectra of several notes into one, ascending by frequency.
/// Coinciding partials are all kept.
pub fn combine_spectra(spectra: &[&[Partial]]) -> Spectrum {
    let mut out: Spectrum = spectra.iter().flat_map(|s| s.iter().copied()).collect();
    out.sort_by(|a, b| a.freq_hz.total_cmp(&b.freq_hz));
    out
}

fn check_fundamental(fundamental_hz: f64) -> Result<(), CurveError> {
    if !fundamental_hz.is_finite() || fundamental_hz <= 0.0 {
        return Err(CurveError::InvalidConfiguration(format!(
            "fundamental must be a positive frequency (got {fundamental_hz})"
        )));
    }
    Ok(())
}

/// Reject partials no curve can be computed from: a non-finite or
/// non-positive frequency is a configuration error, a non-finite or negative
/// amplitude a domain error.
pub fn check_spectrum(spectrum: &[Partial]) -> Result<(), CurveError> {
    for p in spectrum {
        if !p.freq_hz.is_finite() || p.freq_hz <= 0.0 {
            return Err(CurveError::InvalidConfiguration(format!(
                "partial frequency must be positive (got {})",
                p.freq_hz
            )));
        }
        if !p.amplitude.is_finite() || p.amplitude < 0.0 {
            return Err(CurveError::Domain(format!(
                "amplitude {} at {} Hz must be finite and non-negative",
                p.amplitude, p.freq_hz
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harmonic_series_at_220() {
        let s = build_spectrum(Tuning::Harmonic, 220.0, PartialCount::Count(4)).unwrap();
        let freqs: Vec<f64> = s.iter().map(|p| p.freq_hz).collect();
        assert_eq!(freqs, vec![220.0, 440.0, 660.0, 880.0]);
        assert!((s[1].amplitude - 0.5).abs() < 1e-12);
        assert!((s[3].amplitude - 0.25).abs() < 1e-12);
    }

    #[test]
    fn edo12_snaps_third_harmonic_to_fifth() {
        let s = build_spectrum(Tuning::Edo(12), 220.0, PartialCount::Count(3)).unwrap();
        assert_eq!(s.len(), 3);
        // 3rd harmonic -> 2^(19/12) * 220
        assert!((s[2].freq_hz - 659.26).abs() < 1e-9);
        assert!((s[2].amplitude - 220.0 / 659.26).abs() < 1e-12);
    }

    #[test]
    fn edo_dedups_coinciding_steps() {
        // In 1-EDO the harmonics collapse onto octaves only.
        let s = build_spectrum(Tuning::Edo(1), 100.0, PartialCount::Count(8)).unwrap();
        let freqs: Vec<f64> = s.iter().map(|p| p.freq_hz).collect();
        assert_eq!(freqs, vec![100.0, 200.0, 400.0, 800.0]);
    }

    #[test]
    fn edo_frequencies_strictly_ascending() {
        for n in [5, 7, 12, 19, 31] {
            let s = build_spectrum(Tuning::Edo(n), 110.0, PartialCount::All).unwrap();
            assert!(s.windows(2).all(|w| w[0].freq_hz < w[1].freq_hz), "{n}-EDO");
        }
    }

    #[test]
    fn all_partials_stay_audible() {
        for tuning in [Tuning::Harmonic, Tuning::Edo(12), Tuning::Edo(17)] {
            let s = build_spectrum(tuning, 261.63, PartialCount::All).unwrap();
            assert!(!s.is_empty());
            assert!(s.iter().all(|p| p.freq_hz < AUDIBLE_LIMIT_HZ));
            assert!(s.iter().all(|p| p.amplitude >= 0.0));
        }
    }

    #[test]
    fn all_count_follows_fundamental() {
        // round(20000 / 1000) = 20 partials, the 20th sits exactly at 20 kHz
        let s = build_spectrum(Tuning::Harmonic, 1000.0, PartialCount::All).unwrap();
        assert_eq!(s.len(), 19);
    }

    #[test]
    fn inaudible_fundamental_gives_empty_spectrum() {
        let s = build_spectrum(Tuning::Harmonic, 25_000.0, PartialCount::Count(3)).unwrap();
        assert!(s.is_empty());
        let s = build_spectrum(Tuning::Edo(12), 50_000.0, PartialCount::All).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(
            build_spectrum(Tuning::Harmonic, 0.0, PartialCount::All),
            Err(CurveError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            build_spectrum(Tuning::Harmonic, f64::NAN, PartialCount::All),
            Err(CurveError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            build_spectrum(Tuning::Edo(0), 220.0, PartialCount::All),
            Err(CurveError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            build_spectrum(Tuning::Edo(12), 220.0, PartialCount::Count(0)),
            Err(CurveError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn tiny_fundamental_is_rejected_not_allocated() {
        assert!(matches!(
            build_spectrum(Tuning::Harmonic, 1e-16, PartialCount::All),
            Err(CurveError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            build_spectrum(Tuning::Edo(12), f64::MIN_POSITIVE, PartialCount::All),
            Err(CurveError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            build_spectrum(Tuning::Harmonic, 220.0, PartialCount::Count(usize::MAX)),
            Err(CurveError::InvalidConfiguration(_))
        ));
        // 1 Hz still fits
        let s = build_spectrum(Tuning::Harmonic, 1.0, PartialCount::All).unwrap();
        assert_eq!(s.len(), 19_999);
    }

    #[test]
    fn check_spectrum_flags_bad_partials() {
        assert!(check_spectrum(&[]).is_ok());
        assert!(check_spectrum(&[Partial::new(220.0, 0.0), Partial::new(440.0, 0.5)]).is_ok());
        for f in [0.0, -220.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                check_spectrum(&[Partial::new(f, 1.0)]),
                Err(CurveError::InvalidConfiguration(_))
            ));
        }
        for a in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                check_spectrum(&[Partial::new(220.0, a)]),
                Err(CurveError::Domain(_))
            ));
        }
    }

    #[test]
    fn template_and_transpose() {
        let t = harmonic_template(100.0, 3).unwrap();
        assert_eq!(
            t,
            vec![
                Partial::new(100.0, 1.0),
                Partial::new(200.0, 0.5),
                Partial::new(300.0, 1.0 / 3.0)
            ]
        );
        let up = transpose(&t, 1.5);
        assert!((up[1].freq_hz - 300.0).abs() < 1e-12);
        assert!((up[1].amplitude - 0.5).abs() < 1e-12);
        assert!(harmonic_template(100.0, 0).is_err());
    }

    #[test]
    fn combine_sorts_by_frequency() {
        let a = vec![Partial::new(100.0, 1.0), Partial::new(300.0, 0.3)];
        let b = vec![Partial::new(150.0, 0.8), Partial::new(300.0, 0.1)];
        let c = combine_spectra(&[&a, &b]);
        let freqs: Vec<f64> = c.iter().map(|p| p.freq_hz).collect();
        assert_eq!(freqs, vec![100.0, 150.0, 300.0, 300.0]);
        // stable: first note's partial comes first at equal frequency
        assert!((c[2].amplitude - 0.3).abs() < 1e-12);
    }
}
