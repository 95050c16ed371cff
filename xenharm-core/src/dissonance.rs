//! Sensory dissonance of sine partials
//!
//! Pairwise kernel (Plomp–Levelt curve as parameterised by Sethares):
//!
//! ```text
//! s   = 1 / (0.021 * f_min + 19)
//! d   = A * (exp(-0.84 * s * |Δf|) - exp(-1.38 * s * |Δf|))
//! ```
//!
//! where f_min is the frequency of the lower partial and A is an amplitude
//! coefficient chosen by the method:
//!
//! - Sethares:            A = a_min * a_max
//! - Sethares (loudness): A = min(a_min, a_max)   (on loudness-mapped amplitudes)
//! - Vassilakis:          A = 0.5 * (a_max*a_min)^0.1 * (2*a_min / (a_max+a_min))^3.11
//!
//! a_min always belongs to the lower partial, a_max to the upper one.
//!
//! References:
//! - Sethares, "Local consonance and the relationship between timbre and scale" (1993).
//! - Vassilakis, "Perceptual and physical properties of amplitude fluctuation
//!   and their musical significance" (2001).

use serde::{Deserialize, Serialize};

use crate::{error::CurveError, spectrum::Partial};

const B1: f64 = 0.84;
const B2: f64 = 1.38;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DissonanceMethod {
    /// Product of amplitudes (selector 1).
    Sethares,
    /// Minimum of loudness-mapped amplitudes (selector 2).
    SetharesLoudness,
    /// Amplitude-fluctuation model (selector 3).
    #[default]
    Vassilakis,
}

impl DissonanceMethod {
    /// Whether spectra must go through [`crate::loudness::apply_loudness`] first.
    pub fn uses_loudness(self) -> bool {
        matches!(self, DissonanceMethod::SetharesLoudness)
    }

    fn amplitude_coefficient(self, a_min: f64, a_max: f64) -> f64 {
        match self {
            DissonanceMethod::Sethares => a_min * a_max,
            DissonanceMethod::SetharesLoudness => a_min.min(a_max),
            DissonanceMethod::Vassilakis => {
                0.5 * (a_max * a_min).powf(0.1) * ((2.0 * a_min) / (a_max + a_min)).powf(3.11)
            }
        }
    }
}

impl TryFrom<u8> for DissonanceMethod {
    type Error = CurveError;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        match selector {
            1 => Ok(Self::Sethares),
            2 => Ok(Self::SetharesLoudness),
            3 => Ok(Self::Vassilakis),
            other => Err(CurveError::InvalidConfiguration(format!(
                "unknown dissonance method {other} (expected 1, 2 or 3)"
            ))),
        }
    }
}

/// Dissonance between two partials.
#[inline]
pub fn pair_dissonance(a: &Partial, b: &Partial, method: DissonanceMethod) -> f64 {
    if a.amplitude == 0.0 || b.amplitude == 0.0 {
        return 0.0;
    }
    let (lower, upper) = if a.freq_hz < b.freq_hz { (a, b) } else { (b, a) };
    let coefficient = method.amplitude_coefficient(lower.amplitude, upper.amplitude);

    let s = 0.021 * lower.freq_hz + 19.0;
    let delta = (b.freq_hz - a.freq_hz).abs();
    coefficient * ((-B1 * delta / s).exp() - (-B2 * delta / s).exp())
}

/// Total dissonance between every partial of `fixed` and every partial of `sweep`.
pub fn complex_dissonance(fixed: &[Partial], sweep: &[Partial], method: DissonanceMethod) -> f64 {
    fixed
        .iter()
        .map(|p| {
            sweep
                .iter()
                .map(|q| pair_dissonance(p, q, method))
                .sum::<f64>()
        })
        .sum()
}

/// Dissonance of a spectrum with itself: every unordered pair counted once.
pub fn intrinsic_dissonance(spectrum: &[Partial], method: DissonanceMethod) -> f64 {
    let mut total = 0.0;
    for (i, p) in spectrum.iter().enumerate() {
        for q in &spectrum[i + 1..] {
            total += pair_dissonance(p, q, method);
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    const METHODS: [DissonanceMethod; 3] = [
        DissonanceMethod::Sethares,
        DissonanceMethod::SetharesLoudness,
        DissonanceMethod::Vassilakis,
    ];

    fn partials() -> Vec<Partial> {
        vec![
            Partial::new(220.0, 1.0),
            Partial::new(233.08, 0.8),
            Partial::new(440.0, 0.5),
            Partial::new(466.16, 0.3),
            Partial::new(1000.0, 0.05),
        ]
    }

    #[test]
    fn sethares_reference_value() {
        let a = Partial::new(220.0, 1.0);
        let b = Partial::new(240.0, 0.5);
        let s: f64 = 0.021 * 220.0 + 19.0;
        let expected = 0.5 * ((-0.84 * 20.0 / s).exp() - (-1.38 * 20.0 / s).exp());
        let d = pair_dissonance(&a, &b, DissonanceMethod::Sethares);
        assert!((d - expected).abs() < 1e-12);
        assert!(d > 0.0);
    }

    #[test]
    fn amplitude_roles_follow_frequency() {
        // Vassilakis is asymmetric in (a_min, a_max): the quieter upper partial
        // must give a different value than the quieter lower partial.
        let loud_low = pair_dissonance(
            &Partial::new(300.0, 1.0),
            &Partial::new(320.0, 0.2),
            DissonanceMethod::Vassilakis,
        );
        let quiet_low = pair_dissonance(
            &Partial::new(300.0, 0.2),
            &Partial::new(320.0, 1.0),
            DissonanceMethod::Vassilakis,
        );
        assert!(quiet_low < loud_low);
    }

    #[test]
    fn symmetric_in_arguments() {
        let ps = partials();
        for m in METHODS {
            for p in &ps {
                for q in &ps {
                    let d1 = pair_dissonance(p, q, m);
                    let d2 = pair_dissonance(q, p, m);
                    assert!((d1 - d2).abs() < 1e-15, "{m:?}");
                }
            }
        }
    }

    #[test]
    fn silent_partial_contributes_nothing() {
        let silent = Partial::new(230.0, 0.0);
        for m in METHODS {
            for p in partials() {
                assert_eq!(pair_dissonance(&silent, &p, m), 0.0);
                assert_eq!(pair_dissonance(&p, &silent, m), 0.0);
            }
        }
    }

    #[test]
    fn unison_is_consonant() {
        for m in METHODS {
            for p in partials() {
                assert_eq!(pair_dissonance(&p, &p, m), 0.0);
            }
        }
    }

    #[test]
    fn intrinsic_of_two_partials_is_pair() {
        let ps = partials();
        for m in METHODS {
            let two = [ps[0], ps[1]];
            let d = intrinsic_dissonance(&two, m);
            assert!((d - pair_dissonance(&ps[0], &ps[1], m)).abs() < 1e-15);
        }
    }

    #[test]
    fn intrinsic_counts_each_pair_once() {
        let ps = partials();
        let m = DissonanceMethod::Sethares;
        // Cross product of a spectrum with itself counts every pair twice
        // (unisons add zero).
        let cross = complex_dissonance(&ps, &ps, m);
        let intrinsic = intrinsic_dissonance(&ps, m);
        assert!((cross - 2.0 * intrinsic).abs() < 1e-12);
    }

    #[test]
    fn complex_dissonance_of_empty_is_zero() {
        assert_eq!(
            complex_dissonance(&[], &partials(), DissonanceMethod::Vassilakis),
            0.0
        );
        assert_eq!(intrinsic_dissonance(&[], DissonanceMethod::Vassilakis), 0.0);
    }

    #[test]
    fn selector_mapping() {
        assert_eq!(
            DissonanceMethod::try_from(1).unwrap(),
            DissonanceMethod::Sethares
        );
        assert_eq!(
            DissonanceMethod::try_from(2).unwrap(),
            DissonanceMethod::SetharesLoudness
        );
        assert_eq!(
            DissonanceMethod::try_from(3).unwrap(),
            DissonanceMethod::Vassilakis
        );
        assert!(matches!(
            DissonanceMethod::try_from(0),
            Err(CurveError::InvalidConfiguration(_))
        ));
        assert!(DissonanceMethod::SetharesLoudness.uses_loudness());
        assert!(!DissonanceMethod::Vassilakis.uses_loudness());
    }
}
