//! Amplitude to perceived loudness (Sethares' sone-like mapping).
//!
//! ```text
//! L(a) = 0.25 * 2^(log10(2e8 * a))
//! ```
//!
//! Only used by the loudness-weighted Sethares variant. Zero amplitudes stay 0.

use crate::{
    error::CurveError,
    spectrum::{Partial, Spectrum},
};

const LOUDNESS_COEFFICIENT: f64 = 2.0e8;

#[inline]
pub fn loudness(amplitude: f64) -> f64 {
    0.25 * (LOUDNESS_COEFFICIENT * amplitude).log10().exp2()
}

/// Map every amplitude of `spectrum` to loudness, returning a new spectrum.
pub fn apply_loudness(spectrum: &[Partial]) -> Result<Spectrum, CurveError> {
    spectrum
        .iter()
        .map(|p| {
            if !p.amplitude.is_finite() || p.amplitude < 0.0 {
                return Err(CurveError::Domain(format!(
                    "cannot map amplitude {} at {} Hz to loudness",
                    p.amplitude, p.freq_hz
                )));
            }
            let amplitude = if p.amplitude == 0.0 {
                0.0
            } else {
                loudness(p.amplitude)
            };
            Ok(Partial::new(p.freq_hz, amplitude))
        })
        .collect()
}
