//! Dissonance curve of a timbre
//!
//! A copy of the sweep spectrum is transposed by ratios r over [0.4, 2.4] in
//! round(300 * precision) equal steps and, at each step, the total roughness
//! against the static spectrum is accumulated:
//!
//! ```text
//! D(r) = sum_{i in static} sum_{j in sweep} d(p_i, r * q_j)
//! ```
//!
//! The sweep spectrum is either the static spectrum itself (self-similarity) or
//! a fixed harmonic template rooted at the static spectrum's lowest partial.
//! The ratio axis is converted to cents (1200 * log2 r) on output.
//!
//! API mirrors the other steps: a Config, a Result, and a `run_*` entry point.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    common::{max_value, ratio_to_cents},
    dissonance::{DissonanceMethod, complex_dissonance},
    error::CurveError,
    loudness::apply_loudness,
    normalize::Normalization,
    spectrum::{Partial, Spectrum, check_spectrum, harmonic_template, transpose},
};

/// Lowest swept ratio.
pub const SWEEP_START: f64 = 0.4;
/// Width of the swept ratio range, so the sweep ends at 2.4.
pub const SWEEP_WIDTH: f64 = 2.0;
/// Steps per unit of precision.
pub const STEPS_PER_PRECISION: f64 = 300.0;
/// Upper bound on sweep steps (precision 1000).
pub const MAX_STEPS: usize = 300_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepMethod {
    /// Sweep a transposed copy of the spectrum against itself (selector 1).
    #[default]
    SelfSimilarity,
    /// Sweep a harmonic template against the spectrum (selector 2).
    HarmonicTemplate,
}

impl TryFrom<u8> for SweepMethod {
    type Error = CurveError;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        match selector {
            1 => Ok(Self::SelfSimilarity),
            2 => Ok(Self::HarmonicTemplate),
            other => Err(CurveError::InvalidConfiguration(format!(
                "unknown sweep method {other} (expected 1 or 2)"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    pub method: DissonanceMethod,
    /// Sweep resolution; 1.0 gives 300 steps.
    pub precision: f64,
    /// Number of octaves to span. Accepted for forward compatibility; the
    /// sweep range is currently fixed to [0.4, 2.4].
    pub octave_span: u32,
    pub sweep: SweepMethod,
    /// Partials in the harmonic template (template sweep only).
    pub template_partials: usize,
    /// Post-processing applied by [`run_curve_step`].
    pub normalization: Normalization,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            method: DissonanceMethod::default(),
            precision: 1.0,
            octave_span: 1,
            sweep: SweepMethod::default(),
            template_partials: 10,
            normalization: Normalization::default(),
        }
    }
}

impl CurveConfig {
    /// Number of sweep steps; the curve has one more point than this.
    pub fn step_count(&self) -> Result<usize, CurveError> {
        if !self.precision.is_finite() || self.precision <= 0.0 {
            return Err(CurveError::InvalidConfiguration(format!(
                "precision must be positive (got {})",
                self.precision
            )));
        }
        let steps = (self.precision * STEPS_PER_PRECISION).round();
        if steps > MAX_STEPS as f64 {
            return Err(CurveError::InvalidConfiguration(format!(
                "precision {} exceeds {MAX_STEPS} sweep steps",
                self.precision
            )));
        }
        let steps = steps as usize;
        if steps == 0 {
            return Err(CurveError::InvalidConfiguration(format!(
                "precision {} yields no sweep steps",
                self.precision
            )));
        }
        Ok(steps)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DissonancePoint {
    /// Ratio while sweeping, cents once converted.
    pub position: f64,
    pub value: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DissonanceCurve {
    pub points: Vec<DissonancePoint>,
}

impl DissonanceCurve {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&DissonancePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&DissonancePoint> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DissonancePoint> {
        self.points.iter()
    }

    pub fn max_value(&self) -> Option<f64> {
        max_value(self.points.iter().map(|p| p.value))
    }

    /// Index of the largest value (first one on ties).
    pub fn argmax(&self) -> Option<usize> {
        let max = self.max_value()?;
        self.points.iter().position(|p| p.value == max)
    }

    /// Same positions, values replaced by `f(point)`.
    pub(crate) fn map_values(&self, f: impl Fn(&DissonancePoint) -> f64) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| DissonancePoint {
                    position: p.position,
                    value: f(p),
                })
                .collect(),
        }
    }
}

impl FromIterator<DissonancePoint> for DissonanceCurve {
    fn from_iter<I: IntoIterator<Item = DissonancePoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CurveResult {
    /// Dissonance over cents, as computed.
    pub raw: DissonanceCurve,
    /// `raw` after the configured normalization.
    pub normalized: DissonanceCurve,
}

/// Sweep ratios of the curve, ascending: 0.4 + i * step for i in 0..=steps.
pub fn sweep_ratios(steps: usize) -> impl Iterator<Item = f64> {
    let step = SWEEP_WIDTH / steps as f64;
    (0..=steps).map(move |i| SWEEP_START + i as f64 * step)
}

/// Compute the dissonance curve of `spectrum` over cents.
pub fn generate_curve(spectrum: &[Partial], cfg: &CurveConfig) -> Result<DissonanceCurve, CurveError> {
    let steps = cfg.step_count()?;
    if cfg.octave_span == 0 {
        return Err(CurveError::InvalidConfiguration(
            "octave span must be at least 1".into(),
        ));
    }
    if cfg.octave_span != 1 {
        warn!(
            octave_span = cfg.octave_span,
            "octave span does not change the sweep range yet; sweeping [0.4, 2.4]"
        );
    }

    check_spectrum(spectrum)?;

    let static_spectrum: Spectrum = if cfg.method.uses_loudness() {
        apply_loudness(spectrum)?
    } else {
        spectrum.to_vec()
    };

    let sweep_source: Spectrum = match cfg.sweep {
        SweepMethod::SelfSimilarity => static_spectrum.clone(),
        SweepMethod::HarmonicTemplate => {
            let fundamental = spectrum.first().ok_or_else(|| {
                CurveError::DegenerateInput(
                    "harmonic template sweep needs a spectrum with a fundamental".into(),
                )
            })?;
            let template = harmonic_template(fundamental.freq_hz, cfg.template_partials)?;
            if cfg.method.uses_loudness() {
                apply_loudness(&template)?
            } else {
                template
            }
        }
    };

    debug!(
        method = ?cfg.method,
        sweep = ?cfg.sweep,
        steps,
        static_partials = static_spectrum.len(),
        sweep_partials = sweep_source.len(),
        "sweeping dissonance curve"
    );

    sweep_ratios(steps)
        .map(|ratio| {
            let swept = transpose(&sweep_source, ratio);
            let value = complex_dissonance(&static_spectrum, &swept, cfg.method);
            if !value.is_finite() {
                return Err(CurveError::Domain(format!(
                    "dissonance at ratio {ratio:.4} is not finite"
                )));
            }
            Ok(DissonancePoint {
                position: ratio_to_cents(ratio),
                value,
            })
        })
        .collect()
}

/// Curve plus its normalized form.
pub fn run_curve_step(spectrum: &[Partial], cfg: &CurveConfig) -> Result<CurveResult, CurveError> {
    let raw = generate_curve(spectrum, cfg)?;
    let normalized = cfg.normalization.apply(&raw)?;
    Ok(CurveResult { raw, normalized })
}
