//! Curve normalization
//!
//! Two interchangeable transforms for display and comparison:
//!
//! - Line correction: subtract the straight line through the first and last
//!   points (the intrinsic dissonance of the timbre at one end, the octave
//!   correction at the other), then scale the peak to 1. This removes the
//!   overall tilt of the curve so minima at both ends compare fairly.
//! - To one: scale the peak to 1.

use serde::{Deserialize, Serialize};

use crate::{
    curve::{DissonanceCurve, DissonancePoint},
    error::CurveError,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Normalization {
    #[default]
    LineCorrection,
    ToOne,
    /// Leave the curve as computed.
    None,
}

impl Normalization {
    pub fn apply(self, curve: &DissonanceCurve) -> Result<DissonanceCurve, CurveError> {
        match self {
            Normalization::LineCorrection => normalize_with_line_correction(curve),
            Normalization::ToOne => normalize_to_one(curve),
            Normalization::None => Ok(curve.clone()),
        }
    }
}

/// Subtract the line through the first and last points.
///
/// Over positions spanning [1, 2] the line is `slope * x - slope + intrinsic`;
/// other spans are mapped onto it linearly, so both endpoints become 0.
pub fn line_corrected(curve: &DissonanceCurve) -> Result<DissonanceCurve, CurveError> {
    let (Some(first), Some(last)) = (curve.first(), curve.last()) else {
        return Err(CurveError::DegenerateInput(
            "cannot line-correct an empty curve".into(),
        ));
    };
    let intrinsic = first.value;
    let slope = last.value - intrinsic;
    let span = last.position - first.position;
    let x0 = first.position;

    Ok(curve.map_values(|p: &DissonancePoint| {
        let t = if span == 0.0 { 0.0 } else { (p.position - x0) / span };
        p.value - (intrinsic + slope * t)
    }))
}

/// Line-correct the curve and scale its peak to 1.
pub fn normalize_with_line_correction(
    curve: &DissonanceCurve,
) -> Result<DissonanceCurve, CurveError> {
    scale_to_peak(&line_corrected(curve)?, "line-corrected curve")
}

/// Scale the curve so its peak is 1.
pub fn normalize_to_one(curve: &DissonanceCurve) -> Result<DissonanceCurve, CurveError> {
    scale_to_peak(curve, "curve")
}

fn scale_to_peak(curve: &DissonanceCurve, what: &str) -> Result<DissonanceCurve, CurveError> {
    let peak = curve
        .max_value()
        .ok_or_else(|| CurveError::DegenerateInput(format!("{what} is empty")))?;
    // A non-positive peak would divide by zero or flip the curve upside down.
    if peak <= 0.0 {
        return Err(CurveError::DegenerateInput(format!(
            "{what} has non-positive peak {peak}"
        )));
    }
    Ok(curve.map_values(|p| p.value / peak))
}
