//! Psychoacoustic dissonance curves for arbitrary tunings and timbres.
//!
//! Pipeline:
//! 1) [`spectrum::build_spectrum`]: partials of one note for a harmonic or N-EDO timbre.
//! 2) [`curve::generate_curve`]: sweep a transposed copy over [0.4, 2.4] and sum
//!    pairwise roughness ([`dissonance`]), loudness-mapping first for the
//!    Sethares loudness variant ([`loudness`]).
//! 3) [`normalize`]: line correction or plain peak scaling.
//! 4) [`intervals::run_interval_step`]: consonant minima of the curve.

pub mod common;
pub mod curve;
pub mod dissonance;
pub mod error;
pub mod intervals;
pub mod loudness;
pub mod normalize;
pub mod spectrum;

pub use curve::{
    CurveConfig, CurveResult, DissonanceCurve, DissonancePoint, SweepMethod, generate_curve,
    run_curve_step,
};
pub use dissonance::{DissonanceMethod, complex_dissonance, intrinsic_dissonance, pair_dissonance};
pub use error::CurveError;
pub use loudness::apply_loudness;
pub use normalize::{Normalization, normalize_to_one, normalize_with_line_correction};
pub use spectrum::{Partial, PartialCount, Spectrum, Tuning, build_spectrum, check_spectrum};
