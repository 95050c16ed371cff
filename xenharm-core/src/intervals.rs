//! Consonant intervals from a dissonance curve
//!
//! Local minima of the curve mark the intervals at which the timbre is most
//! consonant with itself. For each minimum (at c* cents) we report:
//!
//! - the nearest step of the tuning the timbre was built for (N-EDO only),
//! - the simplest rational p/q within a cents tolerance, ranked by Tenney
//!   height ln(p) + ln(q) and then by cents error, with a familiar name where
//!   one exists.
//!
//! Public API mirrors other steps: a Config, a Result, and `run_*` entry point.

use std::cmp::Ordering;

use crate::{
    common::{cents_to_ratio, ratio_to_cents},
    curve::{DissonanceCurve, DissonancePoint},
    spectrum::Tuning,
};

#[derive(Clone, Debug)]
pub struct IntervalConfig {
    /// Number of minima to keep (by increasing dissonance).
    pub top_k: usize,
    /// Candidate acceptance window (± cents around a local minimum).
    pub tolerance_cents: f64,
    /// Maximum denominator to search for p/q candidates.
    pub max_denominator: u32,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            top_k: 16,
            tolerance_cents: 10.0,
            max_denominator: 32,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LocalMinimum {
    pub cents: f64,
    pub value: f64,
    /// Simple depth estimate against shoulders (higher = “stronger valley”).
    pub depth: f64,
}

/// Nearest step of an equal division of the octave.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleStep {
    pub step: i64,
    pub divisions: u32,
    /// cents(minimum) - cents(step)
    pub cents_error: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RationalInterval {
    pub p: u32,
    pub q: u32,
    pub cents: f64,
    /// cents(p/q) - cents(minimum)
    pub cents_error: f64,
    pub complexity: f64,
    pub label: String,
}

#[derive(Clone, Debug)]
pub struct ConsonantInterval {
    pub minimum: LocalMinimum,
    pub step: Option<ScaleStep>,
    pub rational: Option<RationalInterval>,
}

#[derive(Clone, Debug)]
pub struct IntervalResult {
    pub intervals: Vec<ConsonantInterval>,
}

/// Consonant intervals of `curve`, least dissonant first.
pub fn run_interval_step(
    curve: &DissonanceCurve,
    tuning: Tuning,
    cfg: &IntervalConfig,
) -> IntervalResult {
    let intervals = find_local_minima(curve, cfg.top_k)
        .into_iter()
        .map(|minimum| ConsonantInterval {
            step: nearest_step(minimum.cents, tuning),
            rational: best_rational(minimum.cents, cfg.tolerance_cents, cfg.max_denominator),
            minimum,
        })
        .collect();
    IntervalResult { intervals }
}

/// Interior local minima of the curve ranked by value ascending.
pub fn find_local_minima(curve: &DissonanceCurve, top_k: usize) -> Vec<LocalMinimum> {
    let xs = &curve.points;
    let n = xs.len();
    if n < 3 {
        return Vec::new();
    }
    let mut mins: Vec<LocalMinimum> = Vec::new();

    for i in 1..n - 1 {
        let (l, m, r) = (xs[i - 1].value, xs[i].value, xs[i + 1].value);
        if m <= l && m <= r && (m < l || m < r) {
            let shoulder = 0.5 * (climb(xs, i, Side::Left) + climb(xs, i, Side::Right));
            mins.push(LocalMinimum {
                cents: xs[i].position,
                value: m,
                depth: (shoulder - m).max(0.0),
            });
        }
    }

    mins.sort_by(|a, b| {
        a.value
            .partial_cmp(&b.value)
            .unwrap_or(Ordering::Equal)
            .then(b.depth.partial_cmp(&a.depth).unwrap_or(Ordering::Equal))
    });
    mins.truncate(top_k);
    mins
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Highest value reached walking uphill from `idx`.
fn climb(xs: &[DissonancePoint], idx: usize, side: Side) -> f64 {
    let mut i = idx;
    let mut best = xs[idx].value;
    loop {
        let next = match side {
            Side::Left if i > 0 => i - 1,
            Side::Right if i + 1 < xs.len() => i + 1,
            _ => break,
        };
        if xs[next].value > best {
            best = xs[next].value;
            i = next;
        } else {
            break;
        }
    }
    best
}

pub fn nearest_step(cents: f64, tuning: Tuning) -> Option<ScaleStep> {
    match tuning {
        Tuning::Harmonic | Tuning::Edo(0) => None,
        Tuning::Edo(n) => {
            let step_cents = 1200.0 / n as f64;
            let step = (cents / step_cents).round();
            Some(ScaleStep {
                step: step as i64,
                divisions: n,
                cents_error: cents - step * step_cents,
            })
        }
    }
}

/// Simplest p/q within `tol_cents` of `target_cents`.
pub fn best_rational(target_cents: f64, tol_cents: f64, max_q: u32) -> Option<RationalInterval> {
    let target_ratio = cents_to_ratio(target_cents);
    let mut out: Vec<RationalInterval> = Vec::new();
    for q in 1..=max_q {
        let p = (target_ratio * q as f64).round().max(1.0) as u32;
        let g = gcd(p, q);
        let (pn, qn) = (p / g, q / g);
        let cents = ratio_to_cents(pn as f64 / qn as f64);
        let err = cents - target_cents;
        if err.abs() <= tol_cents && !out.iter().any(|c| c.p == pn && c.q == qn) {
            out.push(RationalInterval {
                p: pn,
                q: qn,
                cents,
                cents_error: err,
                complexity: (pn as f64).ln() + (qn as f64).ln(), // ~ Tenney height
                label: suggest_label(pn, qn),
            });
        }
    }
    out.into_iter().min_by(|a, b| {
        a.complexity
            .partial_cmp(&b.complexity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                a.cents_error
                    .abs()
                    .partial_cmp(&b.cents_error.abs())
                    .unwrap_or(Ordering::Equal)
            })
    })
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Provide a friendly label for common small-ratio intervals. Fallback to "p/q".
fn suggest_label(p: u32, q: u32) -> String {
    const MAP: &[(u32, u32, &str)] = &[
        (1, 2, "octave below"),
        (1, 1, "unison"),
        (16, 15, "minor second"),
        (9, 8, "major second"),
        (7, 6, "septimal minor third"),
        (6, 5, "minor third"),
        (5, 4, "major third"),
        (9, 7, "septimal major third"),
        (4, 3, "perfect fourth"),
        (7, 5, "septimal tritone"),
        (10, 7, "septimal tritone"),
        (3, 2, "perfect fifth"),
        (8, 5, "minor sixth"),
        (5, 3, "major sixth"),
        (7, 4, "harmonic seventh"),
        (9, 5, "large minor seventh"),
        (15, 8, "major seventh"),
        (2, 1, "octave"),
        (9, 4, "major ninth"),
    ];
    MAP.iter()
        .find(|(pn, qn, _)| *pn == p && *qn == q)
        .map(|(_, _, name)| format!("{p}/{q} ({name})"))
        .unwrap_or_else(|| format!("{p}/{q}"))
}
