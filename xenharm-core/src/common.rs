/// Partials at or above this frequency are inaudible and never generated.
pub const AUDIBLE_LIMIT_HZ: f64 = 20_000.0;

#[inline]
pub fn cents_to_ratio(c: f64) -> f64 {
    (c / 1200.0).exp2() // 2^(c/1200)
}

#[inline]
pub fn ratio_to_cents(r: f64) -> f64 {
    1200.0 * r.log2()
}

/// Round to a fixed number of decimal places (half away from zero).
#[inline]
pub fn round_to(x: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (x * scale).round() / scale
}

/// Largest value of a sequence, `None` when empty. NaN entries are skipped.
pub fn max_value<I: IntoIterator<Item = f64>>(xs: I) -> Option<f64> {
    xs.into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
}
