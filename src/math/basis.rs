//! Shifted basis functions for the year curves.
//!
//! - `ln_shift(x, b) = ln(x − b)`, defined for `x > b`
//! - `recip_shift(x, b) = 1 / (x − b)`, defined for `x ≠ b`
//!
//! Both return `None` outside their domain instead of producing NaN/inf, so
//! callers can decide whether that is a rejected candidate or an error.

/// Compute `ln(x − b)`, or `None` when `x − b ≤ 0`.
pub fn ln_shift(x: f64, b: f64) -> Option<f64> {
    let dx = x - b;
    if !(dx > 0.0) {
        return None;
    }
    let v = dx.ln();
    v.is_finite().then_some(v)
}

/// Compute `1 / (x − b)`, or `None` when `x == b` (or the result is not finite).
pub fn recip_shift(x: f64, b: f64) -> Option<f64> {
    let dx = x - b;
    if dx == 0.0 || !dx.is_finite() {
        return None;
    }
    let v = 1.0 / dx;
    v.is_finite().then_some(v)
}
