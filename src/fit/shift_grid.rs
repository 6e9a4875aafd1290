//! Shift grid generation.
//!
//! The year curves are fitted using a deterministic grid search over the shift `b`.
//!
//! Why grid search?
//! - The SSE is not convex in `b`, and a poor starting point sends a local
//!   optimizer into the domain boundary (`b → min(x)`).
//! - It is deterministic given the same inputs and settings.
//! - With a single nonlinear parameter, a few hundred candidates are cheap.
//!
//! Candidates are placed at log-spaced *distances* outside the data range, so
//! the grid is dense close to the data (where the curve bends) and sparse far
//! away (where both shapes flatten into a straight line).

use crate::domain::{CurveKind, CurveShape, FitSettings};
use crate::error::ModelError;

/// Which side of the data range a shift lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// `b < min(x)`.
    Below,
    /// `b > max(x)`.
    Above,
}

/// A one-parameter family of shifts `b = anchor ∓ distance`.
#[derive(Debug, Clone)]
pub struct ShiftRay {
    pub side: Side,
    /// Closest data year on this side (`min(x)` or `max(x)`).
    pub anchor: f64,
    /// Log-spaced, increasing distances from `anchor`.
    pub distances: Vec<f64>,
}

impl ShiftRay {
    /// Shift value at the given distance from the data.
    pub fn shift(&self, distance: f64) -> f64 {
        match self.side {
            Side::Below => self.anchor - distance,
            Side::Above => self.anchor + distance,
        }
    }
}

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(kind: CurveKind, min: f64, max: f64, steps: usize) -> Result<Vec<f64>, ModelError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(ModelError::fit_failure(
            kind,
            format!("invalid shift range: min={min}, max={max} (must be finite, >0, and max>min)"),
        ));
    }
    if steps < 2 {
        return Err(ModelError::fit_failure(kind, "shift steps must be >= 2"));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// Shift rays to scan for a shape fitted on years in `[x_min, x_max]`.
///
/// - logarithmic: only `b < min(x)` keeps every `ln(x − b)` defined
/// - hyperbolic: `b` may lie on either side of the data, never inside it
pub fn shift_rays(
    shape: CurveShape,
    x_min: f64,
    x_max: f64,
    settings: &FitSettings,
) -> Result<Vec<ShiftRay>, ModelError> {
    let distances = log_space(shape.kind(), settings.shift_min, settings.shift_max, settings.shift_steps)?;

    let below = ShiftRay {
        side: Side::Below,
        anchor: x_min,
        distances: distances.clone(),
    };

    Ok(match shape {
        CurveShape::Logarithmic => vec![below],
        CurveShape::Hyperbolic => vec![
            below,
            ShiftRay {
                side: Side::Above,
                anchor: x_max,
                distances,
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(CurveKind::Emission, 0.1, 10.0, 5).unwrap();
        assert!((v[0] - 0.1).abs() < 1e-12);
        assert!((v[v.len() - 1] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn log_space_rejects_bad_range() {
        assert!(log_space(CurveKind::Emission, 0.0, 10.0, 5).is_err());
        assert!(log_space(CurveKind::Emission, 1.0, 10.0, 1).is_err());
    }

    #[test]
    fn logarithmic_shifts_stay_below_data() {
        let rays = shift_rays(CurveShape::Logarithmic, 1990.0, 2019.0, &FitSettings::default()).unwrap();
        assert_eq!(rays.len(), 1);
        for &d in &rays[0].distances {
            assert!(rays[0].shift(d) < 1990.0);
        }
    }

    #[test]
    fn hyperbolic_shifts_straddle_data() {
        let rays = shift_rays(CurveShape::Hyperbolic, 1990.0, 2019.0, &FitSettings::default()).unwrap();
        assert_eq!(rays.len(), 2);
        assert!(rays[0].shift(1.0) < 1990.0);
        assert!(rays[1].shift(1.0) > 2019.0);
    }
}
