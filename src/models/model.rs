//! Closed-form evaluation of the fitted curves.
//!
//! The fitter and the stepper rely on three primitive operations:
//! - the shape's basis value `g(x; b)` (the fitter builds its design rows from it)
//! - `y(x) = a·g(x; b) + c` for a year curve, with domain checking
//! - the temperature response to emission and deforestation
//!
//! Everything here is pure: no randomness, no state.

use crate::domain::{CorrelationParams, CurveParams, CurveShape};
use crate::error::ModelError;
use crate::math::{ln_shift, recip_shift};

/// Basis value `g(x; b)` for the given shape, or `None` outside its domain.
pub fn basis(shape: CurveShape, x: f64, b: f64) -> Option<f64> {
    match shape {
        CurveShape::Logarithmic => ln_shift(x, b),
        CurveShape::Hyperbolic => recip_shift(x, b),
    }
}

/// Evaluate `y(x)` for a year curve.
///
/// Returns [`ModelError::DomainViolation`] when `x` is outside the domain of
/// the shape (`x ≤ b` for the logarithm, `x == b` for the hyperbola).
pub fn evaluate(shape: CurveShape, x: f64, params: &CurveParams) -> Result<f64, ModelError> {
    let g = basis(shape, x, params.b).ok_or(ModelError::DomainViolation {
        curve: shape.kind(),
        x,
        b: params.b,
    })?;
    Ok(params.a * g + params.c)
}

/// Temperature change implied by one year's drivers:
/// `|a|·(emission − b) + |c|·(deforestation − d) + e`.
pub fn temperature_change(params: &CorrelationParams, emission: f64, deforestation: f64) -> f64 {
    params.a.abs() * (emission - params.b) + params.c.abs() * (deforestation - params.d) + params.e
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CurveKind;

    #[test]
    fn evaluate_logarithmic_matches_closed_form() {
        let p = CurveParams::new(500.0, 1985.0, -3000.0);
        let y = evaluate(CurveShape::Logarithmic, 2021.0, &p).unwrap();
        assert_eq!(y, 500.0 * (2021.0_f64 - 1985.0).ln() - 3000.0);
    }

    #[test]
    fn evaluate_hyperbolic_matches_closed_form() {
        let p = CurveParams::new(2.0e5, 1980.0, 40_000.0);
        let y = evaluate(CurveShape::Hyperbolic, 2020.0, &p).unwrap();
        assert!((y - (2.0e5 / 40.0 + 40_000.0)).abs() < 1e-9);
    }

    #[test]
    fn evaluate_at_shift_is_domain_violation() {
        let p = CurveParams::new(1.0, 2000.0, 0.0);
        for shape in [CurveShape::Logarithmic, CurveShape::Hyperbolic] {
            let err = evaluate(shape, 2000.0, &p).unwrap_err();
            assert!(matches!(err, ModelError::DomainViolation { b, .. } if b == 2000.0));
        }
        let err = evaluate(CurveShape::Logarithmic, 1999.0, &p).unwrap_err();
        assert!(matches!(err, ModelError::DomainViolation { curve: CurveKind::Emission, .. }));
    }

    #[test]
    fn temperature_change_uses_absolute_slopes() {
        let p = CorrelationParams::new(-0.001, 600.0, -0.0002, 25_000.0, 0.01);
        let dt = temperature_change(&p, 620.0, 26_000.0);
        assert!((dt - 0.23).abs() < 1e-12);
    }
}
