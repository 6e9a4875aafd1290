//! Low-level fitting routine for a single year curve.
//!
//! Given:
//! - years `x_i`
//! - observed values `y_i`
//! - a curve shape (`a·ln(x−b)+c` or `a/(x−b)+c`)
//!
//! we solve, for each candidate shift `b`:
//! - an OLS problem for the linear coefficients `(a, c)`
//! - the resulting SSE
//!
//! then keep the best (lowest SSE) candidate and polish its shift with a
//! golden-section search between the neighbouring grid points.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::{CurveFit, CurveParams, CurveShape, FitQuality, FitSettings, Series};
use crate::error::ModelError;
use crate::fit::shift_grid::{ShiftRay, shift_rays};
use crate::math::{golden_section_min, solve_least_squares};
use crate::models::basis;

/// Observations required beyond the parameter count.
const MIN_EXTRA_POINTS: usize = 1;

#[derive(Debug, Clone)]
struct Candidate {
    ray: usize,
    idx: usize,
    params: CurveParams,
    sse: f64,
}

/// Fit `y = a·ln(x−b) + c` to an emission series with default settings.
pub fn fit_emission_curve(series: &Series) -> Result<CurveFit, ModelError> {
    fit_curve(CurveShape::Logarithmic, series, &FitSettings::default())
}

/// Fit `y = a/(x−b) + c` to a deforestation series with default settings.
pub fn fit_deforestation_curve(series: &Series) -> Result<CurveFit, ModelError> {
    fit_curve(CurveShape::Hyperbolic, series, &FitSettings::default())
}

/// Fit a year curve of the given shape.
pub fn fit_curve(shape: CurveShape, series: &Series, settings: &FitSettings) -> Result<CurveFit, ModelError> {
    let kind = shape.kind();
    let n = series.len();
    let required = kind.param_count() + MIN_EXTRA_POINTS;
    if n < required {
        return Err(ModelError::fit_failure(
            kind,
            format!("underdetermined: n={n} points for {} parameters (need at least {required})", kind.param_count()),
        ));
    }

    let xs: Vec<f64> = series.keys().map(|&year| year as f64).collect();
    let ys: Vec<f64> = series.values().copied().collect();
    if ys.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::fit_failure(kind, "series contains non-finite values"));
    }

    // BTreeMap keys are sorted.
    let x_min = xs[0];
    let x_max = xs[n - 1];
    let rays = shift_rays(shape, x_min, x_max, settings)?;

    let Some(grid_best) = best_on_grid(shape, &rays, &xs, &ys) else {
        return Err(ModelError::fit_failure(
            kind,
            "no finite candidate on the shift grid (non-convergence)",
        ));
    };
    debug!(
        target: "climsim.fit",
        curve = %kind,
        b = grid_best.params.b,
        sse = grid_best.sse,
        "grid search done"
    );

    let (params, sse) = match refine(shape, &rays[grid_best.ray], grid_best.idx, &xs, &ys, settings.refine_iters) {
        Some((params, sse)) if sse < grid_best.sse => (params, sse),
        _ => (grid_best.params, grid_best.sse),
    };

    // The shift must leave every observation inside the curve's domain.
    if let Some(&x) = xs.iter().find(|&&x| basis(shape, x, params.b).is_none()) {
        return Err(ModelError::fit_failure(
            kind,
            format!("domain violation: x={x} with fitted b={}", params.b),
        ));
    }

    let quality = FitQuality::from_sse(sse, n);
    debug!(
        target: "climsim.fit",
        curve = %kind,
        a = params.a,
        b = params.b,
        c = params.c,
        rmse = quality.rmse,
        "curve fitted"
    );

    Ok(CurveFit { shape, params, quality })
}

fn best_on_grid(shape: CurveShape, rays: &[ShiftRay], xs: &[f64], ys: &[f64]) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for (ray_idx, ray) in rays.iter().enumerate() {
        for (idx, &distance) in ray.distances.iter().enumerate() {
            let Some((params, sse)) = evaluate_shift(shape, ray.shift(distance), xs, ys) else {
                continue;
            };
            // Deterministic selection: strict improvement only, so ties keep the
            // earlier (ray, index) candidate.
            if best.as_ref().is_none_or(|b| sse < b.sse) {
                best = Some(Candidate {
                    ray: ray_idx,
                    idx,
                    params,
                    sse,
                });
            }
        }
    }
    best
}

/// Golden-section search on `ln(distance)` between the grid neighbours of `idx`.
fn refine(
    shape: CurveShape,
    ray: &ShiftRay,
    idx: usize,
    xs: &[f64],
    ys: &[f64],
    iters: usize,
) -> Option<(CurveParams, f64)> {
    if iters == 0 || ray.distances.len() < 2 {
        return None;
    }
    let lo = ray.distances[idx.saturating_sub(1)].ln();
    let hi = ray.distances[(idx + 1).min(ray.distances.len() - 1)].ln();

    let sse_at = |u: f64| {
        evaluate_shift(shape, ray.shift(u.exp()), xs, ys)
            .map(|(_, sse)| sse)
            .unwrap_or(f64::INFINITY)
    };
    let (u, _) = golden_section_min(sse_at, lo, hi, iters);

    evaluate_shift(shape, ray.shift(u.exp()), xs, ys)
}

/// Solve `(a, c)` for a fixed shift and return the parameters with their SSE.
///
/// The basis column is centred before solving so the 2×2 system stays well
/// conditioned even when `g(x; b)` is nearly constant.
fn evaluate_shift(shape: CurveShape, b: f64, xs: &[f64], ys: &[f64]) -> Option<(CurveParams, f64)> {
    if !b.is_finite() {
        return None;
    }
    let g: Vec<f64> = xs.iter().map(|&x| basis(shape, x, b)).collect::<Option<_>>()?;
    let n = g.len();
    let g_mean = g.iter().sum::<f64>() / n as f64;

    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &gi) in g.iter().enumerate() {
        design[(i, 0)] = gi - g_mean;
        design[(i, 1)] = 1.0;
    }
    let y = DVector::from_column_slice(ys);

    let beta = solve_least_squares(&design, &y)?;
    let a = beta[0];
    let c = beta[1] - a * g_mean;

    let sse: f64 = g
        .iter()
        .zip(ys)
        .map(|(&gi, &yi)| {
            let r = yi - (a * gi + c);
            r * r
        })
        .sum();

    sse.is_finite().then_some((CurveParams { a, b, c }, sse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::models::evaluate;

    fn series_from(shape: CurveShape, params: &CurveParams, years: std::ops::RangeInclusive<i32>) -> Series {
        years
            .map(|year| (year, evaluate(shape, year as f64, params).unwrap()))
            .collect()
    }

    #[test]
    fn recovers_exact_logarithmic_curve() {
        let truth = CurveParams::new(500.0, 1985.0, -3000.0);
        let series = series_from(CurveShape::Logarithmic, &truth, 1990..=2019);

        let fit = fit_emission_curve(&series).unwrap();
        assert!(fit.quality.rmse < 0.05, "rmse {}", fit.quality.rmse);
        assert!((fit.params.b - 1985.0).abs() < 0.05, "b {}", fit.params.b);
        assert!((fit.params.a - 500.0).abs() < 1.0, "a {}", fit.params.a);
    }

    #[test]
    fn recovers_exact_hyperbolic_curve() {
        let truth = CurveParams::new(269_000.0, 1980.0, 33_100.0);
        let series = series_from(CurveShape::Hyperbolic, &truth, 1990..=2019);

        let fit = fit_deforestation_curve(&series).unwrap();
        assert!(fit.quality.rmse < 1.0, "rmse {}", fit.quality.rmse);
        assert!((fit.params.b - 1980.0).abs() < 0.05, "b {}", fit.params.b);
    }

    #[test]
    fn noisy_series_fits_within_noise_scale() {
        let truth = CurveParams::new(60.0, 1985.0, 503.0);
        let mut series = series_from(CurveShape::Logarithmic, &truth, 1990..=2019);
        // Deterministic ±5 Mt zig-zag.
        for (i, v) in series.values_mut().enumerate() {
            *v += if i % 2 == 0 { 5.0 } else { -5.0 };
        }

        let fit = fit_emission_curve(&series).unwrap();
        assert!(fit.quality.rmse < 5.5, "rmse {}", fit.quality.rmse);
        assert!(fit.params.b < 1990.0);
    }

    #[test]
    fn fit_is_deterministic() {
        let truth = CurveParams::new(269_000.0, 1980.0, 33_100.0);
        let mut series = series_from(CurveShape::Hyperbolic, &truth, 1990..=2019);
        series.insert(2005, 41_000.0);

        let a = fit_deforestation_curve(&series).unwrap();
        let b = fit_deforestation_curve(&series).unwrap();
        assert_eq!(a.params, b.params);
    }

    #[test]
    fn too_few_points_is_fit_failure() {
        let series: Series = [(2000, 1.0), (2001, 2.0), (2002, 2.5)].into_iter().collect();
        let err = fit_emission_curve(&series).unwrap_err();
        assert!(matches!(err, ModelError::FitFailure { .. }));
        assert!(err.to_string().contains("underdetermined"));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let series: Series = [(2000, 1.0), (2001, f64::NAN), (2002, 2.5), (2003, 3.0)]
            .into_iter()
            .collect();
        assert!(fit_deforestation_curve(&series).is_err());
    }
}
