//! Temperature-response fit.
//!
//! The model is
//!
//! ```text
//! Δt = |a|·(emission − b) + |c|·(deforestation − d) + e
//! ```
//!
//! which is only identified up to two non-negative slopes and one intercept:
//! shifting `b` or `d` just moves the constant into `e`. We therefore:
//!
//! - centre both regressors on their sample means (these become `b` and `d`)
//! - solve non-negative least squares for the slopes by enumerating the active
//!   sets (both, emission only, deforestation only, none) and keeping the
//!   feasible one with the lowest SSE
//! - report the fitted intercept as `e` (the mean temperature change)
//!
//! With two slopes the enumeration is exact: the constrained optimum is the
//! unconstrained optimum of one of the four subsets.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::{CorrelationFit, CorrelationParams, CurveKind, FitQuality};
use crate::error::ModelError;
use crate::math::{solve_least_squares, sum_squared_residuals};

/// Observations required beyond the parameter count.
const MIN_EXTRA_POINTS: usize = 1;

/// Column subsets tried, in tie-break order: (emission, deforestation).
const ACTIVE_SETS: [(bool, bool); 4] = [(true, true), (true, false), (false, true), (false, false)];

/// Fit the temperature response jointly to three aligned series.
pub fn fit_correlation(
    temps_delta: &[f64],
    emissions: &[f64],
    deforestations: &[f64],
) -> Result<CorrelationFit, ModelError> {
    let kind = CurveKind::Correlation;
    let n = temps_delta.len();
    if emissions.len() != n || deforestations.len() != n {
        return Err(ModelError::fit_failure(
            kind,
            format!(
                "series lengths differ: temperature={n}, emission={}, deforestation={}",
                emissions.len(),
                deforestations.len()
            ),
        ));
    }
    let required = kind.param_count() + MIN_EXTRA_POINTS;
    if n < required {
        return Err(ModelError::fit_failure(
            kind,
            format!("underdetermined: n={n} points for {} parameters (need at least {required})", kind.param_count()),
        ));
    }
    let all_finite = temps_delta
        .iter()
        .chain(emissions)
        .chain(deforestations)
        .all(|v| v.is_finite());
    if !all_finite {
        return Err(ModelError::fit_failure(kind, "series contain non-finite values"));
    }

    let emission_mean = mean(emissions);
    let deforestation_mean = mean(deforestations);
    let y = DVector::from_column_slice(temps_delta);

    let mut best: Option<(f64, f64, f64, f64)> = None; // (slope_e, slope_d, intercept, sse)
    for (use_emission, use_deforestation) in ACTIVE_SETS {
        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(3);
        if use_emission {
            columns.push(emissions.iter().map(|v| v - emission_mean).collect());
        }
        if use_deforestation {
            columns.push(deforestations.iter().map(|v| v - deforestation_mean).collect());
        }
        columns.push(vec![1.0; n]);

        let design = DMatrix::from_fn(n, columns.len(), |i, j| columns[j][i]);
        let Some(beta) = solve_least_squares(&design, &y) else {
            continue;
        };

        let mut coefs = beta.iter().copied();
        let slope_e = if use_emission { coefs.next().unwrap_or(0.0) } else { 0.0 };
        let slope_d = if use_deforestation { coefs.next().unwrap_or(0.0) } else { 0.0 };
        let intercept = beta[beta.len() - 1];

        // `|a|` and `|c|` cannot represent a negative response.
        if slope_e < 0.0 || slope_d < 0.0 {
            continue;
        }

        let sse = sum_squared_residuals(&design, &y, &beta);
        if !sse.is_finite() {
            continue;
        }
        if best.is_none_or(|(_, _, _, best_sse)| sse < best_sse) {
            best = Some((slope_e, slope_d, intercept, sse));
        }
    }

    let Some((a, c, e, sse)) = best else {
        return Err(ModelError::fit_failure(kind, "least squares did not converge"));
    };

    let params = CorrelationParams {
        a,
        b: emission_mean,
        c,
        d: deforestation_mean,
        e,
    };
    let quality = FitQuality::from_sse(sse, n);
    debug!(
        target: "climsim.fit",
        a, b = params.b, c, d = params.d, e,
        rmse = quality.rmse,
        "correlation fitted"
    );

    Ok(CorrelationFit { params, quality })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::temperature_change;

    fn drivers(n: usize) -> (Vec<f64>, Vec<f64>) {
        let emissions = (0..n).map(|i| 600.0 + 4.0 * i as f64 + (i % 3) as f64 * 7.0).collect();
        let deforestations = (0..n)
            .map(|i| 50_000.0 - 600.0 * i as f64 + (i % 4) as f64 * 900.0)
            .collect();
        (emissions, deforestations)
    }

    #[test]
    fn recovers_positive_slopes() {
        let truth = CorrelationParams::new(0.002, 640.0, 0.00003, 40_000.0, 0.05);
        let (emissions, deforestations) = drivers(27);
        let temps: Vec<f64> = emissions
            .iter()
            .zip(&deforestations)
            .map(|(&em, &df)| temperature_change(&truth, em, df))
            .collect();

        let fit = fit_correlation(&temps, &emissions, &deforestations).unwrap();
        assert!(fit.quality.rmse < 1e-9, "rmse {}", fit.quality.rmse);
        assert!((fit.params.a - 0.002).abs() < 1e-9);
        assert!((fit.params.c - 0.00003).abs() < 1e-10);

        // The reparameterised curve predicts the same changes.
        for ((&em, &df), &t) in emissions.iter().zip(&deforestations).zip(&temps) {
            assert!((temperature_change(&fit.params, em, df) - t).abs() < 1e-9);
        }
    }

    #[test]
    fn negative_response_is_clamped_to_zero_slope() {
        let (emissions, deforestations) = drivers(27);
        // Temperature falls with emission: the best admissible slope is 0.
        let temps: Vec<f64> = emissions.iter().map(|em| 1.0 - 0.01 * em).collect();

        let fit = fit_correlation(&temps, &emissions, &deforestations).unwrap();
        assert!(fit.params.a >= 0.0);
        assert!(fit.params.c >= 0.0);
        assert_eq!(fit.params.a, 0.0);
    }

    #[test]
    fn mismatched_lengths_fail() {
        let err = fit_correlation(&[0.1; 10], &[1.0; 10], &[1.0; 9]).unwrap_err();
        assert!(matches!(err, ModelError::FitFailure { curve: CurveKind::Correlation, .. }));
    }

    #[test]
    fn too_few_points_fail() {
        let err = fit_correlation(&[0.1; 5], &[1.0; 5], &[2.0; 5]).unwrap_err();
        assert!(err.to_string().contains("underdetermined"));
    }
}
