//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::{Calibration, season_name};
use crate::domain::{CurveFit, Quantity, Season, YearStep};

/// Shown for every year in which a hydro event fired.
pub const HYDRO_MESSAGE: &str =
    "During the hydroelectric reservoir development this year, large forest areas are flooded.";

/// Format the calibration summary (inputs + fitted parameters + fit quality).
pub fn format_calibration(calibration: &Calibration, season: Season, demo: bool) -> String {
    let mut out = String::new();

    out.push_str("=== climsim - model calibration ===\n");
    out.push_str(&format!(
        "Data: {} | season: {}\n",
        if demo { "synthetic demo" } else { "historical CSVs" },
        season_name(season)
    ));
    for report in &calibration.reports {
        out.push_str(&format!(
            "  {}: read={} used={} skipped={}\n",
            report.path.display(),
            report.rows_read,
            report.rows_used,
            report.rows_skipped()
        ));
    }
    if let (Some(first), Some(last)) = (calibration.inputs.years.first(), calibration.inputs.years.last()) {
        out.push_str(&format!(
            "Correlation window: {first}-{last} (n={})\n",
            calibration.inputs.years.len()
        ));
    }

    out.push_str("\nCurves:\n");
    out.push_str(&format_curve_fit(Quantity::Emission, &calibration.emission));
    out.push_str(&format_curve_fit(Quantity::Deforestation, &calibration.deforestation));

    let p = &calibration.correlation.params;
    let q = &calibration.correlation.quality;
    out.push_str(&format!(
        "  {:<14} dt = |a|(em - b) + |c|(df - d) + e\n",
        "Temperature"
    ));
    out.push_str(&format!(
        "  {:<14} a={:.6e} b={:.3} c={:.6e} d={:.3} e={:.6}\n",
        "", p.a, p.b, p.c, p.d, p.e
    ));
    out.push_str(&format!("  {:<14} SSE={:.6} RMSE={:.6} n={}\n", "", q.sse, q.rmse, q.n));

    out
}

fn format_curve_fit(quantity: Quantity, fit: &CurveFit) -> String {
    let p = &fit.params;
    format!(
        "  {:<14} {}\n  {:<14} a={:.4} b={:.4} c={:.4}\n  {:<14} RMSE={:.3} {} n={}\n",
        quantity.label(),
        fit.shape.formula(),
        "",
        p.a,
        p.b,
        p.c,
        "",
        fit.quality.rmse,
        quantity.unit(),
        fit.quality.n
    )
}

/// One simulated year as a single line (plus the hydro message when it fired).
pub fn format_step(step: &YearStep) -> String {
    let mut line = format!(
        "{}  emission={:.3}  deforestation={:.3}  temperature={:.3}",
        step.year, step.emission, step.deforestation, step.temperature
    );
    if step.hydro {
        line.push('\n');
        line.push_str(HYDRO_MESSAGE);
    }
    line
}

/// Closing summary of a finished run.
pub fn format_run_summary(history: &[YearStep]) -> String {
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        return "No years simulated.\n".to_string();
    };
    let hydro = history.iter().filter(|s| s.hydro).count();
    format!(
        "Simulated {}-{}: temperature {:.3} -> {:.3} ({:+.3}), hydro events: {hydro}\n",
        first.year,
        last.year,
        first.temperature,
        last.temperature,
        last.temperature - first.temperature
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(year: i32, temperature: f64, hydro: bool) -> YearStep {
        YearStep {
            year,
            emission: 700.0,
            deforestation: 40_000.0,
            temperature,
            hydro,
        }
    }

    #[test]
    fn hydro_step_includes_message() {
        let text = format_step(&step(2031, 14.5, true));
        assert!(text.starts_with("2031"));
        assert!(text.ends_with(HYDRO_MESSAGE));
        assert!(!format_step(&step(2032, 14.5, false)).contains("hydroelectric"));
    }

    #[test]
    fn run_summary_reports_change_and_events() {
        let history = [step(2020, 14.0, false), step(2021, 14.25, true), step(2022, 14.5, false)];
        let text = format_run_summary(&history);
        assert!(text.contains("2020-2022"));
        assert!(text.contains("+0.500"));
        assert!(text.contains("hydro events: 1"));
    }
}
