//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed / simulated points: `o`
//! - fitted curve or simulated trajectory: `-` line
//! - hydro years: `H`

use crate::domain::{CurveParams, CurveShape, Quantity, Series, YearStep};
use crate::models::evaluate;

/// A plotted point and the glyph used for it.
type Marker = (f64, f64, char);

/// Historical observations overlaid with their fitted curve.
///
/// Without a curve the observations themselves are joined year to year, which
/// is how the national temperature trend is drawn.
pub fn render_fit_plot(
    quantity: Quantity,
    observed: &Series,
    curve: Option<(CurveShape, &CurveParams)>,
    width: usize,
    height: usize,
) -> String {
    let markers: Vec<Marker> = observed.iter().map(|(&year, &v)| (year as f64, v, 'o')).collect();
    let Some((x_min, x_max)) = x_range(&markers) else {
        return format!("{}: no data\n", quantity.label());
    };
    let line = match curve {
        Some((shape, params)) => sample_curve(shape, params, x_min, x_max, width.max(2)),
        None => observed.iter().map(|(&year, &v)| (year as f64, v)).collect(),
    };
    render_plot(quantity, &markers, Some(&line), x_min, x_max, width, height)
}

/// One plot per quantity for a simulated history.
pub fn render_history_plots(history: &[YearStep], width: usize, height: usize) -> String {
    let mut out = String::new();
    for quantity in Quantity::ALL {
        let line: Vec<(f64, f64)> = history
            .iter()
            .map(|s| (s.year as f64, value_of(s, quantity)))
            .collect();
        // Hydro years only stand out on the deforestation plot.
        let markers: Vec<Marker> = history
            .iter()
            .map(|s| {
                let ch = if s.hydro && quantity == Quantity::Deforestation { 'H' } else { 'o' };
                (s.year as f64, value_of(s, quantity), ch)
            })
            .collect();

        let (x_min, x_max) = x_range(&markers).unwrap_or((0.0, 1.0));
        out.push_str(&render_plot(quantity, &markers, Some(&line), x_min, x_max, width, height));
        out.push('\n');
    }
    out
}

pub fn value_of(step: &YearStep, quantity: Quantity) -> f64 {
    match quantity {
        Quantity::Emission => step.emission,
        Quantity::Deforestation => step.deforestation,
        Quantity::Temperature => step.temperature,
    }
}

fn render_plot(
    quantity: Quantity,
    markers: &[Marker],
    curve_points: Option<&[(f64, f64)]>,
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    // Determine y-range from markers and curve points.
    let (y_min, y_max) = y_range(markers, curve_points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curve first (so points can overlay).
    if let Some(curve) = curve_points {
        draw_curve(&mut grid, curve, x_min, x_max, y_min, y_max);
    }

    for &(x, y, ch) in markers {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = ch;
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "{}: year=[{x_min:.0}, {x_max:.0}] | y=[{y_min:.2}, {y_max:.2}]\n",
        quantity.axis_label()
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn x_range(markers: &[Marker]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &(x, _, _) in markers {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if !(min_x.is_finite() && max_x.is_finite()) {
        return None;
    }
    // A single year still gets a visible span.
    if max_x > min_x { Some((min_x, max_x)) } else { Some((min_x - 1.0, max_x + 1.0)) }
}

/// Evenly spaced curve samples; points outside the curve's domain are dropped.
fn sample_curve(shape: CurveShape, params: &CurveParams, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .filter_map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = x_min + u * (x_max - x_min);
            evaluate(shape, x, params).ok().filter(|y| y.is_finite()).map(|y| (x, y))
        })
        .collect()
}

fn y_range(markers: &[Marker], curve: Option<&[(f64, f64)]>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &(_, y, _) in markers {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if let Some(curve) = curve {
        for &(_, y) in curve {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() && min_y == max_y {
        Some((min_y - 0.5, max_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
