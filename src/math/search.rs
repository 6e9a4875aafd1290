//! One-dimensional bracketed minimization.

/// `1/φ`, the golden-section contraction factor.
const INV_PHI: f64 = 0.618_033_988_749_894_8;

/// Minimize `f` on `[lo, hi]` by golden-section search.
///
/// Returns `(argmin, min)`. `f` may return `f64::INFINITY` for rejected points;
/// the search is deterministic and evaluates `f` exactly `iters + 2` times at most.
pub fn golden_section_min<F>(f: F, lo: f64, hi: f64, iters: usize) -> (f64, f64)
where
    F: Fn(f64) -> f64,
{
    let (mut lo, mut hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };

    let mut c = hi - INV_PHI * (hi - lo);
    let mut d = lo + INV_PHI * (hi - lo);
    let mut fc = f(c);
    let mut fd = f(d);

    for _ in 0..iters {
        if (hi - lo).abs() <= 1e-12 * (1.0 + lo.abs().max(hi.abs())) {
            break;
        }
        if fc < fd {
            hi = d;
            d = c;
            fd = fc;
            c = hi - INV_PHI * (hi - lo);
            fc = f(c);
        } else {
            lo = c;
            c = d;
            fc = fd;
            d = lo + INV_PHI * (hi - lo);
            fd = f(d);
        }
    }

    if fc < fd { (c, fc) } else { (d, fd) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_parabola_minimum() {
        let (x, fx) = golden_section_min(|x| (x - 1.25).powi(2) + 3.0, -4.0, 10.0, 200);
        assert!((x - 1.25).abs() < 1e-6, "argmin {x}");
        assert!((fx - 3.0).abs() < 1e-10);
    }

    #[test]
    fn tolerates_rejected_region() {
        // Everything left of 0.5 is infeasible.
        let f = |x: f64| if x < 0.5 { f64::INFINITY } else { (x - 0.75).abs() };
        let (x, _) = golden_section_min(f, 0.0, 2.0, 200);
        assert!((x - 0.75).abs() < 1e-6, "argmin {x}");
    }
}
