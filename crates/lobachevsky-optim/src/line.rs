//! One-dimensional minimization along a search direction: descent-step
//! probing, golden-ratio bracket expansion, then golden-section refinement.

const GOLD: f64 = 1.618_033_988_749_895;
const INV_PHI: f64 = 0.618_033_988_749_895;
const INV_PHI2: f64 = 0.381_966_011_250_105;

/// Minimize `φ(α) = f(x + α·dir)` and return the updated point with its value.
///
/// Returns `(x, fx)` unchanged when no descent step can be found along either
/// orientation of `dir`, meaning the current point is already a line minimum to the
/// probe resolution.
pub(crate) fn minimize_along<F>(
    f: &mut F,
    x: &[f64],
    fx: f64,
    dir: &[f64],
    tol: f64,
) -> (Vec<f64>, f64)
where
    F: FnMut(&[f64]) -> f64,
{
    let dir_norm_sq: f64 = dir.iter().map(|d| d * d).sum();
    if dir_norm_sq < 1e-300 {
        return (x.to_vec(), fx);
    }

    let mut phi = |alpha: f64| -> f64 {
        let probe: Vec<f64> = x
            .iter()
            .zip(dir.iter())
            .map(|(&xi, &di)| xi + alpha * di)
            .collect();
        f(&probe)
    };

    // Probe for a descending orientation, shrinking the step when both
    // directions go uphill.
    let mut step = 1.0;
    let mut alpha_b = 0.0;
    let mut f_b = fx;
    for _ in 0..40 {
        let f_pos = phi(step);
        if f_pos < fx {
            alpha_b = step;
            f_b = f_pos;
            break;
        }
        let f_neg = phi(-step);
        if f_neg < fx {
            alpha_b = -step;
            f_b = f_neg;
            break;
        }
        step *= 0.5;
    }
    if alpha_b == 0.0 {
        return (x.to_vec(), fx);
    }

    // Expand the bracket until the function turns upward again.
    let mut alpha_a = 0.0;
    let mut alpha_c = alpha_b * GOLD;
    let mut f_c = phi(alpha_c);
    let mut expansions = 0;
    while f_c < f_b && expansions < 60 {
        alpha_a = alpha_b;
        alpha_b = alpha_c;
        f_b = f_c;
        alpha_c *= GOLD;
        f_c = phi(alpha_c);
        expansions += 1;
    }

    // Golden-section refinement on the ordered interval.
    let (mut lo, mut hi) = if alpha_a < alpha_c { (alpha_a, alpha_c) } else { (alpha_c, alpha_a) };
    let mut h = hi - lo;
    let mut c = lo + INV_PHI2 * h;
    let mut d = lo + INV_PHI * h;
    let mut f_c2 = phi(c);
    let mut f_d = phi(d);
    for _ in 0..200 {
        if h.abs() < tol * (1.0 + alpha_b.abs()) {
            break;
        }
        if f_c2 < f_d {
            hi = d;
            d = c;
            f_d = f_c2;
            h = hi - lo;
            c = lo + INV_PHI2 * h;
            f_c2 = phi(c);
        } else {
            lo = c;
            c = d;
            f_c2 = f_d;
            h = hi - lo;
            d = lo + INV_PHI * h;
            f_d = phi(d);
        }
    }

    let (alpha_best, f_best) = if f_c2 < f_d { (c, f_c2) } else { (d, f_d) };
    // Keep whichever of the refined point and the bracket midpoint won.
    let (alpha_best, f_best) = if f_b < f_best { (alpha_b, f_b) } else { (alpha_best, f_best) };
    if f_best >= fx {
        return (x.to_vec(), fx);
    }

    let moved: Vec<f64> = x
        .iter()
        .zip(dir.iter())
        .map(|(&xi, &di)| xi + alpha_best * di)
        .collect();
    (moved, f_best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_parabola_minimum_along_axis() {
        let mut f = |x: &[f64]| (x[0] - 3.0) * (x[0] - 3.0);
        let (x, fx) = minimize_along(&mut f, &[0.0], 9.0, &[1.0], 1e-8);
        assert!((x[0] - 3.0).abs() < 1e-5, "got {x:?}");
        assert!(fx < 1e-9);
    }

    #[test]
    fn handles_descent_in_negative_direction() {
        let mut f = |x: &[f64]| (x[0] + 2.0) * (x[0] + 2.0);
        let (x, _) = minimize_along(&mut f, &[0.0], 4.0, &[1.0], 1e-8);
        assert!((x[0] + 2.0).abs() < 1e-5, "got {x:?}");
    }

    #[test]
    fn stays_put_at_a_line_minimum() {
        let mut f = |x: &[f64]| x[0] * x[0];
        let (x, fx) = minimize_along(&mut f, &[0.0], 0.0, &[1.0], 1e-8);
        assert_eq!(x, vec![0.0]);
        assert_eq!(fx, 0.0);
    }

    #[test]
    fn zero_direction_is_a_noop() {
        let mut f = |x: &[f64]| x[0] * x[0];
        let (x, fx) = minimize_along(&mut f, &[5.0], 25.0, &[0.0], 1e-8);
        assert_eq!(x, vec![5.0]);
        assert_eq!(fx, 25.0);
    }
}
