//! Powell's direction-set method.
//!
//! Derivative-free: cycles through a set of search directions, line-minimizing
//! along each, and replaces the direction of largest decrease with the overall
//! displacement when the standard acceptance test passes. The workhorse for
//! the manifold losses and MDS reconstruction, where no analytic gradient
//! exists.

use crate::line::minimize_along;
use crate::OptimReport;

#[derive(Debug, Clone)]
pub struct PowellOptions {
    /// Outer iteration budget.
    pub max_iter: usize,
    /// Relative decrease threshold for convergence.
    pub ftol: f64,
    /// Tolerance handed to the line minimizer.
    pub line_tol: f64,
}

impl Default for PowellOptions {
    fn default() -> Self {
        Self {
            max_iter: 200,
            ftol: 1e-8,
            line_tol: 1e-8,
        }
    }
}

/// Minimize `f` starting from `x0`.
pub fn minimize<F>(mut f: F, x0: &[f64], opts: &PowellOptions) -> OptimReport
where
    F: FnMut(&[f64]) -> f64,
{
    let n = x0.len();
    let mut x = x0.to_vec();
    let mut fx = f(&x);
    if n == 0 {
        return OptimReport { x, fx, iterations: 0, converged: true };
    }

    // Initial directions: coordinate axes.
    let mut directions: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let mut d = vec![0.0; n];
            d[i] = 1.0;
            d
        })
        .collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < opts.max_iter {
        iterations += 1;
        let f_start = fx;
        let x_start = x.clone();

        let mut biggest_drop = 0.0;
        let mut biggest_idx = 0;
        for (i, dir) in directions.iter().enumerate() {
            let f_before = fx;
            let (x_new, f_new) = minimize_along(&mut f, &x, fx, dir, opts.line_tol);
            x = x_new;
            fx = f_new;
            let drop = f_before - fx;
            if drop > biggest_drop {
                biggest_drop = drop;
                biggest_idx = i;
            }
        }

        tracing::debug!(iteration = iterations, loss = fx, "powell sweep complete");

        if 2.0 * (f_start - fx) <= opts.ftol * (f_start.abs() + fx.abs()) + 1e-20 {
            converged = true;
            break;
        }

        // Extrapolate along the overall displacement and decide whether to
        // adopt it as a new direction (Powell's acceptance test).
        let displacement: Vec<f64> = x
            .iter()
            .zip(x_start.iter())
            .map(|(a, b)| a - b)
            .collect();
        let extrapolated: Vec<f64> = x
            .iter()
            .zip(x_start.iter())
            .map(|(a, b)| 2.0 * a - b)
            .collect();
        let f_extrap = f(&extrapolated);

        if f_extrap < f_start {
            let term1 = f_start - fx - biggest_drop;
            let term2 = f_start - f_extrap;
            let t = 2.0 * (f_start - 2.0 * fx + f_extrap) * term1 * term1
                - biggest_drop * term2 * term2;
            if t < 0.0 {
                let (x_new, f_new) = minimize_along(&mut f, &x, fx, &displacement, opts.line_tol);
                x = x_new;
                fx = f_new;
                directions[biggest_idx] = directions[n - 1].clone();
                directions[n - 1] = displacement;
            }
        }
    }

    OptimReport { x, fx, iterations, converged }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_bowl_converges() {
        let f = |x: &[f64]| (x[0] - 1.0).powi(2) + 10.0 * (x[1] + 2.0).powi(2);
        let r = minimize(f, &[5.0, 5.0], &PowellOptions::default());
        assert!(r.converged);
        assert!((r.x[0] - 1.0).abs() < 1e-4, "{:?}", r.x);
        assert!((r.x[1] + 2.0).abs() < 1e-4, "{:?}", r.x);
    }

    #[test]
    fn coupled_quadratic_converges() {
        // Cross term forces the direction-set update to do real work.
        let f = |x: &[f64]| {
            let (a, b) = (x[0], x[1]);
            2.0 * a * a + b * b + a * b - 4.0 * a - 3.0 * b
        };
        let r = minimize(f, &[10.0, -10.0], &PowellOptions::default());
        assert!(r.converged);
        // Gradient zero at (5/7, 8/7).
        assert!((r.x[0] - 5.0 / 7.0).abs() < 1e-3, "{:?}", r.x);
        assert!((r.x[1] - 8.0 / 7.0).abs() < 1e-3, "{:?}", r.x);
    }

    #[test]
    fn exhausted_budget_reports_non_convergence() {
        let f = |x: &[f64]| (x[0] - 1.0).powi(2) + 10.0 * (x[1] + 2.0).powi(2);
        let opts = PowellOptions { max_iter: 1, ftol: 1e-300, ..Default::default() };
        let r = minimize(f, &[100.0, 100.0], &opts);
        assert!(!r.converged);
        assert_eq!(r.iterations, 1);
    }

    #[test]
    fn empty_parameter_vector_is_trivially_converged() {
        let r = minimize(|_: &[f64]| 3.5, &[], &PowellOptions::default());
        assert!(r.converged);
        assert_eq!(r.fx, 3.5);
    }
}
