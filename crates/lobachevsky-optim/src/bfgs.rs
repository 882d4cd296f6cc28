//! BFGS quasi-Newton minimization with Armijo backtracking.
//!
//! Used where an analytic gradient is available, notably the softmax-ratio
//! loss over hyperboloid transforms. Maintains the inverse Hessian
//! approximation directly, so each step is a matrix-vector product.

use crate::OptimReport;

#[derive(Debug, Clone)]
pub struct BfgsOptions {
    pub max_iter: usize,
    /// Infinity-norm of the gradient below which we declare convergence.
    pub gtol: f64,
    /// Armijo sufficient-decrease constant.
    pub c1: f64,
    /// Backtracking halvings before the step is abandoned.
    pub max_backtracks: usize,
}

impl Default for BfgsOptions {
    fn default() -> Self {
        Self {
            max_iter: 500,
            gtol: 1e-6,
            c1: 1e-4,
            max_backtracks: 50,
        }
    }
}

fn inf_norm(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |m, x| m.max(x.abs()))
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// `out = H · v` for row-major square `H`.
fn hmul(h: &[f64], v: &[f64], n: usize) -> Vec<f64> {
    (0..n).map(|i| dot(&h[i * n..(i + 1) * n], v)).collect()
}

/// Minimize `f` with gradient `grad`, starting from `x0`.
pub fn minimize<F, G>(mut f: F, mut grad: G, x0: &[f64], opts: &BfgsOptions) -> OptimReport
where
    F: FnMut(&[f64]) -> f64,
    G: FnMut(&[f64]) -> Vec<f64>,
{
    let n = x0.len();
    let mut x = x0.to_vec();
    let mut fx = f(&x);
    if n == 0 {
        return OptimReport { x, fx, iterations: 0, converged: true };
    }

    let mut g = grad(&x);

    // Inverse Hessian approximation, starting from the identity.
    let mut h = vec![0.0; n * n];
    for i in 0..n {
        h[i * n + i] = 1.0;
    }

    let mut iterations = 0;
    let mut converged = inf_norm(&g) <= opts.gtol;

    while !converged && iterations < opts.max_iter {
        iterations += 1;

        // Search direction: -H·g.
        let mut dir = hmul(&h, &g, n);
        for d in dir.iter_mut() {
            *d = -*d;
        }
        let slope = dot(&g, &dir);
        if slope >= 0.0 {
            // H lost positive-definiteness; restart from the identity and
            // take a plain gradient step.
            for v in h.iter_mut() {
                *v = 0.0;
            }
            for i in 0..n {
                h[i * n + i] = 1.0;
            }
            dir = g.iter().map(|gi| -gi).collect();
        }
        let slope = dot(&g, &dir);

        // Armijo backtracking.
        let mut alpha = 1.0;
        let mut step = None;
        for _ in 0..opts.max_backtracks {
            let candidate: Vec<f64> = x
                .iter()
                .zip(dir.iter())
                .map(|(xi, di)| xi + alpha * di)
                .collect();
            let f_cand = f(&candidate);
            if f_cand <= fx + opts.c1 * alpha * slope {
                step = Some((candidate, f_cand));
                break;
            }
            alpha *= 0.5;
        }
        let Some((x_new, f_new)) = step else {
            // No acceptable step along the descent direction; stop here.
            break;
        };

        let g_new = grad(&x_new);

        // Curvature pair.
        let s: Vec<f64> = x_new.iter().zip(x.iter()).map(|(a, b)| a - b).collect();
        let y: Vec<f64> = g_new.iter().zip(g.iter()).map(|(a, b)| a - b).collect();
        let sy = dot(&s, &y);

        x = x_new;
        fx = f_new;
        g = g_new;

        tracing::debug!(iteration = iterations, loss = fx, grad_norm = inf_norm(&g), "bfgs step");

        if inf_norm(&g) <= opts.gtol {
            converged = true;
            break;
        }

        // Inverse-Hessian update, skipped when the curvature condition fails.
        //   H ← (I − ρ s yᵀ) H (I − ρ y sᵀ) + ρ s sᵀ,  ρ = 1 / (sᵀy)
        if sy > 1e-10 {
            let rho = 1.0 / sy;
            let hy = hmul(&h, &y, n);
            let yhy = dot(&y, &hy);
            // Expanded form: H − ρ(s·(Hy)ᵀ + (Hy)·sᵀ) + ρ²·yᵀHy·ssᵀ + ρ·ssᵀ
            for i in 0..n {
                for j in 0..n {
                    h[i * n + j] += -rho * (s[i] * hy[j] + hy[i] * s[j])
                        + (rho * rho * yhy + rho) * s[i] * s[j];
                }
            }
        }
    }

    OptimReport { x, fx, iterations, converged }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_bowl_converges_in_few_steps() {
        let f = |x: &[f64]| (x[0] - 4.0).powi(2) + 3.0 * (x[1] + 1.0).powi(2);
        let g = |x: &[f64]| vec![2.0 * (x[0] - 4.0), 6.0 * (x[1] + 1.0)];
        let r = minimize(f, g, &[0.0, 0.0], &BfgsOptions::default());
        assert!(r.converged, "{r:?}");
        assert!(r.iterations < 30, "took {} iterations", r.iterations);
        assert!((r.x[0] - 4.0).abs() < 1e-5);
        assert!((r.x[1] + 1.0).abs() < 1e-5);
    }

    #[test]
    fn rosenbrock_2d_converges() {
        let f = |x: &[f64]| {
            let (a, b) = (x[0], x[1]);
            (1.0 - a).powi(2) + 100.0 * (b - a * a).powi(2)
        };
        let g = |x: &[f64]| {
            let (a, b) = (x[0], x[1]);
            vec![
                -2.0 * (1.0 - a) - 400.0 * a * (b - a * a),
                200.0 * (b - a * a),
            ]
        };
        let opts = BfgsOptions { max_iter: 2000, ..Default::default() };
        let r = minimize(f, g, &[-1.2, 1.0], &opts);
        assert!(r.fx < 1e-10, "final loss {}", r.fx);
        assert!((r.x[0] - 1.0).abs() < 1e-4, "{:?}", r.x);
        assert!((r.x[1] - 1.0).abs() < 1e-4, "{:?}", r.x);
    }

    #[test]
    fn already_at_the_minimum_terminates_immediately() {
        let f = |x: &[f64]| x[0] * x[0];
        let g = |x: &[f64]| vec![2.0 * x[0]];
        let r = minimize(f, g, &[0.0], &BfgsOptions::default());
        assert!(r.converged);
        assert_eq!(r.iterations, 0);
    }

    #[test]
    fn budget_exhaustion_reports_non_convergence() {
        let f = |x: &[f64]| x[0].powi(4);
        let g = |x: &[f64]| vec![4.0 * x[0].powi(3)];
        let opts = BfgsOptions { max_iter: 2, gtol: 1e-300, ..Default::default() };
        let r = minimize(f, g, &[10.0], &opts);
        assert!(!r.converged);
    }
}
