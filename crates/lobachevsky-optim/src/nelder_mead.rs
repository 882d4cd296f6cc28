//! Nelder–Mead downhill simplex.
//!
//! Derivative-free alternative for the hyperboloid margin loss when the
//! analytic gradient is not wanted. Standard reflection/expansion/
//! contraction/shrink with scipy-style initial simplex steps.

use crate::OptimReport;

#[derive(Debug, Clone)]
pub struct NelderMeadOptions {
    pub max_iter: usize,
    /// Spread of function values across the simplex below which we stop.
    pub ftol: f64,
    /// Spread of vertex coordinates below which we stop.
    pub xtol: f64,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            ftol: 1e-8,
            xtol: 1e-8,
        }
    }
}

const ALPHA: f64 = 1.0; // reflection
const GAMMA: f64 = 2.0; // expansion
const RHO: f64 = 0.5; // contraction
const SIGMA: f64 = 0.5; // shrink

/// Minimize `f` starting from `x0`.
pub fn minimize<F>(mut f: F, x0: &[f64], opts: &NelderMeadOptions) -> OptimReport
where
    F: FnMut(&[f64]) -> f64,
{
    let n = x0.len();
    if n == 0 {
        let fx = f(x0);
        return OptimReport { x: x0.to_vec(), fx, iterations: 0, converged: true };
    }

    // Initial simplex: x0 plus one perturbed vertex per coordinate.
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(x0.to_vec());
    for i in 0..n {
        let mut v = x0.to_vec();
        v[i] = if v[i] != 0.0 { v[i] * 1.05 } else { 0.00025 };
        simplex.push(v);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| f(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < opts.max_iter {
        iterations += 1;

        // Order vertices by value.
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(std::cmp::Ordering::Equal));
        let reordered: Vec<Vec<f64>> = order.iter().map(|&i| simplex[i].clone()).collect();
        let revalues: Vec<f64> = order.iter().map(|&i| values[i]).collect();
        simplex = reordered;
        values = revalues;

        // Convergence: value spread and coordinate spread against the best.
        let f_spread = (values[n] - values[0]).abs();
        let x_spread = simplex[1..]
            .iter()
            .flat_map(|v| v.iter().zip(simplex[0].iter()).map(|(a, b)| (a - b).abs()))
            .fold(0.0, f64::max);
        if f_spread <= opts.ftol && x_spread <= opts.xtol {
            converged = true;
            break;
        }

        // Centroid of all but the worst vertex.
        let mut centroid = vec![0.0; n];
        for v in &simplex[..n] {
            for (c, vi) in centroid.iter_mut().zip(v.iter()) {
                *c += vi / n as f64;
            }
        }

        let worst = simplex[n].clone();
        let reflected: Vec<f64> = centroid
            .iter()
            .zip(worst.iter())
            .map(|(c, w)| c + ALPHA * (c - w))
            .collect();
        let f_ref = f(&reflected);

        if f_ref < values[0] {
            // Try to expand further in the same direction.
            let expanded: Vec<f64> = centroid
                .iter()
                .zip(worst.iter())
                .map(|(c, w)| c + GAMMA * ALPHA * (c - w))
                .collect();
            let f_exp = f(&expanded);
            if f_exp < f_ref {
                simplex[n] = expanded;
                values[n] = f_exp;
            } else {
                simplex[n] = reflected;
                values[n] = f_ref;
            }
        } else if f_ref < values[n - 1] {
            simplex[n] = reflected;
            values[n] = f_ref;
        } else {
            // Contract toward the centroid, from whichever of the worst and
            // reflected points is better.
            let (base, f_base) = if f_ref < values[n] {
                (&reflected, f_ref)
            } else {
                (&worst, values[n])
            };
            let contracted: Vec<f64> = centroid
                .iter()
                .zip(base.iter())
                .map(|(c, b)| c + RHO * (b - c))
                .collect();
            let f_con = f(&contracted);
            if f_con < f_base {
                simplex[n] = contracted;
                values[n] = f_con;
            } else {
                // Shrink everything toward the best vertex.
                let best = simplex[0].clone();
                for i in 1..=n {
                    for (vi, bi) in simplex[i].iter_mut().zip(best.iter()) {
                        *vi = bi + SIGMA * (*vi - bi);
                    }
                    values[i] = f(&simplex[i]);
                }
            }
        }

        tracing::debug!(iteration = iterations, best = values[0], "nelder-mead step");
    }

    // Best vertex after the final ordering.
    let mut best_idx = 0;
    for i in 1..=n {
        if values[i] < values[best_idx] {
            best_idx = i;
        }
    }
    OptimReport {
        x: simplex[best_idx].clone(),
        fx: values[best_idx],
        iterations,
        converged,
    }
}
