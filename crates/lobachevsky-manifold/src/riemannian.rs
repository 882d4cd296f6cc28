//! # Generic Riemannian distance under a learned transform
//!
//! Geodesic length under a Q-deformed Poincaré-ball-like metric, computed by
//! numerical quadrature along the straight base-space segment from `x` to `y`.
//! No lift is involved; the metric lives directly on the base space.
//!
//! With `δ = y − x` and `p(t) = (1−t)·x + t·y`, the local speed at parameter
//! `t` is
//!
//! ```text
//! s(t) = √( ‖Q·δ‖² + (p(t)·δ)² / (1 + p(t)·p(t)) )
//! ```
//!
//! and the path length is `∫₀¹ s(t) dt`, evaluated with composite Simpson
//! quadrature. Both terms under the square root are non-negative, so the
//! integrand is defined everywhere; the only failure mode is a malformed
//! transform shape.

use crate::error::ManifoldError;
use crate::linalg::{dot, matvec};

/// Default number of Simpson subintervals. Plenty for the smooth integrands
/// this metric produces at experiment scale.
pub const DEFAULT_QUADRATURE_STEPS: usize = 32;

/// Path length from `x` to `y` under the transform `q` (flat row-major d×d).
///
/// `steps` is rounded up to the next even number; values below 2 are raised
/// to 2.
///
/// # Errors
///
/// Returns [`ManifoldError::DimensionMismatch`] if `q` is not `d*d` for
/// `d = x.len()`, or if `x` and `y` differ in length.
pub fn transformed_path_length(
    x: &[f64],
    y: &[f64],
    q: &[f64],
    steps: usize,
) -> Result<f64, ManifoldError> {
    let d = x.len();
    if y.len() != d {
        return Err(ManifoldError::DimensionMismatch { expected: d, got: y.len() });
    }
    if q.len() != d * d {
        return Err(ManifoldError::DimensionMismatch { expected: d * d, got: q.len() });
    }

    let delta: Vec<f64> = y.iter().zip(x.iter()).map(|(yi, xi)| yi - xi).collect();
    let q_delta = matvec(q, d, &delta);
    let first_term = dot(&q_delta, &q_delta);

    let speed = |t: f64| -> f64 {
        let p: Vec<f64> = x
            .iter()
            .zip(y.iter())
            .map(|(&xi, &yi)| (1.0 - t) * xi + t * yi)
            .collect();
        let proj = dot(&p, &delta);
        (first_term + proj * proj / (1.0 + dot(&p, &p))).sqrt()
    };

    // Composite Simpson on [0, 1].
    let n = {
        let n = steps.max(2);
        if n % 2 == 0 { n } else { n + 1 }
    };
    let h = 1.0 / n as f64;
    let mut sum = speed(0.0) + speed(1.0);
    for i in 1..n {
        let w = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += w * speed(i as f64 * h);
    }
    Ok(sum * h / 3.0)
}
