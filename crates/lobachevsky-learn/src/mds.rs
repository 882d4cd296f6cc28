//! Coordinate reconstruction from a target distance matrix.
//!
//! Classic stress minimization: candidate base-space points are lifted onto
//! the chosen manifold, their pairwise geodesic distances compared against the
//! target matrix, and the summed squared residual minimized with the
//! direction-set optimizer over the flattened coordinates. The result is
//! defined only up to the manifold's isometries; no scale or rotation
//! normalization is applied.

use lobachevsky_manifold::{Manifold, ManifoldError};
use lobachevsky_optim::powell::{self, PowellOptions};
use lobachevsky_optim::OptimReport;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::LearnError;

/// Reconstructed configuration plus the optimizer's report.
#[derive(Debug, Clone)]
pub struct MdsResult {
    pub points: Vec<Vec<f64>>,
    pub report: OptimReport,
}

/// Stress of a flattened candidate configuration against the target matrix:
/// `Σ_{j<i} (d(lift(b_i), lift(b_j)) − D[i][j])²`.
pub fn stress(
    flat: &[f64],
    matrix: &[Vec<f64>],
    dim: usize,
    manifold: Manifold,
) -> Result<f64, ManifoldError> {
    let n = matrix.len();
    let mut total = 0.0;
    for i in 0..n {
        let bi = manifold.lift(&flat[i * dim..(i + 1) * dim]);
        for j in 0..i {
            let bj = manifold.lift(&flat[j * dim..(j + 1) * dim]);
            let residual = manifold.distance(&bi, &bj)? - matrix[i][j];
            total += residual * residual;
        }
    }
    Ok(total)
}

fn validate(matrix: &[Vec<f64>]) -> Result<(), LearnError> {
    let n = matrix.len();
    for row in matrix {
        if row.len() != n {
            return Err(LearnError::BadDistanceMatrix { reason: "not square" });
        }
    }
    for i in 0..n {
        if matrix[i][i] != 0.0 {
            return Err(LearnError::BadDistanceMatrix { reason: "nonzero diagonal" });
        }
        for j in 0..n {
            if matrix[i][j] < 0.0 {
                return Err(LearnError::BadDistanceMatrix { reason: "negative entry" });
            }
            if (matrix[i][j] - matrix[j][i]).abs() > 1e-9 {
                return Err(LearnError::BadDistanceMatrix { reason: "asymmetric" });
            }
        }
    }
    Ok(())
}

/// Reconstruct `matrix.len()` points of base dimension `dim` whose manifold
/// distances approximate the target matrix.
///
/// Coordinates are initialized from a standard normal draw on the caller's
/// RNG; infeasible configurations score `f64::INFINITY` during the search.
pub fn reconstruct<R: Rng>(
    matrix: &[Vec<f64>],
    dim: usize,
    manifold: Manifold,
    rng: &mut R,
    opts: &PowellOptions,
) -> Result<MdsResult, LearnError> {
    validate(matrix)?;
    let n = matrix.len();
    let init: Vec<f64> = (0..n * dim).map(|_| rng.sample(StandardNormal)).collect();

    let objective = |flat: &[f64]| -> f64 {
        stress(flat, matrix, dim, manifold).unwrap_or(f64::INFINITY)
    };
    let report = powell::minimize(objective, &init, opts);

    let points = report
        .x
        .chunks(dim)
        .map(|c| c.to_vec())
        .collect();
    Ok(MdsResult { points, report })
}
