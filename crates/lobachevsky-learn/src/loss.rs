//! Loss families over a candidate linear transform.
//!
//! Three objectives, all taking the flattened row-major transform `Q` plus the
//! base point set and labels, and producing a scalar to minimize:
//!
//! | Function | Family | Gradient |
//! |---|---|---|
//! | [`lmnn_loss`] | large-margin nearest neighbor hinge | no |
//! | [`mmc_loss`] | contrastive pair-mean difference | no |
//! | [`ratio_loss`] | hyperboloid softmax ratio over sampled negatives | [`ratio_grad`] |
//!
//! The margin losses measure distances through a [`Metric`]: either map the
//! points through `Q`, lift onto a [`Manifold`], and use its geodesic
//! distance, or keep the points in base space and integrate path length under
//! the `Q`-deformed metric. The ratio loss works directly on hyperboloid
//! points with `Q` of the lifted dimension and the Minkowski tensor `G`.
//! Every evaluation logs the current transform at debug level.

use lobachevsky_manifold::hyperboloid::minkowski_diag;
use lobachevsky_manifold::linalg::{matmul, matvec, outer_sym};
use lobachevsky_manifold::riemannian::transformed_path_length;
use lobachevsky_manifold::{Manifold, ManifoldError};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::LearnError;
use crate::neighbors::split_by_radius;
use crate::pairs::PairSets;

/// Fixed hinge margin of the LMNN objective.
pub const LMNN_MARGIN: f64 = 1.0;

/// Default number of sampled negatives per similar pair in the ratio loss.
pub const DEFAULT_NEGATIVES: usize = 5;

// ─────────────────────────────────────────────
// Metric selection
// ─────────────────────────────────────────────

/// How a candidate transform turns base points into pairwise distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Map each point through `Q`, lift onto the manifold, and use its
    /// geodesic distance.
    Lifted(Manifold),
    /// No lift: `Q` deforms the base-space metric and each distance is a
    /// path-length integral with the given quadrature step count.
    Riemannian { steps: usize },
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Lifted(m) => m.label(),
            Metric::Riemannian { .. } => "riemannian",
        }
    }

    /// Points the distance function operates on: lifted images of `Q·x` under
    /// a lifted metric, the untouched base points under the path-integral one.
    fn working_points(
        &self,
        points: &[Vec<f64>],
        q: &[f64],
    ) -> Result<Vec<Vec<f64>>, LearnError> {
        match self {
            Metric::Lifted(m) => map_through_transform(points, q, *m),
            Metric::Riemannian { .. } => {
                let dim = points.first().map_or(0, Vec::len);
                if q.len() != dim * dim {
                    return Err(LearnError::BadTransformShape { len: q.len(), dim });
                }
                Ok(points.to_vec())
            }
        }
    }

    fn distance(&self, a: &[f64], b: &[f64], q: &[f64]) -> Result<f64, ManifoldError> {
        match self {
            Metric::Lifted(m) => m.distance(a, b),
            Metric::Riemannian { steps } => transformed_path_length(a, b, q, *steps),
        }
    }
}

// ─────────────────────────────────────────────
// Transform application
// ─────────────────────────────────────────────

/// Map every base point through `Q`, then lift onto the manifold.
///
/// # Errors
///
/// [`LearnError::BadTransformShape`] when `q` is not `d*d` for the base
/// dimension `d`.
pub fn map_through_transform(
    points: &[Vec<f64>],
    q: &[f64],
    manifold: Manifold,
) -> Result<Vec<Vec<f64>>, LearnError> {
    let dim = points.first().map_or(0, Vec::len);
    if q.len() != dim * dim {
        return Err(LearnError::BadTransformShape { len: q.len(), dim });
    }
    Ok(points
        .iter()
        .map(|p| manifold.lift(&matvec(q, dim, p)))
        .collect())
}

fn check_aligned(points: &[Vec<f64>], labels: &[usize]) -> Result<(), LearnError> {
    if points.len() != labels.len() {
        return Err(LearnError::ShapeMismatch {
            points: points.len(),
            labels: labels.len(),
        });
    }
    Ok(())
}

// ─────────────────────────────────────────────
// LMNN margin loss
// ─────────────────────────────────────────────

/// Large-margin nearest-neighbor hinge loss under transform `Q`.
///
/// Per point x, same-label neighbors y within `radius` contribute a pull term
/// `(1−reg)·d(x,y)`; every imposter z intruding inside the unit margin around
/// y, that is `d(x,z) < d(x,y) + 1`, adds the hinge
/// `reg·(1 + d(x,y) − d(x,z))`. Points with an empty neighborhood contribute
/// nothing.
pub fn lmnn_loss(
    q: &[f64],
    radius: f64,
    reg: f64,
    metric: Metric,
    points: &[Vec<f64>],
    labels: &[usize],
) -> Result<f64, LearnError> {
    check_aligned(points, labels)?;
    let mapped = metric.working_points(points, q)?;
    let mut dist =
        |a: &[f64], b: &[f64]| -> Result<f64, ManifoldError> { metric.distance(a, b, q) };

    let mut total = 0.0;
    for (i, x) in mapped.iter().enumerate() {
        let (targets, imposters) =
            split_by_radius(x, labels[i], &mapped, labels, radius, &mut dist)?;
        for &y in &targets {
            let d_xy = metric.distance(x, &mapped[y], q)?;
            total += (1.0 - reg) * d_xy;
            for &z in &imposters {
                let d_xz = metric.distance(x, &mapped[z], q)?;
                if d_xz < d_xy + LMNN_MARGIN {
                    total += reg * (LMNN_MARGIN + d_xy - d_xz);
                }
            }
        }
    }
    tracing::debug!(transform = ?q, loss = total, "lmnn evaluation");
    Ok(total)
}

// ─────────────────────────────────────────────
// Contrastive (MMC) loss
// ─────────────────────────────────────────────

/// Contrastive loss: mean similar-pair distance minus mean dissimilar-pair
/// distance, weighted `(1−reg)` and `reg`. An empty pair set contributes zero,
/// so class-imbalanced pair counts cannot dominate either term.
pub fn mmc_loss(
    q: &[f64],
    reg: f64,
    metric: Metric,
    points: &[Vec<f64>],
    labels: &[usize],
    pairs: &PairSets,
) -> Result<f64, LearnError> {
    check_aligned(points, labels)?;
    let mapped = metric.working_points(points, q)?;

    let mean_over = |set: &[(usize, usize)]| -> Result<f64, ManifoldError> {
        if set.is_empty() {
            return Ok(0.0);
        }
        let mut sum = 0.0;
        for &(i, j) in set {
            sum += metric.distance(&mapped[i], &mapped[j], q)?;
        }
        Ok(sum / set.len() as f64)
    };

    let loss = (1.0 - reg) * mean_over(&pairs.similar)? - reg * mean_over(&pairs.dissimilar)?;
    tracing::debug!(transform = ?q, loss, "mmc evaluation");
    Ok(loss)
}

// ─────────────────────────────────────────────
// Hyperboloid softmax-ratio loss
// ─────────────────────────────────────────────

/// Negative partners drawn once per optimization run, index-aligned with
/// `PairSets::similar`. Drawing up front keeps loss and gradient evaluations
/// consistent across optimizer iterations.
#[derive(Debug, Clone)]
pub struct NegativeSample {
    pub partners: Vec<Vec<usize>>,
}

impl NegativeSample {
    /// For each similar pair `(i, _)`, sample up to `negatives` points whose
    /// label differs from `i`'s, without replacement.
    pub fn draw<R: Rng>(
        pairs: &PairSets,
        labels: &[usize],
        negatives: usize,
        rng: &mut R,
    ) -> Self {
        let partners = pairs
            .similar
            .iter()
            .map(|&(i, _)| {
                let candidates: Vec<usize> = (0..labels.len())
                    .filter(|&k| labels[k] != labels[i])
                    .collect();
                candidates
                    .choose_multiple(rng, negatives.min(candidates.len()))
                    .copied()
                    .collect()
            })
            .collect();
        Self { partners }
    }
}

/// Inverse Lorentzian-margin score under `Q` and diagonal Minkowski tensor `g`.
///
/// ```text
/// ip = xᵀQᵀGQy,   s = 1 / (−ip + √(ip² − 1))
/// ```
///
/// For hyperboloid points this equals `e^(−d(Qx, Qy))`.
///
/// # Errors
///
/// [`ManifoldError::NumericDomain`] when `ip² − 1 < 0`, meaning `Q` drove the
/// pair inside the unit pseudo-sphere of the Minkowski form.
pub fn ratio_score(x: &[f64], y: &[f64], q: &[f64], g: &[f64]) -> Result<f64, ManifoldError> {
    let dim = x.len();
    let qx = matvec(q, dim, x);
    let qy = matvec(q, dim, y);
    let ip: f64 = (0..dim).map(|i| g[i] * qx[i] * qy[i]).sum();
    let disc = ip * ip - 1.0;
    if disc < 0.0 {
        return Err(ManifoldError::NumericDomain { op: "ratio_score", value: disc });
    }
    Ok(1.0 / (-ip + disc.sqrt()))
}

/// Softmax-ratio loss over the similar pairs.
///
/// Each similar pair scores against the summed score of its sampled negatives;
/// the ratios are negated so that minimization pushes similar scores up
/// relative to the negatives. Pairs with no drawn negatives contribute zero.
pub fn ratio_loss(
    q: &[f64],
    points: &[Vec<f64>],
    pairs: &PairSets,
    sample: &NegativeSample,
) -> Result<f64, LearnError> {
    let dim = points.first().map_or(0, Vec::len);
    if q.len() != dim * dim {
        return Err(LearnError::BadTransformShape { len: q.len(), dim });
    }
    let g = minkowski_diag(dim);

    let mut loss = 0.0;
    for (s, &(i, j)) in pairs.similar.iter().enumerate() {
        let negs = &sample.partners[s];
        if negs.is_empty() {
            continue;
        }
        let num = ratio_score(&points[i], &points[j], q, &g)?;
        let mut denom = 0.0;
        for &k in negs {
            denom += ratio_score(&points[i], &points[k], q, &g)?;
        }
        if denom > 0.0 {
            loss -= num / denom;
        }
    }
    tracing::debug!(transform = ?q, loss, "ratio evaluation");
    Ok(loss)
}

/// Derivative of [`ratio_score`] with respect to `ip`.
///
/// The score itself is defined at `ip² = 1` but its derivative diverges
/// there, so the boundary is rejected rather than handing the caller an
/// infinite gradient entry.
fn score_deriv(ip: f64, score: f64) -> Result<f64, ManifoldError> {
    let disc = ip * ip - 1.0;
    if disc <= 0.0 {
        return Err(ManifoldError::NumericDomain { op: "ratio_grad", value: disc });
    }
    Ok(score * score * (1.0 - ip / disc.sqrt()))
}

/// Raw Minkowski bilinear form of the transformed pair, `xᵀQᵀGQy`.
fn transformed_ip(x: &[f64], y: &[f64], q: &[f64], g: &[f64]) -> f64 {
    let dim = x.len();
    let qx = matvec(q, dim, x);
    let qy = matvec(q, dim, y);
    (0..dim).map(|i| g[i] * qx[i] * qy[i]).sum()
}

/// Analytic gradient of [`ratio_loss`] with respect to the flattened `Q`.
///
/// Uses `∂ip/∂Q = G·Q·(x·yᵀ + y·xᵀ)` and the quotient rule on each ratio.
/// Must be called with the same [`NegativeSample`] as the loss.
pub fn ratio_grad(
    q: &[f64],
    points: &[Vec<f64>],
    pairs: &PairSets,
    sample: &NegativeSample,
) -> Result<Vec<f64>, LearnError> {
    let dim = points.first().map_or(0, Vec::len);
    if q.len() != dim * dim {
        return Err(LearnError::BadTransformShape { len: q.len(), dim });
    }
    let g = minkowski_diag(dim);

    // G·Q with diagonal G is a row scaling.
    let mut gq = q.to_vec();
    for c in 0..dim {
        gq[c] = -gq[c];
    }

    let ip_grad = |x: &[f64], y: &[f64]| -> Vec<f64> { matmul(&gq, &outer_sym(x, y), dim) };

    let mut grad = vec![0.0; dim * dim];
    for (s, &(i, j)) in pairs.similar.iter().enumerate() {
        let negs = &sample.partners[s];
        if negs.is_empty() {
            continue;
        }
        let ip_num = transformed_ip(&points[i], &points[j], q, &g);
        let num = ratio_score(&points[i], &points[j], q, &g)?;
        let dnum_dip = score_deriv(ip_num, num)?;
        let dnum = ip_grad(&points[i], &points[j]);

        let mut denom = 0.0;
        let mut ddenom = vec![0.0; dim * dim];
        for &k in negs {
            let ip_k = transformed_ip(&points[i], &points[k], q, &g);
            let s_k = ratio_score(&points[i], &points[k], q, &g)?;
            denom += s_k;
            let ds_dip = score_deriv(ip_k, s_k)?;
            for (acc, dip) in ddenom.iter_mut().zip(ip_grad(&points[i], &points[k])) {
                *acc += ds_dip * dip;
            }
        }
        if denom <= 0.0 {
            continue;
        }

        // d(−num/denom)/dQ by the quotient rule.
        for idx in 0..dim * dim {
            grad[idx] -=
                (dnum_dip * dnum[idx] * denom - num * ddenom[idx]) / (denom * denom);
        }
    }
    Ok(grad)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
