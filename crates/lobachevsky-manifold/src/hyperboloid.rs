//! # Hyperboloid model operations
//!
//! The hyperboloid (Lorentz) model represents hyperbolic space as the upper
//! sheet of the two-sheeted hyperboloid `−x0² + Σ xi² = −1` embedded in
//! Minkowski space. Two lifts produce hyperboloid points:
//!
//! | Lift | Formula | Domain |
//! |---|---|---|
//! | [`ball_to_hyperboloid`] | `x0 = 2/(1−‖x‖²) − 1`, tail scaled by `x0+1` | ‖x‖ < 1 |
//! | [`tangent_to_hyperboloid`] | `x0 = √(1 + ‖x‖²)`, tail unchanged | all of ℝⁿ |
//!
//! The ball lift converts Poincaré-ball embedding output; the tangent lift is
//! the total map the metric learners use, since a learned transform can push
//! base points outside the unit ball.
//!
//! ## Distance
//!
//! ```text
//! d(u, v) = arccosh(−⟨u, v⟩_L)     ⟨u, v⟩_L = −u0·v0 + Σ_{i≥1} ui·vi
//! ```
//!
//! For two points on the upper sheet, `−⟨u,v⟩_L ≥ 1` holds exactly; values
//! slightly below 1 are floating-point drift and are clamped, values clearly
//! below signal an off-manifold pair and are rejected.

use crate::error::ManifoldError;
use crate::linalg::dot;

/// Tolerance below which an acosh argument under 1.0 is treated as drift
/// rather than a domain violation.
pub const ACOSH_DRIFT_TOL: f64 = 1e-9;

// ─────────────────────────────────────────────
// Lifts
// ─────────────────────────────────────────────

/// Lift a Poincaré-ball point onto the hyperboloid.
///
/// ```text
/// x0 = 2/(1 − ‖x‖²) − 1,   xi → (x0 + 1)·xi
/// ```
///
/// The result satisfies `⟨x, x⟩_L = −1`.
///
/// # Errors
///
/// Returns [`ManifoldError::OutsideBall`] if `‖x‖² ≥ 1`.
pub fn ball_to_hyperboloid(x: &[f64]) -> Result<Vec<f64>, ManifoldError> {
    let norm_sq = dot(x, x);
    if norm_sq >= 1.0 {
        return Err(ManifoldError::OutsideBall { norm_sq });
    }
    let x0 = 2.0 / (1.0 - norm_sq) - 1.0;
    let mut out = Vec::with_capacity(x.len() + 1);
    out.push(x0);
    out.extend(x.iter().map(|&xi| (x0 + 1.0) * xi));
    Ok(out)
}

/// Lift a base-space point onto the hyperboloid via the tangent map.
///
/// ```text
/// x0 = √(1 + ‖x‖²),   tail unchanged
/// ```
///
/// Total: valid for every input, which is what the loss engine needs when a
/// candidate transform sends points outside the unit ball.
pub fn tangent_to_hyperboloid(x: &[f64]) -> Vec<f64> {
    let x0 = (1.0 + dot(x, x)).sqrt();
    let mut out = Vec::with_capacity(x.len() + 1);
    out.push(x0);
    out.extend_from_slice(x);
    out
}

// ─────────────────────────────────────────────
// Lorentzian form and distance
// ─────────────────────────────────────────────

/// Lorentzian (Minkowski) inner product `−u0·v0 + Σ_{i≥1} ui·vi`.
#[inline]
pub fn lorentz_inner(u: &[f64], v: &[f64]) -> f64 {
    debug_assert_eq!(u.len(), v.len(), "dimension mismatch in lorentz_inner");
    -u[0] * v[0] + dot(&u[1..], &v[1..])
}

/// Geodesic distance between two hyperboloid points.
///
/// ```text
/// d(u, v) = arccosh(−⟨u, v⟩_L)
/// ```
///
/// # Errors
///
/// Returns [`ManifoldError::NumericDomain`] if `−⟨u,v⟩_L` is below
/// `1 − ACOSH_DRIFT_TOL`, meaning the pair is not on the same sheet of the
/// hyperboloid.
pub fn hyperboloid_distance(u: &[f64], v: &[f64]) -> Result<f64, ManifoldError> {
    let arg = -lorentz_inner(u, v);
    if arg < 1.0 - ACOSH_DRIFT_TOL {
        return Err(ManifoldError::NumericDomain {
            op: "hyperboloid_distance",
            value: arg,
        });
    }
    Ok(arg.max(1.0).acosh())
}

/// Check the hyperboloid constraint `⟨x, x⟩_L = −1` to tolerance.
pub fn is_on_hyperboloid(x: &[f64], tol: f64) -> bool {
    (lorentz_inner(x, x) + 1.0).abs() < tol
}

/// Diagonal of the Minkowski metric tensor `G = diag(−1, 1, …, 1)`.
pub fn minkowski_diag(dim: usize) -> Vec<f64> {
    let mut g = vec![1.0; dim];
    if !g.is_empty() {
        g[0] = -1.0;
    }
    g
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::l2_norm;

    const TOL: f64 = 1e-10;

    #[test]
    fn ball_lift_of_origin_is_apex() {
        let lifted = ball_to_hyperboloid(&[0.0, 0.0]).unwrap();
        assert_eq!(lifted, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn tangent_lift_of_origin_is_apex() {
        let lifted = tangent_to_hyperboloid(&[0.0, 0.0]);
        assert_eq!(lifted, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn ball_lift_satisfies_constraint() {
        for x in [vec![0.1, 0.2], vec![0.5, -0.3], vec![0.0, 0.9], vec![-0.7, 0.1]] {
            let lifted = ball_to_hyperboloid(&x).unwrap();
            assert!(
                is_on_hyperboloid(&lifted, 1e-9),
                "constraint violated for {x:?}: ip = {}",
                lorentz_inner(&lifted, &lifted)
            );
        }
    }

    #[test]
    fn tangent_lift_satisfies_constraint_everywhere() {
        for x in [vec![0.1, 0.2], vec![3.0, -4.0], vec![100.0, 50.0, 25.0]] {
            let lifted = tangent_to_hyperboloid(&x);
            assert!(is_on_hyperboloid(&lifted, 1e-6), "constraint violated for {x:?}");
        }
    }

    #[test]
    fn ball_lift_rejects_boundary_and_outside() {
        assert!(ball_to_hyperboloid(&[1.0, 0.0]).is_err());
        assert!(ball_to_hyperboloid(&[0.8, 0.8]).is_err());
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = ball_to_hyperboloid(&[0.3, -0.2]).unwrap();
        let d = hyperboloid_distance(&p, &p).unwrap();
        assert!(d.abs() < TOL, "self distance = {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let u = ball_to_hyperboloid(&[0.1, 0.2]).unwrap();
        let v = ball_to_hyperboloid(&[0.3, -0.1]).unwrap();
        let d_uv = hyperboloid_distance(&u, &v).unwrap();
        let d_vu = hyperboloid_distance(&v, &u).unwrap();
        assert!((d_uv - d_vu).abs() < TOL);
    }

    #[test]
    fn triangle_inequality_on_sampled_triples() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let sample = |rng: &mut rand::rngs::StdRng| {
                let v: Vec<f64> = (0..3).map(|_| rng.gen_range(-0.5..0.5)).collect();
                ball_to_hyperboloid(&v).unwrap()
            };
            let a = sample(&mut rng);
            let b = sample(&mut rng);
            let c = sample(&mut rng);
            let d_ac = hyperboloid_distance(&a, &c).unwrap();
            let d_ab = hyperboloid_distance(&a, &b).unwrap();
            let d_bc = hyperboloid_distance(&b, &c).unwrap();
            assert!(
                d_ac <= d_ab + d_bc + 1e-9,
                "triangle inequality violated: {d_ac} > {d_ab} + {d_bc}"
            );
        }
    }

    #[test]
    fn ball_and_tangent_lifts_agree_on_direction() {
        // Both lifts put the tail parallel to the input.
        let x = vec![0.3, 0.4];
        let ball = ball_to_hyperboloid(&x).unwrap();
        let tangent = tangent_to_hyperboloid(&x);
        let ratio_ball = ball[1] / ball[2];
        let ratio_tan = tangent[1] / tangent[2];
        assert!((ratio_ball - ratio_tan).abs() < TOL);
        assert!((ratio_ball - 0.75).abs() < TOL);
    }

    #[test]
    fn distance_rejects_off_manifold_pair() {
        // Two points with −⟨u,v⟩_L clearly below 1.
        let u = vec![0.0, 1.0, 0.0];
        let v = vec![0.0, 0.0, 1.0];
        assert!(hyperboloid_distance(&u, &v).is_err());
    }

    #[test]
    fn minkowski_diag_signature() {
        assert_eq!(minkowski_diag(3), vec![-1.0, 1.0, 1.0]);
    }

    #[test]
    fn deep_ball_points_have_large_distance() {
        // Near the ball boundary the hyperboloid distance blows up.
        let shallow = ball_to_hyperboloid(&[0.1, 0.0]).unwrap();
        let deep = ball_to_hyperboloid(&[0.999, 0.0]).unwrap();
        let origin = ball_to_hyperboloid(&[0.0, 0.0]).unwrap();
        let d_shallow = hyperboloid_distance(&origin, &shallow).unwrap();
        let d_deep = hyperboloid_distance(&origin, &deep).unwrap();
        assert!(d_deep > d_shallow * 10.0, "{d_deep} vs {d_shallow}");
        assert!(d_deep.is_finite());
        let _ = l2_norm(&deep);
    }
}
