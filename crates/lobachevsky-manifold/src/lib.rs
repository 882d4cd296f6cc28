//! # lobachevsky-manifold
//!
//! Manifold lifts and geodesic distances for the Lobachevsky metric-learning
//! harness. This crate is the single source of truth for manifold math in the
//! workspace; every crate that touches hyperboloid coordinates imports from
//! here.
//!
//! ## Core operations
//!
//! | Item | Purpose |
//! |---|---|
//! | [`Manifold`] | Euclidean / hyperboloid lift + geodesic distance behind one enum |
//! | [`hyperboloid::ball_to_hyperboloid`] | Convert Poincaré-ball embedding output |
//! | [`hyperboloid::tangent_to_hyperboloid`] | Total lift used by the learners |
//! | [`hyperboloid::lorentz_inner`] | Minkowski bilinear form |
//! | [`riemannian::transformed_path_length`] | Quadrature distance under a learned Q |
//!
//! ## Safety invariant
//!
//! Every hyperboloid point produced here satisfies `−x0² + Σxi² = −1` to
//! numerical tolerance; use [`hyperboloid::is_on_hyperboloid`] to validate
//! external inputs.

pub mod error;
pub mod hyperboloid;
pub mod linalg;
pub mod riemannian;

pub use error::ManifoldError;

// ─────────────────────────────────────────────
// Euclidean distance
// ─────────────────────────────────────────────

/// Plain Euclidean distance `‖u − v‖₂`.
#[inline]
pub fn euclidean_distance(u: &[f64], v: &[f64]) -> f64 {
    debug_assert_eq!(u.len(), v.len(), "dimension mismatch in euclidean_distance");
    u.iter()
        .zip(v.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f64>()
        .sqrt()
}

// ─────────────────────────────────────────────
// Manifold selector
// ─────────────────────────────────────────────

/// The manifold a point set lives on: a lift from base-space coordinates and
/// a geodesic distance between lifted points.
///
/// The generic Riemannian metric under a learned transform has no lift and
/// lives in [`riemannian`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manifold {
    /// Identity lift, L2 distance.
    Euclidean,
    /// Tangent lift `x0 = √(1 + ‖x‖²)`, arccosh distance. Total on the base
    /// space, so a learned transform can move points freely.
    Hyperboloid,
}

impl Manifold {
    /// Lift a base-space point onto the manifold.
    pub fn lift(&self, x: &[f64]) -> Vec<f64> {
        match self {
            Manifold::Euclidean => x.to_vec(),
            Manifold::Hyperboloid => hyperboloid::tangent_to_hyperboloid(x),
        }
    }

    /// Geodesic distance between two lifted points.
    ///
    /// # Errors
    ///
    /// Returns [`ManifoldError::NumericDomain`] from the hyperboloid variant
    /// when the pair is off-manifold (see
    /// [`hyperboloid::hyperboloid_distance`]).
    pub fn distance(&self, u: &[f64], v: &[f64]) -> Result<f64, ManifoldError> {
        match self {
            Manifold::Euclidean => Ok(euclidean_distance(u, v)),
            Manifold::Hyperboloid => hyperboloid::hyperboloid_distance(u, v),
        }
    }

    /// Dimension of a lifted point for a base dimension `d`.
    pub fn lifted_dim(&self, d: usize) -> usize {
        match self {
            Manifold::Euclidean => d,
            Manifold::Hyperboloid => d + 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Manifold::Euclidean => "euclidean",
            Manifold::Hyperboloid => "hyperboloid",
        }
    }
}

impl std::str::FromStr for Manifold {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "euclidean" | "euc" => Ok(Manifold::Euclidean),
            "hyperboloid" | "hyp" => Ok(Manifold::Hyperboloid),
            other => Err(format!("unknown manifold '{other}'")),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
