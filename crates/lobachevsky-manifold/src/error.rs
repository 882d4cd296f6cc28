//! Error types for manifold operations.

/// Errors that can occur while lifting points onto a manifold or computing
/// geodesic distances.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ManifoldError {
    /// A point was outside the open unit ball (‖x‖² ≥ 1), so the
    /// ball→hyperboloid lift is undefined.
    #[error("point outside the unit ball: ‖x‖² = {norm_sq:.6} ≥ 1.0")]
    OutsideBall { norm_sq: f64 },

    /// An intermediate value fell outside the valid domain of acosh/sqrt.
    /// Usually a sign that the current transform has pushed a pair of points
    /// off the manifold's valid region.
    #[error("numeric domain violation in {op}: argument {value:.6}")]
    NumericDomain { op: &'static str, value: f64 },

    /// Two inputs had incompatible dimensions.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}
