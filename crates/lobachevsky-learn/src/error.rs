use lobachevsky_manifold::ManifoldError;

/// Errors raised by the metric-learning routines.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LearnError {
    #[error("point set and label vector disagree: {points} points, {labels} labels")]
    ShapeMismatch { points: usize, labels: usize },

    #[error("flattened transform of length {len} cannot reshape to {dim}x{dim}")]
    BadTransformShape { len: usize, dim: usize },

    #[error("distance matrix is malformed: {reason}")]
    BadDistanceMatrix { reason: &'static str },

    #[error("cluster count must be at least 1")]
    ZeroClusters,

    #[error(transparent)]
    Manifold(#[from] ManifoldError),
}
