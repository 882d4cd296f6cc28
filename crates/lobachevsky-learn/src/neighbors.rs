//! Radius neighbor queries split by label agreement.

use lobachevsky_manifold::ManifoldError;

/// Partition the points within `radius` of `x` into same-label ("true") and
/// different-label ("imposter") index sets, in dataset order.
///
/// The radius bound is strict. The query point is not excluded by index; when
/// `x` is itself a member of `points` it shows up among the true neighbors at
/// distance zero.
pub fn split_by_radius<D>(
    x: &[f64],
    label_x: usize,
    points: &[Vec<f64>],
    labels: &[usize],
    radius: f64,
    dist: &mut D,
) -> Result<(Vec<usize>, Vec<usize>), ManifoldError>
where
    D: FnMut(&[f64], &[f64]) -> Result<f64, ManifoldError>,
{
    let mut true_neighbors = Vec::new();
    let mut imposters = Vec::new();
    for (idx, y) in points.iter().enumerate() {
        let d = dist(x, y)?;
        if d < radius {
            if labels[idx] == label_x {
                true_neighbors.push(idx);
            } else {
                imposters.push(idx);
            }
        }
    }
    Ok((true_neighbors, imposters))
}
