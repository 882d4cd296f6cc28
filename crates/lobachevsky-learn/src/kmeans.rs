//! Manifold-aware k-means by local search.
//!
//! No centroids: manifolds here may have no closed-form mean, so the search
//! reassigns one point at a time to whichever cluster yields the strictly
//! lowest total cost, and converges when a full pass changes nothing. Each
//! trial recomputes the whole-assignment cost from scratch, which is cubic
//! per pass and intended for small point sets only.

use rand::Rng;

use crate::error::LearnError;

/// Total cost of an assignment: for every ordered pair of points sharing a
/// cluster, their distance halved and divided by the cluster's population.
pub fn assignment_cost<D>(
    points: &[Vec<f64>],
    assignment: &[usize],
    k: usize,
    dist: &mut D,
) -> f64
where
    D: FnMut(&[f64], &[f64]) -> f64,
{
    let mut pop = vec![0usize; k];
    for &c in assignment {
        pop[c] += 1;
    }
    let mut cost = 0.0;
    for (i, x) in points.iter().enumerate() {
        for (j, y) in points.iter().enumerate() {
            if i != j && assignment[i] == assignment[j] {
                cost += dist(x, y) / (2.0 * pop[assignment[i]] as f64);
            }
        }
    }
    cost
}

/// One full reassignment pass over every point in turn: trial reassignments
/// are evaluated on a fresh candidate copy of the assignment and committed
/// only on strict improvement. Returns whether any point moved.
pub fn improve_pass<D>(
    points: &[Vec<f64>],
    assignment: &mut [usize],
    k: usize,
    dist: &mut D,
) -> bool
where
    D: FnMut(&[f64], &[f64]) -> f64,
{
    let mut changed = false;
    for i in 0..points.len() {
        let mut best_c = assignment[i];
        let mut best_cost = assignment_cost(points, assignment, k, dist);
        for c in 0..k {
            if c == assignment[i] {
                continue;
            }
            let mut candidate = assignment.to_vec();
            candidate[i] = c;
            let cost = assignment_cost(points, &candidate, k, dist);
            if cost < best_cost {
                best_cost = cost;
                best_c = c;
            }
        }
        if best_c != assignment[i] {
            assignment[i] = best_c;
            changed = true;
        }
    }
    changed
}

/// Cluster `points` into `k` groups under an arbitrary distance function.
///
/// Initialization is uniform-random over `[0, k)`; passes of [`improve_pass`]
/// repeat until one changes nothing.
pub fn cluster<D, R>(
    points: &[Vec<f64>],
    k: usize,
    rng: &mut R,
    dist: &mut D,
) -> Result<Vec<usize>, LearnError>
where
    D: FnMut(&[f64], &[f64]) -> f64,
    R: Rng,
{
    if k == 0 {
        return Err(LearnError::ZeroClusters);
    }
    let n = points.len();
    let mut assignment: Vec<usize> = (0..n).map(|_| rng.gen_range(0..k)).collect();

    let mut pass = 0usize;
    loop {
        pass += 1;
        let changed = improve_pass(points, &mut assignment, k, dist);
        tracing::debug!(pass, changed, "clustering pass");
        if !changed {
            break;
        }
    }
    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lobachevsky_manifold::euclidean_distance;
    use rand::SeedableRng;

    fn euc(a: &[f64], b: &[f64]) -> f64 {
        euclidean_distance(a, b)
    }

    #[test]
    fn single_cluster_converges_immediately() {
        let points = vec![vec![0.0], vec![1.0], vec![9.0]];
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let assignment = cluster(&points, 1, &mut rng, &mut euc).unwrap();
        assert_eq!(assignment, vec![0, 0, 0]);
    }

    #[test]
    fn zero_clusters_is_rejected() {
        let points = vec![vec![0.0]];
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        assert!(matches!(
            cluster(&points, 0, &mut rng, &mut euc),
            Err(LearnError::ZeroClusters)
        ));
    }

    #[test]
    fn well_separated_groups_are_recovered() {
        let points = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![10.0, 10.0],
            vec![10.1, 10.0],
        ];
        for seed in 0..8 {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let a = cluster(&points, 2, &mut rng, &mut euc).unwrap();
            assert_eq!(a[0], a[1], "seed {seed}: {a:?}");
            assert_eq!(a[2], a[3], "seed {seed}: {a:?}");
            assert_ne!(a[0], a[2], "seed {seed}: {a:?}");
        }
    }

    #[test]
    fn assignment_cost_is_non_increasing_across_passes() {
        let points: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64, (i * i) as f64]).collect();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let mut assignment: Vec<usize> =
            (0..points.len()).map(|_| rng.gen_range(0..3)).collect();

        let mut previous = assignment_cost(&points, &assignment, 3, &mut euc);
        let mut converged = false;
        for _ in 0..50 {
            let changed = improve_pass(&points, &mut assignment, 3, &mut euc);
            let cost = assignment_cost(&points, &assignment, 3, &mut euc);
            assert!(cost <= previous + 1e-12, "pass raised the cost: {cost} > {previous}");
            previous = cost;
            if !changed {
                converged = true;
                break;
            }
        }
        assert!(converged, "no convergence within the pass budget");
    }

    #[test]
    fn cost_halving_avoids_double_counting() {
        // Two points in one cluster: ordered pairs (0,1) and (1,0), each
        // d/(2*2), so the total is d/2.
        let points = vec![vec![0.0], vec![4.0]];
        let cost = assignment_cost(&points, &[0, 0], 1, &mut euc);
        assert!((cost - 2.0).abs() < 1e-12, "cost = {cost}");
    }

    #[test]
    fn empty_point_set_yields_empty_assignment() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let a = cluster(&[], 2, &mut rng, &mut euc).unwrap();
        assert!(a.is_empty());
    }
}
