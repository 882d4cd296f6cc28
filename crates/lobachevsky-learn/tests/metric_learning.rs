//! End-to-end runs of the learning loops on small synthetic datasets.

use lobachevsky_learn::kmeans;
use lobachevsky_learn::loss::{
    lmnn_loss, mmc_loss, ratio_grad, ratio_loss, Metric, NegativeSample,
};
use lobachevsky_learn::pairs::PairSets;
use lobachevsky_manifold::hyperboloid::tangent_to_hyperboloid;
use lobachevsky_manifold::linalg::identity;
use lobachevsky_manifold::Manifold;
use lobachevsky_optim::{bfgs, powell};
use rand::SeedableRng;

/// Two tight clusters of opposite labels in the plane.
fn two_blob_dataset() -> (Vec<Vec<f64>>, Vec<usize>) {
    let points = vec![
        vec![0.0, 0.0],
        vec![0.2, 0.1],
        vec![0.1, 0.2],
        vec![3.0, 3.0],
        vec![3.2, 3.1],
        vec![3.1, 2.9],
    ];
    let labels = vec![0, 0, 0, 1, 1, 1];
    (points, labels)
}

#[test]
fn powell_lowers_the_mmc_loss_from_identity() {
    let (points, labels) = two_blob_dataset();
    let pairs = PairSets::build(&labels);
    let metric = Metric::Lifted(Manifold::Euclidean);
    let q0 = identity(2);
    let initial = mmc_loss(&q0, 0.5, metric, &points, &labels, &pairs).unwrap();

    let objective = |q: &[f64]| {
        mmc_loss(q, 0.5, metric, &points, &labels, &pairs).unwrap_or(f64::INFINITY)
    };
    let opts = powell::PowellOptions { max_iter: 40, ..Default::default() };
    let r = powell::minimize(objective, &q0, &opts);
    assert!(r.fx < initial, "optimizer made no progress: {} >= {initial}", r.fx);
}

#[test]
fn powell_lowers_the_lmnn_loss_on_the_hyperboloid() {
    let (points, labels) = two_blob_dataset();
    let metric = Metric::Lifted(Manifold::Hyperboloid);
    let q0 = identity(2);
    let initial = lmnn_loss(&q0, 2.5, 0.5, metric, &points, &labels).unwrap();

    let objective = |q: &[f64]| {
        lmnn_loss(q, 2.5, 0.5, metric, &points, &labels).unwrap_or(f64::INFINITY)
    };
    let opts = powell::PowellOptions { max_iter: 40, ..Default::default() };
    let r = powell::minimize(objective, &q0, &opts);
    assert!(r.fx <= initial, "loss rose: {} > {initial}", r.fx);
    assert!(r.fx.is_finite());
}

#[test]
fn powell_lowers_the_mmc_loss_under_the_path_integral_metric() {
    let (points, labels) = two_blob_dataset();
    let pairs = PairSets::build(&labels);
    let metric = Metric::Riemannian { steps: 16 };
    let q0 = identity(2);
    let initial = mmc_loss(&q0, 0.5, metric, &points, &labels, &pairs).unwrap();

    let objective = |q: &[f64]| {
        mmc_loss(q, 0.5, metric, &points, &labels, &pairs).unwrap_or(f64::INFINITY)
    };
    let opts = powell::PowellOptions { max_iter: 20, ..Default::default() };
    let r = powell::minimize(objective, &q0, &opts);
    assert!(r.fx < initial, "optimizer made no progress: {} >= {initial}", r.fx);
    assert!(r.fx.is_finite());
}

#[test]
fn bfgs_with_the_analytic_gradient_lowers_the_ratio_loss() {
    let (base, labels) = two_blob_dataset();
    let points: Vec<Vec<f64>> = base.iter().map(|p| tangent_to_hyperboloid(p)).collect();
    let pairs = PairSets::build(&labels);
    let mut rng = rand::rngs::StdRng::seed_from_u64(9);
    let sample = NegativeSample::draw(&pairs, &labels, 3, &mut rng);

    let q0 = identity(3);
    let initial = ratio_loss(&q0, &points, &pairs, &sample).unwrap();

    let f = |q: &[f64]| ratio_loss(q, &points, &pairs, &sample).unwrap_or(f64::INFINITY);
    let grad = |q: &[f64]| {
        ratio_grad(q, &points, &pairs, &sample).unwrap_or_else(|_| vec![0.0; q.len()])
    };
    let opts = bfgs::BfgsOptions { max_iter: 60, ..Default::default() };
    let r = bfgs::minimize(f, grad, &q0, &opts);
    assert!(r.fx <= initial, "loss rose: {} > {initial}", r.fx);
    assert!(r.fx.is_finite());
}

#[test]
fn clustering_lifted_points_recovers_the_blobs() {
    let (base, _) = two_blob_dataset();
    let lifted: Vec<Vec<f64>> = base
        .iter()
        .map(|p| Manifold::Hyperboloid.lift(p))
        .collect();
    let mut dist = |a: &[f64], b: &[f64]| {
        Manifold::Hyperboloid.distance(a, b).unwrap_or(f64::INFINITY)
    };
    let mut rng = rand::rngs::StdRng::seed_from_u64(4);
    let a = kmeans::cluster(&lifted, 2, &mut rng, &mut dist).unwrap();
    assert_eq!(a[0], a[1]);
    assert_eq!(a[1], a[2]);
    assert_eq!(a[3], a[4]);
    assert_eq!(a[4], a[5]);
    assert_ne!(a[0], a[3]);
}
