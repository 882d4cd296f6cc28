//! # Lobachevsky metric-learning experiment
//!
//! Learns a linear transform over a manifold embedding of a labeled graph, or
//! reconstructs coordinates from graph hop counts.
//!
//! ## 5 Experimental Modes
//!
//! | Mode | Objective | Optimizer |
//! |------|-----------|-----------|
//! | lmnn | large-margin nearest-neighbor hinge | Powell |
//! | mmc | contrastive pair-mean difference | Powell |
//! | ratio | hyperboloid softmax ratio, sampled negatives | BFGS (analytic gradient) |
//! | mds | stress against the hop-count matrix | Powell |
//! | kmeans | intra-cluster distance local search | none |
//!
//! The margin losses accept `--manifold euclidean|hyperboloid|riemannian`;
//! `riemannian` skips the lift and integrates path length under the learned
//! transform itself.
//!
//! ## Usage
//!
//! ```text
//! experiment --edges graph.txt --labels labels.txt --mode lmnn --manifold hyperboloid
//! experiment --edges graph.txt --labels labels.txt --mode mmc --manifold riemannian
//! experiment --edges graph.txt --mode mds --dim 2 --seed 7
//! ```
//!
//! Output: `telemetry_{mode}.csv` and `result_{mode}.json` in the current
//! directory.

use std::path::PathBuf;

use lobachevsky_experiment::dataset::{
    hop_matrix, load_edge_list, load_labels, node_count, random_ball_points,
};
use lobachevsky_experiment::telemetry::{write_csv, EvalRecord};

use lobachevsky_learn::kmeans::{assignment_cost, cluster};
use lobachevsky_learn::loss::{
    lmnn_loss, mmc_loss, ratio_grad, ratio_loss, Metric, NegativeSample, DEFAULT_NEGATIVES,
};
use lobachevsky_learn::mds;
use lobachevsky_learn::pairs::PairSets;

use lobachevsky_manifold::hyperboloid::tangent_to_hyperboloid;
use lobachevsky_manifold::linalg::identity;
use lobachevsky_manifold::riemannian::DEFAULT_QUADRATURE_STEPS;
use lobachevsky_manifold::Manifold;

use lobachevsky_optim::powell::PowellOptions;
use lobachevsky_optim::{bfgs, powell};

use rand::rngs::StdRng;
use rand::SeedableRng;

// ─────────────────────────────────────────────
// Experiment configuration
// ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Lmnn,
    Mmc,
    Ratio,
    Mds,
    Kmeans,
}

impl Mode {
    fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lmnn" => Some(Self::Lmnn),
            "mmc" => Some(Self::Mmc),
            "ratio" => Some(Self::Ratio),
            "mds" => Some(Self::Mds),
            "kmeans" => Some(Self::Kmeans),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Lmnn => "lmnn",
            Self::Mmc => "mmc",
            Self::Ratio => "ratio",
            Self::Mds => "mds",
            Self::Kmeans => "kmeans",
        }
    }

    fn needs_labels(&self) -> bool {
        matches!(self, Self::Lmnn | Self::Mmc | Self::Ratio)
    }
}

struct ExperimentConfig {
    edges: PathBuf,
    labels: Option<PathBuf>,
    mode: Mode,
    /// Distance selector for the margin losses; lifted modes (mds, kmeans)
    /// require a `Metric::Lifted` choice.
    metric: Metric,
    manifold: Manifold,
    dim: usize,
    radius: f64,
    reg: f64,
    negatives: usize,
    clusters: usize,
    seed: u64,
    max_iter: usize,
    output_csv: PathBuf,
    output_json: PathBuf,
}

/// Everything a run leaves behind, dumped as JSON.
#[derive(serde::Serialize)]
struct RunSummary {
    mode: &'static str,
    manifold: &'static str,
    loss: f64,
    iterations: usize,
    converged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    transform: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    points: Option<Vec<Vec<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignment: Option<Vec<usize>>,
}

// ─────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "lobachevsky_experiment=info,lobachevsky_learn=warn".into()),
        )
        .init();

    let config = parse_args();

    tracing::info!(
        mode = config.mode.label(),
        metric = config.metric.label(),
        dim = config.dim,
        seed = config.seed,
        "Starting metric-learning experiment"
    );

    let edges = load_edge_list(&config.edges).expect("failed to load edge list");
    let n = node_count(&edges);
    let labels = match &config.labels {
        Some(path) => load_labels(path).expect("failed to load labels"),
        None if config.mode.needs_labels() => {
            eprintln!("mode '{}' requires --labels", config.mode.label());
            std::process::exit(1);
        }
        None => Vec::new(),
    };

    let mut rng = StdRng::seed_from_u64(config.seed);
    // Stand-in for the external Poincaré embedding provider.
    let points = random_ball_points(n, config.dim, 0.8, &mut rng);
    tracing::info!(nodes = n, edges = edges.len(), "Dataset loaded");

    let powell_opts = PowellOptions { max_iter: config.max_iter, ..Default::default() };
    let mut records: Vec<EvalRecord> = Vec::new();

    let summary = match config.mode {
        Mode::Lmnn => {
            let mut evaluation = 0u64;
            let objective = |q: &[f64]| {
                let loss =
                    lmnn_loss(q, config.radius, config.reg, config.metric, &points, &labels)
                        .unwrap_or(f64::INFINITY);
                records.push(EvalRecord::new("lmnn", evaluation, loss));
                evaluation += 1;
                loss
            };
            let r = powell::minimize(objective, &identity(config.dim), &powell_opts);
            RunSummary {
                mode: "lmnn",
                manifold: config.metric.label(),
                loss: r.fx,
                iterations: r.iterations,
                converged: r.converged,
                transform: Some(r.x),
                points: None,
                assignment: None,
            }
        }
        Mode::Mmc => {
            let pairs = PairSets::build(&labels);
            let mut evaluation = 0u64;
            let objective = |q: &[f64]| {
                let loss = mmc_loss(q, config.reg, config.metric, &points, &labels, &pairs)
                    .unwrap_or(f64::INFINITY);
                records.push(EvalRecord::new("mmc", evaluation, loss));
                evaluation += 1;
                loss
            };
            let r = powell::minimize(objective, &identity(config.dim), &powell_opts);
            RunSummary {
                mode: "mmc",
                manifold: config.metric.label(),
                loss: r.fx,
                iterations: r.iterations,
                converged: r.converged,
                transform: Some(r.x),
                points: None,
                assignment: None,
            }
        }
        Mode::Ratio => {
            let lifted: Vec<Vec<f64>> =
                points.iter().map(|p| tangent_to_hyperboloid(p)).collect();
            let pairs = PairSets::build(&labels);
            let sample = NegativeSample::draw(&pairs, &labels, config.negatives, &mut rng);
            let mut evaluation = 0u64;
            let f = |q: &[f64]| {
                let loss =
                    ratio_loss(q, &lifted, &pairs, &sample).unwrap_or(f64::INFINITY);
                records.push(EvalRecord::new("ratio", evaluation, loss));
                evaluation += 1;
                loss
            };
            let grad = |q: &[f64]| {
                ratio_grad(q, &lifted, &pairs, &sample).unwrap_or_else(|_| vec![0.0; q.len()])
            };
            let opts = bfgs::BfgsOptions { max_iter: config.max_iter, ..Default::default() };
            let r = bfgs::minimize(f, grad, &identity(config.dim + 1), &opts);
            RunSummary {
                mode: "ratio",
                manifold: Manifold::Hyperboloid.label(),
                loss: r.fx,
                iterations: r.iterations,
                converged: r.converged,
                transform: Some(r.x),
                points: None,
                assignment: None,
            }
        }
        Mode::Mds => {
            require_lifted(&config);
            let matrix = hop_matrix(&edges, n);
            let result = mds::reconstruct(&matrix, config.dim, config.manifold, &mut rng, &powell_opts)
                .expect("mds reconstruction failed");
            records.push(EvalRecord::new("mds", 0, result.report.fx));
            RunSummary {
                mode: "mds",
                manifold: config.manifold.label(),
                loss: result.report.fx,
                iterations: result.report.iterations,
                converged: result.report.converged,
                transform: None,
                points: Some(result.points),
                assignment: None,
            }
        }
        Mode::Kmeans => {
            require_lifted(&config);
            let lifted: Vec<Vec<f64>> =
                points.iter().map(|p| config.manifold.lift(p)).collect();
            let mut dist = |a: &[f64], b: &[f64]| {
                config.manifold.distance(a, b).unwrap_or(f64::INFINITY)
            };
            let assignment = cluster(&lifted, config.clusters, &mut rng, &mut dist)
                .expect("clustering failed");
            let cost = assignment_cost(&lifted, &assignment, config.clusters, &mut dist);
            records.push(EvalRecord::new("kmeans", 0, cost));
            RunSummary {
                mode: "kmeans",
                manifold: config.manifold.label(),
                loss: cost,
                iterations: 0,
                converged: true,
                transform: None,
                points: None,
                assignment: Some(assignment),
            }
        }
    };

    tracing::info!(
        loss = format!("{:.6}", summary.loss),
        iterations = summary.iterations,
        converged = summary.converged,
        "Run complete"
    );

    write_csv(&config.output_csv, &records).expect("failed to write CSV");
    let json = serde_json::to_string_pretty(&summary).expect("failed to serialize summary");
    std::fs::write(&config.output_json, json).expect("failed to write JSON");
    tracing::info!(
        csv = %config.output_csv.display(),
        json = %config.output_json.display(),
        "Results written"
    );
}

/// The mds and kmeans modes lift points onto a manifold; the transform-bound
/// path-integral metric does not apply to them.
fn require_lifted(config: &ExperimentConfig) {
    if matches!(config.metric, Metric::Riemannian { .. }) {
        eprintln!(
            "mode '{}' needs a lifted manifold; use --manifold euclidean|hyperboloid",
            config.mode.label()
        );
        std::process::exit(1);
    }
}

// ─────────────────────────────────────────────
// Argument parsing
// ─────────────────────────────────────────────

/// Minimal argument parser (no external deps).
fn parse_args() -> ExperimentConfig {
    let args: Vec<String> = std::env::args().collect();

    let mut edges = PathBuf::from("./edges.txt");
    let mut labels = None;
    let mut mode = Mode::Lmnn;
    let mut manifold = Manifold::Hyperboloid;
    let mut metric = Metric::Lifted(Manifold::Hyperboloid);
    let mut dim = 2;
    let mut radius = 2.0;
    let mut reg = 0.5;
    let mut negatives = DEFAULT_NEGATIVES;
    let mut clusters = 2;
    let mut seed = 0;
    let mut max_iter = 200;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--edges" => {
                i += 1;
                edges = PathBuf::from(&args[i]);
            }
            "--labels" => {
                i += 1;
                labels = Some(PathBuf::from(&args[i]));
            }
            "--mode" => {
                i += 1;
                mode = Mode::from_str(&args[i]).unwrap_or_else(|| {
                    eprintln!("Unknown mode '{}'. Use: lmnn, mmc, ratio, mds, kmeans", args[i]);
                    std::process::exit(1);
                });
            }
            "--manifold" => {
                i += 1;
                if args[i].to_lowercase() == "riemannian" {
                    metric = Metric::Riemannian { steps: DEFAULT_QUADRATURE_STEPS };
                } else {
                    manifold = args[i].parse().unwrap_or_else(|e| {
                        eprintln!("{e}. Use: euclidean, hyperboloid, riemannian");
                        std::process::exit(1);
                    });
                    metric = Metric::Lifted(manifold);
                }
            }
            "--dim" => {
                i += 1;
                dim = args[i].parse().unwrap_or(2);
            }
            "--radius" => {
                i += 1;
                radius = args[i].parse().unwrap_or(2.0);
            }
            "--reg" => {
                i += 1;
                reg = args[i].parse().unwrap_or(0.5);
            }
            "--negatives" => {
                i += 1;
                negatives = args[i].parse().unwrap_or(DEFAULT_NEGATIVES);
            }
            "--clusters" => {
                i += 1;
                clusters = args[i].parse().unwrap_or(2);
            }
            "--seed" => {
                i += 1;
                seed = args[i].parse().unwrap_or(0);
            }
            "--max-iter" => {
                i += 1;
                max_iter = args[i].parse().unwrap_or(200);
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: experiment --edges PATH [--labels PATH] [--mode lmnn|mmc|ratio|mds|kmeans] \
                     [--manifold euclidean|hyperboloid|riemannian] [--dim N] [--radius R] [--reg L] \
                     [--negatives N] [--clusters K] [--seed S] [--max-iter N]"
                );
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    let output_csv = PathBuf::from(format!("telemetry_{}.csv", mode.label()));
    let output_json = PathBuf::from(format!("result_{}.json", mode.label()));

    ExperimentConfig {
        edges,
        labels,
        mode,
        metric,
        manifold,
        dim,
        radius,
        reg,
        negatives,
        clusters,
        seed,
        max_iter,
        output_csv,
        output_json,
    }
}
