//! # lobachevsky-learn
//!
//! Metric learning over manifold distances: pair-set construction, radius
//! neighbor queries, three loss families over a learned linear transform,
//! manifold-aware k-means local search, and MDS stress reconstruction.
//!
//! The flow mirrors the research setup: a base point set and its labels come
//! from an external embedding, [`pairs::PairSets`] and
//! [`neighbors::split_by_radius`] decide which pairs matter, a loss from
//! [`loss`] scores a candidate transform, and an optimizer from
//! `lobachevsky-optim` searches its flattened entries. [`kmeans`] and [`mds`]
//! consume the same manifold distances independently of any transform.
//!
//! Randomized steps (negative sampling, clustering init, MDS init) all take an
//! explicit `&mut impl Rng`, so a seeded caller is fully reproducible.

pub mod error;
pub mod kmeans;
pub mod loss;
pub mod mds;
pub mod neighbors;
pub mod pairs;

pub use error::LearnError;
