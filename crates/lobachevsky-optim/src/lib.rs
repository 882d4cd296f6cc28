//! # lobachevsky-optim
//!
//! Unconstrained minimizers over flattened parameter vectors:
//!
//! | Module | Method | Needs gradient |
//! |---|---|---|
//! | [`powell`] | Direction-set search with golden-section line minimization | no |
//! | [`nelder_mead`] | Simplex reflection/expansion/contraction | no |
//! | [`bfgs`] | Quasi-Newton with Armijo backtracking | yes |
//!
//! Objectives are plain `FnMut(&[f64]) -> f64`; callers map numeric-domain
//! failures in their loss functions to `f64::INFINITY`, which every method
//! here treats as an ordinary (terrible) function value. None of the methods
//! guarantees a global minimum; all of them report their iteration count and
//! a convergence flag so a caller can detect an exhausted budget.

pub mod bfgs;
mod line;
pub mod nelder_mead;
pub mod powell;

/// Outcome of a minimization run.
#[derive(Debug, Clone)]
pub struct OptimReport {
    /// Best parameter vector found.
    pub x: Vec<f64>,
    /// Objective value at `x`.
    pub fx: f64,
    /// Outer iterations performed.
    pub iterations: usize,
    /// Whether the convergence test was satisfied before the iteration
    /// budget ran out. `false` is a warning, not an error.
    pub converged: bool,
}
