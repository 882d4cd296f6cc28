//! Shared pieces of the experiment binary: dataset loading and telemetry.

pub mod dataset;
pub mod telemetry;
