//! # mdi-cli: Command-Line Interface
//!
//! Provides the `mdi` binary.
//!
//! ## Commands
//!
//! ```bash
//! mdi example.zarr neural_lam:v0.1.0
//! mdi example.zarr neural_lam:v0.1.0 --all-violations
//! mdi list
//! mdi show neural_lam:v0.1.0
//! mdi --specs-root ./specs list
//! ```
//!
//! Every command returns an exit code: 0 on success, 1 when the dataset does
//! not conform or any error occurs.

pub mod check;
pub mod config;
pub mod specs;

use std::sync::Arc;

use mdi_schema::{SpecLoader, SpecRegistry};

/// The loader used by every command for the selected spec source.
pub fn loader_for(source: &config::SpecSource) -> SpecLoader<Arc<dyn SpecRegistry>> {
    SpecLoader::new(source.registry())
}
