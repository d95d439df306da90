//! # Check Command
//!
//! `mdi <dataset_path> <spec_identifier>` opens a Zarr store and checks it
//! against a spec. Prints `Dataset matches the spec!` and exits 0 on
//! success. A non-conforming dataset prints the violation (or, with
//! `--all-violations`, every violation) and exits 1. Errors opening the store
//! or loading the spec are returned to `main`, which logs them and exits 1.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use mdi_core::DatasetLike;
use mdi_schema::{CheckError, SpecLoader, SpecRegistry};

/// Success line printed for a conforming dataset.
pub const MATCH_MESSAGE: &str = "Dataset matches the spec!";

/// Arguments for checking a dataset.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Path to the Zarr dataset.
    #[arg(required = true)]
    pub dataset_path: Option<PathBuf>,

    /// Spec identifier, e.g. `neural_lam:v0.1.0`.
    #[arg(required = true)]
    pub spec_identifier: Option<String>,

    /// Report every violation instead of stopping at the first.
    #[arg(long)]
    pub all_violations: bool,
}

/// Open the dataset named in `args` and check it against the spec.
pub fn run_check<R: SpecRegistry>(args: &CheckArgs, loader: &SpecLoader<R>) -> Result<u8> {
    let dataset_path = args
        .dataset_path
        .as_deref()
        .context("a dataset path is required")?;
    let identifier = args
        .spec_identifier
        .as_deref()
        .context("a spec identifier is required")?;

    let dataset = open_store(dataset_path)?;
    check_loaded(&dataset, identifier, args.all_violations, loader)
}

/// Check an already-opened dataset against `identifier`.
pub fn check_loaded<D, R>(
    dataset: &D,
    identifier: &str,
    all_violations: bool,
    loader: &SpecLoader<R>,
) -> Result<u8>
where
    D: DatasetLike + ?Sized,
    R: SpecRegistry,
{
    tracing::info!(
        identifier,
        all_violations,
        variables = dataset.variable_names().len(),
        attributes = dataset.attribute_names().len(),
        "checking dataset"
    );

    let result = if all_violations {
        loader.check_all(dataset, identifier)
    } else {
        loader.check(dataset, identifier)
    };

    match result {
        Ok(()) => {
            println!("{MATCH_MESSAGE}");
            Ok(0)
        }
        Err(CheckError::Spec(e)) => {
            Err(e).with_context(|| format!("failed to load spec {identifier}"))
        }
        Err(e) => {
            let violations = e.violations();
            println!(
                "Dataset does not match {identifier} ({} violation{}):",
                violations.len(),
                if violations.len() == 1 { "" } else { "s" }
            );
            for violation in violations {
                println!("  FAIL: {violation}");
            }
            Ok(1)
        }
    }
}

fn open_store(path: &Path) -> Result<mdi_core::Dataset> {
    mdi_store::open_dataset(path)
        .with_context(|| format!("failed to open dataset {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdi_core::Dataset;
    use mdi_schema::BundledRegistry;

    fn conforming() -> Dataset {
        Dataset::new()
            .with_variable("state", ["time", "grid_index", "state_feature"])
            .with_variable("static", ["grid_index", "static_feature"])
            .with_variable("forcing", ["time", "grid_index", "forcing_feature"])
            .with_variable("boundary_mask", ["grid_index"])
            .with_attribute("dt", 3600)
            .with_attribute("projection", "lcc")
    }

    #[test]
    fn conforming_dataset_exits_zero() {
        let loader = SpecLoader::new(BundledRegistry);
        for all in [false, true] {
            let code = check_loaded(&conforming(), "neural_lam:v0.1.0", all, &loader).unwrap();
            assert_eq!(code, 0);
        }
    }

    #[test]
    fn violation_exits_one() {
        let loader = SpecLoader::new(BundledRegistry);
        for all in [false, true] {
            let code = check_loaded(&Dataset::new(), "neural_lam:v0.1.0", all, &loader).unwrap();
            assert_eq!(code, 1);
        }
    }

    #[test]
    fn spec_errors_are_returned() {
        let loader = SpecLoader::new(BundledRegistry);
        let err = check_loaded(&conforming(), "nonexistent:v0", false, &loader).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("failed to load spec nonexistent:v0"));
        assert!(msg.contains("does not exist"));
    }

    #[test]
    fn malformed_identifier_is_returned() {
        let loader = SpecLoader::new(BundledRegistry);
        assert!(check_loaded(&conforming(), "no-colon", false, &loader).is_err());
    }

    #[test]
    fn missing_store_is_returned() {
        let args = CheckArgs {
            dataset_path: Some(PathBuf::from("/nonexistent/data.zarr")),
            spec_identifier: Some("neural_lam:v0.1.0".into()),
            all_violations: false,
        };
        let err = run_check(&args, &SpecLoader::new(BundledRegistry)).unwrap_err();
        assert!(err.to_string().contains("failed to open dataset"));
    }
}
