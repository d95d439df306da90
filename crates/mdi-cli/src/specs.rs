//! # Spec Inspection Commands
//!
//! `mdi list` prints every identifier the active registry can resolve.
//! `mdi show <spec_identifier>` prints the parsed document as YAML.

use anyhow::{Context, Result};
use clap::Args;

use mdi_schema::{SpecLoader, SpecRegistry};

/// Arguments for `mdi show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Spec identifier, e.g. `neural_lam:v0.1.0`.
    pub spec_identifier: String,
}

/// Execute `mdi list`.
pub fn run_list<R: SpecRegistry>(loader: &SpecLoader<R>) -> Result<u8> {
    let identifiers = loader
        .identifiers()
        .context("failed to enumerate specs")?;
    for id in &identifiers {
        println!("{id}");
    }
    tracing::info!(count = identifiers.len(), "listed specs");
    Ok(0)
}

/// Execute `mdi show`.
pub fn run_show<R: SpecRegistry>(args: &ShowArgs, loader: &SpecLoader<R>) -> Result<u8> {
    print!("{}", render(&args.spec_identifier, loader)?);
    Ok(0)
}

/// The YAML rendering of the document `identifier` resolves to.
pub fn render<R: SpecRegistry>(identifier: &str, loader: &SpecLoader<R>) -> Result<String> {
    let document = loader
        .load(identifier)
        .with_context(|| format!("failed to load spec {identifier}"))?;
    document
        .to_yaml_string()
        .with_context(|| format!("failed to render spec {identifier}"))
}
