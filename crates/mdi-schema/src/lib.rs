//! # mdi-schema: Spec Resolution & Conformance Checking
//!
//! Resolves `name:version` spec identifiers to spec documents and checks
//! datasets against them.
//!
//! ## Resolution (`registry`, `loader`)
//!
//! A [`SpecRegistry`] maps an identifier to document text. The
//! [`BundledRegistry`] serves the documents shipped in this crate's `specs/`
//! directory; a [`DirectoryRegistry`] serves `<root>/<name>/<version>.yaml`
//! for an explicitly configured root. [`SpecLoader`] parses what the registry
//! returns, optionally caching by identifier.
//!
//! ## Documents (`document`)
//!
//! [`SchemaDocument`] holds the required variables (with required dimension
//! names) and required global attributes, in document order. Documents are
//! validated against a bundled JSON Schema before decoding.
//!
//! ## Checking (`check`)
//!
//! [`check_dataset`] fails on the first missing variable, dimension, or
//! attribute. [`SpecLoader::check_all`] and [`collect_violations`] report all
//! of them.
//!
//! ## Crate Policy
//!
//! - Depends only on `mdi-core` internally.
//! - Documents and datasets are never mutated by a check.
//! - Every error names the identifier and the location that was tried.

pub mod check;
pub mod document;
pub mod error;
pub mod loader;
pub mod registry;

pub use check::{
    check_schema, check_schema_all, collect_violations, walk, Violation, ViolationList,
};
pub use document::{SchemaDocument, VariableRequirement};
pub use error::{
    CheckError, DocumentError, SpecError, SpecResult, StructureViolation, StructureViolations,
};
pub use loader::{check_dataset, load_spec, SpecLoader};
pub use registry::{
    BundledRegistry, BundledSpec, DirectoryRegistry, ResolvedSpec, SpecLocation, SpecRegistry,
    BUNDLED_SPECS, SPEC_FILE_EXTENSION,
};
