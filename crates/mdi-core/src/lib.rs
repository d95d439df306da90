//! # mdi-core: Foundational Types for the MLLAM Data Interface
//!
//! Leaf crate of the workspace. It defines the two values every conformance
//! check is built from:
//!
//! 1. **[`SpecIdentifier`]**: a validated `name:version` newtype. No bare
//!    strings cross the registry boundary; a malformed identifier is rejected
//!    once, at parse time, with an [`IdentifierError`].
//!
//! 2. **[`DatasetLike`]**: the read-only capability the checker needs from a
//!    dataset: variable name → dimension names, and global attribute names.
//!    [`Dataset`] is the in-memory implementation used by tests and by the
//!    store reader.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mdi-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod dataset;
pub mod error;
pub mod identifier;

pub use dataset::{Dataset, DatasetLike, Variable};
pub use error::IdentifierError;
pub use identifier::SpecIdentifier;
