//! # Error Types
//!
//! Structured errors for spec resolution, spec parsing, and conformance
//! checking. Every error names the identifier and, where one exists, the
//! location that was tried, so a failed check can be diagnosed from the
//! message alone.

use std::fmt;
use std::path::PathBuf;

use mdi_core::{IdentifierError, SpecIdentifier};
use thiserror::Error;

use crate::check::{Violation, ViolationList};
use crate::registry::SpecLocation;

/// Errors raised while resolving or loading a spec document.
#[derive(Error, Debug)]
pub enum SpecError {
    /// The identifier is not of the form `name:version`.
    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),

    /// No spec document exists for the identifier.
    #[error("Spec file {location} for {identifier} does not exist.")]
    NotFound {
        /// The identifier that was resolved.
        identifier: SpecIdentifier,
        /// Where the registry looked.
        location: SpecLocation,
    },

    /// The spec document exists but is not a well-formed spec.
    #[error("failed to parse spec {identifier} at {location}: {source}")]
    Parse {
        /// The identifier that was resolved.
        identifier: SpecIdentifier,
        /// Where the document was read from.
        location: SpecLocation,
        /// The underlying parse failure.
        #[source]
        source: DocumentError,
    },

    /// Reading from the registry failed for a reason other than absence.
    #[error("I/O error at {}: {source}", .location.display())]
    Io {
        /// The path being read.
        location: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl SpecError {
    /// True for [`SpecError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for [`SpecError::Parse`].
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// Why a spec document's text could not be turned into a schema.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The text is not valid YAML.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The YAML uses constructs with no JSON equivalent.
    #[error("YAML-to-JSON conversion failed: {0}")]
    Conversion(String),

    /// The document does not have the spec document structure.
    #[error("document structure is invalid:\n{0}")]
    Malformed(StructureViolations),

    /// The structurally valid document could not be decoded.
    #[error("document could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    /// The bundled document meta-schema failed to compile.
    #[error("spec document meta-schema is invalid: {0}")]
    MetaSchema(String),
}

/// A single structural problem in a spec document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureViolation {
    /// JSON Pointer to the offending value in the document.
    pub instance_path: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for StructureViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// All structural problems found in one spec document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureViolations(pub Vec<StructureViolation>);

impl StructureViolations {
    /// Number of violations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the violations.
    pub fn iter(&self) -> impl Iterator<Item = &StructureViolation> {
        self.0.iter()
    }
}

impl fmt::Display for StructureViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Errors raised by a conformance check.
#[derive(Error, Debug)]
pub enum CheckError {
    /// The spec could not be loaded.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// The first requirement the dataset fails.
    #[error(transparent)]
    Violation(#[from] Violation),

    /// Every requirement the dataset fails (collect-all mode).
    #[error("dataset does not conform to the spec ({count} violations):\n{0}", count = .0.len())]
    Violations(ViolationList),
}

impl CheckError {
    /// Violations carried by this error, in schema order. Empty when the
    /// spec itself could not be loaded.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Spec(_) => &[],
            Self::Violation(v) => std::slice::from_ref(v),
            Self::Violations(list) => list.as_slice(),
        }
    }
}

/// Result type alias for spec loading.
pub type SpecResult<T> = Result<T, SpecError>;
