//! # Conformance Checking
//!
//! Verifies that a dataset contains every variable, dimension, and global
//! attribute a [`SchemaDocument`] requires. Conformance is "contains at
//! least": extra variables, extra dimensions, and extra attributes are
//! allowed, dimension order and sizes are never inspected, and attribute
//! values are never read.
//!
//! ## Order
//!
//! Requirements are visited in document order: every variable (membership
//! first, then each of its dimensions), then every attribute. A fail-fast
//! check reports the first violation in that order; a collect-all check
//! reports all of them in that order.
//!
//! Both modes share [`walk`]; they differ only in the sink that receives each
//! violation.

use std::fmt;
use std::ops::ControlFlow;

use mdi_core::DatasetLike;
use thiserror::Error;

use crate::document::SchemaDocument;

/// One requirement a dataset fails to meet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A required variable is absent.
    #[error("Variable {variable} is missing from the dataset.")]
    MissingVariable {
        /// The missing variable.
        variable: String,
    },

    /// A required variable lacks a required dimension.
    #[error(
        "Variable {variable} does not have the required dimension {dimension} \
         (required {required:?}, found {actual:?})."
    )]
    MissingDimension {
        /// The variable being checked.
        variable: String,
        /// The first required dimension the variable lacks.
        dimension: String,
        /// All dimensions the spec requires for the variable.
        required: Vec<String>,
        /// The variable's actual dimensions.
        actual: Vec<String>,
    },

    /// A required global attribute is absent.
    #[error("Attribute {attribute} is missing from the dataset.")]
    MissingAttribute {
        /// The missing attribute.
        attribute: String,
    },
}

/// All violations found by a collect-all check, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationList(Vec<Violation>);

impl ViolationList {
    /// Number of violations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The violations as a slice.
    pub fn as_slice(&self) -> &[Violation] {
        &self.0
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.0
    }
}

impl From<Vec<Violation>> for ViolationList {
    fn from(violations: Vec<Violation>) -> Self {
        Self(violations)
    }
}

impl fmt::Display for ViolationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {v}")?;
        }
        Ok(())
    }
}

/// Visit every requirement of `schema` against `dataset`, handing each
/// violation to `sink`. Stops as soon as the sink breaks.
///
/// A missing variable yields one [`Violation::MissingVariable`] and its
/// dimensions are not visited.
pub fn walk<D, B, F>(schema: &SchemaDocument, dataset: &D, mut sink: F) -> ControlFlow<B>
where
    D: DatasetLike + ?Sized,
    F: FnMut(Violation) -> ControlFlow<B>,
{
    for requirement in schema.variables() {
        let Some(actual) = dataset.variable_dims(&requirement.name) else {
            sink(Violation::MissingVariable {
                variable: requirement.name.clone(),
            })?;
            continue;
        };
        for (i, dim) in requirement.dims.iter().enumerate() {
            if requirement.dims[..i].contains(dim) {
                continue;
            }
            if !actual.iter().any(|d| d == dim) {
                sink(Violation::MissingDimension {
                    variable: requirement.name.clone(),
                    dimension: dim.clone(),
                    required: requirement.dims.clone(),
                    actual: actual.to_vec(),
                })?;
            }
        }
    }

    for attribute in schema.attributes() {
        if !dataset.has_attribute(attribute) {
            sink(Violation::MissingAttribute {
                attribute: attribute.clone(),
            })?;
        }
    }

    ControlFlow::Continue(())
}

/// Fail-fast check: the first violation in schema order, if any.
pub fn check_schema<D>(schema: &SchemaDocument, dataset: &D) -> Result<(), Violation>
where
    D: DatasetLike + ?Sized,
{
    match walk(schema, dataset, ControlFlow::Break) {
        ControlFlow::Break(violation) => Err(violation),
        ControlFlow::Continue(()) => Ok(()),
    }
}

/// Every violation in schema order. Empty when the dataset conforms.
pub fn collect_violations<D>(schema: &SchemaDocument, dataset: &D) -> Vec<Violation>
where
    D: DatasetLike + ?Sized,
{
    let mut violations = Vec::new();
    let _ = walk::<_, (), _>(schema, dataset, |v| {
        violations.push(v);
        ControlFlow::Continue(())
    });
    violations
}

/// Collect-all check: `Err` carries every violation.
pub fn check_schema_all<D>(schema: &SchemaDocument, dataset: &D) -> Result<(), ViolationList>
where
    D: DatasetLike + ?Sized,
{
    let violations = collect_violations(schema, dataset);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ViolationList(violations))
    }
}
