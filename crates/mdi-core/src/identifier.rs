//! # Spec Identifier Newtype
//!
//! A spec identifier names one published schema document as
//! `{spec_name}:{spec_version}`, e.g. `neural_lam:v0.1.0`. Both parts become
//! path segments when a directory registry resolves the identifier, so they
//! are validated here rather than at every call site.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::IdentifierError;

/// Separator between the spec name and the spec version.
pub const SEPARATOR: char = ':';

/// A validated `name:version` spec identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecIdentifier {
    name: String,
    version: String,
}

impl SpecIdentifier {
    /// Parse an identifier of the form `name:version`.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentifierError`] if the input does not contain exactly
    /// one `:`, if either part is empty, or if either part contains a path
    /// separator or is a relative segment (`.` / `..`).
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        let mut parts = input.split(SEPARATOR);
        let (name, version) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(version), None) => (name, version),
            (_, None, _) => {
                return Err(IdentifierError::MissingSeparator {
                    input: input.to_string(),
                })
            }
            _ => {
                return Err(IdentifierError::ExtraSeparator {
                    input: input.to_string(),
                })
            }
        };
        Self::new_checked(input, name, version)
    }

    /// Build an identifier from already-split parts.
    ///
    /// # Errors
    ///
    /// Same validation as [`SpecIdentifier::parse`], minus the separator count.
    pub fn new(name: &str, version: &str) -> Result<Self, IdentifierError> {
        let input = format!("{name}{SEPARATOR}{version}");
        if name.contains(SEPARATOR) || version.contains(SEPARATOR) {
            return Err(IdentifierError::ExtraSeparator { input });
        }
        Self::new_checked(&input, name, version)
    }

    fn new_checked(input: &str, name: &str, version: &str) -> Result<Self, IdentifierError> {
        for (part, value) in [("name", name), ("version", version)] {
            if value.is_empty() {
                return Err(IdentifierError::EmptyPart {
                    input: input.to_string(),
                    part,
                });
            }
            if !is_path_safe(value) {
                return Err(IdentifierError::UnsafePart {
                    input: input.to_string(),
                    part,
                    value: value.to_string(),
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
        })
    }

    /// The spec name, e.g. `neural_lam`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The spec version token, e.g. `v0.1.0`.
    pub fn version(&self) -> &str {
        &self.version
    }
}

fn is_path_safe(part: &str) -> bool {
    part != "." && part != ".." && !part.contains(['/', '\\'])
}

impl fmt::Display for SpecIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.name, self.version)
    }
}

impl FromStr for SpecIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SpecIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SpecIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
