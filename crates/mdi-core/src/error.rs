//! # Error Types
//!
//! Errors raised by the foundational types. Registry, parsing, and
//! conformance errors live in `mdi-schema`; this crate only rejects
//! identifiers that cannot name a spec document.

use thiserror::Error;

/// A spec identifier string could not be parsed into `name:version`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// No `:` separator was found.
    #[error("spec identifier {input:?} must be in the format {{spec_name}}:{{spec_version}}")]
    MissingSeparator {
        /// The rejected input.
        input: String,
    },

    /// More than one `:` separator was found.
    #[error("spec identifier {input:?} contains more than one ':' separator")]
    ExtraSeparator {
        /// The rejected input.
        input: String,
    },

    /// The name or version part is empty.
    #[error("spec identifier {input:?} has an empty {part}")]
    EmptyPart {
        /// The rejected input.
        input: String,
        /// Which part was empty (`"name"` or `"version"`).
        part: &'static str,
    },

    /// The name or version part cannot be used as a path segment.
    #[error("spec identifier {input:?} has an invalid {part} {value:?}: path separators and relative segments are not allowed")]
    UnsafePart {
        /// The rejected input.
        input: String,
        /// Which part was rejected (`"name"` or `"version"`).
        part: &'static str,
        /// The offending value.
        value: String,
    },
}

impl IdentifierError {
    /// The input string that was rejected.
    pub fn input(&self) -> &str {
        match self {
            Self::MissingSeparator { input }
            | Self::ExtraSeparator { input }
            | Self::EmptyPart { input, .. }
            | Self::UnsafePart { input, .. } => input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_separator_display_names_expected_format() {
        let err = IdentifierError::MissingSeparator {
            input: "no-colon-here".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("no-colon-here"));
        assert!(msg.contains("{spec_name}:{spec_version}"));
    }

    #[test]
    fn empty_part_display() {
        let err = IdentifierError::EmptyPart {
            input: ":v1".to_string(),
            part: "name",
        };
        assert!(err.to_string().contains("empty name"));
    }

    #[test]
    fn input_accessor_covers_all_variants() {
        let errs = [
            IdentifierError::MissingSeparator { input: "a".into() },
            IdentifierError::ExtraSeparator { input: "a".into() },
            IdentifierError::EmptyPart {
                input: "a".into(),
                part: "version",
            },
            IdentifierError::UnsafePart {
                input: "a".into(),
                part: "name",
                value: "..".into(),
            },
        ];
        for err in errs {
            assert_eq!(err.input(), "a");
        }
    }
}
