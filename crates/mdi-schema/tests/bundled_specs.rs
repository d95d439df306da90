//! Integration test: every published spec document loads, accepts a dataset
//! synthesized from its own requirements, and rejects an empty dataset.
//!
//! Published documents are discovered by walking the crate's `specs/`
//! directory, so a document added there without a matching entry in
//! `BUNDLED_SPECS` fails `test_bundle_matches_specs_directory`.

use std::path::PathBuf;

use mdi_core::{Dataset, SpecIdentifier};
use mdi_schema::{
    check_dataset, load_spec, BundledRegistry, CheckError, DirectoryRegistry, SchemaDocument,
    SpecLoader, SpecRegistry, Violation,
};
use proptest::prelude::*;

fn specs_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("specs")
}

fn published_identifiers() -> Vec<SpecIdentifier> {
    DirectoryRegistry::new(specs_root())
        .identifiers()
        .expect("specs/ directory should be readable")
}

/// A dataset with exactly the variables, dimensions, and attributes the
/// document requires.
fn synthesize(schema: &SchemaDocument) -> Dataset {
    let mut ds = Dataset::new();
    for variable in schema.variables() {
        ds = ds.with_variable(variable.name.clone(), variable.dims.clone());
    }
    for attribute in schema.attributes() {
        ds = ds.with_attribute(attribute.clone(), "some_value");
    }
    ds
}

#[test]
fn test_at_least_one_spec_is_published() {
    assert!(
        !published_identifiers().is_empty(),
        "no spec documents found under {}",
        specs_root().display()
    );
}

#[test]
fn test_bundle_matches_specs_directory() {
    let bundled = BundledRegistry.identifiers().unwrap();
    assert_eq!(bundled, published_identifiers());
}

#[test]
fn test_bundled_and_directory_documents_agree() {
    let bundled = SpecLoader::new(BundledRegistry);
    let directory = SpecLoader::new(DirectoryRegistry::new(specs_root()));
    for id in published_identifiers() {
        let a = bundled.load_identifier(&id).unwrap();
        let b = directory.load_identifier(&id).unwrap();
        assert_eq!(*a, *b, "bundle and directory disagree for {id}");
    }
}

#[test]
fn test_every_spec_accepts_synthesized_dataset() {
    for id in published_identifiers() {
        let identifier = id.to_string();
        let schema = load_spec(&identifier).unwrap();
        let ds = synthesize(&schema);
        if let Err(e) = check_dataset(&ds, &identifier) {
            panic!("synthesized dataset for {identifier} failed: {e}");
        }
    }
}

#[test]
fn test_every_nonempty_spec_rejects_empty_dataset() {
    for id in published_identifiers() {
        let identifier = id.to_string();
        let schema = load_spec(&identifier).unwrap();
        if schema.is_empty() {
            continue;
        }
        let err = check_dataset(&Dataset::new(), &identifier).unwrap_err();
        assert!(
            matches!(
                err,
                CheckError::Violation(
                    Violation::MissingVariable { .. } | Violation::MissingAttribute { .. }
                )
            ),
            "unexpected error for {identifier}: {err}"
        );
    }
}

#[test]
fn test_malformed_identifier() {
    for identifier in ["no-colon-here", "a:b:c", ":v1", "name:", "../x:v1"] {
        let err = load_spec(identifier).unwrap_err();
        assert!(
            matches!(err, mdi_schema::SpecError::InvalidIdentifier(_)),
            "{identifier:?} gave {err}"
        );
    }
}

#[test]
fn test_unknown_identifier() {
    let err = load_spec("nonexistent:v0.0.0").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_first_failure_order_is_pinned() {
    // Missing `static` and missing attribute `dt`: the variable is reported.
    let schema = load_spec("neural_lam:v0.1.0").unwrap();
    let mut ds = synthesize(&schema);
    ds.variables.remove("static");
    ds.attributes.remove("dt");

    let err = check_dataset(&ds, "neural_lam:v0.1.0").unwrap_err();
    assert!(matches!(
        err,
        CheckError::Violation(Violation::MissingVariable { ref variable }) if variable == "static"
    ));

    let all = SpecLoader::new(BundledRegistry)
        .check_all(&ds, "neural_lam:v0.1.0")
        .unwrap_err();
    assert_eq!(all.violations().len(), 2);
    assert!(matches!(all.violations()[1], Violation::MissingAttribute { .. }));
}

proptest! {
    /// Extra variables, dimensions, and attributes never break conformance.
    #[test]
    fn extra_data_is_tolerated(
        extra_vars in prop::collection::btree_map("x_[a-z]{1,8}", prop::collection::vec("[a-z]{1,6}", 0..4), 0..5),
        extra_dims in prop::collection::vec("extra_[a-z]{1,6}", 0..3),
        extra_attrs in prop::collection::vec("attr_[a-z]{1,8}", 0..5),
    ) {
        for id in published_identifiers() {
            let identifier = id.to_string();
            let schema = load_spec(&identifier).unwrap();
            let mut ds = synthesize(&schema);
            for variable in ds.variables.values_mut() {
                variable.dims.extend(extra_dims.iter().cloned());
                variable.dims.reverse();
            }
            for (name, dims) in &extra_vars {
                ds = ds.with_variable(name.clone(), dims.clone());
            }
            for attr in &extra_attrs {
                ds = ds.with_attribute(attr.clone(), 0);
            }
            prop_assert!(check_dataset(&ds, &identifier).is_ok());
        }
    }
}
