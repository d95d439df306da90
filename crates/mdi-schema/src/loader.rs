//! # Spec Loader
//!
//! Turns an identifier string into a parsed [`SchemaDocument`]: parse the
//! identifier, resolve it through a [`SpecRegistry`], parse the text.
//!
//! By default every call reads the document afresh. [`SpecLoader::cached`]
//! memoizes documents per identifier; published documents are immutable, so
//! two threads racing to fill the same entry store equal values.
//!
//! The cache lock is a `parking_lot::RwLock` and is never held while the
//! registry is read or a document is parsed.

use std::collections::HashMap;
use std::sync::Arc;

use mdi_core::{DatasetLike, SpecIdentifier};
use parking_lot::RwLock;

use crate::check::{check_schema, check_schema_all};
use crate::document::SchemaDocument;
use crate::error::{CheckError, SpecError, SpecResult};
use crate::registry::{BundledRegistry, SpecRegistry};

type DocumentCache = RwLock<HashMap<SpecIdentifier, Arc<SchemaDocument>>>;

/// Loads spec documents from a registry.
#[derive(Debug)]
pub struct SpecLoader<R = BundledRegistry> {
    registry: R,
    cache: Option<DocumentCache>,
}

impl Default for SpecLoader<BundledRegistry> {
    fn default() -> Self {
        Self::new(BundledRegistry)
    }
}

impl<R: SpecRegistry> SpecLoader<R> {
    /// A loader that reads every document afresh.
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            cache: None,
        }
    }

    /// A loader that memoizes documents per identifier.
    pub fn cached(registry: R) -> Self {
        Self {
            registry,
            cache: Some(RwLock::new(HashMap::new())),
        }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Whether this loader memoizes documents.
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Number of memoized documents (always 0 for an uncached loader).
    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.read().len())
    }

    /// Load the document named by `identifier` (`name:version`).
    ///
    /// # Errors
    ///
    /// - [`SpecError::InvalidIdentifier`] if `identifier` is malformed.
    /// - [`SpecError::NotFound`] if the registry has no such document.
    /// - [`SpecError::Parse`] if the document is not a well-formed spec.
    pub fn load(&self, identifier: &str) -> SpecResult<Arc<SchemaDocument>> {
        let identifier = SpecIdentifier::parse(identifier)?;
        self.load_identifier(&identifier)
    }

    /// Load the document named by an already-parsed identifier.
    pub fn load_identifier(&self, identifier: &SpecIdentifier) -> SpecResult<Arc<SchemaDocument>> {
        if let Some(cache) = &self.cache {
            if let Some(doc) = cache.read().get(identifier) {
                tracing::debug!(%identifier, "spec cache hit");
                return Ok(Arc::clone(doc));
            }
        }

        let resolved = self.registry.resolve(identifier)?;
        let document = SchemaDocument::from_yaml_str(&resolved.contents).map_err(|source| {
            SpecError::Parse {
                identifier: identifier.clone(),
                location: resolved.location.clone(),
                source,
            }
        })?;
        tracing::debug!(
            %identifier,
            location = %resolved.location,
            variables = document.variables().len(),
            attributes = document.attributes().len(),
            "loaded spec"
        );
        let document = Arc::new(document);

        if let Some(cache) = &self.cache {
            cache
                .write()
                .entry(identifier.clone())
                .or_insert_with(|| Arc::clone(&document));
        }
        Ok(document)
    }

    /// Every identifier the registry can resolve, sorted.
    pub fn identifiers(&self) -> SpecResult<Vec<SpecIdentifier>> {
        self.registry.identifiers()
    }

    /// Fail-fast conformance check of `dataset` against `identifier`.
    ///
    /// # Errors
    ///
    /// [`CheckError::Spec`] if the spec cannot be loaded, otherwise
    /// [`CheckError::Violation`] carrying the first violation in schema order.
    pub fn check<D>(&self, dataset: &D, identifier: &str) -> Result<(), CheckError>
    where
        D: DatasetLike + ?Sized,
    {
        let schema = self.load(identifier)?;
        check_schema(&schema, dataset)?;
        tracing::debug!(identifier, "dataset conforms to spec");
        Ok(())
    }

    /// Collect-all conformance check of `dataset` against `identifier`.
    ///
    /// # Errors
    ///
    /// [`CheckError::Spec`] if the spec cannot be loaded, otherwise
    /// [`CheckError::Violations`] carrying every violation in schema order.
    pub fn check_all<D>(&self, dataset: &D, identifier: &str) -> Result<(), CheckError>
    where
        D: DatasetLike + ?Sized,
    {
        let schema = self.load(identifier)?;
        check_schema_all(&schema, dataset).map_err(CheckError::Violations)
    }
}

/// Load a bundled spec document by identifier (`name:version`).
///
/// # Errors
///
/// See [`SpecLoader::load`].
pub fn load_spec(identifier: &str) -> SpecResult<Arc<SchemaDocument>> {
    SpecLoader::new(BundledRegistry).load(identifier)
}

/// Check that `dataset` contains the variables, dimensions, and attributes
/// required by the bundled spec `identifier`. Stops at the first violation.
///
/// # Errors
///
/// See [`SpecLoader::check`].
pub fn check_dataset<D>(dataset: &D, identifier: &str) -> Result<(), CheckError>
where
    D: DatasetLike + ?Sized,
{
    SpecLoader::new(BundledRegistry).check(dataset, identifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Violation;
    use crate::registry::DirectoryRegistry;
    use mdi_core::Dataset;
    use std::fs;

    fn registry_with(spec: &str) -> (tempfile::TempDir, DirectoryRegistry) {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("demo")).unwrap();
        fs::write(tmp.path().join("demo").join("v1.yaml"), spec).unwrap();
        let registry = DirectoryRegistry::new(tmp.path());
        (tmp, registry)
    }

    #[test]
    fn load_rejects_malformed_identifier() {
        let err = load_spec("no-colon-here").unwrap_err();
        assert!(matches!(err, SpecError::InvalidIdentifier(_)));
    }

    #[test]
    fn load_unknown_identifier_is_not_found() {
        let err = load_spec("nonexistent:v0.0.0").unwrap_err();
        assert!(err.is_not_found(), "got {err}");
    }

    #[test]
    fn load_bundled_spec() {
        let doc = load_spec("neural_lam:v0.1.0").unwrap();
        assert!(doc.variable("state").is_some());
    }

    #[test]
    fn uncached_loader_rereads_documents() {
        let (tmp, registry) = registry_with("attributes: [dt]\n");
        let loader = SpecLoader::new(registry);
        assert_eq!(loader.load("demo:v1").unwrap().attributes(), ["dt"]);

        fs::write(tmp.path().join("demo").join("v1.yaml"), "attributes: [x]\n").unwrap();
        assert_eq!(loader.load("demo:v1").unwrap().attributes(), ["x"]);
        assert_eq!(loader.cached_len(), 0);
        assert!(!loader.is_cached());
    }

    #[test]
    fn cached_loader_returns_same_document() {
        let (tmp, registry) = registry_with("attributes: [dt]\n");
        let loader = SpecLoader::cached(registry);
        let first = loader.load("demo:v1").unwrap();

        fs::write(tmp.path().join("demo").join("v1.yaml"), "attributes: [x]\n").unwrap();
        let second = loader.load("demo:v1").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.cached_len(), 1);
    }

    #[test]
    fn cached_loader_does_not_cache_failures() {
        let (tmp, registry) = registry_with("variables: [broken\n");
        let loader = SpecLoader::cached(registry);
        assert!(loader.load("demo:v1").unwrap_err().is_parse_error());
        assert_eq!(loader.cached_len(), 0);

        fs::write(tmp.path().join("demo").join("v1.yaml"), "attributes: [dt]\n").unwrap();
        assert!(loader.load("demo:v1").is_ok());
    }

    #[test]
    fn parse_error_names_identifier_and_location() {
        let (_tmp, registry) = registry_with("variables:\n  state:\n    dims: 3\n");
        let err = SpecLoader::new(registry).load("demo:v1").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("demo:v1"));
        assert!(msg.contains("v1.yaml"));
    }

    #[test]
    fn check_propagates_loader_errors_unchanged() {
        let err = check_dataset(&Dataset::new(), "nonexistent:v0.0.0").unwrap_err();
        assert!(matches!(err, CheckError::Spec(SpecError::NotFound { .. })));
    }

    #[test]
    fn check_and_check_all_against_directory_spec() {
        let (_tmp, registry) = registry_with(
            "variables:\n  state:\n    dims: [time]\nattributes: [dt, projection]\n",
        );
        let loader = SpecLoader::new(registry);

        let err = loader.check(&Dataset::new(), "demo:v1").unwrap_err();
        assert!(matches!(
            err,
            CheckError::Violation(Violation::MissingVariable { .. })
        ));

        let err = loader.check_all(&Dataset::new(), "demo:v1").unwrap_err();
        assert_eq!(err.violations().len(), 3);

        let ds = Dataset::new()
            .with_variable("state", ["time"])
            .with_attribute("dt", 1)
            .with_attribute("projection", "lcc");
        loader.check(&ds, "demo:v1").unwrap();
        loader.check_all(&ds, "demo:v1").unwrap();
    }

    #[test]
    fn loader_is_shareable_across_threads() {
        let loader = Arc::new(SpecLoader::cached(BundledRegistry));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let loader = Arc::clone(&loader);
                std::thread::spawn(move || loader.load("neural_lam:v0.1.0").map(|d| d.variables().len()))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().unwrap() > 0);
        }
        assert_eq!(loader.cached_len(), 1);
    }
}
