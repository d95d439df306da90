//! # Spec Registries
//!
//! A registry maps a [`SpecIdentifier`] to the raw text of its spec document.
//! Parsing is the loader's job, so any backend that can produce text can be
//! swapped in without touching the checker.
//!
//! Two backends ship with the crate:
//!
//! - [`BundledRegistry`]: documents compiled into the binary from this
//!   crate's `specs/` directory. The default.
//! - [`DirectoryRegistry`]: documents read at call time from
//!   `<root>/<name>/<version>.yaml`, with the root passed in at construction.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mdi_core::SpecIdentifier;

use crate::error::{SpecError, SpecResult};

/// File extension of spec documents.
pub const SPEC_FILE_EXTENSION: &str = "yaml";

/// Where a spec document came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecLocation {
    /// A file on disk.
    File(PathBuf),
    /// A document compiled into the binary, named by its path in the crate.
    Embedded(Cow<'static, str>),
}

impl fmt::Display for SpecLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Embedded(path) => write!(f, "bundled:{path}"),
        }
    }
}

/// A resolved, not yet parsed, spec document.
#[derive(Debug, Clone)]
pub struct ResolvedSpec {
    /// The identifier that was resolved.
    pub identifier: SpecIdentifier,
    /// Where the document was found.
    pub location: SpecLocation,
    /// The document text.
    pub contents: Cow<'static, str>,
}

/// Maps spec identifiers to spec document text.
pub trait SpecRegistry: Send + Sync {
    /// Resolve `identifier` to its document.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::NotFound`] when the registry has no document for
    /// the identifier, naming the location that was tried.
    fn resolve(&self, identifier: &SpecIdentifier) -> SpecResult<ResolvedSpec>;

    /// Every identifier this registry can resolve, sorted.
    fn identifiers(&self) -> SpecResult<Vec<SpecIdentifier>>;
}

impl<R: SpecRegistry + ?Sized> SpecRegistry for Box<R> {
    fn resolve(&self, identifier: &SpecIdentifier) -> SpecResult<ResolvedSpec> {
        (**self).resolve(identifier)
    }

    fn identifiers(&self) -> SpecResult<Vec<SpecIdentifier>> {
        (**self).identifiers()
    }
}

impl<R: SpecRegistry + ?Sized> SpecRegistry for Arc<R> {
    fn resolve(&self, identifier: &SpecIdentifier) -> SpecResult<ResolvedSpec> {
        (**self).resolve(identifier)
    }

    fn identifiers(&self) -> SpecResult<Vec<SpecIdentifier>> {
        (**self).identifiers()
    }
}

// ---------------------------------------------------------------------------
// Directory backend
// ---------------------------------------------------------------------------

/// Reads spec documents from `<root>/<name>/<version>.yaml`.
#[derive(Debug, Clone)]
pub struct DirectoryRegistry {
    root: PathBuf,
}

impl DirectoryRegistry {
    /// A registry rooted at `root`. The directory is not touched until the
    /// first lookup.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The resource root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a given identifier resolves to, whether or not it exists.
    pub fn path_for(&self, identifier: &SpecIdentifier) -> PathBuf {
        self.root
            .join(identifier.name())
            .join(format!("{}.{SPEC_FILE_EXTENSION}", identifier.version()))
    }
}

impl SpecRegistry for DirectoryRegistry {
    fn resolve(&self, identifier: &SpecIdentifier) -> SpecResult<ResolvedSpec> {
        let path = self.path_for(identifier);
        tracing::debug!(%identifier, path = %path.display(), "resolving spec from directory");
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(ResolvedSpec {
                identifier: identifier.clone(),
                location: SpecLocation::File(path),
                contents: Cow::Owned(contents),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SpecError::NotFound {
                identifier: identifier.clone(),
                location: SpecLocation::File(path),
            }),
            Err(e) => Err(SpecError::Io {
                location: path,
                source: e,
            }),
        }
    }

    fn identifiers(&self) -> SpecResult<Vec<SpecIdentifier>> {
        let io_err = |location: &Path| {
            let location = location.to_path_buf();
            move |source| SpecError::Io { location, source }
        };

        let mut identifiers = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(io_err(&self.root))? {
            let spec_dir = entry.map_err(io_err(&self.root))?.path();
            if !spec_dir.is_dir() {
                continue;
            }
            let Some(name) = spec_dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            for file in fs::read_dir(&spec_dir).map_err(io_err(&spec_dir))? {
                let path = file.map_err(io_err(&spec_dir))?.path();
                if path.extension().and_then(|e| e.to_str()) != Some(SPEC_FILE_EXTENSION) {
                    continue;
                }
                let Some(version) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                match SpecIdentifier::new(name, version) {
                    Ok(id) => identifiers.push(id),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping spec file with unusable name");
                    }
                }
            }
        }
        identifiers.sort();
        Ok(identifiers)
    }
}

// ---------------------------------------------------------------------------
// Bundled backend
// ---------------------------------------------------------------------------

/// A spec document compiled into the crate.
#[derive(Debug, Clone, Copy)]
pub struct BundledSpec {
    /// Spec name.
    pub name: &'static str,
    /// Spec version token.
    pub version: &'static str,
    /// Path of the document relative to the crate root.
    pub path: &'static str,
    /// Document text.
    pub contents: &'static str,
}

macro_rules! bundled_spec {
    ($name:literal, $version:literal) => {
        BundledSpec {
            name: $name,
            version: $version,
            path: concat!("specs/", $name, "/", $version, ".yaml"),
            contents: include_str!(concat!("../specs/", $name, "/", $version, ".yaml")),
        }
    };
}

/// Every spec document shipped with this crate.
pub const BUNDLED_SPECS: &[BundledSpec] = &[bundled_spec!("neural_lam", "v0.1.0")];

/// Resolves identifiers against [`BUNDLED_SPECS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledRegistry;

impl BundledRegistry {
    /// Path the directory layout would give `identifier` inside the bundle.
    fn expected_path(identifier: &SpecIdentifier) -> String {
        format!(
            "specs/{}/{}.{SPEC_FILE_EXTENSION}",
            identifier.name(),
            identifier.version()
        )
    }
}

impl SpecRegistry for BundledRegistry {
    fn resolve(&self, identifier: &SpecIdentifier) -> SpecResult<ResolvedSpec> {
        tracing::debug!(%identifier, "resolving bundled spec");
        BUNDLED_SPECS
            .iter()
            .find(|s| s.name == identifier.name() && s.version == identifier.version())
            .map(|s| ResolvedSpec {
                identifier: identifier.clone(),
                location: SpecLocation::Embedded(Cow::Borrowed(s.path)),
                contents: Cow::Borrowed(s.contents),
            })
            .ok_or_else(|| SpecError::NotFound {
                identifier: identifier.clone(),
                location: SpecLocation::Embedded(Cow::Owned(Self::expected_path(identifier))),
            })
    }

    fn identifiers(&self) -> SpecResult<Vec<SpecIdentifier>> {
        let mut identifiers = BUNDLED_SPECS
            .iter()
            .map(|s| SpecIdentifier::new(s.name, s.version))
            .collect::<Result<Vec<_>, _>>()?;
        identifiers.sort();
        Ok(identifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> SpecIdentifier {
        SpecIdentifier::parse(s).unwrap()
    }

    fn write_spec(root: &Path, name: &str, version: &str, body: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{version}.yaml")), body).unwrap();
    }

    #[test]
    fn directory_resolves_name_version_path() {
        let tmp = tempfile::tempdir().unwrap();
        write_spec(tmp.path(), "demo", "v1", "attributes: [dt]\n");
        let registry = DirectoryRegistry::new(tmp.path());

        let resolved = registry.resolve(&id("demo:v1")).unwrap();
        assert_eq!(resolved.contents, "attributes: [dt]\n");
        assert_eq!(
            resolved.location,
            SpecLocation::File(tmp.path().join("demo").join("v1.yaml"))
        );
    }

    #[test]
    fn directory_missing_file_is_not_found_with_location() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = DirectoryRegistry::new(tmp.path());
        let err = registry.resolve(&id("nonexistent:v0.0.0")).unwrap_err();
        assert!(err.is_not_found());
        let msg = err.to_string();
        assert!(msg.contains("nonexistent:v0.0.0"));
        assert!(msg.contains("v0.0.0.yaml"));
    }

    #[test]
    fn directory_identifiers_are_discovered_and_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        write_spec(tmp.path(), "zeta", "v1", "");
        write_spec(tmp.path(), "alpha", "v2.0.0", "");
        write_spec(tmp.path(), "alpha", "v1.0.0", "");
        fs::write(tmp.path().join("alpha").join("README.md"), "not a spec").unwrap();
        fs::write(tmp.path().join("stray.yaml"), "").unwrap();

        let ids = DirectoryRegistry::new(tmp.path()).identifiers().unwrap();
        let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["alpha:v1.0.0", "alpha:v2.0.0", "zeta:v1"]);
    }

    #[test]
    fn directory_identifiers_on_missing_root_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = DirectoryRegistry::new(tmp.path().join("absent"));
        assert!(matches!(
            registry.identifiers().unwrap_err(),
            SpecError::Io { .. }
        ));
    }

    #[test]
    fn bundled_resolves_known_spec() {
        let resolved = BundledRegistry.resolve(&id("neural_lam:v0.1.0")).unwrap();
        assert_eq!(
            resolved.location,
            SpecLocation::Embedded("specs/neural_lam/v0.1.0.yaml".into())
        );
        assert!(resolved.contents.contains("variables:"));
    }

    #[test]
    fn bundled_unknown_spec_is_not_found() {
        let err = BundledRegistry.resolve(&id("nonexistent:v0.0.0")).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("specs/nonexistent/v0.0.0.yaml"));
    }

    #[test]
    fn bundled_identifiers_match_table() {
        let ids = BundledRegistry.identifiers().unwrap();
        assert_eq!(ids.len(), BUNDLED_SPECS.len());
        assert!(ids.contains(&id("neural_lam:v0.1.0")));
    }

    #[test]
    fn boxed_and_shared_registries_forward() {
        let boxed: Box<dyn SpecRegistry> = Box::new(BundledRegistry);
        assert!(boxed.resolve(&id("neural_lam:v0.1.0")).is_ok());
        let shared: Arc<dyn SpecRegistry> = Arc::new(BundledRegistry);
        assert_eq!(shared.identifiers().unwrap(), boxed.identifiers().unwrap());
    }

    #[test]
    fn location_display() {
        assert_eq!(
            SpecLocation::Embedded("specs/a/v1.yaml".into()).to_string(),
            "bundled:specs/a/v1.yaml"
        );
        assert_eq!(
            SpecLocation::File(PathBuf::from("/x/a/v1.yaml")).to_string(),
            "/x/a/v1.yaml"
        );
    }
}
