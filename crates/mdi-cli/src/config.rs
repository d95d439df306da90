//! # CLI Configuration
//!
//! Optional YAML configuration file passed with `--config`:
//!
//! ```yaml
//! specs_root: ../specs
//! ```
//!
//! A relative `specs_root` is resolved against the directory containing the
//! configuration file. `--specs-root` on the command line takes precedence;
//! with neither, the specs bundled into the binary are used.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use mdi_schema::{BundledRegistry, DirectoryRegistry, SpecRegistry};

/// Contents of a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Directory laid out as `<name>/<version>.yaml`.
    #[serde(default)]
    pub specs_root: Option<PathBuf>,
}

impl CliConfig {
    /// Read and parse the configuration file at `path`.
    ///
    /// A relative `specs_root` is rewritten relative to `path`'s directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config: CliConfig = if text.trim().is_empty() {
            CliConfig::default()
        } else {
            serde_yaml::from_str(&text)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        };
        if let Some(root) = config.specs_root.take() {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            config.specs_root = Some(if root.is_absolute() {
                root
            } else {
                base.join(root)
            });
        }
        Ok(config)
    }
}

/// Where spec documents are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    /// Specs compiled into the binary.
    Bundled,
    /// A directory given on the command line or in the config file.
    Directory(PathBuf),
}

impl SpecSource {
    /// Pick the spec source: `--specs-root`, then the config file, then the
    /// bundle.
    pub fn resolve(specs_root: Option<&Path>, config: Option<&Path>) -> Result<Self> {
        if let Some(root) = specs_root {
            return Ok(Self::Directory(root.to_path_buf()));
        }
        if let Some(path) = config {
            if let Some(root) = CliConfig::load(path)?.specs_root {
                return Ok(Self::Directory(root));
            }
        }
        Ok(Self::Bundled)
    }

    /// The registry serving this source.
    pub fn registry(&self) -> Arc<dyn SpecRegistry> {
        match self {
            Self::Bundled => Arc::new(BundledRegistry),
            Self::Directory(root) => Arc::new(DirectoryRegistry::new(root)),
        }
    }
}
