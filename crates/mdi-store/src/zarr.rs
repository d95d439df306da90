//! # Zarr Metadata Reader
//!
//! Reads the metadata documents of a Zarr v2 or v3 store on the local
//! filesystem. Chunk data is never opened.
//!
//! Zarr v2 stores are read from consolidated metadata (`.zmetadata`) when
//! present, otherwise from `.zgroup`, `.zattrs`, and each top-level
//! `<name>/.zarray` + `<name>/.zattrs`. Dimension names come from the
//! `_ARRAY_DIMENSIONS` attribute.
//!
//! Zarr v3 stores are read from the root `zarr.json`, using inline
//! `consolidated_metadata` when present, otherwise each top-level
//! `<name>/zarr.json`. Dimension names come from `dimension_names`, falling
//! back to `_ARRAY_DIMENSIONS`.
//!
//! [`ZarrStore::to_dataset`] then separates data variables from coordinates
//! the way xarray's CF decoding does: a one-dimensional array named after its
//! own dimension is a dimension coordinate, and any array listed in a
//! `coordinates` attribute is a non-dimension coordinate.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use mdi_core::{Dataset, Variable};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

/// v2 attribute holding an array's dimension names (xarray convention).
pub const ARRAY_DIMENSIONS_ATTR: &str = "_ARRAY_DIMENSIONS";

/// CF attribute naming non-dimension coordinates.
pub const COORDINATES_ATTR: &str = "coordinates";

const V2_GROUP: &str = ".zgroup";
const V2_ARRAY: &str = ".zarray";
const V2_ATTRS: &str = ".zattrs";
const V2_CONSOLIDATED: &str = ".zmetadata";
const V3_NODE: &str = "zarr.json";

/// On-disk Zarr format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZarrFormat {
    V2,
    V3,
}

impl fmt::Display for ZarrFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V2 => f.write_str("zarr v2"),
            Self::V3 => f.write_str("zarr v3"),
        }
    }
}

/// Metadata of one top-level array.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayMetadata {
    /// Dimension names in array order.
    pub dims: Vec<String>,
    /// Array attributes, without `_ARRAY_DIMENSIONS`.
    pub attributes: BTreeMap<String, Value>,
}

/// The metadata of an opened store.
#[derive(Debug, Clone)]
pub struct ZarrStore {
    root: PathBuf,
    format: ZarrFormat,
    consolidated: bool,
    attributes: BTreeMap<String, Value>,
    arrays: BTreeMap<String, ArrayMetadata>,
}

impl ZarrStore {
    /// Open the store rooted at `path` and read its metadata.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotAStore`] if `path` has no group metadata.
    /// - [`StoreError::Io`] / [`StoreError::InvalidMetadata`] if a metadata
    ///   file cannot be read or parsed.
    /// - [`StoreError::MissingDimensionNames`] if an array has no dimension
    ///   names.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let root = path.as_ref().to_path_buf();
        let store = if root.join(V3_NODE).is_file() {
            read_v3(root)?
        } else if root.join(V2_CONSOLIDATED).is_file() || root.join(V2_GROUP).is_file() {
            read_v2(root)?
        } else {
            return Err(StoreError::NotAStore { path: root });
        };
        tracing::debug!(
            path = %store.root.display(),
            format = %store.format,
            consolidated = store.consolidated,
            arrays = store.arrays.len(),
            attributes = store.attributes.len(),
            "opened zarr store"
        );
        Ok(store)
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> ZarrFormat {
        self.format
    }

    /// Whether metadata was read from a consolidated document.
    pub fn is_consolidated(&self) -> bool {
        self.consolidated
    }

    /// Global (root group) attributes.
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Every top-level array, coordinates included.
    pub fn arrays(&self) -> &BTreeMap<String, ArrayMetadata> {
        &self.arrays
    }

    /// Names of the arrays xarray would decode as coordinates.
    pub fn coordinate_names(&self) -> BTreeSet<String> {
        let mut coords = BTreeSet::new();
        for (name, array) in &self.arrays {
            if array.dims.len() == 1 && array.dims[0] == *name {
                coords.insert(name.clone());
            }
        }
        let listed = self
            .arrays
            .values()
            .map(|a| &a.attributes)
            .chain(std::iter::once(&self.attributes))
            .filter_map(|attrs| attrs.get(COORDINATES_ATTR))
            .filter_map(Value::as_str);
        for names in listed {
            coords.extend(
                names
                    .split_whitespace()
                    .filter(|n| self.arrays.contains_key(*n))
                    .map(str::to_string),
            );
        }
        coords
    }

    /// The dataset view: data variables and global attributes.
    ///
    /// Coordinates are excluded from the variables, and the `coordinates`
    /// attribute is consumed from both global and variable attributes.
    pub fn to_dataset(&self) -> Dataset {
        let coords = self.coordinate_names();
        let mut dataset = Dataset::new();
        for (name, array) in &self.arrays {
            if coords.contains(name) {
                continue;
            }
            let mut attributes = array.attributes.clone();
            attributes.remove(COORDINATES_ATTR);
            dataset.insert_variable(
                name.clone(),
                Variable {
                    dims: array.dims.clone(),
                    attributes,
                },
            );
        }
        dataset.attributes = self.attributes.clone();
        dataset.attributes.remove(COORDINATES_ATTR);
        dataset
    }
}

/// Open the store at `path` and return its dataset view.
///
/// # Errors
///
/// See [`ZarrStore::open`].
pub fn open_dataset(path: impl AsRef<Path>) -> StoreResult<Dataset> {
    ZarrStore::open(path).map(|store| store.to_dataset())
}

// ── Zarr v2 ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ConsolidatedV2 {
    metadata: Map<String, Value>,
}

fn read_v2(root: PathBuf) -> StoreResult<ZarrStore> {
    let consolidated_path = root.join(V2_CONSOLIDATED);
    if consolidated_path.is_file() {
        let consolidated: ConsolidatedV2 = read_json(&consolidated_path)?;
        return v2_from_consolidated(root, &consolidated_path, consolidated.metadata);
    }

    let attributes = read_optional_attrs(&root.join(V2_ATTRS))?
        .into_iter()
        .collect();
    let mut arrays = BTreeMap::new();
    for (name, dir) in child_dirs(&root)? {
        if !dir.join(V2_ARRAY).is_file() {
            continue;
        }
        let _: Map<String, Value> = read_json(&dir.join(V2_ARRAY))?;
        let attrs = read_optional_attrs(&dir.join(V2_ATTRS))?;
        let array = array_from_attrs(&name, None, attrs)?;
        arrays.insert(name, array);
    }

    Ok(ZarrStore {
        root,
        format: ZarrFormat::V2,
        consolidated: false,
        attributes,
        arrays,
    })
}

fn v2_from_consolidated(
    root: PathBuf,
    source: &Path,
    metadata: Map<String, Value>,
) -> StoreResult<ZarrStore> {
    let mut attributes = BTreeMap::new();
    let mut array_names = BTreeSet::new();
    let mut array_attrs: BTreeMap<String, Map<String, Value>> = BTreeMap::new();

    for (key, value) in metadata {
        if key == V2_ATTRS {
            attributes = into_object(source, value)?.into_iter().collect();
            continue;
        }
        let Some((name, file)) = key.split_once('/') else {
            continue;
        };
        if name.is_empty() || file.contains('/') {
            continue;
        }
        match file {
            V2_ARRAY => {
                array_names.insert(name.to_string());
            }
            V2_ATTRS => {
                array_attrs.insert(name.to_string(), into_object(source, value)?);
            }
            _ => {}
        }
    }

    let mut arrays = BTreeMap::new();
    for name in array_names {
        let attrs = array_attrs.remove(&name).unwrap_or_default();
        let array = array_from_attrs(&name, None, attrs)?;
        arrays.insert(name, array);
    }

    Ok(ZarrStore {
        root,
        format: ZarrFormat::V2,
        consolidated: true,
        attributes,
        arrays,
    })
}

// ── Zarr v3 ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeV3 {
    node_type: String,
    #[serde(default)]
    attributes: Map<String, Value>,
    #[serde(default)]
    dimension_names: Option<Vec<Option<String>>>,
    #[serde(default)]
    consolidated_metadata: Option<ConsolidatedV3>,
}

#[derive(Deserialize)]
struct ConsolidatedV3 {
    #[serde(default)]
    metadata: BTreeMap<String, NodeV3>,
}

fn read_v3(root: PathBuf) -> StoreResult<ZarrStore> {
    let root_path = root.join(V3_NODE);
    let group: NodeV3 = read_json(&root_path)?;
    if group.node_type != "group" {
        return Err(StoreError::NotAStore { path: root });
    }

    let mut arrays = BTreeMap::new();
    let consolidated = group.consolidated_metadata.is_some();
    match group.consolidated_metadata {
        Some(consolidated) => {
            for (name, node) in consolidated.metadata {
                if name.contains('/') || node.node_type != "array" {
                    continue;
                }
                let array = array_from_attrs(&name, node.dimension_names, node.attributes)?;
                arrays.insert(name, array);
            }
        }
        None => {
            for (name, dir) in child_dirs(&root)? {
                let node_path = dir.join(V3_NODE);
                if !node_path.is_file() {
                    continue;
                }
                let node: NodeV3 = read_json(&node_path)?;
                if node.node_type != "array" {
                    continue;
                }
                let array = array_from_attrs(&name, node.dimension_names, node.attributes)?;
                arrays.insert(name, array);
            }
        }
    }

    Ok(ZarrStore {
        root,
        format: ZarrFormat::V3,
        consolidated,
        attributes: group.attributes.into_iter().collect(),
        arrays,
    })
}

// ── Shared helpers ───────────────────────────────────────────────────

/// Build an array's metadata from its explicit dimension names (v3) or its
/// `_ARRAY_DIMENSIONS` attribute.
fn array_from_attrs(
    name: &str,
    dimension_names: Option<Vec<Option<String>>>,
    mut attrs: Map<String, Value>,
) -> StoreResult<ArrayMetadata> {
    let from_attrs = attrs.remove(ARRAY_DIMENSIONS_ATTR);
    let dims = match (dimension_names, from_attrs) {
        (Some(names), _) => names
            .into_iter()
            .enumerate()
            .map(|(i, n)| {
                n.ok_or_else(|| StoreError::InvalidDimensionNames {
                    array: name.to_string(),
                    reason: format!("dimension {i} is unnamed"),
                })
            })
            .collect::<StoreResult<Vec<_>>>()?,
        (None, Some(value)) => {
            serde_json::from_value::<Vec<String>>(value).map_err(|e| {
                StoreError::InvalidDimensionNames {
                    array: name.to_string(),
                    reason: format!("{ARRAY_DIMENSIONS_ATTR} is not a list of strings: {e}"),
                }
            })?
        }
        (None, None) => {
            return Err(StoreError::MissingDimensionNames {
                array: name.to_string(),
            })
        }
    };
    Ok(ArrayMetadata {
        dims,
        attributes: attrs.into_iter().collect(),
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| StoreError::InvalidMetadata {
        path: path.to_path_buf(),
        source,
    })
}

fn read_optional_attrs(path: &Path) -> StoreResult<Map<String, Value>> {
    if path.is_file() {
        read_json(path)
    } else {
        Ok(Map::new())
    }
}

fn into_object(source: &Path, value: Value) -> StoreResult<Map<String, Value>> {
    serde_json::from_value(value).map_err(|source_err| StoreError::InvalidMetadata {
        path: source.to_path_buf(),
        source: source_err,
    })
}

/// Immediate subdirectories of `root` whose names are valid UTF-8.
fn child_dirs(root: &Path) -> StoreResult<Vec<(String, PathBuf)>> {
    let io_err = |source| StoreError::Io {
        path: root.to_path_buf(),
        source,
    };
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => dirs.push((name, path)),
            Err(raw) => tracing::warn!(name = ?raw, "skipping non-UTF-8 store entry"),
        }
    }
    Ok(dirs)
}
