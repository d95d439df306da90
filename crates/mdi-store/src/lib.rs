//! # mdi-store: Zarr Store Metadata
//!
//! Opens a Zarr store on disk and exposes what the conformance checker
//! needs: the data variables with their dimension names, and the global
//! attributes. Only metadata documents are read.
//!
//! ## Crate Policy
//!
//! - Depends only on `mdi-core` internally.
//! - Read-only: nothing under the store root is ever written.
//! - Coordinates are not data variables; see [`ZarrStore::coordinate_names`].

pub mod error;
pub mod zarr;

pub use error::{StoreError, StoreResult};
pub use zarr::{
    open_dataset, ArrayMetadata, ZarrFormat, ZarrStore, ARRAY_DIMENSIONS_ATTR, COORDINATES_ATTR,
};
