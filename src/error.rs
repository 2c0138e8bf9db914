//! Error types for tile loading, saving and element access.

use std::path::PathBuf;

use gdal::errors::GdalError;
use thiserror::Error;

use crate::kind::ElementKind;
use crate::raster::Window;

/// Errors that can occur while materializing, accessing or persisting a grid.
///
/// None of these are retried internally. A grid whose load or save failed is
/// in an unspecified state and should be discarded.
#[derive(Debug, Error)]
pub enum TileError {
    /// The raster could not be opened or created.
    #[error("could not open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: GdalError,
    },

    /// A header query (band, geotransform, no-data) failed.
    #[error("failed to read {what} of '{path}': {source}")]
    Metadata {
        path: PathBuf,
        what: &'static str,
        #[source]
        source: GdalError,
    },

    /// A single row transfer did not complete.
    #[error("row {row} transfer failed for '{path}': {source}")]
    Io {
        path: PathBuf,
        row: usize,
        #[source]
        source: GdalError,
    },

    /// Reading or writing a native snapshot failed at the file level.
    #[error("snapshot I/O error on '{path}': {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot preamble or header is malformed.
    #[error("invalid snapshot '{path}': {reason}")]
    InvalidSnapshot { path: PathBuf, reason: String },

    /// The snapshot was written for a different element kind.
    #[error("snapshot '{path}' holds {found} elements, expected {expected}")]
    SnapshotKindMismatch {
        path: PathBuf,
        expected: ElementKind,
        found: ElementKind,
    },

    /// Linear index outside the view.
    #[error("index {index} out of bounds for a view of {len} cells")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Coordinate outside the view.
    #[error("cell ({x}, {y}) out of bounds for a {width}x{height} view")]
    CoordOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// The requested window starts outside the raster.
    #[error("window {window} lies outside '{path}' ({total_width}x{total_height})")]
    InvalidWindow {
        path: PathBuf,
        window: Window,
        total_width: usize,
        total_height: usize,
    },

    /// Element type outside the supported closed set.
    #[error("unsupported element kind: {0}")]
    UnsupportedKind(String),

    /// Saving requires materialized storage.
    #[error("grid has no storage to save")]
    EmptyGrid,
}
