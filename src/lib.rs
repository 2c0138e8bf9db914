//! # tilegrid
//!
//! Windowed tiles of large georeferenced rasters.
//!
//! A [`Grid`] holds one rectangular window of a (possibly much larger) raster
//! in dense row-major storage, together with the raster's no-data value,
//! geotransform and projection. Grids are loaded from and written to GeoTIFF
//! through GDAL, and can be checkpointed to a compact native snapshot.
//!
//! ```no_run
//! use tilegrid::{Grid, Window};
//!
//! // Cut a 1024 x 1024 tile out of a continental DEM.
//! let tile = Grid::<f32>::from_raster("dem.tif", Window::new(4096, 2048, 1024, 1024))?;
//! println!("{} data cells", tile.num_data_cells());
//!
//! // Write it back as a standalone GeoTIFF that still lines up with the source.
//! tile.save_raster("tile_4096_2048.tif", tile.view_xoff(), tile.view_yoff())?;
//!
//! // Or checkpoint it without going through GDAL.
//! tile.save_snapshot("tile_4096_2048.bin")?;
//! # Ok::<(), tilegrid::TileError>(())
//! ```

pub mod error;
pub mod geo;
pub mod grid;
pub mod kind;
pub mod raster;
pub mod snapshot;

pub use error::TileError;
pub use geo::GeoTransform;
pub use grid::{Extent, Grid};
pub use kind::{Element, ElementKind};
pub use raster::{peek_kind, read_header, RasterHeader, Window};

/// Result type for tile operations.
pub type Result<T> = std::result::Result<T, TileError>;
