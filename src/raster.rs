//! GDAL-backed reading and writing of raster windows.
//!
//! Every call opens its own dataset and drops it before returning, so no
//! handle outlives a single load or save.

use std::fmt;
use std::path::Path;

use gdal::raster::{Buffer, RasterBand};
use gdal::{Dataset, DriverManager};
use tracing::{debug, info, warn};

use crate::error::TileError;
use crate::geo::{self, GeoTransform};
use crate::kind::{Element, ElementKind};
use crate::Result;

/// A rectangular request against a raster, in cells.
///
/// A zero `width` or `height` means "up to the edge of the raster".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    pub x_offset: usize,
    pub y_offset: usize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    pub fn new(x_offset: usize, y_offset: usize, width: usize, height: usize) -> Self {
        Self {
            x_offset,
            y_offset,
            width,
            height,
        }
    }

    /// The whole raster.
    pub fn full() -> Self {
        Self::default()
    }

    /// Clips the window against a `total_width` x `total_height` raster.
    ///
    /// Overruns are silently trimmed. Returns `None` when the offset leaves
    /// nothing to read.
    pub fn resolve(&self, total_width: usize, total_height: usize) -> Option<Window> {
        if self.x_offset >= total_width || self.y_offset >= total_height {
            return None;
        }

        let max_width = total_width - self.x_offset;
        let max_height = total_height - self.y_offset;

        let width = match self.width {
            0 => max_width,
            w => w.min(max_width),
        };
        let height = match self.height {
            0 => max_height,
            h => h.min(max_height),
        };

        Some(Window::new(self.x_offset, self.y_offset, width, height))
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x_offset, self.y_offset
        )
    }
}

/// Everything about a raster except its pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterHeader {
    pub kind: ElementKind,
    pub width: usize,
    pub height: usize,
    pub no_data: Option<f64>,
    pub geotransform: GeoTransform,
    pub projection: String,
}

/// Result of [`load_window`]: the source header and the window actually read.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedWindow {
    pub header: RasterHeader,
    pub window: Window,
}

/// Shape and georeferencing of a raster about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterLayout<'a> {
    pub width: usize,
    pub height: usize,
    pub no_data: f64,
    pub geotransform: GeoTransform,
    pub projection: &'a str,
    /// Where this tile sits in the larger mosaic, in cells.
    pub placement: (usize, usize),
}

fn open(path: &Path) -> Result<Dataset> {
    Dataset::open(path).map_err(|source| TileError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn first_band<'a>(dataset: &'a Dataset, path: &Path) -> Result<RasterBand<'a>> {
    dataset.rasterband(1).map_err(|source| TileError::Metadata {
        path: path.to_path_buf(),
        what: "band 1",
        source,
    })
}

fn header_of(dataset: &Dataset, path: &Path) -> Result<RasterHeader> {
    let geotransform = dataset
        .geo_transform()
        .map_err(|source| TileError::Metadata {
            path: path.to_path_buf(),
            what: "geotransform",
            source,
        })?;
    let projection = dataset.projection();

    let band = first_band(dataset, path)?;
    let kind = ElementKind::from_gdal(band.band_type())?;
    let (width, height) = band.size();
    let no_data = band.no_data_value();

    Ok(RasterHeader {
        kind,
        width,
        height,
        no_data,
        geotransform,
        projection,
    })
}

/// Reads only the element type of band 1.
pub fn peek_kind(path: impl AsRef<Path>) -> Result<ElementKind> {
    let path = path.as_ref();
    let dataset = open(path)?;
    let band = first_band(&dataset, path)?;
    ElementKind::from_gdal(band.band_type())
}

/// Reads dimensions, no-data, geotransform and projection without any pixels.
pub fn read_header(path: impl AsRef<Path>) -> Result<RasterHeader> {
    let path = path.as_ref();
    let dataset = open(path)?;
    header_of(&dataset, path)
}

/// Decodes `window` of `path` into `data`, one row at a time.
///
/// `data` is resized to exactly the clipped window. GDAL converts the on-disk
/// band type to `T` while reading.
pub fn load_window<T: Element>(
    path: impl AsRef<Path>,
    window: Window,
    data: &mut Vec<T>,
) -> Result<LoadedWindow> {
    let path = path.as_ref();
    let dataset = open(path)?;
    let header = header_of(&dataset, path)?;

    let resolved = window
        .resolve(header.width, header.height)
        .ok_or_else(|| TileError::InvalidWindow {
            path: path.to_path_buf(),
            window,
            total_width: header.width,
            total_height: header.height,
        })?;

    if resolved != window && window.width != 0 && window.height != 0 {
        debug!("Clipped window {} to {} for {:?}", window, resolved, path);
    }
    if header.kind != T::KIND {
        debug!(
            "Reading {} band of {:?} as {}",
            header.kind,
            path,
            T::KIND
        );
    }

    debug!(
        "Allocating: {} rows by {} columns",
        resolved.height, resolved.width
    );
    data.clear();
    data.shrink_to_fit();
    data.resize(resolved.width * resolved.height, T::default());

    let band = first_band(&dataset, path)?;
    for (row, line) in data.chunks_exact_mut(resolved.width).enumerate() {
        let y = resolved.y_offset + row;
        band.read_into_slice::<T>(
            (resolved.x_offset as isize, y as isize),
            (resolved.width, 1),
            (resolved.width, 1),
            line,
            None,
        )
        .map_err(|source| TileError::Io {
            path: path.to_path_buf(),
            row: y,
            source,
        })?;
    }

    info!("Loaded window {} of {:?}", resolved, path);

    Ok(LoadedWindow {
        header,
        window: resolved,
    })
}

/// Creates a single-band GeoTIFF at `path` and writes `data` row by row.
///
/// The written geotransform is `layout.geotransform` shifted by
/// `layout.placement`, so independently written tiles line up in the mosaic.
pub fn save_window<T: Element>(
    path: impl AsRef<Path>,
    layout: &RasterLayout<'_>,
    data: &[T],
) -> Result<()> {
    let path = path.as_ref();
    if layout.width == 0 || layout.height == 0 || data.is_empty() {
        return Err(TileError::EmptyGrid);
    }
    debug_assert_eq!(data.len(), layout.width * layout.height);

    let driver = DriverManager::get_driver_by_name("GTiff").map_err(|source| TileError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut dataset = driver
        .create_with_band_type::<T, _>(path, layout.width, layout.height, 1)
        .map_err(|source| TileError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let (xoffset, yoffset) = layout.placement;
    let out_geotransform = geo::shifted(&layout.geotransform, xoffset, yoffset);
    debug!(
        "Filename: {:?} Xoffset: {} Yoffset: {} Geotrans0: {:.10} Geotrans3: {:.10}",
        path, xoffset, yoffset, out_geotransform[0], out_geotransform[3]
    );

    dataset
        .set_geo_transform(&out_geotransform)
        .map_err(|source| TileError::Metadata {
            path: path.to_path_buf(),
            what: "geotransform",
            source,
        })?;

    if layout.projection.is_empty() {
        warn!("Writing {:?} without a projection", path);
    } else {
        dataset
            .set_projection(layout.projection)
            .map_err(|source| TileError::Metadata {
                path: path.to_path_buf(),
                what: "projection",
                source,
            })?;
    }

    let mut band = first_band(&dataset, path)?;
    band.set_no_data_value(Some(layout.no_data))
        .map_err(|source| TileError::Metadata {
            path: path.to_path_buf(),
            what: "no-data value",
            source,
        })?;

    for (row, line) in data.chunks_exact(layout.width).enumerate() {
        let mut buffer = Buffer::new((layout.width, 1), line.to_vec());
        band.write((0, row as isize), (layout.width, 1), &mut buffer)
            .map_err(|source| TileError::Io {
                path: path.to_path_buf(),
                row,
                source,
            })?;
    }

    info!(
        "Written {} raster {:?} ({} x {})",
        T::KIND,
        path,
        layout.width,
        layout.height
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_window_covers_raster() {
        assert_eq!(
            Window::full().resolve(20, 10),
            Some(Window::new(0, 0, 20, 10))
        );
    }

    #[test]
    fn test_zero_size_means_rest_of_extent() {
        assert_eq!(
            Window::new(5, 3, 0, 0).resolve(20, 10),
            Some(Window::new(5, 3, 15, 7))
        );
        assert_eq!(
            Window::new(5, 3, 4, 0).resolve(20, 10),
            Some(Window::new(5, 3, 4, 7))
        );
    }

    #[test]
    fn test_overrun_is_clipped() {
        let clipped = Window::new(15, 8, 10, 10).resolve(20, 10).unwrap();
        assert_eq!(clipped.width, 20 - 15);
        assert_eq!(clipped.height, 10 - 8);
    }

    #[test]
    fn test_window_inside_extent_is_untouched() {
        let window = Window::new(5, 5, 10, 10);
        assert_eq!(window.resolve(20, 20), Some(window));
    }

    #[test]
    fn test_offset_outside_extent() {
        assert_eq!(Window::new(20, 0, 1, 1).resolve(20, 20), None);
        assert_eq!(Window::new(0, 25, 0, 0).resolve(20, 20), None);
    }

    #[test]
    fn test_window_display() {
        assert_eq!(Window::new(5, 6, 10, 11).to_string(), "10x11+5+6");
    }
}
