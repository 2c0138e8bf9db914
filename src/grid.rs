use std::cell::Cell;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::path::Path;

use num_traits::AsPrimitive;
use rayon::prelude::*;
use tracing::warn;

use crate::error::TileError;
use crate::geo::{self, GeoTransform};
use crate::kind::Element;
use crate::raster::{self, RasterLayout, Window};
use crate::snapshot;
use crate::Result;

/// Dimensions of a grid's materialized view and of the raster it was cut from.
///
/// `view_xoff + view_width <= total_width` and likewise for heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    pub total_width: usize,
    pub total_height: usize,
    pub view_width: usize,
    pub view_height: usize,
    pub view_xoff: usize,
    pub view_yoff: usize,
}

impl Extent {
    /// A self-contained `width` x `height` grid that is not a window of anything.
    pub fn standalone(width: usize, height: usize) -> Self {
        Self {
            total_width: width,
            total_height: height,
            view_width: width,
            view_height: height,
            view_xoff: 0,
            view_yoff: 0,
        }
    }

    pub fn view_size(&self) -> usize {
        self.view_width * self.view_height
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.view_xoff
            .checked_add(self.view_width)
            .is_some_and(|right| right <= self.total_width)
            && self
                .view_yoff
                .checked_add(self.view_height)
                .is_some_and(|bottom| bottom <= self.total_height)
    }
}

/// A dense, row-major 2D tile of `T` with georeferencing and a no-data sentinel.
///
/// A grid is either standalone or a window (the *view*) of a larger raster
/// (the *total* extent). Storage always holds exactly `view_width *
/// view_height` cells.
///
/// Element access comes in two forms. [`get`](Self::get), [`set`](Self::set)
/// and their `_xy` variants check bounds and return errors. Indexing with
/// `grid[i]` or `grid[(x, y)]` is the fast path for inner loops; it panics on
/// an out-of-range linear index and only debug-asserts the x bound.
///
/// The count of data cells is cached and dropped by every mutating call, so
/// [`num_data_cells`](Self::num_data_cells) never reports a stale value.
#[derive(Clone)]
pub struct Grid<T: Element> {
    data: Vec<T>,
    extent: Extent,
    no_data: T,
    geotransform: GeoTransform,
    projection: String,
    data_cells: Cell<Option<usize>>,
}

impl<T: Element> Default for Grid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> Grid<T> {
    /// An empty grid without storage.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            extent: Extent::default(),
            no_data: T::DEFAULT_NO_DATA,
            geotransform: geo::IDENTITY,
            projection: String::new(),
            data_cells: Cell::new(None),
        }
    }

    /// A standalone `width` x `height` grid with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        let mut grid = Self::new();
        grid.resize(width, height, value);
        grid
    }

    /// A standalone grid filled with `T::default()`.
    pub fn with_size(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }

    /// Materializes `window` of the raster at `path`.
    pub fn from_raster(path: impl AsRef<Path>, window: Window) -> Result<Self> {
        let mut grid = Self::new();
        grid.load_raster(path, window)?;
        Ok(grid)
    }

    /// Restores a grid written by [`save_snapshot`](Self::save_snapshot).
    pub fn from_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        snapshot::load(path.as_ref())
    }

    pub(crate) fn from_parts(
        extent: Extent,
        no_data: T,
        geotransform: GeoTransform,
        projection: String,
        data: Vec<T>,
        data_cells: Option<usize>,
    ) -> Self {
        debug_assert_eq!(data.len(), extent.view_size());
        Self {
            data,
            extent,
            no_data,
            geotransform,
            projection,
            data_cells: Cell::new(data_cells),
        }
    }

    /// Replaces this grid with `window` of the raster at `path`.
    ///
    /// On error the grid is left untouched.
    pub fn load_raster(&mut self, path: impl AsRef<Path>, window: Window) -> Result<()> {
        let path = path.as_ref();
        let mut data = Vec::new();
        let loaded = raster::load_window::<T>(path, window, &mut data)?;
        let header = loaded.header;

        let no_data = match header.no_data {
            Some(value) => T::from_f64(value),
            None => {
                warn!(
                    "{:?} declares no no-data value, using {:?}",
                    path,
                    T::DEFAULT_NO_DATA
                );
                T::DEFAULT_NO_DATA
            }
        };

        *self = Self::from_parts(
            Extent {
                total_width: header.width,
                total_height: header.height,
                view_width: loaded.window.width,
                view_height: loaded.window.height,
                view_xoff: loaded.window.x_offset,
                view_yoff: loaded.window.y_offset,
            },
            no_data,
            header.geotransform,
            header.projection,
            data,
            None,
        );
        Ok(())
    }

    /// Converts a grid of another element kind cell by cell.
    ///
    /// Values and the no-data sentinel go through Rust's `as` rules: float to
    /// integer truncates toward zero and saturates at the target's range
    /// (NaN becomes 0), integer to float rounds to nearest, and widening is
    /// exact. Extents and georeferencing are copied. The data-cell count is
    /// not, since narrowing can merge values into the sentinel.
    pub fn convert_from<U>(other: &Grid<U>) -> Self
    where
        U: Element + AsPrimitive<T>,
    {
        Self::from_parts(
            other.extent,
            other.no_data.as_(),
            other.geotransform,
            other.projection.clone(),
            other.data.par_iter().map(|&value| value.as_()).collect(),
            None,
        )
    }

    /// In-place form of [`convert_from`](Self::convert_from).
    pub fn assign_from<U>(&mut self, other: &Grid<U>)
    where
        U: Element + AsPrimitive<T>,
    {
        *self = Self::convert_from(other);
    }

    /// Destructively resizes the grid. All data is lost.
    ///
    /// The grid becomes standalone: view and total extents are both
    /// `width` x `height` at offset (0, 0).
    pub fn resize(&mut self, width: usize, height: usize, value: T) {
        self.data = vec![value; width * height];
        self.extent = Extent::standalone(width, height);
        self.invalidate();
    }

    /// Resizes to the view shape of `other` and takes over its georeferencing.
    pub fn resize_like<U: Element>(&mut self, other: &Grid<U>, value: T) {
        self.resize(other.view_width(), other.view_height(), value);
        self.geotransform = other.geotransform;
        self.projection = other.projection.clone();
    }

    /// Releases storage. The grid is empty afterwards.
    pub fn clear(&mut self) {
        self.data = Vec::new();
        self.extent = Extent::default();
        self.invalidate();
    }

    fn invalidate(&self) {
        self.data_cells.set(None);
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn view_size(&self) -> usize {
        self.data.len()
    }

    pub fn total_width(&self) -> usize {
        self.extent.total_width
    }

    pub fn total_height(&self) -> usize {
        self.extent.total_height
    }

    pub fn view_width(&self) -> usize {
        self.extent.view_width
    }

    pub fn view_height(&self) -> usize {
        self.extent.view_height
    }

    pub fn view_xoff(&self) -> usize {
        self.extent.view_xoff
    }

    pub fn view_yoff(&self) -> usize {
        self.extent.view_yoff
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn no_data(&self) -> T {
        self.no_data
    }

    pub fn set_no_data(&mut self, no_data: T) {
        self.no_data = no_data;
        self.invalidate();
    }

    pub fn geotransform(&self) -> &GeoTransform {
        &self.geotransform
    }

    pub fn set_geotransform(&mut self, geotransform: GeoTransform) {
        self.geotransform = geotransform;
    }

    pub fn projection(&self) -> &str {
        &self.projection
    }

    pub fn set_projection(&mut self, projection: impl Into<String>) {
        self.projection = projection.into();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.invalidate();
        &mut self.data
    }

    /// Rows of the view, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.data.chunks_exact(self.extent.view_width.max(1))
    }

    pub fn xy_to_i(&self, x: usize, y: usize) -> usize {
        y * self.extent.view_width + x
    }

    pub fn i_to_xy(&self, i: usize) -> (usize, usize) {
        (i % self.extent.view_width, i / self.extent.view_width)
    }

    /// Whether the signed coordinate lies inside the view.
    pub fn in_grid(&self, x: isize, y: isize) -> bool {
        0 <= x
            && 0 <= y
            && (x as usize) < self.extent.view_width
            && (y as usize) < self.extent.view_height
    }

    /// Linear index of the cell offset by (`dx`, `dy`) from cell `i`, or
    /// `None` when that neighbour falls outside the view.
    pub fn n_to_i(&self, i: usize, dx: isize, dy: isize) -> Option<usize> {
        if i >= self.data.len() {
            return None;
        }
        let (x, y) = self.i_to_xy(i);
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        self.in_grid(nx, ny)
            .then(|| self.xy_to_i(nx as usize, ny as usize))
    }

    pub fn is_edge_cell(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.extent.view_width || y + 1 == self.extent.view_height
    }

    /// Panics if (`x`, `y`) is outside the view.
    pub fn is_no_data(&self, x: usize, y: usize) -> bool {
        self[(x, y)].same(self.no_data)
    }

    fn check_index(&self, index: usize) -> Result<usize> {
        if index < self.data.len() {
            Ok(index)
        } else {
            Err(TileError::IndexOutOfBounds {
                index,
                len: self.data.len(),
            })
        }
    }

    fn check_xy(&self, x: usize, y: usize) -> Result<usize> {
        if x < self.extent.view_width && y < self.extent.view_height {
            Ok(self.xy_to_i(x, y))
        } else {
            Err(TileError::CoordOutOfBounds {
                x,
                y,
                width: self.extent.view_width,
                height: self.extent.view_height,
            })
        }
    }

    pub fn get(&self, index: usize) -> Result<T> {
        self.check_index(index).map(|i| self.data[i])
    }

    pub fn get_xy(&self, x: usize, y: usize) -> Result<T> {
        self.check_xy(x, y).map(|i| self.data[i])
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        let i = self.check_index(index)?;
        self[i] = value;
        Ok(())
    }

    pub fn set_xy(&mut self, x: usize, y: usize, value: T) -> Result<()> {
        let i = self.check_xy(x, y)?;
        self[i] = value;
        Ok(())
    }

    pub fn set_all(&mut self, value: T) {
        self.data.fill(value);
        self.invalidate();
    }

    pub fn set_row(&mut self, y: usize, value: T) -> Result<()> {
        let start = self.check_xy(0, y)?;
        let width = self.extent.view_width;
        self.data[start..start + width].fill(value);
        self.invalidate();
        Ok(())
    }

    pub fn set_col(&mut self, x: usize, value: T) -> Result<()> {
        self.check_xy(x, 0)?;
        let width = self.extent.view_width;
        self.data
            .iter_mut()
            .skip(x)
            .step_by(width)
            .for_each(|cell| *cell = value);
        self.invalidate();
        Ok(())
    }

    /// Recounts the cells not equal to the no-data value and caches the result.
    pub fn count_data_cells(&self) -> usize {
        let no_data = self.no_data;
        let count = self
            .data
            .par_iter()
            .filter(|&&value| !value.same(no_data))
            .count();
        self.data_cells.set(Some(count));
        count
    }

    /// The cached data-cell count, computed on first use after any mutation.
    pub fn num_data_cells(&self) -> usize {
        match self.data_cells.get() {
            Some(count) => count,
            None => self.count_data_cells(),
        }
    }

    /// The cached count without computing it.
    pub fn cached_data_cells(&self) -> Option<usize> {
        self.data_cells.get()
    }

    /// Area of one cell from the geotransform, `GT[1] * GT[5]`.
    ///
    /// The sign follows the transform, so north-up rasters give a negative area.
    pub fn cell_area(&self) -> f64 {
        geo::cell_area(&self.geotransform)
    }

    /// Writes the view as a GeoTIFF placed at (`xoffset`, `yoffset`) cells of
    /// the mosaic described by this grid's geotransform.
    pub fn save_raster(&self, path: impl AsRef<Path>, xoffset: usize, yoffset: usize) -> Result<()> {
        if self.is_empty() {
            return Err(TileError::EmptyGrid);
        }
        let layout = RasterLayout {
            width: self.extent.view_width,
            height: self.extent.view_height,
            no_data: self.no_data.to_f64(),
            geotransform: self.geotransform,
            projection: &self.projection,
            placement: (xoffset, yoffset),
        };
        raster::save_window(path, &layout, &self.data)
    }

    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        snapshot::save(self, path.as_ref())
    }

    /// Replaces this grid with the snapshot at `path`.
    pub fn load_snapshot(&mut self, path: impl AsRef<Path>) -> Result<()> {
        *self = snapshot::load(path.as_ref())?;
        Ok(())
    }
}

impl<T: Element> PartialEq for Grid<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.extent.view_width != other.extent.view_width
            || self.extent.view_height != other.extent.view_height
        {
            return false;
        }
        self.no_data.same(other.no_data)
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(&a, &b)| a.same(b))
    }
}

impl<T: Element> fmt::Debug for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("kind", &T::KIND)
            .field("extent", &self.extent)
            .field("no_data", &self.no_data)
            .field("geotransform", &self.geotransform)
            .field("projection", &self.projection)
            .field("data_cells", &self.data_cells.get())
            .finish_non_exhaustive()
    }
}

impl<T: Element> Index<usize> for Grid<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T: Element> IndexMut<usize> for Grid<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        self.invalidate();
        &mut self.data[i]
    }
}

impl<T: Element> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (x, y): (usize, usize)) -> &T {
        debug_assert!(x < self.extent.view_width, "x {x} outside view");
        &self.data[self.xy_to_i(x, y)]
    }
}

impl<T: Element> IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        debug_assert!(x < self.extent.view_width, "x {x} outside view");
        let i = self.xy_to_i(x, y);
        self.invalidate();
        &mut self.data[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_resize<T: Element>(width: usize, height: usize, value: T) {
        let mut grid = Grid::<T>::new();
        grid.resize(width, height, value);

        assert_eq!(grid.view_width(), width);
        assert_eq!(grid.view_height(), height);
        assert_eq!(grid.total_width(), width);
        assert_eq!(grid.total_height(), height);
        assert_eq!(grid.view_size(), width * height);
        assert!(grid.as_slice().iter().all(|&cell| cell == value));

        let expected = if value == grid.no_data() { 0 } else { width * height };
        assert_eq!(grid.count_data_cells(), expected);
    }

    #[test]
    fn test_resize_every_kind() {
        for (w, h) in [(1, 1), (4, 3), (17, 5)] {
            check_resize::<u8>(w, h, 7);
            check_resize::<u8>(w, h, u8::DEFAULT_NO_DATA);
            check_resize::<u16>(w, h, 300);
            check_resize::<i16>(w, h, -12);
            check_resize::<i16>(w, h, i16::MIN);
            check_resize::<u32>(w, h, 70_000);
            check_resize::<i32>(w, h, -70_000);
            check_resize::<f32>(w, h, 1.5);
            check_resize::<f32>(w, h, -9999.0);
            check_resize::<f64>(w, h, 2.25);
        }
    }

    #[test]
    fn test_resize_resets_window() {
        let mut grid = Grid::<i32>::from_parts(
            Extent {
                total_width: 20,
                total_height: 20,
                view_width: 2,
                view_height: 2,
                view_xoff: 5,
                view_yoff: 6,
            },
            -1,
            geo::IDENTITY,
            String::new(),
            vec![1, 2, 3, 4],
            None,
        );
        grid.resize(3, 2, 0);
        assert_eq!(grid.extent(), Extent::standalone(3, 2));
    }

    #[test]
    fn test_scenario_float_tile() {
        let mut grid = Grid::<f32>::filled(4, 3, 1.5);
        grid.set_no_data(-9999.0);
        grid.set_xy(2, 1, -9999.0).unwrap();

        assert_eq!(grid.num_data_cells(), 11);
        assert!(grid.is_no_data(2, 1));
        assert!(!grid.is_no_data(0, 0));
    }

    #[test]
    fn test_cache_dropped_on_mutation() {
        let mut grid = Grid::<u8>::filled(3, 3, 1);
        grid.set_no_data(0);
        assert_eq!(grid.num_data_cells(), 9);

        grid[4] = 0;
        assert_eq!(grid.cached_data_cells(), None);
        assert_eq!(grid.num_data_cells(), 8);

        grid[(0, 0)] = 0;
        assert_eq!(grid.num_data_cells(), 7);

        grid.set_row(2, 0).unwrap();
        assert_eq!(grid.num_data_cells(), 4);

        grid.set_col(2, 0).unwrap();
        assert_eq!(grid.num_data_cells(), 2);

        grid.as_mut_slice()[1] = 0;
        assert_eq!(grid.num_data_cells(), 1);

        grid.set_all(5);
        assert_eq!(grid.num_data_cells(), 9);
    }

    #[test]
    fn test_n_to_i() {
        let grid = Grid::<u8>::with_size(4, 3);
        let center = grid.xy_to_i(1, 1);

        assert_eq!(grid.n_to_i(center, 1, 0), Some(grid.xy_to_i(2, 1)));
        assert_eq!(grid.n_to_i(center, -1, -1), Some(0));
        assert_eq!(grid.n_to_i(center, 1, 1), Some(grid.xy_to_i(2, 2)));

        assert_eq!(grid.n_to_i(0, -1, 0), None);
        assert_eq!(grid.n_to_i(0, 0, -1), None);
        let right = grid.xy_to_i(3, 0);
        assert_eq!(grid.n_to_i(right, 1, 0), None);
        let bottom = grid.xy_to_i(0, 2);
        assert_eq!(grid.n_to_i(bottom, 0, 1), None);
        assert_eq!(grid.n_to_i(bottom, 1, -1), Some(grid.xy_to_i(1, 1)));

        assert_eq!(grid.n_to_i(grid.view_size(), 0, 0), None);
    }

    #[test]
    fn test_n_to_i_matches_in_grid() {
        let grid = Grid::<i16>::with_size(5, 4);
        for i in 0..grid.view_size() {
            let (x, y) = grid.i_to_xy(i);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let (nx, ny) = (x as isize + dx, y as isize + dy);
                    match grid.n_to_i(i, dx, dy) {
                        Some(n) => {
                            assert!(grid.in_grid(nx, ny));
                            assert_eq!(grid.i_to_xy(n), (nx as usize, ny as usize));
                        }
                        None => assert!(!grid.in_grid(nx, ny)),
                    }
                }
            }
        }
    }

    #[test]
    fn test_edge_cells() {
        let grid = Grid::<u8>::with_size(4, 3);
        assert!(grid.is_edge_cell(0, 1));
        assert!(grid.is_edge_cell(3, 1));
        assert!(grid.is_edge_cell(1, 0));
        assert!(grid.is_edge_cell(1, 2));
        assert!(!grid.is_edge_cell(1, 1));
        assert!(!grid.is_edge_cell(2, 1));
    }

    #[test]
    fn test_row_and_column_fill() {
        let mut grid = Grid::<i32>::with_size(3, 2);
        grid.set_row(1, 4).unwrap();
        grid.set_col(0, 9).unwrap();
        assert_eq!(grid.as_slice(), &[9, 0, 0, 9, 4, 4]);

        assert!(grid.set_row(2, 1).is_err());
        assert!(grid.set_col(3, 1).is_err());
    }

    #[test]
    fn test_checked_access() {
        let mut grid = Grid::<u16>::with_size(2, 2);
        assert!(matches!(
            grid.get(4),
            Err(TileError::IndexOutOfBounds { index: 4, len: 4 })
        ));
        assert!(matches!(
            grid.set_xy(2, 0, 1),
            Err(TileError::CoordOutOfBounds { x: 2, y: 0, .. })
        ));
        grid.set(3, 8).unwrap();
        assert_eq!(grid.get_xy(1, 1).unwrap(), 8);
        assert_eq!(grid[(1, 1)], 8);
    }

    #[test]
    #[should_panic]
    fn test_index_past_end_panics() {
        let grid = Grid::<u8>::with_size(2, 2);
        let _ = grid[4];
    }

    #[test]
    fn test_equality() {
        let a = Grid::<f64>::filled(3, 2, 1.0);
        assert_eq!(a, a.clone());

        let mut b = a.clone();
        b[(2, 1)] = 2.0;
        assert_ne!(a, b);

        let mut c = a.clone();
        c.set_no_data(0.0);
        assert_ne!(a, c);

        // Same cells, transposed shape.
        let d = Grid::<f64>::filled(2, 3, 1.0);
        assert_ne!(a, d);
    }

    #[test]
    fn test_equality_ignores_window_and_georeferencing() {
        let a = Grid::<u8>::filled(2, 2, 1);
        let mut b = a.clone();
        b.set_geotransform([10.0, 2.0, 0.0, 5.0, 0.0, -2.0]);
        b.set_projection("EPSG:4326");
        assert_eq!(a, b);
    }

    #[test]
    fn test_resize_like_copies_georeferencing() {
        let mut source = Grid::<f32>::filled(5, 4, 0.0);
        source.set_geotransform([100.0, 30.0, 0.0, 200.0, 0.0, -30.0]);
        source.set_projection("LOCAL_CS[\"test\"]");

        let mut out = Grid::<u8>::new();
        out.resize_like(&source, 3);
        assert_eq!(out.view_width(), 5);
        assert_eq!(out.view_height(), 4);
        assert_eq!(out.geotransform(), source.geotransform());
        assert_eq!(out.projection(), source.projection());
        assert_eq!(out.cell_area(), -900.0);
    }

    #[test]
    fn test_convert_from_float_to_int() {
        let mut source = Grid::<f32>::filled(3, 1, 2.7);
        source.set_no_data(-9999.5);
        source[1] = -3.9;
        source[2] = 1.0e12;

        let converted = Grid::<i16>::convert_from(&source);
        assert_eq!(converted.as_slice(), &[2, -3, i16::MAX]);
        assert_eq!(converted.no_data(), -9999);
        assert_eq!(converted.extent(), source.extent());
    }

    #[test]
    fn test_assign_from_widening_is_exact() {
        let mut source = Grid::<u16>::filled(2, 2, 65_000);
        source.set_no_data(0);
        source[0] = 0;
        source.count_data_cells();

        let mut target = Grid::<f64>::new();
        target.assign_from(&source);
        assert_eq!(target.as_slice(), &[0.0, 65_000.0, 65_000.0, 65_000.0]);
        assert_eq!(target.no_data(), 0.0);
        assert_eq!(target.cached_data_cells(), None);
        assert_eq!(target.num_data_cells(), 3);
    }

    #[test]
    fn test_clear_releases_storage() {
        let mut grid = Grid::<f64>::filled(10, 10, 1.0);
        grid.clear();
        assert!(grid.is_empty());
        assert_eq!(grid.extent(), Extent::default());
        assert_eq!(grid.num_data_cells(), 0);
    }

    #[test]
    fn test_rows() {
        let mut grid = Grid::<u8>::with_size(3, 2);
        grid.set_row(1, 1).unwrap();
        let rows: Vec<&[u8]> = grid.rows().collect();
        assert_eq!(rows, vec![&[0u8, 0, 0][..], &[1u8, 1, 1][..]]);
        assert_eq!(Grid::<u8>::new().rows().count(), 0);
    }

    #[test]
    fn test_extent_consistency() {
        assert!(Extent::standalone(4, 4).is_consistent());
        let bad = Extent {
            total_width: 10,
            total_height: 10,
            view_width: 6,
            view_height: 2,
            view_xoff: 5,
            view_yoff: 0,
        };
        assert!(!bad.is_consistent());
    }

    #[test]
    fn test_nan_no_data() {
        let mut grid = Grid::<f32>::filled(2, 1, 1.0);
        grid.set_no_data(f32::NAN);
        grid.set(1, f32::NAN).unwrap();

        assert_eq!(grid, grid.clone());
        assert!(grid.is_no_data(1, 0));
        assert!(!grid.is_no_data(0, 0));
        assert_eq!(grid.count_data_cells(), 1);

        let mut other = grid.clone();
        other.set(1, 2.0).unwrap();
        assert_ne!(grid, other);
    }
}
