//! Native binary snapshots of a single grid.
//!
//! Layout, all integers and elements little-endian, no padding:
//!
//! ```text
//! "TGRD" | u16 version | u8 kind tag | u8 b'L'
//! i32 total_height | i32 total_width
//! i32 view_height  | i32 view_width
//! i32 view_xoff    | i32 view_yoff
//! i32 data cell count (-1 when unknown)
//! T   no_data
//! 6 x f64 geotransform
//! u32 projection length | projection bytes (UTF-8)
//! view_height * view_width x T, row-major
//! ```

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::TileError;
use crate::geo::GeoTransform;
use crate::grid::{Extent, Grid};
use crate::kind::{Element, ElementKind};
use crate::Result;

pub const MAGIC: [u8; 4] = *b"TGRD";
pub const VERSION: u16 = 1;
const LITTLE_ENDIAN: u8 = b'L';
const MAX_PROJECTION_LEN: usize = 1 << 20;

fn io_error(path: &Path) -> impl Fn(io::Error) -> TileError + '_ {
    move |source| TileError::Snapshot {
        path: path.to_path_buf(),
        source,
    }
}

fn invalid(path: &Path, reason: impl Into<String>) -> TileError {
    TileError::InvalidSnapshot {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn reverse_endianness(bytes: &mut [u8], size: usize) {
    if size > 1 {
        bytes.chunks_exact_mut(size).for_each(<[u8]>::reverse);
    }
}

fn write_elements<T: Element, W: Write>(writer: &mut W, values: &[T]) -> io::Result<()> {
    let bytes: &[u8] = bytemuck::cast_slice(values);
    if cfg!(target_endian = "little") {
        writer.write_all(bytes)
    } else {
        let mut swapped = bytes.to_vec();
        reverse_endianness(&mut swapped, T::KIND.size_in_bytes());
        writer.write_all(&swapped)
    }
}

fn read_elements<T: Element, R: Read>(reader: &mut R, values: &mut [T]) -> io::Result<()> {
    let bytes: &mut [u8] = bytemuck::cast_slice_mut(values);
    reader.read_exact(bytes)?;
    if cfg!(target_endian = "big") {
        reverse_endianness(bytes, T::KIND.size_in_bytes());
    }
    Ok(())
}

fn read_bytes<const N: usize, R: Read>(reader: &mut R) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_i32<R: Read>(reader: &mut R) -> io::Result<i32> {
    read_bytes(reader).map(i32::from_le_bytes)
}

fn dimension(path: &Path, name: &str, value: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| invalid(path, format!("{name} {value} exceeds i32")))
}

fn read_dimension<R: Read>(reader: &mut R, path: &Path, name: &str) -> Result<usize> {
    let value = read_i32(reader).map_err(io_error(path))?;
    usize::try_from(value).map_err(|_| invalid(path, format!("negative {name} {value}")))
}

/// Reads the preamble and returns the element kind stored in the snapshot.
pub fn peek_kind(path: impl AsRef<Path>) -> Result<ElementKind> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path).map_err(io_error(path))?);
    read_preamble(&mut reader, path)
}

fn read_preamble<R: Read>(reader: &mut R, path: &Path) -> Result<ElementKind> {
    let [m0, m1, m2, m3, v0, v1, tag, endian] = read_bytes::<8, _>(reader).map_err(io_error(path))?;

    if [m0, m1, m2, m3] != MAGIC {
        return Err(invalid(path, "missing TGRD magic"));
    }
    let version = u16::from_le_bytes([v0, v1]);
    if version != VERSION {
        return Err(invalid(path, format!("unsupported version {version}")));
    }
    if endian != LITTLE_ENDIAN {
        return Err(invalid(path, format!("unknown byte order marker {endian:#04x}")));
    }
    ElementKind::from_tag(tag)
}

fn encode<T: Element, W: Write>(grid: &Grid<T>, writer: &mut W, path: &Path) -> Result<()> {
    let extent = grid.extent();
    let data_cells = match grid.cached_data_cells() {
        Some(count) => dimension(path, "data cell count", count)?,
        None => -1,
    };
    let header = [
        dimension(path, "total height", extent.total_height)?,
        dimension(path, "total width", extent.total_width)?,
        dimension(path, "view height", extent.view_height)?,
        dimension(path, "view width", extent.view_width)?,
        dimension(path, "view x offset", extent.view_xoff)?,
        dimension(path, "view y offset", extent.view_yoff)?,
        data_cells,
    ];
    let projection = grid.projection().as_bytes();
    let projection_len = u32::try_from(projection.len())
        .map_err(|_| invalid(path, "projection string too long"))?;

    let write = |writer: &mut W| -> io::Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&[T::KIND.tag(), LITTLE_ENDIAN])?;
        for value in header {
            writer.write_all(&value.to_le_bytes())?;
        }
        write_elements(writer, &[grid.no_data()])?;
        for coefficient in grid.geotransform() {
            writer.write_all(&coefficient.to_le_bytes())?;
        }
        writer.write_all(&projection_len.to_le_bytes())?;
        writer.write_all(projection)?;
        for row in grid.rows() {
            write_elements(writer, row)?;
        }
        Ok(())
    };
    write(writer).map_err(io_error(path))
}

/// `available` bounds the payload size, in bytes, a header may claim.
fn decode<T: Element, R: Read>(reader: &mut R, available: u64, path: &Path) -> Result<Grid<T>> {
    let kind = read_preamble(reader, path)?;
    if kind != T::KIND {
        return Err(TileError::SnapshotKindMismatch {
            path: path.to_path_buf(),
            expected: T::KIND,
            found: kind,
        });
    }

    let total_height = read_dimension(reader, path, "total height")?;
    let total_width = read_dimension(reader, path, "total width")?;
    let view_height = read_dimension(reader, path, "view height")?;
    let view_width = read_dimension(reader, path, "view width")?;
    let view_xoff = read_dimension(reader, path, "view x offset")?;
    let view_yoff = read_dimension(reader, path, "view y offset")?;
    let extent = Extent {
        total_width,
        total_height,
        view_width,
        view_height,
        view_xoff,
        view_yoff,
    };
    if !extent.is_consistent() {
        return Err(invalid(path, format!("view exceeds total extent: {extent:?}")));
    }
    let cells = view_width
        .checked_mul(view_height)
        .ok_or_else(|| invalid(path, "view size overflows"))?;

    let data_cells = match read_i32(reader).map_err(io_error(path))? {
        -1 => None,
        count => match usize::try_from(count) {
            Ok(count) if count <= cells => Some(count),
            _ => return Err(invalid(path, format!("bad data cell count {count}"))),
        },
    };

    let mut no_data = [T::default()];
    read_elements(reader, &mut no_data).map_err(io_error(path))?;

    let mut geotransform: GeoTransform = [0.0; 6];
    for coefficient in geotransform.iter_mut() {
        *coefficient = f64::from_le_bytes(read_bytes(reader).map_err(io_error(path))?);
    }

    let projection_len =
        u32::from_le_bytes(read_bytes(reader).map_err(io_error(path))?) as usize;
    if projection_len > MAX_PROJECTION_LEN {
        return Err(invalid(path, format!("projection length {projection_len}")));
    }
    let mut projection = vec![0u8; projection_len];
    reader.read_exact(&mut projection).map_err(io_error(path))?;
    let projection =
        String::from_utf8(projection).map_err(|_| invalid(path, "projection is not UTF-8"))?;

    let payload_len = cells
        .checked_mul(T::KIND.size_in_bytes())
        .and_then(|len| u64::try_from(len).ok())
        .filter(|&len| len <= available)
        .ok_or_else(|| {
            invalid(
                path,
                format!("{view_width} x {view_height} payload exceeds {available} bytes"),
            )
        })?;

    debug!("Allocating: {} rows by {} columns", view_height, view_width);
    let mut data = Vec::new();
    data.try_reserve_exact(cells)
        .map_err(|_| invalid(path, format!("cannot allocate {payload_len} bytes")))?;
    data.resize(cells, T::default());
    for row in data.chunks_exact_mut(view_width.max(1)) {
        read_elements(reader, row).map_err(io_error(path))?;
    }

    Ok(Grid::from_parts(
        extent,
        no_data[0],
        geotransform,
        projection,
        data,
        data_cells,
    ))
}

/// Writes `grid` to `path`, truncating any existing file.
pub fn save<T: Element>(grid: &Grid<T>, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);
    encode(grid, &mut writer, path)?;
    writer.flush().map_err(io_error(path))?;

    info!(
        "Saved {} snapshot {:?} ({} x {})",
        T::KIND,
        path,
        grid.view_width(),
        grid.view_height()
    );
    Ok(())
}

/// Reads a snapshot written for element kind `T`.
pub fn load<T: Element>(path: &Path) -> Result<Grid<T>> {
    let file = File::open(path).map_err(io_error(path))?;
    let available = file.metadata().map_err(io_error(path))?.len();
    let mut reader = BufReader::new(file);
    decode(&mut reader, available, path)
}
