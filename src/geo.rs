//! Affine geotransform helpers.
//!
//! The geotransform maps a (column, row) pixel position to georeferenced
//! coordinates:
//!
//! ```text
//! Xgeo = GT[0] + col * GT[1] + row * GT[2]
//! Ygeo = GT[3] + col * GT[4] + row * GT[5]
//! ```
//!
//! For north-up rasters GT[2] and GT[4] are zero, GT[1] is the pixel width and
//! GT[5] the (usually negative) pixel height. (GT[0], GT[3]) is the top-left
//! corner of the top-left pixel.

pub use gdal::GeoTransform;

/// GDAL's transform for rasters that carry no georeferencing.
pub const IDENTITY: GeoTransform = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// Moves the origin of `gt` to the tile placed at (`xoffset`, `yoffset`)
/// cells inside the larger mosaic. Only GT[0] and GT[3] change.
pub fn shifted(gt: &GeoTransform, xoffset: usize, yoffset: usize) -> GeoTransform {
    let mut out = *gt;
    out[0] += xoffset as f64 * gt[1];
    out[3] += yoffset as f64 * gt[5];
    out
}

/// Pixel width times pixel height coefficient. Negative for the usual
/// north-up convention where GT[5] < 0.
pub fn cell_area(gt: &GeoTransform) -> f64 {
    gt[1] * gt[5]
}

/// Georeferenced coordinates of the top-left corner of pixel (`col`, `row`).
pub fn pixel_to_geo(gt: &GeoTransform, col: f64, row: f64) -> (f64, f64) {
    (
        gt[0] + col * gt[1] + row * gt[2],
        gt[3] + col * gt[4] + row * gt[5],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const GT: GeoTransform = [135.0, 0.001, 0.0, 35.0, 0.0, -0.001];

    #[test]
    fn test_shifted_moves_origin_only() {
        let out = shifted(&GT, 5, 7);
        assert!((out[0] - (135.0 + 5.0 * 0.001)).abs() < 1e-12);
        assert!((out[3] - (35.0 - 7.0 * 0.001)).abs() < 1e-12);
        assert_eq!(out[1], GT[1]);
        assert_eq!(out[2], GT[2]);
        assert_eq!(out[4], GT[4]);
        assert_eq!(out[5], GT[5]);
    }

    #[test]
    fn test_zero_offset_is_identity() {
        assert_eq!(shifted(&GT, 0, 0), GT);
    }

    #[test]
    fn test_cell_area_keeps_sign() {
        assert!((cell_area(&GT) + 0.000001).abs() < 1e-15);
        assert_eq!(cell_area(&[0.0, 30.0, 0.0, 0.0, 0.0, 30.0]), 900.0);
    }

    #[test]
    fn test_pixel_to_geo_matches_shifted_origin() {
        let (x, y) = pixel_to_geo(&GT, 5.0, 7.0);
        let out = shifted(&GT, 5, 7);
        assert!((x - out[0]).abs() < 1e-12);
        assert!((y - out[3]).abs() < 1e-12);
    }
}
