//! Mapping between the supported numeric element kinds and GDAL band types.

use std::fmt;
use std::str::FromStr;

use gdal::raster::{GdalDataType, GdalType};

use crate::error::TileError;
use crate::Result;

/// The closed set of element kinds a [`Grid`](crate::Grid) can store.
///
/// The discriminants double as the kind tag in the snapshot header and match
/// GDAL's own `GDALDataType` ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementKind {
    U8 = 1,
    U16 = 2,
    I16 = 3,
    U32 = 4,
    I32 = 5,
    F32 = 6,
    F64 = 7,
}

impl ElementKind {
    pub const ALL: [ElementKind; 7] = [
        ElementKind::U8,
        ElementKind::U16,
        ElementKind::I16,
        ElementKind::U32,
        ElementKind::I32,
        ElementKind::F32,
        ElementKind::F64,
    ];

    /// Maps a GDAL band type onto a supported kind.
    pub fn from_gdal(data_type: GdalDataType) -> Result<Self> {
        match data_type {
            GdalDataType::UInt8 => Ok(ElementKind::U8),
            GdalDataType::UInt16 => Ok(ElementKind::U16),
            GdalDataType::Int16 => Ok(ElementKind::I16),
            GdalDataType::UInt32 => Ok(ElementKind::U32),
            GdalDataType::Int32 => Ok(ElementKind::I32),
            GdalDataType::Float32 => Ok(ElementKind::F32),
            GdalDataType::Float64 => Ok(ElementKind::F64),
            other => Err(TileError::UnsupportedKind(format!("GDAL type {other:?}"))),
        }
    }

    pub fn gdal_type(self) -> GdalDataType {
        match self {
            ElementKind::U8 => GdalDataType::UInt8,
            ElementKind::U16 => GdalDataType::UInt16,
            ElementKind::I16 => GdalDataType::Int16,
            ElementKind::U32 => GdalDataType::UInt32,
            ElementKind::I32 => GdalDataType::Int32,
            ElementKind::F32 => GdalDataType::Float32,
            ElementKind::F64 => GdalDataType::Float64,
        }
    }

    pub fn size_in_bytes(self) -> usize {
        match self {
            ElementKind::U8 => 1,
            ElementKind::U16 | ElementKind::I16 => 2,
            ElementKind::U32 | ElementKind::I32 | ElementKind::F32 => 4,
            ElementKind::F64 => 8,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| TileError::UnsupportedKind(format!("tag {tag}")))
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::U8 => "u8",
            ElementKind::U16 => "u16",
            ElementKind::I16 => "i16",
            ElementKind::U32 => "u32",
            ElementKind::I32 => "i32",
            ElementKind::F32 => "f32",
            ElementKind::F64 => "f64",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementKind {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| TileError::UnsupportedKind(s.to_string()))
    }
}

/// A numeric type that can be stored in a [`Grid`](crate::Grid).
///
/// Only implemented for the seven primitives in [`ElementKind`], so typed code
/// can never name an unsupported kind.
pub trait Element:
    GdalType + bytemuck::Pod + PartialEq + Default + fmt::Debug + Send + Sync + 'static
{
    const KIND: ElementKind;

    /// Sentinel used when a raster does not declare a no-data value.
    const DEFAULT_NO_DATA: Self;

    /// `as` conversion from GDAL's `f64` no-data representation.
    fn from_f64(value: f64) -> Self;

    fn to_f64(self) -> f64;

    /// Cell identity: `==`, except that NaN matches NaN.
    fn same(self, other: Self) -> bool {
        self == other
    }
}

macro_rules! impl_element {
    ($($ty:ty => $kind:ident, $no_data:expr $(, $same:item)?;)*) => {
        $(
            impl Element for $ty {
                const KIND: ElementKind = ElementKind::$kind;
                const DEFAULT_NO_DATA: Self = $no_data;

                fn from_f64(value: f64) -> Self {
                    value as $ty
                }

                fn to_f64(self) -> f64 {
                    self as f64
                }

                $($same)?
            }
        )*
    };
}

impl_element! {
    u8 => U8, u8::MAX;
    u16 => U16, u16::MAX;
    i16 => I16, i16::MIN;
    u32 => U32, u32::MAX;
    i32 => I32, i32::MIN;
    f32 => F32, -9999.0, fn same(self, other: Self) -> bool {
        self == other || (self.is_nan() && other.is_nan())
    };
    f64 => F64, -9999.0, fn same(self, other: Self) -> bool {
        self == other || (self.is_nan() && other.is_nan())
    };
}
