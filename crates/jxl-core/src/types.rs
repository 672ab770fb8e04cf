//! Core value types shared by the builders and the codec engines

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sample data type of a pixel or extra channel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataType {
    /// 32-bit IEEE float
    F32,
    /// 8-bit unsigned integer
    U8,
    /// 16-bit unsigned integer
    U16,
    /// 16-bit IEEE half float
    F16,
}

impl DataType {
    /// Returns the size in bytes of one sample of this type
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            DataType::F32 => 4,
            DataType::U8 => 1,
            DataType::U16 => 2,
            DataType::F16 => 2,
        }
    }

    /// Whether samples of this type are floating point
    pub fn is_float(&self) -> bool {
        matches!(self, DataType::F32 | DataType::F16)
    }
}

/// Byte order of multi-byte samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Endianness {
    /// Byte order of the host
    #[default]
    Native,
    Big,
    Little,
}

impl Endianness {
    /// Resolve [`Endianness::Native`] to the host byte order
    pub fn resolve(&self) -> Endianness {
        match self {
            Endianness::Native if cfg!(target_endian = "big") => Endianness::Big,
            Endianness::Native => Endianness::Little,
            other => *other,
        }
    }
}

/// Image dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when neither side is zero
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Orientation of the image, numbered as in Exif
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    #[default]
    Identity = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    Transpose = 5,
    Rotate90Cw = 6,
    AntiTranspose = 7,
    Rotate90Ccw = 8,
}

impl Orientation {
    /// Exif orientation value
    pub fn to_u32(self) -> u32 {
        self as u32
    }
}
