//! Pixel buffer descriptors and buffer size arithmetic
//!
//! A [`PixelFormat`] binds a sample type, a channel count, a byte order and a
//! row alignment. Together with the frame extent it determines exactly how many
//! bytes an interleaved buffer must hold:
//!
//! ```text
//! row_bytes = ceil(width * bytes_per_sample / align) * align
//! required  = channels * row_bytes * height
//! ```
//!
//! An alignment of 0 is treated as 1.

use crate::error::{JxlError, JxlResult};
use crate::types::{DataType, Endianness};
use num_integer::Integer;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Layout of an interleaved sample buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelFormat {
    /// Interleaved channels per pixel
    pub num_channels: u32,
    /// Sample type
    pub data_type: DataType,
    /// Byte order of multi-byte samples
    pub endianness: Endianness,
    /// Row stride granularity in bytes (0 means 1)
    pub align: usize,
}

impl PixelFormat {
    pub fn new(num_channels: u32, data_type: DataType) -> Self {
        Self {
            num_channels,
            data_type,
            endianness: Endianness::Native,
            align: 0,
        }
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn with_align(mut self, align: usize) -> Self {
        self.align = align;
        self
    }

    /// Effective alignment, with 0 mapped to 1
    pub fn effective_align(&self) -> usize {
        if self.align == 0 {
            1
        } else {
            self.align
        }
    }

    /// Bytes occupied by one row of `width` samples of a single channel
    pub fn row_bytes(&self, width: u32) -> JxlResult<usize> {
        let align = self.effective_align();
        let raw = (width as usize)
            .checked_mul(self.data_type.bytes_per_sample())
            .ok_or_else(overflow)?;
        Integer::div_ceil(&raw, &align)
            .checked_mul(align)
            .ok_or_else(overflow)
    }

    /// Minimum buffer length for a `width` x `height` extent
    pub fn required_size(&self, width: u32, height: u32) -> JxlResult<usize> {
        (self.num_channels as usize)
            .checked_mul(self.row_bytes(width)?)
            .and_then(|n| n.checked_mul(height as usize))
            .ok_or_else(overflow)
    }

    /// Fail with a sizing error when `actual` is below the required length
    pub fn check_size(&self, width: u32, height: u32, actual: usize) -> JxlResult<usize> {
        let expected = self.required_size(width, height)?;
        if actual < expected {
            return Err(JxlError::BufferTooSmall { expected, actual });
        }
        Ok(expected)
    }
}

fn overflow() -> JxlError {
    JxlError::InvalidParameter("buffer size overflows usize".to_string())
}

/// Integer ceiling division of an extent by a downsampling factor
///
/// A factor of 0 leaves the extent unchanged.
pub fn downsampled_extent(extent: u32, factor: u32) -> u32 {
    if factor == 0 {
        extent
    } else {
        Integer::div_ceil(&extent, &factor)
    }
}

/// A committed sample buffer together with its declared layout
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(format: PixelFormat, data: Vec<u8>) -> Self {
        Self { format, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb8_size() {
        let fmt = PixelFormat::new(3, DataType::U8);
        assert_eq!(fmt.required_size(4, 4).unwrap(), 48);
    }

    #[test]
    fn test_alignment_pads_rows() {
        let fmt = PixelFormat::new(1, DataType::U16).with_align(8);
        // 3 samples * 2 bytes = 6, rounded up to 8
        assert_eq!(fmt.row_bytes(3).unwrap(), 8);
        assert_eq!(fmt.required_size(3, 5).unwrap(), 40);
    }

    #[test]
    fn test_zero_align_is_one() {
        let a = PixelFormat::new(4, DataType::F32).with_align(0);
        let b = PixelFormat::new(4, DataType::F32).with_align(1);
        assert_eq!(a.required_size(7, 3).unwrap(), b.required_size(7, 3).unwrap());
    }

    #[test]
    fn test_monotonic_in_dimensions_and_channels() {
        for data_type in [DataType::U8, DataType::U16, DataType::F16, DataType::F32] {
            for align in [0usize, 1, 3, 16] {
                let mut last = 0;
                for w in 1..20u32 {
                    let fmt = PixelFormat::new(3, data_type).with_align(align);
                    let size = fmt.required_size(w, 5).unwrap();
                    assert!(size >= last);
                    assert_eq!(size, fmt.required_size(w, 5).unwrap());
                    last = size;
                }
                let mut last = 0;
                for channels in 1..5u32 {
                    let fmt = PixelFormat::new(channels, data_type).with_align(align);
                    let size = fmt.required_size(9, 9).unwrap();
                    assert!(size >= last);
                    last = size;
                }
            }
        }
    }

    #[test]
    fn test_short_buffer_rejected() {
        let fmt = PixelFormat::new(3, DataType::U8);
        match fmt.check_size(4, 4, 47) {
            Err(JxlError::BufferTooSmall { expected, actual }) => {
                assert_eq!(expected, 48);
                assert_eq!(actual, 47);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(fmt.check_size(4, 4, 100).is_ok());
    }

    #[test]
    fn test_overflow_is_error() {
        let fmt = PixelFormat::new(u32::MAX, DataType::F32);
        assert!(fmt.required_size(u32::MAX, u32::MAX).is_err());
    }

    #[test]
    fn test_downsampled_extent() {
        assert_eq!(downsampled_extent(9, 2), 5);
        assert_eq!(downsampled_extent(8, 2), 4);
        assert_eq!(downsampled_extent(8, 1), 8);
        assert_eq!(downsampled_extent(8, 0), 8);
    }
}
