//! Animation support for JPEG XL
//!
//! Animated images carry a tick rate, a loop count and an optional timecode flag.
//! Frame durations are expressed in ticks of that rate.

use jxl_core::{JxlError, JxlResult};
use num_integer::Integer;

/// Animation header information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationHeader {
    /// Tick rate numerator (ticks per second = numerator / denominator)
    pub tps_numerator: u32,
    /// Tick rate denominator
    pub tps_denominator: u32,
    /// Number of loops (0 = infinite)
    pub num_loops: u32,
    /// Whether frames carry SMPTE timecodes, `None` leaves the engine default
    pub have_timecodes: Option<bool>,
}

impl Default for AnimationHeader {
    fn default() -> Self {
        Self {
            tps_numerator: 1000, // 1ms resolution
            tps_denominator: 1,
            num_loops: 0,
            have_timecodes: None,
        }
    }
}

impl AnimationHeader {
    /// Header with an explicit tick rate of `tps_numerator / tps_denominator` ticks per second
    pub fn new(tps_numerator: u32, tps_denominator: u32) -> Self {
        Self {
            tps_numerator,
            tps_denominator,
            ..Self::default()
        }
    }

    /// Header whose tick lasts `units_per_tick` units of a clock with `units_per_second`
    ///
    /// The resulting ticks-per-second fraction is reduced to lowest terms so it
    /// stays within the engine's 32-bit fields.
    pub fn from_tick_duration(units_per_tick: u64, units_per_second: u64) -> JxlResult<Self> {
        if units_per_tick == 0 || units_per_second == 0 {
            return Err(JxlError::InvalidParameter(
                "tick duration must be non-zero".to_string(),
            ));
        }
        let (num, den) = reduce_ratio(units_per_second, units_per_tick);
        let to_u32 = |v: u64| {
            u32::try_from(v).map_err(|_| {
                JxlError::InvalidParameter(format!("tick rate component {} exceeds 32 bits", v))
            })
        };
        Ok(Self::new(to_u32(num)?, to_u32(den)?))
    }

    /// Whether both halves of the tick rate are usable
    pub fn is_valid(&self) -> bool {
        self.tps_numerator > 0 && self.tps_denominator > 0
    }
}

/// Reduce `numerator / denominator` to lowest terms
///
/// When both halves are zero the ratio is returned unchanged.
pub fn reduce_ratio(numerator: u64, denominator: u64) -> (u64, u64) {
    let gcd = numerator.gcd(&denominator);
    if gcd == 0 {
        return (numerator, denominator);
    }
    (numerator / gcd, denominator / gcd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_header_default() {
        let header = AnimationHeader::default();
        assert_eq!(header.tps_numerator, 1000);
        assert_eq!(header.tps_denominator, 1);
        assert_eq!(header.num_loops, 0);
        assert_eq!(header.have_timecodes, None);
    }

    #[test]
    fn test_reduce_ratio() {
        assert_eq!(reduce_ratio(1000, 1000), (1, 1));
        assert_eq!(reduce_ratio(1000, 40), (25, 1));
        assert_eq!(reduce_ratio(12, 18), (2, 3));
        assert_eq!(reduce_ratio(7, 0), (1, 0));
        assert_eq!(reduce_ratio(0, 0), (0, 0));
    }

    #[test]
    fn test_one_second_ticks_in_milliseconds() {
        let header = AnimationHeader::from_tick_duration(1000, 1000).unwrap();
        assert_eq!((header.tps_numerator, header.tps_denominator), (1, 1));
    }

    #[test]
    fn test_tick_rate_is_ticks_per_second() {
        // 40ms per tick = 25 ticks per second
        let header = AnimationHeader::from_tick_duration(40, 1000).unwrap();
        assert_eq!((header.tps_numerator, header.tps_denominator), (25, 1));
        assert!(header.is_valid());
    }

    #[test]
    fn test_zero_tick_rejected() {
        assert!(AnimationHeader::from_tick_duration(0, 1000).is_err());
    }

    #[test]
    fn test_oversized_rate_rejected() {
        assert!(AnimationHeader::from_tick_duration(1, 1_000_000_000).is_ok());
        assert!(AnimationHeader::from_tick_duration(1, u64::MAX).is_err());
    }
}
