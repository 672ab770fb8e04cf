//! Basic image information and extra channel descriptions
//!
//! Optional fields mean "leave the engine's default in place".

use crate::animation::AnimationHeader;
use jxl_core::{Dimensions, Orientation};

/// Size of the preview image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewHeader {
    pub xsize: u32,
    pub ysize: u32,
}

/// Global image parameters
#[derive(Debug, Clone, PartialEq)]
pub struct BasicInfo {
    pub xsize: u32,
    pub ysize: u32,
    pub bits_per_sample: u32,
    /// 0 for integer samples
    pub exponent_bits_per_sample: u32,
    pub intensity_target: Option<f32>,
    pub min_nits: Option<f32>,
    pub relative_to_max_display: Option<bool>,
    pub linear_below: Option<f32>,
    pub uses_original_profile: Option<bool>,
    pub have_preview: Option<bool>,
    pub preview: Option<PreviewHeader>,
    pub have_animation: Option<bool>,
    pub animation: Option<AnimationHeader>,
    pub orientation: Orientation,
    pub num_color_channels: u32,
    pub num_extra_channels: u32,
    pub alpha_bits: Option<u32>,
    pub alpha_exponent_bits: u32,
    pub alpha_premultiplied: bool,
    pub intrinsic_size: Option<Dimensions>,
}

impl BasicInfo {
    /// 8-bit RGB image without extra channels
    pub fn new(xsize: u32, ysize: u32) -> Self {
        Self {
            xsize,
            ysize,
            bits_per_sample: 8,
            exponent_bits_per_sample: 0,
            intensity_target: None,
            min_nits: None,
            relative_to_max_display: None,
            linear_below: None,
            uses_original_profile: None,
            have_preview: None,
            preview: None,
            have_animation: None,
            animation: None,
            orientation: Orientation::Identity,
            num_color_channels: 3,
            num_extra_channels: 0,
            alpha_bits: None,
            alpha_exponent_bits: 0,
            alpha_premultiplied: false,
            intrinsic_size: None,
        }
    }

    pub fn is_float(&self) -> bool {
        self.exponent_bits_per_sample > 0
    }

    pub fn is_animated(&self) -> bool {
        self.have_animation == Some(true)
    }
}

/// Kind of an extra channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtraChannelType {
    Alpha,
    Depth,
    SpotColor,
    SelectionMask,
    Black,
    Cfa,
    Thermal,
    Reserved0,
    Reserved1,
    Reserved2,
    Reserved3,
    Reserved4,
    Reserved5,
    Reserved6,
    Reserved7,
    #[default]
    Unknown,
    Optional,
}

impl ExtraChannelType {
    /// Engine code of this channel type
    pub fn to_u32(self) -> u32 {
        match self {
            ExtraChannelType::Alpha => 0,
            ExtraChannelType::Depth => 1,
            ExtraChannelType::SpotColor => 2,
            ExtraChannelType::SelectionMask => 3,
            ExtraChannelType::Black => 4,
            ExtraChannelType::Cfa => 5,
            ExtraChannelType::Thermal => 6,
            ExtraChannelType::Reserved0 => 7,
            ExtraChannelType::Reserved1 => 8,
            ExtraChannelType::Reserved2 => 9,
            ExtraChannelType::Reserved3 => 10,
            ExtraChannelType::Reserved4 => 11,
            ExtraChannelType::Reserved5 => 12,
            ExtraChannelType::Reserved6 => 13,
            ExtraChannelType::Reserved7 => 14,
            ExtraChannelType::Unknown => 15,
            ExtraChannelType::Optional => 16,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExtraChannelType::Alpha => "alpha",
            ExtraChannelType::Depth => "depth",
            ExtraChannelType::SpotColor => "spot color",
            ExtraChannelType::SelectionMask => "selection mask",
            ExtraChannelType::Black => "black",
            ExtraChannelType::Cfa => "CFA",
            ExtraChannelType::Thermal => "thermal",
            ExtraChannelType::Reserved0
            | ExtraChannelType::Reserved1
            | ExtraChannelType::Reserved2
            | ExtraChannelType::Reserved3
            | ExtraChannelType::Reserved4
            | ExtraChannelType::Reserved5
            | ExtraChannelType::Reserved6
            | ExtraChannelType::Reserved7 => "reserved",
            ExtraChannelType::Unknown => "unknown",
            ExtraChannelType::Optional => "optional",
        }
    }
}

/// Description of one extra channel
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraChannelInfo {
    pub channel_type: ExtraChannelType,
    pub bits_per_sample: u32,
    pub exponent_bits_per_sample: u32,
    /// Downsampling shift, `None` keeps the engine default
    pub dim_shift: Option<u32>,
    /// Length in bytes of the channel name, 0 when unnamed
    pub name_length: u32,
    pub alpha_premultiplied: bool,
    pub spot_color: Option<[f32; 4]>,
    pub cfa_channel: Option<u32>,
}

impl ExtraChannelInfo {
    pub fn new(channel_type: ExtraChannelType, bits_per_sample: u32) -> Self {
        Self {
            channel_type,
            bits_per_sample,
            exponent_bits_per_sample: 0,
            dim_shift: None,
            name_length: 0,
            alpha_premultiplied: false,
            spot_color: None,
            cfa_channel: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_info_defaults() {
        let info = BasicInfo::new(16, 8);
        assert_eq!(info.num_color_channels, 3);
        assert!(!info.is_float());
        assert!(!info.is_animated());
        assert_eq!(info.orientation, Orientation::Identity);
    }

    #[test]
    fn test_extra_channel_codes_are_distinct() {
        let all = [
            ExtraChannelType::Alpha,
            ExtraChannelType::Depth,
            ExtraChannelType::SpotColor,
            ExtraChannelType::SelectionMask,
            ExtraChannelType::Black,
            ExtraChannelType::Cfa,
            ExtraChannelType::Thermal,
            ExtraChannelType::Reserved0,
            ExtraChannelType::Reserved1,
            ExtraChannelType::Reserved2,
            ExtraChannelType::Reserved3,
            ExtraChannelType::Reserved4,
            ExtraChannelType::Reserved5,
            ExtraChannelType::Reserved6,
            ExtraChannelType::Reserved7,
            ExtraChannelType::Unknown,
            ExtraChannelType::Optional,
        ];
        for (i, t) in all.iter().enumerate() {
            assert_eq!(t.to_u32(), i as u32);
        }
        assert_eq!(ExtraChannelType::default(), ExtraChannelType::Unknown);
    }
}
