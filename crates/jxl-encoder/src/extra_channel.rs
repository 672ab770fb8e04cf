//! Extra channel builder
//!
//! Extra channels are numbered by the order they are committed to their frame.
//! That index identifies the channel in every engine call.

use crate::frame::{check_name, check_reference_slot, FrameBuilder};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use jxl_core::{DataType, Endianness, JxlError, JxlResult, PixelBuffer, PixelFormat};
use jxl_headers::{BlendInfo, BlendMode, ExtraChannelInfo, ExtraChannelType};
use log::debug;

/// A committed extra channel
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraChannel {
    pub name: Option<String>,
    pub info: ExtraChannelInfo,
    pub blend_info: BlendInfo,
    pub data: PixelBuffer,
}

/// Builder for one extra channel, returned by [`FrameBuilder::new_extra_channel`]
#[derive(Debug)]
pub struct ExtraChannelBuilder<'a> {
    frame: FrameBuilder<'a>,
    name: Option<String>,
    channel_type: ExtraChannelType,
    bits_per_sample: Option<u32>,
    exponent_bits_per_sample: u32,
    dim_shift: Option<u32>,
    alpha_premultiplied: Option<bool>,
    spot_color: Option<[f32; 4]>,
    cfa_channel: Option<u32>,
    blend_info: BlendInfo,
}

impl<'a> ExtraChannelBuilder<'a> {
    pub(crate) fn new(frame: FrameBuilder<'a>) -> Self {
        Self {
            frame,
            name: None,
            channel_type: ExtraChannelType::default(),
            bits_per_sample: None,
            exponent_bits_per_sample: 0,
            dim_shift: None,
            alpha_premultiplied: None,
            spot_color: None,
            cfa_channel: None,
            blend_info: BlendInfo::default(),
        }
    }

    /// Channel name, at most 1071 bytes of UTF-8
    pub fn name(mut self, name: impl Into<String>) -> JxlResult<Self> {
        let name = name.into();
        check_name(&name)?;
        self.name = Some(name);
        Ok(self)
    }

    pub fn channel_type(mut self, channel_type: ExtraChannelType) -> Self {
        self.channel_type = channel_type;
        self
    }

    pub fn type_alpha(mut self, premultiplied: bool) -> Self {
        self.channel_type = ExtraChannelType::Alpha;
        self.alpha_premultiplied = Some(premultiplied);
        self
    }

    /// Spot color channel with its linear RGB color and strength
    pub fn type_spot_color(mut self, red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        self.channel_type = ExtraChannelType::SpotColor;
        self.spot_color = Some([red, green, blue, alpha]);
        self
    }

    /// Color filter array channel mapped to the given CFA index
    pub fn type_cfa(mut self, index: u32) -> Self {
        self.channel_type = ExtraChannelType::Cfa;
        self.cfa_channel = Some(index);
        self
    }

    pub fn bits_per_sample(mut self, bits: u32) -> Self {
        self.bits_per_sample = Some(bits);
        self
    }

    pub fn with_floating_samples(mut self, exponent_bits: u32) -> JxlResult<Self> {
        if exponent_bits == 0 {
            return Err(JxlError::InvalidParameter(
                "floating point samples need at least one exponent bit".to_string(),
            ));
        }
        self.exponent_bits_per_sample = exponent_bits;
        Ok(self)
    }

    /// Downsample the channel by `2^shift` in each direction
    pub fn dim_shift(mut self, shift: u32) -> Self {
        self.dim_shift = Some(shift);
        self
    }

    pub fn blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_info.mode = mode;
        self
    }

    pub fn blend_source(mut self, source: u32) -> JxlResult<Self> {
        check_reference_slot("blend source", source)?;
        self.blend_info.source = source;
        Ok(self)
    }

    pub fn blend_alpha(mut self, alpha: u32) -> Self {
        self.blend_info.alpha = alpha;
        self
    }

    pub fn blend_clamp(mut self, clamp: bool) -> Self {
        self.blend_info.clamp = clamp;
        self
    }

    fn check_type_fields(&self) -> JxlResult<()> {
        let mismatch = |field| JxlError::ExtraChannelFieldMismatch {
            field,
            channel_type: self.channel_type.name(),
        };
        if self.alpha_premultiplied.is_some() && self.channel_type != ExtraChannelType::Alpha {
            return Err(mismatch("alpha premultiplication"));
        }
        if self.spot_color.is_some() && self.channel_type != ExtraChannelType::SpotColor {
            return Err(mismatch("a spot color"));
        }
        if self.cfa_channel.is_some() && self.channel_type != ExtraChannelType::Cfa {
            return Err(mismatch("a CFA index"));
        }
        Ok(())
    }

    /// Attach single-channel sample data and add the channel to its frame
    ///
    /// The buffer is sized like a frame buffer with one channel.
    pub fn commit(
        self,
        data_type: DataType,
        endianness: Endianness,
        align: usize,
        data: impl Into<Vec<u8>>,
    ) -> JxlResult<FrameBuilder<'a>> {
        let bits_per_sample = self
            .bits_per_sample
            .ok_or(JxlError::MissingField("bits_per_sample"))?;
        let index = self.frame.extra_channel_count();
        let capacity = self.frame.extra_channel_capacity();
        if index >= capacity as usize {
            return Err(JxlError::ExtraChannelCapacity { index, capacity });
        }
        self.check_type_fields()?;

        let format = PixelFormat::new(1, data_type)
            .with_endianness(endianness)
            .with_align(align);
        let data = data.into();
        self.frame.check_data_size(&format, data.len())?;

        let mut info = ExtraChannelInfo::new(self.channel_type, bits_per_sample);
        info.exponent_bits_per_sample = self.exponent_bits_per_sample;
        info.dim_shift = self.dim_shift;
        info.name_length = self.name.as_ref().map_or(0, |n| n.len() as u32);
        info.alpha_premultiplied = self.alpha_premultiplied.unwrap_or(false);
        info.spot_color = self.spot_color;
        info.cfa_channel = self.cfa_channel;

        debug!(
            "extra channel {} ({}) committed, {} bytes",
            index,
            self.channel_type.name(),
            data.len()
        );
        let mut frame = self.frame;
        frame.push_extra_channel(ExtraChannel {
            name: self.name,
            info,
            blend_info: self.blend_info,
            data: PixelBuffer::new(format, data),
        });
        Ok(frame)
    }

    /// Commit 16-bit samples written in the given byte order
    pub fn commit_u16(
        self,
        endianness: Endianness,
        samples: &[u16],
    ) -> JxlResult<FrameBuilder<'a>> {
        let mut bytes = vec![0u8; samples.len() * 2];
        match endianness.resolve() {
            Endianness::Big => BigEndian::write_u16_into(samples, &mut bytes),
            _ => LittleEndian::write_u16_into(samples, &mut bytes),
        }
        self.commit(DataType::U16, endianness, 0, bytes)
    }
}

#[cfg(test)]
mod tests {
    use crate::encoder::Encoder;
    use jxl_core::{ColorEncoding, DataType, Endianness, ErrorKind, JxlError};
    use jxl_headers::{BlendMode, ExtraChannelType};

    fn encoder(extra: u32) -> Encoder {
        let mut encoder = Encoder::new();
        encoder
            .color_encoding(ColorEncoding::srgb())
            .size(2, 2)
            .bits_per_sample(8)
            .num_channels(3, extra)
            .unwrap();
        encoder
    }

    #[test]
    fn test_missing_bits_per_sample() {
        let mut enc = encoder(1);
        let err = enc
            .new_frame()
            .new_extra_channel()
            .unwrap()
            .type_alpha(false)
            .commit(DataType::U8, Endianness::Native, 0, vec![0u8; 4])
            .unwrap_err();
        assert!(matches!(err, JxlError::MissingField("bits_per_sample")));
    }

    #[test]
    fn test_commit_records_channel() {
        let mut enc = encoder(1);
        let frame = enc
            .new_frame()
            .new_named_extra_channel("mask")
            .unwrap()
            .type_alpha(true)
            .bits_per_sample(8)
            .blend_mode(BlendMode::Blend)
            .commit(DataType::U8, Endianness::Native, 0, vec![1, 2, 3, 4])
            .unwrap();
        let channel = &frame.config().extra_channels[0];
        assert_eq!(channel.name.as_deref(), Some("mask"));
        assert_eq!(channel.info.channel_type, ExtraChannelType::Alpha);
        assert_eq!(channel.info.name_length, 4);
        assert!(channel.info.alpha_premultiplied);
        assert_eq!(channel.blend_info.mode, BlendMode::Blend);
        assert_eq!(channel.data.format.num_channels, 1);
    }

    #[test]
    fn test_capacity_reached() {
        let mut enc = encoder(1);
        let frame = enc
            .new_frame()
            .new_extra_channel()
            .unwrap()
            .bits_per_sample(8)
            .commit(DataType::U8, Endianness::Native, 0, vec![0u8; 4])
            .unwrap();
        let err = frame.new_extra_channel().unwrap_err();
        assert!(matches!(
            err,
            JxlError::ExtraChannelCapacity {
                index: 1,
                capacity: 1
            }
        ));
    }

    #[test]
    fn test_short_channel_buffer() {
        let mut enc = encoder(1);
        let err = enc
            .new_frame()
            .new_extra_channel()
            .unwrap()
            .bits_per_sample(16)
            .commit(DataType::U16, Endianness::Little, 0, vec![0u8; 7])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Sizing);
    }

    #[test]
    fn test_type_field_mismatch() {
        let mut enc = encoder(1);
        let err = enc
            .new_frame()
            .new_extra_channel()
            .unwrap()
            .type_spot_color(1.0, 0.0, 0.0, 1.0)
            .channel_type(ExtraChannelType::Depth)
            .bits_per_sample(8)
            .commit(DataType::U8, Endianness::Native, 0, vec![0u8; 4])
            .unwrap_err();
        assert!(matches!(
            err,
            JxlError::ExtraChannelFieldMismatch {
                field: "a spot color",
                channel_type: "depth"
            }
        ));
    }

    #[test]
    fn test_commit_u16_byte_order() {
        let mut enc = encoder(1);
        let frame = enc
            .new_frame()
            .new_extra_channel()
            .unwrap()
            .bits_per_sample(16)
            .commit_u16(Endianness::Big, &[0x0102, 0x0304, 0x0506, 0x0708])
            .unwrap();
        let data = &frame.config().extra_channels[0].data;
        assert_eq!(data.format.data_type, DataType::U16);
        assert_eq!(data.format.endianness, Endianness::Big);
        assert_eq!(data.data, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_floating_samples_need_exponent() {
        let mut enc = encoder(1);
        assert!(enc
            .new_frame()
            .new_extra_channel()
            .unwrap()
            .with_floating_samples(0)
            .is_err());
    }
}
