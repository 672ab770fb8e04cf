//! Frame builder
//!
//! A [`FrameBuilder`] accumulates the header, tuning options and extra channels
//! of one frame. Committing pixel data (or a JPEG bitstream) appends the frame
//! to its encoder and hands the encoder back.

use crate::encoder::Encoder;
use crate::extra_channel::{ExtraChannel, ExtraChannelBuilder};
use crate::options::{Buffering, ColorTransform, EpfMode, FrameSettings, GroupOrder, StrategyOption};
use crate::strategy::{DualConfigurator, ModularConfigurator, VarDctConfigurator};
use jxl_core::consts::{DEFAULT_DISTANCE, LOSSLESS_QUALITY, MAX_NAME_LENGTH, MAX_REFERENCE_SLOT};
use jxl_core::{downsampled_extent, DataType, JxlError, JxlResult, PixelBuffer, PixelFormat};
use jxl_engine::BitDepthType;
use jxl_headers::{BlendInfo, BlendMode, Crop, FrameHeader, LayerInfo, Timecode};
use log::debug;

/// Map a 0-100 quality to a Butteraugli distance
///
/// 100 and above is lossless (distance 0). The curve matches the reference
/// command line encoder.
pub fn quality_to_distance(quality: f32) -> f32 {
    if quality >= LOSSLESS_QUALITY {
        0.0
    } else if quality >= 30.0 {
        0.1 + (100.0 - quality) * 0.09
    } else {
        53.0 / 3000.0 * quality * quality - 23.0 / 20.0 * quality + 25.0
    }
}

/// Reject names the engine cannot store
pub(crate) fn check_name(name: &str) -> JxlResult<()> {
    if name.len() > MAX_NAME_LENGTH {
        return Err(JxlError::InvalidParameter(format!(
            "name is {} bytes long, the limit is {}",
            name.len(),
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

pub(crate) fn check_reference_slot(what: &str, slot: u32) -> JxlResult<()> {
    if slot > MAX_REFERENCE_SLOT {
        return Err(JxlError::InvalidParameter(format!(
            "{} must be between 0 and {}, got {}",
            what, MAX_REFERENCE_SLOT, slot
        )));
    }
    Ok(())
}

/// Data committed with a frame
#[derive(Debug, Clone, PartialEq)]
pub enum FramePayload {
    Image(PixelBuffer),
    /// Raw JPEG bitstream to be recompressed losslessly
    Jpeg(Vec<u8>),
}

/// Everything about a frame except its main pixel data
#[derive(Debug, Clone, PartialEq)]
pub struct FrameConfig {
    pub name: Option<String>,
    /// Duration in animation ticks
    pub duration: u32,
    /// Packed SMPTE timecode
    pub timecode: u32,
    pub crop: Option<Crop>,
    pub save_as_reference: u32,
    pub blend_info: BlendInfo,
    pub settings: FrameSettings,
    /// Butteraugli distance, 0 or below selects lossless mode
    pub distance: f32,
    pub bit_depth_type: BitDepthType,
    pub extra_channels: Vec<ExtraChannel>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            name: None,
            duration: 0,
            timecode: 0,
            crop: None,
            save_as_reference: 0,
            blend_info: BlendInfo::default(),
            settings: FrameSettings::default(),
            distance: DEFAULT_DISTANCE,
            bit_depth_type: BitDepthType::FromPixelFormat,
            extra_channels: Vec::new(),
        }
    }
}

impl FrameConfig {
    pub fn is_lossless(&self) -> bool {
        self.distance <= 0.0
    }

    /// Extent of the pixel data expected for an `xsize` x `ysize` image
    ///
    /// The crop size when cropping, divided by the resampling factor when the
    /// data is already downsampled.
    pub fn data_extent(&self, xsize: u32, ysize: u32) -> (u32, u32) {
        let (w, h) = match self.crop {
            Some(crop) => (crop.xsize, crop.ysize),
            None => (xsize, ysize),
        };
        if self.settings.already_downsampled {
            let factor = self.settings.resampling.unwrap_or(1);
            (downsampled_extent(w, factor), downsampled_extent(h, factor))
        } else {
            (w, h)
        }
    }

    /// Frame header for an `xsize` x `ysize` image
    pub fn header(&self, xsize: u32, ysize: u32) -> FrameHeader {
        let (layer_x, layer_y) = match self.crop {
            Some(crop) => (crop.xsize, crop.ysize),
            None => (xsize, ysize),
        };
        FrameHeader {
            duration: self.duration,
            timecode: self.timecode,
            layer_info: LayerInfo {
                crop: self.crop,
                xsize: layer_x,
                ysize: layer_y,
                save_as_reference: self.save_as_reference,
                blend_info: self.blend_info,
            },
        }
    }
}

/// A committed frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub config: FrameConfig,
    pub payload: FramePayload,
}

impl Frame {
    pub fn is_jpeg(&self) -> bool {
        matches!(self.payload, FramePayload::Jpeg(_))
    }
}

/// Builder for one frame, returned by [`Encoder::new_frame`]
#[derive(Debug)]
pub struct FrameBuilder<'a> {
    owner: &'a mut Encoder,
    config: FrameConfig,
}

impl<'a> FrameBuilder<'a> {
    pub(crate) fn new(owner: &'a mut Encoder) -> Self {
        Self {
            owner,
            config: FrameConfig::default(),
        }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub(crate) fn settings_mut(&mut self) -> &mut FrameSettings {
        &mut self.config.settings
    }

    /// Frame name, at most 1071 bytes of UTF-8
    pub fn name(mut self, name: impl Into<String>) -> JxlResult<Self> {
        let name = name.into();
        check_name(&name)?;
        self.config.name = Some(name);
        Ok(self)
    }

    /// Duration in animation ticks
    pub fn duration(mut self, duration: u32) -> Self {
        self.config.duration = duration;
        self
    }

    /// SMPTE timecode packed as `0xHHMMSSFF`
    ///
    /// Only used when the animation has timecodes enabled.
    pub fn timecode(mut self, packed: u32) -> Self {
        self.config.timecode = packed;
        self
    }

    pub fn timecode_parts(self, hours: u8, minutes: u8, seconds: u8, frames: u8) -> Self {
        self.timecode(Timecode::new(hours, minutes, seconds, frames).pack())
    }

    /// Save the frame into reference slot `id` (0-3) after blending
    pub fn save_as_reference(mut self, id: u32) -> JxlResult<Self> {
        check_reference_slot("save_as_reference", id)?;
        self.config.save_as_reference = id;
        Ok(self)
    }

    pub fn blend_mode(mut self, mode: BlendMode) -> Self {
        self.config.blend_info.mode = mode;
        self
    }

    /// Reference slot (0-3) used as the bottom layer
    pub fn blend_source(mut self, source: u32) -> JxlResult<Self> {
        check_reference_slot("blend source", source)?;
        self.config.blend_info.source = source;
        Ok(self)
    }

    /// Extra channel used as alpha by the `Blend` and `MulAdd` modes
    pub fn blend_alpha(mut self, alpha: u32) -> Self {
        self.config.blend_info.alpha = alpha;
        self
    }

    pub fn blend_clamp(mut self, clamp: bool) -> Self {
        self.config.blend_info.clamp = clamp;
        self
    }

    /// Place the frame at (`x0`, `y0`) with its own size
    pub fn crop(mut self, x0: i32, y0: i32, xsize: u32, ysize: u32) -> Self {
        self.config.crop = Some(Crop::new(x0, y0, xsize, ysize));
        self
    }

    /// Encoder effort, 1 (fastest) to 10 (slowest, needs expert options)
    pub fn effort(mut self, effort: i32) -> Self {
        self.config.settings.effort = effort;
        self
    }

    /// Decoding speed tier, 0 (best density) to 4 (fastest decoding)
    pub fn decoding_speed(mut self, tier: i32) -> Self {
        self.config.settings.decoding_speed = tier;
        self
    }

    /// Resampling factor: 1, 2, 4 or 8
    pub fn resampling(mut self, factor: u32) -> Self {
        self.config.settings.resampling = Some(factor);
        self
    }

    pub fn extra_channel_resampling(mut self, factor: u32) -> Self {
        self.config.settings.extra_channel_resampling = Some(factor);
        self
    }

    /// Pixel data is already downsampled by the resampling factor
    pub fn already_downsampled(mut self, downsampled: bool) -> Self {
        self.config.settings.already_downsampled = downsampled;
        self
    }

    /// Photon noise at the given ISO level, 0 disables it
    pub fn photon_noise(mut self, iso: f32) -> Self {
        self.config.settings.photon_noise = iso;
        self
    }

    pub fn dots(mut self, enabled: bool) -> Self {
        self.config.settings.dots = Some(enabled);
        self
    }

    pub fn patches(mut self, enabled: bool) -> Self {
        self.config.settings.patches = Some(enabled);
        self
    }

    pub fn epf(mut self, mode: EpfMode) -> Self {
        self.config.settings.epf = mode;
        self
    }

    pub fn gaborish(mut self, enabled: bool) -> Self {
        self.config.settings.gaborish = Some(enabled);
        self
    }

    /// Keep color values of fully transparent pixels
    pub fn keep_invisible(mut self, keep: bool) -> Self {
        self.config.settings.keep_invisible = Some(keep);
        self
    }

    /// Butteraugli distance, 0 is lossless and 1 visually lossless
    pub fn distance(mut self, distance: f32) -> Self {
        self.config.distance = distance;
        self
    }

    /// Quality from 0 to 100, converted with [`quality_to_distance`]
    pub fn quality(self, quality: f32) -> Self {
        self.distance(quality_to_distance(quality))
    }

    pub fn bit_depth_type(mut self, bit_depth_type: BitDepthType) -> Self {
        self.config.bit_depth_type = bit_depth_type;
        self
    }

    pub fn color_transform(mut self, transform: ColorTransform) -> Self {
        self.config.settings.color_transform = transform;
        self
    }

    /// Chroma from luma when recompressing JPEG
    pub fn jpeg_recon_cfl(mut self, enabled: bool) -> Self {
        self.config.settings.jpeg_recon_cfl = Some(enabled);
        self
    }

    /// Write a frame index box
    pub fn frame_index_box(mut self, enabled: bool) -> Self {
        self.config.settings.index_box = enabled;
        self
    }

    /// Brotli effort for compressed boxes, 0 to 11
    pub fn brotli_effort(mut self, effort: u32) -> Self {
        self.config.settings.brotli_effort = Some(effort);
        self
    }

    pub fn jpeg_compress_boxes(mut self, enabled: bool) -> Self {
        self.config.settings.jpeg_compress_boxes = Some(enabled);
        self
    }

    pub fn buffering(mut self, buffering: Buffering) -> Self {
        self.config.settings.buffering = buffering;
        self
    }

    pub fn scanline_group_order(mut self) -> Self {
        self.config.settings.group_order = GroupOrder::Scanline;
        self
    }

    /// Center-first group order around (`x`, `y`), `None` meaning the image center
    pub fn centered_group_order(mut self, x: Option<u32>, y: Option<u32>) -> Self {
        self.config.settings.group_order = GroupOrder::Centered { x, y };
        self
    }

    /// Force Modular coding and configure its options
    pub fn with_modular_encoding(self) -> ModularConfigurator<'a> {
        ModularConfigurator::new(self)
    }

    /// Force VarDCT coding and configure its options
    pub fn with_var_dct_encoding(self) -> VarDctConfigurator<'a> {
        VarDctConfigurator::new(self)
    }

    /// Let the engine pick the coding mode; options of both modes are accepted
    pub fn with_auto_encoding(self) -> DualConfigurator<'a> {
        DualConfigurator::new(self)
    }

    /// Set a mode-specific option, failing if the other mode is forced
    pub fn set_strategy_option(mut self, option: StrategyOption) -> JxlResult<Self> {
        self.config.settings.apply(option)?;
        Ok(self)
    }

    /// Declared number of extra channels of the encoder
    pub(crate) fn extra_channel_capacity(&self) -> u32 {
        self.owner.num_extra_channels.unwrap_or(0)
    }

    pub(crate) fn extra_channel_count(&self) -> usize {
        self.config.extra_channels.len()
    }

    pub(crate) fn push_extra_channel(&mut self, channel: ExtraChannel) {
        self.config.extra_channels.push(channel);
    }

    /// Start the next extra channel of this frame
    pub fn new_extra_channel(self) -> JxlResult<ExtraChannelBuilder<'a>> {
        let index = self.extra_channel_count();
        let capacity = self.extra_channel_capacity();
        if index >= capacity as usize {
            return Err(JxlError::ExtraChannelCapacity { index, capacity });
        }
        Ok(ExtraChannelBuilder::new(self))
    }

    pub fn new_named_extra_channel(
        self,
        name: impl Into<String>,
    ) -> JxlResult<ExtraChannelBuilder<'a>> {
        self.new_extra_channel()?.name(name)
    }

    /// Check a buffer of `len` bytes against the frame's data extent
    pub(crate) fn check_data_size(&self, format: &PixelFormat, len: usize) -> JxlResult<()> {
        let xsize = self.owner.xsize.ok_or(JxlError::MissingField("xsize"))?;
        let ysize = self.owner.ysize.ok_or(JxlError::MissingField("ysize"))?;
        let (w, h) = self.config.data_extent(xsize, ysize);
        let expected = format.check_size(w, h, len)?;
        if len > expected {
            debug!(
                "buffer of {} bytes is longer than the {} bytes required, extra bytes are ignored",
                len, expected
            );
        }
        Ok(())
    }

    /// Attach interleaved pixel data and append the frame to the encoder
    pub fn commit(
        self,
        format: PixelFormat,
        data: impl Into<Vec<u8>>,
    ) -> JxlResult<&'a mut Encoder> {
        let data = data.into();
        self.check_data_size(&format, data.len())?;
        let FrameBuilder { owner, config } = self;
        debug!(
            "frame {} committed: {} channel(s) of {:?}, {} bytes",
            owner.frames.len(),
            format.num_channels,
            format.data_type,
            data.len()
        );
        owner.frames.push(Frame {
            config,
            payload: FramePayload::Image(PixelBuffer::new(format, data)),
        });
        Ok(owner)
    }

    /// Commit packed `0xAARRGGBB` pixels as 8-bit RGBA
    pub fn commit_argb(self, pixels: &[u32]) -> JxlResult<&'a mut Encoder> {
        let mut rgba = Vec::with_capacity(pixels.len() * 4);
        for &argb in pixels {
            rgba.extend_from_slice(&argb.rotate_left(8).to_be_bytes());
        }
        self.commit(PixelFormat::new(4, DataType::U8), rgba)
    }

    /// Commit an RGBA image, cut to the crop rectangle when one is set
    ///
    /// The image holds straight alpha, so the encoder must not be set to
    /// premultiplied alpha.
    #[cfg(feature = "image")]
    pub fn commit_image(self, image: &image::RgbaImage) -> JxlResult<&'a mut Encoder> {
        if self.owner.alpha_premultiplied {
            return Err(JxlError::InvalidParameter(
                "RGBA image has straight alpha but the encoder expects premultiplied alpha"
                    .to_string(),
            ));
        }
        let rgba = match self.config.crop {
            Some(crop) => {
                let outside = || {
                    JxlError::InvalidParameter(format!(
                        "crop {}x{} at ({}, {}) lies outside the {}x{} image",
                        crop.xsize,
                        crop.ysize,
                        crop.x0,
                        crop.y0,
                        image.width(),
                        image.height()
                    ))
                };
                let x0 = u32::try_from(crop.x0).map_err(|_| outside())?;
                let y0 = u32::try_from(crop.y0).map_err(|_| outside())?;
                let fits_x = x0.checked_add(crop.xsize).is_some_and(|x1| x1 <= image.width());
                let fits_y = y0.checked_add(crop.ysize).is_some_and(|y1| y1 <= image.height());
                if !fits_x || !fits_y {
                    return Err(outside());
                }
                image::imageops::crop_imm(image, x0, y0, crop.xsize, crop.ysize).to_image()
            }
            None => image.clone(),
        };
        self.commit(PixelFormat::new(4, DataType::U8), rgba.into_raw())
    }

    /// Commit a JPEG bitstream for lossless recompression
    pub fn commit_jpeg(self, jpeg: impl Into<Vec<u8>>) -> JxlResult<&'a mut Encoder> {
        if !self.config.extra_channels.is_empty() {
            return Err(JxlError::JpegWithExtraChannels);
        }
        let jpeg = jpeg.into();
        let FrameBuilder { owner, config } = self;
        debug!(
            "frame {} committed as JPEG, {} bytes",
            owner.frames.len(),
            jpeg.len()
        );
        owner.frames.push(Frame {
            config,
            payload: FramePayload::Jpeg(jpeg),
        });
        Ok(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ProgressiveDc, Strategy};
    use jxl_core::{ColorEncoding, ErrorKind};

    fn encoder(xsize: u32, ysize: u32, extra: u32) -> Encoder {
        let mut encoder = Encoder::new();
        encoder
            .color_encoding(ColorEncoding::srgb())
            .size(xsize, ysize)
            .bits_per_sample(8)
            .num_channels(3, extra)
            .unwrap();
        encoder
    }

    #[test]
    fn test_quality_mapping() {
        assert_eq!(quality_to_distance(100.0), 0.0);
        assert_eq!(quality_to_distance(120.0), 0.0);
        assert_eq!(quality_to_distance(90.0), 1.0);
        assert_eq!(quality_to_distance(0.0), 25.0);
        let at_30 = quality_to_distance(30.0);
        assert!((at_30 - 6.4).abs() < 1e-5);
    }

    #[test]
    fn test_quality_100_is_lossless() {
        let mut enc = encoder(2, 2, 0);
        let frame = enc.new_frame().quality(100.0);
        assert!(frame.config().is_lossless());
        let frame = frame.quality(90.0);
        assert!(!frame.config().is_lossless());
    }

    #[test]
    fn test_commit_checks_size() {
        let mut enc = encoder(4, 4, 0);
        let fmt = PixelFormat::new(3, DataType::U8);
        let err = enc.new_frame().commit(fmt, vec![0u8; 47]).unwrap_err();
        assert!(matches!(
            err,
            JxlError::BufferTooSmall {
                expected: 48,
                actual: 47
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Sizing);
        enc.new_frame().commit(fmt, vec![0u8; 48]).unwrap();
        enc.new_frame().commit(fmt, vec![0u8; 64]).unwrap();
        assert_eq!(enc.frames().len(), 2);
    }

    #[test]
    fn test_size_uses_crop_and_downsampling() {
        let mut enc = encoder(100, 100, 0);
        let fmt = PixelFormat::new(1, DataType::U16).with_align(4);
        // 5 samples of 2 bytes round up to 12 bytes a row
        let frame = enc.new_frame().crop(10, 10, 5, 3);
        assert!(frame.check_data_size(&fmt, 35).is_err());
        assert!(frame.check_data_size(&fmt, 36).is_ok());

        let frame = enc
            .new_frame()
            .resampling(2)
            .already_downsampled(true);
        assert_eq!(frame.config().data_extent(100, 100), (50, 50));
        assert!(frame.check_data_size(&fmt, 100 * 50).is_ok());
    }

    #[test]
    fn test_commit_argb_swizzles() {
        let mut enc = encoder(2, 1, 1);
        enc.new_frame()
            .commit_argb(&[0x80112233, 0xFF445566])
            .unwrap();
        match &enc.frames()[0].payload {
            FramePayload::Image(buf) => {
                assert_eq!(buf.format.num_channels, 4);
                assert_eq!(buf.data, vec![0x11, 0x22, 0x33, 0x80, 0x44, 0x55, 0x66, 0xFF]);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_jpeg_after_extra_channel_rejected() {
        let mut enc = encoder(2, 2, 1);
        let frame = enc
            .new_frame()
            .new_extra_channel()
            .unwrap()
            .bits_per_sample(8)
            .commit(DataType::U8, jxl_core::Endianness::Native, 0, vec![0u8; 4])
            .unwrap();
        let err = frame.commit_jpeg(vec![0xFF, 0xD8]).unwrap_err();
        assert!(matches!(err, JxlError::JpegWithExtraChannels));
        enc.new_frame().commit_jpeg(vec![0xFF, 0xD8]).unwrap();
        assert!(enc.frames()[0].is_jpeg());
    }

    #[test]
    fn test_extra_channel_capacity() {
        let mut enc = encoder(2, 2, 0);
        let err = enc.new_frame().new_extra_channel().unwrap_err();
        assert!(matches!(
            err,
            JxlError::ExtraChannelCapacity {
                index: 0,
                capacity: 0
            }
        ));
    }

    #[test]
    fn test_name_limit() {
        let mut enc = encoder(2, 2, 0);
        assert!(enc.new_named_frame("a".repeat(MAX_NAME_LENGTH)).is_ok());
        assert!(enc.new_named_frame("a".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_reference_slots() {
        let mut enc = encoder(2, 2, 0);
        assert!(enc.new_frame().save_as_reference(3).is_ok());
        assert!(enc.new_frame().save_as_reference(4).is_err());
        assert!(enc.new_frame().blend_source(4).is_err());
    }

    #[test]
    fn test_header_uses_crop() {
        let mut enc = encoder(16, 16, 0);
        let frame = enc
            .new_frame()
            .crop(-2, 3, 4, 5)
            .duration(7)
            .timecode_parts(1, 2, 3, 4)
            .blend_mode(BlendMode::Add);
        let header = frame.config().header(16, 16);
        assert_eq!(header.duration, 7);
        assert_eq!(header.timecode, 0x01020304);
        assert_eq!((header.layer_info.xsize, header.layer_info.ysize), (4, 5));
        assert_eq!(header.layer_info.crop, Some(Crop::new(-2, 3, 4, 5)));
        assert_eq!(header.layer_info.blend_info.mode, BlendMode::Add);
    }

    #[test]
    fn test_strategy_option_on_forced_mode() {
        let mut enc = encoder(2, 2, 0);
        let frame = enc.new_frame().with_modular_encoding().done();
        assert_eq!(frame.config().settings.strategy, Strategy::Modular);
        let err = frame
            .set_strategy_option(StrategyOption::ProgressiveDc(ProgressiveDc::Disable))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
