//! Pure-Rust codec engine
//!
//! [`BuiltinEngine`] accepts the full call protocol and produces real JPEG XL
//! output for the subset it can express: a single lossless frame of 8 or 16 bit
//! gray or RGB samples, optionally with one alpha channel, in the sRGB color
//! encoding. The codestream itself comes from `zune-jpegxl`; the container
//! boxes around it are written here.
//!
//! Lossy distances are accepted and encoded losslessly, which satisfies any
//! distance bound. Everything outside the subset is reported as
//! [`EngineStatus::NotSupported`] at the call that requests it.

use crate::{
    BitDepthType, CodecEngine, EngineStatus, FrameSettingId, OutputStatus, ParallelRunner,
    SettingsHandle,
};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use jxl_core::consts::{
    EXPERT_EFFORT, MAX_DECODING_SPEED, MAX_DISTANCE, MAX_EFFORT, MIN_DECODING_SPEED, MIN_EFFORT,
};
use jxl_core::{
    ColorSpace, DataType, Endianness, NamedPrimaries, NamedWhitePoint, PixelFormat,
    PrimariesValue, ResolvedColorEncoding, TransferFunction, WhitePointValue,
};
use jxl_headers::{
    BasicInfo, BlendInfo, BoxType, Container, ExtraChannelInfo, ExtraChannelType, FrameHeader,
    JxlBox,
};
use log::{debug, trace};
use zune_core::bit_depth::BitDepth;
use zune_core::colorspace::ColorSpace as ZuneColorSpace;
use zune_core::options::EncoderOptions;
use zune_jpegxl::{JxlEncodeErrors, JxlSimpleEncoder};

#[derive(Debug, Default)]
struct FrameState {
    header: Option<FrameHeader>,
    bit_depth: BitDepthType,
    distance: f32,
    effort: Option<i64>,
    resampling: Option<i64>,
    already_downsampled: bool,
    image: Option<(PixelFormat, Vec<u8>)>,
    extra: Vec<(usize, PixelFormat, Vec<u8>)>,
}

/// Engine backed by the `zune-jpegxl` lossless encoder
#[derive(Debug)]
pub struct BuiltinEngine {
    use_container: Option<bool>,
    level: i32,
    store_jpeg_metadata: bool,
    expert_options: bool,
    boxes_enabled: bool,
    boxes: Vec<JxlBox>,
    info: Option<BasicInfo>,
    color_set: bool,
    runner: Option<ParallelRunner>,
    frames: Vec<FrameState>,
    extra_info: Vec<Option<ExtraChannelInfo>>,
    closed: bool,
    output: Option<Vec<u8>>,
    position: usize,
}

impl Default for BuiltinEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinEngine {
    pub fn new() -> Self {
        Self {
            use_container: None,
            level: -1,
            store_jpeg_metadata: false,
            expert_options: false,
            boxes_enabled: false,
            boxes: Vec::new(),
            info: None,
            color_set: false,
            runner: None,
            frames: Vec::new(),
            extra_info: Vec::new(),
            closed: false,
            output: None,
            position: 0,
        }
    }

    fn frame_mut(&mut self, settings: SettingsHandle) -> Option<&mut FrameState> {
        self.frames.get_mut(settings.0)
    }

    fn wants_container(&self) -> bool {
        self.use_container == Some(true)
            || !self.boxes.is_empty()
            || self.level == 10
            || self.store_jpeg_metadata
    }

    /// Build the complete output file
    fn assemble(&self) -> Result<Vec<u8>, EngineStatus> {
        let info = self.info.as_ref().ok_or(EngineStatus::ApiUsage)?;
        let frame = self
            .frames
            .iter()
            .find(|f| f.image.is_some())
            .ok_or(EngineStatus::ApiUsage)?;
        let (format, data) = frame.image.as_ref().ok_or(EngineStatus::ApiUsage)?;

        let color = info.num_color_channels as usize;
        let interleaved_alpha = format.num_channels as usize == color + 1;
        let alpha = if info.num_extra_channels == 1 {
            if interleaved_alpha {
                Some(AlphaSource::Interleaved)
            } else {
                let (_, fmt, buf) = frame
                    .extra
                    .iter()
                    .find(|(index, _, _)| *index == 0)
                    .ok_or(EngineStatus::ApiUsage)?;
                Some(AlphaSource::Planar(fmt, buf))
            }
        } else {
            None
        };

        let (depth, dst_bytes, dst_max) = if info.bits_per_sample <= 8 {
            (BitDepth::Eight, 1usize, 255.0f64)
        } else {
            (BitDepth::Sixteen, 2usize, 65535.0f64)
        };
        let components = color + usize::from(alpha.is_some());
        let colorspace = match components {
            1 => ZuneColorSpace::Luma,
            2 => ZuneColorSpace::LumaA,
            3 => ZuneColorSpace::RGB,
            _ => ZuneColorSpace::RGBA,
        };

        let width = info.xsize as usize;
        let height = info.ysize as usize;
        let src_bits = match frame.bit_depth {
            BitDepthType::FromPixelFormat => None,
            BitDepthType::FromCodestream => Some(info.bits_per_sample),
        };
        let image_reader = SampleReader::new(format, info.xsize, src_bits)?;
        let alpha_reader = match &alpha {
            Some(AlphaSource::Planar(fmt, _)) => {
                Some(SampleReader::new(fmt, info.xsize, src_bits)?)
            }
            _ => None,
        };

        let row_bytes = width * components * dst_bytes;
        let mut pixels = vec![0u8; row_bytes * height];
        let fill_row = |y: usize, row: &mut [u8]| {
            for x in 0..width {
                for c in 0..components {
                    let norm = if c < color {
                        image_reader.read(data, x, y, c)
                    } else {
                        match (&alpha, &alpha_reader) {
                            (Some(AlphaSource::Planar(_, buf)), Some(reader)) => {
                                reader.read(buf, x, y, 0)
                            }
                            _ => image_reader.read(data, x, y, color),
                        }
                    };
                    let value = (norm.clamp(0.0, 1.0) * dst_max).round();
                    let at = (x * components + c) * dst_bytes;
                    if dst_bytes == 1 {
                        row[at] = value as u8;
                    } else {
                        row[at..at + 2].copy_from_slice(&(value as u16).to_ne_bytes());
                    }
                }
            }
        };
        match &self.runner {
            Some(runner) => runner.for_each_row(&mut pixels, row_bytes, fill_row),
            None => pixels
                .chunks_mut(row_bytes)
                .enumerate()
                .for_each(|(y, row)| fill_row(y, row)),
        }

        if let Some(header) = &frame.header {
            trace!(
                "frame header duration {} timecode {:#010x}",
                header.duration,
                header.timecode
            );
        }
        let effort = frame.effort.unwrap_or(7).clamp(1, 10) as u8;
        if frame.distance > 0.0 {
            debug!(
                "distance {} requested, encoding losslessly",
                frame.distance
            );
        }
        debug!(
            "encoding {}x{} {:?} {:?} at effort {}",
            width, height, colorspace, depth, effort
        );

        let options = EncoderOptions::new(width, height, colorspace, depth).set_effort(effort);
        let mut codestream = Vec::new();
        JxlSimpleEncoder::new(&pixels, options)
            .encode(&mut codestream)
            .map_err(map_zune_error)?;

        if !self.wants_container() {
            return Ok(codestream);
        }

        let mut container = Container::with_file_type();
        if self.level == 10 {
            container.push(JxlBox::level(10));
        }
        for b in &self.boxes {
            container.push(b.clone());
        }
        container.push(JxlBox::codestream(codestream));
        let mut out = Vec::new();
        container.write(&mut out).map_err(|_| EngineStatus::Error)?;
        Ok(out)
    }
}

fn map_zune_error(err: JxlEncodeErrors) -> EngineStatus {
    debug!("codestream encoder failed: {:?}", err);
    match err {
        JxlEncodeErrors::LengthMismatch(..) => EngineStatus::BadInput,
        JxlEncodeErrors::ZeroDimension(_)
        | JxlEncodeErrors::UnsupportedColorspace(_)
        | JxlEncodeErrors::UnsupportedDepth(_)
        | JxlEncodeErrors::TooLargeDimensions(_) => EngineStatus::NotSupported,
        #[allow(unreachable_patterns)]
        _ => EngineStatus::Error,
    }
}

enum AlphaSource<'a> {
    Interleaved,
    Planar(&'a PixelFormat, &'a Vec<u8>),
}

/// Reads normalized samples out of an interleaved buffer
struct SampleReader {
    data_type: DataType,
    endianness: Endianness,
    channels: usize,
    stride: usize,
    max: f64,
}

impl SampleReader {
    fn new(format: &PixelFormat, width: u32, bits: Option<u32>) -> Result<Self, EngineStatus> {
        let stride = format
            .row_bytes(width)
            .ok()
            .and_then(|row| row.checked_mul(format.num_channels.max(1) as usize))
            .ok_or(EngineStatus::BadInput)?;
        let type_max = match format.data_type {
            DataType::U8 => 255.0,
            DataType::U16 => 65535.0,
            DataType::F16 | DataType::F32 => 1.0,
        };
        let max = match bits {
            Some(bits) if !format.data_type.is_float() && bits < 16 => {
                ((1u32 << bits) - 1).max(1) as f64
            }
            _ => type_max,
        };
        Ok(Self {
            data_type: format.data_type,
            endianness: format.endianness.resolve(),
            channels: format.num_channels.max(1) as usize,
            stride,
            max,
        })
    }

    /// Sample `c` of pixel (`x`, `y`), scaled so full range is 1.0
    fn read(&self, data: &[u8], x: usize, y: usize, c: usize) -> f64 {
        let bps = self.data_type.bytes_per_sample();
        let at = y * self.stride + (x * self.channels + c) * bps;
        let bytes = &data[at..at + bps];
        let big = self.endianness == Endianness::Big;
        let raw = match self.data_type {
            DataType::U8 => bytes[0] as f64,
            DataType::U16 if big => BigEndian::read_u16(bytes) as f64,
            DataType::U16 => LittleEndian::read_u16(bytes) as f64,
            DataType::F16 if big => f16_to_f32(BigEndian::read_u16(bytes)) as f64,
            DataType::F16 => f16_to_f32(LittleEndian::read_u16(bytes)) as f64,
            DataType::F32 if big => BigEndian::read_f32(bytes) as f64,
            DataType::F32 => LittleEndian::read_f32(bytes) as f64,
        };
        raw / self.max
    }
}

/// Widen an IEEE 754 binary16 value
fn f16_to_f32(bits: u16) -> f32 {
    let sign = ((bits >> 15) & 1) as u32;
    let exp = ((bits >> 10) & 0x1F) as u32;
    let mant = (bits & 0x3FF) as u32;

    let out = if exp == 0 {
        if mant == 0 {
            sign << 31
        } else {
            // Subnormal: renormalize
            let mut e = 127 - 15 + 1;
            let mut m = mant;
            while m & 0x400 == 0 {
                m <<= 1;
                e -= 1;
            }
            (sign << 31) | ((e as u32) << 23) | ((m & 0x3FF) << 13)
        }
    } else if exp == 0x1F {
        (sign << 31) | 0x7F80_0000 | (mant << 13)
    } else {
        (sign << 31) | ((exp + 127 - 15) << 23) | (mant << 13)
    };
    f32::from_bits(out)
}

fn is_srgb(encoding: &ResolvedColorEncoding) -> bool {
    matches!(encoding.color_space, ColorSpace::Rgb | ColorSpace::Gray)
        && encoding.white_point == WhitePointValue::Named(NamedWhitePoint::D65)
        && encoding.primaries == PrimariesValue::Named(NamedPrimaries::Srgb)
        && encoding.transfer_function == TransferFunction::Srgb
}

impl CodecEngine for BuiltinEngine {
    fn use_container(&mut self, use_container: bool) -> EngineStatus {
        self.use_container = Some(use_container);
        EngineStatus::Success
    }

    fn set_codestream_level(&mut self, level: i32) -> EngineStatus {
        match level {
            -1 | 5 | 10 => {
                self.level = level;
                EngineStatus::Success
            }
            _ => EngineStatus::ApiUsage,
        }
    }

    fn store_jpeg_metadata(&mut self, store: bool) -> EngineStatus {
        self.store_jpeg_metadata = store;
        EngineStatus::Success
    }

    fn allow_expert_options(&mut self) {
        self.expert_options = true;
    }

    fn use_boxes(&mut self) -> EngineStatus {
        self.boxes_enabled = true;
        EngineStatus::Success
    }

    fn add_box(&mut self, box_type: [u8; 4], contents: &[u8], compress: bool) -> EngineStatus {
        if !self.boxes_enabled {
            return EngineStatus::ApiUsage;
        }
        let box_type = BoxType::from_fourcc(&box_type);
        if box_type.is_reserved() {
            return EngineStatus::ApiUsage;
        }
        if compress {
            return EngineStatus::NotSupported;
        }
        trace!("box {} with {} bytes", box_type.fourcc_string(), contents.len());
        self.boxes.push(JxlBox::new(box_type, contents.to_vec()));
        EngineStatus::Success
    }

    fn set_basic_info(&mut self, info: &BasicInfo) -> EngineStatus {
        if info.xsize == 0 || info.ysize == 0 {
            return EngineStatus::ApiUsage;
        }
        if !matches!(info.num_color_channels, 1 | 3) {
            return EngineStatus::ApiUsage;
        }
        if info.have_preview == Some(true)
            || info.is_animated()
            || info.is_float()
            || info.bits_per_sample == 0
            || info.bits_per_sample > 16
            || info.num_extra_channels > 1
        {
            return EngineStatus::NotSupported;
        }
        self.extra_info = vec![None; info.num_extra_channels as usize];
        self.info = Some(info.clone());
        EngineStatus::Success
    }

    fn set_color_encoding(&mut self, encoding: &ResolvedColorEncoding) -> EngineStatus {
        let Some(info) = &self.info else {
            return EngineStatus::ApiUsage;
        };
        let gray = encoding.color_space == ColorSpace::Gray;
        if gray != (info.num_color_channels == 1) {
            return EngineStatus::ApiUsage;
        }
        if !is_srgb(encoding) {
            return EngineStatus::NotSupported;
        }
        self.color_set = true;
        EngineStatus::Success
    }

    fn set_icc_profile(&mut self, icc: &[u8]) -> EngineStatus {
        if self.info.is_none() {
            return EngineStatus::ApiUsage;
        }
        if icc.is_empty() {
            return EngineStatus::BadInput;
        }
        EngineStatus::NotSupported
    }

    fn set_parallel_runner(&mut self, runner: &ParallelRunner) -> EngineStatus {
        self.runner = Some(runner.clone());
        EngineStatus::Success
    }

    fn create_frame_settings(&mut self) -> SettingsHandle {
        self.frames.push(FrameState {
            distance: 1.0,
            ..FrameState::default()
        });
        SettingsHandle(self.frames.len() - 1)
    }

    fn set_frame_header(&mut self, settings: SettingsHandle, header: &FrameHeader) -> EngineStatus {
        let Some(info) = &self.info else {
            return EngineStatus::ApiUsage;
        };
        if let Some(crop) = header.layer_info.crop {
            if !crop.covers(info.xsize, info.ysize) {
                return EngineStatus::NotSupported;
            }
        }
        match self.frame_mut(settings) {
            Some(frame) => {
                frame.header = Some(*header);
                EngineStatus::Success
            }
            None => EngineStatus::ApiUsage,
        }
    }

    fn set_frame_name(&mut self, settings: SettingsHandle, name: &str) -> EngineStatus {
        if self.frame_mut(settings).is_none() {
            return EngineStatus::ApiUsage;
        }
        debug!("frame name {:?} is not stored in the codestream", name);
        EngineStatus::Success
    }

    fn set_frame_bit_depth(
        &mut self,
        settings: SettingsHandle,
        depth: BitDepthType,
    ) -> EngineStatus {
        match self.frame_mut(settings) {
            Some(frame) => {
                frame.bit_depth = depth;
                EngineStatus::Success
            }
            None => EngineStatus::ApiUsage,
        }
    }

    fn set_frame_lossless(&mut self, settings: SettingsHandle, lossless: bool) -> EngineStatus {
        match self.frame_mut(settings) {
            Some(frame) => {
                if lossless {
                    frame.distance = 0.0;
                }
                EngineStatus::Success
            }
            None => EngineStatus::ApiUsage,
        }
    }

    fn set_frame_distance(&mut self, settings: SettingsHandle, distance: f32) -> EngineStatus {
        if !(0.0..=MAX_DISTANCE).contains(&distance) {
            return EngineStatus::ApiUsage;
        }
        match self.frame_mut(settings) {
            Some(frame) => {
                frame.distance = distance;
                EngineStatus::Success
            }
            None => EngineStatus::ApiUsage,
        }
    }

    fn set_option(
        &mut self,
        settings: SettingsHandle,
        id: FrameSettingId,
        value: i64,
    ) -> EngineStatus {
        let expert = self.expert_options;
        let Some(frame) = self.frame_mut(settings) else {
            return EngineStatus::ApiUsage;
        };
        match id {
            FrameSettingId::Effort => {
                if value < MIN_EFFORT as i64 || value > MAX_EFFORT as i64 {
                    return EngineStatus::ApiUsage;
                }
                if value >= EXPERT_EFFORT as i64 && !expert {
                    return EngineStatus::ApiUsage;
                }
                frame.effort = Some(value);
            }
            FrameSettingId::DecodingSpeed => {
                if value < MIN_DECODING_SPEED as i64 || value > MAX_DECODING_SPEED as i64 {
                    return EngineStatus::ApiUsage;
                }
            }
            FrameSettingId::Resampling => frame.resampling = Some(value),
            FrameSettingId::AlreadyDownsampled => frame.already_downsampled = value > 0,
            FrameSettingId::Buffering => return EngineStatus::NotSupported,
            _ => trace!("option {:?} = {} has no effect on lossless output", id, value),
        }
        if frame.already_downsampled && frame.resampling.is_some_and(|factor| factor > 1) {
            debug!("already downsampled input cannot be upsampled");
            return EngineStatus::NotSupported;
        }
        EngineStatus::Success
    }

    fn set_float_option(
        &mut self,
        settings: SettingsHandle,
        id: FrameSettingId,
        value: f32,
    ) -> EngineStatus {
        if self.frame_mut(settings).is_none() {
            return EngineStatus::ApiUsage;
        }
        trace!("float option {:?} = {} has no effect on lossless output", id, value);
        EngineStatus::Success
    }

    fn set_extra_channel_info(&mut self, index: usize, info: &ExtraChannelInfo) -> EngineStatus {
        let Some(slot) = self.extra_info.get_mut(index) else {
            return EngineStatus::ApiUsage;
        };
        if info.channel_type != ExtraChannelType::Alpha || info.exponent_bits_per_sample > 0 {
            return EngineStatus::NotSupported;
        }
        *slot = Some(info.clone());
        EngineStatus::Success
    }

    fn set_extra_channel_blend_info(
        &mut self,
        settings: SettingsHandle,
        index: usize,
        _blend_info: &BlendInfo,
    ) -> EngineStatus {
        if index >= self.extra_info.len() || self.frame_mut(settings).is_none() {
            return EngineStatus::ApiUsage;
        }
        EngineStatus::Success
    }

    fn set_extra_channel_name(&mut self, index: usize, name: &str) -> EngineStatus {
        if index >= self.extra_info.len() {
            return EngineStatus::ApiUsage;
        }
        debug!("extra channel {} name {:?} is not stored", index, name);
        EngineStatus::Success
    }

    fn add_image_frame(
        &mut self,
        settings: SettingsHandle,
        format: &PixelFormat,
        data: &[u8],
    ) -> EngineStatus {
        let Some(info) = &self.info else {
            return EngineStatus::ApiUsage;
        };
        if !self.color_set || self.closed {
            return EngineStatus::ApiUsage;
        }
        let color = info.num_color_channels;
        let channels_ok = format.num_channels == color
            || (format.num_channels == color + 1 && info.num_extra_channels == 1);
        if !channels_ok {
            return EngineStatus::ApiUsage;
        }
        match format.required_size(info.xsize, info.ysize) {
            Ok(needed) if data.len() >= needed => {}
            _ => return EngineStatus::BadInput,
        }
        if self.frames.iter().any(|f| f.image.is_some()) {
            return EngineStatus::NotSupported;
        }
        let Some(frame) = self.frame_mut(settings) else {
            return EngineStatus::ApiUsage;
        };
        frame.image = Some((*format, data.to_vec()));
        EngineStatus::Success
    }

    fn add_jpeg_frame(&mut self, settings: SettingsHandle, data: &[u8]) -> EngineStatus {
        if self.frame_mut(settings).is_none() {
            return EngineStatus::ApiUsage;
        }
        debug!("JPEG recompression of {} bytes is not supported", data.len());
        EngineStatus::NotSupported
    }

    fn set_extra_channel_buffer(
        &mut self,
        settings: SettingsHandle,
        format: &PixelFormat,
        data: &[u8],
        index: usize,
    ) -> EngineStatus {
        let Some(info) = &self.info else {
            return EngineStatus::ApiUsage;
        };
        if index >= self.extra_info.len() {
            return EngineStatus::ApiUsage;
        }
        let single = PixelFormat { num_channels: 1, ..*format };
        match single.required_size(info.xsize, info.ysize) {
            Ok(needed) if data.len() >= needed => {}
            _ => return EngineStatus::BadInput,
        }
        let Some(frame) = self.frame_mut(settings) else {
            return EngineStatus::ApiUsage;
        };
        frame.extra.push((index, single, data.to_vec()));
        EngineStatus::Success
    }

    fn close_input(&mut self) {
        self.closed = true;
    }

    fn process_output(&mut self, out: &mut [u8]) -> (OutputStatus, usize) {
        if !self.closed {
            return (OutputStatus::Error(EngineStatus::ApiUsage), 0);
        }
        if self.output.is_none() {
            match self.assemble() {
                Ok(bytes) => {
                    debug!("builtin engine produced {} bytes", bytes.len());
                    self.output = Some(bytes);
                }
                Err(status) => return (OutputStatus::Error(status), 0),
            }
        }
        let Some(output) = &self.output else {
            return (OutputStatus::Error(EngineStatus::Error), 0);
        };
        let remaining = &output[self.position..];
        let n = remaining.len().min(out.len());
        out[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        if self.position == output.len() {
            (OutputStatus::Success, n)
        } else {
            (OutputStatus::NeedMoreOutput, n)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jxl_core::ColorEncoding;
    use jxl_headers::CODESTREAM_SIGNATURE;

    fn drain(engine: &mut BuiltinEngine) -> Result<Vec<u8>, EngineStatus> {
        let mut buf = [0u8; 64];
        let mut out = Vec::new();
        loop {
            let (status, n) = engine.process_output(&mut buf);
            out.extend_from_slice(&buf[..n]);
            match status {
                OutputStatus::Success => return Ok(out),
                OutputStatus::NeedMoreOutput => {}
                OutputStatus::Error(e) => return Err(e),
            }
        }
    }

    fn rgb_engine(w: u32, h: u32) -> (BuiltinEngine, SettingsHandle) {
        let mut engine = BuiltinEngine::new();
        assert_eq!(engine.set_basic_info(&BasicInfo::new(w, h)), EngineStatus::Success);
        let srgb = ColorEncoding::srgb().resolve().unwrap();
        assert_eq!(engine.set_color_encoding(&srgb), EngineStatus::Success);
        let settings = engine.create_frame_settings();
        (engine, settings)
    }

    #[test]
    fn test_f16_conversion() {
        assert_eq!(f16_to_f32(0x0000), 0.0);
        assert_eq!(f16_to_f32(0x3C00), 1.0);
        assert_eq!(f16_to_f32(0xC000), -2.0);
        assert_eq!(f16_to_f32(0x3800), 0.5);
        assert_eq!(f16_to_f32(0x7BFF), 65504.0);
        assert_eq!(f16_to_f32(0x0001), 2f32.powi(-24));
        assert!(f16_to_f32(0x7C00).is_infinite());
    }

    #[test]
    fn test_naked_codestream_output() {
        let (mut engine, settings) = rgb_engine(4, 4);
        let data: Vec<u8> = (0..48).map(|i| (i * 5) as u8).collect();
        let fmt = PixelFormat::new(3, DataType::U8);
        assert_eq!(engine.add_image_frame(settings, &fmt, &data), EngineStatus::Success);
        engine.close_input();
        let out = drain(&mut engine).unwrap();
        assert_eq!(&out[..2], &CODESTREAM_SIGNATURE);
    }

    #[test]
    fn test_boxes_force_container() {
        let mut engine = BuiltinEngine::new();
        assert_eq!(engine.add_box(*b"Exif", &[0; 4], false), EngineStatus::ApiUsage);
        assert_eq!(engine.use_boxes(), EngineStatus::Success);
        assert_eq!(engine.add_box(*b"jxlc", &[], false), EngineStatus::ApiUsage);
        assert_eq!(engine.add_box(*b"Exif", &[0; 4], true), EngineStatus::NotSupported);
        assert_eq!(engine.add_box(*b"Exif", &[0; 4], false), EngineStatus::Success);
        assert!(engine.wants_container());
    }

    #[test]
    fn test_unsupported_requests() {
        let (mut engine, settings) = rgb_engine(4, 4);
        assert_eq!(engine.add_jpeg_frame(settings, &[0xFF, 0xD8]), EngineStatus::NotSupported);
        assert_eq!(
            engine.set_option(settings, FrameSettingId::Buffering, 1),
            EngineStatus::NotSupported
        );
        let mut float_info = BasicInfo::new(4, 4);
        float_info.exponent_bits_per_sample = 8;
        assert_eq!(BuiltinEngine::new().set_basic_info(&float_info), EngineStatus::NotSupported);
    }

    #[test]
    fn test_downsampled_input_not_supported() {
        let (mut engine, settings) = rgb_engine(4, 4);
        let resampling = FrameSettingId::Resampling;
        let downsampled = FrameSettingId::AlreadyDownsampled;
        assert_eq!(engine.set_option(settings, resampling, 2), EngineStatus::Success);
        assert_eq!(engine.set_option(settings, downsampled, 0), EngineStatus::Success);
        assert_eq!(engine.set_option(settings, downsampled, 1), EngineStatus::NotSupported);

        let (mut engine, settings) = rgb_engine(4, 4);
        assert_eq!(engine.set_option(settings, resampling, 1), EngineStatus::Success);
        assert_eq!(engine.set_option(settings, downsampled, 1), EngineStatus::Success);
    }

    #[test]
    fn test_effort_validation() {
        let (mut engine, settings) = rgb_engine(4, 4);
        assert_eq!(engine.set_option(settings, FrameSettingId::Effort, 0), EngineStatus::ApiUsage);
        assert_eq!(engine.set_option(settings, FrameSettingId::Effort, 10), EngineStatus::ApiUsage);
        engine.allow_expert_options();
        assert_eq!(engine.set_option(settings, FrameSettingId::Effort, 10), EngineStatus::Success);
        assert_eq!(
            engine.set_option(settings, FrameSettingId::DecodingSpeed, 5),
            EngineStatus::ApiUsage
        );
    }

    #[test]
    fn test_gray_mismatch_is_api_usage() {
        let mut engine = BuiltinEngine::new();
        engine.set_basic_info(&BasicInfo::new(4, 4));
        let gray = jxl_core::PredefinedColorEncoding::SrgbGray.resolve();
        assert_eq!(engine.set_color_encoding(&gray), EngineStatus::ApiUsage);
    }

    #[test]
    fn test_short_buffer_is_bad_input() {
        let (mut engine, settings) = rgb_engine(4, 4);
        let fmt = PixelFormat::new(3, DataType::U8);
        assert_eq!(engine.add_image_frame(settings, &fmt, &[0; 47]), EngineStatus::BadInput);
    }

    #[test]
    fn test_sixteen_bit_big_endian_with_planar_alpha() {
        let mut engine = BuiltinEngine::new();
        let mut info = BasicInfo::new(3, 2);
        info.bits_per_sample = 16;
        info.num_extra_channels = 1;
        info.alpha_bits = Some(16);
        assert_eq!(engine.set_basic_info(&info), EngineStatus::Success);
        let srgb = ColorEncoding::srgb().resolve().unwrap();
        assert_eq!(engine.set_color_encoding(&srgb), EngineStatus::Success);
        let settings = engine.create_frame_settings();
        assert_eq!(
            engine.set_extra_channel_info(0, &ExtraChannelInfo::new(ExtraChannelType::Alpha, 16)),
            EngineStatus::Success
        );
        let fmt = PixelFormat::new(3, DataType::U16).with_endianness(Endianness::Big);
        let rgb = vec![0x12u8; 3 * 2 * 3 * 2];
        assert_eq!(engine.add_image_frame(settings, &fmt, &rgb), EngineStatus::Success);
        let alpha_fmt = PixelFormat::new(1, DataType::U16).with_endianness(Endianness::Big);
        assert_eq!(
            engine.set_extra_channel_buffer(settings, &alpha_fmt, &[0xFF; 12], 0),
            EngineStatus::Success
        );
        engine.close_input();
        let out = drain(&mut engine).unwrap();
        assert_eq!(&out[..2], &CODESTREAM_SIGNATURE);
    }
}
