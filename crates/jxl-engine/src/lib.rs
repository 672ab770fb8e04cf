//! Codec engine contract for the JPEG XL encoder builder
//!
//! An encoder drives a [`CodecEngine`] through a fixed call sequence:
//! global flags, boxes, basic info, color encoding, parallel runner, then per
//! frame settings and pixel data, and finally `close_input` followed by
//! `process_output` until the engine reports success.
//!
//! Every fallible call returns an [`EngineStatus`]. Translating a status into a
//! [`jxl_core::JxlError`] is the caller's job.
//!
//! Two engines ship with this crate:
//! - [`BuiltinEngine`]: pure Rust, writes real (lossless) JPEG XL files
//! - [`RecordingEngine`]: records every call, for dry runs and protocol checks

pub mod builtin;
pub mod recording;
pub mod runner;

use jxl_core::{PixelFormat, ResolvedColorEncoding};
use jxl_headers::{BasicInfo, BlendInfo, ExtraChannelInfo, FrameHeader};

pub use builtin::BuiltinEngine;
pub use recording::{CallLog, EngineCall, RecordingEngine};
pub use runner::ParallelRunner;

/// Status code returned by engine calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Success,
    /// Generic failure
    Error,
    OutOfMemory,
    /// JPEG reconstruction data does not fit
    JpegReconstruction,
    /// Input is invalid or corrupt
    BadInput,
    /// Requested option is not supported
    NotSupported,
    /// Calls were made in the wrong order or with inconsistent arguments
    ApiUsage,
    Unknown(u32),
}

impl EngineStatus {
    pub fn code(&self) -> u32 {
        match self {
            EngineStatus::Success => 0x00,
            EngineStatus::Error => 0x01,
            EngineStatus::OutOfMemory => 0x02,
            EngineStatus::JpegReconstruction => 0x03,
            EngineStatus::BadInput => 0x04,
            EngineStatus::NotSupported => 0x80,
            EngineStatus::ApiUsage => 0x81,
            EngineStatus::Unknown(code) => *code,
        }
    }

    pub fn from_code(code: u32) -> Self {
        match code {
            0x00 => EngineStatus::Success,
            0x01 => EngineStatus::Error,
            0x02 => EngineStatus::OutOfMemory,
            0x03 => EngineStatus::JpegReconstruction,
            0x04 => EngineStatus::BadInput,
            0x80 => EngineStatus::NotSupported,
            0x81 => EngineStatus::ApiUsage,
            other => EngineStatus::Unknown(other),
        }
    }

    pub fn is_success(&self) -> bool {
        *self == EngineStatus::Success
    }
}

/// Result of one `process_output` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStatus {
    /// All output has been produced
    Success,
    /// The buffer was filled, call again
    NeedMoreOutput,
    Error(EngineStatus),
}

/// Opaque handle to per-frame settings created by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SettingsHandle(pub usize);

/// How the engine interprets the sample values of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepthType {
    /// Full range of the pixel format's sample type
    #[default]
    FromPixelFormat,
    /// Range given by the image's declared bits per sample
    FromCodestream,
}

/// Named per-frame tuning options and their engine ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSettingId {
    Effort,
    DecodingSpeed,
    Resampling,
    ExtraChannelResampling,
    AlreadyDownsampled,
    PhotonNoise,
    Dots,
    Patches,
    Epf,
    Gaborish,
    Modular,
    KeepInvisible,
    GroupOrder,
    GroupOrderCenterX,
    GroupOrderCenterY,
    Responsive,
    ProgressiveAc,
    QProgressiveAc,
    ProgressiveDc,
    ChannelColorsGlobalPercent,
    ChannelColorsGroupPercent,
    PaletteColors,
    LossyPalette,
    ColorTransform,
    ModularColorSpace,
    ModularGroupSize,
    ModularPredictor,
    ModularMaTreeLearningPercent,
    ModularNbPrevChannels,
    JpegReconCfl,
    IndexBox,
    BrotliEffort,
    JpegCompressBoxes,
    Buffering,
}

impl FrameSettingId {
    pub fn id(&self) -> u32 {
        match self {
            FrameSettingId::Effort => 0,
            FrameSettingId::DecodingSpeed => 1,
            FrameSettingId::Resampling => 2,
            FrameSettingId::ExtraChannelResampling => 3,
            FrameSettingId::AlreadyDownsampled => 4,
            FrameSettingId::PhotonNoise => 5,
            FrameSettingId::Dots => 7,
            FrameSettingId::Patches => 8,
            FrameSettingId::Epf => 9,
            FrameSettingId::Gaborish => 10,
            FrameSettingId::Modular => 11,
            FrameSettingId::KeepInvisible => 12,
            FrameSettingId::GroupOrder => 13,
            FrameSettingId::GroupOrderCenterX => 14,
            FrameSettingId::GroupOrderCenterY => 15,
            FrameSettingId::Responsive => 16,
            FrameSettingId::ProgressiveAc => 17,
            FrameSettingId::QProgressiveAc => 18,
            FrameSettingId::ProgressiveDc => 19,
            FrameSettingId::ChannelColorsGlobalPercent => 20,
            FrameSettingId::ChannelColorsGroupPercent => 21,
            FrameSettingId::PaletteColors => 22,
            FrameSettingId::LossyPalette => 23,
            FrameSettingId::ColorTransform => 24,
            FrameSettingId::ModularColorSpace => 25,
            FrameSettingId::ModularGroupSize => 26,
            FrameSettingId::ModularPredictor => 27,
            FrameSettingId::ModularMaTreeLearningPercent => 28,
            FrameSettingId::ModularNbPrevChannels => 29,
            FrameSettingId::JpegReconCfl => 30,
            FrameSettingId::IndexBox => 31,
            FrameSettingId::BrotliEffort => 32,
            FrameSettingId::JpegCompressBoxes => 33,
            FrameSettingId::Buffering => 34,
        }
    }
}

/// The operations an encoder issues against a codec engine
///
/// Creation happens before the first call and destruction is `Drop`.
pub trait CodecEngine {
    fn use_container(&mut self, use_container: bool) -> EngineStatus;
    /// -1 lets the engine choose, otherwise 5 or 10
    fn set_codestream_level(&mut self, level: i32) -> EngineStatus;
    fn store_jpeg_metadata(&mut self, store: bool) -> EngineStatus;
    fn allow_expert_options(&mut self);

    fn use_boxes(&mut self) -> EngineStatus;
    fn add_box(&mut self, box_type: [u8; 4], contents: &[u8], compress: bool) -> EngineStatus;

    fn set_basic_info(&mut self, info: &BasicInfo) -> EngineStatus;
    fn set_color_encoding(&mut self, encoding: &ResolvedColorEncoding) -> EngineStatus;
    fn set_icc_profile(&mut self, icc: &[u8]) -> EngineStatus;
    fn set_parallel_runner(&mut self, runner: &ParallelRunner) -> EngineStatus;

    fn create_frame_settings(&mut self) -> SettingsHandle;
    fn set_frame_header(&mut self, settings: SettingsHandle, header: &FrameHeader)
        -> EngineStatus;
    fn set_frame_name(&mut self, settings: SettingsHandle, name: &str) -> EngineStatus;
    fn set_frame_bit_depth(&mut self, settings: SettingsHandle, depth: BitDepthType)
        -> EngineStatus;
    fn set_frame_lossless(&mut self, settings: SettingsHandle, lossless: bool) -> EngineStatus;
    fn set_frame_distance(&mut self, settings: SettingsHandle, distance: f32) -> EngineStatus;
    fn set_option(&mut self, settings: SettingsHandle, id: FrameSettingId, value: i64)
        -> EngineStatus;
    fn set_float_option(
        &mut self,
        settings: SettingsHandle,
        id: FrameSettingId,
        value: f32,
    ) -> EngineStatus;

    fn set_extra_channel_info(&mut self, index: usize, info: &ExtraChannelInfo) -> EngineStatus;
    fn set_extra_channel_blend_info(
        &mut self,
        settings: SettingsHandle,
        index: usize,
        blend_info: &BlendInfo,
    ) -> EngineStatus;
    fn set_extra_channel_name(&mut self, index: usize, name: &str) -> EngineStatus;

    fn add_image_frame(
        &mut self,
        settings: SettingsHandle,
        format: &PixelFormat,
        data: &[u8],
    ) -> EngineStatus;
    fn add_jpeg_frame(&mut self, settings: SettingsHandle, data: &[u8]) -> EngineStatus;
    fn set_extra_channel_buffer(
        &mut self,
        settings: SettingsHandle,
        format: &PixelFormat,
        data: &[u8],
        index: usize,
    ) -> EngineStatus;

    fn close_input(&mut self);
    /// Fill `out` with encoded bytes, returning the status and the byte count written
    fn process_output(&mut self, out: &mut [u8]) -> (OutputStatus, usize);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        for code in [0x00, 0x01, 0x02, 0x03, 0x04, 0x80, 0x81, 0x42] {
            assert_eq!(EngineStatus::from_code(code).code(), code);
        }
        assert_eq!(EngineStatus::from_code(0x42), EngineStatus::Unknown(0x42));
        assert!(EngineStatus::Success.is_success());
    }

    #[test]
    fn test_frame_setting_ids() {
        assert_eq!(FrameSettingId::Effort.id(), 0);
        assert_eq!(FrameSettingId::Dots.id(), 7);
        assert_eq!(FrameSettingId::ProgressiveDc.id(), 19);
        assert_eq!(FrameSettingId::IndexBox.id(), 31);
        assert_eq!(FrameSettingId::Buffering.id(), 34);
    }
}
