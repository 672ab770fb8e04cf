//! # JPEG XL encoder builder
//!
//! Describe an image through staged builders, validate the description, and
//! drive a codec engine through its call sequence to produce a JPEG XL file.
//!
//! ## Quick Start
//!
//! ```no_run
//! use jxl::{ColorEncoding, DataType, Encoder, ParallelRunner, PixelFormat};
//!
//! # fn main() -> jxl::JxlResult<()> {
//! let runner = ParallelRunner::new()?;
//! let mut encoder = Encoder::new();
//! encoder
//!     .color_encoding(ColorEncoding::srgb())
//!     .size(800, 600)
//!     .bits_per_sample(8)
//!     .num_channels(3, 0)?;
//! encoder
//!     .new_frame()
//!     .quality(90.0)
//!     .effort(7)
//!     .commit(PixelFormat::new(3, DataType::U8), vec![0u8; 800 * 600 * 3])?;
//! let bytes = encoder.encode(&runner)?;
//! std::fs::write("output.jxl", bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Engines
//!
//! [`Encoder::encode`] uses the built-in pure Rust engine, which writes
//! lossless files. Any other [`CodecEngine`] can be plugged in through
//! [`Encoder::encode_with`]; [`RecordingEngine`] records the calls it receives
//! instead of encoding.
//!
//! ## Architecture
//!
//! - `jxl-core`: errors, constants, sample formats, color encodings
//! - `jxl-headers`: engine-facing header records and container boxes
//! - `jxl-engine`: the engine contract, the built-in and recording engines, and the parallel runner
//! - `jxl-encoder`: the builders and the commit protocol

pub use jxl_core::consts;
pub use jxl_core::{
    ColorEncoding, ColorSpace, CustomColorEncoding, DataType, Dimensions, Endianness,
    EngineFailure, ErrorKind, JxlError, JxlResult, Orientation, PixelBuffer, PixelFormat,
    PredefinedColorEncoding, Primaries, RenderingIntent, TransferFunction, WhitePoint,
};

pub use jxl_headers::{
    AnimationHeader, BasicInfo, BlendInfo, BlendMode, BoxType, Container, Crop, ExtraChannelInfo,
    ExtraChannelType, FrameHeader, JxlBox, PreviewHeader, Timecode, CODESTREAM_SIGNATURE,
    CONTAINER_SIGNATURE,
};

pub use jxl_engine::{
    BitDepthType, BuiltinEngine, CallLog, CodecEngine, EngineCall, EngineStatus, FrameSettingId,
    OutputStatus, ParallelRunner, RecordingEngine, SettingsHandle,
};

pub use jxl_encoder::{
    check, quality_to_distance, AnimationConfigurator, BoxBuilder, Buffering, ColorTransform,
    DualConfigurator, Encoder, EpfMode, ExtraChannelBuilder, FrameBuilder, GroupOrder,
    ModularConfigurator, ModularGroupSize, ModularPredictor, ProgressiveDc, Strategy,
    StrategyOption, TimeUnit, VarDctConfigurator,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// JPEG XL standard this crate writes
pub const SPEC_VERSION: &str = "ISO/IEC 18181:2022";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_encoder_reexport() {
        let mut encoder = Encoder::new();
        encoder
            .color_encoding(ColorEncoding::srgb())
            .size(100, 100)
            .bits_per_sample(8)
            .num_channels(3, 0)
            .unwrap();
        let info = encoder.basic_info().unwrap();
        assert_eq!((info.xsize, info.ysize), (100, 100));
    }
}
