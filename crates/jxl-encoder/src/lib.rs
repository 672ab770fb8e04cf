//! JPEG XL encoder builder
//!
//! An [`Encoder`] collects everything about an image: geometry, color
//! encoding, metadata boxes and frames. Frames and extra channels are staged
//! through builders that borrow the encoder and hand it back on commit.
//! Encoding validates the description and then drives a codec engine through
//! the commit protocol.
//!
//! ```no_run
//! use jxl_core::{ColorEncoding, DataType, PixelFormat};
//! use jxl_encoder::Encoder;
//! use jxl_engine::ParallelRunner;
//!
//! # fn main() -> jxl_core::JxlResult<()> {
//! let mut encoder = Encoder::new();
//! encoder
//!     .color_encoding(ColorEncoding::srgb())
//!     .size(4, 4)
//!     .bits_per_sample(8)
//!     .num_channels(3, 0)?;
//! encoder
//!     .new_frame()
//!     .distance(1.0)
//!     .commit(PixelFormat::new(3, DataType::U8), vec![0u8; 48])?;
//! let bytes = encoder.encode(&ParallelRunner::new()?)?;
//! # Ok(())
//! # }
//! ```

pub mod boxes;
pub mod commit;
pub mod encoder;
pub mod extra_channel;
pub mod frame;
pub mod options;
pub mod strategy;

pub use boxes::{BoxBuilder, MetadataBox};
pub use commit::check;
pub use encoder::{AnimationConfigurator, Encoder, TimeUnit};
pub use extra_channel::{ExtraChannel, ExtraChannelBuilder};
pub use frame::{quality_to_distance, Frame, FrameBuilder, FrameConfig, FramePayload};
pub use options::{
    Buffering, ColorTransform, EpfMode, FrameSettings, GroupOrder, ModularGroupSize,
    ModularPredictor, OptionValue, ProgressiveDc, Strategy, StrategyOption,
};
pub use strategy::{DualConfigurator, ModularConfigurator, VarDctConfigurator};
