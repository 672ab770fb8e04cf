//! JPEG XL header records and container framing
//!
//! These are the structures an encoder hands to a codec engine: basic image
//! information, animation and frame headers, extra channel descriptions, and the
//! box types of the ISO/IEC 18181-2 container.

pub mod animation;
pub mod basic_info;
pub mod container;
pub mod frame;

pub use animation::{reduce_ratio, AnimationHeader};
pub use basic_info::{BasicInfo, ExtraChannelInfo, ExtraChannelType, PreviewHeader};
pub use container::{
    BoxType, Container, JxlBox, BRAND_JXL, CODESTREAM_SIGNATURE, CONTAINER_SIGNATURE,
};
pub use frame::{BlendInfo, BlendMode, Crop, FrameHeader, LayerInfo, Timecode};
