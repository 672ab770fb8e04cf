//! JPEG XL frame headers
//!
//! The per-frame records pushed to the engine before the frame's pixels: timing,
//! the layer rectangle, and how the layer blends onto the canvas.

/// How a frame or extra channel is combined with what is already on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Replace,
    Add,
    Blend,
    MulAdd,
    Mul,
}

impl BlendMode {
    pub fn to_u32(self) -> u32 {
        match self {
            BlendMode::Replace => 0,
            BlendMode::Add => 1,
            BlendMode::Blend => 2,
            BlendMode::MulAdd => 3,
            BlendMode::Mul => 4,
        }
    }
}

/// Blending information for a frame or an extra channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlendInfo {
    pub mode: BlendMode,
    /// Reference slot blended onto (0-3)
    pub source: u32,
    /// Extra channel index used as alpha by the blend modes that need one
    pub alpha: u32,
    /// Clamp values after blending
    pub clamp: bool,
}

/// Offset and size of a frame that does not cover the whole canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crop {
    pub x0: i32,
    pub y0: i32,
    pub xsize: u32,
    pub ysize: u32,
}

impl Crop {
    pub fn new(x0: i32, y0: i32, xsize: u32, ysize: u32) -> Self {
        Self {
            x0,
            y0,
            xsize,
            ysize,
        }
    }

    /// True when the crop exactly covers an `xsize` x `ysize` canvas
    pub fn covers(&self, xsize: u32, ysize: u32) -> bool {
        self.x0 == 0 && self.y0 == 0 && self.xsize == xsize && self.ysize == ysize
    }
}

/// Layer placement of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerInfo {
    pub crop: Option<Crop>,
    /// Layer width, the crop width or the image width
    pub xsize: u32,
    /// Layer height, the crop height or the image height
    pub ysize: u32,
    /// Reference slot this frame is stored in after decoding
    pub save_as_reference: u32,
    pub blend_info: BlendInfo,
}

/// SMPTE timecode packed as `0xHHMMSSFF`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timecode {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u8,
}

impl Timecode {
    pub fn new(hours: u8, minutes: u8, seconds: u8, frames: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            frames,
        }
    }

    pub fn pack(&self) -> u32 {
        (self.hours as u32) << 24
            | (self.minutes as u32) << 16
            | (self.seconds as u32) << 8
            | self.frames as u32
    }
}

/// Frame header pushed with each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Duration in animation ticks
    pub duration: u32,
    /// Packed SMPTE timecode
    pub timecode: u32,
    pub layer_info: LayerInfo,
}

impl FrameHeader {
    /// Header for a full-canvas frame with replace blending
    pub fn new(xsize: u32, ysize: u32) -> Self {
        Self {
            duration: 0,
            timecode: 0,
            layer_info: LayerInfo {
                crop: None,
                xsize,
                ysize,
                save_as_reference: 0,
                blend_info: BlendInfo::default(),
            },
        }
    }
}
