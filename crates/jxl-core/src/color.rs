//! Color encoding model
//!
//! An image is described either by one of the predefined encodings, by a custom
//! combination of color space, white point, primaries, transfer function and
//! rendering intent, or by a raw ICC profile passed through verbatim.
//!
//! Custom white points and primaries that equal one of the named constants are
//! resolved to the named form before they reach the engine; anything else is
//! sent as explicit CIE xy values.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Predefined color encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PredefinedColorEncoding {
    LinearSrgb,
    LinearSrgbGray,
    Srgb,
    SrgbGray,
}

impl PredefinedColorEncoding {
    pub fn is_gray(&self) -> bool {
        matches!(
            self,
            PredefinedColorEncoding::LinearSrgbGray | PredefinedColorEncoding::SrgbGray
        )
    }

    /// Expand into explicit fields with the relative rendering intent
    pub fn resolve(&self) -> ResolvedColorEncoding {
        let (color_space, transfer_function) = match self {
            PredefinedColorEncoding::LinearSrgb => (ColorSpace::Rgb, TransferFunction::Linear),
            PredefinedColorEncoding::LinearSrgbGray => {
                (ColorSpace::Gray, TransferFunction::Linear)
            }
            PredefinedColorEncoding::Srgb => (ColorSpace::Rgb, TransferFunction::Srgb),
            PredefinedColorEncoding::SrgbGray => (ColorSpace::Gray, TransferFunction::Srgb),
        };
        ResolvedColorEncoding {
            color_space,
            white_point: WhitePointValue::Named(NamedWhitePoint::D65),
            primaries: PrimariesValue::Named(NamedPrimaries::Srgb),
            transfer_function,
            rendering_intent: RenderingIntent::Relative,
        }
    }
}

/// Color space of a custom encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColorSpace {
    Rgb,
    Gray,
    Xyb,
    Unknown,
}

/// CIE xy white point
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WhitePoint {
    pub x: f64,
    pub y: f64,
}

impl WhitePoint {
    /// CIE Standard Illuminant D65
    pub const D65: WhitePoint = WhitePoint {
        x: 0.3127,
        y: 0.3290,
    };
    /// CIE Standard Illuminant E (equal energy)
    pub const E: WhitePoint = WhitePoint {
        x: 1.0 / 3.0,
        y: 1.0 / 3.0,
    };
    /// DCI-P3 from SMPTE RP 431-2
    pub const DCI: WhitePoint = WhitePoint { x: 0.314, y: 0.351 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn resolve(&self) -> WhitePointValue {
        if *self == Self::D65 {
            WhitePointValue::Named(NamedWhitePoint::D65)
        } else if *self == Self::E {
            WhitePointValue::Named(NamedWhitePoint::E)
        } else if *self == Self::DCI {
            WhitePointValue::Named(NamedWhitePoint::Dci)
        } else {
            WhitePointValue::Custom(*self)
        }
    }
}

/// CIE xy coordinates of the red, green and blue primaries
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Primaries {
    pub red: (f64, f64),
    pub green: (f64, f64),
    pub blue: (f64, f64),
}

impl Primaries {
    /// Primaries of IEC 61966-2-1 sRGB
    pub const SRGB: Primaries = Primaries {
        red: (0.639998686, 0.330010138),
        green: (0.300003784, 0.600003357),
        blue: (0.150002046, 0.059997204),
    };
    /// Primaries of Rec. ITU-R BT.2100-1
    pub const BT2100: Primaries = Primaries {
        red: (0.708, 0.292),
        green: (0.170, 0.797),
        blue: (0.131, 0.046),
    };
    /// Primaries of SMPTE RP 431-2
    pub const P3: Primaries = Primaries {
        red: (0.680, 0.320),
        green: (0.265, 0.690),
        blue: (0.150, 0.060),
    };

    pub fn new(red: (f64, f64), green: (f64, f64), blue: (f64, f64)) -> Self {
        Self { red, green, blue }
    }

    fn resolve(&self) -> PrimariesValue {
        if *self == Self::SRGB {
            PrimariesValue::Named(NamedPrimaries::Srgb)
        } else if *self == Self::BT2100 {
            PrimariesValue::Named(NamedPrimaries::Bt2100)
        } else if *self == Self::P3 {
            PrimariesValue::Named(NamedPrimaries::P3)
        } else {
            PrimariesValue::Custom(*self)
        }
    }
}

/// Transfer function of a custom encoding
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TransferFunction {
    /// SMPTE RP 431-2 / BT.709
    Bt709,
    Linear,
    /// IEC 61966-2-1 sRGB
    Srgb,
    /// SMPTE ST 2084
    Pq,
    /// SMPTE ST 428-1
    Dci,
    /// Rec. ITU-R BT.2100-1 hybrid log-gamma
    Hlg,
    /// Power law with the given gamma
    Gamma(f64),
    /// None of the other options describe the transfer function
    Unknown,
}

/// Rendering intent of a custom encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RenderingIntent {
    Perceptual,
    Relative,
    Saturation,
    Absolute,
}

/// A custom color encoding
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CustomColorEncoding {
    pub color_space: ColorSpace,
    pub white_point: WhitePoint,
    pub primaries: Primaries,
    pub transfer_function: TransferFunction,
    pub rendering_intent: RenderingIntent,
}

impl CustomColorEncoding {
    pub fn resolve(&self) -> ResolvedColorEncoding {
        ResolvedColorEncoding {
            color_space: self.color_space,
            white_point: self.white_point.resolve(),
            primaries: self.primaries.resolve(),
            transfer_function: self.transfer_function,
            rendering_intent: self.rendering_intent,
        }
    }
}

/// The color encoding of an image
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColorEncoding {
    Predefined(PredefinedColorEncoding),
    Custom(CustomColorEncoding),
    /// Raw ICC profile bytes
    Icc(Vec<u8>),
}

impl ColorEncoding {
    pub fn srgb() -> Self {
        ColorEncoding::Predefined(PredefinedColorEncoding::Srgb)
    }

    pub fn linear_srgb() -> Self {
        ColorEncoding::Predefined(PredefinedColorEncoding::LinearSrgb)
    }

    /// Explicit fields, or `None` for ICC profiles
    pub fn resolve(&self) -> Option<ResolvedColorEncoding> {
        match self {
            ColorEncoding::Predefined(p) => Some(p.resolve()),
            ColorEncoding::Custom(c) => Some(c.resolve()),
            ColorEncoding::Icc(_) => None,
        }
    }
}

impl From<PredefinedColorEncoding> for ColorEncoding {
    fn from(p: PredefinedColorEncoding) -> Self {
        ColorEncoding::Predefined(p)
    }
}

impl From<CustomColorEncoding> for ColorEncoding {
    fn from(c: CustomColorEncoding) -> Self {
        ColorEncoding::Custom(c)
    }
}

/// Named white points understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedWhitePoint {
    D65,
    E,
    Dci,
}

/// White point as sent to the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WhitePointValue {
    Named(NamedWhitePoint),
    Custom(WhitePoint),
}

/// Named primaries understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedPrimaries {
    Srgb,
    Bt2100,
    P3,
}

/// Primaries as sent to the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimariesValue {
    Named(NamedPrimaries),
    Custom(Primaries),
}

/// Color encoding with every field in the form the engine consumes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedColorEncoding {
    pub color_space: ColorSpace,
    pub white_point: WhitePointValue,
    pub primaries: PrimariesValue,
    pub transfer_function: TransferFunction,
    pub rendering_intent: RenderingIntent,
}
