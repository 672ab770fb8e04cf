//! Coding strategy configurators
//!
//! Forcing Modular or VarDCT coding restricts which options a frame accepts.
//! The configurators expose the options of their mode as typed setters; each
//! one still goes through [`FrameSettings::apply`](crate::options::FrameSettings::apply)
//! so a later forced mode cannot be bypassed.

use crate::frame::FrameBuilder;
use crate::options::{ModularGroupSize, ModularPredictor, ProgressiveDc, Strategy, StrategyOption};
use jxl_core::JxlResult;

macro_rules! strategy_setters {
    ($($(#[$doc:meta])* $name:ident($ty:ty) => $variant:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(mut self, value: $ty) -> JxlResult<Self> {
                self.frame = self.frame.set_strategy_option(StrategyOption::$variant(value))?;
                Ok(self)
            }
        )*
    };
}

macro_rules! modular_setters {
    () => {
        strategy_setters! {
            /// Squeeze transform for progressive lossless decoding
            responsive(bool) => Responsive;
            /// Use a global channel palette when the image has at most this share of colors
            channel_colors_global_percent(f32) => ChannelColorsGlobalPercent;
            channel_colors_group_percent(f32) => ChannelColorsGroupPercent;
            /// Use a palette when the image has at most this many colors
            palette_colors(u32) => PaletteColors;
            lossy_palette(bool) => LossyPalette;
            /// Reversible color transform index
            color_space(u32) => ModularColorSpace;
            group_size(ModularGroupSize) => ModularGroupSize;
            predictor(ModularPredictor) => ModularPredictor;
            /// Share of pixels used to learn the MA tree
            ma_tree_learning_percent(f32) => MaTreeLearningPercent;
            /// Previous channels used as MA tree context
            nb_prev_channels(u32) => NbPrevChannels;
        }
    };
}

macro_rules! var_dct_setters {
    () => {
        strategy_setters! {
            /// Spectral progression of AC coefficients
            progressive_ac(bool) => ProgressiveAc;
            /// Quantization-based progression of AC coefficients
            qprogressive_ac(bool) => QProgressiveAc;
            progressive_dc(ProgressiveDc) => ProgressiveDc;
        }
    };
}

/// Options of a frame forced to Modular coding
#[derive(Debug)]
pub struct ModularConfigurator<'a> {
    frame: FrameBuilder<'a>,
}

impl<'a> ModularConfigurator<'a> {
    pub(crate) fn new(mut frame: FrameBuilder<'a>) -> Self {
        frame.settings_mut().strategy = Strategy::Modular;
        Self { frame }
    }

    modular_setters!();

    pub fn done(self) -> FrameBuilder<'a> {
        self.frame
    }
}

/// Options of a frame forced to VarDCT coding
#[derive(Debug)]
pub struct VarDctConfigurator<'a> {
    frame: FrameBuilder<'a>,
}

impl<'a> VarDctConfigurator<'a> {
    pub(crate) fn new(mut frame: FrameBuilder<'a>) -> Self {
        frame.settings_mut().strategy = Strategy::VarDct;
        Self { frame }
    }

    var_dct_setters!();

    pub fn done(self) -> FrameBuilder<'a> {
        self.frame
    }
}

/// Options of both modes, with the choice left to the engine
#[derive(Debug)]
pub struct DualConfigurator<'a> {
    frame: FrameBuilder<'a>,
}

impl<'a> DualConfigurator<'a> {
    pub(crate) fn new(mut frame: FrameBuilder<'a>) -> Self {
        frame.settings_mut().strategy = Strategy::Auto;
        Self { frame }
    }

    modular_setters!();
    var_dct_setters!();

    pub fn done(self) -> FrameBuilder<'a> {
        self.frame
    }
}
