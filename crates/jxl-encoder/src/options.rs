//! Per-frame tuning options
//!
//! [`FrameSettings`] holds every tuning knob of a frame with the engine's
//! default left in place until the caller overrides it. `None` and `Auto`
//! values are sent to the engine as `-1`.

use jxl_core::consts::DEFAULT_EFFORT;
use jxl_core::{JxlError, JxlResult};
use jxl_engine::FrameSettingId;

/// Edge preserving filter strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpfMode {
    #[default]
    Auto,
    Off,
    Weak,
    Medium,
    Strong,
}

/// Extra low resolution DC passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressiveDc {
    #[default]
    Auto,
    Disable,
    /// One extra 64x64 pass
    Enable64,
    /// Extra 512x512 and 64x64 passes
    Enable512And64,
}

/// Color transform applied before encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorTransform {
    #[default]
    Auto,
    Xyb,
    None,
    /// Data losslessly represents YCbCr values
    YCbCr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModularGroupSize {
    #[default]
    Auto,
    S128,
    S256,
    S512,
    S1024,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModularPredictor {
    #[default]
    Auto,
    Zero,
    Left,
    Top,
    Avg0,
    Select,
    Gradient,
    Weighted,
    TopRight,
    TopLeft,
    LeftLeft,
    Avg1,
    Avg2,
    Avg3,
    TopTopPredictiveAverage,
    GradientWeighted,
    /// Combination of all others
    All,
}

/// Buffering strategy of a streaming engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Buffering {
    #[default]
    Auto,
    /// Buffer everything, same as the non-streaming path
    Everything,
    /// Buffer internal tokens
    Tokens,
    /// Buffer the output
    Output,
    /// Streamed input and chunked output, not compatible with progressive modes
    Minimal,
}

macro_rules! auto_first_value {
    ($($ty:ty),*) => {
        $(impl $ty {
            /// Engine value, with `Auto` mapped to -1
            pub fn engine_value(self) -> i64 {
                self as i64 - 1
            }
        })*
    };
}

auto_first_value!(
    EpfMode,
    ProgressiveDc,
    ColorTransform,
    ModularGroupSize,
    ModularPredictor,
    Buffering
);

/// Coding strategy of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Engine chooses, options of both families are accepted
    #[default]
    Auto,
    VarDct,
    Modular,
}

impl Strategy {
    pub fn engine_value(self) -> i64 {
        match self {
            Strategy::Auto => -1,
            Strategy::VarDct => 0,
            Strategy::Modular => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Auto => "automatic",
            Strategy::VarDct => "VarDCT",
            Strategy::Modular => "Modular",
        }
    }
}

/// Order in which groups are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupOrder {
    #[default]
    Auto,
    Scanline,
    /// Center first, around an explicit point or the image center for `None`
    Centered {
        x: Option<u32>,
        y: Option<u32>,
    },
}

/// An option that belongs to one coding strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrategyOption {
    Responsive(bool),
    ChannelColorsGlobalPercent(f32),
    ChannelColorsGroupPercent(f32),
    PaletteColors(u32),
    LossyPalette(bool),
    ModularColorSpace(u32),
    ModularGroupSize(ModularGroupSize),
    ModularPredictor(ModularPredictor),
    MaTreeLearningPercent(f32),
    NbPrevChannels(u32),
    ProgressiveAc(bool),
    QProgressiveAc(bool),
    ProgressiveDc(ProgressiveDc),
}

impl StrategyOption {
    /// The strategy this option is meaningful for
    pub fn family(&self) -> Strategy {
        match self {
            StrategyOption::ProgressiveAc(_)
            | StrategyOption::QProgressiveAc(_)
            | StrategyOption::ProgressiveDc(_) => Strategy::VarDct,
            _ => Strategy::Modular,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyOption::Responsive(_) => "responsive",
            StrategyOption::ChannelColorsGlobalPercent(_) => "channel_colors_global_percent",
            StrategyOption::ChannelColorsGroupPercent(_) => "channel_colors_group_percent",
            StrategyOption::PaletteColors(_) => "palette_colors",
            StrategyOption::LossyPalette(_) => "lossy_palette",
            StrategyOption::ModularColorSpace(_) => "modular_color_space",
            StrategyOption::ModularGroupSize(_) => "modular_group_size",
            StrategyOption::ModularPredictor(_) => "modular_predictor",
            StrategyOption::MaTreeLearningPercent(_) => "ma_tree_learning_percent",
            StrategyOption::NbPrevChannels(_) => "nb_prev_channels",
            StrategyOption::ProgressiveAc(_) => "progressive_ac",
            StrategyOption::QProgressiveAc(_) => "qprogressive_ac",
            StrategyOption::ProgressiveDc(_) => "progressive_dc",
        }
    }
}

/// One option as pushed to the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionValue {
    Int(FrameSettingId, i64),
    Float(FrameSettingId, f32),
}

/// Tuning state of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSettings {
    pub effort: i32,
    pub decoding_speed: i32,
    pub resampling: Option<u32>,
    pub extra_channel_resampling: Option<u32>,
    pub already_downsampled: bool,
    pub photon_noise: f32,
    pub dots: Option<bool>,
    pub patches: Option<bool>,
    pub epf: EpfMode,
    pub gaborish: Option<bool>,
    pub strategy: Strategy,
    pub keep_invisible: Option<bool>,
    pub group_order: GroupOrder,
    pub responsive: Option<bool>,
    pub progressive_ac: Option<bool>,
    pub qprogressive_ac: Option<bool>,
    pub progressive_dc: ProgressiveDc,
    pub channel_colors_global_percent: Option<f32>,
    pub channel_colors_group_percent: Option<f32>,
    pub palette_colors: Option<u32>,
    pub lossy_palette: Option<bool>,
    pub color_transform: ColorTransform,
    pub modular_color_space: Option<u32>,
    pub modular_group_size: ModularGroupSize,
    pub modular_predictor: ModularPredictor,
    pub ma_tree_learning_percent: Option<f32>,
    pub nb_prev_channels: Option<u32>,
    pub jpeg_recon_cfl: Option<bool>,
    pub index_box: bool,
    pub brotli_effort: Option<u32>,
    pub jpeg_compress_boxes: Option<bool>,
    pub buffering: Buffering,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            effort: DEFAULT_EFFORT,
            decoding_speed: 0,
            resampling: None,
            extra_channel_resampling: None,
            already_downsampled: false,
            photon_noise: 0.0,
            dots: None,
            patches: None,
            epf: EpfMode::Auto,
            gaborish: None,
            strategy: Strategy::Auto,
            keep_invisible: None,
            group_order: GroupOrder::Auto,
            responsive: None,
            progressive_ac: None,
            qprogressive_ac: None,
            progressive_dc: ProgressiveDc::Auto,
            channel_colors_global_percent: None,
            channel_colors_group_percent: None,
            palette_colors: None,
            lossy_palette: None,
            color_transform: ColorTransform::Auto,
            modular_color_space: None,
            modular_group_size: ModularGroupSize::Auto,
            modular_predictor: ModularPredictor::Auto,
            ma_tree_learning_percent: None,
            nb_prev_channels: None,
            jpeg_recon_cfl: None,
            index_box: false,
            brotli_effort: None,
            jpeg_compress_boxes: None,
            buffering: Buffering::Auto,
        }
    }
}

fn tri_state(value: Option<bool>) -> i64 {
    match value {
        None => -1,
        Some(false) => 0,
        Some(true) => 1,
    }
}

fn int_or_auto(value: Option<u32>) -> i64 {
    value.map_or(-1, i64::from)
}

fn float_or_auto(value: Option<f32>) -> f32 {
    value.unwrap_or(-1.0)
}

impl FrameSettings {
    /// Store a strategy-specific option, rejecting it if the other strategy is forced
    pub fn apply(&mut self, option: StrategyOption) -> JxlResult<()> {
        if self.strategy != Strategy::Auto && self.strategy != option.family() {
            return Err(JxlError::StrategyConflict {
                option: option.name(),
                strategy: self.strategy.name(),
            });
        }
        match option {
            StrategyOption::Responsive(v) => self.responsive = Some(v),
            StrategyOption::ChannelColorsGlobalPercent(v) => {
                self.channel_colors_global_percent = Some(v)
            }
            StrategyOption::ChannelColorsGroupPercent(v) => {
                self.channel_colors_group_percent = Some(v)
            }
            StrategyOption::PaletteColors(v) => self.palette_colors = Some(v),
            StrategyOption::LossyPalette(v) => self.lossy_palette = Some(v),
            StrategyOption::ModularColorSpace(v) => self.modular_color_space = Some(v),
            StrategyOption::ModularGroupSize(v) => self.modular_group_size = v,
            StrategyOption::ModularPredictor(v) => self.modular_predictor = v,
            StrategyOption::MaTreeLearningPercent(v) => self.ma_tree_learning_percent = Some(v),
            StrategyOption::NbPrevChannels(v) => self.nb_prev_channels = Some(v),
            StrategyOption::ProgressiveAc(v) => self.progressive_ac = Some(v),
            StrategyOption::QProgressiveAc(v) => self.qprogressive_ac = Some(v),
            StrategyOption::ProgressiveDc(v) => self.progressive_dc = v,
        }
        Ok(())
    }

    /// Options in the order they are pushed to the engine
    ///
    /// Buffering is not included; it is pushed separately and only when set.
    pub fn engine_options(&self) -> Vec<OptionValue> {
        use FrameSettingId as Id;
        use OptionValue::{Float, Int};

        let (group_order, center_x, center_y) = match self.group_order {
            GroupOrder::Auto => (-1, -1, -1),
            GroupOrder::Scanline => (0, -1, -1),
            GroupOrder::Centered { x, y } => (1, int_or_auto(x), int_or_auto(y)),
        };

        vec![
            Int(Id::Effort, i64::from(self.effort)),
            Int(Id::DecodingSpeed, i64::from(self.decoding_speed)),
            Int(Id::Resampling, int_or_auto(self.resampling)),
            Int(Id::ExtraChannelResampling, int_or_auto(self.extra_channel_resampling)),
            Int(Id::AlreadyDownsampled, i64::from(self.already_downsampled)),
            Float(Id::PhotonNoise, self.photon_noise),
            Int(Id::Dots, tri_state(self.dots)),
            Int(Id::Patches, tri_state(self.patches)),
            Int(Id::Epf, self.epf.engine_value()),
            Int(Id::Gaborish, tri_state(self.gaborish)),
            Int(Id::Modular, self.strategy.engine_value()),
            Int(Id::KeepInvisible, tri_state(self.keep_invisible)),
            Int(Id::GroupOrder, group_order),
            Int(Id::GroupOrderCenterX, center_x),
            Int(Id::GroupOrderCenterY, center_y),
            Int(Id::Responsive, tri_state(self.responsive)),
            Int(Id::ProgressiveAc, tri_state(self.progressive_ac)),
            Int(Id::QProgressiveAc, tri_state(self.qprogressive_ac)),
            Int(Id::ProgressiveDc, self.progressive_dc.engine_value()),
            Float(
                Id::ChannelColorsGlobalPercent,
                float_or_auto(self.channel_colors_global_percent),
            ),
            Float(
                Id::ChannelColorsGroupPercent,
                float_or_auto(self.channel_colors_group_percent),
            ),
            Int(Id::PaletteColors, int_or_auto(self.palette_colors)),
            Int(Id::LossyPalette, tri_state(self.lossy_palette)),
            Int(Id::ColorTransform, self.color_transform.engine_value()),
            Int(Id::ModularColorSpace, int_or_auto(self.modular_color_space)),
            Int(Id::ModularGroupSize, self.modular_group_size.engine_value()),
            Int(Id::ModularPredictor, self.modular_predictor.engine_value()),
            Float(
                Id::ModularMaTreeLearningPercent,
                float_or_auto(self.ma_tree_learning_percent),
            ),
            Int(Id::ModularNbPrevChannels, int_or_auto(self.nb_prev_channels)),
            Int(Id::JpegReconCfl, tri_state(self.jpeg_recon_cfl)),
            Int(Id::IndexBox, i64::from(self.index_box)),
            Int(Id::BrotliEffort, int_or_auto(self.brotli_effort)),
            Int(Id::JpegCompressBoxes, tri_state(self.jpeg_compress_boxes)),
        ]
    }
}
