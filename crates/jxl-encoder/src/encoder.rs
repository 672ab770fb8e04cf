//! The encoder aggregate
//!
//! An [`Encoder`] collects the image-wide parameters, the committed frames and
//! the metadata boxes. Setters only enforce local constraints; the cross-field
//! checks run when one of the `encode` operations is called, before any engine
//! is created.

use crate::boxes::{BoxBuilder, MetadataBox};
use crate::commit;
use crate::frame::{Frame, FrameBuilder};
use jxl_core::{ColorEncoding, Dimensions, JxlError, JxlResult, Orientation};
use jxl_engine::{BuiltinEngine, CodecEngine, ParallelRunner};
use jxl_headers::{AnimationHeader, BasicInfo, BoxType, PreviewHeader};
use log::debug;
use std::io::Write;

/// Clock unit used to describe the length of an animation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    pub fn units_per_second(self) -> u64 {
        match self {
            TimeUnit::Nanoseconds => 1_000_000_000,
            TimeUnit::Microseconds => 1_000_000,
            TimeUnit::Milliseconds => 1_000,
            TimeUnit::Seconds => 1,
        }
    }
}

/// JPEG XL encoder configuration
#[derive(Debug, Clone)]
pub struct Encoder {
    pub(crate) use_container: Option<bool>,
    pub(crate) codestream_level: i32,
    pub(crate) store_jpeg_metadata: Option<bool>,
    pub(crate) allow_expert_options: bool,
    pub(crate) color_encoding: Option<ColorEncoding>,
    pub(crate) xsize: Option<u32>,
    pub(crate) ysize: Option<u32>,
    pub(crate) bits_per_sample: Option<u32>,
    pub(crate) exponent_bits_per_sample: u32,
    pub(crate) intensity_target: Option<f32>,
    pub(crate) min_nits: Option<f32>,
    pub(crate) relative_to_max_display: Option<bool>,
    pub(crate) linear_below: Option<f32>,
    pub(crate) uses_original_profile: Option<bool>,
    pub(crate) have_preview: Option<bool>,
    pub(crate) preview: Option<PreviewHeader>,
    pub(crate) have_animation: Option<bool>,
    pub(crate) animation: Option<AnimationHeader>,
    pub(crate) orientation: Orientation,
    pub(crate) num_color_channels: Option<u32>,
    pub(crate) num_extra_channels: Option<u32>,
    pub(crate) alpha_bits: Option<u32>,
    pub(crate) alpha_exponent_bits: u32,
    pub(crate) alpha_premultiplied: bool,
    pub(crate) intrinsic_size: Option<Dimensions>,
    pub(crate) boxes: Vec<MetadataBox>,
    pub(crate) frames: Vec<Frame>,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            use_container: None,
            codestream_level: -1,
            store_jpeg_metadata: None,
            allow_expert_options: false,
            color_encoding: None,
            xsize: None,
            ysize: None,
            bits_per_sample: None,
            exponent_bits_per_sample: 0,
            intensity_target: None,
            min_nits: None,
            relative_to_max_display: None,
            linear_below: None,
            uses_original_profile: None,
            have_preview: None,
            preview: None,
            have_animation: None,
            animation: None,
            orientation: Orientation::Identity,
            num_color_channels: None,
            num_extra_channels: None,
            alpha_bits: None,
            alpha_exponent_bits: 0,
            alpha_premultiplied: false,
            intrinsic_size: None,
            boxes: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Force or forbid the box-based container format
    ///
    /// Left unset, the engine uses the container only when something needs it.
    pub fn with_container(&mut self, use_container: bool) -> &mut Self {
        self.use_container = Some(use_container);
        self
    }

    /// Codestream level: -1 lets the engine choose, otherwise 5 or 10
    pub fn codestream_level(&mut self, level: i32) -> JxlResult<&mut Self> {
        if !matches!(level, -1 | 5 | 10) {
            return Err(JxlError::InvalidParameter(format!(
                "codestream level must be -1, 5 or 10, got {}",
                level
            )));
        }
        self.codestream_level = level;
        Ok(self)
    }

    /// Store JPEG reconstruction metadata when recompressing JPEG frames
    pub fn store_jpeg_metadata(&mut self, store: bool) -> &mut Self {
        self.store_jpeg_metadata = Some(store);
        self
    }

    /// Unlock options that are slow or experimental, such as effort 10
    pub fn allow_expert_options(&mut self) -> &mut Self {
        self.allow_expert_options = true;
        self
    }

    pub fn color_encoding(&mut self, encoding: impl Into<ColorEncoding>) -> &mut Self {
        self.color_encoding = Some(encoding.into());
        self
    }

    pub fn size(&mut self, xsize: u32, ysize: u32) -> &mut Self {
        self.xsize = Some(xsize);
        self.ysize = Some(ysize);
        self
    }

    /// Lower bound and peak luminance of the image, in nits
    pub fn intensity_range(&mut self, min_nits: f32, intensity_target: f32) -> &mut Self {
        self.min_nits = Some(min_nits);
        self.intensity_target = Some(intensity_target);
        self
    }

    /// Tone mapping leaves luminances below `nits` untouched
    pub fn linear_below_absolute(&mut self, nits: f32) -> &mut Self {
        self.linear_below = Some(nits);
        self.relative_to_max_display = Some(false);
        self
    }

    /// Tone mapping leaves luminances below `display_ratio` of the display peak untouched
    pub fn linear_below_relative(&mut self, display_ratio: f32) -> &mut Self {
        self.linear_below = Some(display_ratio);
        self.relative_to_max_display = Some(true);
        self
    }

    pub fn bits_per_sample(&mut self, bits: u32) -> &mut Self {
        self.bits_per_sample = Some(bits);
        self
    }

    /// Samples are floating point with `exponent_bits` exponent bits
    pub fn with_floating_samples(&mut self, exponent_bits: u32) -> JxlResult<&mut Self> {
        if exponent_bits == 0 {
            return Err(JxlError::InvalidParameter(
                "exponent bits must not be 0".to_string(),
            ));
        }
        self.exponent_bits_per_sample = exponent_bits;
        Ok(self)
    }

    /// Whether the codestream keeps the original color profile instead of XYB
    pub fn uses_original_profile(&mut self, original: bool) -> &mut Self {
        self.uses_original_profile = Some(original);
        self
    }

    pub fn with_preview(&mut self, xsize: u32, ysize: u32) -> &mut Self {
        self.have_preview = Some(true);
        self.preview = Some(PreviewHeader { xsize, ysize });
        self
    }

    pub fn without_preview(&mut self) -> &mut Self {
        self.have_preview = Some(false);
        self
    }

    /// Make the image an animation ticking `tps_numerator / tps_denominator` times a second
    pub fn with_animation(
        &mut self,
        tps_numerator: u32,
        tps_denominator: u32,
    ) -> AnimationConfigurator<'_> {
        let mut header = self.animation.unwrap_or_default();
        header.tps_numerator = tps_numerator;
        header.tps_denominator = tps_denominator;
        self.start_animation(header)
    }

    /// Make the image an animation whose tick lasts `units_per_tick` of `unit`
    ///
    /// The tick rate is stored as ticks per second, reduced to lowest terms.
    pub fn with_animation_tick(
        &mut self,
        units_per_tick: u64,
        unit: TimeUnit,
    ) -> JxlResult<AnimationConfigurator<'_>> {
        let rate = AnimationHeader::from_tick_duration(units_per_tick, unit.units_per_second())?;
        let mut header = self.animation.unwrap_or_default();
        header.tps_numerator = rate.tps_numerator;
        header.tps_denominator = rate.tps_denominator;
        Ok(self.start_animation(header))
    }

    fn start_animation(&mut self, header: AnimationHeader) -> AnimationConfigurator<'_> {
        self.have_animation = Some(true);
        self.animation = Some(header);
        AnimationConfigurator { owner: self }
    }

    pub fn without_animation(&mut self) -> &mut Self {
        self.have_animation = Some(false);
        self
    }

    pub fn orientation(&mut self, orientation: Orientation) -> &mut Self {
        self.orientation = orientation;
        self
    }

    /// Number of color channels (1 for gray, 3 for color) and extra channels
    pub fn num_channels(&mut self, color: u32, extra: u32) -> JxlResult<&mut Self> {
        if color != 1 && color != 3 {
            return Err(JxlError::InvalidParameter(format!(
                "color channel count must be 1 or 3, got {}",
                color
            )));
        }
        self.num_color_channels = Some(color);
        self.num_extra_channels = Some(extra);
        Ok(self)
    }

    /// Bit depth of the main alpha channel, 0 when there is none
    pub fn bits_per_alpha_sample(&mut self, bits: u32) -> &mut Self {
        self.alpha_bits = Some(bits);
        self
    }

    pub fn with_floating_alpha_samples(&mut self, exponent_bits: u32) -> JxlResult<&mut Self> {
        if exponent_bits == 0 {
            return Err(JxlError::InvalidParameter(
                "alpha exponent bits must not be 0".to_string(),
            ));
        }
        self.alpha_exponent_bits = exponent_bits;
        Ok(self)
    }

    pub fn with_premultiplied_alpha(&mut self) -> &mut Self {
        self.alpha_premultiplied = true;
        self
    }

    pub fn with_straight_alpha(&mut self) -> &mut Self {
        self.alpha_premultiplied = false;
        self
    }

    /// Size the image is meant to be displayed at
    pub fn intrinsic_size(&mut self, xsize: u32, ysize: u32) -> &mut Self {
        self.intrinsic_size = Some(Dimensions::new(xsize, ysize));
        self
    }

    /// Start a metadata box with a four character type
    pub fn add_box(&mut self, fourcc: &str) -> JxlResult<BoxBuilder<'_>> {
        let box_type = BoxType::parse(fourcc)?;
        self.add_well_known_box(box_type)
    }

    /// Start a metadata box of a known type
    pub fn add_well_known_box(&mut self, box_type: BoxType) -> JxlResult<BoxBuilder<'_>> {
        if box_type.is_reserved() {
            return Err(JxlError::ReservedBoxType(box_type.fourcc_string()));
        }
        Ok(BoxBuilder::new(self, box_type))
    }

    pub fn new_frame(&mut self) -> FrameBuilder<'_> {
        FrameBuilder::new(self)
    }

    pub fn new_named_frame(&mut self, name: impl Into<String>) -> JxlResult<FrameBuilder<'_>> {
        self.new_frame().name(name)
    }

    /// Start a frame shown for `duration` ticks
    pub fn new_frame_with_duration(&mut self, duration: u32) -> FrameBuilder<'_> {
        self.new_frame().duration(duration)
    }

    pub fn new_named_frame_with_duration(
        &mut self,
        name: impl Into<String>,
        duration: u32,
    ) -> JxlResult<FrameBuilder<'_>> {
        self.new_frame().duration(duration).name(name)
    }

    /// Frames committed so far, in order
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Boxes committed so far, in order
    pub fn boxes(&self) -> &[MetadataBox] {
        &self.boxes
    }

    /// Validate the configuration and build the basic info pushed to the engine
    pub fn basic_info(&self) -> JxlResult<BasicInfo> {
        self.validate().map(|(info, _)| info)
    }

    pub(crate) fn validate(&self) -> JxlResult<(BasicInfo, &ColorEncoding)> {
        let color = self
            .color_encoding
            .as_ref()
            .ok_or(JxlError::MissingField("color_encoding"))?;
        let xsize = self.xsize.ok_or(JxlError::MissingField("xsize"))?;
        let ysize = self.ysize.ok_or(JxlError::MissingField("ysize"))?;
        if !Dimensions::new(xsize, ysize).is_valid() {
            return Err(JxlError::InvalidParameter(format!(
                "image size {}x{} has a zero side",
                xsize, ysize
            )));
        }
        let bits = self
            .bits_per_sample
            .ok_or(JxlError::MissingField("bits_per_sample"))?;
        let num_color = self
            .num_color_channels
            .ok_or(JxlError::MissingField("num_color_channels"))?;
        let num_extra = self
            .num_extra_channels
            .ok_or(JxlError::MissingField("num_extra_channels"))?;

        let preview = if self.have_preview == Some(true) {
            Some(self.preview.ok_or(JxlError::MissingField("preview size"))?)
        } else {
            None
        };
        let animation = if self.have_animation == Some(true) {
            let header = self
                .animation
                .ok_or(JxlError::MissingField("animation tick rate"))?;
            if !header.is_valid() {
                return Err(JxlError::InvalidParameter(
                    "animation tick rate must be non-zero".to_string(),
                ));
            }
            Some(header)
        } else {
            None
        };

        let info = BasicInfo {
            xsize,
            ysize,
            bits_per_sample: bits,
            exponent_bits_per_sample: self.exponent_bits_per_sample,
            intensity_target: self.intensity_target,
            min_nits: self.min_nits,
            relative_to_max_display: self.relative_to_max_display,
            linear_below: self.linear_below,
            uses_original_profile: self.uses_original_profile,
            have_preview: self.have_preview,
            preview,
            have_animation: self.have_animation,
            animation,
            orientation: self.orientation,
            num_color_channels: num_color,
            num_extra_channels: num_extra,
            alpha_bits: self.alpha_bits,
            alpha_exponent_bits: self.alpha_exponent_bits,
            alpha_premultiplied: self.alpha_premultiplied,
            intrinsic_size: self.intrinsic_size,
        };
        Ok((info, color))
    }

    /// Encode with the built-in engine and return the file bytes
    pub fn encode(&self, runner: &ParallelRunner) -> JxlResult<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_with(BuiltinEngine::new, runner, &mut out)?;
        Ok(out)
    }

    /// Encode with the built-in engine into `writer`, returning the bytes written
    pub fn encode_to_writer<W: Write>(
        &self,
        runner: &ParallelRunner,
        writer: W,
    ) -> JxlResult<usize> {
        self.encode_with(BuiltinEngine::new, runner, writer)
    }

    /// Encode with the engine produced by `factory`
    ///
    /// The factory is only called once validation has passed. The engine is
    /// dropped before this returns, whether encoding succeeded or not. Output
    /// already written to `writer` is not rolled back on failure.
    pub fn encode_with<E, F, W>(
        &self,
        factory: F,
        runner: &ParallelRunner,
        mut writer: W,
    ) -> JxlResult<usize>
    where
        E: CodecEngine,
        F: FnOnce() -> E,
        W: Write,
    {
        let (info, color) = self.validate()?;
        let mut engine = factory();
        debug!(
            "encoding {}x{} image, {} frame(s), {} box(es)",
            info.xsize,
            info.ysize,
            self.frames.len(),
            self.boxes.len()
        );
        commit::run(self, &mut engine, &info, color, runner, &mut writer)
    }
}

/// Animation settings, returned by [`Encoder::with_animation`]
#[derive(Debug)]
pub struct AnimationConfigurator<'a> {
    owner: &'a mut Encoder,
}

impl<'a> AnimationConfigurator<'a> {
    fn header(&mut self) -> &mut AnimationHeader {
        self.owner.animation.get_or_insert_with(AnimationHeader::default)
    }

    pub fn play_once(mut self) -> Self {
        self.header().num_loops = 1;
        self
    }

    pub fn loop_infinitely(mut self) -> Self {
        self.header().num_loops = 0;
        self
    }

    /// Play the animation `count` times
    pub fn loop_count(mut self, count: u32) -> JxlResult<Self> {
        if count == 0 {
            return Err(JxlError::InvalidParameter(
                "cannot loop 0 times, use loop_infinitely".to_string(),
            ));
        }
        self.header().num_loops = count;
        Ok(self)
    }

    pub fn with_timecodes(mut self) -> Self {
        self.header().have_timecodes = Some(true);
        self
    }

    pub fn without_timecodes(mut self) -> Self {
        self.header().have_timecodes = Some(false);
        self
    }

    pub fn done(self) -> &'a mut Encoder {
        self.owner
    }
}
