//! Commit protocol
//!
//! Drives a [`CodecEngine`] through its call sequence for a validated encoder:
//! global flags, boxes, basic info, color encoding, parallel runner, each frame
//! with its options and extra channels, then output draining.

use crate::encoder::Encoder;
use crate::frame::{Frame, FramePayload};
use crate::options::{Buffering, OptionValue};
use jxl_core::consts::OUTPUT_CHUNK_SIZE;
use jxl_core::{ColorEncoding, EngineFailure, JxlError, JxlResult};
use jxl_engine::{CodecEngine, EngineStatus, FrameSettingId, OutputStatus, ParallelRunner};
use jxl_headers::BasicInfo;
use log::{debug, trace, warn};
use std::io::Write;

/// Translate an engine status into a result
pub fn check(status: EngineStatus) -> JxlResult<()> {
    match status {
        EngineStatus::Success => Ok(()),
        EngineStatus::Error => Err(JxlError::Engine(EngineFailure::Generic)),
        EngineStatus::OutOfMemory => Err(JxlError::OutOfMemory),
        EngineStatus::JpegReconstruction => {
            Err(JxlError::Engine(EngineFailure::JpegReconstruction))
        }
        EngineStatus::BadInput => Err(JxlError::Engine(EngineFailure::BadInput)),
        EngineStatus::NotSupported => Err(JxlError::Engine(EngineFailure::NotSupported)),
        EngineStatus::ApiUsage => Err(JxlError::ApiUsage),
        EngineStatus::Unknown(code) => Err(JxlError::Engine(EngineFailure::Unknown(code))),
    }
}

/// Run the whole protocol, returning the number of bytes written to `out`
pub(crate) fn run<E: CodecEngine, W: Write>(
    encoder: &Encoder,
    engine: &mut E,
    info: &BasicInfo,
    color: &ColorEncoding,
    runner: &ParallelRunner,
    out: &mut W,
) -> JxlResult<usize> {
    push_globals(encoder, engine)?;
    push_boxes(encoder, engine)?;

    check(engine.set_basic_info(info))?;
    debug!("basic info pushed");

    match color.resolve() {
        Some(resolved) => check(engine.set_color_encoding(&resolved))?,
        None => {
            if let ColorEncoding::Icc(icc) = color {
                check(engine.set_icc_profile(icc))?;
            }
        }
    }
    debug!("color encoding pushed");

    check(engine.set_parallel_runner(runner))?;

    for (index, frame) in encoder.frames.iter().enumerate() {
        push_frame(engine, frame, info)?;
        debug!("frame {} pushed", index);
    }

    engine.close_input();
    let written = drain(engine, out)?;
    debug!("output drained, {} bytes", written);
    Ok(written)
}

fn push_globals<E: CodecEngine>(encoder: &Encoder, engine: &mut E) -> JxlResult<()> {
    if let Some(use_container) = encoder.use_container {
        check(engine.use_container(use_container))?;
    }
    check(engine.set_codestream_level(encoder.codestream_level))?;
    if let Some(store) = encoder.store_jpeg_metadata {
        check(engine.store_jpeg_metadata(store))?;
    }
    if encoder.allow_expert_options {
        engine.allow_expert_options();
    }
    Ok(())
}

fn push_boxes<E: CodecEngine>(encoder: &Encoder, engine: &mut E) -> JxlResult<()> {
    if encoder.boxes.is_empty() {
        return Ok(());
    }
    check(engine.use_boxes())?;
    for b in &encoder.boxes {
        check(engine.add_box(b.box_type.to_fourcc(), &b.contents, b.compressed))?;
    }
    debug!("{} box(es) registered", encoder.boxes.len());
    Ok(())
}

fn push_frame<E: CodecEngine>(engine: &mut E, frame: &Frame, info: &BasicInfo) -> JxlResult<()> {
    let config = &frame.config;
    let settings = engine.create_frame_settings();

    check(engine.set_frame_header(settings, &config.header(info.xsize, info.ysize)))?;
    if let Some(name) = &config.name {
        check(engine.set_frame_name(settings, name))?;
    }
    check(engine.set_frame_bit_depth(settings, config.bit_depth_type))?;

    if config.is_lossless() {
        check(engine.set_frame_lossless(settings, true))?;
    } else {
        check(engine.set_frame_distance(settings, config.distance))?;
    }

    for option in config.settings.engine_options() {
        match option {
            OptionValue::Int(id, value) => {
                trace!("option {:?} = {}", id, value);
                check(engine.set_option(settings, id, value))?;
            }
            OptionValue::Float(id, value) => {
                trace!("option {:?} = {}", id, value);
                check(engine.set_float_option(settings, id, value))?;
            }
        }
    }

    let buffering = config.settings.buffering;
    if buffering != Buffering::Auto {
        let status =
            engine.set_option(settings, FrameSettingId::Buffering, buffering.engine_value());
        if !status.is_success() {
            warn!("engine rejected buffering option {:?} ({:?}), ignored", buffering, status);
        }
    }

    for (index, channel) in config.extra_channels.iter().enumerate() {
        check(engine.set_extra_channel_info(index, &channel.info))?;
        check(engine.set_extra_channel_blend_info(settings, index, &channel.blend_info))?;
        if let Some(name) = &channel.name {
            check(engine.set_extra_channel_name(index, name))?;
        }
    }

    match &frame.payload {
        FramePayload::Image(buffer) => {
            check(engine.add_image_frame(settings, &buffer.format, &buffer.data))?
        }
        FramePayload::Jpeg(jpeg) => check(engine.add_jpeg_frame(settings, jpeg))?,
    }

    for (index, channel) in config.extra_channels.iter().enumerate() {
        check(engine.set_extra_channel_buffer(
            settings,
            &channel.data.format,
            &channel.data.data,
            index,
        ))?;
    }
    Ok(())
}

fn drain<E: CodecEngine, W: Write>(engine: &mut E, out: &mut W) -> JxlResult<usize> {
    let mut chunk = vec![0u8; OUTPUT_CHUNK_SIZE];
    let mut written = 0;
    loop {
        let (status, len) = engine.process_output(&mut chunk);
        match status {
            OutputStatus::Error(status) => {
                check(status)?;
                // Error(Success) is still a failure
                return Err(JxlError::Engine(EngineFailure::Generic));
            }
            OutputStatus::NeedMoreOutput | OutputStatus::Success => {
                let len = len.min(chunk.len());
                out.write_all(&chunk[..len])?;
                written += len;
                if status == OutputStatus::Success {
                    break;
                }
            }
        }
    }
    out.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jxl_core::ErrorKind;

    #[test]
    fn test_check_translates_every_status() {
        assert!(check(EngineStatus::Success).is_ok());
        let cases = [
            (EngineStatus::Error, ErrorKind::Engine),
            (EngineStatus::OutOfMemory, ErrorKind::ResourceExhausted),
            (EngineStatus::JpegReconstruction, ErrorKind::Engine),
            (EngineStatus::BadInput, ErrorKind::Engine),
            (EngineStatus::NotSupported, ErrorKind::Engine),
            (EngineStatus::ApiUsage, ErrorKind::Configuration),
            (EngineStatus::Unknown(0x42), ErrorKind::Engine),
        ];
        for (status, kind) in cases {
            assert_eq!(check(status).unwrap_err().kind(), kind, "{:?}", status);
        }
        assert!(matches!(
            check(EngineStatus::Unknown(0x42)),
            Err(JxlError::Engine(EngineFailure::Unknown(0x42)))
        ));
    }
}
