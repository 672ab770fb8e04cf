//! Commit protocol order and error translation, checked against the recording engine

use jxl::*;

fn rgb_encoder(xsize: u32, ysize: u32) -> Encoder {
    let mut encoder = Encoder::new();
    encoder
        .color_encoding(ColorEncoding::srgb())
        .size(xsize, ysize)
        .bits_per_sample(8)
        .num_channels(3, 0)
        .unwrap();
    encoder
}

fn rgb_frame(encoder: &mut Encoder, xsize: u32, ysize: u32) {
    let len = (xsize * ysize * 3) as usize;
    encoder
        .new_frame()
        .commit(PixelFormat::new(3, DataType::U8), vec![0u8; len])
        .unwrap();
}

/// Encode with a recording engine, returning the log and the result
fn record(
    encoder: &Encoder,
    configure: impl FnOnce(RecordingEngine) -> RecordingEngine,
) -> (CallLog, JxlResult<Vec<u8>>) {
    let log = CallLog::new();
    let runner = ParallelRunner::with_threads(2).unwrap();
    let mut out = Vec::new();
    let result = encoder
        .encode_with(|| configure(RecordingEngine::new(log.clone())), &runner, &mut out)
        .map(|_| out);
    (log, result)
}

/// Call names with the per-frame tuning options collapsed into one entry
fn collapsed(log: &CallLog) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Vec::new();
    for name in log.names() {
        let name = match name {
            "set_option" | "set_float_option" => "options",
            other => other,
        };
        if name == "options" && names.last() == Some(&"options") {
            continue;
        }
        names.push(name);
    }
    names
}

#[test]
fn test_single_frame_protocol_order() {
    let mut encoder = rgb_encoder(4, 4);
    rgb_frame(&mut encoder, 4, 4);
    let (log, result) = record(&encoder, |e| e);
    assert_eq!(result.unwrap(), vec![0xFF, 0x0A]);
    assert_eq!(
        collapsed(&log),
        vec![
            "create",
            "set_codestream_level",
            "set_basic_info",
            "set_color_encoding",
            "set_parallel_runner",
            "create_frame_settings",
            "set_frame_header",
            "set_frame_bit_depth",
            "set_frame_distance",
            "options",
            "add_image_frame",
            "close_input",
            "process_output",
            "destroy",
        ]
    );
    let names = log.names();
    assert_eq!(names.iter().filter(|n| **n == "set_option").count(), 29);
    assert_eq!(names.iter().filter(|n| **n == "set_float_option").count(), 4);
}

#[test]
fn test_global_flags_and_boxes_come_first() {
    let mut encoder = rgb_encoder(2, 2);
    encoder
        .with_container(true)
        .codestream_level(10)
        .unwrap()
        .store_jpeg_metadata(false)
        .allow_expert_options();
    encoder.add_box("Exif").unwrap().commit(vec![1, 2, 3]);
    encoder.add_box("xml ").unwrap().compressed().commit(b"<x/>".to_vec());
    rgb_frame(&mut encoder, 2, 2);

    let (log, result) = record(&encoder, |e| e);
    result.unwrap();
    let calls = log.calls();
    assert_eq!(
        &calls[..8],
        &[
            EngineCall::Create,
            EngineCall::UseContainer(true),
            EngineCall::SetCodestreamLevel(10),
            EngineCall::StoreJpegMetadata(false),
            EngineCall::AllowExpertOptions,
            EngineCall::UseBoxes,
            EngineCall::AddBox {
                box_type: *b"Exif",
                contents: vec![1, 2, 3],
                compress: false,
            },
            EngineCall::AddBox {
                box_type: *b"xml ",
                contents: b"<x/>".to_vec(),
                compress: true,
            },
        ]
    );
    assert_eq!(calls[8].name(), "set_basic_info");
}

#[test]
fn test_no_boxes_skips_box_mode() {
    let mut encoder = rgb_encoder(2, 2);
    rgb_frame(&mut encoder, 2, 2);
    let (log, _) = record(&encoder, |e| e);
    assert!(!log.names().contains(&"use_boxes"));
    assert!(!log.names().contains(&"use_container"));
}

#[test]
fn test_icc_profile_replaces_color_encoding() {
    let mut encoder = rgb_encoder(2, 2);
    encoder.color_encoding(ColorEncoding::Icc(vec![7; 16]));
    rgb_frame(&mut encoder, 2, 2);
    let (log, result) = record(&encoder, |e| e);
    result.unwrap();
    let calls = log.calls();
    assert!(calls.contains(&EngineCall::SetIccProfile(vec![7; 16])));
    assert!(!log.names().contains(&"set_color_encoding"));
}

#[test]
fn test_frame_settings_reach_engine() {
    let mut encoder = rgb_encoder(8, 8);
    encoder
        .new_named_frame("first")
        .unwrap()
        .quality(100.0)
        .effort(3)
        .patches(false)
        .centered_group_order(Some(4), None)
        .bit_depth_type(BitDepthType::FromCodestream)
        .with_modular_encoding()
        .palette_colors(16)
        .unwrap()
        .done()
        .commit(PixelFormat::new(3, DataType::U8), vec![0u8; 8 * 8 * 3])
        .unwrap();

    let (log, result) = record(&encoder, |e| e);
    result.unwrap();
    let calls = log.calls();
    assert!(calls.contains(&EngineCall::SetFrameName("first".to_string())));
    assert!(calls.contains(&EngineCall::SetFrameLossless(true)));
    assert!(calls.contains(&EngineCall::SetFrameBitDepth(BitDepthType::FromCodestream)));
    assert!(!log.names().contains(&"set_frame_distance"));

    let options = log.options();
    assert!(options.contains(&(FrameSettingId::Effort, 3)));
    assert!(options.contains(&(FrameSettingId::Patches, 0)));
    assert!(options.contains(&(FrameSettingId::Modular, 1)));
    assert!(options.contains(&(FrameSettingId::PaletteColors, 16)));
    assert!(options.contains(&(FrameSettingId::GroupOrder, 1)));
    assert!(options.contains(&(FrameSettingId::GroupOrderCenterX, 4)));
    assert!(options.contains(&(FrameSettingId::GroupOrderCenterY, -1)));
    assert!(!options.iter().any(|(id, _)| *id == FrameSettingId::Buffering));
}

#[test]
fn test_frames_pushed_in_order_with_headers() {
    let mut encoder = rgb_encoder(4, 4);
    encoder.with_animation(10, 1).loop_infinitely().done();
    encoder
        .new_frame_with_duration(5)
        .commit(PixelFormat::new(3, DataType::U8), vec![0u8; 48])
        .unwrap();
    encoder
        .new_frame_with_duration(7)
        .crop(1, 1, 2, 2)
        .blend_mode(BlendMode::Blend)
        .save_as_reference(1)
        .unwrap()
        .commit(PixelFormat::new(3, DataType::U8), vec![0u8; 12])
        .unwrap();

    let (log, result) = record(&encoder, |e| e);
    result.unwrap();
    let headers: Vec<FrameHeader> = log
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            EngineCall::SetFrameHeader(h) => Some(h),
            _ => None,
        })
        .collect();
    assert_eq!(headers.len(), 2);
    assert_eq!(headers[0].duration, 5);
    assert_eq!(headers[0].layer_info.crop, None);
    assert_eq!(headers[1].duration, 7);
    assert_eq!(headers[1].layer_info.crop, Some(Crop::new(1, 1, 2, 2)));
    assert_eq!(headers[1].layer_info.save_as_reference, 1);
    assert_eq!(headers[1].layer_info.blend_info.mode, BlendMode::Blend);

    let settings: Vec<_> = log
        .calls()
        .into_iter()
        .filter(|c| matches!(c, EngineCall::CreateFrameSettings(_)))
        .collect();
    assert_eq!(
        settings,
        vec![
            EngineCall::CreateFrameSettings(SettingsHandle(0)),
            EngineCall::CreateFrameSettings(SettingsHandle(1)),
        ]
    );
}

#[test]
fn test_extra_channel_calls() {
    let mut encoder = Encoder::new();
    encoder
        .color_encoding(ColorEncoding::srgb())
        .size(2, 2)
        .bits_per_sample(8)
        .num_channels(3, 1)
        .unwrap()
        .bits_per_alpha_sample(8);
    encoder
        .new_frame()
        .new_named_extra_channel("alpha")
        .unwrap()
        .type_alpha(false)
        .bits_per_sample(8)
        .commit(DataType::U8, Endianness::Native, 0, vec![255u8; 4])
        .unwrap()
        .commit(PixelFormat::new(3, DataType::U8), vec![0u8; 12])
        .unwrap();

    let (log, result) = record(&encoder, |e| e);
    result.unwrap();
    let names = collapsed(&log);
    let tail: Vec<_> = names
        .iter()
        .skip_while(|n| **n != "options")
        .copied()
        .collect();
    assert_eq!(
        tail,
        vec![
            "options",
            "set_extra_channel_info",
            "set_extra_channel_blend_info",
            "set_extra_channel_name",
            "add_image_frame",
            "set_extra_channel_buffer",
            "close_input",
            "process_output",
            "destroy",
        ]
    );
    let info = log
        .calls()
        .into_iter()
        .find_map(|c| match c {
            EngineCall::SetExtraChannelInfo(0, info) => Some(info),
            _ => None,
        })
        .unwrap();
    assert_eq!(info.channel_type, ExtraChannelType::Alpha);
    assert_eq!(info.name_length, 5);
}

#[test]
fn test_jpeg_frame_uses_jpeg_call() {
    let mut encoder = rgb_encoder(2, 2);
    encoder
        .new_frame()
        .commit_jpeg(vec![0xFF, 0xD8, 0xFF, 0xD9])
        .unwrap();
    let (log, result) = record(&encoder, |e| e);
    result.unwrap();
    assert!(log.calls().contains(&EngineCall::AddJpegFrame { len: 4 }));
    assert!(!log.names().contains(&"add_image_frame"));
}

#[test]
fn test_output_drained_in_chunks() {
    let mut encoder = rgb_encoder(2, 2);
    rgb_frame(&mut encoder, 2, 2);
    let payload: Vec<u8> = (0..20_000u32).map(|i| i as u8).collect();
    let expected = payload.clone();
    let (log, result) = record(&encoder, move |e| e.with_output(payload));
    assert_eq!(result.unwrap(), expected);
    let drains = log.names().iter().filter(|n| **n == "process_output").count();
    assert_eq!(drains, 3);
}

#[test]
fn test_validation_failure_creates_no_engine() {
    let mut encoder = Encoder::new();
    encoder.size(2, 2).bits_per_sample(8);
    let (log, result) = record(&encoder, |e| e);
    assert!(matches!(
        result,
        Err(JxlError::MissingField("color_encoding"))
    ));
    assert!(log.is_empty());
}

#[test]
fn test_engine_errors_are_translated() {
    let cases = [
        ("set_basic_info", EngineStatus::ApiUsage, ErrorKind::Configuration),
        ("set_color_encoding", EngineStatus::NotSupported, ErrorKind::Engine),
        ("add_image_frame", EngineStatus::OutOfMemory, ErrorKind::ResourceExhausted),
        ("set_option", EngineStatus::BadInput, ErrorKind::Engine),
        ("process_output", EngineStatus::Error, ErrorKind::Engine),
    ];
    for (call, status, kind) in cases {
        let mut encoder = rgb_encoder(2, 2);
        rgb_frame(&mut encoder, 2, 2);
        let (log, result) = record(&encoder, |e| e.failing_on(call, status));
        let err = result.unwrap_err();
        assert_eq!(err.kind(), kind, "{} -> {:?}", call, status);
        let names = log.names();
        // the engine stops receiving calls at the failure and is still destroyed
        let failed_at = names.iter().position(|n| *n == call).unwrap();
        assert_eq!(names[failed_at + 1..], ["destroy"]);
    }
}

#[test]
fn test_unknown_status_keeps_code() {
    let mut encoder = rgb_encoder(2, 2);
    rgb_frame(&mut encoder, 2, 2);
    let (_, result) = record(&encoder, |e| {
        e.failing_on("set_parallel_runner", EngineStatus::Unknown(0x99))
    });
    assert!(matches!(
        result,
        Err(JxlError::Engine(EngineFailure::Unknown(0x99)))
    ));
}

#[test]
fn test_buffering_pushed_last_when_set() {
    let mut encoder = rgb_encoder(2, 2);
    encoder
        .new_frame()
        .buffering(Buffering::Minimal)
        .commit(PixelFormat::new(3, DataType::U8), vec![0u8; 12])
        .unwrap();

    let (log, result) = record(&encoder, |e| e);
    result.unwrap();
    assert_eq!(log.options().last(), Some(&(FrameSettingId::Buffering, 3)));
}
