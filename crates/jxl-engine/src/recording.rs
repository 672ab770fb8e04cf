//! Call-recording engine
//!
//! [`RecordingEngine`] performs no compression. It appends every call it receives
//! to a shared [`CallLog`], including its own creation and destruction, and
//! produces a small fixed output. A single call can be made to fail with a chosen
//! status.

use crate::{
    BitDepthType, CodecEngine, EngineStatus, FrameSettingId, OutputStatus, ParallelRunner,
    SettingsHandle,
};
use jxl_core::{PixelFormat, ResolvedColorEncoding};
use jxl_headers::{BasicInfo, BlendInfo, ExtraChannelInfo, FrameHeader, CODESTREAM_SIGNATURE};
use std::sync::{Arc, Mutex};

/// One recorded engine call
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Create,
    UseContainer(bool),
    SetCodestreamLevel(i32),
    StoreJpegMetadata(bool),
    AllowExpertOptions,
    UseBoxes,
    AddBox {
        box_type: [u8; 4],
        contents: Vec<u8>,
        compress: bool,
    },
    SetBasicInfo(Box<BasicInfo>),
    SetColorEncoding(ResolvedColorEncoding),
    SetIccProfile(Vec<u8>),
    SetParallelRunner {
        threads: usize,
    },
    CreateFrameSettings(SettingsHandle),
    SetFrameHeader(FrameHeader),
    SetFrameName(String),
    SetFrameBitDepth(BitDepthType),
    SetFrameLossless(bool),
    SetFrameDistance(f32),
    SetOption(FrameSettingId, i64),
    SetFloatOption(FrameSettingId, f32),
    SetExtraChannelInfo(usize, ExtraChannelInfo),
    SetExtraChannelBlendInfo(usize, BlendInfo),
    SetExtraChannelName(usize, String),
    AddImageFrame {
        format: PixelFormat,
        len: usize,
    },
    AddJpegFrame {
        len: usize,
    },
    SetExtraChannelBuffer {
        index: usize,
        format: PixelFormat,
        len: usize,
    },
    CloseInput,
    ProcessOutput,
    Destroy,
}

impl EngineCall {
    /// Short name of the operation
    pub fn name(&self) -> &'static str {
        match self {
            EngineCall::Create => "create",
            EngineCall::UseContainer(_) => "use_container",
            EngineCall::SetCodestreamLevel(_) => "set_codestream_level",
            EngineCall::StoreJpegMetadata(_) => "store_jpeg_metadata",
            EngineCall::AllowExpertOptions => "allow_expert_options",
            EngineCall::UseBoxes => "use_boxes",
            EngineCall::AddBox { .. } => "add_box",
            EngineCall::SetBasicInfo(_) => "set_basic_info",
            EngineCall::SetColorEncoding(_) => "set_color_encoding",
            EngineCall::SetIccProfile(_) => "set_icc_profile",
            EngineCall::SetParallelRunner { .. } => "set_parallel_runner",
            EngineCall::CreateFrameSettings(_) => "create_frame_settings",
            EngineCall::SetFrameHeader(_) => "set_frame_header",
            EngineCall::SetFrameName(_) => "set_frame_name",
            EngineCall::SetFrameBitDepth(_) => "set_frame_bit_depth",
            EngineCall::SetFrameLossless(_) => "set_frame_lossless",
            EngineCall::SetFrameDistance(_) => "set_frame_distance",
            EngineCall::SetOption(..) => "set_option",
            EngineCall::SetFloatOption(..) => "set_float_option",
            EngineCall::SetExtraChannelInfo(..) => "set_extra_channel_info",
            EngineCall::SetExtraChannelBlendInfo(..) => "set_extra_channel_blend_info",
            EngineCall::SetExtraChannelName(..) => "set_extra_channel_name",
            EngineCall::AddImageFrame { .. } => "add_image_frame",
            EngineCall::AddJpegFrame { .. } => "add_jpeg_frame",
            EngineCall::SetExtraChannelBuffer { .. } => "set_extra_channel_buffer",
            EngineCall::CloseInput => "close_input",
            EngineCall::ProcessOutput => "process_output",
            EngineCall::Destroy => "destroy",
        }
    }
}

/// Shared, append-only list of recorded calls
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<EngineCall>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: EngineCall) {
        let mut calls = self.0.lock().unwrap_or_else(|e| e.into_inner());
        calls.push(call);
    }

    /// Snapshot of every call so far
    pub fn calls(&self) -> Vec<EngineCall> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Names of every call so far
    pub fn names(&self) -> Vec<&'static str> {
        self.calls().iter().map(EngineCall::name).collect()
    }

    /// Option values pushed with `set_option`, in order
    pub fn options(&self) -> Vec<(FrameSettingId, i64)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                EngineCall::SetOption(id, v) => Some((id, v)),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Engine that records calls instead of encoding
#[derive(Debug)]
pub struct RecordingEngine {
    log: CallLog,
    fail_on: Option<(&'static str, EngineStatus)>,
    output: Vec<u8>,
    position: usize,
    closed: bool,
    next_settings: usize,
}

impl RecordingEngine {
    /// Create an engine writing into `log`
    pub fn new(log: CallLog) -> Self {
        log.push(EngineCall::Create);
        Self {
            log,
            fail_on: None,
            output: CODESTREAM_SIGNATURE.to_vec(),
            position: 0,
            closed: false,
            next_settings: 0,
        }
    }

    /// Make the first call named `call` return `status`
    pub fn failing_on(mut self, call: &'static str, status: EngineStatus) -> Self {
        self.fail_on = Some((call, status));
        self
    }

    /// Bytes produced by `process_output`
    pub fn with_output(mut self, output: Vec<u8>) -> Self {
        self.output = output;
        self
    }

    fn record(&mut self, call: EngineCall) -> EngineStatus {
        let name = call.name();
        self.log.push(call);
        match self.fail_on {
            Some((target, status)) if target == name => {
                self.fail_on = None;
                status
            }
            _ => EngineStatus::Success,
        }
    }
}

impl Drop for RecordingEngine {
    fn drop(&mut self) {
        self.log.push(EngineCall::Destroy);
    }
}

impl CodecEngine for RecordingEngine {
    fn use_container(&mut self, use_container: bool) -> EngineStatus {
        self.record(EngineCall::UseContainer(use_container))
    }

    fn set_codestream_level(&mut self, level: i32) -> EngineStatus {
        self.record(EngineCall::SetCodestreamLevel(level))
    }

    fn store_jpeg_metadata(&mut self, store: bool) -> EngineStatus {
        self.record(EngineCall::StoreJpegMetadata(store))
    }

    fn allow_expert_options(&mut self) {
        self.record(EngineCall::AllowExpertOptions);
    }

    fn use_boxes(&mut self) -> EngineStatus {
        self.record(EngineCall::UseBoxes)
    }

    fn add_box(&mut self, box_type: [u8; 4], contents: &[u8], compress: bool) -> EngineStatus {
        self.record(EngineCall::AddBox {
            box_type,
            contents: contents.to_vec(),
            compress,
        })
    }

    fn set_basic_info(&mut self, info: &BasicInfo) -> EngineStatus {
        self.record(EngineCall::SetBasicInfo(Box::new(info.clone())))
    }

    fn set_color_encoding(&mut self, encoding: &ResolvedColorEncoding) -> EngineStatus {
        self.record(EngineCall::SetColorEncoding(*encoding))
    }

    fn set_icc_profile(&mut self, icc: &[u8]) -> EngineStatus {
        self.record(EngineCall::SetIccProfile(icc.to_vec()))
    }

    fn set_parallel_runner(&mut self, runner: &ParallelRunner) -> EngineStatus {
        self.record(EngineCall::SetParallelRunner {
            threads: runner.num_threads(),
        })
    }

    fn create_frame_settings(&mut self) -> SettingsHandle {
        let handle = SettingsHandle(self.next_settings);
        self.next_settings += 1;
        self.record(EngineCall::CreateFrameSettings(handle));
        handle
    }

    fn set_frame_header(&mut self, _: SettingsHandle, header: &FrameHeader) -> EngineStatus {
        self.record(EngineCall::SetFrameHeader(*header))
    }

    fn set_frame_name(&mut self, _: SettingsHandle, name: &str) -> EngineStatus {
        self.record(EngineCall::SetFrameName(name.to_string()))
    }

    fn set_frame_bit_depth(&mut self, _: SettingsHandle, depth: BitDepthType) -> EngineStatus {
        self.record(EngineCall::SetFrameBitDepth(depth))
    }

    fn set_frame_lossless(&mut self, _: SettingsHandle, lossless: bool) -> EngineStatus {
        self.record(EngineCall::SetFrameLossless(lossless))
    }

    fn set_frame_distance(&mut self, _: SettingsHandle, distance: f32) -> EngineStatus {
        self.record(EngineCall::SetFrameDistance(distance))
    }

    fn set_option(&mut self, _: SettingsHandle, id: FrameSettingId, value: i64) -> EngineStatus {
        self.record(EngineCall::SetOption(id, value))
    }

    fn set_float_option(
        &mut self,
        _: SettingsHandle,
        id: FrameSettingId,
        value: f32,
    ) -> EngineStatus {
        self.record(EngineCall::SetFloatOption(id, value))
    }

    fn set_extra_channel_info(&mut self, index: usize, info: &ExtraChannelInfo) -> EngineStatus {
        self.record(EngineCall::SetExtraChannelInfo(index, info.clone()))
    }

    fn set_extra_channel_blend_info(
        &mut self,
        _: SettingsHandle,
        index: usize,
        blend_info: &BlendInfo,
    ) -> EngineStatus {
        self.record(EngineCall::SetExtraChannelBlendInfo(index, *blend_info))
    }

    fn set_extra_channel_name(&mut self, index: usize, name: &str) -> EngineStatus {
        self.record(EngineCall::SetExtraChannelName(index, name.to_string()))
    }

    fn add_image_frame(
        &mut self,
        _: SettingsHandle,
        format: &PixelFormat,
        data: &[u8],
    ) -> EngineStatus {
        self.record(EngineCall::AddImageFrame {
            format: *format,
            len: data.len(),
        })
    }

    fn add_jpeg_frame(&mut self, _: SettingsHandle, data: &[u8]) -> EngineStatus {
        self.record(EngineCall::AddJpegFrame { len: data.len() })
    }

    fn set_extra_channel_buffer(
        &mut self,
        _: SettingsHandle,
        format: &PixelFormat,
        data: &[u8],
        index: usize,
    ) -> EngineStatus {
        self.record(EngineCall::SetExtraChannelBuffer {
            index,
            format: *format,
            len: data.len(),
        })
    }

    fn close_input(&mut self) {
        self.closed = true;
        self.record(EngineCall::CloseInput);
    }

    fn process_output(&mut self, out: &mut [u8]) -> (OutputStatus, usize) {
        let status = self.record(EngineCall::ProcessOutput);
        if !status.is_success() {
            return (OutputStatus::Error(status), 0);
        }
        if !self.closed {
            return (OutputStatus::Error(EngineStatus::ApiUsage), 0);
        }
        let remaining = &self.output[self.position..];
        let n = remaining.len().min(out.len());
        out[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        if self.position == self.output.len() {
            (OutputStatus::Success, n)
        } else {
            (OutputStatus::NeedMoreOutput, n)
        }
    }
}
