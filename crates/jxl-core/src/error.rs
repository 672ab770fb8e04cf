//! Error types for JPEG XL encoder configuration and engine orchestration

use thiserror::Error;

/// Result type for JPEG XL operations
pub type JxlResult<T> = Result<T, JxlError>;

/// Failures reported by the codec engine that are not configuration mistakes
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFailure {
    #[error("generic encoder failure")]
    Generic,

    #[error("JPEG reconstruction data is too large")]
    JpegReconstruction,

    #[error("input is invalid or corrupt")]
    BadInput,

    #[error("options are not supported by this engine")]
    NotSupported,

    #[error("unknown engine status 0x{0:x}")]
    Unknown(u32),
}

/// Errors that can occur while configuring or encoding a JPEG XL image
#[derive(Error, Debug)]
pub enum JxlError {
    #[error("{0} must be set")]
    MissingField(&'static str),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{0:?} is not a valid FourCC")]
    InvalidFourCc(String),

    #[error("Box type {0:?} is reserved for the engine")]
    ReservedBoxType(String),

    #[error("Extra channel index {index} is too large for an encoder with {capacity} extra channels")]
    ExtraChannelCapacity { index: usize, capacity: u32 },

    #[error("Attempting to set a {option} option while {strategy} encoding is forced")]
    StrategyConflict {
        option: &'static str,
        strategy: &'static str,
    },

    #[error("Attempting to commit a frame as JPEG when it has already had raw extra channel data added")]
    JpegWithExtraChannels,

    #[error("Extra channel of type {channel_type} cannot carry {field}")]
    ExtraChannelFieldMismatch {
        field: &'static str,
        channel_type: &'static str,
    },

    #[error("Not enough data for the frame size and data format (need {expected} bytes, got {actual} bytes)")]
    BufferTooSmall { expected: usize, actual: usize },

    #[error("Engine error: {0}")]
    Engine(#[from] EngineFailure),

    #[error("Inappropriate API usage reported by the engine")]
    ApiUsage,

    #[error("Out of memory")]
    OutOfMemory,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Coarse classification of a [`JxlError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller mistake, detected locally or reported late by the engine
    Configuration,
    /// A pixel or channel buffer is shorter than the declared format requires
    Sizing,
    /// Failure originating inside the codec engine
    Engine,
    /// The engine ran out of memory
    ResourceExhausted,
    /// Writing the output stream failed
    Io,
}

impl JxlError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            JxlError::MissingField(_)
            | JxlError::InvalidParameter(_)
            | JxlError::InvalidFourCc(_)
            | JxlError::ReservedBoxType(_)
            | JxlError::ExtraChannelCapacity { .. }
            | JxlError::StrategyConflict { .. }
            | JxlError::JpegWithExtraChannels
            | JxlError::ExtraChannelFieldMismatch { .. }
            | JxlError::ApiUsage => ErrorKind::Configuration,
            JxlError::BufferTooSmall { .. } => ErrorKind::Sizing,
            JxlError::Engine(_) => ErrorKind::Engine,
            JxlError::OutOfMemory => ErrorKind::ResourceExhausted,
            JxlError::IoError(_) => ErrorKind::Io,
        }
    }
}
