//! Constants used throughout the JPEG XL encoder builder

/// Maximum encoded length of a frame or extra channel name, in UTF-8 bytes
pub const MAX_NAME_LENGTH: usize = 1071;

/// Size of the buffer used to drain engine output
pub const OUTPUT_CHUNK_SIZE: usize = 8192;

/// Default encoding effort (1-10)
pub const DEFAULT_EFFORT: i32 = 7;

/// Minimum and maximum effort values
pub const MIN_EFFORT: i32 = 1;
pub const MAX_EFFORT: i32 = 10;

/// Efforts at or above this value require expert options
pub const EXPERT_EFFORT: i32 = 10;

/// Minimum and maximum decoding speed tiers
pub const MIN_DECODING_SPEED: i32 = 0;
pub const MAX_DECODING_SPEED: i32 = 4;

/// Default Butteraugli distance of a new frame
pub const DEFAULT_DISTANCE: f32 = 1.0;

/// Largest distance the engine accepts
pub const MAX_DISTANCE: f32 = 25.0;

/// Highest reference frame slot usable for blending and saving
pub const MAX_REFERENCE_SLOT: u32 = 3;

/// Quality at or above which frames are encoded losslessly
pub const LOSSLESS_QUALITY: f32 = 100.0;
