//! Core types and utilities for the JPEG XL encoder builder
//!
//! This crate provides the value types shared by the builders and the codec
//! engines: the error taxonomy, sample data types, pixel buffer descriptors with
//! their size arithmetic, and the color encoding model.

pub mod color;
pub mod consts;
pub mod error;
pub mod pixel;
pub mod types;

pub use color::*;
pub use error::{EngineFailure, ErrorKind, JxlError, JxlResult};
pub use pixel::{downsampled_extent, PixelBuffer, PixelFormat};
pub use types::*;
