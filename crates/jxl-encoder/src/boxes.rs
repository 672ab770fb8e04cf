//! Container metadata boxes

use crate::encoder::Encoder;
use jxl_headers::BoxType;
use log::trace;

/// A committed metadata box
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataBox {
    pub box_type: BoxType,
    /// Ask the engine to wrap the contents in a `brob` box
    pub compressed: bool,
    pub contents: Vec<u8>,
}

/// Builder for one metadata box, returned by [`Encoder::add_box`]
///
/// Only the payload is supplied here; size and type framing is written by the engine.
#[derive(Debug)]
pub struct BoxBuilder<'a> {
    owner: &'a mut Encoder,
    box_type: BoxType,
    compressed: bool,
}

impl<'a> BoxBuilder<'a> {
    pub(crate) fn new(owner: &'a mut Encoder, box_type: BoxType) -> Self {
        Self {
            owner,
            box_type,
            compressed: false,
        }
    }

    pub fn box_type(&self) -> BoxType {
        self.box_type
    }

    /// Request Brotli compression of the contents
    pub fn compressed(mut self) -> Self {
        self.compressed = true;
        self
    }

    /// Store `contents` and append the box to the encoder
    pub fn commit(self, contents: impl Into<Vec<u8>>) -> &'a mut Encoder {
        let contents = contents.into();
        trace!(
            "box {} committed with {} bytes",
            self.box_type.fourcc_string(),
            contents.len()
        );
        self.owner.boxes.push(MetadataBox {
            box_type: self.box_type,
            compressed: self.compressed,
            contents,
        });
        self.owner
    }
}
