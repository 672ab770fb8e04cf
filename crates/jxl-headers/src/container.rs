//! JPEG XL container format (ISO/IEC 18181-2)
//!
//! JPEG XL supports two bitstream formats:
//! 1. Naked codestream: 0xFF0A signature (minimal overhead)
//! 2. Container format: Box-based structure, required for metadata boxes
//!
//! Each box is framed as `[u32 big-endian length including header][4-byte type][payload]`.
//! Applications supply only box types and payloads; a handful of types are
//! owned by the container itself and may not be registered directly.

use jxl_core::*;
use std::io::{Read, Write};

/// JPEG XL container signature (12 bytes)
///
/// Format: `\0\0\0\x0C JXL \x0D\x0A\x87\x0A`
pub const CONTAINER_SIGNATURE: [u8; 12] = [
    0x00, 0x00, 0x00, 0x0C, // Box size = 12
    0x4A, 0x58, 0x4C, 0x20, // "JXL "
    0x0D, 0x0A, 0x87, 0x0A, // CR LF 0x87 LF
];

/// Naked codestream signature (2 bytes)
pub const CODESTREAM_SIGNATURE: [u8; 2] = [0xFF, 0x0A];

/// File type box (ftyp) brand
pub const BRAND_JXL: [u8; 4] = *b"jxl ";

/// Box types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxType {
    /// EXIF metadata, prefixed by a 4-byte TIFF header offset
    Exif,
    /// XML data, in particular XMP metadata
    Xml,
    /// JUMBF superbox
    Jumbf,
    /// Brotli-compressed wrapper around another box
    Brotli,
    /// Container signature box (reserved)
    Signature,
    /// File type box (reserved)
    FileType,
    /// Codestream box (reserved)
    Codestream,
    /// Codestream level box (reserved)
    Level,
    /// Frame index box (reserved)
    FrameIndex,
    /// Partial codestream box (reserved)
    PartialCodestream,
    /// Any other four-character type
    Other([u8; 4]),
}

impl BoxType {
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Self {
        match fourcc {
            b"Exif" => BoxType::Exif,
            b"xml " => BoxType::Xml,
            b"jumb" => BoxType::Jumbf,
            b"brob" => BoxType::Brotli,
            b"JXL " => BoxType::Signature,
            b"ftyp" => BoxType::FileType,
            b"jxlc" => BoxType::Codestream,
            b"jxll" => BoxType::Level,
            b"jxli" => BoxType::FrameIndex,
            b"jxlp" => BoxType::PartialCodestream,
            _ => BoxType::Other(*fourcc),
        }
    }

    pub fn to_fourcc(&self) -> [u8; 4] {
        match self {
            BoxType::Exif => *b"Exif",
            BoxType::Xml => *b"xml ",
            BoxType::Jumbf => *b"jumb",
            BoxType::Brotli => *b"brob",
            BoxType::Signature => *b"JXL ",
            BoxType::FileType => *b"ftyp",
            BoxType::Codestream => *b"jxlc",
            BoxType::Level => *b"jxll",
            BoxType::FrameIndex => *b"jxli",
            BoxType::PartialCodestream => *b"jxlp",
            BoxType::Other(fourcc) => *fourcc,
        }
    }

    /// Parse a four-character tag given as text
    ///
    /// Each character must fit in a single ISO-8859-1 byte.
    pub fn parse(tag: &str) -> JxlResult<Self> {
        let mut fourcc = [0u8; 4];
        let mut len = 0;
        for c in tag.chars() {
            let code = c as u32;
            if len == 4 || code > 0xFF {
                return Err(JxlError::InvalidFourCc(tag.to_string()));
            }
            fourcc[len] = code as u8;
            len += 1;
        }
        if len != 4 {
            return Err(JxlError::InvalidFourCc(tag.to_string()));
        }
        Ok(Self::from_fourcc(&fourcc))
    }

    /// Types written by the container itself and not usable by applications
    pub fn is_reserved(&self) -> bool {
        matches!(
            self,
            BoxType::Signature
                | BoxType::FileType
                | BoxType::Codestream
                | BoxType::Level
                | BoxType::FrameIndex
                | BoxType::PartialCodestream
        )
    }

    /// The type as printable text
    pub fn fourcc_string(&self) -> String {
        self.to_fourcc().iter().map(|&b| b as char).collect()
    }
}

/// A box in the JPEG XL container
#[derive(Debug, Clone, PartialEq)]
pub struct JxlBox {
    pub box_type: BoxType,
    pub data: Vec<u8>,
}

impl JxlBox {
    pub fn new(box_type: BoxType, data: Vec<u8>) -> Self {
        Self { box_type, data }
    }

    /// Create a file type box
    pub fn file_type(brand: [u8; 4], minor_version: u32, compatible_brands: &[[u8; 4]]) -> Self {
        let mut data = Vec::with_capacity(8 + 4 * compatible_brands.len());
        data.extend_from_slice(&brand);
        data.extend_from_slice(&minor_version.to_be_bytes());
        for compat_brand in compatible_brands {
            data.extend_from_slice(compat_brand);
        }
        Self::new(BoxType::FileType, data)
    }

    /// Create a codestream level box
    pub fn level(level: u8) -> Self {
        Self::new(BoxType::Level, vec![level])
    }

    /// Create a JXL codestream box
    pub fn codestream(codestream_data: Vec<u8>) -> Self {
        Self::new(BoxType::Codestream, codestream_data)
    }

    /// Number of bytes this box occupies once framed
    pub fn encoded_len(&self) -> u64 {
        let size = 8 + self.data.len() as u64;
        if size > u32::MAX as u64 {
            size + 8
        } else {
            size
        }
    }

    /// Write box to output
    pub fn write<W: Write>(&self, writer: &mut W) -> JxlResult<()> {
        let box_size = self.encoded_len();

        if box_size <= u32::MAX as u64 {
            writer.write_all(&(box_size as u32).to_be_bytes())?;
            writer.write_all(&self.box_type.to_fourcc())?;
        } else {
            // Extended size
            writer.write_all(&1u32.to_be_bytes())?;
            writer.write_all(&self.box_type.to_fourcc())?;
            writer.write_all(&box_size.to_be_bytes())?;
        }

        writer.write_all(&self.data)?;
        Ok(())
    }

    /// Read box from input
    pub fn read<R: Read>(reader: &mut R) -> JxlResult<Self> {
        let mut size_bytes = [0u8; 4];
        reader.read_exact(&mut size_bytes)?;
        let mut box_size = u32::from_be_bytes(size_bytes) as u64;

        let mut type_bytes = [0u8; 4];
        reader.read_exact(&mut type_bytes)?;
        let box_type = BoxType::from_fourcc(&type_bytes);

        let mut header_size = 8;
        if box_size == 1 {
            let mut extended_size_bytes = [0u8; 8];
            reader.read_exact(&mut extended_size_bytes)?;
            box_size = u64::from_be_bytes(extended_size_bytes);
            header_size = 16;
        }

        let data_size = box_size.checked_sub(header_size).ok_or_else(|| {
            JxlError::InvalidParameter(format!("box size {} is smaller than its header", box_size))
        })?;
        let mut data = vec![0u8; data_size as usize];
        reader.read_exact(&mut data)?;

        Ok(Self { box_type, data })
    }
}

/// JPEG XL container
#[derive(Debug, Clone, Default)]
pub struct Container {
    pub boxes: Vec<JxlBox>,
}

impl Container {
    pub fn new() -> Self {
        Self { boxes: Vec::new() }
    }

    /// Container with the mandatory file type box
    pub fn with_file_type() -> Self {
        let mut container = Self::new();
        container
            .boxes
            .push(JxlBox::file_type(BRAND_JXL, 0, &[BRAND_JXL]));
        container
    }

    pub fn push(&mut self, jxl_box: JxlBox) {
        self.boxes.push(jxl_box);
    }

    /// Write container to output
    pub fn write<W: Write>(&self, writer: &mut W) -> JxlResult<()> {
        writer.write_all(&CONTAINER_SIGNATURE)?;
        for box_item in &self.boxes {
            box_item.write(writer)?;
        }
        Ok(())
    }

    /// Read container from input
    pub fn read<R: Read>(reader: &mut R) -> JxlResult<Self> {
        let mut signature = [0u8; 12];
        reader.read_exact(&mut signature)?;

        if signature != CONTAINER_SIGNATURE {
            return Err(JxlError::InvalidParameter(
                "missing container signature".to_string(),
            ));
        }

        let mut boxes = Vec::new();
        loop {
            match JxlBox::read(reader) {
                Ok(box_item) => boxes.push(box_item),
                Err(JxlError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Self { boxes })
    }

    /// First box of the given type
    pub fn find(&self, box_type: BoxType) -> Option<&JxlBox> {
        self.boxes.iter().find(|b| b.box_type == box_type)
    }

    /// Concatenated codestream payload
    pub fn extract_codestream(&self) -> Option<Vec<u8>> {
        let mut codestream = Vec::new();
        for box_item in &self.boxes {
            if matches!(
                box_item.box_type,
                BoxType::Codestream | BoxType::PartialCodestream
            ) {
                codestream.extend_from_slice(&box_item.data);
            }
        }
        if codestream.is_empty() {
            None
        } else {
            Some(codestream)
        }
    }
}
