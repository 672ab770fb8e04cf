//! Encode a generated RGBA gradient to a JPEG XL file
//!
//! Usage: cargo run --example encode_gradient -- [output.jxl] [width] [height]

use anyhow::{Context, Result};
use jxl::{
    ColorEncoding, DataType, Encoder, Endianness, ExtraChannelType, ParallelRunner, PixelFormat,
};
use std::env;
use std::fs;

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "gradient.jxl".to_string());
    let width: u32 = match args.next() {
        Some(w) => w.parse().context("width must be a number")?,
        None => 256,
    };
    let height: u32 = match args.next() {
        Some(h) => h.parse().context("height must be a number")?,
        None => 256,
    };

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            rgb.push((x * 255 / width.max(1)) as u8);
            rgb.push((y * 255 / height.max(1)) as u8);
            rgb.push(128);
            alpha.push(255 - (y * 255 / height.max(1)) as u8);
        }
    }

    let mut encoder = Encoder::new();
    encoder
        .color_encoding(ColorEncoding::srgb())
        .size(width, height)
        .bits_per_sample(8)
        .num_channels(3, 1)?
        .bits_per_alpha_sample(8);
    encoder
        .add_box("xml ")?
        .commit(b"<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>".to_vec());
    encoder
        .new_named_frame("gradient")?
        .quality(100.0)
        .effort(5)
        .new_named_extra_channel("alpha")?
        .channel_type(ExtraChannelType::Alpha)
        .bits_per_sample(8)
        .commit(DataType::U8, Endianness::Native, 0, alpha)?
        .commit(PixelFormat::new(3, DataType::U8), rgb)?;

    let runner = ParallelRunner::new()?;
    let bytes = encoder
        .encode(&runner)
        .with_context(|| format!("encoding {}x{} image", width, height))?;
    fs::write(&output, &bytes).with_context(|| format!("writing {}", output))?;
    println!("Wrote {} bytes to {}", bytes.len(), output);
    Ok(())
}
