//! # Raster - Image Codec
//!
//! Decodes uploaded photo bytes into raster buffers and encodes pipeline
//! outputs back to PNG. Decoding is bounded by [`DecodeLimits`] so a single
//! request cannot exhaust memory; encoding always goes through PNG because
//! the overlay stages depend on lossless alpha.
//!
//! Every image in the pipeline is a value: stages never mutate a decoded
//! buffer in place, they produce new ones.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, RasterError>;

/// Errors produced while decoding or encoding raster images
#[derive(Error, Debug)]
pub enum RasterError {
    #[error("could not identify image format")]
    UnknownFormat,

    #[error("image dimensions {width}x{height} exceed limit {max_width}x{max_height}")]
    TooLarge {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },

    #[error("image decode failed: {0}")]
    Decode(#[source] image::ImageError),

    #[error("image encode failed: {0}")]
    Encode(#[source] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Upper bounds applied before a full decode is attempted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodeLimits {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_width: 8192,
            max_height: 8192,
        }
    }
}

/// Decode raw upload bytes into a [`DynamicImage`].
///
/// The format is sniffed from the bytes, dimensions are read from the
/// header and checked against `limits` before pixel data is decoded.
pub fn decode(bytes: &[u8], limits: DecodeLimits) -> Result<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader.format().ok_or(RasterError::UnknownFormat)?;

    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(RasterError::Decode)?;
    if width > limits.max_width || height > limits.max_height {
        return Err(RasterError::TooLarge {
            width,
            height,
            max_width: limits.max_width,
            max_height: limits.max_height,
        });
    }

    ImageReader::with_format(Cursor::new(bytes), format)
        .decode()
        .map_err(RasterError::Decode)
}

/// Encode an image as PNG bytes, preserving any alpha channel losslessly.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(RasterError::Encode)?;
    Ok(buf.into_inner())
}
