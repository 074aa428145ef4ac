//! Image buffer adapter
//!
//! Boundary between opaque encoded bytes and the addressable pixel
//! buffers the pipeline stages work on. Decoding accepts any raster
//! format the `image` crate recognizes (JPEG and PNG in practice);
//! encoding always produces PNG, the only common format that keeps the
//! alpha channel lossless.
//!
//! Every transform in this crate consumes its input buffer by value and
//! returns a new owned buffer. Intermediate buffers are dropped at the
//! end of the stage that produced them, on success and error paths
//! alike, so no buffer outlives the request that created it.

use image::{DynamicImage, RgbImage, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

use crate::util::png_data_uri;

/// Buffer adapter error types
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, BufferError>;

/// Decode an encoded image byte stream into an owned RGB buffer
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage> {
    let img = image::load_from_memory(bytes).map_err(|e| BufferError::Decode(e.to_string()))?;
    Ok(img.to_rgb8())
}

/// Encode an RGBA buffer as PNG bytes
pub fn encode_png(image: RgbaImage) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(BufferError::Encode("empty image".to_string()));
    }

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| BufferError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Final artifact of a pipeline run
///
/// Carries the encoded PNG with alpha plus the metadata external
/// callers (gallery, download, preview) consume. This is a plain value
/// with no further lifecycle.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// Encoded PNG bytes with alpha channel
    pub png: Vec<u8>,
    /// Pixel width of the output
    pub width: u32,
    /// Pixel height of the output
    pub height: u32,
    /// Encoded size in bytes
    pub byte_size: usize,
    /// Number of foreground regions that survived filtering; zero means
    /// a fully transparent (but still valid) result
    pub foreground_regions: usize,
}

impl ProcessingResult {
    /// Encode an RGBA buffer into a finished result
    pub fn from_rgba(image: RgbaImage, foreground_regions: usize) -> Result<Self> {
        let (width, height) = image.dimensions();
        let png = encode_png(image)?;
        let byte_size = png.len();
        Ok(Self {
            png,
            width,
            height,
            byte_size,
            foreground_regions,
        })
    }

    /// Renderable `data:image/png;base64,` handle for the artifact
    pub fn data_uri(&self) -> String {
        png_data_uri(&self.png)
    }

    /// True when background removal found no foreground at all
    pub fn is_blank(&self) -> bool {
        self.foreground_regions == 0
    }
}
