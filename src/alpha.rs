//! Alpha compositing
//!
//! Turns a 3-channel result plus an optional binary mask into the final
//! 4-channel RGBA buffer. When the background remover produced a mask
//! it becomes the alpha channel directly; without one, alpha is derived
//! from luminance so that anything non-black stays opaque. The
//! handwriting capture path uses the white chroma-key variant, which is
//! the same compositing contract with a trivially derived mask.

use image::{GrayImage, Luma, Rgba, RgbaImage, RgbImage};

/// Compose an RGBA buffer from a color buffer and an optional mask
///
/// The mask, when given, must match the buffer's dimensions; it is
/// copied into the alpha channel unchanged. Without a mask, alpha is
/// derived by thresholding luminance at 1: pure black becomes fully
/// transparent and everything else fully opaque.
pub fn to_transparent(image: RgbImage, mask: Option<&GrayImage>) -> RgbaImage {
    if let Some(mask) = mask {
        debug_assert_eq!(mask.dimensions(), image.dimensions());
    }

    let (width, height) = image.dimensions();
    let mut out = RgbaImage::new(width, height);

    match mask {
        Some(mask) => {
            for (x, y, pixel) in image.enumerate_pixels() {
                let [r, g, b] = pixel.0;
                let a = mask.get_pixel(x, y).0[0];
                out.put_pixel(x, y, Rgba([r, g, b, a]));
            }
        }
        None => {
            let gray = image::imageops::grayscale(&image);
            for (x, y, pixel) in image.enumerate_pixels() {
                let [r, g, b] = pixel.0;
                let a = if gray.get_pixel(x, y).0[0] > 1 { 255 } else { 0 };
                out.put_pixel(x, y, Rgba([r, g, b, a]));
            }
        }
    }

    out
}

/// Chroma-key variant for stroke-capture rasters: white background
/// becomes transparent, every other pixel stays fully opaque
pub fn white_to_transparent(image: RgbImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut mask = GrayImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0 != [255, 255, 255] {
            mask.put_pixel(x, y, Luma([255u8]));
        }
    }
    to_transparent(image, Some(&mask))
}
