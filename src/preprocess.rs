//! Image preprocessing
//!
//! Brightness/contrast remap and optional sharpening, applied before
//! skew correction and background removal. Both operations are pure
//! functions over an owned buffer and are defined for any input; there
//! are no error conditions at this stage.

use image::{Rgb, RgbImage};
use imageproc::filter::filter3x3;
use rayon::prelude::*;

/// Edge-enhancing sharpen kernel. Sums to 1, so overall luminance is
/// preserved while local contrast at edges increases.
const SHARPEN_KERNEL: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

/// Remap every sample to `clamp(v * contrast + brightness, 0, 255)`
pub fn adjust_brightness_contrast(image: RgbImage, brightness: i32, contrast: f32) -> RgbImage {
    let mut out = image;
    // The remap is independent per sample, so chunks of the flat sample
    // buffer can run in parallel without changing the result.
    let samples: &mut [u8] = &mut out;
    samples.par_chunks_mut(4096).for_each(|chunk| {
        for v in chunk.iter_mut() {
            *v = (*v as f32 * contrast + brightness as f32)
                .round()
                .clamp(0.0, 255.0) as u8;
        }
    });
    out
}

/// Convolve with the 3x3 sharpen kernel, replicating border pixels
pub fn sharpen(image: RgbImage) -> RgbImage {
    filter3x3::<Rgb<u8>, f32, u8>(&image, &SHARPEN_KERNEL)
}
