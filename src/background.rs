//! Background removal
//!
//! Isolates the dark signature/stamp mark from the paper background:
//! grayscale, Gaussian blur, inverted binarization (global or adaptive),
//! morphological closing, then contour-based mask synthesis. The mask
//! is applied to the color buffer so background pixels become zero, and
//! kept alongside so the compositor can use it as the alpha channel.
//!
//! Finding no foreground at all is not an error here; the result is an
//! all-zero mask and downstream a fully transparent image.

use image::{GrayImage, RgbImage};
use imageproc::contrast::{adaptive_threshold, threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology;

use crate::contour::{extract_regions, fill_regions, ContourRegion};
use crate::options::ProcessingOptions;
use crate::util::sigma_for_kernel;

/// Block radius for the adaptive local-mean threshold (11x11 window)
const ADAPTIVE_BLOCK_RADIUS: u32 = 5;

/// Outcome of background removal
#[derive(Debug)]
pub struct BackgroundRemoval {
    /// Input buffer with non-foreground pixels zeroed
    pub image: RgbImage,
    /// Binary foreground mask (255 inside retained contours)
    pub mask: GrayImage,
    /// Contours that survived the area filter
    pub regions: Vec<ContourRegion>,
}

/// Remove the paper background from a color buffer
pub fn remove_background(image: RgbImage, options: &ProcessingOptions) -> BackgroundRemoval {
    let (width, height) = image.dimensions();

    let gray = image::imageops::grayscale(&image);
    let blurred = blur(gray, options.blur_kernel_size);
    let binary = binarize(&blurred, options);
    drop(blurred);
    let closed = close_mask(binary, options.morph_kernel_size);

    let regions = extract_regions(&closed, options.contour_min_area);
    drop(closed);
    let mask = fill_regions(width, height, &regions);

    let image = apply_mask(image, &mask);

    BackgroundRemoval {
        image,
        mask,
        regions,
    }
}

/// Gaussian blur driven by an odd kernel size; size 1 is the identity
fn blur(gray: GrayImage, kernel_size: u32) -> GrayImage {
    if kernel_size <= 1 {
        return gray;
    }
    gaussian_blur_f32(&gray, sigma_for_kernel(kernel_size))
}

/// Inverted binarization: dark marks become the "on" class
fn binarize(blurred: &GrayImage, options: &ProcessingOptions) -> GrayImage {
    if options.use_adaptive_threshold {
        let mut binary = adaptive_threshold(blurred, ADAPTIVE_BLOCK_RADIUS);
        image::imageops::invert(&mut binary);
        binary
    } else {
        threshold(blurred, options.threshold_value, ThresholdType::BinaryInverted)
    }
}

/// Morphological closing (dilate then erode) with an elliptical
/// structuring element; merges small gaps in the foreground mask
fn close_mask(binary: GrayImage, kernel_size: u32) -> GrayImage {
    let radius = (kernel_size / 2).min(u8::MAX as u32) as u8;
    if radius == 0 {
        return binary;
    }
    morphology::close(&binary, Norm::L2, radius)
}

/// Zero out every pixel where the mask is off
pub fn apply_mask(image: RgbImage, mask: &GrayImage) -> RgbImage {
    let mut out = image;
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        if mask.get_pixel(x, y).0[0] == 0 {
            pixel.0 = [0, 0, 0];
        }
    }
    out
}
