//! Rotation (skew) correction
//!
//! Photographed documents are rarely square to the camera. This module
//! estimates the dominant skew angle from straight structure in the
//! image (ruled lines, text baselines, paper edges) and rotates the
//! buffer back to level.
//!
//! Detection runs Canny edge detection followed by a Hough line
//! transform. Each detected line votes with its angle from vertical;
//! candidates steeper than `angle_search_range` are discarded, and the
//! median of the survivors is taken as the skew estimate. The median
//! rejects stray diagonal handwriting strokes that would bias a mean.
//! Estimates inside the deadband are ignored so already-square images
//! are returned untouched instead of being resampled.

use image::{Rgb, RgbImage};
use imageproc::edges::canny;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::hough::{detect_lines, LineDetectionOptions};

use crate::options::ProcessingOptions;

/// Non-maximum suppression radius for Hough peaks
const SUPPRESSION_RADIUS: u32 = 8;

/// Skew detection result
#[derive(Debug, Clone, Copy)]
pub struct SkewDetection {
    /// Estimated skew in degrees, normalized to [-90, 90)
    pub angle: f64,
    /// Number of lines that voted for the estimate
    pub line_count: usize,
}

/// Rotation correction outcome
#[derive(Debug)]
pub struct RotationOutcome {
    /// Level (or untouched) buffer
    pub image: RgbImage,
    /// The detection the decision was based on
    pub detection: SkewDetection,
    /// Whether a rotation was actually applied
    pub corrected: bool,
}

/// Estimate the skew angle of a color buffer
pub fn detect_skew(image: &RgbImage, options: &ProcessingOptions) -> SkewDetection {
    let gray = image::imageops::grayscale(image);

    let high = options.canny_high.clamp(1.0, 1000.0);
    let low = options.canny_low.clamp(1.0, high);
    let edges = canny(&gray, low, high);
    drop(gray);

    let lines = detect_lines(
        &edges,
        LineDetectionOptions {
            vote_threshold: options.hough_threshold,
            suppression_radius: SUPPRESSION_RADIUS,
        },
    );

    // Hough reports the angle of each line's normal from the x-axis in
    // [0, 180); subtracting 90 gives the line angle from horizontal,
    // already inside [-90, 90).
    let mut angles: Vec<f64> = lines
        .iter()
        .map(|line| line.angle_in_degrees as f64 - 90.0)
        .filter(|a| a.abs() < options.angle_search_range)
        .collect();

    if angles.is_empty() {
        return SkewDetection {
            angle: 0.0,
            line_count: 0,
        };
    }

    let angle = median(&mut angles);
    SkewDetection {
        angle,
        line_count: angles.len(),
    }
}

/// Correct document skew, consuming the buffer
///
/// Rotates by the negated skew estimate about the image center with
/// bilinear interpolation, filling exposed borders with opaque white.
/// Output dimensions equal input dimensions. If the estimate falls
/// inside the deadband the input is returned unchanged.
pub fn correct_rotation(image: RgbImage, options: &ProcessingOptions) -> RotationOutcome {
    let detection = detect_skew(&image, options);

    if detection.angle.abs() <= options.rotation_deadband {
        return RotationOutcome {
            image,
            detection,
            corrected: false,
        };
    }

    let rotated = rotate_about_center(
        &image,
        (-detection.angle).to_radians() as f32,
        Interpolation::Bilinear,
        Rgb([255u8, 255, 255]),
    );

    RotationOutcome {
        image: rotated,
        detection,
        corrected: true,
    }
}

/// Median of a slice; the mean of the two middle values when the count
/// is even
fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ruled_page(width: u32, height: u32) -> RgbImage {
        let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        for row in (40..height - 40).step_by(50) {
            for dy in 0..3 {
                for x in 20..width - 20 {
                    img.put_pixel(x, row + dy, Rgb([20, 20, 20]));
                }
            }
        }
        img
    }

    fn rotate_by(image: &RgbImage, degrees: f64) -> RgbImage {
        rotate_about_center(
            image,
            degrees.to_radians() as f32,
            Interpolation::Bilinear,
            Rgb([255u8, 255, 255]),
        )
    }

    #[test]
    fn test_median_odd_count() {
        let mut values = vec![9.0, 1.0, 5.0];
        assert_eq!(median(&mut values), 5.0);
    }

    #[test]
    fn test_median_even_count_averages_middle() {
        let mut values = vec![1.0, 3.0, 5.0, 7.0];
        assert_eq!(median(&mut values), 4.0);
    }

    #[test]
    fn test_median_empty() {
        let mut values: Vec<f64> = vec![];
        assert_eq!(median(&mut values), 0.0);
    }

    #[test]
    fn test_detect_level_page_near_zero() {
        let detection = detect_skew(&ruled_page(400, 300), &ProcessingOptions::default());

        assert!(detection.line_count > 0);
        assert!(
            detection.angle.abs() <= 1.0,
            "level page detected as {} degrees",
            detection.angle
        );
    }

    #[test]
    fn test_detect_blank_page_returns_zero() {
        let blank = RgbImage::from_pixel(200, 200, Rgb([255, 255, 255]));
        let detection = detect_skew(&blank, &ProcessingOptions::default());

        assert_eq!(detection.angle, 0.0);
        assert_eq!(detection.line_count, 0);
    }

    #[test]
    fn test_detect_synthetic_skew_magnitude() {
        let skewed = rotate_by(&ruled_page(400, 300), 7.0);
        let detection = detect_skew(&skewed, &ProcessingOptions::default());

        assert!(detection.line_count > 0);
        assert!(
            (detection.angle.abs() - 7.0).abs() <= 1.5,
            "expected ~7 degrees, detected {}",
            detection.angle
        );
    }

    #[test]
    fn test_correction_converges_to_level() {
        let options = ProcessingOptions::default();
        let skewed = rotate_by(&ruled_page(400, 300), 7.0);

        let outcome = correct_rotation(skewed, &options);
        assert!(outcome.corrected);

        let residual = detect_skew(&outcome.image, &options);
        assert!(
            residual.angle.abs() <= 1.0,
            "residual skew {} degrees after correction",
            residual.angle
        );
    }

    #[test]
    fn test_deadband_returns_input_unchanged() {
        let page = ruled_page(400, 300);
        let raw = page.as_raw().clone();

        let outcome = correct_rotation(page, &ProcessingOptions::default());

        assert!(!outcome.corrected);
        assert!(outcome.detection.angle.abs() <= 0.5);
        assert_eq!(outcome.image.as_raw(), &raw);
    }

    #[test]
    fn test_correction_keeps_dimensions() {
        let skewed = rotate_by(&ruled_page(400, 300), 5.0);
        let outcome = correct_rotation(skewed, &ProcessingOptions::default());
        assert_eq!(outcome.image.dimensions(), (400, 300));
    }
}
