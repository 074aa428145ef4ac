//! Processing options for the signature extraction pipeline
//!
//! A single value record drives every pipeline stage. Options can be
//! built in code, overridden per call, or loaded from a JSON file;
//! omitted fields fall back to defaults and unrecognized fields are
//! ignored so older option files keep working.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::util::odd_kernel;

/// Options error types
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("Options file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid options file: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Options controlling the photo-to-transparent-signature pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingOptions {
    /// Additive brightness offset applied to every sample
    pub brightness: i32,
    /// Multiplicative contrast factor applied to every sample
    pub contrast: f32,
    /// Apply the 3x3 edge-enhancing sharpen kernel after the remap
    pub sharpen: bool,

    /// Gaussian blur kernel size before binarization (odd, >= 1)
    pub blur_kernel_size: u32,
    /// Global binarization threshold (0-255), inverted so dark marks
    /// become the foreground class
    pub threshold_value: u8,
    /// Use a local-mean adaptive threshold instead of the global one
    /// (for unevenly lit photographs)
    pub use_adaptive_threshold: bool,
    /// Structuring element size for morphological closing (odd, >= 1)
    pub morph_kernel_size: u32,
    /// Minimum enclosed contour area in px^2; smaller regions are
    /// treated as sensor noise and dropped
    pub contour_min_area: f64,

    /// Estimate and correct document skew before background removal
    pub correct_rotation: bool,
    /// Canny hysteresis low threshold
    pub canny_low: f32,
    /// Canny hysteresis high threshold
    pub canny_high: f32,
    /// Minimum Hough vote count for a detected line
    pub hough_threshold: u32,
    /// Only line angles within +/- this range (degrees) vote for the
    /// skew estimate; steeper lines are treated as artifacts
    pub angle_search_range: f64,
    /// Skew magnitudes at or below this many degrees are left alone to
    /// avoid needless resampling blur
    pub rotation_deadband: f64,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            brightness: 10,
            contrast: 1.2,
            sharpen: true,
            blur_kernel_size: 5,
            threshold_value: 127,
            use_adaptive_threshold: false,
            morph_kernel_size: 3,
            contour_min_area: 100.0,
            correct_rotation: true,
            canny_low: 50.0,
            canny_high: 150.0,
            hough_threshold: 100,
            angle_search_range: 45.0,
            rotation_deadband: 0.5,
        }
    }
}

impl ProcessingOptions {
    /// Create a new options builder
    pub fn builder() -> ProcessingOptionsBuilder {
        ProcessingOptionsBuilder::default()
    }

    /// Options for a flatbed-scanned page: no skew to fix, even
    /// lighting, so a plain global threshold suffices
    pub fn scanned() -> Self {
        Self {
            correct_rotation: false,
            brightness: 0,
            contrast: 1.0,
            ..Default::default()
        }
    }

    /// Options for a handheld photo under uneven light
    pub fn photographed() -> Self {
        Self {
            use_adaptive_threshold: true,
            ..Default::default()
        }
    }

    /// Load options from a JSON file
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, OptionsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OptionsError::FileNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| OptionsError::InvalidFormat(e.to_string()))
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Return a copy with out-of-range fields coerced into their valid
    /// domain: odd kernel sizes, ordered Canny thresholds, non-negative
    /// areas and angles
    pub fn normalized(&self) -> Self {
        let mut opts = self.clone();
        opts.blur_kernel_size = odd_kernel(opts.blur_kernel_size);
        opts.morph_kernel_size = odd_kernel(opts.morph_kernel_size);
        opts.canny_high = opts.canny_high.clamp(1.0, 1000.0);
        opts.canny_low = opts.canny_low.clamp(1.0, opts.canny_high);
        opts.contour_min_area = opts.contour_min_area.max(0.0);
        opts.angle_search_range = opts.angle_search_range.abs();
        opts.rotation_deadband = opts.rotation_deadband.abs();
        opts
    }
}

/// Builder for [`ProcessingOptions`]
#[derive(Debug, Default)]
pub struct ProcessingOptionsBuilder {
    options: ProcessingOptions,
}

impl ProcessingOptionsBuilder {
    /// Set the brightness offset
    pub fn brightness(mut self, brightness: i32) -> Self {
        self.options.brightness = brightness;
        self
    }

    /// Set the contrast factor
    pub fn contrast(mut self, contrast: f32) -> Self {
        self.options.contrast = contrast;
        self
    }

    /// Enable or disable sharpening
    pub fn sharpen(mut self, sharpen: bool) -> Self {
        self.options.sharpen = sharpen;
        self
    }

    /// Set the blur kernel size (coerced to odd >= 1)
    pub fn blur_kernel_size(mut self, size: u32) -> Self {
        self.options.blur_kernel_size = odd_kernel(size);
        self
    }

    /// Set the global binarization threshold
    pub fn threshold_value(mut self, value: u8) -> Self {
        self.options.threshold_value = value;
        self
    }

    /// Enable or disable the adaptive threshold
    pub fn use_adaptive_threshold(mut self, adaptive: bool) -> Self {
        self.options.use_adaptive_threshold = adaptive;
        self
    }

    /// Set the morphological closing kernel size (coerced to odd >= 1)
    pub fn morph_kernel_size(mut self, size: u32) -> Self {
        self.options.morph_kernel_size = odd_kernel(size);
        self
    }

    /// Set the minimum retained contour area
    pub fn contour_min_area(mut self, area: f64) -> Self {
        self.options.contour_min_area = area.max(0.0);
        self
    }

    /// Enable or disable rotation correction
    pub fn correct_rotation(mut self, correct: bool) -> Self {
        self.options.correct_rotation = correct;
        self
    }

    /// Set the Canny hysteresis thresholds
    pub fn canny_thresholds(mut self, low: f32, high: f32) -> Self {
        self.options.canny_low = low;
        self.options.canny_high = high;
        self
    }

    /// Set the Hough vote threshold
    pub fn hough_threshold(mut self, votes: u32) -> Self {
        self.options.hough_threshold = votes;
        self
    }

    /// Set the angle search range in degrees
    pub fn angle_search_range(mut self, degrees: f64) -> Self {
        self.options.angle_search_range = degrees.abs();
        self
    }

    /// Set the rotation deadband in degrees
    pub fn rotation_deadband(mut self, degrees: f64) -> Self {
        self.options.rotation_deadband = degrees.abs();
        self
    }

    /// Build the options
    pub fn build(self) -> ProcessingOptions {
        self.options
    }
}
