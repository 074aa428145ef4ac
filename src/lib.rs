//! stampmaker - Transparent signature/stamp extractor
//!
//! A complete Rust implementation for turning photographed signatures,
//! name stamps, and hand-drawn marks into clean transparent PNGs.
//!
//! # Features
//!
//! - **Buffer Adapter** ([`buffer`]) - Decode photos and encode transparent PNGs
//! - **Preprocessing** ([`preprocess`]) - Brightness/contrast remap and sharpening
//! - **Rotation Correction** ([`rotation`]) - Hough-based skew detection and leveling
//! - **Background Removal** ([`background`]) - Threshold, close, and contour-filter
//!   the paper away from the ink
//! - **Alpha Compositing** ([`alpha`]) - Mask-to-alpha and white chroma keying
//! - **Pipeline** ([`pipeline`]) - Stage sequencing with per-item batch isolation
//! - **Gallery** ([`gallery`]) - JSON-file store for processed marks
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use stampmaker::{ProcessingOptions, StampProcessor};
//!
//! let processor = StampProcessor::initialized(ProcessingOptions::default());
//! let photo = std::fs::read("signature_photo.jpg").unwrap();
//! let result = processor.process(&photo).unwrap();
//! std::fs::write("signature.png", &result.png).unwrap();
//! ```
//!
//! ## Using Builder Patterns
//!
//! ```rust
//! use stampmaker::ProcessingOptions;
//!
//! let options = ProcessingOptions::builder()
//!     .threshold_value(110)
//!     .use_adaptive_threshold(true)
//!     .contour_min_area(250.0)
//!     .build();
//!
//! // Or use presets
//! let scanned = ProcessingOptions::scanned();
//! let photographed = ProcessingOptions::photographed();
//! ```
//!
//! # Architecture
//!
//! The stages run strictly in sequence, each consuming the previous
//! stage's buffer:
//!
//! ```text
//! Decode -> Preprocess -> Sharpen -> Rotation Correction
//!                                        |
//!                               Background Removal
//!                                        |
//!                        Alpha Compositing -> PNG Encode
//! ```
//!
//! # License
//!
//! AGPL-3.0

pub mod alpha;
pub mod background;
pub mod buffer;
pub mod cli;
pub mod contour;
pub mod gallery;
pub mod options;
pub mod pipeline;
pub mod preprocess;
pub mod rotation;
pub mod util;

// Re-exports for convenience
pub use alpha::{to_transparent, white_to_transparent};
pub use background::{remove_background, BackgroundRemoval};
pub use buffer::{decode_rgb, encode_png, BufferError, ProcessingResult};
pub use cli::{
    create_progress_bar, create_spinner, ChromaArgs, Cli, Commands, ExitCode, GalleryArgs,
    ProcessArgs,
};
pub use contour::{extract_regions, fill_regions, ContourRegion};
pub use gallery::{GalleryEntry, GalleryError, GalleryKind, GalleryStore};
pub use options::{OptionsError, ProcessingOptions, ProcessingOptionsBuilder};
pub use pipeline::{
    ensure_runtime, BatchOutcome, PipelineError, ProgressCallback, SilentProgress, StampProcessor,
};
pub use preprocess::{adjust_brightness_contrast, sharpen};
pub use rotation::{correct_rotation, detect_skew, RotationOutcome, SkewDetection};
pub use util::{
    clamp, format_duration, format_file_size, odd_kernel, png_data_uri, sigma_for_kernel,
};

/// Exit codes for CLI (deprecated: prefer using `ExitCode` enum)
///
/// These constants are provided for backward compatibility.
/// The `ExitCode` enum provides a more type-safe alternative.
pub mod exit_codes {
    use super::ExitCode;

    pub const SUCCESS: i32 = ExitCode::Success as i32;
    pub const GENERAL_ERROR: i32 = ExitCode::GeneralError as i32;
    pub const INVALID_ARGS: i32 = ExitCode::InvalidArgs as i32;
    pub const INPUT_NOT_FOUND: i32 = ExitCode::InputNotFound as i32;
    pub const OUTPUT_ERROR: i32 = ExitCode::OutputError as i32;
    pub const PROCESSING_ERROR: i32 = ExitCode::ProcessingError as i32;
}
