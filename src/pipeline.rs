//! Pipeline orchestration
//!
//! Sequences the processing stages over one request at a time:
//!
//! Decode -> Preprocess -> [Sharpen] -> [RotationCorrect] ->
//! BackgroundRemove -> Composite -> Encode
//!
//! Any stage failure aborts only the current request. Each stage
//! consumes the previous stage's buffer by value and returns a new one,
//! so intermediates are dropped as soon as the next stage's output
//! exists, on every exit path.
//!
//! Batch processing runs items sequentially, isolates per-item
//! failures, and reports progress after every item regardless of its
//! outcome.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

use crate::alpha::{to_transparent, white_to_transparent};
use crate::background::remove_background;
use crate::buffer::{self, BufferError, ProcessingResult};
use crate::options::ProcessingOptions;
use crate::preprocess::{adjust_brightness_contrast, sharpen};
use crate::rotation::correct_rotation;

/// Pipeline error types
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to decode input image: {0}")]
    Decode(String),

    #[error("Failed to encode result image: {0}")]
    Encode(String),

    #[error("Processor used before initialization")]
    NotInitialized,

    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BufferError> for PipelineError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::Decode(msg) => PipelineError::Decode(msg),
            BufferError::Encode(msg) => PipelineError::Encode(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Progress callback for pipeline steps
pub trait ProgressCallback: Send + Sync {
    /// Called when a new step starts
    fn on_step_start(&self, step: &str);
    /// Called when a step completes
    fn on_step_complete(&self, step: &str, message: &str);
    /// Called for debug/verbose messages
    fn on_debug(&self, message: &str);
}

/// No-op progress callback (silent mode)
pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_step_start(&self, _step: &str) {}
    fn on_step_complete(&self, _step: &str, _message: &str) {}
    fn on_debug(&self, _message: &str) {}
}

/// Outcome of one batch item
#[derive(Debug)]
pub struct BatchOutcome {
    /// Position of the item in the input list
    pub index: usize,
    /// The item's result; failures are captured here instead of
    /// aborting the batch
    pub result: Result<ProcessingResult>,
}

impl BatchOutcome {
    /// True when the item processed successfully
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

static RUNTIME: OnceLock<()> = OnceLock::new();

/// One-time, idempotent runtime setup
///
/// Sizes the global rayon pool used by the per-pixel stages. Safe to
/// call from any number of threads; every caller observes the same
/// completed setup. An embedding application that already configured
/// the global pool wins, which satisfies the guard equally.
pub fn ensure_runtime() {
    RUNTIME.get_or_init(|| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_cpus::get())
            .build_global()
            .ok();
    });
}

/// The photo-to-transparent-signature processor
///
/// Holds the options one logical workflow uses; re-entrant across
/// calls, with every request's buffers private to its own call stack.
pub struct StampProcessor {
    options: ProcessingOptions,
    ready: bool,
}

impl StampProcessor {
    /// Create a processor; [`StampProcessor::init`] must run before the
    /// first request is accepted
    pub fn new(options: ProcessingOptions) -> Self {
        Self {
            options,
            ready: false,
        }
    }

    /// Create and initialize in one step
    pub fn initialized(options: ProcessingOptions) -> Self {
        let mut processor = Self::new(options);
        processor.init();
        processor
    }

    /// Complete one-time setup and start accepting requests
    pub fn init(&mut self) {
        ensure_runtime();
        self.ready = true;
    }

    /// The processor's configured options
    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    /// Replace the configured options
    pub fn set_options(&mut self, options: ProcessingOptions) {
        self.options = options;
    }

    fn ensure_ready(&self) -> Result<()> {
        if !self.ready {
            return Err(PipelineError::NotInitialized);
        }
        Ok(())
    }

    /// Process one encoded image into a transparent PNG (silent mode)
    pub fn process(&self, bytes: &[u8]) -> Result<ProcessingResult> {
        self.process_with_progress(bytes, &SilentProgress)
    }

    /// Process one encoded image with step reporting
    pub fn process_with_progress<P: ProgressCallback>(
        &self,
        bytes: &[u8],
        progress: &P,
    ) -> Result<ProcessingResult> {
        self.ensure_ready()?;
        let options = self.options.normalized();

        progress.on_step_start("Decoding input...");
        let decoded = buffer::decode_rgb(bytes)?;
        let (width, height) = decoded.dimensions();
        progress.on_step_complete("Decode", &format!("{}x{} px", width, height));

        progress.on_step_start("Adjusting brightness/contrast...");
        let mut image =
            adjust_brightness_contrast(decoded, options.brightness, options.contrast);
        progress.on_step_complete(
            "Preprocess",
            &format!("brightness {:+}, contrast {:.2}", options.brightness, options.contrast),
        );

        if options.sharpen {
            progress.on_step_start("Sharpening...");
            image = sharpen(image);
            progress.on_step_complete("Sharpen", "3x3 kernel");
        }

        if options.correct_rotation {
            progress.on_step_start("Correcting rotation...");
            let outcome = correct_rotation(image, &options);
            progress.on_step_complete(
                "Rotation",
                &format!(
                    "{:.2} degrees from {} lines, {}",
                    outcome.detection.angle,
                    outcome.detection.line_count,
                    if outcome.corrected { "corrected" } else { "within deadband" },
                ),
            );
            image = outcome.image;
        }

        progress.on_step_start("Removing background...");
        let removal = remove_background(image, &options);
        progress.on_step_complete(
            "Background",
            &format!("{} region(s) retained", removal.regions.len()),
        );
        if removal.regions.is_empty() {
            progress.on_debug("no foreground above the area floor; result will be fully transparent");
        }

        progress.on_step_start("Compositing alpha channel...");
        let rgba = to_transparent(removal.image, Some(&removal.mask));
        let region_count = removal.regions.len();
        drop(removal.mask);

        progress.on_step_start("Encoding PNG...");
        let result = ProcessingResult::from_rgba(rgba, region_count)?;
        progress.on_step_complete(
            "Encode",
            &crate::util::format_file_size(result.byte_size as u64),
        );

        Ok(result)
    }

    /// Stroke-capture path: make a white-background raster transparent
    /// without running segmentation
    pub fn chroma_key(&self, bytes: &[u8]) -> Result<ProcessingResult> {
        self.ensure_ready()?;

        let decoded = buffer::decode_rgb(bytes)?;
        let rgba = white_to_transparent(decoded);
        let has_foreground = rgba.pixels().any(|p| p.0[3] > 0);

        Ok(ProcessingResult::from_rgba(rgba, usize::from(has_foreground))?)
    }

    /// Process a file from disk
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<ProcessingResult> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::InputNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        self.process(&bytes)
    }

    /// Process a list of encoded images sequentially
    ///
    /// Failures are captured per item and never abort the batch.
    /// `on_progress(fraction, completed, total)` fires after every
    /// item, successful or not.
    pub fn process_multiple<F>(
        &self,
        inputs: &[Vec<u8>],
        on_progress: Option<&F>,
    ) -> Vec<BatchOutcome>
    where
        F: Fn(f64, usize, usize),
    {
        let total = inputs.len();
        let mut outcomes = Vec::with_capacity(total);

        for (index, bytes) in inputs.iter().enumerate() {
            let result = self.process(bytes);
            outcomes.push(BatchOutcome { index, result });

            if let Some(callback) = on_progress {
                let completed = index + 1;
                callback(completed as f64 / total as f64, completed, total);
            }
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::Mutex;

    fn png_bytes(image: RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn white_page(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([255, 255, 255]))
    }

    fn stroke_page() -> RgbImage {
        let mut img = white_page(400, 300);
        for y in 120..160 {
            for x in 80..320 {
                img.put_pixel(x, y, Rgb([30, 30, 110]));
            }
        }
        img
    }

    fn neutral_options() -> ProcessingOptions {
        ProcessingOptions::builder()
            .brightness(0)
            .contrast(1.0)
            .sharpen(false)
            .correct_rotation(false)
            .build()
    }

    #[test]
    fn test_uninitialized_processor_rejects_requests() {
        let processor = StampProcessor::new(ProcessingOptions::default());
        let result = processor.process(&png_bytes(white_page(10, 10)));

        assert!(matches!(result, Err(PipelineError::NotInitialized)));
    }

    #[test]
    fn test_init_is_idempotent() {
        let mut processor = StampProcessor::new(ProcessingOptions::default());
        processor.init();
        processor.init();
        assert!(processor.process(&png_bytes(white_page(10, 10))).is_ok());
    }

    #[test]
    fn test_undecodable_input_fails_cleanly() {
        let processor = StampProcessor::initialized(ProcessingOptions::default());
        let result = processor.process(b"not an image");

        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }

    #[test]
    fn test_all_white_input_is_fully_transparent_success() {
        let processor = StampProcessor::initialized(ProcessingOptions::default());
        let result = processor.process(&png_bytes(white_page(120, 90))).unwrap();

        assert!(result.is_blank());
        assert_eq!((result.width, result.height), (120, 90));

        let out = image::load_from_memory(&result.png).unwrap().to_rgba8();
        assert!(out.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_end_to_end_stroke_scenario() {
        let processor = StampProcessor::initialized(neutral_options());
        let result = processor.process(&png_bytes(stroke_page())).unwrap();

        assert_eq!((result.width, result.height), (400, 300));
        assert_eq!(result.foreground_regions, 1);

        let out = image::load_from_memory(&result.png).unwrap().to_rgba8();

        // Deep inside the stroke: opaque, source color preserved
        let inside = out.get_pixel(200, 140);
        assert_eq!(inside.0[3], 255);
        assert_eq!(&inside.0[..3], &[30, 30, 110]);

        // Far from the stroke: fully transparent
        assert_eq!(out.get_pixel(10, 10).0[3], 0);
        assert_eq!(out.get_pixel(390, 290).0[3], 0);
    }

    #[test]
    fn test_end_to_end_with_default_preprocessing() {
        // Brightness/contrast defaults shift colors; alpha behavior is
        // unchanged
        let options = ProcessingOptions::builder().correct_rotation(false).build();
        let processor = StampProcessor::initialized(options);
        let result = processor.process(&png_bytes(stroke_page())).unwrap();

        let out = image::load_from_memory(&result.png).unwrap().to_rgba8();
        assert_eq!(out.get_pixel(200, 140).0[3], 255);
        assert_eq!(out.get_pixel(10, 10).0[3], 0);
    }

    #[test]
    fn test_chroma_key_path() {
        let mut img = white_page(50, 50);
        img.put_pixel(25, 25, Rgb([200, 0, 0]));

        let processor = StampProcessor::initialized(ProcessingOptions::default());
        let result = processor.chroma_key(&png_bytes(img)).unwrap();

        assert_eq!(result.foreground_regions, 1);
        let out = image::load_from_memory(&result.png).unwrap().to_rgba8();
        assert_eq!(out.get_pixel(25, 25).0, [200, 0, 0, 255]);
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_chroma_key_blank_canvas() {
        let processor = StampProcessor::initialized(ProcessingOptions::default());
        let result = processor.chroma_key(&png_bytes(white_page(30, 30))).unwrap();

        assert!(result.is_blank());
    }

    #[test]
    fn test_process_file_not_found() {
        let processor = StampProcessor::initialized(ProcessingOptions::default());
        let result = processor.process_file("/nonexistent/photo.jpg");

        assert!(matches!(result, Err(PipelineError::InputNotFound(_))));
    }

    #[test]
    fn test_batch_isolates_failures_and_reports_progress() {
        let processor = StampProcessor::initialized(neutral_options());

        let inputs = vec![
            png_bytes(stroke_page()),
            b"garbage bytes".to_vec(),
            png_bytes(stroke_page()),
        ];

        let calls: Mutex<Vec<(f64, usize, usize)>> = Mutex::new(Vec::new());
        let record = |fraction: f64, completed: usize, total: usize| {
            calls.lock().unwrap().push((fraction, completed, total));
        };

        let outcomes = processor.process_multiple(&inputs, Some(&record));

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].succeeded());
        assert!(!outcomes[1].succeeded());
        assert!(outcomes[2].succeeded());
        assert!(matches!(outcomes[1].result, Err(PipelineError::Decode(_))));

        let calls = calls.into_inner().unwrap();
        assert_eq!(calls.len(), 3);
        for (i, (fraction, completed, total)) in calls.iter().enumerate() {
            assert_eq!(*completed, i + 1);
            assert_eq!(*total, 3);
            assert!((fraction - (i + 1) as f64 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_batch_empty_input_list() {
        let processor = StampProcessor::initialized(ProcessingOptions::default());
        let outcomes =
            processor.process_multiple(&[], None::<&fn(f64, usize, usize)>);
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = PipelineError::Decode("bad magic".to_string());
        assert!(err.to_string().contains("bad magic"));

        let err = PipelineError::InputNotFound(PathBuf::from("/a/b.png"));
        assert!(err.to_string().contains("/a/b.png"));

        let err = PipelineError::NotInitialized;
        assert!(err.to_string().contains("initialization"));
    }

    #[test]
    fn test_buffer_error_conversion() {
        let err: PipelineError = BufferError::Decode("x".to_string()).into();
        assert!(matches!(err, PipelineError::Decode(_)));

        let err: PipelineError = BufferError::Encode("y".to_string()).into();
        assert!(matches!(err, PipelineError::Encode(_)));
    }
}
