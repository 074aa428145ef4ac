//! CLI interface module
//!
//! Provides command-line interface using clap derive macros.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// Exit codes for the CLI
///
/// These codes follow standard Unix conventions and provide
/// specific error categories for scripting and automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful completion
    Success = 0,
    /// General error
    GeneralError = 1,
    /// Argument error
    InvalidArgs = 2,
    /// Input file not found
    InputNotFound = 3,
    /// Output error (write permission etc.)
    OutputError = 4,
    /// One or more images failed to process
    ProcessingError = 5,
}

impl ExitCode {
    /// Convert to process exit code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get human-readable description
    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::InvalidArgs => "Invalid arguments",
            ExitCode::InputNotFound => "Input file not found",
            ExitCode::OutputError => "Output error (permission denied, disk full, etc.)",
            ExitCode::ProcessingError => "Processing error",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code() as u8)
    }
}

/// Transparent signature and stamp extractor for photographed documents
#[derive(Parser, Debug)]
#[command(name = "stampmaker")]
#[command(author = "stampmaker Contributors")]
#[command(version)]
#[command(about = "Extract transparent signature/stamp PNGs from photos", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract transparent marks from photographed documents
    Process(ProcessArgs),
    /// Key out pure white from a stroke-capture raster
    Chroma(ChromaArgs),
    /// List or prune the mark gallery
    Gallery(GalleryArgs),
    /// Show system information
    Info,
}

/// Arguments for the process command
#[derive(clap::Args, Debug)]
pub struct ProcessArgs {
    /// Input image files
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "./output")]
    pub output: PathBuf,

    /// Additive brightness offset
    #[arg(long, default_value_t = 10)]
    pub brightness: i32,

    /// Multiplicative contrast factor
    #[arg(long, default_value_t = 1.2)]
    pub contrast: f32,

    /// Enable sharpening
    #[arg(long, default_value_t = true)]
    #[arg(action = clap::ArgAction::Set)]
    pub sharpen: bool,

    /// Disable sharpening
    #[arg(long = "no-sharpen")]
    #[arg(action = clap::ArgAction::SetTrue)]
    no_sharpen: bool,

    /// Enable skew correction
    #[arg(long, default_value_t = true)]
    #[arg(action = clap::ArgAction::Set)]
    pub rotation: bool,

    /// Disable skew correction
    #[arg(long = "no-rotation")]
    #[arg(action = clap::ArgAction::SetTrue)]
    no_rotation: bool,

    /// Global binarization threshold (0-255)
    #[arg(short, long, default_value_t = 127)]
    pub threshold: u8,

    /// Use adaptive thresholding for unevenly lit photos
    #[arg(short, long)]
    pub adaptive: bool,

    /// Gaussian blur kernel size (odd)
    #[arg(long, default_value_t = 5)]
    pub blur_kernel: u32,

    /// Morphological closing kernel size (odd)
    #[arg(long, default_value_t = 3)]
    pub morph_kernel: u32,

    /// Minimum retained contour area in px^2
    #[arg(long, default_value_t = 100.0)]
    pub min_area: f64,

    /// Options file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Append results to a gallery file
    #[arg(short, long)]
    pub gallery: Option<PathBuf>,

    /// Number of parallel threads
    #[arg(long)]
    pub threads: Option<usize>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl ProcessArgs {
    /// Get effective sharpen setting (considering --no-sharpen flag)
    pub fn effective_sharpen(&self) -> bool {
        self.sharpen && !self.no_sharpen
    }

    /// Get effective rotation setting (considering --no-rotation flag)
    pub fn effective_rotation(&self) -> bool {
        self.rotation && !self.no_rotation
    }

    /// Get thread count (default to available CPUs)
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get)
    }
}

/// Arguments for the chroma command
#[derive(clap::Args, Debug)]
pub struct ChromaArgs {
    /// Input image files
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "./output")]
    pub output: PathBuf,

    /// Append results to a gallery file
    #[arg(short, long)]
    pub gallery: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the gallery command
#[derive(clap::Args, Debug)]
pub struct GalleryArgs {
    /// Gallery file (JSON)
    pub file: PathBuf,

    /// Remove the entry with this id instead of listing
    #[arg(long)]
    pub remove: Option<String>,
}

/// Create a styled progress bar for file processing
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    pb
}

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb
}
