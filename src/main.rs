//! stampmaker - Transparent signature/stamp extractor
//!
//! CLI entry point

use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use stampmaker::{
    format_file_size, ChromaArgs, Cli, Commands, ExitCode, GalleryArgs, GalleryEntry,
    GalleryKind, GalleryStore, ProcessArgs, ProcessingOptions, ProcessingResult,
    ProgressCallback, StampProcessor,
};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Process(args) => run_process(&args),
        Commands::Chroma(args) => run_chroma(&args),
        Commands::Gallery(args) => run_gallery(&args),
        Commands::Info => run_info(),
    };

    code.into()
}

// ============ Progress Callback Implementation ============

/// Verbose progress callback for CLI output
struct VerboseProgress {
    verbose_level: u32,
}

impl VerboseProgress {
    fn new(verbose_level: u32) -> Self {
        Self { verbose_level }
    }
}

impl ProgressCallback for VerboseProgress {
    fn on_step_start(&self, step: &str) {
        if self.verbose_level > 0 {
            println!("  {}", step);
        }
    }

    fn on_step_complete(&self, step: &str, message: &str) {
        if self.verbose_level > 0 {
            println!("    {}: {}", step, message);
        }
    }

    fn on_debug(&self, message: &str) {
        if self.verbose_level > 1 {
            println!("    [DEBUG] {}", message);
        }
    }
}

// ============ Process Command ============

fn run_process(args: &ProcessArgs) -> ExitCode {
    let start_time = Instant::now();

    for input in &args.inputs {
        if !input.exists() {
            eprintln!("Error: Input file not found: {}", input.display());
            return ExitCode::InputNotFound;
        }
    }

    // Load options file if specified; CLI flags take precedence
    let base_options = match &args.config {
        Some(config_path) => match ProcessingOptions::load_from_path(config_path) {
            Ok(opts) => opts,
            Err(e) => {
                eprintln!("Error: Failed to load options file: {}", e);
                return ExitCode::InvalidArgs;
            }
        },
        None => ProcessingOptions::default(),
    };
    let options = merge_cli_options(base_options, args);

    if let Err(e) = std::fs::create_dir_all(&args.output) {
        eprintln!(
            "Error: Cannot create output directory {}: {}",
            args.output.display(),
            e
        );
        return ExitCode::OutputError;
    }

    // Size the worker pool before the first pixel stage runs
    if args.threads.is_some() {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.thread_count())
            .build_global()
            .ok();
    }

    let processor = StampProcessor::initialized(options);
    let progress = VerboseProgress::new(args.verbose.into());
    let verbose = args.verbose > 0;

    let bar = if args.quiet || verbose {
        None
    } else {
        Some(stampmaker::create_progress_bar(args.inputs.len() as u64))
    };

    let mut gallery = match open_gallery(args.gallery.as_deref()) {
        Ok(gallery) => gallery,
        Err(code) => return code,
    };

    let mut ok_count = 0usize;
    let mut error_count = 0usize;

    for (idx, input) in args.inputs.iter().enumerate() {
        if verbose {
            println!(
                "[{}/{}] Processing: {}",
                idx + 1,
                args.inputs.len(),
                input.display()
            );
        }

        let result = std::fs::read(input)
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                processor
                    .process_with_progress(&bytes, &progress)
                    .map_err(|e| e.to_string())
            });

        match result {
            Ok(result) => {
                let output_path = output_path_for(input, &args.output);
                if let Err(e) = std::fs::write(&output_path, &result.png) {
                    eprintln!("Error writing {}: {}", output_path.display(), e);
                    error_count += 1;
                } else {
                    if result.is_blank() {
                        eprintln!(
                            "Warning: no foreground found in {}; output is fully transparent",
                            input.display()
                        );
                    }
                    if let Some(store) = gallery.as_mut() {
                        store.add(gallery_entry(&result, GalleryKind::Photo, input));
                    }
                    if verbose {
                        println!(
                            "    Completed: {} region(s), {}",
                            result.foreground_regions,
                            format_file_size(result.byte_size as u64)
                        );
                    }
                    ok_count += 1;
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {}", input.display(), e);
                error_count += 1;
            }
        }

        if let Some(bar) = &bar {
            bar.set_position((idx + 1) as u64);
        }
    }

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    if let Some(code) = save_gallery(gallery) {
        return code;
    }

    print_summary(args.quiet, args.inputs.len(), ok_count, error_count, start_time);

    if error_count > 0 {
        ExitCode::ProcessingError
    } else {
        ExitCode::Success
    }
}

/// Overlay CLI flags onto a base options record
///
/// A flag only overrides the base when the user moved it off its CLI
/// default, so an options file can set values the command line does not
/// mention.
fn merge_cli_options(base: ProcessingOptions, args: &ProcessArgs) -> ProcessingOptions {
    const DEFAULT_BRIGHTNESS: i32 = 10;
    const DEFAULT_CONTRAST: f32 = 1.2;
    const DEFAULT_THRESHOLD: u8 = 127;
    const DEFAULT_BLUR_KERNEL: u32 = 5;
    const DEFAULT_MORPH_KERNEL: u32 = 3;
    const DEFAULT_MIN_AREA: f64 = 100.0;

    let mut options = base;

    if args.brightness != DEFAULT_BRIGHTNESS {
        options.brightness = args.brightness;
    }
    if (args.contrast - DEFAULT_CONTRAST).abs() > f32::EPSILON {
        options.contrast = args.contrast;
    }
    if !args.effective_sharpen() {
        options.sharpen = false;
    }
    if !args.effective_rotation() {
        options.correct_rotation = false;
    }
    if args.threshold != DEFAULT_THRESHOLD {
        options.threshold_value = args.threshold;
    }
    if args.adaptive {
        options.use_adaptive_threshold = true;
    }
    if args.blur_kernel != DEFAULT_BLUR_KERNEL {
        options.blur_kernel_size = args.blur_kernel;
    }
    if args.morph_kernel != DEFAULT_MORPH_KERNEL {
        options.morph_kernel_size = args.morph_kernel;
    }
    if (args.min_area - DEFAULT_MIN_AREA).abs() > f64::EPSILON {
        options.contour_min_area = args.min_area;
    }

    options
}

// ============ Chroma Command ============

fn run_chroma(args: &ChromaArgs) -> ExitCode {
    let start_time = Instant::now();

    for input in &args.inputs {
        if !input.exists() {
            eprintln!("Error: Input file not found: {}", input.display());
            return ExitCode::InputNotFound;
        }
    }

    if let Err(e) = std::fs::create_dir_all(&args.output) {
        eprintln!(
            "Error: Cannot create output directory {}: {}",
            args.output.display(),
            e
        );
        return ExitCode::OutputError;
    }

    let processor = StampProcessor::initialized(ProcessingOptions::default());
    let verbose = args.verbose > 0;

    let mut gallery = match open_gallery(args.gallery.as_deref()) {
        Ok(gallery) => gallery,
        Err(code) => return code,
    };

    let mut ok_count = 0usize;
    let mut error_count = 0usize;

    for (idx, input) in args.inputs.iter().enumerate() {
        if verbose {
            println!(
                "[{}/{}] Keying: {}",
                idx + 1,
                args.inputs.len(),
                input.display()
            );
        }

        let result = std::fs::read(input)
            .map_err(|e| e.to_string())
            .and_then(|bytes| processor.chroma_key(&bytes).map_err(|e| e.to_string()));

        match result {
            Ok(result) => {
                let output_path = output_path_for(input, &args.output);
                if let Err(e) = std::fs::write(&output_path, &result.png) {
                    eprintln!("Error writing {}: {}", output_path.display(), e);
                    error_count += 1;
                } else {
                    if let Some(store) = gallery.as_mut() {
                        store.add(gallery_entry(&result, GalleryKind::Handwriting, input));
                    }
                    ok_count += 1;
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {}", input.display(), e);
                error_count += 1;
            }
        }
    }

    if let Some(code) = save_gallery(gallery) {
        return code;
    }

    print_summary(args.quiet, args.inputs.len(), ok_count, error_count, start_time);

    if error_count > 0 {
        ExitCode::ProcessingError
    } else {
        ExitCode::Success
    }
}

// ============ Gallery Command ============

fn run_gallery(args: &GalleryArgs) -> ExitCode {
    let mut store = match GalleryStore::open(&args.file) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::GeneralError;
        }
    };

    if let Some(id_str) = &args.remove {
        let id = match id_str.parse() {
            Ok(id) => id,
            Err(_) => {
                eprintln!("Error: Invalid entry id: {}", id_str);
                return ExitCode::InvalidArgs;
            }
        };
        if !store.remove(id) {
            eprintln!("Error: No entry with id {}", id_str);
            return ExitCode::GeneralError;
        }
        if let Err(e) = store.save() {
            eprintln!("Error: Failed to save gallery: {}", e);
            return ExitCode::OutputError;
        }
        println!("Removed {}", id_str);
        return ExitCode::Success;
    }

    if store.is_empty() {
        println!("Gallery is empty: {}", args.file.display());
        return ExitCode::Success;
    }

    println!("Gallery: {} ({} entries)", args.file.display(), store.len());
    println!();
    for entry in store.list() {
        println!(
            "  {}  {:12}  {}x{:<5}  {:>10}  {}  {}",
            entry.id,
            format!("{:?}", entry.kind).to_lowercase(),
            entry.width,
            entry.height,
            format_file_size(entry.size as u64),
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.name,
        );
    }

    ExitCode::Success
}

// ============ Info Command ============

fn run_info() -> ExitCode {
    println!("stampmaker v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("System Information:");
    println!("  Platform: {}", std::env::consts::OS);
    println!("  Arch: {}", std::env::consts::ARCH);
    println!("  CPUs: {}", num_cpus::get());

    // Memory info (Linux)
    if let Ok(meminfo) = std::fs::read_to_string("/proc/meminfo") {
        if let Some(line) = meminfo.lines().find(|l| l.starts_with("MemTotal:")) {
            if let Some(kb) = line.split_whitespace().nth(1) {
                if let Ok(kb_val) = kb.parse::<u64>() {
                    println!("  Memory: {:.1} GB", kb_val as f64 / 1_048_576.0);
                }
            }
        }
    }

    println!();
    println!("Default Options:");
    println!("{}", default_options_table());

    ExitCode::Success
}

fn default_options_table() -> String {
    let opts = ProcessingOptions::default();
    format!(
        "  Brightness:        {:+}\n\
         \x20 Contrast:          {:.2}\n\
         \x20 Sharpen:           {}\n\
         \x20 Blur kernel:       {}\n\
         \x20 Threshold:         {}\n\
         \x20 Adaptive:          {}\n\
         \x20 Morph kernel:      {}\n\
         \x20 Min contour area:  {} px^2\n\
         \x20 Rotation fix:      {}\n\
         \x20 Canny thresholds:  {} / {}\n\
         \x20 Hough votes:       {}\n\
         \x20 Angle range:       +/-{} deg\n\
         \x20 Deadband:          {} deg",
        opts.brightness,
        opts.contrast,
        opts.sharpen,
        opts.blur_kernel_size,
        opts.threshold_value,
        opts.use_adaptive_threshold,
        opts.morph_kernel_size,
        opts.contour_min_area,
        opts.correct_rotation,
        opts.canny_low,
        opts.canny_high,
        opts.hough_threshold,
        opts.angle_search_range,
        opts.rotation_deadband,
    )
}

// ============ Helper Functions ============

/// Output path for one input: `<stem>_transparent.png` in the output
/// directory
fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}_transparent.png", stem))
}

fn gallery_entry(result: &ProcessingResult, kind: GalleryKind, input: &Path) -> GalleryEntry {
    let name = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string());
    GalleryEntry::from_result(result, kind, &name)
}

fn open_gallery(path: Option<&Path>) -> Result<Option<GalleryStore>, ExitCode> {
    match path {
        Some(path) => match GalleryStore::open(path) {
            Ok(store) => Ok(Some(store)),
            Err(e) => {
                eprintln!("Error: Failed to open gallery: {}", e);
                Err(ExitCode::GeneralError)
            }
        },
        None => Ok(None),
    }
}

fn save_gallery(gallery: Option<GalleryStore>) -> Option<ExitCode> {
    if let Some(store) = gallery {
        if let Err(e) = store.save() {
            eprintln!("Error: Failed to save gallery: {}", e);
            return Some(ExitCode::OutputError);
        }
    }
    None
}

fn print_summary(
    quiet: bool,
    total: usize,
    ok_count: usize,
    error_count: usize,
    start_time: Instant,
) {
    if quiet {
        return;
    }
    println!();
    println!("=== Summary ===");
    println!("Total:   {}", total);
    println!("OK:      {}", ok_count);
    println!("Errors:  {}", error_count);
    println!("Time:    {:.2}s", start_time.elapsed().as_secs_f64());
}
