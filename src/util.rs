//! Common utilities for stampmaker
//!
//! Provides shared functionality across modules to reduce code duplication.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Clamp a value to a range
#[inline]
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Force a kernel size to be an odd integer of at least 1
#[inline]
pub fn odd_kernel(size: u32) -> u32 {
    let size = size.max(1);
    if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

/// Gaussian sigma for a given odd kernel size
///
/// Uses the same relation OpenCV applies when sigma is left at zero,
/// so a kernel-size-driven configuration blurs the same amount here.
#[inline]
pub fn sigma_for_kernel(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Encode PNG bytes as a `data:image/png;base64,` URI
pub fn png_data_uri(png_bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png_bytes))
}

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format duration in human-readable format
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 60 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}m {}s", mins, remaining_secs)
    } else if secs > 0 {
        format!("{}.{:03}s", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5, 0, 10), 5);
        assert_eq!(clamp(-5, 0, 10), 0);
        assert_eq!(clamp(15, 0, 10), 10);
        assert_eq!(clamp(0.5f32, 0.0, 1.0), 0.5);
    }

    #[test]
    fn test_odd_kernel() {
        assert_eq!(odd_kernel(0), 1);
        assert_eq!(odd_kernel(1), 1);
        assert_eq!(odd_kernel(4), 5);
        assert_eq!(odd_kernel(5), 5);
    }

    #[test]
    fn test_sigma_for_kernel() {
        // Kernel size 5 matches OpenCV's derived sigma of 1.1
        assert!((sigma_for_kernel(5) - 1.1).abs() < 1e-6);
        assert!(sigma_for_kernel(3) > 0.0);
    }

    #[test]
    fn test_png_data_uri() {
        let uri = png_data_uri(&[1, 2, 3]);
        assert!(uri.starts_with("data:image/png;base64,"));
        assert!(uri.len() > "data:image/png;base64,".len());
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(500), "500 B");
        assert_eq!(format_file_size(1024), "1.00 KB");
        assert_eq!(format_file_size(1048576), "1.00 MB");
        assert_eq!(format_file_size(1073741824), "1.00 GB");
    }

    #[test]
    fn test_format_duration() {
        use std::time::Duration;

        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.000s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
    }
}
