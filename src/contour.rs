//! Contour extraction and area filtering
//!
//! Wraps `imageproc`'s border-following contour tracer with the area
//! bookkeeping the background remover needs: each connected foreground
//! region is represented by its outer boundary polygon and its signed
//! shoelace area, and regions below a caller-supplied area floor are
//! discarded as noise.

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

/// One connected foreground region's outer boundary
#[derive(Debug, Clone)]
pub struct ContourRegion {
    /// Ordered boundary points
    pub points: Vec<Point<i32>>,
    /// Signed enclosed area (shoelace formula); sign encodes winding
    pub area: f64,
}

impl ContourRegion {
    /// Absolute enclosed area in px^2
    pub fn abs_area(&self) -> f64 {
        self.area.abs()
    }
}

/// Signed polygon area via the shoelace formula
pub fn shoelace_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut doubled: i64 = 0;
    for i in 0..points.len() {
        let p = points[i];
        let q = points[(i + 1) % points.len()];
        doubled += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    doubled as f64 / 2.0
}

/// Extract outer contours from a binary mask, keeping only regions
/// whose absolute enclosed area exceeds `min_area`
///
/// Retention is monotone in `min_area`: raising the floor can only
/// shrink the retained set.
pub fn extract_regions(mask: &GrayImage, min_area: f64) -> Vec<ContourRegion> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .map(|c| {
            let area = shoelace_area(&c.points);
            ContourRegion {
                points: c.points,
                area,
            }
        })
        .filter(|region| region.abs_area() > min_area)
        .collect()
}

/// Fill regions into a fresh binary mask (255 inside, 0 outside)
pub fn fill_regions(width: u32, height: u32, regions: &[ContourRegion]) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for region in regions {
        let mut poly = region.points.clone();
        // draw_polygon_mut wants an open polygon
        if poly.len() > 1 && poly.first() == poly.last() {
            poly.pop();
        }
        if poly.len() >= 3 {
            draw_polygon_mut(&mut mask, &poly, Luma([255u8]));
        } else {
            for p in &poly {
                if p.x >= 0 && p.y >= 0 && (p.x as u32) < width && (p.y as u32) < height {
                    mask.put_pixel(p.x as u32, p.y as u32, Luma([255u8]));
                }
            }
        }
    }
    mask
}
