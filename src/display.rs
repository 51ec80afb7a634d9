//! Scaling between the full-resolution source frame and the display preview.
//!
//! The preview is a fixed, aspect-preserving downscale of the corrected
//! frame. Clicks arrive in display space and are mapped back to source space
//! through the same factor; overlays drawn on the saved full-resolution
//! image use the inverse factor so markers stay visually consistent at
//! either resolution.

use crate::types::Point2D;
use image::imageops::{self, FilterType};
use image::RgbImage;

/// Fixed scale factor between source space and display space.
#[derive(Clone, Copy, Debug)]
pub struct DisplayScale {
    factor: f64,
}

impl DisplayScale {
    /// Factor that fits `full_width` into `target_width`.
    pub fn fit_width(full_width: u32, target_width: u32) -> Self {
        Self {
            factor: target_width as f64 / full_width as f64,
        }
    }

    /// 1:1 mapping (display space == source space).
    pub fn identity() -> Self {
        Self { factor: 1.0 }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Inverse factor used to size markers, labels, and line thickness when
    /// drawing on the full-resolution image.
    pub fn draw_scale(&self) -> f64 {
        1.0 / self.factor
    }

    /// Display-space point to source space. Applied to every accepted click
    /// before it is stored.
    pub fn to_source(&self, p: Point2D) -> Point2D {
        Point2D::new(p.x / self.factor, p.y / self.factor)
    }

    /// Source-space point to display space.
    pub fn to_display(&self, p: Point2D) -> Point2D {
        Point2D::new(p.x * self.factor, p.y * self.factor)
    }
}

/// Downscale a corrected frame to `target_width`, preserving aspect ratio.
///
/// Returns the display image together with the scale factor that maps
/// between the two spaces.
pub fn scale_down(corrected: &RgbImage, target_width: u32) -> (RgbImage, DisplayScale) {
    let scale = DisplayScale::fit_width(corrected.width(), target_width);
    let target_height = (corrected.height() as f64 * scale.factor()).round() as u32;
    let display = imageops::resize(corrected, target_width, target_height, FilterType::Triangle);
    (display, scale)
}
