//! Percent- and pixel-space boxes.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Axis-aligned box, either in percent of the image or in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_true")]
    pub use_percentage: bool,
}

impl OverlayBox {
    /// Box in percent of the image dimensions.
    pub const fn percent(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            use_percentage: true,
        }
    }

    /// Box in absolute pixels.
    pub const fn pixels(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            use_percentage: false,
        }
    }

    /// Converts to percent space.
    ///
    /// Pixel boxes cannot be resolved against a zero-area image; they come
    /// back as NaN and the validator replaces them with defaults.
    pub fn to_percent(&self, image_width: usize, image_height: usize) -> Self {
        if self.use_percentage {
            return *self;
        }
        if image_width == 0 || image_height == 0 {
            return Self::percent(f64::NAN, f64::NAN, f64::NAN, f64::NAN);
        }
        let w = image_width as f64;
        let h = image_height as f64;
        Self::percent(
            self.x / w * 100.0,
            self.y / h * 100.0,
            self.width / w * 100.0,
            self.height / h * 100.0,
        )
    }

    /// Converts to pixel space.
    pub fn to_pixels(&self, image_width: usize, image_height: usize) -> Self {
        if !self.use_percentage {
            return *self;
        }
        let w = image_width as f64;
        let h = image_height as f64;
        Self::pixels(
            self.x / 100.0 * w,
            self.y / 100.0 * h,
            self.width / 100.0 * w,
            self.height / 100.0 * h,
        )
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when the interiors overlap by more than `tol` on both axes.
    ///
    /// Boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &OverlayBox, tol: f64) -> bool {
        self.x < other.right() - tol
            && other.x < self.right() - tol
            && self.y < other.bottom() - tol
            && other.y < self.bottom() - tol
    }

    /// True when every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}
