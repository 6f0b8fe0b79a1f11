//! Image views, owned buffers and the per-request [`Scene`].
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices are zero-copy
//! views into the same backing slice and retain the original stride.
//!
//! Color images use one `[u8; 3]` element per pixel ([`Rgb8`]); analysis maps
//! use `f32` elements.

use crate::util::{OverlayError, OverlayResult};

#[cfg(feature = "image-io")]
pub mod io;
mod owned;
pub(crate) mod resample;

pub use owned::OwnedImage;

/// Interleaved 8-bit RGB pixel.
pub type Rgb8 = [u8; 3];

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> OverlayResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> OverlayResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(OverlayError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(&self, x: usize, y: usize, width: usize, height: usize) -> OverlayResult<Self> {
        if width == 0 || height == 0 {
            return Err(OverlayError::InvalidDimensions { width, height });
        }
        let end_x = x.checked_add(width);
        let end_y = y.checked_add(height);
        match (end_x, end_y) {
            (Some(ex), Some(ey)) if ex <= self.width && ey <= self.height => {}
            _ => {
                return Err(OverlayError::InvalidDimensions { width, height });
            }
        }

        let start = y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(x))
            .ok_or(OverlayError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;
        let data = self
            .data
            .get(start..)
            .ok_or(OverlayError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;

        ImageView::new(data, width, height, self.stride)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> OverlayResult<usize> {
    if width == 0 || height == 0 {
        return Err(OverlayError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(OverlayError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(OverlayError::InvalidDimensions { width, height })?;
    Ok(needed)
}

/// The image one ranking request works against.
///
/// Carries declared dimensions even when no pixels are available (for example
/// when decoding failed), so analyzers can fall back to neutral defaults
/// instead of aborting.
#[derive(Copy, Clone, Debug)]
pub struct Scene<'a> {
    pixels: Option<ImageView<'a, Rgb8>>,
    width: usize,
    height: usize,
}

impl<'a> Scene<'a> {
    /// Wraps a decoded RGB view.
    pub fn from_view(view: ImageView<'a, Rgb8>) -> Self {
        Self {
            pixels: Some(view),
            width: view.width(),
            height: view.height(),
        }
    }

    /// A scene without pixels. Dimensions may be zero.
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            pixels: None,
            width,
            height,
        }
    }

    /// Returns the pixel view, if any.
    pub fn pixels(&self) -> Option<ImageView<'a, Rgb8>> {
        self.pixels
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `width / height`, or 1.0 when either side is zero.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width == 0 || self.height == 0 {
            return 1.0;
        }
        self.width as f64 / self.height as f64
    }
}
