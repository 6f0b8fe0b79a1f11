//! Owned contiguous image buffers.

use crate::image::ImageView;
use crate::util::{OverlayError, OverlayResult};

/// Owned contiguous image buffer (`stride == width`).
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedImage<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Copy> OwnedImage<T> {
    /// Creates an owned image from a contiguous buffer of exactly
    /// `width * height` elements.
    pub fn new(data: Vec<T>, width: usize, height: usize) -> OverlayResult<Self> {
        if width == 0 || height == 0 {
            return Err(OverlayError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(OverlayError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(OverlayError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(OverlayError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates an image filled with a single value.
    pub fn filled(value: T, width: usize, height: usize) -> OverlayResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(OverlayError::InvalidDimensions { width, height })?;
        Self::new(vec![value; len], width, height)
    }

    /// Copies a (possibly strided) view into a contiguous buffer.
    pub fn from_view(view: ImageView<'_, T>) -> OverlayResult<Self> {
        let width = view.width();
        let height = view.height();
        let mut data = Vec::with_capacity(width.saturating_mul(height));
        for y in 0..height {
            let row = view.row(y).ok_or(OverlayError::BufferTooSmall {
                needed: (y + 1).saturating_mul(view.stride()),
                got: view.as_slice().len(),
            })?;
            data.extend_from_slice(row);
        }
        Self::new(data, width, height)
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, T> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the contiguous pixel buffer.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// A 1x1 image; cannot fail.
    pub(crate) fn single(value: T) -> Self {
        Self {
            data: vec![value],
            width: 1,
            height: 1,
        }
    }
}
