//! Convenience helpers for decoding images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{OwnedImage, Rgb8};
use crate::util::{OverlayError, OverlayResult};
use std::path::Path;

/// Creates an owned RGB image from a dynamic image.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> OverlayResult<OwnedImage<Rgb8>> {
    let rgb = img.to_rgb8();
    let width = rgb.width() as usize;
    let height = rgb.height() as usize;
    let pixels = rgb
        .as_raw()
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();
    OwnedImage::new(pixels, width, height)
}

/// Decodes encoded image bytes (PNG/JPEG) into an owned RGB image.
pub fn decode_rgb(bytes: &[u8]) -> OverlayResult<OwnedImage<Rgb8>> {
    let img = image::load_from_memory(bytes).map_err(|err| OverlayError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}

/// Loads an image from disk as RGB.
pub fn load_rgb<P: AsRef<Path>>(path: P) -> OverlayResult<OwnedImage<Rgb8>> {
    let img = image::open(path).map_err(|err| OverlayError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}
