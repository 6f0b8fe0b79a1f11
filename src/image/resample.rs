//! Grayscale conversion and area-average downsampling for analysis maps.
//!
//! Downsampling averages every source pixel that overlaps a destination cell,
//! which reduces to the classic 2x2 box filter for exact halving.

use crate::image::{ImageView, OwnedImage, Rgb8};
use crate::util::OverlayResult;

/// Converts an RGB view to grayscale in `[0, 1]` by channel averaging.
pub(crate) fn gray_from_rgb(view: ImageView<'_, Rgb8>) -> OverlayResult<OwnedImage<f32>> {
    let width = view.width();
    let height = view.height();
    let mut data = Vec::with_capacity(width.saturating_mul(height));
    for y in 0..height {
        if let Some(row) = view.row(y) {
            for px in row {
                let sum = u16::from(px[0]) + u16::from(px[1]) + u16::from(px[2]);
                data.push(f32::from(sum) / (3.0 * 255.0));
            }
        }
    }
    OwnedImage::new(data, width, height)
}

/// Target size that fits `width x height` inside `max_dim` keeping aspect.
///
/// Returns the input size when it already fits or `max_dim` is zero.
pub(crate) fn fit_within(width: usize, height: usize, max_dim: usize) -> (usize, usize) {
    let longest = width.max(height);
    if max_dim == 0 || longest <= max_dim {
        return (width, height);
    }
    let scale = max_dim as f64 / longest as f64;
    let w = ((width as f64 * scale).round() as usize).max(1);
    let h = ((height as f64 * scale).round() as usize).max(1);
    (w, h)
}

/// Area-average downsample of an `f32` map to `dst_width x dst_height`.
pub(crate) fn downsample_mean(
    src: ImageView<'_, f32>,
    dst_width: usize,
    dst_height: usize,
) -> OverlayResult<OwnedImage<f32>> {
    let src_w = src.width();
    let src_h = src.height();
    if dst_width >= src_w && dst_height >= src_h {
        return OwnedImage::from_view(src);
    }

    let mut dst = Vec::with_capacity(dst_width.saturating_mul(dst_height));
    for dy in 0..dst_height {
        let y0 = dy * src_h / dst_height;
        let y1 = ((dy + 1) * src_h / dst_height).max(y0 + 1).min(src_h);
        for dx in 0..dst_width {
            let x0 = dx * src_w / dst_width;
            let x1 = ((dx + 1) * src_w / dst_width).max(x0 + 1).min(src_w);
            let mut sum = 0.0f64;
            for y in y0..y1 {
                if let Some(row) = src.row(y) {
                    sum += row[x0..x1].iter().map(|&v| f64::from(v)).sum::<f64>();
                }
            }
            let count = ((y1 - y0) * (x1 - x0)) as f64;
            dst.push((sum / count) as f32);
        }
    }
    OwnedImage::new(dst, dst_width, dst_height)
}
