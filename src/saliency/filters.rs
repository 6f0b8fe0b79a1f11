//! Gradient and local-variance filters over `f32` maps.

use crate::image::ImageView;

/// Central-difference gradient magnitude, one-sided at the borders.
pub(crate) fn gradient_magnitude(src: ImageView<'_, f32>) -> Vec<f32> {
    let width = src.width();
    let height = src.height();
    let at = |x: usize, y: usize| -> f32 { src.get(x, y).copied().unwrap_or(0.0) };

    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let gx = if width < 2 {
                0.0
            } else if x == 0 {
                at(1, y) - at(0, y)
            } else if x == width - 1 {
                at(x, y) - at(x - 1, y)
            } else {
                (at(x + 1, y) - at(x - 1, y)) * 0.5
            };
            let gy = if height < 2 {
                0.0
            } else if y == 0 {
                at(x, 1) - at(x, 0)
            } else if y == height - 1 {
                at(x, y) - at(x, y - 1)
            } else {
                (at(x, y + 1) - at(x, y - 1)) * 0.5
            };
            out.push((gx * gx + gy * gy).sqrt());
        }
    }
    out
}

/// Summed-area table with one row/column of zero padding.
struct Integral {
    sums: Vec<f64>,
    stride: usize,
}

impl Integral {
    fn build(width: usize, height: usize, value: impl Fn(usize, usize) -> f64) -> Self {
        let stride = width + 1;
        let mut sums = vec![0.0f64; stride * (height + 1)];
        for y in 0..height {
            let mut row_sum = 0.0f64;
            for x in 0..width {
                row_sum += value(x, y);
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_sum;
            }
        }
        Self { sums, stride }
    }

    /// Sum over `[x0, x1) x [y0, y1)`.
    fn rect(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> f64 {
        let s = self.stride;
        self.sums[y1 * s + x1] - self.sums[y0 * s + x1] - self.sums[y1 * s + x0]
            + self.sums[y0 * s + x0]
    }
}

/// Local variance `mean(x^2) - mean(x)^2` in a `window x window` box.
///
/// The window is clipped at the borders and averages only the pixels it
/// covers.
pub(crate) fn local_variance(src: ImageView<'_, f32>, window: usize) -> Vec<f32> {
    let width = src.width();
    let height = src.height();
    let at = |x: usize, y: usize| -> f64 { f64::from(src.get(x, y).copied().unwrap_or(0.0)) };
    let sum = Integral::build(width, height, at);
    let sum_sq = Integral::build(width, height, |x, y| {
        let v = at(x, y);
        v * v
    });

    let radius = window.max(1) / 2;
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius + 1).min(height);
        for x in 0..width {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius + 1).min(width);
            let n = ((x1 - x0) * (y1 - y0)) as f64;
            let mean = sum.rect(x0, y0, x1, y1) / n;
            let mean_sq = sum_sq.rect(x0, y0, x1, y1) / n;
            out.push((mean_sq - mean * mean).max(0.0) as f32);
        }
    }
    out
}
