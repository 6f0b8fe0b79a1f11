//! Visual-complexity maps from classic image statistics.
//!
//! The map blends normalized gradient magnitude (edges, faces, text) with
//! normalized local variance (texture, clutter), then re-normalizes the blend
//! to `[0, 1]`. 0 is calm, 1 is busy.

use serde::{Deserialize, Serialize};

use crate::image::resample::{downsample_mean, fit_within, gray_from_rgb};
use crate::image::{ImageView, OwnedImage, Rgb8, Scene};
use crate::layout::OverlayBox;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::math::normalize_in_place;
use crate::util::OverlayResult;

mod filters;

use filters::{gradient_magnitude, local_variance};

/// Value used when nothing can be measured; neither favors nor penalizes.
pub const NEUTRAL_SALIENCY: f32 = 0.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaliencyConfig {
    /// Longest side of the analysis map; 0 analyzes at full resolution.
    pub max_analysis_dim: usize,
    /// Side of the local-variance window.
    pub window: usize,
    pub gradient_weight: f32,
    pub variance_weight: f32,
}

impl Default for SaliencyConfig {
    fn default() -> Self {
        Self {
            max_analysis_dim: 512,
            window: 5,
            gradient_weight: 0.6,
            variance_weight: 0.4,
        }
    }
}

/// Immutable per-image saliency map.
///
/// The map may be smaller than the source image; lookups go through percent
/// boxes so callers never deal with the analysis resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct SaliencyMap {
    map: OwnedImage<f32>,
    source_width: usize,
    source_height: usize,
}

impl SaliencyMap {
    /// Constant map for images that cannot be analyzed.
    pub fn uniform(source_width: usize, source_height: usize, value: f32, max_dim: usize) -> Self {
        let (w, h) = fit_within(source_width.max(1), source_height.max(1), max_dim);
        let map = OwnedImage::filled(value.clamp(0.0, 1.0), w, h)
            .unwrap_or_else(|_| OwnedImage::single(value.clamp(0.0, 1.0)));
        Self {
            map,
            source_width,
            source_height,
        }
    }

    /// Map width (analysis resolution).
    pub fn width(&self) -> usize {
        self.map.width()
    }

    /// Map height (analysis resolution).
    pub fn height(&self) -> usize {
        self.map.height()
    }

    pub fn source_width(&self) -> usize {
        self.source_width
    }

    pub fn source_height(&self) -> usize {
        self.source_height
    }

    /// True when the map resolution differs from the source image.
    pub fn is_downsampled(&self) -> bool {
        self.width() != self.source_width || self.height() != self.source_height
    }

    /// Row-major values in `[0, 1]`.
    pub fn values(&self) -> &[f32] {
        self.map.data()
    }

    pub fn view(&self) -> ImageView<'_, f32> {
        self.map.view()
    }

    /// Value at map coordinates.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        self.map.view().get(x, y).copied()
    }

    /// Mean saliency under `region`.
    ///
    /// A region thinner than one map cell samples the cell under its center;
    /// a non-finite region reads as neutral.
    pub fn mean_over(&self, region: &OverlayBox) -> f32 {
        let pct = region.to_percent(self.source_width, self.source_height);
        if !pct.is_finite() {
            return NEUTRAL_SALIENCY;
        }
        let w = self.width();
        let h = self.height();
        let to_cell = |pct: f64, len: usize| -> f64 { (pct / 100.0 * len as f64).clamp(0.0, len as f64) };

        let x0 = to_cell(pct.x, w).floor() as usize;
        let x1 = to_cell(pct.right(), w).ceil() as usize;
        let y0 = to_cell(pct.y, h).floor() as usize;
        let y1 = to_cell(pct.bottom(), h).ceil() as usize;

        let view = self.view();
        if x1 <= x0 || y1 <= y0 {
            let (cx, cy) = pct.center();
            let x = (to_cell(cx, w) as usize).min(w - 1);
            let y = (to_cell(cy, h) as usize).min(h - 1);
            return view.get(x, y).copied().unwrap_or(NEUTRAL_SALIENCY);
        }

        let mut sum = 0.0f64;
        for y in y0..y1 {
            if let Some(row) = view.row(y) {
                sum += row[x0..x1].iter().map(|&v| f64::from(v)).sum::<f64>();
            }
        }
        let count = ((x1 - x0) * (y1 - y0)) as f64;
        (sum / count) as f32
    }
}

/// Converts images into [`SaliencyMap`]s.
#[derive(Clone, Debug, Default)]
pub struct SaliencyAnalyzer {
    config: SaliencyConfig,
}

impl SaliencyAnalyzer {
    pub fn new(config: SaliencyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SaliencyConfig {
        &self.config
    }

    /// Computes the map for `scene`.
    ///
    /// Scenes without pixels, or whose pixels cannot be processed, get a
    /// uniform neutral map instead of an error.
    pub fn analyze(&self, scene: &Scene<'_>) -> SaliencyMap {
        let _span = trace_span!("saliency", width = scene.width(), height = scene.height()).entered();
        let neutral = || {
            SaliencyMap::uniform(
                scene.width(),
                scene.height(),
                NEUTRAL_SALIENCY,
                self.config.max_analysis_dim,
            )
        };
        let Some(pixels) = scene.pixels() else {
            trace_warn!("saliency_neutral", reason = "no pixels");
            return neutral();
        };
        match self.compute(pixels) {
            Ok(map) => {
                trace_event!("saliency_map", map_width = map.width(), map_height = map.height());
                map
            }
            Err(err) => {
                trace_warn!("saliency_neutral", reason = err.to_string().as_str());
                neutral()
            }
        }
    }

    fn compute(&self, pixels: ImageView<'_, Rgb8>) -> OverlayResult<SaliencyMap> {
        let gray = gray_from_rgb(pixels)?;
        let (w, h) = fit_within(gray.width(), gray.height(), self.config.max_analysis_dim);
        let gray = downsample_mean(gray.view(), w, h)?;

        let mut gradient = gradient_magnitude(gray.view());
        let mut variance = local_variance(gray.view(), self.config.window);
        normalize_in_place(&mut gradient);
        normalize_in_place(&mut variance);

        let gw = self.config.gradient_weight;
        let vw = self.config.variance_weight;
        let mut combined: Vec<f32> = gradient
            .iter()
            .zip(variance.iter())
            .map(|(&g, &v)| gw * g + vw * v)
            .collect();
        normalize_in_place(&mut combined);

        Ok(SaliencyMap {
            map: OwnedImage::new(combined, w, h)?,
            source_width: pixels.width(),
            source_height: pixels.height(),
        })
    }
}
