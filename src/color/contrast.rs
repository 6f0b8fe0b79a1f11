//! Background sampling and the readable-text rule table.
//!
//! A fixed-size square centered on the region is averaged, its WCAG relative
//! luminance bucketed into light/medium/dark, and the bucket picks text color
//! plus shadow and stroke parameters.

use serde::{Deserialize, Serialize};

use crate::color::{contrast_ratio, relative_luminance, Color};
use crate::image::Scene;
use crate::layout::OverlayBox;

/// Tunable thresholds for [`ContrastAnalyzer`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastConfig {
    /// Side of the sampled square in source pixels.
    pub sample_size: usize,
    /// Backgrounds above this luminance count as light.
    pub light_threshold: f64,
    /// Backgrounds below this luminance count as dark.
    pub dark_threshold: f64,
    /// A candidate text color is kept only at or above this ratio.
    pub min_text_contrast: f64,
}

impl Default for ContrastConfig {
    fn default() -> Self {
        Self {
            sample_size: 50,
            light_threshold: 0.5,
            dark_threshold: 0.12,
            min_text_contrast: 4.5,
        }
    }
}

/// Luminance bucket of a sampled background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundTone {
    Light,
    Medium,
    Dark,
}

/// Text color and legibility effects chosen for one region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContrastDecision {
    pub text_color: Color,
    pub shadow_enabled: bool,
    pub shadow_color: Color,
    pub shadow_blur: f64,
    pub shadow_offset: (f64, f64),
    pub stroke_width: f64,
    pub stroke_color: Color,
    pub tone: BackgroundTone,
    /// Mean color of the sample; `None` when the sample was empty.
    pub background: Option<Color>,
    /// Relative luminance of the mean sample, `None` when empty.
    pub background_luminance: Option<f64>,
    /// Ratio between `text_color` and the sampled background.
    pub contrast_ratio: Option<f64>,
}

impl ContrastDecision {
    fn for_tone(tone: BackgroundTone) -> Self {
        let (text_color, shadow_color, shadow_blur, shadow_offset, stroke_width, stroke_color) =
            match tone {
                BackgroundTone::Light => (
                    Color::BLACK,
                    Color::WHITE,
                    4.0,
                    (1.0, 1.0),
                    1.0,
                    Color::WHITE,
                ),
                BackgroundTone::Medium => (
                    Color::WHITE,
                    Color::BLACK,
                    10.0,
                    (2.0, 2.0),
                    0.0,
                    Color::BLACK,
                ),
                BackgroundTone::Dark => (
                    Color::WHITE,
                    Color::BLACK,
                    4.0,
                    (1.0, 1.0),
                    0.0,
                    Color::BLACK,
                ),
            };
        Self {
            text_color,
            shadow_enabled: true,
            shadow_color,
            shadow_blur,
            shadow_offset,
            stroke_width,
            stroke_color,
            tone,
            background: None,
            background_luminance: None,
            contrast_ratio: None,
        }
    }

    /// White text, black shadow: the answer when nothing could be sampled.
    pub fn dark_default() -> Self {
        Self::for_tone(BackgroundTone::Dark)
    }
}

/// Samples image regions and picks readable text colors.
#[derive(Clone, Debug, Default)]
pub struct ContrastAnalyzer {
    config: ContrastConfig,
}

impl ContrastAnalyzer {
    pub fn new(config: ContrastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContrastConfig {
        &self.config
    }

    /// Mean RGB (0-255, fractional) of the sample square centered on `region`.
    ///
    /// Returns `None` when the scene has no pixels or the clamped square is
    /// empty.
    pub fn sample_mean(&self, scene: &Scene<'_>, region: &OverlayBox) -> Option<[f64; 3]> {
        let pixels = scene.pixels()?;
        let width = pixels.width() as i64;
        let height = pixels.height() as i64;
        let pct = region.to_percent(pixels.width(), pixels.height());
        let (cx_pct, cy_pct) = pct.center();
        if !cx_pct.is_finite() || !cy_pct.is_finite() {
            return None;
        }
        let cx = (cx_pct / 100.0 * width as f64).round() as i64;
        let cy = (cy_pct / 100.0 * height as f64).round() as i64;
        let half = (self.config.sample_size.max(1) / 2) as i64;
        let side = self.config.sample_size.max(1) as i64;

        let x0 = (cx - half).clamp(0, width);
        let y0 = (cy - half).clamp(0, height);
        let x1 = (cx - half + side).clamp(0, width);
        let y1 = (cy - half + side).clamp(0, height);
        let sample = pixels
            .roi(x0 as usize, y0 as usize, (x1 - x0) as usize, (y1 - y0) as usize)
            .ok()?;

        let mut sum = [0.0f64; 3];
        for y in 0..sample.height() {
            for px in sample.row(y)? {
                sum[0] += f64::from(px[0]);
                sum[1] += f64::from(px[1]);
                sum[2] += f64::from(px[2]);
            }
        }
        let count = (sample.width() * sample.height()) as f64;
        Some([sum[0] / count, sum[1] / count, sum[2] / count])
    }

    /// Buckets a background luminance.
    pub fn tone_for(&self, luminance: f64) -> BackgroundTone {
        if luminance > self.config.light_threshold {
            BackgroundTone::Light
        } else if luminance < self.config.dark_threshold {
            BackgroundTone::Dark
        } else {
            BackgroundTone::Medium
        }
    }

    /// Picks text color and effects for `region`.
    ///
    /// `candidate` (a brand or proposal color) survives only when it reaches
    /// `min_text_contrast` against the sample.
    pub fn analyze(
        &self,
        scene: &Scene<'_>,
        region: &OverlayBox,
        candidate: Option<Color>,
    ) -> ContrastDecision {
        let Some(mean) = self.sample_mean(scene, region) else {
            return ContrastDecision::dark_default();
        };
        let luminance = relative_luminance(mean[0], mean[1], mean[2]);
        let mut decision = ContrastDecision::for_tone(self.tone_for(luminance));

        if let Some(color) = candidate {
            let ratio = contrast_ratio(color.relative_luminance(), luminance);
            if ratio >= self.config.min_text_contrast {
                decision.text_color = color;
            }
        }

        decision.background = Some(Color::rgb(
            mean[0].round() as u8,
            mean[1].round() as u8,
            mean[2].round() as u8,
        ));
        decision.background_luminance = Some(luminance);
        decision.contrast_ratio = Some(contrast_ratio(
            decision.text_color.relative_luminance(),
            luminance,
        ));
        decision
    }
}
