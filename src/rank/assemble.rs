//! Turns validated zones into fully styled overlay elements.

use serde::{Deserialize, Serialize};

use crate::color::{Color, ContrastAnalyzer, ContrastDecision};
use crate::image::Scene;
use crate::layout::{
    Effects, OverlayBox, OverlayElement, PanelStyle, PositionValidator, Role, TextAlign, Typography,
};
use crate::rank::{BrandHints, TextRequest};
use crate::saliency::SaliencyMap;
use crate::util::{OverlayError, OverlayResult};

/// Font family and size rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypesetConfig {
    /// Used when no brand font is given.
    pub default_font_family: String,
    /// Headline size as a fraction of the image height.
    pub headline_height_ratio: f64,
    pub min_headline_px: f64,
    pub max_headline_px: f64,
    /// Floor for every non-headline role.
    pub min_secondary_px: f64,
    /// Average glyph advance in em, used to fit the headline into its box.
    pub glyph_width_em: f64,
    pub headline_max_lines: usize,
    /// Canvas side assumed when the scene reports no dimensions.
    pub reference_canvas_px: usize,
}

impl Default for TypesetConfig {
    fn default() -> Self {
        Self {
            default_font_family: "Inter".to_string(),
            headline_height_ratio: 0.09,
            min_headline_px: 24.0,
            max_headline_px: 96.0,
            min_secondary_px: 12.0,
            glyph_width_em: 0.55,
            headline_max_lines: 2,
            reference_canvas_px: 1080,
        }
    }
}

impl TypesetConfig {
    pub fn validate(&self) -> OverlayResult<()> {
        if !(self.min_headline_px > 0.0 && self.min_headline_px <= self.max_headline_px) {
            return Err(OverlayError::InvalidConfig {
                field: "typeset.min_headline_px",
                reason: "must be positive and not above max_headline_px",
            });
        }
        if !(self.headline_height_ratio > 0.0 && self.glyph_width_em > 0.0) {
            return Err(OverlayError::InvalidConfig {
                field: "typeset.headline_height_ratio",
                reason: "ratio and glyph width must be positive",
            });
        }
        if self.headline_max_lines == 0 {
            return Err(OverlayError::InvalidConfig {
                field: "typeset.headline_max_lines",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Coerces every field into a usable range, falling back to defaults.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let positive_or = |v: f64, d: f64| if v.is_finite() && v > 0.0 { v } else { d };

        let min_headline = positive_or(self.min_headline_px, defaults.min_headline_px);
        let max_headline = positive_or(self.max_headline_px, defaults.max_headline_px).max(min_headline);
        let family = self.default_font_family.trim();

        Self {
            default_font_family: if family.is_empty() {
                defaults.default_font_family
            } else {
                family.to_string()
            },
            headline_height_ratio: positive_or(self.headline_height_ratio, defaults.headline_height_ratio),
            min_headline_px: min_headline,
            max_headline_px: max_headline,
            min_secondary_px: positive_or(self.min_secondary_px, defaults.min_secondary_px),
            glyph_width_em: positive_or(self.glyph_width_em, defaults.glyph_width_em),
            headline_max_lines: self.headline_max_lines.max(1),
            reference_canvas_px: if self.reference_canvas_px == 0 {
                defaults.reference_canvas_px
            } else {
                self.reference_canvas_px
            },
        }
    }

    /// First brand font, else the default family.
    pub fn font_family<'a>(&'a self, brand: Option<&'a BrandHints>) -> &'a str {
        brand
            .and_then(|b| b.fonts.iter().map(|f| f.trim()).find(|f| !f.is_empty()))
            .unwrap_or(self.default_font_family.as_str())
    }

    /// Unfitted headline size for an image of the given height.
    pub fn headline_size(&self, image_height: usize) -> f64 {
        // min/max rather than clamp: NaN bounds must not panic.
        (image_height as f64 * self.headline_height_ratio)
            .min(self.max_headline_px)
            .max(self.min_headline_px)
    }

    /// Font size per text request, in request order.
    ///
    /// The first primary element sets the headline size, shrunk until its
    /// text fits the box width in `headline_max_lines` lines. Every other
    /// role scales from that size.
    pub fn sizes(
        &self,
        texts: &[TextRequest],
        boxes: &[OverlayBox],
        image_width: usize,
        image_height: usize,
    ) -> Vec<f64> {
        let (w, h) = if image_width == 0 || image_height == 0 {
            (self.reference_canvas_px, self.reference_canvas_px)
        } else {
            (image_width, image_height)
        };
        let base = self.headline_size(h);
        let headline = texts
            .iter()
            .zip(boxes)
            .find(|(t, _)| t.role.is_primary())
            .map(|(t, b)| {
                let box_px = b.width / 100.0 * w as f64;
                base.min(self.fit(&t.text, box_px)).max(self.min_headline_px)
            })
            .unwrap_or(base);

        texts
            .iter()
            .map(|t| {
                if t.role.is_primary() {
                    headline
                } else {
                    (headline * t.role.scale()).max(self.min_secondary_px)
                }
            })
            .collect()
    }

    /// Largest size at which `text` fits `box_px` in the allowed lines.
    fn fit(&self, text: &str, box_px: f64) -> f64 {
        let chars = text.chars().count();
        if chars == 0 || !box_px.is_finite() {
            return f64::INFINITY;
        }
        let lines = self.headline_max_lines.max(1) as f64;
        box_px * lines / (chars as f64 * self.glyph_width_em)
    }
}

/// When and how to back text with a panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Mean saliency under the box above which a panel is drawn.
    pub saliency_threshold: f32,
    /// 0-100.
    pub opacity: f64,
    /// Padding as a multiple of the element's font size.
    pub padding_em: f64,
    pub corner_radius_px: f64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            saliency_threshold: 0.6,
            opacity: 60.0,
            padding_em: 0.4,
            corner_radius_px: 8.0,
        }
    }
}

impl PanelConfig {
    /// Coerces every field into a usable range, falling back to defaults.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let non_negative_or = |v: f64, d: f64| if v.is_finite() && v >= 0.0 { v } else { d };
        Self {
            saliency_threshold: if self.saliency_threshold.is_finite() {
                self.saliency_threshold.clamp(0.0, 1.0)
            } else {
                defaults.saliency_threshold
            },
            opacity: non_negative_or(self.opacity, defaults.opacity).min(100.0),
            padding_em: non_negative_or(self.padding_em, defaults.padding_em),
            corner_radius_px: non_negative_or(self.corner_radius_px, defaults.corner_radius_px),
        }
    }

    /// Panel for one element, or [`PanelStyle::none`].
    pub fn style(
        &self,
        decision: &ContrastDecision,
        region_saliency: f32,
        min_text_contrast: f64,
        font_size: f64,
        brand: Option<&BrandHints>,
    ) -> PanelStyle {
        let busy = region_saliency > self.saliency_threshold;
        let weak = decision
            .contrast_ratio
            .is_some_and(|ratio| ratio < min_text_contrast);
        if !(busy || weak) {
            return PanelStyle::none();
        }
        let text = decision.text_color;
        let color = brand
            .and_then(|b| {
                b.colors
                    .iter()
                    .copied()
                    .find(|c| c.contrast_with(&text) >= min_text_contrast)
            })
            .unwrap_or(if text.relative_luminance() > 0.5 {
                Color::BLACK
            } else {
                Color::WHITE
            });
        PanelStyle {
            enabled: true,
            color,
            opacity: self.opacity,
            padding: (font_size * self.padding_em).round(),
            corner_radius: self.corner_radius_px,
        }
    }
}

/// Shared read-only inputs for building every candidate of one call.
#[derive(Clone, Copy)]
pub(crate) struct Assembly<'a> {
    pub scene: Scene<'a>,
    pub saliency: &'a SaliencyMap,
    pub contrast: &'a ContrastAnalyzer,
    pub validator: &'a PositionValidator,
    pub typeset: &'a TypesetConfig,
    pub panel: &'a PanelConfig,
    pub texts: &'a [TextRequest],
    pub brand: Option<&'a BrandHints>,
}

impl Assembly<'_> {
    /// Builds one element per text request from raw zones.
    ///
    /// Zones are validated one by one, then separated so no two elements
    /// overlap.
    ///
    /// `colors` holds per-element suggestions; the first brand color is used
    /// where there is none. Either one survives only if it is readable.
    pub fn elements(&self, zones: &[OverlayBox], colors: &[Option<Color>]) -> Vec<OverlayElement> {
        let (w, h) = (self.scene.width(), self.scene.height());
        let mut boxes: Vec<OverlayBox> = zones
            .iter()
            .map(|zone| self.validator.validate(zone, w, h))
            .collect();
        let roles: Vec<Role> = self.texts.iter().map(|t| t.role).collect();
        self.validator.separate(&mut boxes, &roles);
        let sizes = self.typeset.sizes(self.texts, &boxes, w, h);
        let family = self.typeset.font_family(self.brand);
        let brand_color = self.brand.and_then(|b| b.colors.first().copied());
        let min_contrast = self.contrast.config().min_text_contrast;

        self.texts
            .iter()
            .zip(boxes)
            .zip(sizes)
            .enumerate()
            .map(|(idx, ((request, bbox), size))| {
                let suggested = colors.get(idx).copied().flatten().or(brand_color);
                let decision = self.contrast.analyze(&self.scene, &bbox, suggested);
                let panel = self.panel.style(
                    &decision,
                    self.saliency.mean_over(&bbox),
                    min_contrast,
                    size,
                    self.brand,
                );
                OverlayElement {
                    role: request.role,
                    text: request.text.clone(),
                    typography: Typography::for_role(request.role, family, size),
                    effects: Effects::from(&decision),
                    color: decision.text_color,
                    text_align: TextAlign::for_box(&bbox),
                    panel,
                    bbox,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[(Role, &str)]) -> Vec<TextRequest> {
        items.iter().map(|(r, t)| TextRequest::new(*r, *t)).collect()
    }

    #[test]
    fn headline_size_scales_with_height_and_clamps() {
        let cfg = TypesetConfig::default();
        assert_eq!(cfg.headline_size(100), 24.0);
        assert!((cfg.headline_size(627) - 56.43).abs() < 1e-9);
        assert_eq!(cfg.headline_size(4000), 96.0);
    }

    #[test]
    fn long_headline_shrinks_but_not_below_minimum() {
        let cfg = TypesetConfig::default();
        let boxes = [OverlayBox::percent(10.0, 10.0, 40.0, 20.0)];
        let short = cfg.sizes(&texts(&[(Role::Headline, "Hi")]), &boxes, 1000, 1000);
        assert_eq!(short[0], 90.0);

        let long_text = "x".repeat(60);
        let long = cfg.sizes(&texts(&[(Role::Headline, long_text.as_str())]), &boxes, 1000, 1000);
        // 400 px * 2 lines / (60 * 0.55)
        assert!((long[0] - 800.0 / 33.0).abs() < 1e-9);

        let huge = "x".repeat(500);
        let floor = cfg.sizes(&texts(&[(Role::Headline, huge.as_str())]), &boxes, 1000, 1000);
        assert_eq!(floor[0], 24.0);
    }

    #[test]
    fn secondary_sizes_follow_role_scale() {
        let cfg = TypesetConfig::default();
        let boxes = [
            OverlayBox::percent(10.0, 10.0, 60.0, 20.0),
            OverlayBox::percent(10.0, 65.0, 50.0, 10.0),
            OverlayBox::percent(10.0, 80.0, 50.0, 10.0),
        ];
        let req = texts(&[
            (Role::Headline, "Big"),
            (Role::Subhead, "Smaller"),
            (Role::Caption, "tiny"),
        ]);
        let sizes = cfg.sizes(&req, &boxes, 1000, 1000);
        assert_eq!(sizes[0], 90.0);
        assert_eq!(sizes[1], 45.0);
        assert_eq!(sizes[2], 27.0);
    }

    #[test]
    fn zero_sized_scene_uses_reference_canvas() {
        let cfg = TypesetConfig::default();
        let boxes = [OverlayBox::percent(10.0, 10.0, 60.0, 20.0)];
        let sizes = cfg.sizes(&texts(&[(Role::Headline, "Hi")]), &boxes, 0, 0);
        assert_eq!(sizes[0], 96.0);
    }

    #[test]
    fn sanitized_typeset_replaces_unusable_values() {
        let cfg = TypesetConfig {
            default_font_family: "  ".to_string(),
            headline_height_ratio: -1.0,
            min_headline_px: f64::NAN,
            max_headline_px: 10.0,
            min_secondary_px: f64::INFINITY,
            glyph_width_em: 0.0,
            headline_max_lines: 0,
            reference_canvas_px: 0,
        }
        .sanitized();
        assert_eq!(cfg.default_font_family, "Inter");
        assert_eq!(cfg.headline_height_ratio, 0.09);
        assert_eq!(cfg.min_headline_px, 24.0);
        assert_eq!(cfg.max_headline_px, 24.0);
        assert_eq!(cfg.min_secondary_px, 12.0);
        assert_eq!(cfg.glyph_width_em, 0.55);
        assert_eq!(cfg.headline_max_lines, 1);
        assert_eq!(cfg.reference_canvas_px, 1080);
        assert!(cfg.validate().is_ok());
        assert_eq!(TypesetConfig::default().sanitized(), TypesetConfig::default());
    }

    #[test]
    fn headline_size_survives_nan_bounds() {
        let cfg = TypesetConfig {
            min_headline_px: f64::NAN,
            ..TypesetConfig::default()
        };
        assert_eq!(cfg.headline_size(4000), 96.0);
    }

    #[test]
    fn sanitized_panel_stays_in_range() {
        let cfg = PanelConfig {
            saliency_threshold: f32::NAN,
            opacity: 250.0,
            padding_em: -1.0,
            corner_radius_px: f64::NAN,
        }
        .sanitized();
        assert_eq!(cfg.saliency_threshold, 0.6);
        assert_eq!(cfg.opacity, 100.0);
        assert_eq!(cfg.padding_em, 0.4);
        assert_eq!(cfg.corner_radius_px, 8.0);
        assert_eq!(PanelConfig::default().sanitized(), PanelConfig::default());
    }

    #[test]
    fn brand_font_wins_over_default() {
        let cfg = TypesetConfig::default();
        assert_eq!(cfg.font_family(None), "Inter");
        let brand = BrandHints {
            colors: Vec::new(),
            fonts: vec!["  ".to_string(), "Montserrat".to_string()],
        };
        assert_eq!(cfg.font_family(Some(&brand)), "Montserrat");
    }

    #[test]
    fn panel_follows_saliency_and_contrast() {
        let cfg = PanelConfig::default();
        let mut decision = ContrastDecision::dark_default();
        decision.contrast_ratio = Some(10.0);
        assert!(!cfg.style(&decision, 0.2, 4.5, 40.0, None).enabled);

        let busy = cfg.style(&decision, 0.9, 4.5, 40.0, None);
        assert!(busy.enabled);
        assert_eq!(busy.color, Color::BLACK);
        assert_eq!(busy.padding, 16.0);

        decision.contrast_ratio = Some(2.0);
        assert!(cfg.style(&decision, 0.1, 4.5, 40.0, None).enabled);
    }

    #[test]
    fn panel_prefers_contrasting_brand_color() {
        let cfg = PanelConfig::default();
        let mut decision = ContrastDecision::dark_default();
        decision.contrast_ratio = Some(1.0);
        let brand = BrandHints {
            colors: vec![
                Color::parse_hex("#EEEEEE").unwrap(),
                Color::parse_hex("#1A237E").unwrap(),
            ],
            fonts: Vec::new(),
        };
        let panel = cfg.style(&decision, 0.0, 4.5, 40.0, Some(&brand));
        assert_eq!(panel.color, Color::parse_hex("#1A237E").unwrap());
    }
}
