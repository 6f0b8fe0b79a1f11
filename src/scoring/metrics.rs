//! The built-in metric set.

use serde::{Deserialize, Serialize};

use crate::color::{contrast_ratio, relative_luminance};
use crate::layout::{OverlayElement, Role};
use crate::scoring::{ScoreContext, ScoringMetric};
use crate::util::math::{clamp01, distance_to_multiple, ramp};

/// `min(1, ratio / ceiling)` between text color and sampled background.
///
/// The ceiling defaults to 7:1 (WCAG enhanced) and only normalizes; it is not
/// a pass/fail gate. Unsampleable backgrounds score 0.5.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastMetric {
    pub ceiling: f64,
}

impl Default for ContrastMetric {
    fn default() -> Self {
        Self { ceiling: 7.0 }
    }
}

impl ScoringMetric for ContrastMetric {
    fn name(&self) -> &'static str {
        "contrast"
    }

    fn score(&self, element: &OverlayElement, ctx: &ScoreContext<'_>) -> f64 {
        let Some(mean) = ctx.contrast.sample_mean(&ctx.scene, &element.bbox) else {
            return 0.5;
        };
        let bg = relative_luminance(mean[0], mean[1], mean[2]);
        let ratio = contrast_ratio(element.color.relative_luminance(), bg);
        clamp01(ratio / self.ceiling.max(1.0))
    }
}

/// `1 - mean saliency` under the element box.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SaliencyAvoidanceMetric;

impl ScoringMetric for SaliencyAvoidanceMetric {
    fn name(&self) -> &'static str {
        "saliency_avoidance"
    }

    fn score(&self, element: &OverlayElement, ctx: &ScoreContext<'_>) -> f64 {
        clamp01(1.0 - f64::from(ctx.saliency.mean_over(&element.bbox)))
    }
}

/// Rewards origins that sit on grid lines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridAlignmentMetric {
    pub columns: usize,
    pub rows: usize,
    /// Allowed distance to a grid line, in percent.
    pub tolerance_percent: f64,
}

impl Default for GridAlignmentMetric {
    fn default() -> Self {
        Self {
            columns: 12,
            rows: 12,
            tolerance_percent: 1.0,
        }
    }
}

impl ScoringMetric for GridAlignmentMetric {
    fn name(&self) -> &'static str {
        "grid_alignment"
    }

    fn score(&self, element: &OverlayElement, _ctx: &ScoreContext<'_>) -> f64 {
        let aligned = |value: f64, cells: usize| {
            cells > 0 && distance_to_multiple(value, 100.0 / cells as f64) <= self.tolerance_percent
        };
        match (
            aligned(element.bbox.x, self.columns),
            aligned(element.bbox.y, self.rows),
        ) {
            (true, true) => 1.0,
            (true, false) | (false, true) => 0.7,
            (false, false) => 0.3,
        }
    }
}

/// Penalizes margin violations and boxes centered near the image center.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafeZoneMetric {
    /// Subtracted once per violated edge.
    pub edge_penalty: f64,
    /// Subtracted when the center is within `avoid_radius_percent` of (50, 50).
    pub center_penalty: f64,
    pub avoid_radius_percent: f64,
}

impl Default for SafeZoneMetric {
    fn default() -> Self {
        Self {
            edge_penalty: 0.25,
            center_penalty: 0.3,
            avoid_radius_percent: 10.0,
        }
    }
}

impl ScoringMetric for SafeZoneMetric {
    fn name(&self) -> &'static str {
        "safe_zone"
    }

    fn score(&self, element: &OverlayElement, ctx: &ScoreContext<'_>) -> f64 {
        let b = &element.bbox;
        let m = ctx.margin_percent;
        let violations = [
            b.x < m,
            b.y < m,
            b.right() > 100.0 - m,
            b.bottom() > 100.0 - m,
        ]
        .iter()
        .filter(|&&v| v)
        .count();

        let mut score = 1.0 - self.edge_penalty * violations as f64;
        let (cx, cy) = b.center();
        if ((cx - 50.0).powi(2) + (cy - 50.0).powi(2)).sqrt() < self.avoid_radius_percent {
            score -= self.center_penalty;
        }
        clamp01(score)
    }
}

/// Primary-to-secondary font size ratio.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyMetric {
    pub min_ratio: f64,
    pub max_ratio: f64,
}

impl Default for HierarchyMetric {
    fn default() -> Self {
        Self {
            min_ratio: 1.5,
            max_ratio: 2.5,
        }
    }
}

impl HierarchyMetric {
    /// Score for a ratio: 1 inside the band, falling to 0 at ratio 1 below it
    /// and at twice the upper bound above it.
    pub fn score_ratio(&self, ratio: f64) -> f64 {
        if !ratio.is_finite() {
            return 0.0;
        }
        if ratio < self.min_ratio {
            ramp(ratio, 1.0, self.min_ratio)
        } else if ratio > self.max_ratio {
            1.0 - ramp(ratio, self.max_ratio, 2.0 * self.max_ratio)
        } else {
            1.0
        }
    }
}

impl ScoringMetric for HierarchyMetric {
    fn name(&self) -> &'static str {
        "hierarchy"
    }

    fn score(&self, _element: &OverlayElement, ctx: &ScoreContext<'_>) -> f64 {
        let elements = ctx.elements;
        let primary = elements
            .iter()
            .position(|e| e.role.is_primary())
            .unwrap_or(0);
        let secondary = elements.iter().enumerate().find(|(i, _)| *i != primary);
        let (Some(p), Some((_, s))) = (elements.get(primary), secondary) else {
            return 1.0;
        };
        if s.typography.font_size <= 0.0 {
            return 0.0;
        }
        self.score_ratio(p.typography.font_size / s.typography.font_size)
    }
}

/// Font size plausibility per role class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadabilityMetric {
    /// Comfortable pixel range for headlines.
    pub primary_range: (f64, f64),
    /// Comfortable pixel range for every other role.
    pub secondary_range: (f64, f64),
    /// Tolerance band as a fraction of the range bounds.
    pub tolerance: f64,
    /// Score outside the tolerance band.
    pub floor: f64,
}

impl Default for ReadabilityMetric {
    fn default() -> Self {
        Self {
            primary_range: (24.0, 96.0),
            secondary_range: (12.0, 64.0),
            tolerance: 0.5,
            floor: 0.3,
        }
    }
}

impl ReadabilityMetric {
    pub fn score_size(&self, role: Role, size: f64) -> f64 {
        let (lo, hi) = if role.is_primary() {
            self.primary_range
        } else {
            self.secondary_range
        };
        let floor = clamp01(self.floor);
        if !size.is_finite() {
            return floor;
        }
        let lo_tol = lo * (1.0 - self.tolerance);
        let hi_tol = hi * (1.0 + self.tolerance);
        let fit = if size < lo {
            ramp(size, lo_tol, lo)
        } else if size > hi {
            1.0 - ramp(size, hi, hi_tol)
        } else {
            1.0
        };
        floor + (1.0 - floor) * fit
    }
}

impl ScoringMetric for ReadabilityMetric {
    fn name(&self) -> &'static str {
        "readability"
    }

    fn score(&self, element: &OverlayElement, _ctx: &ScoreContext<'_>) -> f64 {
        self.score_size(element.role, element.typography.font_size)
    }
}
