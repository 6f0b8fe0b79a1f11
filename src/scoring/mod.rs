//! Pluggable quality metrics and their weighted aggregation.
//!
//! Every metric maps one element (plus read-only request context) to `[0, 1]`.
//! New metrics implement [`ScoringMetric`] and join a [`CompositeScorer`]
//! without touching the existing ones.

use serde::{Deserialize, Serialize};

use crate::color::ContrastAnalyzer;
use crate::image::Scene;
use crate::layout::OverlayElement;
use crate::saliency::SaliencyMap;

mod composite;
mod metrics;

pub use composite::CompositeScorer;
pub use metrics::{
    ContrastMetric, GridAlignmentMetric, HierarchyMetric, ReadabilityMetric, SafeZoneMetric,
    SaliencyAvoidanceMetric,
};

/// Read-only inputs shared by all metrics during one ranking pass.
#[derive(Clone, Copy)]
pub struct ScoreContext<'a> {
    pub scene: Scene<'a>,
    pub saliency: &'a SaliencyMap,
    pub contrast: &'a ContrastAnalyzer,
    /// All elements of the candidate being scored, in output order.
    pub elements: &'a [OverlayElement],
    pub margin_percent: f64,
}

/// A stateless quality measure returning a value in `[0, 1]`.
pub trait ScoringMetric: Send + Sync {
    /// Stable identifier used in weight tables and diagnostics.
    fn name(&self) -> &'static str;

    fn score(&self, element: &OverlayElement, ctx: &ScoreContext<'_>) -> f64;
}

/// Relative weights of the built-in metrics; normalized by the scorer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub contrast: f64,
    pub saliency_avoidance: f64,
    pub hierarchy: f64,
    pub safe_zone: f64,
    pub grid_alignment: f64,
    pub readability: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            contrast: 0.35,
            saliency_avoidance: 0.25,
            hierarchy: 0.20,
            safe_zone: 0.10,
            grid_alignment: 0.05,
            readability: 0.05,
        }
    }
}

/// Weights plus per-metric parameters for the default scorer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    pub contrast: ContrastMetric,
    pub grid: GridAlignmentMetric,
    pub safe_zone: SafeZoneMetric,
    pub hierarchy: HierarchyMetric,
    pub readability: ReadabilityMetric,
}
