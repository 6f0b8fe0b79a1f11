//! Weighted aggregation of metrics.

use std::fmt;
use std::sync::Arc;

use crate::layout::OverlayElement;
use crate::scoring::{
    SaliencyAvoidanceMetric, ScoreContext, ScoringConfig, ScoringMetric,
};
use crate::util::math::clamp01;

/// `sum(w_i * metric_i)` with weights normalized to sum to 1.
///
/// Metric outputs are clamped to `[0, 1]` before weighting, so the composite
/// is always in `[0, 1]`.
#[derive(Clone)]
pub struct CompositeScorer {
    metrics: Vec<(Arc<dyn ScoringMetric>, f64)>,
}

impl fmt::Debug for CompositeScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.metrics.iter().map(|(m, w)| (m.name(), *w)))
            .finish()
    }
}

impl Default for CompositeScorer {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

impl CompositeScorer {
    /// Builds a scorer from `(metric, weight)` pairs.
    ///
    /// Negative or non-finite weights count as zero. When every weight is zero
    /// the scorer returns 0 for everything.
    pub fn new(metrics: Vec<(Arc<dyn ScoringMetric>, f64)>) -> Self {
        let cleaned: Vec<_> = metrics
            .into_iter()
            .map(|(m, w)| (m, if w.is_finite() && w > 0.0 { w } else { 0.0 }))
            .collect();
        let total: f64 = cleaned.iter().map(|(_, w)| w).sum();
        let metrics = if total > 0.0 {
            cleaned.into_iter().map(|(m, w)| (m, w / total)).collect()
        } else {
            cleaned
        };
        Self { metrics }
    }

    /// The built-in six-metric scorer.
    pub fn from_config(config: &ScoringConfig) -> Self {
        let w = &config.weights;
        Self::new(vec![
            weighted(config.contrast.clone(), w.contrast),
            weighted(SaliencyAvoidanceMetric, w.saliency_avoidance),
            weighted(config.hierarchy.clone(), w.hierarchy),
            weighted(config.safe_zone.clone(), w.safe_zone),
            weighted(config.grid.clone(), w.grid_alignment),
            weighted(config.readability.clone(), w.readability),
        ])
    }

    /// Adds a metric and renormalizes.
    pub fn with_metric(self, metric: Arc<dyn ScoringMetric>, weight: f64) -> Self {
        let mut metrics = self.metrics;
        metrics.push((metric, weight));
        Self::new(metrics)
    }

    /// Normalized weights by metric name.
    pub fn weights(&self) -> Vec<(&'static str, f64)> {
        self.metrics.iter().map(|(m, w)| (m.name(), *w)).collect()
    }

    /// Per-metric raw scores for one element.
    pub fn breakdown(
        &self,
        element: &OverlayElement,
        ctx: &ScoreContext<'_>,
    ) -> Vec<(&'static str, f64)> {
        self.metrics
            .iter()
            .map(|(m, _)| (m.name(), clamp01(m.score(element, ctx))))
            .collect()
    }

    /// Weighted score for one element.
    pub fn score_element(&self, element: &OverlayElement, ctx: &ScoreContext<'_>) -> f64 {
        let total: f64 = self
            .metrics
            .iter()
            .filter(|(_, w)| *w > 0.0)
            .map(|(m, w)| w * clamp01(m.score(element, ctx)))
            .sum();
        clamp01(total)
    }

    /// Mean element score of `ctx.elements`; 0 for an empty candidate.
    pub fn score_candidate(&self, ctx: &ScoreContext<'_>) -> f64 {
        if ctx.elements.is_empty() {
            return 0.0;
        }
        let sum: f64 = ctx
            .elements
            .iter()
            .map(|e| self.score_element(e, ctx))
            .sum();
        clamp01(sum / ctx.elements.len() as f64)
    }
}

fn weighted<M: ScoringMetric + 'static>(metric: M, weight: f64) -> (Arc<dyn ScoringMetric>, f64) {
    let metric: Arc<dyn ScoringMetric> = Arc::new(metric);
    (metric, weight)
}
