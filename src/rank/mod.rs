//! Candidate generation and ranking.
//!
//! One candidate per [`Strategy`]: a raw proposal from a
//! [`ProposalSource`] (or the catalog template when there is none), repaired by
//! the validator, colored by the contrast analyzer, and scored by the
//! composite scorer. Candidates are then sorted by score with a fixed
//! strategy priority for ties.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::color::{Color, ContrastConfig};
use crate::layout::{OverlayElement, Role, Strategy, ValidatorConfig};
use crate::saliency::SaliencyConfig;
use crate::scoring::ScoringConfig;
use crate::util::{OverlayError, OverlayResult};

mod assemble;
mod order;
mod proposal;
mod ranker;

pub use assemble::{PanelConfig, TypesetConfig};
pub use proposal::{
    ProposalRequest, ProposalSource, RawElement, RawProposal, StaticProposalSource,
};
pub use ranker::{RankContext, Ranker};

/// One piece of text to place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextRequest {
    pub role: Role,
    pub text: String,
}

impl TextRequest {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Optional brand styling preferences.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandHints {
    /// Preferred text/panel colors, most important first.
    pub colors: Vec<Color>,
    /// Preferred font families, most important first.
    pub fonts: Vec<String>,
}

/// Per-request overrides of the ranker configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOverrides {
    pub margin_percent: Option<f64>,
    pub max_width_percent: Option<f64>,
    pub top_n: Option<usize>,
}

/// Input contract of one ranking call (the image travels separately).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub text_requests: Vec<TextRequest>,
    #[serde(default)]
    pub brand_hints: Option<BrandHints>,
    #[serde(default)]
    pub config: Option<LayoutOverrides>,
}

impl LayoutRequest {
    pub fn new(text_requests: Vec<TextRequest>) -> Self {
        Self {
            text_requests,
            brand_hints: None,
            config: None,
        }
    }

    pub fn with_brand_hints(mut self, hints: BrandHints) -> Self {
        self.brand_hints = Some(hints);
        self
    }

    pub fn with_overrides(mut self, overrides: LayoutOverrides) -> Self {
        self.config = Some(overrides);
        self
    }
}

/// Ranker configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    /// Strategies to try; order does not affect the ranking.
    pub strategies: Vec<Strategy>,
    /// Candidates returned (primary plus alternatives).
    pub top_n: usize,
    /// Score candidates on the rayon pool (needs the `rayon` feature).
    pub parallel: bool,
    /// Per-call timeout for the proposal source.
    pub proposal_timeout_ms: u64,
    /// Replace a failed proposal with the strategy's template instead of
    /// dropping the strategy.
    pub template_fallback: bool,
    pub typeset: TypesetConfig,
    pub panel: PanelConfig,
    pub saliency: SaliencyConfig,
    pub contrast: ContrastConfig,
    pub validator: ValidatorConfig,
    pub scoring: ScoringConfig,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            strategies: Strategy::ALL.to_vec(),
            top_n: 3,
            parallel: false,
            proposal_timeout_ms: 8_000,
            template_fallback: true,
            typeset: TypesetConfig::default(),
            panel: PanelConfig::default(),
            saliency: SaliencyConfig::default(),
            contrast: ContrastConfig::default(),
            validator: ValidatorConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl RankConfig {
    /// Reports the first inconsistent setting.
    ///
    /// [`Ranker::new`] does not require this to pass; it sanitizes instead.
    pub fn validate(&self) -> OverlayResult<()> {
        if self.strategies.is_empty() {
            return Err(OverlayError::InvalidConfig {
                field: "strategies",
                reason: "must name at least one strategy",
            });
        }
        if self.top_n == 0 {
            return Err(OverlayError::InvalidConfig {
                field: "top_n",
                reason: "must be at least 1",
            });
        }
        if self.proposal_timeout_ms == 0 {
            return Err(OverlayError::InvalidConfig {
                field: "proposal_timeout_ms",
                reason: "must be positive",
            });
        }
        if !(self.contrast.dark_threshold < self.contrast.light_threshold) {
            return Err(OverlayError::InvalidConfig {
                field: "contrast.dark_threshold",
                reason: "must be below light_threshold",
            });
        }
        self.typeset.validate()?;
        self.validator.validate()
    }
}

/// Where a candidate's geometry came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrigin {
    Proposal,
    Template,
    /// The single candidate produced when every strategy failed.
    Fallback,
}

/// One complete proposed layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub elements: Vec<OverlayElement>,
    pub strategy: Strategy,
    pub score: f64,
    pub origin: CandidateOrigin,
}

/// Output contract of one ranking call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RankOutput {
    pub primary: Vec<OverlayElement>,
    pub alternatives: Vec<Vec<OverlayElement>>,
    /// Rank index (0 = primary) to score.
    pub scores: BTreeMap<usize, f64>,
    /// Strategy of each returned layout, in rank order.
    pub strategies_used: Vec<String>,
    /// True when no strategy survived and the template default was returned.
    pub fallback_used: bool,
}

impl RankOutput {
    /// The documented no-op result for requests without text.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    fn from_ranked(candidates: Vec<Candidate>, top_n: usize) -> Self {
        let fallback_used = candidates
            .first()
            .is_some_and(|c| c.origin == CandidateOrigin::Fallback);
        let mut out = Self {
            fallback_used,
            ..Self::default()
        };
        for (idx, candidate) in candidates.into_iter().take(top_n.max(1)).enumerate() {
            out.scores.insert(idx, candidate.score);
            out.strategies_used.push(candidate.strategy.as_str().to_string());
            if idx == 0 {
                out.primary = candidate.elements;
            } else {
                out.alternatives.push(candidate.elements);
            }
        }
        out
    }
}
