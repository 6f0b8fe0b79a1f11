//! Candidate generation, scoring and ordering for one request.

use futures_util::future::join_all;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::color::{Color, ContrastAnalyzer};
use crate::image::Scene;
use crate::layout::{OverlayBox, PositionValidator, Role, Strategy, Template, ZoneTemplateCatalog};
use crate::rank::assemble::Assembly;
use crate::rank::order::sort_candidates_desc;
use crate::rank::{
    Candidate, CandidateOrigin, LayoutRequest, ProposalRequest, ProposalSource, RankConfig,
    RankOutput, RawProposal, TextRequest,
};
use crate::saliency::SaliencyAnalyzer;
use crate::scoring::{CompositeScorer, ScoreContext};
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{OverlayError, OverlayResult, ProposalError};

/// What came back from the proposal source for one strategy.
///
/// `None` means no source was consulted.
type Outcome = Option<Result<RawProposal, ProposalError>>;

/// Per-call collaborators, passed to [`Ranker::rank`].
#[derive(Clone, Default)]
pub struct RankContext {
    source: Option<Arc<dyn ProposalSource>>,
    timeout: Option<Duration>,
}

impl RankContext {
    /// No proposal source: every strategy uses its template.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn with_source(source: Arc<dyn ProposalSource>) -> Self {
        Self {
            source: Some(source),
            timeout: None,
        }
    }

    /// Overrides `RankConfig::proposal_timeout_ms` for this call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn source(&self) -> Option<&Arc<dyn ProposalSource>> {
        self.source.as_ref()
    }
}

impl fmt::Debug for RankContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankContext")
            .field("source", &self.source.as_ref().map(|s| s.name()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Request-level settings after overrides.
struct Plan {
    validator: PositionValidator,
    top_n: usize,
}

/// Generates, validates, scores and orders layout candidates.
///
/// A ranker holds only immutable configuration and can serve concurrent
/// calls.
#[derive(Clone, Debug)]
pub struct Ranker {
    config: RankConfig,
    saliency: SaliencyAnalyzer,
    contrast: ContrastAnalyzer,
    catalog: ZoneTemplateCatalog,
    scorer: CompositeScorer,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(RankConfig::default())
    }
}

impl Ranker {
    /// Builds a ranker; out-of-range settings are coerced, never rejected.
    pub fn new(config: RankConfig) -> Self {
        let mut config = config;
        config.strategies.sort_by_key(Strategy::priority);
        config.strategies.dedup();
        if config.strategies.is_empty() {
            config.strategies = Strategy::ALL.to_vec();
        }
        config.top_n = config.top_n.max(1);
        config.proposal_timeout_ms = config.proposal_timeout_ms.max(1);
        config.validator = config.validator.sanitized();
        config.typeset = config.typeset.sanitized();
        config.panel = config.panel.sanitized();

        Self {
            saliency: SaliencyAnalyzer::new(config.saliency.clone()),
            contrast: ContrastAnalyzer::new(config.contrast.clone()),
            catalog: ZoneTemplateCatalog::default(),
            scorer: CompositeScorer::from_config(&config.scoring),
            config,
        }
    }

    pub fn with_catalog(mut self, catalog: ZoneTemplateCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_scorer(mut self, scorer: CompositeScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ZoneTemplateCatalog {
        &self.catalog
    }

    pub fn scorer(&self) -> &CompositeScorer {
        &self.scorer
    }

    /// Ranks template candidates only; no proposal source, no runtime needed.
    pub fn rank_offline(&self, scene: Scene<'_>, request: &LayoutRequest) -> RankOutput {
        let texts = usable_texts(request);
        if texts.is_empty() {
            return RankOutput::empty();
        }
        let outcomes = vec![None; self.config.strategies.len()];
        self.finish(scene, request, &texts, outcomes)
    }

    /// Ranks candidates, consulting `ctx`'s proposal source for each strategy.
    ///
    /// Proposal calls run concurrently. Inside a tokio runtime each is bounded
    /// by the context timeout (or `proposal_timeout_ms`); the runtime must have
    /// its time driver enabled. Polled from any other executor the calls run
    /// untimed. Never fails: broken proposals and images degrade to templates
    /// and neutral defaults.
    pub async fn rank(
        &self,
        ctx: &RankContext,
        scene: Scene<'_>,
        request: &LayoutRequest,
    ) -> RankOutput {
        let texts = usable_texts(request);
        if texts.is_empty() {
            return RankOutput::empty();
        }
        let outcomes = self.collect_proposals(ctx, scene, &texts).await;
        self.finish(scene, request, &texts, outcomes)
    }

    /// Decodes `bytes` and ranks; undecodable input is ranked as a blank
    /// scene.
    #[cfg(feature = "image-io")]
    pub async fn rank_encoded(
        &self,
        ctx: &RankContext,
        bytes: &[u8],
        request: &LayoutRequest,
    ) -> RankOutput {
        match crate::image::io::decode_rgb(bytes) {
            Ok(image) => self.rank(ctx, Scene::from_view(image.view()), request).await,
            Err(err) => {
                trace_warn!("image_undecodable", reason = err.to_string().as_str());
                self.rank(ctx, Scene::blank(0, 0), request).await
            }
        }
    }

    async fn collect_proposals(
        &self,
        ctx: &RankContext,
        scene: Scene<'_>,
        texts: &[TextRequest],
    ) -> Vec<Outcome> {
        let Some(source) = ctx.source.as_deref() else {
            return vec![None; self.config.strategies.len()];
        };
        let timeout = ctx
            .timeout
            .unwrap_or_else(|| Duration::from_millis(self.config.proposal_timeout_ms));
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let timed = tokio::runtime::Handle::try_current().is_ok();
        if !timed {
            trace_warn!("proposal_timeout_disabled", source = source.name(), millis = millis);
        }

        let calls = self.config.strategies.iter().map(|&strategy| async move {
            let request = ProposalRequest {
                scene,
                text_requests: texts,
                strategy,
            };
            let result = if timed {
                match tokio::time::timeout(timeout, source.propose(&request)).await {
                    Ok(result) => result,
                    Err(_) => Err(ProposalError::Timeout { millis }),
                }
            } else {
                source.propose(&request).await
            };
            if let Err(err) = &result {
                trace_warn!(
                    "proposal_failed",
                    source = source.name(),
                    strategy = strategy.as_str(),
                    reason = err.to_string().as_str(),
                );
            }
            Some(result)
        });
        join_all(calls).await
    }

    fn plan(&self, request: &LayoutRequest) -> Plan {
        let mut validator = self.config.validator.clone();
        let mut top_n = self.config.top_n;
        if let Some(overrides) = &request.config {
            if let Some(margin) = overrides.margin_percent {
                validator.margin_percent = margin;
            }
            if let Some(max_width) = overrides.max_width_percent {
                validator.max_width_percent = max_width;
            }
            if let Some(n) = overrides.top_n {
                top_n = n.max(1);
            }
        }
        Plan {
            validator: PositionValidator::new(validator),
            top_n,
        }
    }

    fn finish(
        &self,
        scene: Scene<'_>,
        request: &LayoutRequest,
        texts: &[TextRequest],
        outcomes: Vec<Outcome>,
    ) -> RankOutput {
        let _span = trace_span!("rank", strategies = outcomes.len(), elements = texts.len()).entered();
        let plan = self.plan(request);
        let saliency = self.saliency.analyze(&scene);
        let template = self.catalog.select(scene.aspect_ratio());
        let assembly = Assembly {
            scene,
            saliency: &saliency,
            contrast: &self.contrast,
            validator: &plan.validator,
            typeset: &self.config.typeset,
            panel: &self.config.panel,
            texts,
            brand: request.brand_hints.as_ref(),
        };

        let jobs: Vec<(Strategy, Outcome)> = self
            .config
            .strategies
            .iter()
            .copied()
            .zip(outcomes)
            .collect();

        let mut candidates = Vec::with_capacity(jobs.len());
        for built in self.build_all(&assembly, template, &jobs) {
            match built {
                Ok(candidate) => candidates.push(candidate),
                Err(err) => {
                    trace_warn!("candidate_dropped", reason = err.to_string().as_str());
                }
            }
        }

        if candidates.is_empty() {
            let strategy = self.config.strategies.first().copied().unwrap_or(Strategy::LeftSide);
            trace_warn!("fallback_candidate", strategy = strategy.as_str());
            let zones = template.zones_for(strategy, &roles(texts));
            candidates.push(self.assemble(&assembly, strategy, &zones, &[], CandidateOrigin::Fallback));
        }

        sort_candidates_desc(&mut candidates);
        trace_event!("ranked", candidates = candidates.len(), top_n = plan.top_n);
        RankOutput::from_ranked(candidates, plan.top_n)
    }

    fn build_all(
        &self,
        assembly: &Assembly<'_>,
        template: &Template,
        jobs: &[(Strategy, Outcome)],
    ) -> Vec<OverlayResult<Candidate>> {
        #[cfg(feature = "rayon")]
        {
            if self.config.parallel {
                use rayon::prelude::*;
                return jobs
                    .par_iter()
                    .map(|(strategy, outcome)| {
                        self.build_candidate(assembly, template, *strategy, outcome.as_ref())
                    })
                    .collect();
            }
        }
        jobs.iter()
            .map(|(strategy, outcome)| {
                self.build_candidate(assembly, template, *strategy, outcome.as_ref())
            })
            .collect()
    }

    fn build_candidate(
        &self,
        assembly: &Assembly<'_>,
        template: &Template,
        strategy: Strategy,
        outcome: Option<&Result<RawProposal, ProposalError>>,
    ) -> OverlayResult<Candidate> {
        let zones = template.zones_for(strategy, &roles(assembly.texts));
        let proposed = match outcome {
            None => {
                return Ok(self.assemble(assembly, strategy, &zones, &[], CandidateOrigin::Template));
            }
            Some(Ok(raw)) => match_proposal(raw, assembly.texts, &zones, strategy),
            Some(Err(err)) => Err(OverlayError::Proposal {
                strategy: strategy.as_str(),
                source: err.clone(),
            }),
        };
        match proposed {
            Ok((boxes, colors)) => {
                Ok(self.assemble(assembly, strategy, &boxes, &colors, CandidateOrigin::Proposal))
            }
            Err(err) if self.config.template_fallback => {
                trace_warn!(
                    "proposal_replaced",
                    strategy = strategy.as_str(),
                    reason = err.to_string().as_str(),
                );
                Ok(self.assemble(assembly, strategy, &zones, &[], CandidateOrigin::Template))
            }
            Err(err) => Err(err),
        }
    }

    fn assemble(
        &self,
        assembly: &Assembly<'_>,
        strategy: Strategy,
        zones: &[OverlayBox],
        colors: &[Option<Color>],
        origin: CandidateOrigin,
    ) -> Candidate {
        let _span = trace_span!("score_candidate", strategy = strategy.as_str()).entered();
        let elements = assembly.elements(zones, colors);
        let ctx = ScoreContext {
            scene: assembly.scene,
            saliency: assembly.saliency,
            contrast: assembly.contrast,
            elements: &elements,
            margin_percent: assembly.validator.config().margin_percent,
        };
        let score = self.scorer.score_candidate(&ctx);
        trace_event!("candidate_scored", strategy = strategy.as_str(), score = score);
        Candidate {
            elements,
            strategy,
            score,
            origin,
        }
    }
}

/// Requests with non-blank text, trimmed.
fn usable_texts(request: &LayoutRequest) -> Vec<TextRequest> {
    request
        .text_requests
        .iter()
        .filter_map(|t| {
            let text = t.text.trim();
            (!text.is_empty()).then(|| TextRequest::new(t.role, text))
        })
        .collect()
}

fn roles(texts: &[TextRequest]) -> Vec<Role> {
    texts.iter().map(|t| t.role).collect()
}

/// Pairs raw elements with text requests: exact text first, then order.
///
/// Requests left without a usable box take their template zone. Extra raw
/// elements are ignored.
fn match_proposal(
    raw: &RawProposal,
    texts: &[TextRequest],
    zones: &[OverlayBox],
    strategy: Strategy,
) -> OverlayResult<(Vec<OverlayBox>, Vec<Option<Color>>)> {
    if raw.elements.is_empty() {
        return Err(OverlayError::CandidateRejected {
            strategy: strategy.as_str(),
            reason: "proposal has no elements".to_string(),
        });
    }

    let mut used = vec![false; raw.elements.len()];
    let mut assigned: Vec<Option<usize>> = vec![None; texts.len()];
    for (slot, request) in assigned.iter_mut().zip(texts) {
        let hit = raw
            .elements
            .iter()
            .enumerate()
            .position(|(j, e)| !used[j] && e.text.trim() == request.text);
        if let Some(j) = hit {
            used[j] = true;
            *slot = Some(j);
        }
    }
    for slot in assigned.iter_mut().filter(|s| s.is_none()) {
        if let Some(j) = used.iter().position(|u| !u) {
            used[j] = true;
            *slot = Some(j);
        }
    }

    let mut boxes = Vec::with_capacity(texts.len());
    let mut colors = Vec::with_capacity(texts.len());
    let mut any_box = false;
    for (idx, slot) in assigned.iter().enumerate() {
        let element = slot.and_then(|j| raw.elements.get(j));
        let rough = element.and_then(|e| e.rough_box);
        any_box |= rough.is_some();
        boxes.push(rough.unwrap_or(zones[idx]));
        colors.push(
            element
                .and_then(|e| e.suggested_color.as_deref())
                .and_then(Color::parse_hex),
        );
    }
    if !any_box {
        return Err(OverlayError::CandidateRejected {
            strategy: strategy.as_str(),
            reason: "proposal has no boxes".to_string(),
        });
    }
    Ok((boxes, colors))
}
