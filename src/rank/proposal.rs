//! The asynchronous boundary to whatever proposes rough layouts.
//!
//! A proposal source is usually a remote model; the ranker treats its output
//! as untrusted hints. Boxes may be missing or out of range and colors may not
//! parse. Everything is repaired or replaced downstream.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::image::Scene;
use crate::layout::{OverlayBox, Strategy};
use crate::rank::TextRequest;
use crate::util::ProposalError;

/// Everything a source gets to see for one strategy.
#[derive(Clone, Copy, Debug)]
pub struct ProposalRequest<'a> {
    pub scene: Scene<'a>,
    pub text_requests: &'a [TextRequest],
    pub strategy: Strategy,
}

/// One rough element as proposed upstream.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawElement {
    /// Used to match the element to a text request.
    pub text: String,
    pub rough_box: Option<OverlayBox>,
    /// Hex string; ignored when it does not parse.
    pub suggested_color: Option<String>,
}

impl RawElement {
    pub fn new(text: impl Into<String>, rough_box: OverlayBox) -> Self {
        Self {
            text: text.into(),
            rough_box: Some(rough_box),
            suggested_color: None,
        }
    }

    pub fn with_color(mut self, hex: impl Into<String>) -> Self {
        self.suggested_color = Some(hex.into());
        self
    }
}

/// A rough layout for one strategy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProposal {
    pub elements: Vec<RawElement>,
}

impl RawProposal {
    pub fn new(elements: Vec<RawElement>) -> Self {
        Self { elements }
    }

    /// Parses model output, tolerating a surrounding markdown code fence.
    pub fn parse_json(text: &str) -> Result<Self, ProposalError> {
        serde_json::from_str(strip_json_fences(text))
            .map_err(|err| ProposalError::Malformed(err.to_string()))
    }
}

/// Strips ```json ... ``` or ``` ... ``` fences.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let body = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match body {
        Some(body) => {
            let body = body.trim_start();
            body.strip_suffix("```").map(str::trim).unwrap_or(body)
        }
        None => text,
    }
}

/// Produces rough layouts for a strategy.
///
/// Implementations must be callable concurrently; the ranker issues one call
/// per strategy at the same time and bounds each with a timeout.
#[async_trait]
pub trait ProposalSource: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    async fn propose(&self, request: &ProposalRequest<'_>) -> Result<RawProposal, ProposalError>;
}

/// Serves canned proposals keyed by strategy.
///
/// Useful offline and in tests; strategies without an entry report
/// [`ProposalError::Unavailable`].
#[derive(Clone, Debug, Default)]
pub struct StaticProposalSource {
    name: String,
    proposals: BTreeMap<Strategy, RawProposal>,
}

impl StaticProposalSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            proposals: BTreeMap::new(),
        }
    }

    pub fn with_proposal(mut self, strategy: Strategy, proposal: RawProposal) -> Self {
        self.proposals.insert(strategy, proposal);
        self
    }
}

#[async_trait]
impl ProposalSource for StaticProposalSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn propose(&self, request: &ProposalRequest<'_>) -> Result<RawProposal, ProposalError> {
        self.proposals
            .get(&request.strategy)
            .cloned()
            .ok_or_else(|| {
                ProposalError::Unavailable(format!("no proposal for {}", request.strategy))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences_with_and_without_tag() {
        assert_eq!(strip_json_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_json_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_json_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn parse_json_accepts_partial_elements() {
        let raw = RawProposal::parse_json(
            "```json\n{\"elements\": [{\"text\": \"Hi\", \"suggested_color\": \"#fff\"}, {}]}\n```",
        )
        .unwrap();
        assert_eq!(raw.elements.len(), 2);
        assert_eq!(raw.elements[0].text, "Hi");
        assert!(raw.elements[0].rough_box.is_none());
        assert_eq!(raw.elements[1], RawElement::default());
    }

    #[test]
    fn parse_json_reports_malformed() {
        let err = RawProposal::parse_json("not json").unwrap_err();
        assert!(matches!(err, ProposalError::Malformed(_)));
    }
}
