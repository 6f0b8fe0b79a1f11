//! Deterministic candidate ordering.

use std::cmp::Ordering;

use crate::rank::Candidate;

/// Higher score first; equal scores fall back to the fixed strategy priority.
fn candidate_cmp_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.strategy.priority().cmp(&b.strategy.priority()))
}

/// Sorts candidates by descending score with deterministic tie-breaking.
pub(crate) fn sort_candidates_desc(candidates: &mut [Candidate]) {
    candidates.sort_by(candidate_cmp_desc);
}
