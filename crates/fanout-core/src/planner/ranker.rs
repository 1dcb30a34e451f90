//! Opportunity ranking
//!
//! Filters out weak opportunities and orders the rest by expected payoff.
//! Ranking is pure; the engine persists the summary afterwards so a store
//! failure can never disturb the ordering.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::planner::types::ParallelizationOpportunity;

/// Minimum confidence for an opportunity to survive ranking
pub const MIN_CONFIDENCE: f64 = 0.5;
/// Minimum estimated speedup for an opportunity to survive ranking
pub const MIN_SPEEDUP: f64 = 1.1;

/// Filter and sort opportunities by confidence-weighted speedup
///
/// The sort is stable and descending, so equal scores keep detection order.
pub fn rank(mut opportunities: Vec<ParallelizationOpportunity>) -> Vec<ParallelizationOpportunity> {
    opportunities.retain(|o| o.confidence > MIN_CONFIDENCE && o.estimated_speedup > MIN_SPEEDUP);
    opportunities.sort_by(|a, b| {
        b.score()
            .partial_cmp(&a.score())
            .unwrap_or(Ordering::Equal)
    });
    opportunities
}

/// Observability summary persisted after each ranking pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingSummary {
    pub opportunity_count: usize,
    pub average_confidence: f64,
    pub kinds: Vec<String>,
}

/// Summarize a ranked opportunity list
pub fn summarize(opportunities: &[ParallelizationOpportunity]) -> RankingSummary {
    let average_confidence = if opportunities.is_empty() {
        0.0
    } else {
        opportunities.iter().map(|o| o.confidence).sum::<f64>() / opportunities.len() as f64
    };

    RankingSummary {
        opportunity_count: opportunities.len(),
        average_confidence,
        kinds: opportunities.iter().map(|o| o.kind.to_string()).collect(),
    }
}
