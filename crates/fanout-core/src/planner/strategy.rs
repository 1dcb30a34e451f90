//! Strategy selection and completion-time estimation
//!
//! Pure functions over the opportunity mix and the synthesized team.

use crate::planner::types::{
    AgentWorkload, ExecutionStrategy, OpportunityKind, ParallelizationOpportunity,
};

/// Minutes of coordination overhead per team member
const OVERHEAD_PER_AGENT: f64 = 2.0;

/// Classify the opportunity mix into an execution strategy
///
/// Independent plus specialized work runs as a hybrid; load distribution
/// alone runs fully concurrent; specialized work alone pipelines; anything
/// else falls back to waves.
pub fn select_strategy(opportunities: &[ParallelizationOpportunity]) -> ExecutionStrategy {
    let has = |kind: OpportunityKind| opportunities.iter().any(|o| o.kind == kind);

    let independent = has(OpportunityKind::IndependentTasks);
    let specialized = has(OpportunityKind::SpecializedBreakdown);

    if independent && specialized {
        ExecutionStrategy::Hybrid
    } else if has(OpportunityKind::LoadDistribution) {
        ExecutionStrategy::Concurrent
    } else if specialized {
        ExecutionStrategy::Pipeline
    } else {
        ExecutionStrategy::WaveBased
    }
}

/// Estimate total completion time in minutes for a team under a strategy
///
/// An empty team estimates 0.0 by convention.
pub fn estimate_completion(team: &[AgentWorkload], strategy: ExecutionStrategy) -> f64 {
    if team.is_empty() {
        return 0.0;
    }

    let durations: Vec<f64> = team.iter().map(|w| w.estimated_duration).collect();
    let total: f64 = durations.iter().sum();
    let longest = durations.iter().cloned().fold(0.0, f64::max);
    let average = total / durations.len() as f64;
    let overhead = team.len() as f64 * OVERHEAD_PER_AGENT;

    match strategy {
        ExecutionStrategy::Concurrent => longest + overhead,
        ExecutionStrategy::Pipeline => 0.7 * total + overhead,
        ExecutionStrategy::WaveBased => 1.5 * average + overhead,
        ExecutionStrategy::Hybrid => 0.6 * total + overhead,
    }
}
