//! Team synthesis
//!
//! Consumes ranked opportunities and produces a bounded agent team. Roles
//! are deduplicated across opportunities except for load-distribution, where
//! duplicate entries of the same role are the whole point.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::classify::CapabilityClassifier;
use crate::config::HeuristicsConfig;
use crate::planner::types::{
    AgentBinding, AgentWorkload, OpportunityKind, ParallelizationOpportunity, Priority, Todo,
};

/// Minimum estimated minutes for any workload's todo group
const MIN_GROUP_DURATION: f64 = 10.0;
/// Base minutes per todo before word-count weighting
const BASE_TODO_MINUTES: f64 = 15.0;
/// Extra minutes per word of description
const MINUTES_PER_WORD: f64 = 2.0;
/// Duration multiplier for high-priority todos
const HIGH_PRIORITY_FACTOR: f64 = 1.5;

/// Builds agent workloads from ranked opportunities
pub struct TeamSynthesizer {
    config: HeuristicsConfig,
    classifier: Arc<dyn CapabilityClassifier>,
}

impl TeamSynthesizer {
    pub fn new(config: HeuristicsConfig, classifier: Arc<dyn CapabilityClassifier>) -> Self {
        Self { config, classifier }
    }

    /// Synthesize a team of at most `max_agents` workloads
    ///
    /// Iterates opportunities in ranked order and their suggested roles in
    /// listed order, stopping globally once the bound is hit. Every workload
    /// starts out [`AgentBinding::Pending`]; the engine binds concrete ids
    /// after spawning.
    pub fn synthesize(
        &self,
        ranked: &[ParallelizationOpportunity],
        todos: &[Todo],
        max_agents: usize,
    ) -> Vec<AgentWorkload> {
        let by_id: HashMap<&str, &Todo> = todos.iter().map(|t| (t.id.as_str(), t)).collect();

        let mut team: Vec<AgentWorkload> = Vec::new();
        let mut used_roles: HashSet<String> = HashSet::new();

        'opportunities: for opp in ranked {
            for role in &opp.suggested_agents {
                if team.len() >= max_agents {
                    break 'opportunities;
                }
                if used_roles.contains(role) && opp.kind != OpportunityKind::LoadDistribution {
                    continue;
                }

                let assigned: Vec<&Todo> = opp
                    .todo_ids
                    .iter()
                    .filter_map(|id| by_id.get(id.as_str()).copied())
                    .filter(|todo| self.classifier.best_role(&todo.content) == *role)
                    .collect();
                let assigned_ids: Vec<String> =
                    assigned.iter().map(|t| t.id.clone()).collect();

                let utilization = if opp.todo_ids.is_empty() {
                    0.0
                } else {
                    assigned.len() as f64 / opp.todo_ids.len() as f64
                };

                team.push(AgentWorkload {
                    binding: AgentBinding::Pending,
                    agent_type: role.clone(),
                    assigned_todos: assigned_ids,
                    estimated_duration: estimate_group_duration(&assigned),
                    utilization,
                    capabilities: self.config.capabilities_for_role(role),
                    specializations: vec![self.config.specialization_for(opp.kind, role)],
                });
                used_roles.insert(role.clone());
            }
        }

        team
    }
}

/// Word-count and priority heuristic for a todo group's duration
///
/// Per todo: `15 + 2 x word count` minutes, x1.5 when priority is high.
/// The group total is floored at 10 minutes.
fn estimate_group_duration(todos: &[&Todo]) -> f64 {
    let total: f64 = todos
        .iter()
        .map(|todo| {
            let words = todo.content.split_whitespace().count() as f64;
            let base = BASE_TODO_MINUTES + MINUTES_PER_WORD * words;
            if todo.priority == Priority::High {
                base * HIGH_PRIORITY_FACTOR
            } else {
                base
            }
        })
        .sum();
    total.max(MIN_GROUP_DURATION)
}
