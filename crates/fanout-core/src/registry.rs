//! Plan and workload registry
//!
//! Process-lifetime bookkeeping for active plans and bound agent workloads.
//! Injected into the engine (rather than living in globals) so multiple
//! planning contexts can be tested in isolation. Entries are append-only
//! during a cycle; eviction is explicit and caller-driven.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::planner::types::{AgentWorkload, ExecutionPlan};

/// Registry of active execution plans and bound agent workloads
///
/// Key spaces are disjoint by construction: plan ids and agent ids both
/// carry a timestamp plus a random suffix, so concurrent planning cycles
/// never collide.
#[derive(Debug, Default)]
pub struct PlanRegistry {
    plans: RwLock<HashMap<String, ExecutionPlan>>,
    workloads: RwLock<HashMap<String, AgentWorkload>>,
}

impl PlanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plan (or replace it after rebinding agent ids)
    pub async fn insert_plan(&self, plan: ExecutionPlan) {
        self.plans.write().await.insert(plan.plan_id.clone(), plan);
    }

    /// Look up an active plan by id
    pub async fn get_plan(&self, plan_id: &str) -> Option<ExecutionPlan> {
        self.plans.read().await.get(plan_id).cloned()
    }

    /// Remove a plan. Plans are never evicted automatically.
    pub async fn evict_plan(&self, plan_id: &str) -> Option<ExecutionPlan> {
        self.plans.write().await.remove(plan_id)
    }

    pub async fn plan_count(&self) -> usize {
        self.plans.read().await.len()
    }

    /// Record a workload under its concrete (spawned) agent id
    pub async fn bind_workload(&self, agent_id: &str, workload: AgentWorkload) {
        self.workloads
            .write()
            .await
            .insert(agent_id.to_string(), workload);
    }

    /// Look up the workload bound to a concrete agent id
    pub async fn get_workload(&self, agent_id: &str) -> Option<AgentWorkload> {
        self.workloads.read().await.get(agent_id).cloned()
    }

    pub async fn workload_count(&self) -> usize {
        self.workloads.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::types::{
        AgentBinding, ExecutionStrategy, FailureRecovery, generate_id,
    };

    fn sample_plan() -> ExecutionPlan {
        ExecutionPlan {
            plan_id: generate_id("plan"),
            opportunities: Vec::new(),
            agent_team: Vec::new(),
            execution_strategy: ExecutionStrategy::WaveBased,
            estimated_completion: 0.0,
            max_parallelism: 0,
            failure_recovery: FailureRecovery::Reassign,
        }
    }

    #[tokio::test]
    async fn test_insert_and_evict_plan() {
        let registry = PlanRegistry::new();
        let plan = sample_plan();
        let plan_id = plan.plan_id.clone();

        registry.insert_plan(plan).await;
        assert_eq!(registry.plan_count().await, 1);
        assert!(registry.get_plan(&plan_id).await.is_some());

        let evicted = registry.evict_plan(&plan_id).await;
        assert!(evicted.is_some());
        assert_eq!(registry.plan_count().await, 0);
    }

    #[tokio::test]
    async fn test_bind_workload() {
        let registry = PlanRegistry::new();
        let workload = AgentWorkload {
            binding: AgentBinding::Bound("agent_1".to_string()),
            agent_type: "backend_developer".to_string(),
            assigned_todos: vec!["t1".to_string()],
            estimated_duration: 25.0,
            utilization: 1.0,
            capabilities: vec!["backend_development".to_string()],
            specializations: vec!["general_specialist".to_string()],
        };

        registry.bind_workload("agent_1", workload).await;
        assert_eq!(registry.workload_count().await, 1);

        let stored = registry.get_workload("agent_1").await.unwrap();
        assert_eq!(stored.agent_type, "backend_developer");
    }
}
