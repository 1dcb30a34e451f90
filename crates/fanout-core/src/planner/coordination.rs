//! Coordination contract publication
//!
//! Once workers are spawned, the engine publishes a shared coordination
//! record plus one workload record per worker. Records are write-once and
//! best-effort: the execution runtime honors them, this component never
//! polls or enforces anything.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::planner::types::{AgentWorkload, ExecutionPlan, ExecutionStrategy, FailureRecovery};
use crate::store::ContextStore;

/// Named stages the execution runtime reports against, in order
pub const CHECKPOINTS: [&str; 5] = [
    "initialization_complete",
    "halfway_milestone",
    "integration_ready",
    "testing_phase",
    "deployment_ready",
];

/// Shared context embedded in the coordination record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedContext {
    pub objective_id: String,
    pub coordination_mode: String,
    pub checkpoints: Vec<String>,
    pub failure_recovery: FailureRecovery,
}

/// Shared contract for one plan's execution, keyed by plan id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinationRecord {
    pub plan_id: String,
    pub strategy: ExecutionStrategy,
    pub agent_team: Vec<AgentWorkload>,
    pub shared_context: SharedContext,
    pub timestamp: DateTime<Utc>,
}

/// Per-worker workload record, keyed by the worker's concrete id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadRecord {
    pub agent_id: String,
    pub assigned_todos: Vec<String>,
    pub specializations: Vec<String>,
    pub coordination_key: String,
    /// Concrete ids of every other worker in the team
    pub peer_agents: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Key of the shared coordination record for a plan
pub fn coordination_key(plan_id: &str) -> String {
    format!("coordination:{plan_id}")
}

/// Key of a worker's workload record
pub fn workload_key(agent_id: &str) -> String {
    format!("workload:{agent_id}")
}

/// Publishes coordination and workload records via the context store
pub struct CoordinationInitializer {
    store: Arc<dyn ContextStore>,
}

impl CoordinationInitializer {
    pub fn new(store: Arc<dyn ContextStore>) -> Self {
        Self { store }
    }

    /// Write the coordination record and one record per bound worker
    ///
    /// Store failures are logged and swallowed; publication is best-effort
    /// and never fails a planning cycle.
    pub async fn initialize(&self, plan: &ExecutionPlan, objective_id: &str) {
        let key = coordination_key(&plan.plan_id);
        let record = CoordinationRecord {
            plan_id: plan.plan_id.clone(),
            strategy: plan.execution_strategy,
            agent_team: plan.agent_team.clone(),
            shared_context: SharedContext {
                objective_id: objective_id.to_string(),
                coordination_mode: "parallel".to_string(),
                checkpoints: CHECKPOINTS.iter().map(|c| c.to_string()).collect(),
                failure_recovery: plan.failure_recovery,
            },
            timestamp: Utc::now(),
        };
        self.publish(&key, &record).await;

        let bound_ids: Vec<&str> = plan
            .agent_team
            .iter()
            .filter_map(|w| w.binding.id())
            .collect();

        for workload in &plan.agent_team {
            let Some(agent_id) = workload.binding.id() else {
                continue;
            };
            let record = WorkloadRecord {
                agent_id: agent_id.to_string(),
                assigned_todos: workload.assigned_todos.clone(),
                specializations: workload.specializations.clone(),
                coordination_key: key.clone(),
                peer_agents: bound_ids
                    .iter()
                    .filter(|id| **id != agent_id)
                    .map(|id| id.to_string())
                    .collect(),
                timestamp: Utc::now(),
            };
            self.publish(&workload_key(agent_id), &record).await;
        }

        debug!(
            plan_id = %plan.plan_id,
            workers = bound_ids.len(),
            "published coordination contract"
        );
    }

    async fn publish<T: Serialize>(&self, key: &str, record: &T) {
        let value = match serde_json::to_value(record) {
            Ok(value) => value,
            Err(err) => {
                warn!(key = %key, error = %err, "failed to serialize coordination record");
                return;
            }
        };
        if let Err(err) = self.store.store(key, value, None).await {
            warn!(key = %key, error = %err, "failed to persist coordination record");
        }
    }
}
