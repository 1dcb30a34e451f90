//! Plan engine - public surface of the planning subsystem
//!
//! Ties detection, ranking, team synthesis, strategy selection, plan
//! bookkeeping, spawning, and coordination publication together. Planning is
//! pure and synchronous; the only suspension points are the external spawn
//! calls (sequential, awaited one at a time) and best-effort store writes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::classify::{CapabilityClassifier, KeywordClassifier};
use crate::config::HeuristicsConfig;
use crate::error::{Error, Result};
use crate::events::{PlanEvent, PlanEventKind, PlanObserver};
use crate::planner::coordination::CoordinationInitializer;
use crate::planner::detector::OpportunityDetector;
use crate::planner::ranker;
use crate::planner::strategy;
use crate::planner::team::TeamSynthesizer;
use crate::planner::types::{
    AgentBinding, ExecutionPlan, FailureRecovery, ParallelizationOpportunity, Todo, generate_id,
};
use crate::registry::PlanRegistry;
use crate::store::{ContextStore, InMemoryStore};

/// TTL for observability summaries (ranking and plan digests)
const SUMMARY_TTL: Duration = Duration::from_secs(60 * 60);

/// Handle to a spawned worker, as returned by the execution runtime
#[derive(Debug, Clone)]
pub struct SpawnedAgent {
    pub id: String,
}

/// External factory spawning a worker for a role and specialization
#[async_trait]
pub trait AgentSpawner: Send + Sync {
    async fn spawn(&self, role: &str, specialization: &str) -> Result<SpawnedAgent>;
}

/// Result of executing a plan's spawn sequence
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    /// Concrete ids of the spawned workers, in team order
    pub spawned_agents: Vec<String>,
    pub total_agents_spawned: usize,
    /// Number of opportunities the plan draws on
    pub parallel_workflows: usize,
    /// Human-readable speedup versus the sequential baseline
    pub estimated_speedup: String,
}

/// The parallelization planning engine
///
/// Owns no worker processes and executes no tasks; it only produces plans
/// and publishes the coordination contract an external runtime fulfills.
pub struct PlanEngine {
    config: HeuristicsConfig,
    detector: OpportunityDetector,
    synthesizer: TeamSynthesizer,
    coordination: CoordinationInitializer,
    store: Arc<dyn ContextStore>,
    registry: Arc<PlanRegistry>,
    observers: Vec<Arc<dyn PlanObserver>>,
    objective_id: Option<String>,
}

impl PlanEngine {
    /// Engine with default tables, in-memory store, and fresh registry
    pub fn new() -> Self {
        PlanEngineBuilder::new().build()
    }

    pub fn builder() -> PlanEngineBuilder {
        PlanEngineBuilder::new()
    }

    /// Detect and rank parallelization opportunities for one objective
    ///
    /// Deterministic for fixed todos, objective type, and tables, modulo
    /// generated opportunity ids. A summary is persisted for observability;
    /// persistence failure never aborts detection.
    pub async fn detect_opportunities(
        &self,
        todos: &[Todo],
        objective_type: &str,
        current_agents: usize,
    ) -> Result<Vec<ParallelizationOpportunity>> {
        let detected = self.detector.detect(todos, objective_type);
        let ranked = ranker::rank(detected);

        debug!(
            objective_type = %objective_type,
            todos = todos.len(),
            current_agents = current_agents,
            opportunities = ranked.len(),
            "ranked parallelization opportunities"
        );

        let summary = ranker::summarize(&ranked);
        self.persist_summary(&format!("opportunities:{objective_type}"), &summary)
            .await;

        Ok(ranked)
    }

    /// Synthesize a team and assemble the execution plan
    ///
    /// Zero opportunities yield a valid plan with an empty team and a 0.0
    /// completion estimate; callers should skip parallel execution for it.
    pub async fn create_execution_plan(
        &self,
        opportunities: &[ParallelizationOpportunity],
        todos: &[Todo],
        max_agents: Option<usize>,
    ) -> Result<ExecutionPlan> {
        let max_agents = max_agents.unwrap_or(self.config.default_max_agents);
        let team = self.synthesizer.synthesize(opportunities, todos, max_agents);
        let execution_strategy = strategy::select_strategy(opportunities);
        let estimated_completion = strategy::estimate_completion(&team, execution_strategy);

        let max_parallelism = team.len().min(self.config.max_parallelism_cap);

        let plan = ExecutionPlan {
            plan_id: generate_id("plan"),
            opportunities: opportunities.to_vec(),
            agent_team: team,
            execution_strategy,
            estimated_completion,
            max_parallelism,
            failure_recovery: FailureRecovery::Reassign,
        };

        self.registry.insert_plan(plan.clone()).await;

        self.persist_summary(
            &format!("plan:{}", plan.plan_id),
            &json!({
                "plan_id": plan.plan_id,
                "strategy": plan.execution_strategy.to_string(),
                "team_size": plan.agent_team.len(),
                "estimated_completion": plan.estimated_completion,
            }),
        )
        .await;

        info!(
            plan_id = %plan.plan_id,
            strategy = %plan.execution_strategy,
            team_size = plan.agent_team.len(),
            estimated_completion = plan.estimated_completion,
            "created execution plan"
        );

        Ok(plan)
    }

    /// Spawn one worker per workload and publish the coordination contract
    ///
    /// Spawn calls are sequential and awaited one at a time. A spawn failure
    /// propagates immediately; already-spawned workers stay registered and
    /// the failed workload keeps its pending binding (no retry, no
    /// rollback).
    pub async fn execute_plan(
        &self,
        plan: &ExecutionPlan,
        spawner: &dyn AgentSpawner,
    ) -> Result<ExecutionReport> {
        let sequential_time = plan.sequential_time();
        let speedup = if plan.estimated_completion > 0.0 {
            sequential_time / plan.estimated_completion
        } else {
            0.0
        };

        self.emit(PlanEventKind::ExecutionStarted {
            plan_id: plan.plan_id.clone(),
            agent_count: plan.agent_team.len(),
            estimated_speedup: speedup,
        });

        let mut bound_team = Vec::with_capacity(plan.agent_team.len());
        let mut spawned_agents = Vec::new();

        for workload in &plan.agent_team {
            let specialization = workload
                .specializations
                .first()
                .cloned()
                .unwrap_or_else(|| self.config.default_specialization.clone());

            let agent = spawner
                .spawn(&workload.agent_type, &specialization)
                .await
                .map_err(|err| match err {
                    spawn @ Error::SpawnFailed(..) => spawn,
                    other => Error::SpawnFailed(workload.agent_type.clone(), other.to_string()),
                })?;

            let mut bound = workload.clone();
            bound.binding = AgentBinding::Bound(agent.id.clone());
            self.registry.bind_workload(&agent.id, bound.clone()).await;
            spawned_agents.push(agent.id);
            bound_team.push(bound);
        }

        let bound_plan = ExecutionPlan {
            agent_team: bound_team,
            ..plan.clone()
        };
        self.registry.insert_plan(bound_plan.clone()).await;

        let objective_id = self
            .objective_id
            .clone()
            .unwrap_or_else(|| bound_plan.plan_id.clone());
        self.coordination.initialize(&bound_plan, &objective_id).await;

        info!(
            plan_id = %bound_plan.plan_id,
            spawned = spawned_agents.len(),
            strategy = %bound_plan.execution_strategy,
            "parallel execution started"
        );

        Ok(ExecutionReport {
            total_agents_spawned: spawned_agents.len(),
            parallel_workflows: bound_plan.opportunities.len(),
            estimated_speedup: format!("{speedup:.1}x faster"),
            spawned_agents,
        })
    }

    /// Report the realized outcome of an executed plan
    ///
    /// Emits the completion event consumed by the learning sink. The
    /// outcome is not fed back into planning decisions.
    pub async fn record_outcome(
        &self,
        plan_id: &str,
        success: bool,
        actual_speedup: f64,
    ) -> Result<()> {
        if self.registry.get_plan(plan_id).await.is_none() {
            return Err(Error::PlanNotFound(plan_id.to_string()));
        }

        self.emit(PlanEventKind::ExecutionCompleted {
            plan_id: plan_id.to_string(),
            success,
            actual_speedup,
        });
        Ok(())
    }

    /// The registry backing this engine
    pub fn registry(&self) -> &Arc<PlanRegistry> {
        &self.registry
    }

    /// The heuristic tables backing this engine
    pub fn config(&self) -> &HeuristicsConfig {
        &self.config
    }

    fn emit(&self, kind: PlanEventKind) {
        let event = PlanEvent::new(kind);
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }

    /// Best-effort store write; failures are logged, never propagated
    async fn persist_summary<T: serde::Serialize>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(err) => {
                warn!(key = %key, error = %err, "failed to serialize planning summary");
                return;
            }
        };
        if let Err(err) = self.store.store(key, value, Some(SUMMARY_TTL)).await {
            warn!(key = %key, error = %err, "failed to persist planning summary");
        }
    }
}

impl Default for PlanEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`PlanEngine`]
pub struct PlanEngineBuilder {
    config: HeuristicsConfig,
    classifier: Option<Arc<dyn CapabilityClassifier>>,
    store: Option<Arc<dyn ContextStore>>,
    registry: Option<Arc<PlanRegistry>>,
    observers: Vec<Arc<dyn PlanObserver>>,
    objective_id: Option<String>,
}

impl Default for PlanEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: HeuristicsConfig::default(),
            classifier: None,
            store: None,
            registry: None,
            observers: Vec::new(),
            objective_id: None,
        }
    }

    /// Swap in custom heuristic tables
    pub fn config(mut self, config: HeuristicsConfig) -> Self {
        self.config = config;
        self
    }

    /// Swap in a custom classifier
    pub fn classifier(mut self, classifier: Arc<dyn CapabilityClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Set the external context store
    pub fn store(mut self, store: Arc<dyn ContextStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Share a registry across engines
    pub fn registry(mut self, registry: Arc<PlanRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Subscribe an observer to plan lifecycle events
    pub fn observer(mut self, observer: Arc<dyn PlanObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Objective this engine plans for, used in coordination records
    pub fn objective(mut self, objective_id: impl Into<String>) -> Self {
        self.objective_id = Some(objective_id.into());
        self
    }

    pub fn build(self) -> PlanEngine {
        let classifier = self
            .classifier
            .unwrap_or_else(|| Arc::new(KeywordClassifier::new(self.config.clone())));
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryStore::new()));
        let registry = self.registry.unwrap_or_default();

        PlanEngine {
            detector: OpportunityDetector::new(self.config.clone(), classifier.clone()),
            synthesizer: TeamSynthesizer::new(self.config.clone(), classifier),
            coordination: CoordinationInitializer::new(store.clone()),
            config: self.config,
            store,
            registry,
            observers: self.observers,
            objective_id: self.objective_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingObserver;
    use crate::store::FailingStore;
    use std::sync::Mutex;

    struct CountingSpawner {
        counter: Mutex<usize>,
    }

    impl CountingSpawner {
        fn new() -> Self {
            Self {
                counter: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl AgentSpawner for CountingSpawner {
        async fn spawn(&self, role: &str, _specialization: &str) -> Result<SpawnedAgent> {
            let mut counter = self.counter.lock().unwrap();
            *counter += 1;
            Ok(SpawnedAgent {
                id: format!("{}_{}", role, counter),
            })
        }
    }

    struct RefusingSpawner;

    #[async_trait]
    impl AgentSpawner for RefusingSpawner {
        async fn spawn(&self, role: &str, _specialization: &str) -> Result<SpawnedAgent> {
            Err(Error::SpawnFailed(
                role.to_string(),
                "runtime refused".to_string(),
            ))
        }
    }

    fn sample_todos() -> Vec<Todo> {
        vec![
            Todo::new("t1", "Build user form"),
            Todo::new("t2", "Add api endpoint"),
            Todo::new("t3", "Update page layout"),
        ]
    }

    #[tokio::test]
    async fn test_full_cycle() {
        let observer = Arc::new(RecordingObserver::new());
        let engine = PlanEngine::builder()
            .objective("obj_1")
            .observer(observer.clone())
            .build();

        let todos = sample_todos();
        let opportunities = engine
            .detect_opportunities(&todos, "widget", 0)
            .await
            .unwrap();
        assert!(!opportunities.is_empty());

        let plan = engine
            .create_execution_plan(&opportunities, &todos, None)
            .await
            .unwrap();
        assert!(!plan.agent_team.is_empty());
        assert!(plan.agent_team.len() <= engine.config().default_max_agents);

        let report = engine
            .execute_plan(&plan, &CountingSpawner::new())
            .await
            .unwrap();
        assert_eq!(report.total_agents_spawned, plan.agent_team.len());
        assert_eq!(report.parallel_workflows, plan.opportunities.len());
        assert!(report.estimated_speedup.ends_with("x faster"));

        // Registry holds the bound plan and every spawned workload
        let bound = engine.registry().get_plan(&plan.plan_id).await.unwrap();
        assert!(bound.agent_team.iter().all(|w| !w.binding.is_pending()));
        assert_eq!(
            engine.registry().workload_count().await,
            report.total_agents_spawned
        );

        engine.record_outcome(&plan.plan_id, true, 2.0).await.unwrap();
        let kinds = observer.kinds();
        assert_eq!(kinds.len(), 2);
        assert!(matches!(kinds[0], PlanEventKind::ExecutionStarted { .. }));
        assert!(matches!(
            kinds[1],
            PlanEventKind::ExecutionCompleted { success: true, .. }
        ));
    }

    #[tokio::test]
    async fn test_spawn_failure_propagates() {
        let engine = PlanEngine::new();
        let todos = sample_todos();
        let opportunities = engine
            .detect_opportunities(&todos, "widget", 0)
            .await
            .unwrap();
        let plan = engine
            .create_execution_plan(&opportunities, &todos, None)
            .await
            .unwrap();

        let result = engine.execute_plan(&plan, &RefusingSpawner).await;
        assert!(matches!(result, Err(Error::SpawnFailed(_, _))));
        // Nothing was bound
        assert_eq!(engine.registry().workload_count().await, 0);
    }

    struct BrokenSpawner;

    #[async_trait]
    impl AgentSpawner for BrokenSpawner {
        async fn spawn(&self, _role: &str, _specialization: &str) -> Result<SpawnedAgent> {
            Err(Error::StoreError("backing runtime offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_spawn_errors_are_not_double_wrapped() {
        let engine = PlanEngine::new();
        let todos = sample_todos();
        let opportunities = engine
            .detect_opportunities(&todos, "widget", 0)
            .await
            .unwrap();
        let plan = engine
            .create_execution_plan(&opportunities, &todos, None)
            .await
            .unwrap();

        // A spawner that already reports SpawnFailed passes through as-is
        let err = engine
            .execute_plan(&plan, &RefusingSpawner)
            .await
            .unwrap_err();
        assert_eq!(err.to_string().matches("Failed to spawn agent").count(), 1);
        assert!(err.to_string().contains("runtime refused"));

        // Other error kinds get wrapped once with the failing role
        let err = engine.execute_plan(&plan, &BrokenSpawner).await.unwrap_err();
        let Error::SpawnFailed(role, reason) = err else {
            panic!("expected SpawnFailed, got {err}");
        };
        assert_eq!(role, plan.agent_team[0].agent_type);
        assert!(reason.contains("backing runtime offline"));
    }

    #[tokio::test]
    async fn test_store_failure_never_aborts_planning() {
        let engine = PlanEngine::builder()
            .store(Arc::new(FailingStore))
            .build();

        let todos = sample_todos();
        let opportunities = engine
            .detect_opportunities(&todos, "widget", 0)
            .await
            .unwrap();
        let plan = engine
            .create_execution_plan(&opportunities, &todos, None)
            .await
            .unwrap();
        let report = engine
            .execute_plan(&plan, &CountingSpawner::new())
            .await
            .unwrap();
        assert!(report.total_agents_spawned > 0);
    }

    #[tokio::test]
    async fn test_record_outcome_unknown_plan() {
        let engine = PlanEngine::new();
        let result = engine.record_outcome("plan_missing", true, 1.0).await;
        assert!(matches!(result, Err(Error::PlanNotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_plan_execution() {
        let engine = PlanEngine::new();
        let plan = engine.create_execution_plan(&[], &[], None).await.unwrap();

        assert!(plan.agent_team.is_empty());
        assert_eq!(plan.estimated_completion, 0.0);
        assert_eq!(plan.max_parallelism, 0);

        let report = engine
            .execute_plan(&plan, &CountingSpawner::new())
            .await
            .unwrap();
        assert_eq!(report.total_agents_spawned, 0);
        assert_eq!(report.estimated_speedup, "0.0x faster");
    }
}
