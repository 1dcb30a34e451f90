//! Core data model for the planning engine
//!
//! Todos flow in, opportunities and workloads flow out. Everything here is
//! plain serializable data; the engine never mutates a caller's todos.

use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Priority of a todo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Medium and high priorities signal work worth a specialized breakdown
    pub fn at_least_medium(&self) -> bool {
        matches!(self, Self::High | Self::Medium)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Status of a todo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// A unit of pending work with a free-text description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub content: String,
    pub priority: Priority,
    pub status: TodoStatus,
}

impl Todo {
    /// Create a pending medium-priority todo
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            priority: Priority::Medium,
            status: TodoStatus::Pending,
        }
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// The kind of parallelization an opportunity represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    /// Todos with no conflicting keywords can run side by side
    IndependentTasks,
    /// Multi-faceted work split across specialized roles
    SpecializedBreakdown,
    /// Many todos of one capability spread over duplicate workers
    LoadDistribution,
    /// Distinct capabilities split to one worker each
    CapabilitySplit,
}

impl std::fmt::Display for OpportunityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndependentTasks => write!(f, "independent_tasks"),
            Self::SpecializedBreakdown => write!(f, "specialized_breakdown"),
            Self::LoadDistribution => write!(f, "load_distribution"),
            Self::CapabilitySplit => write!(f, "capability_split"),
        }
    }
}

/// A detected way to parallelize a subset of todos
///
/// Opportunities are not mutually exclusive: a todo id may appear in more
/// than one. The team synthesizer resolves overlap, not the detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelizationOpportunity {
    pub id: String,
    pub kind: OpportunityKind,
    /// Non-empty subset of the input todo ids
    pub todo_ids: Vec<String>,
    /// Ordered role tags proposed for this opportunity
    pub suggested_agents: Vec<String>,
    /// Estimated speedup factor, always >= 1 for emitted opportunities
    pub estimated_speedup: f64,
    /// Heuristic confidence in [0, 1]
    pub confidence: f64,
    pub dependencies: Vec<String>,
    pub blockers: Vec<String>,
}

impl ParallelizationOpportunity {
    pub fn new(kind: OpportunityKind, todo_ids: Vec<String>, suggested_agents: Vec<String>) -> Self {
        Self {
            id: generate_id("opp"),
            kind,
            todo_ids,
            suggested_agents,
            estimated_speedup: 1.0,
            confidence: 0.0,
            dependencies: Vec::new(),
            blockers: Vec::new(),
        }
    }

    /// Set the speedup estimate
    pub fn with_speedup(mut self, speedup: f64) -> Self {
        self.estimated_speedup = speedup;
        self
    }

    /// Set the confidence score
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Ranking score: confidence weighted by expected speedup
    pub fn score(&self) -> f64 {
        self.confidence * self.estimated_speedup
    }
}

/// Binding between a workload and a concrete worker
///
/// Workloads are synthesized before any worker exists, so they start out
/// pending and are bound once the external spawn resolves. The two-phase
/// lifecycle is explicit in the type instead of a sentinel id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "agent_id", rename_all = "snake_case")]
pub enum AgentBinding {
    /// Not yet spawned
    Pending,
    /// Bound to a running worker with this concrete id
    Bound(String),
}

impl AgentBinding {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Concrete agent id, if bound
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Pending => None,
            Self::Bound(id) => Some(id),
        }
    }
}

/// The binding of a role to a set of todos and (eventually) a worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentWorkload {
    pub binding: AgentBinding,
    /// Role tag this workload is synthesized for
    pub agent_type: String,
    /// Todo ids whose best-fit role matches `agent_type`
    pub assigned_todos: Vec<String>,
    /// Estimated minutes to complete the assigned todos
    pub estimated_duration: f64,
    /// Assigned share of the originating opportunity's todo set
    pub utilization: f64,
    pub capabilities: Vec<String>,
    pub specializations: Vec<String>,
}

/// Execution strategy governing how completion time is estimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    Concurrent,
    Pipeline,
    WaveBased,
    Hybrid,
}

impl std::fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Concurrent => write!(f, "concurrent"),
            Self::Pipeline => write!(f, "pipeline"),
            Self::WaveBased => write!(f, "wave_based"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Policy applied when a worker fails mid-execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureRecovery {
    /// Reassign the failed worker's todos to surviving peers
    Reassign,
}

/// Finalized plan for one planning cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub plan_id: String,
    pub opportunities: Vec<ParallelizationOpportunity>,
    pub agent_team: Vec<AgentWorkload>,
    pub execution_strategy: ExecutionStrategy,
    /// Estimated minutes to completion; 0.0 for an empty team
    pub estimated_completion: f64,
    /// min(team size, configured cap)
    pub max_parallelism: usize,
    pub failure_recovery: FailureRecovery,
}

impl ExecutionPlan {
    /// Sum of per-workload durations, i.e. the single-worker baseline
    pub fn sequential_time(&self) -> f64 {
        self.agent_team.iter().map(|w| w.estimated_duration).sum()
    }
}

/// Generate a `{prefix}_{unix_millis}_{suffix}` identifier
///
/// Timestamp plus random suffix keeps plan and agent id spaces disjoint
/// across concurrent planning cycles.
pub fn generate_id(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix)
}
