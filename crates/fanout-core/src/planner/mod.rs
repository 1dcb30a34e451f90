//! Parallelization planning
//!
//! Turns a flat todo list for one objective into a multi-worker execution
//! plan. Data flows strictly downward:
//!
//! 1. **Detection** ([`detector`]) scans the todos with four independent
//!    sub-detectors, each emitting at most one opportunity.
//! 2. **Ranking** ([`ranker`]) filters and orders opportunities by a
//!    confidence x speedup score.
//! 3. **Team synthesis** ([`team`]) turns ranked opportunities into a
//!    bounded list of pending agent workloads.
//! 4. **Strategy selection** ([`strategy`]) classifies the opportunity mix
//!    and estimates completion time.
//! 5. **Execution** ([`engine`]) spawns workers sequentially through the
//!    external factory, binds concrete ids, and publishes the coordination
//!    contract ([`coordination`]).
//! 6. **Learning** ([`learning`]) records realized outcomes; nothing in the
//!    planning path reads them back.
//!
//! No stage reads back from a later one, and planning itself never blocks:
//! the only suspension points are spawn calls and best-effort store writes.

pub mod coordination;
pub mod detector;
pub mod engine;
pub mod learning;
pub mod ranker;
pub mod strategy;
pub mod team;
pub mod types;

pub use coordination::{
    CHECKPOINTS, CoordinationInitializer, CoordinationRecord, SharedContext, WorkloadRecord,
};
pub use detector::OpportunityDetector;
pub use engine::{
    AgentSpawner, ExecutionReport, PlanEngine, PlanEngineBuilder, SpawnedAgent,
};
pub use learning::{LearningSink, PlanOutcome};
pub use ranker::{RankingSummary, rank, summarize};
pub use strategy::{estimate_completion, select_strategy};
pub use team::TeamSynthesizer;
pub use types::{
    AgentBinding, AgentWorkload, ExecutionPlan, ExecutionStrategy, FailureRecovery,
    OpportunityKind, ParallelizationOpportunity, Priority, Todo, TodoStatus, generate_id,
};
