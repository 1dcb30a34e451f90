//! Fanout Core Library
//!
//! Parallelization planning for agent teams. This crate provides:
//! - Opportunity detection over a flat todo list (independent tasks,
//!   specialized breakdown, load distribution, capability split)
//! - Ranking, team synthesis, and execution-strategy selection
//! - Plan bookkeeping and the coordination contract for an external runtime
//! - Swappable heuristic tables and capability classification
//! - Plan lifecycle events and an outcome-learning sink
//!
//! The engine never executes tasks itself: spawning and task execution live
//! behind the [`planner::AgentSpawner`] and [`store::ContextStore`] seams.

pub mod classify;
pub mod config;
pub mod error;
pub mod events;
pub mod planner;
pub mod registry;
pub mod store;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::classify::{CapabilityClassifier, KeywordClassifier};
    pub use crate::config::HeuristicsConfig;
    pub use crate::error::{Error, Result};
    pub use crate::planner::{
        AgentSpawner, AgentWorkload, ExecutionPlan, ExecutionStrategy, PlanEngine,
        ParallelizationOpportunity, SpawnedAgent, Todo,
    };
    pub use crate::registry::PlanRegistry;
    pub use crate::store::{ContextStore, InMemoryStore};
}
