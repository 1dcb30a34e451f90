//! Plan lifecycle events
//!
//! The engine reports execution milestones through an explicit observer
//! interface rather than an ambient event bus, so test suites can assert on
//! emitted events deterministically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

/// An observable plan lifecycle event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEvent {
    /// Unique event ID
    pub event_id: Uuid,
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
    /// What happened
    pub kind: PlanEventKind,
}

impl PlanEvent {
    pub fn new(kind: PlanEventKind) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
        }
    }
}

/// Event payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanEventKind {
    /// Parallel execution of a plan has begun
    #[serde(rename = "parallel_execution_started")]
    ExecutionStarted {
        plan_id: String,
        agent_count: usize,
        estimated_speedup: f64,
    },
    /// A plan's execution finished and the outcome was reported
    #[serde(rename = "parallel_execution_completed")]
    ExecutionCompleted {
        plan_id: String,
        success: bool,
        actual_speedup: f64,
    },
}

/// Observer for plan lifecycle events
pub trait PlanObserver: Send + Sync {
    fn on_event(&self, event: &PlanEvent);
}

/// Observer that records every event it sees, for test assertions
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<PlanEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events
    pub fn events(&self) -> Vec<PlanEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Snapshot of recorded event payloads (ids and timestamps stripped)
    pub fn kinds(&self) -> Vec<PlanEventKind> {
        self.events().into_iter().map(|e| e.kind).collect()
    }
}

impl PlanObserver for RecordingObserver {
    fn on_event(&self, event: &PlanEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
