//! Learning sink
//!
//! Records the outcome of executed plans for later inspection. Purely
//! additive: nothing in the planning path reads these records back.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::{PlanEvent, PlanEventKind, PlanObserver};

/// Realized outcome of one executed plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOutcome {
    pub plan_id: String,
    pub success: bool,
    /// Realized speedup versus the sequential baseline
    pub actual_speedup: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Observer that accumulates plan outcomes from completion events
#[derive(Debug, Default)]
pub struct LearningSink {
    outcomes: Mutex<Vec<PlanOutcome>>,
}

impl LearningSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded outcomes
    pub fn outcomes(&self) -> Vec<PlanOutcome> {
        self.outcomes.lock().map(|o| o.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.outcomes.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PlanObserver for LearningSink {
    fn on_event(&self, event: &PlanEvent) {
        let PlanEventKind::ExecutionCompleted {
            plan_id,
            success,
            actual_speedup,
        } = &event.kind
        else {
            return;
        };

        let outcome = PlanOutcome {
            plan_id: plan_id.clone(),
            success: *success,
            actual_speedup: *actual_speedup,
            recorded_at: event.timestamp,
        };
        debug!(plan_id = %outcome.plan_id, success = outcome.success, "recorded plan outcome");
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_completion_events() {
        let sink = LearningSink::new();
        sink.on_event(&PlanEvent::new(PlanEventKind::ExecutionCompleted {
            plan_id: "plan_1".to_string(),
            success: true,
            actual_speedup: 2.1,
        }));

        let outcomes = sink.outcomes();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].plan_id, "plan_1");
        assert!(outcomes[0].success);
    }

    #[test]
    fn test_ignores_other_events() {
        let sink = LearningSink::new();
        sink.on_event(&PlanEvent::new(PlanEventKind::ExecutionStarted {
            plan_id: "plan_1".to_string(),
            agent_count: 3,
            estimated_speedup: 2.0,
        }));

        assert!(sink.is_empty());
    }
}
