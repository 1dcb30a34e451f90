//! Opportunity detection
//!
//! Four independent sub-detectors scan the todo list and each emit at most
//! one [`ParallelizationOpportunity`]. Detection is pure and synchronous
//! over an immutable snapshot of the todos and the heuristic tables.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::classify::{CapabilityClassifier, text_words};
use crate::config::HeuristicsConfig;
use crate::planner::types::{OpportunityKind, ParallelizationOpportunity, Todo};

/// Detects parallelization opportunities in a flat todo list
pub struct OpportunityDetector {
    config: HeuristicsConfig,
    classifier: Arc<dyn CapabilityClassifier>,
}

impl OpportunityDetector {
    pub fn new(config: HeuristicsConfig, classifier: Arc<dyn CapabilityClassifier>) -> Self {
        Self { config, classifier }
    }

    /// Run all four sub-detectors in fixed order
    ///
    /// Returned opportunities are not mutually exclusive; the team
    /// synthesizer resolves overlapping todo ids.
    pub fn detect(&self, todos: &[Todo], objective_type: &str) -> Vec<ParallelizationOpportunity> {
        if todos.is_empty() {
            return Vec::new();
        }

        let mut opportunities = Vec::new();

        if let Some(opp) = self.detect_independent(todos) {
            debug!(kind = %opp.kind, todos = opp.todo_ids.len(), "independent-tasks opportunity");
            opportunities.push(opp);
        }
        if let Some(opp) = self.detect_specialized(todos, objective_type) {
            debug!(kind = %opp.kind, roles = opp.suggested_agents.len(), "specialized-breakdown opportunity");
            opportunities.push(opp);
        }
        if let Some(opp) = self.detect_load_distribution(todos) {
            debug!(kind = %opp.kind, todos = opp.todo_ids.len(), "load-distribution opportunity");
            opportunities.push(opp);
        }
        if let Some(opp) = self.detect_capability_split(todos) {
            debug!(kind = %opp.kind, roles = opp.suggested_agents.len(), "capability-split opportunity");
            opportunities.push(opp);
        }

        opportunities
    }

    /// Independent-tasks detector
    ///
    /// Two todos are independent unless both mention a shared conflict
    /// keyword. Grouping is a greedy single pass: each todo joins the group
    /// of the first seed it is independent with. The relation is not
    /// transitive, so a group may contain members that conflict with each
    /// other; this is a deliberate approximation, and grouped todos must not
    /// be assumed pairwise conflict-free under every keyword table.
    fn detect_independent(&self, todos: &[Todo]) -> Option<ParallelizationOpportunity> {
        let conflicts: Vec<HashSet<&str>> = todos
            .iter()
            .map(|todo| {
                let words = text_words(&todo.content);
                self.config
                    .conflict_keywords
                    .iter()
                    .filter(|kw| words.contains(kw.as_str()))
                    .map(|kw| kw.as_str())
                    .collect()
            })
            .collect();

        let independent =
            |a: usize, b: usize| conflicts[a].intersection(&conflicts[b]).next().is_none();

        let mut processed = vec![false; todos.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for seed in 0..todos.len() {
            if processed[seed] {
                continue;
            }
            processed[seed] = true;
            let mut group = vec![seed];
            for candidate in seed + 1..todos.len() {
                if !processed[candidate] && independent(seed, candidate) {
                    processed[candidate] = true;
                    group.push(candidate);
                }
            }
            groups.push(group);
        }

        let largest = groups.into_iter().max_by_key(|g| g.len())?;
        if largest.len() < 2 {
            return None;
        }

        let todo_ids: Vec<String> = largest.iter().map(|&i| todos[i].id.clone()).collect();
        let mut roles = Vec::new();
        for &i in &largest {
            let role = self.classifier.best_role(&todos[i].content);
            if !roles.contains(&role) {
                roles.push(role);
            }
        }

        let speedup = largest.len() as f64 * 0.8;
        Some(
            ParallelizationOpportunity::new(OpportunityKind::IndependentTasks, todo_ids, roles)
                .with_speedup(speedup)
                .with_confidence(0.9),
        )
    }

    /// Specialized-breakdown detector
    ///
    /// Flags todos whose content or priority suggests multi-faceted work.
    /// When nothing qualifies it still proposes a team from the first few
    /// todos, so an objective is never left without a role roster.
    fn detect_specialized(
        &self,
        todos: &[Todo],
        objective_type: &str,
    ) -> Option<ParallelizationOpportunity> {
        let mut matched: Vec<&Todo> = todos
            .iter()
            .filter(|todo| {
                let words = text_words(&todo.content);
                let keyword_hit = self
                    .config
                    .complexity_keywords
                    .iter()
                    .any(|kw| words.contains(kw.as_str()));
                keyword_hit || todo.priority.at_least_medium()
            })
            .collect();

        if matched.is_empty() {
            matched = todos.iter().take(3).collect();
        }
        if matched.is_empty() {
            return None;
        }

        let mut roles = self.config.roles_for_objective(objective_type);
        let cap = 8usize.min(4.max(matched.len() * 2));
        roles.truncate(cap);

        let speedup = (1.5 + roles.len() as f64 * 0.3).min(3.5);
        let todo_ids = matched.iter().map(|t| t.id.clone()).collect();

        Some(
            ParallelizationOpportunity::new(OpportunityKind::SpecializedBreakdown, todo_ids, roles)
                .with_speedup(speedup)
                .with_confidence(0.85),
        )
    }

    /// Load-distribution detector
    ///
    /// Groups todos by best-fit capability and, for the first tag with at
    /// least 3 members, proposes three identical role entries. Duplication
    /// is intentional here; the first qualifying tag wins even if a later
    /// one is larger.
    fn detect_load_distribution(&self, todos: &[Todo]) -> Option<ParallelizationOpportunity> {
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for todo in todos {
            let tag = self.classifier.classify(&todo.content);
            match groups.iter_mut().find(|(t, _)| *t == tag) {
                Some((_, ids)) => ids.push(todo.id.clone()),
                None => groups.push((tag, vec![todo.id.clone()])),
            }
        }

        let (tag, ids) = groups.into_iter().find(|(_, ids)| ids.len() >= 3)?;
        let role = self.config.role_for_capability(&tag);
        let speedup = (ids.len().min(3)) as f64 * 0.75;

        Some(
            ParallelizationOpportunity::new(
                OpportunityKind::LoadDistribution,
                ids,
                vec![role.clone(), role.clone(), role],
            )
            .with_speedup(speedup)
            .with_confidence(0.85),
        )
    }

    /// Capability-split detector
    ///
    /// Tags each todo with every matching capability (a todo may carry
    /// several) and, when at least two distinct capability groups exist,
    /// proposes one role per capability over the union of grouped todos.
    fn detect_capability_split(&self, todos: &[Todo]) -> Option<ParallelizationOpportunity> {
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for todo in todos {
            for tag in self.classifier.classify_all(&todo.content) {
                match groups.iter_mut().find(|(t, _)| *t == tag) {
                    Some((_, ids)) => ids.push(todo.id.clone()),
                    None => groups.push((tag, vec![todo.id.clone()])),
                }
            }
        }

        if groups.len() < 2 {
            return None;
        }

        let mut todo_ids: Vec<String> = Vec::new();
        for (_, ids) in &groups {
            for id in ids {
                if !todo_ids.contains(id) {
                    todo_ids.push(id.clone());
                }
            }
        }
        let roles: Vec<String> = groups
            .iter()
            .map(|(tag, _)| self.config.role_for_capability(tag))
            .collect();

        Some(
            ParallelizationOpportunity::new(OpportunityKind::CapabilitySplit, todo_ids, roles)
                .with_speedup(1.8)
                .with_confidence(0.75),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::KeywordClassifier;
    use crate::planner::types::Priority;

    fn detector() -> OpportunityDetector {
        let config = HeuristicsConfig::default();
        let classifier = Arc::new(KeywordClassifier::new(config.clone()));
        OpportunityDetector::new(config, classifier)
    }

    fn todo(id: &str, content: &str) -> Todo {
        Todo::new(id, content)
    }

    #[test]
    fn test_empty_todos_yield_nothing() {
        assert!(detector().detect(&[], "widget").is_empty());
    }

    #[test]
    fn test_independent_detector_all_independent() {
        let todos = vec![
            todo("t1", "Create user form"),
            todo("t2", "Add api endpoint"),
            todo("t3", "Update page layout"),
            todo("t4", "Write import logic"),
            todo("t5", "Adjust query filters"),
        ];

        let opps = detector().detect(&todos, "widget");
        let independent = opps
            .iter()
            .find(|o| o.kind == OpportunityKind::IndependentTasks)
            .expect("independent opportunity");

        assert_eq!(independent.todo_ids.len(), 5);
        assert!((independent.estimated_speedup - 4.0).abs() < 1e-9);
        assert!((independent.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_independent_detector_conflicting_pairs() {
        // Every todo mentions "deploy", so no pair is independent
        let todos = vec![
            todo("t1", "Deploy service alpha").with_priority(Priority::Low),
            todo("t2", "Deploy service beta").with_priority(Priority::Low),
            todo("t3", "Deploy service gamma").with_priority(Priority::Low),
        ];

        let opps = detector().detect(&todos, "default");
        assert!(
            !opps
                .iter()
                .any(|o| o.kind == OpportunityKind::IndependentTasks)
        );
    }

    #[test]
    fn test_independent_grouping_is_greedy_not_transitive() {
        // t1 has no conflict keywords, so t2 and t3 both join its group even
        // though they conflict with each other via "deploy". The greedy pass
        // checks candidates against the seed only.
        let todos = vec![
            todo("t1", "Draft rollout summary"),
            todo("t2", "Deploy alpha stack"),
            todo("t3", "Deploy beta stack"),
        ];

        let opps = detector().detect(&todos, "default");
        let independent = opps
            .iter()
            .find(|o| o.kind == OpportunityKind::IndependentTasks)
            .expect("independent opportunity");
        assert_eq!(independent.todo_ids.len(), 3);
    }

    #[test]
    fn test_specialized_detector_keyword_and_priority() {
        let todos = vec![
            todo("t1", "Build the reporting ui"),
            todo("t2", "Lint the scripts").with_priority(Priority::Low),
        ];

        let opps = detector().detect(&todos, "widget");
        let specialized = opps
            .iter()
            .find(|o| o.kind == OpportunityKind::SpecializedBreakdown)
            .expect("specialized opportunity");

        assert_eq!(specialized.todo_ids, vec!["t1".to_string()]);
        // widget roster has 4 roles; cap = min(8, max(4, 1*2)) = 4
        assert_eq!(specialized.suggested_agents.len(), 4);
        assert!((specialized.estimated_speedup - 2.7).abs() < 1e-9);
        assert!((specialized.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_specialized_detector_fallback_takes_first_three() {
        let todos = vec![
            todo("t1", "Tidy folder names").with_priority(Priority::Low),
            todo("t2", "Rename variables").with_priority(Priority::Low),
            todo("t3", "Sort icons").with_priority(Priority::Low),
            todo("t4", "Archive drafts").with_priority(Priority::Low),
        ];

        let opps = detector().detect(&todos, "default");
        let specialized = opps
            .iter()
            .find(|o| o.kind == OpportunityKind::SpecializedBreakdown)
            .expect("specialized opportunity");
        assert_eq!(specialized.todo_ids.len(), 3);
    }

    #[test]
    fn test_load_distribution_triple_role() {
        let todos = vec![
            todo("t1", "Patch api rate limits").with_priority(Priority::Low),
            todo("t2", "Tune database index").with_priority(Priority::Low),
            todo("t3", "Refactor server cache").with_priority(Priority::Low),
            todo("t4", "Harden endpoint auth").with_priority(Priority::Low),
        ];

        let opps = detector().detect(&todos, "default");
        let load = opps
            .iter()
            .find(|o| o.kind == OpportunityKind::LoadDistribution)
            .expect("load opportunity");

        assert_eq!(load.todo_ids.len(), 4);
        assert_eq!(load.suggested_agents.len(), 3);
        assert!(
            load.suggested_agents
                .iter()
                .all(|r| r == "backend_developer")
        );
        assert!((load.estimated_speedup - 2.25).abs() < 1e-9);
    }

    #[test]
    fn test_load_distribution_first_qualifying_tag_wins() {
        // backend reaches 3 members before frontend reaches 4; first wins
        let todos = vec![
            todo("t1", "Fix api pagination"),
            todo("t2", "Add form field"),
            todo("t3", "Tune database pool"),
            todo("t4", "Update page header"),
            todo("t5", "Cache server responses"),
            todo("t6", "Align layout grid"),
            todo("t7", "Polish widget styles"),
            todo("t8", "Restyle portal footer"),
        ];

        let opps = detector().detect(&todos, "default");
        let load = opps
            .iter()
            .find(|o| o.kind == OpportunityKind::LoadDistribution)
            .expect("load opportunity");
        assert_eq!(load.suggested_agents[0], "backend_developer");
        assert_eq!(load.todo_ids.len(), 3);
    }

    #[test]
    fn test_capability_split() {
        let todos = vec![
            todo("t1", "Test the sync connector"),
            todo("t2", "Style the portal page"),
        ];

        let opps = detector().detect(&todos, "default");
        let split = opps
            .iter()
            .find(|o| o.kind == OpportunityKind::CapabilitySplit)
            .expect("split opportunity");

        // t1 carries both integration and testing tags, t2 frontend
        assert!(split.suggested_agents.len() >= 2);
        assert_eq!(split.todo_ids.len(), 2);
        assert!((split.estimated_speedup - 1.8).abs() < 1e-9);
        assert!((split.confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_capability_split_requires_two_groups() {
        let todos = vec![
            todo("t1", "Fix api auth"),
            todo("t2", "Patch api headers"),
        ];

        let opps = detector().detect(&todos, "default");
        assert!(
            !opps
                .iter()
                .any(|o| o.kind == OpportunityKind::CapabilitySplit)
        );
    }

    #[test]
    fn test_detection_is_deterministic() {
        let todos = vec![
            todo("t1", "Build user form"),
            todo("t2", "Add api endpoint"),
            todo("t3", "Test import flow"),
            todo("t4", "Sync remote data"),
        ];
        let d = detector();

        let first = d.detect(&todos, "integration");
        let second = d.detect(&todos, "integration");

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.todo_ids, b.todo_ids);
            assert_eq!(a.suggested_agents, b.suggested_agents);
            assert_eq!(a.estimated_speedup, b.estimated_speedup);
            assert_eq!(a.confidence, b.confidence);
        }
    }
}
