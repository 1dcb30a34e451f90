//! Heuristic configuration tables
//!
//! The planning algorithm itself is domain-agnostic; everything that smells
//! like vocabulary (conflict keywords, capability keywords, role rosters,
//! specialization labels) lives here so callers can swap in their own tables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::planner::types::OpportunityKind;

/// A capability with the keywords that imply it and the role that serves it.
///
/// Rules are ordered: the first rule with a keyword hit wins when a single
/// capability is requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityRule {
    /// Capability tag (e.g. "frontend_development")
    pub capability: String,
    /// Role tag best suited to this capability (e.g. "frontend_developer")
    pub role: String,
    /// Keywords whose presence implies this capability
    pub keywords: Vec<String>,
}

/// Specialization label for a (opportunity kind, role) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecializationRule {
    pub kind: OpportunityKind,
    pub role: String,
    pub specialization: String,
}

/// Swappable heuristic tables for the planning engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicsConfig {
    /// Keywords that make two todos conflict when both mention one
    pub conflict_keywords: Vec<String>,
    /// Keywords suggesting multi-faceted work worth a specialized breakdown
    pub complexity_keywords: Vec<String>,
    /// Ordered capability rules (first keyword hit wins)
    pub capabilities: Vec<CapabilityRule>,
    /// Capability tag used when no rule matches
    pub default_capability: String,
    /// Role tag used when no rule matches
    pub default_role: String,
    /// Objective type -> ordered role roster
    pub objective_roles: HashMap<String, Vec<String>>,
    /// Role -> capability tags carried by a workload of that role
    pub role_capabilities: HashMap<String, Vec<String>>,
    /// Specialization lookups for (opportunity kind, role) pairs
    pub specializations: Vec<SpecializationRule>,
    /// Specialization used when no rule matches
    pub default_specialization: String,
    /// Upper bound applied to a plan's max_parallelism
    pub max_parallelism_cap: usize,
    /// Team size bound used when the caller does not pass one
    pub default_max_agents: usize,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        let spec = |kind: OpportunityKind, role: &str, specialization: &str| SpecializationRule {
            kind,
            role: role.to_string(),
            specialization: specialization.to_string(),
        };

        Self {
            conflict_keywords: string_vec(&[
                "deploy",
                "test",
                "validate",
                "configure",
                "migrate",
                "release",
            ]),
            complexity_keywords: string_vec(&[
                "build",
                "develop",
                "implement",
                "integrate",
                "ui",
                "and",
                "with",
            ]),
            capabilities: vec![
                CapabilityRule {
                    capability: "frontend_development".to_string(),
                    role: "frontend_developer".to_string(),
                    keywords: string_vec(&[
                        "ui", "widget", "page", "form", "portal", "display", "frontend", "layout",
                    ]),
                },
                CapabilityRule {
                    capability: "backend_development".to_string(),
                    role: "backend_developer".to_string(),
                    keywords: string_vec(&[
                        "api", "server", "database", "script", "backend", "endpoint", "query",
                    ]),
                },
                CapabilityRule {
                    capability: "integration".to_string(),
                    role: "integration_specialist".to_string(),
                    keywords: string_vec(&[
                        "integrate",
                        "integration",
                        "connect",
                        "sync",
                        "import",
                        "export",
                        "webhook",
                    ]),
                },
                CapabilityRule {
                    capability: "testing".to_string(),
                    role: "qa_engineer".to_string(),
                    keywords: string_vec(&["test", "validate", "verify", "qa", "coverage"]),
                },
                CapabilityRule {
                    capability: "configuration".to_string(),
                    role: "devops_engineer".to_string(),
                    keywords: string_vec(&[
                        "configure",
                        "deploy",
                        "setup",
                        "install",
                        "pipeline",
                        "environment",
                    ]),
                },
            ],
            default_capability: "general_development".to_string(),
            default_role: "fullstack_developer".to_string(),
            objective_roles: HashMap::from([
                (
                    "widget".to_string(),
                    string_vec(&[
                        "frontend_developer",
                        "backend_developer",
                        "ui_designer",
                        "integration_specialist",
                    ]),
                ),
                (
                    "integration".to_string(),
                    string_vec(&[
                        "integration_specialist",
                        "backend_developer",
                        "qa_engineer",
                        "devops_engineer",
                    ]),
                ),
                (
                    "migration".to_string(),
                    string_vec(&[
                        "backend_developer",
                        "devops_engineer",
                        "qa_engineer",
                        "integration_specialist",
                    ]),
                ),
                (
                    "default".to_string(),
                    string_vec(&[
                        "fullstack_developer",
                        "backend_developer",
                        "frontend_developer",
                        "qa_engineer",
                    ]),
                ),
            ]),
            role_capabilities: HashMap::from([
                (
                    "frontend_developer".to_string(),
                    string_vec(&["frontend_development", "ui_design"]),
                ),
                (
                    "backend_developer".to_string(),
                    string_vec(&["backend_development", "api_design"]),
                ),
                (
                    "ui_designer".to_string(),
                    string_vec(&["ui_design", "frontend_development"]),
                ),
                (
                    "integration_specialist".to_string(),
                    string_vec(&["integration", "backend_development"]),
                ),
                (
                    "qa_engineer".to_string(),
                    string_vec(&["testing", "validation"]),
                ),
                (
                    "devops_engineer".to_string(),
                    string_vec(&["configuration", "deployment"]),
                ),
                (
                    "fullstack_developer".to_string(),
                    string_vec(&["frontend_development", "backend_development"]),
                ),
            ]),
            specializations: vec![
                spec(
                    OpportunityKind::SpecializedBreakdown,
                    "frontend_developer",
                    "component_architecture",
                ),
                spec(
                    OpportunityKind::SpecializedBreakdown,
                    "backend_developer",
                    "service_orchestration",
                ),
                spec(
                    OpportunityKind::SpecializedBreakdown,
                    "ui_designer",
                    "interaction_design",
                ),
                spec(
                    OpportunityKind::SpecializedBreakdown,
                    "integration_specialist",
                    "data_mapping",
                ),
                spec(
                    OpportunityKind::IndependentTasks,
                    "fullstack_developer",
                    "rapid_delivery",
                ),
                spec(
                    OpportunityKind::LoadDistribution,
                    "backend_developer",
                    "throughput_scaling",
                ),
                spec(
                    OpportunityKind::LoadDistribution,
                    "devops_engineer",
                    "rollout_batching",
                ),
                spec(
                    OpportunityKind::CapabilitySplit,
                    "qa_engineer",
                    "regression_coverage",
                ),
            ],
            default_specialization: "general_specialist".to_string(),
            max_parallelism_cap: 5,
            default_max_agents: 8,
        }
    }
}

impl HeuristicsConfig {
    /// Role roster for an objective type, falling back to the `default` entry
    pub fn roles_for_objective(&self, objective_type: &str) -> Vec<String> {
        self.objective_roles
            .get(objective_type)
            .or_else(|| self.objective_roles.get("default"))
            .cloned()
            .unwrap_or_else(|| vec![self.default_role.clone()])
    }

    /// Role serving a capability tag, falling back to the default role
    pub fn role_for_capability(&self, capability: &str) -> String {
        self.capabilities
            .iter()
            .find(|rule| rule.capability == capability)
            .map(|rule| rule.role.clone())
            .unwrap_or_else(|| self.default_role.clone())
    }

    /// Capability tags carried by a role, falling back to the default tag
    pub fn capabilities_for_role(&self, role: &str) -> Vec<String> {
        self.role_capabilities
            .get(role)
            .cloned()
            .unwrap_or_else(|| vec![self.default_capability.clone()])
    }

    /// Specialization for a (kind, role) pair, falling back to the default
    pub fn specialization_for(&self, kind: OpportunityKind, role: &str) -> String {
        self.specializations
            .iter()
            .find(|rule| rule.kind == kind && rule.role == role)
            .map(|rule| rule.specialization.clone())
            .unwrap_or_else(|| self.default_specialization.clone())
    }
}

fn string_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
