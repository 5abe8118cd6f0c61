//! Employee routing engine
//!
//! Scores employee profiles against a question and picks the best match.
//! Scoring is deterministic and totally ordered; ties resolve to the earliest
//! profile in the input order (stable sort).

use deck_foundation::types::{CapabilityLevel, Employee, EmployeeStatus};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Fixed mapping from role names to domain keywords
///
/// A role keyword found in the question or context adds 1 to the profile's
/// score.
const ROLE_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "technical-expert",
        &[
            "code",
            "programming",
            "development",
            "architecture",
            "technical",
            "algorithm",
            "bug",
            "performance",
        ],
    ),
    (
        "business-consultant",
        &[
            "business",
            "sales",
            "market",
            "strategy",
            "customer",
            "marketing",
        ],
    ),
    (
        "creative-designer",
        &["design", "creative", "visual", "ui", "ux", "brand"],
    ),
    (
        "data-analyst",
        &[
            "data",
            "analysis",
            "statistics",
            "report",
            "metric",
            "insight",
        ],
    ),
    (
        "project-manager",
        &[
            "project",
            "management",
            "coordination",
            "plan",
            "schedule",
            "team",
        ],
    ),
];

/// Picks the best backend employee for a question
pub struct EmployeeRouter {
    employees: Vec<Employee>,
}

impl EmployeeRouter {
    pub fn new(employees: Vec<Employee>) -> Self {
        Self { employees }
    }

    pub fn empty() -> Self {
        Self {
            employees: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Select the best-matching employee
    ///
    /// Inactive and busy profiles score 0 and never win the ranking. When no
    /// profile scores above 0 the first profile of the input order is
    /// returned regardless of status, so a caller always gets a candidate
    /// unless the set is empty.
    pub fn select_best(
        &self,
        question: &str,
        context: Option<&str>,
        capabilities: Option<&[String]>,
    ) -> Option<&Employee> {
        if self.employees.is_empty() {
            return None;
        }

        let question_lower = question.to_lowercase();
        let context_lower = context.map(|c| c.to_lowercase()).unwrap_or_default();

        let mut scored: Vec<(&Employee, f64)> = self
            .employees
            .iter()
            .map(|employee| {
                (
                    employee,
                    score_employee(employee, &question_lower, &context_lower, capabilities),
                )
            })
            .collect();

        // Stable sort keeps input order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let (best, score) = scored[0];
        if score > 0.0 {
            Some(best)
        } else {
            Some(&self.employees[0])
        }
    }

    /// All profiles currently marked active
    pub fn available_employees(&self) -> Vec<&Employee> {
        self.employees
            .iter()
            .filter(|e| e.status == EmployeeStatus::Active)
            .collect()
    }

    /// Group profiles by expertise keyword
    pub fn group_by_expertise(&self) -> HashMap<&str, Vec<&Employee>> {
        let mut groups: HashMap<&str, Vec<&Employee>> = HashMap::new();
        for employee in &self.employees {
            for expertise in &employee.expertise {
                groups.entry(expertise.as_str()).or_default().push(employee);
            }
        }
        groups
    }
}

/// Compute the fit score for one profile
fn score_employee(
    employee: &Employee,
    question_lower: &str,
    context_lower: &str,
    required_capabilities: Option<&[String]>,
) -> f64 {
    if employee.status != EmployeeStatus::Active {
        return 0.0;
    }

    // Base score for any active profile
    let mut score = 1.0;

    // Expertise keyword found in question or context
    for expertise in &employee.expertise {
        let expertise_lower = expertise.to_lowercase();
        if question_lower.contains(&expertise_lower) || context_lower.contains(&expertise_lower) {
            score += 2.0;
        }
    }

    // Requested capability tags present in the profile
    if let Some(required) = required_capabilities {
        let offered: Vec<&str> = employee
            .capabilities
            .iter()
            .map(|c| c.capability_type.as_str())
            .collect();
        let matched = required
            .iter()
            .filter(|tag| offered.contains(&tag.as_str()))
            .count();
        score += matched as f64 * 1.5;
    }

    // Proficiency bonus across all capabilities
    for capability in &employee.capabilities {
        score += match capability.level {
            CapabilityLevel::Expert => 1.0,
            CapabilityLevel::Senior => 0.5,
            CapabilityLevel::Junior => 0.0,
        };
    }

    // Role-associated keywords
    if let Some((_, keywords)) = ROLE_KEYWORDS
        .iter()
        .find(|(role, _)| *role == employee.role)
    {
        for keyword in *keywords {
            if question_lower.contains(keyword) || context_lower.contains(keyword) {
                score += 1.0;
            }
        }
    }

    score
}
