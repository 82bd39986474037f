//! Rule DSL for restrictions.
//!
//! A restriction is a named, ordered list of predicates of the form
//! `(field, operator, value, action)`. Rules are authored in JSON and
//! never require recompilation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Action taken when a rule's predicate matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleAction {
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "WARN")]
    Warn,
}

impl Default for RuleAction {
    fn default() -> Self {
        RuleAction::Fail
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleAction::Fail => write!(f, "FAIL"),
            RuleAction::Warn => write!(f, "WARN"),
        }
    }
}

/// Predicate operator over one ingredient field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    InList,
}

impl fmt::Display for RuleOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleOperator::Equals => write!(f, "equals"),
            RuleOperator::NotEquals => write!(f, "not_equals"),
            RuleOperator::Contains => write!(f, "contains"),
            RuleOperator::GreaterThan => write!(f, "greater_than"),
            RuleOperator::InList => write!(f, "in_list"),
        }
    }
}

/// Restriction grouping for reporting and profile mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestrictionCategory {
    Allergy,
    Religious,
    Medical,
    Lifestyle,
}

impl Default for RestrictionCategory {
    fn default() -> Self {
        RestrictionCategory::Lifestyle
    }
}

/// How strictly a restriction applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Strict,
    Moderate,
    Conditional,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Strict
    }
}

/// Single predicate: if `(field op value)` then `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub field: String,
    pub operator: RuleOperator,
    pub value: serde_json::Value,
    #[serde(default)]
    pub action: RuleAction,
}

/// A named dietary restriction with its ordered rule list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restriction {
    pub id: String,
    #[serde(default)]
    pub category: RestrictionCategory,
    #[serde(default = "default_region_scope")]
    pub region_scope: Vec<String>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

fn default_region_scope() -> Vec<String> {
    vec!["GLOBAL".to_string()]
}
