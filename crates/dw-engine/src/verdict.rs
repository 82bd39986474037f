//! Structured compliance verdict. Single format for scan and chat.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal verdict status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictStatus {
    Safe,
    NotSafe,
    Uncertain,
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictStatus::Safe => write!(f, "SAFE"),
            VerdictStatus::NotSafe => write!(f, "NOT_SAFE"),
            VerdictStatus::Uncertain => write!(f, "UNCERTAIN"),
        }
    }
}

/// The engine's verdict for one evaluation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceVerdict {
    pub status: VerdictStatus,
    /// Restriction ids that failed, first-trigger order, deduplicated
    #[serde(default)]
    pub triggered_restrictions: Vec<String>,
    /// Canonical names of offending ingredients, discovery order
    #[serde(default)]
    pub triggered_ingredients: Vec<String>,
    /// Non-trace inputs no resolver could match
    #[serde(default)]
    pub uncertain_ingredients: Vec<String>,
    /// Trace (<2 %) items; informational, do not reduce confidence
    #[serde(default)]
    pub informational_ingredients: Vec<String>,
    pub confidence_score: f64,
    pub ontology_version: String,
}

impl ComplianceVerdict {
    /// Verdict for an empty or unevaluable request.
    pub fn uncertain(ontology_version: impl Into<String>) -> Self {
        Self {
            status: VerdictStatus::Uncertain,
            triggered_restrictions: Vec::new(),
            triggered_ingredients: Vec::new(),
            uncertain_ingredients: Vec::new(),
            informational_ingredients: Vec::new(),
            confidence_score: 0.0,
            ontology_version: ontology_version.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&VerdictStatus::NotSafe).unwrap(),
            r#""NOT_SAFE""#
        );
        let status: VerdictStatus = serde_json::from_str(r#""SAFE""#).unwrap();
        assert_eq!(status, VerdictStatus::Safe);
    }

    #[test]
    fn test_uncertain_constructor() {
        let verdict = ComplianceVerdict::uncertain("1.0");
        assert_eq!(verdict.status, VerdictStatus::Uncertain);
        assert_eq!(verdict.confidence_score, 0.0);
        assert_eq!(verdict.ontology_version, "1.0");
    }
}
