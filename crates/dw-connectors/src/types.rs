//! Types shared by the external-API connectors.

use dw_ontology::Ingredient;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How well an external result matches the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Canonical name is a near match to the query
    High,
    /// A result exists but the match is loose
    Medium,
    /// No result, or the lookup failed
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// Result of fetching an ingredient from an external API.
#[derive(Debug, Clone)]
pub struct EnrichmentResult {
    pub ingredient: Option<Ingredient>,
    pub confidence: Confidence,
    /// "usda_fdc" | "open_food_facts" | "none"
    pub source: String,
    /// Short summary of the raw response, for logging only
    pub summary: String,
}

impl EnrichmentResult {
    pub fn miss(source: &str, summary: impl Into<String>) -> Self {
        Self {
            ingredient: None,
            confidence: Confidence::Low,
            source: source.to_string(),
            summary: summary.into(),
        }
    }

    pub fn hit(ingredient: Ingredient, confidence: Confidence, source: &str, summary: impl Into<String>) -> Self {
        Self {
            ingredient: Some(ingredient),
            confidence,
            source: source.to_string(),
            summary: summary.into(),
        }
    }
}

/// A source of external ingredient data.
///
/// Implemented by the live HTTP connectors, by the combined fetcher, and
/// by mock sources in tests. Lookups are blocking; the fetcher is the only
/// suspension point in the evaluation pipeline.
pub trait FoodDataSource: Send + Sync {
    /// Short source name for logging ("usda_fdc", "open_food_facts").
    fn name(&self) -> &str;

    /// Look up one normalized ingredient query.
    fn lookup(&self, query: &str) -> EnrichmentResult;
}
