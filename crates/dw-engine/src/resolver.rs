//! Tiered ingredient resolution: static ontology, dynamic ontology, then
//! external food databases.
//!
//! Per-ingredient state machine: a registry hit resolves as STATIC or
//! DYNAMIC; an invalid input is REJECTED before any network call; an
//! external hit is API_PROMOTED (high confidence, persisted) or API_USED
//! (medium, request-scoped); a failed lookup is API_FAILED. Unresolved
//! non-trace inputs are recorded in the unknown-ingredient log.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use tracing::{info, warn};

use dw_connectors::{Confidence, FoodDataSource};
use dw_intent::canonical_diet;
use dw_ontology::{DynamicOntology, Ingredient, IngredientRegistry, UnknownIngredientsLog};
use dw_parser::normalize_ingredient_key;

use crate::confidence::ResolutionLevel;

/// Where a resolution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Static ontology hit
    Static,
    /// Dynamic (enrichment-grown) ontology hit
    Dynamic,
    /// External API result
    Api,
    /// All external lookups failed
    ApiFailed,
    /// Input failed the sanity check (looks like a sentence)
    Rejected,
    /// Unresolved without an API attempt
    NotFound,
}

/// Outcome of one resolution attempt.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub ingredient: Option<Arc<Ingredient>>,
    pub source: ResolutionSource,
    pub level: ResolutionLevel,
}

impl Resolution {
    fn miss(source: ResolutionSource, level: ResolutionLevel) -> Self {
        Self {
            ingredient: None,
            source,
            level,
        }
    }
}

/// Words that mark a lookup string as a sentence rather than an
/// ingredient ("can jain eat onion" must not reach the external APIs).
const SENTENCE_VERBS: &[&str] = &[
    "can", "could", "should", "would", "eat", "eats", "drink", "consume", "is", "are", "does",
    "do", "allow", "allows", "allowed", "permit", "permitted", "have",
];

/// Reject strings longer than 5 words, or containing both a sentence verb
/// and a diet word.
pub fn is_valid_lookup_input(normalized_key: &str) -> bool {
    let words: Vec<&str> = normalized_key.split_whitespace().collect();
    if words.len() > 5 {
        return false;
    }
    let has_verb = words.iter().any(|w| SENTENCE_VERBS.contains(w));
    let has_diet = words.iter().any(|w| canonical_diet(w).is_some());
    !(has_verb && has_diet)
}

/// Tiered resolver over the merged registry, with optional external
/// fallback, unknown logging, and high-confidence promotion.
pub struct IngredientResolver {
    registry: Arc<IngredientRegistry>,
    /// Ids known to come from the dynamic layer (loaded or promoted)
    dynamic_ids: RwLock<HashSet<String>>,
    dynamic_store: Option<Mutex<DynamicOntology>>,
    unknown_log: Option<Mutex<UnknownIngredientsLog>>,
    fetcher: Option<Arc<dyn FoodDataSource>>,
}

impl IngredientResolver {
    /// Resolver over a registry alone: no API fallback, no persistence.
    pub fn new(registry: Arc<IngredientRegistry>) -> Self {
        Self {
            registry,
            dynamic_ids: RwLock::new(HashSet::new()),
            dynamic_store: None,
            unknown_log: None,
            fetcher: None,
        }
    }

    /// Attach the dynamic-ontology store. Ids already present are counted
    /// as dynamic-layer resolutions.
    pub fn with_dynamic_store(mut self, store: DynamicOntology) -> Self {
        {
            let mut ids = self.dynamic_ids.write().expect("resolver lock poisoned");
            for ing in store.ingredients() {
                ids.insert(ing.id);
            }
        }
        self.dynamic_store = Some(Mutex::new(store));
        self
    }

    /// Attach the unknown-ingredient log.
    pub fn with_unknown_log(mut self, log: UnknownIngredientsLog) -> Self {
        self.unknown_log = Some(Mutex::new(log));
        self
    }

    /// Attach the external fetcher (or a mock source in tests).
    pub fn with_fetcher(mut self, fetcher: Arc<dyn FoodDataSource>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn registry(&self) -> &IngredientRegistry {
        &self.registry
    }

    /// Ontology version surfaced in verdicts.
    pub fn ontology_version(&self) -> &str {
        self.registry.version()
    }

    /// Exact-index resolution; None means the caller treats the item as
    /// UNCERTAIN.
    pub fn resolve(&self, raw: &str) -> Option<Arc<Ingredient>> {
        self.registry.resolve(raw)
    }

    /// Resolution with external fallback.
    ///
    /// On a registry miss: validate the input, log the unknown, then call
    /// the fetcher. A high-confidence result is promoted (in-memory index
    /// plus dynamic-ontology append); a medium result serves this request
    /// only; a failure resolves as API_FAILED, never as SAFE.
    pub fn resolve_with_fallback(
        &self,
        raw: &str,
        try_api: bool,
        log_unknown: bool,
        restriction_ids: &[String],
        profile_context: Option<&HashMap<String, serde_json::Value>>,
    ) -> Resolution {
        if let Some(ingredient) = self.registry.resolve(raw) {
            let source = if self
                .dynamic_ids
                .read()
                .expect("resolver lock poisoned")
                .contains(&ingredient.id)
            {
                ResolutionSource::Dynamic
            } else {
                ResolutionSource::Static
            };
            return Resolution {
                ingredient: Some(ingredient),
                source,
                level: ResolutionLevel::High,
            };
        }

        let key = normalize_ingredient_key(raw);
        if key.is_empty() {
            return Resolution::miss(ResolutionSource::NotFound, ResolutionLevel::Low);
        }
        if !is_valid_lookup_input(&key) {
            info!(raw = raw, key = %key, "lookup input rejected as sentence-like");
            return Resolution::miss(ResolutionSource::Rejected, ResolutionLevel::Low);
        }

        if log_unknown {
            self.log_unknown(raw, &key, restriction_ids, profile_context);
        }

        let Some(fetcher) = self.fetcher.as_ref().filter(|_| try_api) else {
            return Resolution::miss(ResolutionSource::NotFound, ResolutionLevel::Low);
        };

        let result = fetcher.lookup(&key);
        match (result.ingredient, result.confidence) {
            (Some(ingredient), Confidence::High) => {
                self.promote(ingredient.clone(), &result.source);
                Resolution {
                    ingredient: Some(Arc::new(ingredient)),
                    source: ResolutionSource::Api,
                    level: ResolutionLevel::High,
                }
            }
            (Some(ingredient), Confidence::Medium) => Resolution {
                ingredient: Some(Arc::new(ingredient)),
                source: ResolutionSource::Api,
                level: ResolutionLevel::Medium,
            },
            _ => {
                info!(raw = raw, key = %key, "all external lookups failed");
                Resolution::miss(ResolutionSource::ApiFailed, ResolutionLevel::ApiFailed)
            }
        }
    }

    /// In-memory insert plus best-effort dynamic-ontology append. A disk
    /// failure still serves the ingredient for the current request; the
    /// next enrichment run retries the persist.
    fn promote(&self, ingredient: Ingredient, source: &str) {
        self.registry.add_ingredient(ingredient.clone());
        self.dynamic_ids
            .write()
            .expect("resolver lock poisoned")
            .insert(ingredient.id.clone());
        if let Some(store) = &self.dynamic_store {
            let mut store = store.lock().expect("resolver lock poisoned");
            if let Err(e) = store.append(ingredient.clone(), source, "high") {
                warn!(id = %ingredient.id, error = %e, "dynamic ontology append failed");
            }
        }
    }

    fn log_unknown(
        &self,
        raw: &str,
        key: &str,
        restriction_ids: &[String],
        profile_context: Option<&HashMap<String, serde_json::Value>>,
    ) {
        if let Some(log) = &self.unknown_log {
            let mut log = log.lock().expect("resolver lock poisoned");
            if let Err(e) = log.record(raw, key, restriction_ids, profile_context) {
                warn!(key = key, error = %e, "unknown-ingredient log write failed");
            }
        }
    }
}
