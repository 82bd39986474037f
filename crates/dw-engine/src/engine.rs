//! Deterministic compliance engine. Single pipeline for scan and chat.
//!
//! Resolve each atom (static -> dynamic -> external API), evaluate every
//! selected restriction against every resolved ingredient, and aggregate
//! a verdict with a confidence score. Unknown non-trace ingredients make
//! the verdict UNCERTAIN; trace ingredients are informational.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use dw_connectors::{FetcherConfig, IngredientFetcher};
use dw_foundation::Settings;
use dw_ontology::{DynamicOntology, Ingredient, IngredientRegistry, UnknownIngredientsLog};
use dw_rules::{RestrictionRegistry, RuleOutcome};

use crate::confidence::{compute_confidence, ResolutionLevel};
use crate::error::Result;
use crate::resolver::{IngredientResolver, ResolutionSource};
use crate::verdict::{ComplianceVerdict, VerdictStatus};

/// Optional evaluation inputs.
#[derive(Debug, Clone)]
pub struct EvaluateOptions {
    /// Restrict the selected restrictions to ones scoped to this region
    pub region_scope: Option<String>,
    /// Normalized keys of trace (<2 %) atoms
    pub trace_keys: HashSet<String>,
    /// Whether unresolved atoms may hit the external APIs
    pub use_api_fallback: bool,
    /// Context recorded with unknown-ingredient log entries
    pub profile_context: Option<HashMap<String, serde_json::Value>>,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            region_scope: None,
            trace_keys: HashSet::new(),
            use_api_fallback: true,
            profile_context: None,
        }
    }
}

/// Pipeline: resolve -> evaluate restrictions -> aggregate verdict.
pub struct ComplianceEngine {
    resolver: IngredientResolver,
    restrictions: RestrictionRegistry,
}

impl ComplianceEngine {
    pub fn new(resolver: IngredientResolver, restrictions: RestrictionRegistry) -> Self {
        Self {
            resolver,
            restrictions,
        }
    }

    /// Build the full production engine from settings: merged registry,
    /// disk-backed stores, live external fetcher.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let registry = Arc::new(IngredientRegistry::load(
            &settings.ontology_path(),
            Some(settings.dynamic_ontology_path().as_path()),
        )?);
        let dynamic = DynamicOntology::load(&settings.dynamic_ontology_path())?;
        let unknown_log = UnknownIngredientsLog::load(&settings.unknown_log_path());
        let fetcher = Arc::new(IngredientFetcher::new(FetcherConfig::default()));
        let resolver = IngredientResolver::new(registry)
            .with_dynamic_store(dynamic)
            .with_unknown_log(unknown_log)
            .with_fetcher(fetcher);
        let restrictions = RestrictionRegistry::load(&settings.restrictions_path())?;
        Ok(Self::new(resolver, restrictions))
    }

    /// Engine over explicit data files, without an external fetcher.
    pub fn from_files(ontology: &Path, restrictions: &Path) -> Result<Self> {
        let registry = Arc::new(IngredientRegistry::load(ontology, None)?);
        let resolver = IngredientResolver::new(registry);
        let restrictions = RestrictionRegistry::load(restrictions)?;
        Ok(Self::new(resolver, restrictions))
    }

    pub fn resolver(&self) -> &IngredientResolver {
        &self.resolver
    }

    pub fn restrictions(&self) -> &RestrictionRegistry {
        &self.restrictions
    }

    /// Evaluate ingredient strings against the selected restrictions.
    ///
    /// `restriction_ids` of None selects every loaded restriction; ids
    /// without a loaded restriction are skipped. An empty ingredient list
    /// or an empty restriction registry yields UNCERTAIN with confidence
    /// zero.
    pub fn evaluate(
        &self,
        ingredient_strings: &[String],
        restriction_ids: Option<&[String]>,
        options: &EvaluateOptions,
    ) -> ComplianceVerdict {
        let version = self.resolver.ontology_version().to_string();
        if ingredient_strings.is_empty() || self.restrictions.is_empty() {
            return ComplianceVerdict::uncertain(version);
        }

        let selected_ids = self.select_restrictions(restriction_ids, options.region_scope.as_deref());
        let rids_for_log: Vec<String> = selected_ids.iter().take(10).cloned().collect();

        // Parallel arrays over the resolved subset; levels cover every
        // processed input atom.
        let mut resolved: Vec<Arc<Ingredient>> = Vec::new();
        let mut resolved_is_trace: Vec<bool> = Vec::new();
        let mut levels: Vec<ResolutionLevel> = Vec::new();
        let mut uncertain_raw: Vec<String> = Vec::new();
        let mut informational_raw: Vec<String> = Vec::new();

        for raw in ingredient_strings {
            let key = raw.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            let is_trace = options.trace_keys.contains(&key);

            let resolution = self.resolver.resolve_with_fallback(
                raw,
                options.use_api_fallback,
                !is_trace,
                &rids_for_log,
                options.profile_context.as_ref(),
            );

            match resolution.ingredient {
                Some(ingredient) => {
                    resolved.push(ingredient);
                    resolved_is_trace.push(is_trace);
                    levels.push(resolution.level);
                    if is_trace {
                        informational_raw.push(raw.clone());
                    }
                }
                None if is_trace => {
                    // Trace-only miss: informational, not uncertain, and
                    // it does not reduce confidence.
                    info!(raw = %raw, key = %key, "trace ingredient not in ontology; informational");
                    informational_raw.push(raw.clone());
                    levels.push(ResolutionLevel::High);
                }
                None => {
                    uncertain_raw.push(raw.clone());
                    levels.push(if resolution.source == ResolutionSource::ApiFailed {
                        ResolutionLevel::ApiFailed
                    } else {
                        ResolutionLevel::Low
                    });
                    info!(
                        raw = %raw,
                        key = %key,
                        source = ?resolution.source,
                        "unresolved ingredient"
                    );
                }
            }
        }

        if !informational_raw.is_empty() {
            info!(
                count = informational_raw.len(),
                items = ?informational_raw,
                "trace ingredients informational only"
            );
        }
        if !uncertain_raw.is_empty() {
            info!(
                count = uncertain_raw.len(),
                items = ?uncertain_raw,
                restriction_ids = ?rids_for_log,
                "unknown ingredients"
            );
        }

        let mut triggered_restrictions: Vec<String> = Vec::new();
        let mut triggered_ingredients: Vec<String> = Vec::new();
        let mut trace_triggered_restrictions: HashSet<String> = HashSet::new();
        let mut warning_count = 0usize;

        for restriction_id in &selected_ids {
            let Some(restriction) = self.restrictions.get(restriction_id) else {
                continue;
            };
            for (idx, ingredient) in resolved.iter().enumerate() {
                match self.restrictions.evaluate(ingredient, restriction) {
                    RuleOutcome::Fail { reason } => {
                        info!(
                            restriction = %restriction_id,
                            ingredient = %ingredient.canonical_name,
                            reason = %reason,
                            "restriction failed"
                        );
                        triggered_restrictions.push(restriction_id.clone());
                        triggered_ingredients.push(ingredient.canonical_name.clone());
                        if resolved_is_trace[idx] {
                            trace_triggered_restrictions.insert(restriction_id.clone());
                        }
                    }
                    RuleOutcome::Warn { .. } => warning_count += 1,
                    RuleOutcome::Pass => {}
                }
            }
        }

        dedupe_in_place(&mut triggered_restrictions);
        dedupe_in_place(&mut triggered_ingredients);

        let status = if !triggered_restrictions.is_empty() {
            VerdictStatus::NotSafe
        } else if !uncertain_raw.is_empty() {
            VerdictStatus::Uncertain
        } else {
            VerdictStatus::Safe
        };

        let triggered_only_by_trace = !triggered_restrictions.is_empty()
            && triggered_restrictions
                .iter()
                .all(|r| trace_triggered_restrictions.contains(r));

        let confidence = compute_confidence(
            &levels,
            uncertain_raw.len(),
            warning_count,
            triggered_only_by_trace,
            !informational_raw.is_empty(),
            status,
        );

        ComplianceVerdict {
            status,
            triggered_restrictions,
            triggered_ingredients,
            uncertain_ingredients: uncertain_raw,
            informational_ingredients: informational_raw,
            confidence_score: confidence,
            ontology_version: version,
        }
    }

    fn select_restrictions(
        &self,
        restriction_ids: Option<&[String]>,
        region_scope: Option<&str>,
    ) -> Vec<String> {
        let mut ids: Vec<String> = match restriction_ids {
            Some(requested) => requested
                .iter()
                .filter(|rid| self.restrictions.get(rid).is_some())
                .cloned()
                .collect(),
            None => self.restrictions.list_ids(),
        };
        if let Some(region) = region_scope {
            ids.retain(|rid| {
                self.restrictions
                    .get(rid)
                    .map(|r| r.region_scope.iter().any(|s| s == region))
                    .unwrap_or(false)
            });
        }
        ids
    }
}

fn dedupe_in_place(items: &mut Vec<String>) {
    let mut seen: HashSet<String> = HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}
