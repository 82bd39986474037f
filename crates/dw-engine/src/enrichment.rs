//! Offline enrichment: promote logged unknown ingredients into the
//! dynamic ontology.
//!
//! The enrichment job is the only writer to the dynamic-ontology file
//! outside live high-confidence promotions. Only high-confidence results
//! are persisted; everything else stays in the log for the next run.

use tracing::info;

use dw_connectors::{Confidence, FoodDataSource};
use dw_ontology::{DynamicOntology, UnknownIngredientsLog};

use crate::error::Result;

/// Outcome of one enrichment run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnrichmentStats {
    /// Keys meeting the frequency threshold
    pub examined: usize,
    /// High-confidence results added (or that would be added in dry-run)
    pub added: usize,
    /// Keys with no high-confidence result
    pub skipped: usize,
}

/// Fetch every unknown key seen at least `min_frequency` times and append
/// high-confidence results to the dynamic ontology. `dry_run` reports
/// what would be added without writing.
pub fn run_enrichment(
    log: &UnknownIngredientsLog,
    dynamic: &mut DynamicOntology,
    source: &dyn FoodDataSource,
    min_frequency: u64,
    dry_run: bool,
) -> Result<EnrichmentStats> {
    let keys = log.keys_for_enrichment(min_frequency);
    let mut stats = EnrichmentStats {
        examined: keys.len(),
        ..Default::default()
    };
    if keys.is_empty() {
        info!("no unknown ingredients to enrich");
        return Ok(stats);
    }
    info!(
        count = keys.len(),
        min_frequency = min_frequency,
        "enriching unknown ingredient keys"
    );

    for normalized_key in keys {
        let result = source.lookup(&normalized_key);
        let Some(ingredient) = result.ingredient else {
            stats.skipped += 1;
            continue;
        };
        if result.confidence != Confidence::High {
            stats.skipped += 1;
            continue;
        }
        if dry_run {
            info!(id = %ingredient.id, source = %result.source, "dry-run: would add");
            stats.added += 1;
        } else {
            dynamic.append(ingredient.clone(), &result.source, "high")?;
            info!(id = %ingredient.id, source = %result.source, "enrichment added");
            stats.added += 1;
        }
    }

    info!(added = stats.added, skipped = stats.skipped, "enrichment run complete");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dw_connectors::EnrichmentResult;
    use dw_ontology::Ingredient;

    struct MockSource;

    impl FoodDataSource for MockSource {
        fn name(&self) -> &str {
            "mock"
        }
        fn lookup(&self, query: &str) -> EnrichmentResult {
            if query == "tapioca starch" {
                EnrichmentResult::hit(
                    Ingredient {
                        plant_origin: true,
                        ..Ingredient::new("mock_tapioca", "tapioca starch")
                    },
                    Confidence::High,
                    "mock",
                    "",
                )
            } else if query == "weird paste" {
                EnrichmentResult::hit(
                    Ingredient::new("mock_weird", "weird paste"),
                    Confidence::Medium,
                    "mock",
                    "",
                )
            } else {
                EnrichmentResult::miss("mock", "no_results")
            }
        }
    }

    fn seeded_log(dir: &std::path::Path) -> UnknownIngredientsLog {
        let mut log = UnknownIngredientsLog::load(&dir.join("unknown.json"));
        log.record("Tapioca Starch", "tapioca starch", &[], None).unwrap();
        log.record("tapioca starch", "tapioca starch", &[], None).unwrap();
        log.record("weird paste", "weird paste", &[], None).unwrap();
        log.record("mystery goo", "mystery goo", &[], None).unwrap();
        log
    }

    #[test]
    fn test_only_high_confidence_added() {
        let dir = tempfile::tempdir().unwrap();
        let log = seeded_log(dir.path());
        let mut dynamic = DynamicOntology::load(&dir.path().join("dynamic.json")).unwrap();

        let stats = run_enrichment(&log, &mut dynamic, &MockSource, 1, false).unwrap();
        assert_eq!(stats.examined, 3);
        assert_eq!(stats.added, 1);
        assert_eq!(stats.skipped, 2);
        assert_eq!(dynamic.len(), 1);
        assert_eq!(dynamic.ingredients()[0].id, "mock_tapioca");
    }

    #[test]
    fn test_min_frequency_filter() {
        let dir = tempfile::tempdir().unwrap();
        let log = seeded_log(dir.path());
        let mut dynamic = DynamicOntology::load(&dir.path().join("dynamic.json")).unwrap();

        // Only "tapioca starch" was seen twice.
        let stats = run_enrichment(&log, &mut dynamic, &MockSource, 2, false).unwrap();
        assert_eq!(stats.examined, 1);
        assert_eq!(stats.added, 1);
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let log = seeded_log(dir.path());
        let mut dynamic = DynamicOntology::load(&dir.path().join("dynamic.json")).unwrap();

        let stats = run_enrichment(&log, &mut dynamic, &MockSource, 1, true).unwrap();
        assert_eq!(stats.added, 1);
        assert_eq!(dynamic.len(), 0);
        assert!(!dir.path().join("dynamic.json").exists());
    }
}
