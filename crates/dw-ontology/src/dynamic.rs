//! Dynamic ontology: ingredients added by enrichment.
//!
//! Backed by `dynamic_ontology.json`. Each entry carries bookkeeping
//! fields (`_enrichment_source`, `_enrichment_confidence`) that are
//! stripped when the ingredients are exposed to the registry. Saves
//! rewrite the whole file through an atomic rename.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::schema::Ingredient;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DynamicEntry {
    #[serde(flatten)]
    ingredient: Ingredient,
    #[serde(
        rename = "_enrichment_source",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    enrichment_source: Option<String>,
    #[serde(
        rename = "_enrichment_confidence",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    enrichment_confidence: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DynamicFile {
    #[serde(default = "default_version")]
    ontology_version: String,
    #[serde(default)]
    ingredients: Vec<DynamicEntry>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Manages the enrichment-grown ontology file.
pub struct DynamicOntology {
    path: PathBuf,
    entries: Vec<DynamicEntry>,
    version: String,
}

impl DynamicOntology {
    /// Load the dynamic ontology from disk. A missing or malformed file
    /// yields an empty store (logged, not fatal).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                path: path.to_path_buf(),
                entries: Vec::new(),
                version: default_version(),
            });
        }
        match dw_foundation::io::read_json::<DynamicFile>(path) {
            Ok(file) => {
                info!(
                    count = file.ingredients.len(),
                    path = %path.display(),
                    "loaded dynamic ontology"
                );
                Ok(Self {
                    path: path.to_path_buf(),
                    entries: file.ingredients,
                    version: file.ontology_version,
                })
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "dynamic ontology load failed; starting empty");
                Ok(Self {
                    path: path.to_path_buf(),
                    entries: Vec::new(),
                    version: default_version(),
                })
            }
        }
    }

    /// Add an ingredient from enrichment, deduplicating by id, and persist.
    ///
    /// A write failure is reported but leaves the in-memory entry in
    /// place; the next enrichment run retries the save.
    pub fn append(&mut self, ingredient: Ingredient, source: &str, confidence: &str) -> Result<()> {
        if self.entries.iter().any(|e| e.ingredient.id == ingredient.id) {
            debug!(id = %ingredient.id, "dynamic ontology already has entry");
            return Ok(());
        }
        info!(
            id = %ingredient.id,
            source = source,
            confidence = confidence,
            "adding to dynamic ontology"
        );
        self.entries.push(DynamicEntry {
            ingredient,
            enrichment_source: Some(source.to_string()),
            enrichment_confidence: Some(confidence.to_string()),
        });
        self.save()
    }

    fn save(&self) -> Result<()> {
        let file = DynamicFile {
            ontology_version: self.version.clone(),
            ingredients: self.entries.clone(),
        };
        dw_foundation::io::write_json_atomic(&self.path, &file)?;
        Ok(())
    }

    /// Ingredients with `_enrichment_*` bookkeeping stripped.
    pub fn ingredients(&self) -> Vec<Ingredient> {
        self.entries.iter().map(|e| e.ingredient.clone()).collect()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DynamicOntology::load(&dir.path().join("dynamic.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_persists_and_dedupes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dynamic.json");
        let mut store = DynamicOntology::load(&path).unwrap();

        let ing = Ingredient {
            animal_origin: true,
            animal_species: Some("fish".to_string()),
            ..Ingredient::new("off_isinglass", "isinglass")
        };
        store.append(ing.clone(), "open_food_facts", "high").unwrap();
        store.append(ing, "open_food_facts", "high").unwrap();
        assert_eq!(store.len(), 1);

        let reloaded = DynamicOntology::load(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        let ings = reloaded.ingredients();
        assert_eq!(ings[0].id, "off_isinglass");
        // Bookkeeping fields round-trip on disk but stay out of the
        // exposed ingredient.
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("_enrichment_source"));
    }

    #[test]
    fn test_malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dynamic.json");
        std::fs::write(&path, "not json at all").unwrap();
        let store = DynamicOntology::load(&path).unwrap();
        assert!(store.is_empty());
    }
}
