//! Merged static + dynamic ingredient registry.
//!
//! O(1) lookup by normalized canonical name or alias. The index is built
//! once at load; `add_ingredient` (API promotion) is the only writer and
//! is serialized behind a lock.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::Deserialize;
use tracing::{info, warn};

use dw_parser::normalize_ingredient_key;

use crate::dynamic::DynamicOntology;
use crate::error::Result;
use crate::schema::Ingredient;

#[derive(Debug, Deserialize)]
struct OntologyFile {
    #[serde(default = "default_version")]
    ontology_version: String,
    #[serde(default)]
    ingredients: Vec<Ingredient>,
}

fn default_version() -> String {
    "0".to_string()
}

/// O(1) lookup by normalized canonical_name or alias.
///
/// Does NOT perform substring or fuzzy matching. Dynamic entries override
/// static entries on key collision.
pub struct IngredientRegistry {
    by_key: RwLock<HashMap<String, Arc<Ingredient>>>,
    version: String,
}

impl IngredientRegistry {
    /// Build an empty registry (used when the ontology file is missing).
    pub fn empty() -> Self {
        Self {
            by_key: RwLock::new(HashMap::new()),
            version: "0".to_string(),
        }
    }

    /// Load the static ontology, then layer the dynamic ontology on top.
    ///
    /// A missing static file leaves the registry empty (logged, not
    /// fatal); the engine stays operable and reports low-confidence
    /// UNCERTAIN verdicts.
    pub fn load(ontology_path: &Path, dynamic_path: Option<&Path>) -> Result<Self> {
        let mut registry = if ontology_path.exists() {
            let file: OntologyFile = dw_foundation::io::read_json(ontology_path)?;
            let registry = Self {
                by_key: RwLock::new(HashMap::new()),
                version: file.ontology_version,
            };
            registry.index_all(file.ingredients);
            registry
        } else {
            warn!(path = %ontology_path.display(), "ontology file not found; registry empty");
            Self::empty()
        };

        if let Some(dynamic_path) = dynamic_path {
            let dynamic = DynamicOntology::load(dynamic_path)?;
            let additions = dynamic.ingredients();
            if !additions.is_empty() {
                info!(count = additions.len(), "layering dynamic ontology");
                registry.index_all(additions);
            }
            // Keep the higher of the two versions visible in verdicts.
            if registry.version == "0" {
                registry.version = dynamic.version().to_string();
            }
        }

        let count = registry.len();
        info!(keys = count, path = %ontology_path.display(), "ingredient registry loaded");
        Ok(registry)
    }

    /// Build a registry from in-memory ingredients (fixtures, tests).
    pub fn from_ingredients(version: impl Into<String>, ingredients: Vec<Ingredient>) -> Self {
        let registry = Self {
            by_key: RwLock::new(HashMap::new()),
            version: version.into(),
        };
        registry.index_all(ingredients);
        registry
    }

    fn index_all(&self, ingredients: Vec<Ingredient>) {
        let mut index = self.by_key.write().expect("registry lock poisoned");
        for ing in ingredients {
            let ing = Arc::new(ing);
            let mut keys: Vec<&str> = vec![ing.canonical_name.as_str()];
            keys.extend(ing.aliases.iter().map(String::as_str));
            for key in keys {
                let normalized = normalize_ingredient_key(key);
                if !normalized.is_empty() {
                    index.insert(normalized, Arc::clone(&ing));
                }
            }
        }
    }

    /// Resolve a raw ingredient string to a canonical Ingredient.
    ///
    /// Returns None if not found; the caller must treat the item as
    /// UNCERTAIN. No substring or fuzzy matching.
    pub fn resolve(&self, raw: &str) -> Option<Arc<Ingredient>> {
        let key = normalize_ingredient_key(raw);
        if key.is_empty() {
            return None;
        }
        let index = self.by_key.read().expect("registry lock poisoned");
        index.get(&key).cloned()
    }

    /// Insert an ingredient into the in-memory index, keyed by its
    /// canonical name and aliases. Used after a successful external-API
    /// resolution so repeat lookups hit the index.
    pub fn add_ingredient(&self, ingredient: Ingredient) {
        let ing = Arc::new(ingredient);
        let mut index = self.by_key.write().expect("registry lock poisoned");
        let mut keys: Vec<String> = vec![normalize_ingredient_key(&ing.canonical_name)];
        for alias in &ing.aliases {
            keys.push(normalize_ingredient_key(alias));
        }
        for key in keys {
            if !key.is_empty() {
                index.insert(key, Arc::clone(&ing));
            }
        }
    }

    /// Active ontology version string, surfaced in verdicts.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of indexed keys.
    pub fn len(&self) -> usize {
        self.by_key.read().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Ingredient> {
        vec![
            Ingredient {
                aliases: vec!["whole milk".to_string()],
                animal_origin: true,
                dairy_source: true,
                ..Ingredient::new("milk", "milk")
            },
            Ingredient::new("water", "water"),
        ]
    }

    #[test]
    fn test_resolve_by_canonical_name() {
        let reg = IngredientRegistry::from_ingredients("1.0", sample());
        let ing = reg.resolve("Milk").unwrap();
        assert_eq!(ing.id, "milk");
    }

    #[test]
    fn test_resolve_by_alias() {
        let reg = IngredientRegistry::from_ingredients("1.0", sample());
        let ing = reg.resolve("Whole Milk").unwrap();
        assert_eq!(ing.id, "milk");
    }

    #[test]
    fn test_resolve_unknown_returns_none() {
        let reg = IngredientRegistry::from_ingredients("1.0", sample());
        assert!(reg.resolve("xyzzy").is_none());
    }

    #[test]
    fn test_resolve_plural_fold() {
        let reg = IngredientRegistry::from_ingredients(
            "1.0",
            vec![Ingredient::new("carrot", "carrot")],
        );
        assert!(reg.resolve("carrots").is_some());
    }

    #[test]
    fn test_add_ingredient_visible_after_insert() {
        let reg = IngredientRegistry::from_ingredients("1.0", vec![]);
        assert!(reg.resolve("isinglass").is_none());
        reg.add_ingredient(Ingredient {
            aliases: vec!["inglass".to_string()],
            animal_origin: true,
            ..Ingredient::new("isinglass", "isinglass")
        });
        assert!(reg.resolve("isinglass").is_some());
        assert!(reg.resolve("inglass").is_some());
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let reg =
            IngredientRegistry::load(Path::new("/nonexistent/ontology.json"), None).unwrap();
        assert!(reg.is_empty());
        assert_eq!(reg.version(), "0");
    }

    #[test]
    fn test_dynamic_overrides_static() {
        let dir = tempfile::tempdir().unwrap();
        let static_path = dir.path().join("ontology.json");
        let dynamic_path = dir.path().join("dynamic_ontology.json");
        std::fs::write(
            &static_path,
            r#"{"ontology_version": "1.0", "ingredients": [
                {"id": "honey", "canonical_name": "honey", "insect_derived": false}
            ]}"#,
        )
        .unwrap();
        std::fs::write(
            &dynamic_path,
            r#"{"ontology_version": "1.0", "ingredients": [
                {"id": "honey", "canonical_name": "honey", "animal_origin": true,
                 "insect_derived": true, "_enrichment_source": "open_food_facts",
                 "_enrichment_confidence": "high"}
            ]}"#,
        )
        .unwrap();

        let reg = IngredientRegistry::load(&static_path, Some(&dynamic_path)).unwrap();
        let honey = reg.resolve("honey").unwrap();
        assert!(honey.insect_derived);
    }
}
