//! Strict contract for canonical ingredient representation.
//!
//! No free-text metadata; all fields are structured for deterministic rule
//! evaluation. Relation ids (`derived_from`, `contains`, `may_contain`)
//! are references only and are never traversed during evaluation.

use serde::{Deserialize, Serialize};

/// A canonical ingredient record.
///
/// Immutable once loaded. `animal_origin` and `plant_origin` may both be
/// set for intermediate products (e.g. soy lecithin); rules treat the
/// flags independently.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ingredient {
    /// Stable slug, unique across the static and dynamic ontology
    pub id: String,
    pub canonical_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub derived_from: Vec<String>,
    #[serde(default)]
    pub contains: Vec<String>,
    #[serde(default)]
    pub may_contain: Vec<String>,
    // Origin flags
    #[serde(default)]
    pub animal_origin: bool,
    #[serde(default)]
    pub plant_origin: bool,
    #[serde(default)]
    pub synthetic: bool,
    #[serde(default)]
    pub fungal: bool,
    #[serde(default)]
    pub insect_derived: bool,
    /// Species when `animal_origin`: cow, goat, pig, chicken, lamb, fish,
    /// shellfish, ...
    #[serde(default)]
    pub animal_species: Option<String>,
    // Allergen / dietary source flags
    #[serde(default)]
    pub egg_source: bool,
    #[serde(default)]
    pub dairy_source: bool,
    #[serde(default)]
    pub gluten_source: bool,
    /// "peanut", "tree_nut", or "coconut"
    #[serde(default)]
    pub nut_source: Option<String>,
    #[serde(default)]
    pub soy_source: bool,
    #[serde(default)]
    pub sesame_source: bool,
    /// 0 = none, >0 = present (1.0 for "contains alcohol")
    #[serde(default)]
    pub alcohol_content: Option<f64>,
    // Jain / lifestyle flags
    #[serde(default)]
    pub root_vegetable: bool,
    #[serde(default)]
    pub onion_source: bool,
    #[serde(default)]
    pub garlic_source: bool,
    #[serde(default)]
    pub fermented: bool,
    /// Reasons confidence may degrade downstream, e.g. "natural_flavor",
    /// "mono_diglycerides", "usda_fdc_inferred". Not errors.
    #[serde(default)]
    pub uncertainty_flags: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
}

impl Ingredient {
    /// Minimal constructor; remaining fields start at their defaults.
    pub fn new(id: impl Into<String>, canonical_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            canonical_name: canonical_name.into(),
            ..Default::default()
        }
    }

    /// True if animal-derived but not dairy/egg/insect (meat, fish,
    /// shellfish, gelatin, etc.). Insect-derived items (honey, carmine,
    /// shellac) are handled separately by the `insect_derived` flag.
    pub fn meat_fish_derived(&self) -> bool {
        self.animal_origin && !self.dairy_source && !self.egg_source && !self.insect_derived
    }
}
