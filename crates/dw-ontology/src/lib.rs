//! Canonical ingredient ontology.
//!
//! This crate provides:
//! - [`Ingredient`] - the strict canonical ingredient record
//! - [`IngredientRegistry`] - O(1) resolution over the merged
//!   static + dynamic corpus
//! - [`DynamicOntology`] - the enrichment-grown ontology file
//! - [`UnknownIngredientsLog`] - the disk-backed log of unresolved lookups
//!
//! Lookup is by exact normalized key only; no substring guessing. An
//! unknown ingredient is the caller's signal to treat the item as
//! UNCERTAIN.

pub mod dynamic;
pub mod error;
pub mod registry;
pub mod schema;
pub mod unknown_log;

pub use dynamic::DynamicOntology;
pub use error::{OntologyError, Result};
pub use registry::IngredientRegistry;
pub use schema::Ingredient;
pub use unknown_log::{UnknownEntry, UnknownIngredientsLog};
