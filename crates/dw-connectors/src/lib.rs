//! External food-database connectors.
//!
//! Two connectors behind one fetcher:
//! - [`UsdaFdcClient`] - USDA FoodData Central search (API key required)
//! - [`OpenFoodFactsClient`] - Open Food Facts search (no key)
//!
//! Both map search hits onto the canonical [`dw_ontology::Ingredient`]
//! schema, driven primarily by structured category/tag data with keyword
//! inference as fallback. The combined [`IngredientFetcher`] tries USDA
//! first, then Open Food Facts, and caches results by a SHA-256 prefix of
//! the normalized query (1 h TTL, 500 entries).
//!
//! The [`FoodDataSource`] trait lets tests substitute mock sources for the
//! live HTTP clients.

pub mod error;
pub mod fetcher;
pub mod open_food_facts;
pub mod retry;
pub mod text;
pub mod types;
pub mod usda_fdc;

pub use error::{ConnectorError, Result};
pub use fetcher::{FetcherConfig, IngredientFetcher};
pub use open_food_facts::OpenFoodFactsClient;
pub use types::{Confidence, EnrichmentResult, FoodDataSource};
pub use usda_fdc::UsdaFdcClient;
