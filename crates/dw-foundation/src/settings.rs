//! Environment-driven settings: feature flags, data-file paths, and
//! external service configuration.
//!
//! All values are read from the process environment with defaults that
//! match a checkout-local `data/` directory. Values that may change while
//! the process is running (API keys, feature toggles) are read lazily at
//! call time rather than captured once at startup.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Workspace settings resolved from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Root directory for data files (`DIETWISE_DATA_DIR`, default `data/`)
    pub data_dir: PathBuf,
    /// Run verdicts through the rule engine (`USE_NEW_ENGINE`)
    pub use_new_engine: bool,
    /// Log side-by-side comparisons without changing behavior (`SHADOW_MODE`)
    pub shadow_mode: bool,
    /// Ollama generate endpoint (`OLLAMA_API_URL`)
    pub ollama_url: String,
    /// Ollama model name (`OLLAMA_MODEL`)
    pub ollama_model: String,
    /// LLM intent-extraction timeout in seconds (`LLM_INTENT_TIMEOUT`)
    pub llm_intent_timeout_secs: u64,
    /// LLM response-composition timeout in seconds (`LLM_RESPONSE_TIMEOUT`)
    pub llm_response_timeout_secs: u64,
}

impl Settings {
    /// Resolve settings from the environment.
    pub fn from_env() -> Self {
        let data_dir = env::var("DIETWISE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));
        Self {
            data_dir,
            use_new_engine: env_flag("USE_NEW_ENGINE", true),
            shadow_mode: env_flag("SHADOW_MODE", false),
            ollama_url: env::var("OLLAMA_API_URL")
                .unwrap_or_else(|_| "http://localhost:11434/api/generate".to_string()),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2:3b".to_string()),
            llm_intent_timeout_secs: env_u64("LLM_INTENT_TIMEOUT", 30),
            llm_response_timeout_secs: env_u64("LLM_RESPONSE_TIMEOUT", 30),
        }
    }

    /// Path to the static ontology file.
    pub fn ontology_path(&self) -> PathBuf {
        self.data_dir.join("ontology.json")
    }

    /// Path to the dynamic (enrichment-grown) ontology file.
    pub fn dynamic_ontology_path(&self) -> PathBuf {
        self.data_dir.join("dynamic_ontology.json")
    }

    /// Path to the restrictions file.
    pub fn restrictions_path(&self) -> PathBuf {
        self.data_dir.join("restrictions.json")
    }

    /// Path to the unknown-ingredient log.
    pub fn unknown_log_path(&self) -> PathBuf {
        self.data_dir.join("unknown_ingredients_log.json")
    }

    /// Path to the user-profile store.
    pub fn profiles_path(&self) -> PathBuf {
        self.data_dir.join("profiles.json")
    }

    /// USDA FoodData Central API key, read at call time so environment
    /// changes are picked up without a restart. Empty means unconfigured.
    pub fn usda_fdc_api_key() -> String {
        env::var("USDA_FDC_API_KEY")
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    /// Whether Open Food Facts lookups are enabled (default true).
    pub fn open_food_facts_enabled() -> bool {
        env_flag("OPEN_FOOD_FACTS_ENABLED", true)
    }

    /// Emit the startup configuration line so missing data files and
    /// unconfigured connectors are visible in the logs.
    pub fn log_summary(&self) {
        info!(
            use_new_engine = self.use_new_engine,
            shadow_mode = self.shadow_mode,
            ontology_present = self.ontology_path().exists(),
            restrictions_present = self.restrictions_path().exists(),
            dynamic_present = self.dynamic_ontology_path().exists(),
            usda_key_configured = !Self::usda_fdc_api_key().is_empty(),
            off_enabled = Self::open_food_facts_enabled(),
            ollama_model = %self.ollama_model,
            llm_intent_timeout_secs = self.llm_intent_timeout_secs,
            llm_response_timeout_secs = self.llm_response_timeout_secs,
            "startup configuration"
        );
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Config for Settings {
    fn validate(&self) -> crate::error::Result<()> {
        if self.ollama_url.is_empty() {
            return Err(crate::error::FoundationError::Config {
                message: "OLLAMA_API_URL cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
