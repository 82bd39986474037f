//! Disk-backed log of unknown ingredients.
//!
//! Every unresolved lookup records the raw input, normalized key, and a
//! bounded sample of the restriction/profile context. The enrichment job
//! reads this log to decide which keys to promote into the dynamic
//! ontology.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Cap on stored raw input spellings per key.
const MAX_RAW_INPUTS: usize = 20;
/// Cap on the restriction-id sample per key.
const MAX_RESTRICTION_SAMPLE: usize = 10;

/// One unknown-ingredient entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnknownEntry {
    pub normalized_key: String,
    #[serde(default)]
    pub raw_inputs: Vec<String>,
    #[serde(default)]
    pub frequency: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub restriction_ids_sample: Vec<String>,
    #[serde(default)]
    pub profile_context_sample: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct UnknownLogFile {
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    unknown_ingredients: IndexMap<String, UnknownEntry>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// In-memory log of unknown ingredients with persist-to-JSON.
///
/// Keyed by normalized key; `record` appends or updates and saves through
/// an atomic rename.
pub struct UnknownIngredientsLog {
    path: PathBuf,
    entries: IndexMap<String, UnknownEntry>,
}

impl UnknownIngredientsLog {
    /// Load the log from disk; a missing or malformed file starts empty.
    pub fn load(path: &Path) -> Self {
        let entries = if path.exists() {
            match dw_foundation::io::read_json::<UnknownLogFile>(path) {
                Ok(file) => file.unknown_ingredients,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unknown-ingredient log load failed");
                    IndexMap::new()
                }
            }
        } else {
            IndexMap::new()
        };
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    /// Record or update an unknown ingredient and persist.
    pub fn record(
        &mut self,
        raw_input: &str,
        normalized_key: &str,
        restriction_ids: &[String],
        profile_context: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<()> {
        if normalized_key.is_empty() {
            return Ok(());
        }
        let now = Utc::now();
        let entry = self
            .entries
            .entry(normalized_key.to_string())
            .or_insert_with(|| UnknownEntry {
                normalized_key: normalized_key.to_string(),
                raw_inputs: Vec::new(),
                frequency: 0,
                first_seen: now,
                last_seen: now,
                restriction_ids_sample: Vec::new(),
                profile_context_sample: None,
            });

        if !raw_input.is_empty()
            && !entry.raw_inputs.iter().any(|r| r == raw_input)
            && entry.raw_inputs.len() < MAX_RAW_INPUTS
        {
            entry.raw_inputs.push(raw_input.to_string());
        }
        entry.frequency += 1;
        entry.last_seen = now;
        for rid in restriction_ids.iter().take(5) {
            if !entry.restriction_ids_sample.contains(rid)
                && entry.restriction_ids_sample.len() < MAX_RESTRICTION_SAMPLE
            {
                entry.restriction_ids_sample.push(rid.clone());
            }
        }
        if entry.profile_context_sample.is_none() {
            entry.profile_context_sample = profile_context.cloned();
        }

        let frequency = entry.frequency;
        info!(
            raw = raw_input,
            normalized_key = normalized_key,
            frequency = frequency,
            "unknown ingredient logged"
        );
        self.save()
    }

    fn save(&self) -> Result<()> {
        let file = UnknownLogFile {
            version: default_version(),
            unknown_ingredients: self.entries.clone(),
        };
        dw_foundation::io::write_json_atomic(&self.path, &file)?;
        Ok(())
    }

    /// Normalized keys seen at least `min_frequency` times, for the
    /// enrichment job.
    pub fn keys_for_enrichment(&self, min_frequency: u64) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, e)| e.frequency >= min_frequency)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Entry for one normalized key.
    pub fn get(&self, normalized_key: &str) -> Option<&UnknownEntry> {
        self.entries.get(normalized_key)
    }

    /// All entries, in insertion order.
    pub fn entries(&self) -> &IndexMap<String, UnknownEntry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
