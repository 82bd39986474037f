//! Combined fetcher: USDA FDC first, then Open Food Facts, with an
//! in-memory TTL cache.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use dw_foundation::Settings;

use crate::open_food_facts::OpenFoodFactsClient;
use crate::types::{Confidence, EnrichmentResult, FoodDataSource};
use crate::usda_fdc::UsdaFdcClient;

/// Configuration for the combined fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Per-request timeout for connector GETs
    pub timeout: Duration,
    /// Cache entry lifetime
    pub cache_ttl: Duration,
    /// Maximum cached entries; overflow evicts least-recently-used
    pub cache_max_entries: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(3600),
            cache_max_entries: 500,
        }
    }
}

/// Tries USDA FDC (when a key is configured) then Open Food Facts (when
/// enabled), returning the first result with confidence >= medium, else
/// the best available.
///
/// Results are cached by a SHA-256 prefix of the normalized query. Entries
/// expire after the TTL; a full cache evicts the least recently used
/// entry on insert.
pub struct IngredientFetcher {
    config: FetcherConfig,
    off_client: OpenFoodFactsClient,
    cache: Mutex<LruCache<String, (EnrichmentResult, Instant)>>,
}

fn cache_key(normalized_query: &str) -> String {
    let digest = Sha256::digest(normalized_query.as_bytes());
    hex::encode(digest)[..32].to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

impl IngredientFetcher {
    pub fn new(config: FetcherConfig) -> Self {
        let capacity =
            NonZeroUsize::new(config.cache_max_entries.max(1)).expect("non-zero cache size");
        Self {
            off_client: OpenFoodFactsClient::new(config.timeout),
            cache: Mutex::new(LruCache::new(capacity)),
            config,
        }
    }

    fn cache_get(&self, key: &str) -> Option<EnrichmentResult> {
        let mut cache = self.cache.lock().expect("cache lock poisoned");
        match cache.get(key) {
            Some((result, stored_at)) if stored_at.elapsed() < self.config.cache_ttl => {
                Some(result.clone())
            }
            Some(_) => {
                cache.pop(key);
                None
            }
            None => None,
        }
    }

    fn cache_put(&self, key: String, result: EnrichmentResult) {
        let mut cache = self.cache.lock().expect("cache lock poisoned");
        cache.put(key, (result, Instant::now()));
    }

    fn fetch_uncached(&self, query: &str) -> EnrichmentResult {
        let mut best: Option<EnrichmentResult> = None;

        // API configuration is read at call time so environment changes
        // are picked up without a restart.
        let usda_key = Settings::usda_fdc_api_key();
        let off_enabled = Settings::open_food_facts_enabled();

        if !usda_key.is_empty() {
            let usda = UsdaFdcClient::new(usda_key, self.config.timeout);
            let res = usda.lookup(query);
            info!(
                query = %truncate(query, 60),
                success = res.ingredient.is_some(),
                confidence = %res.confidence,
                "USDA FDC fetch"
            );
            if res.ingredient.is_some() {
                best = Some(res);
            }
        } else {
            warn!("skipping USDA FDC (no API key set in USDA_FDC_API_KEY)");
        }

        let best_is_weak = best
            .as_ref()
            .map(|b| b.confidence == Confidence::Low)
            .unwrap_or(true);
        if off_enabled && best_is_weak {
            let res = self.off_client.lookup(query);
            info!(
                query = %truncate(query, 60),
                success = res.ingredient.is_some(),
                confidence = %res.confidence,
                "Open Food Facts fetch"
            );
            if res.ingredient.is_some() {
                let better = match &best {
                    None => true,
                    Some(b) => res.confidence == Confidence::High && b.confidence != Confidence::High,
                };
                if better {
                    best = Some(res);
                }
            }
        }

        let best = best.unwrap_or_else(|| EnrichmentResult::miss("none", "no_result"));
        if best.ingredient.is_none() {
            info!(
                normalized_key = %truncate(query, 80),
                source = %best.source,
                reason = %best.summary,
                "external lookup failed"
            );
        } else {
            info!(
                normalized_key = %truncate(query, 80),
                canonical_name = best
                    .ingredient
                    .as_ref()
                    .map(|i| i.canonical_name.as_str())
                    .unwrap_or(""),
                source = %best.source,
                confidence = %best.confidence,
                "external lookup resolved"
            );
        }
        best
    }
}

impl FoodDataSource for IngredientFetcher {
    fn name(&self) -> &str {
        "fetcher"
    }

    /// Fetch one normalized ingredient key, consulting the cache first.
    fn lookup(&self, normalized_key: &str) -> EnrichmentResult {
        let query = normalized_key.replace('_', " ").trim().to_string();
        let key = cache_key(normalized_key);
        if let Some(cached) = self.cache_get(&key) {
            debug!(key = normalized_key, "enrichment cache hit");
            return cached;
        }
        let result = self.fetch_uncached(&query);
        self.cache_put(key, result.clone());
        result
    }
}
