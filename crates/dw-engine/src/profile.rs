//! Persistent user profile for grocery safety.
//!
//! One profile per user: primary dietary preference (covers religious
//! diets), allergen list, lifestyle flags. Updates are merge-only: absent
//! fields never overwrite existing values, and the invariant is enforced
//! here rather than in any store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use dw_intent::ProfileUpdates;

/// Sentinel dietary preference meaning "no primary restriction".
pub const NO_RULES: &str = "No rules";

/// Single persistent profile per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default = "default_preference")]
    pub dietary_preference: String,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub lifestyle: Vec<String>,
}

fn default_preference() -> String {
    NO_RULES.to_string()
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            dietary_preference: NO_RULES.to_string(),
            allergens: Vec::new(),
            lifestyle: Vec::new(),
        }
    }

    /// True if the profile has no meaningful constraints (first-time user).
    pub fn is_empty(&self) -> bool {
        (self.dietary_preference.is_empty() || self.dietary_preference == NO_RULES)
            && self.allergens.is_empty()
            && self.lifestyle.is_empty()
    }

    /// Apply parsed updates, merge-only. Allergens and lifestyle flags
    /// accumulate (case-insensitively deduplicated); removals drop
    /// matching allergens. Returns the subset of updates that actually
    /// changed the profile, for acknowledgement text.
    pub fn apply_updates(&mut self, updates: &ProfileUpdates) -> ProfileUpdates {
        let mut applied = ProfileUpdates::default();

        if let Some(diet) = &updates.dietary_preference {
            if !diet.trim().is_empty() {
                self.dietary_preference = diet.clone();
                applied.dietary_preference = Some(diet.clone());
            }
        }

        if !updates.allergens.is_empty() {
            for allergen in &updates.allergens {
                let exists = self
                    .allergens
                    .iter()
                    .any(|a| a.eq_ignore_ascii_case(allergen));
                if !exists {
                    self.allergens.push(allergen.clone());
                }
            }
            applied.allergens = updates.allergens.clone();
        }

        if !updates.remove_allergens.is_empty() {
            self.allergens
                .retain(|a| !updates.remove_allergens.iter().any(|r| r.eq_ignore_ascii_case(a)));
            applied.remove_allergens = updates.remove_allergens.clone();
        }

        if !updates.lifestyle.is_empty() {
            for flag in &updates.lifestyle {
                let exists = self.lifestyle.iter().any(|f| f.eq_ignore_ascii_case(flag));
                if !exists {
                    self.lifestyle.push(flag.clone());
                }
            }
            applied.lifestyle = updates.lifestyle.clone();
        }

        applied
    }
}

/// Profile-context map recorded alongside unknown-ingredient log entries,
/// so the enrichment job can see which profiles kept hitting a key.
pub fn profile_context(profile: &UserProfile) -> HashMap<String, serde_json::Value> {
    let mut ctx = HashMap::new();
    ctx.insert(
        "dietary_preference".to_string(),
        json!(profile.dietary_preference),
    );
    ctx.insert("allergens".to_string(), json!(profile.allergens));
    ctx.insert("lifestyle".to_string(), json!(profile.lifestyle));
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_is_empty() {
        let profile = UserProfile::new("u1");
        assert!(profile.is_empty());
        assert_eq!(profile.dietary_preference, NO_RULES);
    }

    #[test]
    fn test_merge_only_updates() {
        let mut profile = UserProfile::new("u1");
        let applied = profile.apply_updates(&ProfileUpdates {
            dietary_preference: Some("Jain".to_string()),
            ..Default::default()
        });
        assert_eq!(profile.dietary_preference, "Jain");
        assert_eq!(applied.dietary_preference.as_deref(), Some("Jain"));

        // An update carrying only allergens must not clear the diet.
        profile.apply_updates(&ProfileUpdates {
            allergens: vec!["peanut".to_string()],
            ..Default::default()
        });
        assert_eq!(profile.dietary_preference, "Jain");
        assert_eq!(profile.allergens, vec!["peanut"]);
    }

    #[test]
    fn test_allergens_accumulate_without_duplicates() {
        let mut profile = UserProfile::new("u1");
        profile.apply_updates(&ProfileUpdates {
            allergens: vec!["peanut".to_string()],
            ..Default::default()
        });
        profile.apply_updates(&ProfileUpdates {
            allergens: vec!["Peanut".to_string(), "soy".to_string()],
            ..Default::default()
        });
        assert_eq!(profile.allergens, vec!["peanut", "soy"]);
    }

    #[test]
    fn test_remove_allergens() {
        let mut profile = UserProfile::new("u1");
        profile.apply_updates(&ProfileUpdates {
            allergens: vec!["peanut".to_string(), "soy".to_string()],
            ..Default::default()
        });
        profile.apply_updates(&ProfileUpdates {
            remove_allergens: vec!["Peanut".to_string()],
            ..Default::default()
        });
        assert_eq!(profile.allergens, vec!["soy"]);
    }

    #[test]
    fn test_serde_defaults() {
        let profile: UserProfile = serde_json::from_str(r#"{"user_id": "u1"}"#).unwrap();
        assert_eq!(profile.dietary_preference, NO_RULES);
        assert!(profile.is_empty());
    }

    #[test]
    fn test_profile_context_shape() {
        let mut profile = UserProfile::new("u1");
        profile.dietary_preference = "Vegan".to_string();
        profile.allergens = vec!["peanut".to_string()];
        let ctx = profile_context(&profile);
        assert_eq!(ctx["dietary_preference"], json!("Vegan"));
        assert_eq!(ctx["allergens"], json!(["peanut"]));
        assert_eq!(ctx["lifestyle"], json!([]));
    }
}
