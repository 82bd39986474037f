//! Confidence score from resolution levels and verdict shape.
//!
//! Weights: ontology match = 1.0, API-validated = 0.7, unknown = 0.0,
//! failed external lookup = 0.35. Trace bands: a violation triggered only
//! by trace ingredients lands in [0.2, 0.5]; SAFE with trace present gets
//! a 0.2 floor.

use crate::verdict::VerdictStatus;

/// How an individual ingredient was resolved, for confidence weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionLevel {
    /// Ontology hit (or an informational trace miss)
    High,
    /// External-API result used without persistence
    Medium,
    /// Unresolved
    Low,
    /// Every external lookup failed
    ApiFailed,
}

impl ResolutionLevel {
    fn weight(self) -> f64 {
        match self {
            ResolutionLevel::High => 1.0,
            ResolutionLevel::Medium => 0.7,
            ResolutionLevel::Low => 0.0,
            ResolutionLevel::ApiFailed => 0.35,
        }
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Compute the verdict confidence.
///
/// `confidence = max(0, effective_ratio - 0.1 * |uncertain| - 0.05 * |warnings|)`
/// then, in order: the api-failed ceiling (<= 0.4), the trace-only
/// violation band ([0.2, 0.5] for NOT_SAFE), and the SAFE-with-trace
/// floor (>= 0.2).
#[allow(clippy::too_many_arguments)]
pub fn compute_confidence(
    levels: &[ResolutionLevel],
    uncertain_count: usize,
    warning_count: usize,
    triggered_only_by_trace: bool,
    has_trace_ingredients: bool,
    status: VerdictStatus,
) -> f64 {
    let total = levels.len();
    if total == 0 {
        return 0.0;
    }
    let effective: f64 = levels.iter().map(|l| l.weight()).sum();
    let effective_ratio = effective / total as f64;
    let has_api_failed = levels.contains(&ResolutionLevel::ApiFailed);

    let uncertainty_penalty = uncertain_count as f64 * 0.1;
    let conditional_penalty = warning_count as f64 * 0.05;
    let mut base = (effective_ratio - uncertainty_penalty - conditional_penalty).max(0.0);

    if has_api_failed {
        base = base.min(0.4);
    }

    if triggered_only_by_trace && status == VerdictStatus::NotSafe {
        return round4(base.clamp(0.2, 0.5));
    }
    if has_trace_ingredients && status == VerdictStatus::Safe {
        return round4(base.max(0.2));
    }
    round4(base)
}
