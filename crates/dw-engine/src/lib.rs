//! Deterministic dietary-compliance engine.
//!
//! The evaluation pipeline: resolve each atomic ingredient (static
//! ontology, dynamic ontology, then external food databases), evaluate
//! every selected restriction's rules against each resolved record, and
//! aggregate a [`ComplianceVerdict`] with a confidence score.
//!
//! Safety decisions are never made by a language model. The optional LLM
//! response composer only reformats an already-computed verdict, behind a
//! validator that reverts to the deterministic template on contradiction.
//!
//! # Example
//!
//! ```
//! use dw_engine::{ComplianceEngine, EvaluateOptions, VerdictStatus};
//!
//! let engine = ComplianceEngine::from_files(
//!     std::path::Path::new("data/ontology.json"),
//!     std::path::Path::new("data/restrictions.json"),
//! ).unwrap();
//! let verdict = engine.evaluate(
//!     &["water".to_string(), "milk".to_string()],
//!     Some(&["vegan".to_string()]),
//!     &EvaluateOptions::default(),
//! );
//! assert_eq!(verdict.status, VerdictStatus::NotSafe);
//! ```

pub mod chat;
pub mod composer;
pub mod confidence;
pub mod engine;
pub mod enrichment;
pub mod error;
pub mod llm_response;
pub mod profile;
pub mod resolver;
pub mod restriction_ids;
pub mod verdict;

pub use chat::{ChatAssistant, ChatReply};
pub use confidence::{compute_confidence, ResolutionLevel};
pub use engine::{ComplianceEngine, EvaluateOptions};
pub use enrichment::{run_enrichment, EnrichmentStats};
pub use error::{EngineError, Result};
pub use llm_response::LlmResponseComposer;
pub use profile::{profile_context, UserProfile, NO_RULES};
pub use resolver::{IngredientResolver, Resolution, ResolutionSource};
pub use restriction_ids::build_restriction_ids;
pub use verdict::{ComplianceVerdict, VerdictStatus};
