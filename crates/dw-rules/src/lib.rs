//! Data-driven dietary restriction rules.
//!
//! All restrictions are authored in JSON and loaded at init; there is no
//! hardcoded per-diet logic. Each [`Restriction`] holds an ordered list of
//! [`Rule`] predicates evaluated against a single ingredient record; the
//! first matching rule determines the action (FAIL or WARN).

pub mod error;
pub mod fields;
pub mod registry;
pub mod schema;

pub use error::{Result, RulesError};
pub use fields::{ingredient_field, FieldValue};
pub use registry::{RestrictionRegistry, RuleOutcome};
pub use schema::{Restriction, RestrictionCategory, Rule, RuleAction, RuleOperator, Severity};
