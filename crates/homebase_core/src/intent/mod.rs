//! Structured intent input.
//!
//! # Responsibility
//! - Define the closed action set.
//! - Parse the loosely typed object produced by the upstream language-model
//!   step into a typed `Intent`.
//!
//! # Invariants
//! - Unknown fields are recorded for diagnostics and never rejected.
//! - `item` is always represented as `ItemSpec`, so list and scalar inputs
//!   share one code path downstream.

pub mod action;
pub mod parse;

pub use action::Action;
pub use parse::{extract_intent_json, Intent, IntentError, ItemSpec};
