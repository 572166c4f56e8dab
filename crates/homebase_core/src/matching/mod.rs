//! Name normalization and fuzzy key resolution.
//!
//! # Responsibility
//! - Normalize free text for matching (case, whitespace).
//! - Resolve free-text room phrases to canonical rooms.
//! - Resolve free-text item names to exactly one existing collection key.
//!
//! # Invariants
//! - Normalized text is used for comparison only; stored keys keep their
//!   original casing.
//! - Fuzzy resolution returns at most one key, chosen deterministically.

pub mod fuzzy;
pub mod normalize;

pub use fuzzy::{
    find_closest_key, find_closest_match, find_exact_key, similarity, KeyMatch,
    FUZZY_MATCH_CUTOFF,
};
pub use normalize::{normalize_key, resolve_room};
