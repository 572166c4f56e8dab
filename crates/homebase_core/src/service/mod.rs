//! Intent action engine.
//!
//! # Responsibility
//! - Validate intents and route them to per-domain handlers.
//! - Resolve item names against one snapshot per request and write the
//!   snapshot back only when something changed.
//! - Defer unresolved queries to the escalation gateway.
//!
//! # Invariants
//! - No state is kept across requests; every dispatch re-reads its snapshot.
//! - Every handler runs once per item name, in input order, and batch
//!   outcomes are joined in exactly one place (`ActionOutcome::message`).
//! - Only `DispatchError` crosses the dispatcher boundary.

mod dispatcher;
mod inventory;
mod outcome;
mod shopping;
mod todo;

pub use dispatcher::ActionDispatcher;
pub use outcome::{ActionOutcome, DispatchError, ItemOutcome, ItemStatus};

use crate::matching::normalize_key;
use crate::model::room::Room;

/// Item names meaning "whatever was added most recently".
const LAST_ENTRY_SENTINELS: [&str; 3] = ["last entry", "last item", "most recent"];

fn is_last_entry_sentinel(name: &str) -> bool {
    let normalized = normalize_key(name);
    LAST_ENTRY_SENTINELS.contains(&normalized.as_str())
}

/// Optional per-intent fields shared by every item of a batch.
#[derive(Debug, Clone, Copy, Default)]
struct ItemFields<'a> {
    location: Option<&'a str>,
    room: Option<Room>,
    quantity: Option<u32>,
}

/// Result of resolving one queried name.
#[derive(Debug, Clone, PartialEq, Eq)]
enum QueryStep {
    Answered(ItemOutcome),
    Unresolved,
}

#[cfg(test)]
mod tests {
    use super::is_last_entry_sentinel;

    #[test]
    fn sentinels_ignore_case_and_spacing() {
        assert!(is_last_entry_sentinel("Last  Entry"));
        assert!(is_last_entry_sentinel(" most recent "));
        assert!(!is_last_entry_sentinel("last entries"));
    }
}
