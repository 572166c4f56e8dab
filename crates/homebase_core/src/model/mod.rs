//! Collection domain model.
//!
//! # Responsibility
//! - Define the three persisted collections (inventory, shopping, todo) and
//!   the closed room enumeration.
//! - Validate persisted documents on load instead of masking bad data.
//!
//! # Invariants
//! - Quantities are always >= 1 for stored entries.
//! - "Most recent" is defined by an explicit order log, never by incidental
//!   container ordering.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod inventory;
pub mod room;
pub mod shopping;
pub mod todo;

/// Validation failure for model values and persisted documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Same key appears twice in an order log.
    DuplicateKey(String),
    /// Order log and entry map disagree on this key.
    OrderLogMismatch(String),
    /// Stored quantity is zero.
    NonPositiveQuantity(String),
    /// Date text is not `DD-MM-YYYY`.
    InvalidDate(String),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateKey(key) => write!(f, "duplicate key `{key}` in order log"),
            Self::OrderLogMismatch(key) => {
                write!(f, "order log does not match entries at key `{key}`")
            }
            Self::NonPositiveQuantity(key) => {
                write!(f, "stored quantity for `{key}` must be >= 1")
            }
            Self::InvalidDate(value) => {
                write!(f, "invalid date `{value}`; expected DD-MM-YYYY")
            }
        }
    }
}

impl Error for ModelValidationError {}
