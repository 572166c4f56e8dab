use crate::intent::{Action, IntentError};
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Separator between per-item messages of one batch.
const ITEM_MESSAGE_SEPARATOR: &str = " | ";

/// How one item of a request was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    /// The item was resolved; mutations changed the snapshot.
    Applied,
    /// No matching entry; the rest of the batch still ran.
    NotFound,
    /// Nothing to remove.
    Empty,
    /// Answered by the escalation gateway (or its fallback apology).
    Escalated,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::NotFound => "not_found",
            Self::Empty => "empty",
            Self::Escalated => "escalated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub status: ItemStatus,
    pub message: String,
}

impl ItemOutcome {
    pub fn new(status: ItemStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn applied(message: impl Into<String>) -> Self {
        Self::new(ItemStatus::Applied, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ItemStatus::NotFound, message)
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(ItemStatus::Empty, message)
    }

    pub fn escalated(message: impl Into<String>) -> Self {
        Self::new(ItemStatus::Escalated, message)
    }
}

/// Ordered per-item results of one dispatched intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub action: Action,
    pub items: Vec<ItemOutcome>,
}

impl ActionOutcome {
    pub fn new(action: Action, items: Vec<ItemOutcome>) -> Self {
        Self { action, items }
    }

    /// User-facing message: item messages joined in input order.
    pub fn message(&self) -> String {
        self.items
            .iter()
            .map(|item| item.message.as_str())
            .collect::<Vec<_>>()
            .join(ITEM_MESSAGE_SEPARATOR)
    }

    pub fn count(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|item| item.status == status).count()
    }

    pub fn any_applied(&self) -> bool {
        self.count(ItemStatus::Applied) > 0
    }

    pub fn escalated(&self) -> bool {
        self.count(ItemStatus::Escalated) > 0
    }
}

impl Display for ActionOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Terminal dispatch failure, rendered as a user-facing message.
#[derive(Debug)]
pub enum DispatchError {
    UnknownAction(String),
    MissingField(&'static str),
    InvalidField { field: &'static str, value: String },
    MalformedIntent(String),
    Storage(StoreError),
}

impl DispatchError {
    /// Stable code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownAction(_) => "unknown_action",
            Self::MissingField(_) => "missing_field",
            Self::InvalidField { .. } => "invalid_field",
            Self::MalformedIntent(_) => "malformed_intent",
            Self::Storage(_) => "storage",
        }
    }
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownAction(action) => write!(f, "Unknown or unsupported action: {action}"),
            Self::MissingField(field) => write!(f, "Missing '{field}' field in command."),
            Self::InvalidField { field, value } => write!(f, "Invalid '{field}' value: {value}"),
            Self::MalformedIntent(message) => {
                write!(f, "Could not understand the command: {message}")
            }
            Self::Storage(err) => write!(f, "Storage failure: {err}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<IntentError> for DispatchError {
    fn from(value: IntentError) -> Self {
        match value {
            IntentError::MissingField(field) => Self::MissingField(field),
            IntentError::InvalidField { field, value } => Self::InvalidField { field, value },
            other => Self::MalformedIntent(other.to_string()),
        }
    }
}

impl From<StoreError> for DispatchError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}
