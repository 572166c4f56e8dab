//! Core engine for the homebase assistant backend.
//!
//! Applies structured intents (produced upstream by a language model) to
//! three persisted collections: inventory, shopping list and todo list.

pub mod clock;
pub mod config;
pub mod db;
pub mod escalation;
pub mod intent;
pub mod logging;
pub mod matching;
pub mod model;
pub mod service;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AppConfig, ConfigError, GatewayConfig, StoreBackend};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
#[cfg(feature = "ollama")]
pub use escalation::OllamaGateway;
pub use escalation::{
    escalate, EscalationGateway, EscalationRequest, GatewayError, RecordingGateway,
    StaticGateway, UnavailableGateway, ESCALATION_FALLBACK_ANSWER,
};
pub use intent::{extract_intent_json, Action, Intent, IntentError, ItemSpec};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::inventory::{InventoryCollection, InventoryEntry};
pub use model::room::Room;
pub use model::shopping::{ShoppingCollection, ShoppingEntry};
pub use model::todo::{TodoCollection, TodoDate};
pub use service::{ActionDispatcher, ActionOutcome, DispatchError, ItemOutcome, ItemStatus};
pub use store::{
    CollectionStore, CollectionStoreExt, Document, Domain, JsonFileCollectionStore,
    MemoryCollectionStore, SqliteCollectionStore, StoreError, StoreResult,
};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
