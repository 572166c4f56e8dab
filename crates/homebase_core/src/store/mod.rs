//! Collection store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define whole-document read/write access to the three collections.
//! - Keep the persistence medium (SQLite, JSON files, memory) opaque to the
//!   dispatcher.
//!
//! # Invariants
//! - Reads and writes are whole-document; there is no partial update.
//! - A missing document reads as an empty collection of the right shape.
//! - There is no optimistic concurrency token: two overlapping
//!   read-modify-write cycles on one domain can lose an update. Callers
//!   serialize writers per domain.

use crate::db::DbError;
use crate::model::inventory::InventoryCollection;
use crate::model::shopping::ShoppingCollection;
use crate::model::todo::TodoCollection;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod json_store;
pub mod memory_store;
pub mod sqlite_store;

pub use json_store::JsonFileCollectionStore;
pub use memory_store::MemoryCollectionStore;
pub use sqlite_store::SqliteCollectionStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Name of one independently persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Domain {
    Inventory,
    Shopping,
    Todo,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Inventory, Domain::Shopping, Domain::Todo];

    /// Stable storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inventory => "inventory",
            Self::Shopping => "shopping",
            Self::Todo => "todo",
        }
    }

    pub fn parse(value: &str) -> Option<Domain> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inventory" => Some(Self::Inventory),
            "shopping" => Some(Self::Shopping),
            "todo" => Some(Self::Todo),
            _ => None,
        }
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    Inventory(InventoryCollection),
    Shopping(ShoppingCollection),
    Todo(TodoCollection),
}

impl Document {
    /// Empty collection for `domain`.
    pub fn empty(domain: Domain) -> Self {
        match domain {
            Domain::Inventory => Self::Inventory(InventoryCollection::new()),
            Domain::Shopping => Self::Shopping(ShoppingCollection::new()),
            Domain::Todo => Self::Todo(TodoCollection::new()),
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            Self::Inventory(_) => Domain::Inventory,
            Self::Shopping(_) => Domain::Shopping,
            Self::Todo(_) => Domain::Todo,
        }
    }

    /// JSON value of the document, as handed to escalation.
    pub fn to_json_value(&self) -> StoreResult<Value> {
        let result = match self {
            Self::Inventory(collection) => serde_json::to_value(collection),
            Self::Shopping(collection) => serde_json::to_value(collection),
            Self::Todo(collection) => serde_json::to_value(collection),
        };
        result.map_err(|err| StoreError::Serialize {
            domain: self.domain(),
            message: err.to_string(),
        })
    }

    /// Pretty JSON text of the document, as persisted.
    pub fn to_json_string(&self) -> StoreResult<String> {
        let value = self.to_json_value()?;
        serde_json::to_string_pretty(&value).map_err(|err| StoreError::Serialize {
            domain: self.domain(),
            message: err.to_string(),
        })
    }

    /// Decodes and validates persisted JSON text for `domain`.
    pub fn from_json_str(domain: Domain, body: &str) -> StoreResult<Self> {
        let corrupt = |err: serde_json::Error| StoreError::Corrupt {
            domain,
            message: err.to_string(),
        };
        match domain {
            Domain::Inventory => serde_json::from_str(body).map(Self::Inventory).map_err(corrupt),
            Domain::Shopping => serde_json::from_str(body).map(Self::Shopping).map_err(corrupt),
            Domain::Todo => serde_json::from_str(body).map(Self::Todo).map_err(corrupt),
        }
    }
}

impl From<InventoryCollection> for Document {
    fn from(value: InventoryCollection) -> Self {
        Self::Inventory(value)
    }
}

impl From<ShoppingCollection> for Document {
    fn from(value: ShoppingCollection) -> Self {
        Self::Shopping(value)
    }
}

impl From<TodoCollection> for Document {
    fn from(value: TodoCollection) -> Self {
        Self::Todo(value)
    }
}

/// Collection store error.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Persisted document fails to decode or violates model invariants.
    Corrupt {
        domain: Domain,
        message: String,
    },
    Serialize {
        domain: Domain,
        message: String,
    },
    /// Document handed to `write` belongs to another domain.
    DomainMismatch {
        expected: Domain,
        found: Domain,
    },
    /// Backing storage is not initialized for collection documents.
    NotReady(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Corrupt { domain, message } => {
                write!(f, "stored {domain} document is invalid: {message}")
            }
            Self::Serialize { domain, message } => {
                write!(f, "failed to encode {domain} document: {message}")
            }
            Self::DomainMismatch { expected, found } => {
                write!(f, "expected {expected} document, got {found}")
            }
            Self::NotReady(message) => write!(f, "collection store not ready: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Whole-document access to the persisted collections.
pub trait CollectionStore {
    /// Reads the full snapshot for `domain`.
    fn read(&self, domain: Domain) -> StoreResult<Document>;
    /// Replaces the full snapshot for `domain`.
    fn write(&self, domain: Domain, document: &Document) -> StoreResult<()>;
}

impl<T: CollectionStore + ?Sized> CollectionStore for &T {
    fn read(&self, domain: Domain) -> StoreResult<Document> {
        (**self).read(domain)
    }

    fn write(&self, domain: Domain, document: &Document) -> StoreResult<()> {
        (**self).write(domain, document)
    }
}

impl<T: CollectionStore + ?Sized> CollectionStore for Box<T> {
    fn read(&self, domain: Domain) -> StoreResult<Document> {
        (**self).read(domain)
    }

    fn write(&self, domain: Domain, document: &Document) -> StoreResult<()> {
        (**self).write(domain, document)
    }
}

/// Typed accessors over any `CollectionStore`.
pub trait CollectionStoreExt: CollectionStore {
    fn read_inventory(&self) -> StoreResult<InventoryCollection> {
        match self.read(Domain::Inventory)? {
            Document::Inventory(collection) => Ok(collection),
            other => Err(mismatch(Domain::Inventory, &other)),
        }
    }

    fn read_shopping(&self) -> StoreResult<ShoppingCollection> {
        match self.read(Domain::Shopping)? {
            Document::Shopping(collection) => Ok(collection),
            other => Err(mismatch(Domain::Shopping, &other)),
        }
    }

    fn read_todo(&self) -> StoreResult<TodoCollection> {
        match self.read(Domain::Todo)? {
            Document::Todo(collection) => Ok(collection),
            other => Err(mismatch(Domain::Todo, &other)),
        }
    }

    fn write_inventory(&self, collection: InventoryCollection) -> StoreResult<()> {
        self.write(Domain::Inventory, &Document::Inventory(collection))
    }

    fn write_shopping(&self, collection: ShoppingCollection) -> StoreResult<()> {
        self.write(Domain::Shopping, &Document::Shopping(collection))
    }

    fn write_todo(&self, collection: TodoCollection) -> StoreResult<()> {
        self.write(Domain::Todo, &Document::Todo(collection))
    }
}

impl<T: CollectionStore + ?Sized> CollectionStoreExt for T {}

fn mismatch(expected: Domain, found: &Document) -> StoreError {
    StoreError::DomainMismatch {
        expected,
        found: found.domain(),
    }
}

/// Rejects a write whose document does not belong to `domain`.
pub(crate) fn ensure_domain(domain: Domain, document: &Document) -> StoreResult<()> {
    if document.domain() == domain {
        Ok(())
    } else {
        Err(mismatch(domain, document))
    }
}
