//! Inventory domain model.
//!
//! # Responsibility
//! - Hold inventory entries keyed by item name.
//! - Track insertion order explicitly so "most recent" never depends on the
//!   map implementation.
//!
//! # Invariants
//! - Keys are unique and stored verbatim as first inserted.
//! - `order` contains exactly the keys of `entries`, oldest first.
//! - Every persisted entry has `quantity >= 1`; entries that would drop to
//!   zero are removed instead.

use crate::model::room::Room;
use crate::model::ModelValidationError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// One stored inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    /// Free-text location ("top shelf", "drawer under the tv").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Always >= 1 while the entry exists.
    pub quantity: u32,
    /// Canonical room, absent when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<Room>,
}

impl InventoryEntry {
    pub fn new(location: Option<String>, quantity: u32, room: Option<Room>) -> Self {
        Self {
            location,
            quantity,
            room,
        }
    }
}

/// Result of taking some quantity away from a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Entry was deleted because nothing would remain.
    Removed,
    /// Entry kept with the remaining quantity.
    Remaining(u32),
}

/// Inventory snapshot with an explicit insertion-order log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "InventoryDocument", into = "InventoryDocument")]
pub struct InventoryCollection {
    entries: HashMap<String, InventoryEntry>,
    order: Vec<String>,
}

impl InventoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&InventoryEntry> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut InventoryEntry> {
        self.entries.get_mut(key)
    }

    /// Keys oldest first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InventoryEntry)> {
        self.order.iter().filter_map(|key| {
            self.entries
                .get(key)
                .map(|entry| (key.as_str(), entry))
        })
    }

    /// Inserts a new entry at the end of the order log.
    ///
    /// Replacing an existing key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, entry: InventoryEntry) {
        let key = key.into();
        if self.entries.insert(key.clone(), entry).is_none() {
            self.order.push(key);
        }
    }

    /// Removes one entry and its order-log slot.
    pub fn remove(&mut self, key: &str) -> Option<InventoryEntry> {
        let removed = self.entries.remove(key)?;
        self.order.retain(|existing| existing != key);
        Some(removed)
    }

    /// Key of the most recently inserted entry.
    pub fn last_inserted_key(&self) -> Option<&str> {
        self.order.last().map(String::as_str)
    }

    /// Removes the most recently inserted entry.
    pub fn pop_last(&mut self) -> Option<(String, InventoryEntry)> {
        let key = self.order.pop()?;
        let entry = self.entries.remove(&key)?;
        Some((key, entry))
    }

    /// Removes `amount` units from `key`, deleting the entry when nothing
    /// would remain. `None` means "all of it".
    ///
    /// Returns `None` when the key does not exist.
    pub fn take_quantity(&mut self, key: &str, amount: Option<u32>) -> Option<QuantityChange> {
        let current = self.entries.get(key)?.quantity;
        match amount {
            Some(amount) if amount < current => {
                let remaining = current - amount;
                if let Some(entry) = self.entries.get_mut(key) {
                    entry.quantity = remaining;
                }
                Some(QuantityChange::Remaining(remaining))
            }
            _ => {
                self.remove(key);
                Some(QuantityChange::Removed)
            }
        }
    }
}

/// Persisted shape: order log plus keyed entries.
///
/// Both fields are required so a document of any other shape fails to load
/// instead of reading as an empty inventory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct InventoryDocument {
    order: Vec<String>,
    entries: BTreeMap<String, InventoryEntry>,
}

impl TryFrom<InventoryDocument> for InventoryCollection {
    type Error = ModelValidationError;

    fn try_from(document: InventoryDocument) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(document.order.len());
        for key in &document.order {
            if !seen.insert(key.as_str()) {
                return Err(ModelValidationError::DuplicateKey(key.clone()));
            }
            if !document.entries.contains_key(key) {
                return Err(ModelValidationError::OrderLogMismatch(key.clone()));
            }
        }
        if let Some(orphan) = document
            .entries
            .keys()
            .find(|key| !seen.contains(key.as_str()))
        {
            return Err(ModelValidationError::OrderLogMismatch(orphan.clone()));
        }
        if let Some((key, _)) = document
            .entries
            .iter()
            .find(|(_, entry)| entry.quantity == 0)
        {
            return Err(ModelValidationError::NonPositiveQuantity(key.clone()));
        }

        Ok(Self {
            entries: document.entries.into_iter().collect(),
            order: document.order,
        })
    }
}

impl From<InventoryCollection> for InventoryDocument {
    fn from(collection: InventoryCollection) -> Self {
        Self {
            order: collection.order,
            entries: collection.entries.into_iter().collect(),
        }
    }
}
