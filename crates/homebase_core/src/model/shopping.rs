//! Shopping list domain model.
//!
//! # Invariants
//! - Entries keep insertion order; the sequence itself is the order log.
//! - Every entry has `quantity >= 1`.

use crate::model::inventory::QuantityChange;
use crate::model::ModelValidationError;
use serde::{Deserialize, Serialize};

/// One shopping list line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingEntry {
    pub item: String,
    pub quantity: u32,
}

impl ShoppingEntry {
    pub fn new(item: impl Into<String>, quantity: u32) -> Self {
        Self {
            item: item.into(),
            quantity,
        }
    }
}

/// Ordered shopping list snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ShoppingEntry>", into = "Vec<ShoppingEntry>")]
pub struct ShoppingCollection {
    entries: Vec<ShoppingEntry>,
}

impl ShoppingCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ShoppingEntry] {
        &self.entries
    }

    /// Item names in list order.
    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.item.as_str())
    }

    /// First entry whose name is exactly `item`.
    pub fn position(&self, item: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.item == item)
    }

    pub fn get(&self, index: usize) -> Option<&ShoppingEntry> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ShoppingEntry> {
        self.entries.get_mut(index)
    }

    pub fn push(&mut self, entry: ShoppingEntry) {
        self.entries.push(entry);
    }

    /// Removes the most recently added line.
    pub fn pop_last(&mut self) -> Option<ShoppingEntry> {
        self.entries.pop()
    }

    /// Removes `amount` units from the line at `index`; `None` removes it all.
    pub fn take_quantity(&mut self, index: usize, amount: Option<u32>) -> Option<QuantityChange> {
        let current = self.entries.get(index)?.quantity;
        match amount {
            Some(amount) if amount < current => {
                let remaining = current - amount;
                self.entries[index].quantity = remaining;
                Some(QuantityChange::Remaining(remaining))
            }
            _ => {
                self.entries.remove(index);
                Some(QuantityChange::Removed)
            }
        }
    }
}

impl TryFrom<Vec<ShoppingEntry>> for ShoppingCollection {
    type Error = ModelValidationError;

    fn try_from(entries: Vec<ShoppingEntry>) -> Result<Self, Self::Error> {
        if let Some(entry) = entries.iter().find(|entry| entry.quantity == 0) {
            return Err(ModelValidationError::NonPositiveQuantity(entry.item.clone()));
        }
        Ok(Self { entries })
    }
}

impl From<ShoppingCollection> for Vec<ShoppingEntry> {
    fn from(collection: ShoppingCollection) -> Self {
        collection.entries
    }
}
