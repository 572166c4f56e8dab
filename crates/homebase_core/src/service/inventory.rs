//! Inventory handlers. Adds match exactly; update, remove and query match
//! fuzzily. Update upserts on a miss.

use super::{is_last_entry_sentinel, ItemFields, ItemOutcome, QueryStep};
use crate::matching::{find_closest_key, find_exact_key};
use crate::model::inventory::{InventoryCollection, InventoryEntry, QuantityChange};

pub(super) fn add(
    collection: &mut InventoryCollection,
    names: &[String],
    fields: ItemFields<'_>,
) -> Vec<ItemOutcome> {
    names
        .iter()
        .map(|name| add_one(collection, name, fields))
        .collect()
}

fn add_one(collection: &mut InventoryCollection, name: &str, fields: ItemFields<'_>) -> ItemOutcome {
    let amount = fields.quantity.unwrap_or(1);
    let existing = find_exact_key(name, collection.keys()).map(str::to_string);
    match existing.and_then(|key| collection.get_mut(&key).map(|entry| (key, entry))) {
        Some((key, entry)) => {
            entry.quantity = entry.quantity.saturating_add(amount);
            ItemOutcome::applied(format!(
                "Updated {key} in inventory. Quantity = {}.",
                entry.quantity
            ))
        }
        None => insert_new(collection, name, fields),
    }
}

fn insert_new(collection: &mut InventoryCollection, name: &str, fields: ItemFields<'_>) -> ItemOutcome {
    let entry = InventoryEntry::new(
        fields.location.map(str::to_string),
        fields.quantity.unwrap_or(1),
        fields.room,
    );
    collection.insert(name, entry);
    ItemOutcome::applied(format!("Added {name} to inventory."))
}

pub(super) fn update(
    collection: &mut InventoryCollection,
    names: &[String],
    fields: ItemFields<'_>,
) -> Vec<ItemOutcome> {
    names
        .iter()
        .map(|name| update_one(collection, name, fields))
        .collect()
}

fn update_one(collection: &mut InventoryCollection, name: &str, fields: ItemFields<'_>) -> ItemOutcome {
    let matched = find_closest_key(name, collection.keys()).map(str::to_string);
    match matched.and_then(|key| collection.get_mut(&key).map(|entry| (key, entry))) {
        Some((key, entry)) => {
            if let Some(location) = fields.location {
                entry.location = Some(location.to_string());
            }
            if let Some(quantity) = fields.quantity {
                entry.quantity = quantity;
            }
            if let Some(room) = fields.room {
                entry.room = Some(room);
            }
            ItemOutcome::applied(format!(
                "Updated {key} in inventory. Location = {}, Quantity = {}{}.",
                entry.location.as_deref().unwrap_or("unspecified"),
                entry.quantity,
                entry
                    .room
                    .map(|room| format!(" Room: {room}"))
                    .unwrap_or_default()
            ))
        }
        // Update is an upsert.
        None => insert_new(collection, name, fields),
    }
}

pub(super) fn remove(
    collection: &mut InventoryCollection,
    names: &[String],
    quantity: Option<u32>,
) -> Vec<ItemOutcome> {
    names
        .iter()
        .map(|name| remove_one(collection, name, quantity))
        .collect()
}

fn remove_one(collection: &mut InventoryCollection, name: &str, quantity: Option<u32>) -> ItemOutcome {
    if is_last_entry_sentinel(name) {
        return match collection.pop_last() {
            Some((key, _)) => {
                ItemOutcome::applied(format!("Removed {key} (last entry) completely from inventory."))
            }
            None => ItemOutcome::empty("Inventory is empty."),
        };
    }

    let Some(key) = find_closest_key(name, collection.keys()).map(str::to_string) else {
        return ItemOutcome::not_found(format!("{name} not found in inventory."));
    };
    match collection.take_quantity(&key, quantity) {
        Some(QuantityChange::Removed) => {
            ItemOutcome::applied(format!("Removed {key} completely from inventory."))
        }
        Some(QuantityChange::Remaining(remaining)) => ItemOutcome::applied(format!(
            "Removed {} of {key}. Remaining = {remaining}",
            quantity.unwrap_or_default()
        )),
        None => ItemOutcome::not_found(format!("{name} not found in inventory.")),
    }
}

pub(super) fn query(collection: &InventoryCollection, names: &[String]) -> Vec<QueryStep> {
    names
        .iter()
        .map(|name| {
            let found = find_closest_key(name, collection.keys())
                .and_then(|key| collection.get(key).map(|entry| (key, entry)));
            match found {
                Some((key, entry)) => QueryStep::Answered(ItemOutcome::applied(format!(
                    "{key} is in {} (Qty: {})",
                    describe_place(entry),
                    entry.quantity
                ))),
                None => QueryStep::Unresolved,
            }
        })
        .collect()
}

fn describe_place(entry: &InventoryEntry) -> String {
    match (entry.location.as_deref(), entry.room) {
        (Some(location), Some(room)) => format!("{location}, {room}"),
        (Some(location), None) => location.to_string(),
        (None, Some(room)) => format!("the {room}"),
        (None, None) => "an unknown location".to_string(),
    }
}

pub(super) fn remove_last(collection: &mut InventoryCollection) -> ItemOutcome {
    match collection.pop_last() {
        Some((key, _)) => ItemOutcome::applied(format!("Removed last inventory item: {key}")),
        None => ItemOutcome::empty("Inventory is empty."),
    }
}
