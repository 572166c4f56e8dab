//! Shopping handlers. Unlike inventory, update never upserts: a miss is
//! reported and the list is left alone.

use super::{is_last_entry_sentinel, ItemOutcome, QueryStep};
use crate::matching::{find_closest_key, find_exact_key};
use crate::model::inventory::QuantityChange;
use crate::model::shopping::{ShoppingCollection, ShoppingEntry};

/// Index of the line whose name equals `key`.
fn index_of(collection: &ShoppingCollection, key: Option<&str>) -> Option<usize> {
    key.and_then(|key| collection.position(key))
}

pub(super) fn add(
    collection: &mut ShoppingCollection,
    names: &[String],
    quantity: Option<u32>,
) -> Vec<ItemOutcome> {
    let amount = quantity.unwrap_or(1);
    names
        .iter()
        .map(|name| {
            let existing = index_of(collection, find_exact_key(name, collection.item_names()));
            match existing.and_then(|index| collection.get_mut(index)) {
                Some(entry) => {
                    entry.quantity = entry.quantity.saturating_add(amount);
                    ItemOutcome::applied(format!(
                        "Updated {} in shopping list. Quantity = {}.",
                        entry.item, entry.quantity
                    ))
                }
                None => {
                    collection.push(ShoppingEntry::new(name.as_str(), amount));
                    ItemOutcome::applied(format!("Added {name} to shopping list."))
                }
            }
        })
        .collect()
}

pub(super) fn update(
    collection: &mut ShoppingCollection,
    names: &[String],
    quantity: Option<u32>,
) -> Vec<ItemOutcome> {
    names
        .iter()
        .map(|name| {
            let matched = index_of(collection, find_closest_key(name, collection.item_names()));
            match matched.and_then(|index| collection.get_mut(index)) {
                Some(entry) => {
                    if let Some(quantity) = quantity {
                        entry.quantity = quantity;
                    }
                    ItemOutcome::applied(format!(
                        "Updated {} in shopping list. Quantity = {}.",
                        entry.item, entry.quantity
                    ))
                }
                None => ItemOutcome::not_found(format!("{name} not found in shopping list.")),
            }
        })
        .collect()
}

pub(super) fn remove(
    collection: &mut ShoppingCollection,
    names: &[String],
    quantity: Option<u32>,
) -> Vec<ItemOutcome> {
    names
        .iter()
        .map(|name| remove_one(collection, name, quantity))
        .collect()
}

fn remove_one(collection: &mut ShoppingCollection, name: &str, quantity: Option<u32>) -> ItemOutcome {
    if is_last_entry_sentinel(name) {
        return remove_last(collection);
    }

    let Some(index) = index_of(collection, find_closest_key(name, collection.item_names())) else {
        return ItemOutcome::not_found(format!("{name} not found in shopping list."));
    };
    let item = collection
        .get(index)
        .map(|entry| entry.item.clone())
        .unwrap_or_default();
    match collection.take_quantity(index, quantity) {
        Some(QuantityChange::Removed) => {
            ItemOutcome::applied(format!("Removed {item} from shopping list."))
        }
        Some(QuantityChange::Remaining(remaining)) => ItemOutcome::applied(format!(
            "Removed {} of {item}. Remaining = {remaining}",
            quantity.unwrap_or_default()
        )),
        None => ItemOutcome::not_found(format!("{name} not found in shopping list.")),
    }
}

/// Exact lookups by name, or the whole list when no name is given.
pub(super) fn query(collection: &ShoppingCollection, names: &[String]) -> Vec<QueryStep> {
    if names.is_empty() {
        if collection.is_empty() {
            return vec![QueryStep::Unresolved];
        }
        return collection
            .entries()
            .iter()
            .map(|entry| QueryStep::Answered(render(entry)))
            .collect();
    }

    names
        .iter()
        .map(|name| {
            index_of(collection, find_exact_key(name, collection.item_names()))
                .and_then(|index| collection.get(index))
                .map_or(QueryStep::Unresolved, |entry| QueryStep::Answered(render(entry)))
        })
        .collect()
}

fn render(entry: &ShoppingEntry) -> ItemOutcome {
    ItemOutcome::applied(format!("{} x{}", entry.item, entry.quantity))
}

pub(super) fn remove_last(collection: &mut ShoppingCollection) -> ItemOutcome {
    match collection.pop_last() {
        Some(entry) => ItemOutcome::applied(format!("Removed last shopping item: {}", entry.item)),
        None => ItemOutcome::empty("Shopping list is empty."),
    }
}

#[cfg(test)]
mod tests {
    use super::{add, query, remove, update};
    use crate::model::shopping::{ShoppingCollection, ShoppingEntry};
    use crate::service::{ItemStatus, QueryStep};

    fn list(entries: &[(&str, u32)]) -> ShoppingCollection {
        let mut collection = ShoppingCollection::new();
        for (item, quantity) in entries {
            collection.push(ShoppingEntry::new(*item, *quantity));
        }
        collection
    }

    #[test]
    fn add_merges_duplicate_names() {
        let mut collection = list(&[("Milk", 1)]);
        let outcomes = add(&mut collection, &["milk".to_string()], Some(2));
        assert_eq!(outcomes[0].message, "Updated Milk in shopping list. Quantity = 3.");
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn update_without_quantity_keeps_line() {
        let mut collection = list(&[("bread", 2)]);
        let outcomes = update(&mut collection, &["breads".to_string()], None);
        assert_eq!(outcomes[0].status, ItemStatus::Applied);
        assert_eq!(collection.get(0).unwrap().quantity, 2);
    }

    #[test]
    fn remove_decrements_then_deletes() {
        let mut collection = list(&[("apples", 6)]);
        let first = remove(&mut collection, &["apples".to_string()], Some(2));
        assert_eq!(first[0].message, "Removed 2 of apples. Remaining = 4");
        let second = remove(&mut collection, &["apples".to_string()], Some(9));
        assert_eq!(second[0].message, "Removed apples from shopping list.");
        assert!(collection.is_empty());
    }

    #[test]
    fn query_without_names_lists_everything() {
        let collection = list(&[("eggs", 12), ("tea", 1)]);
        let steps = query(&collection, &[]);
        let rendered: Vec<String> = steps
            .into_iter()
            .map(|step| match step {
                QueryStep::Answered(outcome) => outcome.message,
                QueryStep::Unresolved => "unresolved".to_string(),
            })
            .collect();
        assert_eq!(rendered, vec!["eggs x12", "tea x1"]);
        assert_eq!(query(&ShoppingCollection::new(), &[]), vec![QueryStep::Unresolved]);
    }

    #[test]
    fn query_by_name_is_exact() {
        let collection = list(&[("eggs", 12)]);
        assert_eq!(
            query(&collection, &["egg".to_string()]),
            vec![QueryStep::Unresolved]
        );
    }
}
