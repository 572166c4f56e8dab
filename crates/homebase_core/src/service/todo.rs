//! Todo handlers. Tasks are plain text in date buckets; buckets are created
//! on first add and kept when emptied.

use super::{ItemOutcome, QueryStep};
use crate::matching::{find_closest_key, similarity, FUZZY_MATCH_CUTOFF};
use crate::model::todo::{TaskRef, TodoCollection, TodoDate};

pub(super) fn add(collection: &mut TodoCollection, tasks: &[String], date: TodoDate) -> Vec<ItemOutcome> {
    tasks
        .iter()
        .map(|task| {
            collection.push(date, task.as_str());
            ItemOutcome::applied(format!("Added task '{task}' for {date}"))
        })
        .collect()
}

/// Moves each matched task to `date`.
pub(super) fn reschedule(
    collection: &mut TodoCollection,
    tasks: &[String],
    date: TodoDate,
) -> Vec<ItemOutcome> {
    tasks
        .iter()
        .map(|query| {
            let Some(task_ref) = closest_task(collection, query) else {
                return ItemOutcome::not_found(format!("'{query}' not found in todo list."));
            };
            match collection.remove(task_ref) {
                Some(task) => {
                    collection.push(date, task.as_str());
                    ItemOutcome::applied(format!(
                        "Moved task '{task}' from {} to {date}",
                        task_ref.date
                    ))
                }
                None => ItemOutcome::not_found(format!("'{query}' not found in todo list.")),
            }
        })
        .collect()
}

/// Best fuzzy match across every bucket; ties keep the earliest date, then
/// the earliest position.
fn closest_task(collection: &TodoCollection, query: &str) -> Option<TaskRef> {
    let mut best: Option<(TaskRef, f32)> = None;
    for (date, tasks) in collection.buckets() {
        for (index, task) in tasks.iter().enumerate() {
            let score = similarity(query, task);
            if score < FUZZY_MATCH_CUTOFF {
                continue;
            }
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((TaskRef { date, index }, score));
            }
        }
    }
    best.map(|(task_ref, _)| task_ref)
}

pub(super) fn remove(collection: &mut TodoCollection, tasks: &[String], date: TodoDate) -> Vec<ItemOutcome> {
    tasks
        .iter()
        .map(|query| {
            let bucket = collection.tasks(date);
            let index = find_closest_key(query, bucket.iter().map(String::as_str))
                .and_then(|matched| bucket.iter().position(|task| task == matched));
            match index.and_then(|index| collection.remove(TaskRef { date, index })) {
                Some(task) => ItemOutcome::applied(format!("Removed task '{task}' from {date}")),
                None => ItemOutcome::not_found(format!("'{query}' not found in todo list for {date}.")),
            }
        })
        .collect()
}

pub(super) fn query(collection: &TodoCollection, date: TodoDate) -> Vec<QueryStep> {
    let tasks = collection.tasks(date);
    if tasks.is_empty() {
        return vec![QueryStep::Unresolved];
    }
    tasks
        .iter()
        .map(|task| QueryStep::Answered(ItemOutcome::applied(task.as_str())))
        .collect()
}

pub(super) fn remove_last(collection: &mut TodoCollection) -> ItemOutcome {
    match collection.pop_latest() {
        Some((_, task)) => ItemOutcome::applied(format!("Removed last todo: {task}")),
        None => ItemOutcome::empty("Todo list is empty."),
    }
}
