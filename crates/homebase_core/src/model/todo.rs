//! Date-keyed todo list model.
//!
//! # Responsibility
//! - Group task strings into buckets keyed by calendar date.
//! - Order buckets chronologically, independent of the persisted key text.
//!
//! # Invariants
//! - Date keys use the `DD-MM-YYYY` format on the wire.
//! - A bucket is created on first add and never removed automatically, even
//!   when it becomes empty.

use crate::model::ModelValidationError;
use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const TODO_DATE_FORMAT: &str = "%d-%m-%Y";

/// Calendar date used as a todo bucket key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TodoDate(NaiveDate);

impl TodoDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for TodoDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl FromStr for TodoDate {
    type Err = ModelValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        NaiveDate::parse_from_str(trimmed, TODO_DATE_FORMAT)
            .map(Self)
            .map_err(|_| ModelValidationError::InvalidDate(trimmed.to_string()))
    }
}

impl Display for TodoDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(TODO_DATE_FORMAT))
    }
}

impl Serialize for TodoDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TodoDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// Position of one task inside the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRef {
    pub date: TodoDate,
    pub index: usize,
}

/// Todo snapshot: chronologically ordered date buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoCollection {
    buckets: BTreeMap<TodoDate, Vec<String>>,
}

impl TodoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buckets, empty ones included.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of tasks across all buckets.
    pub fn task_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn has_bucket(&self, date: TodoDate) -> bool {
        self.buckets.contains_key(&date)
    }

    /// Tasks for one date; empty when the bucket is missing.
    pub fn tasks(&self, date: TodoDate) -> &[String] {
        self.buckets.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Buckets in chronological order.
    pub fn buckets(&self) -> impl Iterator<Item = (TodoDate, &[String])> {
        self.buckets
            .iter()
            .map(|(date, tasks)| (*date, tasks.as_slice()))
    }

    /// Appends one task, creating the bucket on first use.
    pub fn push(&mut self, date: TodoDate, task: impl Into<String>) {
        self.buckets.entry(date).or_default().push(task.into());
    }

    pub fn task(&self, task_ref: TaskRef) -> Option<&str> {
        self.buckets
            .get(&task_ref.date)
            .and_then(|tasks| tasks.get(task_ref.index))
            .map(String::as_str)
    }

    /// Removes one task; its bucket is kept.
    pub fn remove(&mut self, task_ref: TaskRef) -> Option<String> {
        let tasks = self.buckets.get_mut(&task_ref.date)?;
        if task_ref.index < tasks.len() {
            Some(tasks.remove(task_ref.index))
        } else {
            None
        }
    }

    /// Pops the last task of the latest non-empty bucket.
    pub fn pop_latest(&mut self) -> Option<(TodoDate, String)> {
        let (date, tasks) = self
            .buckets
            .iter_mut()
            .rev()
            .find(|(_, tasks)| !tasks.is_empty())?;
        let task = tasks.pop()?;
        Some((*date, task))
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskRef, TodoCollection, TodoDate};
    use crate::model::ModelValidationError;

    fn date(raw: &str) -> TodoDate {
        raw.parse().expect("valid test date")
    }

    #[test]
    fn parses_and_formats_day_month_year() {
        let parsed = date("07-03-2025");
        assert_eq!(parsed.to_string(), "07-03-2025");
        assert_eq!(
            "2025-03-07".parse::<TodoDate>(),
            Err(ModelValidationError::InvalidDate("2025-03-07".to_string()))
        );
    }

    #[test]
    fn buckets_are_chronological_not_lexicographic() {
        let mut todo = TodoCollection::new();
        todo.push(date("31-01-2025"), "pay rent");
        todo.push(date("01-02-2025"), "call plumber");

        let (latest, task) = todo.pop_latest().expect("latest task");
        assert_eq!(latest, date("01-02-2025"));
        assert_eq!(task, "call plumber");
    }

    #[test]
    fn pop_latest_skips_emptied_buckets_and_keeps_them() {
        let mut todo = TodoCollection::new();
        todo.push(date("01-01-2025"), "a");
        todo.push(date("02-01-2025"), "b");
        todo.remove(TaskRef {
            date: date("02-01-2025"),
            index: 0,
        });

        assert_eq!(todo.pop_latest(), Some((date("01-01-2025"), "a".to_string())));
        assert_eq!(todo.bucket_count(), 2);
        assert_eq!(todo.pop_latest(), None);
    }

    #[test]
    fn serializes_as_date_keyed_map() {
        let mut todo = TodoCollection::new();
        todo.push(date("05-06-2025"), "water plants");
        let json = serde_json::to_value(&todo).expect("serialize todo");
        assert_eq!(json, serde_json::json!({"05-06-2025": ["water plants"]}));

        let restored: TodoCollection = serde_json::from_value(json).expect("deserialize todo");
        assert_eq!(restored, todo);
    }
}
