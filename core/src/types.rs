//! Domain model for the to-do list.
//!
//! # Design
//! These are the types the store and the view work with. Wire shapes live in
//! `dto` and are mapped into these immediately after decoding, so server JSON
//! never travels past the gateway.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Number of items on one page. Fixed for every request and for the
/// bounded page the store keeps after local inserts.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// A single to-do item as confirmed by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    pub done: bool,
    pub priority: Priority,
    pub creation_date: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub done_date: Option<DateTime<Utc>>,
}

/// User-editable fields of an item, used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoForm {
    pub text: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

impl TodoForm {
    pub fn new(text: impl Into<String>, priority: Priority) -> Self {
        Self {
            text: text.into(),
            priority,
            due_date: None,
        }
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// One entry of a multi-field sort. Position in the containing `SortSpec`
/// is its tie-break precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub ascending: bool,
}

/// Ordered sort fields; a field appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    fields: Vec<SortField>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the direction of `field` in place, or append it ascending.
    pub fn toggle(&mut self, field: &str) {
        match self.fields.iter_mut().find(|s| s.field == field) {
            Some(existing) => existing.ascending = !existing.ascending,
            None => self.fields.push(SortField {
                field: field.to_string(),
                ascending: true,
            }),
        }
    }

    pub fn fields(&self) -> &[SortField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<SortField> for SortSpec {
    /// Later duplicates of a field are dropped.
    fn from_iter<I: IntoIterator<Item = SortField>>(iter: I) -> Self {
        let mut spec = SortSpec::new();
        for entry in iter {
            if !spec.fields.iter().any(|s| s.field == entry.field) {
                spec.fields.push(entry);
            }
        }
        spec
    }
}

/// Optional constraints on the listed items; `None` fields impose nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub text: Option<String>,
    pub priority: Option<Priority>,
    pub done: Option<bool>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.priority.is_none() && self.done.is_none()
    }
}

/// A page of results as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub last: bool,
}

/// Completion count and average completion time for one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionStats {
    pub count: u64,
    /// `MM:SS`; absent when nothing in the bucket was completed.
    pub avg_time: Option<String>,
}

/// Aggregate completion statistics, replaced wholesale on every refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub completed: CompletionStats,
    pub low: CompletionStats,
    pub medium: CompletionStats,
    pub high: CompletionStats,
}

impl Stats {
    pub fn for_priority(&self, priority: Priority) -> &CompletionStats {
        match priority {
            Priority::Low => &self.low,
            Priority::Medium => &self.medium,
            Priority::High => &self.high,
        }
    }
}
