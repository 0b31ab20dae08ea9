//! Wire DTOs for the to-do REST API.
//!
//! # Design
//! These types mirror the JSON the backend speaks: camelCase field names,
//! and dates either as `YYYY-MM-DD HH:MM:SS` (read as UTC) or RFC 3339.
//! Due dates may also arrive date-only. They are defined separately
//! from the mock server's own types; integration tests catch schema drift.
//! Each response DTO has a `From` impl into its domain counterpart in
//! `types`, and `TodoClient` applies it right after decoding.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::types::{CompletionStats, Page, Priority, Stats, TodoForm, TodoItem};

/// A to-do item as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoDto {
    pub id: String,
    pub text: String,
    pub done: bool,
    pub priority: Priority,
    #[serde(deserialize_with = "timestamp")]
    pub creation_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "optional_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub done_date: Option<DateTime<Utc>>,
}

/// Zone-less layouts, taken as UTC.
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

fn naive_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| naive_timestamp(raw).map(|t| t.and_utc()))
}

/// The calendar date as written, whatever the time part says.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| naive_timestamp(raw).map(|t| t.date()))
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|t| t.date_naive()))
}

fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
}

fn optional_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}"))),
    }
}

fn optional_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_date(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date: {raw}"))),
    }
}

impl From<TodoDto> for TodoItem {
    fn from(dto: TodoDto) -> Self {
        TodoItem {
            id: dto.id,
            text: dto.text,
            done: dto.done,
            priority: dto.priority,
            creation_date: dto.creation_date,
            due_date: dto.due_date,
            done_date: dto.done_date,
        }
    }
}

/// Paged list response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageDto {
    pub content: Vec<TodoDto>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub last: bool,
}

impl From<PageDto> for Page<TodoItem> {
    fn from(dto: PageDto) -> Self {
        Page {
            content: dto.content.into_iter().map(TodoItem::from).collect(),
            total_elements: dto.total_elements,
            total_pages: dto.total_pages,
            last: dto.last,
        }
    }
}

/// Request body for `POST /todos` and `PUT /todos/{id}`. `dueDate` is always
/// present, `null` when unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoFormDto {
    pub text: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

impl From<&TodoForm> for TodoFormDto {
    fn from(form: &TodoForm) -> Self {
        TodoFormDto {
            text: form.text.clone(),
            priority: form.priority,
            due_date: form.due_date,
        }
    }
}

/// Raw aggregate payload of `GET /todos/stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsPayload {
    #[serde(default)]
    pub total_done: u64,
    #[serde(default)]
    pub average_done_time: Option<String>,
    #[serde(default)]
    pub total_low_done: u64,
    #[serde(default)]
    pub average_low_done_time: Option<String>,
    #[serde(default)]
    pub total_medium_done: u64,
    #[serde(default)]
    pub average_medium_done_time: Option<String>,
    #[serde(default)]
    pub total_high_done: u64,
    #[serde(default)]
    pub average_high_done_time: Option<String>,
}

/// Empty strings mean "no completions in this bucket".
fn bucket(count: u64, avg_time: Option<String>) -> CompletionStats {
    CompletionStats {
        count,
        avg_time: avg_time.filter(|t| !t.trim().is_empty()),
    }
}

impl From<StatsPayload> for Stats {
    fn from(raw: StatsPayload) -> Self {
        Stats {
            completed: bucket(raw.total_done, raw.average_done_time),
            low: bucket(raw.total_low_done, raw.average_low_done_time),
            medium: bucket(raw.total_medium_done, raw.average_medium_done_time),
            high: bucket(raw.total_high_done, raw.average_high_done_time),
        }
    }
}

/// Error body shapes the backend sends with 4xx/5xx statuses.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Error { error: String },
    Message { message: String },
    Fields(serde_json::Map<String, serde_json::Value>),
}

/// Best-effort human-readable message from a failure response body.
pub(crate) fn server_message(status: u16, body: &str) -> String {
    let fallback = || format!("request failed with status code {status}");
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Error { error }) => error,
        Ok(ErrorBody::Message { message }) => message,
        Ok(ErrorBody::Fields(fields)) => fields
            .iter()
            .find_map(|(field, value)| value.as_str().map(|msg| format!("{field}: {msg}")))
            .unwrap_or_else(fallback),
        Err(_) if !body.trim().is_empty() && body.len() <= 200 => body.trim().to_string(),
        Err(_) => fallback(),
    }
}
