//! In-memory gateway for store and coordinator tests.
//!
//! Behaves like a tiny backend over a list of items, records every call,
//! and yields once per call so `tokio::join!` can interleave operations.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::error::ApiError;
use crate::gateway::TodoGateway;
use crate::types::{CompletionStats, Page, Priority, Stats, TodoForm, TodoItem, PAGE_SIZE};

pub(crate) fn item(id: &str) -> TodoItem {
    TodoItem {
        id: id.to_string(),
        text: "Test".to_string(),
        done: false,
        priority: Priority::Low,
        creation_date: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        due_date: None,
        done_date: None,
    }
}

#[derive(Default)]
pub(crate) struct ScriptedGateway {
    items: Mutex<Vec<TodoItem>>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, ApiError>>,
    next_id: Mutex<u32>,
    delay: Option<Duration>,
}

impl ScriptedGateway {
    pub(crate) fn with_items(items: Vec<TodoItem>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Default::default()
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make every later call to `op` fail with `err`.
    pub(crate) fn fail(&self, op: &'static str, err: ApiError) {
        self.failures.lock().unwrap().insert(op, err);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, op: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.split(' ').next() == Some(op))
            .count()
    }

    async fn record(&self, op: &'static str, detail: &str) -> Result<(), ApiError> {
        let entry = if detail.is_empty() {
            op.to_string()
        } else {
            format!("{op} {detail}")
        };
        self.calls.lock().unwrap().push(entry);
        match self.delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
        match self.failures.lock().unwrap().get(op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn modify(&self, id: &str, f: impl FnOnce(&mut TodoItem)) -> Result<TodoItem, ApiError> {
        let mut items = self.items.lock().unwrap();
        let found = items.iter_mut().find(|i| i.id == id).ok_or_else(|| not_found(id))?;
        f(found);
        Ok(found.clone())
    }
}

fn not_found(id: &str) -> ApiError {
    ApiError::Server {
        status: 404,
        message: format!("To Do not found with id {id}"),
    }
}

fn bucket<'a>(done: impl Iterator<Item = &'a TodoItem>) -> CompletionStats {
    let count = done.count() as u64;
    CompletionStats {
        count,
        avg_time: (count > 0).then(|| "01:00".to_string()),
    }
}

#[async_trait]
impl TodoGateway for ScriptedGateway {
    async fn list_items(&self, query: &str) -> Result<Page<TodoItem>, ApiError> {
        self.record("list_items", query).await?;
        let page: u32 = query
            .trim_start_matches('?')
            .split('&')
            .find_map(|pair| pair.strip_prefix("page="))
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        let items = self.items.lock().unwrap();
        let total = items.len();
        let total_pages = total.div_ceil(PAGE_SIZE) as u32;
        Ok(Page {
            content: items
                .iter()
                .skip(page as usize * PAGE_SIZE)
                .take(PAGE_SIZE)
                .cloned()
                .collect(),
            total_elements: total as u64,
            total_pages,
            last: page + 1 >= total_pages,
        })
    }

    async fn create_item(&self, form: &TodoForm) -> Result<TodoItem, ApiError> {
        self.record("create_item", "").await?;
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("new-{next}")
        };
        let created = TodoItem {
            id,
            text: form.text.clone(),
            done: false,
            priority: form.priority,
            creation_date: Utc::now(),
            due_date: form.due_date,
            done_date: None,
        };
        self.items.lock().unwrap().insert(0, created.clone());
        Ok(created)
    }

    async fn update_item(&self, id: &str, form: &TodoForm) -> Result<TodoItem, ApiError> {
        self.record("update_item", id).await?;
        self.modify(id, |i| {
            i.text = form.text.clone();
            i.priority = form.priority;
            i.due_date = form.due_date;
        })
    }

    async fn delete_item(&self, id: &str) -> Result<(), ApiError> {
        self.record("delete_item", id).await?;
        let mut items = self.items.lock().unwrap();
        let pos = items.iter().position(|i| i.id == id).ok_or_else(|| not_found(id))?;
        items.remove(pos);
        Ok(())
    }

    async fn complete_item(&self, id: &str) -> Result<TodoItem, ApiError> {
        self.record("complete_item", id).await?;
        self.modify(id, |i| {
            i.done = true;
            i.done_date.get_or_insert_with(Utc::now);
        })
    }

    async fn uncomplete_item(&self, id: &str) -> Result<TodoItem, ApiError> {
        self.record("uncomplete_item", id).await?;
        self.modify(id, |i| {
            i.done = false;
            i.done_date = None;
        })
    }

    async fn fetch_stats(&self) -> Result<Stats, ApiError> {
        self.record("fetch_stats", "").await?;
        let items = self.items.lock().unwrap();
        let done = || items.iter().filter(|i| i.done);
        Ok(Stats {
            completed: bucket(done()),
            low: bucket(done().filter(|i| i.priority == Priority::Low)),
            medium: bucket(done().filter(|i| i.priority == Priority::Medium)),
            high: bucket(done().filter(|i| i.priority == Priority::High)),
        })
    }
}
