//! The to-do store: owns the list state and runs the asynchronous
//! operations that keep it in sync with the backend.
//!
//! # Design
//! - The state sits behind a mutex that is only ever held for one
//!   synchronous transition, never across an `.await`. Synchronous mutators
//!   therefore apply before they return, and a fetch issued afterwards reads
//!   what they wrote.
//! - `status` is the in-flight flag for the whole list. Every asynchronous
//!   operation checks it synchronously before dispatching; if something is
//!   already loading the call is declined (not queued, not retried).
//! - The flag is held by an `InFlight` guard that always returns it to
//!   `Idle`: on settle, or on drop if the future is abandoned mid-request.
//! - Failures are recorded as a display string in `error`. The previous
//!   items and pagination are left untouched.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Local;
use tracing::{debug, warn};

use crate::error::{ApiError, ValidationError};
use crate::gateway::TodoGateway;
use crate::query::build_query;
use crate::state::{RequestStatus, ToDoListState};
use crate::types::{FilterSpec, Stats, TodoForm, TodoItem};
use crate::validation::{validate_form, validate_text};

/// How an asynchronous store operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The server confirmed the operation and the state was updated.
    Applied,
    /// The gateway reported an error; it is now in `error`.
    Failed,
    /// Another operation was in flight, so nothing was sent.
    Declined,
    /// The form failed validation, so nothing was sent.
    Rejected,
}

pub struct TodoStore<G> {
    gateway: G,
    state: Mutex<ToDoListState>,
}

impl<G: TodoGateway> TodoStore<G> {
    pub fn new(gateway: G) -> Self {
        Self::with_state(gateway, ToDoListState::new())
    }

    pub fn with_state(gateway: G, state: ToDoListState) -> Self {
        Self {
            gateway,
            state: Mutex::new(state),
        }
    }

    /// Tear the store down, handing back the final state.
    pub fn into_state(self) -> ToDoListState {
        self.state.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// A copy of the current state for rendering.
    pub fn snapshot(&self) -> ToDoListState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, ToDoListState> {
        lock(&self.state)
    }

    // ----------------------------------------------------------------------
    // Synchronous mutators
    // ----------------------------------------------------------------------

    pub fn set_current_page(&self, page: u32) {
        self.lock().set_current_page(page);
    }

    pub fn set_sort_field(&self, field: &str) {
        self.lock().set_sort_field(field);
    }

    pub fn set_filter(&self, filter: Option<FilterSpec>) {
        self.lock().set_filter(filter);
    }

    pub fn upsert_item(&self, item: TodoItem) {
        self.lock().upsert_item(item);
    }

    pub fn remove_item(&self, id: &str) {
        self.lock().remove_item(id);
    }

    pub fn set_stats(&self, raw: impl Into<Stats>) {
        self.lock().set_stats(raw);
    }

    pub fn clear_error(&self) {
        self.lock().clear_error();
    }

    // ----------------------------------------------------------------------
    // Asynchronous operations
    // ----------------------------------------------------------------------

    /// Fetch the page selected by the current pagination, sort and filter.
    ///
    /// A page past the end is answered with the last page instead, fetched
    /// under the same in-flight flag.
    pub async fn fetch_list(&self) -> Outcome {
        let Some(flight) = self.begin("fetch_list") else {
            return Outcome::Declined;
        };
        let (page, sort_by, filter_by) = {
            let state = self.lock();
            (
                state.pagination.current_page,
                state.sort_by.clone(),
                state.filter_by.clone(),
            )
        };
        let mut result = self
            .gateway
            .list_items(&build_query(page, &sort_by, filter_by.as_ref()))
            .await;
        if let Ok(fetched) = &result {
            if fetched.total_pages > 0 && page >= fetched.total_pages {
                let last = fetched.total_pages - 1;
                debug!(requested = page, last, "page out of range, loading last page");
                result = self
                    .gateway
                    .list_items(&build_query(last, &sort_by, filter_by.as_ref()))
                    .await;
            }
        }
        flight.settle(result, ToDoListState::apply_page)
    }

    pub async fn create_item(&self, form: &TodoForm) -> Outcome {
        if let Err(err) = validate_form(form, Local::now().date_naive()) {
            return self.reject(err);
        }
        let Some(flight) = self.begin("create_item") else {
            return Outcome::Declined;
        };
        let result = self.gateway.create_item(form).await;
        flight.settle(result, ToDoListState::upsert_item)
    }

    /// The due date is checked against the item's creation date when the
    /// item is on the current page; otherwise only the text is checked here
    /// and the server has the final word.
    pub async fn update_item(&self, id: &str, form: &TodoForm) -> Outcome {
        let creation = self
            .lock()
            .items
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.creation_date.date_naive());
        let checked = match creation {
            Some(creation) => validate_form(form, creation),
            None => validate_text(form),
        };
        if let Err(err) = checked {
            return self.reject(err);
        }
        let Some(flight) = self.begin("update_item") else {
            return Outcome::Declined;
        };
        let result = self.gateway.update_item(id, form).await;
        flight.settle(result, ToDoListState::upsert_item)
    }

    /// Complete an open item or reopen a done one. The server decides the
    /// resulting `done`/`done_date`.
    pub async fn toggle_item(&self, item: &TodoItem) -> Outcome {
        let Some(flight) = self.begin("toggle_item") else {
            return Outcome::Declined;
        };
        let result = if item.done {
            self.gateway.uncomplete_item(&item.id).await
        } else {
            self.gateway.complete_item(&item.id).await
        };
        flight.settle(result, ToDoListState::upsert_item)
    }

    pub async fn delete_item(&self, id: &str) -> Outcome {
        let Some(flight) = self.begin("delete_item") else {
            return Outcome::Declined;
        };
        let result = self.gateway.delete_item(id).await;
        flight.settle(result, |state, ()| state.remove_item(id))
    }

    pub async fn fetch_stats(&self) -> Outcome {
        let Some(flight) = self.begin("fetch_stats") else {
            return Outcome::Declined;
        };
        let result = self.gateway.fetch_stats().await;
        flight.settle(result, |state, stats| state.set_stats(stats))
    }

    /// Claim the in-flight flag, or `None` if another operation holds it.
    fn begin(&self, op: &'static str) -> Option<InFlight<'_>> {
        let mut state = self.lock();
        if !state.is_idle() {
            debug!(op, "declined: another operation is in flight");
            return None;
        }
        state.status = RequestStatus::Loading;
        debug!(op, "started");
        Some(InFlight {
            state: &self.state,
            op,
            settled: false,
        })
    }

    fn reject(&self, err: ValidationError) -> Outcome {
        warn!(error = %err, "form rejected");
        self.lock().error = Some(err.to_string());
        Outcome::Rejected
    }
}

fn lock(state: &Mutex<ToDoListState>) -> MutexGuard<'_, ToDoListState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds `status == Loading` for one operation.
struct InFlight<'a> {
    state: &'a Mutex<ToDoListState>,
    op: &'static str,
    settled: bool,
}

impl InFlight<'_> {
    /// Release the flag and record the result in one transition.
    fn settle<T>(
        mut self,
        result: Result<T, ApiError>,
        apply: impl FnOnce(&mut ToDoListState, T),
    ) -> Outcome {
        self.settled = true;
        let mut state = lock(self.state);
        state.status = RequestStatus::Idle;
        match result {
            Ok(value) => {
                apply(&mut *state, value);
                debug!(op = self.op, "applied");
                Outcome::Applied
            }
            Err(err) => {
                warn!(op = self.op, error = %err, "failed");
                state.error = Some(err.to_string());
                Outcome::Failed
            }
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = lock(self.state);
        if state.status == RequestStatus::Loading {
            state.status = RequestStatus::Idle;
            debug!(op = self.op, "abandoned before settling");
        }
    }
}
