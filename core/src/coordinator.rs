//! Composite operations: a list operation followed by a stats refresh.
//!
//! Each composite awaits its first step to settle, then always runs
//! `fetch_stats`, whatever the first step's outcome. There is no extra guard:
//! a declined first step still lets the stats refresh try its luck.

use crate::gateway::TodoGateway;
use crate::store::{Outcome, TodoStore};
use crate::types::{TodoForm, TodoItem};

/// Outcomes of both steps of a composite operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeOutcome {
    pub first: Outcome,
    pub stats: Outcome,
}

impl<G: TodoGateway> TodoStore<G> {
    /// Initial page load.
    pub async fn fetch_list_and_stats(&self) -> CompositeOutcome {
        let first = self.fetch_list().await;
        self.then_refresh_stats(first).await
    }

    pub async fn create_item_and_refresh_stats(&self, form: &TodoForm) -> CompositeOutcome {
        let first = self.create_item(form).await;
        self.then_refresh_stats(first).await
    }

    pub async fn update_item_and_refresh_stats(&self, id: &str, form: &TodoForm) -> CompositeOutcome {
        let first = self.update_item(id, form).await;
        self.then_refresh_stats(first).await
    }

    pub async fn toggle_item_and_refresh_stats(&self, item: &TodoItem) -> CompositeOutcome {
        let first = self.toggle_item(item).await;
        self.then_refresh_stats(first).await
    }

    pub async fn delete_item_and_refresh_stats(&self, id: &str) -> CompositeOutcome {
        let first = self.delete_item(id).await;
        self.then_refresh_stats(first).await
    }

    async fn then_refresh_stats(&self, first: Outcome) -> CompositeOutcome {
        let stats = self.fetch_stats().await;
        CompositeOutcome { first, stats }
    }
}
