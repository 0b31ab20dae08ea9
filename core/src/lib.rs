//! Client-side state synchronization for a paged to-do list.
//!
//! # Overview
//! `TodoStore` owns the list state (current page, sort, filter, request
//! status, last error, stats) and keeps it in sync with a REST backend
//! through a `TodoGateway`. Views issue commands to the store and render
//! `TodoStore::snapshot`.
//!
//! # Design
//! - `TodoClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network; a `Transport` performs the I/O.
//!   `HttpGateway` joins the two.
//! - Wire DTOs (`dto`) are mapped into domain types (`types`) inside the
//!   gateway, so server JSON never reaches the store.
//! - One in-flight operation at a time: the store's `status` flag is checked
//!   synchronously before each dispatch and overlapping calls are declined.
//! - Composite operations (`coordinator`) run a mutation, then always a
//!   stats refresh.

pub mod client;
pub mod coordinator;
pub mod dto;
pub mod error;
pub mod gateway;
pub mod http;
pub mod query;
pub mod state;
pub mod store;
pub mod transport;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use client::TodoClient;
pub use coordinator::CompositeOutcome;
pub use error::{ApiError, ValidationError};
pub use gateway::{HttpGateway, TodoGateway};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::build_query;
pub use state::{Pagination, RequestStatus, ToDoListState};
pub use store::{Outcome, TodoStore};
pub use transport::{Transport, UreqTransport};
pub use types::{
    CompletionStats, FilterSpec, Page, Priority, SortField, SortSpec, Stats, TodoForm, TodoItem,
    PAGE_SIZE,
};
