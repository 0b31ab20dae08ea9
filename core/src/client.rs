//! Stateless HTTP request builder and response parser for the to-do API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse` and
//! returns domain types. Executing the round-trip is the `Transport`'s job.

use percent_encoding::utf8_percent_encode;

use crate::dto::{server_message, PageDto, StatsPayload, TodoDto, TodoFormDto};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::QUERY_VALUE;
use crate::types::{Page, Stats, TodoForm, TodoItem};

#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `query` is the output of `query::build_query`, leading `?` included.
    pub fn build_list_items(&self, query: &str) -> HttpRequest {
        self.bare(HttpMethod::Get, format!("{}/todos{query}", self.base_url))
    }

    pub fn build_fetch_stats(&self) -> HttpRequest {
        self.bare(HttpMethod::Get, format!("{}/todos/stats", self.base_url))
    }

    pub fn build_create_item(&self, form: &TodoForm) -> Result<HttpRequest, ApiError> {
        self.with_form(HttpMethod::Post, format!("{}/todos", self.base_url), form)
    }

    pub fn build_update_item(&self, id: &str, form: &TodoForm) -> Result<HttpRequest, ApiError> {
        self.with_form(HttpMethod::Put, self.item_url(id, ""), form)
    }

    pub fn build_complete_item(&self, id: &str) -> HttpRequest {
        self.bare(HttpMethod::Put, self.item_url(id, "/done"))
    }

    pub fn build_uncomplete_item(&self, id: &str) -> HttpRequest {
        self.bare(HttpMethod::Put, self.item_url(id, "/undone"))
    }

    pub fn build_delete_item(&self, id: &str) -> HttpRequest {
        self.bare(HttpMethod::Delete, self.item_url(id, ""))
    }

    pub fn parse_list_items(&self, response: HttpResponse) -> Result<Page<TodoItem>, ApiError> {
        check_status(&response)?;
        decode::<PageDto>(&response).map(Page::from)
    }

    pub fn parse_fetch_stats(&self, response: HttpResponse) -> Result<Stats, ApiError> {
        check_status(&response)?;
        decode::<StatsPayload>(&response).map(Stats::from)
    }

    /// Shared by create, update, complete and uncomplete: all answer with the
    /// server-confirmed item.
    pub fn parse_item(&self, response: HttpResponse) -> Result<TodoItem, ApiError> {
        check_status(&response)?;
        decode::<TodoDto>(&response).map(TodoItem::from)
    }

    /// Any 2xx counts as deleted; the body is ignored.
    pub fn parse_delete_item(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    /// Ids are opaque, so they are escaped as one path segment.
    fn item_url(&self, id: &str, suffix: &str) -> String {
        format!(
            "{}/todos/{}{suffix}",
            self.base_url,
            utf8_percent_encode(id, QUERY_VALUE)
        )
    }

    fn bare(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_form(&self, method: HttpMethod, path: String, form: &TodoForm) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(&TodoFormDto::from(form))
            .map_err(|e| ApiError::Client(format!("failed to encode request: {e}")))?;
        Ok(HttpRequest {
            method,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

/// Map non-2xx responses to `ApiError::Server` with the server's message.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Server {
        status: response.status,
        message: server_message(response.status, &response.body),
    })
}

fn decode<T: serde::de::DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body)
        .map_err(|e| ApiError::Client(format!("failed to decode response: {e}")))
}
