//! Remote data gateway: the store's only way to reach the backend.
//!
//! `HttpGateway` pairs the request builder with a `Transport`. It keeps no
//! state between calls, and every failure it reports is an `ApiError`.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{Page, Stats, TodoForm, TodoItem};

#[async_trait]
pub trait TodoGateway: Send + Sync {
    /// `query` comes from `query::build_query`.
    async fn list_items(&self, query: &str) -> Result<Page<TodoItem>, ApiError>;
    async fn create_item(&self, form: &TodoForm) -> Result<TodoItem, ApiError>;
    async fn update_item(&self, id: &str, form: &TodoForm) -> Result<TodoItem, ApiError>;
    async fn delete_item(&self, id: &str) -> Result<(), ApiError>;
    async fn complete_item(&self, id: &str) -> Result<TodoItem, ApiError>;
    async fn uncomplete_item(&self, id: &str) -> Result<TodoItem, ApiError>;
    async fn fetch_stats(&self) -> Result<Stats, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpGateway<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> HttpGateway<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            client: TodoClient::new(base_url),
            transport,
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let (method, path) = (request.method, request.path.clone());
        debug!(%method, %path, "sending request");
        match self.transport.execute(request).await {
            Ok(response) => {
                debug!(%method, %path, status = response.status, "response received");
                Ok(response)
            }
            Err(err) => {
                warn!(%method, %path, error = %err, "request did not complete");
                Err(err)
            }
        }
    }
}

#[async_trait]
impl<T: Transport> TodoGateway for HttpGateway<T> {
    async fn list_items(&self, query: &str) -> Result<Page<TodoItem>, ApiError> {
        let response = self.send(self.client.build_list_items(query)).await?;
        self.client.parse_list_items(response)
    }

    async fn create_item(&self, form: &TodoForm) -> Result<TodoItem, ApiError> {
        let request = self.client.build_create_item(form)?;
        let response = self.send(request).await?;
        self.client.parse_item(response)
    }

    async fn update_item(&self, id: &str, form: &TodoForm) -> Result<TodoItem, ApiError> {
        let request = self.client.build_update_item(id, form)?;
        let response = self.send(request).await?;
        self.client.parse_item(response)
    }

    async fn delete_item(&self, id: &str) -> Result<(), ApiError> {
        let response = self.send(self.client.build_delete_item(id)).await?;
        self.client.parse_delete_item(response)
    }

    async fn complete_item(&self, id: &str) -> Result<TodoItem, ApiError> {
        let response = self.send(self.client.build_complete_item(id)).await?;
        self.client.parse_item(response)
    }

    async fn uncomplete_item(&self, id: &str) -> Result<TodoItem, ApiError> {
        let response = self.send(self.client.build_uncomplete_item(id)).await?;
        self.client.parse_item(response)
    }

    async fn fetch_stats(&self) -> Result<Stats, ApiError> {
        let response = self.send(self.client.build_fetch_stats()).await?;
        self.client.parse_fetch_stats(response)
    }
}
