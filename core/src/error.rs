//! Error types for the to-do gateway and form validation.
//!
//! # Design
//! Every gateway call fails with exactly one `ApiError` class: the request
//! never got an answer (`Transport`), the server answered with a failure
//! status (`Server`), or the request could not be prepared or its answer
//! could not be decoded on this side (`Client`). The store turns any of them
//! into a display string; nothing above the gateway matches on raw transport
//! failures.

use chrono::NaiveDate;
use thiserror::Error;

use crate::validation::DISPLAY_DATE_FORMAT;

/// Errors returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response reached us from the server.
    #[error("No response received from server: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The request could not be built or the response could not be decoded.
    #[error("{0}")]
    Client(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Server { status: 404, .. })
    }
}

/// Client-side form validation failures. These never reach the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name should be from {min} to up to {max} characters.")]
    TextLength { min: usize, max: usize },

    #[error("Due Date can't be set before the creation date: {}", .creation.format(DISPLAY_DATE_FORMAT))]
    DueDateBeforeCreation { creation: NaiveDate },
}
