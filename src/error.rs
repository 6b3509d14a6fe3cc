//! Error types.
//!
//! Three layers, three enums. [`StoreError`] is what a storage backend can
//! fail with. [`ApiError`] is what a port operation can fail with and knows
//! how to render itself as an HTTP response. [`Error`] covers startup and the
//! server loop: binding, configuration, seeding the data file.

use thiserror::Error;
use tracing::error;

use crate::response::{IntoResponse, Response};
use crate::status::Status;

/// Failure inside a [`PortStorage`](crate::PortStorage) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a single port operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body was not a usable JSON object.
    #[error("Invalid JSON")]
    InvalidJson,

    /// No stored port carries the requested id.
    #[error("Port not found")]
    NotFound,

    /// The backing store could not be read or written.
    #[error("store: {0}")]
    Store(#[from] StoreError),

    /// The blocking task running the store call panicked or was cancelled.
    #[error("worker: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidJson => Status::BadRequest,
            Self::NotFound => Status::NotFound,
            Self::Store(_) | Self::Worker(_) => Status::InternalServerError,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Store(e) => {
                error!("port store failure: {e}");
                "Internal server error".to_owned()
            }
            Self::Worker(e) => {
                error!("port store task failed: {e}");
                "Internal server error".to_owned()
            }
            other => other.to_string(),
        };
        Response::builder()
            .status(self.status())
            .json_value(&serde_json::json!({ "error": message }))
    }
}

/// The error type returned by startup and [`Server::serve`](crate::Server::serve).
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("config: {0}")]
    Config(String),
}
