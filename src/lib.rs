//! # portstore
//!
//! A small HTTP service for switch port records: port number, hostname,
//! VLAN, port type and LAG flag. The whole collection lives in one JSON
//! file that is re-read on every request and rewritten on every change.
//!
//! The crate is the service plus the thin HTTP layer it runs on:
//!
//! - Radix-tree routing via [`matchit`], one tree per method
//! - hyper connections on tokio, HTTP/1.1 and HTTP/2
//! - Graceful shutdown on SIGTERM / Ctrl-C
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use portstore::{api, JsonFileStore, PortService, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), portstore::Error> {
//!     let store = JsonFileStore::new("data/ports.json");
//!     store.ensure_exists()?;
//!     let app = api::routes(Arc::new(PortService::new(Arc::new(store))));
//!     Server::bind(([0, 0, 0, 0], 8000)).serve(app).await
//! }
//! ```

mod error;
mod handler;
mod method;
mod port;
mod request;
mod response;
mod router;
mod server;
mod service;
mod status;
mod store;

pub mod api;
pub mod config;
pub mod health;

pub use config::Config;
pub use error::{ApiError, Error, StoreError};
pub use handler::Handler;
pub use method::Method;
pub use port::{Port, PortInput};
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use service::PortService;
pub use status::Status;
pub use store::{JsonFileStore, MemoryStore, PortStorage};
