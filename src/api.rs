//! The `/api/ports` route table and its handlers.
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `/api/ports` | 200 `{"ports": [...]}` |
//! | POST | `/api/ports` | 201 created port |
//! | PUT | `/api/ports/{id}` | 200 updated port |
//! | DELETE | `/api/ports/{id}` | 200 `{"deleted": id}` |

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::error::ApiError;
use crate::health;
use crate::port::{Port, PortInput};
use crate::response::Json;
use crate::service::PortService;
use crate::{IntoResponse, Method, Request, Response, Router, Status};

#[derive(Serialize)]
struct PortList {
    ports: Vec<Port>,
}

#[derive(Serialize)]
struct Deleted<'a> {
    deleted: &'a str,
}

/// Builds the full route table over `service`.
///
/// Only the exact collection path lists; `GET /api/ports/<anything>` has no
/// route and answers the plain 404.
pub fn routes(service: Arc<PortService>) -> Router {
    Router::new()
        .on(Method::Get,    "/api/ports",      with(&service, list_ports))
        .on(Method::Post,   "/api/ports",      with(&service, create_port))
        .on(Method::Put,    "/api/ports/{id}", with(&service, update_port))
        .on(Method::Delete, "/api/ports/{id}", with(&service, delete_port))
        .on(Method::Get,    "/healthz",        health::liveness)
        .on(Method::Get,    "/readyz",         with(&service, health::readiness))
}

/// Adapts a `(service, request)` handler into a plain request handler.
fn with<F, Fut>(service: &Arc<PortService>, f: F) -> impl Fn(Request) -> Fut + Send + Sync + 'static + use<F, Fut>
where
    F: Fn(Arc<PortService>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let service = Arc::clone(service);
    move |req: Request| f(Arc::clone(&service), req)
}

fn reject(err: ApiError, req: &Request) -> Response {
    if !matches!(err, ApiError::Store(_) | ApiError::Worker(_)) {
        warn!(method = %req.method(), path = req.path(), "{err}");
    }
    err.into_response()
}

fn path_id(req: &Request) -> &str {
    req.param("id").unwrap_or_default()
}

/// Runs a store-touching call on the blocking pool so file I/O and the
/// write lock never park a runtime worker.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

async fn list_ports(service: Arc<PortService>, req: Request) -> Response {
    match blocking(move || service.list()).await {
        Ok(ports) => Response::builder().json_value(&PortList { ports }),
        Err(e) => reject(e, &req),
    }
}

async fn create_port(service: Arc<PortService>, req: Request) -> Response {
    let created = match PortInput::from_body(req.body()) {
        Ok(input) => blocking(move || service.create(input)).await,
        Err(e) => Err(e),
    };
    match created {
        Ok(port) => Response::builder().status(Status::Created).json_value(&port),
        Err(e) => reject(e, &req),
    }
}

async fn update_port(service: Arc<PortService>, req: Request) -> Response {
    let id = path_id(&req).to_owned();
    let updated = match PortInput::from_body(req.body()) {
        Ok(input) => blocking(move || service.update(&id, input)).await,
        Err(e) => Err(e),
    };
    match updated {
        Ok(port) => Json(port).into_response(),
        Err(e) => reject(e, &req),
    }
}

async fn delete_port(service: Arc<PortService>, req: Request) -> Response {
    let id = path_id(&req).to_owned();
    let target = id.clone();
    match blocking(move || service.delete(&target)).await {
        Ok(_) => Response::builder().json_value(&Deleted { deleted: &id }),
        Err(e) => reject(e, &req),
    }
}
