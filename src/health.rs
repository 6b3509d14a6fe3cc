//! Liveness and readiness probes.
//!
//! | Probe | Path | Answers |
//! |---|---|---|
//! | **Liveness** | `/healthz` | `200 ok` whenever the process can answer HTTP. |
//! | **Readiness** | `/readyz` | `200 ready` if the port store loads, else `503`. |

use std::sync::Arc;

use crate::service::PortService;
use crate::{Request, Response, Status};

pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

pub async fn readiness(service: Arc<PortService>, _req: Request) -> Response {
    let ready = tokio::task::spawn_blocking(move || service.is_ready())
        .await
        .unwrap_or(false);
    if ready {
        Response::text("ready")
    } else {
        Response::builder()
            .status(Status::ServiceUnavailable)
            .text("store unavailable")
    }
}
