//! Liveness and readiness probe handlers.
//!
//! Two questions an orchestrator or load-balancer asks, answered on
//! `/healthz` and `/readyz`. The service has no external dependencies — the
//! record store lives in this process — so readiness is cheap: if the store
//! can be read, traffic can be served.

use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;
use crate::store::ReportStore;

/// Liveness probe handler.
///
/// Always returns `200 OK` with body `"ok"`. If the process can respond to
/// HTTP at all, it is alive — this handler intentionally has no dependencies.
pub(crate) async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Readiness probe handler.
///
/// Touches the record store and reports how many records it holds, so the
/// probe exercises the same lock the handlers do.
pub(crate) async fn readiness(store: Arc<ReportStore>, _req: Request) -> Response {
    Response::text(format!("ready ({} reports)", store.len()))
}
