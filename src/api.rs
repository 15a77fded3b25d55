//! The weather CRUD surface.
//!
//! | Method | Path | Success | Failure |
//! |---|---|---|---|
//! | POST | `/weather` | 201 + record | 400 |
//! | GET | `/weather/{id}` | 200 + record | 404 |
//! | PUT | `/weather/{id}` | 200 + record | 400, 404 |
//! | DELETE | `/weather/{id}` | 204 | 404 |
//! | GET | `/weather-stream` | 101 + push stream | 400 |
//!
//! Handlers take the record store as their first argument; [`routes`] closes
//! over one `Arc<ReportStore>` per route so nothing global exists. Store
//! mutations are visible to the next request the moment a handler returns.

use std::future::Future;
use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::ApiError;
use crate::health;
use crate::model::ReportDraft;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::Router;
use crate::store::ReportStore;
use crate::stream;

/// Builds the full route table of the service over `store`.
pub fn routes(store: Arc<ReportStore>) -> Router {
    Router::new()
        .post("/weather", with_store(Arc::clone(&store), create_report))
        .get("/weather/{id}", with_store(Arc::clone(&store), read_report))
        .put("/weather/{id}", with_store(Arc::clone(&store), update_report))
        .delete("/weather/{id}", with_store(Arc::clone(&store), delete_report))
        .get("/weather-stream", with_store(Arc::clone(&store), stream::weather_stream))
        .get("/healthz", health::liveness)
        .get("/readyz", with_store(store, health::readiness))
}

/// Adapts a `(store, request)` handler into the plain `(request)` shape the
/// router stores, capturing its own clone of the store.
fn with_store<F, Fut, R>(
    store: Arc<ReportStore>,
    handler: F,
) -> impl Fn(Request) -> Fut + Send + Sync + 'static
where
    F: Fn(Arc<ReportStore>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    move |req| handler(Arc::clone(&store), req)
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// POST /weather — decode, validate, assign an id, store, answer 201.
async fn create_report(store: Arc<ReportStore>, req: Request) -> Result<Response, ApiError> {
    let draft: ReportDraft = serde_json::from_slice(req.body())?;
    let fields = draft.validate()?;
    let report = fields.into_report(Uuid::new_v4().to_string());
    store.insert(report.clone());
    debug!(id = %report.id, city = %report.city, "weather report created");
    Ok(Json(StatusCode::CREATED, &report).into_response())
}

/// GET /weather/{id}
async fn read_report(store: Arc<ReportStore>, req: Request) -> Result<Response, ApiError> {
    let id = req.param("id").ok_or(ApiError::NotFound)?;
    let report = store.get(id).ok_or(ApiError::NotFound)?;
    Ok(Json(StatusCode::OK, &report).into_response())
}

/// PUT /weather/{id} — same decode and validation as create, then a wholesale
/// replace. A bad body wins over an unknown id; an update never creates.
async fn update_report(store: Arc<ReportStore>, req: Request) -> Result<Response, ApiError> {
    let draft: ReportDraft = serde_json::from_slice(req.body())?;
    let fields = draft.validate()?;
    let id = req.param("id").ok_or(ApiError::NotFound)?;
    // Existence check and overwrite are one store call, under one lock.
    let report = store.replace(id, fields).ok_or(ApiError::NotFound)?;
    debug!(id = %report.id, "weather report replaced");
    Ok(Json(StatusCode::OK, &report).into_response())
}

/// DELETE /weather/{id} — 204 on removal, 404 otherwise. Idempotent from the
/// client's point of view: deleting twice just reports 404 the second time.
async fn delete_report(store: Arc<ReportStore>, req: Request) -> Result<Response, ApiError> {
    let id = req.param("id").ok_or(ApiError::NotFound)?;
    if store.remove(id) {
        debug!(%id, "weather report deleted");
        Ok(Response::status(StatusCode::NO_CONTENT))
    } else {
        Err(ApiError::NotFound)
    }
}

// ── Json responder ────────────────────────────────────────────────────────────

/// Serialize-and-respond wrapper; the [`IntoResponse`] extension point in
/// use. Serialization of a [`WeatherReport`](crate::WeatherReport) cannot
/// realistically fail, but if it ever does the client gets a clean 500, not
/// a torn body.
struct Json<'a, T: Serialize>(StatusCode, &'a T);

impl<T: Serialize> IntoResponse for Json<'_, T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(self.1) {
            Ok(body) => Response::builder().status(self.0).json(body),
            Err(e) => {
                error!("response serialization failed: {e}");
                Response::status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
