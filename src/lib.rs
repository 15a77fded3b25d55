//! # stratus
//!
//! A small weather-report service: four CRUD operations over an in-memory
//! record store, plus a websocket endpoint that pushes records to anyone who
//! connects. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! | Method | Path | Success | Failure |
//! |---|---|---|---|
//! | POST | `/weather` | 201 + record | 400 invalid body / validation |
//! | GET | `/weather/{id}` | 200 + record | 404 |
//! | PUT | `/weather/{id}` | 200 + record | 400; 404 unknown id |
//! | DELETE | `/weather/{id}` | 204 | 404 |
//! | GET | `/weather-stream` | websocket record stream | 400 bad handshake |
//!
//! Records are `{"id", "city", "temperature", "conditions"}`; ids are
//! assigned by the server and never by clients. No authentication, no
//! pagination, no durable storage — the store lives and dies with the
//! process.
//!
//! ## The pieces
//!
//! - [`ReportStore`] — the record map, guarded by a read/write lock; the
//!   sole unit of state, owned by `main` and handed to handlers by `Arc`.
//! - [`api`] — the CRUD handlers and the route table.
//! - `stream` — the websocket push loop, rate-bounded and cancelled by
//!   client close.
//! - [`Server`] / [`Router`] — hyper accept loop with graceful shutdown,
//!   radix-tree routing via [`matchit`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use stratus::{ReportStore, Server, api};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(ReportStore::new());
//!     let app = api::routes(Arc::clone(&store));
//!
//!     Server::bind("0.0.0.0:7070").serve(app).await.expect("server error");
//! }
//! ```

pub mod api;

mod error;
mod handler;
mod health;
mod model;
mod request;
mod response;
mod router;
mod server;
mod store;
mod stream;

pub use error::{ApiError, Error};
pub use handler::Handler;
pub use model::{ReportDraft, ReportFields, WeatherReport};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use store::ReportStore;
