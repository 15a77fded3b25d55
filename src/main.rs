//! The stratus weather service binary.
//!
//! Run with:
//!   RUST_LOG=info cargo run
//!
//! Try:
//!   curl -X POST http://localhost:7070/weather \
//!        -H 'content-type: application/json' \
//!        -d '{"city":"Austin","temperature":31.5,"conditions":"Sunny"}'
//!   curl http://localhost:7070/weather/<id>
//!   curl -X PUT http://localhost:7070/weather/<id> \
//!        -H 'content-type: application/json' \
//!        -d '{"city":"Austin","temperature":33.0,"conditions":"Hot"}'
//!   curl -X DELETE http://localhost:7070/weather/<id>
//!   curl http://localhost:7070/healthz

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use stratus::{ReportStore, Server, api};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let store = Arc::new(ReportStore::new());
    let app = api::routes(Arc::clone(&store));

    // The listening port is part of the service contract.
    Server::bind("0.0.0.0:7070")
        .serve(app)
        .await
        .expect("server error");
}
