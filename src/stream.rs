//! The websocket push stream.
//!
//! `GET /weather-stream` upgrades the connection and pushes one stored
//! record as a JSON text message per tick — whichever record the store
//! yields first, or an empty-valued record while the store is empty. Pushes
//! are paced at [`PUSH_INTERVAL`] rather than free-running, and the socket's
//! read half is watched so a client close ends the loop without waiting for
//! a send to fail.
//!
//! A client's connection goes Upgrading → Streaming → Closed; the first
//! failed send, read error, or close frame is terminal. There is no
//! reconnection protocol and no resumption token — a client that reconnects
//! starts a fresh stream.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use http::StatusCode;
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::handshake::derive_accept_key;
use tokio_tungstenite::tungstenite::protocol::{Message, Role};
use tracing::{debug, error};

use crate::request::Request;
use crate::response::Response;
use crate::store::ReportStore;

/// Pace of the push loop: one record per tick per client.
const PUSH_INTERVAL: Duration = Duration::from_secs(1);

/// GET /weather-stream — the upgrade handshake.
///
/// Checks the websocket preconditions, claims the connection's upgrade
/// handle, spawns the push loop, and answers `101 Switching Protocols`.
/// Handshake failures are answered with a 400 and logged, never dropped on
/// the floor.
pub(crate) async fn weather_stream(store: Arc<ReportStore>, mut req: Request) -> Response {
    if !req
        .header("upgrade")
        .is_some_and(|v| v.eq_ignore_ascii_case("websocket"))
    {
        return handshake_error("expected a websocket upgrade request");
    }
    if req.header("sec-websocket-version") != Some("13") {
        return handshake_error("unsupported websocket version");
    }
    let Some(key) = req.header("sec-websocket-key").map(str::to_owned) else {
        return handshake_error("missing sec-websocket-key header");
    };
    let Some(on_upgrade) = req.take_upgrade() else {
        error!("stream request on a connection that cannot be upgraded");
        return Response::status(StatusCode::INTERNAL_SERVER_ERROR);
    };

    let accept = derive_accept_key(key.as_bytes());

    tokio::spawn(async move {
        match on_upgrade.await {
            Ok(upgraded) => {
                let socket =
                    WebSocketStream::from_raw_socket(TokioIo::new(upgraded), Role::Server, None)
                        .await;
                push_reports(store, socket).await;
            }
            Err(e) => error!("websocket upgrade failed: {e}"),
        }
    });

    Response::builder()
        .status(StatusCode::SWITCHING_PROTOCOLS)
        .header("connection", "Upgrade")
        .header("upgrade", "websocket")
        .header("sec-websocket-accept", &accept)
        .no_body()
}

fn handshake_error(message: &'static str) -> Response {
    debug!("rejecting stream client: {message}");
    Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .json(format!(r#"{{"error":"{message}"}}"#).into_bytes())
}

/// The Streaming state: push a record per tick until the client goes away.
///
/// The select keeps the read half live, so a close frame or read error
/// cancels the loop as soon as the peer hangs up; inbound data frames are
/// ignored — this endpoint only talks.
async fn push_reports<S>(store: Arc<ReportStore>, mut socket: WebSocketStream<S>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut ticker = tokio::time::interval(PUSH_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = store.any().unwrap_or_default();
                let payload = match serde_json::to_string(&report) {
                    Ok(payload) => payload,
                    Err(e) => {
                        error!("report serialization failed: {e}");
                        break;
                    }
                };
                if let Err(e) = socket.send(Message::Text(payload)).await {
                    debug!("stream client went away: {e}");
                    break;
                }
            }
            inbound = socket.next() => match inbound {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("stream read error: {e}");
                    break;
                }
            },
        }
    }
    let _ = socket.close(None).await;
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use http::{HeaderMap, Method};

    use super::*;
    use crate::model::WeatherReport;

    fn upgrade_request(headers: &[(&str, &str)]) -> Request {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(
                http::HeaderName::from_bytes(name.as_bytes()).expect("test header name"),
                value.parse().expect("test header value"),
            );
        }
        Request::new(
            Method::GET,
            "/weather-stream".to_owned(),
            map,
            Vec::new(),
            HashMap::new(),
            None,
        )
    }

    #[tokio::test]
    async fn non_upgrade_requests_are_rejected_with_400() {
        let store = Arc::new(ReportStore::new());
        let response = weather_stream(store, upgrade_request(&[])).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.body_bytes(),
            br#"{"error":"expected a websocket upgrade request"}"#
        );
    }

    #[tokio::test]
    async fn wrong_version_is_rejected_with_400() {
        let store = Arc::new(ReportStore::new());
        let response = weather_stream(
            store,
            upgrade_request(&[("upgrade", "websocket"), ("sec-websocket-version", "8")]),
        )
        .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unupgradable_connection_is_a_500() {
        // Headers are fine, but the request carries no upgrade handle.
        let store = Arc::new(ReportStore::new());
        let response = weather_stream(
            store,
            upgrade_request(&[
                ("upgrade", "websocket"),
                ("sec-websocket-version", "13"),
                ("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ=="),
            ]),
        )
        .await;
        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    async fn ws_pair() -> (
        WebSocketStream<tokio::io::DuplexStream>,
        WebSocketStream<tokio::io::DuplexStream>,
    ) {
        let (server_io, client_io) = tokio::io::duplex(4096);
        let server = WebSocketStream::from_raw_socket(server_io, Role::Server, None).await;
        let client = WebSocketStream::from_raw_socket(client_io, Role::Client, None).await;
        (server, client)
    }

    #[tokio::test]
    async fn pushes_the_stored_record_and_stops_on_client_close() {
        let store = Arc::new(ReportStore::new());
        store.insert(WeatherReport {
            id: "a".to_owned(),
            city: "Austin".to_owned(),
            temperature: 31.5,
            conditions: "Sunny".to_owned(),
        });

        let (server, mut client) = ws_pair().await;
        let loop_task = tokio::spawn(push_reports(Arc::clone(&store), server));

        let message = client
            .next()
            .await
            .expect("stream is open")
            .expect("first push arrives");
        let report: WeatherReport =
            serde_json::from_str(message.to_text().expect("text frame")).expect("record JSON");
        assert_eq!(report.id, "a");
        assert_eq!(report.city, "Austin");

        client.close(None).await.expect("close handshake");
        loop_task.await.expect("push loop ends after the close");
    }

    #[tokio::test]
    async fn an_empty_store_pushes_the_empty_record() {
        let store = Arc::new(ReportStore::new());
        let (server, mut client) = ws_pair().await;
        let loop_task = tokio::spawn(push_reports(store, server));

        let message = client
            .next()
            .await
            .expect("stream is open")
            .expect("first push arrives");
        let report: WeatherReport =
            serde_json::from_str(message.to_text().expect("text frame")).expect("record JSON");
        assert_eq!(report, WeatherReport::default());

        client.close(None).await.expect("close handshake");
        loop_task.await.expect("push loop ends after the close");
    }
}
