//! Incoming HTTP request type.

use std::collections::HashMap;

use http::{HeaderMap, Method};
use hyper::upgrade::OnUpgrade;

/// An incoming HTTP request, decoded and ready for a handler.
///
/// The body has already been collected into memory by the time a handler
/// runs — CRUD bodies here are a few hundred bytes at most. The upgrade slot
/// is `Some` only while the underlying connection can still be taken over,
/// which is what the stream endpoint does.
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Vec<u8>,
    params: HashMap<String, String>,
    on_upgrade: Option<OnUpgrade>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        headers: HeaderMap,
        body: Vec<u8>,
        params: HashMap<String, String>,
        on_upgrade: Option<OnUpgrade>,
    ) -> Self {
        Self { method, path, headers, body, params, on_upgrade }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Case-insensitive header lookup. Values that are not valid UTF-8
    /// report as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/weather/{id}`, `req.param("id")` on `/weather/42`
    /// returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Takes the connection-upgrade handle, leaving `None` behind. Returns
    /// `None` if the connection was never upgradable or the handle is gone.
    pub fn take_upgrade(&mut self) -> Option<OnUpgrade> {
        self.on_upgrade.take()
    }
}
