//! Error types.
//!
//! Two tiers. [`Error`] is for infrastructure failures — binding the port,
//! accepting a connection — and surfaces from [`Server::serve`]. Everything a
//! client can cause is an [`ApiError`], which converts straight into the HTTP
//! response the client sees.
//!
//! [`Server::serve`]: crate::Server::serve

use std::fmt;

use http::StatusCode;

use crate::response::{IntoResponse, Response};

/// The error type returned by the server's fallible operations.
#[derive(Debug)]
pub struct Error(std::io::Error);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "io: {}", self.0)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(e)
    }
}

/// What can go wrong while answering a weather request.
///
/// The `Display` text of each variant is exactly what lands in the response
/// body, as `{"error": "<text>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body was not decodable JSON.
    #[error("request body is not valid JSON")]
    MalformedBody(#[source] serde_json::Error),

    /// A required field was missing or empty. The message names the field;
    /// fields are checked city, then temperature, then conditions, and the
    /// first failure wins.
    #[error("{0}")]
    Validation(&'static str),

    /// The path id matches no stored record.
    #[error("No weather data found for provided id")]
    NotFound,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedBody(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Variant messages are fixed strings with nothing to escape, so the
        // body can be assembled without a serializer round trip.
        let message = self.to_string();
        Response::builder()
            .status(self.status())
            .json(format!(r#"{{"error":"{message}"}}"#).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404_with_the_canonical_body() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.body_bytes(),
            br#"{"error":"No weather data found for provided id"}"#
        );
    }

    #[test]
    fn bad_input_maps_to_400() {
        let malformed = serde_json::from_str::<crate::model::ReportDraft>("not json")
            .expect_err("not valid JSON");
        assert_eq!(
            ApiError::MalformedBody(malformed).into_response().status_code(),
            StatusCode::BAD_REQUEST
        );
        let response = ApiError::Validation("temperature is required").into_response();
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.body_bytes(), br#"{"error":"temperature is required"}"#);
    }
}
