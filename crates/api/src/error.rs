// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error handling module
//!
//! This module provides error types for relay operations, including the HTTP
//! response mapping the frontend depends on. Two tiers exist: client errors
//! (missing fields, malformed JSON) detected before any upstream call, and
//! upstream errors surfaced after one. Batch endpoints never reach this
//! module for per-item failures; those are carried as values inside the
//! envelope.

use std::net::SocketAddr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use meli_client::MeliError;
use serde_json::Value;
use thiserror::Error;

/// Error types for relay server operations
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Network binding errors
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        /// Socket address that failed to bind
        address: SocketAddr,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server startup errors
    #[error("Server startup failed: {source}")]
    Startup {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server shutdown errors
    #[error("Server shutdown failed: {source}")]
    Shutdown {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Required request fields absent or empty; no upstream call was made
    #[error("Missing required parameters")]
    MissingParameters {
        /// Names the operation's full required-field set
        details: String,
    },

    /// JSON parsing errors with detailed context
    #[error("Invalid JSON request: {message}")]
    JsonError {
        /// Detailed error message
        message: String,
    },

    /// Upstream call failed on a single-call endpoint
    #[error("{message}")]
    Upstream {
        /// Upstream error message
        message: String,
    },

    /// Upstream call failed on the order lookup endpoint, which propagates
    /// the upstream status code and error body
    #[error("{message}")]
    OrderLookup {
        /// Upstream error message
        message: String,
        /// Upstream HTTP status, when a response was received
        status: Option<u16>,
        /// Upstream error body, when a response was received
        data: Option<Value>,
    },
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// Client error for a request missing required fields.
    pub fn missing_parameters(details: impl Into<String>) -> Self {
        Self::MissingParameters {
            details: details.into(),
        }
    }

    /// Upstream failure on a single-call pass-through endpoint.
    pub fn upstream(error: MeliError) -> Self {
        Self::Upstream {
            message: error.to_string(),
        }
    }

    /// Upstream failure on the order lookup endpoint.
    pub fn order_lookup(error: MeliError) -> Self {
        let message = error.to_string();
        let (status, data) = match error {
            MeliError::Api { status, body } => (Some(status), body),
            _ => (None, None),
        };
        Self::OrderLookup {
            message,
            status,
            data,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, json_body) = match &self {
            ServerError::Config { .. }
            | ServerError::Bind { .. }
            | ServerError::Startup { .. }
            | ServerError::Shutdown { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({
                    "error": self.to_string(),
                    "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16()
                }),
            ),
            ServerError::MissingParameters { details } => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": "Missing required parameters",
                    "details": details
                }),
            ),
            ServerError::JsonError { .. } => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": self.to_string(),
                    "status": StatusCode::BAD_REQUEST.as_u16()
                }),
            ),
            ServerError::Upstream { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({
                    "success": false,
                    "error": message
                }),
            ),
            ServerError::OrderLookup {
                message,
                status,
                data,
            } => {
                let upstream_status = status
                    .and_then(|code| StatusCode::from_u16(code).ok())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (
                    upstream_status,
                    serde_json::json!({
                        "success": false,
                        "error": message,
                        "status": upstream_status.as_u16(),
                        "data": data.clone().unwrap_or(Value::Null)
                    }),
                )
            }
        };

        let body = Json(json_body);
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameters_maps_to_bad_request() {
        let error = ServerError::missing_parameters("accessToken and sellerId are required");
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_maps_to_internal_error() {
        let error = ServerError::upstream(MeliError::Timeout { seconds: 30 });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn order_lookup_propagates_upstream_status() {
        let error = ServerError::order_lookup(MeliError::Api {
            status: 404,
            body: Some(serde_json::json!({"message": "not found"})),
        });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn order_lookup_without_response_is_internal_error() {
        let error = ServerError::order_lookup(MeliError::Timeout { seconds: 5 });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
