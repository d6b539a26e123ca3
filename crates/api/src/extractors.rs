// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Custom extractors for improved error handling
//!
//! This module provides a JSON extractor with better error messages than the
//! default Axum extractor, so frontend developers can see what is wrong with
//! a request body instead of a bare 422.

use axum::{
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::error::ServerError;

const MAX_JSON_PAYLOAD_SIZE: usize = 1024 * 1024; // 1MB limit

/// Custom JSON extractor that provides detailed error messages for parsing failures
#[derive(Debug)]
pub struct JsonExtractor<T>(pub T);

impl<T, S> FromRequest<S> for JsonExtractor<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(content_type) = req.headers().get("content-type")
            && let Ok(content_type_str) = content_type.to_str()
            && !content_type_str.starts_with("application/json")
        {
            return Err(ServerError::JsonError {
                message: format!(
                    "invalid content-type: expected 'application/json', got '{content_type_str}'"
                ),
            });
        }

        let bytes = match axum::body::Bytes::from_request(req, state).await {
            Ok(bytes) => bytes,
            Err(rejection) => {
                return Err(ServerError::JsonError {
                    message: format!("failed to read request body: {rejection}"),
                });
            }
        };

        if bytes.len() > MAX_JSON_PAYLOAD_SIZE {
            return Err(ServerError::JsonError {
                message: format!(
                    "request body too large: {} bytes (max: {} bytes)",
                    bytes.len(),
                    MAX_JSON_PAYLOAD_SIZE
                ),
            });
        }

        if bytes.is_empty() {
            return Err(ServerError::JsonError {
                message: "request body is empty, expected valid JSON".to_string(),
            });
        }

        serde_json::from_slice::<T>(&bytes)
            .map(JsonExtractor)
            .map_err(|err| ServerError::JsonError {
                message: describe_json_error(&err),
            })
    }
}

impl<T> IntoResponse for JsonExtractor<T>
where
    T: IntoResponse,
{
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

fn describe_json_error(err: &serde_json::Error) -> String {
    if err.is_eof() {
        "unexpected end of JSON input, request appears to be truncated".to_string()
    } else if err.is_syntax() {
        format!(
            "invalid JSON syntax at line {}, column {}",
            err.line(),
            err.column()
        )
    } else if err.is_data() {
        format!("JSON data validation failed: {err}")
    } else {
        format!("JSON parsing error: {err}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{HeaderValue, Method},
    };
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestStruct {
        name: String,
        age: u32,
    }

    fn create_request(body: &str) -> Request {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri("/test")
            .body(Body::from(body.to_string()))
            .unwrap();

        req.headers_mut()
            .insert("content-type", HeaderValue::from_static("application/json"));

        req
    }

    #[tokio::test]
    async fn valid_json_parsing() {
        let req = create_request(r#"{"name": "Alice", "age": 30}"#);
        let result = JsonExtractor::<TestStruct>::from_request(req, &()).await;

        assert!(result.is_ok());
        let JsonExtractor(data) = result.unwrap();
        assert_eq!(data.name, "Alice");
        assert_eq!(data.age, 30);
    }

    #[tokio::test]
    async fn empty_body_error() {
        let req = create_request("");
        let result = JsonExtractor::<TestStruct>::from_request(req, &()).await;

        match result.unwrap_err() {
            ServerError::JsonError { message } => {
                assert!(message.contains("request body is empty"));
            }
            _ => panic!("expected JsonError"),
        }
    }

    #[tokio::test]
    async fn truncated_json_error() {
        let req = create_request(r#"{"name": "Alice", "age": 30"#);
        let result = JsonExtractor::<TestStruct>::from_request(req, &()).await;

        match result.unwrap_err() {
            ServerError::JsonError { message } => {
                assert!(
                    message.contains("unexpected end of JSON input")
                        || message.contains("invalid JSON syntax")
                );
            }
            _ => panic!("expected JsonError"),
        }
    }

    #[tokio::test]
    async fn data_validation_error() {
        let req = create_request(r#"{"name": "Alice", "age": "thirty"}"#);
        let result = JsonExtractor::<TestStruct>::from_request(req, &()).await;

        match result.unwrap_err() {
            ServerError::JsonError { message } => {
                assert!(message.contains("JSON data validation failed"));
            }
            _ => panic!("expected JsonError"),
        }
    }

    #[tokio::test]
    async fn invalid_content_type() {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri("/test")
            .body(Body::from(r#"{"name": "Alice", "age": 30}"#))
            .unwrap();

        req.headers_mut()
            .insert("content-type", HeaderValue::from_static("text/plain"));

        let result = JsonExtractor::<TestStruct>::from_request(req, &()).await;

        match result.unwrap_err() {
            ServerError::JsonError { message } => {
                assert!(message.contains("invalid content-type"));
                assert!(message.contains("text/plain"));
            }
            _ => panic!("expected JsonError"),
        }
    }

    #[tokio::test]
    async fn large_payload_rejection() {
        let large_body = format!(r#"{{"data": "{}"}}"#, "x".repeat(1024 * 1024));
        let req = create_request(&large_body);
        let result = JsonExtractor::<TestStruct>::from_request(req, &()).await;

        match result.unwrap_err() {
            ServerError::JsonError { message } => {
                assert!(message.contains("request body too large"));
            }
            _ => panic!("expected JsonError"),
        }
    }
}
