// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Mercado Livre Relay Server Implementation
//!
//! This crate provides the HTTP server for the Mercado Livre relay service,
//! built with Axum and designed for production use with comprehensive
//! configuration, middleware, and graceful shutdown capabilities.
//!
//! # Module Structure
//!
//! - [`config`]: Server configuration and environment management with hierarchical loading
//! - [`error`]: Error types and HTTP response handling with proper status codes
//! - [`state`]: Shared application state management with cancellation token support
//! - [`server`]: Main server implementation, lifecycle, and coordinated shutdown
//! - [`routes`]: Route configuration and HTTP request handlers for the relay operations
//! - [`extractors`]: JSON extraction with detailed parse error messages
//! - [`metrics`]: Prometheus counters for relay and upstream traffic
//! - [`openapi`]: `OpenAPI` specification and Swagger UI endpoints for API documentation
//!
//! # Key Features
//!
//! - **Transparent Relay**: Forwards frontend requests to the Mercado Livre
//!   REST API with the caller's bearer token; the relay holds no credentials
//! - **Batch Fan-Out**: Order and shipment batches run concurrently with
//!   per-item failure isolation and input-order results
//! - **Graceful Shutdown**: Coordinated termination using `CancellationToken`
//! - **Comprehensive Middleware**: Request tracing, CORS, timeouts, and error handling

pub mod config;
pub mod docs;
pub mod error;
pub mod extractors;
pub mod metrics;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{Environment, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::Server;
pub use state::{HealthCheck, ServerState};
