// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server state management module
//!
//! This module provides shared application state for the relay server: the
//! configuration, the shared Mercado Livre client, and the coordinated
//! cancellation token. Handlers are pure functions of their input plus this
//! injected state; no other process-wide mutable state exists.

use std::sync::Arc;

use meli_client::MeliClient;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

use crate::config::{Environment, ServerConfig};

/// Shared application state with cancellation token support
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Server configuration
    config: ServerConfig,
    /// Shared upstream client
    meli: Arc<MeliClient>,
    /// Cancellation token for coordinated shutdown
    pub cancellation_token: CancellationToken,
}

impl ServerState {
    /// Create new server state
    pub fn new(
        config: ServerConfig,
        meli: Arc<MeliClient>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            config,
            meli,
            cancellation_token,
        }
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Shared Mercado Livre client
    pub fn meli(&self) -> &Arc<MeliClient> {
        &self.meli
    }

    /// Build the process-local health report.
    ///
    /// The relay holds no upstream credentials of its own, so upstream
    /// reachability is not probed here.
    pub fn health_check(&self) -> HealthCheck {
        HealthCheck {
            status: Box::from("up"),
            version: Box::from(env!("CARGO_PKG_VERSION")),
            environment: self.config.environment,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Health check status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthCheck {
    /// Service status
    pub status: Box<str>,
    /// Service version
    pub version: Box<str>,
    /// Environment
    pub environment: Environment,
    /// Timestamp
    pub timestamp: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use meli_client::MeliConfig;

    use super::*;

    fn test_state() -> ServerState {
        let client = MeliClient::new(MeliConfig::default()).unwrap();
        ServerState::new(
            ServerConfig::for_testing(),
            Arc::new(client),
            CancellationToken::new(),
        )
    }

    #[test]
    fn server_state_creation() {
        let state = test_state();
        assert!(!state.cancellation_token.is_cancelled());
    }

    #[test]
    fn health_check_reports_environment() {
        let state = test_state();
        let health = state.health_check();
        assert_eq!(&*health.status, "up");
        assert_eq!(health.environment, Environment::Testing);
    }

    #[test]
    fn linked_cancellation_tokens() {
        let client = MeliClient::new(MeliConfig::default()).unwrap();
        let token = CancellationToken::new();
        let state = ServerState::new(
            ServerConfig::for_testing(),
            Arc::new(client),
            token.clone(),
        );

        token.cancel();
        assert!(state.cancellation_token.is_cancelled());
    }
}
