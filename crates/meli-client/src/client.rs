// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP client for the Mercado Livre REST API
//!
//! Every call carries `Authorization: Bearer <accessToken>` taken verbatim
//! from the relay request; shipment calls additionally request the new
//! response format. Non-2xx responses are captured with their status and
//! body so the relay can surface them per item.

use std::time::Duration;

use relay_types::CallOutcome;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{Value, json};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

/// Header requesting the new shipment response format.
const SHIPMENT_FORMAT_HEADER: (&str, &str) = ("x-format-new", "true");

/// Configuration for the Mercado Livre API client
#[derive(Debug, Clone)]
pub struct MeliConfig {
    /// Base URL of the Mercado Livre API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for MeliConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mercadolibre.com".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Errors specific to the Mercado Livre API client
#[derive(Debug, Error)]
pub enum MeliError {
    /// HTTP transport failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status
    #[error("upstream request failed with status code {status}")]
    Api {
        /// Upstream HTTP status
        status: u16,
        /// Upstream error body, when one was returned
        body: Option<Value>,
    },

    /// The call exceeded the configured timeout
    #[error("request timeout after {seconds} seconds")]
    Timeout {
        /// Configured timeout in seconds
        seconds: u64,
    },

    /// Invalid client configuration
    #[error("configuration error: {0}")]
    Config(String),
}

/// A successful upstream response: status plus parsed body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status returned by the upstream API
    pub status: u16,
    /// Response body, parsed as JSON where possible
    pub body: Value,
}

/// Convert a per-call result into the tagged outcome used for aggregation.
///
/// Transport errors carry no upstream status or body; API errors carry both.
pub fn into_outcome(result: Result<ApiResponse, MeliError>) -> CallOutcome {
    match result {
        Ok(response) => CallOutcome::Success {
            status: response.status,
            body: response.body,
        },
        Err(error) => {
            let (status, body) = match &error {
                MeliError::Api { status, body } => (Some(*status), body.clone()),
                _ => (None, None),
            };
            CallOutcome::Failure {
                message: error.to_string(),
                status,
                body,
            }
        }
    }
}

/// OAuth refresh-token grant parameters, relayed verbatim to the token
/// endpoint.
#[derive(Debug, Clone)]
pub struct RefreshTokenGrant {
    /// Application id (OAuth client id)
    pub app_id: String,
    /// Application secret (OAuth client secret)
    pub secret_key: String,
    /// Refresh token issued by a previous grant
    pub refresh_token: String,
    /// Redirect URI registered for the application
    pub redirect_uri: String,
}

/// Mercado Livre API client
#[derive(Debug)]
pub struct MeliClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl MeliClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `MeliError::Config` if the base URL is empty or unparseable,
    /// or `MeliError::Http` if the HTTP client cannot be built.
    pub fn new(config: MeliConfig) -> Result<Self, MeliError> {
        if config.base_url.trim().is_empty() {
            return Err(MeliError::Config("base URL cannot be empty".to_string()));
        }
        Url::parse(&config.base_url)
            .map_err(|e| MeliError::Config(format!("invalid base URL: {e}")))?;

        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("meli-relay/0.1.0")
            .build()
            .map_err(MeliError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Search a seller's orders at one pagination offset, newest first.
    pub async fn search_orders(
        &self,
        access_token: &str,
        seller_id: &str,
        offset: u64,
    ) -> Result<ApiResponse, MeliError> {
        debug!(seller_id, offset, "fetching orders page");
        let request = self
            .get("/orders/search", access_token)
            .query(&[
                ("seller", seller_id),
                ("offset", &offset.to_string()),
                ("sort", "date_desc"),
            ]);
        self.execute(request).await
    }

    /// Search a seller's orders within a creation-date window, optionally
    /// filtered to one listing.
    pub async fn filtered_orders(
        &self,
        access_token: &str,
        seller_id: &str,
        date_from: &str,
        date_to: &str,
        item_id: Option<&str>,
    ) -> Result<ApiResponse, MeliError> {
        debug!(seller_id, date_from, date_to, item_id, "fetching filtered orders");
        let mut params = vec![
            ("seller", seller_id.to_string()),
            ("order.date_created.from", date_from.to_string()),
            ("order.date_created.to", date_to.to_string()),
        ];
        if let Some(item_id) = item_id {
            params.push(("search", format!("mlb:{item_id}")));
        }
        let request = self.get("/orders/search", access_token).query(&params);
        self.execute(request).await
    }

    /// Fetch one shipment's status payload.
    pub async fn shipment(
        &self,
        access_token: &str,
        shipment_id: &str,
    ) -> Result<ApiResponse, MeliError> {
        debug!(shipment_id, "fetching shipment status");
        let request = self
            .get(&format!("/shipments/{shipment_id}"), access_token)
            .header(SHIPMENT_FORMAT_HEADER.0, SHIPMENT_FORMAT_HEADER.1);
        self.execute(request).await
    }

    /// Fetch one shipment's cost breakdown.
    pub async fn shipment_costs(
        &self,
        access_token: &str,
        shipment_id: &str,
    ) -> Result<ApiResponse, MeliError> {
        debug!(shipment_id, "fetching shipment costs");
        let request = self
            .get(&format!("/shipments/{shipment_id}/costs"), access_token)
            .header(SHIPMENT_FORMAT_HEADER.0, SHIPMENT_FORMAT_HEADER.1);
        self.execute(request).await
    }

    /// List a user's active listings.
    pub async fn user_items(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<ApiResponse, MeliError> {
        debug!(user_id, "fetching user items");
        let request = self.get(&format!("/users/{user_id}/items/search"), access_token);
        self.execute(request).await
    }

    /// Fetch one listing's details.
    pub async fn item_details(
        &self,
        access_token: &str,
        item_id: &str,
    ) -> Result<ApiResponse, MeliError> {
        debug!(item_id, "fetching item details");
        let request = self.get(&format!("/items/{item_id}"), access_token);
        self.execute(request).await
    }

    /// Fetch visit statistics for one or more listings within a date window.
    ///
    /// `item_ids` is the comma-joined id list the upstream endpoint expects.
    pub async fn item_visits(
        &self,
        access_token: &str,
        item_ids: &str,
        date_from: &str,
        date_to: &str,
    ) -> Result<ApiResponse, MeliError> {
        debug!(item_ids, date_from, date_to, "fetching item visits");
        let request = self.get("/items/visits", access_token).query(&[
            ("ids", item_ids),
            ("date_from", date_from),
            ("date_to", date_to),
        ]);
        self.execute(request).await
    }

    /// Fetch one order by id.
    pub async fn order(
        &self,
        access_token: &str,
        order_id: &str,
    ) -> Result<ApiResponse, MeliError> {
        debug!(order_id, "fetching order");
        let request = self.get(&format!("/orders/{order_id}"), access_token);
        self.execute(request).await
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The only POST the relay issues, and the only call without a bearer
    /// header; credentials travel in the grant body.
    pub async fn refresh_access_token(
        &self,
        grant: &RefreshTokenGrant,
    ) -> Result<ApiResponse, MeliError> {
        debug!(app_id = grant.app_id, "refreshing access token");
        let request = self
            .client
            .post(format!("{}/oauth/token", self.base_url))
            .json(&json!({
                "grant_type": "refresh_token",
                "client_id": grant.app_id,
                "client_secret": grant.secret_key,
                "refresh_token": grant.refresh_token,
                "redirect_uri": grant.redirect_uri,
            }));
        self.execute(request).await
    }

    fn get(&self, path: &str, access_token: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(access_token)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<ApiResponse, MeliError> {
        let response = timeout(self.timeout, request.send())
            .await
            .map_err(|_| MeliError::Timeout {
                seconds: self.timeout.as_secs(),
            })?
            .map_err(MeliError::Http)?;

        let status = response.status();
        let body = read_body(response).await;

        if status.is_success() {
            Ok(ApiResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            warn!(status = status.as_u16(), "Mercado Livre API error");
            Err(MeliError::Api {
                status: status.as_u16(),
                body: Some(body),
            })
        }
    }
}

// Error bodies are not always JSON; keep whatever text came back.
async fn read_body(response: Response) -> Value {
    let text = response.text().await.unwrap_or_default();
    if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    }
}
