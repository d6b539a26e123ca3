// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP request handlers module
//!
//! One handler per relay operation. Each follows the same sequence: validate
//! required fields (before any network traffic), issue the upstream call or
//! fan out a batch of them, normalize, and emit the envelope. Batch fan-out
//! spawns one task per item and joins the handles in input order, so output
//! position i always corresponds to input position i no matter which call
//! finishes first.

use std::{fmt, sync::Arc};

use axum::{Json, extract::State, response::IntoResponse};
use meli_client::{RefreshTokenGrant, into_outcome};
use relay_types::{
    CallOutcome, DataEnvelope, OffsetResult, OrderEnvelope, OrdersEnvelope, ShipmentResult,
    ShipmentsEnvelope,
};
use serde::Deserialize;
use tracing::error;
use utoipa::ToSchema;

use crate::{
    error::ServerError,
    extractors::JsonExtractor,
    metrics,
    state::{HealthCheck, ServerState},
};

/// Identifier field that may arrive as a JSON string or number.
///
/// The frontend sends seller and user ids however it happens to hold them;
/// the upstream API accepts both forms in paths and query strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// String form, possibly blank
    Text(String),
    /// Numeric form
    Number(i64),
}

impl Default for RawId {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl RawId {
    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// Item id list that may arrive as a JSON array or a single string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ItemIds {
    /// Several ids
    Many(Vec<String>),
    /// A single id
    One(String),
}

impl Default for ItemIds {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl ItemIds {
    fn is_empty(&self) -> bool {
        match self {
            Self::Many(ids) => ids.is_empty(),
            Self::One(id) => id.trim().is_empty(),
        }
    }

    /// Comma-joined form the visits endpoint expects.
    fn joined(&self) -> String {
        match self {
            Self::Many(ids) => ids.join(","),
            Self::One(id) => id.clone(),
        }
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn default_offsets() -> Vec<u64> {
    vec![0]
}

/// Health check endpoint handler
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    summary = "Health check endpoint",
    description = "Returns the current health status of the relay service including version and environment information.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthCheck)
    )
)]
pub async fn health_handler(State(state): State<ServerState>) -> impl IntoResponse {
    Json(state.health_check())
}

/// Orders-by-offset relay request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FetchOrdersRequest {
    /// Bearer token forwarded verbatim to the upstream API
    #[serde(default)]
    pub access_token: String,
    /// Seller whose orders are searched
    #[serde(default)]
    #[schema(value_type = String)]
    pub seller_id: RawId,
    /// Pagination offsets to fetch concurrently
    #[serde(default = "default_offsets")]
    #[schema(example = json!([0, 20, 40]))]
    pub offsets: Vec<u64>,
}

impl FetchOrdersRequest {
    fn validate(&self) -> Result<(), ServerError> {
        if blank(&self.access_token) || self.seller_id.is_blank() {
            return Err(ServerError::missing_parameters(
                "accessToken and sellerId are required",
            ));
        }
        Ok(())
    }
}

/// Fetch a seller's orders at several pagination offsets concurrently
///
/// All offsets are dispatched at once; one failing offset does not abort the
/// others, and the result order matches the request order.
#[utoipa::path(
    post,
    path = "/fetchMercadoLivreOrders",
    tag = "orders",
    request_body = FetchOrdersRequest,
    responses(
        (status = 200, description = "Batch processed; per-offset flags inside", body = OrdersEnvelope),
        (status = 400, description = "Missing required parameters", body = String)
    )
)]
pub async fn fetch_orders_handler(
    State(state): State<ServerState>,
    JsonExtractor(request): JsonExtractor<FetchOrdersRequest>,
) -> Result<Json<OrdersEnvelope>, ServerError> {
    metrics::inc_relay_request("fetchMercadoLivreOrders");
    request.validate()?;

    let access_token = request.access_token;
    let seller_id = request.seller_id.to_string();
    let offsets = request.offsets;

    let mut tasks = Vec::with_capacity(offsets.len());
    for &offset in &offsets {
        let meli = Arc::clone(state.meli());
        let access_token = access_token.clone();
        let seller_id = seller_id.clone();
        tasks.push(tokio::spawn(async move {
            into_outcome(meli.search_orders(&access_token, &seller_id, offset).await)
        }));
    }

    let mut results = Vec::with_capacity(tasks.len());
    for (offset, task) in offsets.into_iter().zip(tasks) {
        let outcome = task.await.unwrap_or_else(|e| {
            error!(offset, "orders fan-out task failed: {e}");
            CallOutcome::failure(format!("fan-out task failed: {e}"))
        });
        metrics::record_outcome("orders_search", &outcome);
        results.push(OffsetResult::from_outcome(offset, outcome));
    }

    Ok(Json(OrdersEnvelope::new(results)))
}

/// Shipment status relay request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShipmentStatusRequest {
    /// Bearer token forwarded verbatim to the upstream API
    #[serde(default)]
    pub access_token: String,
    /// Shipments to look up; blank entries are skipped without a call
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub shipment_ids: Vec<RawId>,
}

impl UpdateShipmentStatusRequest {
    fn validate(&self) -> Result<(), ServerError> {
        if blank(&self.access_token) || self.shipment_ids.is_empty() {
            return Err(ServerError::missing_parameters(
                "accessToken and at least one shipmentId are required",
            ));
        }
        Ok(())
    }
}

/// Fetch status and costs for a batch of shipments concurrently
///
/// Each shipment needs two upstream sub-calls (status and costs); both run
/// concurrently and both must succeed for the entry to be successful.
/// Shipments are independent of each other; result order matches request
/// order.
#[utoipa::path(
    post,
    path = "/updateShipmentStatus",
    tag = "shipments",
    request_body = UpdateShipmentStatusRequest,
    responses(
        (status = 200, description = "Batch processed; per-shipment flags inside", body = ShipmentsEnvelope),
        (status = 400, description = "Missing required parameters", body = String)
    )
)]
pub async fn update_shipment_status_handler(
    State(state): State<ServerState>,
    JsonExtractor(request): JsonExtractor<UpdateShipmentStatusRequest>,
) -> Result<Json<ShipmentsEnvelope>, ServerError> {
    metrics::inc_relay_request("updateShipmentStatus");
    request.validate()?;

    let access_token = request.access_token;
    let shipment_ids: Vec<String> = request
        .shipment_ids
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut tasks = Vec::with_capacity(shipment_ids.len());
    for shipment_id in &shipment_ids {
        let meli = Arc::clone(state.meli());
        let access_token = access_token.clone();
        let shipment_id = shipment_id.clone();
        tasks.push(tokio::spawn(async move {
            if blank(&shipment_id) {
                return ShipmentResult::skipped(shipment_id);
            }
            let (status_result, costs_result) = tokio::join!(
                meli.shipment(&access_token, &shipment_id),
                meli.shipment_costs(&access_token, &shipment_id),
            );
            let status_outcome = into_outcome(status_result);
            let costs_outcome = into_outcome(costs_result);
            metrics::record_outcome("shipment_status", &status_outcome);
            metrics::record_outcome("shipment_costs", &costs_outcome);
            ShipmentResult::from_outcomes(shipment_id, status_outcome, costs_outcome)
        }));
    }

    let mut results = Vec::with_capacity(tasks.len());
    for (shipment_id, task) in shipment_ids.into_iter().zip(tasks) {
        let result = task.await.unwrap_or_else(|e| {
            error!(%shipment_id, "shipment fan-out task failed: {e}");
            let failure = CallOutcome::failure(format!("fan-out task failed: {e}"));
            ShipmentResult::from_outcomes(shipment_id, failure.clone(), failure)
        });
        results.push(result);
    }

    Ok(Json(ShipmentsEnvelope::new(results)))
}

/// User items relay request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserItemsRequest {
    /// Bearer token forwarded verbatim to the upstream API
    #[serde(default)]
    pub access_token: String,
    /// User whose listings are fetched
    #[serde(default)]
    #[schema(value_type = String)]
    pub user_id: RawId,
}

impl UserItemsRequest {
    fn validate(&self) -> Result<(), ServerError> {
        if blank(&self.access_token) || self.user_id.is_blank() {
            return Err(ServerError::missing_parameters(
                "accessToken and userId are required",
            ));
        }
        Ok(())
    }
}

/// List a user's active listings
#[utoipa::path(
    post,
    path = "/getUserItems",
    tag = "items",
    request_body = UserItemsRequest,
    responses(
        (status = 200, description = "Upstream body wrapped in the success envelope", body = DataEnvelope),
        (status = 400, description = "Missing required parameters", body = String),
        (status = 500, description = "Upstream call failed", body = String)
    )
)]
pub async fn user_items_handler(
    State(state): State<ServerState>,
    JsonExtractor(request): JsonExtractor<UserItemsRequest>,
) -> Result<Json<DataEnvelope>, ServerError> {
    metrics::inc_relay_request("getUserItems");
    request.validate()?;

    let response = state
        .meli()
        .user_items(&request.access_token, &request.user_id.to_string())
        .await
        .map_err(|e| {
            metrics::inc_upstream_call("user_items", "failure");
            ServerError::upstream(e)
        })?;
    metrics::inc_upstream_call("user_items", "success");

    Ok(Json(DataEnvelope::new(response.body)))
}

/// Item details relay request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetailsRequest {
    /// Bearer token forwarded verbatim to the upstream API
    #[serde(default)]
    pub access_token: String,
    /// Listing to fetch
    #[serde(default)]
    pub item_id: String,
}

impl ItemDetailsRequest {
    fn validate(&self) -> Result<(), ServerError> {
        if blank(&self.access_token) || blank(&self.item_id) {
            return Err(ServerError::missing_parameters(
                "accessToken and itemId are required",
            ));
        }
        Ok(())
    }
}

/// Fetch one listing's details
#[utoipa::path(
    post,
    path = "/getItemDetails",
    tag = "items",
    request_body = ItemDetailsRequest,
    responses(
        (status = 200, description = "Upstream body wrapped in the success envelope", body = DataEnvelope),
        (status = 400, description = "Missing required parameters", body = String),
        (status = 500, description = "Upstream call failed", body = String)
    )
)]
pub async fn item_details_handler(
    State(state): State<ServerState>,
    JsonExtractor(request): JsonExtractor<ItemDetailsRequest>,
) -> Result<Json<DataEnvelope>, ServerError> {
    metrics::inc_relay_request("getItemDetails");
    request.validate()?;

    let response = state
        .meli()
        .item_details(&request.access_token, &request.item_id)
        .await
        .map_err(|e| {
            metrics::inc_upstream_call("item_details", "failure");
            ServerError::upstream(e)
        })?;
    metrics::inc_upstream_call("item_details", "success");

    Ok(Json(DataEnvelope::new(response.body)))
}

/// Item visits relay request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemVisitsRequest {
    /// Bearer token forwarded verbatim to the upstream API
    #[serde(default)]
    pub access_token: String,
    /// Listings to report visits for; a single id or an array
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub item_ids: ItemIds,
    /// Window start (inclusive)
    #[serde(default)]
    pub date_from: String,
    /// Window end (inclusive)
    #[serde(default)]
    pub date_to: String,
}

impl ItemVisitsRequest {
    fn validate(&self) -> Result<(), ServerError> {
        if blank(&self.access_token)
            || self.item_ids.is_empty()
            || blank(&self.date_from)
            || blank(&self.date_to)
        {
            return Err(ServerError::missing_parameters(
                "accessToken, itemIds, dateFrom and dateTo are required",
            ));
        }
        Ok(())
    }
}

/// Fetch visit statistics for one or more listings
#[utoipa::path(
    post,
    path = "/getItemVisits",
    tag = "items",
    request_body = ItemVisitsRequest,
    responses(
        (status = 200, description = "Upstream body wrapped in the success envelope", body = DataEnvelope),
        (status = 400, description = "Missing required parameters", body = String),
        (status = 500, description = "Upstream call failed", body = String)
    )
)]
pub async fn item_visits_handler(
    State(state): State<ServerState>,
    JsonExtractor(request): JsonExtractor<ItemVisitsRequest>,
) -> Result<Json<DataEnvelope>, ServerError> {
    metrics::inc_relay_request("getItemVisits");
    request.validate()?;

    let response = state
        .meli()
        .item_visits(
            &request.access_token,
            &request.item_ids.joined(),
            &request.date_from,
            &request.date_to,
        )
        .await
        .map_err(|e| {
            metrics::inc_upstream_call("item_visits", "failure");
            ServerError::upstream(e)
        })?;
    metrics::inc_upstream_call("item_visits", "success");

    Ok(Json(DataEnvelope::new(response.body)))
}

/// Filtered orders relay request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilteredOrdersRequest {
    /// Bearer token forwarded verbatim to the upstream API
    #[serde(default)]
    pub access_token: String,
    /// Seller whose orders are searched
    #[serde(default)]
    #[schema(value_type = String)]
    pub seller_id: RawId,
    /// Window start (inclusive)
    #[serde(default)]
    pub date_from: String,
    /// Window end (inclusive)
    #[serde(default)]
    pub date_to: String,
    /// Optional listing filter
    pub item_id: Option<String>,
}

impl FilteredOrdersRequest {
    fn validate(&self) -> Result<(), ServerError> {
        if blank(&self.access_token)
            || self.seller_id.is_blank()
            || blank(&self.date_from)
            || blank(&self.date_to)
        {
            return Err(ServerError::missing_parameters(
                "accessToken, sellerId, dateFrom and dateTo are required",
            ));
        }
        Ok(())
    }
}

/// Search a seller's orders within a creation-date window
#[utoipa::path(
    post,
    path = "/getFilteredOrders",
    tag = "orders",
    request_body = FilteredOrdersRequest,
    responses(
        (status = 200, description = "Upstream body wrapped in the success envelope", body = DataEnvelope),
        (status = 400, description = "Missing required parameters", body = String),
        (status = 500, description = "Upstream call failed", body = String)
    )
)]
pub async fn filtered_orders_handler(
    State(state): State<ServerState>,
    JsonExtractor(request): JsonExtractor<FilteredOrdersRequest>,
) -> Result<Json<DataEnvelope>, ServerError> {
    metrics::inc_relay_request("getFilteredOrders");
    request.validate()?;

    let item_id = request.item_id.as_deref().filter(|id| !blank(id));
    let response = state
        .meli()
        .filtered_orders(
            &request.access_token,
            &request.seller_id.to_string(),
            &request.date_from,
            &request.date_to,
            item_id,
        )
        .await
        .map_err(|e| {
            metrics::inc_upstream_call("filtered_orders", "failure");
            ServerError::upstream(e)
        })?;
    metrics::inc_upstream_call("filtered_orders", "success");

    Ok(Json(DataEnvelope::new(response.body)))
}

/// Token refresh relay request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    /// OAuth application id
    #[serde(default)]
    #[schema(value_type = String)]
    pub app_id: RawId,
    /// OAuth application secret
    #[serde(default)]
    pub secret_key: String,
    /// Refresh token from a previous grant
    #[serde(default)]
    pub refresh_token: String,
    /// Redirect URI registered for the application
    #[serde(default)]
    pub redirect_uri: String,
}

impl RefreshTokenRequest {
    fn validate(&self) -> Result<(), ServerError> {
        if self.app_id.is_blank()
            || blank(&self.secret_key)
            || blank(&self.refresh_token)
            || blank(&self.redirect_uri)
        {
            return Err(ServerError::missing_parameters(
                "appId, secretKey, refreshToken and redirectUri are required",
            ));
        }
        Ok(())
    }
}

/// Exchange a refresh token for a new access token
///
/// The relay never issues tokens itself; it forwards the refresh-token grant
/// to the upstream token endpoint and passes the payload back.
#[utoipa::path(
    post,
    path = "/refreshToken",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "OAuth token payload wrapped in the success envelope", body = DataEnvelope),
        (status = 400, description = "Missing required parameters", body = String),
        (status = 500, description = "Upstream call failed", body = String)
    )
)]
pub async fn refresh_token_handler(
    State(state): State<ServerState>,
    JsonExtractor(request): JsonExtractor<RefreshTokenRequest>,
) -> Result<Json<DataEnvelope>, ServerError> {
    metrics::inc_relay_request("refreshToken");
    request.validate()?;

    let grant = RefreshTokenGrant {
        app_id: request.app_id.to_string(),
        secret_key: request.secret_key,
        refresh_token: request.refresh_token,
        redirect_uri: request.redirect_uri,
    };
    let response = state
        .meli()
        .refresh_access_token(&grant)
        .await
        .map_err(|e| {
            metrics::inc_upstream_call("oauth_token", "failure");
            ServerError::upstream(e)
        })?;
    metrics::inc_upstream_call("oauth_token", "success");

    Ok(Json(DataEnvelope::new(response.body)))
}

/// Order lookup relay request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLookupRequest {
    /// Bearer token forwarded verbatim to the upstream API
    #[serde(default)]
    pub access_token: String,
    /// Order to fetch
    #[serde(default)]
    #[schema(value_type = String)]
    pub order_id: RawId,
}

impl OrderLookupRequest {
    fn validate(&self) -> Result<(), ServerError> {
        if blank(&self.access_token) || self.order_id.is_blank() {
            return Err(ServerError::missing_parameters(
                "accessToken and orderId are required",
            ));
        }
        Ok(())
    }
}

/// Fetch one order by id
///
/// Unlike the other single-call endpoints, an upstream failure here
/// propagates the upstream status code and error body to the caller.
#[utoipa::path(
    post,
    path = "/pegar-order",
    tag = "orders",
    request_body = OrderLookupRequest,
    responses(
        (status = 200, description = "Order payload wrapped in the success envelope", body = OrderEnvelope),
        (status = 400, description = "Missing required parameters", body = String),
        (status = 500, description = "Upstream call failed; upstream status propagated when known", body = String)
    )
)]
pub async fn order_lookup_handler(
    State(state): State<ServerState>,
    JsonExtractor(request): JsonExtractor<OrderLookupRequest>,
) -> Result<Json<OrderEnvelope>, ServerError> {
    metrics::inc_relay_request("pegar-order");
    request.validate()?;

    let response = state
        .meli()
        .order(&request.access_token, &request.order_id.to_string())
        .await
        .map_err(|e| {
            metrics::inc_upstream_call("order", "failure");
            ServerError::order_lookup(e)
        })?;
    metrics::inc_upstream_call("order", "success");

    Ok(Json(OrderEnvelope::new(response.body)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn fetch_orders_requires_token_and_seller() {
        let request: FetchOrdersRequest = parse(json!({"sellerId": "123"}));
        let error = request.validate().unwrap_err();
        match error {
            ServerError::MissingParameters { details } => {
                assert_eq!(details, "accessToken and sellerId are required");
            }
            other => panic!("expected MissingParameters, got: {other:?}"),
        }
    }

    #[test]
    fn fetch_orders_defaults_to_offset_zero() {
        let request: FetchOrdersRequest =
            parse(json!({"accessToken": "t", "sellerId": 123}));
        assert!(request.validate().is_ok());
        assert_eq!(request.offsets, vec![0]);
    }

    #[test]
    fn fetch_orders_accepts_numeric_seller_id() {
        let request: FetchOrdersRequest =
            parse(json!({"accessToken": "t", "sellerId": 456789}));
        assert_eq!(request.seller_id.to_string(), "456789");
    }

    #[test]
    fn shipments_require_non_empty_id_list() {
        let request: UpdateShipmentStatusRequest =
            parse(json!({"accessToken": "t", "shipmentIds": []}));
        let error = request.validate().unwrap_err();
        match error {
            ServerError::MissingParameters { details } => {
                assert_eq!(
                    details,
                    "accessToken and at least one shipmentId are required"
                );
            }
            other => panic!("expected MissingParameters, got: {other:?}"),
        }
    }

    #[test]
    fn blank_shipment_ids_pass_validation() {
        // Blank entries are skipped per item, not rejected up front
        let request: UpdateShipmentStatusRequest =
            parse(json!({"accessToken": "t", "shipmentIds": ["", "40123"]}));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn item_visits_accepts_single_string_id() {
        let request: ItemVisitsRequest = parse(json!({
            "accessToken": "t",
            "itemIds": "MLB1",
            "dateFrom": "2025-01-01",
            "dateTo": "2025-01-31"
        }));
        assert!(request.validate().is_ok());
        assert_eq!(request.item_ids.joined(), "MLB1");
    }

    #[test]
    fn item_visits_joins_id_array() {
        let request: ItemVisitsRequest = parse(json!({
            "accessToken": "t",
            "itemIds": ["MLB1", "MLB2"],
            "dateFrom": "2025-01-01",
            "dateTo": "2025-01-31"
        }));
        assert_eq!(request.item_ids.joined(), "MLB1,MLB2");
    }

    #[test]
    fn item_visits_rejects_empty_id_list() {
        let request: ItemVisitsRequest = parse(json!({
            "accessToken": "t",
            "itemIds": [],
            "dateFrom": "2025-01-01",
            "dateTo": "2025-01-31"
        }));
        assert!(request.validate().is_err());
    }

    #[test]
    fn filtered_orders_item_filter_is_optional() {
        let request: FilteredOrdersRequest = parse(json!({
            "accessToken": "t",
            "sellerId": "123",
            "dateFrom": "2025-01-01",
            "dateTo": "2025-01-31"
        }));
        assert!(request.validate().is_ok());
        assert!(request.item_id.is_none());
    }

    #[test]
    fn refresh_token_requires_all_grant_fields() {
        let request: RefreshTokenRequest = parse(json!({
            "appId": "app-1",
            "secretKey": "s",
            "refreshToken": "r"
        }));
        let error = request.validate().unwrap_err();
        match error {
            ServerError::MissingParameters { details } => {
                assert_eq!(
                    details,
                    "appId, secretKey, refreshToken and redirectUri are required"
                );
            }
            other => panic!("expected MissingParameters, got: {other:?}"),
        }
    }

    #[test]
    fn order_lookup_requires_order_id() {
        let request: OrderLookupRequest = parse(json!({"accessToken": "t", "orderId": ""}));
        assert!(request.validate().is_err());
    }
}
