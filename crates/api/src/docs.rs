// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! API documentation definitions
//!
//! Aggregates the annotated handlers and schemas into one `OpenAPI` document.

use relay_types::{
    DataEnvelope, OffsetResult, OrderEnvelope, OrdersEnvelope, ShipmentCosts, ShipmentErrors,
    ShipmentResult, ShipmentStatusView, ShipmentsEnvelope,
};
use utoipa::OpenApi;

use crate::{routes::handlers, state::HealthCheck};

/// `OpenAPI` documentation for the relay service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mercado Livre Relay API",
        description = "Thin backend relay that forwards frontend requests to the Mercado Livre REST API with bearer authentication and response normalization.",
        version = env!("CARGO_PKG_VERSION"),
    ),
    paths(
        handlers::health_handler,
        handlers::fetch_orders_handler,
        handlers::update_shipment_status_handler,
        handlers::user_items_handler,
        handlers::item_details_handler,
        handlers::item_visits_handler,
        handlers::filtered_orders_handler,
        handlers::refresh_token_handler,
        handlers::order_lookup_handler,
    ),
    components(schemas(
        HealthCheck,
        OrdersEnvelope,
        OffsetResult,
        ShipmentsEnvelope,
        ShipmentResult,
        ShipmentErrors,
        ShipmentStatusView,
        ShipmentCosts,
        DataEnvelope,
        OrderEnvelope,
        handlers::FetchOrdersRequest,
        handlers::UpdateShipmentStatusRequest,
        handlers::UserItemsRequest,
        handlers::ItemDetailsRequest,
        handlers::ItemVisitsRequest,
        handlers::FilteredOrdersRequest,
        handlers::RefreshTokenRequest,
        handlers::OrderLookupRequest,
    )),
    tags(
        (name = "health", description = "Service health endpoints"),
        (name = "orders", description = "Order search and lookup relay endpoints"),
        (name = "shipments", description = "Shipment status and cost relay endpoints"),
        (name = "items", description = "Listing relay endpoints"),
        (name = "auth", description = "OAuth token relay endpoints"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::*;

    #[test]
    fn document_lists_all_relay_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/fetchMercadoLivreOrders",
            "/updateShipmentStatus",
            "/getUserItems",
            "/getItemDetails",
            "/getItemVisits",
            "/getFilteredOrders",
            "/refreshToken",
            "/pegar-order",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing path in OpenAPI document: {path}"
            );
        }
    }
}
