// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Routes module
//!
//! This module provides route configuration and handlers for the relay server.
//! Relay endpoints keep the exact paths the frontend already calls, so they
//! sit at the root rather than under a versioned prefix.

pub mod handlers;

use axum::{
    Router,
    routing::{get, post},
};
use handlers::{
    fetch_orders_handler, filtered_orders_handler, health_handler, item_details_handler,
    item_visits_handler, order_lookup_handler, refresh_token_handler,
    update_shipment_status_handler, user_items_handler,
};

use crate::{
    metrics::metrics_handler,
    openapi::{openapi_spec, swagger_ui},
    state::ServerState,
};

/// Create application routes
pub fn create_routes() -> Router<ServerState> {
    // Health and metrics endpoints are kept separate for monitoring purposes
    let health_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler));

    let docs_routes = Router::new()
        .route("/api-doc/openapi.json", get(openapi_spec))
        .route("/swagger-ui", get(swagger_ui));

    let relay_routes = Router::new()
        .route("/fetchMercadoLivreOrders", post(fetch_orders_handler))
        .route("/updateShipmentStatus", post(update_shipment_status_handler))
        .route("/getUserItems", post(user_items_handler))
        .route("/getItemDetails", post(item_details_handler))
        .route("/getItemVisits", post(item_visits_handler))
        .route("/getFilteredOrders", post(filtered_orders_handler))
        .route("/refreshToken", post(refresh_token_handler))
        .route("/pegar-order", post(order_lookup_handler));

    Router::new()
        .merge(health_routes)
        .merge(docs_routes)
        .merge(relay_routes)
}
