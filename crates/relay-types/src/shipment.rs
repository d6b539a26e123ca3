// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shipment status translation and cost extraction
//!
//! The upstream API reports shipment status as a raw English token and splits
//! delivery costs between the receiver (buyer) and a list of senders
//! (sellers). This module maps both into the shapes the frontend consumes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Translate a raw upstream shipment status into its Portuguese display form.
///
/// Unrecognized statuses pass through unchanged; the frontend renders them
/// as-is rather than hiding states the upstream API adds later.
pub fn translate_status(raw: &str) -> &str {
    match raw {
        "cancelled" => "Cancelada",
        "delivered" => "Entregue",
        "not_delivered" => "Não Entregue",
        "shipped" => "Enviado",
        "ready_to_ship" => "Pronto para Enviar",
        other => other,
    }
}

/// Raw and translated shipment status, exposed side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShipmentStatusView {
    /// Status token as reported by the upstream API
    pub raw: String,
    /// Portuguese display form
    pub translated: String,
}

impl ShipmentStatusView {
    /// Build the view from a shipment status payload.
    ///
    /// A payload without a `status` field maps to `"N/A"`.
    pub fn from_payload(payload: &Value) -> Self {
        let raw = payload
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("N/A");
        Self {
            raw: raw.to_string(),
            translated: translate_status(raw).to_string(),
        }
    }
}

/// Buyer and seller share of a shipment's cost. Absent values stay null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShipmentCosts {
    /// Cost charged to the buyer (`receiver.cost`)
    pub buyer: Option<f64>,
    /// Cost charged to the seller (first entry of `senders`)
    pub seller: Option<f64>,
}

impl ShipmentCosts {
    /// Extract both cost shares from a shipment costs payload.
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            buyer: buyer_cost(payload),
            seller: seller_cost(payload),
        }
    }
}

/// Buyer cost from `receiver.cost`, coerced to a number. Absent yields `None`.
pub fn buyer_cost(costs: &Value) -> Option<f64> {
    costs
        .get("receiver")
        .and_then(|receiver| receiver.get("cost"))
        .and_then(coerce_number)
}

/// Seller cost from the first entry of `senders`. Absent or empty yields `None`.
pub fn seller_cost(costs: &Value) -> Option<f64> {
    costs
        .get("senders")
        .and_then(Value::as_array)
        .and_then(|senders| senders.first())
        .and_then(|sender| sender.get("cost"))
        .and_then(coerce_number)
}

// The upstream API emits cost fields both as JSON numbers and as numeric
// strings depending on the endpoint version.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
