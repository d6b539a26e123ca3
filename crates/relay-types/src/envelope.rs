// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Normalized per-item results and response envelopes
//!
//! The relay reshapes heterogeneous upstream responses into a small set of
//! stable envelopes. Batch envelopes keep `success: true` even when
//! individual items failed; the per-item entries carry their own flags. The
//! normalization functions here are pure: one [`CallOutcome`] (or pair of
//! outcomes) in, one result out, position preserved by the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    outcome::CallOutcome,
    shipment::{ShipmentCosts, ShipmentStatusView},
};

/// One entry of the orders-by-offset response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OffsetResult {
    /// Pagination offset this entry was fetched for
    pub offset: u64,
    /// Whether the upstream call for this offset succeeded
    pub success: bool,
    /// Upstream HTTP status, when a response was received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Upstream body: search results on success, error body (or null) on failure
    #[schema(value_type = Object)]
    pub data: Value,
    /// Error message, present only on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OffsetResult {
    /// Normalize one offset's call outcome, tagging it with its offset.
    pub fn from_outcome(offset: u64, outcome: CallOutcome) -> Self {
        match outcome {
            CallOutcome::Success { status, body } => Self {
                offset,
                success: true,
                status: Some(status),
                data: body,
                error: None,
            },
            CallOutcome::Failure {
                message,
                status,
                body,
            } => Self {
                offset,
                success: false,
                status,
                data: body.unwrap_or(Value::Null),
                error: Some(message),
            },
        }
    }
}

/// Per-sub-call errors of a failed shipment lookup. Each side is independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShipmentErrors {
    /// Error from the status sub-call, null when that side succeeded
    pub status: Option<String>,
    /// Error from the costs sub-call, null when that side succeeded
    pub costs: Option<String>,
}

/// One entry of the shipment status response.
///
/// Exactly one of three shapes: skipped (blank id, no calls made),
/// successful (both sub-calls succeeded), or failed (either sub-call failed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShipmentResult {
    /// Shipment identifier as supplied by the caller
    #[serde(rename = "shipmentId")]
    pub shipment_id: String,
    /// Set when the entry was skipped because the id was blank
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
    /// Whether both sub-calls succeeded; absent on skipped entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Raw and translated shipment status, present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ShipmentStatusView>,
    /// Buyer/seller cost split, present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub costs: Option<ShipmentCosts>,
    /// Per-sub-call errors, present on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ShipmentErrors>,
}

impl ShipmentResult {
    /// Entry for a blank shipment id; no upstream call was made.
    pub fn skipped(shipment_id: impl Into<String>) -> Self {
        Self {
            shipment_id: shipment_id.into(),
            skipped: Some(true),
            success: None,
            status: None,
            costs: None,
            errors: None,
        }
    }

    /// Normalize the paired status and costs outcomes of one shipment.
    ///
    /// The entry is successful only if both sub-calls succeeded; otherwise
    /// each side's error is reported independently.
    pub fn from_outcomes(
        shipment_id: impl Into<String>,
        status_outcome: CallOutcome,
        costs_outcome: CallOutcome,
    ) -> Self {
        let shipment_id = shipment_id.into();

        match (status_outcome, costs_outcome) {
            (
                CallOutcome::Success {
                    body: status_body, ..
                },
                CallOutcome::Success { body: costs_body, .. },
            ) => Self {
                shipment_id,
                skipped: None,
                success: Some(true),
                status: Some(ShipmentStatusView::from_payload(&status_body)),
                costs: Some(ShipmentCosts::from_payload(&costs_body)),
                errors: None,
            },
            (status_outcome, costs_outcome) => Self {
                shipment_id,
                skipped: None,
                success: Some(false),
                status: None,
                costs: None,
                errors: Some(ShipmentErrors {
                    status: status_outcome.error_message().map(ToString::to_string),
                    costs: costs_outcome.error_message().map(ToString::to_string),
                }),
            },
        }
    }
}

/// Top-level response of the orders-by-offset operation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrdersEnvelope {
    /// Batch-level flag: true when the batch was processed, regardless of
    /// per-offset failures
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// One entry per requested offset, in request order
    pub results: Vec<OffsetResult>,
}

impl OrdersEnvelope {
    /// Assemble the batch envelope; result order must match request order.
    pub fn new(results: Vec<OffsetResult>) -> Self {
        Self {
            success: true,
            message: format!("Processed {} offset requests", results.len()),
            results,
        }
    }
}

/// Top-level response of the shipment status operation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShipmentsEnvelope {
    /// Batch-level flag: true when the batch was processed, regardless of
    /// per-shipment failures
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// One entry per requested shipment id, in request order
    pub results: Vec<ShipmentResult>,
}

impl ShipmentsEnvelope {
    /// Assemble the batch envelope; result order must match request order.
    pub fn new(results: Vec<ShipmentResult>) -> Self {
        Self {
            success: true,
            message: format!("Processed {} shipment requests", results.len()),
            results,
        }
    }
}

/// Success envelope of the pass-through operations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DataEnvelope {
    /// Always true; failures are reported through the error path instead
    pub success: bool,
    /// Upstream body, passed through verbatim
    #[schema(value_type = Object)]
    pub data: Value,
}

impl DataEnvelope {
    /// Wrap an upstream body in the success envelope.
    pub fn new(data: Value) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Success envelope of the order lookup operation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderEnvelope {
    /// Always true; failures are reported through the error path instead
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// Upstream order payload, passed through verbatim
    #[schema(value_type = Object)]
    pub data: Value,
}

impl OrderEnvelope {
    /// Wrap an upstream order payload in the success envelope.
    pub fn new(data: Value) -> Self {
        Self {
            success: true,
            message: "Order details retrieved successfully".to_string(),
            data,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn offset_success_shape() {
        let outcome = CallOutcome::Success {
            status: 200,
            body: json!({"results": [1, 2]}),
        };
        let result = OffsetResult::from_outcome(20, outcome);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "offset": 20,
                "success": true,
                "status": 200,
                "data": {"results": [1, 2]}
            })
        );
    }

    #[test]
    fn offset_failure_surfaces_error_and_body() {
        let outcome = CallOutcome::Failure {
            message: "upstream request failed with status code 403".to_string(),
            status: Some(403),
            body: Some(json!({"message": "forbidden"})),
        };
        let result = OffsetResult::from_outcome(40, outcome);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["status"], json!(403));
        assert_eq!(value["data"], json!({"message": "forbidden"}));
        assert_eq!(
            value["error"],
            json!("upstream request failed with status code 403")
        );
    }

    #[test]
    fn offset_transport_failure_has_null_data() {
        let result = OffsetResult::from_outcome(0, CallOutcome::failure("connection reset"));

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["data"], Value::Null);
        assert!(value.get("status").is_none());
    }

    #[test]
    fn skipped_entry_has_no_status_or_costs() {
        let result = ShipmentResult::skipped("");
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value, json!({"shipmentId": "", "skipped": true}));
    }

    #[test]
    fn shipment_success_translates_and_extracts() {
        let status_outcome = CallOutcome::Success {
            status: 200,
            body: json!({"id": 42, "status": "delivered"}),
        };
        let costs_outcome = CallOutcome::Success {
            status: 200,
            body: json!({"receiver": {"cost": 15.5}, "senders": [{"cost": 10}]}),
        };
        let result = ShipmentResult::from_outcomes("42", status_outcome, costs_outcome);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "shipmentId": "42",
                "success": true,
                "status": {"raw": "delivered", "translated": "Entregue"},
                "costs": {"buyer": 15.5, "seller": 10.0}
            })
        );
    }

    #[test]
    fn shipment_partial_failure_reports_each_side() {
        let status_outcome = CallOutcome::Success {
            status: 200,
            body: json!({"status": "shipped"}),
        };
        let costs_outcome = CallOutcome::Failure {
            message: "upstream request failed with status code 404".to_string(),
            status: Some(404),
            body: None,
        };
        let result = ShipmentResult::from_outcomes("43", status_outcome, costs_outcome);

        assert_eq!(result.success, Some(false));
        assert!(result.status.is_none());
        assert!(result.costs.is_none());
        let errors = result.errors.unwrap();
        assert_eq!(errors.status, None);
        assert_eq!(
            errors.costs.as_deref(),
            Some("upstream request failed with status code 404")
        );
    }

    #[test]
    fn shipment_errors_serialize_nulls() {
        let result = ShipmentResult::from_outcomes(
            "44",
            CallOutcome::failure("timeout"),
            CallOutcome::Success {
                status: 200,
                body: json!({}),
            },
        );

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value["errors"],
            json!({"status": "timeout", "costs": null})
        );
    }

    #[test]
    fn batch_envelopes_count_results() {
        let orders = OrdersEnvelope::new(vec![]);
        assert!(orders.success);
        assert_eq!(orders.message, "Processed 0 offset requests");

        let shipments = ShipmentsEnvelope::new(vec![ShipmentResult::skipped("")]);
        assert_eq!(shipments.message, "Processed 1 shipment requests");
    }

    #[test]
    fn order_envelope_message() {
        let envelope = OrderEnvelope::new(json!({"id": 7}));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["message"], json!("Order details retrieved successfully"));
        assert_eq!(value["data"], json!({"id": 7}));
    }
}
