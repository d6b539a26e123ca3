// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared types for the Mercado Livre relay
//!
//! This crate holds the transient data model shared between the HTTP surface
//! and the upstream client:
//!
//! - [`outcome::CallOutcome`]: the tagged result of one upstream sub-call,
//!   capturing success and failure as values so a failing call never aborts
//!   its batch siblings
//! - [`shipment`]: the fixed shipment status translation table and the
//!   buyer/seller cost extraction helpers
//! - [`envelope`]: the normalized per-item results and the stable response
//!   envelopes emitted to the frontend, independent of upstream's native shape
//!
//! Everything here is constructed and discarded within a single relay call;
//! nothing is persisted.

pub mod envelope;
pub mod outcome;
pub mod shipment;

pub use envelope::{
    DataEnvelope, OffsetResult, OrderEnvelope, OrdersEnvelope, ShipmentErrors, ShipmentResult,
    ShipmentsEnvelope,
};
pub use outcome::CallOutcome;
pub use shipment::{ShipmentCosts, ShipmentStatusView, buyer_cost, seller_cost, translate_status};
