// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Mercado Livre API client
//!
//! This crate implements the upstream-calling half of the relay: one method
//! per Mercado Livre endpoint, each issuing a single authenticated HTTP call
//! and returning either the parsed response or a structured [`MeliError`].
//!
//! Callers that fan out batches convert each per-call `Result` into a
//! [`relay_types::CallOutcome`] via [`into_outcome`], so a failing call is
//! captured as a value instead of aborting its siblings.
//!
//! The client performs no retries, no caching, and no rate limiting; a failed
//! call is reported, not reattempted.

pub mod client;

pub use client::{ApiResponse, MeliClient, MeliConfig, MeliError, RefreshTokenGrant, into_outcome};
