// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Tagged per-call outcome
//!
//! Every fanned-out upstream sub-call resolves to exactly one [`CallOutcome`]
//! before aggregation. Errors are carried as values rather than propagated,
//! so one failing call cannot abort the results of its siblings.

use serde_json::Value;

/// Outcome of a single upstream sub-call. Never both success and failure.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// Upstream answered with a 2xx status.
    Success {
        /// HTTP status returned by the upstream API
        status: u16,
        /// Parsed response body, passed through verbatim
        body: Value,
    },
    /// The call failed: non-2xx status, network error, or timeout.
    Failure {
        /// Human-readable error message
        message: String,
        /// Upstream HTTP status, when a response was received
        status: Option<u16>,
        /// Upstream error body, when a response was received
        body: Option<Value>,
    },
}

impl CallOutcome {
    /// Build a failure outcome with no upstream response attached.
    ///
    /// Used for transport-level errors and aborted fan-out tasks, where no
    /// status code or body exists.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
            status: None,
            body: None,
        }
    }

    /// Whether this outcome is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The failure message, if this outcome is a failure.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message, .. } => Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_is_success() {
        let outcome = CallOutcome::Success {
            status: 200,
            body: json!({"ok": true}),
        };
        assert!(outcome.is_success());
        assert!(outcome.error_message().is_none());
    }

    #[test]
    fn failure_carries_message() {
        let outcome = CallOutcome::failure("connection refused");
        assert!(!outcome.is_success());
        assert_eq!(outcome.error_message(), Some("connection refused"));
    }
}
