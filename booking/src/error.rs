//! Error types for the booking engine.
//!
//! Two layers of failure exist:
//!
//! - [`BookingError`]: programmer and integration errors (unknown business
//!   type, invalid step, bad configuration). These are returned from engine
//!   and factory calls and are never routed into the widget's error banner.
//! - [`ApiError`]: transport, status, and envelope failures inside the HTTP
//!   service. They are always normalized into
//!   [`ApiFailure`](crate::api::ApiFailure) before reaching the reducer.

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use universal_booking_runtime::StoreError;

/// Errors surfaced synchronously by the factory, engine, and session manager
#[derive(Debug, Error)]
pub enum BookingError {
    /// No adapter is registered for the requested business type
    #[error("Unsupported business type: {0}")]
    UnsupportedBusinessType(String),

    /// A step key that the active adapter does not declare
    #[error("Unknown step `{step}` for business type `{business_type}`")]
    UnknownStep {
        /// Active business type
        business_type: String,
        /// Rejected step key
        step: String,
    },

    /// The active adapter has no component for the current step
    #[error("No component registered for step `{0}`")]
    MissingComponent(String),

    /// Widget configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be constructed
    #[error("HTTP client setup failed: {0}")]
    HttpClient(String),

    /// The session's store rejected or timed out an action
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures inside the HTTP service before normalization
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Network or connection failure
    #[error("Network error: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Non-success HTTP status
    #[error("Request failed with status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
        /// Decoded response body, if any
        body: Option<Value>,
    },

    /// A `{status: false}` / `{success: false}` envelope
    #[error("{message}")]
    Rejected {
        /// HTTP status code of the rejecting response
        status: u16,
        /// Backend message
        message: String,
        /// Any payload delivered with the rejection
        data: Option<Value>,
    },

    /// The response body could not be decoded into the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// A URL template placeholder could not be resolved
    #[error("Cannot build request URL: {0}")]
    Template(String),

    /// The adapter refused the booking before any request was made
    #[error("Please correct the highlighted fields")]
    Validation(BTreeMap<String, String>),

    /// The adapter declares no URL for a required endpoint
    #[error("No `{0}` endpoint configured for this business type")]
    MissingEndpoint(&'static str),
}
