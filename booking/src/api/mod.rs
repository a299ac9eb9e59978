//! Backend access.
//!
//! [`BookingBackend`] is the seam the reducer's environment depends on;
//! [`UniversalApiService`] is its HTTP implementation. Every operation
//! resolves to an [`ApiResponse`]: transport, status, and envelope failures
//! are normalized into [`ApiFailure`] values, never raised.

pub mod envelope;
mod service;
pub mod template;

pub use service::UniversalApiService;

use crate::adapter::AdapterHandle;
use crate::config::WidgetConfig;
use crate::error::ApiError;
use crate::types::{BookingData, Category, Filters, Item, ItemId, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Successful response: payload plus optional pagination/meta block
#[derive(Clone, Debug, PartialEq)]
pub struct ApiSuccess<T> {
    /// Decoded payload
    pub data: T,
    /// Pagination or meta information
    pub meta: Option<Value>,
}

impl<T> ApiSuccess<T> {
    /// Success without meta
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { data, meta: None }
    }
}

/// Normalized failure of a backend operation
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{error}")]
pub struct ApiFailure {
    /// Message suitable for the error banner
    pub error: String,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
    /// Error payload (field errors, backend body)
    pub data: Option<Value>,
}

impl ApiFailure {
    /// Failure with only a message
    #[must_use]
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: None,
            data: None,
        }
    }
}

impl From<ApiError> for ApiFailure {
    fn from(error: ApiError) -> Self {
        let message = error.to_string();
        match error {
            ApiError::Status { status, body, .. } => Self {
                error: message,
                status: Some(status),
                data: body,
            },
            ApiError::Rejected { status, message, data } => Self {
                error: message,
                status: Some(status),
                data,
            },
            ApiError::Validation(errors) => Self {
                error: message,
                status: None,
                data: Some(serde_json::json!(errors)),
            },
            ApiError::Transport(_)
            | ApiError::Timeout
            | ApiError::Decode(_)
            | ApiError::Template(_)
            | ApiError::MissingEndpoint(_) => Self::message(message),
        }
    }
}

/// Outcome of every backend operation
pub type ApiResponse<T> = Result<ApiSuccess<T>, ApiFailure>;

/// Boxed future returned by [`BookingBackend`] operations
pub type BackendFuture<T> = Pin<Box<dyn Future<Output = ApiResponse<T>> + Send>>;

/// What a backend call needs to know about the session
#[derive(Clone, Debug)]
pub struct RequestContext {
    /// Adapter describing endpoints and payloads
    pub adapter: AdapterHandle,
    /// Session configuration (base URL, location, timeout)
    pub config: WidgetConfig,
}

/// Result of booking creation
#[derive(Clone, Debug, PartialEq)]
pub struct BookingConfirmation {
    /// Backend-issued booking reference
    pub reference: Option<String>,
    /// Payment page to send the customer to
    pub payment_redirect: Option<String>,
    /// Raw response payload
    pub data: Value,
}

/// Result of payment verification
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentVerification {
    /// Gateway status (`success`, `failed`, `abandoned`, ...)
    pub status: String,
    /// Amount paid
    #[serde(default)]
    pub amount: Money,
    /// Currency code
    #[serde(default)]
    pub currency: Option<String>,
    /// Payment time
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    /// Customer block as reported by the gateway
    #[serde(default)]
    pub customer: Option<Value>,
}

/// Backend operations available to a booking session
///
/// Futures are `'static` so they can run as store effects; implementations
/// clone what they need from `self` and the context.
pub trait BookingBackend: Send + Sync {
    /// Catalog listing
    fn get_available_items(&self, ctx: &RequestContext, filters: Filters) -> BackendFuture<Vec<Item>>;

    /// One catalog record
    fn get_item_details(&self, ctx: &RequestContext, id: ItemId) -> BackendFuture<Item>;

    /// Sub-items (ticket tiers, sessions) of a record; empty when the
    /// adapter declares no endpoint
    fn get_sub_items(&self, ctx: &RequestContext, id: ItemId) -> BackendFuture<Vec<Item>>;

    /// Catalog categories; empty when the adapter declares no endpoint
    fn get_categories(&self, ctx: &RequestContext) -> BackendFuture<Vec<Category>>;

    /// Validate, transform, and submit a booking
    fn create_booking(&self, ctx: &RequestContext, data: BookingData) -> BackendFuture<BookingConfirmation>;

    /// Update an existing booking with a backend-shaped patch
    fn update_booking(&self, ctx: &RequestContext, id: String, patch: Value) -> BackendFuture<Value>;

    /// Cancel an existing booking
    fn cancel_booking(&self, ctx: &RequestContext, id: String) -> BackendFuture<Value>;

    /// Verify a payment by reference
    fn verify_payment(&self, ctx: &RequestContext, reference: String) -> BackendFuture<PaymentVerification>;
}
