//! Business adapters.
//!
//! A [`BusinessAdapter`] supplies everything that differs between booking
//! verticals: backend endpoints and field names, the wizard's step list and
//! edges, validation, pricing, and the booking-creation payload. The engine,
//! reducer, and HTTP service only ever talk to `dyn BusinessAdapter`.
//!
//! # Implementing a vertical
//!
//! ```ignore
//! struct SpaAdapter { api: ApiConfig, steps: Vec<BookingStep> }
//!
//! impl BusinessAdapter for SpaAdapter {
//!     fn business_type(&self) -> &str { "spa" }
//!     fn api_config(&self) -> &ApiConfig { &self.api }
//!     fn booking_steps(&self) -> &[BookingStep] { &self.steps }
//!     fn transform_booking_data(&self, data: &BookingData) -> Value { json!({ ... }) }
//!     fn validate_booking_data(&self, data: &BookingData) -> ValidationReport { ... }
//! }
//!
//! factory.register("spa", |_config| Ok(Arc::new(SpaAdapter::new())));
//! ```

mod entry;
mod event;
mod factory;
mod furniture;
mod group;

pub use entry::EntryAdapter;
pub use event::EventAdapter;
pub use factory::{AdapterConstructor, AdapterFactory};
pub use furniture::FurnitureAdapter;
pub use group::GroupAdapter;

use crate::config::ConfigPatch;
use crate::step::{BookingStep, ComponentRef, StepKey};
use crate::types::{BookingData, BookingDetails, CustomerInfo, Item, Money, Selections};
use crate::validation::ValidationReport;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Named backend operations an adapter can declare a URL for
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Endpoint {
    /// Catalog listing
    List,
    /// One catalog record (`{id}`)
    Details,
    /// Sub-items of a record (`{id}`)
    SubItems,
    /// Catalog categories
    Categories,
    /// Booking creation
    CreateBooking,
    /// Booking update (`{id}`)
    UpdateBooking,
    /// Booking cancellation (`{id}`)
    CancelBooking,
}

impl Endpoint {
    /// Stable name of the endpoint
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Details => "details",
            Self::SubItems => "sub_items",
            Self::Categories => "categories",
            Self::CreateBooking => "create_booking",
            Self::UpdateBooking => "update_booking",
            Self::CancelBooking => "cancel_booking",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend description of a vertical
///
/// Endpoint values are URL templates: absolute URLs, or paths joined to
/// `base_url` (falling back to the configured API base URL). `{name}`
/// placeholders are filled in by the HTTP service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL overriding the configured API base URL
    pub base_url: Option<String>,
    /// Endpoint → URL template
    pub endpoints: BTreeMap<Endpoint, String>,
    /// Canonical record field → backend field name
    pub data_fields: BTreeMap<String, String>,
}

impl ApiConfig {
    /// Empty configuration
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base_url: None,
            endpoints: BTreeMap::new(),
            data_fields: BTreeMap::new(),
        }
    }

    /// Override the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Declare an endpoint template
    #[must_use]
    pub fn endpoint(mut self, endpoint: Endpoint, template: &str) -> Self {
        self.endpoints.insert(endpoint, template.to_string());
        self
    }

    /// Map a canonical record field to the backend's name for it
    #[must_use]
    pub fn field(mut self, canonical: &str, backend: &str) -> Self {
        self.data_fields.insert(canonical.to_string(), backend.to_string());
        self
    }

    /// URL template of an endpoint, if declared
    #[must_use]
    pub fn url(&self, endpoint: Endpoint) -> Option<&str> {
        self.endpoints.get(&endpoint).map(String::as_str)
    }
}

/// Cosmetic strings for the view layer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Labels {
    /// Widget title
    pub title: String,
    /// Noun for catalog records
    pub item_noun: String,
    /// Noun for line items
    pub sub_item_noun: String,
    /// Submit button text
    pub submit: String,
    /// Message for an empty catalog
    pub empty_list: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            title: "Book Now".to_string(),
            item_noun: "item".to_string(),
            sub_item_noun: "option".to_string(),
            submit: "Complete Booking".to_string(),
            empty_list: "Nothing is available right now".to_string(),
        }
    }
}

/// Context available to pricing rules besides the line items
#[derive(Clone, Copy, Debug)]
pub struct PricingContext<'a> {
    /// The record being booked
    pub selected_item: Option<&'a Item>,
    /// Adapter-specific form fields
    pub details: &'a BookingDetails,
}

/// Response fields that commonly carry the booking reference
const REFERENCE_PATHS: &[&str] = &[
    "reference",
    "booking_reference",
    "bookingReference",
    "booking.reference",
    "booking.booking_reference",
    "booking_id",
    "booking.id",
    "id",
];

/// Response fields that commonly carry the payment page URL
const REDIRECT_PATHS: &[&str] = &[
    "authorization_url",
    "payment_url",
    "paymentUrl",
    "payment.authorization_url",
    "payment.payment_url",
    "data.authorization_url",
];

/// The contract every booking vertical implements
///
/// Required methods describe the vertical; provided methods derive the rest
/// (components, step edges, generic pricing) and may be overridden.
pub trait BusinessAdapter: Send + Sync {
    /// Stable identifier used for factory lookup
    fn business_type(&self) -> &str;

    /// Backend endpoints and field mapping
    fn api_config(&self) -> &ApiConfig;

    /// Ordered wizard steps; first is initial, last is `confirmation`
    fn booking_steps(&self) -> &[BookingStep];

    /// Convert a booking into the exact JSON the creation endpoint expects
    fn transform_booking_data(&self, data: &BookingData) -> Value;

    /// Synchronous client-side validation
    fn validate_booking_data(&self, data: &BookingData) -> ValidationReport;

    /// Step key → rendering component, derived from [`Self::booking_steps`]
    fn components(&self) -> BTreeMap<StepKey, ComponentRef> {
        self.booking_steps()
            .iter()
            .map(|step| (step.key.clone(), step.component.clone()))
            .collect()
    }

    /// Step a fresh or reset session starts on
    fn initial_step(&self) -> StepKey {
        self.booking_steps()
            .first()
            .map_or(StepKey::LIST, |step| step.key.clone())
    }

    /// Whether `step` is one of this adapter's steps
    fn has_step(&self, step: &StepKey) -> bool {
        self.booking_steps().iter().any(|s| &s.key == step)
    }

    /// Step after `current`, or `None` at the terminal step
    fn next_step(&self, current: &StepKey) -> Option<StepKey> {
        let steps = self.booking_steps();
        let index = steps.iter().position(|s| &s.key == current)?;
        steps.get(index + 1).map(|s| s.key.clone())
    }

    /// Step before `current`, or `None` at the initial step
    fn previous_step(&self, current: &StepKey) -> Option<StepKey> {
        let steps = self.booking_steps();
        let index = steps.iter().position(|s| &s.key == current)?;
        index.checked_sub(1).and_then(|i| steps.get(i)).map(|s| s.key.clone())
    }

    /// Booking total; the generic rule is `sum(quantity * price)`
    fn calculate_total(&self, selections: &Selections, _context: &PricingContext<'_>) -> Money {
        selections.total()
    }

    /// Cosmetic configuration defaults
    fn default_config(&self) -> ConfigPatch {
        ConfigPatch::default()
    }

    /// View-layer strings
    fn labels(&self) -> Labels {
        Labels::default()
    }

    /// Booking reference from a creation response
    fn booking_reference(&self, response: &Value) -> Option<String> {
        find_string(response, REFERENCE_PATHS)
    }

    /// Payment page URL from a creation response
    fn payment_redirect_url(&self, response: &Value) -> Option<String> {
        find_string(response, REDIRECT_PATHS)
    }
}

/// Shared handle to the active adapter
///
/// Compared by business type: two handles for the same vertical are
/// interchangeable.
#[derive(Clone)]
pub struct AdapterHandle(Arc<dyn BusinessAdapter>);

impl AdapterHandle {
    /// Wrap an adapter
    #[must_use]
    pub fn new(adapter: Arc<dyn BusinessAdapter>) -> Self {
        Self(adapter)
    }
}

impl From<Arc<dyn BusinessAdapter>> for AdapterHandle {
    fn from(adapter: Arc<dyn BusinessAdapter>) -> Self {
        Self(adapter)
    }
}

impl Deref for AdapterHandle {
    type Target = dyn BusinessAdapter;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl fmt::Debug for AdapterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AdapterHandle").field(&self.0.business_type()).finish()
    }
}

impl PartialEq for AdapterHandle {
    fn eq(&self, other: &Self) -> bool {
        self.0.business_type() == other.0.business_type()
    }
}

/// Look up the first non-empty string (or number) at any of the dotted paths
pub(crate) fn find_string(value: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| {
        let found = path
            .split('.')
            .try_fold(value, |current, key| current.get(key))?;
        match found {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    })
}

/// Customer contact block used by nested payloads
pub(crate) fn customer_json(customer: &CustomerInfo) -> Value {
    json!({
        "first_name": customer.first_name.trim(),
        "last_name": customer.last_name.trim(),
        "email": customer.email.trim(),
        "phone": customer.phone.trim(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_nested_references() {
        let response = json!({"booking": {"reference": "BK-1", "id": 9}, "id": 3});
        assert_eq!(find_string(&response, REFERENCE_PATHS).as_deref(), Some("BK-1"));

        let response = json!({"booking_id": 42});
        assert_eq!(find_string(&response, REFERENCE_PATHS).as_deref(), Some("42"));

        let response = json!({"reference": ""});
        assert_eq!(find_string(&response, &["reference"]), None);
    }

    #[test]
    fn redirect_url_lookup() {
        let response = json!({"payment": {"authorization_url": "https://pay.test/abc"}});
        assert_eq!(
            find_string(&response, REDIRECT_PATHS).as_deref(),
            Some("https://pay.test/abc")
        );
    }
}
