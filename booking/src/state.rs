//! Booking session state.

use crate::adapter::{AdapterHandle, PricingContext};
use crate::api::{PaymentVerification, RequestContext};
use crate::config::WidgetConfig;
use crate::step::StepKey;
use crate::types::{
    BookingData, BookingDetails, Category, CustomerInfo, Item, Money, PaymentStatus, Selections,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Identifier of an in-flight backend request
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Raw generation number
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Caller-chosen tag echoed by the terminal action of a submission or
/// payment verification
///
/// Request ids guard state against stale responses; a correlation lets the
/// caller that dispatched a command pick out its own answer from the
/// broadcast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Correlation(Uuid);

impl Correlation {
    /// A fresh random correlation
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Correlation {
    fn default() -> Self {
        Self::new()
    }
}

/// Resources whose responses can go stale
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Resource {
    /// Catalog listing
    Items,
    /// Catalog categories
    Categories,
    /// Sub-items of the selected record
    SubItems,
    /// Booking creation
    Booking,
    /// Payment verification
    Payment,
}

/// Latest request id issued per resource
///
/// A completion is applied only if it carries the latest id for its
/// resource; anything older was superseded or invalidated by a reset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestGenerations {
    next: u64,
    latest: BTreeMap<Resource, RequestId>,
}

impl RequestGenerations {
    /// Issue a new id for `resource`, superseding any in-flight one
    pub fn issue(&mut self, resource: Resource) -> RequestId {
        self.next += 1;
        let id = RequestId(self.next);
        self.latest.insert(resource, id);
        id
    }

    /// Accept a completion; `false` means it is stale and must be dropped
    pub fn settle(&mut self, resource: Resource, id: RequestId) -> bool {
        if self.latest.get(&resource) == Some(&id) {
            self.latest.remove(&resource);
            true
        } else {
            false
        }
    }

    /// Forget the in-flight request for one resource
    pub fn invalidate(&mut self, resource: Resource) {
        self.latest.remove(&resource);
    }

    /// Forget every in-flight request
    pub fn invalidate_all(&mut self) {
        self.latest.clear();
    }

    /// Latest id issued for `resource`, if it is still awaited
    #[must_use]
    pub fn current(&self, resource: Resource) -> Option<RequestId> {
        self.latest.get(&resource).copied()
    }

    /// Whether a request for `resource` is still awaited
    #[must_use]
    pub fn pending(&self, resource: Resource) -> bool {
        self.latest.contains_key(&resource)
    }

    /// Whether any request is still awaited
    #[must_use]
    pub fn in_flight(&self) -> bool {
        !self.latest.is_empty()
    }
}

/// State of one booking session
#[derive(Clone, Debug, PartialEq)]
pub struct BookingState {
    /// Effective configuration: the host's values over the adapter's defaults
    pub config: WidgetConfig,
    /// Configuration as supplied and patched by the host
    pub host_config: WidgetConfig,
    /// Active business adapter
    pub adapter: AdapterHandle,
    /// Whether the widget is visible
    pub widget_open: bool,
    /// Current wizard step; always one of the adapter's steps
    pub current_step: StepKey,
    /// Catalog records
    pub items: Vec<Item>,
    /// Pagination block of the last catalog load
    pub items_meta: Option<Value>,
    /// Catalog categories
    pub categories: Vec<Category>,
    /// The record being booked
    pub selected_item: Option<Item>,
    /// Sub-items (tiers, sessions) of the selected record
    pub sub_items: Vec<Item>,
    /// Selected line items; never holds a zero quantity
    pub selections: Selections,
    /// Customer contact details
    pub customer_info: CustomerInfo,
    /// Adapter-specific form fields
    pub booking_details: BookingDetails,
    /// Adapter-computed total of the current selections
    pub total_amount: Money,
    /// Reference of the created booking
    pub booking_reference: Option<String>,
    /// Payment status of the created booking
    pub payment_status: Option<PaymentStatus>,
    /// Payment page for the created booking
    pub payment_redirect: Option<String>,
    /// Result of the last payment verification
    pub payment_verification: Option<PaymentVerification>,
    /// When the booking was accepted by the backend
    pub booking_confirmed_at: Option<DateTime<Utc>>,
    /// Field → message
    pub validation_errors: BTreeMap<String, String>,
    /// Whether a request is in progress
    pub loading: bool,
    /// Error banner
    pub error: Option<String>,
    /// In-flight request bookkeeping
    pub requests: RequestGenerations,
}

impl BookingState {
    /// Fresh session state on the adapter's initial step
    #[must_use]
    pub fn new(config: WidgetConfig, adapter: AdapterHandle) -> Self {
        Self {
            current_step: adapter.initial_step(),
            config: config.clone().with_defaults(adapter.default_config()),
            host_config: config,
            adapter,
            widget_open: false,
            items: Vec::new(),
            items_meta: None,
            categories: Vec::new(),
            selected_item: None,
            sub_items: Vec::new(),
            selections: Selections::new(),
            customer_info: CustomerInfo::default(),
            booking_details: BookingDetails::default(),
            total_amount: Money::ZERO,
            booking_reference: None,
            payment_status: None,
            payment_redirect: None,
            payment_verification: None,
            booking_confirmed_at: None,
            validation_errors: BTreeMap::new(),
            loading: false,
            error: None,
            requests: RequestGenerations::default(),
        }
    }

    /// Rebuild the effective configuration after the host values or the
    /// adapter changed
    pub fn layer_config(&mut self) {
        self.config = self
            .host_config
            .clone()
            .with_defaults(self.adapter.default_config());
    }

    /// Everything the adapter needs to validate, price, or transform the booking
    #[must_use]
    pub fn booking_data(&self) -> BookingData {
        BookingData {
            business_type: self.adapter.business_type().to_string(),
            selected_item: self.selected_item.clone(),
            selections: self.selections.clone(),
            customer: self.customer_info.clone(),
            details: self.booking_details.clone(),
            total_amount: self.total_amount,
            location_id: self.config.location_id.clone(),
            currency: self.config.currency.clone(),
        }
    }

    /// What a backend call needs from this session
    #[must_use]
    pub fn request_context(&self) -> RequestContext {
        RequestContext {
            adapter: self.adapter.clone(),
            config: self.config.clone(),
        }
    }

    /// Re-price the booking through the adapter
    pub fn recompute_total(&mut self) {
        let context = PricingContext {
            selected_item: self.selected_item.as_ref(),
            details: &self.booking_details,
        };
        self.total_amount = self.adapter.calculate_total(&self.selections, &context);
    }

    /// Clear everything scoped to a single booking attempt
    ///
    /// Catalog, configuration, and visibility survive; in-flight requests
    /// are invalidated.
    pub fn reset_booking(&mut self) {
        self.current_step = self.adapter.initial_step();
        self.selected_item = None;
        self.sub_items.clear();
        self.selections = Selections::new();
        self.customer_info = CustomerInfo::default();
        self.booking_details = BookingDetails::default();
        self.total_amount = Money::ZERO;
        self.booking_reference = None;
        self.payment_status = None;
        self.payment_redirect = None;
        self.payment_verification = None;
        self.booking_confirmed_at = None;
        self.validation_errors.clear();
        self.loading = false;
        self.error = None;
        self.requests.invalidate_all();
    }

    /// Clear the booking plus the catalog and close the widget
    pub fn reset_all(&mut self) {
        self.reset_booking();
        self.items.clear();
        self.items_meta = None;
        self.categories.clear();
        self.widget_open = false;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::adapter::EventAdapter;
    use crate::types::{ItemId, Selection};
    use std::sync::Arc;

    fn state() -> BookingState {
        let config = WidgetConfig::default();
        let adapter = AdapterHandle::new(Arc::new(EventAdapter::new(&config)));
        BookingState::new(config, adapter)
    }

    #[test]
    fn newer_requests_supersede_older_ones() {
        let mut requests = RequestGenerations::default();
        let first = requests.issue(Resource::Items);
        let second = requests.issue(Resource::Items);

        assert!(!requests.settle(Resource::Items, first));
        assert!(requests.settle(Resource::Items, second));
        // settled once only
        assert!(!requests.settle(Resource::Items, second));
    }

    #[test]
    fn resources_are_tracked_independently() {
        let mut requests = RequestGenerations::default();
        let items = requests.issue(Resource::Items);
        let categories = requests.issue(Resource::Categories);

        assert!(requests.in_flight());
        assert!(requests.settle(Resource::Categories, categories));
        requests.invalidate_all();
        assert!(!requests.settle(Resource::Items, items));
        assert!(!requests.in_flight());
    }

    #[test]
    fn new_state_starts_on_the_initial_step() {
        let state = state();
        assert_eq!(state.current_step, StepKey::LIST);
        assert!(!state.widget_open);
        assert_eq!(state.total_amount, Money::ZERO);
    }

    #[test]
    fn reset_booking_keeps_catalog_and_visibility() {
        let mut state = state();
        state.widget_open = true;
        state.items = vec![Item::new(1_u64, "Concert")];
        state.selected_item = Some(Item::new(1_u64, "Concert"));
        state.selections.merge(
            [(ItemId::from(7_u64), Selection::new(7_u64, "VIP", Money::from_major(50), 2))].into(),
        );
        state.recompute_total();
        assert_eq!(state.total_amount, Money::from_major(100));

        state.reset_booking();
        assert!(state.widget_open);
        assert_eq!(state.items.len(), 1);
        assert!(state.selected_item.is_none());
        assert!(state.selections.is_empty());
        assert_eq!(state.total_amount, Money::ZERO);

        state.reset_all();
        assert!(!state.widget_open);
        assert!(state.items.is_empty());
    }

    #[test]
    fn booking_data_reflects_the_session() {
        let mut state = state();
        state.customer_info.first_name = "Ada".to_string();
        let data = state.booking_data();

        assert_eq!(data.business_type, "events");
        assert_eq!(data.customer.first_name, "Ada");
        assert_eq!(data.currency, state.config.currency);
    }
}
