//! Shared fixtures for booking integration tests

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)] // Not every test binary uses every fixture

use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use universal_booking::{
    AdapterFactory, AdapterHandle, ApiFailure, ApiSuccess, BookingBackend, BookingConfirmation,
    BookingData, BookingEnvironment, BookingState, Category, CustomerInfoPatch, Filters, Item,
    ItemId, Money, PaymentVerification, RequestContext, Selection, WidgetConfig,
    api::BackendFuture,
};
use universal_booking_testing::test_clock;

/// Filter key that makes the stub answer slowly with the "stale" catalog
pub const SLOW: &str = "slow";

/// Canned backend
#[derive(Clone)]
pub struct StubBackend {
    pub items: Vec<Item>,
    pub sub_items: Vec<Item>,
    pub booking: Result<BookingConfirmation, ApiFailure>,
    pub verification: Result<PaymentVerification, ApiFailure>,
    pub bookings_created: Arc<AtomicUsize>,
    /// How long the nth `create_booking` takes to answer
    pub booking_latency: Vec<Duration>,
}

impl Default for StubBackend {
    fn default() -> Self {
        Self {
            items: vec![concert()],
            sub_items: vec![vip_tier(), Item::new(11_u64, "Regular").with_price(Money::from_major(20))],
            booking: Ok(BookingConfirmation {
                reference: Some("EVT-0001".to_string()),
                payment_redirect: Some("https://checkout.test/pay/EVT-0001".to_string()),
                data: json!({"reference": "EVT-0001"}),
            }),
            verification: Ok(PaymentVerification {
                status: "success".to_string(),
                amount: Money::from_major(100),
                currency: Some("NGN".to_string()),
                paid_at: None,
                customer: None,
            }),
            bookings_created: Arc::new(AtomicUsize::new(0)),
            booking_latency: Vec::new(),
        }
    }
}

impl StubBackend {
    pub fn bookings_created(&self) -> usize {
        self.bookings_created.load(Ordering::SeqCst)
    }
}

impl BookingBackend for StubBackend {
    fn get_available_items(&self, _ctx: &RequestContext, filters: Filters) -> BackendFuture<Vec<Item>> {
        let items = self.items.clone();
        let slow = filters.pairs().iter().any(|(key, _)| key == SLOW);
        Box::pin(async move {
            if slow {
                tokio::time::sleep(Duration::from_millis(100)).await;
                return Ok(ApiSuccess::new(vec![Item::new(99_u64, "Stale")]));
            }
            Ok(ApiSuccess {
                data: items,
                meta: Some(json!({"page": 1})),
            })
        })
    }

    fn get_item_details(&self, _ctx: &RequestContext, id: ItemId) -> BackendFuture<Item> {
        let found = self.items.iter().find(|item| item.id == id).cloned();
        Box::pin(async move { found.map(ApiSuccess::new).ok_or_else(|| ApiFailure::message("Not found")) })
    }

    fn get_sub_items(&self, _ctx: &RequestContext, _id: ItemId) -> BackendFuture<Vec<Item>> {
        let sub_items = self.sub_items.clone();
        Box::pin(async move { Ok(ApiSuccess::new(sub_items)) })
    }

    fn get_categories(&self, _ctx: &RequestContext) -> BackendFuture<Vec<Category>> {
        Box::pin(async {
            Ok(ApiSuccess::new(vec![Category {
                id: ItemId::from("music"),
                name: "Music".to_string(),
                description: None,
            }]))
        })
    }

    fn create_booking(&self, _ctx: &RequestContext, _data: BookingData) -> BackendFuture<BookingConfirmation> {
        let number = self.bookings_created.fetch_add(1, Ordering::SeqCst) + 1;
        let latency = self.booking_latency.get(number - 1).copied().unwrap_or_default();
        // Successful bookings are numbered in call order: EVT-0001, EVT-0002, ...
        let booking = self.booking.clone().map(|mut confirmation| {
            if confirmation.reference.is_some() {
                confirmation.reference = Some(format!("EVT-{number:04}"));
            }
            confirmation
        });
        Box::pin(async move {
            tokio::time::sleep(latency).await;
            booking.map(ApiSuccess::new)
        })
    }

    fn update_booking(&self, _ctx: &RequestContext, id: String, patch: Value) -> BackendFuture<Value> {
        Box::pin(async move { Ok(ApiSuccess::new(json!({"id": id, "updated": patch}))) })
    }

    fn cancel_booking(&self, _ctx: &RequestContext, id: String) -> BackendFuture<Value> {
        Box::pin(async move { Ok(ApiSuccess::new(json!({"id": id, "status": "cancelled"}))) })
    }

    fn verify_payment(&self, _ctx: &RequestContext, _reference: String) -> BackendFuture<PaymentVerification> {
        let verification = self.verification.clone();
        Box::pin(async move { verification.map(ApiSuccess::new) })
    }
}

pub fn concert() -> Item {
    Item::new(1_u64, "Concert").with_price(Money::from_major(0))
}

pub fn vip_tier() -> Item {
    Item::new(10_u64, "VIP").with_price(Money::from_major(50))
}

pub fn vip(quantity: u32) -> Selection {
    Selection::new(10_u64, "VIP", Money::from_major(50), quantity)
}

pub fn valid_customer() -> CustomerInfoPatch {
    CustomerInfoPatch {
        first_name: Some("Ada".to_string()),
        last_name: Some("Obi".to_string()),
        email: Some("ada@example.com".to_string()),
        phone: Some("+234 801 234 5678".to_string()),
        special_requests: None,
    }
}

pub fn config(business_type: &str) -> WidgetConfig {
    WidgetConfig::new(business_type, "https://api.booking.test/api").with_location_id("7")
}

pub fn adapter(business_type: &str) -> AdapterHandle {
    AdapterHandle::new(
        AdapterFactory::with_builtin()
            .create(business_type, &config(business_type))
            .unwrap(),
    )
}

pub fn state(business_type: &str) -> BookingState {
    BookingState::new(config(business_type), adapter(business_type))
}

pub fn environment(backend: StubBackend) -> BookingEnvironment {
    BookingEnvironment::new(Arc::new(backend), Arc::new(test_clock()))
}
