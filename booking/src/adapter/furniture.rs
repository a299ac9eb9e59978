//! Furniture and venue rentals.
//!
//! A piece is rented for an event date; the customer picks rental sessions
//! on top of the piece's base price, and the order is delivered.

use super::{ApiConfig, BusinessAdapter, Endpoint, Labels, PricingContext, customer_json};
use crate::config::WidgetConfig;
use crate::step::BookingStep;
use crate::types::{BookingData, Money, Selections};
use crate::validation::{ValidationReport, require_item, require_selection, validate_customer};
use serde_json::{Value, json};

/// Adapter for `furniture` bookings
#[derive(Debug, Clone)]
pub struct FurnitureAdapter {
    api: ApiConfig,
    steps: Vec<BookingStep>,
}

impl FurnitureAdapter {
    /// Business type served by this adapter
    pub const BUSINESS_TYPE: &'static str = "furniture";

    /// Build the adapter
    #[must_use]
    pub fn new(_config: &WidgetConfig) -> Self {
        Self {
            api: ApiConfig::new()
                .endpoint(Endpoint::List, "/furniture")
                .endpoint(Endpoint::Details, "/furniture/{id}")
                .endpoint(Endpoint::SubItems, "/furniture/{id}/sessions")
                .endpoint(Endpoint::Categories, "/furniture/categories")
                .endpoint(Endpoint::CreateBooking, "/furniture-bookings")
                .endpoint(Endpoint::UpdateBooking, "/furniture-bookings/{id}")
                .endpoint(Endpoint::CancelBooking, "/furniture-bookings/{id}/cancel")
                .field("price", "base_price")
                .field("image_url", "photo_url"),
            steps: vec![
                BookingStep::new("list", "Furniture", "FurnitureList"),
                BookingStep::new("details", "Details", "FurnitureDetails"),
                BookingStep::new("sessions", "Sessions", "FurnitureSessions").with_icon("clock"),
                BookingStep::new("checkout", "Checkout", "FurnitureCheckout"),
                BookingStep::new("confirmation", "Confirmation", "FurnitureConfirmation"),
            ],
        }
    }
}

impl BusinessAdapter for FurnitureAdapter {
    fn business_type(&self) -> &str {
        Self::BUSINESS_TYPE
    }

    fn api_config(&self) -> &ApiConfig {
        &self.api
    }

    fn booking_steps(&self) -> &[BookingStep] {
        &self.steps
    }

    /// Base price of the piece (charged once, when any session is chosen)
    /// plus every session's `price * quantity`
    fn calculate_total(&self, selections: &Selections, context: &PricingContext<'_>) -> Money {
        if selections.is_empty() {
            return Money::ZERO;
        }

        let base = context.selected_item.map_or(Money::ZERO, |item| item.price);
        base + selections.total()
    }

    fn transform_booking_data(&self, data: &BookingData) -> Value {
        let sessions: Vec<Value> = data
            .selections
            .iter()
            .map(|session| {
                json!({
                    "session_id": session.id,
                    "name": session.name,
                    "quantity": session.quantity,
                    "price": session.price,
                    "subtotal": session.line_total(),
                })
            })
            .collect();

        json!({
            "furniture_id": data.selected_item.as_ref().map(|item| &item.id),
            "event_date": data.details.event_date.map(|date| date.format("%Y-%m-%d").to_string()),
            "delivery_address": data.details.delivery_address,
            "sessions": sessions,
            "base_price": data.selected_item.as_ref().map_or(Money::ZERO, |item| item.price),
            "customer": customer_json(&data.customer),
            "total_amount": data.total_amount,
            "currency": data.currency,
        })
    }

    fn validate_booking_data(&self, data: &BookingData) -> ValidationReport {
        let mut report = ValidationReport::new();
        require_item(
            data.selected_item.as_ref(),
            "furniture_id",
            "Please choose a piece of furniture",
            &mut report,
        );
        require_selection(&data.selections, &mut report);
        if data.details.event_date.is_none() {
            report.add("event_date", "Please choose the event date");
        }
        validate_customer(&data.customer, &mut report);
        report
    }

    fn labels(&self) -> Labels {
        Labels {
            title: "Rent Furniture".to_string(),
            item_noun: "piece".to_string(),
            sub_item_noun: "session".to_string(),
            submit: "Confirm Rental".to_string(),
            empty_list: "No furniture is available for rent".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{BookingDetails, CustomerInfo, Item, Selection};
    use chrono::NaiveDate;

    fn adapter() -> FurnitureAdapter {
        FurnitureAdapter::new(&WidgetConfig::default())
    }

    #[test]
    fn base_price_applies_once_sessions_are_chosen() {
        let sofa = Item::new(7_u64, "Velvet Sofa").with_price(Money::from_major(300));
        let details = BookingDetails::default();
        let context = PricingContext { selected_item: Some(&sofa), details: &details };

        assert_eq!(adapter().calculate_total(&Selections::new(), &context), Money::ZERO);

        let selections: Selections = [
            Selection::new(1_u64, "Morning", Money::from_major(50), 2),
            Selection::new(2_u64, "Evening", Money::from_major(80), 1),
        ]
        .into_iter()
        .collect();

        assert_eq!(adapter().calculate_total(&selections, &context), Money::from_major(480));
    }

    #[test]
    fn event_date_is_required() {
        let data = BookingData {
            business_type: "furniture".to_string(),
            selected_item: Some(Item::new(7_u64, "Velvet Sofa")),
            selections: std::iter::once(Selection::new(1_u64, "Morning", Money::from_major(50), 1))
                .collect(),
            customer: CustomerInfo {
                first_name: "Ada".to_string(),
                last_name: "Obi".to_string(),
                email: "ada@example.com".to_string(),
                phone: "08012345678".to_string(),
                special_requests: None,
            },
            details: BookingDetails::default(),
            total_amount: Money::from_major(350),
            location_id: None,
            currency: "NGN".to_string(),
        };

        let report = adapter().validate_booking_data(&data);
        assert_eq!(report.errors.keys().collect::<Vec<_>>(), vec!["event_date"]);

        let mut dated = data;
        dated.details.event_date = NaiveDate::from_ymd_opt(2025, 6, 14);
        dated.details.delivery_address = Some("12 Marina Road".to_string());
        assert!(adapter().validate_booking_data(&dated).is_valid);

        let payload = adapter().transform_booking_data(&dated);
        assert_eq!(payload["event_date"], json!("2025-06-14"));
        assert_eq!(payload["furniture_id"], json!(7));
        assert_eq!(payload["customer"]["first_name"], json!("Ada"));
        assert_eq!(payload["sessions"][0]["session_id"], json!(1));
    }
}
