//! Event ticketing (concerts, conferences, shows).

use super::{ApiConfig, BusinessAdapter, Endpoint, Labels};
use crate::config::WidgetConfig;
use crate::step::BookingStep;
use crate::types::BookingData;
use crate::validation::{ValidationReport, require_item, require_selection, validate_customer};
use serde_json::{Value, json};

/// Adapter for `events` bookings
#[derive(Debug, Clone)]
pub struct EventAdapter {
    api: ApiConfig,
    steps: Vec<BookingStep>,
}

impl EventAdapter {
    /// Business type served by this adapter
    pub const BUSINESS_TYPE: &'static str = "events";

    /// Build the adapter
    #[must_use]
    pub fn new(_config: &WidgetConfig) -> Self {
        Self {
            api: ApiConfig::new()
                .endpoint(Endpoint::List, "/events")
                .endpoint(Endpoint::Details, "/events/{id}")
                .endpoint(Endpoint::SubItems, "/events/{id}/tickets")
                .endpoint(Endpoint::Categories, "/events/categories")
                .endpoint(Endpoint::CreateBooking, "/events/{id}/bookings")
                .endpoint(Endpoint::UpdateBooking, "/event-bookings/{id}")
                .endpoint(Endpoint::CancelBooking, "/event-bookings/{id}/cancel")
                .field("name", "title")
                .field("price", "ticket_price")
                .field("image_url", "banner_url")
                .field("category", "category_id"),
            steps: vec![
                BookingStep::new("list", "Events", "EventList"),
                BookingStep::new("details", "Tickets", "EventDetails"),
                BookingStep::new("checkout", "Checkout", "EventCheckout"),
                BookingStep::new("payment", "Payment", "EventPayment").with_icon("credit-card"),
                BookingStep::new("confirmation", "Confirmation", "EventConfirmation"),
            ],
        }
    }
}

impl BusinessAdapter for EventAdapter {
    fn business_type(&self) -> &str {
        Self::BUSINESS_TYPE
    }

    fn api_config(&self) -> &ApiConfig {
        &self.api
    }

    fn booking_steps(&self) -> &[BookingStep] {
        &self.steps
    }

    fn transform_booking_data(&self, data: &BookingData) -> Value {
        let tickets: Vec<Value> = data
            .selections
            .iter()
            .map(|ticket| {
                json!({
                    "ticket_id": ticket.id,
                    "name": ticket.name,
                    "quantity": ticket.quantity,
                    "unit_price": ticket.price,
                    "subtotal": ticket.line_total(),
                })
            })
            .collect();

        json!({
            "event_id": data.selected_item.as_ref().map(|item| &item.id),
            "customer_first_name": data.customer.first_name.trim(),
            "customer_last_name": data.customer.last_name.trim(),
            "customer_email": data.customer.email.trim(),
            "customer_phone": data.customer.phone.trim(),
            "tickets": tickets,
            "total_amount": data.total_amount,
            "currency": data.currency,
            "special_requests": data.customer.special_requests,
        })
    }

    fn validate_booking_data(&self, data: &BookingData) -> ValidationReport {
        let mut report = ValidationReport::new();
        require_item(data.selected_item.as_ref(), "event_id", "Please choose an event", &mut report);
        require_selection(&data.selections, &mut report);
        validate_customer(&data.customer, &mut report);
        report
    }

    fn labels(&self) -> Labels {
        Labels {
            title: "Get Tickets".to_string(),
            item_noun: "event".to_string(),
            sub_item_noun: "ticket".to_string(),
            submit: "Buy Tickets".to_string(),
            empty_list: "No upcoming events".to_string(),
        }
    }
}
