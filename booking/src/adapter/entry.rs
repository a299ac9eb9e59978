//! Entry tickets for a venue location (parks, museums, beaches).
//!
//! The catalog is the location's ticket types; each ticket type offers
//! ticket tiers that are bought by count. Payment goes through Paystack in
//! naira, and free bookings are marked completed immediately.

use super::{ApiConfig, BusinessAdapter, Endpoint, Labels};
use crate::config::{Branding, ConfigPatch, WidgetConfig};
use crate::error::BookingError;
use crate::step::BookingStep;
use crate::types::BookingData;
use crate::validation::{ValidationReport, require_item, require_selection, validate_customer};
use serde_json::{Value, json};

/// Currency the entry backend settles in
const ENTRY_CURRENCY: &str = "NGN";

/// Adapter for `entry` bookings
#[derive(Debug, Clone)]
pub struct EntryAdapter {
    api: ApiConfig,
    steps: Vec<BookingStep>,
}

impl EntryAdapter {
    /// Business type served by this adapter
    pub const BUSINESS_TYPE: &'static str = "entry";

    /// Build the adapter for a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidConfig`] without a `locationId`: every
    /// entry endpoint is scoped to a location.
    pub fn new(config: &WidgetConfig) -> Result<Self, BookingError> {
        if config.location_id.as_deref().is_none_or(|id| id.trim().is_empty()) {
            return Err(BookingError::InvalidConfig(
                "entry bookings require a locationId".to_string(),
            ));
        }

        Ok(Self {
            api: ApiConfig::new()
                .endpoint(Endpoint::List, "/locations/{locationId}/ticket-types")
                .endpoint(Endpoint::Details, "/locations/{locationId}/ticket-types/{id}")
                .endpoint(Endpoint::SubItems, "/ticket-types/{id}/tickets")
                .endpoint(Endpoint::CreateBooking, "/entry-bookings")
                .endpoint(Endpoint::UpdateBooking, "/entry-bookings/{id}")
                .endpoint(Endpoint::CancelBooking, "/entry-bookings/{id}/cancel")
                .field("name", "title")
                .field("price", "amount")
                .field("image_url", "image"),
            steps: vec![
                BookingStep::new("list", "Ticket Types", "EntryTicketTypeList"),
                BookingStep::new("details", "Tickets", "EntryTicketSelection"),
                BookingStep::new("booking", "Your Details", "EntryCustomerForm"),
                BookingStep::new("payment", "Payment", "EntryPayment").with_icon("credit-card"),
                BookingStep::new("confirmation", "Confirmation", "EntryConfirmation"),
            ],
        })
    }
}

impl BusinessAdapter for EntryAdapter {
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
        let free = data.total_amount.is_zero();

        let selected_tickets: Vec<Value> = data
            .selections
            .iter()
            .map(|ticket| {
                json!({
                    "id": ticket.id,
                    "name": ticket.name,
                    "count": ticket.quantity,
                    "price": ticket.price,
                    "total_price": ticket.line_total(),
                    "type": ticket.kind.as_deref().unwrap_or("regular"),
                })
            })
            .collect();

        json!({
            "location_id": data.location_id,
            "ticket_type_id": data.selected_item.as_ref().map(|item| &item.id),
            "first_name": data.customer.first_name.trim(),
            "last_name": data.customer.last_name.trim(),
            "email": data.customer.email.trim(),
            "phone": data.customer.phone.trim(),
            "selected_tickets": selected_tickets,
            "total_amount": data.total_amount,
            "currency": ENTRY_CURRENCY,
            "payment_type": if free { "free" } else { "paid" },
            "payment_method": "paystack",
            "payment_status": if free { "completed" } else { "pending" },
        })
    }

    fn validate_booking_data(&self, data: &BookingData) -> ValidationReport {
        let mut report = ValidationReport::new();
        require_item(
            data.selected_item.as_ref(),
            "ticket_type_id",
            "Please choose a ticket type",
            &mut report,
        );
        require_selection(&data.selections, &mut report);
        validate_customer(&data.customer, &mut report);
        report
    }

    fn default_config(&self) -> ConfigPatch {
        ConfigPatch {
            branding: Some(Branding {
                primary_color: Some("#0f766e".to_string()),
                company_name: Some("Entry Tickets".to_string()),
                logo_url: None,
            }),
            ..ConfigPatch::default()
        }
    }

    fn labels(&self) -> Labels {
        Labels {
            title: "Buy Entry Tickets".to_string(),
            item_noun: "ticket type".to_string(),
            sub_item_noun: "ticket".to_string(),
            submit: "Proceed to Payment".to_string(),
            empty_list: "No ticket types are on sale at this location".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{
        BookingDetails, CustomerInfo, Item, Money, Selection, Selections,
    };

    fn adapter() -> EntryAdapter {
        EntryAdapter::new(&WidgetConfig::new("entry", "https://api.test").with_location_id("5")).unwrap()
    }

    fn booking(selections: Selections) -> BookingData {
        let total = selections.total();
        BookingData {
            business_type: "entry".to_string(),
            selected_item: Some(Item::new(3_u64, "Day Pass")),
            selections,
            customer: CustomerInfo {
                first_name: " Ada ".to_string(),
                last_name: "Obi".to_string(),
                email: "ada@example.com".to_string(),
                phone: "08012345678".to_string(),
                special_requests: None,
            },
            details: BookingDetails::default(),
            total_amount: total,
            location_id: Some("5".to_string()),
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn requires_location() {
        let result = EntryAdapter::new(&WidgetConfig::new("entry", "https://api.test"));
        assert!(matches!(result, Err(BookingError::InvalidConfig(_))));
    }

    #[test]
    fn paid_payload_shape() {
        let selections: Selections = [
            Selection::new(10_u64, "Adult", Money::from_major(2000), 2),
            Selection::new(11_u64, "Child", Money::from_major(500), 1),
        ]
        .into_iter()
        .collect();

        let payload = adapter().transform_booking_data(&booking(selections));

        assert_eq!(payload["location_id"], json!("5"));
        assert_eq!(payload["ticket_type_id"], json!(3));
        assert_eq!(payload["first_name"], json!("Ada"));
        assert_eq!(payload["currency"], json!("NGN"));
        assert_eq!(payload["total_amount"], json!(4500));
        assert_eq!(payload["payment_type"], json!("paid"));
        assert_eq!(payload["payment_method"], json!("paystack"));
        assert_eq!(payload["payment_status"], json!("pending"));
        assert_eq!(
            payload["selected_tickets"][0],
            json!({"id": 10, "name": "Adult", "count": 2, "price": 2000, "total_price": 4000, "type": "regular"})
        );
    }

    #[test]
    fn free_booking_is_completed_up_front() {
        let selections: Selections =
            std::iter::once(Selection::new(12_u64, "Community Day", Money::ZERO, 4)).collect();

        let payload = adapter().transform_booking_data(&booking(selections));

        assert_eq!(payload["payment_type"], json!("free"));
        assert_eq!(payload["payment_status"], json!("completed"));
    }

    #[test]
    fn validation_requires_ticket_type_and_tickets() {
        let mut data = booking(Selections::new());
        data.selected_item = None;

        let report = adapter().validate_booking_data(&data);

        assert!(!report.is_valid);
        assert!(report.error("ticket_type_id").is_some());
        assert!(report.error("selections").is_some());
        assert!(report.error("email").is_none());
    }
}
