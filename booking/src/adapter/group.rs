//! Group packages (school trips, corporate outings).
//!
//! A package is priced per person; the booking carries a group size instead
//! of per-line quantities.

use super::{ApiConfig, BusinessAdapter, Endpoint, Labels, PricingContext, customer_json};
use crate::config::WidgetConfig;
use crate::step::BookingStep;
use crate::types::{BookingData, BookingDetails, Item, Money, Selections};
use crate::validation::{ValidationReport, validate_customer};
use serde_json::{Value, json};

/// Adapter for `group` bookings
#[derive(Debug, Clone)]
pub struct GroupAdapter {
    api: ApiConfig,
    steps: Vec<BookingStep>,
}

impl GroupAdapter {
    /// Business type served by this adapter
    pub const BUSINESS_TYPE: &'static str = "group";

    /// Build the adapter
    #[must_use]
    pub fn new(_config: &WidgetConfig) -> Self {
        Self {
            api: ApiConfig::new()
                .endpoint(Endpoint::List, "/group-packages")
                .endpoint(Endpoint::Details, "/group-packages/{id}")
                .endpoint(Endpoint::CreateBooking, "/group-bookings")
                .endpoint(Endpoint::UpdateBooking, "/group-bookings/{id}")
                .endpoint(Endpoint::CancelBooking, "/group-bookings/{id}/cancel")
                .field("name", "package_name")
                .field("price", "price_per_person")
                .field("min_group_size", "min_size")
                .field("max_group_size", "max_size"),
            steps: vec![
                BookingStep::new("list", "Packages", "GroupPackageList"),
                BookingStep::new("details", "Package", "GroupPackageDetails"),
                BookingStep::new("booking", "Group Details", "GroupBookingForm").with_icon("users"),
                BookingStep::new("confirmation", "Confirmation", "GroupConfirmation"),
            ],
        }
    }

    /// Group size: explicit, else the package minimum, else one person
    fn group_size(item: Option<&Item>, details: &BookingDetails) -> u32 {
        details
            .group_size
            .or_else(|| item.and_then(|package| package.min_group_size))
            .unwrap_or(1)
    }
}

impl BusinessAdapter for GroupAdapter {
    fn business_type(&self) -> &str {
        Self::BUSINESS_TYPE
    }

    fn api_config(&self) -> &ApiConfig {
        &self.api
    }

    fn booking_steps(&self) -> &[BookingStep] {
        &self.steps
    }

    /// Package price per person times the group size
    fn calculate_total(&self, _selections: &Selections, context: &PricingContext<'_>) -> Money {
        context.selected_item.map_or(Money::ZERO, |package| {
            package
                .price
                .times(Self::group_size(Some(package), context.details))
        })
    }

    fn transform_booking_data(&self, data: &BookingData) -> Value {
        let package = data.selected_item.as_ref();

        json!({
            "package_id": package.map(|item| &item.id),
            "group_size": Self::group_size(package, &data.details),
            "preferred_date": data.details.preferred_date.map(|date| date.format("%Y-%m-%d").to_string()),
            "contact": customer_json(&data.customer),
            "total_amount": data.total_amount,
            "currency": data.currency,
            "special_requests": data.customer.special_requests,
        })
    }

    fn validate_booking_data(&self, data: &BookingData) -> ValidationReport {
        let mut report = ValidationReport::new();

        match data.selected_item.as_ref() {
            None => report.add("package_id", "Please choose a package"),
            Some(package) => {
                let size = Self::group_size(Some(package), &data.details);
                if size == 0 {
                    report.add("group_size", "Group size must be at least 1");
                }
                if let Some(min) = package.min_group_size.filter(|min| size < *min) {
                    report.add("group_size", format!("This package needs at least {min} people"));
                }
                if let Some(max) = package.max_group_size.filter(|max| size > *max) {
                    report.add("group_size", format!("This package allows at most {max} people"));
                }
            },
        }

        validate_customer(&data.customer, &mut report);
        report
    }

    fn labels(&self) -> Labels {
        Labels {
            title: "Book a Group Package".to_string(),
            item_noun: "package".to_string(),
            sub_item_noun: "guest".to_string(),
            submit: "Request Booking".to_string(),
            empty_list: "No group packages are available".to_string(),
        }
    }
}
