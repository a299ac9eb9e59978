//! Client-side booking validation helpers shared by adapters.
//!
//! Adapters compose these checks inside
//! [`BusinessAdapter::validate_booking_data`](crate::adapter::BusinessAdapter::validate_booking_data).

use crate::types::{CustomerInfo, Item, Selections};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of validating a booking: field name → message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the booking may be submitted
    pub is_valid: bool,
    /// Field-keyed messages
    pub errors: BTreeMap<String, String>,
}

impl ValidationReport {
    /// An empty, valid report
    #[must_use]
    pub const fn new() -> Self {
        Self {
            is_valid: true,
            errors: BTreeMap::new(),
        }
    }

    /// Record an error for a field; the first message per field wins
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.is_valid = false;
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Message for a field, if any
    #[must_use]
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate required customer fields and their formats
pub fn validate_customer(customer: &CustomerInfo, report: &mut ValidationReport) {
    if customer.first_name.trim().is_empty() {
        report.add("first_name", "First name is required");
    }

    if customer.last_name.trim().is_empty() {
        report.add("last_name", "Last name is required");
    }

    if customer.email.trim().is_empty() {
        report.add("email", "Email is required");
    } else if !is_valid_email(customer.email.trim()) {
        report.add("email", "Please enter a valid email address");
    }

    if customer.phone.trim().is_empty() {
        report.add("phone", "Phone number is required");
    } else if !is_valid_phone(customer.phone.trim()) {
        report.add("phone", "Please enter a valid phone number");
    }
}

/// Require at least one active line item
pub fn require_selection(selections: &Selections, report: &mut ValidationReport) {
    if selections.is_empty() {
        report.add("selections", "Please select at least one item");
    }
}

/// Require a selected catalog item
pub fn require_item(item: Option<&Item>, field: &str, message: &str, report: &mut ValidationReport) {
    if item.is_none() {
        report.add(field, message);
    }
}

/// Validate email address format.
///
/// - Must contain exactly one `@`
/// - Must have non-empty local and domain parts
/// - Domain must contain a dot, with no empty labels
/// - Length must be between 3 and 255 characters
///
/// # Examples
///
/// ```
/// use universal_booking::validation::is_valid_email;
///
/// assert!(is_valid_email("guest@example.com"));
/// assert!(is_valid_email("guest+vip@tickets.example.com"));
/// assert!(!is_valid_email("guest"));
/// assert!(!is_valid_email("@example.com"));
/// assert!(!is_valid_email("guest@"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    if !domain.contains('.') {
        return false;
    }

    let valid_local_chars = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_');
    let valid_domain_chars = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-');

    if !local.chars().all(valid_local_chars) || !domain.chars().all(valid_domain_chars) {
        return false;
    }

    domain.split('.').all(|label| !label.is_empty())
}

/// Validate phone number format.
///
/// Accepts 7 to 15 digits with an optional leading `+`; spaces, hyphens and
/// parentheses are allowed as separators.
///
/// # Examples
///
/// ```
/// use universal_booking::validation::is_valid_phone;
///
/// assert!(is_valid_phone("+234 801 234 5678"));
/// assert!(is_valid_phone("(555) 123-4567"));
/// assert!(!is_valid_phone("12345"));
/// assert!(!is_valid_phone("call me"));
/// ```
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    let rest = phone.strip_prefix('+').unwrap_or(phone);

    let mut digits = 0;
    for c in rest.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '(' | ')' => {},
            _ => return false,
        }
    }

    (7..=15).contains(&digits)
}
