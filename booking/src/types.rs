//! Domain types for booking sessions.
//!
//! Catalog records ([`Item`], [`Category`]), line-item [`Selections`],
//! customer data, booking form details, and the [`BookingData`] snapshot
//! handed to adapters for validation and payload shaping.

use chrono::NaiveDate;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

// ============================================================================
// Money Value Object (minor units to avoid floating point errors)
// ============================================================================

/// An amount of money in minor units (kobo, cents)
///
/// Serialized as a major-unit JSON number (`1500.5`), deserialized from a
/// number or a numeric string, since backends disagree on the encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Zero
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from minor units
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Creates a `Money` value from whole major units
    #[must_use]
    pub const fn from_major(major: i64) -> Self {
        Self(major.saturating_mul(100))
    }

    /// Returns the amount in minor units
    #[must_use]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies by a quantity, saturating at the numeric bounds
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }

    /// Major-unit value as a float, for JSON payloads
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Booking amounts are far below 2^52 minor units
    pub fn as_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[allow(clippy::cast_possible_truncation)] // Rounded and range-checked by the caller
    fn from_major_f64(value: f64) -> Option<Self> {
        let minor = (value * 100.0).round();
        if minor.is_finite() && minor.abs() < 9.0e15 {
            Some(Self(minor as i64))
        } else {
            None
        }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.as_major_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MoneyVisitor;

        impl Visitor<'_> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or numeric string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                Ok(Money::from_major(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                i64::try_from(v)
                    .map(Money::from_major)
                    .map_err(|_| E::custom("amount out of range"))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                Money::from_major_f64(v).ok_or_else(|| E::custom("amount out of range"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    return Ok(Money::ZERO);
                }
                let value: f64 = trimmed
                    .replace(',', "")
                    .parse()
                    .map_err(|_| E::custom(format!("invalid amount `{v}`")))?;
                self.visit_f64(value)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Money, E> {
                Ok(Money::ZERO)
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

// ============================================================================
// Identifiers
// ============================================================================

/// Backend identifier of an item, sub-item, or category
///
/// Backends send ids as numbers or strings; both are stored as text.
/// Numeric ids serialize back as JSON numbers.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an id from any displayable value
    #[must_use]
    pub fn new(id: impl fmt::Display) -> Self {
        Self(id.to_string())
    }

    /// The id as text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<u64>() {
            Ok(n) if !self.0.starts_with('0') || self.0 == "0" => serializer.serialize_u64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = ItemId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer id")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ItemId, E> {
                Ok(ItemId::new(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ItemId, E> {
                Ok(ItemId::new(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ItemId, E> {
                Ok(ItemId::from(v))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// A bookable record: an event, ticket type, furniture piece, package, or
/// one of their sub-items (ticket tiers, rental sessions)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Backend id
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unit price (ticket price, base rental price, per-person package price)
    #[serde(default)]
    pub price: Money,
    /// Image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Category id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ItemId>,
    /// Smallest bookable group (group packages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_group_size: Option<u32>,
    /// Largest bookable group (group packages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_group_size: Option<u32>,
    /// Every other backend field, preserved for the view layer
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Creates an item with a name and no price
    #[must_use]
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            price: Money::ZERO,
            image_url: None,
            category: None,
            min_group_size: None,
            max_group_size: None,
            extra: Map::new(),
        }
    }

    /// Sets the unit price
    #[must_use]
    pub const fn with_price(mut self, price: Money) -> Self {
        self.price = price;
        self
    }

    /// Sets the group size bounds
    #[must_use]
    pub const fn with_group_size(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_group_size = min;
        self.max_group_size = max;
        self
    }
}

/// A catalog category
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Backend id
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Query filters for the item list
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters(BTreeMap<String, String>);

impl Filters {
    /// No filters
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds a filter
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Filters as query pairs
    #[must_use]
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Whether no filter is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Selections
// ============================================================================

/// A chosen line item with its quantity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Line-item id (ticket tier, session)
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// Unit price
    pub price: Money,
    /// Quantity; zero means "not selected"
    pub quantity: u32,
    /// Backend ticket/session type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Selection {
    /// Creates a selection
    #[must_use]
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, price: Money, quantity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
            kind: None,
        }
    }

    /// Creates a selection for a catalog sub-item
    #[must_use]
    pub fn of(item: &Item, quantity: u32) -> Self {
        Self::new(item.id.clone(), item.name.clone(), item.price, quantity)
    }

    /// `price * quantity`
    #[must_use]
    pub const fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// Partial update for [`Selections`], keyed by line-item id
pub type SelectionPatch = BTreeMap<ItemId, Selection>;

/// The active line items of a booking
///
/// Only entries with a positive quantity are stored: merging a zero
/// quantity removes the key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Selections(BTreeMap<ItemId, Selection>);

impl Selections {
    /// Empty selections
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Shallow-merge a patch: later writes for the same key win, and keys
    /// whose merged quantity is zero are deleted
    pub fn merge(&mut self, patch: SelectionPatch) {
        for (id, selection) in patch {
            if selection.quantity == 0 {
                self.0.remove(&id);
            } else {
                self.0.insert(id, selection);
            }
        }
    }

    /// Generic total: `sum(quantity * price)`
    #[must_use]
    pub fn total(&self) -> Money {
        self.0.values().map(Selection::line_total).sum()
    }

    /// Look up one line item
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Selection> {
        self.0.get(id)
    }

    /// Iterate over active line items in id order
    pub fn iter(&self) -> impl Iterator<Item = &Selection> {
        self.0.values()
    }

    /// Number of active line items
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Selection> for Selections {
    fn from_iter<I: IntoIterator<Item = Selection>>(iter: I) -> Self {
        let mut selections = Self::new();
        selections.merge(iter.into_iter().map(|s| (s.id.clone(), s)).collect());
        selections
    }
}

// ============================================================================
// Customer and booking form data
// ============================================================================

/// Customer contact details
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Free-text requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

/// Field-by-field update for [`CustomerInfo`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfoPatch {
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Free-text requests
    pub special_requests: Option<String>,
}

impl CustomerInfo {
    /// Apply a patch, returning the names of the fields it touched
    pub fn apply(&mut self, patch: CustomerInfoPatch) -> Vec<&'static str> {
        let mut touched = Vec::new();
        if let Some(v) = patch.first_name {
            self.first_name = v;
            touched.push("first_name");
        }
        if let Some(v) = patch.last_name {
            self.last_name = v;
            touched.push("last_name");
        }
        if let Some(v) = patch.email {
            self.email = v;
            touched.push("email");
        }
        if let Some(v) = patch.phone {
            self.phone = v;
            touched.push("phone");
        }
        if let Some(v) = patch.special_requests {
            self.special_requests = Some(v).filter(|s| !s.is_empty());
            touched.push("special_requests");
        }
        touched
    }
}

/// Adapter-specific booking form fields
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetails {
    /// Rental/event date (furniture)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,
    /// Preferred visit date (group)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_date: Option<NaiveDate>,
    /// Number of people (group)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_size: Option<u32>,
    /// Delivery address (furniture)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
}

/// Field-by-field update for [`BookingDetails`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetailsPatch {
    /// Rental/event date
    pub event_date: Option<NaiveDate>,
    /// Preferred visit date
    pub preferred_date: Option<NaiveDate>,
    /// Number of people
    pub group_size: Option<u32>,
    /// Delivery address
    pub delivery_address: Option<String>,
}

impl BookingDetails {
    /// Apply a patch, returning the names of the fields it touched
    pub fn apply(&mut self, patch: BookingDetailsPatch) -> Vec<&'static str> {
        let mut touched = Vec::new();
        if let Some(v) = patch.event_date {
            self.event_date = Some(v);
            touched.push("event_date");
        }
        if let Some(v) = patch.preferred_date {
            self.preferred_date = Some(v);
            touched.push("preferred_date");
        }
        if let Some(v) = patch.group_size {
            self.group_size = Some(v);
            touched.push("group_size");
        }
        if let Some(v) = patch.delivery_address {
            self.delivery_address = Some(v).filter(|s| !s.trim().is_empty());
            touched.push("delivery_address");
        }
        touched
    }
}

/// Payment state of a submitted booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting payment
    Pending,
    /// Paid, or free
    Completed,
    /// Payment declined or errored
    Failed,
    /// Abandoned by the customer
    Cancelled,
}

impl PaymentStatus {
    /// Map a gateway status string (`success`, `failed`, `abandoned`, ...)
    #[must_use]
    pub fn from_gateway(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "success" | "successful" | "completed" | "paid" => Self::Completed,
            "failed" | "declined" | "error" | "reversed" => Self::Failed,
            "abandoned" | "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Pending,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Everything an adapter needs to validate and shape a booking
#[derive(Clone, Debug, PartialEq)]
pub struct BookingData {
    /// Active business type
    pub business_type: String,
    /// The event/ticket type/furniture/package being booked
    pub selected_item: Option<Item>,
    /// Active line items
    pub selections: Selections,
    /// Customer contact details
    pub customer: CustomerInfo,
    /// Adapter-specific form fields
    pub details: BookingDetails,
    /// Total computed by the adapter
    pub total_amount: Money,
    /// Configured location
    pub location_id: Option<String>,
    /// Configured currency
    pub currency: String,
}
