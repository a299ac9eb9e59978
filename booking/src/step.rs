//! Wizard steps.
//!
//! Step keys are adapter-defined, so they are modelled as a string newtype
//! rather than a global enum. The engine and reducer only ever accept keys
//! the active adapter declares.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Key of a wizard step (`list`, `details`, `checkout`, ...)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepKey(Cow<'static, str>);

impl StepKey {
    /// Entry step: browse the catalog
    pub const LIST: Self = Self::from_static("list");
    /// Item detail step, forced by selecting an item
    pub const DETAILS: Self = Self::from_static("details");
    /// Terminal step
    pub const CONFIRMATION: Self = Self::from_static("confirmation");

    /// Create a key from a static string
    #[must_use]
    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    /// Create a key from runtime input
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(Cow::Owned(key.into()))
    }

    /// The key as text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for StepKey {
    fn from(key: &'static str) -> Self {
        Self::from_static(key)
    }
}

/// Name of the view component that renders a step
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentRef(Cow<'static, str>);

impl ComponentRef {
    /// Create a component reference from a static name
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// The component name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One entry of an adapter's ordered step list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingStep {
    /// Step key
    pub key: StepKey,
    /// Human-readable label
    pub label: String,
    /// Rendering component
    pub component: ComponentRef,
    /// Optional icon name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl BookingStep {
    /// Create a step without an icon
    #[must_use]
    pub fn new(key: &'static str, label: &str, component: &'static str) -> Self {
        Self {
            key: StepKey::from_static(key),
            label: label.to_string(),
            component: ComponentRef::from_static(component),
            icon: None,
        }
    }

    /// Attach an icon
    #[must_use]
    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }
}
