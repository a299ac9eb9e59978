//! Widget configuration.
//!
//! A [`WidgetConfig`] is created once per session, either from the host page
//! (JSON), from environment variables, or programmatically. It may later be
//! shallow-merged with a [`ConfigPatch`].

use crate::error::BookingError;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default currency for totals and booking payloads
pub const DEFAULT_CURRENCY: &str = "NGN";

/// Default per-request timeout in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;

/// Configuration of one widget instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    /// Business type selecting the adapter (`entry`, `events`, `furniture`, `group`)
    pub business_type: String,
    /// Base URL of the booking backend
    pub api_base_url: String,
    /// Location substituted into `{locationId}` URL placeholders
    pub location_id: Option<String>,
    /// Cosmetic branding
    pub branding: Branding,
    /// Open the widget as soon as the session is created
    pub auto_show: bool,
    /// Currency code attached to totals
    pub currency: String,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
}

/// Branding options passed through to the view layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Branding {
    /// Primary color (CSS color string)
    pub primary_color: Option<String>,
    /// Company name shown in the widget header
    pub company_name: Option<String>,
    /// Logo URL
    pub logo_url: Option<String>,
}

/// Partial configuration; every `Some` field replaces the current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigPatch {
    /// New business type
    pub business_type: Option<String>,
    /// New API base URL
    pub api_base_url: Option<String>,
    /// New location id
    pub location_id: Option<String>,
    /// Replacement branding
    pub branding: Option<Branding>,
    /// New auto-show flag
    pub auto_show: Option<bool>,
    /// New currency code
    pub currency: Option<String>,
    /// New request timeout in milliseconds
    pub request_timeout_ms: Option<u64>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            business_type: "events".to_string(),
            api_base_url: "http://localhost:8000/api".to_string(),
            location_id: None,
            branding: Branding::default(),
            auto_show: false,
            currency: DEFAULT_CURRENCY.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl WidgetConfig {
    /// Create a configuration for a business type and backend, with defaults elsewhere
    #[must_use]
    pub fn new(business_type: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        Self {
            business_type: business_type.into(),
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Set the location id
    #[must_use]
    pub fn with_location_id(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    /// Set the auto-show flag
    #[must_use]
    pub const fn with_auto_show(mut self, auto_show: bool) -> Self {
        self.auto_show = auto_show;
        self
    }

    /// Set the request timeout
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Timeouts beyond u64 milliseconds are not meaningful
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Load configuration from `BOOKING_*` environment variables.
    ///
    /// Missing or unparsable values fall back to [`WidgetConfig::default`].
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            business_type: env::var("BOOKING_BUSINESS_TYPE").unwrap_or(defaults.business_type),
            api_base_url: env::var("BOOKING_API_BASE_URL").unwrap_or(defaults.api_base_url),
            location_id: env::var("BOOKING_LOCATION_ID").ok(),
            branding: Branding {
                primary_color: env::var("BOOKING_PRIMARY_COLOR").ok(),
                company_name: env::var("BOOKING_COMPANY_NAME").ok(),
                logo_url: env::var("BOOKING_LOGO_URL").ok(),
            },
            auto_show: env::var("BOOKING_AUTO_SHOW")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.auto_show),
            currency: env::var("BOOKING_CURRENCY").unwrap_or(defaults.currency),
            request_timeout_ms: env::var("BOOKING_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_ms),
        }
    }

    /// Parse a host-supplied JSON configuration (camelCase keys).
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidConfig`] if the JSON does not match.
    pub fn from_json(json: &str) -> Result<Self, BookingError> {
        serde_json::from_str(json).map_err(|e| BookingError::InvalidConfig(e.to_string()))
    }

    /// Shallow-merge a patch into this configuration
    pub fn merge(&mut self, patch: ConfigPatch) {
        if let Some(business_type) = patch.business_type {
            self.business_type = business_type;
        }
        if let Some(api_base_url) = patch.api_base_url {
            self.api_base_url = api_base_url;
        }
        if let Some(location_id) = patch.location_id {
            self.location_id = Some(location_id);
        }
        if let Some(branding) = patch.branding {
            self.branding = branding;
        }
        if let Some(auto_show) = patch.auto_show {
            self.auto_show = auto_show;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        if let Some(request_timeout_ms) = patch.request_timeout_ms {
            self.request_timeout_ms = request_timeout_ms;
        }
    }

    /// Layer `defaults` underneath this configuration.
    ///
    /// Only optional values the host left unset are filled: the location
    /// and each branding field. Everything else stays as configured.
    #[must_use]
    pub fn with_defaults(mut self, defaults: ConfigPatch) -> Self {
        if self.location_id.is_none() {
            self.location_id = defaults.location_id;
        }
        if let Some(branding) = defaults.branding {
            self.branding.primary_color = self.branding.primary_color.or(branding.primary_color);
            self.branding.company_name = self.branding.company_name.or(branding.company_name);
            self.branding.logo_url = self.branding.logo_url.or(branding.logo_url);
        }
        self
    }

    /// Return a merged copy, leaving `self` untouched
    #[must_use]
    pub fn merged(&self, patch: ConfigPatch) -> Self {
        let mut config = self.clone();
        config.merge(patch);
        config
    }

    /// Check the configuration for values no session can work with.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.business_type.trim().is_empty() {
            return Err(BookingError::InvalidConfig("businessType must not be empty".to_string()));
        }

        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(BookingError::InvalidConfig(format!(
                "apiBaseUrl must be an http(s) URL, got `{}`",
                self.api_base_url
            )));
        }

        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(BookingError::InvalidConfig(format!(
                "currency must be a three-letter code, got `{}`",
                self.currency
            )));
        }

        if self.request_timeout_ms == 0 {
            return Err(BookingError::InvalidConfig("requestTimeoutMs must be positive".to_string()));
        }

        Ok(())
    }

    /// Per-request timeout
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
