//! Business type → adapter registry.

use super::{BusinessAdapter, EntryAdapter, EventAdapter, FurnitureAdapter, GroupAdapter};
use crate::config::WidgetConfig;
use crate::error::BookingError;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Builds an adapter for a configuration
pub type AdapterConstructor = fn(&WidgetConfig) -> Result<Arc<dyn BusinessAdapter>, BookingError>;

/// Registry of adapter constructors keyed by business type
///
/// Construction errors are returned to the caller unchanged; there is no
/// fallback adapter.
#[derive(Clone, Default)]
pub struct AdapterFactory {
    constructors: BTreeMap<String, AdapterConstructor>,
}

impl AdapterFactory {
    /// An empty registry
    #[must_use]
    pub const fn new() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// A registry with the built-in verticals (`entry`, `events`/`event`,
    /// `furniture`, `group`)
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut factory = Self::new();
        factory.register(EntryAdapter::BUSINESS_TYPE, |config| {
            Ok(Arc::new(EntryAdapter::new(config)?))
        });
        factory.register(EventAdapter::BUSINESS_TYPE, |config| {
            Ok(Arc::new(EventAdapter::new(config)))
        });
        factory.register("event", |config| Ok(Arc::new(EventAdapter::new(config))));
        factory.register(FurnitureAdapter::BUSINESS_TYPE, |config| {
            Ok(Arc::new(FurnitureAdapter::new(config)))
        });
        factory.register(GroupAdapter::BUSINESS_TYPE, |config| {
            Ok(Arc::new(GroupAdapter::new(config)))
        });
        factory
    }

    /// Register (or replace) the constructor for a business type
    pub fn register(&mut self, business_type: &str, constructor: AdapterConstructor) {
        tracing::debug!(business_type, "Registering adapter");
        self.constructors
            .insert(Self::normalize(business_type), constructor);
    }

    /// Whether a constructor is registered for the business type
    #[must_use]
    pub fn is_supported(&self, business_type: &str) -> bool {
        self.constructors.contains_key(&Self::normalize(business_type))
    }

    /// Registered business types, sorted
    #[must_use]
    pub fn supported_business_types(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    /// Build the adapter for a business type.
    ///
    /// # Errors
    ///
    /// - [`BookingError::UnsupportedBusinessType`] if nothing is registered
    /// - whatever the constructor returns, unchanged
    pub fn create(
        &self,
        business_type: &str,
        config: &WidgetConfig,
    ) -> Result<Arc<dyn BusinessAdapter>, BookingError> {
        let constructor = self
            .constructors
            .get(&Self::normalize(business_type))
            .ok_or_else(|| BookingError::UnsupportedBusinessType(business_type.to_string()))?;

        constructor(config).inspect_err(|error| {
            tracing::error!(business_type, %error, "Adapter construction failed");
        })
    }

    fn normalize(business_type: &str) -> String {
        business_type.trim().to_ascii_lowercase()
    }
}

impl fmt::Debug for AdapterFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterFactory")
            .field("business_types", &self.supported_business_types())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builtin_types_are_sorted() {
        assert_eq!(
            AdapterFactory::with_builtin().supported_business_types(),
            vec!["entry", "event", "events", "furniture", "group"]
        );
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        let factory = AdapterFactory::with_builtin();
        assert!(factory.is_supported(" Events "));
        let adapter = factory.create("FURNITURE", &WidgetConfig::default()).unwrap();
        assert_eq!(adapter.business_type(), "furniture");
    }

    #[test]
    fn event_alias_builds_the_events_adapter() {
        let adapter = AdapterFactory::with_builtin()
            .create("event", &WidgetConfig::default())
            .unwrap();
        assert_eq!(adapter.business_type(), "events");
    }

    #[test]
    fn constructor_errors_are_not_masked() {
        let result = AdapterFactory::with_builtin().create("entry", &WidgetConfig::default());
        assert!(matches!(result, Err(BookingError::InvalidConfig(_))));
    }
}
