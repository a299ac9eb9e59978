//! Booking engine: one session's store plus typed dispatchers.
//!
//! The engine owns the [`Store`] running the [`BookingReducer`] and the
//! [`AdapterFactory`] used for business type switches. View code calls
//! the dispatchers here instead of building actions by hand; programmer
//! errors (unknown step, unsupported business type, bad configuration)
//! come back as [`BookingError`] before anything is dispatched.

use crate::adapter::{AdapterFactory, AdapterHandle, Labels};
use crate::api::{
    ApiFailure, ApiResponse, BookingBackend, BookingConfirmation, PaymentVerification,
};
use crate::config::{ConfigPatch, WidgetConfig};
use crate::error::BookingError;
use crate::reducer::{BookingAction, BookingEnvironment, BookingReducer, SubmitRefusal};
use crate::state::{BookingState, Correlation};
use crate::step::{ComponentRef, StepKey};
use crate::types::{
    BookingDetailsPatch, CustomerInfoPatch, Filters, Item, ItemId, SelectionPatch,
};
use crate::validation::ValidationReport;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use universal_booking_core::environment::SystemClock;
use universal_booking_runtime::{EffectHandle, Store, StoreError};

/// Store type of a booking session
pub type BookingStore = Store<BookingState, BookingAction, BookingEnvironment, BookingReducer>;

/// Extra time granted to a submission beyond the request timeout
const COMPLETION_GRACE: Duration = Duration::from_secs(2);

/// Result of [`BookingEngine::submit_booking`]
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// The backend accepted the booking
    Submitted(BookingConfirmation),
    /// Client-side validation failed; nothing was sent
    Invalid(ValidationReport),
    /// The backend (or transport) refused the booking
    Rejected(ApiFailure),
    /// An earlier submission is still awaiting its answer; nothing was sent
    InFlight,
}

/// One booking session
#[derive(Clone)]
pub struct BookingEngine {
    store: BookingStore,
    factory: Arc<AdapterFactory>,
}

impl BookingEngine {
    /// Create a session against `backend`, using the wall clock.
    ///
    /// # Errors
    ///
    /// - [`BookingError::InvalidConfig`] if the configuration is unusable
    /// - [`BookingError::UnsupportedBusinessType`] if no adapter is registered
    /// - whatever the adapter constructor returns
    pub fn new(
        config: WidgetConfig,
        factory: Arc<AdapterFactory>,
        backend: Arc<dyn BookingBackend>,
    ) -> Result<Self, BookingError> {
        Self::with_environment(
            config,
            factory,
            BookingEnvironment::new(backend, Arc::new(SystemClock)),
        )
    }

    /// Create a session with an explicit environment.
    ///
    /// # Errors
    ///
    /// See [`BookingEngine::new`].
    pub fn with_environment(
        mut config: WidgetConfig,
        factory: Arc<AdapterFactory>,
        environment: BookingEnvironment,
    ) -> Result<Self, BookingError> {
        config.validate()?;
        let adapter = AdapterHandle::new(factory.create(&config.business_type, &config)?);
        config.business_type = adapter.business_type().to_string();

        tracing::info!(business_type = %config.business_type, "Booking session created");

        let state = BookingState::new(config, adapter);
        Ok(Self {
            store: Store::new(state, BookingReducer::new(), environment),
            factory,
        })
    }

    async fn dispatch(&self, action: BookingAction) -> Result<EffectHandle, BookingError> {
        Ok(self.store.send(action).await?)
    }

    async fn apply(&self, action: BookingAction) -> Result<(), BookingError> {
        self.dispatch(action).await?;
        Ok(())
    }

    // ========== Visibility and navigation ==========

    /// Show the widget
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn open(&self) -> Result<(), BookingError> {
        self.apply(BookingAction::SetWidgetOpen(true)).await
    }

    /// Hide the widget and return to the initial step
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn close(&self) -> Result<(), BookingError> {
        self.apply(BookingAction::SetWidgetOpen(false)).await
    }

    /// Move to `step`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::UnknownStep`] if the active adapter does not
    /// declare it.
    pub async fn go_to_step(&self, step: StepKey) -> Result<(), BookingError> {
        let business_type = self
            .store
            .state(|s| (!s.adapter.has_step(&step)).then(|| s.adapter.business_type().to_string()))
            .await;

        if let Some(business_type) = business_type {
            return Err(BookingError::UnknownStep {
                business_type,
                step: step.to_string(),
            });
        }

        self.apply(BookingAction::SetCurrentStep(step)).await
    }

    /// Follow the adapter's forward edge (no-op on the last step)
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn next_step(&self) -> Result<(), BookingError> {
        self.apply(BookingAction::NextStep).await
    }

    /// Follow the adapter's backward edge (no-op on the first step)
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn previous_step(&self) -> Result<(), BookingError> {
        self.apply(BookingAction::PreviousStep).await
    }

    /// Component rendering the current step.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::MissingComponent`] if the adapter maps no
    /// component to the current step.
    pub async fn current_component(&self) -> Result<ComponentRef, BookingError> {
        self.store
            .state(|s| {
                s.adapter
                    .components()
                    .get(&s.current_step)
                    .cloned()
                    .ok_or_else(|| BookingError::MissingComponent(s.current_step.to_string()))
            })
            .await
    }

    // ========== Status ==========

    /// Set the loading flag
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn set_loading(&self, loading: bool) -> Result<(), BookingError> {
        self.apply(BookingAction::SetLoading(loading)).await
    }

    /// Show an error banner
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn set_error(&self, message: impl Into<String>) -> Result<(), BookingError> {
        self.apply(BookingAction::SetError(message.into())).await
    }

    /// Dismiss the error banner
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn clear_error(&self) -> Result<(), BookingError> {
        self.apply(BookingAction::ClearError).await
    }

    // ========== Catalog ==========

    /// Fetch the catalog; await the handle to wait for the response
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn load_items(&self, filters: Filters) -> Result<EffectHandle, BookingError> {
        self.dispatch(BookingAction::LoadItems(filters)).await
    }

    /// Fetch catalog categories
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn load_categories(&self) -> Result<EffectHandle, BookingError> {
        self.dispatch(BookingAction::LoadCategories).await
    }

    /// Fetch the catalog and its categories concurrently
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn load_catalog(&self, filters: Filters) -> Result<EffectHandle, BookingError> {
        self.dispatch(BookingAction::LoadCatalog(filters)).await
    }

    /// Select the record to book and fetch its sub-items
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn select_item(&self, item: Item) -> Result<EffectHandle, BookingError> {
        self.dispatch(BookingAction::SelectItem(item)).await
    }

    /// Re-fetch sub-items of a record
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn load_sub_items(&self, id: ItemId) -> Result<EffectHandle, BookingError> {
        self.dispatch(BookingAction::LoadSubItems(id)).await
    }

    // ========== Booking form ==========

    /// Merge line items (quantity 0 removes)
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn update_selections(&self, patch: SelectionPatch) -> Result<(), BookingError> {
        self.apply(BookingAction::UpdateSelections(patch)).await
    }

    /// Merge customer fields
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn update_customer_info(&self, patch: CustomerInfoPatch) -> Result<(), BookingError> {
        self.apply(BookingAction::UpdateCustomerInfo(patch)).await
    }

    /// Merge adapter-specific form fields
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn update_booking_details(&self, patch: BookingDetailsPatch) -> Result<(), BookingError> {
        self.apply(BookingAction::UpdateBookingDetails(patch)).await
    }

    /// Re-price through the adapter
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn calculate_total(&self) -> Result<(), BookingError> {
        self.apply(BookingAction::CalculateTotal).await
    }

    /// Validate and submit the booking, waiting for the backend's answer.
    ///
    /// Validation runs inside the reducer at dispatch: failures are
    /// reported as [`SubmitOutcome::Invalid`] and fill the session's field
    /// errors. Backend failures come back as [`SubmitOutcome::Rejected`].
    /// Only the answer to this call's own dispatch is returned.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Store`] with [`StoreError::Timeout`] if no answer
    ///   arrives within the request timeout
    /// - [`BookingError::Store`] if the session is shutting down
    pub async fn submit_booking(&self) -> Result<SubmitOutcome, BookingError> {
        let timeout = self.store.state(|s| s.config.request_timeout()).await;
        let correlation = Correlation::new();

        let completion = self
            .store
            .send_and_wait_for(
                BookingAction::SubmitBooking(correlation),
                |action| {
                    matches!(
                        action,
                        BookingAction::BookingSubmitted { .. } | BookingAction::SubmissionRefused { .. }
                    ) && action.correlation() == Some(correlation)
                },
                timeout + COMPLETION_GRACE,
            )
            .await?;

        match completion {
            BookingAction::BookingSubmitted { result: Ok(success), .. } => {
                Ok(SubmitOutcome::Submitted(success.data))
            },
            BookingAction::BookingSubmitted { result: Err(failure), .. } => {
                Ok(SubmitOutcome::Rejected(failure))
            },
            BookingAction::SubmissionRefused { reason: SubmitRefusal::Invalid(report), .. } => {
                Ok(SubmitOutcome::Invalid(report))
            },
            BookingAction::SubmissionRefused { reason: SubmitRefusal::InFlight, .. } => {
                Ok(SubmitOutcome::InFlight)
            },
            other => {
                tracing::error!(?other, "Unexpected completion for booking submission");
                Err(BookingError::Store(StoreError::ChannelClosed))
            },
        }
    }

    /// Verify payment for `reference`, waiting for the backend's answer.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Store`] with [`StoreError::Timeout`] if no answer
    ///   arrives within the request timeout
    /// - [`BookingError::Store`] if the session is shutting down
    pub async fn verify_payment(
        &self,
        reference: impl Into<String>,
    ) -> Result<ApiResponse<PaymentVerification>, BookingError> {
        let timeout = self.store.state(|s| s.config.request_timeout()).await;
        let correlation = Correlation::new();

        let completion = self
            .store
            .send_and_wait_for(
                BookingAction::VerifyPayment {
                    reference: reference.into(),
                    correlation,
                },
                |action| {
                    matches!(action, BookingAction::PaymentVerified { .. })
                        && action.correlation() == Some(correlation)
                },
                timeout + COMPLETION_GRACE,
            )
            .await?;

        match completion {
            BookingAction::PaymentVerified { result, .. } => Ok(result),
            other => {
                tracing::error!(?other, "Unexpected completion for payment verification");
                Err(BookingError::Store(StoreError::ChannelClosed))
            },
        }
    }

    /// Send a backend-shaped update for an existing booking
    ///
    /// # Errors
    ///
    /// Returns the backend's [`ApiFailure`].
    pub async fn update_booking(&self, id: impl Into<String>, patch: Value) -> ApiResponse<Value> {
        let ctx = self.store.state(BookingState::request_context).await;
        self.store.environment().backend.update_booking(&ctx, id.into(), patch).await
    }

    /// Cancel an existing booking
    ///
    /// # Errors
    ///
    /// Returns the backend's [`ApiFailure`].
    pub async fn cancel_booking(&self, id: impl Into<String>) -> ApiResponse<Value> {
        let ctx = self.store.state(BookingState::request_context).await;
        self.store.environment().backend.cancel_booking(&ctx, id.into()).await
    }

    // ========== Configuration ==========

    /// Switch to another vertical, clearing the booking and the catalog.
    ///
    /// # Errors
    ///
    /// Returns the factory's error (nothing is dispatched) if the adapter
    /// cannot be built.
    pub async fn set_business_type(&self, business_type: &str) -> Result<(), BookingError> {
        let config = self.store.state(|s| s.config.clone()).await;
        let adapter = self.factory.create(business_type, &config)?;
        self.apply(BookingAction::SetBusinessType(AdapterHandle::new(adapter)))
            .await
    }

    /// Shallow-merge configuration; a new business type switches adapters.
    ///
    /// # Errors
    ///
    /// - [`BookingError::InvalidConfig`] if the merged configuration is unusable
    /// - the factory's error if the new business type cannot be built
    pub async fn set_config(&self, mut patch: ConfigPatch) -> Result<(), BookingError> {
        let (merged, active) = self
            .store
            .state(|s| (s.host_config.merged(patch.clone()), s.adapter.business_type().to_string()))
            .await;
        merged.validate()?;

        let switch = match patch.business_type.take() {
            Some(business_type) => {
                let adapter = AdapterHandle::new(self.factory.create(&business_type, &merged)?);
                (adapter.business_type() != active).then_some(adapter)
            },
            None => None,
        };

        self.apply(BookingAction::SetConfig(patch)).await?;
        if let Some(adapter) = switch {
            self.apply(BookingAction::SetBusinessType(adapter)).await?;
        }
        Ok(())
    }

    /// Clear the booking attempt, keeping the catalog
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn reset_booking(&self) -> Result<(), BookingError> {
        self.apply(BookingAction::ResetBooking).await
    }

    /// Clear the booking and the catalog and close the widget
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the session is shutting down.
    pub async fn reset_all(&self) -> Result<(), BookingError> {
        self.apply(BookingAction::ResetAll).await
    }

    // ========== Observation ==========

    /// Copy of the current state
    pub async fn snapshot(&self) -> BookingState {
        self.store.state(BookingState::clone).await
    }

    /// Session configuration
    pub async fn config(&self) -> WidgetConfig {
        self.store.state(|s| s.config.clone()).await
    }

    /// Active adapter
    pub async fn adapter(&self) -> AdapterHandle {
        self.store.state(|s| s.adapter.clone()).await
    }

    /// View-layer strings of the active adapter
    pub async fn labels(&self) -> Labels {
        self.store.state(|s| s.adapter.labels()).await
    }

    /// Business types the factory can switch to
    #[must_use]
    pub fn supported_business_types(&self) -> Vec<String> {
        self.factory.supported_business_types()
    }

    /// Receive every completion and other effect-produced action
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BookingAction> {
        self.store.subscribe_actions()
    }

    /// Stop accepting actions and wait for in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if requests are still running after
    /// the store's shutdown timeout.
    pub async fn shutdown(&self) -> Result<(), BookingError> {
        Ok(self.store.shutdown_default().await?)
    }
}

impl std::fmt::Debug for BookingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingEngine")
            .field("factory", &self.factory)
            .field("pending_effects", &self.store.pending_effects())
            .finish_non_exhaustive()
    }
}
