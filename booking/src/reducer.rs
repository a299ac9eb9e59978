//! The booking wizard's state machine.
//!
//! [`BookingReducer`] is the single transition function over
//! [`BookingState`]. Pure actions mutate state directly; command actions
//! (`LoadItems`, `SelectItem`, `SubmitBooking`, ...) issue a request id and
//! return an effect that calls the [`BookingBackend`]. The effect feeds a
//! completion action back carrying the same id, and completions whose id is
//! no longer the latest for their resource are dropped.

use crate::adapter::AdapterHandle;
use crate::api::{ApiFailure, ApiResponse, BookingBackend, BookingConfirmation, PaymentVerification};
use crate::config::ConfigPatch;
use crate::state::{BookingState, Correlation, RequestId, Resource};
use crate::step::StepKey;
use crate::types::{
    BookingDetailsPatch, Category, CustomerInfoPatch, Filters, Item, ItemId, PaymentStatus,
    SelectionPatch, Selections,
};
use crate::validation::ValidationReport;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use universal_booking_core::{
    SmallVec, async_effect, effect::Effect, environment::Clock, reducer::Reducer, smallvec,
};

/// Banner shown when client-side validation blocks a submission
pub const VALIDATION_FAILED_MESSAGE: &str = "Please correct the highlighted fields";

// ============================================================================
// Actions
// ============================================================================

/// Everything that can happen to a booking session
#[derive(Clone, Debug)]
pub enum BookingAction {
    // Configuration
    /// Shallow-merge configuration; business type changes go through `SetBusinessType`
    SetConfig(ConfigPatch),
    /// Switch vertical; clears the booking and the catalog
    SetBusinessType(AdapterHandle),

    // Navigation
    /// Show or hide the widget; hiding returns to the initial step
    SetWidgetOpen(bool),
    /// Jump to a step of the active adapter; clears the error banner
    SetCurrentStep(StepKey),
    /// Follow the adapter's forward edge
    NextStep,
    /// Follow the adapter's backward edge
    PreviousStep,

    // Status
    /// Set the loading flag
    SetLoading(bool),
    /// Show an error; stops loading
    SetError(String),
    /// Dismiss the error banner
    ClearError,

    // Catalog
    /// Replace the catalog
    SetItems(Vec<Item>),
    /// Replace the categories
    SetCategories(Vec<Category>),
    /// Replace the sub-items of the selected record
    SetSubItems(Vec<Item>),
    /// Choose the record to book; clears line items and moves to `details`
    SetSelectedItem(Item),

    // Booking form
    /// Merge line items; a zero quantity removes the entry
    UpdateSelections(SelectionPatch),
    /// Merge customer fields
    UpdateCustomerInfo(CustomerInfoPatch),
    /// Merge adapter-specific form fields
    UpdateBookingDetails(BookingDetailsPatch),
    /// Replace the field errors
    SetValidationErrors(BTreeMap<String, String>),
    /// Re-price through the adapter
    CalculateTotal,
    /// Record the backend's booking reference
    SetBookingReference(String),
    /// Record the payment status
    SetPaymentStatus(PaymentStatus),
    /// Clear the booking attempt, keeping the catalog
    ResetBooking,
    /// Clear the booking and the catalog and close the widget
    ResetAll,

    // Commands
    /// Fetch the catalog
    LoadItems(Filters),
    /// Fetch catalog categories
    LoadCategories,
    /// Fetch the catalog and its categories concurrently
    LoadCatalog(Filters),
    /// `SetSelectedItem` followed by a sub-item fetch
    SelectItem(Item),
    /// Fetch sub-items of a record
    LoadSubItems(ItemId),
    /// Validate and create the booking; the outcome echoes the correlation
    SubmitBooking(Correlation),
    /// Verify payment for a reference
    VerifyPayment {
        /// Gateway reference
        reference: String,
        /// Echoed by `PaymentVerified`
        correlation: Correlation,
    },

    // Completions
    /// Catalog fetch finished
    ItemsLoaded {
        /// Request this answers
        request: RequestId,
        /// Backend outcome
        result: ApiResponse<Vec<Item>>,
    },
    /// Category fetch finished
    CategoriesLoaded {
        /// Request this answers
        request: RequestId,
        /// Backend outcome
        result: ApiResponse<Vec<Category>>,
    },
    /// Sub-item fetch finished
    SubItemsLoaded {
        /// Request this answers
        request: RequestId,
        /// Backend outcome
        result: ApiResponse<Vec<Item>>,
    },
    /// Booking creation finished
    BookingSubmitted {
        /// Request this answers
        request: RequestId,
        /// Correlation of the `SubmitBooking` that started it
        correlation: Correlation,
        /// Backend outcome
        result: ApiResponse<BookingConfirmation>,
    },
    /// Submission stopped before reaching the backend
    SubmissionRefused {
        /// Correlation of the refused `SubmitBooking`
        correlation: Correlation,
        /// Why nothing was sent
        reason: SubmitRefusal,
    },
    /// Payment verification finished
    PaymentVerified {
        /// Request this answers
        request: RequestId,
        /// Correlation of the `VerifyPayment` that started it
        correlation: Correlation,
        /// Backend outcome
        result: ApiResponse<PaymentVerification>,
    },
}

impl BookingAction {
    /// Correlation carried by submission and verification actions
    #[must_use]
    pub fn correlation(&self) -> Option<Correlation> {
        match self {
            Self::SubmitBooking(correlation)
            | Self::VerifyPayment { correlation, .. }
            | Self::BookingSubmitted { correlation, .. }
            | Self::SubmissionRefused { correlation, .. }
            | Self::PaymentVerified { correlation, .. } => Some(*correlation),
            _ => None,
        }
    }
}

/// Why a `SubmitBooking` never reached the backend
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitRefusal {
    /// Client-side validation failed
    Invalid(ValidationReport),
    /// An earlier submission is still awaiting its answer
    InFlight,
}

// ============================================================================
// Environment
// ============================================================================

/// Dependencies of the booking reducer
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Backend used by command effects
    pub backend: Arc<dyn BookingBackend>,
    /// Clock for confirmation timestamps
    pub clock: Arc<dyn Clock>,
}

impl BookingEnvironment {
    /// Creates a new `BookingEnvironment`
    #[must_use]
    pub fn new(backend: Arc<dyn BookingBackend>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for booking sessions
#[derive(Clone, Debug, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Creates a new `BookingReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn load_items(
        state: &mut BookingState,
        filters: Filters,
        env: &BookingEnvironment,
    ) -> Effect<BookingAction> {
        let request = Self::start_request(state, Resource::Items);
        async_effect!(
            await env.backend.get_available_items(&state.request_context(), filters)
                => |result| BookingAction::ItemsLoaded { request, result }
        )
    }

    fn load_categories(state: &mut BookingState, env: &BookingEnvironment) -> Effect<BookingAction> {
        let request = Self::start_request(state, Resource::Categories);
        async_effect!(
            await env.backend.get_categories(&state.request_context())
                => |result| BookingAction::CategoriesLoaded { request, result }
        )
    }

    fn load_sub_items(state: &mut BookingState, id: ItemId, env: &BookingEnvironment) -> Effect<BookingAction> {
        let request = Self::start_request(state, Resource::SubItems);
        async_effect!(
            await env.backend.get_sub_items(&state.request_context(), id)
                => |result| BookingAction::SubItemsLoaded { request, result }
        )
    }

    fn select_item(state: &mut BookingState, item: Item) {
        state.selected_item = Some(item);
        state.sub_items.clear();
        state.selections = Selections::new();
        state.requests.invalidate(Resource::SubItems);
        if state.adapter.has_step(&StepKey::DETAILS) {
            state.current_step = StepKey::DETAILS;
        }
        state.recompute_total();
    }

    fn switch_adapter(state: &mut BookingState, adapter: AdapterHandle) {
        tracing::info!(
            from = state.adapter.business_type(),
            to = adapter.business_type(),
            "Switching business type"
        );
        state.host_config.business_type = adapter.business_type().to_string();
        state.adapter = adapter;
        state.layer_config();
        let widget_open = state.widget_open;
        state.reset_all();
        state.widget_open = widget_open;
    }

    fn fail(state: &mut BookingState, failure: &ApiFailure) {
        state.loading = false;
        state.error = Some(failure.error.clone());
    }

    fn start_request(state: &mut BookingState, resource: Resource) -> RequestId {
        state.loading = true;
        state.error = None;
        state.requests.issue(resource)
    }

    /// Terminal action for a submission that never reached the backend
    fn refuse(correlation: Correlation, reason: SubmitRefusal) -> Effect<BookingAction> {
        async_effect! {
            Some(BookingAction::SubmissionRefused { correlation, reason })
        }
    }

    /// Drop a completion unless it answers the latest request for `resource`
    fn accept(state: &mut BookingState, resource: Resource, request: RequestId) -> bool {
        if state.requests.settle(resource, request) {
            state.loading = state.requests.in_flight();
            true
        } else {
            tracing::debug!(?resource, request = request.get(), "Discarding stale response");
            false
        }
    }
}

/// Field errors carried by a failed booking submission
fn field_errors(failure: &ApiFailure) -> BTreeMap<String, String> {
    let Some(Value::Object(body)) = &failure.data else {
        return BTreeMap::new();
    };

    let fields = match body.get("errors") {
        Some(Value::Object(errors)) => errors,
        _ if failure.status.is_none() => body,
        _ => return BTreeMap::new(),
    };

    fields
        .iter()
        .filter_map(|(field, message)| {
            let message = match message {
                Value::String(message) => message.clone(),
                Value::Array(messages) => messages.first()?.as_str()?.to_string(),
                _ => return None,
            };
            Some((field.clone(), message))
        })
        .collect()
}

impl Reducer for BookingReducer {
    type State = BookingState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Configuration ==========
            BookingAction::SetConfig(mut patch) => {
                if let Some(requested) = patch
                    .business_type
                    .take()
                    .filter(|requested| requested.as_str() != state.adapter.business_type())
                {
                    tracing::warn!(
                        requested = %requested,
                        active = state.adapter.business_type(),
                        "Ignoring business type in config patch; use SetBusinessType"
                    );
                }
                state.host_config.merge(patch);
                state.layer_config();
            },

            BookingAction::SetBusinessType(adapter) => Self::switch_adapter(state, adapter),

            // ========== Navigation ==========
            BookingAction::SetWidgetOpen(open) => {
                state.widget_open = open;
                if !open {
                    state.current_step = state.adapter.initial_step();
                }
            },

            BookingAction::SetCurrentStep(step) => {
                if state.adapter.has_step(&step) {
                    state.current_step = step;
                    state.error = None;
                } else {
                    tracing::warn!(
                        %step,
                        business_type = state.adapter.business_type(),
                        "Rejected transition to unknown step"
                    );
                }
            },

            BookingAction::NextStep => match state.adapter.next_step(&state.current_step) {
                Some(step) => {
                    state.current_step = step;
                    state.error = None;
                },
                None => tracing::debug!(step = %state.current_step, "Already on the last step"),
            },

            BookingAction::PreviousStep => {
                match state.adapter.previous_step(&state.current_step) {
                    Some(step) => {
                        state.current_step = step;
                        state.error = None;
                    },
                    None => tracing::debug!(step = %state.current_step, "Already on the first step"),
                }
            },

            // ========== Status ==========
            BookingAction::SetLoading(loading) => state.loading = loading,

            BookingAction::SetError(message) => {
                state.error = Some(message);
                state.loading = false;
            },

            BookingAction::ClearError => state.error = None,

            // ========== Catalog ==========
            BookingAction::SetItems(items) => state.items = items,

            BookingAction::SetCategories(categories) => state.categories = categories,

            BookingAction::SetSubItems(sub_items) => state.sub_items = sub_items,

            BookingAction::SetSelectedItem(item) => Self::select_item(state, item),

            // ========== Booking form ==========
            BookingAction::UpdateSelections(patch) => {
                state.selections.merge(patch);
                if !state.selections.is_empty() {
                    state.validation_errors.remove("selections");
                }
                state.recompute_total();
            },

            BookingAction::UpdateCustomerInfo(patch) => {
                for field in state.customer_info.apply(patch) {
                    state.validation_errors.remove(field);
                }
            },

            BookingAction::UpdateBookingDetails(patch) => {
                for field in state.booking_details.apply(patch) {
                    state.validation_errors.remove(field);
                }
                state.recompute_total();
            },

            BookingAction::SetValidationErrors(errors) => state.validation_errors = errors,

            BookingAction::CalculateTotal => state.recompute_total(),

            BookingAction::SetBookingReference(reference) => {
                state.booking_reference = Some(reference);
            },

            BookingAction::SetPaymentStatus(status) => state.payment_status = Some(status),

            BookingAction::ResetBooking => state.reset_booking(),

            BookingAction::ResetAll => state.reset_all(),

            // ========== Commands ==========
            BookingAction::LoadItems(filters) => {
                return smallvec![Self::load_items(state, filters, env)];
            },

            BookingAction::LoadCategories => {
                return smallvec![Self::load_categories(state, env)];
            },

            BookingAction::LoadCatalog(filters) => {
                let items = Self::load_items(state, filters, env);
                let categories = Self::load_categories(state, env);
                return smallvec![Effect::merge(vec![items, categories])];
            },

            BookingAction::SelectItem(item) => {
                let id = item.id.clone();
                Self::select_item(state, item);
                return smallvec![Self::load_sub_items(state, id, env)];
            },

            BookingAction::LoadSubItems(id) => {
                return smallvec![Self::load_sub_items(state, id, env)];
            },

            BookingAction::SubmitBooking(correlation) => {
                if state.requests.pending(Resource::Booking) {
                    tracing::warn!("Booking submission already in flight");
                    return smallvec![Self::refuse(correlation, SubmitRefusal::InFlight)];
                }

                let data = state.booking_data();
                let report = state.adapter.validate_booking_data(&data);
                if !report.is_valid {
                    tracing::debug!(fields = ?report.errors.keys().collect::<Vec<_>>(), "Booking failed validation");
                    state.validation_errors.clone_from(&report.errors);
                    state.error = Some(VALIDATION_FAILED_MESSAGE.to_string());
                    state.loading = false;
                    return smallvec![Self::refuse(correlation, SubmitRefusal::Invalid(report))];
                }

                state.validation_errors.clear();
                let request = Self::start_request(state, Resource::Booking);
                return smallvec![async_effect!(
                    await env.backend.create_booking(&state.request_context(), data)
                        => |result| BookingAction::BookingSubmitted { request, correlation, result }
                )];
            },

            BookingAction::VerifyPayment { reference, correlation } => {
                let request = Self::start_request(state, Resource::Payment);
                return smallvec![async_effect!(
                    await env.backend.verify_payment(&state.request_context(), reference)
                        => |result| BookingAction::PaymentVerified { request, correlation, result }
                )];
            },

            // ========== Completions ==========
            BookingAction::ItemsLoaded { request, result } => {
                if Self::accept(state, Resource::Items, request) {
                    match result {
                        Ok(success) => {
                            state.items = success.data;
                            state.items_meta = success.meta;
                        },
                        Err(failure) => Self::fail(state, &failure),
                    }
                }
            },

            BookingAction::CategoriesLoaded { request, result } => {
                if Self::accept(state, Resource::Categories, request) {
                    match result {
                        Ok(success) => state.categories = success.data,
                        Err(failure) => Self::fail(state, &failure),
                    }
                }
            },

            BookingAction::SubItemsLoaded { request, result } => {
                if Self::accept(state, Resource::SubItems, request) {
                    match result {
                        Ok(success) => state.sub_items = success.data,
                        Err(failure) => Self::fail(state, &failure),
                    }
                }
            },

            BookingAction::BookingSubmitted { request, result, .. } => {
                if Self::accept(state, Resource::Booking, request) {
                    match result {
                        Ok(success) => {
                            let confirmation = success.data;
                            tracing::info!(reference = ?confirmation.reference, "Booking confirmed");
                            state.booking_reference = confirmation.reference;
                            state.payment_redirect = confirmation.payment_redirect;
                            state.payment_status = Some(if state.total_amount.is_zero() {
                                PaymentStatus::Completed
                            } else {
                                PaymentStatus::Pending
                            });
                            state.booking_confirmed_at = Some(env.clock.now());
                            state.validation_errors.clear();
                        },
                        Err(failure) => {
                            let errors = field_errors(&failure);
                            if !errors.is_empty() {
                                state.validation_errors = errors;
                            }
                            Self::fail(state, &failure);
                        },
                    }
                }
            },

            BookingAction::SubmissionRefused { .. } => {},

            BookingAction::PaymentVerified { request, result, .. } => {
                if Self::accept(state, Resource::Payment, request) {
                    match result {
                        Ok(success) => {
                            state.payment_status =
                                Some(PaymentStatus::from_gateway(&success.data.status));
                            state.payment_verification = Some(success.data);
                        },
                        Err(failure) => Self::fail(state, &failure),
                    }
                }
            },
        }

        smallvec![Effect::None]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::{ApiSuccess, BackendFuture, RequestContext};
    use crate::adapter::EventAdapter;
    use crate::config::WidgetConfig;
    use crate::types::{BookingData, Money};
    use serde_json::json;
    use universal_booking_testing::{ReducerTest, assertions, test_clock};

    struct UnreachableBackend;

    impl BookingBackend for UnreachableBackend {
        fn get_available_items(&self, _: &RequestContext, _: Filters) -> BackendFuture<Vec<Item>> {
            Box::pin(async { Err(ApiFailure::message("offline")) })
        }
        fn get_item_details(&self, _: &RequestContext, _: ItemId) -> BackendFuture<Item> {
            Box::pin(async { Err(ApiFailure::message("offline")) })
        }
        fn get_sub_items(&self, _: &RequestContext, _: ItemId) -> BackendFuture<Vec<Item>> {
            Box::pin(async { Err(ApiFailure::message("offline")) })
        }
        fn get_categories(&self, _: &RequestContext) -> BackendFuture<Vec<Category>> {
            Box::pin(async { Err(ApiFailure::message("offline")) })
        }
        fn create_booking(&self, _: &RequestContext, _: BookingData) -> BackendFuture<BookingConfirmation> {
            Box::pin(async { Err(ApiFailure::message("offline")) })
        }
        fn update_booking(&self, _: &RequestContext, _: String, _: Value) -> BackendFuture<Value> {
            Box::pin(async { Err(ApiFailure::message("offline")) })
        }
        fn cancel_booking(&self, _: &RequestContext, _: String) -> BackendFuture<Value> {
            Box::pin(async { Err(ApiFailure::message("offline")) })
        }
        fn verify_payment(&self, _: &RequestContext, _: String) -> BackendFuture<PaymentVerification> {
            Box::pin(async { Err(ApiFailure::message("offline")) })
        }
    }

    fn env() -> BookingEnvironment {
        BookingEnvironment::new(Arc::new(UnreachableBackend), Arc::new(test_clock()))
    }

    fn state() -> BookingState {
        let config = WidgetConfig::default();
        let adapter = AdapterHandle::new(Arc::new(EventAdapter::new(&config)));
        BookingState::new(config, adapter)
    }

    #[test]
    fn closing_returns_to_the_initial_step() {
        let mut given = state();
        given.widget_open = true;
        given.current_step = StepKey::from_static("checkout");

        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(given)
            .when_action(BookingAction::SetWidgetOpen(false))
            .then_state(|state| {
                assert!(!state.widget_open);
                assert_eq!(state.current_step, StepKey::LIST);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn set_error_stops_loading() {
        let mut given = state();
        given.loading = true;

        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(given)
            .when_action(BookingAction::SetError("Network down".to_string()))
            .then_state(|state| {
                assert_eq!(state.error.as_deref(), Some("Network down"));
                assert!(!state.loading);
            })
            .run();
    }

    #[test]
    fn load_items_issues_a_request() {
        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(state())
            .when_action(BookingAction::LoadItems(Filters::new()))
            .then_state(|state| {
                assert!(state.loading);
                assert!(state.requests.pending(Resource::Items));
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn load_catalog_fetches_items_and_categories_together() {
        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(state())
            .when_action(BookingAction::LoadCatalog(Filters::new()))
            .then_state(|state| {
                assert!(state.requests.pending(Resource::Items));
                assert!(state.requests.pending(Resource::Categories));
            })
            .then_effects(|effects| assertions::assert_has_parallel_effect(effects, 2))
            .run();
    }

    #[test]
    fn stale_completions_are_dropped() {
        let mut reducer_state = state();
        let reducer = BookingReducer::new();
        let env = env();

        let _ = reducer.reduce(&mut reducer_state, BookingAction::LoadItems(Filters::new()), &env);
        let stale = reducer_state.requests.current(Resource::Items).unwrap();
        let _ = reducer.reduce(&mut reducer_state, BookingAction::LoadItems(Filters::new()), &env);

        let _ = reducer.reduce(
            &mut reducer_state,
            BookingAction::ItemsLoaded {
                request: stale,
                result: Ok(ApiSuccess::new(vec![Item::new(1_u64, "Old")])),
            },
            &env,
        );
        assert!(reducer_state.items.is_empty());
        assert!(reducer_state.loading);
    }

    async fn terminal_action(mut effects: SmallVec<[Effect<BookingAction>; 4]>) -> Option<BookingAction> {
        match effects.pop() {
            Some(Effect::Future(future)) => future.await,
            _ => None,
        }
    }

    #[tokio::test]
    async fn invalid_submission_answers_with_its_correlation() {
        let mut reducer_state = state();
        let correlation = Correlation::new();

        let effects = BookingReducer::new().reduce(
            &mut reducer_state,
            BookingAction::SubmitBooking(correlation),
            &env(),
        );

        let refusal = terminal_action(effects).await.unwrap();
        assert_eq!(refusal.correlation(), Some(correlation));
        let BookingAction::SubmissionRefused { reason: SubmitRefusal::Invalid(report), .. } = refusal else {
            unreachable!("expected a validation refusal, got {refusal:?}");
        };
        assert_eq!(report.errors, reducer_state.validation_errors);
        assert!(!reducer_state.requests.pending(Resource::Booking));
    }

    #[tokio::test]
    async fn second_submission_is_refused_while_one_is_in_flight() {
        let mut reducer_state = state();
        reducer_state.requests.issue(Resource::Booking);
        let correlation = Correlation::new();

        let effects = BookingReducer::new().reduce(
            &mut reducer_state,
            BookingAction::SubmitBooking(correlation),
            &env(),
        );

        let refusal = terminal_action(effects).await.unwrap();
        assert!(matches!(
            refusal,
            BookingAction::SubmissionRefused { correlation: c, reason: SubmitRefusal::InFlight } if c == correlation
        ));
        assert!(reducer_state.validation_errors.is_empty());
    }

    #[tokio::test]
    async fn completions_echo_the_command_correlation() {
        let mut reducer_state = state();
        let correlation = Correlation::new();

        let effects = BookingReducer::new().reduce(
            &mut reducer_state,
            BookingAction::VerifyPayment {
                reference: "EVT-1".to_string(),
                correlation,
            },
            &env(),
        );

        let completion = terminal_action(effects).await.unwrap();
        assert!(matches!(completion, BookingAction::PaymentVerified { result: Err(_), .. }));
        assert_eq!(completion.correlation(), Some(correlation));
    }

    #[test]
    fn field_errors_come_from_the_errors_block() {
        let failure = ApiFailure {
            error: "Unprocessable".to_string(),
            status: Some(422),
            data: Some(json!({"message": "Unprocessable", "errors": {"email": ["taken"], "phone": "bad"}})),
        };
        let errors = field_errors(&failure);
        assert_eq!(errors.get("email").map(String::as_str), Some("taken"));
        assert_eq!(errors.get("phone").map(String::as_str), Some("bad"));

        let failure = ApiFailure {
            error: "Unprocessable".to_string(),
            status: Some(422),
            data: Some(json!({"message": "Unprocessable"})),
        };
        assert!(field_errors(&failure).is_empty());
    }

    #[test]
    fn confirmation_records_reference_and_time() {
        let mut given = state();
        let request = given.requests.issue(Resource::Booking);
        given.total_amount = Money::from_major(100);

        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(given)
            .when_action(BookingAction::BookingSubmitted {
                request,
                correlation: Correlation::new(),
                result: Ok(ApiSuccess::new(BookingConfirmation {
                    reference: Some("EVT-1".to_string()),
                    payment_redirect: Some("https://pay.test/abc".to_string()),
                    data: json!({}),
                })),
            })
            .then_state(|state| {
                assert_eq!(state.booking_reference.as_deref(), Some("EVT-1"));
                assert_eq!(state.payment_status, Some(PaymentStatus::Pending));
                assert_eq!(state.booking_confirmed_at, Some(test_clock().now()));
                assert!(!state.loading);
            })
            .run();
    }
}
