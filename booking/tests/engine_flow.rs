//! End-to-end session flows through the engine and the session registry

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

mod common;

use common::{SLOW, StubBackend, concert, config, environment, valid_customer, vip};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use universal_booking::{
    AdapterFactory, ApiFailure, BookingEngine, BookingError, ConfigPatch, Filters, ItemId,
    PaymentStatus, SelectionPatch, SessionManager, SessionSeed, StepKey, SubmitOutcome,
};
use universal_booking_core::environment::Clock;
use universal_booking_testing::test_clock;

fn engine(backend: StubBackend) -> BookingEngine {
    BookingEngine::with_environment(
        config("events"),
        Arc::new(AdapterFactory::with_builtin()),
        environment(backend),
    )
    .unwrap()
}

fn sessions(backend: StubBackend) -> SessionManager {
    SessionManager::with_clock(
        Arc::new(AdapterFactory::with_builtin()),
        Arc::new(backend),
        Arc::new(test_clock()),
    )
}

fn two_vip() -> SelectionPatch {
    let selection = vip(2);
    SelectionPatch::from([(selection.id.clone(), selection)])
}

async fn fill_booking(engine: &BookingEngine) {
    engine.select_item(concert()).await.unwrap().wait().await;
    engine.update_selections(two_vip()).await.unwrap();
    engine.update_customer_info(valid_customer()).await.unwrap();
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn loading_items_fills_the_catalog() {
    let engine = engine(StubBackend::default());

    engine.load_items(Filters::new()).await.unwrap().wait().await;

    let state = engine.snapshot().await;
    assert_eq!(state.items, vec![concert()]);
    assert_eq!(state.items_meta, Some(json!({"page": 1})));
    assert!(!state.loading);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn superseded_catalog_response_is_discarded() {
    let engine = engine(StubBackend::default());

    let mut slow = engine.load_items(Filters::new().with(SLOW, "1")).await.unwrap();
    let mut fast = engine.load_items(Filters::new()).await.unwrap();
    fast.wait().await;
    slow.wait().await;

    let state = engine.snapshot().await;
    assert_eq!(state.items, vec![concert()]);
    assert!(!state.loading);
}

#[tokio::test]
async fn selecting_an_item_loads_its_sub_items() {
    let engine = engine(StubBackend::default());

    engine.select_item(concert()).await.unwrap().wait().await;

    let state = engine.snapshot().await;
    assert_eq!(state.selected_item, Some(concert()));
    let ids: Vec<ItemId> = state.sub_items.iter().map(|item| item.id.clone()).collect();
    assert_eq!(ids, vec![ItemId::from(10_u64), ItemId::from(11_u64)]);
}

#[tokio::test]
async fn categories_are_loaded() {
    let engine = engine(StubBackend::default());

    engine.load_categories().await.unwrap().wait().await;

    let categories = engine.snapshot().await.categories;
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Music");
}

#[tokio::test]
async fn catalog_loads_items_and_categories_together() {
    let engine = engine(StubBackend::default());

    engine.load_catalog(Filters::new()).await.unwrap().wait().await;

    let state = engine.snapshot().await;
    assert_eq!(state.items, vec![concert()]);
    assert_eq!(state.categories.len(), 1);
    assert!(!state.loading);
}

// ============================================================================
// Submission
// ============================================================================

#[tokio::test]
async fn complete_booking_is_submitted() {
    let backend = StubBackend::default();
    let engine = engine(backend.clone());
    fill_booking(&engine).await;

    let outcome = engine.submit_booking().await.unwrap();

    let SubmitOutcome::Submitted(confirmation) = outcome else {
        unreachable!("expected a submitted booking, got {outcome:?}");
    };
    assert_eq!(confirmation.reference.as_deref(), Some("EVT-0001"));
    assert_eq!(backend.bookings_created(), 1);

    let state = engine.snapshot().await;
    assert_eq!(state.booking_reference.as_deref(), Some("EVT-0001"));
    assert_eq!(state.payment_status, Some(PaymentStatus::Pending));
    assert_eq!(state.booking_confirmed_at, Some(test_clock().now()));
    assert!(!state.loading);
}

#[tokio::test]
async fn incomplete_booking_never_reaches_the_backend() {
    let backend = StubBackend::default();
    let engine = engine(backend.clone());
    engine.select_item(concert()).await.unwrap().wait().await;
    engine.update_selections(two_vip()).await.unwrap();

    let outcome = engine.submit_booking().await.unwrap();

    let SubmitOutcome::Invalid(report) = outcome else {
        unreachable!("expected validation errors, got {outcome:?}");
    };
    assert!(report.error("email").is_some());
    assert_eq!(backend.bookings_created(), 0);

    let state = engine.snapshot().await;
    assert_eq!(state.validation_errors, report.errors);
    assert!(state.error.is_some());
}

#[tokio::test]
async fn backend_rejection_is_reported() {
    let backend = StubBackend {
        booking: Err(ApiFailure {
            error: "Sold out".to_string(),
            status: Some(409),
            data: None,
        }),
        ..StubBackend::default()
    };
    let engine = engine(backend);
    fill_booking(&engine).await;

    let outcome = engine.submit_booking().await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Rejected(ref failure) if failure.status == Some(409)));
    let state = engine.snapshot().await;
    assert_eq!(state.error.as_deref(), Some("Sold out"));
    assert!(state.booking_reference.is_none());
}

#[tokio::test]
async fn successful_verification_completes_payment() {
    let engine = engine(StubBackend::default());
    fill_booking(&engine).await;
    assert_ok!(engine.submit_booking().await);

    let verification = engine.verify_payment("EVT-0001").await.unwrap().unwrap();

    assert_eq!(verification.data.status, "success");
    let state = engine.snapshot().await;
    assert_eq!(state.payment_status, Some(PaymentStatus::Completed));
    assert!(state.payment_verification.is_some());
}

#[tokio::test]
async fn reset_submission_never_answers_the_next_one() {
    let backend = StubBackend {
        booking_latency: vec![Duration::from_millis(100), Duration::from_millis(400)],
        ..StubBackend::default()
    };
    let engine = engine(backend.clone());
    fill_booking(&engine).await;

    let first = tokio::spawn({
        let engine = engine.clone();
        async move { engine.submit_booking().await }
    });
    while backend.bookings_created() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    engine.reset_booking().await.unwrap();
    fill_booking(&engine).await;
    let outcome = engine.submit_booking().await.unwrap();

    let SubmitOutcome::Submitted(confirmation) = outcome else {
        unreachable!("expected a submitted booking, got {outcome:?}");
    };
    assert_eq!(confirmation.reference.as_deref(), Some("EVT-0002"));
    assert_eq!(engine.snapshot().await.booking_reference.as_deref(), Some("EVT-0002"));
    assert_ok!(first.await.unwrap());
}

#[tokio::test]
async fn submission_while_one_is_in_flight_is_refused() {
    let backend = StubBackend {
        booking_latency: vec![Duration::from_millis(200)],
        ..StubBackend::default()
    };
    let engine = engine(backend.clone());
    fill_booking(&engine).await;

    let first = tokio::spawn({
        let engine = engine.clone();
        async move { engine.submit_booking().await }
    });
    while backend.bookings_created() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let outcome = engine.submit_booking().await.unwrap();

    assert_eq!(outcome, SubmitOutcome::InFlight);
    let first = first.await.unwrap().unwrap();
    assert!(matches!(first, SubmitOutcome::Submitted(ref c) if c.reference.as_deref() == Some("EVT-0001")));
    assert_eq!(backend.bookings_created(), 1);
}

#[tokio::test]
async fn update_and_cancel_go_straight_to_the_backend() {
    let engine = engine(StubBackend::default());

    let updated = engine.update_booking("EVT-7", json!({"quantity": 3})).await.unwrap();
    let cancelled = engine.cancel_booking("EVT-7").await.unwrap();

    assert_eq!(updated.data["updated"], json!({"quantity": 3}));
    assert_eq!(cancelled.data["status"], json!("cancelled"));
}

// ============================================================================
// Navigation and configuration
// ============================================================================

#[tokio::test]
async fn unknown_step_is_refused() {
    let engine = engine(StubBackend::default());

    let result = engine.go_to_step(StepKey::new("sessions")).await;

    assert!(matches!(result, Err(BookingError::UnknownStep { ref step, .. }) if step == "sessions"));
    assert_eq!(engine.snapshot().await.current_step, StepKey::LIST);
}

#[tokio::test]
async fn closing_returns_to_the_first_step() {
    let engine = engine(StubBackend::default());
    engine.open().await.unwrap();
    assert_ok!(engine.go_to_step(StepKey::DETAILS).await);
    assert_eq!(engine.current_component().await.unwrap().as_str(), "EventDetails");

    engine.close().await.unwrap();

    let state = engine.snapshot().await;
    assert!(!state.widget_open);
    assert_eq!(state.current_step, StepKey::LIST);
    assert_eq!(engine.current_component().await.unwrap().as_str(), "EventList");
}

#[tokio::test]
async fn unsupported_business_type_leaves_the_session_alone() {
    let engine = engine(StubBackend::default());
    engine.load_items(Filters::new()).await.unwrap().wait().await;

    let error = assert_err!(engine.set_business_type("nope").await);

    assert!(matches!(error, BookingError::UnsupportedBusinessType(ref t) if t == "nope"));
    let state = engine.snapshot().await;
    assert_eq!(state.adapter.business_type(), "events");
    assert_eq!(state.items, vec![concert()]);
}

#[tokio::test]
async fn config_with_new_business_type_switches_adapter() {
    let engine = engine(StubBackend::default());
    engine.load_items(Filters::new()).await.unwrap().wait().await;
    engine.update_selections(two_vip()).await.unwrap();

    engine
        .set_config(ConfigPatch {
            business_type: Some("furniture".to_string()),
            currency: Some("USD".to_string()),
            ..ConfigPatch::default()
        })
        .await
        .unwrap();

    let state = engine.snapshot().await;
    assert_eq!(state.adapter.business_type(), "furniture");
    assert_eq!(state.config.business_type, "furniture");
    assert_eq!(state.config.currency, "USD");
    assert_eq!(state.current_step, StepKey::LIST);
    assert!(state.items.is_empty());
    assert!(state.selections.is_empty());
}

#[tokio::test]
async fn entry_session_picks_up_adapter_branding() {
    let manager = sessions(StubBackend::default());

    let session = manager.init(config("entry")).await.unwrap();

    let branding = session.config().await.branding;
    assert_eq!(branding.company_name.as_deref(), Some("Entry Tickets"));
    assert_eq!(branding.primary_color.as_deref(), Some("#0f766e"));
}

#[tokio::test]
async fn host_branding_wins_over_adapter_defaults() {
    let manager = sessions(StubBackend::default());
    let mut host = config("entry");
    host.branding.company_name = Some("Lekki Conservation Centre".to_string());

    let session = manager.init(host).await.unwrap();

    let branding = session.config().await.branding;
    assert_eq!(branding.company_name.as_deref(), Some("Lekki Conservation Centre"));
    assert_eq!(branding.primary_color.as_deref(), Some("#0f766e"));

    session.set_business_type("events").await.unwrap();
    let branding = session.config().await.branding;
    assert_eq!(branding.company_name.as_deref(), Some("Lekki Conservation Centre"));
    assert!(branding.primary_color.is_none());
}

#[tokio::test]
async fn invalid_config_patch_is_refused() {
    let engine = engine(StubBackend::default());

    let result = engine
        .set_config(ConfigPatch {
            api_base_url: Some(String::new()),
            ..ConfigPatch::default()
        })
        .await;

    assert!(matches!(result, Err(BookingError::InvalidConfig(_))));
    assert_eq!(engine.config().await.api_base_url, "https://api.booking.test/api");
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn sessions_deregister_when_dropped() {
    let manager = sessions(StubBackend::default());

    let first = manager.init(config("events")).await.unwrap();
    let second = manager.init(config("group")).await.unwrap();
    assert_eq!(manager.instances().len(), 2);
    assert!(manager.get(first.id()).is_some());

    let gone = first.id();
    drop(first);

    let remaining = manager.instances();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, second.id());
    assert_eq!(remaining[0].business_type, "group");
    assert!(manager.get(gone).is_none());
}

#[tokio::test]
async fn destroy_all_shuts_every_session_down() {
    let manager = sessions(StubBackend::default());
    let first = manager.init(config("events")).await.unwrap();
    let _second = manager.init(config("entry")).await.unwrap();

    assert_eq!(manager.destroy_all().await, 2);

    assert!(manager.instances().is_empty());
    assert_err!(first.open().await);
}

#[tokio::test]
async fn auto_show_opens_the_widget() {
    let manager = sessions(StubBackend::default());

    let session = manager.init(config("events").with_auto_show(true)).await.unwrap();

    assert!(session.snapshot().await.widget_open);
    assert_eq!(
        manager.config(session.id()).await.map(|c| c.auto_show),
        Some(true)
    );
}

#[tokio::test]
async fn seed_carries_selections_into_the_next_session() {
    let manager = sessions(StubBackend::default());
    let landing = manager.init(config("events")).await.unwrap();
    landing.update_selections(two_vip()).await.unwrap();

    let seed = landing.seed_for("furniture").await;
    assert_ok!(landing.close().await);

    let session = manager.init_with_seed(config("events"), seed).await.unwrap();

    let state = session.snapshot().await;
    assert_eq!(state.adapter.business_type(), "furniture");
    assert_eq!(state.selections.get(&ItemId::from(10_u64)).map(|s| s.quantity), Some(2));
    assert_eq!(manager.instances().len(), 1);
}

#[tokio::test]
async fn seed_with_unknown_business_type_fails() {
    let manager = sessions(StubBackend::default());
    let seed = SessionSeed {
        business_type: Some("spa".to_string()),
        ..SessionSeed::default()
    };

    let result = manager.init_with_seed(config("events"), seed).await;

    assert!(matches!(result, Err(BookingError::UnsupportedBusinessType(_))));
    assert!(manager.instances().is_empty());
}
