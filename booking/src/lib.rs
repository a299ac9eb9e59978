//! # Universal Booking
//!
//! Adapter-driven booking state machine behind embeddable booking widgets.
//!
//! One generic engine serves several verticals (attraction entry tickets,
//! event tickets, furniture rentals, group packages). Everything that
//! differs between them lives in a [`BusinessAdapter`]: backend endpoints,
//! wizard steps, validation, pricing, and the booking payload.
//!
//! ## Example
//!
//! ```no_run
//! use universal_booking::{Filters, SessionManager, WidgetConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WidgetConfig::new("events", "https://api.example.com/api").with_auto_show(true);
//!     let sessions = SessionManager::with_http_backend(&config)?;
//!
//!     let session = sessions.init(config).await?;
//!     session.load_items(Filters::new()).await?.wait().await;
//!
//!     for item in session.snapshot().await.items {
//!         println!("{} {}", item.name, item.price);
//!     }
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Layers
//!
//! - [`adapter`]: the adapter contract, the built-in verticals, and the factory
//! - [`reducer`]: the wizard's state machine over [`BookingState`]
//! - [`api`]: the [`BookingBackend`] seam and its HTTP implementation
//! - [`engine`]: typed dispatchers over one session's store
//! - [`session`]: session registry for embedding hosts

pub mod adapter;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod reducer;
pub mod session;
pub mod state;
pub mod step;
pub mod types;
pub mod validation;

// Re-export main types for convenience
pub use adapter::{
    AdapterFactory, AdapterHandle, ApiConfig, BusinessAdapter, Endpoint, EntryAdapter,
    EventAdapter, FurnitureAdapter, GroupAdapter, Labels, PricingContext,
};
pub use api::{
    ApiFailure, ApiResponse, ApiSuccess, BookingBackend, BookingConfirmation, PaymentVerification,
    RequestContext, UniversalApiService,
};
pub use config::{Branding, ConfigPatch, WidgetConfig};
pub use engine::{BookingEngine, SubmitOutcome};
pub use error::{ApiError, BookingError};
pub use reducer::{BookingAction, BookingEnvironment, BookingReducer, SubmitRefusal};
pub use session::{SessionHandle, SessionId, SessionInfo, SessionManager, SessionSeed};
pub use state::{BookingState, Correlation, RequestId, Resource};
pub use step::{BookingStep, ComponentRef, StepKey};
pub use types::{
    BookingData, BookingDetails, BookingDetailsPatch, Category, CustomerInfo, CustomerInfoPatch,
    Filters, Item, ItemId, Money, PaymentStatus, Selection, SelectionPatch, Selections,
};
pub use validation::ValidationReport;
