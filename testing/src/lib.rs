//! # Universal Booking Testing
//!
//! Test support shared by the booking crates:
//!
//! - [`FixedClock`] / [`test_clock`]: a pinned clock for reducer environments
//! - [`ReducerTest`]: Given-When-Then checks over a single reducer call
//! - [`assertions`]: effect shape checks to pass to [`ReducerTest::then_effects`]
//!
//! ```ignore
//! use universal_booking_testing::{ReducerTest, assertions, test_clock};
//!
//! ReducerTest::new(BookingReducer::new())
//!     .with_env(BookingEnvironment::new(backend, Arc::new(test_clock())))
//!     .given_state(state)
//!     .when_action(BookingAction::LoadItems(Filters::new()))
//!     .then_effects(assertions::assert_has_future_effect)
//!     .run();
//! ```

pub mod clock;

pub use clock::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
