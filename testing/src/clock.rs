//! Pinned time for reducer environments.

use chrono::{DateTime, TimeZone, Utc};
use universal_booking_core::environment::Clock;

/// A clock that never moves
///
/// Reducers stamp confirmations with `env.clock.now()`; pinning the clock
/// lets tests compare those stamps exactly.
///
/// ```
/// use universal_booking_core::environment::Clock;
/// use universal_booking_testing::test_clock;
///
/// let clock = test_clock();
/// assert_eq!(clock.now(), clock.now());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// A clock stuck at `time`
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// The shared test clock, pinned to 2025-01-01T00:00:00Z
///
/// # Panics
///
/// Never in practice; the instant is a valid, unambiguous UTC time.
#[must_use]
#[allow(clippy::expect_used)] // Constant instant
pub fn test_clock() -> FixedClock {
    FixedClock::new(
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .expect("2025-01-01 midnight is a single UTC instant"),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_pinned_to_new_year_2025() {
        let clock = test_clock();
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn fixed_clock_reports_its_instant() {
        let instant = Utc.with_ymd_and_hms(2025, 6, 30, 18, 45, 0).unwrap();
        assert_eq!(FixedClock::new(instant).now(), instant);
    }
}
