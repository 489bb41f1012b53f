//! General time utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A resettable stopwatch.
///
/// The timer does not read a clock itself, instead the current time (in seconds on any monotonic
/// base, usually [`crate::session::get_elapsed_seconds`]) is passed in on every call. This keeps
/// anything built on top of it deterministic under test.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Timer {
    start_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Timer {
    /// Create a new timer which started at the given time.
    pub fn started_at(now_s: f64) -> Self {
        Self { start_s: now_s }
    }

    /// Restart the timer from the given time.
    pub fn reset(&mut self, now_s: f64) {
        self.start_s = now_s;
    }

    /// Seconds elapsed between the last reset and `now_s`.
    ///
    /// A `now_s` earlier than the last reset gives zero rather than a negative time.
    pub fn elapsed_s(&self, now_s: f64) -> f64 {
        (now_s - self.start_s).max(0.0)
    }

    /// Time of the last reset.
    pub fn start_s(&self) -> f64 {
        self.start_s
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_timer() {
        let mut timer = Timer::started_at(2.0);

        assert_eq!(timer.elapsed_s(2.0), 0.0);
        assert_eq!(timer.elapsed_s(4.5), 2.5);

        timer.reset(10.0);
        assert_eq!(timer.elapsed_s(10.0), 0.0);
        assert_eq!(timer.elapsed_s(11.0), 1.0);

        // Clock behind the reset point
        assert_eq!(timer.elapsed_s(9.0), 0.0);
    }

    #[test]
    fn test_duration_to_seconds() {
        assert_eq!(
            duration_to_seconds(chrono::Duration::milliseconds(1500)),
            Some(1.5)
        );
    }
}
