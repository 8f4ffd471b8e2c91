use std::time::Duration;

/// A named fixed-window admission policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// The total requests to be allowed within the interval.
    pub max_requests: u64,
    /// The rate limiting interval.
    pub interval: Duration,
}

impl Policy {
    /// Panics if `max_requests` or `window_seconds` is zero.
    ///
    /// The policy table below is built from this in const context, so a bad
    /// entry fails the build rather than misbehaving at request time.
    pub const fn new(max_requests: u64, window_seconds: u64) -> Self {
        assert!(max_requests > 0, "max_requests must be positive");
        assert!(window_seconds > 0, "window_seconds must be positive");
        Self {
            max_requests,
            interval: Duration::from_secs(window_seconds),
        }
    }

    pub fn window_seconds(&self) -> u64 {
        self.interval.as_secs()
    }
}

/// Fallback for API routes without a more specific category.
pub const API_DEFAULT: Policy = Policy::new(60, 60);

/// Gateway search queries.
pub const SEARCH: Policy = Policy::new(20, 60);

/// Messages relayed to an agent session.
pub const SEND_MESSAGE: Policy = Policy::new(10, 60);

/// Agent spawn requests.
pub const SPAWN: Policy = Policy::new(5, 300);

/// Index rebuild operations, by far the most expensive gateway call.
pub const INDEX: Policy = Policy::new(2, 600);
