mod memory;

pub use memory::{InMemoryBackend, InMemoryBackendBuilder, DEFAULT_SWEEP_INTERVAL_SECONDS};

use crate::policy::Policy;
use actix_web::rt::time::Instant;
use async_trait::async_trait;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Decision {
    Allowed,
    Denied,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn is_denied(self) -> bool {
        matches!(self, Self::Denied)
    }
}

/// Input for a single admission check.
#[derive(Debug, Clone)]
pub struct CheckInput {
    /// The policy to enforce for this request.
    pub policy: Policy,
    /// The rate limit key to be used for this request.
    pub key: String,
}

/// Outcome of an admission check, used to shape responses.
#[derive(Debug, Clone)]
pub struct CheckOutput {
    /// Total number of requests that are permitted within the window.
    pub limit: u64,
    /// Number of requests that will be permitted until the window resets.
    pub remaining: u64,
    /// Time at which the window resets.
    pub reset: Instant,
}

impl CheckOutput {
    /// Seconds until the window resets (rounded upwards, so that it is
    /// guaranteed to be reset after waiting for the duration).
    pub fn seconds_until_reset(&self) -> u64 {
        let millis = self
            .reset
            .saturating_duration_since(Instant::now())
            .as_millis() as f64;
        (millis / 1000f64).ceil() as u64
    }
}

/// Describes an implementation of a rate limiting store and algorithm.
///
/// A Backend is required to implement [Clone], usually this means wrapping
/// your data store within an [Arc](std::sync::Arc).
#[async_trait(?Send)]
pub trait Backend: Clone {
    /// Decide whether to admit a request for the given key under the given
    /// policy.
    ///
    /// Admission denial is a normal outcome, reported through [Decision], not
    /// through the error channel.
    async fn check(&self, input: CheckInput) -> actix_web::Result<(Decision, CheckOutput)>;
}
