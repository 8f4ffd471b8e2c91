use crate::backend::{Backend, CheckInput, CheckOutput, Decision};
use actix_web::rt::task::JoinHandle;
use actix_web::rt::time::Instant;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60;

/// A fixed window rate limiter [Backend] that uses [Dashmap](dashmap::DashMap)
/// to store windows in memory.
///
/// Windows expire lazily inside [Backend::check]; the periodic sweep only
/// reclaims memory and is never needed for correctness.
#[derive(Clone)]
pub struct InMemoryBackend {
    map: Arc<DashMap<String, Window>>,
    sweep_handle: Option<Arc<JoinHandle<()>>>,
}

struct Window {
    reset: Instant,
    count: u64,
}

impl Window {
    /// Shared expiry predicate for lazy expiry and the sweeper.
    ///
    /// Strict comparison: a check arriving exactly at `reset` is still inside
    /// the old window.
    fn is_expired(&self, now: Instant) -> bool {
        now > self.reset
    }
}

impl InMemoryBackend {
    pub fn builder() -> InMemoryBackendBuilder {
        InMemoryBackendBuilder {
            sweep_interval: Some(Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECONDS)),
        }
    }

    /// Number of keys currently held in the store, expired-but-unswept
    /// entries included. Informational only.
    pub fn active_keys(&self) -> usize {
        self.map.len()
    }

    fn sweep(map: &DashMap<String, Window>, now: Instant) {
        map.retain(|_k, w| !w.is_expired(now));
    }

    fn sweeper(map: Arc<DashMap<String, Window>>, interval: Duration) -> JoinHandle<()> {
        assert!(
            interval.as_secs_f64() > 0f64,
            "Sweep interval must be non-zero"
        );
        actix_web::rt::spawn(async move {
            loop {
                let now = Instant::now();
                Self::sweep(&map, now);
                actix_web::rt::time::sleep_until(now + interval).await;
            }
        })
    }
}

#[async_trait(?Send)]
impl Backend for InMemoryBackend {
    async fn check(&self, input: CheckInput) -> actix_web::Result<(Decision, CheckOutput)> {
        let now = Instant::now();
        let policy = input.policy;
        let fresh_reset = now
            .checked_add(policy.interval)
            .expect("Interval unexpectedly large");
        // The entry guard holds the shard lock for the whole
        // read-check-increment sequence, making it atomic per key.
        let mut entry = self.map.entry(input.key).or_insert_with(|| Window {
            reset: fresh_reset,
            count: 0,
        });
        let window = entry.value_mut();
        if window.is_expired(now) {
            window.reset = fresh_reset;
            window.count = 0;
        }
        let decision = if window.count >= policy.max_requests {
            // Denied requests do not count against the window.
            Decision::Denied
        } else {
            window.count += 1;
            Decision::Allowed
        };
        let output = CheckOutput {
            limit: policy.max_requests,
            remaining: policy.max_requests.saturating_sub(window.count),
            reset: window.reset,
        };
        Ok((decision, output))
    }
}

impl Drop for InMemoryBackend {
    fn drop(&mut self) {
        if let Some(handle) = &self.sweep_handle {
            handle.abort();
        }
    }
}

pub struct InMemoryBackendBuilder {
    sweep_interval: Option<Duration>,
}

impl InMemoryBackendBuilder {
    /// Override the default sweep interval.
    ///
    /// Set to None to disable sweeping.
    ///
    /// The sweeper periodically scans the internal map, removing expired
    /// windows.
    pub fn with_sweep_interval(mut self, interval: Option<Duration>) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn build(self) -> InMemoryBackend {
        let map = Arc::new(DashMap::<String, Window>::new());
        let sweep_handle = self
            .sweep_interval
            .map(|interval| Arc::new(InMemoryBackend::sweeper(map.clone(), interval)));
        InMemoryBackend { map, sweep_handle }
    }
}
