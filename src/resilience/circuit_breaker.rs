use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct HostState {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

impl HostState {
    fn new() -> Self {
        Self {
            consecutive_failures: 0,
            opened_at: None,
        }
    }
}

/// Per-host circuit breaker state, guarded by a single mutex, mirroring the
/// small in-memory caches guarded by `std::sync::Mutex` elsewhere in this
/// crate rather than anything lock-free: breaker state is touched once per
/// request, never on a hot path.
pub struct CircuitBreakerMap {
    hosts: Mutex<HashMap<String, HostState>>,
    threshold: u32,
    cooldown: Duration,
}

impl CircuitBreakerMap {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            hosts: Mutex::new(HashMap::new()),
            threshold,
            cooldown,
        }
    }

    /// Returns `Some(remaining)` if the breaker for `host` is currently open.
    pub fn trip_remaining(&self, host: &str) -> Option<Duration> {
        let hosts = self.hosts.lock().unwrap();
        let state = hosts.get(host)?;
        let opened_at = state.opened_at?;
        let elapsed = opened_at.elapsed();
        if elapsed >= self.cooldown {
            None
        } else {
            Some(self.cooldown - elapsed)
        }
    }

    pub fn record_failure(&self, host: &str) {
        let mut hosts = self.hosts.lock().unwrap();
        let state = hosts.entry(host.to_owned()).or_insert_with(HostState::new);
        state.consecutive_failures += 1;
        if state.consecutive_failures >= self.threshold {
            state.opened_at = Some(Instant::now());
        }
    }

    pub fn record_success(&self, host: &str) {
        let mut hosts = self.hosts.lock().unwrap();
        if let Some(state) = hosts.get_mut(host) {
            state.consecutive_failures = 0;
            state.opened_at = None;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn opens_after_threshold_consecutive_failures() {
        let breaker = CircuitBreakerMap::new(5, Duration::from_secs(60));
        for _ in 0..4 {
            breaker.record_failure("example.com");
            assert!(breaker.trip_remaining("example.com").is_none());
        }
        breaker.record_failure("example.com");
        assert!(breaker.trip_remaining("example.com").is_some());
    }

    #[test]
    fn success_resets_failure_count() {
        let breaker = CircuitBreakerMap::new(2, Duration::from_secs(60));
        breaker.record_failure("example.com");
        breaker.record_success("example.com");
        breaker.record_failure("example.com");
        assert!(breaker.trip_remaining("example.com").is_none());
    }

    #[test]
    fn different_hosts_are_independent() {
        let breaker = CircuitBreakerMap::new(1, Duration::from_secs(60));
        breaker.record_failure("a.example.com");
        assert!(breaker.trip_remaining("a.example.com").is_some());
        assert!(breaker.trip_remaining("b.example.com").is_none());
    }
}
