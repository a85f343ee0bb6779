// Mock mode support
// Latency/failure simulation and the fixture data served by the mock adapters

pub mod fixtures;

use std::time::Duration;

use rand::Rng;

use crate::config::MockSettings;
use crate::error::{AppError, AppResult};

/// Suspends the caller for roughly `ms` milliseconds
pub async fn simulate_delay(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Returns true with probability `rate`; rates outside 0.0..=1.0 are clamped
pub fn simulate_failure(rate: f64) -> bool {
    let rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
    rand::thread_rng().gen_bool(rate)
}

/// Applies the configured delay and failure rate in front of a fixture lookup
#[derive(Debug, Clone)]
pub struct Simulator {
    delay_ms: u64,
    failure_rate: f64,
}

impl Simulator {
    pub fn new(settings: &MockSettings) -> Self {
        Self {
            delay_ms: settings.delay_ms,
            failure_rate: settings.failure_rate,
        }
    }

    pub fn instant() -> Self {
        Self {
            delay_ms: 0,
            failure_rate: 0.0,
        }
    }

    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate;
        self
    }

    /// Waits, then fails with an upstream error when the dice say so
    pub async fn call(&self, upstream: &str) -> AppResult<()> {
        simulate_delay(self.delay_ms).await;

        if simulate_failure(self.failure_rate) {
            return Err(AppError::upstream(format!("Mock {} API failure", upstream)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_failure_rate_bounds() {
        for _ in 0..100 {
            assert!(!simulate_failure(0.0));
            assert!(simulate_failure(1.0));
        }
    }

    #[test]
    fn test_out_of_range_rates_are_clamped() {
        assert!(!simulate_failure(-3.0));
        assert!(simulate_failure(7.5));
        assert!(!simulate_failure(f64::NAN));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_waits_requested_time() {
        let start = tokio::time::Instant::now();
        simulate_delay(500).await;
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_simulator_failure_is_upstream_error() {
        let sim = Simulator::instant().with_failure_rate(1.0);
        let err = sim.call("Intranet").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert!(err.to_string().contains("Mock Intranet API failure"));
    }
}
