use std::time::Duration;

/// Exponential backoff for a custom-data reader after a `ReaderFailure`, capped at the
/// configured ceiling (`CoreConfig::reader_backoff_cap`). Doubles on every consecutive
/// failure and resets the moment a read succeeds.
pub struct ReaderBackoff {
    base: Duration,
    cap: Duration,
    consecutive_failures: u32,
}

impl ReaderBackoff {
    pub fn new(base: Duration, cap: Duration) -> Self {
        ReaderBackoff { base, cap, consecutive_failures: 0 }
    }

    /// The delay to wait before the next read attempt, given the failures recorded so
    /// far. Zero once a read has succeeded (or before any attempt has been made).
    pub fn current_delay(&self) -> Duration {
        if self.consecutive_failures == 0 {
            return Duration::ZERO;
        }
        let shift = self.consecutive_failures.min(31);
        self.base.checked_mul(1u32 << shift).unwrap_or(self.cap).min(self.cap)
    }

    pub fn record_failure(&mut self) -> Duration {
        self.consecutive_failures += 1;
        self.current_delay()
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_then_caps() {
        let mut backoff = ReaderBackoff::new(Duration::from_millis(100), Duration::from_secs(1));
        assert_eq!(backoff.current_delay(), Duration::ZERO);
        assert_eq!(backoff.record_failure(), Duration::from_millis(200));
        assert_eq!(backoff.record_failure(), Duration::from_millis(400));
        assert_eq!(backoff.record_failure(), Duration::from_millis(800));
        assert_eq!(backoff.record_failure(), Duration::from_secs(1));
    }

    #[test]
    fn success_resets_backoff() {
        let mut backoff = ReaderBackoff::new(Duration::from_millis(100), Duration::from_secs(1));
        backoff.record_failure();
        backoff.record_failure();
        backoff.record_success();
        assert_eq!(backoff.current_delay(), Duration::ZERO);
    }
}
