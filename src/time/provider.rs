use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// The clock abstraction the rest of the core is written against. Live mode uses the
/// wall clock; backtests and tests drive a `ManualTimeProvider` directly so the
/// synchronizer's frontier advances deterministically.
pub trait TimeProvider: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock, used in live mode.
#[derive(Clone, Copy, Default, Debug)]
pub struct WallClock;

impl TimeProvider for WallClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// An atomic, nanosecond-resolution clock a caller advances explicitly. Used for warmup
/// and backtests, where the synchronizer's frontier *is* the clock rather than being
/// read from it.
#[derive(Debug)]
pub struct ManualTimeProvider {
    nanos: AtomicI64,
}

impl ManualTimeProvider {
    pub fn new(start: DateTime<Utc>) -> Self {
        ManualTimeProvider {
            nanos: AtomicI64::new(start.timestamp_nanos_opt().unwrap_or(0)),
        }
    }

    pub fn set(&self, time: DateTime<Utc>) {
        self.nanos.store(time.timestamp_nanos_opt().unwrap_or(0), Ordering::Release);
    }

    pub fn advance(&self, duration: chrono::Duration) {
        self.nanos.fetch_add(duration.num_nanoseconds().unwrap_or(0), Ordering::AcqRel);
    }
}

impl TimeProvider for ManualTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.nanos.load(Ordering::Acquire))
    }
}

/// Switches between a `ManualTimeProvider` (warmup/backtest) and the wall clock (live),
/// so the rest of the core can hold one `Arc<dyn TimeProvider>` across the
/// warmup-to-live transition instead of threading a mode flag through every call site.
pub struct CompositeTimeProvider {
    manual: ManualTimeProvider,
    live: bool,
}

impl CompositeTimeProvider {
    pub fn new_warmup(start: DateTime<Utc>) -> Self {
        CompositeTimeProvider {
            manual: ManualTimeProvider::new(start),
            live: false,
        }
    }

    /// Switches this provider to the wall clock. Irreversible: once live, a core never
    /// goes back to manually driven time.
    pub fn go_live(&mut self) {
        self.live = true;
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn manual(&self) -> &ManualTimeProvider {
        &self.manual
    }
}

impl TimeProvider for CompositeTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        if self.live {
            Utc::now()
        } else {
            self.manual.now()
        }
    }
}
