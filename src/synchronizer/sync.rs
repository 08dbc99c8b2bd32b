use crate::data::time_slice::{SecurityChanges, TimeSlice};
use crate::error::{CoreError, CoreResult};
use crate::subscription::SubscriptionHandler;
use crate::synchronizer::cancellation::CancellationToken;
use crate::time::{CompositeTimeProvider, TimeProvider};
use chrono::{DateTime, Utc};
use log::error;

/// Assembles per-instant `TimeSlice`s from every active subscription's pending output,
/// honoring the frontier invariant: the synchronizer never emits a slice whose
/// `utc_time` is earlier than one it has already emitted.
pub struct Synchronizer {
    last_emitted: Option<DateTime<Utc>>,
    pending_changes: SecurityChanges,
    cancellation: CancellationToken,
}

impl Synchronizer {
    pub fn new(cancellation: CancellationToken) -> Self {
        Synchronizer { last_emitted: None, pending_changes: SecurityChanges::default(), cancellation }
    }

    /// Queues `SecurityChanges` (from a universe diff or a manual add/remove) to be
    /// attached to the next slice this synchronizer emits — never the one in progress.
    pub fn queue_security_changes(&mut self, changes: SecurityChanges) {
        self.pending_changes.merge(changes);
    }

    /// Pulls one `TimeSlice` from `subscriptions`, or `None` if cancelled or if there
    /// is nothing ready and live mode has nothing to pulse for yet.
    pub fn pull_slice(&mut self, subscriptions: &mut SubscriptionHandler, clock: &CompositeTimeProvider) -> CoreResult<Option<TimeSlice>> {
        if self.cancellation.is_cancelled() {
            return Ok(None);
        }

        let frontier_candidate = subscriptions.pullable_mut().filter_map(|s| s.peek_end_time()).min();

        let frontier = match frontier_candidate {
            Some(candidate) => candidate,
            None => {
                if clock.is_live() {
                    let now = clock.now();
                    return Ok(Some(self.emit_time_pulse(now)));
                }
                return Ok(None);
            }
        };

        if clock.is_live() {
            let now = clock.now();
            if frontier > now {
                return Ok(Some(self.emit_time_pulse(now)));
            }
        }

        if let Some(last) = self.last_emitted {
            if frontier < last {
                error!("synchronizer: frontier moved backward ({} < {})", frontier, last);
                return Err(CoreError::Fatal { reason: format!("frontier moved backward: {} < {}", frontier, last) });
            }
        }

        let mut slice = TimeSlice::new(frontier);
        for subscription in subscriptions.pullable_mut() {
            for data in subscription.drain_ready(frontier) {
                slice.add(data);
            }
        }

        slice.security_changes = std::mem::take(&mut self.pending_changes);
        self.last_emitted = Some(frontier);
        Ok(Some(slice))
    }

    fn emit_time_pulse(&mut self, now: DateTime<Utc>) -> TimeSlice {
        let mut slice = TimeSlice::time_pulse(now);
        slice.security_changes = std::mem::take(&mut self.pending_changes);
        slice
    }

    pub fn exit(&self) {
        self.cancellation.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::base_data::{BaseDataEnum, Tick};
    use crate::data::resolution::{Resolution, SecurityType, TickType};
    use crate::data::subscription_config::{BaseDataType, SubscriptionDataConfig};
    use crate::data::symbol::Symbol;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn tick(symbol: Symbol, time: DateTime<Utc>) -> BaseDataEnum {
        BaseDataEnum::Tick(Tick { symbol, price: dec!(1), quantity: dec!(1), tick_type: TickType::Trade, time, suspicious: false })
    }

    #[test]
    fn frontier_is_min_across_pullable_subscriptions() {
        let mut handler = SubscriptionHandler::new(10);
        let a = Symbol::new("A", SecurityType::Equity, "NASDAQ");
        let b = Symbol::new("B", SecurityType::Equity, "NASDAQ");
        let a_config = SubscriptionDataConfig::new(a.clone(), BaseDataType::Ticks, Resolution::Instant, TickType::Trade);
        let b_config = SubscriptionDataConfig::new(b.clone(), BaseDataType::Ticks, Resolution::Instant, TickType::Trade);
        handler.add(a_config.clone()).unwrap();
        handler.add(b_config.clone()).unwrap();

        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        handler.get_mut(&a_config.routing_key()).unwrap().enqueue(tick(a.clone(), t0 + chrono::Duration::seconds(5)));
        handler.get_mut(&b_config.routing_key()).unwrap().enqueue(tick(b.clone(), t0 + chrono::Duration::seconds(1)));

        let mut synchronizer = Synchronizer::new(CancellationToken::new());
        let clock = CompositeTimeProvider::new_warmup(t0 + chrono::Duration::seconds(100));
        let slice = synchronizer.pull_slice(&mut handler, &clock).unwrap().unwrap();
        assert_eq!(slice.utc_time, Some(t0 + chrono::Duration::seconds(1)));
    }

    #[test]
    fn frontier_never_moves_backward() {
        let mut handler = SubscriptionHandler::new(10);
        let a = Symbol::new("A", SecurityType::Equity, "NASDAQ");
        let a_config = SubscriptionDataConfig::new(a.clone(), BaseDataType::Ticks, Resolution::Instant, TickType::Trade);
        handler.add(a_config.clone()).unwrap();

        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        handler.get_mut(&a_config.routing_key()).unwrap().enqueue(tick(a.clone(), t0));
        let mut synchronizer = Synchronizer::new(CancellationToken::new());
        let clock = CompositeTimeProvider::new_warmup(t0 + chrono::Duration::seconds(100));
        synchronizer.pull_slice(&mut handler, &clock).unwrap();

        handler.get_mut(&a_config.routing_key()).unwrap().enqueue(tick(a, t0 - chrono::Duration::seconds(1)));
        assert!(synchronizer.pull_slice(&mut handler, &clock).is_err());
    }
}
