use crate::aggregation::consolidator::{Consolidator, QuoteBarConsolidator, TickPassThrough, TradeBarConsolidator};
use crate::data::base_data::BaseDataEnum;
use crate::data::subscription_config::{BaseDataType, SubscriptionDataConfig};
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use log::{debug, warn};

type RoutingKey = (crate::data::symbol::Symbol, BaseDataType, crate::data::resolution::TickType, crate::data::resolution::Resolution);

/// Owns every subscription's consolidator. Per the concurrency model this lives on a
/// single dedicated thread (the base data exchange): no lock guards any of this state,
/// since nothing else ever touches it concurrently.
pub struct AggregationManager {
    consolidators: AHashMap<RoutingKey, Box<dyn Consolidator>>,
    dropped_count: u64,
}

impl AggregationManager {
    pub fn new() -> Self {
        AggregationManager { consolidators: AHashMap::new(), dropped_count: 0 }
    }

    pub fn add_subscription(&mut self, config: SubscriptionDataConfig) {
        let key = config.routing_key();
        let consolidator: Box<dyn Consolidator> = match config.resolution {
            r if r.is_tick_resolution() => Box::new(TickPassThrough::new()),
            _ => match config.data_type {
                BaseDataType::TradeBars => Box::new(TradeBarConsolidator::new(config.clone())),
                BaseDataType::QuoteBars => Box::new(QuoteBarConsolidator::new(config.clone())),
                _ => Box::new(TickPassThrough::new()),
            },
        };
        debug!("aggregation: adding consolidator for {}", config);
        self.consolidators.insert(key, consolidator);
    }

    pub fn remove_subscription(&mut self, config: &SubscriptionDataConfig) {
        self.consolidators.remove(&config.routing_key());
    }

    /// Routes one incoming data point to its consolidator. Ticks that match no
    /// subscription's `(symbol, data_type, tick_type, resolution)` key are dropped
    /// silently and counted — this is the routing contract's fail-quiet path, not a
    /// `CoreError`.
    pub fn route(&mut self, data: &BaseDataEnum, config: &SubscriptionDataConfig) -> Option<Vec<BaseDataEnum>> {
        let key = config.routing_key();
        let Some(consolidator) = self.consolidators.get_mut(&key) else {
            self.dropped_count += 1;
            warn!("aggregation: dropped data for unknown subscription key");
            return None;
        };
        let mut out = Vec::new();
        if let Some(output) = consolidator.update(data) {
            // The closed bar's `end_time_utc` always precedes the in-progress bar's,
            // so it must be queued first to keep a subscription's pending queue
            // monotonic by `end_time_utc` (the invariant `drain_ready` relies on).
            if let Some(closed) = output.closed {
                out.push(closed);
            }
            out.push(output.open);
        }
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }

    /// Advances every consolidator's notion of time, emitting any bar that the
    /// passage of time (rather than new data) closes, or that fill-forward synthesizes
    /// for a subscription whose market `market_open` reports as tradable.
    pub fn update_time(&mut self, time: DateTime<Utc>, market_open: &dyn Fn(&SubscriptionDataConfig) -> bool) -> Vec<BaseDataEnum> {
        self.consolidators
            .values_mut()
            .filter_map(|consolidator| consolidator.update_time(time, market_open))
            .collect()
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count
    }
}

impl Default for AggregationManager {
    fn default() -> Self {
        Self::new()
    }
}
