use crate::data::base_data::BaseDataEnum;
use crate::data::resolution::{Resolution, TickType};
use crate::data::rolling_window::RollingWindow;
use crate::data::subscription_config::{BaseDataType, SubscriptionDataConfig};
use crate::data::symbol::Symbol;
use crate::error::{CoreError, CoreResult};
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use log::info;
use std::collections::VecDeque;

type RoutingKey = (Symbol, BaseDataType, TickType, Resolution);

/// One live data stream: its configuration, a queue of consolidated output not yet
/// pulled by the synchronizer, and the bounded history of what has been pulled. The
/// queue preserves arrival order: within a single subscription, data order is the
/// producer's order. The history exists purely for indexed lookback.
pub struct Subscription {
    pub config: SubscriptionDataConfig,
    pending: VecDeque<BaseDataEnum>,
    history: RollingWindow<BaseDataEnum>,
    removed: bool,
}

impl Subscription {
    fn new(config: SubscriptionDataConfig, history_to_retain: usize) -> Self {
        Subscription {
            config,
            pending: VecDeque::new(),
            history: RollingWindow::new(history_to_retain),
            removed: false,
        }
    }

    /// Enqueues newly consolidated output, to be pulled by the synchronizer in the
    /// order it arrived.
    pub fn enqueue(&mut self, data: BaseDataEnum) {
        self.pending.push_back(data);
    }

    /// The `end_time_utc` of the oldest not-yet-pulled item, used by the synchronizer
    /// to compute the frontier.
    pub fn peek_end_time(&self) -> Option<DateTime<Utc>> {
        self.pending.front().map(|d| d.end_time_utc())
    }

    /// Pops every pending item whose `end_time_utc <= frontier`, in arrival order,
    /// recording each into this subscription's history as it is consumed.
    pub fn drain_ready(&mut self, frontier: DateTime<Utc>) -> Vec<BaseDataEnum> {
        let mut ready = Vec::new();
        while let Some(front) = self.pending.front() {
            if front.end_time_utc() > frontier {
                break;
            }
            let data = self.pending.pop_front().unwrap();
            self.history.add(data.clone());
            ready.push(data);
        }
        ready
    }

    pub fn bar_index(&self, index: usize) -> Option<&BaseDataEnum> {
        self.history.get(index)
    }

    pub fn current(&self) -> Option<&BaseDataEnum> {
        self.history.last()
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// Owns every subscription a strategy (or an internal consumer) has requested. Visible
/// subscriptions are reference-counted against the internal, finer-resolution ones they
/// imply, so two visible subscriptions sharing one internal seed don't tear it down
/// until both are gone.
pub struct SubscriptionHandler {
    subscriptions: AHashMap<RoutingKey, Subscription>,
    internal_refcounts: AHashMap<RoutingKey, u32>,
    by_symbol: AHashMap<Symbol, Vec<RoutingKey>>,
    history_to_retain: usize,
}

impl SubscriptionHandler {
    pub fn new(history_to_retain: usize) -> Self {
        SubscriptionHandler {
            subscriptions: AHashMap::new(),
            internal_refcounts: AHashMap::new(),
            by_symbol: AHashMap::new(),
            history_to_retain,
        }
    }

    fn index_key(&mut self, key: RoutingKey) {
        let entry = self.by_symbol.entry(key.0.clone()).or_default();
        if !entry.contains(&key) {
            entry.push(key);
        }
    }

    fn unindex_key(&mut self, key: &RoutingKey) {
        if let Some(entry) = self.by_symbol.get_mut(&key.0) {
            entry.retain(|k| k != key);
            if entry.is_empty() {
                self.by_symbol.remove(&key.0);
            }
        }
    }

    fn validate(config: &SubscriptionDataConfig) -> CoreResult<()> {
        if config.resolution.is_tick_resolution() && config.data_type != BaseDataType::Ticks {
            return Err(CoreError::SubscriptionRejected {
                symbol: config.symbol.clone(),
                reason: "tick resolution requires BaseDataType::Ticks".to_string(),
            });
        }
        if !config.resolution.is_tick_resolution() && config.data_type == BaseDataType::Ticks {
            return Err(CoreError::SubscriptionRejected {
                symbol: config.symbol.clone(),
                reason: "BaseDataType::Ticks requires a tick resolution".to_string(),
            });
        }
        Ok(())
    }

    /// Adds a user-visible subscription. If it requires a finer internal subscription
    /// to seed it (a resolution this crate doesn't yet hold data for), the caller is
    /// responsible for calling `add_internal` separately; this method only manages the
    /// visible entry and does not infer the internal one, since that inference depends
    /// on data availability the subscription layer alone can't see.
    pub fn add(&mut self, config: SubscriptionDataConfig) -> CoreResult<()> {
        Self::validate(&config)?;
        let key = config.routing_key();
        info!("subscription: add {}", config);
        if !self.subscriptions.contains_key(&key) {
            self.index_key(key.clone());
            self.subscriptions.insert(key, Subscription::new(config, self.history_to_retain));
        }
        Ok(())
    }

    pub fn remove(&mut self, config: &SubscriptionDataConfig) {
        let key = config.routing_key();
        if let Some(sub) = self.subscriptions.get_mut(&key) {
            sub.removed = true;
        }
        self.subscriptions.remove(&key);
        self.unindex_key(&key);
        info!("subscription: removed {}", config);
    }

    /// Adds (or increments the reference count of) a hidden, internal subscription.
    pub fn add_internal(&mut self, config: SubscriptionDataConfig) -> CoreResult<()> {
        Self::validate(&config)?;
        let key = config.routing_key();
        *self.internal_refcounts.entry(key.clone()).or_insert(0) += 1;
        if !self.subscriptions.contains_key(&key) {
            self.index_key(key.clone());
            self.subscriptions.insert(key, Subscription::new(config.internal(), self.history_to_retain));
        }
        Ok(())
    }

    /// Decrements an internal subscription's reference count, tearing it down only once
    /// no visible subscription still depends on it.
    pub fn release_internal(&mut self, config: &SubscriptionDataConfig) {
        let key = config.routing_key();
        if let Some(count) = self.internal_refcounts.get_mut(&key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.internal_refcounts.remove(&key);
                self.subscriptions.remove(&key);
                self.unindex_key(&key);
            }
        }
    }

    /// Every config (visible or internal) registered for `symbol`, in the order it was
    /// added. Used to map a data point back to the subscription it belongs to without
    /// scanning every subscription in the handler.
    pub fn configs_for_symbol(&self, symbol: &Symbol) -> impl Iterator<Item = &SubscriptionDataConfig> {
        self.by_symbol
            .get(symbol)
            .into_iter()
            .flatten()
            .filter_map(move |key| self.subscriptions.get(key).map(|s| &s.config))
    }

    pub fn get(&self, key: &RoutingKey) -> Option<&Subscription> {
        self.subscriptions.get(key)
    }

    pub fn get_mut(&mut self, key: &RoutingKey) -> Option<&mut Subscription> {
        self.subscriptions.get_mut(key)
    }

    /// Subscriptions the synchronizer's frontier computation considers: everything
    /// except internal, hidden seed subscriptions.
    pub fn pullable_mut(&mut self) -> impl Iterator<Item = &mut Subscription> {
        self.subscriptions.values_mut().filter(|s| !s.config.is_internal)
    }

    pub fn visible_configs(&self) -> impl Iterator<Item = &SubscriptionDataConfig> {
        self.subscriptions.values().filter(|s| !s.config.is_internal).map(|s| &s.config)
    }

    pub fn all_configs(&self) -> impl Iterator<Item = &SubscriptionDataConfig> {
        self.subscriptions.values().map(|s| &s.config)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::resolution::SecurityType;

    fn symbol() -> Symbol {
        Symbol::new("ES", SecurityType::Future, "CME")
    }

    #[test]
    fn rejects_mismatched_tick_resolution() {
        let mut handler = SubscriptionHandler::new(10);
        let config = SubscriptionDataConfig::new(symbol(), BaseDataType::TradeBars, Resolution::Instant, TickType::Trade);
        assert!(handler.add(config).is_err());
    }

    #[test]
    fn configs_for_symbol_finds_both_visible_and_internal_entries() {
        let mut handler = SubscriptionHandler::new(10);
        let visible = SubscriptionDataConfig::new(symbol(), BaseDataType::TradeBars, Resolution::Minutes(1), TickType::Trade);
        let internal = SubscriptionDataConfig::new(symbol(), BaseDataType::Ticks, Resolution::Instant, TickType::Trade);
        handler.add(visible).unwrap();
        handler.add_internal(internal).unwrap();
        assert_eq!(handler.configs_for_symbol(&symbol()).count(), 2);

        handler.remove(&SubscriptionDataConfig::new(symbol(), BaseDataType::TradeBars, Resolution::Minutes(1), TickType::Trade));
        assert_eq!(handler.configs_for_symbol(&symbol()).count(), 1);
    }

    #[test]
    fn internal_subscription_survives_until_refcount_zero() {
        let mut handler = SubscriptionHandler::new(10);
        let config = SubscriptionDataConfig::new(symbol(), BaseDataType::Ticks, Resolution::Instant, TickType::Trade);
        handler.add_internal(config.clone()).unwrap();
        handler.add_internal(config.clone()).unwrap();
        assert_eq!(handler.len(), 1);
        handler.release_internal(&config);
        assert_eq!(handler.len(), 1);
        handler.release_internal(&config);
        assert_eq!(handler.len(), 0);
    }
}
