use crate::aggregation::AggregationManager;
use crate::calendar::TradingHours;
use crate::config::DataMappingMode;
use crate::continuous_future::ContinuousFutureMap;
use crate::corporate_actions::CorporateActionsFeed;
use crate::data::base_data::{BaseDataEnum, DelistingType};
use crate::data::subscription_config::SubscriptionDataConfig;
use crate::data::symbol::Symbol;
use crate::data::time_slice::{SecurityChanges, TimeSlice};
use crate::error::CoreResult;
use crate::fill_forward::FillForwardFilter;
use crate::subscription::SubscriptionHandler;
use crate::synchronizer::{CancellationToken, Synchronizer};
use crate::time::CompositeTimeProvider;
use crate::universe::Universe;
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use log::info;

/// Constructs subscriptions from requests and wires together everything downstream of
/// raw data: the aggregation manager, the fill-forward filter, corporate actions, and
/// the synchronizer. This is the one type an embedding algorithm host actually talks
/// to; everything else in this crate is a collaborator it owns.
pub struct DataFeed {
    subscriptions: SubscriptionHandler,
    aggregation: AggregationManager,
    fill_forward: AHashMap<Symbol, FillForwardFilter>,
    corporate_actions: CorporateActionsFeed,
    continuous_futures: AHashMap<Symbol, ContinuousFutureMap>,
    universes: AHashMap<String, Universe>,
    synchronizer: Synchronizer,
    clock: CompositeTimeProvider,
}

impl DataFeed {
    pub fn new(start: DateTime<Utc>, history_to_retain: usize) -> Self {
        DataFeed {
            subscriptions: SubscriptionHandler::new(history_to_retain),
            aggregation: AggregationManager::new(),
            fill_forward: AHashMap::new(),
            corporate_actions: CorporateActionsFeed::new(),
            continuous_futures: AHashMap::new(),
            universes: AHashMap::new(),
            synchronizer: Synchronizer::new(CancellationToken::new()),
            clock: CompositeTimeProvider::new_warmup(start),
        }
    }

    /// Registers the exchange calendar a symbol's fill-forward filter should consult.
    /// Must be called before any data arrives for that symbol if `fill_forward` is set.
    pub fn register_calendar(&mut self, symbol: Symbol, hours: TradingHours) {
        self.fill_forward.insert(symbol, FillForwardFilter::new(hours));
    }

    pub fn add_subscription(&mut self, config: SubscriptionDataConfig) -> CoreResult<()> {
        self.subscriptions.add(config.clone())?;
        self.aggregation.add_subscription(config);
        Ok(())
    }

    pub fn remove_subscription(&mut self, config: &SubscriptionDataConfig) {
        self.subscriptions.remove(config);
        self.aggregation.remove_subscription(config);
    }

    pub fn queue_security_changes(&mut self, changes: SecurityChanges) {
        self.synchronizer.queue_security_changes(changes);
    }

    /// Registers a universe under its own name so `run_universe_selection` can later
    /// drive it.
    pub fn register_universe(&mut self, universe: Universe) {
        self.universes.insert(universe.name.clone(), universe);
    }

    pub fn universe(&self, name: &str) -> Option<&Universe> {
        self.universes.get(name)
    }

    /// Runs one selection pass for the named universe if its schedule says it should
    /// run at `current_time`, diffs the result against its current membership, and
    /// applies the diff: adds a subscription (cloned from `template` onto the new
    /// symbol) for everything added, tears down the subscription for everything
    /// removed, and queues the resulting `SecurityChanges` for the next slice.
    pub fn run_universe_selection(
        &mut self,
        name: &str,
        selected: Vec<Symbol>,
        current_time: DateTime<Utc>,
        template: &SubscriptionDataConfig,
    ) -> CoreResult<()> {
        let should_run = match self.universes.get(name) {
            Some(universe) => universe.should_run(current_time),
            None => return Ok(()),
        };
        if !should_run {
            return Ok(());
        }

        let changes = {
            let universe = self.universes.get_mut(name).expect("checked above");
            universe.diff(selected, current_time)
        };

        for symbol in &changes.added {
            let config = SubscriptionDataConfig { symbol: symbol.clone(), ..template.clone() };
            self.add_subscription(config)?;
        }

        let to_remove: Vec<SubscriptionDataConfig> = changes
            .removed
            .iter()
            .filter_map(|symbol| self.subscriptions.configs_for_symbol(symbol).next().cloned())
            .collect();
        for config in to_remove {
            self.remove_subscription(&config);
        }

        self.queue_security_changes(changes);
        Ok(())
    }

    /// Registers a continuous-future symbol whose active contract will be kept current
    /// by calls to `remap_continuous_future`.
    pub fn register_continuous_future(&mut self, canonical: Symbol, mode: DataMappingMode, depth_offset: u32) {
        self.continuous_futures
            .insert(canonical.clone(), ContinuousFutureMap::new(canonical, mode, depth_offset));
    }

    /// Applies a freshly ranked contract chain (front month first) to a registered
    /// continuous future. If this changes the active contract, the old contract's
    /// subscription is torn down, the new one's is created in its place (cloning the
    /// canonical's own subscription config for resolution/data type/tick lane), and a
    /// `SecurityChanges` describing the swap is queued for the next slice — splicing the
    /// mapping change into the same slice boundary rather than the one in progress.
    pub fn remap_continuous_future(&mut self, canonical: &Symbol, ranked_chain: &[Symbol], as_of: DateTime<Utc>) -> CoreResult<()> {
        let Some(map) = self.continuous_futures.get_mut(canonical) else {
            return Ok(());
        };
        let previous = map.active_contract().cloned();
        if !map.remap(ranked_chain, as_of) {
            return Ok(());
        }
        let new_contract = map.active_contract().cloned();

        let Some(template) = self.subscriptions.configs_for_symbol(canonical).next().cloned() else {
            return Ok(());
        };

        if let Some(old) = &previous {
            let old_config = SubscriptionDataConfig { symbol: old.clone(), ..template.clone() };
            self.remove_subscription(&old_config);
        }

        let mut changes = SecurityChanges::default();
        if let Some(new_symbol) = new_contract {
            let new_config = SubscriptionDataConfig { symbol: new_symbol.clone(), ..template };
            self.add_subscription(new_config)?;
            changes.added.push(new_symbol);
        }
        if let Some(old) = previous {
            changes.removed.push(old);
        }
        self.queue_security_changes(changes);
        Ok(())
    }

    /// Feeds one raw data point through aggregation and enqueues whatever it produces
    /// onto the matching subscription. Ticks that match no subscription are dropped by
    /// the aggregation manager, not surfaced here.
    pub fn ingest(&mut self, data: &BaseDataEnum, config: &SubscriptionDataConfig) {
        if let Some(produced) = self.aggregation.route(data, config) {
            if let Some(subscription) = self.subscriptions.get_mut(&config.routing_key()) {
                for item in produced {
                    subscription.enqueue(item);
                }
            }
        }
    }

    /// Advances every consolidator and fill-forward filter to `time`, enqueuing any bar
    /// the passage of time closes or synthesizes.
    pub fn advance_time(&mut self, time: DateTime<Utc>) {
        let fill_forward = &self.fill_forward;
        let market_open = move |config: &SubscriptionDataConfig| {
            fill_forward
                .get(&config.symbol)
                .map(|filter| filter.is_open(time, config.extended_market_hours))
                .unwrap_or(true)
        };
        for closed in self.aggregation.update_time(time, &market_open) {
            let config = match self.config_for(&closed) {
                Some(c) => c,
                None => continue,
            };
            if let Some(subscription) = self.subscriptions.get_mut(&config) {
                subscription.enqueue(closed);
            }
        }

        let mut delisted: Vec<SubscriptionDataConfig> = Vec::new();
        for action in self.corporate_actions.due(time) {
            let is_delisted = matches!(&action, BaseDataEnum::Delisting(d) if d.delisting_type == DelistingType::Delisted);
            if let Some(key) = self.config_for(&action) {
                if let Some(subscription) = self.subscriptions.get_mut(&key) {
                    subscription.enqueue(action);
                }
                if is_delisted {
                    if let Some(config) = self.subscriptions.get(&key).map(|s| s.config.clone()) {
                        delisted.push(config);
                    }
                }
            }
        }
        for config in delisted {
            self.remove_subscription(&config);
        }
    }

    fn config_for(&self, data: &BaseDataEnum) -> Option<(Symbol, crate::data::subscription_config::BaseDataType, crate::data::resolution::TickType, crate::data::resolution::Resolution)> {
        self.subscriptions.configs_for_symbol(data.symbol()).next().map(|c| c.routing_key())
    }

    pub fn pull_slice(&mut self) -> CoreResult<Option<TimeSlice>> {
        self.synchronizer.pull_slice(&mut self.subscriptions, &self.clock)
    }

    /// Irreversibly switches this feed from warmup to live: once history is exhausted
    /// the synchronizer starts honoring the real clock instead of draining backlog.
    pub fn go_live(&mut self) {
        info!("data feed: transitioning from warmup to live");
        self.clock.go_live();
    }

    pub fn is_live(&self) -> bool {
        self.clock.is_live()
    }

    pub fn exit(&self) {
        self.synchronizer.exit();
    }
}
