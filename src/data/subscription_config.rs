use crate::data::resolution::{Resolution, TickType};
use crate::data::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of consolidated output a subscription wants.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BaseDataType {
    Ticks,
    TradeBars,
    QuoteBars,
    Fundamentals,
}

/// How `suspicious` ticks are filtered at and above `Second` resolution. Defaults to
/// `NonTick`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum FilterSuspiciousTicks {
    Always,
    Never,
    NonTick,
}

impl Default for FilterSuspiciousTicks {
    fn default() -> Self {
        FilterSuspiciousTicks::NonTick
    }
}

/// A single data-stream configuration: symbol, cadence, tick lane, and the handling
/// flags that govern fill-forward and extended hours. Created when a subscription is
/// added, destroyed when it is removed. `tick_type` must be compatible with
/// `data_type` and `resolution` must be `>= Tick` (enforced by `SubscriptionRequest`
/// validation in `subscription::handler`, not here — this type is just the value).
#[derive(Clone, PartialEq, Debug)]
pub struct SubscriptionDataConfig {
    pub symbol: Symbol,
    pub data_type: BaseDataType,
    pub resolution: Resolution,
    pub tick_type: TickType,
    pub fill_forward: bool,
    pub extended_market_hours: bool,
    /// Hidden finer-resolution subscriptions created to seed a security's price cache;
    /// invisible to user code.
    pub is_internal: bool,
    /// When set, `Resolution::Day` bars end exactly one day after the first data point
    /// that opened them rather than being aligned to midnight UTC.
    pub daily_precise_end_time: bool,
}

impl SubscriptionDataConfig {
    pub fn new(symbol: Symbol, data_type: BaseDataType, resolution: Resolution, tick_type: TickType) -> Self {
        SubscriptionDataConfig {
            symbol,
            data_type,
            resolution,
            tick_type,
            fill_forward: true,
            extended_market_hours: false,
            is_internal: false,
            daily_precise_end_time: false,
        }
    }

    pub fn internal(mut self) -> Self {
        self.is_internal = true;
        self
    }

    pub fn with_fill_forward(mut self, fill_forward: bool) -> Self {
        self.fill_forward = fill_forward;
        self
    }

    pub fn with_extended_hours(mut self, extended: bool) -> Self {
        self.extended_market_hours = extended;
        self
    }

    pub fn with_daily_precise_end_time(mut self, precise: bool) -> Self {
        self.daily_precise_end_time = precise;
        self
    }

    /// The `(symbol, data_type, tick_type, resolution)` routing key: distinct configs
    /// with this key equal are still separate consolidators (duplicates are permitted).
    pub fn routing_key(&self) -> (Symbol, BaseDataType, TickType, Resolution) {
        (self.symbol.clone(), self.data_type, self.tick_type, self.resolution)
    }
}

impl fmt::Display for SubscriptionDataConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} {:?} {}{}",
            self.symbol,
            self.data_type,
            self.resolution,
            self.tick_type,
            if self.is_internal { " (internal)" } else { "" }
        )
    }
}

impl fmt::Display for BaseDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
