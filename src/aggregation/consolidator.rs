use crate::data::base_data::{BaseData, BaseDataEnum, QuoteBar, TradeBar};
use crate::data::resolution::{Resolution, TickType};
use crate::data::subscription_config::SubscriptionDataConfig;
use chrono::{DateTime, Timelike, Utc};

/// Floors `time` to the start of the bar period it belongs to. Tick/Instant
/// resolutions have no period and are returned unchanged. When `daily_precise_end_time`
/// is set, `Resolution::Day` is treated like the other resolutions below it and left
/// unfloored, so a daily bar ends exactly 24 hours after the data point that opened it
/// rather than at the next midnight UTC.
pub fn open_time(resolution: Resolution, time: DateTime<Utc>, daily_precise_end_time: bool) -> DateTime<Utc> {
    if resolution == Resolution::Day && daily_precise_end_time {
        return time;
    }
    match resolution {
        Resolution::Seconds(interval) => {
            let timestamp = time.timestamp();
            let rounded = timestamp - (timestamp % interval as i64);
            DateTime::from_timestamp(rounded, 0).unwrap_or(time)
        }
        Resolution::Minutes(interval) => {
            let minute = time.minute() as i64;
            let rounded_minute = (minute / interval as i64) * interval as i64;
            time.with_minute(rounded_minute as u32)
                .and_then(|t| t.with_second(0))
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or(time)
        }
        Resolution::Hours(interval) => {
            let hour = time.hour() as i64;
            let rounded_hour = (hour / interval as i64) * interval as i64;
            time.with_hour(rounded_hour as u32)
                .and_then(|t| t.with_minute(0))
                .and_then(|t| t.with_second(0))
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or(time)
        }
        Resolution::Day => time
            .with_hour(0)
            .and_then(|t| t.with_minute(0))
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(time),
        Resolution::Week | Resolution::Instant | Resolution::Ticks(_) => time,
    }
}

/// The result of feeding one data point to a consolidator: the bar currently being
/// built (always present once any data has arrived) and, when that data point closed
/// the in-progress bar, the bar that just closed plus the new bar it opened.
pub struct ConsolidatorOutput {
    pub open: BaseDataEnum,
    pub closed: Option<BaseDataEnum>,
}

/// Owns one subscription's consolidation state. Per the concurrency model, exactly one
/// thread (the base data exchange) ever touches a given consolidator, so none of this
/// needs interior mutability or locking.
pub trait Consolidator: Send {
    /// Feeds one input data point (a `Tick` for a tick-driven consolidator, a finer
    /// bar for a bar-driven one) and returns the updated state of the current bar,
    /// plus the previous bar if this input closed it.
    fn update(&mut self, data: &BaseDataEnum) -> Option<ConsolidatorOutput>;

    /// Advances consolidation purely on the passage of time (used for fill-forward and
    /// for closing a bar when no further data arrives before its period elapses).
    /// `market_open` answers whether this consolidator's symbol is tradable at `time`
    /// under its subscription's extended-hours setting — fill-forward only ever
    /// synthesizes a bar when it is, per the exchange-calendar gate.
    fn update_time(&mut self, time: DateTime<Utc>, market_open: &dyn Fn(&SubscriptionDataConfig) -> bool) -> Option<BaseDataEnum>;

    fn current(&self) -> Option<&BaseDataEnum>;
}

/// The identity consolidator for `Resolution::Instant`/`Ticks` subscriptions: every
/// tick is passed straight through with no aggregation.
pub struct TickPassThrough {
    last: Option<BaseDataEnum>,
}

impl TickPassThrough {
    pub fn new() -> Self {
        TickPassThrough { last: None }
    }
}

impl Consolidator for TickPassThrough {
    fn update(&mut self, data: &BaseDataEnum) -> Option<ConsolidatorOutput> {
        self.last = Some(data.clone());
        Some(ConsolidatorOutput { open: data.clone(), closed: Some(data.clone()) })
    }

    fn update_time(&mut self, _time: DateTime<Utc>, _market_open: &dyn Fn(&SubscriptionDataConfig) -> bool) -> Option<BaseDataEnum> {
        None
    }

    fn current(&self) -> Option<&BaseDataEnum> {
        self.last.as_ref()
    }
}

/// Builds `TradeBar`s from a stream of `Tick`s (or finer `TradeBar`s). Numeric
/// semantics: open is the first trade in the period, close is the last, high/low are
/// the running max/min, volume is the sum. Ties at a period boundary resolve by
/// arrival order — the tick that arrives first closes the old bar.
pub struct TradeBarConsolidator {
    config: SubscriptionDataConfig,
    current: Option<TradeBar>,
    current_enum: Option<BaseDataEnum>,
    last_close: Option<rust_decimal::Decimal>,
    fill_forward: bool,
}

impl TradeBarConsolidator {
    pub fn new(config: SubscriptionDataConfig) -> Self {
        let fill_forward = config.fill_forward;
        TradeBarConsolidator { config, current: None, current_enum: None, last_close: None, fill_forward }
    }

    fn period(&self) -> chrono::Duration {
        self.config.resolution.as_duration()
    }

    fn bar_start(&self, time: DateTime<Utc>) -> DateTime<Utc> {
        open_time(self.config.resolution, time, self.config.daily_precise_end_time)
    }

    fn ingest_price(&mut self, time: DateTime<Utc>, price: rust_decimal::Decimal, volume: rust_decimal::Decimal) -> ConsolidatorOutput {
        let bar_start = self.bar_start(time);
        let output = match &mut self.current {
            None => {
                let bar = TradeBar::new(self.config.symbol.clone(), bar_start, self.period(), self.config.resolution, price, volume);
                self.current = Some(bar.clone());
                ConsolidatorOutput { open: BaseDataEnum::TradeBar(bar), closed: None }
            }
            Some(bar) if bar.time == bar_start => {
                bar.update_with_tick(price, volume);
                ConsolidatorOutput { open: BaseDataEnum::TradeBar(bar.clone()), closed: None }
            }
            Some(bar) => {
                let closed = bar.clone();
                self.last_close = Some(closed.close);
                let new_bar = TradeBar::new(self.config.symbol.clone(), bar_start, self.period(), self.config.resolution, price, volume);
                self.current = Some(new_bar.clone());
                ConsolidatorOutput { open: BaseDataEnum::TradeBar(new_bar), closed: Some(BaseDataEnum::TradeBar(closed)) }
            }
        };
        self.current_enum = Some(output.open.clone());
        output
    }
}

impl Consolidator for TradeBarConsolidator {
    fn update(&mut self, data: &BaseDataEnum) -> Option<ConsolidatorOutput> {
        match data {
            BaseDataEnum::Tick(tick) if tick.tick_type == TickType::Trade => {
                Some(self.ingest_price(tick.time, tick.price, tick.quantity))
            }
            BaseDataEnum::TradeBar(bar) => Some(self.ingest_price(bar.time, bar.close, bar.volume)),
            _ => None,
        }
    }

    fn update_time(&mut self, time: DateTime<Utc>, market_open: &dyn Fn(&SubscriptionDataConfig) -> bool) -> Option<BaseDataEnum> {
        let bar_start = self.bar_start(time);
        if let Some(bar) = &self.current {
            if time >= bar.end_time_utc() && bar.time != bar_start {
                let closed = bar.clone();
                self.last_close = Some(closed.close);
                self.current = None;
                self.current_enum = None;
                return Some(BaseDataEnum::TradeBar(closed));
            }
            return None;
        }
        if self.fill_forward && market_open(&self.config) {
            if let Some(last_close) = self.last_close {
                let mut bar = TradeBar::new(self.config.symbol.clone(), bar_start, self.period(), self.config.resolution, last_close, rust_decimal::Decimal::ZERO);
                bar.is_fill_forward = true;
                self.current = Some(bar.clone());
                self.current_enum = Some(BaseDataEnum::TradeBar(bar));
            }
        }
        None
    }

    fn current(&self) -> Option<&BaseDataEnum> {
        self.current_enum.as_ref()
    }
}

/// Builds `QuoteBar`s from a stream of bid/ask `Tick`s (or finer `QuoteBar`s).
pub struct QuoteBarConsolidator {
    config: SubscriptionDataConfig,
    current: Option<QuoteBar>,
    current_enum: Option<BaseDataEnum>,
    last_bid_close: Option<rust_decimal::Decimal>,
    last_ask_close: Option<rust_decimal::Decimal>,
    fill_forward: bool,
}

impl QuoteBarConsolidator {
    pub fn new(config: SubscriptionDataConfig) -> Self {
        let fill_forward = config.fill_forward;
        QuoteBarConsolidator { config, current: None, current_enum: None, last_bid_close: None, last_ask_close: None, fill_forward }
    }

    fn period(&self) -> chrono::Duration {
        self.config.resolution.as_duration()
    }

    fn bar_start(&self, time: DateTime<Utc>) -> DateTime<Utc> {
        open_time(self.config.resolution, time, self.config.daily_precise_end_time)
    }
}

impl Consolidator for QuoteBarConsolidator {
    fn update(&mut self, data: &BaseDataEnum) -> Option<ConsolidatorOutput> {
        let (time, bid, ask) = match data {
            BaseDataEnum::Tick(tick) if tick.tick_type == TickType::Quote => (tick.time, tick.price, tick.price),
            BaseDataEnum::QuoteBar(bar) => (bar.time, bar.bid.close, bar.ask.close),
            _ => return None,
        };
        let bar_start = self.bar_start(time);
        let output = match &mut self.current {
            None => {
                let bar = QuoteBar::new(self.config.symbol.clone(), bar_start, self.period(), self.config.resolution, bid, ask);
                self.current = Some(bar.clone());
                ConsolidatorOutput { open: BaseDataEnum::QuoteBar(bar), closed: None }
            }
            Some(bar) if bar.time == bar_start => {
                bar.bid.update(bid);
                bar.ask.update(ask);
                ConsolidatorOutput { open: BaseDataEnum::QuoteBar(bar.clone()), closed: None }
            }
            Some(bar) => {
                let closed = bar.clone();
                self.last_bid_close = Some(closed.bid.close);
                self.last_ask_close = Some(closed.ask.close);
                let new_bar = QuoteBar::new(self.config.symbol.clone(), bar_start, self.period(), self.config.resolution, bid, ask);
                self.current = Some(new_bar.clone());
                ConsolidatorOutput { open: BaseDataEnum::QuoteBar(new_bar), closed: Some(BaseDataEnum::QuoteBar(closed)) }
            }
        };
        self.current_enum = Some(output.open.clone());
        Some(output)
    }

    fn update_time(&mut self, time: DateTime<Utc>, market_open: &dyn Fn(&SubscriptionDataConfig) -> bool) -> Option<BaseDataEnum> {
        let bar_start = self.bar_start(time);
        if let Some(bar) = &self.current {
            if time >= bar.end_time_utc() && bar.time != bar_start {
                let closed = bar.clone();
                self.last_bid_close = Some(closed.bid.close);
                self.last_ask_close = Some(closed.ask.close);
                self.current = None;
                self.current_enum = None;
                return Some(BaseDataEnum::QuoteBar(closed));
            }
            return None;
        }
        if self.fill_forward && market_open(&self.config) {
            if let (Some(bid), Some(ask)) = (self.last_bid_close, self.last_ask_close) {
                let mut bar = QuoteBar::new(self.config.symbol.clone(), bar_start, self.period(), self.config.resolution, bid, ask);
                bar.is_fill_forward = true;
                self.current = Some(bar.clone());
                self.current_enum = Some(BaseDataEnum::QuoteBar(bar));
            }
        }
        None
    }

    fn current(&self) -> Option<&BaseDataEnum> {
        self.current_enum.as_ref()
    }
}
