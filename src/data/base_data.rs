use crate::data::resolution::{Resolution, TickType};
use crate::data::symbol::Symbol;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

/// Common accessors every `BaseData` variant exposes, mirrored on the `BaseDataEnum`
/// itself so callers rarely need to match on the variant directly.
pub trait BaseData {
    fn symbol(&self) -> &Symbol;
    fn time_utc(&self) -> DateTime<Utc>;
    fn end_time_utc(&self) -> DateTime<Utc>;
    fn resolution(&self) -> Resolution;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SplitType {
    Warning,
    Occurred,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DelistingType {
    Warning,
    Delisted,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Tick {
    pub symbol: Symbol,
    pub price: Decimal,
    pub quantity: Decimal,
    pub tick_type: TickType,
    pub time: DateTime<Utc>,
    pub suspicious: bool,
}

impl BaseData for Tick {
    fn symbol(&self) -> &Symbol {
        &self.symbol
    }
    fn time_utc(&self) -> DateTime<Utc> {
        self.time
    }
    /// A tick is instantaneous: `end_time == time`.
    fn end_time_utc(&self) -> DateTime<Utc> {
        self.time
    }
    fn resolution(&self) -> Resolution {
        Resolution::Instant
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct TradeBar {
    pub symbol: Symbol,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub time: DateTime<Utc>,
    pub period: Duration,
    pub resolution: Resolution,
    pub is_fill_forward: bool,
}

impl TradeBar {
    pub fn new(symbol: Symbol, time: DateTime<Utc>, period: Duration, resolution: Resolution, price: Decimal, volume: Decimal) -> Self {
        TradeBar {
            symbol,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
            time,
            period,
            resolution,
            is_fill_forward: false,
        }
    }

    pub fn update_with_tick(&mut self, price: Decimal, volume: Decimal) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.volume += volume;
    }
}

impl BaseData for TradeBar {
    fn symbol(&self) -> &Symbol {
        &self.symbol
    }
    fn time_utc(&self) -> DateTime<Utc> {
        self.time
    }
    fn end_time_utc(&self) -> DateTime<Utc> {
        self.time + self.period
    }
    fn resolution(&self) -> Resolution {
        self.resolution
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Ohlc {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl Ohlc {
    pub fn new(price: Decimal) -> Self {
        Ohlc { open: price, high: price, low: price, close: price }
    }

    pub fn update(&mut self, price: Decimal) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct QuoteBar {
    pub symbol: Symbol,
    pub bid: Ohlc,
    pub ask: Ohlc,
    pub time: DateTime<Utc>,
    pub period: Duration,
    pub resolution: Resolution,
    pub is_fill_forward: bool,
}

impl QuoteBar {
    pub fn new(symbol: Symbol, time: DateTime<Utc>, period: Duration, resolution: Resolution, bid: Decimal, ask: Decimal) -> Self {
        QuoteBar {
            symbol,
            bid: Ohlc::new(bid),
            ask: Ohlc::new(ask),
            time,
            period,
            resolution,
            is_fill_forward: false,
        }
    }
}

impl BaseData for QuoteBar {
    fn symbol(&self) -> &Symbol {
        &self.symbol
    }
    fn time_utc(&self) -> DateTime<Utc> {
        self.time
    }
    fn end_time_utc(&self) -> DateTime<Utc> {
        self.time + self.period
    }
    fn resolution(&self) -> Resolution {
        self.resolution
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Dividend {
    pub symbol: Symbol,
    pub distribution: Decimal,
    pub time: DateTime<Utc>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Split {
    pub symbol: Symbol,
    pub split_type: SplitType,
    pub factor: Decimal,
    pub time: DateTime<Utc>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct MarginInterestRate {
    pub symbol: Symbol,
    pub rate: Decimal,
    pub time: DateTime<Utc>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Delisting {
    pub symbol: Symbol,
    pub delisting_type: DelistingType,
    pub time: DateTime<Utc>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct CustomData {
    pub symbol: Symbol,
    pub time: DateTime<Utc>,
    pub payload: Vec<u8>,
}

/// The tagged union of every data kind the core can route or emit. Consolidators are
/// generic over an input-variant constraint rather than the full enum (see
/// `aggregation::consolidator`), but downstream code (time slices, rolling windows)
/// works with `BaseDataEnum` uniformly.
#[derive(Clone, PartialEq, Debug)]
pub enum BaseDataEnum {
    Tick(Tick),
    TradeBar(TradeBar),
    QuoteBar(QuoteBar),
    Dividend(Dividend),
    Split(Split),
    MarginInterestRate(MarginInterestRate),
    Delisting(Delisting),
    Custom(CustomData),
}

impl BaseDataEnum {
    pub fn symbol(&self) -> &Symbol {
        match self {
            BaseDataEnum::Tick(d) => &d.symbol,
            BaseDataEnum::TradeBar(d) => &d.symbol,
            BaseDataEnum::QuoteBar(d) => &d.symbol,
            BaseDataEnum::Dividend(d) => &d.symbol,
            BaseDataEnum::Split(d) => &d.symbol,
            BaseDataEnum::MarginInterestRate(d) => &d.symbol,
            BaseDataEnum::Delisting(d) => &d.symbol,
            BaseDataEnum::Custom(d) => &d.symbol,
        }
    }

    pub fn time_utc(&self) -> DateTime<Utc> {
        match self {
            BaseDataEnum::Tick(d) => d.time_utc(),
            BaseDataEnum::TradeBar(d) => d.time_utc(),
            BaseDataEnum::QuoteBar(d) => d.time_utc(),
            BaseDataEnum::Dividend(d) => d.time,
            BaseDataEnum::Split(d) => d.time,
            BaseDataEnum::MarginInterestRate(d) => d.time,
            BaseDataEnum::Delisting(d) => d.time,
            BaseDataEnum::Custom(d) => d.time,
        }
    }

    /// `end_time = time + period` for bars; instantaneous for everything else.
    pub fn end_time_utc(&self) -> DateTime<Utc> {
        match self {
            BaseDataEnum::Tick(d) => d.end_time_utc(),
            BaseDataEnum::TradeBar(d) => d.end_time_utc(),
            BaseDataEnum::QuoteBar(d) => d.end_time_utc(),
            other => other.time_utc(),
        }
    }

    pub fn is_fill_forward(&self) -> bool {
        match self {
            BaseDataEnum::TradeBar(d) => d.is_fill_forward,
            BaseDataEnum::QuoteBar(d) => d.is_fill_forward,
            _ => false,
        }
    }
}
