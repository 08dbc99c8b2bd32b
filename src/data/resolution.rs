use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumIter};

/// The resolution of a data point or subscription, which determines the time period
/// of each bar (or `Tick`/`Instant` for pass-through data).
#[derive(
    Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, EnumIter,
)]
pub enum Resolution {
    /// Pass-through, no consolidation: quotes.
    Instant,
    /// Every `n` ticks.
    Ticks(u64),
    Seconds(u64),
    Minutes(u64),
    Hours(u64),
    Day,
    Week,
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::Instant
    }
}

impl Resolution {
    /// The period covered by one bar at this resolution. `Instant`/`Ticks` resolutions
    /// have no fixed period: they return `Duration::zero()`.
    pub fn as_duration(&self) -> Duration {
        match self {
            Resolution::Instant => Duration::zero(),
            Resolution::Ticks(_) => Duration::zero(),
            Resolution::Seconds(val) => Duration::seconds(*val as i64),
            Resolution::Minutes(val) => Duration::minutes(*val as i64),
            Resolution::Hours(val) => Duration::hours(*val as i64),
            Resolution::Day => Duration::days(1),
            Resolution::Week => Duration::weeks(1),
        }
    }

    pub fn is_tick_resolution(&self) -> bool {
        matches!(self, Resolution::Ticks(_) | Resolution::Instant)
    }

    /// True if `self` is a coarser cadence than `other` (used to decide whether an
    /// internal, finer-resolution subscription should be created alongside a user one).
    pub fn is_coarser_than(&self, other: &Resolution) -> bool {
        self.as_duration() > other.as_duration()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Instant => write!(f, "Instant"),
            Resolution::Ticks(val) => write!(f, "{}-Tick", val),
            Resolution::Seconds(val) => write!(f, "{}-Second", val),
            Resolution::Minutes(val) => write!(f, "{}-Minute", val),
            Resolution::Hours(val) => write!(f, "{}-Hour", val),
            Resolution::Day => write!(f, "1-Day"),
            Resolution::Week => write!(f, "1-Week"),
        }
    }
}

/// Which side/kind of tick a subscription wants routed to it. Distinct from
/// `BaseDataType` because a single `Tick` resolution subscription still picks a lane.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Display)]
pub enum TickType {
    Trade,
    Quote,
}

/// The security type of a `Symbol`, used to decide chain-expansion and calendar rules.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, EnumIter)]
pub enum SecurityType {
    Equity,
    Forex,
    Future,
    Option,
    ContinuousFuture,
    Crypto,
    Index,
}

impl SecurityType {
    /// Canonical symbols (chains) never carry tradable price data.
    pub fn is_canonical(&self) -> bool {
        matches!(self, SecurityType::Future | SecurityType::Option)
    }
}
