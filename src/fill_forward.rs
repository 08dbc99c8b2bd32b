use crate::calendar::TradingHours;
use chrono::{DateTime, Utc};

/// Gates whether the consolidator may synthesize a carried-forward bar for a quiet
/// period: a fill-forward bar is never synthesized while the exchange calendar says
/// the market is closed, only while it's open with no trades to report.
pub struct FillForwardFilter {
    hours: TradingHours,
}

impl FillForwardFilter {
    pub fn new(hours: TradingHours) -> Self {
        FillForwardFilter { hours }
    }

    /// Whether this filter's calendar considers `time` tradable under `extended`.
    pub fn is_open(&self, time: DateTime<Utc>, extended: bool) -> bool {
        self.hours.is_open_for(time, extended)
    }
}
