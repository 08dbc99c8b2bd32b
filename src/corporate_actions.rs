use crate::data::base_data::{BaseDataEnum, Delisting, DelistingType, Dividend, Split, SplitType};
use crate::data::symbol::Symbol;
use chrono::{DateTime, Utc};
use log::info;

/// Schedules the two-step delisting announcement: a `Warning` some time before the
/// symbol actually stops trading, then `Delisted` at the effective time. Dividends are
/// surfaced as data only (never applied to any cash balance — that is a brokerage
/// concern outside this crate).
struct PendingDelisting {
    symbol: Symbol,
    warning_at: DateTime<Utc>,
    effective_at: DateTime<Utc>,
    warned: bool,
}

struct PendingSplit {
    symbol: Symbol,
    warning_at: DateTime<Utc>,
    effective_at: DateTime<Utc>,
    factor: rust_decimal::Decimal,
    warned: bool,
}

pub struct CorporateActionsFeed {
    pending_delistings: Vec<PendingDelisting>,
    pending_splits: Vec<PendingSplit>,
}

impl CorporateActionsFeed {
    pub fn new() -> Self {
        CorporateActionsFeed { pending_delistings: Vec::new(), pending_splits: Vec::new() }
    }

    /// Registers a future delisting. `warning_at` must be `<= effective_at`; the feed
    /// emits `Delisting::Warning` once `warning_at` is reached and `Delisting::Delisted`
    /// once `effective_at` is reached.
    pub fn schedule_delisting(&mut self, symbol: Symbol, warning_at: DateTime<Utc>, effective_at: DateTime<Utc>) {
        info!("corporate actions: scheduled delisting for {} at {}", symbol, effective_at);
        self.pending_delistings.push(PendingDelisting { symbol, warning_at, effective_at, warned: false });
    }

    /// Registers a future split. `warning_at` must be `<= effective_at`; the feed emits
    /// `Split::Warning` once `warning_at` is reached and `Split::Occurred` once
    /// `effective_at` is reached.
    pub fn schedule_split(&mut self, symbol: Symbol, warning_at: DateTime<Utc>, effective_at: DateTime<Utc>, factor: rust_decimal::Decimal) {
        info!("corporate actions: scheduled {}-for-1 split for {} at {}", factor, symbol, effective_at);
        self.pending_splits.push(PendingSplit { symbol, warning_at, effective_at, factor, warned: false });
    }

    /// Emits every corporate action whose time has arrived at or before `frontier`. Each
    /// pending action emits its `Warning` once, then its `Delisted`/`Occurred` once,
    /// after which it is dropped from the pending set.
    pub fn due(&mut self, frontier: DateTime<Utc>) -> Vec<BaseDataEnum> {
        let mut out = Vec::new();

        self.pending_delistings.retain_mut(|pending| {
            if !pending.warned && pending.warning_at <= frontier {
                out.push(BaseDataEnum::Delisting(Delisting {
                    symbol: pending.symbol.clone(),
                    delisting_type: DelistingType::Warning,
                    time: pending.warning_at,
                }));
                pending.warned = true;
            }
            if pending.effective_at <= frontier {
                out.push(BaseDataEnum::Delisting(Delisting {
                    symbol: pending.symbol.clone(),
                    delisting_type: DelistingType::Delisted,
                    time: pending.effective_at,
                }));
                false
            } else {
                true
            }
        });

        self.pending_splits.retain_mut(|pending| {
            if !pending.warned && pending.warning_at <= frontier {
                out.push(BaseDataEnum::Split(Split {
                    symbol: pending.symbol.clone(),
                    split_type: SplitType::Warning,
                    factor: pending.factor,
                    time: pending.warning_at,
                }));
                pending.warned = true;
            }
            if pending.effective_at <= frontier {
                out.push(BaseDataEnum::Split(Split {
                    symbol: pending.symbol.clone(),
                    split_type: SplitType::Occurred,
                    factor: pending.factor,
                    time: pending.effective_at,
                }));
                false
            } else {
                true
            }
        });

        out
    }

    pub fn emit_dividend(symbol: Symbol, distribution: rust_decimal::Decimal, time: DateTime<Utc>) -> BaseDataEnum {
        BaseDataEnum::Dividend(Dividend { symbol, distribution, time })
    }
}

impl Default for CorporateActionsFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::resolution::SecurityType;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn delisting_fires_once_frontier_reaches_effective_time() {
        let mut feed = CorporateActionsFeed::new();
        let symbol = Symbol::new("ZZZ", SecurityType::Equity, "NASDAQ");
        let effective = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        feed.schedule_delisting(symbol.clone(), effective - chrono::Duration::days(3), effective);

        assert!(feed.due(effective - chrono::Duration::days(4)).is_empty());
        let due = feed.due(effective);
        assert_eq!(due.len(), 2);
        assert!(feed.due(effective).is_empty(), "should only fire once");
    }

    #[test]
    fn delisting_warning_precedes_delisted_by_exactly_one_day() {
        let mut feed = CorporateActionsFeed::new();
        let symbol = Symbol::new("ZZZ", SecurityType::Equity, "NASDAQ");
        let effective = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let warning = effective - chrono::Duration::days(1);
        feed.schedule_delisting(symbol.clone(), warning, effective);

        let due = feed.due(warning);
        assert_eq!(due.len(), 1);
        match &due[0] {
            BaseDataEnum::Delisting(d) => {
                assert_eq!(d.delisting_type, DelistingType::Warning);
                assert_eq!(d.time, warning);
            }
            other => panic!("expected delisting, got {:?}", other),
        }
        assert!(feed.due(warning).is_empty(), "warning should only fire once");

        let due = feed.due(effective);
        assert_eq!(due.len(), 1);
        match &due[0] {
            BaseDataEnum::Delisting(d) => assert_eq!(d.delisting_type, DelistingType::Delisted),
            other => panic!("expected delisting, got {:?}", other),
        }
    }

    #[test]
    fn split_warning_precedes_occurred_by_exactly_one_day() {
        let mut feed = CorporateActionsFeed::new();
        let symbol = Symbol::new("ZZZ", SecurityType::Equity, "NASDAQ");
        let effective = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let warning = effective - chrono::Duration::days(1);
        feed.schedule_split(symbol.clone(), warning, effective, dec!(2));

        let due = feed.due(warning);
        assert_eq!(due.len(), 1);
        match &due[0] {
            BaseDataEnum::Split(s) => assert_eq!(s.split_type, SplitType::Warning),
            other => panic!("expected split, got {:?}", other),
        }

        let due = feed.due(effective);
        assert_eq!(due.len(), 1);
        match &due[0] {
            BaseDataEnum::Split(s) => assert_eq!(s.split_type, SplitType::Occurred),
            other => panic!("expected split, got {:?}", other),
        }
    }
}
