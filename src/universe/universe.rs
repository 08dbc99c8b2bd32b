use crate::data::symbol::Symbol;
use crate::data::time_slice::SecurityChanges;
use crate::universe::schedule::UniverseSchedule;
use ahash::AHashSet;
use chrono::{DateTime, Utc};
use log::info;
use std::time::Duration;

/// A named, scheduled selection of symbols (a coarse scan, a chain expansion, a csv
/// constituent list, ...). The core only consumes the resulting membership set; how a
/// selection function produces it is the caller's business.
pub struct Universe {
    pub name: String,
    pub schedule: UniverseSchedule,
    pub minimum_time_in_universe: Duration,
    members: AHashSet<Symbol>,
    entered_at: ahash::AHashMap<Symbol, DateTime<Utc>>,
    last_run: Option<DateTime<Utc>>,
}

impl Universe {
    pub fn new(name: impl Into<String>, schedule: UniverseSchedule, minimum_time_in_universe: Duration) -> Self {
        Universe {
            name: name.into(),
            schedule,
            minimum_time_in_universe,
            members: AHashSet::new(),
            entered_at: ahash::AHashMap::new(),
            last_run: None,
        }
    }

    pub fn should_run(&self, current_time: DateTime<Utc>) -> bool {
        self.schedule.should_run(current_time, self.last_run)
    }

    pub fn members(&self) -> impl Iterator<Item = &Symbol> {
        self.members.iter()
    }

    /// Applies a freshly computed selection result, producing the `SecurityChanges` to
    /// surface in the next `TimeSlice`. A symbol still within its `minimum_time_in_universe`
    /// window is kept even if the new selection dropped it. If a selection both adds and
    /// removes the same symbol in one pass (a symbol re-entering the same instant it
    /// would otherwise be dropped), `added` wins over `removed`.
    pub fn diff(&mut self, selected: Vec<Symbol>, current_time: DateTime<Utc>) -> SecurityChanges {
        self.last_run = Some(current_time);
        let selected: AHashSet<Symbol> = selected.into_iter().collect();

        let mut added = Vec::new();
        for symbol in &selected {
            if !self.members.contains(symbol) {
                added.push(symbol.clone());
                self.entered_at.insert(symbol.clone(), current_time);
            }
        }

        let mut removed = Vec::new();
        let mut retained = AHashSet::new();
        for symbol in self.members.drain() {
            let still_selected = selected.contains(&symbol);
            let held_long_enough = self
                .entered_at
                .get(&symbol)
                .map(|entered| current_time.signed_duration_since(*entered).to_std().unwrap_or_default() >= self.minimum_time_in_universe)
                .unwrap_or(true);

            if still_selected || !held_long_enough {
                retained.insert(symbol);
            } else {
                removed.push(symbol.clone());
                self.entered_at.remove(&symbol);
            }
        }

        retained.extend(selected.into_iter());
        self.members = retained;

        let removed: Vec<Symbol> = removed.into_iter().filter(|s| !added.contains(s)).collect();

        if !added.is_empty() || !removed.is_empty() {
            info!("universe '{}': +{} -{}", self.name, added.len(), removed.len());
        }

        SecurityChanges { added, removed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::resolution::SecurityType;
    use chrono::TimeZone;

    fn symbol(ticker: &str) -> Symbol {
        Symbol::new(ticker, SecurityType::Equity, "NASDAQ")
    }

    #[test]
    fn added_wins_over_removed_in_same_diff() {
        let mut universe = Universe::new("test", UniverseSchedule::EveryBar, Duration::from_secs(0));
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let changes = universe.diff(vec![symbol("AAA")], t0);
        assert_eq!(changes.added, vec![symbol("AAA")]);

        let changes = universe.diff(vec![symbol("AAA")], t0 + chrono::Duration::seconds(1));
        assert!(changes.added.is_empty());
        assert!(changes.removed.is_empty());
    }

    #[test]
    fn minimum_time_in_universe_delays_removal() {
        let mut universe = Universe::new("test", UniverseSchedule::EveryBar, Duration::from_secs(60));
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        universe.diff(vec![symbol("AAA")], t0);

        let changes = universe.diff(vec![], t0 + chrono::Duration::seconds(10));
        assert!(changes.removed.is_empty(), "should still be held past minimum_time_in_universe");

        let changes = universe.diff(vec![], t0 + chrono::Duration::seconds(120));
        assert_eq!(changes.removed, vec![symbol("AAA")]);
    }
}
