use crate::data::base_data::BaseDataEnum;
use crate::data::symbol::Symbol;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Added/removed symbols surfaced by a universe selection or a manual add/remove. The
/// two sets never overlap: if rapid re-selection would otherwise add and remove the
/// same symbol in one diff, `added` wins (see `universe::universe::diff`).
#[derive(Clone, Default, Debug, PartialEq)]
pub struct SecurityChanges {
    pub added: Vec<Symbol>,
    pub removed: Vec<Symbol>,
}

impl SecurityChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn merge(&mut self, other: SecurityChanges) {
        self.added.extend(other.added);
        self.removed.extend(other.removed);
    }
}

/// A per-instant bundle of every data point whose `end_time_utc <= utc_time`, grouped
/// by symbol. `is_time_pulse` marks a slice the synchronizer emitted purely to advance
/// the algorithm clock in live mode when no subscription had data ready yet.
#[derive(Clone, Debug, Default)]
pub struct TimeSlice {
    pub utc_time: Option<DateTime<Utc>>,
    data: BTreeMap<Symbol, Vec<BaseDataEnum>>,
    pub security_changes: SecurityChanges,
    pub is_time_pulse: bool,
}

impl TimeSlice {
    pub fn new(utc_time: DateTime<Utc>) -> Self {
        TimeSlice {
            utc_time: Some(utc_time),
            data: BTreeMap::new(),
            security_changes: SecurityChanges::default(),
            is_time_pulse: false,
        }
    }

    pub fn time_pulse(utc_time: DateTime<Utc>) -> Self {
        TimeSlice {
            utc_time: Some(utc_time),
            data: BTreeMap::new(),
            security_changes: SecurityChanges::default(),
            is_time_pulse: true,
        }
    }

    pub fn add(&mut self, data: BaseDataEnum) {
        self.data.entry(data.symbol().clone()).or_default().push(data);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = BaseDataEnum>) {
        for item in items {
            self.add(item);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.security_changes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BaseDataEnum> {
        self.data.values().flatten()
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&[BaseDataEnum]> {
        self.data.get(symbol).map(|v| v.as_slice())
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.data.keys()
    }
}
