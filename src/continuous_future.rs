use crate::config::DataMappingMode;
use crate::data::symbol::Symbol;
use chrono::{DateTime, Utc};
use log::info;

/// Tracks, for one canonical continuous-future symbol, which physical contract is
/// currently mapped to it. A remap can occur within a single `TimeSlice`: the
/// synchronizer asks this bookkeeping for the active contract before pulling data for
/// the canonical symbol on every slice, rather than caching it across slices.
pub struct ContinuousFutureMap {
    canonical: Symbol,
    mode: DataMappingMode,
    depth_offset: u32,
    current_contract: Option<Symbol>,
}

impl ContinuousFutureMap {
    pub fn new(canonical: Symbol, mode: DataMappingMode, depth_offset: u32) -> Self {
        ContinuousFutureMap { canonical, mode, depth_offset, current_contract: None }
    }

    pub fn canonical(&self) -> &Symbol {
        &self.canonical
    }

    pub fn active_contract(&self) -> Option<&Symbol> {
        self.current_contract.as_ref()
    }

    /// Chooses the contract that should back the canonical symbol right now from a
    /// ranked chain (front month first). `depth_offset` skips that many contracts past
    /// the one the mapping mode would otherwise pick (e.g. always trade the second
    /// month rather than the front month). Returns `true` if this call changed the
    /// mapped contract — the caller should splice the old contract's final bar and the
    /// new one's opening bar into the same slice when it does.
    pub fn remap(&mut self, ranked_chain: &[Symbol], as_of: DateTime<Utc>) -> bool {
        let index = self.depth_offset as usize;
        let candidate = ranked_chain.get(index).or_else(|| ranked_chain.last()).cloned();

        if candidate.as_ref() != self.current_contract.as_ref() {
            if let Some(new_contract) = &candidate {
                info!(
                    "continuous future: {} remapped to {} at {} (mode {:?})",
                    self.canonical, new_contract, as_of, self.mode
                );
            }
            self.current_contract = candidate;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::resolution::SecurityType;
    use chrono::TimeZone;

    #[test]
    fn remap_detects_front_month_rollover() {
        let canonical = Symbol::canonical_future("ES", "CME");
        let mut map = ContinuousFutureMap::new(canonical, DataMappingMode::OpenInterest, 0);
        let front = Symbol::new("ESH24", SecurityType::Future, "CME");
        let next = Symbol::new("ESM24", SecurityType::Future, "CME");
        let as_of = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        assert!(map.remap(&[front.clone(), next.clone()], as_of));
        assert_eq!(map.active_contract(), Some(&front));

        assert!(!map.remap(&[front.clone(), next.clone()], as_of));
        assert!(map.remap(&[next.clone()], as_of + chrono::Duration::days(30)));
        assert_eq!(map.active_contract(), Some(&next));
    }

    #[test]
    fn depth_offset_skips_front_month() {
        let canonical = Symbol::canonical_future("ES", "CME");
        let mut map = ContinuousFutureMap::new(canonical, DataMappingMode::OpenInterest, 1);
        let front = Symbol::new("ESH24", SecurityType::Future, "CME");
        let next = Symbol::new("ESM24", SecurityType::Future, "CME");
        map.remap(&[front, next.clone()], Utc::now());
        assert_eq!(map.active_contract(), Some(&next));
    }
}
