use crate::data::symbol::Symbol;
use crate::error::{CoreError, CoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// External collaborator that resolves a canonical option/future symbol into its
/// current constituent contracts. Implemented outside this crate (the actual chain
/// data comes from a broker/vendor feed); the core only consumes it.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Returns the tradable contracts currently backing `canonical` as of `as_of`.
    /// A failure here is a `ChainLookupFailure`, not a silent drop, since a universe
    /// that can't resolve its chain has no members to select at all.
    async fn resolve(&self, canonical: &Symbol, as_of: DateTime<Utc>) -> CoreResult<Vec<Symbol>>;
}

/// Expands a canonical symbol into its constituents via a `ChainProvider`, translating
/// any provider failure into `ChainLookupFailure`.
pub async fn expand_chain(provider: &dyn ChainProvider, canonical: &Symbol, as_of: DateTime<Utc>) -> CoreResult<Vec<Symbol>> {
    provider
        .resolve(canonical, as_of)
        .await
        .map_err(|_| CoreError::ChainLookupFailure { canonical: canonical.clone() })
}
