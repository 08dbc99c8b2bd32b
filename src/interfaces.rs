use crate::data::base_data::BaseDataEnum;
use crate::data::subscription_config::SubscriptionDataConfig;
use crate::data::symbol::Symbol;
use crate::data::time_slice::TimeSlice;
use crate::error::CoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// The external collaborator that owns a live connection to one or more
/// brokerages/vendors. The core only ever calls these four methods; everything about
/// credentials, reconnects, and wire formats lives on the other side of this trait.
#[async_trait]
pub trait DataQueueHandler: Send + Sync {
    async fn subscribe(&self, config: SubscriptionDataConfig) -> CoreResult<()>;
    async fn unsubscribe(&self, config: &SubscriptionDataConfig) -> CoreResult<()>;
    /// Non-blocking: returns whatever has arrived since the last poll, or an empty
    /// vec if nothing has. The core is responsible for calling this on its own cadence.
    async fn poll(&self, config: &SubscriptionDataConfig) -> CoreResult<Vec<BaseDataEnum>>;
    async fn lookup_symbols(&self, canonical: &Symbol, include_expired: bool) -> CoreResult<Vec<Symbol>>;
    async fn can_perform_selection(&self) -> bool;
}

/// Resolves a symbol/date pair to the corporate-action adjustment data a consolidator
/// needs to normalize raw prices, per `CoreConfig::data_normalization_mode`.
pub trait MapFileProvider: Send + Sync {
    fn mapped_symbol(&self, symbol: &Symbol, date: DateTime<Utc>) -> Option<Symbol>;
}

pub trait FactorFileProvider: Send + Sync {
    fn price_factor(&self, symbol: &Symbol, date: DateTime<Utc>) -> Option<rust_decimal::Decimal>;
}

/// One warmup request: the config to warm up and the range of history to pull.
pub struct HistoryRequest {
    pub config: SubscriptionDataConfig,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Supplies historical `TimeSlice`s for warmup and for bar-level data the live queue
/// doesn't carry. A `HistoryUnavailable` result is not an error the caller need treat
/// specially — warmup just proceeds with no data for that request.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn get_history(&self, requests: &[HistoryRequest], slice_time_zone: Tz) -> CoreResult<Vec<TimeSlice>>;
}

/// Re-exported so external collaborators implementing the clock only need this module.
pub use crate::time::TimeProvider;
