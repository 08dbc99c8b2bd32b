use crate::data::subscription_config::SubscriptionDataConfig;
use crate::data::symbol::Symbol;
use thiserror::Error;

/// The core's error sum, mirroring the `ErrorKind` design from the system spec.
///
/// Per-tick and per-bar failures (bad symbol, wrong tick type, malformed bar) never
/// surface here — they are dropped silently and counted, per the routing contract.
/// `CoreError` is reserved for failures a caller or the runtime must react to.
#[derive(Debug, Error, Clone)]
pub enum CoreError {
    #[error("subscription rejected for {symbol}: {reason}")]
    SubscriptionRejected { symbol: Symbol, reason: String },

    #[error("producer failure on {config}: {reason}")]
    ProducerFailure {
        config: SubscriptionDataConfig,
        reason: String,
    },

    #[error("custom data reader failure for {config}: {reason}")]
    ReaderFailure {
        config: SubscriptionDataConfig,
        reason: String,
    },

    #[error("history unavailable for {config} in range")]
    HistoryUnavailable { config: SubscriptionDataConfig },

    #[error("chain lookup failed for {canonical}")]
    ChainLookupFailure { canonical: Symbol },

    #[error("fatal core invariant violated: {reason}")]
    Fatal { reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
