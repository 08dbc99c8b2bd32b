mod consolidator;
mod manager;

pub use consolidator::{Consolidator, ConsolidatorOutput, TickPassThrough, TradeBarConsolidator, QuoteBarConsolidator};
pub use manager::AggregationManager;
