mod provider;

pub use provider::{CompositeTimeProvider, ManualTimeProvider, TimeProvider};
