mod chain;
mod schedule;
mod universe;

pub use chain::ChainProvider;
pub use schedule::UniverseSchedule;
pub use universe::Universe;
