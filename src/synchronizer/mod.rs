mod cancellation;
mod sync;

pub use cancellation::CancellationToken;
pub use sync::Synchronizer;
