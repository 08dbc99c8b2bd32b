mod handler;

pub use handler::{Subscription, SubscriptionHandler};
