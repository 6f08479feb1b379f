pub mod entities;
pub mod services;

pub use entities::{Subscription, Topic};
pub use services::Notifier;
