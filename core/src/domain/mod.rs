pub mod analytics;
pub mod common;
pub mod generation;
pub mod history;
pub mod notifier;
pub mod recipe;
pub mod storage;
