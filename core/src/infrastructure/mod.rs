pub mod analytics;
pub mod generation;
pub mod storage;
