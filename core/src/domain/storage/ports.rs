use std::future::Future;

use crate::domain::common::entities::app_errors::CoreError;

/// Port for the device-local string blob store.
///
/// Values are opaque strings; collections are stored whole under a single
/// key and rewritten whole on every mutation. The store offers no change
/// notification of its own.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`, if any
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, CoreError>> + Send;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), CoreError>> + Send;
}
