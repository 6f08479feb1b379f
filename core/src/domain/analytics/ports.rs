use std::future::Future;

use serde_json::{Map, Value};

use crate::domain::{
    analytics::{
        entities::{AnalyticsEvent, AnalyticsEventName},
        value_objects::FlushOutcome,
    },
    common::entities::app_errors::CoreError,
};

/// Delivery of a batch of events to the ingestion endpoint.
#[cfg_attr(test, mockall::automock)]
pub trait AnalyticsTransport: Send + Sync {
    /// `Ok` only when the endpoint acknowledged the whole batch.
    fn send_batch(
        &self,
        events: Vec<AnalyticsEvent>,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Durable local telemetry queue with batched, all-or-nothing delivery.
pub trait AnalyticsService: Send + Sync {
    /// Queue an event. Never fails: problems are logged and swallowed so the
    /// calling action is never interrupted.
    fn track(
        &self,
        name: AnalyticsEventName,
        properties: Option<Map<String, Value>>,
    ) -> impl Future<Output = ()> + Send;

    /// Deliver the whole queue as one batch; clear it only on success.
    fn flush(&self) -> impl Future<Output = FlushOutcome> + Send;

    fn start_session(&self) -> impl Future<Output = ()> + Send;

    fn end_session(&self, duration_ms: u64) -> impl Future<Output = ()> + Send;

    /// The persisted session id, created on first use.
    fn session_id(&self) -> impl Future<Output = Result<String, CoreError>> + Send;

    /// Forget the session id; the next event starts a new one.
    fn reset_session(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn pending_events(&self) -> impl Future<Output = Result<Vec<AnalyticsEvent>, CoreError>> + Send;
}
