use std::collections::HashSet;

use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument, warn};

use crate::domain::{
    analytics::{
        entities::{AnalyticsEvent, AnalyticsEventName, EventContext},
        ports::{AnalyticsService, AnalyticsTransport},
        value_objects::{FlushOutcome, MAX_QUEUE_LEN, enforce_cap, normalize_queue, properties},
    },
    common::{entities::app_errors::CoreError, generate_uuid_v7, services::Service},
    generation::ports::RecipeGenerator,
    storage::{
        KeyValueStore, StorageKey,
        services::{read_document, write_document},
    },
};

impl<S, G, T> Service<S, G, T>
where
    S: KeyValueStore,
    G: RecipeGenerator,
    T: AnalyticsTransport,
{
    async fn enqueue_event(
        &self,
        name: AnalyticsEventName,
        properties: Option<Map<String, Value>>,
    ) -> Result<(), CoreError> {
        let session_id = self.session_id().await?;
        let event = AnalyticsEvent::new(
            name,
            properties,
            EventContext::capture(&self.settings.device),
            session_id,
        );

        let _guard = self.locks.lock(StorageKey::AnalyticsQueue).await;
        let (_, document) = read_document(&*self.store, StorageKey::AnalyticsQueue).await?;
        let mut queue = normalize_queue(document);
        queue.push(event);
        enforce_cap(&mut queue, MAX_QUEUE_LEN);
        write_document(&*self.store, StorageKey::AnalyticsQueue, &queue).await?;

        debug!(event = %name, queued = queue.len(), "analytics event queued");
        Ok(())
    }

    /// Remove the acknowledged events, keeping anything queued while the
    /// batch was in flight.
    async fn acknowledge(&self, delivered: &HashSet<String>) -> Result<usize, CoreError> {
        let _guard = self.locks.lock(StorageKey::AnalyticsQueue).await;
        let (_, document) = read_document(&*self.store, StorageKey::AnalyticsQueue).await?;
        let mut queue = normalize_queue(document);
        queue.retain(|event| !delivered.contains(&event.id));

        if queue.is_empty() {
            self.store.remove(StorageKey::AnalyticsQueue.as_str()).await?;
        } else {
            write_document(&*self.store, StorageKey::AnalyticsQueue, &queue).await?;
        }
        Ok(queue.len())
    }
}

impl<S, G, T> AnalyticsService for Service<S, G, T>
where
    S: KeyValueStore,
    G: RecipeGenerator,
    T: AnalyticsTransport,
{
    async fn track(&self, name: AnalyticsEventName, properties: Option<Map<String, Value>>) {
        if !self.settings.analytics_enabled {
            return;
        }

        if let Err(e) = self.enqueue_event(name, properties).await {
            warn!(event = %name, error = %e, "failed to queue analytics event");
        }
    }

    #[instrument(skip(self))]
    async fn flush(&self) -> FlushOutcome {
        if !self.settings.analytics_enabled {
            return FlushOutcome::Disabled;
        }

        let queue = match self.pending_events().await {
            Ok(queue) => queue,
            Err(e) => {
                warn!(error = %e, "failed to read analytics queue");
                return FlushOutcome::Unavailable;
            }
        };

        if queue.is_empty() {
            return FlushOutcome::Empty;
        }

        let count = queue.len();
        let delivered: HashSet<String> = queue.iter().map(|event| event.id.clone()).collect();

        let timeout = self.settings.analytics_timeout;
        match tokio::time::timeout(timeout, self.analytics_transport.send_batch(queue)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(error = %e, pending = count, "analytics flush failed, keeping queue");
                return FlushOutcome::Retained(count);
            }
            Err(_) => {
                warn!(?timeout, pending = count, "analytics flush timed out, keeping queue");
                return FlushOutcome::Retained(count);
            }
        }

        match self.acknowledge(&delivered).await {
            Ok(remaining) => info!(delivered = count, remaining, "analytics flushed"),
            // The batch will be sent again; duplicates are acceptable for telemetry.
            Err(e) => warn!(error = %e, "failed to clear delivered analytics events"),
        }
        FlushOutcome::Delivered(count)
    }

    async fn start_session(&self) {
        self.track(AnalyticsEventName::SessionStart, None).await;
    }

    async fn end_session(&self, duration_ms: u64) {
        self.track(
            AnalyticsEventName::SessionEnd,
            properties(json!({ "durationMs": duration_ms })),
        )
        .await;
    }

    async fn session_id(&self) -> Result<String, CoreError> {
        let _guard = self.locks.lock(StorageKey::AnalyticsSession).await;

        if let Some(existing) = self
            .store
            .get(StorageKey::AnalyticsSession.as_str())
            .await?
            .filter(|id| !id.trim().is_empty())
        {
            return Ok(existing);
        }

        let session_id = generate_uuid_v7().to_string();
        self.store
            .set(StorageKey::AnalyticsSession.as_str(), session_id.clone())
            .await?;
        debug!(%session_id, "analytics session created");
        Ok(session_id)
    }

    async fn reset_session(&self) -> Result<(), CoreError> {
        let _guard = self.locks.lock(StorageKey::AnalyticsSession).await;
        self.store.remove(StorageKey::AnalyticsSession.as_str()).await
    }

    async fn pending_events(&self) -> Result<Vec<AnalyticsEvent>, CoreError> {
        let (_, document) = read_document(&*self.store, StorageKey::AnalyticsQueue).await?;
        Ok(normalize_queue(document))
    }
}
