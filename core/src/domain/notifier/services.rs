use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::trace;

use super::entities::{Subscription, Topic};

type Handler = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    // Keyed by a monotonically increasing id, so iteration order is
    // registration order.
    handlers: BTreeMap<u64, (Topic, Handler)>,
}

/// In-process publish/subscribe channel telling mounted surfaces that a
/// collection changed and should be re-read from the store.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct Notifier {
    registry: Arc<Mutex<Registry>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut registry = self.registry();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.handlers.insert(id, (topic, Arc::new(handler)));
        trace!(%topic, id, "subscribed");

        Subscription {
            id,
            topic,
            notifier: self.clone(),
        }
    }

    /// Invoke every handler currently subscribed to `topic`, in registration
    /// order, before returning.
    pub fn publish(&self, topic: Topic) {
        let handlers: Vec<Handler> = self
            .registry()
            .handlers
            .values()
            .filter(|(t, _)| *t == topic)
            .map(|(_, handler)| handler.clone())
            .collect();

        trace!(%topic, subscribers = handlers.len(), "publishing");
        for handler in handlers {
            handler();
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.registry()
            .handlers
            .values()
            .filter(|(t, _)| *t == topic)
            .count()
    }

    pub(super) fn release(&self, id: u64) {
        // The handler is dropped after the registry guard is released; it may
        // own other subscriptions.
        let removed = self.registry().handlers.remove(&id);
        if removed.is_some() {
            trace!(id, "unsubscribed");
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_publish_reaches_subscribers_in_order() {
        let notifier = Notifier::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let first_calls = calls.clone();
        let _first = notifier.subscribe(Topic::SavedRecipesChanged, move || {
            first_calls.lock().unwrap().push("home")
        });
        let second_calls = calls.clone();
        let _second = notifier.subscribe(Topic::SavedRecipesChanged, move || {
            second_calls.lock().unwrap().push("saved")
        });

        notifier.publish(Topic::SavedRecipesChanged);

        assert_eq!(*calls.lock().unwrap(), vec!["home", "saved"]);
    }

    #[test]
    fn test_publish_only_matching_topic() {
        let notifier = Notifier::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let _sub = notifier.subscribe(Topic::HistoryChanged, move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        notifier.publish(Topic::SavedRecipesChanged);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        notifier.publish(Topic::HistoryChanged);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_and_drop_release_handler() {
        let notifier = Notifier::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        let sub = notifier.subscribe(Topic::SavedRecipesChanged, move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let c = count.clone();
        let dropped = notifier.subscribe(Topic::SavedRecipesChanged, move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(notifier.subscriber_count(Topic::SavedRecipesChanged), 2);

        sub.unsubscribe();
        drop(dropped);
        notifier.publish(Topic::SavedRecipesChanged);

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(notifier.subscriber_count(Topic::SavedRecipesChanged), 0);
    }

    #[test]
    fn test_handler_may_subscribe_during_publish() {
        let notifier = Notifier::new();
        let inner = notifier.clone();
        let late = Arc::new(Mutex::new(Vec::new()));
        let late_store = late.clone();

        let _sub = notifier.subscribe(Topic::HistoryChanged, move || {
            let sub = inner.subscribe(Topic::HistoryChanged, || {});
            late_store.lock().unwrap().push(sub);
        });

        notifier.publish(Topic::HistoryChanged);
        assert_eq!(notifier.subscriber_count(Topic::HistoryChanged), 2);
    }
}
