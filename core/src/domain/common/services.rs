use std::{sync::Arc, time::Duration};

use crate::domain::{
    analytics::ports::AnalyticsTransport,
    common::{DEFAULT_ANALYTICS_TIMEOUT, DeviceInfo},
    generation::{ports::RecipeGenerator, value_objects::GenerationOptions},
    notifier::Notifier,
    storage::{KeyLocks, KeyValueStore},
};

/// Settings the service needs at runtime, split out of the full config.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub device: DeviceInfo,
    pub analytics_enabled: bool,
    pub analytics_timeout: Duration,
    pub generation_defaults: GenerationOptions,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            device: DeviceInfo::default(),
            analytics_enabled: true,
            analytics_timeout: DEFAULT_ANALYTICS_TIMEOUT,
            generation_defaults: GenerationOptions::default(),
        }
    }
}

/// Implements every domain service trait over one key-value store, one
/// recipe generator and one analytics transport.
pub struct Service<S, G, T>
where
    S: KeyValueStore,
    G: RecipeGenerator,
    T: AnalyticsTransport,
{
    pub(crate) store: Arc<S>,
    pub(crate) generator: Arc<G>,
    pub(crate) analytics_transport: Arc<T>,
    pub(crate) notifier: Notifier,
    pub(crate) locks: KeyLocks,
    pub(crate) settings: ServiceSettings,
}

impl<S, G, T> Service<S, G, T>
where
    S: KeyValueStore,
    G: RecipeGenerator,
    T: AnalyticsTransport,
{
    pub fn new(
        store: S,
        generator: G,
        analytics_transport: T,
        notifier: Notifier,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            store: Arc::new(store),
            generator: Arc::new(generator),
            analytics_transport: Arc::new(analytics_transport),
            notifier,
            locks: KeyLocks::new(),
            settings,
        }
    }

    /// The change channel surfaces subscribe to.
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }
}

impl<S, G, T> Clone for Service<S, G, T>
where
    S: KeyValueStore,
    G: RecipeGenerator,
    T: AnalyticsTransport,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            generator: self.generator.clone(),
            analytics_transport: self.analytics_transport.clone(),
            notifier: self.notifier.clone(),
            locks: self.locks.clone(),
            settings: self.settings.clone(),
        }
    }
}
