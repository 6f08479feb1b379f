use crate::domain::common::{
    LarderConfig, entities::app_errors::CoreError, services::{Service, ServiceSettings},
};
use crate::domain::generation::value_objects::GenerationOptions;
use crate::domain::notifier::Notifier;
use crate::infrastructure::{
    analytics::HttpAnalyticsTransport, generation::HttpRecipeGenerator,
    storage::FileKeyValueStore,
};

pub type LarderService = Service<FileKeyValueStore, HttpRecipeGenerator, HttpAnalyticsTransport>;

fn check_endpoint(name: &str, endpoint: &str) -> Result<(), CoreError> {
    if endpoint.is_empty() || endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Ok(())
    } else {
        Err(CoreError::InvalidConfig(format!(
            "{name} must be an http(s) URL, got {endpoint:?}"
        )))
    }
}

/// Wire the file-backed store and HTTP clients into one service.
///
/// Analytics is only enabled when it is switched on and an endpoint is set.
pub fn create_service(config: LarderConfig) -> Result<LarderService, CoreError> {
    check_endpoint("generation endpoint", &config.generation.endpoint)?;
    check_endpoint("analytics endpoint", &config.analytics.endpoint)?;
    if config.storage.data_dir.as_os_str().is_empty() {
        return Err(CoreError::InvalidConfig(
            "data directory must not be empty".to_string(),
        ));
    }

    let store = FileKeyValueStore::new(config.storage.data_dir.clone());
    let generator = HttpRecipeGenerator::new(config.generation.endpoint.clone())
        .with_timeout(config.generation.timeout);
    let transport = HttpAnalyticsTransport::new(config.analytics.endpoint.clone());

    let settings = ServiceSettings {
        device: config.device.clone(),
        analytics_enabled: config.analytics.enabled && !config.analytics.endpoint.is_empty(),
        analytics_timeout: config.analytics.timeout,
        generation_defaults: GenerationOptions::from(&config.generation),
    };

    Ok(Service::new(
        store,
        generator,
        transport,
        Notifier::new(),
        settings,
    ))
}
