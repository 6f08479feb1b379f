use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::{NoContext, Timestamp, Uuid};

pub mod entities;
pub mod services;

pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_MINUTES: u32 = 30;
pub const DEFAULT_ANALYTICS_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct LarderConfig {
    pub storage: StorageConfig,
    pub generation: GenerationConfig,
    pub analytics: AnalyticsConfig,
    pub device: DeviceInfo,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub locale: String,
    pub region: String,
    pub max_minutes: u32,
    pub utensils: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout: DEFAULT_GENERATION_TIMEOUT,
            locale: "pt-BR".to_string(),
            region: "BR".to_string(),
            max_minutes: DEFAULT_MAX_MINUTES,
            utensils: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AnalyticsConfig {
    pub endpoint: String,
    pub enabled: bool,
    /// Upper bound on one batch delivery.
    pub timeout: Duration,
}

/// Static description of the device, attached to every analytics event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub platform: String,
    pub app_version: Option<String>,
    pub device_model: Option<String>,
    pub os_version: Option<String>,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            platform: std::env::consts::OS.to_string(),
            app_version: None,
            device_model: None,
            os_version: None,
        }
    }
}

pub fn generate_timestamp() -> (DateTime<Utc>, Timestamp) {
    let now = Utc::now();
    let seconds = now.timestamp().try_into().unwrap_or(0);
    let timestamp = Timestamp::from_unix(NoContext, seconds, now.timestamp_subsec_nanos());

    (now, timestamp)
}

pub fn generate_uuid_v7() -> Uuid {
    let (_, timestamp) = generate_timestamp();
    Uuid::new_v7(timestamp)
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// `"{epoch_ms}-{random hex}"`, the id format used for history entries.
pub fn generate_timestamped_id() -> String {
    let suffix: u64 = rand::thread_rng().r#gen();
    format!("{}-{:x}", now_millis(), suffix)
}
