use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

use crate::domain::{
    analytics::{entities::AnalyticsEvent, ports::AnalyticsTransport},
    common::entities::app_errors::CoreError,
};

#[derive(Debug, Clone)]
pub struct HttpAnalyticsTransport {
    endpoint: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    events: &'a [AnalyticsEvent],
}

impl HttpAnalyticsTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::new(),
        }
    }
}

impl AnalyticsTransport for HttpAnalyticsTransport {
    async fn send_batch(&self, events: Vec<AnalyticsEvent>) -> Result<(), CoreError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&BatchRequest { events: &events })
            .send()
            .await
            .map_err(|e| {
                error!("Analytics request failed: {}", e);
                CoreError::ExternalServiceError(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Analytics endpoint returned {}", status);
            return Err(CoreError::ExternalServiceError(format!(
                "analytics endpoint returned {status}"
            )));
        }

        debug!(events = events.len(), "analytics batch accepted");
        Ok(())
    }
}
