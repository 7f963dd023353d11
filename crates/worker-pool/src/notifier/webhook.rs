//! Notifier that POSTs events to an HTTP endpoint.

use std::time::Duration;

use async_trait::async_trait;

use super::Notifier;
use crate::error::NotifyError;
use crate::event::CartEvent;

/// Delivers each event as a JSON `POST` to a fixed URL.
///
/// Any 2xx answer counts as delivered. The event body uses the same camelCase
/// field names the ingest API accepts, plus `id`, `status` and `createdAt`.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Create a webhook notifier with a per-request timeout.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn notify(&self, event: &CartEvent) -> Result<(), NotifyError> {
        let response = self.client.post(&self.url).json(event).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::debug!(
            event_id = event.id,
            url = %self.url,
            status = status.as_u16(),
            "Webhook notification delivered"
        );

        Ok(())
    }
}
