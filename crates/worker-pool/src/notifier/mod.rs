//! Notification delivery.
//!
//! Workers hand every claimed event to a [`Notifier`]. Delivery is opaque to
//! the queue: it may be slow and it may fail.

mod log;
mod webhook;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::NotifierConfig;
use crate::error::NotifyError;
use crate::event::CartEvent;

pub use self::log::LogNotifier;
pub use self::webhook::WebhookNotifier;

/// Delivers a notification for a single card event.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Deliver the notification for `event`.
    async fn notify(&self, event: &CartEvent) -> Result<(), NotifyError>;
}

/// Build the notifier selected by `config`.
///
/// A webhook URL selects [`WebhookNotifier`]; otherwise events are only
/// logged by [`LogNotifier`].
pub fn from_config(config: &NotifierConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    match &config.webhook_url {
        Some(url) => {
            let notifier = WebhookNotifier::new(url, config.request_timeout())?;
            tracing::info!(url = %notifier.url(), "Delivering notifications to webhook");
            Ok(Arc::new(notifier))
        }
        None => {
            tracing::info!("No webhook configured, notifications are logged only");
            Ok(Arc::new(LogNotifier::new(config.simulated_latency())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_selects_log_notifier() {
        let notifier = from_config(&NotifierConfig::default()).unwrap();
        assert_eq!(notifier.name(), "log");
    }

    #[test]
    fn test_webhook_url_selects_webhook_notifier() {
        let config = NotifierConfig {
            webhook_url: Some("http://localhost:9000/notify".to_string()),
            ..NotifierConfig::default()
        };
        let notifier = from_config(&config).unwrap();
        assert_eq!(notifier.name(), "webhook");
    }
}
