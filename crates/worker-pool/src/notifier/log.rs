//! Notifier that only writes a log line.

use std::time::Duration;

use async_trait::async_trait;

use super::Notifier;
use crate::error::NotifyError;
use crate::event::CartEvent;

/// Logs each notification after a simulated delivery latency.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    latency: Duration,
}

impl LogNotifier {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, event: &CartEvent) -> Result<(), NotifyError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        tracing::info!(
            event_id = event.id,
            order_type = %event.order_type,
            card = %event.masked_card(),
            "NOTIFY: order {} for card {}",
            event.order_type,
            event.masked_card()
        );

        Ok(())
    }
}
