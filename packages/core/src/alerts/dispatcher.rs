//! Alert email dispatch.
//!
//! [`AlertDispatcher::send`] hands one consolidated alert to the mail
//! transport. Delivery failures are logged and counted, then dropped: a
//! failed alert must never stop the scheduler or affect later cycles.

use std::sync::Arc;

use crate::alerts::mailer::{AlertMessage, MailTransport};
use crate::metrics::AppMetrics;

#[derive(Clone)]
pub struct AlertDispatcher {
    transport: Arc<dyn MailTransport + Send + Sync>,
    metrics: Option<Arc<AppMetrics>>,
}

impl AlertDispatcher {
    pub fn new(transport: Arc<dyn MailTransport + Send + Sync>) -> Self {
        Self {
            transport,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<AppMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Send one alert. Returns `true` when the transport accepted it.
    /// There is no retry within the same cycle.
    pub async fn send(&self, subject: &str, body: &str) -> bool {
        let message = AlertMessage {
            subject: subject.to_string(),
            body: body.to_string(),
        };

        match self.transport.send(&message).await {
            Ok(()) => {
                tracing::info!("Alert email sent: {}", subject);
                if let Some(metrics) = &self.metrics {
                    metrics.alerts_sent_total.inc();
                }
                true
            }
            Err(err) => {
                tracing::error!(
                    transport = self.transport.name(),
                    "Failed to send email alert: {}",
                    err
                );
                if let Some(metrics) = &self.metrics {
                    metrics.alert_failures_total.inc();
                }
                false
            }
        }
    }
}
