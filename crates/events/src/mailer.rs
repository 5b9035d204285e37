//! Background task that e-mails each new alert.
//!
//! [`AlertMailer`] subscribes to the [`EventBus`](crate::bus::EventBus) and
//! ignores everything but `new-alert` events. Delivery failures are logged;
//! they never reach the request that raised the alert.

use thermowatch_core::feed::FeedEvent;
use tokio::sync::broadcast;

use crate::delivery::email::EmailDelivery;

pub struct AlertMailer {
    delivery: EmailDelivery,
    /// Threshold quoted in the e-mail body.
    high_threshold: f64,
}

impl AlertMailer {
    pub fn new(delivery: EmailDelivery, high_threshold: f64) -> Self {
        Self {
            delivery,
            high_threshold,
        }
    }

    /// Run until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<FeedEvent>) {
        tracing::info!(to = %self.delivery.recipient(), "Alert mailer started");
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let Some(alert) = event.alert() else {
                        continue;
                    };
                    if let Err(e) = self.delivery.send_alert(&alert, self.high_threshold).await {
                        tracing::error!(error = %e, value = alert.value, "Failed to send alert email");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Alert mailer lagged, some alerts were not emailed");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, alert mailer shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::bus::EventBus;
    use crate::delivery::email::EmailConfig;

    fn mailer() -> AlertMailer {
        let config = EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            from_address: "thermowatch@localhost".to_string(),
            to_address: "ops@localhost".to_string(),
            smtp_user: None,
            smtp_password: None,
        };
        AlertMailer::new(EmailDelivery::new(config), 60.0)
    }

    #[tokio::test]
    async fn stops_when_bus_is_dropped() {
        let bus = EventBus::default();
        let handle = tokio::spawn(mailer().run(bus.subscribe()));

        bus.send(FeedEvent::error("ignored by the mailer"));
        drop(bus);

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("mailer should exit once the bus closes")
            .unwrap();
    }
}
