use crate::repo::webhook_repo::SubscriptionsRepo;
use crate::service::broadcaster::Broadcaster;

/// HTTP fan-out to the subscribers registered for an event.
#[derive(Clone)]
pub struct SubscriberDispatcher {
    pub subscriptions_repo: SubscriptionsRepo,
    pub client: reqwest::Client,
    pub timeout: std::time::Duration,
}

#[async_trait::async_trait]
impl Broadcaster for SubscriberDispatcher {
    async fn broadcast(&self, event: &str, payload: serde_json::Value) {
        let subscribers = match self.subscriptions_repo.enabled_for_event(event).await {
            Ok(subscribers) => subscribers,
            Err(e) => {
                tracing::warn!(event, "failed to load subscribers: {}", e);
                return;
            }
        };

        for subscriber in subscribers {
            let mut req = self
                .client
                .post(&subscriber.target_url)
                .header("X-Event-Type", &subscriber.event_type)
                .timeout(self.timeout)
                .json(&payload);
            if let Some(secret) = &subscriber.secret {
                req = req.header("X-Webhook-Secret", secret);
            }

            match req.send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => tracing::warn!(
                    subscriber_id = subscriber.id,
                    status = resp.status().as_u16(),
                    "subscriber rejected {} event",
                    event
                ),
                Err(e) => tracing::warn!(
                    subscriber_id = subscriber.id,
                    "subscriber delivery failed: {}",
                    e
                ),
            }
        }
    }
}
