use std::sync::Arc;

pub const PAYMENT_UPDATE_EVENT: &str = "payment_update";

/// Fire-and-forget publisher for real-time subscribers. Implementations log
/// their own delivery failures; callers never see them.
#[async_trait::async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(&self, event: &str, payload: serde_json::Value);
}

#[derive(Clone)]
pub struct RedisBroadcaster {
    pub redis_client: redis::Client,
    pub channel: String,
}

#[async_trait::async_trait]
impl Broadcaster for RedisBroadcaster {
    async fn broadcast(&self, event: &str, payload: serde_json::Value) {
        let message = serde_json::json!({ "event": event, "payload": payload }).to_string();
        let published: redis::RedisResult<i64> = async {
            let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
            let receivers: i64 = redis::cmd("PUBLISH")
                .arg(&self.channel)
                .arg(message)
                .query_async(&mut conn)
                .await?;
            Ok(receivers)
        }
        .await;

        match published {
            Ok(receivers) => {
                tracing::debug!(event, receivers, channel = %self.channel, "published")
            }
            Err(e) => tracing::warn!(event, channel = %self.channel, "redis publish failed: {}", e),
        }
    }
}

/// Sends every event to each inner broadcaster in order.
#[derive(Clone, Default)]
pub struct FanoutBroadcaster {
    targets: Vec<Arc<dyn Broadcaster>>,
}

impl FanoutBroadcaster {
    pub fn new(targets: Vec<Arc<dyn Broadcaster>>) -> Self {
        Self { targets }
    }
}

#[async_trait::async_trait]
impl Broadcaster for FanoutBroadcaster {
    async fn broadcast(&self, event: &str, payload: serde_json::Value) {
        for target in &self.targets {
            target.broadcast(event, payload.clone()).await;
        }
    }
}
