use anyhow::Result;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct SubscriptionsRepo {
    pub pool: PgPool,
}

#[derive(Debug, Clone)]
pub struct Subscriber {
    pub id: i64,
    pub event_type: String,
    pub target_url: String,
    pub secret: Option<String>,
}

impl SubscriptionsRepo {
    pub async fn enabled_for_event(&self, event_type: &str) -> Result<Vec<Subscriber>> {
        let rows = sqlx::query(
            r#"
            SELECT id, event_type, target_url, secret
            FROM webhook_subscriptions
            WHERE is_enabled = true AND event_type = $1
            ORDER BY id ASC
            "#,
        )
        .bind(event_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Subscriber {
                id: row.get("id"),
                event_type: row.get("event_type"),
                target_url: row.get("target_url"),
                secret: row.get("secret"),
            })
            .collect())
    }
}
