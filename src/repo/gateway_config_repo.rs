use crate::domain::gateway_config::GatewayConfig;
use anyhow::Result;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct GatewayConfigRepo {
    pub pool: PgPool,
}

impl GatewayConfigRepo {
    pub async fn load(&self) -> Result<Option<GatewayConfig>> {
        let row = sqlx::query(
            r#"
            SELECT enabled, environment, webhook_secret, webhook_secret_sandbox, base_url
            FROM gateway_config
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| GatewayConfig {
            enabled: r.get("enabled"),
            environment: r.get("environment"),
            webhook_secret: r.get("webhook_secret"),
            webhook_secret_sandbox: r.get("webhook_secret_sandbox"),
            base_url: r.get("base_url"),
        }))
    }
}
